use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::trace;

use super::{Mutation, Repository};
use crate::models::{Incident, NgoProfile, Task};
use crate::{DrcsError, DrcsResult};

#[derive(Default)]
struct Collections {
    incidents: Vec<Incident>,
    tasks: Vec<Task>,
    ngos: Vec<NgoProfile>,
}

/// Single-writer in-memory store. Every mutation runs under one write lock.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Apply `mutation` to a copy of the entity and commit only on success.
fn apply<T: Clone>(entity: &mut T, mutation: Mutation<T>) -> DrcsResult<T> {
    let mut draft = entity.clone();
    mutation(&mut draft)?;
    *entity = draft.clone();
    Ok(draft)
}

#[async_trait]
impl Repository for MemoryStore {
    async fn insert_incident(&self, incident: Incident) -> DrcsResult<Incident> {
        let mut inner = self.inner.write().await;
        if inner.incidents.iter().any(|i| i.id == incident.id) {
            return Err(DrcsError::conflict(format!("incident {} already exists", incident.id)));
        }
        trace!(incident_id = %incident.id, "inserting incident");
        inner.incidents.push(incident.clone());
        Ok(incident)
    }

    async fn get_incident(&self, id: &str) -> DrcsResult<Incident> {
        let inner = self.inner.read().await;
        inner
            .incidents
            .iter()
            .find(|i| i.id == id)
            .cloned()
            .ok_or_else(|| DrcsError::not_found("Incident", id))
    }

    async fn list_incidents(&self) -> DrcsResult<Vec<Incident>> {
        Ok(self.inner.read().await.incidents.clone())
    }

    async fn update_incident(&self, id: &str, mutation: Mutation<Incident>) -> DrcsResult<Incident> {
        let mut inner = self.inner.write().await;
        let incident = inner
            .incidents
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| DrcsError::not_found("Incident", id))?;
        apply(incident, mutation)
    }

    async fn insert_task(&self, task: Task) -> DrcsResult<Task> {
        let mut inner = self.inner.write().await;
        if inner.tasks.iter().any(|t| t.id == task.id) {
            return Err(DrcsError::conflict(format!("task {} already exists", task.id)));
        }
        trace!(task_id = %task.id, "inserting task");
        inner.tasks.push(task.clone());
        Ok(task)
    }

    async fn get_task(&self, id: &str) -> DrcsResult<Task> {
        let inner = self.inner.read().await;
        inner
            .tasks
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| DrcsError::not_found("Task", id))
    }

    async fn list_tasks(&self) -> DrcsResult<Vec<Task>> {
        Ok(self.inner.read().await.tasks.clone())
    }

    async fn update_task(&self, id: &str, mutation: Mutation<Task>) -> DrcsResult<Task> {
        let mut inner = self.inner.write().await;
        let task = inner
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| DrcsError::not_found("Task", id))?;
        apply(task, mutation)
    }

    async fn insert_ngo(&self, profile: NgoProfile) -> DrcsResult<NgoProfile> {
        let mut inner = self.inner.write().await;
        if inner.ngos.iter().any(|n| n.id == profile.id) {
            return Err(DrcsError::conflict(format!("NGO {} already exists", profile.id)));
        }
        inner.ngos.push(profile.clone());
        Ok(profile)
    }

    async fn get_ngo(&self, id: &str) -> DrcsResult<NgoProfile> {
        let inner = self.inner.read().await;
        inner
            .ngos
            .iter()
            .find(|n| n.id == id)
            .cloned()
            .ok_or_else(|| DrcsError::not_found("NGO", id))
    }

    async fn update_ngo(&self, id: &str, mutation: Mutation<NgoProfile>) -> DrcsResult<NgoProfile> {
        let mut inner = self.inner.write().await;
        let profile = inner
            .ngos
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| DrcsError::not_found("NGO", id))?;
        apply(profile, mutation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Coordinates, Priority, TaskStatus};

    fn incident(description: &str) -> Incident {
        Incident::new(description.to_string(), "tester".to_string(), Coordinates::new(34.0, -118.0))
    }

    #[tokio::test]
    async fn test_incidents_keep_insertion_order() {
        let store = MemoryStore::new();
        for name in ["first", "second", "third"] {
            store.insert_incident(incident(name)).await.unwrap();
        }

        let descriptions: Vec<String> = store
            .list_incidents()
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.description)
            .collect();
        assert_eq!(descriptions, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_duplicate_insert_rejected() {
        let store = MemoryStore::new();
        let inc = incident("dup");
        store.insert_incident(inc.clone()).await.unwrap();
        let result = store.insert_incident(inc).await;
        assert!(matches!(result, Err(DrcsError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_failed_mutation_leaves_entity_untouched() {
        let store = MemoryStore::new();
        let inc = store.insert_incident(incident("flood")).await.unwrap();
        let task = Task::from_incident(&inc, "Rescue".to_string(), Priority::High, vec!["Boat".to_string()]);
        let task = store.insert_task(task).await.unwrap();

        let result = store
            .update_task(
                &task.id,
                Box::new(|t: &mut Task| {
                    t.status = TaskStatus::Claimed;
                    t.claimed_by = Some("ngo-1".to_string());
                    Err(DrcsError::conflict("rejected after partial write"))
                }),
            )
            .await;
        assert!(result.is_err());

        let stored = store.get_task(&task.id).await.unwrap();
        assert_eq!(stored.status, TaskStatus::Open);
        assert!(stored.claimed_by.is_none());
    }

    #[tokio::test]
    async fn test_missing_entities() {
        let store = MemoryStore::new();
        assert!(matches!(store.get_incident("nope").await, Err(DrcsError::NotFound { entity: "Incident", .. })));
        assert!(matches!(store.get_task("nope").await, Err(DrcsError::NotFound { entity: "Task", .. })));
        assert!(matches!(
            store.update_ngo("nope", Box::new(|_: &mut NgoProfile| Ok(()))).await,
            Err(DrcsError::NotFound { entity: "NGO", .. })
        ));
    }
}
