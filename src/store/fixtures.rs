//! Demo data loaded into a fresh store.

use chrono::{Duration, Utc};
use tracing::info;

use super::Repository;
use crate::models::{Assessment, Coordinates, Incident, NgoProfile, Priority, Task, TaskStatus};
use crate::DrcsResult;

pub const DEFAULT_NGO_ID: &str = "ngo-99";
pub const DEFAULT_NGO_NAME: &str = "Red Shield Responders";

pub fn seed_incidents() -> Vec<Incident> {
    let now = Utc::now();
    vec![
        Incident {
            id: "inc-1".to_string(),
            timestamp: now - Duration::minutes(15),
            reporter: "Volunteer_04".to_string(),
            description: "Flash flooding observed in Sector 7, water level rising quickly near the bridge."
                .to_string(),
            coordinates: Coordinates::new(34.0522, -118.2437),
            assessment: None,
            is_analyzed: false,
            is_converted_to_task: false,
        },
        Incident {
            id: "inc-2".to_string(),
            timestamp: now - Duration::minutes(10),
            reporter: "S. Patel".to_string(),
            description: "Structure fire reported at the warehouse district. Potential hazardous materials stored on-site."
                .to_string(),
            coordinates: Coordinates::new(34.0622, -118.2537),
            assessment: Some(Assessment::new(
                "Fire",
                8.0,
                "High",
                "Deploy specialized hazmat containment team and standard fire response.",
            )),
            is_analyzed: true,
            is_converted_to_task: true,
        },
    ]
}

pub fn seed_tasks() -> Vec<Task> {
    vec![Task {
        id: "task-1".to_string(),
        incident_id: "inc-2".to_string(),
        title: "Warehouse Fire Containment".to_string(),
        priority: Priority::High,
        required_resources: vec!["Fire Engine".to_string(), "Hazmat Crew".to_string()],
        status: TaskStatus::Open,
        claimed_by: None,
        created_at: Utc::now() - Duration::minutes(5),
        coordinates: Coordinates::new(34.0622, -118.2537),
    }]
}

pub fn default_ngo(id: &str) -> NgoProfile {
    NgoProfile::new(id, DEFAULT_NGO_NAME, 12)
}

/// Load the demo incidents and tasks.
pub async fn seed(store: &dyn Repository) -> DrcsResult<()> {
    let incidents = seed_incidents();
    let tasks = seed_tasks();
    let counts = (incidents.len(), tasks.len());

    for incident in incidents {
        store.insert_incident(incident).await?;
    }
    for task in tasks {
        store.insert_task(task).await?;
    }

    info!(incidents = counts.0, tasks = counts.1, "Seeded demo data");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_seed_is_consistent() {
        let store = MemoryStore::new();
        seed(&store).await.unwrap();

        let incidents = store.list_incidents().await.unwrap();
        let tasks = store.list_tasks().await.unwrap();
        assert_eq!(incidents.len(), 2);
        assert_eq!(tasks.len(), 1);

        // every converted incident has exactly one task pointing at it
        for incident in incidents.iter().filter(|i| i.is_converted_to_task) {
            assert_eq!(tasks.iter().filter(|t| t.incident_id == incident.id).count(), 1);
        }
    }

    #[test]
    fn test_default_ngo() {
        let ngo = default_ngo(DEFAULT_NGO_ID);
        assert_eq!(ngo.id, "ngo-99");
        assert_eq!(ngo.active_volunteers, 12);
    }
}
