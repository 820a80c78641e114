use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use super::{require_text, validate_request};
use crate::models::{Id, NgoProfile, Task, TaskStatus};
use crate::store::Repository;
use crate::{DrcsError, DrcsResult};

/// Request type for drcs/claim_task
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ClaimTaskRequest {
    #[validate(length(min = 1, message = "task id must not be empty"))]
    pub task_id: Id,
    /// Defaults to the session's NGO when omitted
    #[serde(default)]
    pub ngo_id: Option<Id>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolunteerDelta {
    Increment,
    Decrement,
}

/// NGO field-partner portal: mission marketplace and roster size
pub struct NgoController {
    store: Arc<dyn Repository>,
}

impl NgoController {
    pub fn new(store: Arc<dyn Repository>) -> Self {
        Self { store }
    }

    /// Tasks still waiting for a claim, in creation order
    pub async fn list_open(&self) -> DrcsResult<Vec<Task>> {
        let tasks = self.store.list_tasks().await?;
        Ok(tasks.into_iter().filter(Task::is_open).collect())
    }

    /// Tasks bound to `ngo_id`, in creation order
    pub async fn my_tasks(&self, ngo_id: &str) -> DrcsResult<Vec<Task>> {
        let tasks = self.store.list_tasks().await?;
        Ok(tasks.into_iter().filter(|t| t.is_claimed_by(ngo_id)).collect())
    }

    /// OPEN -> CLAIMED. Claiming anything that is not OPEN is a conflict and
    /// leaves the task unchanged.
    pub async fn claim(&self, task_id: &str, ngo_id: &str) -> DrcsResult<Task> {
        require_text("task_id", task_id)?;
        require_text("ngo_id", ngo_id)?;

        let claimant = ngo_id.to_string();
        let task = self
            .store
            .update_task(
                task_id,
                Box::new(move |task: &mut Task| {
                    if task.status != TaskStatus::Open {
                        let holder = task.claimed_by.as_deref().unwrap_or("nobody");
                        return Err(DrcsError::conflict(format!(
                            "task {} is {} (claimed by {})",
                            task.id, task.status, holder
                        )));
                    }
                    task.status = TaskStatus::Claimed;
                    task.claimed_by = Some(claimant);
                    Ok(())
                }),
            )
            .await?;

        info!(task_id = %task.id, ngo_id, "Task claimed");
        Ok(task)
    }

    /// Validate and run a claim request, filling in the acting NGO.
    pub async fn handle_claim(&self, request: ClaimTaskRequest, acting_ngo: &str) -> DrcsResult<Task> {
        validate_request(&request)?;
        let ngo_id = request.ngo_id.as_deref().unwrap_or(acting_ngo);
        self.claim(&request.task_id, ngo_id).await
    }

    pub async fn get_profile(&self, ngo_id: &str) -> DrcsResult<NgoProfile> {
        self.store.get_ngo(ngo_id).await
    }

    /// Absolute set of the roster counter; negative counts clamp to zero.
    pub async fn set_volunteer_count(&self, ngo_id: &str, count: i64) -> DrcsResult<NgoProfile> {
        let profile = self
            .store
            .update_ngo(
                ngo_id,
                Box::new(move |profile: &mut NgoProfile| {
                    profile.set_volunteers(count);
                    Ok(())
                }),
            )
            .await?;

        info!(ngo_id, requested = count, active_volunteers = profile.active_volunteers, "Volunteer count updated");
        Ok(profile)
    }

    /// The +/- controls. The step is applied inside the store update so
    /// concurrent presses are never lost.
    pub async fn adjust_volunteers(&self, ngo_id: &str, delta: VolunteerDelta) -> DrcsResult<NgoProfile> {
        let profile = self
            .store
            .update_ngo(
                ngo_id,
                Box::new(move |profile: &mut NgoProfile| {
                    let current = i64::from(profile.active_volunteers);
                    profile.set_volunteers(match delta {
                        VolunteerDelta::Increment => current + 1,
                        VolunteerDelta::Decrement => current - 1,
                    });
                    Ok(())
                }),
            )
            .await?;

        info!(ngo_id, ?delta, active_volunteers = profile.active_volunteers, "Volunteer count adjusted");
        Ok(profile)
    }
}
