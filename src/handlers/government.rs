use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info, warn};
use validator::Validate;

use super::{require_text, validate_request};
use crate::gateway::AnalysisGateway;
use crate::models::{Id, Incident, Priority, Task, Timestamp};
use crate::store::Repository;
use crate::{DrcsError, DrcsResult};

/// Required resources, either as a list or as one comma-delimited string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Resources {
    List(Vec<String>),
    Delimited(String),
}

impl Resources {
    /// Trimmed resource labels, blank entries dropped
    pub fn normalize(&self) -> Vec<String> {
        let raw: Vec<&str> = match self {
            Resources::List(items) => items.iter().map(String::as_str).collect(),
            Resources::Delimited(text) => text.split(',').collect(),
        };
        raw.into_iter()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl From<Vec<&str>> for Resources {
    fn from(items: Vec<&str>) -> Self {
        Resources::List(items.into_iter().map(str::to_string).collect())
    }
}

/// Request type for drcs/convert_to_task
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ConvertTaskRequest {
    #[validate(length(min = 1, message = "an incident must be selected"))]
    pub incident_id: Id,
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    #[serde(default)]
    pub priority: Priority,
    pub resources: Resources,
}

/// Request type for drcs/broadcast
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BroadcastRequest {
    #[validate(length(min = 1, message = "message must not be empty"))]
    pub message: String,
}

/// Acknowledgement of a broadcast. Nothing is actually delivered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastReceipt {
    pub message: String,
    pub sent_at: Timestamp,
    pub delivered: bool,
}

/// Marks an incident as having an analysis in flight until dropped
struct InFlightGuard {
    in_flight: Arc<Mutex<HashSet<Id>>>,
    incident_id: Id,
}

impl InFlightGuard {
    fn acquire(in_flight: &Arc<Mutex<HashSet<Id>>>, incident_id: &str) -> DrcsResult<Self> {
        let mut pending = in_flight.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if !pending.insert(incident_id.to_string()) {
            return Err(DrcsError::AnalysisInFlight(incident_id.to_string()));
        }
        Ok(Self {
            in_flight: in_flight.clone(),
            incident_id: incident_id.to_string(),
        })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut pending = self.in_flight.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        pending.remove(&self.incident_id);
    }
}

/// Government command portal: triage, mission creation and broadcasts
pub struct GovernmentController {
    store: Arc<dyn Repository>,
    gateway: Arc<dyn AnalysisGateway>,
    in_flight: Arc<Mutex<HashSet<Id>>>,
}

impl GovernmentController {
    pub fn new(store: Arc<dyn Repository>, gateway: Arc<dyn AnalysisGateway>) -> Self {
        Self {
            store,
            gateway,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Incident ids with an analysis currently awaiting the gateway
    pub fn pending_analyses(&self) -> Vec<Id> {
        let pending = self.in_flight.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut ids: Vec<Id> = pending.iter().cloned().collect();
        ids.sort();
        ids
    }

    /// Ask the gateway to assess an incident and merge the result.
    ///
    /// Only one analysis per incident may be outstanding; a second call while
    /// the first is pending fails with [`DrcsError::AnalysisInFlight`]. On
    /// gateway failure the incident is left exactly as it was.
    pub async fn request_analysis(&self, incident_id: &str) -> DrcsResult<Incident> {
        require_text("incident_id", incident_id)?;
        let incident = self.store.get_incident(incident_id).await?;
        let _guard = InFlightGuard::acquire(&self.in_flight, incident_id)?;

        debug!(incident_id, "Requesting incident analysis");
        let assessment = match self.gateway.analyze(&incident.description).await {
            Ok(assessment) => assessment,
            Err(e) => {
                error!(incident_id, "Incident analysis failed: {}", e);
                return Err(e.into());
            }
        };

        let category = assessment.category.clone();
        let updated = self
            .store
            .update_incident(
                incident_id,
                Box::new(move |incident: &mut Incident| {
                    incident.apply_assessment(assessment);
                    Ok(())
                }),
            )
            .await?;

        info!(incident_id, category = %category, "Incident analyzed");
        Ok(updated)
    }

    /// Turn an incident into an OPEN task. An incident converts at most once.
    pub async fn convert_to_task(&self, request: ConvertTaskRequest) -> DrcsResult<Task> {
        validate_request(&request)?;
        require_text("incident_id", &request.incident_id)?;
        require_text("title", &request.title)?;

        let resources = request.resources.normalize();
        if resources.is_empty() {
            return Err(DrcsError::validation("Field 'resources': at least one resource is required"));
        }

        let incident_id = request.incident_id.clone();
        let source = self
            .store
            .update_incident(
                &incident_id,
                Box::new(|incident: &mut Incident| {
                    if incident.is_converted_to_task {
                        return Err(DrcsError::conflict(format!(
                            "incident {} has already been converted to a task",
                            incident.id
                        )));
                    }
                    incident.is_converted_to_task = true;
                    Ok(())
                }),
            )
            .await?;

        let task = Task::from_incident(&source, request.title.trim().to_string(), request.priority, resources);
        let task = match self.store.insert_task(task).await {
            Ok(task) => task,
            Err(e) => {
                warn!(incident_id = %incident_id, "Task insert failed, reverting conversion flag: {}", e);
                self.store
                    .update_incident(
                        &incident_id,
                        Box::new(|incident: &mut Incident| {
                            incident.is_converted_to_task = false;
                            Ok(())
                        }),
                    )
                    .await?;
                return Err(e);
            }
        };

        info!(
            task_id = %task.id,
            incident_id = %task.incident_id,
            priority = %task.priority,
            resources = task.required_resources.len(),
            "Incident converted to task"
        );
        Ok(task)
    }

    /// Every task regardless of status, in creation order
    pub async fn list_tasks(&self) -> DrcsResult<Vec<Task>> {
        self.store.list_tasks().await
    }

    /// Log a broadcast to units in the field. Delivery is not implemented.
    pub async fn broadcast(&self, request: BroadcastRequest) -> DrcsResult<BroadcastReceipt> {
        validate_request(&request)?;
        require_text("message", &request.message)?;

        warn!(message = %request.message, "[SYSTEM BROADCAST] Sending signal to all active units in sector");
        Ok(BroadcastReceipt {
            message: request.message,
            sent_at: chrono::Utc::now(),
            delivered: false,
        })
    }
}
