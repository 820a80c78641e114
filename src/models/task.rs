use serde::{Deserialize, Serialize};

use super::{new_id, Coordinates, Id, Incident, Timestamp};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Open,
    Claimed,
    InProgress,
    Completed,
}

impl TaskStatus {
    /// Status only ever moves forward.
    pub fn can_advance_to(self, next: TaskStatus) -> bool {
        next > self
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Open => write!(f, "OPEN"),
            TaskStatus::Claimed => write!(f, "CLAIMED"),
            TaskStatus::InProgress => write!(f, "IN_PROGRESS"),
            TaskStatus::Completed => write!(f, "COMPLETED"),
        }
    }
}

/// Mission priority, serialized with the portal's labels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    #[serde(rename = "Low", alias = "LOW")]
    Low,
    #[serde(rename = "Med", alias = "MEDIUM")]
    #[default]
    Medium,
    #[serde(rename = "High", alias = "HIGH")]
    High,
    #[serde(rename = "CRITICAL", alias = "Critical")]
    Critical,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::Low => write!(f, "Low"),
            Priority::Medium => write!(f, "Med"),
            Priority::High => write!(f, "High"),
            Priority::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Id,
    /// Back-reference to the originating incident
    pub incident_id: Id,
    pub title: String,
    pub priority: Priority,
    pub required_resources: Vec<String>,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claimed_by: Option<Id>,
    pub created_at: Timestamp,
    /// Snapshot of the incident position at conversion time
    pub coordinates: Coordinates,
}

impl Task {
    pub fn from_incident(
        incident: &Incident,
        title: String,
        priority: Priority,
        required_resources: Vec<String>,
    ) -> Self {
        Self {
            id: new_id(),
            incident_id: incident.id.clone(),
            title,
            priority,
            required_resources,
            status: TaskStatus::Open,
            claimed_by: None,
            created_at: chrono::Utc::now(),
            coordinates: incident.coordinates,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == TaskStatus::Open
    }

    pub fn is_claimed_by(&self, ngo_id: &str) -> bool {
        self.claimed_by.as_deref() == Some(ngo_id)
    }
}

impl std::fmt::Display for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {} ({})", self.status, self.title, self.priority)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_monotonic() {
        assert!(TaskStatus::Open.can_advance_to(TaskStatus::Claimed));
        assert!(TaskStatus::Claimed.can_advance_to(TaskStatus::Completed));
        assert!(!TaskStatus::Claimed.can_advance_to(TaskStatus::Open));
        assert!(!TaskStatus::Open.can_advance_to(TaskStatus::Open));
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(serde_json::to_string(&TaskStatus::InProgress).unwrap(), "\"IN_PROGRESS\"");
        let status: TaskStatus = serde_json::from_str("\"CLAIMED\"").unwrap();
        assert_eq!(status, TaskStatus::Claimed);
    }

    #[test]
    fn test_priority_labels() {
        assert_eq!(serde_json::to_string(&Priority::Medium).unwrap(), "\"Med\"");
        assert_eq!(serde_json::to_string(&Priority::Critical).unwrap(), "\"CRITICAL\"");
        let high: Priority = serde_json::from_str("\"HIGH\"").unwrap();
        assert_eq!(high, Priority::High);
        assert_eq!(Priority::default(), Priority::Medium);
    }

    #[test]
    fn test_from_incident_copies_position() {
        let incident = Incident::new(
            "Structure fire".to_string(),
            "S. Patel".to_string(),
            Coordinates::new(34.0622, -118.2537),
        );
        let task = Task::from_incident(
            &incident,
            "Warehouse Fire Containment".to_string(),
            Priority::High,
            vec!["Fire Engine".to_string()],
        );

        assert_eq!(task.incident_id, incident.id);
        assert_eq!(task.coordinates, incident.coordinates);
        assert!(task.is_open());
        assert!(task.claimed_by.is_none());
        assert_eq!(task.to_string(), "[OPEN] Warehouse Fire Containment (High)");
    }
}
