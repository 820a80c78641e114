use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use super::{require_text, validate_request};
use crate::models::{Coordinates, Incident};
use crate::store::Repository;
use crate::DrcsResult;

/// Request type for drcs/report_incident
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReportIncidentRequest {
    #[validate(length(min = 1, message = "description must not be empty"))]
    pub description: String,
    #[validate(length(min = 1, message = "reporter must not be empty"))]
    pub reporter: String,
    #[validate(nested)]
    pub coordinates: Coordinates,
}

/// Accepts incident reports from people and sensors alike
pub struct IncidentIngestion {
    store: Arc<dyn Repository>,
}

impl IncidentIngestion {
    pub fn new(store: Arc<dyn Repository>) -> Self {
        Self { store }
    }

    pub async fn report(&self, request: ReportIncidentRequest) -> DrcsResult<Incident> {
        validate_request(&request)?;
        require_text("description", &request.description)?;
        require_text("reporter", &request.reporter)?;

        let incident = Incident::new(request.description, request.reporter, request.coordinates);
        let incident = self.store.insert_incident(incident).await?;

        info!(
            incident_id = %incident.id,
            reporter = %incident.reporter,
            coordinates = %incident.coordinates,
            "Incident reported"
        );
        Ok(incident)
    }

    /// All incidents in the order they were reported
    pub async fn list(&self) -> DrcsResult<Vec<Incident>> {
        self.store.list_incidents().await
    }

    pub async fn get(&self, incident_id: &str) -> DrcsResult<Incident> {
        self.store.get_incident(incident_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::DrcsError;

    fn request(description: &str, reporter: &str, lat: f64, lng: f64) -> ReportIncidentRequest {
        ReportIncidentRequest {
            description: description.to_string(),
            reporter: reporter.to_string(),
            coordinates: Coordinates::new(lat, lng),
        }
    }

    #[tokio::test]
    async fn test_report_creates_unprocessed_incident() {
        let ingestion = IncidentIngestion::new(Arc::new(MemoryStore::new()));
        let incident = ingestion
            .report(request("Flooding near bridge", "Volunteer_04", 34.05, -118.24))
            .await
            .unwrap();

        assert!(!incident.is_analyzed);
        assert!(!incident.is_converted_to_task);
        assert_eq!(incident.coordinates, Coordinates::new(34.05, -118.24));
        assert_eq!(ingestion.get(&incident.id).await.unwrap(), incident);
    }

    #[tokio::test]
    async fn test_report_rejects_blank_input() {
        let ingestion = IncidentIngestion::new(Arc::new(MemoryStore::new()));

        let err = ingestion.report(request("", "Volunteer_04", 34.0, -118.0)).await.unwrap_err();
        assert!(matches!(err, DrcsError::Validation { .. }));

        let err = ingestion.report(request("Fire", "   ", 34.0, -118.0)).await.unwrap_err();
        assert!(matches!(err, DrcsError::Validation { .. }));

        let err = ingestion.report(request("Fire", "S. Patel", 123.0, -118.0)).await.unwrap_err();
        assert!(matches!(err, DrcsError::Validation { .. }));

        assert!(ingestion.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_each_report_gets_fresh_id() {
        let ingestion = IncidentIngestion::new(Arc::new(MemoryStore::new()));
        let a = ingestion.report(request("one", "r", 0.0, 0.0)).await.unwrap();
        let b = ingestion.report(request("one", "r", 0.0, 0.0)).await.unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(ingestion.list().await.unwrap().len(), 2);
    }
}
