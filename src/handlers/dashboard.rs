//! Role-gated facade over the controllers. This is the surface the JSON-RPC
//! methods call into.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use super::government::{BroadcastReceipt, BroadcastRequest, ConvertTaskRequest, GovernmentController};
use super::ingestion::{IncidentIngestion, ReportIncidentRequest};
use super::ngo::{ClaimTaskRequest, NgoController, VolunteerDelta};
use super::session::{RoleSession, SessionController};
use crate::config::ServerSettings;
use crate::gateway::AnalysisGateway;
use crate::models::{Incident, NgoProfile, Task, TaskStatus, UserRole};
use crate::store::{fixtures, Repository};
use crate::{DrcsError, DrcsResult};

/// Headline counts shown on the command map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overview {
    pub role: UserRole,
    pub incidents: usize,
    pub unresolved_incidents: usize,
    pub analyzed_incidents: usize,
    pub tasks: usize,
    pub open_tasks: usize,
    pub claimed_tasks: usize,
}

pub struct Dashboard {
    store: Arc<dyn Repository>,
    sessions: SessionController,
    ingestion: Arc<IncidentIngestion>,
    government: GovernmentController,
    ngo: NgoController,
}

impl Dashboard {
    pub fn new(store: Arc<dyn Repository>, gateway: Arc<dyn AnalysisGateway>, settings: &ServerSettings) -> Self {
        let ingestion = Arc::new(IncidentIngestion::new(store.clone()));
        Self {
            sessions: SessionController::new(
                settings.session.ngo_id.clone(),
                ingestion.clone(),
                settings.simulation.clone(),
            ),
            government: GovernmentController::new(store.clone(), gateway),
            ngo: NgoController::new(store.clone()),
            ingestion,
            store,
        }
    }

    /// Build a dashboard and prepare its store: demo data when enabled, and
    /// the session's NGO profile when it is missing.
    pub async fn bootstrap(
        store: Arc<dyn Repository>,
        gateway: Arc<dyn AnalysisGateway>,
        settings: &ServerSettings,
    ) -> DrcsResult<Self> {
        if settings.seed.enabled {
            fixtures::seed(store.as_ref()).await?;
        }

        let ngo_id = &settings.session.ngo_id;
        match store.get_ngo(ngo_id).await {
            Ok(_) => {}
            Err(DrcsError::NotFound { .. }) => {
                store.insert_ngo(fixtures::default_ngo(ngo_id)).await?;
                info!(ngo_id = %ngo_id, "Created NGO profile for session");
            }
            Err(e) => return Err(e),
        }

        Ok(Self::new(store, gateway, settings))
    }

    pub async fn login(&self, role: UserRole) -> DrcsResult<RoleSession> {
        self.sessions.login(role).await
    }

    pub async fn logout(&self) -> RoleSession {
        self.sessions.logout().await
    }

    pub async fn session(&self) -> RoleSession {
        self.sessions.current().await
    }

    pub async fn feed_running(&self) -> bool {
        self.sessions.feed_running().await
    }

    /// Open to every role: reporters are not portal users
    pub async fn report_incident(&self, request: ReportIncidentRequest) -> DrcsResult<Incident> {
        self.ingestion.report(request).await
    }

    pub async fn list_incidents(&self) -> DrcsResult<Vec<Incident>> {
        self.sessions.require(UserRole::Government).await?;
        self.ingestion.list().await
    }

    pub async fn request_analysis(&self, incident_id: &str) -> DrcsResult<Incident> {
        self.sessions.require(UserRole::Government).await?;
        self.government.request_analysis(incident_id).await
    }

    pub async fn convert_to_task(&self, request: ConvertTaskRequest) -> DrcsResult<Task> {
        self.sessions.require(UserRole::Government).await?;
        self.government.convert_to_task(request).await
    }

    pub async fn list_tasks(&self) -> DrcsResult<Vec<Task>> {
        self.sessions.require(UserRole::Government).await?;
        self.government.list_tasks().await
    }

    pub async fn broadcast(&self, request: BroadcastRequest) -> DrcsResult<BroadcastReceipt> {
        self.sessions.require(UserRole::Government).await?;
        self.government.broadcast(request).await
    }

    pub async fn list_open_tasks(&self) -> DrcsResult<Vec<Task>> {
        self.sessions.require(UserRole::Ngo).await?;
        self.ngo.list_open().await
    }

    pub async fn claim_task(&self, request: ClaimTaskRequest) -> DrcsResult<Task> {
        let session = self.sessions.require(UserRole::Ngo).await?;
        self.ngo.handle_claim(request, &session.ngo_id).await
    }

    pub async fn my_tasks(&self, ngo_id: Option<&str>) -> DrcsResult<Vec<Task>> {
        let session = self.sessions.require(UserRole::Ngo).await?;
        self.ngo.my_tasks(ngo_id.unwrap_or(&session.ngo_id)).await
    }

    pub async fn get_ngo_profile(&self, ngo_id: Option<&str>) -> DrcsResult<NgoProfile> {
        let session = self.sessions.require(UserRole::Ngo).await?;
        self.ngo.get_profile(ngo_id.unwrap_or(&session.ngo_id)).await
    }

    pub async fn set_volunteer_count(&self, ngo_id: Option<&str>, count: i64) -> DrcsResult<NgoProfile> {
        let session = self.sessions.require(UserRole::Ngo).await?;
        self.ngo.set_volunteer_count(ngo_id.unwrap_or(&session.ngo_id), count).await
    }

    pub async fn adjust_volunteers(&self, ngo_id: Option<&str>, delta: VolunteerDelta) -> DrcsResult<NgoProfile> {
        let session = self.sessions.require(UserRole::Ngo).await?;
        self.ngo.adjust_volunteers(ngo_id.unwrap_or(&session.ngo_id), delta).await
    }

    pub async fn overview(&self) -> DrcsResult<Overview> {
        let incidents = self.store.list_incidents().await?;
        let tasks = self.store.list_tasks().await?;

        Ok(Overview {
            role: self.sessions.role().await,
            incidents: incidents.len(),
            unresolved_incidents: incidents.iter().filter(|i| i.is_unresolved()).count(),
            analyzed_incidents: incidents.iter().filter(|i| i.is_analyzed).count(),
            tasks: tasks.len(),
            open_tasks: tasks.iter().filter(|t| t.status == TaskStatus::Open).count(),
            claimed_tasks: tasks.iter().filter(|t| t.status == TaskStatus::Claimed).count(),
        })
    }

    /// Stop background work before the process exits.
    pub async fn shutdown(&self) {
        if self.sessions.feed_running().await {
            self.sessions.logout().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MockAnalysisGateway;
    use crate::models::Coordinates;
    use crate::store::MemoryStore;

    fn settings() -> ServerSettings {
        let mut settings = ServerSettings::default();
        settings.simulation.enabled = false;
        settings
    }

    async fn dashboard() -> Dashboard {
        let store: Arc<dyn Repository> = Arc::new(MemoryStore::new());
        Dashboard::bootstrap(store, Arc::new(MockAnalysisGateway::new()), &settings())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_bootstrap_seeds_and_creates_profile() {
        let dashboard = dashboard().await;
        let overview = dashboard.overview().await.unwrap();

        assert_eq!(overview.role, UserRole::Unauthenticated);
        assert_eq!(overview.incidents, 2);
        assert_eq!(overview.unresolved_incidents, 1);
        assert_eq!(overview.analyzed_incidents, 1);
        assert_eq!(overview.open_tasks, 1);

        dashboard.login(UserRole::Ngo).await.unwrap();
        let profile = dashboard.get_ngo_profile(None).await.unwrap();
        assert_eq!(profile.id, "ngo-99");
        assert_eq!(profile.active_volunteers, 12);
    }

    #[tokio::test]
    async fn test_role_gating() {
        let dashboard = dashboard().await;

        assert!(matches!(dashboard.list_incidents().await, Err(DrcsError::RoleRequired { .. })));
        assert!(matches!(dashboard.list_open_tasks().await, Err(DrcsError::RoleRequired { .. })));

        dashboard.login(UserRole::Ngo).await.unwrap();
        assert!(dashboard.list_open_tasks().await.is_ok());
        assert!(matches!(
            dashboard.request_analysis("inc-1").await,
            Err(DrcsError::RoleRequired { required: UserRole::Government, current: UserRole::Ngo })
        ));

        dashboard.login(UserRole::Government).await.unwrap();
        assert_eq!(dashboard.list_incidents().await.unwrap().len(), 2);
        assert!(dashboard.set_volunteer_count(None, 3).await.is_err());
    }

    #[tokio::test]
    async fn test_reporting_needs_no_role() {
        let dashboard = dashboard().await;
        let incident = dashboard
            .report_incident(ReportIncidentRequest {
                description: "Gas leak on 5th street".to_string(),
                reporter: "Resident".to_string(),
                coordinates: Coordinates::new(34.1, -118.3),
            })
            .await
            .unwrap();
        assert!(!incident.is_analyzed);
        assert_eq!(dashboard.overview().await.unwrap().incidents, 3);
    }

    #[tokio::test]
    async fn test_claim_uses_session_ngo() {
        let dashboard = dashboard().await;
        dashboard.login(UserRole::Ngo).await.unwrap();

        let task = dashboard
            .claim_task(ClaimTaskRequest { task_id: "task-1".to_string(), ngo_id: None })
            .await
            .unwrap();
        assert!(task.is_claimed_by("ngo-99"));
        assert_eq!(dashboard.my_tasks(None).await.unwrap().len(), 1);
        assert!(dashboard.list_open_tasks().await.unwrap().is_empty());
    }
}
