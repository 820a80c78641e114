//! Role session: which portal is live for this connection.
//!
//! Selecting a role is a mode switch, not authentication. There is no
//! credential check and it must not be treated as an authorization boundary.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::info;

use super::ingestion::IncidentIngestion;
use crate::config::settings::SimulationConfig;
use crate::models::{Id, Timestamp, UserRole};
use crate::simulation::{FeedHandle, FeedRunner};
use crate::{DrcsError, DrcsResult};

/// Explicit per-connection session state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleSession {
    pub role: UserRole,
    pub since: Option<Timestamp>,
    /// NGO profile the NGO portal acts as
    pub ngo_id: Id,
}

impl RoleSession {
    pub fn new(ngo_id: impl Into<Id>) -> Self {
        Self {
            role: UserRole::Unauthenticated,
            since: None,
            ngo_id: ngo_id.into(),
        }
    }

    /// Any state may log in again; the new role replaces the old one.
    pub fn login(&mut self, role: UserRole) -> DrcsResult<()> {
        if !role.is_authenticated() {
            return Err(DrcsError::validation("cannot log in as UNAUTHENTICATED; use logout"));
        }
        self.role = role;
        self.since = Some(chrono::Utc::now());
        Ok(())
    }

    pub fn logout(&mut self) {
        self.role = UserRole::Unauthenticated;
        self.since = None;
    }

    pub fn is_active(&self) -> bool {
        self.role.is_authenticated()
    }

    pub fn require(&self, role: UserRole) -> DrcsResult<()> {
        if self.role != role {
            return Err(DrcsError::role_required(role, self.role));
        }
        Ok(())
    }
}

/// Owns the session and the synthetic feed tied to its lifetime
pub struct SessionController {
    session: RwLock<RoleSession>,
    feed: Mutex<Option<FeedHandle>>,
    ingestion: Arc<IncidentIngestion>,
    simulation: SimulationConfig,
}

impl SessionController {
    pub fn new(ngo_id: impl Into<Id>, ingestion: Arc<IncidentIngestion>, simulation: SimulationConfig) -> Self {
        Self {
            session: RwLock::new(RoleSession::new(ngo_id)),
            feed: Mutex::new(None),
            ingestion,
            simulation,
        }
    }

    pub async fn current(&self) -> RoleSession {
        self.session.read().await.clone()
    }

    pub async fn role(&self) -> UserRole {
        self.session.read().await.role
    }

    pub async fn require(&self, role: UserRole) -> DrcsResult<RoleSession> {
        let session = self.session.read().await;
        session.require(role)?;
        Ok(session.clone())
    }

    /// Switch portal. Starts the incident feed if it is not already running.
    pub async fn login(&self, role: UserRole) -> DrcsResult<RoleSession> {
        let mut feed = self.feed.lock().await;
        let snapshot = {
            let mut session = self.session.write().await;
            session.login(role)?;
            session.clone()
        };

        if self.simulation.enabled && feed.is_none() {
            *feed = Some(FeedRunner::spawn_synthetic(&self.simulation, self.ingestion.clone()));
        }

        info!(role = %role, "Session logged in");
        Ok(snapshot)
    }

    /// Back to UNAUTHENTICATED; the incident feed is stopped.
    pub async fn logout(&self) -> RoleSession {
        let mut feed = self.feed.lock().await;
        let snapshot = {
            let mut session = self.session.write().await;
            session.logout();
            session.clone()
        };

        if let Some(handle) = feed.take() {
            let ingested = handle.stop().await;
            info!(ingested, "Synthetic feed stopped with session");
        }

        info!("Session logged out");
        snapshot
    }

    pub async fn feed_running(&self) -> bool {
        self.feed.lock().await.as_ref().map_or(false, |h| !h.is_finished())
    }
}
