//! DRCS JSON-RPC server bootstrap

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{
    config::ServerSettings,
    gateway::{gemini::GeminiGateway, AnalysisGateway},
    handlers::Dashboard,
    jsonrpc::{drcs_registry, JsonRpcServer, TransportConfig},
    store::{MemoryStore, Repository},
};

/// Pick the transport: an explicit override wins over the settings
pub fn resolve_transport(settings: &ServerSettings, transport: Option<TransportConfig>) -> Result<TransportConfig> {
    match transport {
        Some(transport) => Ok(transport),
        None => TransportConfig::from_parts(&settings.server.transport, settings.server.socket_path.as_deref()),
    }
}

/// Fresh in-memory store, Gemini gateway and seeded dashboard
pub async fn build_dashboard(settings: &ServerSettings) -> Result<Arc<Dashboard>> {
    let store: Arc<dyn Repository> = Arc::new(MemoryStore::new());

    let gateway = GeminiGateway::from_settings(&settings.analysis).context("Failed to build analysis gateway")?;
    if settings.analysis.api_key.is_none() {
        warn!("No API key configured; AI analysis requests will fail until one is set");
    }
    debug!(model = gateway.model(), "Analysis gateway ready");
    let gateway: Arc<dyn AnalysisGateway> = Arc::new(gateway);

    let dashboard = Dashboard::bootstrap(store, gateway, settings)
        .await
        .context("Failed to prepare dashboard state")?;
    Ok(Arc::new(dashboard))
}

/// Create and run the DRCS JSON-RPC server until the client disconnects or
/// the process is interrupted.
pub async fn start_server(settings: ServerSettings, transport: Option<TransportConfig>) -> Result<()> {
    validate_server_settings(&settings)?;
    let transport = resolve_transport(&settings, transport)?;

    let dashboard = build_dashboard(&settings).await?;
    let registry = drcs_registry(dashboard.clone());
    let mut server = JsonRpcServer::new(transport.clone(), registry).await?;

    info!("Starting DRCS JSON-RPC server with {} transport", transport.description());

    let result = tokio::select! {
        result = server.start() => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupt received, shutting down");
            Ok(())
        }
    };

    dashboard.shutdown().await;
    if let Err(e) = server.stop().await {
        debug!("Transport close failed: {}", e);
    }

    info!("DRCS JSON-RPC server stopped");
    result
}

/// Validate settings before starting
pub fn validate_server_settings(settings: &ServerSettings) -> Result<()> {
    settings.validate()?;

    match settings.server.transport.as_str() {
        "stdio" => debug!("Using stdio transport - no additional validation needed"),
        _ => debug!("Using Unix socket transport: {:?}", settings.server.socket_path),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserRole;

    fn test_settings() -> ServerSettings {
        let mut settings = ServerSettings::default();
        settings.simulation.enabled = false;
        settings
    }

    #[test]
    fn test_validate_server_settings() {
        let settings = test_settings();
        assert!(validate_server_settings(&settings).is_ok());

        let mut invalid = settings.clone();
        invalid.server.transport = "invalid".to_string();
        assert!(validate_server_settings(&invalid).is_err());

        let mut socket = settings.clone();
        socket.server.transport = "socket".to_string();
        socket.server.socket_path = None;
        assert!(validate_server_settings(&socket).is_err());

        socket.server.socket_path = Some("/tmp/drcs-test.sock".to_string());
        assert!(validate_server_settings(&socket).is_ok());
    }

    #[test]
    fn test_resolve_transport_prefers_override() {
        let mut settings = test_settings();
        settings.server.transport = "socket".to_string();
        settings.server.socket_path = Some("/tmp/from-config.sock".to_string());

        assert_eq!(
            resolve_transport(&settings, None).unwrap(),
            TransportConfig::UnixSocket { path: "/tmp/from-config.sock".to_string() }
        );
        assert_eq!(resolve_transport(&settings, Some(TransportConfig::Stdio)).unwrap(), TransportConfig::Stdio);
    }

    #[tokio::test]
    async fn test_build_dashboard_seeds_store() {
        let dashboard = build_dashboard(&test_settings()).await.unwrap();
        let overview = dashboard.overview().await.unwrap();

        assert_eq!(overview.incidents, 2);
        assert_eq!(overview.tasks, 1);
        assert_eq!(overview.role, UserRole::Unauthenticated);
    }

    #[tokio::test]
    async fn test_build_dashboard_without_seed() {
        let mut settings = test_settings();
        settings.seed.enabled = false;
        let dashboard = build_dashboard(&settings).await.unwrap();

        assert_eq!(dashboard.overview().await.unwrap().incidents, 0);
        dashboard.login(UserRole::Ngo).await.unwrap();
        assert_eq!(dashboard.get_ngo_profile(None).await.unwrap().id, "ngo-99");
    }
}
