//! Shared fixtures for the integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use drcs::config::ServerSettings;
use drcs::gateway::{AnalysisGateway, GatewayError};
use drcs::handlers::Dashboard;
use drcs::jsonrpc::{drcs_registry, JsonRpcRequest, JsonRpcResponse, MethodRegistry};
use drcs::models::Assessment;
use drcs::store::{MemoryStore, Repository};

/// Deterministic gateway: fixed outcome, optional latency, call counter
pub struct StubGateway {
    outcome: Result<Assessment, GatewayError>,
    delay: Duration,
    calls: AtomicUsize,
}

impl StubGateway {
    pub fn returning(assessment: Assessment) -> Self {
        Self {
            outcome: Ok(assessment),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(error: GatewayError) -> Self {
        Self {
            outcome: Err(error),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnalysisGateway for StubGateway {
    async fn analyze(&self, _description: &str) -> Result<Assessment, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.outcome.clone()
    }
}

pub fn flood_assessment() -> Assessment {
    Assessment::new("Flood", 7.0, "High", "Deploy boats")
}

/// Defaults with the synthetic feed off so stores stay predictable
pub fn test_settings() -> ServerSettings {
    let mut settings = ServerSettings::default();
    settings.simulation.enabled = false;
    settings
}

/// Dashboard over an empty store (no demo data)
pub async fn empty_dashboard(gateway: Arc<dyn AnalysisGateway>) -> (Arc<MemoryStore>, Arc<Dashboard>) {
    let mut settings = test_settings();
    settings.seed.enabled = false;
    let store = Arc::new(MemoryStore::new());
    let dashboard = Dashboard::bootstrap(store.clone() as Arc<dyn Repository>, gateway, &settings)
        .await
        .expect("bootstrap");
    (store, Arc::new(dashboard))
}

/// Dashboard over the demo fixtures
pub async fn seeded_dashboard(gateway: Arc<dyn AnalysisGateway>) -> Arc<Dashboard> {
    let store: Arc<dyn Repository> = Arc::new(MemoryStore::new());
    let dashboard = Dashboard::bootstrap(store, gateway, &test_settings())
        .await
        .expect("bootstrap");
    Arc::new(dashboard)
}

/// Registry-backed JSON-RPC client with auto-incrementing ids
pub struct RpcHarness {
    registry: MethodRegistry,
    next_id: AtomicUsize,
}

impl RpcHarness {
    pub fn new(dashboard: Arc<Dashboard>) -> Self {
        Self {
            registry: drcs_registry(dashboard),
            next_id: AtomicUsize::new(1),
        }
    }

    pub async fn call(&self, method: &str, params: Value) -> JsonRpcResponse {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let params = if params.is_null() { None } else { Some(params) };
        let request = JsonRpcRequest::new(method, params, Some(json!(id)));
        self.registry
            .dispatch(request)
            .await
            .expect("requests with an id always get a response")
    }

    /// Call and unwrap the result, panicking with the error object otherwise
    pub async fn ok(&self, method: &str, params: Value) -> Value {
        let response = self.call(method, params).await;
        match (response.result, response.error) {
            (Some(result), None) => result,
            (_, error) => panic!("{} failed: {:?}", method, error),
        }
    }

    /// Call and return the error code, panicking on success
    pub async fn error_code(&self, method: &str, params: Value) -> i32 {
        let response = self.call(method, params).await;
        match response.error {
            Some(error) => error.code,
            None => panic!("{} unexpectedly succeeded: {:?}", method, response.result),
        }
    }
}
