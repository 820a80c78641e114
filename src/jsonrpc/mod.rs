//! JSON-RPC 2.0 surface for DRCS
//!
//! LSP-style Content-Length framing over stdio or a Unix socket. Every
//! session-visible action is one `drcs/*` method; params are the raw request
//! types, results are the raw domain types.

pub mod methods;
pub mod protocol;
pub mod server;
pub mod transport;

pub use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
pub use server::{JsonRpcServer, MethodHandler, MethodRegistry};
pub use transport::{FramedTransport, IpcServerTransport, IpcTransport, StdioTransport, Transport, TransportConfig};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;

use crate::handlers::{BroadcastRequest, ClaimTaskRequest, ConvertTaskRequest, Dashboard, ReportIncidentRequest};
use crate::DrcsResult;
use methods::*;

/// Params for methods that take none
#[derive(Debug, Default, Deserialize)]
pub struct NoParams {}

/// Build the method table for a dashboard
pub fn register_drcs_methods(registry: &mut MethodRegistry, dashboard: Arc<Dashboard>) {
    register(registry, &dashboard, LOGIN, |d: Arc<Dashboard>, p: LoginParams| async move {
        d.login(p.role).await
    });
    register(registry, &dashboard, LOGOUT, |d: Arc<Dashboard>, _: NoParams| async move {
        Ok::<_, crate::DrcsError>(d.logout().await)
    });
    register(registry, &dashboard, SESSION, |d: Arc<Dashboard>, _: NoParams| async move {
        Ok::<_, crate::DrcsError>(d.session().await)
    });
    register(registry, &dashboard, REPORT_INCIDENT, |d: Arc<Dashboard>, p: ReportIncidentRequest| async move {
        d.report_incident(p).await
    });
    register(registry, &dashboard, LIST_INCIDENTS, |d: Arc<Dashboard>, _: NoParams| async move {
        d.list_incidents().await
    });
    register(registry, &dashboard, REQUEST_ANALYSIS, |d: Arc<Dashboard>, p: IncidentParams| async move {
        d.request_analysis(&p.incident_id).await
    });
    register(registry, &dashboard, CONVERT_TO_TASK, |d: Arc<Dashboard>, p: ConvertTaskRequest| async move {
        d.convert_to_task(p).await
    });
    register(registry, &dashboard, LIST_TASKS, |d: Arc<Dashboard>, _: NoParams| async move {
        d.list_tasks().await
    });
    register(registry, &dashboard, LIST_OPEN_TASKS, |d: Arc<Dashboard>, _: NoParams| async move {
        d.list_open_tasks().await
    });
    register(registry, &dashboard, CLAIM_TASK, |d: Arc<Dashboard>, p: ClaimTaskRequest| async move {
        d.claim_task(p).await
    });
    register(registry, &dashboard, MY_TASKS, |d: Arc<Dashboard>, p: NgoParams| async move {
        d.my_tasks(p.ngo_id.as_deref()).await
    });
    register(registry, &dashboard, GET_NGO_PROFILE, |d: Arc<Dashboard>, p: NgoParams| async move {
        d.get_ngo_profile(p.ngo_id.as_deref()).await
    });
    register(registry, &dashboard, SET_VOLUNTEER_COUNT, |d: Arc<Dashboard>, p: VolunteerCountParams| async move {
        d.set_volunteer_count(p.ngo_id.as_deref(), p.count).await
    });
    register(registry, &dashboard, ADJUST_VOLUNTEERS, |d: Arc<Dashboard>, p: AdjustVolunteersParams| async move {
        d.adjust_volunteers(p.ngo_id.as_deref(), p.delta).await
    });
    register(registry, &dashboard, BROADCAST, |d: Arc<Dashboard>, p: BroadcastRequest| async move {
        d.broadcast(p).await
    });
    register(registry, &dashboard, OVERVIEW, |d: Arc<Dashboard>, _: NoParams| async move {
        d.overview().await
    });

    tracing::info!("Registered {} DRCS JSON-RPC methods", ALL_METHODS.len());
}

/// Registry with every DRCS method bound to `dashboard`
pub fn drcs_registry(dashboard: Arc<Dashboard>) -> MethodRegistry {
    let mut registry = MethodRegistry::new();
    register_drcs_methods(&mut registry, dashboard);
    registry
}

fn register<P, R, F, Fut>(registry: &mut MethodRegistry, dashboard: &Arc<Dashboard>, method: &str, call: F)
where
    P: DeserializeOwned + Send + 'static,
    R: Serialize + Send + 'static,
    F: Fn(Arc<Dashboard>, P) -> Fut + Send + Sync + Clone + 'static,
    Fut: Future<Output = DrcsResult<R>> + Send + 'static,
{
    let dashboard = dashboard.clone();
    registry.register_async_method(method, move |params| {
        let dashboard = dashboard.clone();
        let call = call.clone();
        async move {
            let request: P = parse_params(params)?;
            let response = call(dashboard, request).await.map_err(JsonRpcError::from)?;
            serde_json::to_value(response)
                .map_err(|e| JsonRpcError::internal(format!("Failed to serialize response: {}", e)))
        }
    });
}

/// Missing or null params read as an empty object
fn parse_params<T: DeserializeOwned>(params: Option<serde_json::Value>) -> Result<T, JsonRpcError> {
    let params_value = match params {
        None | Some(serde_json::Value::Null) => serde_json::json!({}),
        Some(value) => value,
    };
    serde_json::from_value(params_value.clone()).map_err(|e| create_parse_error::<T>(&e, &params_value))
}

fn create_parse_error<T>(error: &serde_json::Error, params: &serde_json::Value) -> JsonRpcError {
    let type_name = std::any::type_name::<T>()
        .rsplit("::")
        .next()
        .unwrap_or("Request");

    let received_fields: Vec<&str> = match params {
        serde_json::Value::Object(map) => map.keys().map(|s| s.as_str()).collect(),
        _ => vec![],
    };

    let hint = if received_fields.is_empty() {
        "No parameters provided".to_string()
    } else {
        format!("Received fields: {}", received_fields.join(", "))
    };

    JsonRpcError::custom(
        protocol::error_codes::INVALID_PARAMS,
        format!("Invalid {}: {}. {}", type_name, error, hint),
        Some(serde_json::json!({
            "parse_error": error.to_string(),
            "received": params,
        })),
    )
}
