//! JSON-RPC server implementation with method dispatch
//!
//! The registry maps method names to async handlers and turns a request into
//! an optional response. The server owns one transport and pumps requests
//! through the registry until the peer goes away.

use crate::jsonrpc::{
    protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse},
    transport::{ConnectionClosed, Transport, TransportConfig},
};
use anyhow::{anyhow, Result};
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, instrument, warn};

/// Method handler function signature
/// Takes JSON parameters and returns a JSON result
pub type MethodHandler = Arc<
    dyn Fn(Option<serde_json::Value>) -> BoxFuture<'static, Result<serde_json::Value, JsonRpcError>>
        + Send
        + Sync,
>;

/// Name to handler table, usable without a transport
#[derive(Default, Clone)]
pub struct MethodRegistry {
    methods: HashMap<String, MethodHandler>,
}

impl MethodRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an async method handler with error conversion
    pub fn register_async_method<F, Fut, E>(&mut self, method_name: &str, handler: F)
    where
        F: Fn(Option<serde_json::Value>) -> Fut + Send + Sync + 'static + Clone,
        Fut: std::future::Future<Output = Result<serde_json::Value, E>> + Send + 'static,
        E: Into<JsonRpcError> + Send + 'static,
    {
        let wrapped_handler: MethodHandler = Arc::new(move |params| {
            let handler_clone = handler.clone();
            Box::pin(async move { handler_clone(params).await.map_err(Into::into) })
        });

        self.methods.insert(method_name.to_string(), wrapped_handler);
        debug!("Registered async method: {}", method_name);
    }

    pub fn contains(&self, method_name: &str) -> bool {
        self.methods.contains_key(method_name)
    }

    /// Registered method names, sorted
    pub fn method_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.methods.keys().cloned().collect();
        names.sort();
        names
    }

    /// Process a request and return a response unless it was a notification
    #[instrument(skip(self, request), fields(method = %request.method))]
    pub async fn dispatch(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let request_id = request.id.clone();
        let is_notification = request.is_notification();

        if let Err(error) = request.validate() {
            if is_notification {
                warn!("Invalid notification: {}", error.message);
                return None;
            }
            return Some(JsonRpcResponse::error(error, request_id));
        }

        let Some(handler) = self.methods.get(&request.method).cloned() else {
            if is_notification {
                warn!("Method not found for notification: {}", request.method);
                return None;
            }
            return Some(JsonRpcResponse::method_not_found(&request.method, request_id));
        };

        match handler(request.params).await {
            Ok(result) if !is_notification => Some(JsonRpcResponse::success(result, request_id)),
            Ok(_) => None,
            Err(error) => {
                debug!(code = error.code, "Method failed: {}", error.message);
                if is_notification {
                    error!("Error in notification handler for {}: {}", request.method, error.message);
                    None
                } else {
                    Some(JsonRpcResponse::error(error, request_id))
                }
            }
        }
    }
}

/// JSON-RPC server
///
/// Each request is dispatched on its own task, so a slow method (an
/// analysis waiting on the gateway) does not hold up the others. Responses
/// come back through a channel and are written in completion order.
pub struct JsonRpcServer {
    transport: Box<dyn Transport>,
    registry: Arc<MethodRegistry>,
    running: Arc<Mutex<bool>>,
}

impl JsonRpcServer {
    /// Create a new JSON-RPC server with the specified transport
    pub async fn new(transport_config: TransportConfig, registry: MethodRegistry) -> Result<Self> {
        let transport = transport_config.create_transport().await?;
        Ok(Self::with_transport(transport, registry))
    }

    pub fn with_transport(transport: Box<dyn Transport>, registry: MethodRegistry) -> Self {
        Self {
            transport,
            registry: Arc::new(registry),
            running: Arc::new(Mutex::new(false)),
        }
    }

    /// Serve requests until the peer closes the connection
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> Result<()> {
        let running = self.running.clone();
        {
            let mut running = running.lock().await;
            if *running {
                return Err(anyhow!("Server is already running"));
            }
            *running = true;
        }

        info!("Starting JSON-RPC server with {} transport", self.transport.description());

        let (responses, mut outbox) = mpsc::unbounded_channel::<(u64, JsonRpcResponse)>();

        while *running.lock().await {
            tokio::select! {
                read = self.transport.read_request() => match read {
                    Ok(request) => self.spawn_dispatch(request, responses.clone()),
                    Err(e) if e.is::<ConnectionClosed>() => {
                        info!("Client closed the connection");
                        break;
                    }
                    Err(e) => {
                        error!("Failed to read request: {}", e);
                        if let Err(e) = self.transport.write_response(JsonRpcResponse::parse_error()).await {
                            error!("Failed to send parse error: {}", e);
                        }
                    }
                },
                Some((connection, response)) = outbox.recv() => {
                    if connection != self.transport.connection_id() {
                        debug!("Dropping response for a disconnected client: id={:?}", response.id);
                    } else if let Err(e) = self.transport.write_response(response).await {
                        error!("Failed to send response: {}", e);
                    }
                }
            }
        }

        // Requests already accepted still get their answers while the writer is open
        drop(responses);
        while let Some((connection, response)) = outbox.recv().await {
            if connection != self.transport.connection_id() {
                continue;
            }
            if let Err(e) = self.transport.write_response(response).await {
                debug!("Dropping pending responses: {}", e);
                break;
            }
        }

        *running.lock().await = false;
        info!("JSON-RPC server stopped");
        Ok(())
    }

    /// Stop the server and close the transport
    pub async fn stop(&mut self) -> Result<()> {
        *self.running.lock().await = false;
        self.transport.close().await?;
        info!("JSON-RPC server stopped");
        Ok(())
    }

    fn spawn_dispatch(&self, request: JsonRpcRequest, responses: mpsc::UnboundedSender<(u64, JsonRpcResponse)>) {
        debug!("Received request: method={}, id={:?}", request.method, request.id);
        let connection = self.transport.connection_id();
        let registry = self.registry.clone();
        tokio::spawn(async move {
            if let Some(response) = registry.dispatch(request).await {
                if responses.send((connection, response)).is_err() {
                    debug!("Server stopped before the response was written");
                }
            }
        });
    }
}
