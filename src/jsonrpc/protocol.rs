//! JSON-RPC 2.0 message types
//!
//! Only what the coordination server needs: requests, responses and error
//! objects. There are no server-initiated notifications.

use serde::{Deserialize, Serialize};

use crate::DrcsError;

/// JSON-RPC 2.0 Request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
    /// Request ID (string, number, or absent for notifications)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 Response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 Error object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// Standard JSON-RPC 2.0 error codes
pub mod error_codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
}

impl JsonRpcRequest {
    pub fn new(method: impl Into<String>, params: Option<serde_json::Value>, id: Option<serde_json::Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            method: method.into(),
            params,
            id,
        }
    }

    /// Create a notification (request without id)
    pub fn notification(method: impl Into<String>, params: Option<serde_json::Value>) -> Self {
        Self::new(method, params, None)
    }

    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }

    /// Validate the request envelope
    pub fn validate(&self) -> Result<(), JsonRpcError> {
        if self.jsonrpc != "2.0" {
            return Err(JsonRpcError::custom(
                error_codes::INVALID_REQUEST,
                "Invalid JSON-RPC version".to_string(),
                None,
            ));
        }

        if self.method.is_empty() {
            return Err(JsonRpcError::custom(
                error_codes::INVALID_REQUEST,
                "Method name cannot be empty".to_string(),
                None,
            ));
        }

        if self.method.starts_with("rpc.") {
            return Err(JsonRpcError::custom(
                error_codes::INVALID_REQUEST,
                "Method names starting with 'rpc.' are reserved".to_string(),
                None,
            ));
        }

        Ok(())
    }
}

impl JsonRpcResponse {
    pub fn success(result: serde_json::Value, id: Option<serde_json::Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    pub fn error(error: JsonRpcError, id: Option<serde_json::Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(error),
            id,
        }
    }

    pub fn parse_error() -> Self {
        Self::error(
            JsonRpcError::custom(error_codes::PARSE_ERROR, "Parse error".to_string(), None),
            None,
        )
    }

    pub fn method_not_found(method: &str, id: Option<serde_json::Value>) -> Self {
        Self::error(
            JsonRpcError::custom(
                error_codes::METHOD_NOT_FOUND,
                "Method not found".to_string(),
                Some(serde_json::json!({ "method": method })),
            ),
            id,
        )
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

impl JsonRpcError {
    pub fn custom(code: i32, message: String, data: Option<serde_json::Value>) -> Self {
        Self { code, message, data }
    }

    pub fn internal(message: impl std::fmt::Display) -> Self {
        Self::custom(error_codes::INTERNAL_ERROR, format!("Internal error: {}", message), None)
    }
}

/// Domain errors keep their code and carry a stable kind tag in `data`.
impl From<DrcsError> for JsonRpcError {
    fn from(error: DrcsError) -> Self {
        let kind = match &error {
            DrcsError::Validation { .. } => "validation",
            DrcsError::NotFound { .. } => "not_found",
            DrcsError::Conflict { .. } => "conflict",
            DrcsError::AnalysisInFlight(_) => "analysis_in_flight",
            DrcsError::Gateway { .. } => "gateway",
            DrcsError::RoleRequired { .. } => "role_required",
            DrcsError::Configuration { .. } => "configuration",
            DrcsError::Transport { .. } => "transport",
            DrcsError::Internal(_) => "internal",
            DrcsError::Io { .. } => "io",
            DrcsError::Serialization { .. } => "serialization",
        };

        let mut data = serde_json::json!({ "kind": kind });
        if let DrcsError::RoleRequired { required, current } = &error {
            data["required"] = serde_json::json!(required);
            data["current"] = serde_json::json!(current);
        }

        JsonRpcError {
            code: error.error_code(),
            message: error.user_message(),
            data: Some(data),
        }
    }
}
