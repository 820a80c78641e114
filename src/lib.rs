//! DRCS - Disaster Response Coordination Server
//!
//! Coordinates incident triage between a government command portal and NGO
//! field partners. Exposes the session actions as JSON-RPC methods over
//! LSP-style framed transports.

pub mod cli;
pub mod config;
pub mod gateway;
pub mod handlers;
pub mod jsonrpc;
pub mod models;
pub mod server;
pub mod simulation;
pub mod store;

use gateway::GatewayError;
use models::UserRole;

/// Application-wide error types with context preservation
#[derive(Debug, thiserror::Error)]
pub enum DrcsError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Analysis already in flight for incident {0}")]
    AnalysisInFlight(String),

    #[error("Analysis gateway error: {source}")]
    Gateway {
        #[from]
        source: GatewayError,
    },

    #[error("Role {required} required, current role is {current}")]
    RoleRequired { required: UserRole, current: UserRole },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
}

impl DrcsError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Create a conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn role_required(required: UserRole, current: UserRole) -> Self {
        Self::RoleRequired { required, current }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Get error code for JSON-RPC responses
    pub fn error_code(&self) -> i32 {
        match self {
            DrcsError::Validation { .. } => -32602,
            DrcsError::NotFound { .. } => -32004,
            DrcsError::Conflict { .. } => -32009,
            DrcsError::AnalysisInFlight(_) => -32010,
            DrcsError::RoleRequired { .. } => -32011,
            DrcsError::Configuration { .. } => -32014,
            DrcsError::Gateway { .. } => -32020,
            DrcsError::Transport { .. } => -32001,
            DrcsError::Internal(_) => -32603,
            DrcsError::Io { .. } => -32603,
            DrcsError::Serialization { .. } => -32700,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            DrcsError::Validation { message } => format!("Invalid input: {}", message),
            DrcsError::NotFound { entity, id } => format!("{} not found: {}", entity, id),
            DrcsError::Conflict { message } => format!("Conflict: {}", message),
            DrcsError::AnalysisInFlight(id) => {
                format!("An analysis is already running for incident {}", id)
            }
            DrcsError::Gateway { source } => format!("AI analysis failed: {}", source),
            DrcsError::RoleRequired { required, current } => {
                format!("This action needs the {} portal (current: {})", required, current)
            }
            DrcsError::Configuration { message } => format!("Configuration issue: {}", message),
            DrcsError::Transport { message } => format!("Communication error: {}", message),
            DrcsError::Internal(message) => format!("Internal error: {}", message),
            DrcsError::Io { source } => format!("File system error: {}", source),
            DrcsError::Serialization { source } => format!("Data format error: {}", source),
        }
    }
}

/// Convenience type alias for Results
pub type DrcsResult<T> = Result<T, DrcsError>;
