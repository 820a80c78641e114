//! Analysis gateway: turns a free-text incident description into a
//! structured [`Assessment`].
//!
//! The gateway is an external collaborator. Controllers depend only on the
//! [`AnalysisGateway`] trait; [`GeminiGateway`] is the HTTP implementation.

use async_trait::async_trait;

use crate::models::Assessment;

pub mod gemini;

pub use gemini::GeminiGateway;

/// Failure modes of an analysis call. None of them carry a fallback result.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GatewayError {
    /// Gateway is not configured (e.g. no API key)
    #[error("Gateway unavailable: {0}")]
    Unavailable(String),

    #[error("Network error: {0}")]
    Network(String),

    /// Non-success HTTP status from the provider
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Response body or payload was not valid JSON
    #[error("Parse error: {0}")]
    Parse(String),

    /// JSON was valid but did not match the assessment schema
    #[error("Schema violation: {0}")]
    Schema(String),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnalysisGateway: Send + Sync {
    async fn analyze(&self, description: &str) -> Result<Assessment, GatewayError>;
}

/// Build the prompt sent to the model for one report.
pub fn analysis_prompt(description: &str) -> String {
    format!(
        "Analyze this disaster report: \"{}\". Return a structured assessment.",
        description
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_quotes_description() {
        let prompt = analysis_prompt("Flooding near bridge");
        assert_eq!(
            prompt,
            "Analyze this disaster report: \"Flooding near bridge\". Return a structured assessment."
        );
    }

    #[test]
    fn test_error_display() {
        let err = GatewayError::Http { status: 503, body: "overloaded".to_string() };
        assert_eq!(err.to_string(), "HTTP 503: overloaded");
    }
}
