//! Gemini `generateContent` backend with a JSON response schema.

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use super::{analysis_prompt, AnalysisGateway, GatewayError};
use crate::config::settings::AnalysisConfig;
use crate::models::Assessment;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

pub struct GeminiGateway {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiGateway {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Unavailable(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key,
        })
    }

    pub fn from_settings(config: &AnalysisConfig) -> Result<Self, GatewayError> {
        Self::new(
            config.base_url.clone(),
            config.model.clone(),
            config.api_key.clone().filter(|k| !k.is_empty()),
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn generate_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

fn assessment_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "type": {
                "type": "STRING",
                "description": "The nature of the disaster (e.g., Flood, Fire, Earthquake)."
            },
            "severity_score": {
                "type": "NUMBER",
                "description": "A score from 1 to 10 evaluating the scale of impact."
            },
            "urgency": {
                "type": "STRING",
                "description": "Categorical urgency: High, Med, or Low."
            },
            "suggested_action": {
                "type": "STRING",
                "description": "Immediate recommended action for responders."
            }
        },
        "required": ["type", "severity_score", "urgency", "suggested_action"]
    })
}

/// Decode the model's JSON text into an assessment.
pub fn parse_assessment(text: &str) -> Result<Assessment, GatewayError> {
    let value: serde_json::Value = serde_json::from_str(text.trim())
        .map_err(|e| GatewayError::Parse(format!("model output is not JSON: {}", e)))?;
    serde_json::from_value(value).map_err(|e| GatewayError::Schema(e.to_string()))
}

#[async_trait]
impl AnalysisGateway for GeminiGateway {
    async fn analyze(&self, description: &str) -> Result<Assessment, GatewayError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| GatewayError::Unavailable("no API key configured".to_string()))?;

        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(analysis_prompt(description)),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: assessment_schema(),
            },
        };

        debug!(model = %self.model, "Sending analysis request");

        let response = self
            .client
            .post(self.generate_url())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    warn!(status, "Failed to read error body: {}", e);
                    format!("<error body unreadable: {}>", e)
                }
            };
            warn!(status, "Analysis request rejected by provider");
            return Err(GatewayError::Http { status, body });
        }

        let generated: GenerateResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Parse(e.to_string()))?;

        let text = generated
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().find_map(|p| p.text))
            .ok_or_else(|| GatewayError::Parse("no text candidate in response".to_string()))?;

        parse_assessment(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assessment() {
        let text = r#"{"type":"Flood","severity_score":7,"urgency":"High","suggested_action":"Deploy boats"}"#;
        let assessment = parse_assessment(text).unwrap();
        assert_eq!(assessment, Assessment::new("Flood", 7.0, "High", "Deploy boats"));
    }

    #[test]
    fn test_parse_rejects_non_json() {
        assert!(matches!(parse_assessment("Sorry, I can't"), Err(GatewayError::Parse(_))));
    }

    #[test]
    fn test_parse_rejects_missing_fields() {
        let text = r#"{"type":"Flood","urgency":"High"}"#;
        assert!(matches!(parse_assessment(text), Err(GatewayError::Schema(_))));
    }

    #[test]
    fn test_generate_url() {
        let gateway = GeminiGateway::new(
            "http://localhost:9000/v1beta/",
            "gemini-test",
            None,
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(gateway.generate_url(), "http://localhost:9000/v1beta/models/gemini-test:generateContent");
        assert_eq!(gateway.model(), "gemini-test");
    }

    #[tokio::test]
    async fn test_missing_api_key_is_unavailable() {
        let gateway = GeminiGateway::new(DEFAULT_BASE_URL, DEFAULT_MODEL, None, Duration::from_secs(5)).unwrap();
        let result = gateway.analyze("Flooding near bridge").await;
        assert!(matches!(result, Err(GatewayError::Unavailable(_))));
    }
}
