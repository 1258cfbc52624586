//! Gemini API client for structured itinerary generation
//!
//! Uses a long-lived reqwest::Client for connection pooling.
//! One request per call; failures are returned immediately.

use crate::error::{ProviderError, ProviderErrorKind};
use crate::request::ProviderRequest;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{error, info};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl GeminiSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Reusable Gemini client (connection-pooled)
pub struct GeminiClient {
    client: Client,
    settings: GeminiSettings,
}

impl GeminiClient {
    pub fn new(settings: GeminiSettings) -> crate::Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .timeout(settings.timeout)
            .build()?;

        Ok(Self { client, settings })
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.settings.base_url.trim_end_matches('/'),
            self.settings.model
        )
    }

    /// Send one structured-output request and return the raw response text
    pub async fn generate_structured(
        &self,
        request: &ProviderRequest,
    ) -> Result<String, ProviderError> {
        let body = GeminiRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: request.prompt.clone(),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: request.response_mime_type.clone(),
                response_schema: request.response_schema.clone(),
                temperature: request.temperature,
            },
        };

        info!(model = %self.settings.model, "Calling Gemini API");

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.settings.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("Gemini API request failed: {}", e);
                if e.is_timeout() {
                    ProviderError::transport(format!(
                        "timed out after {:?}",
                        self.settings.timeout
                    ))
                } else {
                    ProviderError::transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), "Gemini API error response: {}", error_text);
            return Err(ProviderError::api(status.as_u16(), &error_text));
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            error!("Failed to parse Gemini envelope: {}", e);
            ProviderError::new(ProviderErrorKind::Malformed, e.to_string())
        })?;

        let candidate = gemini_response.candidates.into_iter().next().ok_or_else(|| {
            ProviderError::new(ProviderErrorKind::EmptyResponse, "no candidates returned")
        })?;

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(ProviderError::new(
                ProviderErrorKind::EmptyResponse,
                format!(
                    "empty candidate (finish reason: {})",
                    candidate.finish_reason.as_deref().unwrap_or("unknown")
                ),
            ));
        }

        if let Some(usage) = gemini_response.usage_metadata {
            info!(
                prompt_tokens = usage.prompt_token_count,
                output_tokens = usage.candidates_token_count,
                "Gemini response received"
            );
        }

        Ok(text)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: Value,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: i64,
    #[serde(default)]
    candidates_token_count: i64,
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::jaipur_preferences;
    use axum::http::StatusCode;

    fn settings(base_url: String) -> GeminiSettings {
        GeminiSettings {
            base_url,
            ..GeminiSettings::new("test-key")
        }
    }

    #[test]
    fn test_request_serialization() {
        let request = crate::request::build(&jaipur_preferences());
        let body = GeminiRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: request.prompt.clone(),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: request.response_mime_type.clone(),
                response_schema: request.response_schema.clone(),
                temperature: request.temperature,
            },
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(json["generationConfig"]["responseSchema"]["type"], "OBJECT");
        assert!(json["contents"][0]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .contains("Jaipur"));
    }

    #[tokio::test]
    async fn test_generate_returns_candidate_text() {
        let base = stub::serve(StatusCode::OK, stub::envelope("{\"ok\":true}")).await;
        let client = GeminiClient::new(settings(base)).unwrap();
        let request = crate::request::build(&jaipur_preferences());

        let text = client.generate_structured(&request).await.unwrap();
        assert_eq!(text, "{\"ok\":true}");
    }

    #[tokio::test]
    async fn test_api_error_status() {
        let base = stub::serve(
            StatusCode::FORBIDDEN,
            serde_json::json!({ "error": { "message": "API key not valid" } }),
        )
        .await;
        let client = GeminiClient::new(settings(base)).unwrap();
        let request = crate::request::build(&jaipur_preferences());

        let err = client.generate_structured(&request).await.unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::Api);
        assert!(err.message.contains("403"));
    }

    #[tokio::test]
    async fn test_no_candidates_is_empty_response() {
        let base = stub::serve(StatusCode::OK, serde_json::json!({ "candidates": [] })).await;
        let client = GeminiClient::new(settings(base)).unwrap();
        let request = crate::request::build(&jaipur_preferences());

        let err = client.generate_structured(&request).await.unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::EmptyResponse);
    }

    #[tokio::test]
    async fn test_timeout_is_transport_failure() {
        let base = stub::serve_with_delay(
            StatusCode::OK,
            stub::envelope("{}"),
            Duration::from_millis(500),
        )
        .await;
        let client = GeminiClient::new(GeminiSettings {
            timeout: Duration::from_millis(50),
            ..settings(base)
        })
        .unwrap();
        let request = crate::request::build(&jaipur_preferences());

        let err = client.generate_structured(&request).await.unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::Transport);
    }
}
