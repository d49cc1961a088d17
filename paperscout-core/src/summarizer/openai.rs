//! OpenAI-compatible chat-completion summarization backend.
//!
//! Works with any server exposing `/chat/completions` (OpenAI, Azure proxies,
//! Ollama, vLLM).

use async_trait::async_trait;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

use super::{SummarizationBackend, describe_http_error, unavailable};
use crate::config::SummarizerConfig;
use crate::error::SummarizeError;
use crate::types::SummaryBudget;

const BACKEND: &str = "openai";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const SYSTEM_PROMPT: &str = "Summarize academic text clearly";

/// Summarizes through a chat-completion endpoint.
pub struct OpenAiSummarizer {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl OpenAiSummarizer {
    /// Create a backend, resolving the API key from config or environment.
    pub fn new(config: &SummarizerConfig) -> Result<Self, SummarizeError> {
        let is_local = config
            .base_url
            .as_ref()
            .map(|u| u.contains("localhost") || u.contains("127.0.0.1"))
            .unwrap_or(false);

        let api_key = config
            .resolve_api_key()
            .or_else(|| {
                if is_local {
                    debug!("No API key set for local server; using placeholder bearer token");
                    Some("local".to_string())
                } else {
                    None
                }
            })
            .ok_or_else(|| SummarizeError::MissingApiKey {
                env_var: config.api_key_env.clone(),
            })?;
        Self::new_with_key(config, api_key)
    }

    /// Create a backend with an explicitly provided API key.
    pub fn new_with_key(config: &SummarizerConfig, api_key: String) -> Result<Self, SummarizeError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| unavailable(BACKEND, format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            model: config
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_key,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Request body for one summarization call.
    pub fn build_request_body(model: &str, text: &str, budget: SummaryBudget) -> Value {
        let system = format!(
            "{}. Keep the summary between {} and {} tokens.",
            SYSTEM_PROMPT, budget.min_length, budget.max_length
        );
        json!({
            "model": model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": text },
            ],
            "temperature": 0.3,
            "max_tokens": budget.max_length,
            "stream": false,
        })
    }

    /// Pull `choices[0].message.content` out of a completion response.
    pub fn parse_response(json: &Value) -> Result<String, SummarizeError> {
        json.get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .map(|s| s.trim().to_string())
            .ok_or_else(|| unavailable(BACKEND, "response has no choices[0].message.content"))
    }
}

#[async_trait]
impl SummarizationBackend for OpenAiSummarizer {
    async fn summarize(&self, text: &str, budget: SummaryBudget) -> Result<String, SummarizeError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = Self::build_request_body(&self.model, text, budget);

        debug!(url = %url, model = %self.model, "Sending summarization request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| unavailable(BACKEND, format!("Request failed: {}", e)))?;

        let status = response.status();
        let response_body = response
            .text()
            .await
            .map_err(|e| unavailable(BACKEND, format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            debug!(status = status.as_u16(), body = %response_body, "Summarization request rejected");
            return Err(unavailable(
                BACKEND,
                describe_http_error(status, &response_body),
            ));
        }

        let json: Value = serde_json::from_str(&response_body)
            .map_err(|e| unavailable(BACKEND, format!("Invalid JSON: {}", e)))?;

        Self::parse_response(&json)
    }

    fn name(&self) -> &str {
        BACKEND
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> SummarizerConfig {
        SummarizerConfig {
            api_key_env: "PAPERSCOUT_TEST_OPENAI_KEY_UNSET".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_request_body_shape() {
        let body = OpenAiSummarizer::build_request_body(
            "gpt-4o-mini",
            "Some abstract.",
            SummaryBudget::from_max(140),
        );
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["max_tokens"], 140);
        assert_eq!(body["messages"][0]["role"], "system");
        let system = body["messages"][0]["content"].as_str().unwrap();
        assert!(system.starts_with("Summarize academic text clearly"));
        assert!(system.contains("56"));
        assert_eq!(body["messages"][1]["content"], "Some abstract.");
    }

    #[test]
    fn test_parse_response_content() {
        let json = json!({
            "choices": [{ "message": { "role": "assistant", "content": " A summary. " } }]
        });
        assert_eq!(OpenAiSummarizer::parse_response(&json).unwrap(), "A summary.");
    }

    #[test]
    fn test_parse_response_empty_content_is_valid() {
        let json = json!({ "choices": [{ "message": { "content": "" } }] });
        assert_eq!(OpenAiSummarizer::parse_response(&json).unwrap(), "");
    }

    #[test]
    fn test_parse_response_malformed() {
        for json in [
            json!({}),
            json!({ "choices": [] }),
            json!({ "choices": [{ "message": { "content": null } }] }),
            json!({ "error": { "message": "quota" } }),
        ] {
            let err = OpenAiSummarizer::parse_response(&json).unwrap_err();
            assert!(matches!(err, SummarizeError::Unavailable { .. }));
        }
    }

    #[test]
    fn test_missing_api_key() {
        let err = OpenAiSummarizer::new(&test_config()).err().unwrap();
        assert!(
            matches!(err, SummarizeError::MissingApiKey { env_var } if env_var == "PAPERSCOUT_TEST_OPENAI_KEY_UNSET")
        );
    }

    #[test]
    fn test_local_server_needs_no_key() {
        let config = SummarizerConfig {
            base_url: Some("http://localhost:11434/v1/".to_string()),
            model: Some("llama3".to_string()),
            ..test_config()
        };
        let backend = OpenAiSummarizer::new(&config).unwrap();
        assert_eq!(backend.model(), "llama3");
        assert_eq!(backend.base_url, "http://localhost:11434/v1");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_unavailable() {
        let config = SummarizerConfig {
            base_url: Some("http://127.0.0.1:9/v1".to_string()),
            timeout_secs: 2,
            ..test_config()
        };
        let backend = OpenAiSummarizer::new(&config).unwrap();
        let err = backend
            .summarize("text", SummaryBudget::from_max(80))
            .await
            .unwrap_err();
        assert!(matches!(err, SummarizeError::Unavailable { .. }));
    }
}
