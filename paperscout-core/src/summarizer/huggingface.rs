//! Hugging Face hosted summarization backend (BART-style models).

use async_trait::async_trait;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

use super::{SummarizationBackend, describe_http_error, unavailable};
use crate::config::SummarizerConfig;
use crate::error::SummarizeError;
use crate::types::SummaryBudget;

const BACKEND: &str = "huggingface";
const DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co";
const DEFAULT_MODEL: &str = "facebook/bart-large-cnn";

/// Environment variable consulted when the configured one is unset.
pub const FALLBACK_API_KEY_ENV: &str = "HF_API_TOKEN";

pub struct HuggingFaceSummarizer {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl HuggingFaceSummarizer {
    pub fn new(config: &SummarizerConfig) -> Result<Self, SummarizeError> {
        let api_key = config
            .resolve_api_key()
            .or_else(|| std::env::var(FALLBACK_API_KEY_ENV).ok())
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| SummarizeError::MissingApiKey {
                env_var: format!("{} or {}", config.api_key_env, FALLBACK_API_KEY_ENV),
            })?;

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

    /// Request body with deterministic decoding and the tier's length bounds.
    pub fn build_request_body(text: &str, budget: SummaryBudget) -> Value {
        json!({
            "inputs": text,
            "parameters": {
                "max_length": budget.max_length,
                "min_length": budget.min_length,
                "do_sample": false,
            },
        })
    }

    /// Pull `[0].summary_text` out of an inference response.
    pub fn parse_response(json: &Value) -> Result<String, SummarizeError> {
        if let Some(message) = json.get("error").and_then(|e| e.as_str()) {
            return Err(unavailable(BACKEND, message));
        }
        json.get(0)
            .and_then(|item| item.get("summary_text"))
            .and_then(|s| s.as_str())
            .map(|s| s.trim().to_string())
            .ok_or_else(|| unavailable(BACKEND, "response has no [0].summary_text"))
    }
}

#[async_trait]
impl SummarizationBackend for HuggingFaceSummarizer {
    async fn summarize(&self, text: &str, budget: SummaryBudget) -> Result<String, SummarizeError> {
        let url = format!("{}/models/{}", self.base_url, self.model);
        let body = Self::build_request_body(text, budget);

        debug!(url = %url, "Sending summarization request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
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
