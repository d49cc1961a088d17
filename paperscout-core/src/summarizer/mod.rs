//! Bounded-length summarization over a pluggable backend.
//!
//! [`Summarizer`] applies the input character budget and resolves a
//! [`LengthTier`] to a [`SummaryBudget`] before handing the text to a
//! [`SummarizationBackend`].

pub mod huggingface;
pub mod openai;

pub use huggingface::HuggingFaceSummarizer;
pub use openai::OpenAiSummarizer;

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::config::{LengthTierTable, SummarizerConfig};
use crate::error::SummarizeError;
use crate::text::truncate_chars;
use crate::types::{LengthTier, SummaryBudget};

/// A text-summarization service.
#[async_trait]
pub trait SummarizationBackend: Send + Sync {
    /// Summarize `text` within `budget`. An empty string is a valid summary.
    async fn summarize(&self, text: &str, budget: SummaryBudget) -> Result<String, SummarizeError>;

    /// Backend name used in logs and errors.
    fn name(&self) -> &str;
}

/// Applies input and output budgets around a backend.
#[derive(Clone)]
pub struct Summarizer {
    backend: Arc<dyn SummarizationBackend>,
    input_char_budget: usize,
    tiers: LengthTierTable,
}

impl Summarizer {
    pub fn new(
        backend: Arc<dyn SummarizationBackend>,
        input_char_budget: usize,
        tiers: LengthTierTable,
    ) -> Self {
        Self {
            backend,
            input_char_budget,
            tiers,
        }
    }

    /// Build a summarizer from config using the given backend.
    pub fn from_config(backend: Arc<dyn SummarizationBackend>, config: &SummarizerConfig) -> Self {
        Self::new(backend, config.input_char_budget, config.tiers)
    }

    pub fn input_char_budget(&self) -> usize {
        self.input_char_budget
    }

    pub fn budget_for(&self, tier: LengthTier) -> SummaryBudget {
        self.tiers.budget(tier)
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Summarize at most `input_char_budget` characters of `text`.
    pub async fn summarize(&self, text: &str, tier: LengthTier) -> Result<String, SummarizeError> {
        let input = truncate_chars(text, self.input_char_budget);
        let budget = self.budget_for(tier);
        tracing::debug!(
            backend = self.backend.name(),
            %tier,
            input_chars = input.chars().count(),
            max_length = budget.max_length,
            min_length = budget.min_length,
            "Requesting summary"
        );
        self.backend.summarize(input, budget).await
    }
}

/// Construct the backend named in `config.backend`.
pub fn backend_from_config(
    config: &SummarizerConfig,
) -> Result<Arc<dyn SummarizationBackend>, SummarizeError> {
    match config.backend.trim().to_lowercase().as_str() {
        "openai" | "openai-compatible" => Ok(Arc::new(OpenAiSummarizer::new(config)?)),
        "huggingface" | "hf" => Ok(Arc::new(HuggingFaceSummarizer::new(config)?)),
        other => Err(SummarizeError::UnknownBackend {
            name: other.to_string(),
        }),
    }
}

/// Build the error for a failed backend call.
pub(crate) fn unavailable(backend: &str, message: impl Into<String>) -> SummarizeError {
    SummarizeError::Unavailable {
        backend: backend.to_string(),
        message: message.into(),
    }
}

/// Describe a non-2xx backend response.
pub(crate) fn describe_http_error(status: reqwest::StatusCode, body: &str) -> String {
    match status.as_u16() {
        401 | 403 => "authentication failed, check the API key".to_string(),
        429 => "rate limited or quota exceeded".to_string(),
        s if s >= 500 => format!("server error ({}): {}", status, truncate_chars(body, 200)),
        _ => format!("HTTP {}: {}", status, truncate_chars(body, 200)),
    }
}

/// A recorded call to [`MockSummarizationBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummarizeCall {
    pub text: String,
    pub budget: SummaryBudget,
}

/// A mock summarization backend for testing.
///
/// Returns queued responses in order, then a fallback summary once the queue
/// runs dry.
pub struct MockSummarizationBackend {
    responses: Mutex<VecDeque<Result<String, SummarizeError>>>,
    fallback: String,
    calls: Mutex<Vec<SummarizeCall>>,
}

impl MockSummarizationBackend {
    pub const DEFAULT_SUMMARY: &'static str = "A mock summary of the supplied text.";

    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            fallback: Self::DEFAULT_SUMMARY.to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock that always returns the given summary.
    pub fn with_response(text: &str) -> Self {
        Self {
            fallback: text.to_string(),
            ..Self::new()
        }
    }

    pub fn queue_response(&self, text: &str) {
        self.responses.lock().unwrap().push_back(Ok(text.to_string()));
    }

    pub fn queue_error(&self, error: SummarizeError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Calls received so far, oldest first.
    pub fn calls(&self) -> Vec<SummarizeCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockSummarizationBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SummarizationBackend for MockSummarizationBackend {
    async fn summarize(&self, text: &str, budget: SummaryBudget) -> Result<String, SummarizeError> {
        self.calls.lock().unwrap().push(SummarizeCall {
            text: text.to_string(),
            budget,
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(self.fallback.clone()))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summarizer(mock: Arc<MockSummarizationBackend>) -> Summarizer {
        Summarizer::new(mock, 2000, LengthTierTable::default())
    }

    #[tokio::test]
    async fn test_truncates_input_to_budget() {
        let mock = Arc::new(MockSummarizationBackend::new());
        let text = "é".repeat(2500);
        summarizer(mock.clone())
            .summarize(&text, LengthTier::Medium)
            .await
            .unwrap();

        let calls = mock.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].text.chars().count(), 2000);
    }

    #[tokio::test]
    async fn test_passes_tier_budget() {
        let mock = Arc::new(MockSummarizationBackend::new());
        let s = summarizer(mock.clone());
        s.summarize("short input", LengthTier::Long).await.unwrap();
        s.summarize("short input", LengthTier::Short).await.unwrap();

        let calls = mock.calls();
        assert_eq!(calls[0].budget, SummaryBudget::from_max(220));
        assert_eq!(calls[1].budget, SummaryBudget::from_max(80));
        assert!(calls[0].budget.max_length > calls[1].budget.max_length);
    }

    #[tokio::test]
    async fn test_empty_summary_is_valid() {
        let mock = Arc::new(MockSummarizationBackend::new());
        mock.queue_response("");
        let out = summarizer(mock).summarize("text", LengthTier::Short).await;
        assert_eq!(out.unwrap(), "");
    }

    #[tokio::test]
    async fn test_with_response_answers_every_call() {
        let mock = Arc::new(MockSummarizationBackend::with_response("Drones fly."));
        let s = summarizer(mock.clone());
        for _ in 0..30 {
            assert_eq!(s.summarize("text", LengthTier::Short).await.unwrap(), "Drones fly.");
        }
        assert_eq!(mock.calls().len(), 30);
    }

    #[tokio::test]
    async fn test_backend_error_propagates() {
        let mock = Arc::new(MockSummarizationBackend::new());
        mock.queue_error(unavailable("mock", "boom"));
        let err = summarizer(mock)
            .summarize("text", LengthTier::Short)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "mock summarization failed: boom");
    }

    #[test]
    fn test_backend_from_config_unknown() {
        let config = SummarizerConfig {
            backend: "carrier-pigeon".to_string(),
            ..Default::default()
        };
        let err = backend_from_config(&config).err().unwrap();
        assert!(matches!(err, SummarizeError::UnknownBackend { name } if name == "carrier-pigeon"));
    }

    #[test]
    fn test_backend_from_config_builds_named_backend() {
        let config = SummarizerConfig {
            backend: "HF".to_string(),
            api_key: Some("hf_test".to_string()),
            ..Default::default()
        };
        let backend = backend_from_config(&config).unwrap();
        assert_eq!(backend.name(), "huggingface");

        let config = SummarizerConfig {
            api_key: Some("sk-test".to_string()),
            ..Default::default()
        };
        assert_eq!(backend_from_config(&config).unwrap().name(), "openai");
    }

    #[test]
    fn test_describe_http_error() {
        let status = reqwest::StatusCode::UNAUTHORIZED;
        assert!(describe_http_error(status, "").contains("authentication"));
        let status = reqwest::StatusCode::TOO_MANY_REQUESTS;
        assert!(describe_http_error(status, "").contains("rate limited"));
        let status = reqwest::StatusCode::SERVICE_UNAVAILABLE;
        assert!(describe_http_error(status, "loading").starts_with("server error"));
    }
}
