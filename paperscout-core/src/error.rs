//! Error types for the PaperScout core library.
//!
//! Uses `thiserror` for public API error types with structured variants
//! covering the pipeline boundary, search, summarization, feed parsing,
//! document extraction, and configuration.

/// Top-level error type for the PaperScout core library.
#[derive(Debug, thiserror::Error)]
pub enum PaperScoutError {
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    #[error("Summarization error: {0}")]
    Summarize(#[from] SummarizeError),

    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors surfaced at the pipeline boundary.
///
/// Every variant is recoverable: callers turn them into a visible status
/// instead of aborting.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Input not ready: {0}")]
    Readiness(#[from] ReadinessError),

    #[error("Search query rejected: {reason}")]
    InvalidQuery { reason: String },

    #[error("Search service unavailable: {message}")]
    SearchUnavailable { message: String },

    #[error("Summarization unavailable: {message}")]
    SummarizationUnavailable { message: String },
}

/// Input failed the minimum-usable-length gate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReadinessError {
    #[error("text has {actual} characters, need more than {threshold}")]
    TooShort { actual: usize, threshold: usize },

    #[error("search query is empty")]
    EmptyQuery,
}

/// Errors from the paper search client.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Invalid search query: {reason}")]
    InvalidQuery { reason: String },

    #[error("Search service unavailable: {message}")]
    Unavailable { message: String },
}

/// Errors from summarization backends.
#[derive(Debug, thiserror::Error)]
pub enum SummarizeError {
    #[error("{backend} summarization failed: {message}")]
    Unavailable { backend: String, message: String },

    #[error("API key not configured: set {env_var}")]
    MissingApiKey { env_var: String },

    #[error("Unknown summarization backend: {name}")]
    UnknownBackend { name: String },
}

/// A single feed entry that could not be turned into a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FeedEntryError {
    #[error("entry has no title")]
    MissingTitle,

    #[error("entry has no id")]
    MissingId,

    #[error("entry is malformed")]
    Malformed,
}

/// Errors from document-to-text extraction.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("PDF extraction failed: {message}")]
    Pdf { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the configuration system.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Configuration load error: {message}")]
    Load { message: String },
}

impl From<SearchError> for PipelineError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::InvalidQuery { reason } => PipelineError::InvalidQuery { reason },
            SearchError::Unavailable { message } => PipelineError::SearchUnavailable { message },
        }
    }
}

impl From<SummarizeError> for PipelineError {
    fn from(err: SummarizeError) -> Self {
        PipelineError::SummarizationUnavailable {
            message: err.to_string(),
        }
    }
}
