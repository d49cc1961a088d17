//! # PaperScout Core
//!
//! Core library for PaperScout, a research-text signal pipeline.
//! Provides text normalization, keyword and intent extraction, arXiv search
//! with Atom feed parsing, bounded-length summarization backends, document
//! extraction, and layered configuration.

pub mod config;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod search;
pub mod summarizer;
pub mod text;
pub mod types;

// Re-export commonly used types at the crate root.
pub use config::{LengthTierTable, PaperScoutConfig, PipelineConfig, SearchConfig, SummarizerConfig};
pub use error::{
    ConfigError, ExtractError, FeedEntryError, PaperScoutError, PipelineError, ReadinessError,
    SearchError, SummarizeError,
};
pub use extract::{DocumentExtractor, PdfExtractor, PlainTextExtractor};
pub use pipeline::Pipeline;
pub use search::{ArxivClient, FeedReport, MockPaperSearch, PaperSearch};
pub use summarizer::{MockSummarizationBackend, SummarizationBackend, Summarizer};
pub use types::{
    Discovery, Document, DocumentSource, IntentLabel, KeywordSet, LengthTier, PaperRecord,
    QuerySource, SearchQuery, SummaryBudget, SummaryReport,
};
