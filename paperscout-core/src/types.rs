//! Core data model shared across the pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where a document's text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentSource {
    Pasted,
    Extracted,
}

/// Raw research text as supplied by the user or an extractor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    raw_text: String,
    source: DocumentSource,
}

impl Document {
    pub fn pasted(text: impl Into<String>) -> Self {
        Self {
            raw_text: text.into(),
            source: DocumentSource::Pasted,
        }
    }

    pub fn extracted(text: impl Into<String>) -> Self {
        Self {
            raw_text: text.into(),
            source: DocumentSource::Extracted,
        }
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn source(&self) -> DocumentSource {
        self.source
    }
}

/// Ordered, duplicate-free salient terms from a single document.
pub type KeywordSet = Vec<String>;

/// Coarse research-intent category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentLabel {
    Survey,
    ModelOrAlgorithm,
    DatasetOrExperimental,
    General,
}

impl IntentLabel {
    /// Human-readable description shown to users.
    pub fn description(&self) -> &'static str {
        match self {
            IntentLabel::Survey => "Survey / Review focused research",
            IntentLabel::ModelOrAlgorithm => "Model / Algorithm based research",
            IntentLabel::DatasetOrExperimental => "Dataset / Experimental research",
            IntentLabel::General => "General research exploration",
        }
    }
}

impl fmt::Display for IntentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntentLabel::Survey => write!(f, "survey"),
            IntentLabel::ModelOrAlgorithm => write!(f, "model_or_algorithm"),
            IntentLabel::DatasetOrExperimental => write!(f, "dataset_or_experimental"),
            IntentLabel::General => write!(f, "general"),
        }
    }
}

/// Discrete summary-size setting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthTier {
    Short,
    #[default]
    Medium,
    Long,
}

impl LengthTier {
    pub const ALL: [LengthTier; 3] = [LengthTier::Short, LengthTier::Medium, LengthTier::Long];
}

impl fmt::Display for LengthTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LengthTier::Short => write!(f, "short"),
            LengthTier::Medium => write!(f, "medium"),
            LengthTier::Long => write!(f, "long"),
        }
    }
}

impl FromStr for LengthTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "short" | "s" | "brief" => Ok(LengthTier::Short),
            "medium" | "m" | "standard" => Ok(LengthTier::Medium),
            "long" | "l" | "detailed" => Ok(LengthTier::Long),
            other => Err(format!(
                "unknown length '{}', expected short, medium, or long",
                other
            )),
        }
    }
}

/// Output-length bounds handed to a summarization backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryBudget {
    pub max_length: usize,
    pub min_length: usize,
}

impl SummaryBudget {
    /// Budget whose minimum is 40% of the maximum.
    pub fn from_max(max_length: usize) -> Self {
        Self {
            max_length,
            min_length: max_length * 2 / 5,
        }
    }
}

/// Search term handed to the paper search service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchQuery(String);

impl SearchQuery {
    pub fn new(term: impl Into<String>) -> Self {
        Self(term.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Whitespace-separated tokens of the query.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.0.split_whitespace()
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A paper returned by the search service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperRecord {
    pub title: String,
    pub link: String,
}

impl PaperRecord {
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
        }
    }
}

/// Result of the summarize flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryReport {
    pub summary: String,
    pub keywords: KeywordSet,
    pub intent: IntentLabel,
    pub tier: LengthTier,
}

/// How the discover flow obtains its search query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuerySource {
    /// Derive the query from the text's leading keywords.
    Keywords,
    /// Use the input verbatim as the query.
    Direct,
}

/// Result of the discover flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Discovery {
    pub query: SearchQuery,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: KeywordSet,
    pub papers: Vec<PaperRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<IntentLabel>,
    /// Set when the search service could not be reached, or when the feed
    /// had skipped entries or was cut short.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}
