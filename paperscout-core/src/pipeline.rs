//! Signal pipeline: turns research text into a summary or related papers.
//!
//! Both flows run one async task to completion. The search and
//! summarization handles are shared through `Arc` and never mutated, so a
//! single [`Pipeline`] can serve concurrent callers.

use std::sync::Arc;
use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, ReadinessError, SearchError};
use crate::search::{FeedReport, PaperSearch, parse_feed_report, query};
use crate::summarizer::Summarizer;
use crate::text::{classify, classify_query, extract_keywords, is_ready, normalize, truncate_chars};
use crate::types::{Discovery, LengthTier, QuerySource, SearchQuery, SummaryReport};

pub struct Pipeline {
    search: Arc<dyn PaperSearch>,
    summarizer: Summarizer,
    settings: PipelineConfig,
}

impl Pipeline {
    pub fn new(
        search: Arc<dyn PaperSearch>,
        summarizer: Summarizer,
        settings: PipelineConfig,
    ) -> Self {
        Self {
            search,
            summarizer,
            settings,
        }
    }

    /// Normalize `raw` and apply the readiness gate.
    fn prepare(&self, raw: &str) -> Result<String, ReadinessError> {
        let text = normalize(raw);
        let threshold = self.settings.min_readiness_chars;
        if is_ready(&text, threshold) {
            Ok(text)
        } else {
            Err(ReadinessError::TooShort {
                actual: text.chars().count(),
                threshold,
            })
        }
    }

    /// Summarize the text and derive its keywords and intent.
    pub async fn summarize(
        &self,
        raw_text: &str,
        tier: LengthTier,
    ) -> Result<SummaryReport, PipelineError> {
        let text = self.prepare(raw_text)?;
        let input = truncate_chars(&text, self.summarizer.input_char_budget());

        let summary = self.summarizer.summarize(input, tier).await?;
        let keywords = extract_keywords(input, self.settings.keyword_count);
        let intent = classify(&keywords);

        info!(
            %tier,
            backend = self.summarizer.backend_name(),
            summary_chars = summary.chars().count(),
            keywords = keywords.len(),
            %intent,
            "Summary generated"
        );

        Ok(SummaryReport {
            summary,
            keywords,
            intent,
            tier,
        })
    }

    /// Find papers related to `input`, returning at most `max_results`.
    ///
    /// An unreachable search service is not an error: the result carries a
    /// warning and no papers.
    pub async fn discover(
        &self,
        input: &str,
        max_results: usize,
        source: QuerySource,
    ) -> Result<Discovery, PipelineError> {
        let limit = max_results.max(1);

        let (query, keywords, intent) = match source {
            QuerySource::Keywords => {
                let text = self.prepare(input)?;
                let keywords = extract_keywords(&text, self.settings.keyword_count);
                let query = query::from_keywords(&keywords, self.settings.query_keyword_count);
                (query, keywords, None)
            }
            QuerySource::Direct => {
                let query = query::from_raw(input);
                let intent = classify_query(query.as_str());
                (query, Vec::new(), Some(intent))
            }
        };

        if query.is_empty() {
            return Err(ReadinessError::EmptyQuery.into());
        }

        let (papers, warning) = match self.search.search(&query, limit).await {
            Ok(xml) => {
                let mut report = parse_feed_report(&xml);
                let warning = feed_warning(&report);
                if let Some(note) = &warning {
                    warn!(query = %query, "{}", note);
                }
                report.records.truncate(limit);
                (report.records, warning)
            }
            Err(SearchError::Unavailable { message }) => {
                warn!(
                    backend = self.search.name(),
                    query = %query,
                    error = %message,
                    "Search service unavailable"
                );
                return Ok(Discovery {
                    query,
                    keywords,
                    papers: Vec::new(),
                    intent,
                    warning: Some(format!("Search service unavailable: {}", message)),
                });
            }
            Err(err) => return Err(err.into()),
        };

        info!(query = %query, papers = papers.len(), "Discovery complete");

        Ok(Discovery {
            query,
            keywords,
            papers,
            intent,
            warning,
        })
    }

    /// Papers related to a block of research text, found via its keywords.
    pub async fn related_papers(
        &self,
        text: &str,
        max_results: usize,
    ) -> Result<Discovery, PipelineError> {
        self.discover(text, max_results, QuerySource::Keywords).await
    }

    /// Papers matching a user-typed query.
    pub async fn search_papers(
        &self,
        raw_query: &str,
        max_results: usize,
    ) -> Result<Discovery, PipelineError> {
        self.discover(raw_query, max_results, QuerySource::Direct).await
    }

    /// The query the keyword path would issue for `text`, without searching.
    pub fn preview_query(&self, text: &str) -> Result<SearchQuery, PipelineError> {
        let text = self.prepare(text)?;
        let keywords = extract_keywords(&text, self.settings.keyword_count);
        Ok(query::from_keywords(
            &keywords,
            self.settings.query_keyword_count,
        ))
    }
}

/// Describe skipped entries and early truncation, if any.
fn feed_warning(report: &FeedReport) -> Option<String> {
    let mut notes = Vec::new();
    if !report.skipped.is_empty() {
        notes.push(format!(
            "{} malformed feed entr{} skipped",
            report.skipped.len(),
            if report.skipped.len() == 1 { "y" } else { "ies" }
        ));
    }
    if let Some(truncated) = &report.truncated {
        notes.push(format!("feed parsing stopped early ({})", truncated));
    }
    if notes.is_empty() {
        None
    } else {
        Some(format!("Results may be incomplete: {}", notes.join("; ")))
    }
}
