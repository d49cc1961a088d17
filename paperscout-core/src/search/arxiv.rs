//! ArXiv API client: URL building and a single-shot HTTP search.

use async_trait::async_trait;
use std::time::Duration;

use super::PaperSearch;
use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::types::SearchQuery;

const USER_AGENT: &str = concat!(
    "PaperScout/",
    env!("CARGO_PKG_VERSION"),
    " (research signal pipeline)"
);

/// HTTP client for the ArXiv Atom API.
pub struct ArxivClient {
    client: reqwest::Client,
    base_url: String,
    max_results_cap: usize,
}

impl ArxivClient {
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| SearchError::Unavailable {
                message: format!("Failed to create HTTP client: {}", e),
            })?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            max_results_cap: config.max_results_cap.max(1),
        })
    }
}

#[async_trait]
impl PaperSearch for ArxivClient {
    async fn search(&self, query: &SearchQuery, max_results: usize) -> Result<String, SearchError> {
        if query.is_empty() {
            return Err(SearchError::InvalidQuery {
                reason: "query is empty".to_string(),
            });
        }

        let url = build_search_url(
            &self.base_url,
            query.as_str(),
            max_results,
            self.max_results_cap,
        );
        tracing::debug!(%url, "ArXiv search request");

        let response = self.client.get(&url).send().await.map_err(|e| {
            let message = if e.is_timeout() {
                format!("ArXiv API request timed out: {}", e)
            } else {
                format!("ArXiv API request failed: {}", e)
            };
            SearchError::Unavailable { message }
        })?;

        let status = response.status();
        tracing::debug!(status = status.as_u16(), "ArXiv search response");
        if !status.is_success() {
            return Err(SearchError::Unavailable {
                message: format!("ArXiv API returned status {}", status),
            });
        }

        response.text().await.map_err(|e| SearchError::Unavailable {
            message: format!("Failed to read ArXiv response: {}", e),
        })
    }

    fn name(&self) -> &str {
        "arxiv"
    }
}

/// Build the ArXiv API search URL.
///
/// `max_results` is clamped to `1..=cap` and the whole `all:{term}` value is
/// percent-encoded.
pub fn build_search_url(base_url: &str, term: &str, max_results: usize, cap: usize) -> String {
    let search_query = format!("all:{}", term);
    let max_results = max_results.clamp(1, cap.max(1));

    format!(
        "{}?search_query={}&start=0&max_results={}",
        base_url,
        urlencoding::encode(&search_query),
        max_results,
    )
}
