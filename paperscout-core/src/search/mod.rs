//! Paper search: query construction, the arXiv client, and feed parsing.

pub mod arxiv;
pub mod feed;
pub mod query;

pub use arxiv::{ArxivClient, build_search_url};
pub use feed::{FeedReport, SkippedEntry, parse_feed, parse_feed_report};

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::error::SearchError;
use crate::types::SearchQuery;

/// A bibliographic search service returning a raw Atom payload.
#[async_trait]
pub trait PaperSearch: Send + Sync {
    /// Run one search and return the unparsed response body.
    async fn search(&self, query: &SearchQuery, max_results: usize) -> Result<String, SearchError>;

    /// Short name used in logs.
    fn name(&self) -> &str {
        "search"
    }
}

/// A recorded call to [`MockPaperSearch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCall {
    pub query: String,
    pub max_results: usize,
}

/// A mock search service for testing.
///
/// Returns queued payloads in order, then the fallback feed (empty unless
/// built with [`MockPaperSearch::with_feed`]) once the queue runs dry.
pub struct MockPaperSearch {
    responses: Mutex<VecDeque<Result<String, SearchError>>>,
    fallback: String,
    calls: Mutex<Vec<SearchCall>>,
}

impl MockPaperSearch {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            fallback: Self::feed_of(&[]),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock that answers every call with the given feed.
    pub fn with_feed(xml: &str) -> Self {
        Self {
            fallback: xml.to_string(),
            ..Self::new()
        }
    }

    pub fn queue_feed(&self, xml: &str) {
        self.responses.lock().unwrap().push_back(Ok(xml.to_string()));
    }

    pub fn queue_error(&self, error: SearchError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Calls received so far, oldest first.
    pub fn calls(&self) -> Vec<SearchCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Build a synthetic Atom feed with one entry per `(title, id)` pair.
    pub fn feed_of(entries: &[(&str, &str)]) -> String {
        let mut xml = String::from(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <feed xmlns=\"http://www.w3.org/2005/Atom\">\n<title>mock feed</title>\n",
        );
        for (title, id) in entries {
            xml.push_str(&format!(
                "<entry><title>{}</title><id>{}</id></entry>\n",
                title, id
            ));
        }
        xml.push_str("</feed>\n");
        xml
    }
}

impl Default for MockPaperSearch {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaperSearch for MockPaperSearch {
    async fn search(&self, query: &SearchQuery, max_results: usize) -> Result<String, SearchError> {
        self.calls.lock().unwrap().push(SearchCall {
            query: query.as_str().to_string(),
            max_results,
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

    #[tokio::test]
    async fn test_mock_returns_queued_then_empty() {
        let mock = MockPaperSearch::new();
        mock.queue_feed(&MockPaperSearch::feed_of(&[("A", "http://x/1")]));
        mock.queue_error(SearchError::Unavailable {
            message: "down".into(),
        });

        let query = SearchQuery::new("graph");
        let first = mock.search(&query, 5).await.unwrap();
        assert_eq!(parse_feed(&first).len(), 1);
        assert!(mock.search(&query, 5).await.is_err());
        let third = mock.search(&query, 5).await.unwrap();
        assert!(parse_feed(&third).is_empty());

        let calls = mock.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0].query, "graph");
        assert_eq!(calls[0].max_results, 5);
    }

    #[tokio::test]
    async fn test_with_feed_answers_every_call() {
        let feed = MockPaperSearch::feed_of(&[("Neural Scaling Laws", "http://example.org/abs/2")]);
        let mock = MockPaperSearch::with_feed(&feed);
        mock.queue_error(SearchError::Unavailable {
            message: "down".into(),
        });

        let query = SearchQuery::new("scaling");
        assert!(mock.search(&query, 5).await.is_err());
        for _ in 0..30 {
            assert_eq!(mock.search(&query, 5).await.unwrap(), feed);
        }
    }
}
