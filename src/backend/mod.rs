//! Backend interface for the arXiv paper service.
//!
//! This module defines the client's view of the backend HTTP API: per-date
//! availability indexes, paper fetch and embedding-generation triggers,
//! precomputed graph lookup, and raw paper queries.
//!
//! The `ArxivBackend` trait abstracts the transport, allowing the cache and
//! graph builder to work against mocks in tests and against the reqwest
//! implementation ([`http::HttpBackend`]) in production.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::graph::KnowledgeGraphData;
use crate::models::{DateIndex, EmbeddingIndex, Paper, SimilarityPair};

pub mod http;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Network or connection error
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success HTTP status from the backend
    #[error("HTTP error! status: {status}")]
    Http { status: u16 },

    /// Response body could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Result type for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

/// Outcome of a server-side paper fetch for one date.
///
/// Returned by the backend as JSON and passed through to callers; an
/// in-flight-guard conflict produces the same shape locally.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FetchOutcome {
    pub success: bool,

    /// Number of papers fetched, on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,

    /// Human-readable failure reason
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FetchOutcome {
    /// A local failure outcome with the given reason.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            count: None,
            error: Some(error.into()),
        }
    }
}

/// Outcome of a server-side embedding-generation run for one date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerateOutcome {
    pub success: bool,

    /// Number of embeddings generated, on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_count: Option<u64>,

    /// Human-readable failure reason
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerateOutcome {
    /// A local failure outcome with the given reason.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            generated_count: None,
            error: Some(error.into()),
        }
    }
}

/// Parameters for a raw paper query.
#[derive(Debug, Clone)]
pub struct PaperQuery {
    /// Calendar date (YYYY-MM-DD)
    pub date: String,

    /// Optional category filter applied server-side
    pub category: Option<String>,

    /// Maximum number of papers to return
    pub max_results: usize,

    /// Paging offset
    pub start: usize,

    /// Which category tree the backend fetched from (e.g., "cs*")
    pub fetch_category: String,
}

impl PaperQuery {
    /// Create a query for one date with default paging.
    ///
    /// # Arguments
    /// * `date` - Calendar date (YYYY-MM-DD)
    /// * `category` - Optional category filter
    /// * `max_results` - Result cap (default: 50)
    pub fn new(date: String, category: Option<String>, max_results: Option<usize>) -> Self {
        Self {
            date,
            category,
            max_results: max_results.unwrap_or(50),
            start: 0,
            fetch_category: "cs*".to_string(),
        }
    }
}

/// Client-side view of the backend paper service.
///
/// All operations are request/response over an HTTP-style transport. A
/// non-success status other than "not found" surfaces as
/// [`BackendError::Http`]; decode failures surface as
/// [`BackendError::Decode`]. "Not found" is only meaningful for
/// `fetch_precomputed_graph`, where it signals the absence of a cached
/// server-side graph rather than an error.
#[async_trait]
pub trait ArxivBackend: Send + Sync {
    /// Retrieve the per-date paper-count indexes.
    async fn get_date_indexes(&self) -> BackendResult<Vec<DateIndex>>;

    /// Retrieve the per-date embedding-coverage indexes.
    async fn get_embedding_indexes(&self) -> BackendResult<Vec<EmbeddingIndex>>;

    /// Ask the backend to fetch papers for a date from upstream arXiv.
    async fn fetch_papers_for_date(&self, date: &str) -> BackendResult<FetchOutcome>;

    /// Ask the backend to generate embeddings for a date's papers.
    async fn generate_embeddings(&self, date: &str, force: bool) -> BackendResult<GenerateOutcome>;

    /// Fetch a precomputed graph for a date, if the backend has one.
    ///
    /// # Returns
    /// `Ok(None)` when no precomputed graph exists for the date ("not
    /// found"); this is not an error.
    async fn fetch_precomputed_graph(
        &self,
        date: &str,
        threshold: f64,
        category: Option<&str>,
    ) -> BackendResult<Option<KnowledgeGraphData>>;

    /// Fetch precomputed similarity pairs for a date.
    async fn fetch_similarities(
        &self,
        date: &str,
        threshold: f64,
        category: Option<&str>,
    ) -> BackendResult<Vec<SimilarityPair>>;

    /// Query the papers stored for a date, normalized to [`Paper`].
    async fn query_papers(&self, query: &PaperQuery) -> BackendResult<Vec<Paper>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_outcome_decode() {
        let ok: FetchOutcome =
            serde_json::from_str(r#"{"success": true, "count": 42}"#).unwrap();
        assert!(ok.success);
        assert_eq!(ok.count, Some(42));
        assert!(ok.error.is_none());

        let failed: FetchOutcome =
            serde_json::from_str(r#"{"success": false, "error": "no papers"}"#).unwrap();
        assert!(!failed.success);
        assert_eq!(failed.error.as_deref(), Some("no papers"));
    }

    #[test]
    fn test_paper_query_defaults() {
        let query = PaperQuery::new("2024-02-01".to_string(), None, None);
        assert_eq!(query.max_results, 50);
        assert_eq!(query.start, 0);
        assert_eq!(query.fetch_category, "cs*");
    }
}
