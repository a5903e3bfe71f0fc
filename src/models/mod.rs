//! Core data models for the arXiv knowledge-graph client.
//!
//! This module contains the fundamental data structures shared across the
//! client: paper metadata, per-date availability indexes, similarity pairs,
//! and the normalized date selection handed to the graph core.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Fallback category used when a paper carries no usable primary category.
pub const OTHER_CATEGORY: &str = "other";

/// Core metadata for an arXiv paper, as consumed by the graph core.
///
/// Papers are produced by a single normalization step at the backend
/// boundary ([`Paper::from_wire`]), so every field is fully populated and
/// downstream code never re-checks optionality. Identity is `id`; a paper is
/// immutable once fetched within a session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Paper {
    /// Unique arXiv identifier (e.g., "2401.12345")
    pub id: String,

    /// Paper title
    pub title: String,

    /// Abstract text, used for text similarity
    pub abstract_text: String,

    /// Author names
    pub authors: Vec<String>,

    /// Primary arXiv category (e.g., "cs.AI"); never empty after
    /// normalization
    pub primary_category: String,

    /// All categories the paper is filed under; never empty after
    /// normalization
    pub categories: Vec<String>,

    /// Citation count, if the backend reports one
    pub citations: Option<u64>,
}

/// Paper record as it appears on the wire, before normalization.
///
/// The backend uses snake_case field names and omits fields it has no data
/// for. All optionality is resolved here, once, rather than scattered
/// through the graph core.
#[derive(Debug, Clone, Deserialize)]
pub struct WirePaper {
    pub id: String,

    #[serde(default)]
    pub title: String,

    #[serde(rename = "abstract", default)]
    pub abstract_text: String,

    #[serde(default)]
    pub authors: Vec<String>,

    #[serde(default)]
    pub primary_category: String,

    #[serde(default)]
    pub categories: Vec<String>,

    #[serde(default)]
    pub citations: Option<u64>,
}

impl Paper {
    /// Normalize a wire record into a fully-populated `Paper`.
    ///
    /// Defaults applied:
    /// - empty `primary_category` becomes `"other"`
    /// - empty `categories` becomes `[primary_category]`
    pub fn from_wire(wire: WirePaper) -> Self {
        let primary_category = if wire.primary_category.is_empty() {
            OTHER_CATEGORY.to_string()
        } else {
            wire.primary_category
        };

        let categories = if wire.categories.is_empty() {
            vec![primary_category.clone()]
        } else {
            wire.categories
        };

        Self {
            id: wire.id,
            title: wire.title,
            abstract_text: wire.abstract_text,
            authors: wire.authors,
            primary_category,
            categories,
            citations: wire.citations,
        }
    }

    /// The top-level segment of the primary category (e.g., "cs" for
    /// "cs.AI").
    pub fn main_category(&self) -> &str {
        self.primary_category
            .split('.')
            .next()
            .unwrap_or(OTHER_CATEGORY)
    }
}

/// How many papers are stored server-side for a calendar date.
///
/// Created and updated by the backend; cached client-side and superseded
/// wholesale on each successful refresh.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DateIndex {
    /// Calendar date (YYYY-MM-DD)
    pub date: String,

    /// Number of papers stored for this date
    pub total_count: u64,

    /// When the backend last fetched papers for this date
    pub fetched_at: String,
}

/// Embedding coverage for a calendar date.
///
/// A date may have a [`DateIndex`] without an `EmbeddingIndex` (papers
/// fetched but not yet embedded).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingIndex {
    /// Calendar date (YYYY-MM-DD)
    pub date: String,

    /// Number of papers with embeddings for this date
    pub total_count: u64,

    /// When the embeddings were generated
    pub generated_at: String,

    /// Which model produced the embeddings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
}

/// A scored relationship between two papers, used as a candidate graph edge.
///
/// Pairs are unordered: `paper1_id != paper2_id`, and a graph build produces
/// at most one entry per unordered pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimilarityPair {
    pub paper1_id: String,
    pub paper2_id: String,

    /// Combined similarity score in [0, 1]
    pub score: f64,
}

/// A date selection made at the UI boundary.
///
/// The graph core only ever receives a normalized `YYYY-MM-DD` string;
/// resolution happens exactly once, here.
#[derive(Debug, Clone, PartialEq)]
pub enum DateSelection {
    /// No specific date; resolves to today
    All,

    /// A single calendar date
    Single(String),

    /// A date range; the graph is built for the start date
    Range { start: String, end: String },
}

impl DateSelection {
    /// Resolve the selection to a single `YYYY-MM-DD` date string.
    pub fn resolve(&self) -> String {
        match self {
            DateSelection::All => today(),
            DateSelection::Single(date) => date.clone(),
            DateSelection::Range { start, .. } => start.clone(),
        }
    }
}

/// Today's date as a `YYYY-MM-DD` string.
pub fn today() -> String {
    Local::now().date_naive().format("%Y-%m-%d").to_string()
}

/// Validate a `YYYY-MM-DD` date string.
pub fn is_valid_date(date: &str) -> bool {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wire(primary: &str, categories: Vec<&str>) -> WirePaper {
        WirePaper {
            id: "2401.00001".to_string(),
            title: "A Paper".to_string(),
            abstract_text: "An abstract".to_string(),
            authors: vec!["Author".to_string()],
            primary_category: primary.to_string(),
            categories: categories.into_iter().map(String::from).collect(),
            citations: None,
        }
    }

    #[test]
    fn test_normalization_defaults() {
        let paper = Paper::from_wire(wire("", vec![]));
        assert_eq!(paper.primary_category, "other");
        assert_eq!(paper.categories, vec!["other".to_string()]);

        let paper = Paper::from_wire(wire("cs.AI", vec![]));
        assert_eq!(paper.primary_category, "cs.AI");
        assert_eq!(paper.categories, vec!["cs.AI".to_string()]);

        let paper = Paper::from_wire(wire("cs.AI", vec!["cs.AI", "cs.LG"]));
        assert_eq!(paper.categories.len(), 2);
    }

    #[test]
    fn test_main_category() {
        let paper = Paper::from_wire(wire("cs.AI", vec!["cs.AI"]));
        assert_eq!(paper.main_category(), "cs");

        let paper = Paper::from_wire(wire("math", vec!["math"]));
        assert_eq!(paper.main_category(), "math");
    }

    #[test]
    fn test_date_selection_resolution() {
        let single = DateSelection::Single("2024-02-01".to_string());
        assert_eq!(single.resolve(), "2024-02-01");

        let range = DateSelection::Range {
            start: "2024-02-01".to_string(),
            end: "2024-02-07".to_string(),
        };
        assert_eq!(range.resolve(), "2024-02-01");

        assert!(is_valid_date(&DateSelection::All.resolve()));
    }

    #[test]
    fn test_is_valid_date() {
        assert!(is_valid_date("2024-02-01"));
        assert!(!is_valid_date("2024-13-01"));
        assert!(!is_valid_date("not-a-date"));
    }

    #[test]
    fn test_wire_paper_defaults_on_decode() {
        let paper: WirePaper =
            serde_json::from_str(r#"{"id": "2401.00001"}"#).unwrap();
        let paper = Paper::from_wire(paper);
        assert_eq!(paper.primary_category, "other");
        assert!(paper.authors.is_empty());
        assert!(paper.citations.is_none());
    }
}
