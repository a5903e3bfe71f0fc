//! Knowledge-graph data structures.
//!
//! This module contains the node/edge/statistics records shared between the
//! precomputed-graph wire format and the local graph builder, plus the fixed
//! category color table used for node styling.
//!
//! Graph payloads use camelCase field names on the wire, matching what the
//! backend serves for precomputed graphs.

use serde::{Deserialize, Serialize};

use crate::models::{Paper, OTHER_CATEGORY};

pub mod builder;

pub use builder::{GraphBuilder, GraphError, GraphResult, DEFAULT_MAX_PAPERS};

/// Maximum length of a node label before truncation.
pub const MAX_LABEL_LEN: usize = 25;

/// A graph node, derived 1:1 from a [`Paper`].
///
/// Owned exclusively by the graph result that produced it; not persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GraphNode {
    /// Paper id
    pub id: String,

    /// Title truncated for display
    pub label: String,

    /// Full title
    pub title: String,

    /// Primary category, or "other"
    pub group: String,

    /// Size weight (citations scaled by the node size factor)
    pub value: f64,

    /// Hex color derived from `group`
    pub color: String,

    /// The underlying paper
    pub paper: Paper,
}

/// A graph edge, derived from a similarity pair that passed the build
/// threshold.
///
/// `from` and `to` always reference ids present in the accompanying node
/// set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GraphEdge {
    pub id: String,
    pub from: String,
    pub to: String,

    /// Similarity score in [0, 1]
    pub value: f64,

    /// Hover text, e.g. "Similarity: 42.3%"
    pub title: String,
}

/// Paper count for one category, used in the statistics top-10 list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    pub category_id: String,
    pub category_name: String,
    pub count: usize,
}

/// Cluster descriptor. Reserved for a future server-side clustering pass;
/// always empty in graphs built by this client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterInfo {
    pub id: String,
    pub name: String,
    pub node_count: usize,
    pub category: String,
}

/// Aggregate statistics over a node/edge set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GraphStatistics {
    /// Number of papers in the graph (connected or not)
    pub total_papers: usize,

    /// Number of edges
    pub total_connections: usize,

    /// Top 10 categories by paper count, descending
    pub top_categories: Vec<CategoryCount>,

    /// Mean of edge similarity values; 0 when there are no edges
    pub avg_similarity: f64,

    /// Always empty (see [`ClusterInfo`])
    pub clusters: Vec<ClusterInfo>,
}

impl GraphStatistics {
    /// Statistics for an empty graph.
    pub fn empty() -> Self {
        Self {
            total_papers: 0,
            total_connections: 0,
            top_categories: Vec::new(),
            avg_similarity: 0.0,
            clusters: Vec::new(),
        }
    }
}

/// A complete graph result for one date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KnowledgeGraphData {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,

    /// Calendar date (YYYY-MM-DD) the graph was built for
    pub date: String,

    pub statistics: GraphStatistics,
}

/// Hex color for the "other" category, the final fallback.
pub const OTHER_COLOR: &str = "#95A5A6";

/// Look up the display color for a category.
///
/// Resolution is deterministic and total: the exact category code first
/// (e.g., "cs.AI"), then the top-level segment (e.g., "cs"), then the
/// "other" color.
pub fn category_color(category: &str) -> &'static str {
    if let Some(color) = exact_category_color(category) {
        return color;
    }
    let main = category.split('.').next().unwrap_or(OTHER_CATEGORY);
    exact_category_color(main).unwrap_or(OTHER_COLOR)
}

/// Fixed color table keyed by exact category code.
fn exact_category_color(category: &str) -> Option<&'static str> {
    let color = match category {
        "cs.AI" => "#FF6B6B",
        "cs.CL" => "#4ECDC4",
        "cs.CV" => "#45B7D1",
        "cs.LG" => "#96CEB4",
        "cs.NE" => "#FFEAA7",
        "cs.RO" => "#DDA0DD",
        "cs.CR" => "#98D8C8",
        "cs.DB" => "#F7DC6F",
        "cs.DC" => "#BB8FCE",
        "cs.IR" => "#85C1E9",
        "cs.SE" => "#F8B500",
        "cs.HC" => "#FF8C00",
        "cs.MA" => "#00CED1",
        "cs.SY" => "#9370DB",
        "cs.GT" => "#20B2AA",
        "cs.DS" => "#FF69B4",
        "cs.CG" => "#7B68EE",
        "cs.CY" => "#48D1CC",
        "cs.ET" => "#C71585",
        "cs.FL" => "#00FA9A",
        "cs.GL" => "#DAA520",
        "cs.GR" => "#E6E6FA",
        "cs.AR" => "#87CEEB",
        "cs.CC" => "#FFA07A",
        "cs.CE" => "#20B2AA",
        "math" => "#9B59B6",
        "physics" => "#3498DB",
        "stat" => "#E74C3C",
        "q-bio" => "#2ECC71",
        "q-fin" => "#F39C12",
        "eess" => "#1ABC9C",
        "econ" => "#E91E63",
        "other" => OTHER_COLOR,
        _ => return None,
    };
    Some(color)
}

/// Truncate a title for use as a node label.
///
/// Titles longer than `max_len` characters are cut to `max_len - 3` and
/// suffixed with an ellipsis.
pub fn truncate_label(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", cut)
}
