//! Graph construction.
//!
//! The builder produces a [`KnowledgeGraphData`] for a date, preferring a
//! graph precomputed by the backend and falling back to local construction
//! from raw papers via the similarity engine.
//!
//! A "not found" answer from the backend means no precomputed graph exists
//! and is not an error; transport and decode failures on the remote path are
//! also tolerated so that graph browsing survives transient backend issues.
//! Any genuine HTTP error, and any failure while fetching the raw papers for
//! the local fallback, propagates to the caller: a failed build must never
//! be confused with a graph that legitimately has zero papers.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::backend::{ArxivBackend, BackendError, PaperQuery};
use crate::models::{Paper, SimilarityPair};
use crate::similarity;

use super::{
    category_color, truncate_label, CategoryCount, GraphEdge, GraphNode, GraphStatistics,
    KnowledgeGraphData, MAX_LABEL_LEN,
};

/// Cap on the number of papers pulled into a local graph build. The
/// similarity pass is O(n²), so this bound keeps the fallback tractable.
pub const DEFAULT_MAX_PAPERS: usize = 1000;

/// Errors that can occur while producing a graph.
#[derive(Debug, Error)]
pub enum GraphError {
    /// Backend request failed
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Embedding generation for the date failed or was rejected
    #[error("Failed to generate embeddings: {0}")]
    EmbeddingGeneration(String),
}

/// Result type for graph construction.
pub type GraphResult<T> = Result<T, GraphError>;

/// Remote-first graph producer for a backend.
pub struct GraphBuilder<B: ArxivBackend> {
    backend: Arc<B>,

    /// Paper cap for local builds
    max_papers: usize,
}

impl<B: ArxivBackend> GraphBuilder<B> {
    /// Create a builder with the default paper cap.
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            max_papers: DEFAULT_MAX_PAPERS,
        }
    }

    /// Override the paper cap for local builds.
    pub fn with_max_papers(mut self, max_papers: usize) -> Self {
        self.max_papers = max_papers;
        self
    }

    /// Produce a graph for a date.
    ///
    /// Unless `force_rebuild` is set, a backend-precomputed graph is
    /// preferred; when none exists the raw papers for the date are fetched
    /// (capped at the builder's limit, filtered by `category` when given)
    /// and the graph is built locally.
    ///
    /// # Errors
    /// Returns `GraphError` on a genuine backend error: either a
    /// non-not-found HTTP failure on the precomputed path, or any failure
    /// fetching the raw papers for the fallback.
    pub async fn get_or_build_graph(
        &self,
        date: &str,
        threshold: f64,
        category: Option<&str>,
        force_rebuild: bool,
    ) -> GraphResult<KnowledgeGraphData> {
        if !force_rebuild {
            if let Some(graph) = self.fetch_precomputed(date, threshold, category).await? {
                debug!(date, "using precomputed graph");
                return Ok(graph);
            }
        }

        self.build_for_date(date, threshold, category).await
    }

    /// Try the backend's precomputed graph.
    ///
    /// `Ok(None)` covers both "not found" and transient transport/decode
    /// failures; only a non-not-found HTTP status is a real error.
    async fn fetch_precomputed(
        &self,
        date: &str,
        threshold: f64,
        category: Option<&str>,
    ) -> GraphResult<Option<KnowledgeGraphData>> {
        match self.backend.fetch_precomputed_graph(date, threshold, category).await {
            Ok(graph) => Ok(graph),
            Err(e @ BackendError::Http { .. }) => Err(e.into()),
            Err(e) => {
                warn!(date, error = %e, "precomputed graph lookup failed, falling back");
                Ok(None)
            }
        }
    }

    /// Fetch the raw papers for a date and build the graph locally.
    async fn build_for_date(
        &self,
        date: &str,
        threshold: f64,
        category: Option<&str>,
    ) -> GraphResult<KnowledgeGraphData> {
        let query = PaperQuery::new(
            date.to_string(),
            category.map(str::to_string),
            Some(self.max_papers),
        );

        let papers = self.backend.query_papers(&query).await?;
        debug!(date, papers = papers.len(), "building graph locally");

        // Prefer similarity pairs the backend already computed; fall back to
        // the local engine when it has none or the lookup fails.
        let similarities = match self.backend.fetch_similarities(date, threshold, category).await {
            Ok(pairs) if !pairs.is_empty() => {
                debug!(date, pairs = pairs.len(), "using precomputed similarities");
                pairs
            }
            Ok(_) => similarity::build_similarities(&papers, threshold),
            Err(e) => {
                warn!(date, error = %e, "similarity lookup failed, computing locally");
                similarity::build_similarities(&papers, threshold)
            }
        };

        Ok(build_graph_with_similarities(
            &papers,
            &similarities,
            date,
            threshold,
            1.0,
        ))
    }
}

/// Build a graph from a paper set, computing similarities locally.
pub fn build_graph_from_papers(
    papers: &[Paper],
    date: &str,
    threshold: f64,
    node_size_factor: f64,
) -> KnowledgeGraphData {
    let similarities = similarity::build_similarities(papers, threshold);
    build_graph_with_similarities(papers, &similarities, date, threshold, node_size_factor)
}

/// Build a graph from a paper set and precomputed similarity pairs.
///
/// Pairs below the threshold, and pairs referencing papers outside the set,
/// are dropped; the resulting edge list never dangles.
pub fn build_graph_with_similarities(
    papers: &[Paper],
    similarities: &[SimilarityPair],
    date: &str,
    threshold: f64,
    node_size_factor: f64,
) -> KnowledgeGraphData {
    let nodes: Vec<GraphNode> = papers
        .iter()
        .map(|paper| paper_to_node(paper, node_size_factor))
        .collect();

    let node_ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();

    let edges: Vec<GraphEdge> = similarities
        .iter()
        .filter(|pair| {
            pair.score >= threshold
                && node_ids.contains(pair.paper1_id.as_str())
                && node_ids.contains(pair.paper2_id.as_str())
        })
        .enumerate()
        .map(|(index, pair)| GraphEdge {
            id: format!("edge-{}", index),
            from: pair.paper1_id.clone(),
            to: pair.paper2_id.clone(),
            value: pair.score,
            title: format!("Similarity: {:.1}%", pair.score * 100.0),
        })
        .collect();

    let statistics = build_statistics(papers, &edges);

    KnowledgeGraphData {
        nodes,
        edges,
        date: date.to_string(),
        statistics,
    }
}

/// Derive a display node from a paper.
fn paper_to_node(paper: &Paper, node_size_factor: f64) -> GraphNode {
    let group = paper.primary_category.clone();
    GraphNode {
        id: paper.id.clone(),
        label: truncate_label(&paper.title, MAX_LABEL_LEN),
        title: paper.title.clone(),
        value: paper.citations.unwrap_or(1).max(1) as f64 * node_size_factor,
        color: category_color(&group).to_string(),
        group,
        paper: paper.clone(),
    }
}

/// Aggregate statistics over a paper/edge set.
///
/// Category counts cover all papers, not just connected ones; the average
/// similarity is the mean of edge values, 0 when there are no edges.
pub fn build_statistics(papers: &[Paper], edges: &[GraphEdge]) -> GraphStatistics {
    let mut category_counts: HashMap<&str, usize> = HashMap::new();
    for paper in papers {
        *category_counts
            .entry(paper.primary_category.as_str())
            .or_insert(0) += 1;
    }

    let mut top_categories: Vec<CategoryCount> = category_counts
        .into_iter()
        .map(|(category, count)| CategoryCount {
            category_id: category.to_string(),
            category_name: category.to_string(),
            count,
        })
        .collect();
    top_categories
        .sort_by(|a, b| b.count.cmp(&a.count).then(a.category_id.cmp(&b.category_id)));
    top_categories.truncate(10);

    let avg_similarity = if edges.is_empty() {
        0.0
    } else {
        edges.iter().map(|e| e.value).sum::<f64>() / edges.len() as f64
    };

    GraphStatistics {
        total_papers: papers.len(),
        total_connections: edges.len(),
        top_categories,
        avg_similarity,
        clusters: Vec::new(),
    }
}
