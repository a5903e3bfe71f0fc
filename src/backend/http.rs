//! HTTP implementation of [`ArxivBackend`] over reqwest.
//!
//! Talks to the paper service's JSON API (`/api/arxiv/*` for papers and
//! indexes, `/api/graph/*` for precomputed graphs and similarity matrices).
//! Wire records are normalized into [`Paper`] here so the rest of the crate
//! never sees partially-populated data.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::graph::{GraphEdge, GraphNode, GraphStatistics, KnowledgeGraphData};
use crate::models::{DateIndex, EmbeddingIndex, Paper, SimilarityPair, WirePaper};

use super::{
    ArxivBackend, BackendError, BackendResult, FetchOutcome, GenerateOutcome, PaperQuery,
};

/// Transport-level timeout for backend requests. Nothing above this layer
/// implements timeouts or cancellation; callers wrap externally if needed.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// reqwest-backed client for the paper service.
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

/// Wrapper the backend uses for embedding-index responses.
#[derive(Debug, Deserialize)]
struct EmbeddingIndexesResponse {
    #[serde(default)]
    indexes: Vec<EmbeddingIndex>,
}

/// Paged paper-query response.
#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    papers: Vec<WirePaper>,
}

/// Similarity-matrix response.
#[derive(Debug, Deserialize)]
struct SimilarityResponse {
    #[serde(default)]
    similarities: Vec<SimilarityPair>,
}

/// Body for the embedding-generation trigger.
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    date: &'a str,
    force: bool,
}

/// Precomputed-graph payload as served by the backend.
///
/// Node papers arrive in the same shape as the query endpoint's
/// ([`WirePaper`]), so the payload goes through the same normalization
/// instead of expecting already-normalized [`Paper`] records.
#[derive(Debug, Deserialize)]
struct WireGraph {
    #[serde(default)]
    nodes: Vec<WireGraphNode>,
    #[serde(default)]
    edges: Vec<GraphEdge>,
    date: String,
    statistics: GraphStatistics,
}

/// Graph node with the paper still in wire shape.
#[derive(Debug, Deserialize)]
struct WireGraphNode {
    id: String,
    label: String,
    title: String,
    group: String,
    value: f64,
    color: String,
    paper: WirePaper,
}

impl WireGraph {
    /// Normalize every node's paper record.
    fn into_graph(self) -> KnowledgeGraphData {
        KnowledgeGraphData {
            nodes: self
                .nodes
                .into_iter()
                .map(|node| GraphNode {
                    id: node.id,
                    label: node.label,
                    title: node.title,
                    group: node.group,
                    value: node.value,
                    color: node.color,
                    paper: Paper::from_wire(node.paper),
                })
                .collect(),
            edges: self.edges,
            date: self.date,
            statistics: self.statistics,
        }
    }
}

impl HttpBackend {
    /// Create a client for the service at `base_url` (no trailing slash).
    ///
    /// # Errors
    /// Returns `BackendError::InvalidRequest` if the underlying HTTP client
    /// cannot be constructed.
    pub fn new(base_url: impl Into<String>) -> BackendResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| BackendError::InvalidRequest(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// GET a JSON payload, mapping non-success statuses to
    /// [`BackendError::Http`].
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> BackendResult<T> {
        debug!(url, "backend GET");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Http {
                status: status.as_u16(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))
    }

    /// Query string shared by the graph and similarity endpoints.
    fn graph_params(threshold: f64, max_papers: usize, category: Option<&str>) -> Vec<(String, String)> {
        let mut params = vec![
            ("threshold".to_string(), threshold.to_string()),
            ("max_papers".to_string(), max_papers.to_string()),
        ];
        if let Some(category) = meaningful_category(category) {
            params.push(("category".to_string(), category.to_string()));
        }
        params
    }
}

/// Treat the "all papers" pseudo-categories as no filter.
fn meaningful_category(category: Option<&str>) -> Option<&str> {
    category.filter(|c| !c.is_empty() && *c != "all" && *c != "cs*")
}

/// Append query parameters to a URL.
fn with_params(url: String, params: &[(String, String)]) -> String {
    let mut out = url;
    for (i, (key, value)) in params.iter().enumerate() {
        out.push(if i == 0 { '?' } else { '&' });
        out.push_str(key);
        out.push('=');
        out.push_str(value);
    }
    out
}

#[async_trait]
impl ArxivBackend for HttpBackend {
    async fn get_date_indexes(&self) -> BackendResult<Vec<DateIndex>> {
        let url = format!("{}/api/arxiv/date-indexes", self.base_url);
        self.get_json(&url).await
    }

    async fn get_embedding_indexes(&self) -> BackendResult<Vec<EmbeddingIndex>> {
        let url = format!("{}/api/arxiv/embedding-indexes", self.base_url);
        let response: EmbeddingIndexesResponse = self.get_json(&url).await?;
        Ok(response.indexes)
    }

    async fn fetch_papers_for_date(&self, date: &str) -> BackendResult<FetchOutcome> {
        let url = format!("{}/api/arxiv/fetch/{}", self.base_url, date);
        debug!(url, "backend POST");
        let response = self
            .client
            .post(&url)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        response
            .json::<FetchOutcome>()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))
    }

    async fn generate_embeddings(&self, date: &str, force: bool) -> BackendResult<GenerateOutcome> {
        let url = format!("{}/api/arxiv/embeddings/generate", self.base_url);
        debug!(url, date, force, "backend POST");
        let response = self
            .client
            .post(&url)
            .json(&GenerateRequest { date, force })
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        response
            .json::<GenerateOutcome>()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))
    }

    async fn fetch_precomputed_graph(
        &self,
        date: &str,
        threshold: f64,
        category: Option<&str>,
    ) -> BackendResult<Option<KnowledgeGraphData>> {
        let params = Self::graph_params(threshold, crate::graph::DEFAULT_MAX_PAPERS, category);
        let url = with_params(format!("{}/api/graph/{}", self.base_url, date), &params);

        debug!(url, "backend GET");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(BackendError::Http {
                status: status.as_u16(),
            });
        }

        let graph = response
            .json::<WireGraph>()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        Ok(Some(graph.into_graph()))
    }

    async fn fetch_similarities(
        &self,
        date: &str,
        threshold: f64,
        category: Option<&str>,
    ) -> BackendResult<Vec<SimilarityPair>> {
        let params = Self::graph_params(threshold, crate::graph::DEFAULT_MAX_PAPERS, category);
        let url = with_params(
            format!("{}/api/graph/similarity/{}", self.base_url, date),
            &params,
        );

        let response: SimilarityResponse = self.get_json(&url).await?;
        Ok(response.similarities)
    }

    async fn query_papers(&self, query: &PaperQuery) -> BackendResult<Vec<Paper>> {
        let mut params = vec![
            ("date".to_string(), query.date.clone()),
            ("start".to_string(), query.start.to_string()),
            ("max_results".to_string(), query.max_results.to_string()),
            ("fetch_category".to_string(), query.fetch_category.clone()),
        ];
        if let Some(category) = meaningful_category(query.category.as_deref()) {
            params.push(("category".to_string(), category.to_string()));
        }
        let url = with_params(format!("{}/api/arxiv/query", self.base_url), &params);

        let response: QueryResponse = self.get_json(&url).await?;
        Ok(response.papers.into_iter().map(Paper::from_wire).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meaningful_category() {
        assert_eq!(meaningful_category(Some("cs.AI")), Some("cs.AI"));
        assert_eq!(meaningful_category(Some("all")), None);
        assert_eq!(meaningful_category(Some("cs*")), None);
        assert_eq!(meaningful_category(Some("")), None);
        assert_eq!(meaningful_category(None), None);
    }

    #[test]
    fn test_with_params() {
        let url = with_params(
            "http://localhost/api/graph/2024-02-01".to_string(),
            &[
                ("threshold".to_string(), "0.6".to_string()),
                ("max_papers".to_string(), "1000".to_string()),
            ],
        );
        assert_eq!(
            url,
            "http://localhost/api/graph/2024-02-01?threshold=0.6&max_papers=1000"
        );
    }

    #[test]
    fn test_graph_params_skips_pseudo_categories() {
        let params = HttpBackend::graph_params(0.6, 1000, Some("all"));
        assert!(params.iter().all(|(key, _)| key != "category"));

        let params = HttpBackend::graph_params(0.6, 1000, Some("cs.CV"));
        assert!(params
            .iter()
            .any(|(key, value)| key == "category" && value == "cs.CV"));
    }

    #[test]
    fn test_precomputed_graph_decodes_wire_paper_shape() {
        // Node papers come off the wire in the query endpoint's shape:
        // "abstract" key, optional fields omitted.
        let payload = r##"{
            "nodes": [{
                "id": "2401.00001",
                "label": "A Paper",
                "title": "A Paper",
                "group": "cs.AI",
                "value": 1.0,
                "color": "#FF6B6B",
                "paper": {
                    "id": "2401.00001",
                    "title": "A Paper",
                    "abstract": "deep learning transformers",
                    "primary_category": "cs.AI"
                }
            }],
            "edges": [],
            "date": "2024-02-01",
            "statistics": {
                "totalPapers": 1,
                "totalConnections": 0,
                "topCategories": [],
                "avgSimilarity": 0.0,
                "clusters": []
            }
        }"##;

        let wire: WireGraph = serde_json::from_str(payload).unwrap();
        let graph = wire.into_graph();

        assert_eq!(graph.date, "2024-02-01");
        assert_eq!(graph.statistics.total_papers, 1);
        let paper = &graph.nodes[0].paper;
        assert_eq!(paper.abstract_text, "deep learning transformers");
        // Normalization applies to precomputed nodes too.
        assert_eq!(paper.categories, vec!["cs.AI".to_string()]);
        assert!(paper.citations.is_none());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let backend = HttpBackend::new("http://localhost:8000/").unwrap();
        assert_eq!(backend.base_url, "http://localhost:8000");
    }
}
