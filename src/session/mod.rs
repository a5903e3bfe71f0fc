//! Graph browsing session.
//!
//! `GraphSession` ties the availability cache, the graph builder, and the
//! view store together: resolve the user's date selection, make sure
//! embeddings exist for that date, build (or fetch) the graph at the view's
//! threshold, and store the result for the view layer.

use std::sync::Arc;

use tracing::info;

use crate::backend::ArxivBackend;
use crate::cache::DateAvailabilityCache;
use crate::graph::{GraphBuilder, GraphError, GraphResult};
use crate::models::DateSelection;
use crate::view::GraphConfigStore;

/// One user-facing graph browsing session over a backend.
pub struct GraphSession<B: ArxivBackend> {
    cache: Arc<DateAvailabilityCache<B>>,
    builder: GraphBuilder<B>,
    store: GraphConfigStore,
}

impl<B: ArxivBackend> GraphSession<B> {
    /// Create a session with its own cache over the backend.
    pub fn new(backend: Arc<B>) -> Self {
        Self::with_cache(Arc::new(DateAvailabilityCache::new(backend.clone())), backend)
    }

    /// Create a session sharing an application-wide cache.
    pub fn with_cache(cache: Arc<DateAvailabilityCache<B>>, backend: Arc<B>) -> Self {
        Self {
            cache,
            builder: GraphBuilder::new(backend),
            store: GraphConfigStore::new(),
        }
    }

    /// The session's availability cache.
    pub fn cache(&self) -> &DateAvailabilityCache<B> {
        &self.cache
    }

    /// The view store holding the current graph and configuration.
    pub fn store(&self) -> &GraphConfigStore {
        &self.store
    }

    /// Mutable access to the view store (config changes, clearing).
    pub fn store_mut(&mut self) -> &mut GraphConfigStore {
        &mut self.store
    }

    /// Build the graph for a date selection and store the result.
    ///
    /// Resolves the selection to a single date, ensures embeddings exist for
    /// it (triggering a forced generation when missing), then builds the
    /// graph at the view's similarity threshold, preferring a precomputed
    /// one unless `force_rebuild` is set.
    ///
    /// # Errors
    /// Returns `GraphError::EmbeddingGeneration` when the date has no
    /// embeddings and generating them fails, and `GraphError::Backend` for
    /// genuine backend failures during the build. On error the previously
    /// stored graph is left in place.
    pub async fn build_graph(
        &mut self,
        selection: &DateSelection,
        category: Option<&str>,
        force_rebuild: bool,
    ) -> GraphResult<()> {
        let date = selection.resolve();

        self.cache.refresh(false).await;
        if !self.cache.has_embedding(&date).await {
            info!(date, "no embeddings for date, generating");
            let outcome = self.cache.generate_embedding_for_date(&date, true).await;
            if !outcome.success {
                return Err(GraphError::EmbeddingGeneration(
                    outcome
                        .error
                        .unwrap_or_else(|| "Failed to generate embeddings".to_string()),
                ));
            }
        }

        let threshold = self.store.config().similarity_threshold;
        let graph = self
            .builder
            .get_or_build_graph(&date, threshold, category, force_rebuild)
            .await?;

        info!(
            date,
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            "graph ready"
        );
        self.store.set_graph_data(graph);
        Ok(())
    }
}
