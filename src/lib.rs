//! arXiv knowledge-graph client core.
//!
//! This library implements the client side of an arXiv paper browser: a
//! date-indexed availability cache with request deduplication, a pairwise
//! similarity engine, and a graph builder that prefers backend-precomputed
//! graphs and falls back to local construction.
//!
//! # Architecture
//!
//! The system is organized into several key modules:
//!
//! - **models**: Core data structures (Paper, DateIndex, SimilarityPair, etc.)
//! - **backend**: The `ArxivBackend` trait and its reqwest HTTP implementation
//! - **cache**: TTL-cached per-date availability with in-flight guards
//! - **similarity**: Pure pairwise similarity scoring
//! - **graph**: Graph types and remote-first graph construction
//! - **view**: View configuration and filtered node/edge derivations
//! - **session**: Orchestration of cache, builder, and view store
//!
//! # Workflow
//!
//! 1. A caller selects a date (or range, resolved to its start date)
//! 2. The session checks the availability cache for embedding coverage
//! 3. Missing embeddings are generated via the backend
//! 4. The graph is fetched precomputed, or built locally from raw papers
//!    and the similarity engine
//! 5. The result lands in the view store, which derives the filtered
//!    node/edge subsets the UI renders
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use arxiv_graph::{
//!     backend::http::HttpBackend,
//!     models::DateSelection,
//!     session::GraphSession,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = Arc::new(HttpBackend::new("http://localhost:8000")?);
//!     let mut session = GraphSession::new(backend);
//!
//!     let selection = DateSelection::Single("2024-02-01".to_string());
//!     session.build_graph(&selection, None, false).await?;
//!
//!     let stats = session.store().statistics().unwrap();
//!     println!("{} papers, {} connections", stats.total_papers, stats.total_connections);
//!     Ok(())
//! }
//! ```

// Public modules
pub mod backend;
pub mod cache;
pub mod graph;
pub mod models;
pub mod session;
pub mod similarity;
pub mod view;

// Re-export commonly used types at the crate root
pub use backend::{ArxivBackend, BackendError, FetchOutcome, GenerateOutcome, PaperQuery};
pub use cache::DateAvailabilityCache;
pub use graph::{GraphBuilder, GraphError, KnowledgeGraphData};
pub use models::{DateIndex, DateSelection, EmbeddingIndex, Paper, SimilarityPair};
pub use session::GraphSession;
pub use view::{GraphConfig, GraphConfigStore, LayoutType};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
