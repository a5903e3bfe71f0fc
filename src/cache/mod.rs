//! Date availability cache.
//!
//! This module caches the backend's per-date paper-count and
//! embedding-coverage indexes so that calendar rendering and graph builds do
//! not hammer the backend, and tracks which dates currently have an
//! outstanding fetch or embedding-generation request.
//!
//! The cache is an explicit object constructed once at application start and
//! shared by `Arc`; there is no hidden global state. Interior state sits
//! behind a `tokio::sync::Mutex` which is never held across a network await.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::backend::{ArxivBackend, FetchOutcome, GenerateOutcome};
use crate::models::{DateIndex, EmbeddingIndex};

/// How long a successful refresh stays valid before the next
/// non-forced refresh goes back to the network.
pub const CACHE_TTL: Duration = Duration::from_secs(5);

/// Cached per-date availability state with in-flight request tracking.
pub struct DateAvailabilityCache<B: ArxivBackend> {
    backend: Arc<B>,
    state: Mutex<CacheState>,
}

/// Mutable cache interior.
struct CacheState {
    date_indexes: Vec<DateIndex>,
    embedding_indexes: Vec<EmbeddingIndex>,

    /// When the last successful refresh completed; `None` until the first
    /// one, so an initial `refresh(false)` always hits the network.
    last_fetch: Option<Instant>,

    /// Dates with an outstanding paper-fetch request.
    fetching_dates: HashSet<String>,

    /// Dates with an outstanding embedding-generation request. Independent
    /// of `fetching_dates`: a fetch and a generation for the same date may
    /// run concurrently.
    generating_dates: HashSet<String>,

    /// Last refresh/fetch/generation failure, as a display string.
    last_error: Option<String>,
}

impl<B: ArxivBackend> DateAvailabilityCache<B> {
    /// Create an empty cache over the given backend.
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            state: Mutex::new(CacheState {
                date_indexes: Vec::new(),
                embedding_indexes: Vec::new(),
                last_fetch: None,
                fetching_dates: HashSet::new(),
                generating_dates: HashSet::new(),
                last_error: None,
            }),
        }
    }

    /// Refresh the cached indexes, subject to the TTL.
    ///
    /// Without `force`, a refresh within [`CACHE_TTL`] of the previous
    /// successful one returns the cached date indexes without touching the
    /// network. Otherwise both index requests are issued concurrently and
    /// the cache is replaced wholesale only when **both** succeed; on any
    /// failure the previous cache is retained, the error is recorded, and an
    /// empty result is returned for this call only.
    pub async fn refresh(&self, force: bool) -> Vec<DateIndex> {
        if !force {
            let state = self.state.lock().await;
            let fresh = state
                .last_fetch
                .is_some_and(|at| at.elapsed() < CACHE_TTL);
            if fresh && !state.date_indexes.is_empty() {
                debug!("date index cache hit");
                return state.date_indexes.clone();
            }
        }

        let (dates, embeddings) = tokio::join!(
            self.backend.get_date_indexes(),
            self.backend.get_embedding_indexes()
        );

        match (dates, embeddings) {
            (Ok(date_indexes), Ok(embedding_indexes)) => {
                debug!(
                    dates = date_indexes.len(),
                    embeddings = embedding_indexes.len(),
                    "refreshed availability indexes"
                );
                let mut state = self.state.lock().await;
                state.date_indexes = date_indexes.clone();
                state.embedding_indexes = embedding_indexes;
                state.last_fetch = Some(Instant::now());
                state.last_error = None;
                date_indexes
            }
            (dates, embeddings) => {
                let message = dates
                    .err()
                    .or(embeddings.err())
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "Failed to fetch date indexes".to_string());
                warn!(error = %message, "index refresh failed, keeping previous cache");
                let mut state = self.state.lock().await;
                state.last_error = Some(message);
                Vec::new()
            }
        }
    }

    /// Trigger a backend paper fetch for one date.
    ///
    /// Fails fast with an "Already fetching" outcome when a fetch for the
    /// same date is already in flight. On success the cache is force
    /// refreshed. The in-flight marker is removed on every exit path.
    pub async fn fetch_for_date(&self, date: &str) -> FetchOutcome {
        {
            let mut state = self.state.lock().await;
            if !state.fetching_dates.insert(date.to_string()) {
                return FetchOutcome::failure("Already fetching");
            }
        }

        let outcome = match self.backend.fetch_papers_for_date(date).await {
            Ok(outcome) => {
                if outcome.success {
                    self.refresh(true).await;
                } else if let Some(error) = &outcome.error {
                    self.record_error(error.clone()).await;
                }
                outcome
            }
            Err(e) => {
                let message = e.to_string();
                self.record_error(message.clone()).await;
                FetchOutcome::failure(message)
            }
        };

        self.state.lock().await.fetching_dates.remove(date);
        outcome
    }

    /// Trigger backend embedding generation for one date.
    ///
    /// Same in-flight-guard and cleanup discipline as [`Self::fetch_for_date`],
    /// against an independent guard set.
    pub async fn generate_embedding_for_date(&self, date: &str, force: bool) -> GenerateOutcome {
        {
            let mut state = self.state.lock().await;
            if !state.generating_dates.insert(date.to_string()) {
                return GenerateOutcome::failure("Already generating embeddings");
            }
        }

        let outcome = match self.backend.generate_embeddings(date, force).await {
            Ok(outcome) => {
                if outcome.success {
                    self.refresh(true).await;
                } else if let Some(error) = &outcome.error {
                    self.record_error(error.clone()).await;
                }
                outcome
            }
            Err(e) => {
                let message = e.to_string();
                self.record_error(message.clone()).await;
                GenerateOutcome::failure(message)
            }
        };

        self.state.lock().await.generating_dates.remove(date);
        outcome
    }

    /// Number of papers stored for a date, per the cached indexes.
    pub async fn paper_count(&self, date: &str) -> u64 {
        let state = self.state.lock().await;
        state
            .date_indexes
            .iter()
            .find(|idx| idx.date == date)
            .map(|idx| idx.total_count)
            .unwrap_or(0)
    }

    /// Whether any papers are stored for a date.
    pub async fn has_stored_papers(&self, date: &str) -> bool {
        self.paper_count(date).await > 0
    }

    /// Whether embeddings exist for a date.
    pub async fn has_embedding(&self, date: &str) -> bool {
        let state = self.state.lock().await;
        state
            .embedding_indexes
            .iter()
            .any(|idx| idx.date == date && idx.total_count > 0)
    }

    /// Whether a paper fetch for the date is currently in flight.
    pub async fn is_fetching(&self, date: &str) -> bool {
        self.state.lock().await.fetching_dates.contains(date)
    }

    /// Whether embedding generation for the date is currently in flight.
    pub async fn is_generating_embedding(&self, date: &str) -> bool {
        self.state.lock().await.generating_dates.contains(date)
    }

    /// Number of dates with at least one stored paper.
    pub async fn total_days(&self) -> usize {
        let state = self.state.lock().await;
        state
            .date_indexes
            .iter()
            .filter(|idx| idx.total_count > 0)
            .count()
    }

    /// Total paper count across all cached dates.
    pub async fn total_papers(&self) -> u64 {
        let state = self.state.lock().await;
        state.date_indexes.iter().map(|idx| idx.total_count).sum()
    }

    /// Snapshot of the cached date indexes.
    pub async fn date_indexes(&self) -> Vec<DateIndex> {
        self.state.lock().await.date_indexes.clone()
    }

    /// Snapshot of the cached embedding indexes.
    pub async fn embedding_indexes(&self) -> Vec<EmbeddingIndex> {
        self.state.lock().await.embedding_indexes.clone()
    }

    /// The most recent failure recorded by the cache, if any.
    pub async fn last_error(&self) -> Option<String> {
        self.state.lock().await.last_error.clone()
    }

    async fn record_error(&self, message: String) {
        self.state.lock().await.last_error = Some(message);
    }
}
