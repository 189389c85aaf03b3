// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Watch repository: enumerates and loads stored watches.
//!
//! Nothing is cached beyond a single call; every tick sees the current
//! contents of the watch index.

use async_trait::async_trait;
use serde_json::{json, Value};
use thiserror::Error;
use wt_adapters::{SearchBackend, SearchError};
use wt_core::{Watch, WatchId, WatchRef};

/// Listing page size.
pub const PAGE_SIZE: usize = 100;

/// Upper bound on listed watches (the backend's default result window).
pub const MAX_WATCHES: usize = 10_000;

/// Errors from the watch repository
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("watch repository unavailable: {0}")]
    Unavailable(#[source] SearchError),
    #[error("watch not found: {0}")]
    NotFound(WatchId),
    #[error("watch {id} is malformed: {reason}")]
    Malformed { id: WatchId, reason: String },
}

/// Source of watch definitions
#[async_trait]
pub trait WatchRepository: Clone + Send + Sync + 'static {
    /// Ids of all watches not explicitly disabled. A document without an
    /// `enabled` field counts as enabled. Always finite.
    async fn list_active(&self) -> Result<Vec<WatchRef>, RepositoryError>;

    /// Load one watch. A document that does not deserialize or validate is
    /// reported as [`RepositoryError::Malformed`].
    async fn load(&self, id: &WatchId) -> Result<Watch, RepositoryError>;
}

/// Watch repository reading from a search backend index.
#[derive(Clone)]
pub struct EsWatchRepository<B> {
    backend: B,
    index: String,
    page_size: usize,
}

impl<B: SearchBackend> EsWatchRepository<B> {
    pub fn new(backend: B, index: impl Into<String>) -> Self {
        Self { backend, index: index.into(), page_size: PAGE_SIZE }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    fn page_query(&self, from: usize) -> Value {
        json!({
            "query": { "bool": { "must_not": { "term": { "enabled": false } } } },
            "_source": false,
            "sort": ["_doc"],
            "from": from,
            "size": self.page_size,
        })
    }
}

/// `hits.total` is an object in current backends and a bare number in old ones.
fn total_hits(page: &Value) -> Option<usize> {
    let total = page.pointer("/hits/total")?;
    total.get("value").unwrap_or(total).as_u64().map(|n| n as usize)
}

#[async_trait]
impl<B: SearchBackend> WatchRepository for EsWatchRepository<B> {
    async fn list_active(&self) -> Result<Vec<WatchRef>, RepositoryError> {
        let indices = [self.index.clone()];
        let mut refs = Vec::new();
        let mut from = 0;
        loop {
            let page = match self.backend.search(&indices, &self.page_query(from)).await {
                Ok(page) => page,
                // No watch index yet means no watches.
                Err(SearchError::Status { status: 404, .. }) => {
                    tracing::debug!(index = %self.index, "watch index does not exist");
                    return Ok(Vec::new());
                }
                Err(e) => return Err(RepositoryError::Unavailable(e)),
            };
            let hits = page.pointer("/hits/hits").and_then(Value::as_array);
            let hits = match hits {
                Some(hits) => hits,
                None => {
                    return Err(RepositoryError::Unavailable(SearchError::Decode(
                        "search response has no hits.hits".to_string(),
                    )))
                }
            };
            refs.extend(
                hits.iter()
                    .filter_map(|hit| hit.get("_id").and_then(Value::as_str))
                    .map(|id| WatchRef { id: WatchId::new(id) }),
            );

            from += hits.len();
            let total = total_hits(&page).unwrap_or(from);
            if hits.len() < self.page_size || from >= total {
                break;
            }
            if from >= MAX_WATCHES {
                tracing::warn!(total, listed = from, "watch listing truncated");
                break;
            }
        }
        Ok(refs)
    }

    async fn load(&self, id: &WatchId) -> Result<Watch, RepositoryError> {
        let source = self
            .backend
            .get(&self.index, id.as_str())
            .await
            .map_err(RepositoryError::Unavailable)?
            .ok_or_else(|| RepositoryError::NotFound(id.clone()))?;
        let watch = Watch::from_document(id.clone(), source)
            .map_err(|e| RepositoryError::Malformed { id: id.clone(), reason: e.to_string() })?;
        watch
            .validate()
            .map_err(|reason| RepositoryError::Malformed { id: id.clone(), reason })?;
        Ok(watch)
    }
}

#[cfg(test)]
#[path = "repository_tests.rs"]
mod tests;
