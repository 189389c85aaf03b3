// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Search backend adapter
//!
//! A uniform boundary over the document store that holds watches and
//! alarms. Reads (`search`, `get`, `health`) are idempotent and retried on
//! transient failures; `create` is a write and is attempted exactly once.

mod http;

pub use http::{EsClient, RetryPolicy, SearchClientConfig};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Errors from search backend operations
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("request timed out")]
    Timeout,
    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid response: {0}")]
    Decode(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl SearchError {
    /// Whether retrying the same idempotent request might succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            SearchError::Transport(_) | SearchError::Timeout => true,
            SearchError::Status { status, .. } => matches!(status, 429 | 502 | 503 | 504),
            SearchError::Decode(_) | SearchError::InvalidRequest(_) => false,
        }
    }
}

/// Result of a create-only write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteAck {
    Created,
    /// A document with this id already existed; nothing was written.
    AlreadyExists,
}

/// Cluster health as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterHealth {
    Red,
    Yellow,
    Green,
}

wt_core::simple_display! {
    ClusterHealth {
        Red => "red",
        Yellow => "yellow",
        Green => "green",
    }
}

/// Adapter for the search/document backend
#[async_trait]
pub trait SearchBackend: Clone + Send + Sync + 'static {
    /// Run a search request against one or more indices; returns the raw response.
    async fn search(&self, indices: &[String], body: &Value) -> Result<Value, SearchError>;

    /// Fetch a document's `_source` by id. `Ok(None)` when it does not exist.
    async fn get(&self, index: &str, id: &str) -> Result<Option<Value>, SearchError>;

    /// Write a document only if no document with `id` exists.
    async fn create(&self, index: &str, id: &str, doc: &Value) -> Result<WriteAck, SearchError>;

    /// Report cluster health.
    async fn health(&self) -> Result<ClusterHealth, SearchError>;
}

#[cfg(any(test, feature = "test-support"))]
mod fake;

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeFailure, FakeSearchBackend};

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
