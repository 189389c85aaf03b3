// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Condition evaluator: query, transform, condition.
//!
//! Timeouts and malformed definitions are errors; they never degrade into
//! a "not fired" verdict.

mod condition;
mod transform;

pub use condition::check;
pub use transform::apply;

use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use wt_adapters::{SearchBackend, SearchError};
use wt_core::{Verdict, Watch};

/// Errors from evaluating a watch
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("query timed out after {}", wt_core::format_duration(*.0))]
    QueryTimeout(Duration),
    #[error("query failed: {0}")]
    QueryFailed(#[source] SearchError),
    #[error("malformed watch: {0}")]
    Malformed(String),
    #[error("metric '{0}' is missing or null")]
    MissingMetric(String),
    #[error("metric '{path}' is not numeric: {value}")]
    NotNumeric { path: String, value: String },
}

/// Fired or not, with the payload the condition saw.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub verdict: Verdict,
    pub payload: Value,
}

impl Evaluation {
    pub fn fired(&self) -> bool {
        self.verdict == Verdict::Fired
    }
}

/// Runs a watch's query against the backend and decides whether it fired.
#[derive(Clone)]
pub struct Evaluator<B> {
    backend: B,
    query_timeout: Duration,
}

impl<B: SearchBackend> Evaluator<B> {
    /// `query_timeout` applies to watches that do not set their own.
    pub fn new(backend: B, query_timeout: Duration) -> Self {
        Self { backend, query_timeout }
    }

    pub async fn evaluate(&self, watch: &Watch) -> Result<Evaluation, EvalError> {
        let timeout = watch.query.timeout.unwrap_or(self.query_timeout);
        let search = self.backend.search(&watch.query.indices, &watch.query.body);
        let raw = match tokio::time::timeout(timeout, search).await {
            Err(_) | Ok(Err(SearchError::Timeout)) => return Err(EvalError::QueryTimeout(timeout)),
            Ok(Err(e)) => return Err(EvalError::QueryFailed(e)),
            Ok(Ok(raw)) => raw,
        };

        let payload = match &watch.transform {
            Some(transform) => apply(transform, raw)?,
            None => raw,
        };
        let verdict =
            if check(&watch.condition, &payload)? { Verdict::Fired } else { Verdict::NotFired };
        tracing::debug!(watch_id = %watch.id, %verdict, "condition evaluated");
        Ok(Evaluation { verdict, payload })
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
