// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Elasticsearch-compatible HTTP client.

use super::{ClusterHealth, SearchBackend, SearchError, WriteAck};
use async_trait::async_trait;
use reqwest::{Method, StatusCode, Url};
use serde_json::Value;
use std::future::Future;
use std::time::Duration;

/// Bounded exponential backoff for idempotent reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub base_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        self.base_backoff.saturating_mul(factor).min(self.max_backoff)
    }

    /// Run `op` until it succeeds, fails permanently, or retries run out.
    pub async fn run<T, F, Fut>(&self, what: &str, mut op: F) -> Result<T, SearchError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, SearchError>>,
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Ok(v) => return Ok(v),
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    let delay = self.backoff(attempt);
                    tracing::warn!(
                        op = what,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "transient search error, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Connection settings for [`EsClient`].
#[derive(Debug, Clone)]
pub struct SearchClientConfig {
    pub url: String,
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
}

/// HTTP client for an Elasticsearch-compatible backend.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone, Debug)]
pub struct EsClient {
    http: reqwest::Client,
    base: Url,
    retry: RetryPolicy,
}

impl EsClient {
    pub fn new(config: SearchClientConfig) -> Result<Self, SearchError> {
        let base = Url::parse(&config.url)
            .map_err(|e| SearchError::InvalidRequest(format!("bad url '{}': {}", config.url, e)))?;
        if base.cannot_be_a_base() {
            return Err(SearchError::InvalidRequest(format!("bad url '{}'", config.url)));
        }
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| SearchError::Transport(e.to_string()))?;
        Ok(Self { http, base, retry: config.retry })
    }

    /// Build `{base}/{segments...}` with each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, SearchError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| SearchError::InvalidRequest("url cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
    ) -> Result<(StatusCode, Value), SearchError> {
        let mut req = self.http.request(method, url);
        if let Some(body) = body {
            req = req.json(body);
        }
        let resp = req.send().await.map_err(map_reqwest_error)?;
        let status = resp.status();
        let text = resp.text().await.map_err(map_reqwest_error)?;
        let value = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };
        Ok((status, value))
    }
}

fn map_reqwest_error(e: reqwest::Error) -> SearchError {
    if e.is_timeout() {
        SearchError::Timeout
    } else {
        SearchError::Transport(e.to_string())
    }
}

fn status_error(status: StatusCode, body: &Value) -> SearchError {
    let body = body.to_string();
    SearchError::Status { status: status.as_u16(), body: wt_core::short(&body, 512).to_string() }
}

#[async_trait]
impl SearchBackend for EsClient {
    async fn search(&self, indices: &[String], body: &Value) -> Result<Value, SearchError> {
        if indices.is_empty() {
            return Err(SearchError::InvalidRequest("no indices to search".to_string()));
        }
        let joined = indices.join(",");
        let url = &self.endpoint(&[joined.as_str(), "_search"])?;
        self.retry
            .run("search", || async move {
                let (status, value) = self.send(Method::POST, url.clone(), Some(body)).await?;
                if status.is_success() {
                    Ok(value)
                } else {
                    Err(status_error(status, &value))
                }
            })
            .await
    }

    async fn get(&self, index: &str, id: &str) -> Result<Option<Value>, SearchError> {
        let url = &self.endpoint(&[index, "_doc", id])?;
        self.retry
            .run("get", || async move {
                let (status, value) = self.send(Method::GET, url.clone(), None).await?;
                if status == StatusCode::NOT_FOUND {
                    return Ok(None);
                }
                if !status.is_success() {
                    return Err(status_error(status, &value));
                }
                match value.get("_source") {
                    Some(source) => Ok(Some(source.clone())),
                    None if value.get("found") == Some(&Value::Bool(false)) => Ok(None),
                    None => Err(SearchError::Decode("document has no _source".to_string())),
                }
            })
            .await
    }

    async fn create(&self, index: &str, id: &str, doc: &Value) -> Result<WriteAck, SearchError> {
        // Writes are never retried: a failure is reported to the caller.
        let url = self.endpoint(&[index, "_create", id])?;
        let (status, value) = self.send(Method::PUT, url, Some(doc)).await?;
        match status {
            s if s.is_success() => Ok(WriteAck::Created),
            StatusCode::CONFLICT => Ok(WriteAck::AlreadyExists),
            s => Err(status_error(s, &value)),
        }
    }

    async fn health(&self) -> Result<ClusterHealth, SearchError> {
        let url = &self.endpoint(&["_cluster", "health"])?;
        self.retry
            .run("health", || async move {
                let (status, value) = self.send(Method::GET, url.clone(), None).await?;
                if !status.is_success() {
                    return Err(status_error(status, &value));
                }
                let raw = value.get("status").cloned().unwrap_or(Value::Null);
                serde_json::from_value(raw)
                    .map_err(|e| SearchError::Decode(format!("cluster health: {}", e)))
            })
            .await
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
