// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Outbound webhook delivery

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

/// Errors from webhook delivery
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("delivery failed: {0}")]
    Transport(String),
    #[error("endpoint returned {0}")]
    Status(u16),
}

/// A fully rendered webhook call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookRequest {
    pub method: String,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

/// Adapter for delivering webhooks
#[async_trait]
pub trait WebhookAdapter: Clone + Send + Sync + 'static {
    /// Deliver the request; returns the (successful) HTTP status.
    async fn send(&self, request: WebhookRequest) -> Result<u16, WebhookError>;
}

/// Webhook adapter backed by a shared `reqwest` client.
#[derive(Clone, Debug)]
pub struct HttpWebhookAdapter {
    http: reqwest::Client,
}

impl HttpWebhookAdapter {
    pub fn new(timeout: Duration) -> Result<Self, WebhookError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WebhookError::Transport(e.to_string()))?;
        Ok(Self { http })
    }
}

#[async_trait]
impl WebhookAdapter for HttpWebhookAdapter {
    async fn send(&self, request: WebhookRequest) -> Result<u16, WebhookError> {
        let method = reqwest::Method::from_bytes(request.method.to_ascii_uppercase().as_bytes())
            .map_err(|_| WebhookError::InvalidRequest(format!("bad method '{}'", request.method)))?;
        let mut req = self.http.request(method, &request.url).body(request.body);
        let has_content_type = request.headers.keys().any(|k| k.eq_ignore_ascii_case("content-type"));
        for (name, value) in &request.headers {
            req = req.header(name.as_str(), value.as_str());
        }
        if !has_content_type {
            req = req.header(reqwest::header::CONTENT_TYPE, "application/json");
        }
        let resp = req.send().await.map_err(|e| WebhookError::Transport(e.to_string()))?;
        let status = resp.status();
        if status.is_success() {
            Ok(status.as_u16())
        } else {
            Err(WebhookError::Status(status.as_u16()))
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::{WebhookAdapter, WebhookError, WebhookRequest};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::time::Duration;

    struct FakeWebhookState {
        calls: Vec<WebhookRequest>,
        status: u16,
        delay: Option<Duration>,
    }

    /// Fake webhook adapter for testing
    #[derive(Clone)]
    pub struct FakeWebhookAdapter {
        inner: Arc<Mutex<FakeWebhookState>>,
    }

    impl Default for FakeWebhookAdapter {
        fn default() -> Self {
            Self {
                inner: Arc::new(Mutex::new(FakeWebhookState {
                    calls: Vec::new(),
                    status: 200,
                    delay: None,
                })),
            }
        }
    }

    impl FakeWebhookAdapter {
        pub fn new() -> Self {
            Self::default()
        }

        /// Status every endpoint responds with.
        pub fn respond_with(&self, status: u16) {
            self.inner.lock().status = status;
        }

        /// Delay before responding.
        pub fn delay(&self, delay: Duration) {
            self.inner.lock().delay = Some(delay);
        }

        pub fn calls(&self) -> Vec<WebhookRequest> {
            self.inner.lock().calls.clone()
        }
    }

    #[async_trait]
    impl WebhookAdapter for FakeWebhookAdapter {
        async fn send(&self, request: WebhookRequest) -> Result<u16, WebhookError> {
            let (status, delay) = {
                let mut state = self.inner.lock();
                state.calls.push(request);
                (state.status, state.delay)
            };
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            if (200..300).contains(&status) {
                Ok(status)
            } else {
                Err(WebhookError::Status(status))
            }
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeWebhookAdapter;

#[cfg(test)]
#[path = "webhook_tests.rs"]
mod tests;
