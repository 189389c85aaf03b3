// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Adapters for the external systems Watchtower talks to: the search
//! backend, desktop notifications, webhook endpoints, and the report renderer.

pub mod notify;
pub mod renderer;
pub mod search;
pub mod webhook;

pub use notify::{DesktopNotifyAdapter, NotifyAdapter, NotifyError};
pub use renderer::{
    ProcessRenderer, RenderAdapter, RenderError, RenderRequest, RendererCapability,
    DEFAULT_RENDERER,
};
pub use search::{
    ClusterHealth, EsClient, RetryPolicy, SearchBackend, SearchClientConfig, SearchError, WriteAck,
};
pub use webhook::{HttpWebhookAdapter, WebhookAdapter, WebhookError, WebhookRequest};

#[cfg(any(test, feature = "test-support"))]
pub use notify::{FakeNotifyAdapter, NotifyCall};
#[cfg(any(test, feature = "test-support"))]
pub use renderer::FakeRenderer;
#[cfg(any(test, feature = "test-support"))]
pub use search::{FakeFailure, FakeSearchBackend};
#[cfg(any(test, feature = "test-support"))]
pub use webhook::FakeWebhookAdapter;
