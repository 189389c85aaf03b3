// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Action runners and the registry that resolves them by type.
//!
//! Every runner has the same contract: take the action's configuration and
//! the fired payload, return a short detail string or an error. Timeouts
//! and isolation are the dispatcher's job.

mod console;
mod escalation;
mod notification;
mod registry;
mod report;
mod webhook;

pub use console::ConsoleRunner;
pub use escalation::{EscalationRequest, EscalationRunner};
pub use notification::NotificationRunner;
pub use registry::ActionRegistry;
pub use report::ReportRunner;
pub use webhook::WebhookRunner;

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;
use wt_adapters::{NotifyError, RenderError, WebhookError};
use wt_core::{ActionDef, ActionType, Tick, WatchId};

/// Errors from running a single action
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("no runner registered for {0} actions")]
    Unsupported(ActionType),
    #[error("{runner} runner cannot run {got} actions")]
    Mismatch { runner: ActionType, got: ActionType },
    #[error(transparent)]
    Notify(#[from] NotifyError),
    #[error(transparent)]
    Webhook(#[from] WebhookError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("escalation failed: {0}")]
    Escalation(String),
    #[error("action queue closed")]
    Closed,
}

/// What an action sees of the execution that fired it.
#[derive(Debug, Clone, Copy)]
pub struct ActionContext<'a> {
    pub watch_id: &'a WatchId,
    pub tick: Tick,
    pub payload: &'a Value,
}

impl ActionContext<'_> {
    /// Expand `${payload.*}`, `${watch_id}`, `${tick}` and `${tick_ms}` in an
    /// action template. Environment variables are not visible to templates.
    pub fn interpolate(&self, template: &str) -> String {
        let vars = HashMap::from([
            ("watch_id".to_string(), self.watch_id.to_string()),
            ("tick".to_string(), self.tick.to_string()),
            ("tick_ms".to_string(), self.tick.epoch_ms().to_string()),
        ]);
        wt_core::interpolate(template, self.payload, &vars)
    }
}

/// Runs one type of action.
#[async_trait]
pub trait ActionRunner: Send + Sync + 'static {
    fn action_type(&self) -> ActionType;

    /// Per-type concurrency limit. The dispatcher takes a permit from it
    /// before the global one, so queued actions of this type never hold
    /// global capacity.
    fn limiter(&self) -> Option<Arc<Semaphore>> {
        None
    }

    /// Run `action`; the returned string lands in the alarm's outcome detail.
    async fn run(&self, ctx: &ActionContext<'_>, action: &ActionDef) -> Result<String, ActionError>;
}

fn mismatch(runner: ActionType, action: &ActionDef) -> ActionError {
    ActionError::Mismatch { runner, got: action.kind.action_type() }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
