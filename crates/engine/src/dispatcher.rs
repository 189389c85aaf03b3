// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Action dispatcher: runs a fired watch's actions in order.
//!
//! Each action is isolated: its failure or timeout is recorded in its own
//! outcome and the remaining actions still run. Nothing is retried.

use crate::actions::{ActionContext, ActionError, ActionRegistry};
use crate::run_state::RunState;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use wt_core::{ActionDef, ActionOutcome, ActionStatus, Clock, Tick, Watch};

#[derive(Clone)]
pub struct Dispatcher<C: Clock> {
    registry: Arc<ActionRegistry>,
    permits: Arc<Semaphore>,
    default_timeout: Duration,
    run_state: Arc<RunState>,
    clock: C,
}

impl<C: Clock> Dispatcher<C> {
    pub fn new(
        registry: ActionRegistry,
        max_concurrent: usize,
        default_timeout: Duration,
        run_state: Arc<RunState>,
        clock: C,
    ) -> Self {
        Self {
            registry: Arc::new(registry),
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            default_timeout,
            run_state,
            clock,
        }
    }

    /// Run every action of `watch`, returning one outcome per action in
    /// configuration order.
    pub async fn dispatch(&self, watch: &Watch, tick: Tick, payload: &Value) -> Vec<ActionOutcome> {
        if watch.actions.is_empty() {
            return Vec::new();
        }
        let now = self.clock.now();
        if let Some(window) = watch.throttle {
            if self.run_state.within_throttle(&watch.id, window, now) {
                tracing::info!(
                    watch_id = %watch.id,
                    %tick,
                    throttle = %wt_core::format_duration(window),
                    "actions throttled"
                );
                return watch.actions.iter().map(throttled).collect();
            }
        }
        self.run_state.mark_actions_ran(&watch.id, now);

        let ctx = ActionContext { watch_id: &watch.id, tick, payload };
        let mut outcomes = Vec::with_capacity(watch.actions.len());
        for action in &watch.actions {
            outcomes.push(self.run_one(&ctx, action).await);
        }
        outcomes
    }

    async fn run_one(&self, ctx: &ActionContext<'_>, action: &ActionDef) -> ActionOutcome {
        let action_type = action.kind.action_type();
        let start = self.clock.now();
        let timeout = action.timeout.unwrap_or(self.default_timeout);

        let result = match self.registry.get(action_type) {
            None => Err(Some(ActionError::Unsupported(action_type))),
            Some(runner) => {
                // The timeout covers permit waits; the type permit comes first.
                let attempt = async {
                    let _type_permit = match runner.limiter() {
                        Some(limit) => {
                            Some(limit.acquire_owned().await.map_err(|_| ActionError::Closed)?)
                        }
                        None => None,
                    };
                    let _permit = self.permits.acquire().await.map_err(|_| ActionError::Closed)?;
                    runner.run(ctx, action).await
                };
                match tokio::time::timeout(timeout, attempt).await {
                    Ok(Ok(detail)) => Ok(detail),
                    Ok(Err(e)) => Err(Some(e)),
                    Err(_) => Err(None),
                }
            }
        };

        let elapsed_ms = self.clock.now().saturating_duration_since(start).as_millis() as u64;
        let (status, detail) = match result {
            Ok(detail) => (ActionStatus::Succeeded, detail),
            Err(Some(e)) => (ActionStatus::Failed, e.to_string()),
            Err(None) => (
                ActionStatus::TimedOut,
                format!("timed out after {}", wt_core::format_duration(timeout)),
            ),
        };
        match status {
            ActionStatus::Succeeded => tracing::debug!(
                watch_id = %ctx.watch_id,
                action = %action.name,
                %action_type,
                elapsed_ms,
                "action succeeded"
            ),
            _ => tracing::warn!(
                watch_id = %ctx.watch_id,
                action = %action.name,
                %action_type,
                %status,
                elapsed_ms,
                error = %detail,
                "action failed"
            ),
        }
        ActionOutcome { name: action.name.clone(), action_type, status, detail, elapsed_ms }
    }
}

fn throttled(action: &ActionDef) -> ActionOutcome {
    ActionOutcome {
        name: action.name.clone(),
        action_type: action.kind.action_type(),
        status: ActionStatus::Throttled,
        detail: "throttled".to_string(),
        elapsed_ms: 0,
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
