// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{mismatch, ActionContext, ActionError, ActionRunner};
use crate::run_state::RunState;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;
use wt_core::{ActionDef, ActionKind, ActionType, Tick, WatchId};

/// Ask the scheduler to run `target` for the same tick as `source`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscalationRequest {
    pub target: WatchId,
    pub source: WatchId,
    pub tick: Tick,
}

/// Hands escalations to the scheduler loop; the target runs out-of-band.
///
/// A target that cannot be admitted for the tick (already ran, or still
/// running) is not sent, and the outcome detail names the skip.
#[derive(Clone)]
pub struct EscalationRunner {
    tx: mpsc::Sender<EscalationRequest>,
    run_state: Arc<RunState>,
}

impl EscalationRunner {
    pub fn new(tx: mpsc::Sender<EscalationRequest>, run_state: Arc<RunState>) -> Self {
        Self { tx, run_state }
    }
}

#[async_trait]
impl ActionRunner for EscalationRunner {
    fn action_type(&self) -> ActionType {
        ActionType::Escalation
    }

    async fn run(&self, ctx: &ActionContext<'_>, action: &ActionDef) -> Result<String, ActionError> {
        let ActionKind::Escalation { watch } = &action.kind else {
            return Err(mismatch(self.action_type(), action));
        };
        if watch == ctx.watch_id {
            return Err(ActionError::Escalation("a watch cannot escalate to itself".to_string()));
        }
        if let Err(skip) = self.run_state.check(watch, ctx.tick) {
            tracing::info!(watch_id = %ctx.watch_id, target = %watch, %skip, "escalation skipped");
            return Ok(format!("escalation to {} skipped: {}", watch, skip));
        }
        let request =
            EscalationRequest { target: watch.clone(), source: ctx.watch_id.clone(), tick: ctx.tick };
        self.tx
            .send(request)
            .await
            .map_err(|_| ActionError::Escalation("scheduler is not accepting escalations".to_string()))?;
        Ok(format!("escalated to {}", watch))
    }
}
