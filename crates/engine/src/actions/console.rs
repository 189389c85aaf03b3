// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{mismatch, ActionContext, ActionError, ActionRunner};
use async_trait::async_trait;
use wt_core::{ActionDef, ActionKind, ActionType};

const DEFAULT_MESSAGE: &str = "${payload}";

/// Writes the (templated) message to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleRunner;

#[async_trait]
impl ActionRunner for ConsoleRunner {
    fn action_type(&self) -> ActionType {
        ActionType::Console
    }

    async fn run(&self, ctx: &ActionContext<'_>, action: &ActionDef) -> Result<String, ActionError> {
        let ActionKind::Console { message } = &action.kind else {
            return Err(mismatch(self.action_type(), action));
        };
        let text = ctx.interpolate(message.as_deref().unwrap_or(DEFAULT_MESSAGE));
        tracing::info!(watch_id = %ctx.watch_id, tick = %ctx.tick, action = %action.name, "{}", text);
        Ok(text)
    }
}
