// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{mismatch, ActionContext, ActionError, ActionRunner};
use async_trait::async_trait;
use wt_adapters::NotifyAdapter;
use wt_core::{ActionDef, ActionKind, ActionType};

/// Sends a desktop notification.
#[derive(Clone)]
pub struct NotificationRunner<N> {
    notifier: N,
}

impl<N: NotifyAdapter> NotificationRunner<N> {
    pub fn new(notifier: N) -> Self {
        Self { notifier }
    }
}

#[async_trait]
impl<N: NotifyAdapter> ActionRunner for NotificationRunner<N> {
    fn action_type(&self) -> ActionType {
        ActionType::Notification
    }

    async fn run(&self, ctx: &ActionContext<'_>, action: &ActionDef) -> Result<String, ActionError> {
        let ActionKind::Notification { title, message } = &action.kind else {
            return Err(mismatch(self.action_type(), action));
        };
        let title = ctx.interpolate(title);
        let message = ctx.interpolate(message);
        self.notifier.notify(&title, &message).await?;
        Ok(format!("notified: {}", title))
    }
}
