// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{mismatch, ActionContext, ActionError, ActionRunner};
use async_trait::async_trait;
use wt_adapters::{WebhookAdapter, WebhookRequest};
use wt_core::{ActionDef, ActionKind, ActionType};

/// Calls an HTTP endpoint. Without a body template the payload is sent as JSON.
#[derive(Clone)]
pub struct WebhookRunner<W> {
    adapter: W,
}

impl<W: WebhookAdapter> WebhookRunner<W> {
    pub fn new(adapter: W) -> Self {
        Self { adapter }
    }
}

#[async_trait]
impl<W: WebhookAdapter> ActionRunner for WebhookRunner<W> {
    fn action_type(&self) -> ActionType {
        ActionType::Webhook
    }

    async fn run(&self, ctx: &ActionContext<'_>, action: &ActionDef) -> Result<String, ActionError> {
        let ActionKind::Webhook { url, method, headers, body } = &action.kind else {
            return Err(mismatch(self.action_type(), action));
        };
        let request = WebhookRequest {
            method: method.clone(),
            url: ctx.interpolate(url),
            headers: headers.iter().map(|(k, v)| (k.clone(), ctx.interpolate(v))).collect(),
            body: match body {
                Some(template) => ctx.interpolate(template),
                None => ctx.payload.to_string(),
            },
        };
        let target = format!("{} {}", request.method, request.url);
        let status = self.adapter.send(request).await?;
        Ok(format!("{} -> {}", target, status))
    }
}
