// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{mismatch, ActionContext, ActionError, ActionRunner};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use wt_adapters::{RenderAdapter, RenderRequest};
use wt_core::{ActionDef, ActionKind, ActionType, Tick, WatchId};

/// Renders a report page through the renderer.
///
/// Rendering is heavy, so it has its own limiter, smaller than the
/// dispatcher's global action limit.
#[derive(Clone)]
pub struct ReportRunner<R> {
    renderer: R,
    output_dir: PathBuf,
    permits: Arc<Semaphore>,
}

impl<R: RenderAdapter> ReportRunner<R> {
    pub fn new(renderer: R, output_dir: impl Into<PathBuf>, max_concurrent: usize) -> Self {
        Self {
            renderer,
            output_dir: output_dir.into(),
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }
}

/// `<dir>/<watch>/<tick_ms>-<action>.<format>`, with path separators in
/// ids replaced.
fn output_path(dir: &Path, watch_id: &WatchId, tick: Tick, action: &str, format: &str) -> PathBuf {
    let safe = |s: &str| s.replace(['/', '\\'], "_");
    dir.join(safe(watch_id.as_str()))
        .join(format!("{}-{}.{}", tick.epoch_ms(), safe(action), safe(format)))
}

#[async_trait]
impl<R: RenderAdapter> ActionRunner for ReportRunner<R> {
    fn action_type(&self) -> ActionType {
        ActionType::Report
    }

    fn limiter(&self) -> Option<Arc<Semaphore>> {
        Some(Arc::clone(&self.permits))
    }

    async fn run(&self, ctx: &ActionContext<'_>, action: &ActionDef) -> Result<String, ActionError> {
        let ActionKind::Report { url, format } = &action.kind else {
            return Err(mismatch(self.action_type(), action));
        };
        let request = RenderRequest {
            url: ctx.interpolate(url),
            format: format.clone(),
            output: output_path(&self.output_dir, ctx.watch_id, ctx.tick, &action.name, format),
        };
        let written = self.renderer.render(request).await?;
        Ok(format!("rendered {}", written.display()))
    }
}
