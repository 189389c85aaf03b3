// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Report rendering through an external renderer binary.
//!
//! The binary is resolved once at startup into a [`RendererCapability`].
//! An unresolved renderer does not stop the daemon; report actions fail
//! with [`RenderError::Unavailable`] instead.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default binary name looked up on `PATH`.
pub const DEFAULT_RENDERER: &str = "chromium-render";

/// Errors from report rendering
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("renderer unavailable: {0}")]
    Unavailable(String),
    #[error("failed to prepare output: {0}")]
    Io(String),
    #[error("renderer failed to start: {0}")]
    Spawn(String),
    #[error("renderer exited with {code}: {stderr}")]
    Failed { code: i32, stderr: String },
}

/// Whether a renderer binary can be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RendererCapability {
    Available { binary: PathBuf },
    Unavailable { reason: String },
}

impl RendererCapability {
    /// Resolve the renderer from an explicit path, falling back to a `PATH`
    /// lookup of `default_name`.
    pub fn resolve(configured: Option<&Path>, default_name: &str) -> Self {
        match configured {
            Some(path) if path.is_file() => {
                RendererCapability::Available { binary: path.to_path_buf() }
            }
            Some(path) => RendererCapability::Unavailable {
                reason: format!("configured renderer {} not found", path.display()),
            },
            None => match which::which(default_name) {
                Ok(binary) => RendererCapability::Available { binary },
                Err(e) => RendererCapability::Unavailable {
                    reason: format!("{} not found on PATH: {}", default_name, e),
                },
            },
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, RendererCapability::Available { .. })
    }
}

/// One report to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    pub url: String,
    pub format: String,
    pub output: PathBuf,
}

/// Adapter for rendering reports
#[async_trait]
pub trait RenderAdapter: Clone + Send + Sync + 'static {
    /// Render the report, returning the path written.
    async fn render(&self, request: RenderRequest) -> Result<PathBuf, RenderError>;
}

/// Runs `<binary> <url> <output> <format>` as a child process.
#[derive(Debug, Clone)]
pub struct ProcessRenderer {
    capability: RendererCapability,
}

impl ProcessRenderer {
    pub fn new(capability: RendererCapability) -> Self {
        Self { capability }
    }

    pub fn capability(&self) -> &RendererCapability {
        &self.capability
    }
}

#[async_trait]
impl RenderAdapter for ProcessRenderer {
    async fn render(&self, request: RenderRequest) -> Result<PathBuf, RenderError> {
        let binary = match &self.capability {
            RendererCapability::Available { binary } => binary,
            RendererCapability::Unavailable { reason } => {
                return Err(RenderError::Unavailable(reason.clone()))
            }
        };
        if let Some(parent) = request.output.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| RenderError::Io(format!("{}: {}", parent.display(), e)))?;
        }

        let mut cmd = tokio::process::Command::new(binary);
        cmd.arg(&request.url).arg(&request.output).arg(&request.format).kill_on_drop(true);
        tracing::debug!(binary = %binary.display(), url = %request.url, "rendering report");

        let output = cmd.output().await.map_err(|e| RenderError::Spawn(e.to_string()))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RenderError::Failed {
                code: output.status.code().unwrap_or(-1),
                stderr: wt_core::short(stderr.trim(), 512).to_string(),
            });
        }
        Ok(request.output)
    }
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::{RenderAdapter, RenderError, RenderRequest};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Default)]
    struct FakeRenderState {
        calls: Vec<RenderRequest>,
        unavailable: Option<String>,
        delay: Option<Duration>,
    }

    /// Fake renderer that records requests without writing files
    #[derive(Clone, Default)]
    pub struct FakeRenderer {
        inner: Arc<Mutex<FakeRenderState>>,
    }

    impl FakeRenderer {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_unavailable(&self, reason: impl Into<String>) {
            self.inner.lock().unavailable = Some(reason.into());
        }

        /// Delay before each render completes.
        pub fn delay(&self, delay: Duration) {
            self.inner.lock().delay = Some(delay);
        }

        pub fn calls(&self) -> Vec<RenderRequest> {
            self.inner.lock().calls.clone()
        }
    }

    #[async_trait]
    impl RenderAdapter for FakeRenderer {
        async fn render(&self, request: RenderRequest) -> Result<PathBuf, RenderError> {
            let (output, delay) = {
                let mut state = self.inner.lock();
                if let Some(reason) = &state.unavailable {
                    return Err(RenderError::Unavailable(reason.clone()));
                }
                let output = request.output.clone();
                state.calls.push(request);
                (output, state.delay)
            };
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            Ok(output)
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeRenderer;

#[cfg(test)]
#[path = "renderer_tests.rs"]
mod tests;
