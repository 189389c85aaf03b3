// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle: one-time initialization, run, and drain.

mod startup;
pub use startup::{check_legacy_config, startup, startup_with, wait_for_health};

use std::path::PathBuf;
use std::time::Duration;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use wt_adapters::{RendererCapability, SearchBackend, SearchError, WebhookError};
use wt_core::SystemClock;
use wt_engine::{EscalationRequest, EsWatchRepository, Scheduler, TickSchedule};

use crate::config::ConfigError;

/// Scheduler with the daemon's concrete repository and clock.
pub type DaemonScheduler<B> = Scheduler<EsWatchRepository<B>, B, SystemClock>;

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("legacy config {0} found; migrate it to watchtower.toml and remove it")]
    LegacyConfig(PathBuf),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("search backend error: {0}")]
    Search(#[from] SearchError),

    #[error("webhook client error: {0}")]
    Webhook(#[from] WebhookError),

    #[error("initialization already in progress")]
    InitInProgress,

    #[error("initialization previously failed: {0}")]
    InitFailed(String),

    #[error("cancelled during startup")]
    Cancelled,
}

/// One-time initialization state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitState {
    Uninitialized,
    Initializing,
    Ready,
    Failed(String),
}

/// Guards the single Uninitialized -> Initializing -> {Ready, Failed} pass.
#[derive(Debug)]
pub struct InitGate {
    state: Mutex<InitState>,
}

impl Default for InitGate {
    fn default() -> Self {
        Self { state: Mutex::new(InitState::Uninitialized) }
    }
}

impl InitGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> InitState {
        self.state.lock().clone()
    }

    /// Claim initialization. `Ok(false)` means it already completed and the
    /// caller has nothing to do.
    pub fn begin(&self) -> Result<bool, LifecycleError> {
        let mut state = self.state.lock();
        match &*state {
            InitState::Uninitialized => {
                *state = InitState::Initializing;
                Ok(true)
            }
            InitState::Ready => Ok(false),
            InitState::Initializing => Err(LifecycleError::InitInProgress),
            InitState::Failed(reason) => Err(LifecycleError::InitFailed(reason.clone())),
        }
    }

    pub fn succeed(&self) {
        let mut state = self.state.lock();
        if *state == InitState::Initializing {
            *state = InitState::Ready;
        }
    }

    pub fn fail(&self, reason: impl Into<String>) {
        let mut state = self.state.lock();
        if *state == InitState::Initializing {
            *state = InitState::Failed(reason.into());
        }
    }
}

/// A fully wired daemon, ready to run.
pub struct Daemon<B: SearchBackend> {
    pub scheduler: DaemonScheduler<B>,
    pub schedule: TickSchedule,
    pub renderer: RendererCapability,
    escalations: mpsc::Receiver<EscalationRequest>,
    drain_timeout: Duration,
}

impl<B: SearchBackend> Daemon<B> {
    /// Run the tick loop until `cancel`, then drain.
    pub async fn run(self, cancel: CancellationToken) {
        self.scheduler.run(self.schedule, self.escalations, cancel, self.drain_timeout).await;
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
