// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon startup: validate the environment, wait for the backend, and
//! wire the engine.

use std::path::Path;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use wt_adapters::{
    ClusterHealth, DesktopNotifyAdapter, EsClient, HttpWebhookAdapter, ProcessRenderer,
    RendererCapability, SearchBackend, DEFAULT_RENDERER,
};
use wt_core::SystemClock;
use wt_engine::{
    ActionRegistry, AlarmRecorder, ConsoleRunner, Dispatcher, EscalationRunner, EsWatchRepository,
    Evaluator, NotificationRunner, ReportRunner, RunState, Scheduler, WebhookRunner,
};

use super::{Daemon, InitGate, LifecycleError};
use crate::config::Config;

const HEALTH_POLL_INITIAL: Duration = Duration::from_secs(1);
const HEALTH_POLL_MAX: Duration = Duration::from_secs(30);
const ESCALATION_QUEUE: usize = 64;
const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Refuse to start while an old-format config file is still present.
pub fn check_legacy_config(path: &Path) -> Result<(), LifecycleError> {
    if path.exists() {
        return Err(LifecycleError::LegacyConfig(path.to_path_buf()));
    }
    Ok(())
}

/// Poll cluster health with doubling backoff until it reaches `min`.
pub async fn wait_for_health<B: SearchBackend>(
    backend: &B,
    min: ClusterHealth,
    cancel: &CancellationToken,
) -> Result<ClusterHealth, LifecycleError> {
    let mut delay = HEALTH_POLL_INITIAL;
    loop {
        match backend.health().await {
            Ok(health) if health >= min => {
                info!(%health, "search backend ready");
                return Ok(health);
            }
            Ok(health) => info!(%health, required = %min, "waiting for search backend health"),
            Err(e) => warn!(error = %e, "search backend health check failed"),
        }
        tokio::select! {
            _ = cancel.cancelled() => return Err(LifecycleError::Cancelled),
            _ = tokio::time::sleep(delay) => {}
        }
        delay = (delay * 2).min(HEALTH_POLL_MAX);
    }
}

/// Start the daemon against the configured search backend.
///
/// Returns `Ok(None)` when `gate` shows initialization already completed.
pub async fn startup(
    gate: &InitGate,
    config: &Config,
    cancel: &CancellationToken,
) -> Result<Option<Daemon<EsClient>>, LifecycleError> {
    check_legacy_config(&crate::env::legacy_config_path())?;
    let backend = EsClient::new(config.search_client())?;
    startup_with(gate, config, backend, cancel).await
}

/// Start the daemon against an already constructed backend.
pub async fn startup_with<B: SearchBackend>(
    gate: &InitGate,
    config: &Config,
    backend: B,
    cancel: &CancellationToken,
) -> Result<Option<Daemon<B>>, LifecycleError> {
    if !gate.begin()? {
        info!("already initialized");
        return Ok(None);
    }
    match build(config, backend, cancel).await {
        Ok(daemon) => {
            gate.succeed();
            info!(schedule = %daemon.schedule, "daemon ready");
            Ok(Some(daemon))
        }
        Err(e) => {
            gate.fail(e.to_string());
            Err(e)
        }
    }
}

async fn build<B: SearchBackend>(
    config: &Config,
    backend: B,
    cancel: &CancellationToken,
) -> Result<Daemon<B>, LifecycleError> {
    let schedule = config.tick_schedule()?;
    wait_for_health(&backend, config.search.min_health, cancel).await?;

    let renderer =
        RendererCapability::resolve(config.report.renderer_path.as_deref(), DEFAULT_RENDERER);
    match &renderer {
        RendererCapability::Available { binary } => {
            info!(binary = %binary.display(), "report renderer available")
        }
        RendererCapability::Unavailable { reason } => {
            warn!(%reason, "report renderer unavailable; report actions will fail")
        }
    }

    let actions = &config.actions;
    let (escalation_tx, escalations) = mpsc::channel(ESCALATION_QUEUE);
    let webhook = HttpWebhookAdapter::new(actions.default_timeout)?;
    let run_state = RunState::new();
    let registry = ActionRegistry::new()
        .register(ConsoleRunner)
        .register(NotificationRunner::new(DesktopNotifyAdapter::new()))
        .register(WebhookRunner::new(webhook))
        .register(ReportRunner::new(
            ProcessRenderer::new(renderer.clone()),
            config.report.output_dir.clone(),
            actions.max_concurrent_reports,
        ))
        .register(EscalationRunner::new(escalation_tx, run_state.clone()));

    let clock = SystemClock;
    let scheduler = Scheduler::new(
        EsWatchRepository::new(backend.clone(), config.search.watch_index.clone()),
        Evaluator::new(backend.clone(), config.scheduler.query_timeout),
        Dispatcher::new(
            registry,
            actions.max_concurrent,
            actions.default_timeout,
            run_state.clone(),
            clock,
        ),
        AlarmRecorder::new(backend, config.search.alarm_index.clone(), clock),
        run_state,
        config.scheduler_config(),
        clock,
    );

    Ok(Daemon {
        scheduler,
        schedule,
        renderer,
        escalations,
        drain_timeout: crate::env::drain_timeout().unwrap_or(DEFAULT_DRAIN_TIMEOUT),
    })
}

#[cfg(test)]
#[path = "startup_tests.rs"]
mod tests;
