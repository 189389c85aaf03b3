// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scheduler loop: enumerate watches each tick and execute them.
//!
//! Each admitted watch runs on its own task, bounded by a semaphore and a
//! per-watch timeout. Ticks may overlap; the per-watch in-flight guard
//! keeps a slow watch from being started twice, and never holds back
//! unrelated watches. Every execution ends in exactly one alarm write
//! attempt, errors included.

use crate::actions::EscalationRequest;
use crate::dispatcher::Dispatcher;
use crate::evaluator::Evaluator;
use crate::recorder::{AlarmRecorder, ExecutionRecord};
use crate::repository::{RepositoryError, WatchRepository};
use crate::run_state::{InflightGuard, RunState, Skip};
use crate::schedule::TickSchedule;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use wt_adapters::SearchBackend;
use wt_core::{Clock, Tick, Verdict, Watch, WatchId};

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub max_concurrent_watches: usize,
    /// Bounds evaluation plus dispatch of one watch.
    pub watch_timeout: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { max_concurrent_watches: 16, watch_timeout: Duration::from_secs(60) }
    }
}

/// Result of one watch for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchOutcome {
    Executed { verdict: Verdict, recorded: bool },
    Skipped(Skip),
}

/// Counts for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub tick: Tick,
    pub listed: usize,
    pub executed: usize,
    pub fired: usize,
    pub not_fired: usize,
    pub errored: usize,
    pub skipped: usize,
    /// Executions whose alarm could not be written.
    pub unrecorded: usize,
}

impl TickSummary {
    fn add(&mut self, outcome: WatchOutcome) {
        match outcome {
            WatchOutcome::Skipped(_) => self.skipped += 1,
            WatchOutcome::Executed { verdict, recorded } => {
                self.executed += 1;
                match verdict {
                    Verdict::Fired => self.fired += 1,
                    Verdict::NotFired => self.not_fired += 1,
                    Verdict::Errored => self.errored += 1,
                }
                if !recorded {
                    self.unrecorded += 1;
                }
            }
        }
    }
}

struct Inner<R, B, C: Clock> {
    repository: R,
    evaluator: Evaluator<B>,
    dispatcher: Dispatcher<C>,
    recorder: AlarmRecorder<B, C>,
    run_state: Arc<RunState>,
    permits: Semaphore,
    watch_timeout: Duration,
    clock: C,
}

/// Cheap to clone; clones share all state.
pub struct Scheduler<R, B, C: Clock> {
    inner: Arc<Inner<R, B, C>>,
}

impl<R, B, C: Clock> Clone for Scheduler<R, B, C> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<R, B, C> Scheduler<R, B, C>
where
    R: WatchRepository,
    B: SearchBackend,
    C: Clock,
{
    pub fn new(
        repository: R,
        evaluator: Evaluator<B>,
        dispatcher: Dispatcher<C>,
        recorder: AlarmRecorder<B, C>,
        run_state: Arc<RunState>,
        config: SchedulerConfig,
        clock: C,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                repository,
                evaluator,
                dispatcher,
                recorder,
                run_state,
                permits: Semaphore::new(config.max_concurrent_watches.max(1)),
                watch_timeout: config.watch_timeout,
                clock,
            }),
        }
    }

    pub fn run_state(&self) -> &Arc<RunState> {
        &self.inner.run_state
    }

    /// Execute every admitted watch for `tick` and wait for all of them.
    ///
    /// Fails only when the watch set cannot be enumerated, in which case
    /// nothing is executed or recorded.
    pub async fn run_tick(&self, tick: Tick) -> Result<TickSummary, RepositoryError> {
        let start = self.inner.clock.now();
        tracing::info!(%tick, "tick started");

        let refs = self.inner.repository.list_active().await?;
        let listed: HashSet<WatchId> = refs.iter().map(|r| r.id.clone()).collect();
        self.inner.run_state.retain(&listed);

        let mut summary = TickSummary { tick, listed: refs.len(), ..TickSummary::default() };
        let mut tasks = JoinSet::new();
        for watch_ref in refs {
            match self.inner.run_state.try_begin(&watch_ref.id, tick) {
                Ok(guard) => {
                    let this = self.clone();
                    tasks.spawn(async move { this.execute(guard, tick, false).await });
                }
                Err(skip) => {
                    tracing::debug!(watch_id = %watch_ref.id, %tick, %skip, "watch skipped");
                    summary.add(WatchOutcome::Skipped(skip));
                }
            }
        }
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => summary.add(outcome),
                Err(e) => {
                    tracing::error!(%tick, error = %e, "watch task failed");
                    summary.errored += 1;
                    summary.unrecorded += 1;
                }
            }
        }

        tracing::info!(
            %tick,
            listed = summary.listed,
            executed = summary.executed,
            fired = summary.fired,
            not_fired = summary.not_fired,
            errored = summary.errored,
            skipped = summary.skipped,
            elapsed_ms = self.inner.clock.now().saturating_duration_since(start).as_millis() as u64,
            "tick finished"
        );
        Ok(summary)
    }

    /// Run an escalation target for the source's tick.
    ///
    /// Same in-flight and same-tick guards as a scheduled run. The target's
    /// interval and `enabled` flag are ignored, so a disabled watch can
    /// serve as an escalation-only target.
    pub async fn run_escalation(&self, request: EscalationRequest) -> WatchOutcome {
        match self.inner.run_state.try_begin(&request.target, request.tick) {
            Ok(guard) => {
                tracing::info!(
                    watch_id = %request.target,
                    source = %request.source,
                    tick = %request.tick,
                    "running escalation"
                );
                self.execute(guard, request.tick, true).await
            }
            Err(skip) => {
                tracing::info!(
                    watch_id = %request.target,
                    source = %request.source,
                    tick = %request.tick,
                    %skip,
                    "escalation skipped"
                );
                WatchOutcome::Skipped(skip)
            }
        }
    }

    async fn execute(&self, guard: InflightGuard, tick: Tick, escalated: bool) -> WatchOutcome {
        let id = guard.watch_id().clone();
        let Ok(_permit) = self.inner.permits.acquire().await else {
            return WatchOutcome::Skipped(Skip::ShuttingDown);
        };
        let start = self.inner.clock.now();

        let record = match self.inner.repository.load(&id).await {
            Ok(watch) if !watch.enabled && !escalated => {
                return WatchOutcome::Skipped(Skip::Disabled)
            }
            Ok(watch) if !escalated && !self.inner.run_state.is_due(&id, tick, watch.interval) => {
                return WatchOutcome::Skipped(Skip::NotDue)
            }
            Ok(watch) => {
                self.inner.run_state.mark_ran(&id, tick);
                let timeout = self.inner.watch_timeout;
                match tokio::time::timeout(timeout, self.evaluate_and_dispatch(&watch, tick)).await
                {
                    Ok(record) => record,
                    Err(_) => ExecutionRecord::errored(
                        id.clone(),
                        tick,
                        format!("watch timed out after {}", wt_core::format_duration(timeout)),
                    ),
                }
            }
            Err(RepositoryError::NotFound(_)) => return WatchOutcome::Skipped(Skip::Missing),
            Err(e) => ExecutionRecord::errored(id.clone(), tick, e.to_string()),
        };

        let verdict = record.verdict;
        let failed_actions = record.actions.iter().filter(|a| !a.success()).count();
        if let Some(error) = &record.error {
            tracing::warn!(watch_id = %id, %tick, %error, "watch errored");
        }
        let recorded = self.inner.recorder.record(record).await.is_ok();
        tracing::info!(
            watch_id = %id,
            %tick,
            %verdict,
            failed_actions,
            elapsed_ms = self.inner.clock.now().saturating_duration_since(start).as_millis() as u64,
            "watch executed"
        );
        drop(guard);
        WatchOutcome::Executed { verdict, recorded }
    }

    async fn evaluate_and_dispatch(&self, watch: &Watch, tick: Tick) -> ExecutionRecord {
        match self.inner.evaluator.evaluate(watch).await {
            Err(e) => ExecutionRecord::errored(watch.id.clone(), tick, e.to_string()),
            Ok(evaluation) => {
                let actions = if evaluation.fired() {
                    self.inner.dispatcher.dispatch(watch, tick, &evaluation.payload).await
                } else {
                    Vec::new()
                };
                ExecutionRecord {
                    watch_id: watch.id.clone(),
                    tick,
                    verdict: evaluation.verdict,
                    payload: evaluation.payload,
                    error: None,
                    actions,
                }
            }
        }
    }

    /// Fire ticks on `schedule` until `cancel`, then wait up to
    /// `drain_timeout` for running ticks and escalations.
    pub async fn run(
        self,
        schedule: TickSchedule,
        mut escalations: mpsc::Receiver<EscalationRequest>,
        cancel: CancellationToken,
        drain_timeout: Duration,
    ) {
        tracing::info!(%schedule, "scheduler started");
        let tracker = TaskTracker::new();
        let mut last: Option<Tick> = None;
        loop {
            let now = self.inner.clock.epoch_ms();
            // Never reuse a tick, even if the timer fires early.
            let next = schedule.next_after(last.map_or(now, |t| now.max(t.epoch_ms())));
            let wait = Duration::from_millis(next.epoch_ms().saturating_sub(now));

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(wait) => {
                    last = Some(next);
                    let this = self.clone();
                    tracker.spawn(async move {
                        if let Err(e) = this.run_tick(next).await {
                            tracing::error!(tick = %next, error = %e, "tick skipped");
                        }
                    });
                }
                Some(request) = escalations.recv() => {
                    let this = self.clone();
                    tracker.spawn(async move {
                        this.run_escalation(request).await;
                    });
                }
            }
        }

        tracker.close();
        tracing::info!(tasks = tracker.len(), "scheduler stopping, draining");
        if tokio::time::timeout(drain_timeout, tracker.wait()).await.is_err() {
            tracing::warn!(
                in_flight = self.inner.run_state.in_flight_count(),
                "drain timed out; abandoning running watches"
            );
        }
        tracing::info!("scheduler stopped");
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
