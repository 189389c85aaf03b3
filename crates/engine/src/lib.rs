// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! wt-engine: watch scheduling and execution

pub mod actions;
pub mod dispatcher;
pub mod evaluator;
pub mod recorder;
pub mod repository;
pub mod run_state;
pub mod schedule;
pub mod scheduler;

pub use actions::{
    ActionContext, ActionError, ActionRegistry, ActionRunner, ConsoleRunner, EscalationRequest,
    EscalationRunner, NotificationRunner, ReportRunner, WebhookRunner,
};
pub use dispatcher::Dispatcher;
pub use evaluator::{EvalError, Evaluation, Evaluator};
pub use recorder::{AlarmRecorder, ExecutionRecord, RecordError};
pub use repository::{EsWatchRepository, RepositoryError, WatchRepository};
pub use run_state::{InflightGuard, RunState, Skip};
pub use schedule::{ScheduleError, TickSchedule};
pub use scheduler::{Scheduler, SchedulerConfig, TickSummary, WatchOutcome};
