// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Alarm records: the persisted outcome of one watch execution.
//!
//! An alarm is keyed by (watch id, tick). The document id is derived from
//! that key so a second write of the same execution collides instead of
//! duplicating.

use crate::watch::{ActionType, WatchId};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

crate::define_id! {
    /// Deterministic alarm document id: `{watch_id}@{tick_ms}`.
    pub struct AlarmId;
}

impl AlarmId {
    pub fn for_execution(watch_id: &WatchId, tick: Tick) -> Self {
        Self::new(format!("{}@{}", watch_id, tick.epoch_ms()))
    }
}

/// One scheduled invocation of the scheduler loop, identified by the epoch
/// milliseconds it was scheduled for (not when it actually ran).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tick(pub u64);

impl Tick {
    pub fn epoch_ms(self) -> u64 {
        self.0
    }

    pub fn to_datetime(self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.0 as i64).single().unwrap_or_default()
    }
}

impl std::fmt::Display for Tick {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_datetime().format("%Y-%m-%dT%H:%M:%S%.3fZ"))
    }
}

/// Outcome of one watch execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Fired,
    NotFired,
    Errored,
}

crate::simple_display! {
    Verdict {
        Fired => "fired",
        NotFired => "not_fired",
        Errored => "errored",
    }
}

/// Result status of a single action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    Succeeded,
    Failed,
    TimedOut,
    /// Skipped because the watch fired inside its throttle window.
    Throttled,
}

crate::simple_display! {
    ActionStatus {
        Succeeded => "succeeded",
        Failed => "failed",
        TimedOut => "timed_out",
        Throttled => "throttled",
    }
}

/// Per-action result recorded in the alarm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub name: String,
    #[serde(rename = "type")]
    pub action_type: ActionType,
    pub status: ActionStatus,
    pub detail: String,
    pub elapsed_ms: u64,
}

impl ActionOutcome {
    pub fn success(&self) -> bool {
        self.status == ActionStatus::Succeeded
    }
}

/// Persisted record of a single watch execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alarm {
    pub id: AlarmId,
    pub watch_id: WatchId,
    pub tick: Tick,
    #[serde(rename = "@timestamp")]
    pub timestamp: DateTime<Utc>,
    pub verdict: Verdict,
    /// Payload snapshot; null when the execution errored.
    pub payload: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub actions: Vec<ActionOutcome>,
    pub recorded_at_ms: u64,
}

impl Alarm {
    pub fn new(
        watch_id: WatchId,
        tick: Tick,
        verdict: Verdict,
        payload: Value,
        error: Option<String>,
        actions: Vec<ActionOutcome>,
        recorded_at_ms: u64,
    ) -> Self {
        // An errored execution never carries a payload.
        let payload = if verdict == Verdict::Errored { Value::Null } else { payload };
        Self {
            id: AlarmId::for_execution(&watch_id, tick),
            watch_id,
            tick,
            timestamp: tick.to_datetime(),
            verdict,
            payload,
            error,
            actions,
            recorded_at_ms,
        }
    }

    pub fn failed_actions(&self) -> usize {
        self.actions.iter().filter(|a| !a.success() && a.status != ActionStatus::Throttled).count()
    }
}

#[cfg(test)]
#[path = "alarm_tests.rs"]
mod tests;
