// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Alarm recorder: persists one alarm per (watch, tick).
//!
//! The alarm id is derived from the execution key and written create-only,
//! so recording the same execution twice leaves the first alarm in place.

use serde_json::Value;
use thiserror::Error;
use wt_adapters::{SearchBackend, SearchError, WriteAck};
use wt_core::{ActionOutcome, Alarm, AlarmId, Clock, Tick, Verdict, WatchId};

/// Errors from recording an alarm
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("failed to encode alarm {0}: {1}")]
    Encode(AlarmId, String),
    #[error("failed to write alarm {0}: {1}")]
    WriteFailed(AlarmId, #[source] SearchError),
}

/// Everything known about one finished execution.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionRecord {
    pub watch_id: WatchId,
    pub tick: Tick,
    pub verdict: Verdict,
    pub payload: Value,
    pub error: Option<String>,
    pub actions: Vec<ActionOutcome>,
}

impl ExecutionRecord {
    pub fn errored(watch_id: WatchId, tick: Tick, error: impl Into<String>) -> Self {
        Self {
            watch_id,
            tick,
            verdict: Verdict::Errored,
            payload: Value::Null,
            error: Some(error.into()),
            actions: Vec::new(),
        }
    }
}

#[derive(Clone)]
pub struct AlarmRecorder<B, C> {
    backend: B,
    index: String,
    clock: C,
}

impl<B: SearchBackend, C: Clock> AlarmRecorder<B, C> {
    pub fn new(backend: B, index: impl Into<String>, clock: C) -> Self {
        Self { backend, index: index.into(), clock }
    }

    /// Write the alarm for `record`. Not retried; failures are logged here
    /// and returned.
    pub async fn record(&self, record: ExecutionRecord) -> Result<WriteAck, RecordError> {
        let alarm = Alarm::new(
            record.watch_id,
            record.tick,
            record.verdict,
            record.payload,
            record.error,
            record.actions,
            self.clock.epoch_ms(),
        );
        let doc = serde_json::to_value(&alarm)
            .map_err(|e| RecordError::Encode(alarm.id.clone(), e.to_string()))?;

        match self.backend.create(&self.index, alarm.id.as_str(), &doc).await {
            Ok(WriteAck::Created) => {
                tracing::debug!(alarm_id = %alarm.id, verdict = %alarm.verdict, "alarm recorded");
                Ok(WriteAck::Created)
            }
            Ok(WriteAck::AlreadyExists) => {
                tracing::debug!(alarm_id = %alarm.id, "alarm already recorded");
                Ok(WriteAck::AlreadyExists)
            }
            Err(e) => {
                tracing::error!(
                    alarm_id = %alarm.id,
                    watch_id = %alarm.watch_id,
                    tick = %alarm.tick,
                    error = %e,
                    "failed to record alarm"
                );
                Err(RecordError::WriteFailed(alarm.id, e))
            }
        }
    }
}

#[cfg(test)]
#[path = "recorder_tests.rs"]
mod tests;
