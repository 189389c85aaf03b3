// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tick cadence.
//!
//! `"25,55"` fires at those seconds of every minute; `"30s"` or `"1m"`
//! fires at a fixed interval aligned to the epoch. A tick is identified by
//! the epoch milliseconds it was scheduled for.

use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use wt_core::{parse_duration, Tick};

/// Errors from parsing a tick schedule
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("empty schedule")]
    Empty,
    #[error("invalid second of minute '{0}' (expected 0-59)")]
    InvalidSecond(String),
    #[error("invalid interval: {0}")]
    InvalidInterval(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickSchedule {
    /// Sorted, deduplicated seconds of the minute.
    SecondsOfMinute(Vec<u32>),
    Every(Duration),
}

impl Default for TickSchedule {
    fn default() -> Self {
        TickSchedule::SecondsOfMinute(vec![25, 55])
    }
}

impl FromStr for TickSchedule {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ScheduleError::Empty);
        }
        if s.chars().any(|c| c.is_ascii_alphabetic()) {
            let interval = parse_duration(s).map_err(ScheduleError::InvalidInterval)?;
            if interval.as_millis() == 0 {
                return Err(ScheduleError::InvalidInterval(format!("'{}' is zero", s)));
            }
            return Ok(TickSchedule::Every(interval));
        }
        let mut seconds = s
            .split(',')
            .map(|part| {
                let part = part.trim();
                part.parse::<u32>()
                    .ok()
                    .filter(|sec| *sec < 60)
                    .ok_or_else(|| ScheduleError::InvalidSecond(part.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        seconds.sort_unstable();
        seconds.dedup();
        Ok(TickSchedule::SecondsOfMinute(seconds))
    }
}

impl std::fmt::Display for TickSchedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TickSchedule::SecondsOfMinute(seconds) => {
                let parts: Vec<String> = seconds.iter().map(u32::to_string).collect();
                write!(f, "{}", parts.join(","))
            }
            TickSchedule::Every(interval) => write!(f, "{}", wt_core::format_duration(*interval)),
        }
    }
}

impl TickSchedule {
    /// First scheduled tick strictly after `epoch_ms`.
    pub fn next_after(&self, epoch_ms: u64) -> Tick {
        match self {
            TickSchedule::SecondsOfMinute(seconds) => {
                let minute = epoch_ms - epoch_ms % 60_000;
                let in_minute = seconds
                    .iter()
                    .map(|sec| minute + u64::from(*sec) * 1_000)
                    .find(|candidate| *candidate > epoch_ms);
                match (in_minute, seconds.first()) {
                    (Some(at), _) => Tick(at),
                    (None, Some(first)) => Tick(minute + 60_000 + u64::from(*first) * 1_000),
                    // Unreachable through FromStr; fall back to the next minute.
                    (None, None) => Tick(minute + 60_000),
                }
            }
            TickSchedule::Every(interval) => {
                let step = (interval.as_millis() as u64).max(1);
                Tick((epoch_ms / step + 1) * step)
            }
        }
    }
}

#[cfg(test)]
#[path = "schedule_tests.rs"]
mod tests;
