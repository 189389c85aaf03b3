// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! wt-core: domain types shared by the Watchtower engine and daemon

pub mod macros;

pub mod alarm;
pub mod clock;
pub mod duration;
pub mod id;
pub mod payload;
pub mod template;
pub mod watch;

pub use alarm::{ActionOutcome, ActionStatus, Alarm, AlarmId, Tick, Verdict};
pub use clock::{Clock, FakeClock, SystemClock};
pub use duration::{format_duration, parse_duration};
pub use id::short;
pub use payload::lookup;
pub use template::interpolate;
#[cfg(any(test, feature = "test-support"))]
pub use watch::WatchBuilder;
pub use watch::{
    ActionDef, ActionKind, ActionType, CompareOp, Condition, QuerySpec, Transform, Watch, WatchId,
    WatchRef,
};
