// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-wide scheduler bookkeeping.
//!
//! Created once at startup and shared by `Arc`. Everything here is in
//! memory and resets on restart; the alarm index's create-only writes are
//! what keep a restarted process from duplicating alarms.

use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};
use wt_core::{Tick, WatchId};

/// Why a listed watch did not execute for a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skip {
    /// A previous execution of the watch is still running.
    InFlight,
    /// The watch already ran for this tick (or a later one).
    AlreadyRan,
    /// The watch's own interval has not elapsed.
    NotDue,
    /// Disabled between listing and loading.
    Disabled,
    /// Deleted between listing and loading.
    Missing,
    ShuttingDown,
}

wt_core::simple_display! {
    Skip {
        InFlight => "in_flight",
        AlreadyRan => "already_ran",
        NotDue => "not_due",
        Disabled => "disabled",
        Missing => "missing",
        ShuttingDown => "shutting_down",
    }
}

#[derive(Default)]
struct Inner {
    in_flight: HashSet<WatchId>,
    /// Last tick each watch was admitted for.
    last_tick: HashMap<WatchId, Tick>,
    /// Last tick each watch actually executed (interval spacing).
    last_run: HashMap<WatchId, Tick>,
    /// When each watch last ran its actions (throttle).
    last_actions: HashMap<WatchId, Instant>,
    latest_tick: Option<Tick>,
}

impl Inner {
    fn admissible(&self, id: &WatchId, tick: Tick) -> Result<(), Skip> {
        if self.in_flight.contains(id) {
            return Err(Skip::InFlight);
        }
        if self.last_tick.get(id).is_some_and(|last| *last >= tick) {
            return Err(Skip::AlreadyRan);
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct RunState {
    inner: Mutex<Inner>,
}

impl RunState {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Admit `id` for `tick`: not in flight and not yet run for this tick.
    ///
    /// On success the watch is marked in flight until the returned guard
    /// drops, and `tick` is consumed for it even if the execution later
    /// turns out not to be due.
    pub fn try_begin(self: &Arc<Self>, id: &WatchId, tick: Tick) -> Result<InflightGuard, Skip> {
        let mut inner = self.inner.lock();
        inner.admissible(id, tick)?;
        inner.in_flight.insert(id.clone());
        inner.last_tick.insert(id.clone(), tick);
        if inner.latest_tick.is_none_or(|latest| tick > latest) {
            inner.latest_tick = Some(tick);
        }
        Ok(InflightGuard { state: Arc::clone(self), id: id.clone() })
    }

    /// What [`RunState::try_begin`] would answer right now, without
    /// admitting anything.
    pub fn check(&self, id: &WatchId, tick: Tick) -> Result<(), Skip> {
        self.inner.lock().admissible(id, tick)
    }

    /// Whether `interval` has elapsed since the watch last executed.
    pub fn is_due(&self, id: &WatchId, tick: Tick, interval: Option<Duration>) -> bool {
        let Some(interval) = interval else { return true };
        match self.inner.lock().last_run.get(id) {
            Some(last) => {
                tick.epoch_ms().saturating_sub(last.epoch_ms()) >= interval.as_millis() as u64
            }
            None => true,
        }
    }

    pub fn mark_ran(&self, id: &WatchId, tick: Tick) {
        self.inner.lock().last_run.insert(id.clone(), tick);
    }

    /// Whether the watch ran its actions less than `window` before `now`.
    pub fn within_throttle(&self, id: &WatchId, window: Duration, now: Instant) -> bool {
        self.inner
            .lock()
            .last_actions
            .get(id)
            .is_some_and(|at| now.saturating_duration_since(*at) < window)
    }

    pub fn mark_actions_ran(&self, id: &WatchId, now: Instant) {
        self.inner.lock().last_actions.insert(id.clone(), now);
    }

    pub fn is_in_flight(&self, id: &WatchId) -> bool {
        self.inner.lock().in_flight.contains(id)
    }

    pub fn in_flight_count(&self) -> usize {
        self.inner.lock().in_flight.len()
    }

    /// Most recent tick any watch was admitted for.
    pub fn latest_tick(&self) -> Option<Tick> {
        self.inner.lock().latest_tick
    }

    /// Drop bookkeeping for watches no longer listed. In-flight watches
    /// keep their entries until they finish.
    pub fn retain(&self, listed: &HashSet<WatchId>) {
        let mut inner = self.inner.lock();
        let Inner { in_flight, last_tick, last_run, last_actions, .. } = &mut *inner;
        let keep = |id: &WatchId| listed.contains(id) || in_flight.contains(id);
        last_tick.retain(|id, _| keep(id));
        last_run.retain(|id, _| keep(id));
        last_actions.retain(|id, _| keep(id));
    }
}

/// Clears the in-flight flag when dropped, including when the owning task
/// is cancelled or panics.
pub struct InflightGuard {
    state: Arc<RunState>,
    id: WatchId,
}

impl InflightGuard {
    pub fn watch_id(&self) -> &WatchId {
        &self.id
    }
}

impl Drop for InflightGuard {
    fn drop(&mut self) {
        self.state.inner.lock().in_flight.remove(&self.id);
    }
}

#[cfg(test)]
#[path = "run_state_tests.rs"]
mod tests;
