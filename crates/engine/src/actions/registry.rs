// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::ActionRunner;
use std::collections::HashMap;
use std::sync::Arc;
use wt_core::ActionType;

/// Runners keyed by action type. Built once at startup and shared.
#[derive(Clone, Default)]
pub struct ActionRegistry {
    runners: HashMap<ActionType, Arc<dyn ActionRunner>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `runner` under its own type, replacing any earlier one.
    pub fn register(mut self, runner: impl ActionRunner) -> Self {
        self.runners.insert(runner.action_type(), Arc::new(runner));
        self
    }

    pub fn get(&self, action_type: ActionType) -> Option<Arc<dyn ActionRunner>> {
        self.runners.get(&action_type).cloned()
    }

    /// Action types without a runner, in declaration order.
    pub fn missing(&self) -> Vec<ActionType> {
        ActionType::ALL.into_iter().filter(|t| !self.runners.contains_key(t)).collect()
    }
}

impl std::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut types: Vec<_> = self.runners.keys().collect();
        types.sort();
        f.debug_struct("ActionRegistry").field("runners", &types).finish()
    }
}
