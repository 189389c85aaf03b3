// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Watch definitions: stored query + condition + actions
//!
//! A watch is a JSON document in the watch index. The document `_id` is the
//! watch id; it is injected after deserialization rather than stored in the
//! source.

use crate::duration::serde_opt_duration;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

crate::define_id! {
    /// Identifier of a stored watch (the document id in the watch index).
    pub struct WatchId;
}

/// Lightweight listing entry returned when enumerating active watches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchRef {
    pub id: WatchId,
}

/// A stored watch definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Watch {
    #[serde(skip)]
    pub id: WatchId,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Minimum spacing between executions. `None` runs on every tick.
    #[serde(default, with = "serde_opt_duration", skip_serializing_if = "Option::is_none")]
    pub interval: Option<Duration>,
    /// Repeat-fire suppression window. `None` never suppresses.
    #[serde(default, with = "serde_opt_duration", skip_serializing_if = "Option::is_none")]
    pub throttle: Option<Duration>,
    pub query: QuerySpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<Transform>,
    pub condition: Condition,
    #[serde(default)]
    pub actions: Vec<ActionDef>,
}

fn default_enabled() -> bool {
    true
}

/// Test builder for [`Watch`]; defaults to an enabled `cpu-high` watch
/// with an `always` condition and no actions.
#[cfg(any(test, feature = "test-support"))]
#[derive(Debug, Clone)]
pub struct WatchBuilder {
    watch: Watch,
}

#[cfg(any(test, feature = "test-support"))]
impl WatchBuilder {
    pub fn id(mut self, id: impl Into<WatchId>) -> Self {
        self.watch.id = id.into();
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.watch.enabled = enabled;
        self
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.watch.interval = Some(interval);
        self
    }

    pub fn throttle(mut self, window: Duration) -> Self {
        self.watch.throttle = Some(window);
        self
    }

    pub fn query(mut self, query: QuerySpec) -> Self {
        self.watch.query = query;
        self
    }

    pub fn transform(mut self, transform: Transform) -> Self {
        self.watch.transform = Some(transform);
        self
    }

    pub fn condition(mut self, condition: Condition) -> Self {
        self.watch.condition = condition;
        self
    }

    pub fn actions(mut self, actions: Vec<ActionDef>) -> Self {
        self.watch.actions = actions;
        self
    }

    pub fn build(self) -> Watch {
        self.watch
    }
}

#[cfg(any(test, feature = "test-support"))]
impl Watch {
    pub fn builder() -> WatchBuilder {
        WatchBuilder {
            watch: Watch {
                id: WatchId::new("cpu-high"),
                enabled: true,
                interval: None,
                throttle: None,
                query: QuerySpec::default(),
                transform: None,
                condition: Condition::Always,
                actions: Vec::new(),
            },
        }
    }
}

impl Watch {
    /// Build a watch from a stored document's id and `_source`.
    pub fn from_document(id: impl Into<WatchId>, source: Value) -> Result<Self, serde_json::Error> {
        let mut watch: Watch = serde_json::from_value(source)?;
        watch.id = id.into();
        Ok(watch)
    }

    /// Structural checks serde cannot express.
    ///
    /// A watch failing validation is recorded as errored, never evaluated.
    pub fn validate(&self) -> Result<(), String> {
        if self.query.indices.is_empty() {
            return Err("query.indices must not be empty".to_string());
        }
        self.condition.validate()?;
        if let Some(transform) = &self.transform {
            transform.validate()?;
        }
        let mut seen = std::collections::HashSet::new();
        for action in &self.actions {
            if action.name.is_empty() {
                return Err("action name must not be empty".to_string());
            }
            if !seen.insert(action.name.as_str()) {
                return Err(format!("duplicate action name '{}'", action.name));
            }
        }
        Ok(())
    }
}

/// Backend search request for a watch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuerySpec {
    pub indices: Vec<String>,
    #[serde(default)]
    pub body: Value,
    /// Overrides the configured query timeout.
    #[serde(default, with = "serde_opt_duration", skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,
}

/// Numeric comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Gt,
    Gte,
    Lt,
    Lte,
    Eq,
    Ne,
}

crate::simple_display! {
    CompareOp {
        Gt => ">",
        Gte => ">=",
        Lt => "<",
        Lte => "<=",
        Eq => "==",
        Ne => "!=",
    }
}

impl CompareOp {
    pub fn apply(self, lhs: f64, rhs: f64) -> bool {
        match self {
            CompareOp::Gt => lhs > rhs,
            CompareOp::Gte => lhs >= rhs,
            CompareOp::Lt => lhs < rhs,
            CompareOp::Lte => lhs <= rhs,
            CompareOp::Eq => lhs == rhs,
            CompareOp::Ne => lhs != rhs,
        }
    }
}

/// Condition applied to the (transformed) query result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Always,
    Never,
    /// Compare the number at `path` against `value`.
    Compare {
        path: String,
        op: CompareOp,
        value: f64,
        /// Used when the metric is missing or null. Without it a missing
        /// metric is an evaluation error.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<f64>,
    },
    All(Vec<Condition>),
    Any(Vec<Condition>),
}

impl Condition {
    pub fn compare(path: impl Into<String>, op: CompareOp, value: f64) -> Self {
        Condition::Compare { path: path.into(), op, value, default: None }
    }

    pub fn validate(&self) -> Result<(), String> {
        match self {
            Condition::Always | Condition::Never => Ok(()),
            Condition::Compare { path, value, default, .. } => {
                if path.is_empty() {
                    return Err("compare.path must not be empty".to_string());
                }
                if !value.is_finite() || default.is_some_and(|d| !d.is_finite()) {
                    return Err(format!("compare on '{}' has a non-finite operand", path));
                }
                Ok(())
            }
            Condition::All(items) | Condition::Any(items) => {
                if items.is_empty() {
                    return Err("compound condition must have at least one clause".to_string());
                }
                items.iter().try_for_each(Condition::validate)
            }
        }
    }
}

/// Optional reshaping of the raw query result before the condition runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transform {
    /// Replace the payload with the value at `path`.
    Select { path: String },
    /// Build an object of named fields, each taken from a path.
    Project(BTreeMap<String, String>),
    /// Apply transforms in order.
    Chain(Vec<Transform>),
}

impl Transform {
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Transform::Select { .. } => Ok(()),
            Transform::Project(fields) if fields.is_empty() => {
                Err("project transform must name at least one field".to_string())
            }
            Transform::Project(_) => Ok(()),
            Transform::Chain(steps) => steps.iter().try_for_each(Transform::validate),
        }
    }
}

/// One configured action of a watch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDef {
    pub name: String,
    /// Overrides the configured per-action timeout.
    #[serde(default, with = "serde_opt_duration", skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,
    #[serde(flatten)]
    pub kind: ActionKind,
}

impl ActionDef {
    pub fn new(name: impl Into<String>, kind: ActionKind) -> Self {
        Self { name: name.into(), timeout: None, kind }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Type-specific action configuration, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionKind {
    Notification {
        title: String,
        message: String,
    },
    Webhook {
        url: String,
        #[serde(default = "default_method")]
        method: String,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        headers: BTreeMap<String, String>,
        /// Body template; defaults to the JSON payload.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        body: Option<String>,
    },
    Report {
        /// Page to render (template).
        url: String,
        #[serde(default = "default_report_format")]
        format: String,
    },
    /// Run another watch out-of-band for the same tick.
    Escalation {
        watch: WatchId,
    },
    /// Log the payload.
    Console {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
}

fn default_method() -> String {
    "POST".to_string()
}

fn default_report_format() -> String {
    "png".to_string()
}

impl ActionKind {
    pub fn action_type(&self) -> ActionType {
        match self {
            ActionKind::Notification { .. } => ActionType::Notification,
            ActionKind::Webhook { .. } => ActionType::Webhook,
            ActionKind::Report { .. } => ActionType::Report,
            ActionKind::Escalation { .. } => ActionType::Escalation,
            ActionKind::Console { .. } => ActionType::Console,
        }
    }
}

/// Closed set of action types; keys of the action registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Notification,
    Webhook,
    Report,
    Escalation,
    Console,
}

impl ActionType {
    pub const ALL: [ActionType; 5] = [
        ActionType::Notification,
        ActionType::Webhook,
        ActionType::Report,
        ActionType::Escalation,
        ActionType::Console,
    ];
}

crate::simple_display! {
    ActionType {
        Notification => "notification",
        Webhook => "webhook",
        Report => "report",
        Escalation => "escalation",
        Console => "console",
    }
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod tests;
