// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::EvalError;
use serde_json::{Map, Value};
use wt_core::{lookup, Transform};

/// Reshape a raw query result. Missing paths become `null`; the condition
/// decides whether that is an error.
pub fn apply(transform: &Transform, raw: Value) -> Result<Value, EvalError> {
    match transform {
        Transform::Select { path } => Ok(lookup(&raw, path).cloned().unwrap_or(Value::Null)),
        Transform::Project(fields) => {
            if fields.is_empty() {
                return Err(EvalError::Malformed("project transform has no fields".to_string()));
            }
            let projected: Map<String, Value> = fields
                .iter()
                .map(|(name, path)| (name.clone(), lookup(&raw, path).cloned().unwrap_or(Value::Null)))
                .collect();
            Ok(Value::Object(projected))
        }
        Transform::Chain(steps) => steps.iter().try_fold(raw, |acc, step| apply(step, acc)),
    }
}
