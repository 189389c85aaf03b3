// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::EvalError;
use serde_json::Value;
use wt_core::{lookup, Condition};

/// Apply `condition` to `payload`.
///
/// `all` and `any` short-circuit, so an error in a clause that is never
/// reached does not surface.
pub fn check(condition: &Condition, payload: &Value) -> Result<bool, EvalError> {
    match condition {
        Condition::Always => Ok(true),
        Condition::Never => Ok(false),
        Condition::Compare { path, op, value, default } => {
            let metric = match (metric(payload, path)?, default) {
                (Some(m), _) => m,
                (None, Some(d)) => *d,
                (None, None) => return Err(EvalError::MissingMetric(path.clone())),
            };
            Ok(op.apply(metric, *value))
        }
        Condition::All(items) => {
            for item in items {
                if !check(item, payload)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Condition::Any(items) => {
            for item in items {
                if check(item, payload)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
    }
}

/// Numeric value at `path`; `None` when missing or null.
fn metric(payload: &Value, path: &str) -> Result<Option<f64>, EvalError> {
    match lookup(payload, path) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_f64()),
        Some(other) => {
            Err(EvalError::NotNumeric { path: path.to_string(), value: wt_core::payload::render(other) })
        }
    }
}
