// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Template interpolation for action messages, webhook bodies, and report URLs

use crate::payload::{lookup, render};
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Regex pattern for ${name} or ${payload.path.0.field}
// Allow expect here as the regex is compile-time verified to be valid
#[allow(clippy::expect_used)]
pub static VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([a-zA-Z_][a-zA-Z0-9_]*(?:\.[a-zA-Z0-9_-]+)*)\}")
        .expect("constant regex pattern is valid")
});

/// Interpolate `${...}` placeholders.
///
/// `${payload}` renders the whole payload and `${payload.some.path}` a value
/// inside it; any other name is looked up in `vars` (e.g. `watch.id`, `tick`).
/// The process environment is never consulted, so `${VAR:-default}` and
/// `${HOME}` stay literal.
///
/// Unknown names and missing payload paths are left as-is so a broken
/// template is visible in the delivered message.
pub fn interpolate(template: &str, payload: &Value, vars: &HashMap<String, String>) -> String {
    VAR_PATTERN
        .replace_all(template, |caps: &regex::Captures| {
            let name = &caps[1];
            let resolved = if name == "payload" {
                Some(render(payload))
            } else if let Some(path) = name.strip_prefix("payload.") {
                lookup(payload, path).map(render)
            } else {
                vars.get(name).cloned()
            };
            resolved.unwrap_or_else(|| caps[0].to_string())
        })
        .to_string()
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod tests;
