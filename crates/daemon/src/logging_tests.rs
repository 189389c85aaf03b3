// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    level = { "info" },
    per_crate = { "warn,wt_engine=debug" },
    trace = { "wt_daemon=trace" },
)]
fn accepts_filter_directives(directives: &str) {
    assert!(filter(directives).is_ok());
}

#[test]
fn rejects_malformed_filter() {
    let err = filter("wt_engine=loud").unwrap_err();
    assert!(matches!(err, LoggingError::Filter(ref d, _) if d == "wt_engine=loud"));
}
