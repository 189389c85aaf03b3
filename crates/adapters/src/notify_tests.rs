// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn fake_records_calls() {
    let fake = FakeNotifyAdapter::new();
    fake.notify("CPU", "cpu at 92").await.unwrap();

    let calls = fake.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].title, "CPU");
    assert_eq!(calls[0].message, "cpu at 92");
}

#[tokio::test]
async fn fake_failure_is_reported_and_recorded() {
    let fake = FakeNotifyAdapter::new();
    fake.fail_with("no display");

    let err = fake.notify("CPU", "cpu at 92").await.unwrap_err();
    assert_eq!(err.to_string(), "send failed: no display");
    assert_eq!(fake.calls().len(), 1);
}
