// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

#[test]
fn alarm_id_is_derived_from_watch_and_tick() {
    let a = AlarmId::for_execution(&WatchId::new("cpu-high"), Tick(1_700_000_025_000));
    let b = AlarmId::for_execution(&WatchId::new("cpu-high"), Tick(1_700_000_025_000));
    let c = AlarmId::for_execution(&WatchId::new("cpu-high"), Tick(1_700_000_055_000));
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(a, "cpu-high@1700000025000");
}

#[test]
fn tick_displays_as_utc_timestamp() {
    assert_eq!(Tick(25_000).to_string(), "1970-01-01T00:00:25.000Z");
}

#[test]
fn errored_alarm_drops_payload() {
    let alarm = Alarm::new(
        WatchId::new("cpu-high"),
        Tick(1_000),
        Verdict::Errored,
        json!({"avg_cpu": 92}),
        Some("query timed out".into()),
        vec![],
        2_000,
    );
    assert_eq!(alarm.payload, Value::Null);
    assert_eq!(alarm.error.as_deref(), Some("query timed out"));
}

#[test]
fn alarm_serializes_for_the_alarm_index() {
    let alarm = Alarm::new(
        WatchId::new("cpu-high"),
        Tick(25_000),
        Verdict::Fired,
        json!({"avg_cpu": 92}),
        None,
        vec![ActionOutcome {
            name: "page".into(),
            action_type: ActionType::Notification,
            status: ActionStatus::Failed,
            detail: "send failed".into(),
            elapsed_ms: 3,
        }],
        26_000,
    );
    let doc = serde_json::to_value(&alarm).unwrap();
    assert_eq!(doc["verdict"], "fired");
    assert_eq!(doc["@timestamp"], "1970-01-01T00:00:25Z");
    assert_eq!(doc["actions"][0]["type"], "notification");
    assert_eq!(doc["actions"][0]["status"], "failed");
    assert!(doc.get("error").is_none());
    assert_eq!(alarm.failed_actions(), 1);

    let back: Alarm = serde_json::from_value(doc).unwrap();
    assert_eq!(back, alarm);
}
