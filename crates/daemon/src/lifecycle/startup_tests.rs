// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::lifecycle::InitState;
use serde_json::json;
use serial_test::serial;
use std::path::PathBuf;
use wt_adapters::{FakeFailure, FakeSearchBackend};
use wt_core::Tick;

fn test_config(dir: &Path) -> Config {
    let mut config = Config::default();
    config.report.renderer_path = Some(dir.join("no-such-renderer"));
    config.report.output_dir = dir.join("reports");
    config
}

#[test]
fn legacy_config_blocks_startup() {
    let dir = tempfile::tempdir().unwrap();
    let legacy = dir.path().join("watchtower.json");
    check_legacy_config(&legacy).unwrap();

    std::fs::write(&legacy, "{}").unwrap();

    match check_legacy_config(&legacy) {
        Err(LifecycleError::LegacyConfig(path)) => assert_eq!(path, legacy),
        other => panic!("expected LegacyConfig, got {other:?}"),
    }
}

#[tokio::test]
#[serial]
async fn startup_refuses_legacy_config_before_touching_backend() {
    let dir = tempfile::tempdir().unwrap();
    let legacy = dir.path().join("watchtower.json");
    std::fs::write(&legacy, "{}").unwrap();
    std::env::set_var("WT_LEGACY_CONFIG", &legacy);

    let gate = InitGate::new();
    let result = startup(&gate, &test_config(dir.path()), &CancellationToken::new()).await;
    std::env::remove_var("WT_LEGACY_CONFIG");

    assert!(matches!(result, Err(LifecycleError::LegacyConfig(_))));
    assert_eq!(gate.state(), InitState::Uninitialized);
}

#[tokio::test]
async fn healthy_backend_passes_immediately() {
    let backend = FakeSearchBackend::new();
    backend.set_health(ClusterHealth::Yellow);

    let health = wait_for_health(&backend, ClusterHealth::Yellow, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(health, ClusterHealth::Yellow);
}

#[tokio::test]
async fn waits_until_backend_reaches_required_health() {
    let backend = FakeSearchBackend::new();
    backend.set_health(ClusterHealth::Yellow);
    let later = backend.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        later.set_health(ClusterHealth::Green);
    });

    let health = wait_for_health(&backend, ClusterHealth::Green, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(health, ClusterHealth::Green);
}

#[tokio::test]
async fn cancel_stops_waiting_for_unreachable_backend() {
    let backend = FakeSearchBackend::new();
    backend.set_unavailable(Some(FakeFailure::Transport));
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = wait_for_health(&backend, ClusterHealth::Green, &cancel).await;

    assert!(matches!(result, Err(LifecycleError::Cancelled)));
}

#[tokio::test]
async fn startup_wires_a_working_scheduler() {
    let dir = tempfile::tempdir().unwrap();
    let backend = FakeSearchBackend::new();
    backend.put_document(
        "watcher",
        "heartbeat",
        json!({
            "query": { "indices": ["metrics"] },
            "condition": "always",
            "actions": [{ "name": "log", "type": "console" }]
        }),
    );
    backend.respond("metrics", json!({ "hits": { "total": { "value": 3 } } }));
    let gate = InitGate::new();

    let daemon = startup_with(&gate, &test_config(dir.path()), backend.clone(), &CancellationToken::new())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(gate.state(), InitState::Ready);
    assert!(!daemon.renderer.is_available());
    assert_eq!(daemon.schedule.to_string(), "25,55");

    let summary = daemon.scheduler.run_tick(Tick(1_700_000_025_000)).await.unwrap();
    assert_eq!((summary.executed, summary.fired), (1, 1));
    let alarms = backend.documents("watcher_alarms");
    assert_eq!(alarms["heartbeat@1700000025000"]["actions"][0]["status"], "succeeded");
}

#[tokio::test]
async fn report_action_fails_when_renderer_missing() {
    let dir = tempfile::tempdir().unwrap();
    let backend = FakeSearchBackend::new();
    backend.put_document(
        "watcher",
        "daily-report",
        json!({
            "query": { "indices": ["metrics"] },
            "condition": "always",
            "actions": [
                { "name": "pdf", "type": "report", "url": "http://dash/d/1", "format": "pdf" },
                { "name": "log", "type": "console" }
            ]
        }),
    );
    backend.respond("metrics", json!({ "hits": { "total": { "value": 1 } } }));
    let gate = InitGate::new();

    let daemon = startup_with(&gate, &test_config(dir.path()), backend.clone(), &CancellationToken::new())
        .await
        .unwrap()
        .unwrap();
    daemon.scheduler.run_tick(Tick(1_700_000_025_000)).await.unwrap();

    let alarm = &backend.documents("watcher_alarms")["daily-report@1700000025000"];
    assert_eq!(alarm["verdict"], "fired");
    assert_eq!(alarm["actions"][0]["status"], "failed");
    assert_eq!(alarm["actions"][1]["status"], "succeeded");
}

#[tokio::test]
async fn second_startup_is_a_no_op() {
    let dir = tempfile::tempdir().unwrap();
    let backend = FakeSearchBackend::new();
    let gate = InitGate::new();
    let config = test_config(dir.path());
    let cancel = CancellationToken::new();

    let first = startup_with(&gate, &config, backend.clone(), &cancel).await.unwrap();
    let second = startup_with(&gate, &config, backend, &cancel).await.unwrap();

    assert!(first.is_some());
    assert!(second.is_none());
    assert_eq!(gate.state(), InitState::Ready);
}

#[tokio::test]
async fn failed_startup_marks_gate_failed() {
    let dir = tempfile::tempdir().unwrap();
    let backend = FakeSearchBackend::new();
    backend.set_health(ClusterHealth::Red);
    let gate = InitGate::new();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = startup_with(&gate, &test_config(dir.path()), backend.clone(), &cancel).await;

    assert!(matches!(result, Err(LifecycleError::Cancelled)));
    assert!(matches!(gate.state(), InitState::Failed(_)));
    assert!(matches!(
        startup_with(&gate, &test_config(dir.path()), backend, &cancel).await,
        Err(LifecycleError::InitFailed(_))
    ));
}

#[tokio::test]
async fn invalid_schedule_fails_before_health_check() {
    let dir = tempfile::tempdir().unwrap();
    let backend = FakeSearchBackend::new();
    backend.set_unavailable(Some(FakeFailure::Transport));
    let mut config = test_config(dir.path());
    config.scheduler.schedule = "99".to_string();

    let result = startup_with(&InitGate::new(), &config, backend, &CancellationToken::new()).await;

    assert!(matches!(result, Err(LifecycleError::Config(_))));
}

#[test]
fn renderer_resolves_configured_binary() {
    let dir = tempfile::tempdir().unwrap();
    let binary: PathBuf = dir.path().join("render");
    std::fs::write(&binary, "").unwrap();

    let capability = RendererCapability::resolve(Some(&binary), DEFAULT_RENDERER);

    assert_eq!(capability, RendererCapability::Available { binary });
}
