// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;
use std::collections::BTreeMap;
use wt_adapters::{FakeFailure, FakeSearchBackend};
use wt_core::{CompareOp, Condition, QuerySpec, Transform};

fn cpu_high() -> Watch {
    Watch::builder()
        .query(QuerySpec { indices: vec!["metrics".to_string()], ..QuerySpec::default() })
        .transform(Transform::Project(BTreeMap::from([(
            "avg_cpu".to_string(),
            "aggregations.avg_cpu.value".to_string(),
        )])))
        .condition(Condition::compare("avg_cpu", CompareOp::Gt, 80.0))
        .build()
}

fn cpu_response(value: Value) -> Value {
    json!({ "hits": { "total": { "value": 12 } }, "aggregations": { "avg_cpu": { "value": value } } })
}

#[tokio::test]
async fn cpu_above_threshold_fires_with_projected_payload() {
    let backend = FakeSearchBackend::new();
    backend.respond("metrics", cpu_response(json!(92)));

    let eval = Evaluator::new(backend, Duration::from_secs(5)).evaluate(&cpu_high()).await.unwrap();

    assert!(eval.fired());
    assert_eq!(eval.payload, json!({ "avg_cpu": 92 }));
}

#[tokio::test]
async fn cpu_below_threshold_does_not_fire() {
    let backend = FakeSearchBackend::new();
    backend.respond("metrics", cpu_response(json!(40)));

    let eval = Evaluator::new(backend, Duration::from_secs(5)).evaluate(&cpu_high()).await.unwrap();

    assert_eq!(eval.verdict, Verdict::NotFired);
    assert_eq!(eval.payload, json!({ "avg_cpu": 40 }));
}

#[tokio::test]
async fn slow_query_times_out() {
    let backend = FakeSearchBackend::new();
    backend.respond_after("metrics", Duration::from_millis(500), cpu_response(json!(92)));

    let err = Evaluator::new(backend, Duration::from_millis(20))
        .evaluate(&cpu_high())
        .await
        .unwrap_err();

    assert!(matches!(err, EvalError::QueryTimeout(d) if d == Duration::from_millis(20)));
}

#[tokio::test]
async fn per_watch_query_timeout_overrides_default() {
    let backend = FakeSearchBackend::new();
    backend.respond_after("metrics", Duration::from_millis(500), cpu_response(json!(92)));
    let mut watch = cpu_high();
    watch.query.timeout = Some(Duration::from_millis(10));

    let err = Evaluator::new(backend, Duration::from_secs(30)).evaluate(&watch).await.unwrap_err();

    assert!(matches!(err, EvalError::QueryTimeout(d) if d == Duration::from_millis(10)));
}

#[tokio::test]
async fn backend_timeout_is_query_timeout() {
    let backend = FakeSearchBackend::new();
    backend.fail("metrics", FakeFailure::Timeout);

    let err = Evaluator::new(backend, Duration::from_secs(5)).evaluate(&cpu_high()).await.unwrap_err();
    assert!(matches!(err, EvalError::QueryTimeout(_)));
}

#[tokio::test]
async fn backend_error_is_query_failed() {
    let backend = FakeSearchBackend::new();
    backend.fail("metrics", FakeFailure::Status(400));

    let err = Evaluator::new(backend, Duration::from_secs(5)).evaluate(&cpu_high()).await.unwrap_err();
    assert!(matches!(err, EvalError::QueryFailed(_)));
}

#[tokio::test]
async fn null_metric_without_default_is_an_error() {
    let backend = FakeSearchBackend::new();
    backend.respond("metrics", cpu_response(Value::Null));

    let err = Evaluator::new(backend, Duration::from_secs(5)).evaluate(&cpu_high()).await.unwrap_err();
    assert!(matches!(err, EvalError::MissingMetric(ref p) if p == "avg_cpu"));
}

#[yare::parameterized(
    always            = { Condition::Always, json!({}), true },
    never             = { Condition::Never, json!({}), false },
    gt_true           = { Condition::compare("v", CompareOp::Gt, 1.0), json!({"v": 2}), true },
    gte_equal         = { Condition::compare("v", CompareOp::Gte, 2.0), json!({"v": 2}), true },
    lt_false          = { Condition::compare("v", CompareOp::Lt, 2.0), json!({"v": 2}), false },
    lte_float         = { Condition::compare("v", CompareOp::Lte, 2.5), json!({"v": 2.5}), true },
    eq                = { Condition::compare("v", CompareOp::Eq, 0.0), json!({"v": 0}), true },
    ne                = { Condition::compare("v", CompareOp::Ne, 0.0), json!({"v": 0}), false },
    nested_path       = { Condition::compare("a.b.1", CompareOp::Gt, 5.0), json!({"a": {"b": [1, 9]}}), true },
    hits_total        = { Condition::compare("hits.total.value", CompareOp::Gt, 0.0), json!({"hits": {"total": {"value": 3}}}), true },
    all_true          = { Condition::All(vec![Condition::Always, Condition::compare("v", CompareOp::Gt, 1.0)]), json!({"v": 2}), true },
    all_false         = { Condition::All(vec![Condition::Always, Condition::Never]), json!({}), false },
    any_true          = { Condition::Any(vec![Condition::Never, Condition::Always]), json!({}), true },
    any_false         = { Condition::Any(vec![Condition::Never, Condition::compare("v", CompareOp::Lt, 1.0)]), json!({"v": 2}), false },
)]
fn condition_table(condition: Condition, payload: Value, expected: bool) {
    assert_eq!(check(&condition, &payload).unwrap(), expected);
}

#[test]
fn compare_default_covers_missing_metric() {
    let condition = Condition::Compare {
        path: "errors".to_string(),
        op: CompareOp::Gt,
        value: 0.0,
        default: Some(0.0),
    };
    assert!(!check(&condition, &json!({})).unwrap());
    assert!(!check(&condition, &json!({ "errors": null })).unwrap());
}

#[test]
fn compare_non_numeric_metric_is_an_error() {
    let err = check(&Condition::compare("v", CompareOp::Gt, 1.0), &json!({ "v": "high" }))
        .unwrap_err();
    assert!(matches!(err, EvalError::NotNumeric { ref value, .. } if value == "high"));
}

#[test]
fn any_short_circuits_before_failing_clause() {
    let condition =
        Condition::Any(vec![Condition::Always, Condition::compare("missing", CompareOp::Gt, 1.0)]);
    assert!(check(&condition, &json!({})).unwrap());
}

#[test]
fn select_replaces_payload() {
    let raw = json!({ "aggregations": { "hosts": { "buckets": [1, 2] } } });
    let out = apply(&Transform::Select { path: "aggregations.hosts".to_string() }, raw).unwrap();
    assert_eq!(out, json!({ "buckets": [1, 2] }));
}

#[test]
fn select_missing_path_is_null() {
    let out = apply(&Transform::Select { path: "nope".to_string() }, json!({})).unwrap();
    assert_eq!(out, Value::Null);
}

#[test]
fn chain_applies_steps_in_order() {
    let raw = json!({ "aggregations": { "stats": { "max": 7, "min": 1 } } });
    let transform = Transform::Chain(vec![
        Transform::Select { path: "aggregations.stats".to_string() },
        Transform::Project(BTreeMap::from([("peak".to_string(), "max".to_string())])),
    ]);
    assert_eq!(apply(&transform, raw).unwrap(), json!({ "peak": 7 }));
}

#[test]
fn empty_project_is_malformed() {
    let err = apply(&Transform::Project(BTreeMap::new()), json!({})).unwrap_err();
    assert!(matches!(err, EvalError::Malformed(_)));
}
