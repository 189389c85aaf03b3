// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use wt_adapters::{FakeFailure, FakeSearchBackend};

fn watch_doc(enabled: bool) -> Value {
    json!({
        "enabled": enabled,
        "query": { "indices": ["metrics-*"], "body": {} },
        "condition": "always",
    })
}

fn ids(refs: &[WatchRef]) -> Vec<&str> {
    refs.iter().map(|r| r.id.as_str()).collect()
}

#[tokio::test]
async fn list_active_pages_through_all_enabled_watches() {
    let backend = FakeSearchBackend::new();
    for id in ["a", "b", "c", "d", "e"] {
        backend.put_document("watcher", id, watch_doc(true));
    }
    backend.put_document("watcher", "off", watch_doc(false));

    let repo = EsWatchRepository::new(backend.clone(), "watcher").with_page_size(2);
    let refs = repo.list_active().await.unwrap();

    assert_eq!(ids(&refs), vec!["a", "b", "c", "d", "e"]);
    assert_eq!(backend.search_calls().len(), 3);
}

#[tokio::test]
async fn list_active_includes_watches_without_enabled_field() {
    let backend = FakeSearchBackend::new();
    let mut implicit = watch_doc(true);
    implicit.as_object_mut().unwrap().remove("enabled");
    backend.put_document("watcher", "implicit", implicit);
    backend.put_document("watcher", "off", watch_doc(false));

    let refs = EsWatchRepository::new(backend.clone(), "watcher").list_active().await.unwrap();

    assert_eq!(ids(&refs), vec!["implicit"]);
    let (_, body) = &backend.search_calls()[0];
    assert_eq!(body["query"]["bool"]["must_not"]["term"]["enabled"], false);
}

#[tokio::test]
async fn list_active_without_index_is_empty() {
    let repo = EsWatchRepository::new(FakeSearchBackend::new(), "watcher");
    assert!(repo.list_active().await.unwrap().is_empty());
}

#[tokio::test]
async fn list_active_backend_down_is_unavailable() {
    let backend = FakeSearchBackend::new();
    backend.set_unavailable(Some(FakeFailure::Transport));

    let err = EsWatchRepository::new(backend, "watcher").list_active().await.unwrap_err();
    assert!(matches!(err, RepositoryError::Unavailable(_)));
}

#[tokio::test]
async fn list_active_accepts_legacy_numeric_total() {
    let backend = FakeSearchBackend::new();
    backend.respond(
        "watcher",
        json!({ "hits": { "total": 1, "hits": [{ "_id": "legacy" }] } }),
    );

    let refs = EsWatchRepository::new(backend, "watcher").list_active().await.unwrap();
    assert_eq!(ids(&refs), vec!["legacy"]);
}

#[tokio::test]
async fn list_active_rejects_response_without_hits() {
    let backend = FakeSearchBackend::new();
    backend.respond("watcher", json!({ "error": "huh" }));

    let err = EsWatchRepository::new(backend, "watcher").list_active().await.unwrap_err();
    assert!(matches!(err, RepositoryError::Unavailable(SearchError::Decode(_))));
}

#[tokio::test]
async fn load_returns_watch_with_document_id() {
    let backend = FakeSearchBackend::new();
    backend.put_document("watcher", "cpu-high", watch_doc(true));

    let watch = EsWatchRepository::new(backend, "watcher")
        .load(&WatchId::new("cpu-high"))
        .await
        .unwrap();
    assert_eq!(watch.id, "cpu-high");
    assert!(watch.enabled);
}

#[tokio::test]
async fn load_missing_is_not_found() {
    let err = EsWatchRepository::new(FakeSearchBackend::new(), "watcher")
        .load(&WatchId::new("gone"))
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound(id) if id == "gone"));
}

#[yare::parameterized(
    not_an_object   = { json!("nope") },
    missing_query   = { json!({ "condition": "always" }) },
    unknown_action  = { json!({
        "query": { "indices": ["m"] },
        "condition": "always",
        "actions": [{ "name": "x", "type": "carrier_pigeon" }],
    }) },
    empty_indices   = { json!({ "query": { "indices": [] }, "condition": "always" }) },
    empty_any       = { json!({ "query": { "indices": ["m"] }, "condition": { "any": [] } }) },
)]
fn load_malformed_document(source: Value) {
    tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
        let backend = FakeSearchBackend::new();
        backend.put_document("watcher", "bad", source);

        let err = EsWatchRepository::new(backend, "watcher")
            .load(&WatchId::new("bad"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Malformed { ref id, .. } if id == "bad"));
    });
}
