// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory search backend for tests.
//!
//! Documents stored with [`FakeSearchBackend::put_document`] answer `get`
//! and also answer searches against their index (filtered by `enabled`,
//! paged by `from`/`size`). Scripted responses take precedence.

use super::{ClusterHealth, SearchBackend, SearchError, WriteAck};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

/// Error to inject; rebuilt on every call since `SearchError` is not `Clone`.
#[derive(Debug, Clone)]
pub enum FakeFailure {
    Transport,
    Timeout,
    Status(u16),
}

impl FakeFailure {
    fn to_error(&self) -> SearchError {
        match self {
            FakeFailure::Transport => SearchError::Transport("connection refused".to_string()),
            FakeFailure::Timeout => SearchError::Timeout,
            FakeFailure::Status(status) => {
                SearchError::Status { status: *status, body: "injected".to_string() }
            }
        }
    }
}

#[derive(Debug, Clone)]
enum Scripted {
    Respond { delay: Option<Duration>, body: Value },
    Fail(FakeFailure),
}

struct FakeState {
    scripted: HashMap<String, Scripted>,
    documents: BTreeMap<String, BTreeMap<String, Value>>,
    unavailable: Option<FakeFailure>,
    fail_creates: Option<FakeFailure>,
    health: ClusterHealth,
    search_calls: Vec<(Vec<String>, Value)>,
    create_calls: usize,
}

/// Fake search backend for testing
#[derive(Clone)]
pub struct FakeSearchBackend {
    inner: Arc<Mutex<FakeState>>,
}

impl Default for FakeSearchBackend {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeState {
                scripted: HashMap::new(),
                documents: BTreeMap::new(),
                unavailable: None,
                fail_creates: None,
                health: ClusterHealth::Green,
                search_calls: Vec::new(),
                create_calls: 0,
            })),
        }
    }
}

impl FakeSearchBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer searches on `indices` (joined with `,`) with `body`.
    pub fn respond(&self, indices: &str, body: Value) {
        self.inner
            .lock()
            .scripted
            .insert(indices.to_string(), Scripted::Respond { delay: None, body });
    }

    /// Answer searches on `indices` with `body` after `delay`.
    pub fn respond_after(&self, indices: &str, delay: Duration, body: Value) {
        self.inner
            .lock()
            .scripted
            .insert(indices.to_string(), Scripted::Respond { delay: Some(delay), body });
    }

    /// Fail searches on `indices`.
    pub fn fail(&self, indices: &str, failure: FakeFailure) {
        self.inner.lock().scripted.insert(indices.to_string(), Scripted::Fail(failure));
    }

    /// Make every operation fail, as if the backend were unreachable.
    pub fn set_unavailable(&self, failure: Option<FakeFailure>) {
        self.inner.lock().unavailable = failure;
    }

    /// Make `create` fail.
    pub fn fail_creates(&self, failure: Option<FakeFailure>) {
        self.inner.lock().fail_creates = failure;
    }

    pub fn set_health(&self, health: ClusterHealth) {
        self.inner.lock().health = health;
    }

    pub fn put_document(&self, index: &str, id: &str, source: Value) {
        self.inner
            .lock()
            .documents
            .entry(index.to_string())
            .or_default()
            .insert(id.to_string(), source);
    }

    pub fn remove_document(&self, index: &str, id: &str) {
        if let Some(docs) = self.inner.lock().documents.get_mut(index) {
            docs.remove(id);
        }
    }

    /// All documents currently stored in `index`.
    pub fn documents(&self, index: &str) -> BTreeMap<String, Value> {
        self.inner.lock().documents.get(index).cloned().unwrap_or_default()
    }

    /// Recorded search calls as (indices, body).
    pub fn search_calls(&self) -> Vec<(Vec<String>, Value)> {
        self.inner.lock().search_calls.clone()
    }

    pub fn create_calls(&self) -> usize {
        self.inner.lock().create_calls
    }
}

/// Evaluates the `term` and `bool.must_not` subset the engine issues.
///
/// A `term` clause matches only when the field is present with exactly that
/// value, so documents missing the field never match. Other clauses match all.
fn query_matches(query: &Value, src: &Value) -> bool {
    if let Some(term) = query.get("term").and_then(Value::as_object) {
        return term.iter().all(|(field, value)| src.get(field) == Some(value));
    }
    if let Some(must_not) = query.pointer("/bool/must_not") {
        let clauses: Vec<&Value> = match must_not {
            Value::Array(clauses) => clauses.iter().collect(),
            clause => vec![clause],
        };
        return clauses.into_iter().all(|clause| !query_matches(clause, src));
    }
    true
}

fn synthesize_hits(docs: &BTreeMap<String, Value>, body: &Value) -> Value {
    let from = body.get("from").and_then(Value::as_u64).unwrap_or(0) as usize;
    let size = body.get("size").and_then(Value::as_u64).unwrap_or(10) as usize;
    let query = body.get("query");
    let matching: Vec<(&String, &Value)> =
        docs.iter().filter(|(_, src)| query.map_or(true, |q| query_matches(q, src))).collect();
    let hits: Vec<Value> = matching
        .iter()
        .skip(from)
        .take(size)
        .map(|(id, src)| json!({ "_id": id, "_source": src }))
        .collect();
    json!({ "hits": { "total": { "value": matching.len() }, "hits": hits } })
}

#[async_trait]
impl SearchBackend for FakeSearchBackend {
    async fn search(&self, indices: &[String], body: &Value) -> Result<Value, SearchError> {
        let key = indices.join(",");
        let scripted = {
            let mut state = self.inner.lock();
            state.search_calls.push((indices.to_vec(), body.clone()));
            if let Some(failure) = &state.unavailable {
                return Err(failure.to_error());
            }
            match state.scripted.get(&key) {
                Some(s) => s.clone(),
                None => match state.documents.get(&key) {
                    Some(docs) => return Ok(synthesize_hits(docs, body)),
                    None => {
                        return Err(SearchError::Status {
                            status: 404,
                            body: format!("no such index [{}]", key),
                        })
                    }
                },
            }
        };
        match scripted {
            Scripted::Respond { delay, body } => {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                Ok(body)
            }
            Scripted::Fail(failure) => Err(failure.to_error()),
        }
    }

    async fn get(&self, index: &str, id: &str) -> Result<Option<Value>, SearchError> {
        let state = self.inner.lock();
        if let Some(failure) = &state.unavailable {
            return Err(failure.to_error());
        }
        Ok(state.documents.get(index).and_then(|docs| docs.get(id)).cloned())
    }

    async fn create(&self, index: &str, id: &str, doc: &Value) -> Result<WriteAck, SearchError> {
        let mut state = self.inner.lock();
        state.create_calls += 1;
        if let Some(failure) = state.unavailable.as_ref().or(state.fail_creates.as_ref()) {
            return Err(failure.to_error());
        }
        let docs = state.documents.entry(index.to_string()).or_default();
        if docs.contains_key(id) {
            return Ok(WriteAck::AlreadyExists);
        }
        docs.insert(id.to_string(), doc.clone());
        Ok(WriteAck::Created)
    }

    async fn health(&self) -> Result<ClusterHealth, SearchError> {
        let state = self.inner.lock();
        if let Some(failure) = &state.unavailable {
            return Err(failure.to_error());
        }
        Ok(state.health)
    }
}
