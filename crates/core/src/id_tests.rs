// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::collections::HashMap;

crate::define_id! {
    pub struct TestId;
}

#[test]
fn define_id_hash_map_lookup_by_str() {
    let mut map = HashMap::new();
    map.insert(TestId::new("cpu-high"), 42);
    assert_eq!(map.get("cpu-high"), Some(&42));
}

#[test]
fn define_id_serializes_transparently() {
    let id = TestId::new("disk-full");
    assert_eq!(serde_json::to_string(&id).unwrap(), "\"disk-full\"");
    let back: TestId = serde_json::from_str("\"disk-full\"").unwrap();
    assert_eq!(back, id);
}

#[test]
fn define_id_compares_with_str() {
    let id = TestId::from("abc");
    assert!(id == "abc");
    assert_eq!(id.to_string(), "abc");
}

#[yare::parameterized(
    truncates        = { "abcdefghijklmnop", 8, "abcdefgh" },
    shorter          = { "abc",              8, "abc" },
    exact            = { "abcdefgh",         8, "abcdefgh" },
    multibyte_safe   = { "ééééé",            2, "éé" },
)]
fn short_cases(input: &str, n: usize, expected: &str) {
    assert_eq!(short(input, n), expected);
}
