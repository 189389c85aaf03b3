// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;
use std::time::Duration;

/// Config file path: WT_CONFIG > ./watchtower.toml
pub fn config_path() -> PathBuf {
    std::env::var("WT_CONFIG")
        .ok()
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("watchtower.toml"))
}

/// Search backend URL override
pub fn search_url() -> Option<String> {
    std::env::var("WT_SEARCH_URL").ok().filter(|s| !s.is_empty())
}

/// Tick schedule override
pub fn schedule() -> Option<String> {
    std::env::var("WT_SCHEDULE").ok().filter(|s| !s.is_empty())
}

/// Directory for the daily log file. Unset logs to stderr only.
pub fn log_dir() -> Option<PathBuf> {
    std::env::var("WT_LOG_DIR").ok().filter(|s| !s.is_empty()).map(PathBuf::from)
}

/// Log filter directive (default "info")
pub fn log_filter() -> String {
    std::env::var("WT_LOG").ok().filter(|s| !s.is_empty()).unwrap_or_else(|| "info".to_string())
}

/// Legacy JSON config whose presence blocks startup
pub fn legacy_config_path() -> PathBuf {
    std::env::var("WT_LEGACY_CONFIG")
        .ok()
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("/etc/watchtower.json"))
}

/// Shutdown drain timeout override (`WT_DRAIN_TIMEOUT_MS`).
pub fn drain_timeout() -> Option<Duration> {
    std::env::var("WT_DRAIN_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}
