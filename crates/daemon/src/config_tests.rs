// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;
use std::io::Write;
use yare::parameterized;

const FULL: &str = r#"
[search]
url = "http://search.internal:9200"
watch_index = "watcher"
alarm_index = "watcher_alarms"
request_timeout = "10s"
max_retries = 5
retry_backoff = "100ms"
min_health = "yellow"

[scheduler]
schedule = "30s"
max_concurrent_watches = 4
watch_timeout = "2m"
query_timeout = "20s"

[actions]
max_concurrent = 8
max_concurrent_reports = 1
default_timeout = "15s"

[report]
renderer_path = "/usr/local/bin/chromium-render"
output_dir = "/var/lib/watchtower/reports"
"#;

fn clear_env() {
    std::env::remove_var("WT_SEARCH_URL");
    std::env::remove_var("WT_SCHEDULE");
}

#[test]
fn parses_every_section() {
    let config = Config::parse(Path::new("watchtower.toml"), FULL).unwrap();

    assert_eq!(config.search.url, "http://search.internal:9200");
    assert_eq!(config.search.request_timeout, Duration::from_secs(10));
    assert_eq!(config.search.retry_backoff, Duration::from_millis(100));
    assert_eq!(config.search.min_health, ClusterHealth::Yellow);
    assert_eq!(config.scheduler.watch_timeout, Duration::from_secs(120));
    assert_eq!(config.tick_schedule().unwrap(), TickSchedule::Every(Duration::from_secs(30)));
    assert_eq!(config.actions.max_concurrent_reports, 1);
    assert_eq!(
        config.report.renderer_path.as_deref(),
        Some(Path::new("/usr/local/bin/chromium-render"))
    );

    let client = config.search_client();
    assert_eq!(client.retry.max_retries, 5);
    assert_eq!(client.retry.base_backoff, Duration::from_millis(100));
    assert_eq!(config.scheduler_config().max_concurrent_watches, 4);
}

#[test]
fn empty_file_gives_defaults() {
    let config = Config::parse(Path::new("watchtower.toml"), "").unwrap();

    assert_eq!(config.search.url, "http://localhost:9200");
    assert_eq!(config.search.watch_index, "watcher");
    assert_eq!(config.search.alarm_index, "watcher_alarms");
    assert_eq!(config.search.min_health, ClusterHealth::Green);
    assert_eq!(config.scheduler.schedule, "25,55");
    assert_eq!(config.scheduler.max_concurrent_watches, 16);
    assert_eq!(config.actions.default_timeout, Duration::from_secs(30));
    assert!(config.report.renderer_path.is_none());
    config.validate().unwrap();
}

#[test]
fn partial_section_keeps_other_defaults() {
    let config =
        Config::parse(Path::new("watchtower.toml"), "[scheduler]\nschedule = \"0,30\"\n").unwrap();

    assert_eq!(config.scheduler.schedule, "0,30");
    assert_eq!(config.scheduler.watch_timeout, Duration::from_secs(60));
    assert_eq!(config.search.max_retries, 3);
}

#[parameterized(
    unknown_key = { "[search]\nhost = \"x\"\n" },
    unknown_section = { "[alerts]\nenabled = true\n" },
    bad_duration = { "[scheduler]\nwatch_timeout = \"soon\"\n" },
    bad_health = { "[search]\nmin_health = \"purple\"\n" },
)]
fn rejects_bad_toml(text: &str) {
    let err = Config::parse(Path::new("bad.toml"), text).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(..)), "got {err}");
}

#[parameterized(
    bad_schedule = { "[scheduler]\nschedule = \"61\"\n" },
    red_health = { "[search]\nmin_health = \"red\"\n" },
    zero_watches = { "[scheduler]\nmax_concurrent_watches = 0\n" },
    zero_timeout = { "[scheduler]\nquery_timeout = \"0s\"\n" },
    empty_index = { "[search]\nalarm_index = \"\"\n" },
)]
fn rejects_invalid_values(text: &str) {
    let config = Config::parse(Path::new("bad.toml"), text);
    let err = match config {
        Ok(config) => config.validate().unwrap_err(),
        Err(e) => e,
    };
    assert!(matches!(err, ConfigError::Invalid(_) | ConfigError::Parse(..)), "got {err}");
}

#[test]
#[serial]
fn missing_file_loads_defaults() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();

    let config = Config::load(&dir.path().join("absent.toml")).unwrap();

    assert_eq!(config.search.url, "http://localhost:9200");
}

#[test]
#[serial]
fn env_overrides_file_values() {
    clear_env();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(FULL.as_bytes()).unwrap();
    std::env::set_var("WT_SEARCH_URL", "http://override:9200");
    std::env::set_var("WT_SCHEDULE", "0,15,30,45");

    let config = Config::load(file.path());
    clear_env();
    let config = config.unwrap();

    assert_eq!(config.search.url, "http://override:9200");
    assert_eq!(
        config.tick_schedule().unwrap(),
        TickSchedule::SecondsOfMinute(vec![0, 15, 30, 45])
    );
}

#[test]
#[serial]
fn invalid_env_schedule_fails_validation() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    std::env::set_var("WT_SCHEDULE", "whenever");

    let result = Config::load(&dir.path().join("absent.toml"));
    clear_env();

    assert!(matches!(result, Err(ConfigError::Invalid(_))));
}
