// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration: a TOML file plus environment overrides.
//!
//! Every section has defaults, so a missing file or an empty one yields a
//! runnable configuration pointed at a local backend.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use wt_adapters::{ClusterHealth, RetryPolicy, SearchClientConfig};
use wt_core::duration::serde_duration;
use wt_engine::{SchedulerConfig, TickSchedule};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {0}: {1}")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("failed to parse config {0}: {1}")]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub search: SearchSection,
    pub scheduler: SchedulerSection,
    pub actions: ActionsSection,
    pub report: ReportSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchSection {
    pub url: String,
    pub watch_index: String,
    pub alarm_index: String,
    #[serde(with = "serde_duration")]
    pub request_timeout: Duration,
    pub max_retries: u32,
    #[serde(with = "serde_duration")]
    pub retry_backoff: Duration,
    /// Health the backend must reach before the scheduler starts.
    pub min_health: ClusterHealth,
}

impl Default for SearchSection {
    fn default() -> Self {
        Self {
            url: "http://localhost:9200".to_string(),
            watch_index: "watcher".to_string(),
            alarm_index: "watcher_alarms".to_string(),
            request_timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_backoff: Duration::from_millis(200),
            min_health: ClusterHealth::Green,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchedulerSection {
    pub schedule: String,
    pub max_concurrent_watches: usize,
    #[serde(with = "serde_duration")]
    pub watch_timeout: Duration,
    #[serde(with = "serde_duration")]
    pub query_timeout: Duration,
}

impl Default for SchedulerSection {
    fn default() -> Self {
        Self {
            schedule: TickSchedule::default().to_string(),
            max_concurrent_watches: 16,
            watch_timeout: Duration::from_secs(60),
            query_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ActionsSection {
    pub max_concurrent: usize,
    pub max_concurrent_reports: usize,
    #[serde(with = "serde_duration")]
    pub default_timeout: Duration,
}

impl Default for ActionsSection {
    fn default() -> Self {
        Self { max_concurrent: 32, max_concurrent_reports: 2, default_timeout: Duration::from_secs(30) }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportSection {
    /// Renderer binary. Unset means look up the default name on `PATH`.
    pub renderer_path: Option<PathBuf>,
    pub output_dir: PathBuf,
}

impl Default for ReportSection {
    fn default() -> Self {
        Self { renderer_path: None, output_dir: PathBuf::from("reports") }
    }
}

impl Config {
    /// Load from `path`, apply environment overrides, and validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = match std::fs::read_to_string(path) {
            Ok(text) => Self::parse(path, &text)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no config file, using defaults");
                Self::default()
            }
            Err(e) => return Err(ConfigError::Read(path.to_path_buf(), e)),
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    pub fn parse(path: &Path, text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))
    }

    fn apply_env(&mut self) {
        if let Some(url) = crate::env::search_url() {
            self.search.url = url;
        }
        if let Some(schedule) = crate::env::schedule() {
            self.scheduler.schedule = schedule;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tick_schedule()?;
        if self.search.watch_index.is_empty() || self.search.alarm_index.is_empty() {
            return Err(ConfigError::Invalid("index names must not be empty".to_string()));
        }
        if self.search.min_health == ClusterHealth::Red {
            return Err(ConfigError::Invalid("min_health must be yellow or green".to_string()));
        }
        if self.scheduler.max_concurrent_watches == 0 || self.actions.max_concurrent == 0 {
            return Err(ConfigError::Invalid("concurrency limits must be at least 1".to_string()));
        }
        if self.scheduler.watch_timeout.is_zero() || self.scheduler.query_timeout.is_zero() {
            return Err(ConfigError::Invalid("timeouts must be non-zero".to_string()));
        }
        Ok(())
    }

    pub fn tick_schedule(&self) -> Result<TickSchedule, ConfigError> {
        self.scheduler
            .schedule
            .parse()
            .map_err(|e| ConfigError::Invalid(format!("schedule '{}': {}", self.scheduler.schedule, e)))
    }

    pub fn search_client(&self) -> SearchClientConfig {
        SearchClientConfig {
            url: self.search.url.clone(),
            request_timeout: self.search.request_timeout,
            retry: RetryPolicy {
                max_retries: self.search.max_retries,
                base_backoff: self.search.retry_backoff,
                ..RetryPolicy::default()
            },
        }
    }

    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            max_concurrent_watches: self.scheduler.max_concurrent_watches,
            watch_timeout: self.scheduler.watch_timeout,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
