// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{
    DEFAULT_CLAIM_BATCH, DEFAULT_IDLE_THRESHOLD, DEFAULT_LOG_FILTER, DEFAULT_POLL_INTERVAL,
    DEFAULT_READ_BATCH, DEFAULT_REDIS_HOST, DEFAULT_REDIS_URL, DEFAULT_RELOAD_INTERVAL,
    DEFAULT_RULE_BOOK_PATH,
};
use crate::errors::ConfigError;
use crate::queue::QueueOptions;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Runtime configuration shared by the router and the department services.
///
/// Every section and field is optional; anything left out takes its
/// built-in default.
///
/// # Example
/// ```yaml
/// redis:
///   url: redis://redis:6379
/// rule_book:
///   path: rules-book.txt
///   reload_interval_ms: 1000
/// queue:
///   poll_interval_ms: 250
///   idle_threshold_ms: 10000
///   read_batch: 10
///   claim_batch: 1
/// logging:
///   filter: info
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub redis: RedisConfig,
    pub rule_book: RuleBookConfig,
    pub queue: QueueConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    pub url: String,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_REDIS_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RuleBookConfig {
    pub path: PathBuf,
    pub reload_interval_ms: u64,
}

impl Default for RuleBookConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_RULE_BOOK_PATH),
            reload_interval_ms: DEFAULT_RELOAD_INTERVAL.as_millis() as u64,
        }
    }
}

impl RuleBookConfig {
    pub fn reload_interval(&self) -> Duration {
        Duration::from_millis(self.reload_interval_ms)
    }
}

/// Consume loop tuning, see [`QueueOptions`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    pub poll_interval_ms: u64,
    pub idle_threshold_ms: u64,
    pub read_batch: usize,
    pub claim_batch: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
            idle_threshold_ms: DEFAULT_IDLE_THRESHOLD.as_millis() as u64,
            read_batch: DEFAULT_READ_BATCH,
            claim_batch: DEFAULT_CLAIM_BATCH,
        }
    }
}

impl QueueConfig {
    pub fn options(&self) -> QueueOptions {
        QueueOptions {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            idle_threshold: Duration::from_millis(self.idle_threshold_ms),
            read_batch: self.read_batch,
            claim_batch: self.claim_batch,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directives; `RUST_LOG` takes precedence when set.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Config {
    /// Apply `REDIS_URL` and `REDIS_PORT` from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from `lookup`. `REDIS_URL` replaces the URL outright;
    /// otherwise `REDIS_PORT` replaces only its port.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("REDIS_URL").filter(|v| !v.trim().is_empty()) {
            self.redis.url = url;
        } else if let Some(port) = lookup("REDIS_PORT").filter(|v| !v.trim().is_empty()) {
            self.redis.url = with_port(&self.redis.url, port.trim());
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.redis.url.trim().is_empty() {
            return Err(invalid("redis.url", "must not be empty"));
        }
        if self.rule_book.path.as_os_str().is_empty() {
            return Err(invalid("rule_book.path", "must not be empty"));
        }
        if self.rule_book.reload_interval_ms == 0 {
            return Err(invalid("rule_book.reload_interval_ms", "must be greater than zero"));
        }
        if self.queue.poll_interval_ms == 0 {
            return Err(invalid("queue.poll_interval_ms", "must be greater than zero"));
        }
        if self.queue.idle_threshold_ms == 0 {
            return Err(invalid("queue.idle_threshold_ms", "must be greater than zero"));
        }
        if self.queue.read_batch == 0 {
            return Err(invalid("queue.read_batch", "must be greater than zero"));
        }
        if self.queue.claim_batch == 0 {
            return Err(invalid("queue.claim_batch", "must be greater than zero"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}

/// Replace the port of a `redis://[user@]host[:port][/db]` URL.
fn with_port(url: &str, port: &str) -> String {
    let (scheme, rest) = url.split_once("://").unwrap_or(("redis", url));
    let (authority, path) = match rest.find('/') {
        Some(index) => rest.split_at(index),
        None => (rest, ""),
    };
    let (userinfo, host_port) = match authority.rsplit_once('@') {
        Some((user, host_port)) => (format!("{user}@"), host_port),
        None => (String::new(), authority),
    };
    let host = match host_port.rsplit_once(':') {
        Some((host, _)) => host,
        None if host_port.is_empty() => DEFAULT_REDIS_HOST,
        None => host_port,
    };
    format!("{scheme}://{userinfo}{host}:{port}{path}")
}

/// Load a config from a YAML file. An empty file yields the defaults.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(Config::default());
    }
    Ok(serde_yaml::from_str(&content)?)
}

/// Load a config, apply environment overrides, and validate it.
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let mut cfg = load_config(path)?;
    cfg.apply_env_overrides();
    cfg.validate()?;
    Ok(cfg)
}
