// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::time::Duration;

/// Stream the ingestion endpoint writes raw parcel records to.
pub const ENTRY_STREAM: &str = "parcel-stream";
/// Consumer group the router reads the entry stream with.
pub const ROUTER_GROUP: &str = "rule-checker-group";
/// The single field every stream entry carries its payload in.
pub const DATA_FIELD: &str = "data";

/// Pending entries idle longer than this may be reclaimed by another consumer.
pub const DEFAULT_IDLE_THRESHOLD: Duration = Duration::from_secs(10);
/// Backoff between empty polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);
/// Maximum new entries fetched per read.
pub const DEFAULT_READ_BATCH: usize = 10;
/// Maximum stalled entries reclaimed per empty read.
pub const DEFAULT_CLAIM_BATCH: usize = 1;
/// How often the rule-book file is checked for changes.
pub const DEFAULT_RELOAD_INTERVAL: Duration = Duration::from_secs(1);

pub const DEFAULT_REDIS_URL: &str = "redis://redis:6379";
pub const DEFAULT_REDIS_HOST: &str = "redis";
pub const DEFAULT_RULE_BOOK_PATH: &str = "rules-book.txt";
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Tolerance used for numeric `=` comparisons.
pub const NUMERIC_EPSILON: f64 = 1e-6;

/// Sorted set holding the audit trail.
pub const AUDIT_LOG_KEY: &str = "processlogs";
/// Filtered audit pages scan this many pages worth of entries.
pub const AUDIT_SEARCH_FACTOR: usize = 10;
/// Audit source name used by the router.
pub const ROUTER_SOURCE: &str = "RuleChecker";
/// Consumer name prefix for router instances.
pub const ROUTER_CONSUMER_PREFIX: &str = "rc";

/// Stream a department consumes: `<Department>-stream`.
pub fn stream_key(department: &str) -> String {
    format!("{department}-stream")
}

/// Consumer group a department consumes with: `<Department>-consumer-group`.
pub fn group_name(department: &str) -> String {
    format!("{department}-consumer-group")
}

/// Unique consumer name within a group, e.g. `mail-2f0c…`.
pub fn consumer_name(prefix: &str) -> String {
    format!("{}-{}", prefix.to_lowercase(), uuid::Uuid::new_v4())
}
