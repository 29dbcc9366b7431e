// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Append-only audit trail of what the router and departments did.
//!
//! Entries are plain strings, `[<id> <utc timestamp>] <source> - <message>`,
//! read back newest first in pages.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};

use crate::errors::AuditError;
use crate::observability::messages::pipeline::AuditWriteFailed;
use crate::observability::messages::StructuredLog;

mod memory;
mod redis;

pub use memory::MemoryAuditLog;
pub use self::redis::RedisAuditLog;

#[async_trait]
pub trait AuditLog: Send + Sync {
    /// Append an entry; `Ok(false)` when the sink already held an identical one.
    async fn log(&self, source: &str, message: &str) -> Result<bool, AuditError>;

    /// Page `page` (1-based) of entries, newest first.
    ///
    /// With a `filter`, only entries containing it (case-insensitively) are
    /// returned, searched over a window of [`AUDIT_SEARCH_FACTOR`] pages
    /// starting at the page's offset.
    ///
    /// [`AUDIT_SEARCH_FACTOR`]: crate::config::consts::AUDIT_SEARCH_FACTOR
    async fn get(
        &self,
        page: usize,
        page_size: usize,
        filter: Option<&str>,
    ) -> Result<Vec<String>, AuditError>;
}

/// Render an audit entry.
pub fn format_entry(source: &str, message: &str, at: DateTime<Utc>) -> String {
    format!(
        "[{} {}] {} - {}",
        uuid::Uuid::new_v4(),
        at.to_rfc3339_opts(SecondsFormat::Micros, true),
        source,
        message
    )
}

/// Write an audit entry, logging instead of failing when the sink is down.
///
/// Audit writes happen after the work they describe; failing the message at
/// that point would only cause a duplicate dispatch.
pub async fn record(audit: &dyn AuditLog, source: &str, message: &str) {
    if let Err(e) = audit.log(source, message).await {
        AuditWriteFailed { source, error: &e }.log();
    }
}

/// Zero-based rank window `[start, stop]` for a page, widened for filtering.
pub(crate) fn page_window(page: usize, page_size: usize, filtered: bool) -> (usize, usize) {
    let start = page.max(1).saturating_sub(1).saturating_mul(page_size);
    let span = if filtered {
        page_size.saturating_mul(crate::config::consts::AUDIT_SEARCH_FACTOR)
    } else {
        page_size
    };
    (start, start.saturating_add(span).saturating_sub(1))
}

/// Keep entries containing `filter` (case-insensitive), at most `page_size`.
pub(crate) fn apply_filter(entries: Vec<String>, filter: Option<&str>, page_size: usize) -> Vec<String> {
    match filter.map(str::trim).filter(|f| !f.is_empty()) {
        Some(filter) => {
            let needle = filter.to_lowercase();
            entries
                .into_iter()
                .filter(|entry| entry.to_lowercase().contains(&needle))
                .take(page_size)
                .collect()
        }
        None => entries,
    }
}

/// Whether `filter` asks for filtering at all.
pub(crate) fn is_filtered(filter: Option<&str>) -> bool {
    filter.map(|f| !f.trim().is_empty()).unwrap_or(false)
}
