// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::audit::{apply_filter, format_entry, is_filtered, page_window, AuditLog};
use crate::errors::AuditError;

/// Audit log kept in process memory, oldest entry first.
#[derive(Default)]
pub struct MemoryAuditLog {
    entries: Mutex<Vec<String>>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every entry in insertion order.
    pub fn entries(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl AuditLog for MemoryAuditLog {
    async fn log(&self, source: &str, message: &str) -> Result<bool, AuditError> {
        let entry = format_entry(source, message, Utc::now());
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(entry);
        Ok(true)
    }

    async fn get(
        &self,
        page: usize,
        page_size: usize,
        filter: Option<&str>,
    ) -> Result<Vec<String>, AuditError> {
        if page_size == 0 {
            return Ok(Vec::new());
        }
        let (start, stop) = page_window(page, page_size, is_filtered(filter));
        let window: Vec<String> = self
            .entries()
            .into_iter()
            .rev()
            .skip(start)
            .take(stop.saturating_sub(start) + 1)
            .collect();
        Ok(apply_filter(window, filter, page_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded(count: usize) -> MemoryAuditLog {
        let log = MemoryAuditLog::new();
        for i in 0..count {
            let source = if i % 2 == 0 { "Mail" } else { "Heavy" };
            log.log(source, &format!("entry {i}")).await.unwrap();
        }
        log
    }

    #[tokio::test]
    async fn test_pages_are_newest_first() {
        let log = seeded(5).await;

        let first = log.get(1, 2, None).await.unwrap();
        let second = log.get(2, 2, None).await.unwrap();
        let last = log.get(3, 2, None).await.unwrap();

        assert!(first[0].ends_with("entry 4"));
        assert!(first[1].ends_with("entry 3"));
        assert!(second[0].ends_with("entry 2"));
        assert_eq!(last.len(), 1);
        assert!(log.get(4, 2, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_filter_searches_wider_window() {
        let log = seeded(30).await;

        let heavy = log.get(1, 3, Some("HEAVY")).await.unwrap();

        assert_eq!(heavy.len(), 3);
        assert!(heavy.iter().all(|e| e.contains("Heavy - ")));
        assert!(heavy[0].ends_with("entry 29"));
    }
}
