// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use chrono::Utc;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use crate::audit::{apply_filter, format_entry, is_filtered, page_window, AuditLog};
use crate::config::consts::AUDIT_LOG_KEY;
use crate::errors::AuditError;

/// Audit log stored in a sorted set scored by unix milliseconds.
#[derive(Clone)]
pub struct RedisAuditLog {
    conn: ConnectionManager,
    key: String,
}

impl RedisAuditLog {
    pub fn new(conn: ConnectionManager) -> Self {
        Self {
            conn,
            key: AUDIT_LOG_KEY.to_string(),
        }
    }
}

#[async_trait]
impl AuditLog for RedisAuditLog {
    async fn log(&self, source: &str, message: &str) -> Result<bool, AuditError> {
        let mut conn = self.conn.clone();
        let now = Utc::now();
        let entry = format_entry(source, message, now);

        let added: i64 = conn.zadd(&self.key, entry, now.timestamp_millis()).await?;
        Ok(added > 0)
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
        let mut conn = self.conn.clone();
        let (start, stop) = page_window(page, page_size, is_filtered(filter));

        let window: Vec<String> = conn
            .zrevrange(&self.key, start as isize, stop as isize)
            .await?;
        Ok(apply_filter(window, filter, page_size))
    }
}
