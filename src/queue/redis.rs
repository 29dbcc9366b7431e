// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::streams::{StreamId, StreamRangeReply, StreamReadOptions, StreamReadReply};
use redis::{AsyncCommands, RedisError, Value};

use crate::config::consts::DATA_FIELD;
use crate::errors::QueueError;
use crate::queue::{ClaimedBatch, GroupCreation, GroupStatus, StreamBackend, StreamEntry, CLAIM_START};

/// Open a reconnecting connection to the broker at `url`.
pub async fn connect(url: &str) -> Result<ConnectionManager, RedisError> {
    let client = redis::Client::open(url)?;
    ConnectionManager::new(client).await
}

/// Redis streams backend.
///
/// Reads never block on the server; the consume loop does its own pacing.
#[derive(Clone)]
pub struct RedisStreamBackend {
    conn: ConnectionManager,
}

impl RedisStreamBackend {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    pub async fn connect(url: &str) -> Result<Self, QueueError> {
        Ok(Self::new(connect(url).await?))
    }
}

fn classify(err: RedisError, stream: &str, group: &str) -> QueueError {
    if err.code() == Some("NOGROUP") {
        QueueError::GroupMissing {
            stream: stream.to_string(),
            group: group.to_string(),
        }
    } else {
        QueueError::Transport(err.to_string())
    }
}

fn to_entry(id: StreamId) -> StreamEntry {
    StreamEntry {
        payload: id.get::<String>(DATA_FIELD),
        id: id.id,
    }
}

fn field<T: redis::FromRedisValue>(group: &HashMap<String, Value>, name: &str) -> Option<T> {
    group
        .get(name)
        .and_then(|value| redis::from_redis_value::<Option<T>>(value).ok())
        .flatten()
}

#[async_trait]
impl StreamBackend for RedisStreamBackend {
    async fn append(&self, stream: &str, payload: &str) -> Result<String, QueueError> {
        let mut conn = self.conn.clone();
        let id: String = conn.xadd(stream, "*", &[(DATA_FIELD, payload)]).await?;
        Ok(id)
    }

    async fn create_group(&self, stream: &str, group: &str) -> Result<GroupCreation, QueueError> {
        let mut conn = self.conn.clone();
        match conn
            .xgroup_create_mkstream::<&str, &str, &str, ()>(stream, group, "$")
            .await
        {
            Ok(()) => Ok(GroupCreation::Created),
            Err(e) if e.code() == Some("BUSYGROUP") => Ok(GroupCreation::AlreadyExists),
            Err(e) => Err(e.into()),
        }
    }

    async fn read_group(
        &self,
        stream: &str,
        group: &str,
        consumer: &str,
        count: usize,
    ) -> Result<Vec<StreamEntry>, QueueError> {
        let mut conn = self.conn.clone();
        let opts = StreamReadOptions::default().group(group, consumer).count(count);

        // XREADGROUP without BLOCK answers nil when nothing is new.
        let reply: Option<StreamReadReply> = conn
            .xread_options(&[stream], &[">"], &opts)
            .await
            .map_err(|e| classify(e, stream, group))?;

        Ok(reply
            .map(|reply| {
                reply
                    .keys
                    .into_iter()
                    .flat_map(|key| key.ids)
                    .map(to_entry)
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn auto_claim(
        &self,
        stream: &str,
        group: &str,
        consumer: &str,
        min_idle: Duration,
        start: &str,
        count: usize,
    ) -> Result<ClaimedBatch, QueueError> {
        let mut conn = self.conn.clone();

        // Reply is [next-cursor, entries] (plus deleted ids on Redis 7).
        let reply: Vec<Value> = redis::cmd("XAUTOCLAIM")
            .arg(stream)
            .arg(group)
            .arg(consumer)
            .arg(min_idle.as_millis() as u64)
            .arg(start)
            .arg("COUNT")
            .arg(count)
            .query_async(&mut conn)
            .await
            .map_err(|e| classify(e, stream, group))?;

        let next_start = match reply.first() {
            Some(cursor) => redis::from_redis_value::<String>(cursor)?,
            None => CLAIM_START.to_string(),
        };
        let entries = match reply.get(1) {
            Some(claimed) => {
                let range: StreamRangeReply = redis::from_redis_value(claimed)?;
                range.ids.into_iter().map(to_entry).collect()
            }
            None => Vec::new(),
        };

        Ok(ClaimedBatch {
            entries,
            next_start,
        })
    }

    async fn ack(&self, stream: &str, group: &str, id: &str) -> Result<(), QueueError> {
        let mut conn = self.conn.clone();
        conn.xack::<&str, &str, &str, ()>(stream, group, &[id])
            .await
            .map_err(|e| classify(e, stream, group))
    }

    async fn group_info(&self, stream: &str) -> Result<Vec<GroupStatus>, QueueError> {
        let mut conn = self.conn.clone();
        let result: Result<Vec<HashMap<String, Value>>, RedisError> = redis::cmd("XINFO")
            .arg("GROUPS")
            .arg(stream)
            .query_async(&mut conn)
            .await;

        let groups = match result {
            Ok(groups) => groups,
            Err(e) if e.to_string().contains("no such key") => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        Ok(groups
            .iter()
            .map(|group| GroupStatus {
                name: field(group, "name").unwrap_or_default(),
                consumers: field(group, "consumers").unwrap_or_default(),
                pending: field(group, "pending").unwrap_or_default(),
                entries_read: field(group, "entries-read"),
                lag: field(group, "lag"),
            })
            .collect())
    }
}
