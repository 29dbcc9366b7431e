// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! In-process stream backend with the same group semantics as the broker:
//! groups start at the tail, deliveries stay pending until acknowledged, and
//! idle pending entries can be claimed by any consumer.
//!
//! Idle time is measured with `tokio::time::Instant`, so tests can drive
//! reclaim with a paused clock. A reclaim scan examines at most ten pending
//! entries per requested claim before handing back a resume cursor, as the
//! broker does.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::errors::QueueError;
use crate::queue::{ClaimedBatch, GroupCreation, GroupStatus, StreamBackend, StreamEntry, CLAIM_START};

const CLAIM_SCAN_FACTOR: usize = 10;

#[derive(Default)]
pub struct MemoryStreamBackend {
    streams: Mutex<HashMap<String, MemoryStream>>,
}

#[derive(Default)]
struct MemoryStream {
    entries: Vec<StreamEntry>,
    groups: HashMap<String, MemoryGroup>,
}

struct MemoryGroup {
    /// Index of the next never-delivered entry.
    cursor: usize,
    pending: BTreeMap<usize, Delivery>,
    consumers: HashSet<String>,
}

struct Delivery {
    consumer: String,
    delivered_at: Instant,
}

impl MemoryStreamBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every entry ever appended to `stream`, acknowledged or not.
    pub fn entries(&self, stream: &str) -> Vec<StreamEntry> {
        self.lock()
            .get(stream)
            .map(|s| s.entries.clone())
            .unwrap_or_default()
    }

    /// Keys of all streams that exist.
    pub fn stream_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.lock().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Append an entry without the payload field.
    pub fn append_without_payload(&self, stream: &str) -> String {
        self.push(stream, None)
    }

    /// Owner of each pending entry of `group`, in id order.
    pub fn pending(&self, stream: &str, group: &str) -> Vec<(String, String)> {
        let streams = self.lock();
        let Some(s) = streams.get(stream) else {
            return Vec::new();
        };
        let Some(g) = s.groups.get(group) else {
            return Vec::new();
        };
        g.pending
            .iter()
            .map(|(index, delivery)| (s.entries[*index].id.clone(), delivery.consumer.clone()))
            .collect()
    }

    /// Drop a stream with all its groups, as `DEL` would.
    pub fn delete_stream(&self, stream: &str) {
        self.lock().remove(stream);
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, MemoryStream>> {
        self.streams
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn push(&self, stream: &str, payload: Option<String>) -> String {
        let mut streams = self.lock();
        let s = streams.entry(stream.to_string()).or_default();
        let id = format!("{}-0", s.entries.len() + 1);
        s.entries.push(StreamEntry {
            id: id.clone(),
            payload,
        });
        id
    }
}

/// Entry index of the first pending entry at or after the id `start`.
fn start_index(start: &str) -> usize {
    start
        .split('-')
        .next()
        .and_then(|ms| ms.parse::<usize>().ok())
        .map(|sequence| sequence.saturating_sub(1))
        .unwrap_or(0)
}

fn group_mut<'a>(
    streams: &'a mut HashMap<String, MemoryStream>,
    stream: &str,
    group: &str,
) -> Result<(&'a [StreamEntry], &'a mut MemoryGroup), QueueError> {
    let missing = || QueueError::GroupMissing {
        stream: stream.to_string(),
        group: group.to_string(),
    };
    let s = streams.get_mut(stream).ok_or_else(missing)?;
    let g = s.groups.get_mut(group).ok_or_else(missing)?;
    Ok((&s.entries, g))
}

#[async_trait]
impl StreamBackend for MemoryStreamBackend {
    async fn append(&self, stream: &str, payload: &str) -> Result<String, QueueError> {
        Ok(self.push(stream, Some(payload.to_string())))
    }

    async fn create_group(&self, stream: &str, group: &str) -> Result<GroupCreation, QueueError> {
        let mut streams = self.lock();
        let s = streams.entry(stream.to_string()).or_default();
        if s.groups.contains_key(group) {
            return Ok(GroupCreation::AlreadyExists);
        }
        let cursor = s.entries.len();
        s.groups.insert(
            group.to_string(),
            MemoryGroup {
                cursor,
                pending: BTreeMap::new(),
                consumers: HashSet::new(),
            },
        );
        Ok(GroupCreation::Created)
    }

    async fn read_group(
        &self,
        stream: &str,
        group: &str,
        consumer: &str,
        count: usize,
    ) -> Result<Vec<StreamEntry>, QueueError> {
        let mut streams = self.lock();
        let (entries, g) = group_mut(&mut streams, stream, group)?;
        g.consumers.insert(consumer.to_string());

        let end = entries.len().min(g.cursor + count);
        let now = Instant::now();
        let delivered: Vec<StreamEntry> = (g.cursor..end)
            .map(|index| {
                g.pending.insert(
                    index,
                    Delivery {
                        consumer: consumer.to_string(),
                        delivered_at: now,
                    },
                );
                entries[index].clone()
            })
            .collect();
        g.cursor = end;
        Ok(delivered)
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
        let mut streams = self.lock();
        let (entries, g) = group_mut(&mut streams, stream, group)?;
        g.consumers.insert(consumer.to_string());

        let scan: Vec<usize> = g.pending.range(start_index(start)..).map(|(index, _)| *index).collect();
        let budget = count.saturating_mul(CLAIM_SCAN_FACTOR);
        let now = Instant::now();
        let mut claimed = Vec::new();
        let mut next_start = CLAIM_START.to_string();

        for (examined, index) in scan.iter().enumerate() {
            if claimed.len() >= count || examined >= budget {
                next_start = entries[*index].id.clone();
                break;
            }
            let Some(delivery) = g.pending.get_mut(index) else {
                continue;
            };
            if now.duration_since(delivery.delivered_at) < min_idle {
                continue;
            }
            delivery.consumer = consumer.to_string();
            delivery.delivered_at = now;
            claimed.push(entries[*index].clone());
        }

        Ok(ClaimedBatch {
            entries: claimed,
            next_start,
        })
    }

    async fn ack(&self, stream: &str, group: &str, id: &str) -> Result<(), QueueError> {
        let mut streams = self.lock();
        let (entries, g) = group_mut(&mut streams, stream, group)?;
        if let Some(index) = entries.iter().position(|e| e.id == id) {
            g.pending.remove(&index);
        }
        Ok(())
    }

    async fn group_info(&self, stream: &str) -> Result<Vec<GroupStatus>, QueueError> {
        let streams = self.lock();
        let Some(s) = streams.get(stream) else {
            return Ok(Vec::new());
        };

        let mut groups: Vec<GroupStatus> = s
            .groups
            .iter()
            .map(|(name, g)| GroupStatus {
                name: name.clone(),
                consumers: g.consumers.len() as u64,
                pending: g.pending.len() as u64,
                entries_read: Some(g.cursor as u64),
                lag: Some((s.entries.len() - g.cursor) as u64),
            })
            .collect();
        groups.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(groups)
    }
}
