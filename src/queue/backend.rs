// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::errors::QueueError;

/// One stream entry as delivered to a consumer.
///
/// `payload` is `None` when the entry lacks the payload field.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamEntry {
    pub id: String,
    pub payload: Option<String>,
}

/// Cursor that starts a reclaim scan at the head of the pending list.
pub const CLAIM_START: &str = "0-0";

/// Outcome of one reclaim scan.
///
/// `next_start` is where the following scan should resume; it is
/// [`CLAIM_START`] once the whole pending list has been covered.
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimedBatch {
    pub entries: Vec<StreamEntry>,
    pub next_start: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupCreation {
    Created,
    AlreadyExists,
}

/// Health of one consumer group on a stream.
///
/// `entries_read` and `lag` are unknown on brokers that do not track them,
/// or after the stream was trimmed past the group's position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupStatus {
    pub name: String,
    pub consumers: u64,
    pub pending: u64,
    pub entries_read: Option<u64>,
    pub lag: Option<u64>,
}

/// Broker primitives used by [`crate::queue::StreamQueue`].
///
/// Implementations report a missing group as [`QueueError::GroupMissing`]
/// and everything else that goes wrong as [`QueueError::Transport`].
#[async_trait]
pub trait StreamBackend: Send + Sync {
    /// Append `payload` to `stream`, creating the stream if needed.
    async fn append(&self, stream: &str, payload: &str) -> Result<String, QueueError>;

    /// Create `group` on `stream` positioned at new entries only.
    async fn create_group(&self, stream: &str, group: &str) -> Result<GroupCreation, QueueError>;

    /// Deliver up to `count` never-delivered entries to `consumer`.
    async fn read_group(
        &self,
        stream: &str,
        group: &str,
        consumer: &str,
        count: usize,
    ) -> Result<Vec<StreamEntry>, QueueError>;

    /// Transfer up to `count` entries pending for at least `min_idle` to
    /// `consumer`, whoever owned them before.
    ///
    /// The scan starts at `start` and examines a bounded slice of the pending
    /// list, so callers walk the list by feeding back `next_start`.
    async fn auto_claim(
        &self,
        stream: &str,
        group: &str,
        consumer: &str,
        min_idle: Duration,
        start: &str,
        count: usize,
    ) -> Result<ClaimedBatch, QueueError>;

    async fn ack(&self, stream: &str, group: &str, id: &str) -> Result<(), QueueError>;

    /// Status of every group on `stream`; empty when the stream does not exist.
    async fn group_info(&self, stream: &str) -> Result<Vec<GroupStatus>, QueueError>;
}
