// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Test double that makes selected broker operations fail with a transport
//! error while delegating everything else to a [`MemoryStreamBackend`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::errors::QueueError;
use crate::queue::{
    ClaimedBatch, GroupCreation, GroupStatus, MemoryStreamBackend, StreamBackend, StreamEntry,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Append,
    ReadGroup,
    AutoClaim,
}

pub struct FaultyStreamBackend {
    inner: Arc<MemoryStreamBackend>,
    faults: Mutex<HashMap<Operation, usize>>,
    failed: Mutex<HashMap<Operation, usize>>,
}

impl FaultyStreamBackend {
    pub fn new(inner: Arc<MemoryStreamBackend>) -> Self {
        Self {
            inner,
            faults: Mutex::new(HashMap::new()),
            failed: Mutex::new(HashMap::new()),
        }
    }

    /// Fail the next `times` calls of `operation`.
    pub fn fail(&self, operation: Operation, times: usize) {
        self.faults.lock().unwrap().insert(operation, times);
    }

    /// Fail every call of `operation` until [`FaultyStreamBackend::heal`].
    pub fn refuse(&self, operation: Operation) {
        self.fail(operation, usize::MAX);
    }

    pub fn heal(&self, operation: Operation) {
        self.faults.lock().unwrap().remove(&operation);
    }

    /// How many calls of `operation` have failed so far.
    pub fn failures(&self, operation: Operation) -> usize {
        self.failed.lock().unwrap().get(&operation).copied().unwrap_or(0)
    }

    fn check(&self, operation: Operation) -> Result<(), QueueError> {
        let mut faults = self.faults.lock().unwrap();
        let Some(remaining) = faults.get_mut(&operation) else {
            return Ok(());
        };
        if *remaining == 0 {
            return Ok(());
        }
        if *remaining != usize::MAX {
            *remaining -= 1;
        }
        *self.failed.lock().unwrap().entry(operation).or_default() += 1;
        Err(QueueError::Transport(format!("{:?} refused: connection reset", operation)))
    }
}

#[async_trait]
impl StreamBackend for FaultyStreamBackend {
    async fn append(&self, stream: &str, payload: &str) -> Result<String, QueueError> {
        self.check(Operation::Append)?;
        self.inner.append(stream, payload).await
    }

    async fn create_group(&self, stream: &str, group: &str) -> Result<GroupCreation, QueueError> {
        self.inner.create_group(stream, group).await
    }

    async fn read_group(
        &self,
        stream: &str,
        group: &str,
        consumer: &str,
        count: usize,
    ) -> Result<Vec<StreamEntry>, QueueError> {
        self.check(Operation::ReadGroup)?;
        self.inner.read_group(stream, group, consumer, count).await
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
        self.check(Operation::AutoClaim)?;
        self.inner
            .auto_claim(stream, group, consumer, min_idle, start, count)
            .await
    }

    async fn ack(&self, stream: &str, group: &str, id: &str) -> Result<(), QueueError> {
        self.inner.ack(stream, group, id).await
    }

    async fn group_info(&self, stream: &str) -> Result<Vec<GroupStatus>, QueueError> {
        self.inner.group_info(stream).await
    }
}
