// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::errors::QueueError;
use crate::observability::messages::queue::*;
use crate::observability::messages::StructuredLog;
use crate::queue::{GroupCreation, GroupStatus, QueueOptions, StreamBackend, StreamEntry, CLAIM_START};

/// Consumer-side callback for one stream entry's payload.
///
/// Returning `Ok` acknowledges the entry. An error leaves it pending so it is
/// redelivered, to this or another consumer, once it has been idle past the
/// reclaim threshold.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn handle(&self, payload: &str) -> Result<(), Self::Error>;
}

/// At-least-once stream transport over a [`StreamBackend`].
#[derive(Clone)]
pub struct StreamQueue {
    backend: Arc<dyn StreamBackend>,
    options: QueueOptions,
    /// (stream, group) pairs [`StreamQueue::deliver`] has already created.
    ensured: Arc<Mutex<HashSet<(String, String)>>>,
}

enum Poll {
    /// Nothing was read or reclaimed.
    Idle,
    /// At least one entry was handled; poll again straight away.
    Busy,
    /// Cancellation interrupted a handler.
    Interrupted,
}

impl StreamQueue {
    pub fn new(backend: Arc<dyn StreamBackend>, options: QueueOptions) -> Self {
        Self {
            backend,
            options,
            ensured: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn options(&self) -> &QueueOptions {
        &self.options
    }

    /// Append `payload` to `stream` and return the broker-assigned id.
    pub async fn produce(&self, stream: &str, payload: &str) -> Result<String, QueueError> {
        let entry_id = self.backend.append(stream, payload).await?;
        MessageProduced {
            stream,
            entry_id: &entry_id,
        }
        .log();
        Ok(entry_id)
    }

    /// Append `payload` to `stream` on behalf of `group`, creating the group
    /// first unless this queue already did.
    ///
    /// Groups start at new entries only; a group created after the append
    /// would never see it.
    pub async fn deliver(&self, stream: &str, group: &str, payload: &str) -> Result<String, QueueError> {
        let key = (stream.to_string(), group.to_string());
        let known = self.ensured_groups().contains(&key);
        if !known {
            self.ensure_group(stream, group).await?;
            self.ensured_groups().insert(key);
        }
        self.produce(stream, payload).await
    }

    fn ensured_groups(&self) -> MutexGuard<'_, HashSet<(String, String)>> {
        self.ensured
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Create `group` on `stream` if it does not exist yet.
    pub async fn ensure_group(&self, stream: &str, group: &str) -> Result<(), QueueError> {
        match self.backend.create_group(stream, group).await? {
            GroupCreation::Created => GroupCreated { stream, group }.log(),
            GroupCreation::AlreadyExists => GroupAlreadyExists { stream, group }.log(),
        }
        Ok(())
    }

    /// Per-group health of `stream`. Read-only.
    pub async fn status(&self, stream: &str) -> Result<Vec<GroupStatus>, QueueError> {
        self.backend.group_info(stream).await
    }

    /// Consume `stream` as `consumer` within `group` until `cancel` fires.
    ///
    /// Fails only if the group cannot be set up; broker errors inside the
    /// loop are logged and retried after the poll interval.
    pub async fn consume<H>(
        &self,
        stream: &str,
        group: &str,
        consumer: &str,
        handler: &H,
        cancel: &CancellationToken,
    ) -> Result<(), QueueError>
    where
        H: MessageHandler + ?Sized,
    {
        self.ensure_group(stream, group).await?;

        let started = ConsumerStarted {
            stream,
            group,
            consumer,
        };
        let span = started.span("consume");

        async move {
            started.log();
            let mut claim_start = CLAIM_START.to_string();

            while !cancel.is_cancelled() {
                let idle = match self
                    .poll(stream, group, consumer, handler, cancel, &mut claim_start)
                    .await
                {
                    Ok(Poll::Idle) => true,
                    Ok(Poll::Busy) => false,
                    Ok(Poll::Interrupted) => break,
                    Err(QueueError::GroupMissing { .. }) => {
                        GroupMissing { stream, group }.log();
                        claim_start = CLAIM_START.to_string();
                        if let Err(e) = self.ensure_group(stream, group).await {
                            QueueOperationFailed {
                                stream,
                                operation: "create_group",
                                error: &e,
                            }
                            .log();
                        }
                        true
                    }
                    Err(e) => {
                        QueueOperationFailed {
                            stream,
                            operation: "poll",
                            error: &e,
                        }
                        .log();
                        true
                    }
                };

                if idle {
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(self.options.poll_interval) => {}
                    }
                }
            }

            ConsumerStopped { stream, consumer }.log();
            Ok(())
        }
        .instrument(span)
        .await
    }

    async fn poll<H>(
        &self,
        stream: &str,
        group: &str,
        consumer: &str,
        handler: &H,
        cancel: &CancellationToken,
        claim_start: &mut String,
    ) -> Result<Poll, QueueError>
    where
        H: MessageHandler + ?Sized,
    {
        let entries = self.fetch(stream, group, consumer, claim_start).await?;
        if entries.is_empty() {
            return Ok(Poll::Idle);
        }

        for entry in entries {
            let entry_id = entry.id.as_str();
            let Some(payload) = entry.payload.as_deref() else {
                EntryWithoutPayload { stream, entry_id }.log();
                self.backend.ack(stream, group, entry_id).await?;
                continue;
            };

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                result = handler.handle(payload) => Some(result),
            };

            match outcome {
                None => {
                    HandlerInterrupted { stream, entry_id }.log();
                    return Ok(Poll::Interrupted);
                }
                Some(Ok(())) => {
                    self.backend.ack(stream, group, entry_id).await?;
                    EntryAcknowledged { stream, entry_id }.log();
                }
                Some(Err(e)) => HandlerFailed {
                    stream,
                    entry_id,
                    error: &e,
                }
                .log(),
            }
        }

        Ok(Poll::Busy)
    }

    /// New entries first; only when there are none, idle ones from any owner.
    ///
    /// Reclaim walks the pending list from `claim_start` and stores where the
    /// next walk resumes, so entries that keep failing at the head of the list
    /// cannot hide later stalled ones.
    async fn fetch(
        &self,
        stream: &str,
        group: &str,
        consumer: &str,
        claim_start: &mut String,
    ) -> Result<Vec<StreamEntry>, QueueError> {
        let fresh = self
            .backend
            .read_group(stream, group, consumer, self.options.read_batch)
            .await?;
        if !fresh.is_empty() {
            return Ok(fresh);
        }

        let claimed = self
            .backend
            .auto_claim(
                stream,
                group,
                consumer,
                self.options.idle_threshold,
                claim_start,
                self.options.claim_batch,
            )
            .await?;
        *claim_start = claimed.next_start;
        if !claimed.entries.is_empty() {
            EntriesReclaimed {
                stream,
                consumer,
                count: claimed.entries.len(),
            }
            .log();
        }
        Ok(claimed.entries)
    }
}
