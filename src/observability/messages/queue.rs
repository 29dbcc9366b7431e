// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for stream queue events.
//!
//! This module contains message types for logging events related to:
//! * Consumer group creation and recovery
//! * The consume loop lifecycle
//! * Delivery outcomes (ack, handler failure, reclaim)

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Consumer group created (stream created with it if needed).
///
/// # Log Level
/// `info!` - Important operational event
pub struct GroupCreated<'a> {
    pub stream: &'a str,
    pub group: &'a str,
}

impl Display for GroupCreated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Created consumer group '{}' on stream '{}'", self.group, self.stream)
    }
}

impl StructuredLog for GroupCreated<'_> {
    fn log(&self) {
        tracing::info!(stream = self.stream, group = self.group, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("group_created", span_name = name, stream = self.stream, group = self.group)
    }
}

/// Consumer group was already present. Expected on every restart.
///
/// # Log Level
/// `debug!` - Expected condition
pub struct GroupAlreadyExists<'a> {
    pub stream: &'a str,
    pub group: &'a str,
}

impl Display for GroupAlreadyExists<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Consumer group '{}' already exists on stream '{}'",
            self.group, self.stream
        )
    }
}

impl StructuredLog for GroupAlreadyExists<'_> {
    fn log(&self) {
        tracing::debug!(stream = self.stream, group = self.group, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("group_exists", span_name = name, stream = self.stream, group = self.group)
    }
}

/// The consumer group vanished under a running consumer (stream deleted or
/// flushed); it is recreated before the next read.
///
/// # Log Level
/// `warn!` - Recoverable broker condition
pub struct GroupMissing<'a> {
    pub stream: &'a str,
    pub group: &'a str,
}

impl Display for GroupMissing<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Consumer group '{}' missing on stream '{}', recreating",
            self.group, self.stream
        )
    }
}

impl StructuredLog for GroupMissing<'_> {
    fn log(&self) {
        tracing::warn!(stream = self.stream, group = self.group, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("group_missing", span_name = name, stream = self.stream, group = self.group)
    }
}

/// Consume loop started.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ConsumerStarted<'a> {
    pub stream: &'a str,
    pub group: &'a str,
    pub consumer: &'a str,
}

impl Display for ConsumerStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Consumer '{}' listening on stream '{}' in group '{}'",
            self.consumer, self.stream, self.group
        )
    }
}

impl StructuredLog for ConsumerStarted<'_> {
    fn log(&self) {
        tracing::info!(
            stream = self.stream,
            group = self.group,
            consumer = self.consumer,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "consumer",
            span_name = name,
            stream = self.stream,
            group = self.group,
            consumer = self.consumer,
        )
    }
}

/// Consume loop exited after cancellation.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ConsumerStopped<'a> {
    pub stream: &'a str,
    pub consumer: &'a str,
}

impl Display for ConsumerStopped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Consumer '{}' on stream '{}' stopped", self.consumer, self.stream)
    }
}

impl StructuredLog for ConsumerStopped<'_> {
    fn log(&self) {
        tracing::info!(stream = self.stream, consumer = self.consumer, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("consumer_stopped", span_name = name, stream = self.stream, consumer = self.consumer)
    }
}

/// Idle entries taken over from another consumer.
///
/// # Log Level
/// `info!` - Redelivery is worth seeing in normal operation
pub struct EntriesReclaimed<'a> {
    pub stream: &'a str,
    pub consumer: &'a str,
    pub count: usize,
}

impl Display for EntriesReclaimed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Consumer '{}' reclaimed {} idle entries on stream '{}'",
            self.consumer, self.count, self.stream
        )
    }
}

impl StructuredLog for EntriesReclaimed<'_> {
    fn log(&self) {
        tracing::info!(
            stream = self.stream,
            consumer = self.consumer,
            count = self.count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("entries_reclaimed", span_name = name, stream = self.stream, count = self.count)
    }
}

/// Entry has no payload field; it is acknowledged and dropped.
///
/// # Log Level
/// `warn!` - Data error
pub struct EntryWithoutPayload<'a> {
    pub stream: &'a str,
    pub entry_id: &'a str,
}

impl Display for EntryWithoutPayload<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Entry {} on stream '{}' has no payload, dropping",
            self.entry_id, self.stream
        )
    }
}

impl StructuredLog for EntryWithoutPayload<'_> {
    fn log(&self) {
        tracing::warn!(stream = self.stream, entry_id = self.entry_id, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("entry_without_payload", span_name = name, stream = self.stream, entry_id = self.entry_id)
    }
}

/// The handler rejected an entry; it stays pending for reclaim.
///
/// # Log Level
/// `warn!` - Retried through reclaim
pub struct HandlerFailed<'a> {
    pub stream: &'a str,
    pub entry_id: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for HandlerFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Handling entry {} on stream '{}' failed, leaving it pending: {}",
            self.entry_id, self.stream, self.error
        )
    }
}

impl StructuredLog for HandlerFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            stream = self.stream,
            entry_id = self.entry_id,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "handler_failed",
            span_name = name,
            stream = self.stream,
            entry_id = self.entry_id,
            error = %self.error,
        )
    }
}

/// Cancellation arrived while a handler was running; the entry is left
/// pending.
///
/// # Log Level
/// `info!` - Shutdown event
pub struct HandlerInterrupted<'a> {
    pub stream: &'a str,
    pub entry_id: &'a str,
}

impl Display for HandlerInterrupted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Shutdown interrupted entry {} on stream '{}', leaving it pending",
            self.entry_id, self.stream
        )
    }
}

impl StructuredLog for HandlerInterrupted<'_> {
    fn log(&self) {
        tracing::info!(stream = self.stream, entry_id = self.entry_id, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("handler_interrupted", span_name = name, stream = self.stream, entry_id = self.entry_id)
    }
}

/// # Log Level
/// `debug!` - Per-entry detail
pub struct EntryAcknowledged<'a> {
    pub stream: &'a str,
    pub entry_id: &'a str,
}

impl Display for EntryAcknowledged<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Acknowledged entry {} on stream '{}'", self.entry_id, self.stream)
    }
}

impl StructuredLog for EntryAcknowledged<'_> {
    fn log(&self) {
        tracing::debug!(stream = self.stream, entry_id = self.entry_id, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("entry_acknowledged", span_name = name, stream = self.stream, entry_id = self.entry_id)
    }
}

/// Entry appended to a stream.
///
/// # Log Level
/// `debug!` - Per-entry detail
pub struct MessageProduced<'a> {
    pub stream: &'a str,
    pub entry_id: &'a str,
}

impl Display for MessageProduced<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Produced entry {} on stream '{}'", self.entry_id, self.stream)
    }
}

impl StructuredLog for MessageProduced<'_> {
    fn log(&self) {
        tracing::debug!(stream = self.stream, entry_id = self.entry_id, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("message_produced", span_name = name, stream = self.stream, entry_id = self.entry_id)
    }
}

/// A broker call inside the consume loop failed; the loop backs off and
/// retries.
///
/// # Log Level
/// `error!` - Transport error
pub struct QueueOperationFailed<'a> {
    pub stream: &'a str,
    pub operation: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for QueueOperationFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Queue operation '{}' on stream '{}' failed: {}",
            self.operation, self.stream, self.error
        )
    }
}

impl StructuredLog for QueueOperationFailed<'_> {
    fn log(&self) {
        tracing::error!(
            stream = self.stream,
            operation = self.operation,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "queue_operation_failed",
            span_name = name,
            stream = self.stream,
            operation = self.operation,
            error = %self.error,
        )
    }
}
