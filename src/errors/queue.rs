// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Errors from the stream transport.
#[derive(Debug, Error)]
pub enum QueueError {
    /// The broker could not be reached or rejected a command.
    #[error("stream transport error: {0}")]
    Transport(String),

    /// The consumer group vanished, usually because the stream was deleted.
    #[error("consumer group '{group}' does not exist on stream '{stream}'")]
    GroupMissing { stream: String, group: String },
}

impl From<redis::RedisError> for QueueError {
    fn from(err: redis::RedisError) -> Self {
        QueueError::Transport(err.to_string())
    }
}
