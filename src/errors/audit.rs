// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("audit log transport error: {0}")]
    Transport(String),
}

impl From<redis::RedisError> for AuditError {
    fn from(err: redis::RedisError) -> Self {
        AuditError::Transport(err.to_string())
    }
}
