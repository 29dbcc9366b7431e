// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::QueueError;
use thiserror::Error;

/// Errors raised while handling a stream message in the router or a department.
///
/// Every variant leaves the message unacknowledged; it becomes eligible for
/// reclaim once the idle threshold has passed.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to deserialize package: {0}")]
    Deserialization(#[from] serde_json::Error),

    #[error("failed to read raw parcel record: {0}")]
    RawParcel(String),

    #[error("parcel for '{recipient}' matched no department")]
    Unroutable { recipient: String },

    #[error("a package needs at least one department")]
    EmptyRoute,

    #[error("department tags must not be blank")]
    BlankDepartment,

    #[error("no department registered for tag '{0}'")]
    UnknownDepartment(String),

    #[error(transparent)]
    Queue(#[from] QueueError),
}
