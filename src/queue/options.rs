// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::time::Duration;

use crate::config::consts::{
    DEFAULT_CLAIM_BATCH, DEFAULT_IDLE_THRESHOLD, DEFAULT_POLL_INTERVAL, DEFAULT_READ_BATCH,
};

/// Tuning for the consume loop.
#[derive(Debug, Clone, PartialEq)]
pub struct QueueOptions {
    /// Sleep between iterations that found nothing to do.
    pub poll_interval: Duration,
    /// How long an entry must sit unacknowledged before another consumer may claim it.
    pub idle_threshold: Duration,
    pub read_batch: usize,
    pub claim_batch: usize,
}

impl Default for QueueOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            idle_threshold: DEFAULT_IDLE_THRESHOLD,
            read_batch: DEFAULT_READ_BATCH,
            claim_batch: DEFAULT_CLAIM_BATCH,
        }
    }
}
