// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Durable stream transport with consumer groups and stalled-entry recovery.
//!
//! [`StreamQueue`] owns the delivery protocol (read, reclaim, ack only on
//! success); a [`StreamBackend`] supplies the broker primitives. Two
//! backends exist: [`RedisStreamBackend`] for deployments and
//! [`MemoryStreamBackend`] for tests and local runs.

mod backend;
#[cfg(test)]
pub(crate) mod faulty;
mod memory;
mod options;
mod redis;
mod stream_queue;

pub use backend::{ClaimedBatch, GroupCreation, GroupStatus, StreamBackend, StreamEntry, CLAIM_START};
pub use memory::MemoryStreamBackend;
pub use options::QueueOptions;
pub use self::redis::{connect, RedisStreamBackend};
pub use stream_queue::{MessageHandler, StreamQueue};
