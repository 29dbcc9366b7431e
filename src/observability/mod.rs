// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability for the routing pipeline: subscriber setup and the
//! centralized message types every component logs through.
//!
//! Message types follow a struct-based pattern with a `Display`
//! implementation and a [`messages::StructuredLog`] implementation that picks
//! the level and attaches the message's fields to the event, so log lines
//! carry the same structured data whichever subscriber renders them.
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::queue` - consumer groups, the consume loop and reclaim
//! * `messages::rules` - rule-book loading and hot reload
//! * `messages::pipeline` - routing, department processing and forwarding
//!
//! # Usage
//!
//! ```rust
//! use parcel_router::observability::messages::StructuredLog;
//! use parcel_router::observability::messages::queue::GroupCreated;
//!
//! GroupCreated {
//!     stream: "parcel-stream",
//!     group: "rule-checker-group",
//! }
//! .log();
//! ```

use tracing_subscriber::EnvFilter;

pub mod messages;

/// Install the global `fmt` subscriber.
///
/// `RUST_LOG` wins over `default_filter` when set. Installing twice is a
/// no-op so tests and embedding binaries can call this freely.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new(crate::config::consts::DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
