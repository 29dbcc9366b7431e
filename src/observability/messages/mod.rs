// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! * `queue` - consumer group lifecycle, consume loop and reclaim events
//! * `rules` - rule-book load, reload and watch events
//! * `pipeline` - routing decisions, department processing and forwarding

use std::fmt::Display;
use tracing::Span;

pub mod pipeline;
pub mod queue;
pub mod rules;

/// A message that knows its own log level and structured fields.
pub trait StructuredLog: Display {
    /// Emit the message as a tracing event.
    fn log(&self);

    /// A span carrying the message's fields, for work done on its behalf.
    fn span(&self, name: &str) -> Span;
}
