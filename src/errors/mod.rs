// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod audit;
mod config;
mod pipeline;
mod queue;
mod rules;

pub use audit::AuditError;
pub use config::ConfigError;
pub use pipeline::PipelineError;
pub use queue::QueueError;
pub use rules::{RuleBookError, RuleParseError, RuleParseErrorKind};
