// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for rule-book loading and hot reload.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// Rule-book parsed at startup.
///
/// # Log Level
/// `info!` - Important operational event
pub struct RulesLoaded<'a> {
    pub path: &'a str,
    pub rule_count: usize,
    pub department_count: usize,
}

impl Display for RulesLoaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Loaded rule-book '{}': {} rules across {} departments",
            self.path, self.rule_count, self.department_count
        )
    }
}

impl StructuredLog for RulesLoaded<'_> {
    fn log(&self) {
        tracing::info!(
            path = self.path,
            rule_count = self.rule_count,
            department_count = self.department_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("rules_loaded", span_name = name, path = self.path)
    }
}

/// A new rule set replaced the active one.
///
/// # Log Level
/// `info!` - Important operational event
pub struct RulesReloaded<'a> {
    pub path: &'a str,
    pub rule_count: usize,
    pub department_count: usize,
}

impl Display for RulesReloaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Activated rule-book '{}': {} rules across {} departments",
            self.path, self.rule_count, self.department_count
        )
    }
}

impl StructuredLog for RulesReloaded<'_> {
    fn log(&self) {
        tracing::info!(
            path = self.path,
            rule_count = self.rule_count,
            department_count = self.department_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("rules_reloaded", span_name = name, path = self.path)
    }
}

/// A reload failed; the previous rule set stays active.
///
/// # Log Level
/// `error!` - Configuration error requiring an operator
pub struct RulesReloadRejected<'a> {
    pub path: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for RulesReloadRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Rejected rule-book '{}', keeping previous rules: {}",
            self.path, self.error
        )
    }
}

impl StructuredLog for RulesReloadRejected<'_> {
    fn log(&self) {
        tracing::error!(
            path = self.path,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "rules_reload_rejected",
            span_name = name,
            path = self.path,
            error = %self.error,
        )
    }
}

/// # Log Level
/// `debug!` - Background task lifecycle
pub struct RuleBookWatchStarted<'a> {
    pub path: &'a str,
    pub interval: Duration,
}

impl Display for RuleBookWatchStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Watching rule-book '{}' every {:?}",
            self.path, self.interval
        )
    }
}

impl StructuredLog for RuleBookWatchStarted<'_> {
    fn log(&self) {
        tracing::debug!(
            path = self.path,
            interval_ms = self.interval.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("rule_book_watch", span_name = name, path = self.path)
    }
}
