// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for routing and department processing.
//!
//! This module contains message types for logging events related to:
//! * Routing decisions made by the router
//! * Packages moving through department processing
//! * Forwarding to the next department and route completion
//! * Audit-log write failures

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Parcel matched at least one department and was dispatched.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ParcelRouted<'a> {
    pub package_id: &'a str,
    pub departments: &'a str,
    pub stream: &'a str,
}

impl Display for ParcelRouted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Routed package {} through [{}], dispatched to '{}'",
            self.package_id, self.departments, self.stream
        )
    }
}

impl StructuredLog for ParcelRouted<'_> {
    fn log(&self) {
        tracing::info!(
            package_id = self.package_id,
            departments = self.departments,
            stream = self.stream,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "parcel_routed",
            span_name = name,
            package_id = self.package_id,
            departments = self.departments,
        )
    }
}

/// No department matched; the entry is left pending as a dead letter.
///
/// # Log Level
/// `warn!` - Requires operator intervention
pub struct ParcelUnroutable<'a> {
    pub recipient: &'a str,
    pub weight: f64,
    pub value: f64,
}

impl Display for ParcelUnroutable<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Parcel for '{}' (weight={}, value={}) matched no department, leaving it pending",
            self.recipient, self.weight, self.value
        )
    }
}

impl StructuredLog for ParcelUnroutable<'_> {
    fn log(&self) {
        tracing::warn!(
            recipient = self.recipient,
            weight = self.weight,
            value = self.value,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("parcel_unroutable", span_name = name, recipient = self.recipient)
    }
}

/// A department took a package off its stream.
///
/// # Log Level
/// `info!` - Important operational event
pub struct PackageReceived<'a> {
    pub department: &'a str,
    pub package_id: &'a str,
    pub remaining: usize,
}

impl Display for PackageReceived<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Department '{}' received package {} ({} departments remaining in route)",
            self.department, self.package_id, self.remaining
        )
    }
}

impl StructuredLog for PackageReceived<'_> {
    fn log(&self) {
        tracing::info!(
            department = self.department,
            package_id = self.package_id,
            remaining = self.remaining,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "package",
            span_name = name,
            department = self.department,
            package_id = self.package_id,
        )
    }
}

/// Package handed on to the next department.
///
/// # Log Level
/// `info!` - Important operational event
pub struct PackageForwarded<'a> {
    pub package_id: &'a str,
    pub stream: &'a str,
    pub entry_id: &'a str,
}

impl Display for PackageForwarded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Forwarded package {} to '{}' as entry {}",
            self.package_id, self.stream, self.entry_id
        )
    }
}

impl StructuredLog for PackageForwarded<'_> {
    fn log(&self) {
        tracing::info!(
            package_id = self.package_id,
            stream = self.stream,
            entry_id = self.entry_id,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("package_forwarded", span_name = name, package_id = self.package_id, stream = self.stream)
    }
}

/// Route exhausted; nothing further is produced.
///
/// # Log Level
/// `info!` - Important operational event
pub struct PackageCompleted<'a> {
    pub package_id: &'a str,
    pub department: &'a str,
    pub metadata_entries: usize,
}

impl Display for PackageCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Package {} completed its route at '{}' with {} metadata entries",
            self.package_id, self.department, self.metadata_entries
        )
    }
}

impl StructuredLog for PackageCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            package_id = self.package_id,
            department = self.department,
            metadata_entries = self.metadata_entries,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("package_completed", span_name = name, package_id = self.package_id)
    }
}

/// Audit entry could not be written. Processing continues.
///
/// # Log Level
/// `warn!` - Degraded, not fatal
pub struct AuditWriteFailed<'a> {
    pub source: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for AuditWriteFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Failed to write audit entry for '{}': {}", self.source, self.error)
    }
}

impl StructuredLog for AuditWriteFailed<'_> {
    fn log(&self) {
        tracing::warn!(source = self.source, error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("audit_write_failed", span_name = name, source = self.source)
    }
}
