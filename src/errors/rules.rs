// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for rule-book parsing and reloading.
//!
//! Parsing never panics or throws: a failed parse is data describing which
//! line broke and why, so the reload path and the editor can branch on it.

use thiserror::Error;

/// What was wrong with a rule-book line.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuleParseErrorKind {
    /// The line does not match `name:property operator value`.
    #[error("invalid rule format, expected 'name:property operator value'")]
    Syntax,
    /// The property is not one of the supported parcel attributes.
    #[error("unknown property '{0}'")]
    UnknownProperty(String),
    /// The operator is not valid for the property's type.
    #[error("operator '{operator}' is not supported for property '{property}'")]
    UnsupportedOperator { operator: String, property: String },
    /// The value could not be read as a decimal literal.
    #[error("'{0}' is not a decimal number")]
    InvalidNumber(String),
}

/// A rule-book line that failed to parse. Line numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("rule-book line {line}: {kind} (in '{text}')")]
pub struct RuleParseError {
    pub line: usize,
    pub text: String,
    pub kind: RuleParseErrorKind,
}

/// Errors raised while loading, reloading or replacing the active rule-book.
#[derive(Debug, Error)]
pub enum RuleBookError {
    #[error("failed to access rule-book '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Parse(#[from] RuleParseError),
}
