// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Routing rules: the rule-book DSL, its evaluation against parcels, and the
//! hot-reloadable active rule set.
//!
//! A rule-book is a list of lines of the form `name:property operator value`:
//!
//! ```text
//! Insurance: Value>1000
//! Mail: Weight<0.5
//! Regular: Weight>=0.5
//! Regular: Weight<10
//! Heavy: Weight>=10
//! ```
//!
//! A department is selected for a parcel when every rule carrying its name
//! holds. Departments are independent of each other, so a parcel can land in
//! none, one or several of them.

mod parser;
mod rule;
mod rule_book;
mod rule_set;


pub use parser::parse_rules;
pub use rule::{Comparison, NumericProperty, Operator, Rule, TextProperty};
pub use rule_book::RuleBook;
pub use rule_set::{DepartmentSet, RuleSet};
