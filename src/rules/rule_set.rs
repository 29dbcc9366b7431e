// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::RuleParseError;
use crate::model::Parcel;
use crate::rules::Rule;

/// Departments selected for a parcel, in rule-book order of first appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepartmentSet(Vec<String>);

impl DepartmentSet {
    pub fn contains(&self, department: &str) -> bool {
        self.0.iter().any(|d| d == department)
    }

    pub fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl IntoIterator for DepartmentSet {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// An immutable, ordered list of rules.
///
/// Rule sets are never edited in place; a reload builds a new one and swaps
/// it in whole (see [`crate::rules::RuleBook`]).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Parse rule-book text. See [`crate::rules::parse_rules`].
    pub fn parse(text: &str) -> Result<Self, RuleParseError> {
        crate::rules::parse_rules(text)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules grouped by department, groups ordered by first appearance.
    pub fn groups(&self) -> Vec<(&str, Vec<&Rule>)> {
        let mut groups: Vec<(&str, Vec<&Rule>)> = Vec::new();

        for rule in &self.rules {
            match groups.iter_mut().find(|(tag, _)| *tag == rule.department) {
                Some((_, members)) => members.push(rule),
                None => groups.push((rule.department.as_str(), vec![rule])),
            }
        }

        groups
    }

    /// Every department whose whole rule group holds for `parcel`.
    ///
    /// An empty result is a valid outcome: the parcel is unroutable.
    pub fn departments(&self, parcel: &Parcel) -> DepartmentSet {
        DepartmentSet(
            self.groups()
                .into_iter()
                .filter(|(_, rules)| rules.iter().all(|rule| rule.evaluate(parcel)))
                .map(|(tag, _)| tag.to_string())
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parcel(weight: f64, value: f64) -> Parcel {
        Parcel {
            weight,
            value,
            ..Default::default()
        }
    }

    #[test]
    fn test_groups_keep_first_appearance_order() {
        let set = RuleSet::parse("B:value > 1\nA:weight < 2\nB:weight > 0").unwrap();
        let groups = set.groups();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "B");
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[1].0, "A");
    }

    #[test]
    fn test_department_requires_every_rule_in_group() {
        let set = RuleSet::parse("Regular: Weight>=0.5\nRegular: Weight<10").unwrap();

        assert!(set.departments(&parcel(5.0, 0.0)).contains("Regular"));
        assert!(set.departments(&parcel(10.0, 0.0)).is_empty());
        assert!(set.departments(&parcel(0.4, 0.0)).is_empty());
    }

    #[test]
    fn test_departments_are_independent() {
        let set = RuleSet::parse("A:value > 10\nB:value > 20\nC:value > 30").unwrap();
        let departments = set.departments(&parcel(1.0, 25.0));

        assert_eq!(departments.into_vec(), vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn test_empty_rule_set_routes_nothing() {
        assert!(RuleSet::default().departments(&parcel(1.0, 1.0)).is_empty());
    }
}
