// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;

use crate::config::consts::NUMERIC_EPSILON;
use crate::model::Parcel;

/// Numeric parcel attributes a rule can test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericProperty {
    Value,
    Weight,
}

impl NumericProperty {
    fn read(self, parcel: &Parcel) -> f64 {
        match self {
            NumericProperty::Value => parcel.value,
            NumericProperty::Weight => parcel.weight,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NumericProperty::Value => "value",
            NumericProperty::Weight => "weight",
        }
    }
}

/// Text parcel attributes a rule can test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextProperty {
    RecipientName,
    RecipientCity,
}

impl TextProperty {
    fn read(self, parcel: &Parcel) -> &str {
        match self {
            TextProperty::RecipientName => &parcel.recipient.name,
            TextProperty::RecipientCity => &parcel.recipient.address.city,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TextProperty::RecipientName => "recipient.name",
            TextProperty::RecipientCity => "recipient.address.city",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Gt,
    Ge,
    Lt,
    Le,
    Eq,
}

impl Operator {
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            ">" => Some(Operator::Gt),
            ">=" => Some(Operator::Ge),
            "<" => Some(Operator::Lt),
            "<=" => Some(Operator::Le),
            "=" => Some(Operator::Eq),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Eq => "=",
        }
    }

    fn compare(self, actual: f64, threshold: f64) -> bool {
        match self {
            Operator::Gt => actual > threshold,
            Operator::Ge => actual >= threshold,
            Operator::Lt => actual < threshold,
            Operator::Le => actual <= threshold,
            Operator::Eq => (actual - threshold).abs() < NUMERIC_EPSILON,
        }
    }
}

/// The typed test a rule performs.
///
/// Text properties only support case-insensitive equality, so the operator
/// is implied. Property/operator combinations the grammar rejects cannot be
/// represented, which keeps evaluation total.
#[derive(Debug, Clone, PartialEq)]
pub enum Comparison {
    Numeric {
        property: NumericProperty,
        operator: Operator,
        threshold: f64,
    },
    TextEquals {
        property: TextProperty,
        expected: String,
    },
}

/// One parsed rule-book line.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub department: String,
    pub comparison: Comparison,
}

impl Rule {
    pub fn new(department: impl Into<String>, comparison: Comparison) -> Self {
        Self {
            department: department.into(),
            comparison,
        }
    }

    pub fn evaluate(&self, parcel: &Parcel) -> bool {
        match &self.comparison {
            Comparison::Numeric {
                property,
                operator,
                threshold,
            } => operator.compare(property.read(parcel), *threshold),
            Comparison::TextEquals { property, expected } => {
                // Unicode-aware case folding
                property.read(parcel).to_lowercase() == expected.to_lowercase()
            }
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.comparison {
            Comparison::Numeric {
                property,
                operator,
                threshold,
            } => write!(
                f,
                "{}:{} {} {}",
                self.department,
                property.as_str(),
                operator.as_str(),
                threshold
            ),
            Comparison::TextEquals { property, expected } => write!(
                f,
                "{}:{} = \"{}\"",
                self.department,
                property.as_str(),
                expected
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Address, Recipient};

    fn parcel(weight: f64, value: f64) -> Parcel {
        Parcel::new(
            Recipient {
                name: "Ford Prefect".to_string(),
                address: Address {
                    city: "New York".to_string(),
                    ..Default::default()
                },
            },
            weight,
            value,
        )
    }

    fn numeric(property: NumericProperty, operator: Operator, threshold: f64) -> Rule {
        Rule::new(
            "Dept",
            Comparison::Numeric {
                property,
                operator,
                threshold,
            },
        )
    }

    #[test]
    fn test_numeric_operators() {
        let p = parcel(5.0, 100.0);

        assert!(numeric(NumericProperty::Weight, Operator::Gt, 4.0).evaluate(&p));
        assert!(!numeric(NumericProperty::Weight, Operator::Gt, 5.0).evaluate(&p));
        assert!(numeric(NumericProperty::Weight, Operator::Ge, 5.0).evaluate(&p));
        assert!(numeric(NumericProperty::Weight, Operator::Lt, 5.5).evaluate(&p));
        assert!(!numeric(NumericProperty::Weight, Operator::Lt, 5.0).evaluate(&p));
        assert!(numeric(NumericProperty::Weight, Operator::Le, 5.0).evaluate(&p));
        assert!(numeric(NumericProperty::Value, Operator::Eq, 100.0).evaluate(&p));
        assert!(!numeric(NumericProperty::Value, Operator::Eq, 101.0).evaluate(&p));
    }

    #[test]
    fn test_numeric_equality_uses_epsilon() {
        let rule = numeric(NumericProperty::Value, Operator::Eq, 100.0);

        assert!(rule.evaluate(&parcel(1.0, 100.0 + 1e-7)));
        assert!(rule.evaluate(&parcel(1.0, 100.0 - 1e-7)));
        assert!(!rule.evaluate(&parcel(1.0, 102.0)));
        assert!(!rule.evaluate(&parcel(1.0, 98.0)));
    }

    #[test]
    fn test_text_equality_ignores_case() {
        let rule = Rule::new(
            "Dept",
            Comparison::TextEquals {
                property: TextProperty::RecipientCity,
                expected: "new york".to_string(),
            },
        );
        assert!(rule.evaluate(&parcel(1.0, 1.0)));

        let rule = Rule::new(
            "Dept",
            Comparison::TextEquals {
                property: TextProperty::RecipientName,
                expected: "FORD PREFECT".to_string(),
            },
        );
        assert!(rule.evaluate(&parcel(1.0, 1.0)));

        let rule = Rule::new(
            "Dept",
            Comparison::TextEquals {
                property: TextProperty::RecipientName,
                expected: "Ford".to_string(),
            },
        );
        assert!(!rule.evaluate(&parcel(1.0, 1.0)));
    }

    #[test]
    fn test_display_round_trips_to_dsl() {
        let rule = numeric(NumericProperty::Weight, Operator::Ge, 0.5);
        assert_eq!(rule.to_string(), "Dept:weight >= 0.5");
    }
}
