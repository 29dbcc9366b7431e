// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Rule-book parser.
//!
//! Each non-blank line must read `name:property operator value`:
//!
//! * `name` - one or more word characters, the department tag
//! * `property` - `value`, `weight`, `recipient.name` or `recipient.address.city`
//!   (case-insensitive; the `receipient.` spelling is accepted too)
//! * `operator` - `>`, `>=`, `<`, `<=` or `=` for numbers, `=` for text
//! * `value` - a decimal literal with optional leading `-`, or a double-quoted
//!   literal without escape sequences
//!
//! Parsing is all-or-nothing: the first bad line fails the whole text.

use std::sync::LazyLock;

use regex::Regex;

use crate::errors::{RuleParseError, RuleParseErrorKind};
use crate::rules::rule::{Comparison, NumericProperty, Operator, Rule, TextProperty};
use crate::rules::RuleSet;

static LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^(?P<name>\w+):\s*(?P<property>[\w.]+)\s*(?P<op>[^\d\s"\-.]+)\s*(?P<value>-?[0-9.]+|"[^"]*")$"#,
    )
    .expect("rule line pattern is valid")
});

static DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?[0-9.]+$").expect("decimal pattern is valid"));

enum Property {
    Numeric(NumericProperty),
    Text(TextProperty),
}

fn property_from(token: &str) -> Option<Property> {
    match token.to_lowercase().as_str() {
        "value" => Some(Property::Numeric(NumericProperty::Value)),
        "weight" => Some(Property::Numeric(NumericProperty::Weight)),
        "recipient.name" | "receipient.name" => Some(Property::Text(TextProperty::RecipientName)),
        "recipient.address.city" | "receipient.address.city" => {
            Some(Property::Text(TextProperty::RecipientCity))
        }
        _ => None,
    }
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// Parse one trimmed, non-blank line.
fn parse_line(line: &str) -> Result<Rule, RuleParseErrorKind> {
    let captures = LINE.captures(line).ok_or(RuleParseErrorKind::Syntax)?;

    let name = &captures["name"];
    let property_token = &captures["property"];
    let op_token = &captures["op"];
    let value = unquote(&captures["value"]);

    let property = property_from(property_token)
        .ok_or_else(|| RuleParseErrorKind::UnknownProperty(property_token.to_string()))?;

    let unsupported = || RuleParseErrorKind::UnsupportedOperator {
        operator: op_token.to_string(),
        property: property_token.to_string(),
    };

    let comparison = match property {
        Property::Numeric(property) => {
            let operator = Operator::parse(op_token).ok_or_else(unsupported)?;
            if !DECIMAL.is_match(value) {
                return Err(RuleParseErrorKind::InvalidNumber(value.to_string()));
            }
            let threshold = value
                .parse::<f64>()
                .map_err(|_| RuleParseErrorKind::InvalidNumber(value.to_string()))?;
            Comparison::Numeric {
                property,
                operator,
                threshold,
            }
        }
        Property::Text(property) => match Operator::parse(op_token) {
            Some(Operator::Eq) => Comparison::TextEquals {
                property,
                expected: value.to_string(),
            },
            _ => return Err(unsupported()),
        },
    };

    Ok(Rule::new(name, comparison))
}

/// Parse a whole rule-book into a [`RuleSet`], preserving file order.
pub fn parse_rules(text: &str) -> Result<RuleSet, RuleParseError> {
    let mut rules = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        let rule = parse_line(line).map_err(|kind| RuleParseError {
            line: index + 1,
            text: line.to_string(),
            kind,
        })?;
        rules.push(rule);
    }

    Ok(RuleSet::new(rules))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind_of(text: &str) -> RuleParseErrorKind {
        parse_rules(text).unwrap_err().kind
    }

    #[test]
    fn test_parse_single_rule() {
        let rules = parse_rules("Dept1:value > 1000").unwrap();

        assert_eq!(rules.len(), 1);
        let rule = &rules.rules()[0];
        assert_eq!(rule.department, "Dept1");
        assert_eq!(
            rule.comparison,
            Comparison::Numeric {
                property: NumericProperty::Value,
                operator: Operator::Gt,
                threshold: 1000.0,
            }
        );
    }

    #[test]
    fn test_parse_empty_and_blank_input() {
        assert!(parse_rules("").unwrap().is_empty());
        assert!(parse_rules("\n   \n\t\n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_duplicate_rules_are_kept() {
        let rules = parse_rules("Dept1:value = 100\nDept1:value = 100").unwrap();
        assert_eq!(rules.len(), 2);
    }

    #[test]
    fn test_parse_whitespace_around_tokens() {
        for text in ["Dept1:  value   >   1000", "Dept1: \t value \t  > \t  1000", "  Dept1:value>1000  "] {
            let rules = parse_rules(text).unwrap();
            assert_eq!(rules.len(), 1, "failed for {:?}", text);
            assert_eq!(rules.rules()[0].to_string(), "Dept1:value > 1000");
        }
    }

    #[test]
    fn test_parse_mixed_line_endings() {
        let rules = parse_rules("Dept1:value = 1\r\nDept2:weight = 2\nDept3:value = 3").unwrap();
        let names: Vec<_> = rules.rules().iter().map(|r| r.department.as_str()).collect();
        assert_eq!(names, vec!["Dept1", "Dept2", "Dept3"]);
    }

    #[test]
    fn test_parse_property_is_case_insensitive() {
        let rules = parse_rules("A:Value > 1\nB:VALUE < 50\nC:weIGHt = 7.5\nD:Recipient.Address.CITY = \"Delft\"").unwrap();
        assert_eq!(rules.len(), 4);
        assert_eq!(rules.rules()[2].to_string(), "C:weight = 7.5");
        assert_eq!(rules.rules()[3].to_string(), "D:recipient.address.city = \"Delft\"");
    }

    #[test]
    fn test_parse_negative_and_extreme_numbers() {
        let rules = parse_rules("Dept1:value > 999999.999999\nDept2:weight < -999999.999999\nDept3:weight>-5").unwrap();
        let thresholds: Vec<f64> = rules
            .rules()
            .iter()
            .map(|r| match r.comparison {
                Comparison::Numeric { threshold, .. } => threshold,
                _ => panic!("expected numeric rule"),
            })
            .collect();
        assert_eq!(thresholds, vec![999999.999999, -999999.999999, -5.0]);
    }

    #[test]
    fn test_parse_string_properties() {
        let rules = parse_rules(
            "Dept1:recipient.name = \"Ford Prefect\"\nDept2:receipient.address.city = \"New York\"\nMail: Weight<0.5",
        )
        .unwrap();

        assert_eq!(
            rules.rules()[0].comparison,
            Comparison::TextEquals {
                property: TextProperty::RecipientName,
                expected: "Ford Prefect".to_string(),
            }
        );
        assert_eq!(
            rules.rules()[1].comparison,
            Comparison::TextEquals {
                property: TextProperty::RecipientCity,
                expected: "New York".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_quoted_number_on_numeric_property() {
        let rules = parse_rules("Dept1:value = \"1000\"").unwrap();
        assert_eq!(rules.rules()[0].to_string(), "Dept1:value = 1000");

        assert_eq!(
            kind_of("Dept1:value = \"lots\""),
            RuleParseErrorKind::InvalidNumber("lots".to_string())
        );
    }

    #[test]
    fn test_parse_malformed_lines_fail() {
        for text in [
            "Hello",
            "Dept1:value",
            "Dept1:value>",
            "Dept1:value>ten",
            "Dept1:value>abc",
            "Dept1:value>1e10",
            "Dept$:value = 100",
            "Dept1 :value = 100",
            "Dept1:recipient.name = \"Ford \\\"Prefect\\\"\"",
        ] {
            assert_eq!(kind_of(text), RuleParseErrorKind::Syntax, "expected syntax error for {:?}", text);
        }
    }

    #[test]
    fn test_parse_leading_dot_decimal_without_spaces() {
        let rules = parse_rules("Mail: Weight<.5\nLight: weight <= .25").unwrap();

        assert_eq!(rules.rules()[0].to_string(), "Mail:weight < 0.5");
        assert_eq!(rules.rules()[1].to_string(), "Light:weight <= 0.25");
    }

    #[test]
    fn test_parse_invalid_number_shape() {
        assert_eq!(
            kind_of("Dept1:value > 1.2.3"),
            RuleParseErrorKind::InvalidNumber("1.2.3".to_string())
        );
    }

    #[test]
    fn test_parse_unknown_property() {
        for text in [
            "Invalid:theAnswer = 42",
            "Invalid:theAnswer = 42\nValid:value = 123.45",
            "Valid:value = 123.45\nInvalid:theAnswer = 42",
        ] {
            assert_eq!(kind_of(text), RuleParseErrorKind::UnknownProperty("theAnswer".to_string()));
        }
    }

    #[test]
    fn test_parse_unsupported_operator() {
        assert_eq!(
            kind_of("Valid:value = 123.45\nInvalid:value != 42"),
            RuleParseErrorKind::UnsupportedOperator {
                operator: "!=".to_string(),
                property: "value".to_string(),
            }
        );
        assert_eq!(
            kind_of("Dept:recipient.name > \"A\""),
            RuleParseErrorKind::UnsupportedOperator {
                operator: ">".to_string(),
                property: "recipient.name".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_error_reports_line_number() {
        let err = parse_rules("A:value > 1\n\nB:value ?? 2\nC:weight < 3").unwrap_err();
        assert_eq!(err.line, 3);
        assert_eq!(err.text, "B:value ?? 2");
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn test_parse_is_deterministic() {
        let text = "Insurance: Value>1000\nMail: Weight<0.5\nRegular: Weight>=0.5";
        assert_eq!(parse_rules(text).unwrap(), parse_rules(text).unwrap());
    }
}
