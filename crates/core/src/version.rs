// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dotted-integer version comparison for build-result conditions.

use crate::simple_display;
use std::cmp::Ordering;
use thiserror::Error;

/// Comparison operator for a version or package condition.
///
/// Bare equality (`=`) is deliberately not representable here: the watcher's
/// condition evaluator rejects it up front as ambiguous (is it an exact pin
/// or a prefix match?) rather than silently picking one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

simple_display! {
    Operator {
        NotEqual => "!=",
        Less => "<",
        LessEqual => "<=",
        Greater => ">",
        GreaterEqual => ">=",
    }
}

/// A bare `=` operator, or any other token that isn't a recognised
/// comparison, was used where a condition requires a real relational
/// operator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("ambiguous or unknown version operator: {0:?}")]
pub struct VersionExpressionError(pub String);

impl Operator {
    pub fn parse(s: &str) -> Result<Self, VersionExpressionError> {
        match s {
            "!=" => Ok(Operator::NotEqual),
            "<" => Ok(Operator::Less),
            "<=" => Ok(Operator::LessEqual),
            ">" => Ok(Operator::Greater),
            ">=" => Ok(Operator::GreaterEqual),
            other => Err(VersionExpressionError(other.to_string())),
        }
    }

    pub fn evaluate(self, ordering: Ordering) -> bool {
        match self {
            Operator::NotEqual => ordering != Ordering::Equal,
            Operator::Less => ordering == Ordering::Less,
            Operator::LessEqual => ordering != Ordering::Greater,
            Operator::Greater => ordering == Ordering::Greater,
            Operator::GreaterEqual => ordering != Ordering::Less,
        }
    }
}

/// Compare two dotted-integer version strings component by component.
/// Missing trailing components compare as zero, so `"1.2"` equals `"1.2.0"`.
/// A non-numeric component falls back to lexical comparison of that
/// component only.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let mut a_parts = a.split('.');
    let mut b_parts = b.split('.');
    loop {
        match (a_parts.next(), b_parts.next()) {
            (None, None) => return Ordering::Equal,
            (Some(x), None) => {
                if is_zero(x) {
                    continue;
                }
                return Ordering::Greater;
            }
            (None, Some(y)) => {
                if is_zero(y) {
                    continue;
                }
                return Ordering::Less;
            }
            (Some(x), Some(y)) => {
                let ord = match (x.parse::<u64>(), y.parse::<u64>()) {
                    (Ok(xi), Ok(yi)) => xi.cmp(&yi),
                    _ => x.cmp(y),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

fn is_zero(component: &str) -> bool {
    component.parse::<u64>() == Ok(0)
}

/// Evaluate an `{image: "1.42.1"}`-style condition: `operator` defaults to
/// `Equal`-as-exact-match when the stored expression carries no explicit
/// operator prefix, matching the watcher's plain-version-string shorthand.
/// Callers parsing a `package` condition's three-tuple form must call
/// [`Operator::parse`] themselves and should never pass a bare `=`.
pub fn version_matches(actual: &str, expected: &str) -> bool {
    actual != "unknown" && compare_versions(actual, expected) == Ordering::Equal
}

#[cfg(test)]
#[path = "version_tests.rs"]
mod tests;
