//! Value comparison for relational operators
//!
//! Property values and operands are strings. Equality is verbatim; ordering
//! operators interpret both sides as numbers, falling back to timestamps.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use super::ast::ComparisonOp;
use crate::error::{ResqResult, evaluation_type_error};

/// Comparison of a property value against a filter operand
pub struct ValueComparator;

impl ValueComparator {
    /// Apply `operator` to `value` (from the resource) and `operand` (from the filter).
    ///
    /// # Errors
    ///
    /// Returns an evaluation type error when an ordering operator is applied
    /// to operands that are neither both numeric nor both timestamps.
    pub fn compare(operator: ComparisonOp, value: &str, operand: &str) -> ResqResult<bool> {
        match operator {
            ComparisonOp::Equal => Ok(value == operand),
            ComparisonOp::NotEqual => Ok(value != operand),
            ordering => {
                let Some(order) = Self::order(value, operand) else {
                    return Err(evaluation_type_error(ordering.symbol(), value, operand));
                };
                Ok(match ordering {
                    ComparisonOp::Less => order == Ordering::Less,
                    ComparisonOp::LessEq => order != Ordering::Greater,
                    ComparisonOp::Greater => order == Ordering::Greater,
                    _ => order != Ordering::Less,
                })
            }
        }
    }

    /// Order two values numerically if both are numbers, else temporally if
    /// both are timestamps.
    #[must_use]
    pub fn order(left: &str, right: &str) -> Option<Ordering> {
        if let (Some(a), Some(b)) = (parse_number(left), parse_number(right)) {
            return a.partial_cmp(&b);
        }
        if let (Some(a), Some(b)) = (parse_timestamp(left), parse_timestamp(right)) {
            return Some(a.cmp(&b));
        }
        None
    }
}

fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM:SS` and `YYYY-MM-DD`, normalized to UTC.
fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if let Ok(datetime) = DateTime::parse_from_rfc3339(text) {
        return Some(datetime.naive_utc());
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S") {
        return Some(datetime);
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_equality_is_verbatim() {
        assert!(ValueComparator::compare(ComparisonOp::Equal, "STARTED", "STARTED").unwrap());
        assert!(!ValueComparator::compare(ComparisonOp::Equal, "1.0", "1").unwrap());
        assert!(ValueComparator::compare(ComparisonOp::NotEqual, "started", "STARTED").unwrap());
    }

    #[test]
    fn test_numeric_ordering() {
        assert!(ValueComparator::compare(ComparisonOp::Less, "9", "10").unwrap());
        assert!(ValueComparator::compare(ComparisonOp::GreaterEq, "2.5", "2.50").unwrap());
        assert!(!ValueComparator::compare(ComparisonOp::Greater, "-1", "0").unwrap());
    }

    #[test]
    fn test_temporal_ordering() {
        assert!(ValueComparator::compare(ComparisonOp::Less, "2024-01-31", "2024-02-01").unwrap());
        assert!(
            ValueComparator::compare(
                ComparisonOp::Greater,
                "2024-02-01T10:00:00+02:00",
                "2024-02-01T07:59:59Z"
            )
            .unwrap()
        );
        assert!(
            ValueComparator::compare(ComparisonOp::LessEq, "2024-02-01", "2024-02-01T00:00:00").unwrap()
        );
    }

    #[test]
    fn test_mixed_operands_are_type_errors() {
        let err = ValueComparator::compare(ComparisonOp::Less, "abc", "10").unwrap_err();
        assert_eq!(err.kind, ErrorKind::EvaluationType);
        assert!(err.message.contains("'abc'"));
        assert!(err.message.contains("'10'"));

        assert!(ValueComparator::compare(ComparisonOp::Greater, "2024-01-01", "5").is_err());
        assert!(ValueComparator::compare(ComparisonOp::Greater, "NaN", "5").is_err());
    }
}
