//! Predicate evaluation against property sources

use std::collections::HashMap as StdHashMap;
use std::hash::BuildHasher;

use super::ast::{LogicalOp, Predicate};
use super::comparisons::ValueComparator;
use crate::error::ResqResult;
use crate::property::PropertyId;

/// Anything a predicate can look property values up in
pub trait PropertySource {
    fn property(&self, id: &PropertyId) -> Option<&str>;
}

impl<S: BuildHasher> PropertySource for hashbrown::HashMap<PropertyId, String, S> {
    fn property(&self, id: &PropertyId) -> Option<&str> {
        self.get(id).map(String::as_str)
    }
}

impl<S: BuildHasher> PropertySource for StdHashMap<PropertyId, String, S> {
    fn property(&self, id: &PropertyId) -> Option<&str> {
        self.get(id).map(String::as_str)
    }
}

/// Stateless predicate evaluator
pub struct PredicateEvaluator;

impl PredicateEvaluator {
    /// Evaluate `predicate` against `source`.
    ///
    /// A comparison on a property the source does not have is `false`.
    /// AND and OR evaluate children left to right and stop at the first
    /// deciding child, so a type error in a later child is not raised once
    /// the result is known.
    ///
    /// # Errors
    ///
    /// Returns an evaluation type error for ordering comparisons between
    /// operands that are neither both numeric nor both timestamps.
    pub fn evaluate<S>(predicate: &Predicate, source: &S) -> ResqResult<bool>
    where
        S: PropertySource + ?Sized,
    {
        match predicate {
            Predicate::Comparison(leaf) => match source.property(&leaf.property_id) {
                Some(value) => ValueComparator::compare(leaf.operator, value, &leaf.operand),
                None => Ok(false),
            },
            Predicate::Composite(composite) => match composite.operator() {
                LogicalOp::And => {
                    for child in composite.children() {
                        if !Self::evaluate(child, source)? {
                            return Ok(false);
                        }
                    }
                    Ok(true)
                }
                LogicalOp::Or => {
                    for child in composite.children() {
                        if Self::evaluate(child, source)? {
                            return Ok(true);
                        }
                    }
                    Ok(false)
                }
            },
            Predicate::Not(child) => Ok(!Self::evaluate(child, source)?),
        }
    }
}

impl Predicate {
    /// See [`PredicateEvaluator::evaluate`].
    ///
    /// # Errors
    ///
    /// Returns an evaluation type error for unorderable operands.
    pub fn evaluate<S>(&self, source: &S) -> ResqResult<bool>
    where
        S: PropertySource + ?Sized,
    {
        PredicateEvaluator::evaluate(self, source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::predicate::ComparisonOp;
    use crate::property::PropertyMap;

    fn id(name: &str) -> PropertyId {
        PropertyId::new(name, None)
    }

    fn record(pairs: &[(&str, &str)]) -> PropertyMap {
        pairs
            .iter()
            .map(|(k, v)| (id(k), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_absent_property_is_false() {
        let properties = record(&[("state", "STARTED")]);
        assert!(!Predicate::equals(id("version"), "2.1").evaluate(&properties).unwrap());
        assert!(
            !Predicate::comparison(id("version"), ComparisonOp::NotEqual, "2.1")
                .evaluate(&properties)
                .unwrap()
        );
        assert!(Predicate::not(Predicate::equals(id("version"), "2.1")).evaluate(&properties).unwrap());
    }

    #[test]
    fn test_and_short_circuits_before_type_error() {
        let properties = record(&[("state", "INSTALLED"), ("name", "abc")]);
        let predicate = Predicate::and(vec![
            Predicate::equals(id("state"), "STARTED"),
            Predicate::comparison(id("name"), ComparisonOp::Less, "5"),
        ]);
        assert!(!predicate.evaluate(&properties).unwrap());

        let predicate = Predicate::or(vec![
            Predicate::equals(id("state"), "INSTALLED"),
            Predicate::comparison(id("name"), ComparisonOp::Less, "5"),
        ]);
        assert!(predicate.evaluate(&properties).unwrap());
    }

    #[test]
    fn test_type_error_propagates() {
        let properties = record(&[("name", "abc")]);
        let err = Predicate::comparison(id("name"), ComparisonOp::Less, "5")
            .evaluate(&properties)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::EvaluationType);
    }

    #[test]
    fn test_std_hashmap_source() {
        let mut properties = StdHashMap::new();
        properties.insert(id("count"), "12".to_string());
        assert!(
            Predicate::comparison(id("count"), ComparisonOp::Greater, "9")
                .evaluate(&properties)
                .unwrap()
        );
    }
}
