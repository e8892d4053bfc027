//! Predicate model, evaluation and fluent construction
//!
//! Predicates are trees of comparison leaves joined by AND/OR composites and
//! NOT. They are immutable and `Send + Sync`, so one parsed predicate can be
//! evaluated against many resources from many threads.

mod ast;
pub mod builder;
mod comparisons;
mod evaluation;

pub use ast::{ComparisonOp, ComparisonPredicate, CompositePredicate, LogicalOp, Predicate};
pub use builder::{PredicateBuilder, PredicateBuilderWithPredicate, PredicateBuilderWithProperty};
pub use comparisons::ValueComparator;
pub use evaluation::{PredicateEvaluator, PropertySource};
