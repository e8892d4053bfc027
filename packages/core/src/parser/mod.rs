//! Filter expression parsing
//!
//! Grammar:
//!
//! ```text
//! expr       := term (("AND" | "OR") term)*
//! term       := "NOT" term | "(" expr ")" | comparison
//! comparison := property ("=" | "!=" | "<" | "<=" | ">" | ">=") literal
//!             | property "IN" "(" literal ("," literal)* ")"
//! ```
//!
//! `NOT` binds tighter than `AND`, which binds tighter than `OR`.

mod core;
mod operators;

pub use core::PredicateParser;
pub use operators::{MAX_BASE_PRECEDENCE, Operator, OperatorKind};

use crate::config::EngineConfig;
use crate::error::ResqResult;
use crate::predicate::Predicate;
use crate::resource::ResourceSchema;

/// Parse `filter` with the default configuration.
///
/// ```
/// use resq_core::parser::parse;
/// use resq_core::predicate::Predicate;
/// use resq_core::property::PropertyId;
///
/// let predicate = parse("state=STARTED").unwrap();
/// assert_eq!(predicate, Predicate::equals(PropertyId::new("state", None), "STARTED"));
/// ```
///
/// # Errors
///
/// See [`PredicateParser::parse`].
pub fn parse(filter: &str) -> ResqResult<Predicate> {
    let config = EngineConfig::default();
    PredicateParser::new(&config).parse(filter)
}

/// Parse `filter`, rejecting properties `schema` does not define.
///
/// # Errors
///
/// See [`PredicateParser::parse`].
pub fn parse_with_schema(
    filter: &str,
    schema: &ResourceSchema,
    config: &EngineConfig,
) -> ResqResult<Predicate> {
    PredicateParser::new(config).with_schema(schema).parse(filter)
}
