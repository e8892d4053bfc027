//! Fluent predicate construction
//!
//! The builder is a small state machine encoded in types: after a property
//! only a relational operator may follow, after a comparison only a logical
//! operator, `end()` or `to_predicate()`. It records the same token stream the
//! tokenizer would produce and hands it to the parser, so built predicates
//! have exactly the shape of parsed ones.
//!
//! ```
//! use resq_core::parser::parse;
//! use resq_core::predicate::PredicateBuilder;
//!
//! let built = PredicateBuilder::new()
//!     .property("state").equals("STARTED")
//!     .and()
//!     .begin()
//!         .property("version").equals("2.1")
//!         .or()
//!         .not().property("version").greater_than("3")
//!     .end()
//!     .to_predicate()
//!     .unwrap();
//!
//! assert_eq!(built, parse("state=STARTED AND (version=2.1 OR NOT version>3)").unwrap());
//! ```

use super::ast::Predicate;
use crate::config::EngineConfig;
use crate::error::{ResqError, ResqResult, invalid_query_error};
use crate::parser::PredicateParser;
use crate::property::{PropertyId, is_valid_property_path};
use crate::tokens::{PositionedToken, Token};

#[derive(Debug, Default)]
struct BuilderState {
    tokens: Vec<PositionedToken>,
    open_blocks: usize,
    error: Option<ResqError>,
}

impl BuilderState {
    fn push(&mut self, token: Token) {
        let position = self.tokens.len();
        self.tokens.push(PositionedToken::new(token, position));
    }

    fn rendered(&self) -> String {
        self.tokens
            .iter()
            .map(|positioned| positioned.token.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn fail(&mut self, reason: &str) {
        if self.error.is_none() {
            let position = self.tokens.len();
            self.error = Some(invalid_query_error(&self.rendered(), reason, Some(position)));
        }
    }
}

/// Builder expecting a property, `begin()` or `not()`
#[derive(Debug, Default)]
pub struct PredicateBuilder {
    state: BuilderState,
}

/// Builder holding a property, expecting a relational operator
#[derive(Debug)]
pub struct PredicateBuilderWithProperty {
    state: BuilderState,
}

/// Builder holding a complete comparison or block
#[derive(Debug)]
pub struct PredicateBuilderWithPredicate {
    state: BuilderState,
}

impl PredicateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare the property at slash path `path`.
    #[must_use]
    pub fn property(mut self, path: &str) -> PredicateBuilderWithProperty {
        if !is_valid_property_path(path) {
            self.state.fail(&format!("invalid property path '{path}'"));
        }
        self.property_id(PropertyId::from_path(path))
    }

    #[must_use]
    pub fn property_id(mut self, id: PropertyId) -> PredicateBuilderWithProperty {
        self.state.push(Token::Property(id));
        PredicateBuilderWithProperty { state: self.state }
    }

    /// Open a parenthesized block.
    #[must_use]
    pub fn begin(mut self) -> PredicateBuilder {
        self.state.open_blocks += 1;
        self.state.push(Token::LeftParen);
        self
    }

    /// Negate the following comparison or block.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn not(mut self) -> PredicateBuilder {
        self.state.push(Token::Not);
        self
    }
}

impl PredicateBuilderWithProperty {
    fn compare(mut self, token: Token, value: impl Into<String>) -> PredicateBuilderWithPredicate {
        self.state.push(token);
        self.state.push(Token::Literal(value.into()));
        PredicateBuilderWithPredicate { state: self.state }
    }

    #[must_use]
    pub fn equals(self, value: impl Into<String>) -> PredicateBuilderWithPredicate {
        self.compare(Token::Equal, value)
    }

    #[must_use]
    pub fn not_equals(self, value: impl Into<String>) -> PredicateBuilderWithPredicate {
        self.compare(Token::NotEqual, value)
    }

    #[must_use]
    pub fn less_than(self, value: impl Into<String>) -> PredicateBuilderWithPredicate {
        self.compare(Token::Less, value)
    }

    #[must_use]
    pub fn less_than_equal_to(self, value: impl Into<String>) -> PredicateBuilderWithPredicate {
        self.compare(Token::LessEq, value)
    }

    #[must_use]
    pub fn greater_than(self, value: impl Into<String>) -> PredicateBuilderWithPredicate {
        self.compare(Token::Greater, value)
    }

    #[must_use]
    pub fn greater_than_equal_to(self, value: impl Into<String>) -> PredicateBuilderWithPredicate {
        self.compare(Token::GreaterEq, value)
    }

    /// Membership test; desugars like `IN (...)` in a filter.
    #[must_use]
    pub fn in_list<I, S>(mut self, values: I) -> PredicateBuilderWithPredicate
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state.push(Token::In);
        self.state
            .push(Token::LiteralList(values.into_iter().map(Into::into).collect()));
        PredicateBuilderWithPredicate { state: self.state }
    }
}

impl PredicateBuilderWithPredicate {
    #[must_use]
    pub fn and(mut self) -> PredicateBuilder {
        self.state.push(Token::And);
        PredicateBuilder { state: self.state }
    }

    #[must_use]
    pub fn or(mut self) -> PredicateBuilder {
        self.state.push(Token::Or);
        PredicateBuilder { state: self.state }
    }

    /// Close the innermost open block.
    #[must_use]
    pub fn end(mut self) -> PredicateBuilderWithPredicate {
        if self.state.open_blocks == 0 {
            self.state.fail("end() without a matching begin()");
        } else {
            self.state.open_blocks -= 1;
            self.state.push(Token::RightParen);
        }
        self
    }

    /// Build with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an invalid-query error for unbalanced blocks, invalid property
    /// paths or an empty `in_list`.
    #[allow(clippy::wrong_self_convention)]
    pub fn to_predicate(self) -> ResqResult<Predicate> {
        self.to_predicate_with(&EngineConfig::default())
    }

    /// Build, applying the nesting limit of `config`.
    ///
    /// # Errors
    ///
    /// See [`Self::to_predicate`]; also a depth error for nesting beyond
    /// the configured bound.
    #[allow(clippy::wrong_self_convention)]
    pub fn to_predicate_with(mut self, config: &EngineConfig) -> ResqResult<Predicate> {
        if self.state.open_blocks > 0 {
            let reason = format!("{} block(s) opened with begin() were never closed", self.state.open_blocks);
            self.state.fail(&reason);
        }
        if let Some(error) = self.state.error.take() {
            return Err(error);
        }

        let rendered = self.state.rendered();
        self.state.push(Token::EOF);
        PredicateParser::new(config).parse_tokens(&rendered, self.state.tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::parser::parse;

    #[test]
    fn test_chain_matches_parser_precedence() {
        let built = PredicateBuilder::new()
            .property("a").equals("1")
            .or()
            .property("b").equals("2")
            .and()
            .property("c").equals("3")
            .to_predicate()
            .unwrap();
        assert_eq!(built, parse("a=1 OR b=2 AND c=3").unwrap());
    }

    #[test]
    fn test_blocks_and_not() {
        let built = PredicateBuilder::new()
            .not()
            .begin()
            .property("a").less_than("5")
            .or()
            .property("Hosts/host_name").in_list(["h1", "h2"])
            .end()
            .to_predicate()
            .unwrap();
        assert_eq!(built, parse("NOT (a<5 OR Hosts/host_name IN (h1,h2))").unwrap());
    }

    #[test]
    fn test_operand_with_spaces_needs_no_quoting() {
        let built = PredicateBuilder::new()
            .property("desc")
            .equals("two words")
            .to_predicate()
            .unwrap();
        assert_eq!(built, parse("desc='two words'").unwrap());
    }

    #[test]
    fn test_unbalanced_blocks() {
        let err = PredicateBuilder::new()
            .begin()
            .property("a").equals("1")
            .to_predicate()
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidQuery);
        assert!(err.message.contains("never closed"));

        let err = PredicateBuilder::new()
            .property("a").equals("1")
            .end()
            .to_predicate()
            .unwrap_err();
        assert!(err.message.contains("end() without a matching begin()"));
    }

    #[test]
    fn test_invalid_path_and_empty_list() {
        let err = PredicateBuilder::new()
            .property("a b")
            .equals("1")
            .to_predicate()
            .unwrap_err();
        assert!(err.message.contains("invalid property path 'a b'"));

        let err = PredicateBuilder::new()
            .property("a")
            .in_list(Vec::<String>::new())
            .to_predicate()
            .unwrap_err();
        assert!(err.message.contains("empty IN list"));
    }

    #[test]
    fn test_nesting_limit() {
        let config = EngineConfig::default().with_max_expression_depth(1);
        let err = PredicateBuilder::new()
            .begin()
            .begin()
            .property("a").equals("1")
            .end()
            .end()
            .to_predicate_with(&config)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::DepthExceeded);
    }
}
