//! Operator-precedence filter parser
//!
//! Tokens are scanned left to right against an operator stack and an operand
//! stack. Before a binary operator is pushed, every stacked operator whose
//! precedence is not lower is reduced, which makes AND/OR left associative.
//! `NOT` is a prefix operator and is pushed without reducing. Parentheses do
//! not appear on the stack: they raise the context precedence of the
//! operators between them instead.

use super::operators::{Operator, OperatorKind};
use crate::config::{EngineConfig, Validator};
use crate::error::{
    ErrorKind, ResqError, ResqResult, depth_exceeded_error, invalid_query_error,
    unknown_property_error,
};
use crate::predicate::Predicate;
use crate::property::PropertyId;
use crate::resource::ResourceSchema;
use crate::tokenizer::tokenize;
use crate::tokens::{PositionedToken, Token};

/// Value on the operand stack
#[derive(Debug)]
enum Operand {
    Property { id: PropertyId, position: usize },
    Literal { value: String, position: usize },
    List { items: Vec<String>, position: usize },
    Predicate(Predicate),
}

/// Filter expression parser bound to a configuration and optional schema
#[derive(Debug, Clone, Copy)]
pub struct PredicateParser<'a> {
    config: &'a EngineConfig,
    schema: Option<&'a ResourceSchema>,
}

impl<'a> PredicateParser<'a> {
    #[must_use]
    pub fn new(config: &'a EngineConfig) -> Self {
        Self {
            config,
            schema: None,
        }
    }

    /// Reject properties the schema does not define.
    #[must_use]
    pub fn with_schema(mut self, schema: &'a ResourceSchema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Parse a filter expression into a predicate.
    ///
    /// # Errors
    ///
    /// Returns an invalid-query error naming the offending token and its
    /// position, an unknown-property error when a schema is attached, a
    /// depth error for groups or `NOT` chains nested beyond the configured
    /// bound, and a configuration error when the configuration is invalid.
    pub fn parse(&self, filter: &str) -> ResqResult<Predicate> {
        self.config.validate()?;
        let length = filter.chars().count();
        if length > self.config.max_filter_length {
            return Err(ResqError::new(
                ErrorKind::InvalidQuery,
                format!(
                    "filter expression of {length} characters exceeds the maximum of {}",
                    self.config.max_filter_length
                ),
            ));
        }

        let tokens = tokenize(filter)?;
        let predicate = self.parse_tokens(filter, tokens)?;
        tracing::debug!(
            target: "resq::parser",
            filter,
            predicate = %predicate,
            "parsed filter expression"
        );
        Ok(predicate)
    }

    /// Parse an already tokenized expression. `expression` is only used to
    /// render error messages.
    ///
    /// # Errors
    ///
    /// Same as [`Self::parse`], minus tokenizer errors.
    pub fn parse_tokens(
        &self,
        expression: &str,
        tokens: Vec<PositionedToken>,
    ) -> ResqResult<Predicate> {
        self.config.validate()?;
        let mut state = ParseState::new(expression, self.config);

        for PositionedToken { token, position } in tokens {
            match token {
                Token::Property(id) => {
                    state.expect_operand_slot(|| format!("property '{id}'"), position)?;
                    if let Some(schema) = self.schema {
                        if !schema.contains(&id) {
                            return Err(unknown_property_error(&id, schema.resource_type()));
                        }
                    }
                    state.push_operand(Operand::Property { id, position });
                }
                Token::Literal(value) => {
                    state.expect_operand_slot(|| format!("literal '{value}'"), position)?;
                    state.push_operand(Operand::Literal { value, position });
                }
                Token::LiteralList(items) => {
                    state.expect_operand_slot(|| format!("list ({})", items.join(",")), position)?;
                    state.push_operand(Operand::List { items, position });
                }
                Token::LeftParen => state.open_group(position)?,
                Token::RightParen => state.close_group(position)?,
                Token::EOF => return state.finish(position),
                other => {
                    let Some(kind) = OperatorKind::from_token(&other) else {
                        return Err(invalid_query_error(
                            expression,
                            format!("unexpected token '{other}'"),
                            Some(position),
                        ));
                    };
                    state.push_operator(kind, position)?;
                }
            }
        }

        // Token streams without a trailing EOF are finished at the end of input.
        let end = expression.chars().count();
        state.finish(end)
    }
}

struct ParseState<'e> {
    expression: &'e str,
    config: &'e EngineConfig,
    operators: Vec<Operator>,
    operands: Vec<Operand>,
    /// Positions of currently open parentheses
    groups: Vec<usize>,
    context: u32,
    expect_operand: bool,
    just_opened: bool,
    seen_tokens: bool,
}

impl<'e> ParseState<'e> {
    fn new(expression: &'e str, config: &'e EngineConfig) -> Self {
        Self {
            expression,
            config,
            operators: Vec::new(),
            operands: Vec::new(),
            groups: Vec::new(),
            context: 0,
            expect_operand: true,
            just_opened: false,
            seen_tokens: false,
        }
    }

    fn error(&self, reason: impl Into<String>, position: usize) -> ResqError {
        invalid_query_error(self.expression, reason, Some(position))
    }

    fn expect_operand_slot(&self, describe: impl FnOnce() -> String, position: usize) -> ResqResult<()> {
        if !self.expect_operand {
            return Err(self.error(
                format!("unexpected {}, expected an operator", describe()),
                position,
            ));
        }
        Ok(())
    }

    fn push_operand(&mut self, operand: Operand) {
        self.operands.push(operand);
        self.expect_operand = false;
        self.just_opened = false;
        self.seen_tokens = true;
    }

    fn push_operator(&mut self, kind: OperatorKind, position: usize) -> ResqResult<()> {
        if kind.is_unary() {
            if !self.expect_operand {
                return Err(self.error(format!("unexpected '{kind}' after an operand"), position));
            }
        } else if self.expect_operand {
            return Err(self.error(format!("missing operand before '{kind}'"), position));
        }

        let operator = Operator::new(kind, self.context, position);
        if kind.is_unary() {
            self.check_nesting()?;
        } else {
            self.reduce_down_to(operator.precedence)?;
        }
        self.operators.push(operator);
        self.expect_operand = true;
        self.just_opened = false;
        self.seen_tokens = true;
        Ok(())
    }

    fn open_group(&mut self, position: usize) -> ResqResult<()> {
        if !self.expect_operand {
            return Err(self.error("unexpected '(' after an operand", position));
        }
        self.check_nesting()?;
        self.groups.push(position);
        self.context += self.config.context_precedence_step;
        self.just_opened = true;
        self.seen_tokens = true;
        Ok(())
    }

    /// Open groups plus unreduced `NOT`s each add one level to the
    /// predicate being built.
    fn check_nesting(&self) -> ResqResult<()> {
        let pending_nots = self
            .operators
            .iter()
            .filter(|operator| operator.kind.is_unary())
            .count();
        if self.groups.len() + pending_nots + 1 > self.config.max_expression_depth {
            return Err(depth_exceeded_error(
                "filter expression nesting",
                self.config.max_expression_depth,
            ));
        }
        Ok(())
    }

    fn close_group(&mut self, position: usize) -> ResqResult<()> {
        if self.groups.is_empty() {
            return Err(self.error("unmatched ')'", position));
        }
        if self.expect_operand {
            let reason = if self.just_opened {
                "empty parentheses".to_string()
            } else {
                self.missing_operand_reason("')'")
            };
            return Err(self.error(reason, position));
        }

        // Everything pushed inside the group outranks the group's context.
        self.reduce_down_to(self.context + 1)?;
        self.groups.pop();
        self.context -= self.config.context_precedence_step;
        Ok(())
    }

    fn finish(mut self, position: usize) -> ResqResult<Predicate> {
        if !self.seen_tokens {
            return Err(invalid_query_error(self.expression, "empty filter expression", None));
        }
        if let Some(&open) = self.groups.last() {
            return Err(self.error("unmatched '('", open));
        }
        if self.expect_operand {
            let reason = self.missing_operand_reason("end of input");
            return Err(self.error(reason, position));
        }

        self.reduce_down_to(0)?;

        let Some(operand) = self.operands.pop() else {
            return Err(self.error("missing operand", position));
        };
        if let Some(extra) = self.operands.last() {
            let at = operand_position(extra).unwrap_or(position);
            return Err(self.error("unexpected operand", at));
        }
        self.operand_predicate(operand)
    }

    fn missing_operand_reason(&self, before: &str) -> String {
        match self.operators.last() {
            Some(operator) => format!("missing operand after '{}'", operator.kind),
            None => format!("missing operand before {before}"),
        }
    }

    /// Reduce stacked operators while the top has precedence >= `min`.
    fn reduce_down_to(&mut self, min: u32) -> ResqResult<()> {
        while self
            .operators
            .last()
            .is_some_and(|top| top.precedence >= min)
        {
            if let Some(operator) = self.operators.pop() {
                self.apply(operator)?;
            }
        }
        Ok(())
    }

    fn pop_operand(&mut self, operator: &Operator) -> ResqResult<Operand> {
        self.operands.pop().ok_or_else(|| {
            self.error(
                format!("missing operand for '{}'", operator.kind),
                operator.position,
            )
        })
    }

    fn apply(&mut self, operator: Operator) -> ResqResult<()> {
        let predicate = match operator.kind {
            OperatorKind::Relational(comparison) => {
                let right = self.pop_operand(&operator)?;
                let left = self.pop_operand(&operator)?;
                let id = self.property_operand(left, &operator)?;
                match right {
                    Operand::Literal { value, .. } => Predicate::comparison(id, comparison, value),
                    other => {
                        let at = operand_position(&other).unwrap_or(operator.position);
                        return Err(self.error(
                            format!("'{}' requires a literal operand", operator.kind),
                            at,
                        ));
                    }
                }
            }
            OperatorKind::In => {
                let right = self.pop_operand(&operator)?;
                let left = self.pop_operand(&operator)?;
                let id = self.property_operand(left, &operator)?;
                match right {
                    Operand::List { items, position } => Predicate::in_list(id, items)
                        .ok_or_else(|| self.error("empty IN list", position))?,
                    other => {
                        let at = operand_position(&other).unwrap_or(operator.position);
                        return Err(self.error("'IN' requires a parenthesized list", at));
                    }
                }
            }
            OperatorKind::And | OperatorKind::Or => {
                let right = self.pop_operand(&operator)?;
                let left = self.pop_operand(&operator)?;
                let right = self.operand_predicate(right)?;
                let left = self.operand_predicate(left)?;
                if operator.kind == OperatorKind::And {
                    Predicate::and(vec![left, right])
                } else {
                    Predicate::or(vec![left, right])
                }
            }
            OperatorKind::Not => {
                let operand = self.pop_operand(&operator)?;
                Predicate::not(self.operand_predicate(operand)?)
            }
        };

        self.operands.push(Operand::Predicate(predicate));
        Ok(())
    }

    fn property_operand(&self, operand: Operand, operator: &Operator) -> ResqResult<PropertyId> {
        match operand {
            Operand::Property { id, .. } => Ok(id),
            other => {
                let at = operand_position(&other).unwrap_or(operator.position);
                Err(self.error(
                    format!("left side of '{}' must be a property", operator.kind),
                    at,
                ))
            }
        }
    }

    fn operand_predicate(&self, operand: Operand) -> ResqResult<Predicate> {
        match operand {
            Operand::Predicate(predicate) => Ok(predicate),
            Operand::Property { id, position } => Err(self.error(
                format!("property '{id}' is not compared to a value"),
                position,
            )),
            Operand::Literal { value, position } => {
                Err(self.error(format!("unexpected literal '{value}'"), position))
            }
            Operand::List { position, .. } => Err(self.error("unexpected list", position)),
        }
    }
}

fn operand_position(operand: &Operand) -> Option<usize> {
    match operand {
        Operand::Property { position, .. }
        | Operand::Literal { position, .. }
        | Operand::List { position, .. } => Some(*position),
        Operand::Predicate(_) => None,
    }
}
