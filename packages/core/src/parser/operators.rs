//! Operator model for precedence parsing
//!
//! An operator's effective precedence is its base precedence plus the context
//! precedence of the parenthesized group it appears in, so every operator in
//! a group binds tighter than any operator outside it.

use std::fmt;

use crate::predicate::ComparisonOp;
use crate::tokens::Token;

/// Highest base precedence of any operator
pub const MAX_BASE_PRECEDENCE: u32 = 4;

/// Operator kinds recognised by the parser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorKind {
    Or,
    And,
    Not,
    Relational(ComparisonOp),
    In,
}

impl OperatorKind {
    /// Map an operator token to its kind
    #[must_use]
    pub fn from_token(token: &Token) -> Option<Self> {
        Some(match token {
            Token::Or => OperatorKind::Or,
            Token::And => OperatorKind::And,
            Token::Not => OperatorKind::Not,
            Token::In => OperatorKind::In,
            Token::Equal => OperatorKind::Relational(ComparisonOp::Equal),
            Token::NotEqual => OperatorKind::Relational(ComparisonOp::NotEqual),
            Token::Less => OperatorKind::Relational(ComparisonOp::Less),
            Token::LessEq => OperatorKind::Relational(ComparisonOp::LessEq),
            Token::Greater => OperatorKind::Relational(ComparisonOp::Greater),
            Token::GreaterEq => OperatorKind::Relational(ComparisonOp::GreaterEq),
            _ => return None,
        })
    }

    #[must_use]
    pub fn base_precedence(self) -> u32 {
        match self {
            OperatorKind::Or => 1,
            OperatorKind::And => 2,
            OperatorKind::Not => 3,
            OperatorKind::Relational(_) | OperatorKind::In => MAX_BASE_PRECEDENCE,
        }
    }

    /// Unary operators take a single operand to their right
    #[must_use]
    pub fn is_unary(self) -> bool {
        matches!(self, OperatorKind::Not)
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperatorKind::Or => f.write_str("OR"),
            OperatorKind::And => f.write_str("AND"),
            OperatorKind::Not => f.write_str("NOT"),
            OperatorKind::In => f.write_str("IN"),
            OperatorKind::Relational(op) => write!(f, "{op}"),
        }
    }
}

/// Operator waiting on the operator stack
#[derive(Debug, Clone, Copy)]
pub struct Operator {
    pub kind: OperatorKind,
    pub precedence: u32,
    pub position: usize,
}

impl Operator {
    #[must_use]
    pub fn new(kind: OperatorKind, context_precedence: u32, position: usize) -> Self {
        Self {
            kind,
            precedence: kind.base_precedence() + context_precedence,
            position,
        }
    }
}
