//! Token definitions for filter expression lexical analysis

use std::fmt;

use crate::property::PropertyId;

/// Tokens of a filter expression
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Operands
    /// Property path, already converted to an id
    Property(PropertyId),
    /// Literal operand of a relational operator
    Literal(String),
    /// Parenthesized item list following `IN`
    LiteralList(Vec<String>),

    // Relational operators
    /// Equality operator token (=)
    Equal,
    /// Inequality operator token (!=)
    NotEqual,
    /// Less than operator token (<)
    Less,
    /// Less than or equal operator token (<=)
    LessEq,
    /// Greater than operator token (>)
    Greater,
    /// Greater than or equal operator token (>=)
    GreaterEq,
    /// Set membership operator token (IN)
    In,

    // Logical operators
    /// Logical AND keyword
    And,
    /// Logical OR keyword
    Or,
    /// Logical NOT keyword
    Not,

    // Grouping
    /// Left parenthesis token (()
    LeftParen,
    /// Right parenthesis token ())
    RightParen,

    /// End of input
    EOF,
}

impl Token {
    /// Check if token is a relational operator
    #[inline]
    #[must_use]
    pub fn is_relational_operator(&self) -> bool {
        matches!(
            self,
            Token::Equal
                | Token::NotEqual
                | Token::Less
                | Token::LessEq
                | Token::Greater
                | Token::GreaterEq
                | Token::In
        )
    }

    /// Check if token is a logical operator
    #[inline]
    #[must_use]
    pub fn is_logical_operator(&self) -> bool {
        matches!(self, Token::And | Token::Or | Token::Not)
    }

    /// Check if token is an operand (property or literal)
    #[inline]
    #[must_use]
    pub fn is_operand(&self) -> bool {
        matches!(
            self,
            Token::Property(_) | Token::Literal(_) | Token::LiteralList(_)
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Property(id) => write!(f, "{id}"),
            Token::Literal(value) => write!(f, "'{value}'"),
            Token::LiteralList(items) => write!(f, "({})", items.join(",")),
            Token::Equal => f.write_str("="),
            Token::NotEqual => f.write_str("!="),
            Token::Less => f.write_str("<"),
            Token::LessEq => f.write_str("<="),
            Token::Greater => f.write_str(">"),
            Token::GreaterEq => f.write_str(">="),
            Token::In => f.write_str("IN"),
            Token::And => f.write_str("AND"),
            Token::Or => f.write_str("OR"),
            Token::Not => f.write_str("NOT"),
            Token::LeftParen => f.write_str("("),
            Token::RightParen => f.write_str(")"),
            Token::EOF => f.write_str("end of input"),
        }
    }
}

/// Token with the character offset it started at
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedToken {
    pub token: Token,
    pub position: usize,
}

impl PositionedToken {
    #[inline]
    #[must_use]
    pub fn new(token: Token, position: usize) -> Self {
        Self { token, position }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_classification() {
        assert!(Token::In.is_relational_operator());
        assert!(Token::LessEq.is_relational_operator());
        assert!(!Token::And.is_relational_operator());
        assert!(Token::Not.is_logical_operator());
        assert!(Token::LiteralList(vec![]).is_operand());
        assert!(!Token::LeftParen.is_operand());
    }

    #[test]
    fn test_display() {
        assert_eq!(Token::Property(PropertyId::from_path("a/b")).to_string(), "a/b");
        assert_eq!(Token::LiteralList(vec!["1".into(), "2".into()]).to_string(), "(1,2)");
        assert_eq!(Token::EOF.to_string(), "end of input");
    }
}
