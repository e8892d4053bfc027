//! Core tokenizer state and dispatch loop

use crate::error::{ResqResult, invalid_query_error};
use crate::tokens::{PositionedToken, Token};

/// What the next non-whitespace input is read as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Expect {
    /// Property, keyword, operator or parenthesis
    Any,
    /// Literal operand of a relational operator
    Literal,
    /// Parenthesized list following `IN`
    LiteralList,
}

/// Tokenizer over a single filter expression
pub struct FilterTokenizer {
    pub(crate) input: String,
    pub(crate) tokens: Vec<PositionedToken>,
    pub(crate) expect: Expect,
}

impl FilterTokenizer {
    #[inline]
    #[must_use]
    pub fn new(input: &str) -> Self {
        Self {
            input: input.to_string(),
            tokens: Vec::new(),
            expect: Expect::Any,
        }
    }

    /// Tokenize the whole input.
    ///
    /// Each helper returns the index of the last character it consumed.
    ///
    /// # Errors
    ///
    /// Returns an invalid-query error for unknown characters, malformed
    /// operators, missing literals and malformed `IN` lists.
    pub fn tokenize(mut self) -> ResqResult<Vec<PositionedToken>> {
        use super::{literals, operators, words};

        let chars: Vec<char> = self.input.chars().collect();
        let mut i = 0;

        while i < chars.len() {
            match chars[i] {
                c if c.is_whitespace() => {
                    // Skip whitespace
                }
                _ if self.expect == Expect::Literal => {
                    i = literals::parse_literal(&mut self, &chars, i)?;
                }
                _ if self.expect == Expect::LiteralList => {
                    i = literals::parse_literal_list(&mut self, &chars, i)?;
                }
                '(' => self.push(Token::LeftParen, i),
                ')' => self.push(Token::RightParen, i),
                '=' | '!' | '<' | '>' => {
                    i = operators::parse_operator(&mut self, &chars, i)?;
                }
                '\'' | '"' => {
                    return Err(invalid_query_error(
                        &self.input,
                        "quoted literal must follow a relational operator",
                        Some(i),
                    ));
                }
                _ => {
                    i = words::parse_word(&mut self, &chars, i)?;
                }
            }
            i += 1;
        }

        match self.expect {
            Expect::Any => {}
            Expect::Literal => {
                return Err(self.missing_literal(chars.len()));
            }
            Expect::LiteralList => {
                return Err(invalid_query_error(
                    &self.input,
                    "missing '(' list after 'IN'",
                    Some(chars.len()),
                ));
            }
        }

        self.push(Token::EOF, chars.len());
        tracing::trace!(
            target: "resq::tokenizer",
            tokens = self.tokens.len(),
            "tokenized filter"
        );
        Ok(self.tokens)
    }

    #[inline]
    pub(crate) fn push(&mut self, token: Token, position: usize) {
        self.tokens.push(PositionedToken::new(token, position));
    }

    /// The relational operator that put the tokenizer into literal mode.
    pub(crate) fn pending_operator(&self) -> String {
        self.tokens
            .last()
            .map_or_else(String::new, |last| last.token.to_string())
    }

    pub(crate) fn missing_literal(&self, position: usize) -> crate::error::ResqError {
        invalid_query_error(
            &self.input,
            format!("missing literal after '{}'", self.pending_operator()),
            Some(position),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::property::PropertyId;

    fn tokens(input: &str) -> Vec<Token> {
        FilterTokenizer::new(input)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|positioned| positioned.token)
            .collect()
    }

    #[test]
    fn test_simple_comparison() {
        assert_eq!(
            tokens("state=STARTED"),
            vec![
                Token::Property(PropertyId::new("state", None)),
                Token::Equal,
                Token::Literal("STARTED".into()),
                Token::EOF,
            ]
        );
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        let toks = tokens("not a=1 and b=2 Or c in (x)");
        assert_eq!(toks[0], Token::Not);
        assert_eq!(toks[4], Token::And);
        assert_eq!(toks[8], Token::Or);
        assert_eq!(toks[10], Token::In);
        assert_eq!(toks[11], Token::LiteralList(vec!["x".into()]));
    }

    #[test]
    fn test_positions_are_character_offsets() {
        let positioned = FilterTokenizer::new("a = 1 AND (b<2)").tokenize().unwrap();
        let positions: Vec<usize> = positioned.iter().map(|t| t.position).collect();
        assert_eq!(positions, vec![0, 2, 4, 6, 10, 11, 12, 13, 14, 15]);
    }

    #[test]
    fn test_missing_literal_at_end() {
        let err = FilterTokenizer::new("a=").tokenize().unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidQuery);
        assert!(err.message.contains("missing literal after '='"));
        assert!(err.message.contains("position 2"));
    }

    #[test]
    fn test_quoted_literal_without_operator() {
        let err = FilterTokenizer::new("'x'").tokenize().unwrap_err();
        assert!(err.message.contains("position 0"));
    }
}
