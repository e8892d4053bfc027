//! Relational operator tokenization
//!
//! Handles `=`, `!=`, `<`, `<=`, `>` and `>=`. Every relational operator
//! switches the tokenizer into literal mode.

use super::core::{Expect, FilterTokenizer};
use crate::error::{ResqResult, invalid_query_error};
use crate::tokens::Token;

/// Parse a relational operator starting at `i`
pub(crate) fn parse_operator(
    parser: &mut FilterTokenizer,
    chars: &[char],
    i: usize,
) -> ResqResult<usize> {
    let followed_by_eq = i + 1 < chars.len() && chars[i + 1] == '=';

    let (token, last) = match chars[i] {
        '=' => (Token::Equal, i),
        '!' if followed_by_eq => (Token::NotEqual, i + 1),
        '!' => {
            return Err(invalid_query_error(
                &parser.input,
                "single '!' not supported, use '!=' for inequality or NOT for negation",
                Some(i),
            ));
        }
        '<' if followed_by_eq => (Token::LessEq, i + 1),
        '<' => (Token::Less, i),
        '>' if followed_by_eq => (Token::GreaterEq, i + 1),
        '>' => (Token::Greater, i),
        other => {
            return Err(invalid_query_error(
                &parser.input,
                format!("unexpected operator character '{other}'"),
                Some(i),
            ));
        }
    };

    parser.push(token, i);
    parser.expect = Expect::Literal;
    Ok(last)
}

#[cfg(test)]
mod tests {
    use super::super::tokenize;
    use crate::tokens::Token;

    #[test]
    fn test_two_character_operators() {
        let toks: Vec<Token> = tokenize("a<=1 AND b>=2 AND c!=3")
            .unwrap()
            .into_iter()
            .map(|t| t.token)
            .collect();
        assert_eq!(toks[1], Token::LessEq);
        assert_eq!(toks[2], Token::Literal("1".into()));
        assert_eq!(toks[5], Token::GreaterEq);
        assert_eq!(toks[9], Token::NotEqual);
        assert_eq!(toks[10], Token::Literal("3".into()));
    }

    #[test]
    fn test_lone_bang_is_rejected() {
        let err = tokenize("a ! b").unwrap_err();
        assert!(err.message.contains("single '!'"));
        assert!(err.message.contains("position 2"));
    }
}
