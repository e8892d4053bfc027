//! Keyword and property path tokenization

use super::core::{Expect, FilterTokenizer};
use crate::error::{ResqResult, invalid_query_error};
use crate::property::{PropertyId, is_valid_property_path};
use crate::tokens::Token;

#[inline]
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '/')
}

/// Whether `word` is one of the reserved keywords (case-insensitive)
pub(crate) fn is_keyword(word: &str) -> bool {
    keyword(word).is_some()
}

fn keyword(word: &str) -> Option<Token> {
    if word.eq_ignore_ascii_case("AND") {
        Some(Token::And)
    } else if word.eq_ignore_ascii_case("OR") {
        Some(Token::Or)
    } else if word.eq_ignore_ascii_case("NOT") {
        Some(Token::Not)
    } else if word.eq_ignore_ascii_case("IN") {
        Some(Token::In)
    } else {
        None
    }
}

/// Parse a keyword or property path starting at `i`
pub(crate) fn parse_word(
    parser: &mut FilterTokenizer,
    chars: &[char],
    i: usize,
) -> ResqResult<usize> {
    let mut end = i;
    while end < chars.len() && is_word_char(chars[end]) {
        end += 1;
    }

    if end == i {
        return Err(invalid_query_error(
            &parser.input,
            format!("unexpected character '{}'", chars[i]),
            Some(i),
        ));
    }

    let word: String = chars[i..end].iter().collect();
    match keyword(&word) {
        Some(Token::In) => {
            parser.push(Token::In, i);
            parser.expect = Expect::LiteralList;
        }
        Some(token) => parser.push(token, i),
        None if is_valid_property_path(&word) => {
            parser.push(Token::Property(PropertyId::from_path(&word)), i);
        }
        None => {
            return Err(invalid_query_error(
                &parser.input,
                format!("invalid property path '{word}'"),
                Some(i),
            ));
        }
    }

    Ok(end - 1)
}

#[cfg(test)]
mod tests {
    use super::super::tokenize;
    use super::*;

    #[test]
    fn test_property_paths_become_ids() {
        let toks = tokenize("Services/attributes/runnable=true").unwrap();
        assert_eq!(
            toks[0].token,
            Token::Property(PropertyId::new("runnable", Some("Services.attributes")))
        );
    }

    #[test]
    fn test_invalid_path_and_character() {
        let err = tokenize("a//b=1").unwrap_err();
        assert!(err.message.contains("invalid property path 'a//b'"));

        let err = tokenize("a=1 & b=2").unwrap_err();
        assert!(err.message.contains("unexpected character '&' at position 4"));
    }

    #[test]
    fn test_keyword_matching() {
        assert!(is_keyword("and"));
        assert!(is_keyword("In"));
        assert!(!is_keyword("android"));
    }
}
