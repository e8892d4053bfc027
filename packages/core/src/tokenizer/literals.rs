//! Literal and `IN` list tokenization
//!
//! A literal is either quoted with `'` or `"` (backslash escapes the quote
//! character and itself) or bare, running up to whitespace or a parenthesis.

use super::core::{Expect, FilterTokenizer};
use super::words::is_keyword;
use crate::error::{ResqResult, invalid_query_error};
use crate::tokens::Token;

/// Parse the literal operand of a relational operator
pub(crate) fn parse_literal(
    parser: &mut FilterTokenizer,
    chars: &[char],
    i: usize,
) -> ResqResult<usize> {
    let (value, last) = match chars[i] {
        '\'' | '"' => read_quoted(parser, chars, i)?,
        '(' | ')' | '=' | '!' | '<' | '>' => return Err(parser.missing_literal(i)),
        _ => {
            let (value, last) = read_bare(chars, i, |c| c.is_whitespace() || c == '(' || c == ')');
            if is_keyword(&value) {
                return Err(parser.missing_literal(i));
            }
            (value, last)
        }
    };

    parser.push(Token::Literal(value), i);
    parser.expect = Expect::Any;
    Ok(last)
}

/// Parse the parenthesized, comma-separated item list following `IN`
pub(crate) fn parse_literal_list(
    parser: &mut FilterTokenizer,
    chars: &[char],
    start: usize,
) -> ResqResult<usize> {
    if chars[start] != '(' {
        return Err(invalid_query_error(
            &parser.input,
            format!("expected '(' after 'IN', found '{}'", chars[start]),
            Some(start),
        ));
    }

    let mut items = Vec::new();
    let mut i = start + 1;

    loop {
        while i < chars.len() && chars[i].is_whitespace() {
            i += 1;
        }
        if i >= chars.len() {
            return Err(unterminated_list(parser, start));
        }

        let item_start = i;
        let item = match chars[i] {
            '\'' | '"' => {
                let (value, last) = read_quoted(parser, chars, i)?;
                i = last + 1;
                value
            }
            _ => {
                let (value, last) = read_bare(chars, i, |c| c == ',' || c == ')');
                i = last + 1;
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    return Err(invalid_query_error(
                        &parser.input,
                        if items.is_empty() && chars[item_start] == ')' {
                            "empty IN list"
                        } else {
                            "empty item in IN list"
                        },
                        Some(item_start),
                    ));
                }
                trimmed.to_string()
            }
        };
        items.push(item);

        while i < chars.len() && chars[i].is_whitespace() {
            i += 1;
        }
        match chars.get(i) {
            Some(',') => i += 1,
            Some(')') => break,
            Some(other) => {
                return Err(invalid_query_error(
                    &parser.input,
                    format!("expected ',' or ')' in IN list, found '{other}'"),
                    Some(i),
                ));
            }
            None => return Err(unterminated_list(parser, start)),
        }
    }

    parser.push(Token::LiteralList(items), start);
    parser.expect = Expect::Any;
    Ok(i)
}

fn unterminated_list(parser: &FilterTokenizer, start: usize) -> crate::error::ResqError {
    invalid_query_error(&parser.input, "unterminated IN list", Some(start))
}

/// Read a quoted literal, returning its unescaped value and the index of the
/// closing quote.
fn read_quoted(parser: &FilterTokenizer, chars: &[char], start: usize) -> ResqResult<(String, usize)> {
    let quote = chars[start];
    let mut value = String::new();
    let mut i = start + 1;

    while i < chars.len() {
        match chars[i] {
            c if c == quote => return Ok((value, i)),
            '\\' if i + 1 < chars.len() && (chars[i + 1] == quote || chars[i + 1] == '\\') => {
                value.push(chars[i + 1]);
                i += 1;
            }
            c => value.push(c),
        }
        i += 1;
    }

    Err(invalid_query_error(
        &parser.input,
        "unterminated string literal",
        Some(start),
    ))
}

/// Read characters until `stop` matches or input ends, returning the text and
/// the index of the last character consumed.
fn read_bare(chars: &[char], start: usize, stop: impl Fn(char) -> bool) -> (String, usize) {
    let mut end = start;
    while end < chars.len() && !stop(chars[end]) {
        end += 1;
    }
    (chars[start..end].iter().collect(), end.saturating_sub(1).max(start))
}

#[cfg(test)]
mod tests {
    use super::super::tokenize;
    use crate::error::ErrorKind;
    use crate::tokens::Token;

    fn tokens(input: &str) -> Vec<Token> {
        tokenize(input).unwrap().into_iter().map(|t| t.token).collect()
    }

    #[test]
    fn test_quoted_literals_keep_spaces_and_escapes() {
        assert_eq!(tokens("a='x y'")[2], Token::Literal("x y".into()));
        assert_eq!(tokens(r#"a="say \"hi\"""#)[2], Token::Literal(r#"say "hi""#.into()));
        assert_eq!(tokens("a=''")[2], Token::Literal(String::new()));
    }

    #[test]
    fn test_bare_literal_stops_at_parenthesis() {
        let toks = tokens("(a=1)");
        assert_eq!(toks[3], Token::Literal("1".into()));
        assert_eq!(toks[4], Token::RightParen);
    }

    #[test]
    fn test_in_list_items_are_trimmed() {
        assert_eq!(
            tokens("version IN ( 2.1 , '2.2' ,2.3)")[2],
            Token::LiteralList(vec!["2.1".into(), "2.2".into(), "2.3".into()])
        );
    }

    #[test]
    fn test_in_list_errors() {
        for (input, fragment) in [
            ("a IN ()", "empty IN list"),
            ("a IN (1,,2)", "empty item"),
            ("a IN (1, 2", "unterminated IN list"),
            ("a IN 1", "expected '('"),
            ("a IN", "missing '(' list"),
        ] {
            let err = tokenize(input).unwrap_err();
            assert_eq!(err.kind, ErrorKind::InvalidQuery);
            assert!(err.message.contains(fragment), "{input}: {}", err.message);
        }
    }

    #[test]
    fn test_keyword_is_not_a_literal() {
        let err = tokenize("a= AND b=1").unwrap_err();
        assert!(err.message.contains("missing literal after '='"));
    }

    #[test]
    fn test_unterminated_quote() {
        let err = tokenize("a='abc").unwrap_err();
        assert!(err.message.contains("unterminated string literal at position 2"));
    }
}
