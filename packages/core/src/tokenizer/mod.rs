//! Filter expression tokenizer
//!
//! Converts a raw filter string into a sequence of positioned tokens. The
//! tokenizer is context sensitive: after a relational operator the next token
//! is always read as a literal, and after `IN` as a parenthesized item list.

mod core;
mod literals;
mod operators;
mod words;

pub use core::FilterTokenizer;

use crate::error::ResqResult;
use crate::tokens::PositionedToken;

/// Tokenize `input`, appending a trailing [`crate::tokens::Token::EOF`].
///
/// # Errors
///
/// Returns an invalid-query error naming the offending character or word and
/// its position.
pub fn tokenize(input: &str) -> ResqResult<Vec<PositionedToken>> {
    FilterTokenizer::new(input).tokenize()
}
