//! Best-effort parsing of JSON documents that are still arriving.
//!
//! A language model streams its structured answer as a growing prefix of a
//! JSON document. [`parse_partial`] turns any such prefix into the value it
//! describes so far: open strings keep what has been read, open containers
//! keep their finished members, and anything that has not started yet is
//! left out.

pub mod cursor;
pub mod partial_json;

pub use partial_json::{PartialValue, parse_partial};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unexpected {found:?} at byte {offset}, expected {expected}")]
    Unexpected {
        offset: usize,
        found: char,
        expected: &'static str,
    },
    #[error("invalid escape sequence at byte {offset}")]
    InvalidEscape { offset: usize },
    #[error("invalid number {text:?} at byte {offset}")]
    InvalidNumber { offset: usize, text: String },
    #[error("trailing characters after document at byte {offset}")]
    TrailingCharacters { offset: usize },
    #[error("nesting deeper than {limit} levels at byte {offset}")]
    TooDeep { offset: usize, limit: usize },
}
