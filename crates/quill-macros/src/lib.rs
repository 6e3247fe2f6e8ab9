//! Test macros for the quill parser.
//!
//! # Macros Overview
//!
//! - [`assert_matches!`] - Assert a value matches a pattern, with an optional guard
//! - [`assert_ok!`] - Unwrap an `Ok`, printing the error otherwise
//! - [`assert_err!`] - Unwrap an `Err`, printing the value otherwise
//! - [`assert_parse_error!`] - Check a diagnostic's message and position
//! - [`parse_error_cases!`] - Table-driven error tests
//!
//! # Examples
//!
//! ```
//! use quill_macros::*;
//!
//! #[derive(Debug)]
//! struct Diagnostic { message: String, line: usize, column: usize }
//!
//! fn parse(src: &str) -> Result<usize, Diagnostic> {
//!     match src.find('?') {
//!         Some(column) => Err(Diagnostic { message: "Unexpected token".into(), line: 1, column }),
//!         None => Ok(src.len()),
//!     }
//! }
//!
//! assert_eq!(assert_ok!(parse("a + b")), 5);
//! assert_parse_error!(parse("a ? "), "Unexpected token", 1, 2);
//! ```

#![warn(missing_docs)]

#[macro_use]
mod testing;

#[cfg(test)]
mod tests {
    #[derive(Debug, PartialEq)]
    enum Node {
        Name(String),
        Number(f64),
    }

    #[derive(Debug)]
    struct Diagnostic {
        message: String,
        line: usize,
        column: usize,
    }

    fn fail(message: &str, line: usize, column: usize) -> Result<Node, Diagnostic> {
        Err(Diagnostic {
            message: message.to_string(),
            line,
            column,
        })
    }

    fn parse(src: &str) -> Result<Node, Diagnostic> {
        match src.parse::<f64>() {
            Ok(n) => Ok(Node::Number(n)),
            Err(_) if src.chars().all(char::is_alphanumeric) => Ok(Node::Name(src.to_string())),
            Err(_) => fail(&format!("Unexpected character in `{src}`"), 1, 0),
        }
    }

    #[test]
    fn test_assert_matches_with_guard() {
        assert_matches!(parse("12"), Ok(Node::Number(n)) if n == 12.0);
        assert_matches!(parse("abc"), Ok(Node::Name(_)));
    }

    #[test]
    #[should_panic(expected = "does not match pattern")]
    fn test_assert_matches_failure() {
        assert_matches!(parse("abc"), Ok(Node::Number(_)));
    }

    #[test]
    fn test_assert_ok_and_err() {
        assert_eq!(assert_ok!(parse("x")), Node::Name("x".into()));
        let err = assert_err!(parse("a-b"));
        assert_eq!(err.column, 0);
    }

    #[test]
    fn test_assert_parse_error_position() {
        let err = assert_parse_error!(fail("Unexpected token", 3, 4), "Unexpected token", 3, 4);
        assert_eq!(err.line, 3);
    }

    #[test]
    #[should_panic(expected = "wrong position")]
    fn test_assert_parse_error_wrong_position() {
        assert_parse_error!(fail("Unexpected token", 1, 1), "Unexpected token", 1, 2);
    }

    parse_error_cases!(test_table, parse, [
        "a-b" => "Unexpected character in `a-b`",
        "?" => "Unexpected character in `?`",
    ]);
}
