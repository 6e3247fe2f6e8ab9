// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Diagnostics produced by the scanner and parser.
//!
//! Every failure aborts the parse. The first diagnostic is returned to the
//! caller as a [`ParseError`] carrying the message, the byte offset of the
//! offending token and its 1-based line / 0-based column.

use crate::lexer::{Position, is_line_terminator};

/// Result alias used throughout the parser.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Classification of a parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A malformed lexeme (unterminated string, bad escape, bad separator).
    Lexical,
    /// The token stream does not match any production.
    Syntax,
    /// The program is grammatical but violates a static semantic rule.
    Early,
}

/// A fatal parse diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} at ({line}:{column})")]
pub struct ParseError {
    /// Error class
    pub kind: ErrorKind,
    /// Human readable message, without the position suffix
    pub message: String,
    /// Byte offset of the offending character or token
    pub offset: usize,
    /// 1-based line
    pub line: usize,
    /// 0-based column, counted in Unicode scalar values
    pub column: usize,
}

impl ParseError {
    /// Creates an error at `offset`, resolving its line and column in `source`.
    pub fn new(kind: ErrorKind, message: impl Into<String>, source: &str, offset: usize) -> Self {
        let Position { line, column } = locate(source, offset);
        Self {
            kind,
            message: message.into(),
            offset,
            line,
            column,
        }
    }

    /// Creates a lexical error.
    pub fn lexical(message: impl Into<String>, source: &str, offset: usize) -> Self {
        Self::new(ErrorKind::Lexical, message, source, offset)
    }

    /// Creates a syntax error.
    pub fn syntax(message: impl Into<String>, source: &str, offset: usize) -> Self {
        Self::new(ErrorKind::Syntax, message, source, offset)
    }

    /// Creates an early (static semantics) error.
    pub fn early(message: impl Into<String>, source: &str, offset: usize) -> Self {
        Self::new(ErrorKind::Early, message, source, offset)
    }
}

/// Resolves a byte offset to a 1-based line and 0-based column.
///
/// `\r\n` counts as a single line break, as do lone `\r`, `\n`, U+2028 and
/// U+2029. Offsets past the end of `source` clamp to its end.
pub fn locate(source: &str, offset: usize) -> Position {
    let mut line = 1;
    let mut column = 0;
    let mut chars = source.char_indices().peekable();
    while let Some((idx, ch)) = chars.next() {
        if idx >= offset {
            break;
        }
        if is_line_terminator(ch) {
            if ch == '\r' {
                if let Some(&(next_idx, '\n')) = chars.peek() {
                    if next_idx < offset {
                        chars.next();
                    }
                }
            }
            line += 1;
            column = 0;
        } else {
            column += 1;
        }
    }
    Position { line, column }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_suffix() {
        let err = ParseError::syntax("Unexpected token `await`", "let a = 1; async () => await", 24);
        assert_eq!(err.to_string(), "Unexpected token `await` at (1:24)");
    }

    #[test]
    fn test_locate_first_line() {
        assert_eq!(locate("abc", 0), Position { line: 1, column: 0 });
        assert_eq!(locate("abc", 2), Position { line: 1, column: 2 });
    }

    #[test]
    fn test_locate_line_terminators() {
        let src = "a\nb\r\nc\rd\u{2028}e";
        assert_eq!(locate(src, 2), Position { line: 2, column: 0 });
        assert_eq!(locate(src, 5), Position { line: 3, column: 0 });
        assert_eq!(locate(src, 7), Position { line: 4, column: 0 });
        assert_eq!(locate(src, 11), Position { line: 5, column: 0 });
    }

    #[test]
    fn test_locate_counts_scalars() {
        // "é" is two bytes but one column
        let src = "\u{e9}x";
        assert_eq!(locate(src, 2), Position { line: 1, column: 1 });
    }

    #[test]
    fn test_error_kind_preserved() {
        let err = ParseError::early("Redefinition of __proto__ property", "x", 0);
        assert_eq!(err.kind, ErrorKind::Early);
        assert_eq!(err.line, 1);
        assert_eq!(err.column, 0);
    }
}
