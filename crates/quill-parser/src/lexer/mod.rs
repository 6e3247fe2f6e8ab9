//! Lexical analysis (tokenization) for JavaScript source code.
//!
//! The lexer transforms JavaScript source text into tokens on demand. It is
//! not aware of strict mode: legacy octal literals and escapes are flagged
//! on the token (`octal_at`) and the parser decides whether they are
//! allowed.
//!
//! ## Structure
//!
//! - `chars.rs` - Character classes for identifiers, whitespace and line terminators
//! - `scanner.rs` - Main `Scanner` struct, trivia and identifiers
//! - `token.rs` - `Token`, `TokenKind`, `Span` and positions
//! - `operators.rs` - Multi-character punctuators
//! - `literals.rs` - Numbers, strings, templates and regular expressions
//! - `jsx.rs` - Tag and child scanning modes for JSX
//! - `entities.rs` - XHTML entity decoding
//!
//! ## Usage
//!
//! ```rust
//! use quill_parser::lexer::{Scanner, TokenKind};
//!
//! let mut scanner = Scanner::new("let x = 42;");
//!
//! loop {
//!     let token = scanner.next_token().unwrap();
//!     if matches!(token.kind, TokenKind::Eof) {
//!         break;
//!     }
//!     println!("{:?}", token.kind);
//! }
//! ```

mod chars;
mod jsx;
mod literals;
mod operators;
mod scanner;
mod token;

pub mod entities;

pub use chars::{is_id_continue, is_id_start, is_line_terminator, is_whitespace};
pub use literals::normalize_line_endings;
pub use scanner::{Checkpoint, Scanner};
pub use token::{Position, SourceLocation, Span, Token, TokenKind};
