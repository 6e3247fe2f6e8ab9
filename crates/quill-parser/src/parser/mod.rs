//! Recursive-descent parser for ECMAScript and JSX.
//!
//! Transforms source text into a [`Program`](crate::ast::Program), pulling
//! tokens from the scanner on demand and re-lexing where the grammar decides
//! what a character means (`/` as division or regex, `}` closing a template
//! substitution, JSX text).
//!
//! ## Structure
//!
//! - `parser` - The `Parser` struct, token movement, spans and errors
//! - `scope` - Lexical scopes, binding kinds and private names
//! - `statements` - Statements and variable declarations
//! - `expressions` - Operators, literals, calls, members and templates
//! - `patterns` - Destructuring, cover grammar and assignment targets
//! - `functions` - Functions, arrows, methods and parameter checks
//! - `classes` - Class bodies, fields, methods and static blocks
//! - `modules` - `import` and `export` declarations
//! - `jsx` - JSX elements and fragments
//!
//! ## Usage
//!
//! ```rust
//! use quill_parser::parser::Parser;
//!
//! let mut parser = Parser::new("let x = 1 + 2;");
//! let program = parser.parse_program().expect("Should parse");
//! assert_eq!(program.body.len(), 1);
//! ```

#[allow(clippy::module_inception)]
mod parser;

mod classes;
mod expressions;
mod functions;
mod jsx;
mod modules;
mod patterns;
mod scope;
mod statements;

pub use parser::Parser;
pub use scope::{BindingKind, ScopeError, ScopeKind};
