// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # quill-parser
//!
//! A standards-conformant ECMAScript and JSX parser, implemented in Rust.
//!
//! ## Overview
//!
//! This crate turns source text into an ESTree-shaped AST:
//! - On-demand scanner with context-driven re-lexing
//! - Recursive-descent parser with cover grammars for arrows and patterns
//! - Scope tracking and early errors during the parse
//! - A configurable grammar through [`Features`]
//!
//! ## Quick Start
//!
//! ```rust
//! use quill_parser::{ParserOptions, ast::Statement, compile, compile_with_opts};
//!
//! let program = compile("async function foo() { }").unwrap();
//! assert!(matches!(program.body[0], Statement::FunctionDeclaration(_)));
//!
//! let err = compile_with_opts("a ?? b || c", ParserOptions::script()).unwrap_err();
//! assert_eq!(
//!     err.to_string(),
//!     "Cannot use unparenthesized `??` within logic expressions at (1:2)"
//! );
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ast;
pub mod error;
pub mod features;
pub mod lexer;
pub mod parser;

#[cfg(any(feature = "async", feature = "parallel"))]
pub mod async_parse;

pub use ast::Program;
pub use error::{ErrorKind, ParseError};
pub use features::{FeatureError, Features};
pub use parser::Parser;

#[cfg(feature = "async")]
pub use async_parse::AsyncParser;
#[cfg(feature = "parallel")]
pub use async_parse::parse_many_parallel;

/// Recursion limit for nested expressions and statements. Deeper input is
/// reported as an error instead of overflowing the stack.
pub const MAX_NESTING_DEPTH: usize = 256;

/// Options for a single parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParserOptions {
    /// Grammar features in effect
    pub features: Features,
    /// Attach line/column locations to every node span
    pub locations: bool,
}

impl ParserOptions {
    /// Default features without strict mode or the module goal.
    pub fn script() -> Self {
        Self {
            features: Features::default().off(Features::STRICT | Features::MODULE),
            locations: false,
        }
    }

    /// Returns these options with `features` replaced.
    pub fn with_features(self, features: Features) -> Self {
        Self { features, ..self }
    }

    /// Returns these options with location tracking switched on or off.
    pub fn with_locations(self, locations: bool) -> Self {
        Self { locations, ..self }
    }
}

/// Parses `source` with the default feature set: a strict module with JSX.
pub fn compile(source: &str) -> Result<Program, ParseError> {
    compile_with_opts(source, ParserOptions::default())
}

/// Parses `source` with explicit options.
pub fn compile_with_opts(source: &str, options: ParserOptions) -> Result<Program, ParseError> {
    let span = tracing::debug_span!("compile", len = source.len(), locations = options.locations);
    let _enter = span.enter();
    tracing::trace!(features = ?options.features.feature_names(), "feature set");

    let result = Parser::with_options(source, options).parse_program();
    match &result {
        Ok(program) => tracing::debug!(statements = program.body.len(), "parsed"),
        Err(err) => tracing::debug!(line = err.line, column = err.column, "{}", err.message),
    }
    result
}

/// Errors from the file and task based entry points.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The source failed to parse
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// Reading a source file failed
    #[error("failed to read {path}: {source}")]
    Io {
        /// The file that could not be read
        path: std::path::PathBuf,
        /// The underlying I/O error
        source: std::io::Error,
    },
    /// A background parse task panicked or was cancelled
    #[error("parse task failed: {0}")]
    Join(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{SourceType, Statement};

    #[test]
    fn test_compile_defaults_to_strict_module() {
        let program = compile("export const a = 1;").unwrap();
        assert_eq!(program.source_type, SourceType::Module);
        assert_eq!(compile("with (a) {}").unwrap_err().message, "'with' in strict mode");
    }

    #[test]
    fn test_script_options() {
        let options = ParserOptions::script();
        assert!(!options.features.contains(Features::STRICT));
        assert!(options.features.contains(Features::JSX));
        let program = compile_with_opts("with (a) {}", options).unwrap();
        assert_eq!(program.source_type, SourceType::Script);
    }

    #[test]
    fn test_error_display() {
        let err = compile("x ** ").unwrap_err();
        assert_eq!(err.to_string(), format!("{} at ({}:{})", err.message, err.line, err.column));
    }

    #[test]
    fn test_locations_option() {
        let program = compile_with_opts("a;\nb;", ParserOptions::default().with_locations(true)).unwrap();
        let Statement::Expression(second) = &program.body[1] else {
            panic!("expected expression statement");
        };
        let loc = second.span.loc.unwrap();
        assert_eq!((loc.start.line, loc.start.column), (2, 0));
        assert!(compile("a;").unwrap().span.loc.is_none());
    }

    #[test]
    fn test_crate_error_wraps_parse_error() {
        let err: Error = compile("(").unwrap_err().into();
        assert!(matches!(err, Error::Parse(_)));
        assert!(err.to_string().starts_with("Unexpected token"));
    }
}
