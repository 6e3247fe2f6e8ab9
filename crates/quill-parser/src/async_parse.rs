//! Asynchronous and parallel parsing APIs.
//!
//! A parse is CPU-bound and never suspends, so these entry points only
//! move the work: file reads go through tokio's async I/O and the parse
//! itself runs on the blocking pool, or on rayon's pool for batches of
//! in-memory sources.
//!
//! # Example
//!
//! ```ignore
//! use quill_parser::AsyncParser;
//!
//! #[tokio::main]
//! async fn main() {
//!     let parser = AsyncParser::new();
//!     let program = parser.parse_file("app.jsx").await.unwrap();
//!     println!("{} statements", program.body.len());
//! }
//! ```

#[cfg(feature = "async")]
use std::path::Path;

#[cfg(feature = "async")]
use tokio::fs;

use crate::ast::Program;
#[cfg(feature = "async")]
use crate::Error;
#[cfg(feature = "parallel")]
use crate::ParseError;
use crate::{ParserOptions, compile_with_opts};

/// Parses sources from async code.
///
/// The options are `Copy`, so one parser can serve any number of
/// concurrent requests.
#[cfg(feature = "async")]
#[derive(Debug, Clone, Copy, Default)]
pub struct AsyncParser {
    options: ParserOptions,
}

#[cfg(feature = "async")]
impl AsyncParser {
    /// Creates a parser with the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a parser with explicit options.
    pub fn with_options(options: ParserOptions) -> Self {
        Self { options }
    }

    /// The options every parse uses.
    pub fn options(&self) -> ParserOptions {
        self.options
    }

    /// Parses `source` on the blocking thread pool.
    pub async fn parse(&self, source: impl Into<String>) -> Result<Program, Error> {
        let source = source.into();
        let options = self.options;
        let result = tokio::task::spawn_blocking(move || compile_with_opts(&source, options))
            .await
            .map_err(|e| Error::Join(e.to_string()))?;
        Ok(result?)
    }

    /// Reads and parses a file.
    pub async fn parse_file(&self, path: impl AsRef<Path>) -> Result<Program, Error> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).await.map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), bytes = source.len(), "read source");
        self.parse(source).await
    }

    /// Reads and parses several files concurrently. Results keep the order
    /// of `paths`.
    pub async fn parse_files(&self, paths: &[impl AsRef<Path>]) -> Vec<Result<Program, Error>> {
        let futures: Vec<_> = paths.iter().map(|p| self.parse_file(p)).collect();
        futures::future::join_all(futures).await
    }
}

/// Parses a batch of in-memory sources on rayon's thread pool. Results keep
/// the order of `sources`.
#[cfg(feature = "parallel")]
pub fn parse_many_parallel(sources: &[&str], options: ParserOptions) -> Vec<Result<Program, ParseError>> {
    use rayon::prelude::*;

    sources
        .par_iter()
        .map(|source| compile_with_opts(source, options))
        .collect()
}
