// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Quill - an ECMAScript and JSX parser, written in Rust
//!
//! This is the main entry point for the quill CLI/REPL.
//!
//! ## Features
//!
//! - Parse files concurrently with tokio, reporting each result in order
//! - Toggle individual `FEAT_*` flags from the command line
//! - Interactive REPL with history for trying out snippets

mod repl;

use clap::Parser as _;
use owo_colors::OwoColorize;
use quill_parser::ast::visit::{self, Visit};
use quill_parser::ast::{Expression, Identifier, Program, SourceType, Statement};
use quill_parser::{AsyncParser, Error, FeatureError, Features, ParserOptions};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(clap::Parser, Debug)]
#[command(
    name = "quill",
    about = "Parse ECMAScript and JSX sources and report syntax errors",
    version,
    author = "Pegasus Heavy Industries"
)]
struct Cli {
    /// Source files to parse
    files: Vec<PathBuf>,

    /// Parse source code given on the command line
    #[arg(short = 'e', long = "eval", value_name = "CODE")]
    eval: Option<String>,

    /// Turn a parser feature on or off, e.g. `--feature FEAT_JSX=off`
    #[arg(long = "feature", value_name = "NAME=on|off")]
    features: Vec<String>,

    /// Parse as a sloppy-mode script instead of a module
    #[arg(long)]
    script: bool,

    /// Attach line/column locations and print them for top-level statements
    #[arg(long)]
    locations: bool,

    /// Print the syntax tree of every successful parse
    #[arg(long)]
    ast: bool,

    /// Only report failures
    #[arg(short, long)]
    quiet: bool,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(long)]
    verbose: bool,
}

impl Cli {
    fn options(&self) -> Result<ParserOptions, FeatureError> {
        let base = if self.script {
            ParserOptions::script()
        } else {
            ParserOptions::default()
        };
        let features = base.features.with_toggles(&self.features)?;
        Ok(base.with_features(features).with_locations(self.locations))
    }

    fn output(&self) -> Output {
        Output {
            quiet: self.quiet,
            ast: self.ast,
            locations: self.locations,
        }
    }
}

/// How successful parses are printed.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Output {
    pub quiet: bool,
    pub ast: bool,
    pub locations: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let options = match cli.options() {
        Ok(options) => options,
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            eprintln!("Known features: {}", Features::all_feature_names().collect::<Vec<_>>().join(", "));
            return ExitCode::FAILURE;
        }
    };
    tracing::debug!(features = ?options.features.feature_names(), locations = options.locations, "options");

    if let Some(code) = &cli.eval {
        let result = AsyncParser::with_options(options).parse(code.as_str()).await;
        return exit_code(report("<eval>", result, cli.output()));
    }

    if !cli.files.is_empty() {
        return run_files(&cli, options).await;
    }

    run_repl(options, cli.output())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "quill=debug,quill_parser=debug" } else { "quill=warn,quill_parser=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Parse every file concurrently and report in argument order.
async fn run_files(cli: &Cli, options: ParserOptions) -> ExitCode {
    let parser = AsyncParser::with_options(options);
    let results = parser.parse_files(&cli.files).await;

    let mut ok = true;
    for (path, result) in cli.files.iter().zip(results) {
        ok &= report(&path.display().to_string(), result, cli.output());
    }
    exit_code(ok)
}

/// Start the interactive REPL
fn run_repl(options: ParserOptions, output: Output) -> ExitCode {
    match repl::Repl::new(options, output) {
        Ok(mut repl) => {
            if let Err(e) = repl.run() {
                eprintln!("{}: {:?}", "REPL Error".red().bold(), e);
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}: Failed to initialize REPL: {:?}", "Error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn exit_code(ok: bool) -> ExitCode {
    if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

/// Prints one parse result. Returns whether it succeeded.
pub(crate) fn report(name: &str, result: Result<Program, Error>, output: Output) -> bool {
    match result {
        Ok(program) => {
            if !output.quiet {
                print_program(name, &program, output);
            }
            true
        }
        Err(Error::Parse(e)) => {
            eprintln!("{}: {}: {}", "SyntaxError".red().bold(), name.cyan(), e);
            false
        }
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            false
        }
    }
}

fn print_program(name: &str, program: &Program, output: Output) {
    let mut counter = NodeCounter::default();
    counter.visit_program(program);

    let goal = match program.source_type {
        SourceType::Module => "module",
        SourceType::Script => "script",
    };
    println!(
        "{} {} {}",
        "ok".green().bold(),
        name.cyan(),
        format!(
            "({goal}, {} statements, {} expressions, {} identifiers)",
            counter.statements, counter.expressions, counter.identifiers
        )
        .dimmed()
    );

    if output.locations {
        for stmt in &program.body {
            if let Some(loc) = stmt.span().loc {
                println!(
                    "  {}",
                    format!("{}:{}-{}:{}", loc.start.line, loc.start.column, loc.end.line, loc.end.column).yellow()
                );
            }
        }
    }

    if output.ast {
        println!("{program:#?}");
    }
}

/// Counts nodes by category.
#[derive(Debug, Default)]
struct NodeCounter {
    statements: usize,
    expressions: usize,
    identifiers: usize,
}

impl<'ast> Visit<'ast> for NodeCounter {
    fn visit_statement(&mut self, stmt: &'ast Statement) {
        self.statements += 1;
        visit::walk_statement(self, stmt);
    }

    fn visit_expression(&mut self, expr: &'ast Expression) {
        self.expressions += 1;
        visit::walk_expression(self, expr);
    }

    fn visit_identifier(&mut self, _id: &'ast Identifier) {
        self.identifiers += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("quill").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_feature_toggles() {
        let options = cli(&["--feature", "FEAT_JSX=off", "--feature", "pow=off", "a.js"]).options().unwrap();
        assert!(!options.features.contains(Features::JSX));
        assert!(!options.features.contains(Features::POW));
        assert!(options.features.contains(Features::MODULE));
    }

    #[test]
    fn test_unknown_feature() {
        let err = cli(&["--feature", "FEAT_NOPE=on"]).options().unwrap_err();
        assert_eq!(err, FeatureError::UnknownFeature("FEAT_NOPE".into()));
    }

    #[test]
    fn test_script_and_locations() {
        let options = cli(&["--script", "--locations", "-e", "x"]).options().unwrap();
        assert!(!options.features.intersects(Features::STRICT | Features::MODULE));
        assert!(options.locations);
    }

    #[test]
    fn test_node_counter() {
        let program = quill_parser::compile("let a = b + c;").unwrap();
        let mut counter = NodeCounter::default();
        counter.visit_program(&program);
        assert_eq!(counter.statements, 1);
        assert_eq!(counter.expressions, 3);
        assert_eq!(counter.identifiers, 3);
    }
}
