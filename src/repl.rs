// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Interactive REPL for the quill parser.
//!
//! Every line is parsed with the current options and reported the same way
//! the CLI reports files. Input that stops in the middle of a construct
//! continues on the next line.

use crate::{Output, report};
use owo_colors::OwoColorize;
use quill_parser::lexer::{Scanner, TokenKind};
use quill_parser::{Error, Features, ParserOptions, compile_with_opts};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Config, Editor, Helper};
use std::borrow::Cow;
use std::path::PathBuf;

const HISTORY_FILE: &str = "history";
const MAX_HISTORY_SIZE: usize = 1000;

/// REPL commands that can be executed with a dot prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplCommand {
    Help,
    Exit,
    Clear,
    Version,
    Load,
    Features,
    Toggle,
    Locations,
    Ast,
}

impl ReplCommand {
    /// Parse a REPL command from input string
    pub fn parse(input: &str) -> Option<(Self, Option<&str>)> {
        let input = input.trim();
        let rest = input.strip_prefix('.')?;

        let mut parts = rest.splitn(2, char::is_whitespace);
        let cmd = parts.next()?.to_lowercase();
        let arg = parts.next().map(str::trim).filter(|a| !a.is_empty());

        let cmd = match cmd.as_str() {
            "help" | "h" | "?" => ReplCommand::Help,
            "exit" | "quit" | "q" => ReplCommand::Exit,
            "clear" | "cls" => ReplCommand::Clear,
            "version" | "v" => ReplCommand::Version,
            "load" | "l" => ReplCommand::Load,
            "features" | "f" => ReplCommand::Features,
            "toggle" | "t" => ReplCommand::Toggle,
            "locations" => ReplCommand::Locations,
            "ast" => ReplCommand::Ast,
            _ => return None,
        };
        Some((cmd, arg))
    }

    /// Get all available commands for help/completion
    pub fn all_commands() -> &'static [(&'static str, &'static str)] {
        &[
            (".help", "Show this help message"),
            (".exit", "Exit the REPL"),
            (".clear", "Clear the screen"),
            (".version", "Show version information"),
            (".load <file>", "Parse a file with the current options"),
            (".features", "List parser features and their state"),
            (".toggle <NAME>", "Flip a feature, or set it with NAME=on|off"),
            (".locations", "Toggle line/column output"),
            (".ast", "Toggle printing the syntax tree"),
        ]
    }
}

/// Words that get a keyword color even though the lexer reads them as
/// identifiers.
const CONTEXTUAL_KEYWORDS: &[&str] = &[
    "async", "await", "yield", "let", "static", "of", "get", "set", "as", "from",
];

/// Completion, hints, highlighting and multi-line validation.
struct QuillHelper {
    /// Completion candidates
    words: Vec<String>,
    /// Options used to decide whether input is complete
    options: ParserOptions,
}

impl QuillHelper {
    fn new(options: ParserOptions) -> Self {
        let mut words: Vec<String> = [
            "break", "case", "catch", "class", "const", "continue", "debugger", "default",
            "delete", "do", "else", "export", "extends", "finally", "for", "function", "if",
            "import", "in", "instanceof", "new", "return", "super", "switch", "this", "throw",
            "try", "typeof", "var", "void", "while", "with", "true", "false", "null",
        ]
        .into_iter()
        .chain(CONTEXTUAL_KEYWORDS.iter().copied())
        .map(String::from)
        .collect();
        words.extend(ReplCommand::all_commands().iter().map(|(cmd, _)| {
            cmd.split_whitespace().next().unwrap_or(*cmd).to_string()
        }));
        words.extend(Features::all_feature_names().map(String::from));

        Self { words, options }
    }
}

/// Start of the word ending at `pos`.
fn word_start(line: &str, pos: usize) -> usize {
    line[..pos]
        .rfind(|c: char| !c.is_alphanumeric() && c != '_' && c != '.')
        .map(|i| i + 1)
        .unwrap_or(0)
}

impl Completer for QuillHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let word = &line[word_start(line, pos)..pos];
        if word.is_empty() {
            return Ok((pos, vec![]));
        }

        let matches = self
            .words
            .iter()
            .filter(|w| w.starts_with(word))
            .map(|w| Pair {
                display: w.clone(),
                replacement: w[word.len()..].to_string(),
            })
            .collect();

        Ok((pos, matches))
    }
}

impl Hinter for QuillHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &rustyline::Context<'_>) -> Option<Self::Hint> {
        if pos < line.len() {
            return None;
        }

        let word = &line[word_start(line, pos)..];
        if word.len() < 2 {
            return None;
        }

        self.words
            .iter()
            .find(|w| w.starts_with(word) && w.len() > word.len())
            .map(|w| w[word.len()..].to_string().dimmed().to_string())
    }
}

impl Highlighter for QuillHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.trim_start().starts_with('.') {
            return Cow::Owned(line.magenta().to_string());
        }
        Cow::Owned(highlight_source(line))
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

/// Colors `source` token by token. Anything past a lexical error is left
/// plain.
fn highlight_source(source: &str) -> String {
    let mut result = String::with_capacity(source.len() * 2);
    let mut scanner = Scanner::new(source);
    let mut copied = 0;

    while let Ok(token) = scanner.next_token() {
        if matches!(token.kind, TokenKind::Eof) {
            break;
        }
        result.push_str(&source[copied..token.span.start]);
        let text = &source[token.span.start..token.span.end];
        let colored = match &token.kind {
            TokenKind::Number(_) | TokenKind::BigInt(_) => text.yellow().to_string(),
            TokenKind::String(_) | TokenKind::Template { .. } => text.green().to_string(),
            TokenKind::RegExp { .. } => text.red().to_string(),
            TokenKind::True | TokenKind::False | TokenKind::Null | TokenKind::This => text.blue().to_string(),
            TokenKind::PrivateIdentifier(_) => text.cyan().to_string(),
            TokenKind::Identifier(name) if CONTEXTUAL_KEYWORDS.contains(&name.as_str()) => {
                text.magenta().bold().to_string()
            }
            TokenKind::Identifier(_) => text.to_string(),
            kind if kind.is_keyword() => text.magenta().bold().to_string(),
            TokenKind::LeftParen
            | TokenKind::RightParen
            | TokenKind::LeftBracket
            | TokenKind::RightBracket
            | TokenKind::LeftBrace
            | TokenKind::RightBrace => text.yellow().to_string(),
            _ => text.cyan().to_string(),
        };
        result.push_str(&colored);
        copied = token.span.end;
    }

    result.push_str(&source[copied..]);
    result
}

impl Validator for QuillHelper {
    fn validate(&self, ctx: &mut ValidationContext<'_>) -> rustyline::Result<ValidationResult> {
        let input = ctx.input();
        if input.trim_start().starts_with('.') || !needs_more_input(input, self.options) {
            return Ok(ValidationResult::Valid(None));
        }
        Ok(ValidationResult::Incomplete)
    }
}

/// Whether `input` fails only because it stops early: the parse error sits
/// at the end of the text, or a bracket is still open.
fn needs_more_input(input: &str, options: ParserOptions) -> bool {
    if input.trim().is_empty() {
        return false;
    }
    if !is_balanced(input) {
        return true;
    }
    match compile_with_opts(input, options) {
        Ok(_) => false,
        Err(e) => e.offset >= input.trim_end().len(),
    }
}

/// Check if brackets, braces, and parentheses are balanced
fn is_balanced(input: &str) -> bool {
    let mut stack = Vec::new();
    let mut in_string = None;
    let mut escape_next = false;

    for c in input.chars() {
        if escape_next {
            escape_next = false;
            continue;
        }

        if c == '\\' && in_string.is_some() {
            escape_next = true;
            continue;
        }

        match in_string {
            Some(quote) if c == quote => in_string = None,
            Some(_) => {}
            None => match c {
                '"' | '\'' | '`' => in_string = Some(c),
                '(' => stack.push(')'),
                '[' => stack.push(']'),
                '{' => stack.push('}'),
                ')' | ']' | '}' => {
                    // A stray closer is a syntax error the parser reports.
                    if stack.pop() != Some(c) {
                        return true;
                    }
                }
                _ => {}
            },
        }
    }

    stack.is_empty() && in_string.is_none()
}

impl Helper for QuillHelper {}

/// The interactive REPL for the quill parser
pub struct Repl {
    options: ParserOptions,
    output: Output,
    editor: Editor<QuillHelper, DefaultHistory>,
    history_path: PathBuf,
}

impl Repl {
    /// Create a new REPL instance
    pub fn new(options: ParserOptions, output: Output) -> rustyline::Result<Self> {
        let config = Config::builder()
            .history_ignore_dups(true)?
            .history_ignore_space(true)
            .max_history_size(MAX_HISTORY_SIZE)?
            .auto_add_history(true)
            .build();

        let mut editor = Editor::with_config(config)?;
        editor.set_helper(Some(QuillHelper::new(options)));

        let history_path = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("quill")
            .join(HISTORY_FILE);

        if let Some(parent) = history_path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                tracing::warn!(path = %parent.display(), error = %e, "cannot create history directory");
            }
        }

        if let Err(e) = editor.load_history(&history_path) {
            tracing::debug!(path = %history_path.display(), error = %e, "no history loaded");
        }

        Ok(Self {
            options,
            output,
            editor,
            history_path,
        })
    }

    /// Run the REPL main loop
    pub fn run(&mut self) -> rustyline::Result<()> {
        self.print_banner();

        loop {
            let prompt = format!("{} ", "quill>".bright_green().bold());

            match self.editor.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();

                    if trimmed.is_empty() {
                        continue;
                    }

                    if trimmed.starts_with('.') {
                        match ReplCommand::parse(trimmed) {
                            Some((cmd, arg)) => match self.execute_command(cmd, arg) {
                                CommandResult::Continue => continue,
                                CommandResult::Exit => break,
                            },
                            // `.5 + 1` is a program, `.nope` is a typo
                            None if !trimmed[1..].starts_with(|c: char| c.is_ascii_digit()) => {
                                eprintln!(
                                    "{}: unknown command '{}', try {}",
                                    "Error".red().bold(),
                                    trimmed.cyan(),
                                    ".help".cyan()
                                );
                                continue;
                            }
                            None => {}
                        }
                    }

                    let result = compile_with_opts(trimmed, self.options).map_err(Into::into);
                    report("<repl>", result, self.output);
                }
                Err(ReadlineError::Interrupted) => {
                    println!("{}", "^C".dimmed());
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("{}", "^D".dimmed());
                    break;
                }
                Err(err) => {
                    eprintln!("{}: {:?}", "Error".red().bold(), err);
                    break;
                }
            }
        }

        if let Err(e) = self.editor.save_history(&self.history_path) {
            tracing::warn!(path = %self.history_path.display(), error = %e, "cannot save history");
        }

        println!();
        Ok(())
    }

    fn print_banner(&self) {
        let version = env!("CARGO_PKG_VERSION");
        println!();
        println!(
            "  {} {} {}",
            "Quill ECMAScript Parser".white().bold(),
            "v".dimmed(),
            version.bright_yellow()
        );
        println!(
            "  {} {} {}",
            "Type".dimmed(),
            ".help".cyan(),
            "for available commands".dimmed()
        );
        println!();
    }

    fn execute_command(&mut self, cmd: ReplCommand, arg: Option<&str>) -> CommandResult {
        match cmd {
            ReplCommand::Help => self.print_help(),
            ReplCommand::Exit => return CommandResult::Exit,
            ReplCommand::Clear => print!("\x1B[2J\x1B[H"),
            ReplCommand::Version => {
                println!("{}: {}", "quill".bright_cyan().bold(), env!("CARGO_PKG_VERSION").yellow());
            }
            ReplCommand::Load => match arg {
                Some(path) => self.load_file(path),
                None => missing_argument(".load", "a file path"),
            },
            ReplCommand::Features => self.print_features(),
            ReplCommand::Toggle => match arg {
                Some(toggle) => self.toggle(toggle),
                None => missing_argument(".toggle", "a feature name"),
            },
            ReplCommand::Locations => {
                self.output.locations = !self.output.locations;
                self.options = self.options.with_locations(self.output.locations);
                print_switch("locations", self.output.locations);
            }
            ReplCommand::Ast => {
                self.output.ast = !self.output.ast;
                print_switch("ast", self.output.ast);
            }
        }
        CommandResult::Continue
    }

    /// Flips `NAME`, or applies `NAME=on|off`.
    fn toggle(&mut self, toggle: &str) {
        let toggle = if toggle.contains('=') {
            toggle.to_string()
        } else {
            match Features::from_feature_name(toggle) {
                Some(flag) if self.options.features.contains(flag) => format!("{toggle}=off"),
                Some(_) => format!("{toggle}=on"),
                None => toggle.to_string(),
            }
        };

        match self.options.features.with_toggles([&toggle]) {
            Ok(features) => {
                self.options = self.options.with_features(features);
                if let Some(helper) = self.editor.helper_mut() {
                    helper.options = self.options;
                }
                println!("{} {}", "set".green(), toggle.cyan());
            }
            Err(e) => eprintln!("{}: {}", "Error".red().bold(), e),
        }
    }

    fn print_features(&self) {
        println!();
        for name in Features::all_feature_names() {
            let on = Features::from_feature_name(name).is_some_and(|flag| self.options.features.contains(flag));
            let state = if on { "on".green().to_string() } else { "off".red().to_string() };
            println!("  {:32} {}", name.cyan(), state);
        }
        println!();
    }

    fn print_help(&self) {
        println!();
        println!("{}", "REPL Commands:".white().bold());
        println!();

        for (cmd, desc) in ReplCommand::all_commands() {
            println!("  {:18} {}", cmd.cyan(), desc.dimmed());
        }

        println!();
        println!("{}", "Keyboard Shortcuts:".white().bold());
        println!();
        println!("  {:18} {}", "Ctrl+C".yellow(), "Cancel current input".dimmed());
        println!("  {:18} {}", "Ctrl+D".yellow(), "Exit REPL".dimmed());
        println!("  {:18} {}", "Tab".yellow(), "Autocomplete".dimmed());
        println!();
    }

    fn load_file(&mut self, path: &str) {
        let result = std::fs::read_to_string(path)
            .map_err(|source| Error::Io {
                path: PathBuf::from(path),
                source,
            })
            .and_then(|source| Ok(compile_with_opts(&source, self.options)?));
        report(path, result, self.output);
    }
}

fn missing_argument(command: &str, what: &str) {
    eprintln!("{}: {} {}", "Error".red().bold(), command.cyan(), format!("requires {what}").dimmed());
}

fn print_switch(name: &str, on: bool) {
    let state = if on { "on".green().to_string() } else { "off".red().to_string() };
    println!("{} {}", name.cyan(), state);
}

/// Result of executing a REPL command
enum CommandResult {
    Continue,
    Exit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repl_command_parse() {
        assert!(matches!(ReplCommand::parse(".help"), Some((ReplCommand::Help, None))));
        assert!(matches!(ReplCommand::parse(".exit"), Some((ReplCommand::Exit, None))));
        assert!(matches!(
            ReplCommand::parse(".load test.js"),
            Some((ReplCommand::Load, Some("test.js")))
        ));
        assert!(matches!(
            ReplCommand::parse(".toggle FEAT_JSX=off"),
            Some((ReplCommand::Toggle, Some("FEAT_JSX=off")))
        ));
        assert!(matches!(ReplCommand::parse(".features"), Some((ReplCommand::Features, None))));
        assert!(ReplCommand::parse("not a command").is_none());
        assert!(ReplCommand::parse(".5 + 1").is_none());
    }

    #[test]
    fn test_is_balanced() {
        assert!(is_balanced("(1 + 2)"));
        assert!(is_balanced("{ a: 1 }"));
        assert!(!is_balanced("(1 + 2"));
        assert!(!is_balanced("{ a: 1"));
        assert!(is_balanced("'string with (unbalanced'"));
    }

    #[test]
    fn test_needs_more_input() {
        let options = ParserOptions::default();
        assert!(needs_more_input("function f() {", options));
        assert!(needs_more_input("let a =", options));
        assert!(!needs_more_input("let a = 1;", options));
        assert!(!needs_more_input("let = ;", options));
        assert!(!needs_more_input("", options));
    }

    #[test]
    fn test_highlight_keeps_text() {
        let source = "const x = async (y) => 'z' + 1n; // done";
        let highlighted = highlight_source(source);
        assert!(highlighted.contains("const"));
        assert!(highlighted.ends_with("// done"));
        assert!(highlighted.len() > source.len());
    }
}
