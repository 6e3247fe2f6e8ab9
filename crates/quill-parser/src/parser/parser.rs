//! The main parser implementation.
//!
//! This file holds the parser state and the token plumbing shared by every
//! production. The productions themselves live in sibling modules, each an
//! `impl Parser` block for one area of the grammar.

use rustc_hash::FxHashSet;

use super::scope::{BindingKind, PrivateNames, ScopeError, ScopeFlags, ScopeStack};
use crate::ast::*;
use crate::error::{ErrorKind, ParseError, Result, locate};
use crate::features::Features;
use crate::lexer::{Position, Scanner, SourceLocation, Span, Token, TokenKind};
use crate::{MAX_NESTING_DEPTH, ParserOptions};

/// Remaining stack below which a guarded frame moves to a fresh segment.
const STACK_RED_ZONE: usize = 256 * 1024;
/// Size of each stack segment allocated for deep nesting.
const STACK_SEGMENT: usize = 4 * 1024 * 1024;

/// The start of a node under construction.
#[derive(Debug, Clone, Copy)]
pub(super) struct Marker {
    pub offset: usize,
    pub pos: Position,
}

impl Marker {
    /// A marker at the start of an already finished node.
    pub fn of(span: Span) -> Self {
        Self {
            offset: span.start,
            pos: span.loc.map(|loc| loc.start).unwrap_or_default(),
        }
    }
}

/// What a label (or an unlabeled loop/switch) can be a target for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum LabelKind {
    Loop,
    Switch,
}

#[derive(Debug, Clone)]
pub(super) struct Label {
    pub name: Option<String>,
    pub kind: Option<LabelKind>,
    /// Start of the labeled statement; `None` for unlabeled loops and switches
    pub statement_start: Option<usize>,
}

impl Label {
    /// The implicit target of an unlabeled loop or switch.
    pub fn anonymous(kind: LabelKind) -> Self {
        Self {
            name: None,
            kind: Some(kind),
            statement_start: None,
        }
    }
}

/// Where a statement appears, which restricts declarations in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum StatementContext {
    /// Body of `if` / `else`
    If,
    /// Body of a labeled statement
    Label,
    /// Body of a loop or `with`, or a nested label
    Body,
}

/// Whether an expression is the head of a `for` statement, where `in` is
/// not a binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ForHead {
    No,
    Init,
    AwaitInit,
}

impl ForHead {
    pub fn no_in(self) -> bool {
        self != ForHead::No
    }
}

/// A recursive descent parser for JavaScript.
pub struct Parser<'a> {
    pub(super) source: &'a str,
    pub(super) scanner: Scanner<'a>,
    pub(super) options: ParserOptions,
    /// The current token
    pub(super) cur: Token,
    pub(super) prev_start: usize,
    pub(super) prev_end: usize,
    pub(super) prev_end_pos: Position,
    pub(super) strict: bool,
    pub(super) in_module: bool,
    pub(super) scopes: ScopeStack,
    pub(super) private_names: PrivateNames,
    pub(super) labels: Vec<Label>,
    // Cover grammar bookkeeping, see `parse_maybe_assign`.
    pub(super) potential_arrow_at: Option<usize>,
    pub(super) potential_arrow_in_for_await: bool,
    pub(super) yield_pos: Option<usize>,
    pub(super) await_pos: Option<usize>,
    pub(super) await_ident_pos: Option<usize>,
    pub(super) exports: FxHashSet<String>,
    pub(super) undefined_exports: Vec<(String, usize)>,
    depth: usize,
}

impl<'a> Parser<'a> {
    /// Creates a new parser for the given source code with default options.
    pub fn new(source: &'a str) -> Self {
        Self::with_options(source, ParserOptions::default())
    }

    /// Creates a parser with explicit options.
    pub fn with_options(source: &'a str, options: ParserOptions) -> Self {
        let features = options.features;
        let in_module = features.contains(Features::MODULE);
        let top_level_await = features.contains(Features::GLOBAL_ASYNC | Features::ASYNC_AWAIT);
        Self {
            source,
            scanner: Scanner::with_features(source, features),
            options,
            cur: Token::new(TokenKind::Eof, Span::new(0, 0)),
            prev_start: 0,
            prev_end: 0,
            prev_end_pos: Position::new(1, 0),
            strict: in_module || features.contains(Features::STRICT),
            in_module,
            scopes: ScopeStack::new(in_module, top_level_await),
            private_names: PrivateNames::default(),
            labels: Vec::new(),
            potential_arrow_at: None,
            potential_arrow_in_for_await: false,
            yield_pos: None,
            await_pos: None,
            await_ident_pos: None,
            exports: FxHashSet::default(),
            undefined_exports: Vec::new(),
            depth: 0,
        }
    }

    /// Parses the source code into a Program AST node.
    pub fn parse_program(&mut self) -> Result<Program> {
        if !self.strict && self.strict_directive() {
            self.strict = true;
        }
        tracing::trace!(strict = self.strict, module = self.in_module, "parsing program");
        self.cur = self.scanner.next_token()?;

        let mut body = Vec::new();
        while self.cur.kind != TokenKind::Eof {
            body.push(self.parse_statement(None, true)?);
        }

        if self.in_module {
            if let Some((name, offset)) = self.undefined_exports.iter().min_by_key(|(_, offset)| *offset) {
                return Err(self.raise_early(*offset, format!("Export '{name}' is not defined")));
            }
        }
        self.adapt_directive_prologue(&mut body);

        let end = self.source.len();
        let mut span = Span::new(0, end);
        if self.options.locations {
            span.loc = Some(SourceLocation {
                start: Position::new(1, 0),
                end: locate(self.source, end),
            });
        }
        Ok(Program {
            span,
            source_type: if self.in_module { SourceType::Module } else { SourceType::Script },
            body,
        })
    }

    // ------------------------------------------------------------------
    // Features
    // ------------------------------------------------------------------

    pub(super) fn has(&self, feature: Features) -> bool {
        self.options.features.contains(feature)
    }

    // ------------------------------------------------------------------
    // Token movement
    // ------------------------------------------------------------------

    /// Moves to the next token. A reserved word written with escapes is
    /// rejected when consumed here.
    pub(super) fn next(&mut self) -> Result<()> {
        if self.cur.escaped && self.cur.kind.is_keyword() {
            return Err(self.escaped_keyword());
        }
        self.advance_with(|scanner| scanner.next_token())
    }

    /// Moves to the next token, accepting escaped reserved words. Used for
    /// property names.
    pub(super) fn next_liberal(&mut self) -> Result<()> {
        self.advance_with(|scanner| scanner.next_token())
    }

    pub(super) fn advance_with(
        &mut self,
        fetch: impl FnOnce(&mut Scanner<'a>) -> Result<Token>,
    ) -> Result<()> {
        self.prev_start = self.cur.span.start;
        self.prev_end = self.cur.span.end;
        self.prev_end_pos = self.cur.end;
        self.cur = fetch(&mut self.scanner)?;
        Ok(())
    }

    /// Returns the token after the current one without consuming anything.
    /// Lexical errors in the lookahead read as no token.
    pub(super) fn peek(&mut self) -> Option<Token> {
        let checkpoint = self.scanner.checkpoint();
        let token = self.scanner.next_token().ok();
        self.scanner.restore(checkpoint);
        token
    }

    pub(super) fn is(&self, kind: &TokenKind) -> bool {
        &self.cur.kind == kind
    }

    pub(super) fn eat(&mut self, kind: &TokenKind) -> Result<bool> {
        if self.is(kind) {
            self.next()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub(super) fn expect(&mut self, kind: &TokenKind) -> Result<()> {
        if self.eat(kind)? { Ok(()) } else { Err(self.unexpected()) }
    }

    /// The current token is the unescaped identifier `name`.
    pub(super) fn is_contextual(&self, name: &str) -> bool {
        self.cur.is_contextual(name)
    }

    pub(super) fn eat_contextual(&mut self, name: &str) -> Result<bool> {
        if self.is_contextual(name) {
            self.next()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub(super) fn expect_contextual(&mut self, name: &str) -> Result<()> {
        if self.eat_contextual(name)? {
            return Ok(());
        }
        if self.is_escaped_contextual(name) {
            return Err(self.escaped_keyword());
        }
        Err(self.unexpected())
    }

    /// The current token spells `name` using escape sequences.
    pub(super) fn is_escaped_contextual(&self, name: &str) -> bool {
        self.cur.escaped && self.cur.identifier() == Some(name)
    }

    /// Automatic semicolon insertion applies before the current token.
    pub(super) fn can_insert_semicolon(&self) -> bool {
        matches!(self.cur.kind, TokenKind::Eof | TokenKind::RightBrace) || self.cur.newline_before
    }

    pub(super) fn semicolon(&mut self) -> Result<()> {
        if !self.eat(&TokenKind::Semicolon)? && !self.can_insert_semicolon() {
            return Err(self.unexpected());
        }
        Ok(())
    }

    /// After a comma: true (consuming `close` unless `keep`) when the list
    /// ends here.
    pub(super) fn after_trailing_comma(&mut self, close: &TokenKind, keep: bool) -> Result<bool> {
        if self.is(close) {
            if !keep {
                self.next()?;
            }
            return Ok(true);
        }
        Ok(false)
    }

    /// Source text of the previous token.
    pub(super) fn prev_text(&self) -> &'a str {
        &self.source[self.prev_start..self.prev_end]
    }

    // ------------------------------------------------------------------
    // Spans
    // ------------------------------------------------------------------

    pub(super) fn start_node(&self) -> Marker {
        Marker {
            offset: self.cur.span.start,
            pos: self.cur.start,
        }
    }

    /// Closes a node at the end of the previous token.
    pub(super) fn finish(&self, marker: Marker) -> Span {
        Span {
            start: marker.offset,
            end: self.prev_end,
            loc: self.options.locations.then_some(SourceLocation {
                start: marker.pos,
                end: self.prev_end_pos,
            }),
        }
    }

    /// A span between two arbitrary offsets.
    pub(super) fn span_between(&self, start: usize, end: usize) -> Span {
        Span {
            start,
            end,
            loc: self.options.locations.then(|| SourceLocation {
                start: locate(self.source, start),
                end: locate(self.source, end),
            }),
        }
    }

    /// Span of the current token.
    pub(super) fn cur_span(&self) -> Span {
        Span {
            start: self.cur.span.start,
            end: self.cur.span.end,
            loc: self.options.locations.then_some(SourceLocation {
                start: self.cur.start,
                end: self.cur.end,
            }),
        }
    }

    // ------------------------------------------------------------------
    // Errors
    // ------------------------------------------------------------------

    pub(super) fn raise(&self, offset: usize, message: impl Into<String>) -> ParseError {
        ParseError::new(ErrorKind::Syntax, message, self.source, offset)
    }

    pub(super) fn raise_early(&self, offset: usize, message: impl Into<String>) -> ParseError {
        ParseError::new(ErrorKind::Early, message, self.source, offset)
    }

    pub(super) fn escaped_keyword(&self) -> ParseError {
        self.raise(self.cur.span.start, "Keyword must not contain escaped characters")
    }

    pub(super) fn unexpected(&self) -> ParseError {
        self.unexpected_at(self.cur.span.start)
    }

    pub(super) fn unexpected_at(&self, offset: usize) -> ParseError {
        self.raise(offset, "Unexpected token")
    }

    pub(super) fn scope_error(&self, error: ScopeError, offset: usize) -> ParseError {
        self.raise_early(offset, error.to_string())
    }

    // ------------------------------------------------------------------
    // Scopes and recursion
    // ------------------------------------------------------------------

    /// Runs `f` inside a new scope, popping it on every exit path.
    pub(super) fn with_scope<T>(&mut self, flags: ScopeFlags, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.scopes.enter(flags);
        let result = f(self);
        self.scopes.exit();
        result
    }

    /// Runs `f` one nesting level deeper, failing past the nesting limit.
    pub(super) fn guarded<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(self.raise(self.cur.span.start, "Maximum nesting depth exceeded"));
        }
        self.depth += 1;
        let result = stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT, || f(self));
        self.depth -= 1;
        result
    }

    /// Declares a name, settling a pending module export when the binding
    /// lands at the top level.
    pub(super) fn declare_name(&mut self, name: &str, kind: BindingKind, offset: usize) -> Result<()> {
        match self.scopes.declare(name, kind) {
            Ok(true) if self.in_module => {
                self.undefined_exports.retain(|(pending, _)| pending != name);
                Ok(())
            }
            Ok(_) => Ok(()),
            Err(error) => Err(self.scope_error(error, offset)),
        }
    }

    // ------------------------------------------------------------------
    // Directives
    // ------------------------------------------------------------------

    /// Looks ahead from the scanner position for a directive prologue
    /// containing `"use strict"`. Nothing is consumed.
    pub(super) fn strict_directive(&mut self) -> bool {
        let checkpoint = self.scanner.checkpoint();
        let found = self.scan_for_use_strict();
        self.scanner.restore(checkpoint);
        found
    }

    fn scan_for_use_strict(&mut self) -> bool {
        let Ok(mut token) = self.scanner.next_token() else {
            return false;
        };
        loop {
            if !matches!(token.kind, TokenKind::String(_)) {
                return false;
            }
            let raw = &self.source[token.span.start..token.span.end];
            let Ok(after) = self.scanner.next_token() else {
                return false;
            };
            if raw.len() >= 2 && &raw[1..raw.len() - 1] == "use strict" {
                return match after.kind {
                    TokenKind::Semicolon | TokenKind::RightBrace | TokenKind::Eof => true,
                    _ => after.newline_before && !self.continues_expression(&after),
                };
            }
            token = if after.kind == TokenKind::Semicolon {
                match self.scanner.next_token() {
                    Ok(token) => token,
                    Err(_) => return false,
                }
            } else {
                after
            };
        }
    }

    /// A token on a new line that would continue the previous expression.
    fn continues_expression(&self, token: &Token) -> bool {
        let text = &self.source[token.span.start..];
        text.starts_with("!=")
            || text
                .chars()
                .next()
                .is_some_and(|c| "(`.[+-/*%<>=,?^&".contains(c))
    }

    /// Marks leading string-literal statements as directives.
    pub(super) fn adapt_directive_prologue(&self, body: &mut [Statement]) {
        for stmt in body {
            let Statement::Expression(stmt) = stmt else { break };
            let Expression::Literal(Literal {
                value: LiteralValue::String(value),
                ..
            }) = &stmt.expression
            else {
                break;
            };
            if !matches!(self.source.as_bytes().get(stmt.span.start), Some(b'"' | b'\'')) {
                break;
            }
            stmt.directive = Some(value.clone());
        }
    }
}
