//! The scanner that produces tokens from source text.
//!
//! Tokens are produced one at a time on demand. The scanner never decides
//! between readings that depend on grammar context: `/` is always scanned
//! as division and `}` as a brace. The parser asks for a re-lex from the
//! token's start when it knows better (see `relex_as_regex` and
//! `relex_template_continuation`).

use super::chars::{is_id_continue, is_id_start, is_line_terminator, is_whitespace};
use super::{Position, Span, Token, TokenKind};
use crate::error::{ParseError, Result};
use crate::features::Features;

/// A saved scanner position used for lookahead and re-lexing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    pos: usize,
    line: usize,
    column: usize,
}

/// A scanner that tokenizes JavaScript source code.
pub struct Scanner<'a> {
    pub(super) source: &'a str,
    pub(super) features: Features,
    pub(super) pos: usize,
    pub(super) line: usize,
    pub(super) column: usize,
    // Per-token state, reset at the start of every token.
    pub(super) newline_before: bool,
    pub(super) escaped: bool,
    pub(super) octal_at: Option<usize>,
    done: bool,
}

impl<'a> Scanner<'a> {
    /// Creates a new scanner for the given source code with every feature on.
    pub fn new(source: &'a str) -> Self {
        Self::with_features(source, Features::default())
    }

    /// Creates a scanner consulting `features` for lexical gates.
    pub fn with_features(source: &'a str, features: Features) -> Self {
        Self {
            source,
            features,
            pos: 0,
            line: 1,
            column: 0,
            newline_before: false,
            escaped: false,
            octal_at: None,
            done: false,
        }
    }

    /// Returns the source text being scanned.
    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Saves the current position.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            pos: self.pos,
            line: self.line,
            column: self.column,
        }
    }

    /// Restores a position saved by [`Scanner::checkpoint`].
    pub fn restore(&mut self, checkpoint: Checkpoint) {
        self.pos = checkpoint.pos;
        self.line = checkpoint.line;
        self.column = checkpoint.column;
        self.done = false;
    }

    /// Moves the scanner back to the start of `token`.
    pub fn rewind_to(&mut self, token: &Token) {
        self.restore(Checkpoint {
            pos: token.span.start,
            line: token.start.line,
            column: token.start.column,
        });
    }

    /// Returns the next token from the source.
    pub fn next_token(&mut self) -> Result<Token> {
        self.newline_before = false;
        self.skip_trivia()?;
        self.begin_token();

        let start = self.pos;
        let start_pos = self.current_position();

        let Some(ch) = self.bump() else {
            return Ok(self.finish(TokenKind::Eof, start, start_pos));
        };

        let kind = match ch {
            // Single-character tokens
            '{' => TokenKind::LeftBrace,
            '}' => TokenKind::RightBrace,
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '[' => TokenKind::LeftBracket,
            ']' => TokenKind::RightBracket,
            ';' => TokenKind::Semicolon,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            '~' => TokenKind::Tilde,

            // Multi-character tokens
            '.' => self.scan_dot(start)?,
            '+' => self.scan_plus(),
            '-' => self.scan_minus(),
            '*' => self.scan_star(),
            '/' => self.scan_slash(),
            '%' => self.scan_percent(),
            '<' => self.scan_less_than(),
            '>' => self.scan_greater_than(),
            '=' => self.scan_equal(),
            '!' => self.scan_bang(),
            '&' => self.scan_ampersand(),
            '|' => self.scan_pipe(),
            '^' => self.scan_caret(),
            '?' => self.scan_question(),

            // String literals
            '"' | '\'' => self.scan_string(ch, start)?,

            // Template literals
            '`' => self.scan_template_chunk(start)?,

            // Numbers
            '0'..='9' => self.scan_number(ch, start)?,

            // Private identifiers
            '#' => self.scan_private_identifier(start)?,

            // Identifiers and keywords
            '\\' => self.scan_identifier(None, start)?,
            _ if is_id_start(ch) => self.scan_identifier(Some(ch), start)?,

            _ => return Err(self.error(format!("Unexpected character `{ch}`"), start)),
        };

        Ok(self.finish(kind, start, start_pos))
    }

    /// Re-scans `token` (a `/` or `/=`) as a regular expression literal.
    pub fn relex_as_regex(&mut self, token: &Token) -> Result<Token> {
        self.rewind_to(token);
        self.newline_before = token.newline_before;
        self.begin_token();
        let start = self.pos;
        let start_pos = self.current_position();
        self.bump();
        let kind = self.scan_regex(start)?;
        Ok(self.finish(kind, start, start_pos))
    }

    /// Re-scans `token` (a `}`) as the continuation of a template literal.
    pub fn relex_template_continuation(&mut self, token: &Token) -> Result<Token> {
        self.rewind_to(token);
        self.newline_before = token.newline_before;
        self.begin_token();
        let start = self.pos;
        let start_pos = self.current_position();
        self.bump();
        let kind = self.scan_template_chunk(start)?;
        Ok(self.finish(kind, start, start_pos))
    }

    /// Re-scans `token` in expression context: a `/` or `/=` becomes a
    /// regular expression, any other token is returned unchanged.
    pub fn relex_as_slash_or_regex(&mut self, token: &Token) -> Result<Token> {
        match token.kind {
            TokenKind::Slash | TokenKind::SlashEqual => self.relex_as_regex(token),
            _ => Ok(token.clone()),
        }
    }

    /// Current line/column.
    pub(super) fn current_position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    pub(super) fn begin_token(&mut self) {
        self.escaped = false;
        self.octal_at = None;
    }

    pub(super) fn finish(&self, kind: TokenKind, start: usize, start_pos: Position) -> Token {
        Token {
            kind,
            span: Span::new(start, self.pos),
            start: start_pos,
            end: self.current_position(),
            newline_before: self.newline_before,
            escaped: self.escaped,
            octal_at: self.octal_at,
        }
    }

    pub(super) fn error(&self, message: impl Into<String>, offset: usize) -> ParseError {
        ParseError::lexical(message, self.source, offset)
    }

    pub(super) fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    pub(super) fn peek_next(&self) -> Option<char> {
        let mut chars = self.source[self.pos..].chars();
        chars.next();
        chars.next()
    }

    pub(super) fn peek_byte(&self) -> Option<u8> {
        self.source.as_bytes().get(self.pos).copied()
    }

    /// Consumes one character, keeping line and column current.
    pub(super) fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        match ch {
            '\n' | '\u{2028}' | '\u{2029}' => {
                self.line += 1;
                self.column = 0;
            }
            '\r' if self.peek_byte() != Some(b'\n') => {
                self.line += 1;
                self.column = 0;
            }
            _ => self.column += 1,
        }
        Some(ch)
    }

    pub(super) fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    pub(super) fn skip_trivia(&mut self) -> Result<()> {
        if self.pos == 0 && self.source.starts_with("#!") {
            self.skip_line_comment();
        }
        loop {
            match self.peek() {
                Some(ch) if is_whitespace(ch) => {
                    self.bump();
                }
                Some(ch) if is_line_terminator(ch) => {
                    self.newline_before = true;
                    self.bump();
                }
                Some('/') => match self.peek_next() {
                    Some('/') => self.skip_line_comment(),
                    Some('*') => self.skip_block_comment()?,
                    _ => break,
                },
                _ => break,
            }
        }
        Ok(())
    }

    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.peek() {
            if is_line_terminator(ch) {
                break;
            }
            self.bump();
        }
    }

    fn skip_block_comment(&mut self) -> Result<()> {
        let start = self.pos;
        self.bump();
        self.bump();
        loop {
            match self.bump() {
                None => return Err(self.error("Unterminated comment", start)),
                Some('*') if self.peek() == Some('/') => {
                    self.bump();
                    return Ok(());
                }
                Some(ch) if is_line_terminator(ch) => self.newline_before = true,
                Some(_) => {}
            }
        }
    }

    /// Scans an identifier or reserved word. `first` is the already consumed
    /// first character, or `None` when the word starts with an escape.
    fn scan_identifier(&mut self, first: Option<char>, start: usize) -> Result<TokenKind> {
        let mut word = String::new();
        match first {
            Some(ch) => word.push(ch),
            None => word.push(self.scan_identifier_escape(start, true)?),
        }
        self.scan_identifier_rest(&mut word)?;

        if let Some(keyword) = TokenKind::from_keyword(&word) {
            return Ok(keyword);
        }
        Ok(TokenKind::Identifier(word))
    }

    pub(super) fn scan_identifier_rest(&mut self, word: &mut String) -> Result<()> {
        loop {
            match self.peek() {
                Some('\\') => {
                    let at = self.pos;
                    self.bump();
                    word.push(self.scan_identifier_escape(at, false)?);
                }
                Some(ch) if is_id_continue(ch) => {
                    self.bump();
                    word.push(ch);
                }
                _ => return Ok(()),
            }
        }
    }

    /// Decodes `\uXXXX` or `\u{X}` inside an identifier. The backslash has
    /// already been consumed.
    fn scan_identifier_escape(&mut self, at: usize, is_start: bool) -> Result<char> {
        self.escaped = true;
        if !self.eat('u') {
            return Err(self.error("Expecting Unicode escape sequence \\uXXXX", at));
        }
        let code = self
            .scan_unicode_escape_body()
            .ok_or_else(|| self.error("Invalid Unicode escape sequence", at))?;
        let ch = char::from_u32(code).ok_or_else(|| self.error("Invalid Unicode escape sequence", at))?;
        let valid = if is_start { is_id_start(ch) } else { is_id_continue(ch) };
        if !valid {
            return Err(self.error("Invalid Unicode escape sequence", at));
        }
        Ok(ch)
    }

    fn scan_private_identifier(&mut self, start: usize) -> Result<TokenKind> {
        let mut word = String::new();
        match self.peek() {
            Some('\\') => {
                self.bump();
                word.push(self.scan_identifier_escape(start, true)?);
            }
            Some(ch) if is_id_start(ch) => {
                self.bump();
                word.push(ch);
            }
            _ => return Err(self.error("Unexpected character `#`", start)),
        }
        self.scan_identifier_rest(&mut word)?;
        Ok(TokenKind::PrivateIdentifier(word))
    }
}

impl Iterator for Scanner<'_> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let token = self.next_token();
        match &token {
            Ok(t) if t.kind == TokenKind::Eof => self.done = true,
            Err(_) => self.done = true,
            _ => {}
        }
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Scanner::new(source)
            .map(|t| t.unwrap().kind)
            .filter(|k| *k != TokenKind::Eof)
            .collect()
    }

    #[test]
    fn test_simple_tokens() {
        assert_eq!(
            kinds("{ } ( ) ;"),
            vec![
                TokenKind::LeftBrace,
                TokenKind::RightBrace,
                TokenKind::LeftParen,
                TokenKind::RightParen,
                TokenKind::Semicolon,
            ]
        );
    }

    #[test]
    fn test_keywords_and_contextual_words() {
        assert_eq!(
            kinds("let x = async"),
            vec![
                TokenKind::Identifier("let".into()),
                TokenKind::Identifier("x".into()),
                TokenKind::Equal,
                TokenKind::Identifier("async".into()),
            ]
        );
        assert_eq!(kinds("typeof null"), vec![TokenKind::Typeof, TokenKind::Null]);
    }

    #[test]
    fn test_identifier_escapes() {
        let mut scanner = Scanner::new("\\u0061b\\u{63}");
        let token = scanner.next_token().unwrap();
        assert_eq!(token.kind, TokenKind::Identifier("abc".into()));
        assert!(token.escaped);
        assert_eq!(token.span, Span::new(0, 13));
    }

    #[test]
    fn test_escaped_keyword_keeps_keyword_kind() {
        let token = Scanner::new("\\u0069f").next_token().unwrap();
        assert_eq!(token.kind, TokenKind::If);
        assert!(token.escaped);
    }

    #[test]
    fn test_invalid_identifier_escape() {
        let err = Scanner::new("a\\u0020").next_token().unwrap_err();
        assert_eq!(err.message, "Invalid Unicode escape sequence");
        assert_eq!(err.column, 1);
    }

    #[test]
    fn test_private_identifier() {
        assert_eq!(kinds("#foo"), vec![TokenKind::PrivateIdentifier("foo".into())]);
        assert!(Scanner::new("# foo").next_token().is_err());
    }

    #[test]
    fn test_newline_tracking() {
        let mut scanner = Scanner::new("a\n/* x */ b /*\n*/ c d");
        let a = scanner.next_token().unwrap();
        let b = scanner.next_token().unwrap();
        let c = scanner.next_token().unwrap();
        let d = scanner.next_token().unwrap();
        assert!(!a.newline_before);
        assert!(b.newline_before);
        assert!(c.newline_before);
        assert!(!d.newline_before);
        assert_eq!(b.start, Position::new(2, 8));
        assert_eq!(c.start, Position::new(3, 3));
    }

    #[test]
    fn test_iterated_token_positions() {
        let tokens: Vec<Token> = Scanner::new("ab = 1;\n  cd").map(|t| t.unwrap()).collect();
        let positions: Vec<_> = tokens.iter().map(|t| (t.start, t.end)).collect();
        assert_eq!(
            positions,
            [
                (Position::new(1, 0), Position::new(1, 2)),
                (Position::new(1, 3), Position::new(1, 4)),
                (Position::new(1, 5), Position::new(1, 6)),
                (Position::new(1, 6), Position::new(1, 7)),
                (Position::new(2, 2), Position::new(2, 4)),
                (Position::new(2, 4), Position::new(2, 4)),
            ]
        );
    }

    #[test]
    fn test_crlf_counts_once() {
        let mut scanner = Scanner::new("a\r\nb");
        scanner.next_token().unwrap();
        let b = scanner.next_token().unwrap();
        assert_eq!(b.start, Position::new(2, 0));
    }

    #[test]
    fn test_hashbang_skipped() {
        assert_eq!(kinds("#!/usr/bin/env node\nx"), vec![TokenKind::Identifier("x".into())]);
    }

    #[test]
    fn test_unterminated_comment() {
        let err = Scanner::new("a /* nope").nth(1).unwrap().unwrap_err();
        assert_eq!(err.message, "Unterminated comment");
        assert_eq!(err.column, 2);
    }

    #[test]
    fn test_checkpoint_restore() {
        let mut scanner = Scanner::new("a b c");
        scanner.next_token().unwrap();
        let saved = scanner.checkpoint();
        assert_eq!(scanner.next_token().unwrap().kind, TokenKind::Identifier("b".into()));
        scanner.restore(saved);
        assert_eq!(scanner.next_token().unwrap().kind, TokenKind::Identifier("b".into()));
    }

    #[test]
    fn test_relex_regex() {
        let mut scanner = Scanner::new("/a[/]b/gi");
        let slash = scanner.next_token().unwrap();
        assert_eq!(slash.kind, TokenKind::Slash);
        let regex = scanner.relex_as_regex(&slash).unwrap();
        assert_eq!(
            regex.kind,
            TokenKind::RegExp {
                pattern: "a[/]b".into(),
                flags: "gi".into()
            }
        );
        assert_eq!(regex.span, Span::new(0, 9));
    }

    #[test]
    fn test_unexpected_character() {
        let err = Scanner::new("a @").nth(1).unwrap().unwrap_err();
        assert_eq!(err.to_string(), "Unexpected character `@` at (1:2)");
    }
}
