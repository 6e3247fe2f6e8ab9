//! JSX scanning modes.
//!
//! Inside a tag (`<a b="c">`) names may contain `-`, reserved words are
//! plain names and attribute strings take entities instead of escapes.
//! Between tags everything up to the next `{` or `<` is a single text token.
//! The parser picks the mode; the regular `next_token` is used inside
//! `{...}` containers.

use super::chars::{is_id_continue, is_id_start};
use super::entities::decode_entities;
use super::{Scanner, Token, TokenKind};
use crate::error::Result;

impl Scanner<'_> {
    /// Returns the next token inside a JSX opening or closing tag.
    pub fn next_jsx_tag_token(&mut self) -> Result<Token> {
        self.newline_before = false;
        self.skip_trivia()?;
        self.begin_token();

        let start = self.pos;
        let start_pos = self.current_position();
        let Some(ch) = self.bump() else {
            return Ok(self.finish(TokenKind::Eof, start, start_pos));
        };

        let kind = match ch {
            '<' => TokenKind::LessThan,
            '>' => TokenKind::GreaterThan,
            '/' => TokenKind::Slash,
            '.' => TokenKind::Dot,
            ':' => TokenKind::Colon,
            '=' => TokenKind::Equal,
            '{' => TokenKind::LeftBrace,
            '}' => TokenKind::RightBrace,
            '"' | '\'' => self.scan_jsx_string(ch, start)?,
            _ if is_id_start(ch) => {
                let mut name = String::from(ch);
                while let Some(next) = self.peek().filter(|c| *c == '-' || is_id_continue(*c)) {
                    self.bump();
                    name.push(next);
                }
                TokenKind::Identifier(name)
            }
            _ => return Err(self.error(format!("Unexpected character `{ch}`"), start)),
        };
        Ok(self.finish(kind, start, start_pos))
    }

    /// Returns the next token between JSX tags: `{`, `<`, end of input or a
    /// run of text.
    pub fn next_jsx_child(&mut self) -> Result<Token> {
        self.newline_before = false;
        self.begin_token();

        let start = self.pos;
        let start_pos = self.current_position();
        let kind = match self.peek() {
            None => TokenKind::Eof,
            Some('{') => {
                self.bump();
                TokenKind::LeftBrace
            }
            Some('<') => {
                self.bump();
                TokenKind::LessThan
            }
            Some(_) => {
                while self.peek().is_some_and(|c| c != '{' && c != '<') {
                    self.bump();
                }
                TokenKind::JsxText(decode_entities(&self.source[start..self.pos]))
            }
        };
        Ok(self.finish(kind, start, start_pos))
    }

    fn scan_jsx_string(&mut self, quote: char, start: usize) -> Result<TokenKind> {
        let content_start = self.pos;
        loop {
            match self.bump() {
                None => return Err(self.error("Unterminated string constant", start)),
                Some(ch) if ch == quote => break,
                Some(_) => {}
            }
        }
        let content = &self.source[content_start..self.pos - quote.len_utf8()];
        Ok(TokenKind::String(decode_entities(content)))
    }
}

#[cfg(test)]
mod tests {
    use crate::lexer::{Scanner, TokenKind};

    #[test]
    fn test_tag_names_allow_dashes_and_keywords() {
        let mut scanner = Scanner::new("data-foo class");
        assert_eq!(
            scanner.next_jsx_tag_token().unwrap().kind,
            TokenKind::Identifier("data-foo".into())
        );
        assert_eq!(
            scanner.next_jsx_tag_token().unwrap().kind,
            TokenKind::Identifier("class".into())
        );
    }

    #[test]
    fn test_attribute_string_decodes_entities() {
        let mut scanner = Scanner::new("\"a &amp; \\n\nb\"");
        assert_eq!(
            scanner.next_jsx_tag_token().unwrap().kind,
            TokenKind::String("a & \\n\nb".into())
        );
    }

    #[test]
    fn test_tag_punctuators_are_single_characters() {
        let mut scanner = Scanner::new(">>/=");
        let kinds: Vec<_> = (0..4).map(|_| scanner.next_jsx_tag_token().unwrap().kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::GreaterThan,
                TokenKind::GreaterThan,
                TokenKind::Slash,
                TokenKind::Equal,
            ]
        );
    }

    #[test]
    fn test_child_text_runs_to_brace_or_tag() {
        let mut scanner = Scanner::new(" hi &gt; there {x}</a>");
        let text = scanner.next_jsx_child().unwrap();
        assert_eq!(text.kind, TokenKind::JsxText(" hi > there ".into()));
        assert_eq!(text.span.end, 15);
        assert_eq!(scanner.next_jsx_child().unwrap().kind, TokenKind::LeftBrace);
    }

    #[test]
    fn test_child_eof() {
        let mut scanner = Scanner::new("");
        assert_eq!(scanner.next_jsx_child().unwrap().kind, TokenKind::Eof);
    }
}
