//! Number, string, template and regular expression literals.
//!
//! ## Numbers
//!
//! - Decimal: `42`, `3.14`, `.5`, `1e10`, `1_000`
//! - Radix: `0xFF`, `0o17`, `0b1010`
//! - Legacy: `017` (octal) and `089` (decimal), both rejected in strict code
//! - BigInt: `10n`, `0xFFn`
//!
//! Radix and BigInt magnitudes go through `num-bigint`, so literals wider
//! than 64 bits keep every digit until the final conversion.
//!
//! ## Strings and templates
//!
//! Escapes are decoded into the token value. Surrogate pairs written as two
//! `\u` escapes combine into one scalar; an unpaired surrogate decodes to
//! U+FFFD. Template chunks keep their raw text and, when an escape is
//! invalid, report it instead of failing so tagged templates can accept it.

use num_bigint::BigUint;
use num_traits::ToPrimitive;

use super::chars::{hex_value, is_digit_in, is_id_start, is_line_terminator};
use super::{Scanner, TokenKind};
use crate::error::Result;
use crate::features::Features;

/// The result of decoding one escape sequence.
enum Escape {
    /// A UTF-16 code unit or full code point
    Code(u32),
    /// A plain character
    Char(char),
    /// A line continuation, contributing nothing
    Continuation,
}

/// Accumulates decoded text, pairing surrogate halves.
#[derive(Default)]
struct Cooked {
    out: String,
    high: Option<u32>,
}

impl Cooked {
    fn push(&mut self, ch: char) {
        self.flush();
        self.out.push(ch);
    }

    fn push_code(&mut self, code: u32) {
        match code {
            0xD800..=0xDBFF => {
                self.flush();
                self.high = Some(code);
            }
            0xDC00..=0xDFFF => match self.high.take() {
                Some(high) => {
                    let scalar = 0x10000 + ((high - 0xD800) << 10) + (code - 0xDC00);
                    self.out.push(char::from_u32(scalar).unwrap_or(char::REPLACEMENT_CHARACTER));
                }
                None => self.out.push(char::REPLACEMENT_CHARACTER),
            },
            _ => {
                self.flush();
                self.out.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
            }
        }
    }

    fn flush(&mut self) {
        if self.high.take().is_some() {
            self.out.push(char::REPLACEMENT_CHARACTER);
        }
    }

    fn finish(mut self) -> String {
        self.flush();
        self.out
    }
}

impl Scanner<'_> {
    /// Scans a numeric literal whose first character (a digit or `.`) has
    /// already been consumed.
    pub(super) fn scan_number(&mut self, first: char, start: usize) -> Result<TokenKind> {
        if first == '0' {
            let radix = match self.peek() {
                Some('x' | 'X') => Some(16),
                Some('o' | 'O') => Some(8),
                Some('b' | 'B') => Some(2),
                _ => None,
            };
            if let Some(radix) = radix {
                self.bump();
                return self.scan_radix_number(radix, start);
            }
            if self.peek().is_some_and(|c| c.is_ascii_digit() || c == '_') {
                return self.scan_legacy_number(start);
            }
        }

        let separators = self.features.contains(Features::NUM_SEP);
        let mut integer = String::new();
        let mut fraction = None;
        if first == '.' {
            let mut digits = String::new();
            self.scan_digits(&mut digits, 10, separators, false)?;
            fraction = Some(digits);
        } else {
            integer.push(first);
            self.scan_digits(&mut integer, 10, separators, true)?;
            if self.eat('.') {
                let mut digits = String::new();
                self.scan_digits(&mut digits, 10, separators, false)?;
                fraction = Some(digits);
            }
        }
        let exponent = self.scan_exponent(separators)?;

        if fraction.is_none() && exponent.is_none() && self.peek() == Some('n') {
            if let Some(kind) = self.scan_bigint_suffix(&integer, 10)? {
                return Ok(kind);
            }
        }
        self.check_after_number()?;

        let text = format!(
            "{}.{}e{}",
            if integer.is_empty() { "0" } else { &integer },
            fraction.as_deref().filter(|f| !f.is_empty()).unwrap_or("0"),
            exponent.as_deref().unwrap_or("0"),
        );
        let value = text
            .parse::<f64>()
            .map_err(|_| self.error("Invalid number", start))?;
        Ok(TokenKind::Number(value))
    }

    fn scan_radix_number(&mut self, radix: u32, start: usize) -> Result<TokenKind> {
        let separators = self.features.contains(Features::NUM_SEP);
        let mut digits = String::new();
        self.scan_digits(&mut digits, radix, separators, false)?;
        if digits.is_empty() {
            return Err(self.error(format!("Expected number in radix {radix}"), start));
        }
        if self.peek() == Some('n') {
            if let Some(kind) = self.scan_bigint_suffix(&digits, radix)? {
                return Ok(kind);
            }
        }
        self.check_after_number()?;
        Ok(TokenKind::Number(radix_value(&digits, radix)))
    }

    /// `0` followed by more digits: legacy octal (`017`) or, when an 8 or 9
    /// appears, a legacy decimal (`089`, `08.5`).
    fn scan_legacy_number(&mut self, start: usize) -> Result<TokenKind> {
        let mut digits = String::from("0");
        self.scan_digits(&mut digits, 10, false, true)?;
        if self.peek() == Some('_') {
            return Err(self.error(
                "Numeric separator is not allowed in legacy octal-like literals",
                self.pos,
            ));
        }
        self.octal_at = Some(start);

        if digits.chars().all(|c| is_digit_in(c, 8)) {
            self.check_after_number()?;
            return Ok(TokenKind::Number(radix_value(&digits, 8)));
        }

        let mut fraction = String::new();
        if self.eat('.') {
            self.scan_digits(&mut fraction, 10, false, false)?;
        }
        let exponent = self.scan_exponent(false)?;
        self.check_after_number()?;
        let text = format!(
            "{digits}.{}e{}",
            if fraction.is_empty() { "0" } else { &fraction },
            exponent.as_deref().unwrap_or("0"),
        );
        let value = text
            .parse::<f64>()
            .map_err(|_| self.error("Invalid number", start))?;
        Ok(TokenKind::Number(value))
    }

    fn scan_exponent(&mut self, separators: bool) -> Result<Option<String>> {
        if !matches!(self.peek(), Some('e' | 'E')) {
            return Ok(None);
        }
        let marker = self.pos;
        self.bump();
        let mut exponent = String::new();
        if let Some(sign @ ('+' | '-')) = self.peek() {
            self.bump();
            exponent.push(sign);
        }
        let before = exponent.len();
        self.scan_digits(&mut exponent, 10, separators, false)?;
        if exponent.len() == before {
            return Err(self.error("Invalid number", marker));
        }
        Ok(Some(exponent))
    }

    /// Consumes a trailing `n`. Returns `None` when BigInt literals are
    /// disabled so the `n` is reported as an identifier after the number.
    fn scan_bigint_suffix(&mut self, digits: &str, radix: u32) -> Result<Option<TokenKind>> {
        if !self.features.contains(Features::BIGINT) {
            return Ok(None);
        }
        self.bump();
        self.check_after_number()?;
        let magnitude = BigUint::parse_bytes(digits.as_bytes(), radix)
            .map(|n| n.to_str_radix(10))
            .unwrap_or_else(|| "0".to_string());
        Ok(Some(TokenKind::BigInt(magnitude)))
    }

    /// Appends digits of `radix` to `out`, validating `_` separators.
    /// `after_digit` is true when a digit directly precedes the run.
    fn scan_digits(&mut self, out: &mut String, radix: u32, separators: bool, after_digit: bool) -> Result<()> {
        let mut last_was_digit = after_digit;
        let mut pending_separator = None;
        loop {
            match self.peek() {
                Some('_') if separators => {
                    let at = self.pos;
                    if pending_separator.is_some() {
                        return Err(self.error("Numeric separator must be exactly one underscore", at));
                    }
                    if !last_was_digit {
                        return Err(self.error("Numeric separator is not allowed at the first of digits", at));
                    }
                    self.bump();
                    pending_separator = Some(at);
                    last_was_digit = false;
                }
                Some(ch) if is_digit_in(ch, radix) => {
                    self.bump();
                    out.push(ch);
                    last_was_digit = true;
                    pending_separator = None;
                }
                _ => break,
            }
        }
        if let Some(at) = pending_separator {
            return Err(self.error("Numeric separator is not allowed at the last of digits", at));
        }
        Ok(())
    }

    fn check_after_number(&self) -> Result<()> {
        match self.peek() {
            Some(ch) if is_id_start(ch) || ch.is_ascii_digit() || ch == '\\' => {
                Err(self.error("Identifier directly after number", self.pos))
            }
            _ => Ok(()),
        }
    }

    /// Reads the body of `\u` after the `u`: four hex digits or a braced
    /// code point up to U+10FFFF.
    pub(super) fn scan_unicode_escape_body(&mut self) -> Option<u32> {
        if self.eat('{') {
            let mut code: u32 = 0;
            let mut count = 0;
            while let Some(value) = self.peek().and_then(hex_value) {
                self.bump();
                code = code.checked_mul(16)?.checked_add(value)?;
                count += 1;
                if code > 0x10FFFF {
                    return None;
                }
            }
            if count == 0 || !self.eat('}') {
                return None;
            }
            Some(code)
        } else {
            let mut code = 0;
            for _ in 0..4 {
                let value = self.peek().and_then(hex_value)?;
                self.bump();
                code = code * 16 + value;
            }
            Some(code)
        }
    }

    /// Decodes one escape after its backslash. Errors carry the offset of
    /// the backslash.
    fn scan_escape(&mut self, in_template: bool) -> std::result::Result<Escape, (usize, &'static str)> {
        let at = self.pos - 1;
        let Some(ch) = self.bump() else {
            return Ok(Escape::Continuation);
        };
        Ok(match ch {
            'n' => Escape::Char('\n'),
            't' => Escape::Char('\t'),
            'r' => Escape::Char('\r'),
            'b' => Escape::Char('\u{8}'),
            'f' => Escape::Char('\u{C}'),
            'v' => Escape::Char('\u{B}'),
            '\r' => {
                self.eat('\n');
                Escape::Continuation
            }
            '\n' | '\u{2028}' | '\u{2029}' => Escape::Continuation,
            'x' => {
                let high = self.peek().and_then(hex_value);
                let low = self.peek_next().and_then(hex_value);
                match (high, low) {
                    (Some(high), Some(low)) => {
                        self.bump();
                        self.bump();
                        Escape::Code(high * 16 + low)
                    }
                    _ => return Err((at, "Invalid hexadecimal escape sequence")),
                }
            }
            'u' => match self.scan_unicode_escape_body() {
                Some(code) => Escape::Code(code),
                None => return Err((at, "Invalid Unicode escape sequence")),
            },
            '0' if !self.peek().is_some_and(|c| c.is_ascii_digit()) => Escape::Char('\0'),
            '0'..='7' => {
                if in_template {
                    return Err((at, "Octal literal in template string"));
                }
                let mut value = ch as u32 - '0' as u32;
                let max_digits = if ch <= '3' { 3 } else { 2 };
                for _ in 1..max_digits {
                    match self.peek() {
                        Some(next) if is_digit_in(next, 8) => {
                            self.bump();
                            value = value * 8 + (next as u32 - '0' as u32);
                        }
                        _ => break,
                    }
                }
                self.octal_at.get_or_insert(at);
                Escape::Code(value)
            }
            '8' | '9' => {
                if in_template {
                    return Err((at, "Invalid escape sequence in template string"));
                }
                self.octal_at.get_or_insert(at);
                Escape::Char(ch)
            }
            other => Escape::Char(other),
        })
    }

    /// Scans a string literal whose opening quote has been consumed.
    pub(super) fn scan_string(&mut self, quote: char, start: usize) -> Result<TokenKind> {
        let mut cooked = Cooked::default();
        loop {
            match self.peek() {
                None | Some('\n' | '\r') => return Err(self.error("Unterminated string constant", start)),
                Some(ch) if ch == quote => {
                    self.bump();
                    return Ok(TokenKind::String(cooked.finish()));
                }
                Some('\\') => {
                    self.bump();
                    match self.scan_escape(false) {
                        Ok(Escape::Code(code)) => cooked.push_code(code),
                        Ok(Escape::Char(ch)) => cooked.push(ch),
                        Ok(Escape::Continuation) => {}
                        Err((at, message)) => return Err(self.error(message, at)),
                    }
                }
                Some('\u{2028}' | '\u{2029}') if !self.features.contains(Features::JSON_SUPER_SET) => {
                    return Err(self.error("Unterminated string constant", start));
                }
                Some(ch) => {
                    self.bump();
                    cooked.push(ch);
                }
            }
        }
    }

    /// Scans a template chunk. The opening backquote or `}` has been
    /// consumed; the chunk runs to `${` or the closing backquote.
    pub(super) fn scan_template_chunk(&mut self, start: usize) -> Result<TokenKind> {
        let content_start = self.pos;
        let mut cooked = Some(Cooked::default());
        let mut invalid_escape = None;
        let (content_end, tail) = loop {
            match self.peek() {
                None => return Err(self.error("Unterminated template", start)),
                Some('`') => {
                    let end = self.pos;
                    self.bump();
                    break (end, true);
                }
                Some('$') if self.peek_next() == Some('{') => {
                    let end = self.pos;
                    self.bump();
                    self.bump();
                    break (end, false);
                }
                Some('\\') => {
                    self.bump();
                    match self.scan_escape(true) {
                        Ok(escape) => {
                            if let Some(cooked) = cooked.as_mut() {
                                match escape {
                                    Escape::Code(code) => cooked.push_code(code),
                                    Escape::Char(ch) => cooked.push(ch),
                                    Escape::Continuation => {}
                                }
                            }
                        }
                        Err(invalid) => {
                            invalid_escape.get_or_insert(invalid);
                            cooked = None;
                        }
                    }
                }
                Some('\r') => {
                    self.bump();
                    self.eat('\n');
                    if let Some(cooked) = cooked.as_mut() {
                        cooked.push('\n');
                    }
                }
                Some(ch) => {
                    self.bump();
                    if let Some(cooked) = cooked.as_mut() {
                        cooked.push(ch);
                    }
                }
            }
        };
        let raw = normalize_line_endings(&self.source[content_start..content_end]);
        Ok(TokenKind::Template {
            cooked: cooked.map(Cooked::finish),
            raw,
            tail,
            invalid_escape,
        })
    }

    /// Scans a regular expression body and flags. The opening `/` has been
    /// consumed. The pattern itself is not validated.
    pub(super) fn scan_regex(&mut self, start: usize) -> Result<TokenKind> {
        let mut in_class = false;
        loop {
            let Some(ch) = self.peek().filter(|c| !is_line_terminator(*c)) else {
                return Err(self.error("Unterminated regular expression", start));
            };
            self.bump();
            match ch {
                '\\' => match self.peek() {
                    Some(next) if !is_line_terminator(next) => {
                        self.bump();
                    }
                    _ => return Err(self.error("Unterminated regular expression", start)),
                },
                '[' => in_class = true,
                ']' if in_class => in_class = false,
                '/' if !in_class => break,
                _ => {}
            }
        }
        let pattern = self.source[start + 1..self.pos - 1].to_string();

        let flags_start = self.pos;
        let mut flags = String::new();
        self.scan_identifier_rest(&mut flags)?;
        if self.escaped || !valid_regex_flags(&flags) {
            return Err(self.error("Invalid regular expression flags", flags_start));
        }
        Ok(TokenKind::RegExp { pattern, flags })
    }
}

fn radix_value(digits: &str, radix: u32) -> f64 {
    BigUint::parse_bytes(digits.as_bytes(), radix)
        .and_then(|n| n.to_f64())
        .unwrap_or(f64::INFINITY)
}

fn valid_regex_flags(flags: &str) -> bool {
    let mut seen = String::new();
    for flag in flags.chars() {
        if !"dgimsuyv".contains(flag) || seen.contains(flag) {
            return false;
        }
        seen.push(flag);
    }
    !(seen.contains('u') && seen.contains('v'))
}

/// Converts `\r\n` and lone `\r` to `\n`.
pub fn normalize_line_endings(text: &str) -> String {
    if !text.contains('\r') {
        return text.to_string();
    }
    text.replace("\r\n", "\n").replace('\r', "\n")
}
