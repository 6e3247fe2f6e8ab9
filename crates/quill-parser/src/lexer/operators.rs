//! Punctuator scanning.
//!
//! Operators are matched greedily (`>>>=` before `>>>` before `>>`), except
//! for `?.`, which is only a punctuator when not followed by a digit so that
//! `a?.5:b` still reads as a conditional.

use super::{Scanner, TokenKind};
use crate::error::Result;

impl Scanner<'_> {
    pub(super) fn scan_dot(&mut self, start: usize) -> Result<TokenKind> {
        match self.peek() {
            Some('.') if self.peek_next() == Some('.') => {
                self.bump();
                self.bump();
                Ok(TokenKind::Ellipsis)
            }
            Some(ch) if ch.is_ascii_digit() => self.scan_number('.', start),
            _ => Ok(TokenKind::Dot),
        }
    }

    pub(super) fn scan_plus(&mut self) -> TokenKind {
        if self.eat('+') {
            TokenKind::PlusPlus
        } else if self.eat('=') {
            TokenKind::PlusEqual
        } else {
            TokenKind::Plus
        }
    }

    pub(super) fn scan_minus(&mut self) -> TokenKind {
        if self.eat('-') {
            TokenKind::MinusMinus
        } else if self.eat('=') {
            TokenKind::MinusEqual
        } else {
            TokenKind::Minus
        }
    }

    pub(super) fn scan_star(&mut self) -> TokenKind {
        if self.eat('*') {
            if self.eat('=') {
                TokenKind::StarStarEqual
            } else {
                TokenKind::StarStar
            }
        } else if self.eat('=') {
            TokenKind::StarEqual
        } else {
            TokenKind::Star
        }
    }

    pub(super) fn scan_slash(&mut self) -> TokenKind {
        if self.eat('=') {
            TokenKind::SlashEqual
        } else {
            TokenKind::Slash
        }
    }

    pub(super) fn scan_percent(&mut self) -> TokenKind {
        if self.eat('=') {
            TokenKind::PercentEqual
        } else {
            TokenKind::Percent
        }
    }

    pub(super) fn scan_less_than(&mut self) -> TokenKind {
        if self.eat('<') {
            if self.eat('=') {
                TokenKind::LeftShiftEqual
            } else {
                TokenKind::LeftShift
            }
        } else if self.eat('=') {
            TokenKind::LessThanEqual
        } else {
            TokenKind::LessThan
        }
    }

    pub(super) fn scan_greater_than(&mut self) -> TokenKind {
        if self.eat('>') {
            if self.eat('>') {
                if self.eat('=') {
                    TokenKind::UnsignedRightShiftEqual
                } else {
                    TokenKind::UnsignedRightShift
                }
            } else if self.eat('=') {
                TokenKind::RightShiftEqual
            } else {
                TokenKind::RightShift
            }
        } else if self.eat('=') {
            TokenKind::GreaterThanEqual
        } else {
            TokenKind::GreaterThan
        }
    }

    pub(super) fn scan_equal(&mut self) -> TokenKind {
        if self.eat('=') {
            if self.eat('=') {
                TokenKind::StrictEqual
            } else {
                TokenKind::EqualEqual
            }
        } else if self.eat('>') {
            TokenKind::Arrow
        } else {
            TokenKind::Equal
        }
    }

    pub(super) fn scan_bang(&mut self) -> TokenKind {
        if self.eat('=') {
            if self.eat('=') {
                TokenKind::StrictNotEqual
            } else {
                TokenKind::NotEqual
            }
        } else {
            TokenKind::Bang
        }
    }

    pub(super) fn scan_ampersand(&mut self) -> TokenKind {
        if self.eat('&') {
            if self.eat('=') {
                TokenKind::AmpersandAmpersandEqual
            } else {
                TokenKind::AmpersandAmpersand
            }
        } else if self.eat('=') {
            TokenKind::AmpersandEqual
        } else {
            TokenKind::Ampersand
        }
    }

    pub(super) fn scan_pipe(&mut self) -> TokenKind {
        if self.eat('|') {
            if self.eat('=') {
                TokenKind::PipePipeEqual
            } else {
                TokenKind::PipePipe
            }
        } else if self.eat('=') {
            TokenKind::PipeEqual
        } else {
            TokenKind::Pipe
        }
    }

    pub(super) fn scan_caret(&mut self) -> TokenKind {
        if self.eat('=') {
            TokenKind::CaretEqual
        } else {
            TokenKind::Caret
        }
    }

    pub(super) fn scan_question(&mut self) -> TokenKind {
        if self.eat('?') {
            if self.eat('=') {
                TokenKind::QuestionQuestionEqual
            } else {
                TokenKind::QuestionQuestion
            }
        } else if self.peek() == Some('.') && !self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
            TokenKind::QuestionDot
        } else {
            TokenKind::Question
        }
    }
}
