//! Token definitions for the JavaScript lexer.

/// A line/column pair. Lines are 1-based, columns are 0-based and counted
/// in Unicode scalar values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    /// 1-based line number
    pub line: usize,
    /// 0-based column
    pub column: usize,
}

impl Position {
    /// Creates a new position.
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Start and end positions of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SourceLocation {
    /// Position of the first character
    pub start: Position,
    /// Position just past the last character
    pub end: Position,
}

/// A span in the source code, representing a range of bytes.
///
/// `loc` is only populated when the parser runs with location tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Start byte offset (inclusive)
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
    /// Optional line/column information
    pub loc: Option<SourceLocation>,
}

impl Span {
    /// Creates a new span without location information.
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            loc: None,
        }
    }

    /// Returns the length of this span in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns true if this span is empty.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns true if `other` lies entirely within this span.
    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// The span in the source code
    pub span: Span,
    /// Position of the first character
    pub start: Position,
    /// Position just past the last character
    pub end: Position,
    /// A line terminator appeared between the previous token and this one
    pub newline_before: bool,
    /// The token text contained a Unicode escape
    pub escaped: bool,
    /// Offset of a legacy octal literal or escape inside this token
    pub octal_at: Option<usize>,
}

impl Token {
    /// Creates a new token with no trivia flags set.
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self {
            kind,
            span,
            start: Position::default(),
            end: Position::default(),
            newline_before: false,
            escaped: false,
            octal_at: None,
        }
    }

    /// Returns true if this token is the identifier `name` written without
    /// escapes.
    pub fn is_contextual(&self, name: &str) -> bool {
        !self.escaped && matches!(&self.kind, TokenKind::Identifier(n) if n == name)
    }

    /// Returns the identifier name, if this is an identifier.
    pub fn identifier(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Identifier(name) => Some(name),
            _ => None,
        }
    }
}

/// The different kinds of tokens in JavaScript.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    /// Numeric literal (integer or floating point)
    Number(f64),
    /// BigInt literal, as a base-10 digit string
    BigInt(String),
    /// String literal with escapes decoded
    String(String),
    /// Template chunk, from a backquote or `}` up to `${` or a backquote
    Template {
        /// Decoded value, `None` when an escape was invalid
        cooked: Option<String>,
        /// Raw text with line endings normalized to `\n`
        raw: String,
        /// The chunk ends with a backquote
        tail: bool,
        /// Offset and message of the first invalid escape
        invalid_escape: Option<(usize, &'static str)>,
    },
    /// Regular expression literal
    RegExp {
        /// Body between the slashes
        pattern: String,
        /// Flag characters
        flags: String,
    },
    /// JSX text child with entities decoded
    JsxText(String),
    /// Boolean true
    True,
    /// Boolean false
    False,
    /// null
    Null,

    // Identifiers and Keywords
    /// Identifier, including contextual keywords such as `async` or `let`
    Identifier(String),
    /// Private identifier (#name)
    PrivateIdentifier(String),

    // Reserved words
    /// `break`
    Break,
    /// `case`
    Case,
    /// `catch`
    Catch,
    /// `class`
    Class,
    /// `const`
    Const,
    /// `continue`
    Continue,
    /// `debugger`
    Debugger,
    /// `default`
    Default,
    /// `delete`
    Delete,
    /// `do`
    Do,
    /// `else`
    Else,
    /// `enum`
    Enum,
    /// `export`
    Export,
    /// `extends`
    Extends,
    /// `finally`
    Finally,
    /// `for`
    For,
    /// `function`
    Function,
    /// `if`
    If,
    /// `import`
    Import,
    /// `in`
    In,
    /// `instanceof`
    Instanceof,
    /// `new`
    New,
    /// `return`
    Return,
    /// `super`
    Super,
    /// `switch`
    Switch,
    /// `this`
    This,
    /// `throw`
    Throw,
    /// `try`
    Try,
    /// `typeof`
    Typeof,
    /// `var`
    Var,
    /// `void`
    Void,
    /// `while`
    While,
    /// `with`
    With,

    // Punctuation
    /// {
    LeftBrace,
    /// }
    RightBrace,
    /// (
    LeftParen,
    /// )
    RightParen,
    /// [
    LeftBracket,
    /// ]
    RightBracket,
    /// .
    Dot,
    /// ...
    Ellipsis,
    /// ;
    Semicolon,
    /// ,
    Comma,
    /// <
    LessThan,
    /// >
    GreaterThan,
    /// <=
    LessThanEqual,
    /// >=
    GreaterThanEqual,
    /// ==
    EqualEqual,
    /// !=
    NotEqual,
    /// ===
    StrictEqual,
    /// !==
    StrictNotEqual,
    /// +
    Plus,
    /// -
    Minus,
    /// *
    Star,
    /// /
    Slash,
    /// %
    Percent,
    /// **
    StarStar,
    /// ++
    PlusPlus,
    /// --
    MinusMinus,
    /// <<
    LeftShift,
    /// >>
    RightShift,
    /// >>>
    UnsignedRightShift,
    /// &
    Ampersand,
    /// |
    Pipe,
    /// ^
    Caret,
    /// !
    Bang,
    /// ~
    Tilde,
    /// &&
    AmpersandAmpersand,
    /// ||
    PipePipe,
    /// ??
    QuestionQuestion,
    /// ?
    Question,
    /// ?.
    QuestionDot,
    /// :
    Colon,
    /// =
    Equal,
    /// +=
    PlusEqual,
    /// -=
    MinusEqual,
    /// *=
    StarEqual,
    /// /=
    SlashEqual,
    /// %=
    PercentEqual,
    /// **=
    StarStarEqual,
    /// <<=
    LeftShiftEqual,
    /// >>=
    RightShiftEqual,
    /// >>>=
    UnsignedRightShiftEqual,
    /// &=
    AmpersandEqual,
    /// |=
    PipeEqual,
    /// ^=
    CaretEqual,
    /// &&=
    AmpersandAmpersandEqual,
    /// ||=
    PipePipeEqual,
    /// ??=
    QuestionQuestionEqual,
    /// =>
    Arrow,

    // Special
    /// End of file
    Eof,
}

impl TokenKind {
    /// Returns true if this token is a reserved word.
    pub fn is_keyword(&self) -> bool {
        self.keyword_text().is_some()
    }

    /// Returns the source spelling of a reserved word or word-like literal.
    pub fn keyword_text(&self) -> Option<&'static str> {
        Some(match self {
            TokenKind::Break => "break",
            TokenKind::Case => "case",
            TokenKind::Catch => "catch",
            TokenKind::Class => "class",
            TokenKind::Const => "const",
            TokenKind::Continue => "continue",
            TokenKind::Debugger => "debugger",
            TokenKind::Default => "default",
            TokenKind::Delete => "delete",
            TokenKind::Do => "do",
            TokenKind::Else => "else",
            TokenKind::Enum => "enum",
            TokenKind::Export => "export",
            TokenKind::Extends => "extends",
            TokenKind::Finally => "finally",
            TokenKind::For => "for",
            TokenKind::Function => "function",
            TokenKind::If => "if",
            TokenKind::Import => "import",
            TokenKind::In => "in",
            TokenKind::Instanceof => "instanceof",
            TokenKind::New => "new",
            TokenKind::Return => "return",
            TokenKind::Super => "super",
            TokenKind::Switch => "switch",
            TokenKind::This => "this",
            TokenKind::Throw => "throw",
            TokenKind::Try => "try",
            TokenKind::Typeof => "typeof",
            TokenKind::Var => "var",
            TokenKind::Void => "void",
            TokenKind::While => "while",
            TokenKind::With => "with",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::Null => "null",
            _ => return None,
        })
    }

    /// Maps a word to its reserved-word token kind.
    pub fn from_keyword(word: &str) -> Option<TokenKind> {
        Some(match word {
            "break" => TokenKind::Break,
            "case" => TokenKind::Case,
            "catch" => TokenKind::Catch,
            "class" => TokenKind::Class,
            "const" => TokenKind::Const,
            "continue" => TokenKind::Continue,
            "debugger" => TokenKind::Debugger,
            "default" => TokenKind::Default,
            "delete" => TokenKind::Delete,
            "do" => TokenKind::Do,
            "else" => TokenKind::Else,
            "enum" => TokenKind::Enum,
            "export" => TokenKind::Export,
            "extends" => TokenKind::Extends,
            "finally" => TokenKind::Finally,
            "for" => TokenKind::For,
            "function" => TokenKind::Function,
            "if" => TokenKind::If,
            "import" => TokenKind::Import,
            "in" => TokenKind::In,
            "instanceof" => TokenKind::Instanceof,
            "new" => TokenKind::New,
            "return" => TokenKind::Return,
            "super" => TokenKind::Super,
            "switch" => TokenKind::Switch,
            "this" => TokenKind::This,
            "throw" => TokenKind::Throw,
            "try" => TokenKind::Try,
            "typeof" => TokenKind::Typeof,
            "var" => TokenKind::Var,
            "void" => TokenKind::Void,
            "while" => TokenKind::While,
            "with" => TokenKind::With,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "null" => TokenKind::Null,
            _ => return None,
        })
    }

    /// Returns true if this token is a literal.
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            TokenKind::Number(_)
                | TokenKind::BigInt(_)
                | TokenKind::String(_)
                | TokenKind::Template { .. }
                | TokenKind::RegExp { .. }
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Null
        )
    }

    /// Returns true for `=` and every compound assignment operator.
    pub fn is_assign(&self) -> bool {
        matches!(
            self,
            TokenKind::Equal
                | TokenKind::PlusEqual
                | TokenKind::MinusEqual
                | TokenKind::StarEqual
                | TokenKind::SlashEqual
                | TokenKind::PercentEqual
                | TokenKind::StarStarEqual
                | TokenKind::LeftShiftEqual
                | TokenKind::RightShiftEqual
                | TokenKind::UnsignedRightShiftEqual
                | TokenKind::AmpersandEqual
                | TokenKind::PipeEqual
                | TokenKind::CaretEqual
                | TokenKind::AmpersandAmpersandEqual
                | TokenKind::PipePipeEqual
                | TokenKind::QuestionQuestionEqual
        )
    }

    /// Returns true if the token starts a loop statement.
    pub fn is_loop(&self) -> bool {
        matches!(self, TokenKind::Do | TokenKind::For | TokenKind::While)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_new() {
        let span = Span::new(0, 10);
        assert_eq!(span.start, 0);
        assert_eq!(span.end, 10);
        assert!(span.loc.is_none());
    }

    #[test]
    fn test_span_len_and_empty() {
        assert_eq!(Span::new(5, 15).len(), 10);
        assert!(Span::new(5, 5).is_empty());
        assert!(!Span::new(5, 10).is_empty());
    }

    #[test]
    fn test_span_contains() {
        let outer = Span::new(0, 10);
        assert!(outer.contains(&Span::new(0, 10)));
        assert!(outer.contains(&Span::new(3, 4)));
        assert!(!outer.contains(&Span::new(3, 11)));
    }

    #[test]
    fn test_keyword_round_trip() {
        for word in ["break", "typeof", "instanceof", "null", "enum"] {
            let kind = TokenKind::from_keyword(word).unwrap();
            assert_eq!(kind.keyword_text(), Some(word));
        }
        assert_eq!(TokenKind::from_keyword("async"), None);
        assert_eq!(TokenKind::from_keyword("let"), None);
    }

    #[test]
    fn test_contextual_requires_unescaped() {
        let mut token = Token::new(TokenKind::Identifier("async".into()), Span::new(0, 5));
        assert!(token.is_contextual("async"));
        token.escaped = true;
        assert!(!token.is_contextual("async"));
    }

    #[test]
    fn test_assign_classification() {
        assert!(TokenKind::Equal.is_assign());
        assert!(TokenKind::QuestionQuestionEqual.is_assign());
        assert!(!TokenKind::EqualEqual.is_assign());
        assert!(!TokenKind::Arrow.is_assign());
    }
}
