//! Token types for the snippet lexer.
//!
//! Defines [`TokenKind`] covering every lexeme of the supported JavaScript
//! subset and [`Token`], which pairs a kind with a source [`Span`] and
//! records whether a line break preceded it (needed for automatic
//! semicolon insertion).

use snippet_types::Span;
use std::fmt;

/// Keywords the parser understands.
pub const ALL_KEYWORDS: &[&str] = &[
    // Declarations (4)
    "var", "let", "const", "function",
    // Control flow (16)
    "if", "else", "while", "do", "for", "break", "continue", "return",
    "throw", "try", "catch", "finally", "switch", "case", "default", "new",
    // Operators (5)
    "typeof", "void", "delete", "in", "instanceof",
    // Literals (4)
    "true", "false", "null", "this",
];

/// Reserved words of the full language that this subset rejects.
pub const RESERVED_WORDS: &[&str] = &[
    "class", "extends", "super", "yield", "await", "import", "export", "with",
    "debugger", "enum",
];

// ─────────────────────────────────────────────────────────────────────
// Token
// ─────────────────────────────────────────────────────────────────────

/// A single token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// What kind of token this is.
    pub kind: TokenKind,
    /// Source location.
    pub span: Span,
    /// A line terminator appeared between the previous token and this one.
    pub newline_before: bool,
}

impl Token {
    /// Create a new token.
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self {
            kind,
            span,
            newline_before: false,
        }
    }

    /// Returns `true` if this token is a keyword.
    pub fn is_keyword(&self) -> bool {
        self.kind.is_keyword()
    }
}

// ─────────────────────────────────────────────────────────────────────
// TokenKind
// ─────────────────────────────────────────────────────────────────────

/// Every token kind in the snippet language.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // ── Literals ──────────────────────────────────────────────

    /// Numeric literal: `42`, `3.14`, `0xff`, `1e3`
    Number(f64),
    /// BigInt literal without the `n` suffix: `123n` → `"123"`, `0xffn` → `"0xff"`
    BigInt(String),
    /// Quoted string literal: `'hi'`, `"hi"`
    String(String),

    // ── Template Literals ────────────────────────────────────

    /// A template with no substitutions: `` `plain` ``
    Template(String),
    /// Text before the first `${` of a template.
    TemplateStart(String),
    /// Text between a `}` and the next `${`.
    TemplatePart(String),
    /// Text after the last `}` up to the closing backtick.
    TemplateEnd(String),
    /// The `${` that opens a substitution.
    InterpolationStart,
    /// The `}` that closes a substitution.
    InterpolationEnd,

    // ── Identifiers ──────────────────────────────────────────

    /// User-defined identifier: `myVar`, `$el`, `_tmp`
    Identifier(String),
    /// A reserved word this subset does not support: `class`, `await`, ...
    Reserved(String),

    // ── Keywords ─────────────────────────────────────────────

    Var,
    Let,
    Const,
    Function,
    If,
    Else,
    While,
    Do,
    For,
    Break,
    Continue,
    Return,
    Throw,
    Try,
    Catch,
    Finally,
    Switch,
    Case,
    Default,
    New,
    Typeof,
    Void,
    Delete,
    In,
    Instanceof,
    True,
    False,
    Null,
    This,

    // ── Operators ────────────────────────────────────────────

    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `**`
    StarStar,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `++`
    PlusPlus,
    /// `--`
    MinusMinus,
    /// `!`
    Bang,
    /// `=`
    Eq,
    /// `==`
    EqEq,
    /// `===`
    EqEqEq,
    /// `!=`
    BangEq,
    /// `!==`
    BangEqEq,
    /// `<`
    Less,
    /// `>`
    Greater,
    /// `<=`
    LessEq,
    /// `>=`
    GreaterEq,
    /// `&&`
    AmpAmp,
    /// `||`
    PipePipe,
    /// `??`
    QuestionQuestion,
    /// `+=`
    PlusEq,
    /// `-=`
    MinusEq,
    /// `*=`
    StarEq,
    /// `**=`
    StarStarEq,
    /// `/=`
    SlashEq,
    /// `%=`
    PercentEq,
    /// `&&=`
    AmpAmpEq,
    /// `||=`
    PipePipeEq,
    /// `??=`
    QuestionQuestionEq,
    /// `=>`
    Arrow,

    // ── Punctuation ──────────────────────────────────────────

    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `;`
    Semicolon,
    /// `,`
    Comma,
    /// `.`
    Dot,
    /// `...`
    DotDotDot,
    /// `?`
    Question,
    /// `?.`
    QuestionDot,
    /// `:`
    Colon,

    // ── Special ──────────────────────────────────────────────

    /// End of input.
    Eof,
}

impl TokenKind {
    /// Look up a keyword or reserved word by its source text.
    pub fn from_keyword(s: &str) -> Option<TokenKind> {
        let kind = match s {
            "var" => TokenKind::Var,
            "let" => TokenKind::Let,
            "const" => TokenKind::Const,
            "function" => TokenKind::Function,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "while" => TokenKind::While,
            "do" => TokenKind::Do,
            "for" => TokenKind::For,
            "break" => TokenKind::Break,
            "continue" => TokenKind::Continue,
            "return" => TokenKind::Return,
            "throw" => TokenKind::Throw,
            "try" => TokenKind::Try,
            "catch" => TokenKind::Catch,
            "finally" => TokenKind::Finally,
            "switch" => TokenKind::Switch,
            "case" => TokenKind::Case,
            "default" => TokenKind::Default,
            "new" => TokenKind::New,
            "typeof" => TokenKind::Typeof,
            "void" => TokenKind::Void,
            "delete" => TokenKind::Delete,
            "in" => TokenKind::In,
            "instanceof" => TokenKind::Instanceof,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "null" => TokenKind::Null,
            "this" => TokenKind::This,
            _ if RESERVED_WORDS.contains(&s) => TokenKind::Reserved(s.to_string()),
            _ => return None,
        };
        Some(kind)
    }

    /// Returns `true` for keywords (not reserved words).
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Var
                | TokenKind::Let
                | TokenKind::Const
                | TokenKind::Function
                | TokenKind::If
                | TokenKind::Else
                | TokenKind::While
                | TokenKind::Do
                | TokenKind::For
                | TokenKind::Break
                | TokenKind::Continue
                | TokenKind::Return
                | TokenKind::Throw
                | TokenKind::Try
                | TokenKind::Catch
                | TokenKind::Finally
                | TokenKind::Switch
                | TokenKind::Case
                | TokenKind::Default
                | TokenKind::New
                | TokenKind::Typeof
                | TokenKind::Void
                | TokenKind::Delete
                | TokenKind::In
                | TokenKind::Instanceof
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Null
                | TokenKind::This
        )
    }

    /// The name this token has when used as a property name after `.` or
    /// as an object literal key (`obj.default`, `{ new: 1 }`).
    pub fn property_name(&self) -> Option<String> {
        match self {
            TokenKind::Identifier(name) | TokenKind::Reserved(name) => Some(name.clone()),
            kind if kind.is_keyword() => Some(kind.to_string()),
            _ => None,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::Number(n) => return write!(f, "{n}"),
            TokenKind::BigInt(digits) => return write!(f, "{digits}n"),
            TokenKind::String(s) => return write!(f, "'{s}'"),
            TokenKind::Template(s) => return write!(f, "`{s}`"),
            TokenKind::TemplateStart(s) => return write!(f, "`{s}${{"),
            TokenKind::TemplatePart(s) => return write!(f, "}}{s}${{"),
            TokenKind::TemplateEnd(s) => return write!(f, "}}{s}`"),
            TokenKind::Identifier(name) | TokenKind::Reserved(name) => return write!(f, "{name}"),
            TokenKind::InterpolationStart => "${",
            TokenKind::InterpolationEnd => "}",
            TokenKind::Var => "var",
            TokenKind::Let => "let",
            TokenKind::Const => "const",
            TokenKind::Function => "function",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::While => "while",
            TokenKind::Do => "do",
            TokenKind::For => "for",
            TokenKind::Break => "break",
            TokenKind::Continue => "continue",
            TokenKind::Return => "return",
            TokenKind::Throw => "throw",
            TokenKind::Try => "try",
            TokenKind::Catch => "catch",
            TokenKind::Finally => "finally",
            TokenKind::Switch => "switch",
            TokenKind::Case => "case",
            TokenKind::Default => "default",
            TokenKind::New => "new",
            TokenKind::Typeof => "typeof",
            TokenKind::Void => "void",
            TokenKind::Delete => "delete",
            TokenKind::In => "in",
            TokenKind::Instanceof => "instanceof",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::Null => "null",
            TokenKind::This => "this",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::StarStar => "**",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::PlusPlus => "++",
            TokenKind::MinusMinus => "--",
            TokenKind::Bang => "!",
            TokenKind::Eq => "=",
            TokenKind::EqEq => "==",
            TokenKind::EqEqEq => "===",
            TokenKind::BangEq => "!=",
            TokenKind::BangEqEq => "!==",
            TokenKind::Less => "<",
            TokenKind::Greater => ">",
            TokenKind::LessEq => "<=",
            TokenKind::GreaterEq => ">=",
            TokenKind::AmpAmp => "&&",
            TokenKind::PipePipe => "||",
            TokenKind::QuestionQuestion => "??",
            TokenKind::PlusEq => "+=",
            TokenKind::MinusEq => "-=",
            TokenKind::StarEq => "*=",
            TokenKind::StarStarEq => "**=",
            TokenKind::SlashEq => "/=",
            TokenKind::PercentEq => "%=",
            TokenKind::AmpAmpEq => "&&=",
            TokenKind::PipePipeEq => "||=",
            TokenKind::QuestionQuestionEq => "??=",
            TokenKind::Arrow => "=>",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Semicolon => ";",
            TokenKind::Comma => ",",
            TokenKind::Dot => ".",
            TokenKind::DotDotDot => "...",
            TokenKind::Question => "?",
            TokenKind::QuestionDot => "?.",
            TokenKind::Colon => ":",
            TokenKind::Eof => "end of input",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_keyword_resolves() {
        for &kw in ALL_KEYWORDS {
            let kind = TokenKind::from_keyword(kw).unwrap();
            assert!(kind.is_keyword(), "'{kw}' should be a keyword");
            assert_eq!(kind.to_string(), kw, "Display should match source text");
        }
    }

    #[test]
    fn test_reserved_words_are_not_keywords() {
        for &word in RESERVED_WORDS {
            let kind = TokenKind::from_keyword(word).unwrap();
            assert_eq!(kind, TokenKind::Reserved(word.to_string()));
            assert!(!kind.is_keyword());
        }
    }

    #[test]
    fn test_contextual_words_are_identifiers() {
        assert!(TokenKind::from_keyword("of").is_none());
        assert!(TokenKind::from_keyword("undefined").is_none());
        assert!(TokenKind::from_keyword("async").is_none());
    }

    #[test]
    fn test_keyword_case_sensitivity() {
        assert!(TokenKind::from_keyword("return").is_some());
        assert!(TokenKind::from_keyword("Return").is_none());
        assert!(TokenKind::from_keyword("NULL").is_none());
    }

    #[test]
    fn test_property_name() {
        assert_eq!(
            TokenKind::Default.property_name().as_deref(),
            Some("default")
        );
        assert_eq!(
            TokenKind::Identifier("x".into()).property_name().as_deref(),
            Some("x")
        );
        assert_eq!(
            TokenKind::Reserved("class".into()).property_name().as_deref(),
            Some("class")
        );
        assert_eq!(TokenKind::Comma.property_name(), None);
    }

    #[test]
    fn test_display_operators() {
        assert_eq!(TokenKind::EqEqEq.to_string(), "===");
        assert_eq!(TokenKind::QuestionQuestionEq.to_string(), "??=");
        assert_eq!(TokenKind::Arrow.to_string(), "=>");
        assert_eq!(TokenKind::QuestionDot.to_string(), "?.");
    }

    #[test]
    fn test_display_literals() {
        assert_eq!(TokenKind::Number(42.0).to_string(), "42");
        assert_eq!(TokenKind::Number(3.5).to_string(), "3.5");
        assert_eq!(TokenKind::BigInt("10".into()).to_string(), "10n");
        assert_eq!(TokenKind::String("hi".into()).to_string(), "'hi'");
        assert_eq!(TokenKind::Eof.to_string(), "end of input");
    }

    #[test]
    fn test_token_construction() {
        let span = Span::new(1, 1, 1, 4);
        let token = Token::new(TokenKind::Var, span);
        assert_eq!(token.kind, TokenKind::Var);
        assert!(token.is_keyword());
        assert!(!token.newline_before);
    }
}
