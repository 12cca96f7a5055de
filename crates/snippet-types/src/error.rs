use crate::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of diagnostics stored before fail-fast.
pub const MAX_ERRORS: usize = 20;

/// Diagnostic category, determined by error code range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    /// Malformed characters, literals or comments (E100–E149).
    Lexical,
    /// Well-formed tokens in an invalid arrangement (E150–E199).
    Syntax,
    /// Source nested deeper than the configured limit (E200–E299).
    Limit,
}

/// Numeric diagnostic code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ErrorCode(pub u16);

impl ErrorCode {
    // ── Lexical (E100–E149) ──
    pub const UNEXPECTED_CHARACTER: Self = Self(100);
    pub const UNTERMINATED_STRING: Self = Self(101);
    pub const UNTERMINATED_TEMPLATE: Self = Self(102);
    pub const UNTERMINATED_COMMENT: Self = Self(103);
    pub const INVALID_NUMBER: Self = Self(104);
    pub const INVALID_ESCAPE: Self = Self(105);

    // ── Syntax (E150–E199) ──
    pub const UNEXPECTED_TOKEN: Self = Self(150);
    pub const MISSING_SEMICOLON: Self = Self(151);
    pub const INVALID_ASSIGNMENT_TARGET: Self = Self(152);
    pub const ILLEGAL_RETURN: Self = Self(153);
    pub const ILLEGAL_BREAK: Self = Self(154);
    pub const ILLEGAL_CONTINUE: Self = Self(155);
    pub const MISSING_INITIALIZER: Self = Self(156);
    pub const UNSUPPORTED_SYNTAX: Self = Self(157);
    pub const DUPLICATE_DECLARATION: Self = Self(158);

    // ── Limits (E200–E299) ──
    pub const NESTING_TOO_DEEP: Self = Self(200);

    /// Get the category for this error code.
    pub fn category(self) -> ErrorCategory {
        match self.0 {
            100..=149 => ErrorCategory::Lexical,
            200..=299 => ErrorCategory::Limit,
            _ => ErrorCategory::Syntax,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lexical => write!(f, "lexical"),
            Self::Syntax => write!(f, "syntax"),
            Self::Limit => write!(f, "limit"),
        }
    }
}

/// A structured syntax diagnostic produced by the lexer or parser.
///
/// `message` is phrased the way a browser console phrases syntax errors
/// ("Unexpected token ')'") since it ends up in the output panel verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("{span}: {code} [{category}] {message}")]
pub struct SyntaxDiagnostic {
    /// Source file name.
    pub file: String,
    /// Diagnostic code (e.g., E150).
    pub code: ErrorCode,
    /// Category (derived from code).
    pub category: ErrorCategory,
    /// Human-readable message.
    pub message: String,
    /// Source location.
    #[serde(flatten)]
    pub span: Span,
    /// The exact source line for context.
    pub source_line: String,
    /// Optional fix suggestion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl SyntaxDiagnostic {
    /// Create a new diagnostic.
    pub fn new(
        file: impl Into<String>,
        code: ErrorCode,
        message: impl Into<String>,
        span: Span,
        source_line: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            code,
            category: code.category(),
            message: message.into(),
            span,
            source_line: source_line.into(),
            suggestion: None,
        }
    }

    /// Attach a fix suggestion.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// 1-based line the diagnostic points at.
    pub fn line(&self) -> u32 {
        self.span.start_line
    }
}

/// Diagnostics collected over one lexing or parsing pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    pub errors: Vec<SyntaxDiagnostic>,
    pub total_errors: usize,
}

impl Diagnostics {
    /// Create an empty collection.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Check if there are any errors.
    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    /// Returns `true` once the stored errors reached [`MAX_ERRORS`].
    pub fn is_full(&self) -> bool {
        self.total_errors >= MAX_ERRORS
    }

    /// Add an error, respecting the MAX_ERRORS limit.
    pub fn push_error(&mut self, error: SyntaxDiagnostic) {
        if self.errors.len() < MAX_ERRORS {
            self.errors.push(error);
        }
        self.total_errors += 1;
    }

    /// Append everything from another pass (lexer errors ahead of parser errors).
    pub fn extend(&mut self, other: Diagnostics) {
        let extra = other.total_errors.saturating_sub(other.errors.len());
        for error in other.errors {
            self.push_error(error);
        }
        self.total_errors += extra;
    }

    /// The earliest diagnostic in source order.
    pub fn first(&self) -> Option<&SyntaxDiagnostic> {
        self.errors
            .iter()
            .min_by_key(|e| (e.span.start_line, e.span.start_col))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_category() {
        assert_eq!(
            ErrorCode::UNTERMINATED_STRING.category(),
            ErrorCategory::Lexical
        );
        assert_eq!(ErrorCode::UNEXPECTED_TOKEN.category(), ErrorCategory::Syntax);
        assert_eq!(ErrorCode::ILLEGAL_RETURN.category(), ErrorCategory::Syntax);
        assert_eq!(ErrorCode::NESTING_TOO_DEEP.category(), ErrorCategory::Limit);
    }

    #[test]
    fn test_error_code_display() {
        assert_eq!(format!("{}", ErrorCode::UNEXPECTED_TOKEN), "E150");
        assert_eq!(format!("{}", ErrorCode::UNEXPECTED_CHARACTER), "E100");
    }

    #[test]
    fn test_diagnostic_display() {
        let err = SyntaxDiagnostic::new(
            "snippet.js",
            ErrorCode::UNEXPECTED_TOKEN,
            "Unexpected token ')'",
            Span::new(2, 5, 2, 5),
            "  foo(1, )",
        );
        assert_eq!(err.to_string(), "2:5: E150 [syntax] Unexpected token ')'");
        assert_eq!(err.line(), 2);
    }

    #[test]
    fn test_diagnostic_with_suggestion() {
        let err = SyntaxDiagnostic::new(
            "snippet.js",
            ErrorCode::UNSUPPORTED_SYNTAX,
            "Unexpected reserved word 'class'",
            Span::new(1, 1, 1, 6),
            "class A {}",
        )
        .with_suggestion("Use a constructor function instead");
        assert_eq!(
            err.suggestion.as_deref(),
            Some("Use a constructor function instead")
        );
    }

    #[test]
    fn test_diagnostic_json_serialization() {
        let err = SyntaxDiagnostic::new(
            "snippet.js",
            ErrorCode::UNTERMINATED_STRING,
            "Invalid or unexpected token",
            Span::new(3, 9, 3, 20),
            "let s = 'abc",
        );
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("\"code\":101"));
        assert!(json.contains("\"category\":\"lexical\""));
        assert!(json.contains("\"line\":3"));
        assert!(json.contains("\"column\":9"));
        assert!(!json.contains("\"suggestion\""));

        let back: SyntaxDiagnostic = serde_json::from_str(&json).unwrap();
        assert_eq!(back.code, err.code);
        assert_eq!(back.message, err.message);
    }

    #[test]
    fn test_diagnostics_max_limit() {
        let mut errs = Diagnostics::empty();
        for i in 0..25 {
            errs.push_error(SyntaxDiagnostic::new(
                "snippet.js",
                ErrorCode::UNEXPECTED_TOKEN,
                format!("Error {i}"),
                Span::point(i as u32 + 1, 1),
                "",
            ));
        }
        assert_eq!(errs.errors.len(), 20);
        assert_eq!(errs.total_errors, 25);
        assert!(errs.is_full());
    }

    #[test]
    fn test_diagnostics_first_is_earliest() {
        let mut errs = Diagnostics::empty();
        errs.push_error(SyntaxDiagnostic::new(
            "a",
            ErrorCode::UNEXPECTED_TOKEN,
            "later",
            Span::point(4, 1),
            "",
        ));
        let mut lexer_errs = Diagnostics::empty();
        lexer_errs.push_error(SyntaxDiagnostic::new(
            "a",
            ErrorCode::UNTERMINATED_STRING,
            "earlier",
            Span::point(2, 3),
            "",
        ));
        errs.extend(lexer_errs);
        assert_eq!(errs.total_errors, 2);
        assert_eq!(errs.first().map(|e| e.message.as_str()), Some("earlier"));
    }

    #[test]
    fn test_diagnostics_empty() {
        let errs = Diagnostics::empty();
        assert!(!errs.has_errors());
        assert!(errs.first().is_none());
    }
}
