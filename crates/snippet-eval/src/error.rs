//! Runtime error types for the snippet engine.

use snippet_types::SyntaxDiagnostic;

use crate::value::Value;

/// Evaluation error: anything that aborts a run.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EvalError {
    /// A value thrown by script code or raised by the interpreter.
    ///
    /// Interpreter-raised errors are `Error` objects with a `lineNumber`.
    #[error("uncaught {}", crate::format::format(.0))]
    Thrown(Value),
    /// The source did not parse.
    #[error("{}", .0.message)]
    Syntax(SyntaxDiagnostic),
}

impl EvalError {
    /// The thrown value, if this error is catchable by `try`.
    pub fn thrown_value(&self) -> Option<&Value> {
        match self {
            Self::Thrown(value) => Some(value),
            Self::Syntax(_) => None,
        }
    }
}

/// Result alias for evaluator operations.
pub type EvalResult<T> = Result<T, EvalError>;

/// The built-in error constructors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Error,
    TypeError,
    RangeError,
    SyntaxError,
    ReferenceError,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 5] = [
        ErrorKind::Error,
        ErrorKind::TypeError,
        ErrorKind::RangeError,
        ErrorKind::SyntaxError,
        ErrorKind::ReferenceError,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Error => "Error",
            Self::TypeError => "TypeError",
            Self::RangeError => "RangeError",
            Self::SyntaxError => "SyntaxError",
            Self::ReferenceError => "ReferenceError",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}
