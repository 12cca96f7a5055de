//! The execution engine: runs a snippet, captures its console output and
//! reports the result or the error through an [`OutputSink`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use snippet_parser::parse_source;
use snippet_types::{ErrorCode, SourceFile, Span, SyntaxDiagnostic};

use crate::config::EngineConfig;
use crate::env::Scope;
use crate::error::{EvalError, EvalResult};
use crate::format::ValueFormatter;
use crate::interpreter::Interpreter;
use crate::output::{CallbackSink, OutputSink};
use crate::realm::Realm;
use crate::redirect::LoggingRedirect;
use crate::value::Value;

// ══════════════════════════════════════════════════════════════════════════════
// Scope Mode
// ══════════════════════════════════════════════════════════════════════════════

/// Where a snippet's top-level declarations live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeMode {
    /// Directly in the global scope; declarations persist across runs.
    #[default]
    Shared,
    /// In a fresh function scope under the global scope. Not a sandbox:
    /// globals stay readable and undeclared assignments still leak.
    Isolated,
}

impl ScopeMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Shared => "shared",
            Self::Isolated => "isolated",
        }
    }

    /// The scope a run executes in.
    pub fn execution_scope(self, realm: &Realm) -> Scope {
        match self {
            Self::Shared => realm.global().clone(),
            Self::Isolated => Scope::function(realm.global(), None),
        }
    }

    /// Break the cycles an isolated run leaves between its scope and the
    /// functions declared in it, once nothing outside can reach them.
    /// Shared declarations live on in the global scope and are kept.
    pub fn release_scope(self, scope: &Scope) {
        if self == Self::Isolated && scope.release_if_unreachable() {
            tracing::trace!("isolated scope released");
        }
    }

    /// Isolated snippets are function bodies, so `return` is legal.
    pub fn allows_top_level_return(self) -> bool {
        matches!(self, Self::Isolated)
    }
}

impl fmt::Display for ScopeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unknown scope mode name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown scope mode '{0}', expected 'shared' or 'isolated'")]
pub struct ParseScopeModeError(pub String);

impl FromStr for ScopeMode {
    type Err = ParseScopeModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shared" => Ok(Self::Shared),
            "isolated" => Ok(Self::Isolated),
            _ => Err(ParseScopeModeError(s.to_string())),
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Requests & Outcomes
// ══════════════════════════════════════════════════════════════════════════════

/// One run: source text plus scope mode. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    source_text: String,
    scope_mode: ScopeMode,
}

impl ExecutionRequest {
    pub fn new(source_text: impl Into<String>, scope_mode: ScopeMode) -> Self {
        Self {
            source_text: source_text.into(),
            scope_mode,
        }
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    pub fn scope_mode(&self) -> ScopeMode {
        self.scope_mode
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "output", rename_all = "lowercase")]
pub enum ExecutionOutcome {
    /// The rendered result, or `None` when the snippet produced `undefined`.
    Success(Option<String>),
    /// The primary error line.
    Failure(String),
}

impl ExecutionOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }
}

/// The lines an error is reported as.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ErrorReport {
    message: String,
    /// The caller's stack frame, when the error carries no line number.
    location: Option<String>,
}

impl ErrorReport {
    fn from_error(error: &EvalError, formatter: &ValueFormatter) -> Self {
        match error {
            EvalError::Syntax(diagnostic) => Self {
                message: format!("Error in line {}: {}", diagnostic.line(), diagnostic.message),
                location: None,
            },
            EvalError::Thrown(value) => Self::from_thrown(value, formatter),
        }
    }

    fn from_thrown(value: &Value, formatter: &ValueFormatter) -> Self {
        let Some(obj) = value.as_object().filter(|obj| obj.get_raw("message").is_some()) else {
            return Self {
                message: format!("Error: {}", formatter.format(value)),
                location: None,
            };
        };
        let message = match obj.get_raw("message") {
            Some(Value::String(s)) => s.to_string(),
            Some(other) => formatter.format(&other),
            None => String::new(),
        };
        let line = match obj.get_raw("lineNumber") {
            Some(Value::Number(n)) if n.is_finite() && n >= 1.0 => Some(n as u64),
            _ => None,
        };
        if let Some(line) = line {
            return Self {
                message: format!("Error in line {line}: {message}"),
                location: None,
            };
        }
        let location = match obj.get_raw("stack") {
            Some(Value::String(stack)) => stack
                .lines()
                .nth(1)
                .map(str::trim)
                .filter(|frame| !frame.is_empty())
                .map(str::to_string),
            _ => None,
        };
        Self {
            message: format!("Error: {message}"),
            location,
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Engine
// ══════════════════════════════════════════════════════════════════════════════

/// Runs snippets against one persistent realm.
///
/// ```
/// use snippet_eval::{Engine, ScopeMode};
/// let mut engine = Engine::new();
/// let mut lines = Vec::new();
/// engine.run("console.log('hi'); 1 + 1", ScopeMode::Shared, |l| lines.push(l.to_string()), |_| {});
/// assert_eq!(lines, ["hi", "2"]);
/// ```
pub struct Engine {
    realm: Realm,
    config: EngineConfig,
}

impl Engine {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            realm: Realm::new(),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn realm(&self) -> &Realm {
        &self.realm
    }

    /// Run `source`, reporting through the two callbacks.
    pub fn run(
        &mut self,
        source: &str,
        scope: ScopeMode,
        write_line: impl FnMut(&str),
        set_error_state: impl FnMut(bool),
    ) {
        let mut sink = CallbackSink {
            write_line,
            set_error_state,
        };
        self.execute(&ExecutionRequest::new(source, scope), &mut sink);
    }

    /// Build a request in the configured default scope.
    pub fn request(&self, source: impl Into<String>) -> ExecutionRequest {
        ExecutionRequest::new(source, self.config.default_scope)
    }

    /// Run a request against `sink` and return how it ended.
    pub fn execute(
        &mut self,
        request: &ExecutionRequest,
        sink: &mut dyn OutputSink,
    ) -> ExecutionOutcome {
        sink.set_error_state(false);
        tracing::debug!(
            scope = %request.scope_mode(),
            bytes = request.source_text().len(),
            "run started"
        );

        let scope = request.scope_mode().execution_scope(&self.realm);
        let result = {
            let _redirect = LoggingRedirect::install(&self.realm);
            let mut interp = Interpreter::new(&self.realm, &self.config).with_sink(&mut *sink);
            evaluate_source(&mut interp, request.source_text(), request.scope_mode(), &scope)
        };

        let formatter = ValueFormatter::new(self.config.max_format_depth);
        let outcome = match result {
            Ok(Value::Undefined) => ExecutionOutcome::Success(None),
            Ok(value) => {
                let text = formatter.format(&value);
                sink.write_line(&text);
                ExecutionOutcome::Success(Some(text))
            }
            Err(error) => {
                sink.set_error_state(true);
                let report = ErrorReport::from_error(&error, &formatter);
                sink.write_line(&report.message);
                if let Some(location) = &report.location {
                    sink.write_line(location);
                }
                ExecutionOutcome::Failure(report.message)
            }
        };
        request.scope_mode().release_scope(&scope);
        tracing::debug!(failed = outcome.is_failure(), "run finished");
        outcome
    }

    /// Evaluate without redirecting the console or formatting the result.
    /// Console calls go to `tracing`.
    pub fn evaluate(&mut self, source: &str, scope: ScopeMode) -> Result<Value, EvalError> {
        let run_scope = scope.execution_scope(&self.realm);
        let result = {
            let mut interp = Interpreter::new(&self.realm, &self.config);
            evaluate_source(&mut interp, source, scope, &run_scope)
        };
        scope.release_scope(&run_scope);
        result
    }

    /// A global binding, if initialized.
    pub fn global(&self, name: &str) -> Option<Value> {
        self.realm.global().get_own(name)
    }

    /// The current value of `console.<method>`.
    pub fn console_entry(&self, method: &str) -> Option<Value> {
        self.realm.console().get_own(method)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse and run `source` on `interp` in `run_scope`, a scope built for `scope`.
fn evaluate_source(
    interp: &mut Interpreter<'_>,
    source: &str,
    scope: ScopeMode,
    run_scope: &Scope,
) -> EvalResult<Value> {
    let config = interp.config();
    let file = SourceFile::new(config.file_name.clone(), source);
    let parsed = parse_source(&file, config.parse_options(scope));
    let Some(program) = parsed.program else {
        let diagnostic = parsed.errors.first().cloned().unwrap_or_else(|| {
            SyntaxDiagnostic::new(
                &config.file_name,
                ErrorCode::UNEXPECTED_TOKEN,
                "Unexpected end of input",
                Span::point(1, 1),
                "",
            )
        });
        tracing::debug!(code = %diagnostic.code, line = diagnostic.line(), "syntax error");
        return Err(EvalError::Syntax(diagnostic));
    };
    interp.run_program(&program, run_scope)
}
