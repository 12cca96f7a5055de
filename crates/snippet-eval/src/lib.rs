//! Snippet runner: executes script snippets and renders their results.
//!
//! The two entry points are the [`Engine`], which runs a snippet with its
//! console output captured line by line, and the [`ValueFormatter`], which
//! renders any runtime value as display text.
//!
//! ```
//! use snippet_eval::{Engine, ScopeMode, Transcript};
//!
//! let mut engine = Engine::new();
//! let mut transcript = Transcript::new();
//! let request = engine.request("console.warn('careful'); [1, 2]");
//! engine.execute(&request, &mut transcript);
//! assert_eq!(transcript.lines(), ["WARN: careful", "[\n  1,\n  2\n]"]);
//! assert!(!transcript.is_error());
//! ```

mod builtins;
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
mod exec;
mod expr;
pub mod format;
pub mod interpreter;
mod ops;
pub mod output;
pub mod realm;
pub mod redirect;
pub mod value;

pub use config::{ConfigError, EngineConfig};
pub use engine::{Engine, ExecutionOutcome, ExecutionRequest, ParseScopeModeError, ScopeMode};
pub use env::Scope;
pub use error::{ErrorKind, EvalError, EvalResult};
pub use format::{format, plain_string, FormatError, ValueFormatter, CIRCULAR, UNFORMATTABLE};
pub use interpreter::Interpreter;
pub use output::{OutputEvent, OutputSink, Transcript};
pub use realm::Realm;
pub use redirect::{LogEvent, LogSeverity, LoggingRedirect};
pub use value::{number_to_string, ObjectRef, Value};
