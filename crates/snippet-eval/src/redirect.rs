//! Console redirection for the duration of one run.

use crate::builtins::console::join_arguments;
use crate::builtins::native;
use crate::realm::Realm;
use crate::value::{NativeFn, ObjectRef, Value};

/// Severity of a console entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogSeverity {
    Log,
    Info,
    Warn,
    Error,
}

impl LogSeverity {
    /// The entry points a redirect replaces.
    pub const ALL: [LogSeverity; 4] = [
        LogSeverity::Log,
        LogSeverity::Info,
        LogSeverity::Warn,
        LogSeverity::Error,
    ];

    /// Method name on `console`.
    pub fn method(self) -> &'static str {
        match self {
            Self::Log => "log",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// Line prefix in the output panel.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Log | Self::Info => "",
            Self::Warn => "WARN: ",
            Self::Error => "ERROR: ",
        }
    }
}

/// One captured console call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    pub severity: LogSeverity,
    /// The space-joined arguments.
    pub text: String,
}

impl LogEvent {
    /// The line as written to the sink.
    pub fn line(&self) -> String {
        format!("{}{}", self.severity.prefix(), self.text)
    }
}

/// Replaces the console entry points with capturing versions until dropped.
///
/// Dropping the guard puts back exactly the values that were there before
/// (same objects, or absence), whether the run finished, threw or unwound.
pub struct LoggingRedirect {
    console: ObjectRef,
    saved: Vec<(LogSeverity, Option<Value>)>,
}

impl LoggingRedirect {
    pub fn install(realm: &Realm) -> Self {
        let console = realm.console().clone();
        let mut saved = Vec::with_capacity(LogSeverity::ALL.len());
        for severity in LogSeverity::ALL {
            saved.push((severity, console.get_own(severity.method())));
            console.set_own(
                severity.method(),
                realm.new_native(severity.method(), capturing_entry(severity)),
            );
        }
        tracing::trace!("console redirect installed");
        Self { console, saved }
    }
}

impl Drop for LoggingRedirect {
    fn drop(&mut self) {
        for (severity, original) in self.saved.drain(..) {
            match original {
                Some(value) => self.console.set_own(severity.method(), value),
                None => {
                    self.console.remove_own(severity.method());
                }
            }
        }
        tracing::trace!("console redirect restored");
    }
}

fn capturing_entry(severity: LogSeverity) -> NativeFn {
    native(move |interp, _this, args| {
        let event = LogEvent {
            severity,
            text: join_arguments(interp, args),
        };
        interp.emit_line(&event.line());
        Ok(Value::Undefined)
    })
}
