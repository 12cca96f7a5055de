//! The `console` object. Outside a run its entry points log via `tracing`.

use crate::builtins::{define_global, native};
use crate::interpreter::Interpreter;
use crate::realm::Realm;
use crate::redirect::LogSeverity;
use crate::value::{NativeFn, Value};

pub(crate) fn install(realm: &Realm) {
    let console = realm.console();
    for severity in LogSeverity::ALL {
        console.set_own(
            severity.method(),
            realm.new_native(severity.method(), default_entry(severity)),
        );
    }
    define_global(realm, "console", Value::Object(console.clone()));
}

fn default_entry(severity: LogSeverity) -> NativeFn {
    native(move |interp, _this, args| {
        let line = join_arguments(interp, args);
        match severity {
            LogSeverity::Log | LogSeverity::Info => {
                tracing::info!(target: "snippet::console", "{line}")
            }
            LogSeverity::Warn => tracing::warn!(target: "snippet::console", "{line}"),
            LogSeverity::Error => tracing::error!(target: "snippet::console", "{line}"),
        }
        Ok(Value::Undefined)
    })
}

/// Join console arguments with single spaces: strings verbatim, anything
/// else through the formatter.
pub(crate) fn join_arguments(interp: &Interpreter<'_>, args: &[Value]) -> String {
    let formatter = interp.formatter();
    args.iter()
        .map(|arg| match arg {
            Value::String(s) => s.to_string(),
            other => formatter.format(other),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
