//! `Error` and its subtypes.

use crate::builtins::{arg, define_global, define_methods, native};
use crate::error::{ErrorKind, EvalResult};
use crate::format::error_header;
use crate::interpreter::Interpreter;
use crate::realm::Realm;
use crate::value::Value;

pub(crate) fn install(realm: &Realm) {
    for kind in ErrorKind::ALL {
        let proto = realm.intrinsics().error_proto(kind);
        let ctor = realm.new_constructor(
            kind.name(),
            native(move |interp, _this, args| construct_error(interp, kind, args)),
            proto,
        );
        define_global(realm, kind.name(), Value::Object(ctor));
    }
    define_methods(
        realm,
        realm.intrinsics().error_proto(ErrorKind::Error),
        &[("toString", error_to_string)],
    );
}

/// `Error(message)` and `new Error(message)` behave the same.
fn construct_error(interp: &mut Interpreter<'_>, kind: ErrorKind, args: &[Value]) -> EvalResult<Value> {
    let message = match arg(args, 0) {
        Value::Undefined => String::new(),
        other => interp.to_string(&other)?.to_string(),
    };
    let error = interp.create_error(kind, &message);
    if let Value::Object(options) = arg(args, 1) {
        if let Some(cause) = options.get_own("cause") {
            error.set_own("cause", cause);
        }
    }
    Ok(Value::Object(error))
}

fn error_to_string(interp: &mut Interpreter<'_>, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    match this {
        Value::Object(obj) => Ok(Value::from(error_header(obj))),
        _ => Err(interp.type_error("Error.prototype.toString called on non-object")),
    }
}
