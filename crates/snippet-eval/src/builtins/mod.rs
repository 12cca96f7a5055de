//! Builtin objects and functions installed into every realm.

pub(crate) mod array;
pub(crate) mod console;
pub(crate) mod errors;
pub(crate) mod global;
pub(crate) mod json;
pub(crate) mod math;
pub(crate) mod object;
pub(crate) mod string;

use std::rc::Rc;

use crate::error::EvalResult;
use crate::interpreter::Interpreter;
use crate::realm::Realm;
use crate::value::{NativeFn, ObjectRef, Value};

/// A builtin implemented as a plain function.
pub(crate) type Builtin = fn(&mut Interpreter<'_>, &Value, &[Value]) -> EvalResult<Value>;

/// Wrap a closure as a native function.
pub(crate) fn native<F>(func: F) -> NativeFn
where
    F: Fn(&mut Interpreter<'_>, &Value, &[Value]) -> EvalResult<Value> + 'static,
{
    Rc::new(func)
}

/// Install every builtin into `realm`'s global scope.
pub(crate) fn install(realm: &Realm) {
    console::install(realm);
    errors::install(realm);
    object::install(realm);
    array::install(realm);
    string::install(realm);
    global::install(realm);
    math::install(realm);
    json::install(realm);
}

/// Define each `(name, function)` pair as a method of `target`.
pub(crate) fn define_methods(realm: &Realm, target: &ObjectRef, methods: &[(&str, Builtin)]) {
    for &(name, func) in methods {
        target.set_own(name, realm.new_native(name, Rc::new(func)));
    }
}

/// Define a global binding.
pub(crate) fn define_global(realm: &Realm, name: &str, value: Value) {
    realm.global().define(name, value, true);
}

// ── Argument Helpers ──────────────────────────────────────────────────────────

/// The `i`th argument, or `undefined`.
pub(crate) fn arg(args: &[Value], i: usize) -> Value {
    args.get(i).cloned().unwrap_or_default()
}

/// ToIntegerOrInfinity.
pub(crate) fn to_integer(interp: &mut Interpreter<'_>, value: &Value) -> EvalResult<f64> {
    let n = interp.to_number(value)?;
    Ok(if n.is_nan() { 0.0 } else { n.trunc() })
}

/// Resolve a relative index (negative counts from the end) into `0..=len`.
pub(crate) fn relative_index(
    interp: &mut Interpreter<'_>,
    value: &Value,
    len: usize,
    default: usize,
) -> EvalResult<usize> {
    if value.is_undefined() {
        return Ok(default);
    }
    let n = to_integer(interp, value)?;
    let len_f = len as f64;
    let resolved = if n < 0.0 { (len_f + n).max(0.0) } else { n.min(len_f) };
    Ok(resolved as usize)
}
