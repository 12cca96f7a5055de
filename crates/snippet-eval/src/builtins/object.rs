//! `Object`, `Object.prototype` and `Function.prototype`.

use std::rc::Rc;

use crate::builtins::{arg, define_global, define_methods, native};
use crate::error::EvalResult;
use crate::interpreter::Interpreter;
use crate::realm::Realm;
use crate::value::{ObjectRef, Value};

pub(crate) fn install(realm: &Realm) {
    let intrinsics = realm.intrinsics();

    let ctor = realm.new_constructor("Object", Rc::new(object_ctor), &intrinsics.object_proto);
    define_methods(
        realm,
        &ctor,
        &[
            ("keys", object_keys),
            ("values", object_values),
            ("entries", object_entries),
            ("assign", object_assign),
            ("fromEntries", object_from_entries),
            ("freeze", object_freeze),
            ("create", object_create),
            ("getPrototypeOf", object_get_prototype_of),
        ],
    );
    define_global(realm, "Object", Value::Object(ctor));

    define_methods(
        realm,
        &intrinsics.object_proto,
        &[
            ("hasOwnProperty", has_own_property),
            ("toString", object_to_string),
        ],
    );

    define_methods(
        realm,
        &intrinsics.function_proto,
        &[
            ("call", function_call),
            ("apply", function_apply),
            ("bind", function_bind),
            ("toString", function_to_string),
        ],
    );
}

// ══════════════════════════════════════════════════════════════════════════════
// Object
// ══════════════════════════════════════════════════════════════════════════════

fn object_ctor(interp: &mut Interpreter<'_>, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    match arg(args, 0) {
        value @ Value::Object(_) => Ok(value),
        _ => Ok(Value::Object(interp.realm().new_object())),
    }
}

/// The object argument of an `Object.*` static, rejecting `null`/`undefined`.
fn object_arg(interp: &Interpreter<'_>, args: &[Value]) -> EvalResult<Value> {
    let value = arg(args, 0);
    if value.is_nullish() {
        return Err(interp.type_error("Cannot convert undefined or null to object"));
    }
    Ok(value)
}

fn own_entries(interp: &mut Interpreter<'_>, value: &Value) -> Vec<(Rc<str>, Value)> {
    match value {
        Value::Object(obj) => obj
            .own_keys()
            .into_iter()
            .map(|key| {
                let value = interp.own_property(obj, &key).unwrap_or_default();
                (key, value)
            })
            .collect(),
        Value::String(s) => s
            .chars()
            .enumerate()
            .map(|(i, c)| (Rc::from(i.to_string()), Value::from(c.to_string())))
            .collect(),
        _ => Vec::new(),
    }
}

fn object_keys(interp: &mut Interpreter<'_>, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    let target = object_arg(interp, args)?;
    let keys = own_entries(interp, &target)
        .into_iter()
        .map(|(key, _)| Value::String(key))
        .collect();
    Ok(interp.realm().new_array(keys))
}

fn object_values(interp: &mut Interpreter<'_>, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    let target = object_arg(interp, args)?;
    let values = own_entries(interp, &target)
        .into_iter()
        .map(|(_, value)| value)
        .collect();
    Ok(interp.realm().new_array(values))
}

fn object_entries(interp: &mut Interpreter<'_>, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    let target = object_arg(interp, args)?;
    let realm = interp.realm();
    let entries = own_entries(interp, &target)
        .into_iter()
        .map(|(key, value)| realm.new_array(vec![Value::String(key), value]))
        .collect();
    Ok(realm.new_array(entries))
}

fn object_assign(interp: &mut Interpreter<'_>, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    let target = object_arg(interp, args)?;
    for source in args.iter().skip(1) {
        interp.copy_properties(&target, source)?;
    }
    Ok(target)
}

fn object_from_entries(interp: &mut Interpreter<'_>, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    let entries = interp.iterate(&arg(args, 0))?;
    let result = Value::Object(interp.realm().new_object());
    for entry in entries {
        let key = interp.get_property(&entry, "0")?;
        let value = interp.get_property(&entry, "1")?;
        let key = interp.to_property_key(&key)?;
        interp.set_property(&result, &key, value)?;
    }
    Ok(result)
}

/// Objects are not sealable here; `freeze` hands its argument back.
fn object_freeze(_interp: &mut Interpreter<'_>, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    Ok(arg(args, 0))
}

fn object_create(interp: &mut Interpreter<'_>, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    let proto = match arg(args, 0) {
        Value::Object(proto) => Some(proto),
        Value::Null => None,
        other => {
            let shown = interp.display(&other);
            return Err(interp.type_error(format!(
                "Object prototype may only be an Object or null: {shown}"
            )));
        }
    };
    Ok(Value::Object(interp.realm().new_object_with_proto(proto)))
}

fn object_get_prototype_of(interp: &mut Interpreter<'_>, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    let target = object_arg(interp, args)?;
    let intrinsics = interp.realm().intrinsics();
    let proto = match &target {
        Value::Object(obj) => obj.prototype(),
        Value::String(_) => Some(intrinsics.string_proto.clone()),
        Value::Number(_) => Some(intrinsics.number_proto.clone()),
        Value::Bool(_) => Some(intrinsics.boolean_proto.clone()),
        Value::BigInt(_) => Some(intrinsics.bigint_proto.clone()),
        Value::Undefined | Value::Null => None,
    };
    Ok(proto.map_or(Value::Null, Value::Object))
}

// ── Object.prototype ──

fn has_own_property(interp: &mut Interpreter<'_>, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let key = interp.to_property_key(&arg(args, 0))?;
    let found = match this {
        Value::Object(obj) => interp.own_property(obj, &key).is_some(),
        Value::String(s) => {
            key.as_ref() == "length"
                || key
                    .parse::<usize>()
                    .is_ok_and(|i| i < s.chars().count())
        }
        _ => false,
    };
    Ok(Value::Bool(found))
}

fn object_to_string(_interp: &mut Interpreter<'_>, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    let tag = match this {
        Value::Undefined => "Undefined",
        Value::Null => "Null",
        Value::Object(obj) if obj.is_array() => "Array",
        Value::Object(obj) if obj.is_callable() => "Function",
        Value::Object(obj) if obj.is_error() => "Error",
        Value::String(_) => "String",
        Value::Number(_) => "Number",
        Value::Bool(_) => "Boolean",
        _ => "Object",
    };
    Ok(Value::from(format!("[object {tag}]")))
}

// ══════════════════════════════════════════════════════════════════════════════
// Function.prototype
// ══════════════════════════════════════════════════════════════════════════════

fn function_call(interp: &mut Interpreter<'_>, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let receiver = arg(args, 0);
    interp.call(this, &receiver, args.get(1..).unwrap_or_default())
}

fn function_apply(interp: &mut Interpreter<'_>, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let receiver = arg(args, 0);
    let call_args = match arg(args, 1) {
        Value::Undefined | Value::Null => Vec::new(),
        list => interp.iterate(&list)?,
    };
    interp.call(this, &receiver, &call_args)
}

/// `f.bind(thisArg, ...args)`: a native that forwards to `f`.
fn function_bind(interp: &mut Interpreter<'_>, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let Some(target) = this.as_object().filter(|obj| obj.is_callable()) else {
        return Err(interp.type_error("Bind must be called on a function"));
    };
    let name = format!("bound {}", target.function().map(|f| f.name().to_string()).unwrap_or_default());
    let target: ObjectRef = target.clone();
    let receiver = arg(args, 0);
    let bound_args: Vec<Value> = args.get(1..).unwrap_or_default().to_vec();
    let bound = native(move |interp, _this, call_args| {
        let mut all = bound_args.clone();
        all.extend_from_slice(call_args);
        interp.call(&Value::Object(target.clone()), &receiver, &all)
    });
    Ok(interp.realm().new_native(&name, bound))
}

fn function_to_string(interp: &mut Interpreter<'_>, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    match this.as_object().and_then(ObjectRef::function) {
        Some(function) => Ok(Value::from(function.source_text())),
        None => Err(interp.type_error("Function.prototype.toString requires that 'this' be a Function")),
    }
}
