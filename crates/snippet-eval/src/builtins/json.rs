//! The `JSON` namespace, backed by `serde_json`.

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::{Map, Value as Json};

use crate::builtins::{arg, define_global, define_methods};
use crate::error::{ErrorKind, EvalResult};
use crate::format::json_number;
use crate::interpreter::Interpreter;
use crate::realm::Realm;
use crate::value::{ObjectRef, Value};

pub(crate) fn install(realm: &Realm) {
    let json = realm.new_object();
    define_methods(realm, &json, &[("stringify", stringify), ("parse", parse)]);
    define_global(realm, "JSON", Value::Object(json));
}

// ══════════════════════════════════════════════════════════════════════════════
// JSON.stringify
// ══════════════════════════════════════════════════════════════════════════════

/// State for one `JSON.stringify` call.
struct Stringifier {
    replacer: Option<Value>,
    stack: Vec<usize>,
}

impl Stringifier {
    /// The JSON form of `value`, or `None` when it is skipped
    /// (`undefined` and functions).
    fn convert(
        &mut self,
        interp: &mut Interpreter<'_>,
        holder: &Value,
        key: &str,
        value: Value,
    ) -> EvalResult<Option<Json>> {
        let mut value = value;
        if let Value::Object(obj) = &value {
            let to_json = interp.lookup(obj, "toJSON");
            if to_json.is_callable() {
                value = interp.call(&to_json, &value, &[Value::str(key)])?;
            }
        }
        if let Some(replacer) = &self.replacer {
            value = interp.call(replacer, holder, &[Value::str(key), value])?;
        }

        let obj = match &value {
            Value::Undefined => return Ok(None),
            Value::Null => return Ok(Some(Json::Null)),
            Value::Bool(b) => return Ok(Some(Json::Bool(*b))),
            Value::Number(n) => return Ok(Some(json_number(*n))),
            Value::String(s) => return Ok(Some(Json::String(s.to_string()))),
            Value::BigInt(_) => {
                return Err(interp.type_error("Do not know how to serialize a BigInt"));
            }
            Value::Object(obj) if obj.is_callable() => return Ok(None),
            Value::Object(obj) => obj.clone(),
        };

        if self.stack.contains(&obj.id()) {
            return Err(interp.type_error("Converting circular structure to JSON"));
        }
        if self.stack.len() >= interp.config().max_format_depth {
            return Err(interp.range_error("Maximum call stack size exceeded"));
        }
        self.stack.push(obj.id());
        let result = self.convert_object(interp, &value, &obj);
        self.stack.pop();
        result.map(Some)
    }

    fn convert_object(
        &mut self,
        interp: &mut Interpreter<'_>,
        value: &Value,
        obj: &ObjectRef,
    ) -> EvalResult<Json> {
        if let Some(items) = obj.array_elements() {
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.into_iter().enumerate() {
                let converted = self.convert(interp, value, &i.to_string(), item)?;
                out.push(converted.unwrap_or(Json::Null));
            }
            return Ok(Json::Array(out));
        }
        let mut map = Map::new();
        for key in obj.own_keys() {
            let member = interp.own_property(obj, &key).unwrap_or_default();
            if let Some(converted) = self.convert(interp, value, &key, member)? {
                map.insert(key.to_string(), converted);
            }
        }
        Ok(Json::Object(map))
    }
}

/// The indent unit from `JSON.stringify`'s third argument.
fn indent_unit(interp: &mut Interpreter<'_>, space: &Value) -> EvalResult<String> {
    Ok(match space {
        Value::Number(_) => {
            let width = crate::builtins::to_integer(interp, space)?.clamp(0.0, 10.0);
            " ".repeat(width as usize)
        }
        Value::String(s) => s.chars().take(10).collect(),
        _ => String::new(),
    })
}

fn stringify(interp: &mut Interpreter<'_>, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    let replacer = Some(arg(args, 1)).filter(Value::is_callable);
    let indent = indent_unit(interp, &arg(args, 2))?;
    let holder = Value::Object(interp.realm().new_object());
    let mut stringifier = Stringifier {
        replacer,
        stack: Vec::new(),
    };
    let Some(json) = stringifier.convert(interp, &holder, "", arg(args, 0))? else {
        return Ok(Value::Undefined);
    };
    let text = if indent.is_empty() {
        serde_json::to_string(&json)
    } else {
        write_pretty(&json, &indent)
    };
    match text {
        Ok(text) => Ok(Value::from(text)),
        Err(err) => Err(interp.type_error(err.to_string())),
    }
}

fn write_pretty(json: &Json, indent: &str) -> serde_json::Result<String> {
    let mut out = Vec::new();
    let mut serializer =
        Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(indent.as_bytes()));
    json.serialize(&mut serializer)?;
    // serde_json only ever writes UTF-8
    Ok(String::from_utf8_lossy(&out).into_owned())
}

// ══════════════════════════════════════════════════════════════════════════════
// JSON.parse
// ══════════════════════════════════════════════════════════════════════════════

fn parse(interp: &mut Interpreter<'_>, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    let text = interp.to_string(&arg(args, 0))?;
    match serde_json::from_str::<Json>(&text) {
        Ok(json) => Ok(from_json(interp, json)),
        Err(err) => Err(interp.throw_error(
            ErrorKind::SyntaxError,
            format!("Unexpected token in JSON at line {} column {}", err.line(), err.column()),
        )),
    }
}

fn from_json(interp: &Interpreter<'_>, json: Json) -> Value {
    match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(b),
        Json::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
        Json::String(s) => Value::from(s),
        Json::Array(items) => {
            let items = items.into_iter().map(|item| from_json(interp, item)).collect();
            interp.realm().new_array(items)
        }
        Json::Object(map) => {
            let obj = interp.realm().new_object();
            for (key, member) in map {
                obj.set_own(&key, from_json(interp, member));
            }
            Value::Object(obj)
        }
    }
}
