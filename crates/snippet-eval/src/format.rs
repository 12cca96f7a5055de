//! The value formatter: renders any runtime value as display text.
//!
//! Formatting never fails. Objects are serialized as indented JSON; when
//! that fails the formatter falls back to the value's plain string form,
//! and when that fails too, to [`UNFORMATTABLE`].

use std::collections::HashSet;

use serde_json::{Map, Number, Value as Json};

use crate::value::{number_to_string, ObjectRef, Value};

/// Last-resort output when no representation could be produced.
pub const UNFORMATTABLE: &str = "[Unformattable value]";

/// How many times deeper than the structured tier the plain-string tier may
/// nest.
const PLAIN_DEPTH_FACTOR: usize = 16;

/// Marker for a value met again during one serialization pass.
pub const CIRCULAR: &str = "[Circular]";

/// Why a formatting tier gave up. Never escapes [`ValueFormatter::format`].
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("value nested deeper than {0} levels")]
    TooDeep(usize),
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Renders values for the output panel.
#[derive(Debug, Clone, Copy)]
pub struct ValueFormatter {
    max_depth: usize,
}

impl Default for ValueFormatter {
    fn default() -> Self {
        Self::new(64)
    }
}

impl ValueFormatter {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Render `value`. Strings are returned verbatim, `undefined` as `""`.
    pub fn format(&self, value: &Value) -> String {
        match value {
            Value::Undefined => String::new(),
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => number_to_string(*n),
            Value::BigInt(b) => b.to_string(),
            Value::String(s) => s.to_string(),
            Value::Object(obj) => match obj.function() {
                Some(function) => function.source_text(),
                None => self.format_structure(value),
            },
        }
    }

    fn format_structure(&self, value: &Value) -> String {
        let structured = self
            .to_json(value)
            .and_then(|json| serde_json::to_string_pretty(&json).map_err(FormatError::from));
        match structured {
            Ok(text) => text,
            Err(err) => {
                tracing::debug!(error = %err, "structured formatting failed, using plain text");
                plain_string(value, self.plain_depth()).unwrap_or_else(|err| {
                    tracing::debug!(error = %err, "plain formatting failed");
                    UNFORMATTABLE.to_string()
                })
            }
        }
    }

    /// Nesting bound for the plain-string fallback.
    fn plain_depth(&self) -> usize {
        self.max_depth.saturating_mul(PLAIN_DEPTH_FACTOR)
    }

    /// The JSON document a structured value is printed as.
    pub fn to_json(&self, value: &Value) -> Result<Json, FormatError> {
        let mut seen = HashSet::new();
        self.json_value(value, &mut seen, 0)
    }

    fn json_value(
        &self,
        value: &Value,
        seen: &mut HashSet<usize>,
        depth: usize,
    ) -> Result<Json, FormatError> {
        if depth > self.max_depth {
            return Err(FormatError::TooDeep(self.max_depth));
        }
        let obj = match value {
            Value::Undefined | Value::Null => return Ok(Json::Null),
            Value::Bool(b) => return Ok(Json::Bool(*b)),
            Value::Number(n) => return Ok(json_number(*n)),
            Value::BigInt(b) => return Ok(Json::String(format!("{b}n"))),
            Value::String(s) => return Ok(Json::String(s.to_string())),
            Value::Object(obj) => obj,
        };

        if let Some(function) = obj.function() {
            let name = match function.name() {
                "" => "anonymous",
                name => name,
            };
            return Ok(Json::String(format!("[Function {name}]")));
        }
        if !seen.insert(obj.id()) {
            return Ok(Json::String(CIRCULAR.to_string()));
        }
        if obj.is_error() {
            return Ok(error_json(obj));
        }

        if let Some(items) = obj.array_elements() {
            let items = items
                .iter()
                .map(|item| self.json_value(item, seen, depth + 1))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(Json::Array(items));
        }

        let entries = obj.borrow().properties.entries();
        let mut map = Map::new();
        for (key, member) in entries {
            if member.is_undefined() {
                continue;
            }
            map.insert(key.to_string(), self.json_value(&member, seen, depth + 1)?);
        }
        Ok(Json::Object(map))
    }
}

/// Format with the default depth limit.
pub fn format(value: &Value) -> String {
    ValueFormatter::default().format(value)
}

/// Integral numbers print without a fraction; non-finite ones as `null`.
pub(crate) fn json_number(n: f64) -> Json {
    const MAX_EXACT: f64 = 9_007_199_254_740_991.0;
    if n.fract() == 0.0 && n.abs() <= MAX_EXACT {
        return Json::Number(Number::from(n as i64));
    }
    Number::from_f64(n).map_or(Json::Null, Json::Number)
}

/// `{ name, message, stack }`
fn error_json(obj: &ObjectRef) -> Json {
    let mut map = Map::new();
    for key in ["name", "message", "stack"] {
        match obj.get_raw(key) {
            None | Some(Value::Undefined) => {}
            Some(Value::String(s)) => {
                map.insert(key.to_string(), Json::String(s.to_string()));
            }
            Some(other) => {
                let text = plain_string(&other, 1).unwrap_or_default();
                map.insert(key.to_string(), Json::String(text));
            }
        }
    }
    Json::Object(map)
}

// ══════════════════════════════════════════════════════════════════════════════
// Plain String Conversion
// ══════════════════════════════════════════════════════════════════════════════

/// The value's plain string form (`String(value)` without user hooks):
/// arrays join their elements with `,`, errors print `Name: message`,
/// other objects `[object Object]`.
pub fn plain_string(value: &Value, max_depth: usize) -> Result<String, FormatError> {
    let mut active = Vec::new();
    plain_inner(value, max_depth, 0, &mut active)
}

fn plain_inner(
    value: &Value,
    max_depth: usize,
    depth: usize,
    active: &mut Vec<usize>,
) -> Result<String, FormatError> {
    if depth > max_depth {
        return Err(FormatError::TooDeep(max_depth));
    }
    let obj = match value {
        Value::Undefined => return Ok("undefined".to_string()),
        Value::Null => return Ok("null".to_string()),
        Value::Bool(b) => return Ok(b.to_string()),
        Value::Number(n) => return Ok(number_to_string(*n)),
        Value::BigInt(b) => return Ok(b.to_string()),
        Value::String(s) => return Ok(s.to_string()),
        Value::Object(obj) => obj,
    };
    if let Some(function) = obj.function() {
        return Ok(function.source_text());
    }
    if obj.is_error() {
        return Ok(error_header(obj));
    }
    let Some(items) = obj.array_elements() else {
        return Ok("[object Object]".to_string());
    };
    // A cyclic array joins to the empty string where it recurs
    if active.contains(&obj.id()) {
        return Ok(String::new());
    }
    active.push(obj.id());
    let parts = items
        .iter()
        .map(|item| match item {
            Value::Undefined | Value::Null => Ok(String::new()),
            other => plain_inner(other, max_depth, depth + 1, active),
        })
        .collect::<Result<Vec<_>, _>>();
    active.pop();
    Ok(parts?.join(","))
}

/// `Name: message`, or just the name when the message is empty.
pub(crate) fn error_header(obj: &ObjectRef) -> String {
    let text = |key: &str, fallback: &str| match obj.get_raw(key) {
        Some(Value::String(s)) => s.to_string(),
        None | Some(Value::Undefined) => fallback.to_string(),
        Some(other) => plain_string(&other, 1).unwrap_or_default(),
    };
    let name = text("name", "Error");
    let message = text("message", "");
    match (name.is_empty(), message.is_empty()) {
        (_, true) => name,
        (true, false) => message,
        (false, false) => format!("{name}: {message}"),
    }
}
