//! `String` and `String.prototype`. Positions count Unicode scalar values.

use std::rc::Rc;

use crate::builtins::{arg, define_global, define_methods, relative_index, to_integer};
use crate::error::EvalResult;
use crate::interpreter::Interpreter;
use crate::realm::Realm;
use crate::value::Value;

pub(crate) fn install(realm: &Realm) {
    let proto = &realm.intrinsics().string_proto;
    let ctor = realm.new_constructor("String", Rc::new(string_ctor), proto);
    define_methods(realm, &ctor, &[("fromCharCode", from_char_code)]);
    define_global(realm, "String", Value::Object(ctor));

    define_methods(
        realm,
        proto,
        &[
            ("charAt", char_at),
            ("charCodeAt", char_code_at),
            ("codePointAt", char_code_at),
            ("at", at),
            ("indexOf", index_of),
            ("lastIndexOf", last_index_of),
            ("includes", includes),
            ("startsWith", starts_with),
            ("endsWith", ends_with),
            ("slice", slice),
            ("substring", substring),
            ("toUpperCase", to_upper_case),
            ("toLowerCase", to_lower_case),
            ("trim", trim),
            ("trimStart", trim_start),
            ("trimEnd", trim_end),
            ("padStart", pad_start),
            ("padEnd", pad_end),
            ("repeat", repeat),
            ("split", split),
            ("replace", replace),
            ("replaceAll", replace_all),
            ("concat", concat),
            ("toString", string_value),
            ("valueOf", string_value),
        ],
    );
}

fn string_ctor(interp: &mut Interpreter<'_>, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    match args.first() {
        None => Ok(Value::str("")),
        Some(value) => interp.to_string(value).map(Value::String),
    }
}

fn from_char_code(interp: &mut Interpreter<'_>, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    let mut out = String::with_capacity(args.len());
    for code in args {
        let code = interp.to_number(code)?;
        let unit = if code.is_finite() { code as i64 as u16 } else { 0 };
        out.push(char::from_u32(u32::from(unit)).unwrap_or(char::REPLACEMENT_CHARACTER));
    }
    Ok(Value::from(out))
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// The receiver as a string; `null`/`undefined` are rejected.
fn this_string(interp: &mut Interpreter<'_>, this: &Value, method: &str) -> EvalResult<Rc<str>> {
    match this {
        Value::String(s) => Ok(s.clone()),
        Value::Undefined | Value::Null => Err(interp.type_error(format!(
            "String.prototype.{method} called on null or undefined"
        ))),
        other => interp.to_string(other),
    }
}

fn this_chars(interp: &mut Interpreter<'_>, this: &Value, method: &str) -> EvalResult<Vec<char>> {
    Ok(this_string(interp, this, method)?.chars().collect())
}

fn string_arg(interp: &mut Interpreter<'_>, args: &[Value], i: usize) -> EvalResult<Rc<str>> {
    interp.to_string(&arg(args, i))
}

/// First char position `>= from` where `needle` occurs.
fn find_chars(haystack: &[char], needle: &[char], from: usize) -> Option<usize> {
    if needle.len() > haystack.len() {
        return None;
    }
    (from..=haystack.len() - needle.len()).find(|&i| haystack[i..].starts_with(needle))
}

/// Last char position `<= until` where `needle` occurs.
fn rfind_chars(haystack: &[char], needle: &[char], until: usize) -> Option<usize> {
    if needle.len() > haystack.len() {
        return None;
    }
    let last = (haystack.len() - needle.len()).min(until);
    (0..=last).rev().find(|&i| haystack[i..].starts_with(needle))
}

fn collect(chars: &[char]) -> Value {
    Value::from(chars.iter().collect::<String>())
}

fn position(interp: &mut Interpreter<'_>, value: &Value, len: usize) -> EvalResult<usize> {
    Ok(to_integer(interp, value)?.clamp(0.0, len as f64) as usize)
}

// ══════════════════════════════════════════════════════════════════════════════
// Access
// ══════════════════════════════════════════════════════════════════════════════

fn char_at(interp: &mut Interpreter<'_>, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let chars = this_chars(interp, this, "charAt")?;
    let index = to_integer(interp, &arg(args, 0))?;
    if index < 0.0 {
        return Ok(Value::str(""));
    }
    Ok(chars
        .get(index as usize)
        .map_or_else(|| Value::str(""), |c| Value::from(c.to_string())))
}

fn char_code_at(interp: &mut Interpreter<'_>, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let chars = this_chars(interp, this, "charCodeAt")?;
    let index = to_integer(interp, &arg(args, 0))?;
    let code = if index < 0.0 {
        None
    } else {
        chars.get(index as usize).map(|&c| f64::from(u32::from(c)))
    };
    Ok(Value::Number(code.unwrap_or(f64::NAN)))
}

fn at(interp: &mut Interpreter<'_>, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let chars = this_chars(interp, this, "at")?;
    let index = to_integer(interp, &arg(args, 0))?;
    let resolved = if index < 0.0 { chars.len() as f64 + index } else { index };
    if resolved < 0.0 {
        return Ok(Value::Undefined);
    }
    Ok(chars
        .get(resolved as usize)
        .map(|c| Value::from(c.to_string()))
        .unwrap_or_default())
}

fn string_value(interp: &mut Interpreter<'_>, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    match this {
        Value::String(_) => Ok(this.clone()),
        _ => Err(interp.type_error("String.prototype.toString requires that 'this' be a String")),
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Search
// ══════════════════════════════════════════════════════════════════════════════

fn index_of(interp: &mut Interpreter<'_>, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let chars = this_chars(interp, this, "indexOf")?;
    let needle: Vec<char> = string_arg(interp, args, 0)?.chars().collect();
    let from = position(interp, &arg(args, 1), chars.len())?;
    let found = find_chars(&chars, &needle, from).map(|i| i as f64);
    Ok(Value::Number(found.unwrap_or(-1.0)))
}

fn last_index_of(interp: &mut Interpreter<'_>, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let chars = this_chars(interp, this, "lastIndexOf")?;
    let needle: Vec<char> = string_arg(interp, args, 0)?.chars().collect();
    let until = match arg(args, 1) {
        Value::Undefined => chars.len(),
        other => {
            let n = interp.to_number(&other)?;
            if n.is_nan() { chars.len() } else { n.clamp(0.0, chars.len() as f64) as usize }
        }
    };
    let found = rfind_chars(&chars, &needle, until).map(|i| i as f64);
    Ok(Value::Number(found.unwrap_or(-1.0)))
}

fn includes(interp: &mut Interpreter<'_>, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let chars = this_chars(interp, this, "includes")?;
    let needle: Vec<char> = string_arg(interp, args, 0)?.chars().collect();
    let from = position(interp, &arg(args, 1), chars.len())?;
    Ok(Value::Bool(find_chars(&chars, &needle, from).is_some()))
}

fn starts_with(interp: &mut Interpreter<'_>, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let chars = this_chars(interp, this, "startsWith")?;
    let needle: Vec<char> = string_arg(interp, args, 0)?.chars().collect();
    let from = position(interp, &arg(args, 1), chars.len())?;
    Ok(Value::Bool(chars[from..].starts_with(&needle)))
}

fn ends_with(interp: &mut Interpreter<'_>, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let chars = this_chars(interp, this, "endsWith")?;
    let needle: Vec<char> = string_arg(interp, args, 0)?.chars().collect();
    let end = match arg(args, 1) {
        Value::Undefined => chars.len(),
        other => position(interp, &other, chars.len())?,
    };
    Ok(Value::Bool(chars[..end].ends_with(&needle)))
}

// ══════════════════════════════════════════════════════════════════════════════
// Transforms
// ══════════════════════════════════════════════════════════════════════════════

fn slice(interp: &mut Interpreter<'_>, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let chars = this_chars(interp, this, "slice")?;
    let start = relative_index(interp, &arg(args, 0), chars.len(), 0)?;
    let end = relative_index(interp, &arg(args, 1), chars.len(), chars.len())?;
    Ok(collect(chars.get(start..end.max(start)).unwrap_or_default()))
}

fn substring(interp: &mut Interpreter<'_>, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let chars = this_chars(interp, this, "substring")?;
    let start = position(interp, &arg(args, 0), chars.len())?;
    let end = match arg(args, 1) {
        Value::Undefined => chars.len(),
        other => position(interp, &other, chars.len())?,
    };
    let (low, high) = if start <= end { (start, end) } else { (end, start) };
    Ok(collect(&chars[low..high]))
}

fn to_upper_case(interp: &mut Interpreter<'_>, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    Ok(Value::from(this_string(interp, this, "toUpperCase")?.to_uppercase()))
}

fn to_lower_case(interp: &mut Interpreter<'_>, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    Ok(Value::from(this_string(interp, this, "toLowerCase")?.to_lowercase()))
}

fn trim(interp: &mut Interpreter<'_>, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    Ok(Value::from(this_string(interp, this, "trim")?.trim()))
}

fn trim_start(interp: &mut Interpreter<'_>, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    Ok(Value::from(this_string(interp, this, "trimStart")?.trim_start()))
}

fn trim_end(interp: &mut Interpreter<'_>, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    Ok(Value::from(this_string(interp, this, "trimEnd")?.trim_end()))
}

/// Filler of `fill` repeated and cut to `count` chars.
fn padding(fill: &str, count: usize) -> String {
    fill.chars().cycle().take(count).collect()
}

fn pad(
    interp: &mut Interpreter<'_>,
    this: &Value,
    args: &[Value],
    method: &str,
    at_start: bool,
) -> EvalResult<Value> {
    let s = this_string(interp, this, method)?;
    let target = to_integer(interp, &arg(args, 0))?;
    let fill = match arg(args, 1) {
        Value::Undefined => Rc::from(" "),
        other => interp.to_string(&other)?,
    };
    let len = s.chars().count();
    if target <= len as f64 || fill.is_empty() {
        return Ok(Value::String(s));
    }
    if target > MAX_STRING_LENGTH as f64 {
        return Err(interp.range_error("Invalid string length"));
    }
    let filler = padding(&fill, target as usize - len);
    Ok(Value::from(if at_start {
        format!("{filler}{s}")
    } else {
        format!("{s}{filler}")
    }))
}

fn pad_start(interp: &mut Interpreter<'_>, this: &Value, args: &[Value]) -> EvalResult<Value> {
    pad(interp, this, args, "padStart", true)
}

fn pad_end(interp: &mut Interpreter<'_>, this: &Value, args: &[Value]) -> EvalResult<Value> {
    pad(interp, this, args, "padEnd", false)
}

/// Longest string `repeat` builds.
const MAX_STRING_LENGTH: usize = 1 << 28;

fn repeat(interp: &mut Interpreter<'_>, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let s = this_string(interp, this, "repeat")?;
    let count = to_integer(interp, &arg(args, 0))?;
    if count < 0.0 || count.is_infinite() {
        let shown = interp.display(&arg(args, 0));
        return Err(interp.range_error(format!("Invalid count value: {shown}")));
    }
    if s.len() as f64 * count > MAX_STRING_LENGTH as f64 {
        return Err(interp.range_error("Invalid string length"));
    }
    Ok(Value::from(s.repeat(count as usize)))
}

fn concat(interp: &mut Interpreter<'_>, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let mut out = this_string(interp, this, "concat")?.to_string();
    for value in args {
        out.push_str(&interp.to_string(value)?);
    }
    Ok(Value::from(out))
}

fn split(interp: &mut Interpreter<'_>, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let s = this_string(interp, this, "split")?;
    let limit = match arg(args, 1) {
        Value::Undefined => usize::MAX,
        other => interp.to_number(&other)?.max(0.0) as usize,
    };
    let parts: Vec<Value> = match arg(args, 0) {
        Value::Undefined => vec![Value::String(s)],
        separator => {
            let separator = interp.to_string(&separator)?;
            if separator.is_empty() {
                s.chars().map(|c| Value::from(c.to_string())).collect()
            } else {
                s.split(separator.as_ref()).map(Value::from).collect()
            }
        }
    };
    let parts = parts.into_iter().take(limit).collect();
    Ok(interp.realm().new_array(parts))
}

// ── Replacement ──

/// Expand `$$`, `$&`, `` $` `` and `$'` in a replacement template.
fn expand_template(template: &str, matched: &str, before: &str, after: &str) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('$') => out.push('$'),
            Some('&') => out.push_str(matched),
            Some('`') => out.push_str(before),
            Some('\'') => out.push_str(after),
            _ => {
                out.push('$');
                continue;
            }
        }
        chars.next();
    }
    out
}

fn replace_impl(
    interp: &mut Interpreter<'_>,
    this: &Value,
    args: &[Value],
    method: &str,
    all: bool,
) -> EvalResult<Value> {
    let s = this_string(interp, this, method)?;
    let pattern = string_arg(interp, args, 0)?;
    let replacement = arg(args, 1);
    let template = if replacement.is_callable() {
        None
    } else {
        Some(interp.to_string(&replacement)?)
    };

    let mut matches: Vec<usize> = s.match_indices(pattern.as_ref()).map(|(i, _)| i).collect();
    if !all {
        matches.truncate(1);
    }

    let mut out = String::with_capacity(s.len());
    let mut last = 0;
    for start in matches {
        let end = start + pattern.len();
        out.push_str(&s[last..start]);
        match &template {
            Some(template) => {
                out.push_str(&expand_template(template, &pattern, &s[..start], &s[end..]))
            }
            None => {
                let offset = s[..start].chars().count() as f64;
                let result = interp.call(
                    &replacement,
                    &Value::Undefined,
                    &[
                        Value::String(pattern.clone()),
                        Value::Number(offset),
                        Value::String(s.clone()),
                    ],
                )?;
                out.push_str(&interp.to_string(&result)?);
            }
        }
        last = end;
    }
    out.push_str(&s[last..]);
    Ok(Value::from(out))
}

fn replace(interp: &mut Interpreter<'_>, this: &Value, args: &[Value]) -> EvalResult<Value> {
    replace_impl(interp, this, args, "replace", false)
}

fn replace_all(interp: &mut Interpreter<'_>, this: &Value, args: &[Value]) -> EvalResult<Value> {
    replace_impl(interp, this, args, "replaceAll", true)
}
