//! `Number`, `Boolean`, `BigInt` and the global value functions.

use std::rc::Rc;

use num_bigint::BigInt;
use num_traits::{FromPrimitive, ToPrimitive};

use crate::builtins::{arg, define_global, define_methods, to_integer, Builtin};
use crate::error::{ErrorKind, EvalResult};
use crate::expr::parse_bigint_literal;
use crate::interpreter::Interpreter;
use crate::realm::Realm;
use crate::value::{number_to_string, Value};

pub(crate) fn install(realm: &Realm) {
    let global = realm.global();
    global.define("undefined", Value::Undefined, false);
    global.define("NaN", Value::Number(f64::NAN), false);
    global.define("Infinity", Value::Number(f64::INFINITY), false);

    let intrinsics = realm.intrinsics();

    // ── Number ──
    let number = realm.new_constructor("Number", Rc::new(number_ctor), &intrinsics.number_proto);
    define_methods(
        realm,
        &number,
        &[
            ("isInteger", is_integer),
            ("isSafeInteger", is_safe_integer),
            ("isFinite", number_is_finite),
            ("isNaN", number_is_nan),
            ("parseFloat", parse_float),
            ("parseInt", parse_int),
        ],
    );
    for (name, value) in [
        ("MAX_SAFE_INTEGER", MAX_SAFE_INTEGER),
        ("MIN_SAFE_INTEGER", -MAX_SAFE_INTEGER),
        ("EPSILON", f64::EPSILON),
        ("MAX_VALUE", f64::MAX),
        ("MIN_VALUE", 5e-324),
        ("POSITIVE_INFINITY", f64::INFINITY),
        ("NEGATIVE_INFINITY", f64::NEG_INFINITY),
        ("NaN", f64::NAN),
    ] {
        number.set_own(name, Value::Number(value));
    }
    define_global(realm, "Number", Value::Object(number));
    define_methods(
        realm,
        &intrinsics.number_proto,
        &[
            ("toString", number_to_string_method),
            ("toFixed", to_fixed),
            ("valueOf", number_value_of),
        ],
    );

    // ── Boolean ──
    let boolean = realm.new_constructor("Boolean", Rc::new(boolean_ctor), &intrinsics.boolean_proto);
    define_global(realm, "Boolean", Value::Object(boolean));
    define_methods(
        realm,
        &intrinsics.boolean_proto,
        &[("toString", boolean_to_string), ("valueOf", boolean_value_of)],
    );

    // ── BigInt ──
    // Callable but not constructible.
    let bigint = realm.new_native("BigInt", Rc::new(bigint_ctor));
    if let Value::Object(ctor) = &bigint {
        ctor.set_own("prototype", Value::Object(intrinsics.bigint_proto.clone()));
        intrinsics.bigint_proto.set_own("constructor", bigint.clone());
    }
    define_global(realm, "BigInt", bigint);
    define_methods(
        realm,
        &intrinsics.bigint_proto,
        &[("toString", bigint_to_string), ("valueOf", bigint_value_of)],
    );

    // ── Global functions ──
    for (name, func) in [
        ("parseInt", parse_int as Builtin),
        ("parseFloat", parse_float),
        ("isNaN", global_is_nan),
        ("isFinite", global_is_finite),
    ] {
        define_global(realm, name, realm.new_native(name, Rc::new(func)));
    }
}

const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

// ══════════════════════════════════════════════════════════════════════════════
// Number
// ══════════════════════════════════════════════════════════════════════════════

fn number_ctor(interp: &mut Interpreter<'_>, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    let n = match args.first() {
        None => 0.0,
        Some(Value::BigInt(b)) => b.to_f64().unwrap_or(f64::NAN),
        Some(value) => interp.to_number(value)?,
    };
    Ok(Value::Number(n))
}

fn number_arg(args: &[Value]) -> Option<f64> {
    match args.first() {
        Some(Value::Number(n)) => Some(*n),
        _ => None,
    }
}

fn is_integer(_interp: &mut Interpreter<'_>, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    Ok(Value::Bool(
        number_arg(args).is_some_and(|n| n.is_finite() && n.fract() == 0.0),
    ))
}

fn is_safe_integer(_interp: &mut Interpreter<'_>, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    Ok(Value::Bool(number_arg(args).is_some_and(|n| {
        n.is_finite() && n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER
    })))
}

fn number_is_finite(_interp: &mut Interpreter<'_>, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    Ok(Value::Bool(number_arg(args).is_some_and(f64::is_finite)))
}

fn number_is_nan(_interp: &mut Interpreter<'_>, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    Ok(Value::Bool(number_arg(args).is_some_and(f64::is_nan)))
}

fn this_number(interp: &Interpreter<'_>, this: &Value, method: &str) -> EvalResult<f64> {
    match this {
        Value::Number(n) => Ok(*n),
        _ => Err(interp.type_error(format!(
            "Number.prototype.{method} requires that 'this' be a Number"
        ))),
    }
}

fn radix_arg(interp: &mut Interpreter<'_>, args: &[Value]) -> EvalResult<u32> {
    let radix = match arg(args, 0) {
        Value::Undefined => return Ok(10),
        other => to_integer(interp, &other)?,
    };
    if !(2.0..=36.0).contains(&radix) {
        return Err(interp.range_error("toString() radix must be between 2 and 36"));
    }
    Ok(radix as u32)
}

fn number_to_string_method(interp: &mut Interpreter<'_>, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let n = this_number(interp, this, "toString")?;
    let radix = radix_arg(interp, args)?;
    Ok(Value::from(number_to_radix(n, radix)))
}

/// Digits of `n` in `radix`, with up to 20 fractional digits.
fn number_to_radix(n: f64, radix: u32) -> String {
    if radix == 10 || !n.is_finite() {
        return number_to_string(n);
    }
    let mut out = String::new();
    if n < 0.0 {
        out.push('-');
    }
    let magnitude = n.abs();
    let mut integer = magnitude.trunc();
    let mut digits = Vec::new();
    loop {
        let digit = (integer % f64::from(radix)) as u32;
        digits.push(char::from_digit(digit, radix).unwrap_or('0'));
        integer = (integer / f64::from(radix)).trunc();
        if integer < 1.0 {
            break;
        }
    }
    out.extend(digits.iter().rev());

    let mut fraction = magnitude.fract();
    if fraction > 0.0 {
        out.push('.');
        for _ in 0..20 {
            fraction *= f64::from(radix);
            let digit = fraction.trunc() as u32;
            out.push(char::from_digit(digit, radix).unwrap_or('0'));
            fraction = fraction.fract();
            if fraction == 0.0 {
                break;
            }
        }
    }
    out
}

fn to_fixed(interp: &mut Interpreter<'_>, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let n = this_number(interp, this, "toFixed")?;
    let digits = to_integer(interp, &arg(args, 0))?;
    if !(0.0..=100.0).contains(&digits) {
        return Err(interp.range_error("toFixed() digits argument must be between 0 and 100"));
    }
    if !n.is_finite() || n.abs() >= 1e21 {
        return Ok(Value::from(number_to_string(n)));
    }
    // `-0` prints without its sign.
    let n = if n == 0.0 { 0.0 } else { n };
    Ok(Value::from(format!("{:.*}", digits as usize, n)))
}

fn number_value_of(interp: &mut Interpreter<'_>, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    this_number(interp, this, "valueOf").map(Value::Number)
}

// ══════════════════════════════════════════════════════════════════════════════
// Boolean
// ══════════════════════════════════════════════════════════════════════════════

fn boolean_ctor(_interp: &mut Interpreter<'_>, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    Ok(Value::Bool(arg(args, 0).truthy()))
}

fn this_boolean(interp: &Interpreter<'_>, this: &Value, method: &str) -> EvalResult<bool> {
    match this {
        Value::Bool(b) => Ok(*b),
        _ => Err(interp.type_error(format!(
            "Boolean.prototype.{method} requires that 'this' be a Boolean"
        ))),
    }
}

fn boolean_to_string(interp: &mut Interpreter<'_>, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    let b = this_boolean(interp, this, "toString")?;
    Ok(Value::str(if b { "true" } else { "false" }))
}

fn boolean_value_of(interp: &mut Interpreter<'_>, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    this_boolean(interp, this, "valueOf").map(Value::Bool)
}

// ══════════════════════════════════════════════════════════════════════════════
// BigInt
// ══════════════════════════════════════════════════════════════════════════════

fn bigint_ctor(interp: &mut Interpreter<'_>, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    let value = arg(args, 0);
    let primitive = match &value {
        Value::Object(_) => Value::String(interp.to_string(&value)?),
        other => other.clone(),
    };
    match &primitive {
        Value::BigInt(_) => Ok(primitive),
        Value::Bool(b) => Ok(Value::from(BigInt::from(u8::from(*b)))),
        Value::Number(n) => {
            let integral = n.is_finite() && n.fract() == 0.0;
            match BigInt::from_f64(*n).filter(|_| integral) {
                Some(b) => Ok(Value::from(b)),
                None => Err(interp.range_error(format!(
                    "The number {} cannot be converted to a BigInt because it is not an integer",
                    number_to_string(*n)
                ))),
            }
        }
        Value::String(s) => {
            let trimmed = s.trim();
            let parsed = if trimmed.is_empty() {
                Some(BigInt::from(0))
            } else if let Some(rest) = trimmed.strip_prefix('-') {
                BigInt::parse_bytes(rest.as_bytes(), 10).map(|b| -b)
            } else {
                parse_bigint_literal(trimmed.strip_prefix('+').unwrap_or(trimmed))
            };
            match parsed {
                Some(b) => Ok(Value::from(b)),
                None => Err(interp.throw_error(
                    ErrorKind::SyntaxError,
                    format!("Cannot convert {s} to a BigInt"),
                )),
            }
        }
        _ => {
            let shown = interp.display(&primitive);
            Err(interp.type_error(format!("Cannot convert {shown} to a BigInt")))
        }
    }
}

fn this_bigint(interp: &Interpreter<'_>, this: &Value, method: &str) -> EvalResult<Rc<BigInt>> {
    match this {
        Value::BigInt(b) => Ok(b.clone()),
        _ => Err(interp.type_error(format!(
            "BigInt.prototype.{method} requires that 'this' be a BigInt"
        ))),
    }
}

fn bigint_to_string(interp: &mut Interpreter<'_>, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let b = this_bigint(interp, this, "toString")?;
    let radix = radix_arg(interp, args)?;
    Ok(Value::from(b.to_str_radix(radix)))
}

fn bigint_value_of(interp: &mut Interpreter<'_>, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    this_bigint(interp, this, "valueOf").map(Value::BigInt)
}

// ══════════════════════════════════════════════════════════════════════════════
// Global Functions
// ══════════════════════════════════════════════════════════════════════════════

fn parse_int(interp: &mut Interpreter<'_>, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    let text = interp.to_string(&arg(args, 0))?;
    let radix = match arg(args, 1) {
        Value::Undefined => 0,
        other => to_integer(interp, &other)? as i64,
    };
    Ok(Value::Number(parse_int_prefix(&text, radix)))
}

/// Integer prefix of `text` in `radix` (0 means 10, or 16 after `0x`).
fn parse_int_prefix(text: &str, radix: i64) -> f64 {
    let mut s = text.trim_start();
    let mut sign = 1.0;
    if let Some(rest) = s.strip_prefix('-') {
        sign = -1.0;
        s = rest;
    } else if let Some(rest) = s.strip_prefix('+') {
        s = rest;
    }
    let mut radix = radix;
    let hex_prefix = s.get(..2).is_some_and(|p| p.eq_ignore_ascii_case("0x"));
    if (radix == 0 || radix == 16) && hex_prefix {
        s = &s[2..];
        radix = 16;
    }
    if radix == 0 {
        radix = 10;
    }
    if !(2..=36).contains(&radix) {
        return f64::NAN;
    }
    let mut result: Option<f64> = None;
    for c in s.chars() {
        let Some(digit) = c.to_digit(radix as u32) else {
            break;
        };
        result = Some(result.unwrap_or(0.0) * radix as f64 + f64::from(digit));
    }
    result.map_or(f64::NAN, |n| sign * n)
}

fn parse_float(interp: &mut Interpreter<'_>, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    let text = interp.to_string(&arg(args, 0))?;
    Ok(Value::Number(parse_float_prefix(&text)))
}

/// Longest decimal literal prefix of `text`.
fn parse_float_prefix(text: &str) -> f64 {
    let s = text.trim_start();
    let unsigned = s.trim_start_matches(['+', '-']);
    if unsigned.starts_with("Infinity") && s.len() - unsigned.len() <= 1 {
        return if s.starts_with('-') { f64::NEG_INFINITY } else { f64::INFINITY };
    }

    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let mut seen_digit = false;
    let mut seen_dot = false;
    while let Some(&b) = bytes.get(end) {
        match b {
            b'0'..=b'9' => seen_digit = true,
            b'.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end += 1;
    }
    if !seen_digit {
        return f64::NAN;
    }
    // Exponent only counts when digits follow it.
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > digits_start {
            end = exp_end;
        }
    }
    s[..end].parse().unwrap_or(f64::NAN)
}

fn global_is_nan(interp: &mut Interpreter<'_>, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    Ok(Value::Bool(interp.to_number(&arg(args, 0))?.is_nan()))
}

fn global_is_finite(interp: &mut Interpreter<'_>, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    Ok(Value::Bool(interp.to_number(&arg(args, 0))?.is_finite()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_int_prefix() {
        assert_eq!(parse_int_prefix("42px", 0), 42.0);
        assert_eq!(parse_int_prefix("  -17", 0), -17.0);
        assert_eq!(parse_int_prefix("0x1f", 0), 31.0);
        assert_eq!(parse_int_prefix("ff", 16), 255.0);
        assert_eq!(parse_int_prefix("101", 2), 5.0);
        assert!(parse_int_prefix("px", 0).is_nan());
        assert!(parse_int_prefix("1", 99).is_nan());
    }

    #[test]
    fn test_parse_float_prefix() {
        assert_eq!(parse_float_prefix("3.14abc"), 3.14);
        assert_eq!(parse_float_prefix(" -2.5e3x"), -2500.0);
        assert_eq!(parse_float_prefix("1e"), 1.0);
        assert_eq!(parse_float_prefix(".5"), 0.5);
        assert_eq!(parse_float_prefix("-Infinity"), f64::NEG_INFINITY);
        assert!(parse_float_prefix("abc").is_nan());
    }

    #[test]
    fn test_number_to_radix() {
        assert_eq!(number_to_radix(255.0, 16), "ff");
        assert_eq!(number_to_radix(-5.0, 2), "-101");
        assert_eq!(number_to_radix(0.5, 2), "0.1");
        assert_eq!(number_to_radix(0.0, 16), "0");
        assert_eq!(number_to_radix(12.5, 10), "12.5");
    }
}
