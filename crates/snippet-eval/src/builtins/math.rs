//! The `Math` namespace.

use crate::builtins::{arg, define_global, native};
use crate::error::EvalResult;
use crate::interpreter::Interpreter;
use crate::realm::Realm;
use crate::value::Value;

/// Single-argument functions that map straight onto `f64` methods.
const UNARY: &[(&str, fn(f64) -> f64)] = &[
    ("abs", f64::abs),
    ("floor", f64::floor),
    ("ceil", f64::ceil),
    ("round", js_round),
    ("trunc", f64::trunc),
    ("sign", js_sign),
    ("sqrt", f64::sqrt),
    ("cbrt", f64::cbrt),
    ("log", f64::ln),
    ("log2", f64::log2),
    ("log10", f64::log10),
    ("exp", f64::exp),
    ("sin", f64::sin),
    ("cos", f64::cos),
    ("tan", f64::tan),
    ("asin", f64::asin),
    ("acos", f64::acos),
    ("atan", f64::atan),
];

const CONSTANTS: &[(&str, f64)] = &[
    ("PI", std::f64::consts::PI),
    ("E", std::f64::consts::E),
    ("LN2", std::f64::consts::LN_2),
    ("LN10", std::f64::consts::LN_10),
    ("LOG2E", std::f64::consts::LOG2_E),
    ("LOG10E", std::f64::consts::LOG10_E),
    ("SQRT2", std::f64::consts::SQRT_2),
    ("SQRT1_2", std::f64::consts::FRAC_1_SQRT_2),
];

pub(crate) fn install(realm: &Realm) {
    let math = realm.new_object();
    for &(name, value) in CONSTANTS {
        math.set_own(name, Value::Number(value));
    }
    for &(name, op) in UNARY {
        let func = native(move |interp, _this, args| {
            let x = interp.to_number(&arg(args, 0))?;
            Ok(Value::Number(op(x)))
        });
        math.set_own(name, realm.new_native(name, func));
    }
    crate::builtins::define_methods(
        realm,
        &math,
        &[
            ("pow", pow),
            ("atan2", atan2),
            ("min", min),
            ("max", max),
            ("hypot", hypot),
            ("random", random),
        ],
    );
    define_global(realm, "Math", Value::Object(math));
}

/// Rounds half up, so `-2.5` becomes `-2`.
fn js_round(x: f64) -> f64 {
    if !x.is_finite() || x.fract() == 0.0 {
        return x;
    }
    let rounded = (x + 0.5).floor();
    if rounded == 0.0 && x < 0.0 {
        -0.0
    } else {
        rounded
    }
}

fn js_sign(x: f64) -> f64 {
    if x.is_nan() || x == 0.0 {
        x
    } else {
        x.signum()
    }
}

fn numbers(interp: &mut Interpreter<'_>, args: &[Value]) -> EvalResult<Vec<f64>> {
    args.iter().map(|value| interp.to_number(value)).collect()
}

fn pow(interp: &mut Interpreter<'_>, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    let base = interp.to_number(&arg(args, 0))?;
    let exponent = interp.to_number(&arg(args, 1))?;
    Ok(Value::Number(crate::ops::js_pow(base, exponent)))
}

fn atan2(interp: &mut Interpreter<'_>, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    let y = interp.to_number(&arg(args, 0))?;
    let x = interp.to_number(&arg(args, 1))?;
    Ok(Value::Number(y.atan2(x)))
}

fn min(interp: &mut Interpreter<'_>, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    let values = numbers(interp, args)?;
    Ok(Value::Number(values.into_iter().fold(f64::INFINITY, |acc, x| {
        if acc.is_nan() || x.is_nan() {
            f64::NAN
        } else if x < acc || (x == 0.0 && acc == 0.0 && x.is_sign_negative()) {
            x
        } else {
            acc
        }
    })))
}

fn max(interp: &mut Interpreter<'_>, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    let values = numbers(interp, args)?;
    Ok(Value::Number(values.into_iter().fold(f64::NEG_INFINITY, |acc, x| {
        if acc.is_nan() || x.is_nan() {
            f64::NAN
        } else if x > acc || (x == 0.0 && acc == 0.0 && x.is_sign_positive()) {
            x
        } else {
            acc
        }
    })))
}

fn hypot(interp: &mut Interpreter<'_>, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    let values = numbers(interp, args)?;
    if values.iter().any(|x| x.is_infinite()) {
        return Ok(Value::Number(f64::INFINITY));
    }
    Ok(Value::Number(values.iter().map(|x| x * x).sum::<f64>().sqrt()))
}

fn random(interp: &mut Interpreter<'_>, _this: &Value, _args: &[Value]) -> EvalResult<Value> {
    Ok(Value::Number(interp.realm().next_random()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_js_round_half_up() {
        assert_eq!(js_round(2.5), 3.0);
        assert_eq!(js_round(-2.5), -2.0);
        assert_eq!(js_round(1.4), 1.0);
        assert!(js_round(-0.4).is_sign_negative());
        assert!(js_round(f64::NAN).is_nan());
    }

    #[test]
    fn test_js_sign() {
        assert_eq!(js_sign(-3.0), -1.0);
        assert_eq!(js_sign(7.0), 1.0);
        assert_eq!(js_sign(0.0), 0.0);
        assert!(js_sign(f64::NAN).is_nan());
    }
}
