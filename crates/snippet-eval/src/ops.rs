//! Binary operators: arithmetic, comparison, equality, `in`, `instanceof`.

use std::cmp::Ordering;
use std::rc::Rc;

use num_bigint::{BigInt, Sign};
use num_traits::{ToPrimitive, Zero};
use snippet_types::ast::BinOp;

use crate::error::EvalResult;
use crate::expr::parse_bigint_literal;
use crate::interpreter::{Hint, Interpreter};
use crate::value::Value;

/// Largest exponent accepted by bigint `**`.
const MAX_BIGINT_EXPONENT: u32 = 1_000_000;

/// ToNumeric result.
pub(crate) enum Numeric {
    Number(f64),
    BigInt(Rc<BigInt>),
}

impl Interpreter<'_> {
    pub(crate) fn to_numeric(&mut self, value: &Value) -> EvalResult<Numeric> {
        match self.to_primitive(value, Hint::Number)? {
            Value::BigInt(b) => Ok(Numeric::BigInt(b)),
            other => self.to_number(&other).map(Numeric::Number),
        }
    }

    pub(crate) fn binary_op(&mut self, op: BinOp, left: &Value, right: &Value) -> EvalResult<Value> {
        match op {
            BinOp::StrictEq => Ok(Value::Bool(left.strict_equals(right))),
            BinOp::StrictNotEq => Ok(Value::Bool(!left.strict_equals(right))),
            BinOp::Eq => self.loose_equals(left, right).map(Value::Bool),
            BinOp::NotEq => self.loose_equals(left, right).map(|eq| Value::Bool(!eq)),
            BinOp::Less | BinOp::Greater | BinOp::LessEq | BinOp::GreaterEq => {
                self.compare(op, left, right)
            }
            BinOp::In => self.eval_in(left, right),
            BinOp::InstanceOf => self.instance_of(left, right),
            BinOp::Add => self.add(left, right),
            BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod | BinOp::Exp => {
                self.arithmetic(op, left, right)
            }
        }
    }

    // ── Arithmetic ──

    fn add(&mut self, left: &Value, right: &Value) -> EvalResult<Value> {
        let left = self.to_primitive(left, Hint::Default)?;
        let right = self.to_primitive(right, Hint::Default)?;
        if matches!(left, Value::String(_)) || matches!(right, Value::String(_)) {
            let mut text = self.to_string(&left)?.to_string();
            text.push_str(&self.to_string(&right)?);
            return Ok(Value::from(text));
        }
        self.arithmetic(BinOp::Add, &left, &right)
    }

    fn arithmetic(&mut self, op: BinOp, left: &Value, right: &Value) -> EvalResult<Value> {
        match (self.to_numeric(left)?, self.to_numeric(right)?) {
            (Numeric::Number(a), Numeric::Number(b)) => Ok(Value::Number(number_op(op, a, b))),
            (Numeric::BigInt(a), Numeric::BigInt(b)) => self.bigint_op(op, &a, &b).map(Value::from),
            _ => Err(self.type_error("Cannot mix BigInt and other types, use explicit conversions")),
        }
    }

    fn bigint_op(&self, op: BinOp, a: &BigInt, b: &BigInt) -> EvalResult<BigInt> {
        match op {
            BinOp::Add => Ok(a + b),
            BinOp::Sub => Ok(a - b),
            BinOp::Mul => Ok(a * b),
            BinOp::Div | BinOp::Mod if b.is_zero() => Err(self.range_error("Division by zero")),
            BinOp::Div => Ok(a / b),
            BinOp::Mod => Ok(a % b),
            BinOp::Exp => {
                if b.sign() == Sign::Minus {
                    return Err(self.range_error("Exponent must be non-negative"));
                }
                match b.to_u32().filter(|&e| e <= MAX_BIGINT_EXPONENT) {
                    Some(exponent) => Ok(a.pow(exponent)),
                    None => Err(self.range_error("Maximum BigInt size exceeded")),
                }
            }
            _ => Err(self.type_error(format!("Unsupported bigint operator {}", op.as_str()))),
        }
    }

    // ── Comparison ──

    fn compare(&mut self, op: BinOp, left: &Value, right: &Value) -> EvalResult<Value> {
        let left = self.to_primitive(left, Hint::Number)?;
        let right = self.to_primitive(right, Hint::Number)?;
        let ordering = match (&left, &right) {
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::BigInt(a), Value::BigInt(b)) => Some(a.cmp(b)),
            _ => {
                let a = self.numeric_value(&left)?;
                let b = self.numeric_value(&right)?;
                a.partial_cmp(&b)
            }
        };
        let result = match ordering {
            None => false,
            Some(ordering) => match op {
                BinOp::Less => ordering == Ordering::Less,
                BinOp::Greater => ordering == Ordering::Greater,
                BinOp::LessEq => ordering != Ordering::Greater,
                _ => ordering != Ordering::Less,
            },
        };
        Ok(Value::Bool(result))
    }

    /// A primitive as `f64`, with bigints converted (possibly lossily).
    fn numeric_value(&mut self, value: &Value) -> EvalResult<f64> {
        match value {
            Value::BigInt(b) => Ok(b.to_f64().unwrap_or(f64::NAN)),
            other => self.to_number(other),
        }
    }

    /// `==`
    pub(crate) fn loose_equals(&mut self, left: &Value, right: &Value) -> EvalResult<bool> {
        Ok(match (left, right) {
            (Value::Undefined | Value::Null, Value::Undefined | Value::Null) => true,
            (Value::Undefined | Value::Null, _) | (_, Value::Undefined | Value::Null) => false,
            (Value::Number(a), Value::String(_)) => *a == self.to_number(right)?,
            (Value::String(_), Value::Number(b)) => self.to_number(left)? == *b,
            (Value::BigInt(a), Value::Number(n)) | (Value::Number(n), Value::BigInt(a)) => {
                a.to_f64() == Some(*n)
            }
            (Value::BigInt(a), Value::String(s)) | (Value::String(s), Value::BigInt(a)) => {
                parse_bigint_literal(s.trim()).is_some_and(|parsed| parsed == **a)
            }
            (Value::Bool(b), _) => {
                let number = Value::Number(if *b { 1.0 } else { 0.0 });
                self.loose_equals(&number, right)?
            }
            (_, Value::Bool(b)) => {
                let number = Value::Number(if *b { 1.0 } else { 0.0 });
                self.loose_equals(left, &number)?
            }
            (Value::Object(_), Value::Object(_)) => left.strict_equals(right),
            (Value::Object(_), _) => {
                let primitive = self.to_primitive(left, Hint::Default)?;
                self.loose_equals(&primitive, right)?
            }
            (_, Value::Object(_)) => {
                let primitive = self.to_primitive(right, Hint::Default)?;
                self.loose_equals(left, &primitive)?
            }
            _ => left.strict_equals(right),
        })
    }

    // ── Relations ──

    fn eval_in(&mut self, key: &Value, target: &Value) -> EvalResult<Value> {
        let Value::Object(obj) = target else {
            let key = self.display(key);
            let target = self.display(target);
            return Err(self.type_error(format!(
                "Cannot use 'in' operator to search for '{key}' in {target}"
            )));
        };
        let key = self.to_property_key(key)?;
        Ok(Value::Bool(self.has_property(obj, &key)))
    }

    fn instance_of(&mut self, value: &Value, constructor: &Value) -> EvalResult<Value> {
        if !constructor.is_callable() {
            return Err(self.type_error("Right-hand side of 'instanceof' is not callable"));
        }
        let Value::Object(obj) = value else {
            return Ok(Value::Bool(false));
        };
        match self.get_property(constructor, "prototype")? {
            Value::Object(proto) => Ok(Value::Bool(obj.inherits_from(&proto))),
            _ => Ok(Value::Bool(false)),
        }
    }
}

fn number_op(op: BinOp, a: f64, b: f64) -> f64 {
    match op {
        BinOp::Add => a + b,
        BinOp::Sub => a - b,
        BinOp::Mul => a * b,
        BinOp::Div => a / b,
        BinOp::Mod => a % b,
        BinOp::Exp => js_pow(a, b),
        _ => f64::NAN,
    }
}

/// `**` with the language's edge cases (`1 ** Infinity` is `NaN`).
pub(crate) fn js_pow(base: f64, exponent: f64) -> f64 {
    if exponent.is_nan() {
        f64::NAN
    } else if exponent == 0.0 {
        1.0
    } else if base.abs() == 1.0 && exponent.is_infinite() {
        f64::NAN
    } else {
        base.powf(exponent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_js_pow_edge_cases() {
        assert_eq!(js_pow(2.0, 10.0), 1024.0);
        assert_eq!(js_pow(f64::NAN, 0.0), 1.0);
        assert!(js_pow(1.0, f64::INFINITY).is_nan());
        assert!(js_pow(2.0, f64::NAN).is_nan());
    }

    #[test]
    fn test_number_op_remainder_keeps_dividend_sign() {
        assert_eq!(number_op(BinOp::Mod, -5.0, 2.0), -1.0);
        assert_eq!(number_op(BinOp::Mod, 5.5, 2.0), 1.5);
        assert!(number_op(BinOp::Mod, 1.0, 0.0).is_nan());
    }
}
