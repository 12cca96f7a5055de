//! Expression evaluation.

use std::rc::Rc;

use num_bigint::BigInt;
use snippet_types::ast::*;

use crate::env::{Lookup, Scope};
use crate::error::{ErrorKind, EvalResult};
use crate::interpreter::Interpreter;
use crate::ops::Numeric;
use crate::value::Value;

/// An assignable location.
enum Reference {
    Binding(String),
    Property(Value, Rc<str>),
}

impl Interpreter<'_> {
    pub(crate) fn eval_expr(&mut self, expr: &Expr, scope: &Scope) -> EvalResult<Value> {
        match &expr.kind {
            // ── Literals ──
            ExprKind::Number(n) => Ok(Value::Number(*n)),
            ExprKind::BigInt(text) => match parse_bigint_literal(text) {
                Some(value) => Ok(Value::from(value)),
                None => Err(self.throw_error(ErrorKind::SyntaxError, "Invalid BigInt literal")),
            },
            ExprKind::String(s) => Ok(Value::str(s)),
            ExprKind::Template(parts) => self.eval_template(parts, scope),
            ExprKind::Bool(b) => Ok(Value::Bool(*b)),
            ExprKind::Null => Ok(Value::Null),
            ExprKind::Array(elements) => self.eval_array(elements, scope),
            ExprKind::Object(properties) => self.eval_object(properties, scope),
            ExprKind::Function(node) => Ok(self.make_function(node, None, scope)),

            // ── Names ──
            ExprKind::Identifier(name) => self.lookup_identifier(name, scope),
            ExprKind::This => Ok(scope.this_value()),

            // ── Access & Calls ──
            ExprKind::Member { .. } | ExprKind::Call { .. } => {
                Ok(self.eval_chain(expr, scope)?.unwrap_or_default())
            }
            ExprKind::New { callee, args } => {
                let constructor = self.eval_expr(callee, scope)?;
                let args = self.eval_arguments(args, scope)?;
                self.current_span = expr.span;
                self.construct(&constructor, &args, expr.span, &callee_text(callee))
            }

            // ── Operators ──
            ExprKind::Unary { op, operand } => self.eval_unary(*op, operand, scope),
            ExprKind::Update { op, prefix, target } => {
                self.eval_update(*op, *prefix, target, scope)
            }
            ExprKind::Binary { left, op, right } => {
                let left = self.eval_expr(left, scope)?;
                let right = self.eval_expr(right, scope)?;
                self.binary_op(*op, &left, &right)
            }
            ExprKind::Logical { left, op, right } => {
                let left = self.eval_expr(left, scope)?;
                if short_circuits(*op, &left) {
                    Ok(left)
                } else {
                    self.eval_expr(right, scope)
                }
            }
            ExprKind::Assign { op, target, value } => self.eval_assign(*op, target, value, scope),
            ExprKind::Conditional {
                test,
                consequent,
                alternate,
            } => {
                if self.eval_expr(test, scope)?.truthy() {
                    self.eval_expr(consequent, scope)
                } else {
                    self.eval_expr(alternate, scope)
                }
            }
            ExprKind::Sequence(exprs) => {
                let mut last = Value::Undefined;
                for expr in exprs {
                    last = self.eval_expr(expr, scope)?;
                }
                Ok(last)
            }
        }
    }

    /// Evaluate `expr`, naming it `name` if it is an anonymous function.
    pub(crate) fn eval_named(&mut self, expr: &Expr, name: &str, scope: &Scope) -> EvalResult<Value> {
        match &expr.kind {
            ExprKind::Function(node) if node.name.is_none() => {
                Ok(self.make_function(node, Some(name), scope))
            }
            _ => self.eval_expr(expr, scope),
        }
    }

    fn make_function(&self, node: &Rc<FunctionNode>, inferred: Option<&str>, scope: &Scope) -> Value {
        let name = node
            .name
            .as_ref()
            .map(|n| n.name.as_str())
            .or(inferred)
            .unwrap_or("");
        self.realm().new_closure(node, scope, name)
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Literals
    // ══════════════════════════════════════════════════════════════════════════

    fn eval_template(&mut self, parts: &[TemplatePart], scope: &Scope) -> EvalResult<Value> {
        let mut out = String::new();
        for part in parts {
            match part {
                TemplatePart::Literal(text) => out.push_str(text),
                TemplatePart::Expr(expr) => {
                    let value = self.eval_expr(expr, scope)?;
                    out.push_str(&self.to_string(&value)?);
                }
            }
        }
        Ok(Value::from(out))
    }

    fn eval_array(&mut self, elements: &[ArrayElement], scope: &Scope) -> EvalResult<Value> {
        let mut items = Vec::with_capacity(elements.len());
        for element in elements {
            match element {
                ArrayElement::Expr(expr) => items.push(self.eval_expr(expr, scope)?),
                ArrayElement::Spread(expr) => {
                    let spread = self.eval_expr(expr, scope)?;
                    items.extend(self.iterate(&spread)?);
                }
                ArrayElement::Hole => items.push(Value::Undefined),
            }
        }
        Ok(self.realm().new_array(items))
    }

    fn eval_object(&mut self, properties: &[Property], scope: &Scope) -> EvalResult<Value> {
        let object = self.realm().new_object();
        for property in properties {
            match property {
                Property::KeyValue { key, value } => {
                    let key: Rc<str> = match key {
                        PropertyKey::Named(name) => Rc::from(name.as_str()),
                        PropertyKey::Computed(expr) => {
                            let key = self.eval_expr(expr, scope)?;
                            self.to_property_key(&key)?
                        }
                    };
                    let value = self.eval_named(value, &key, scope)?;
                    object.set_own(&key, value);
                }
                Property::Spread(expr) => {
                    let source = self.eval_expr(expr, scope)?;
                    self.copy_properties(&Value::Object(object.clone()), &source)?;
                }
            }
        }
        Ok(Value::Object(object))
    }

    /// Copy the own enumerable properties of `source` onto `target`
    /// (object spread, `Object.assign`).
    pub(crate) fn copy_properties(&mut self, target: &Value, source: &Value) -> EvalResult<()> {
        match source {
            Value::Object(obj) => {
                for key in obj.own_keys() {
                    let value = self.own_property(obj, &key).unwrap_or_default();
                    self.set_property(target, &key, value)?;
                }
            }
            Value::String(s) => {
                for (i, c) in s.chars().enumerate() {
                    self.set_property(target, &i.to_string(), Value::from(c.to_string()))?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Member Access & Calls
    // ══════════════════════════════════════════════════════════════════════════

    /// Evaluate a member/call chain. `None` means an optional link met
    /// `null`/`undefined` and the rest of the chain was skipped.
    fn eval_chain(&mut self, expr: &Expr, scope: &Scope) -> EvalResult<Option<Value>> {
        match &expr.kind {
            ExprKind::Member {
                object,
                property,
                optional,
            } => {
                let Some(target) = self.eval_chain(object, scope)? else {
                    return Ok(None);
                };
                if *optional && target.is_nullish() {
                    return Ok(None);
                }
                let key = self.member_key(property, scope)?;
                self.current_span = expr.span;
                self.get_property(&target, &key).map(Some)
            }
            ExprKind::Call {
                callee,
                args,
                optional,
            } => {
                let (function, this) = match &callee.kind {
                    ExprKind::Member {
                        object,
                        property,
                        optional: member_optional,
                    } => {
                        let Some(target) = self.eval_chain(object, scope)? else {
                            return Ok(None);
                        };
                        if *member_optional && target.is_nullish() {
                            return Ok(None);
                        }
                        let key = self.member_key(property, scope)?;
                        self.current_span = callee.span;
                        (self.get_property(&target, &key)?, target)
                    }
                    _ => match self.eval_chain(callee, scope)? {
                        Some(function) => (function, Value::Undefined),
                        None => return Ok(None),
                    },
                };
                if *optional && function.is_nullish() {
                    return Ok(None);
                }
                let args = self.eval_arguments(args, scope)?;
                self.current_span = expr.span;
                if !function.is_callable() {
                    return Err(self.type_error(format!(
                        "{} is not a function",
                        callee_text(callee)
                    )));
                }
                self.call_at(&function, &this, &args, expr.span).map(Some)
            }
            _ => self.eval_expr(expr, scope).map(Some),
        }
    }

    fn member_key(&mut self, property: &MemberProperty, scope: &Scope) -> EvalResult<Rc<str>> {
        match property {
            MemberProperty::Named(ident) => Ok(Rc::from(ident.name.as_str())),
            MemberProperty::Computed(expr) => {
                let key = self.eval_expr(expr, scope)?;
                self.to_property_key(&key)
            }
        }
    }

    fn eval_arguments(&mut self, args: &[Argument], scope: &Scope) -> EvalResult<Vec<Value>> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            match arg {
                Argument::Expr(expr) => values.push(self.eval_expr(expr, scope)?),
                Argument::Spread(expr) => {
                    let spread = self.eval_expr(expr, scope)?;
                    values.extend(self.iterate(&spread)?);
                }
            }
        }
        Ok(values)
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Operators
    // ══════════════════════════════════════════════════════════════════════════

    fn eval_unary(&mut self, op: UnaryOp, operand: &Expr, scope: &Scope) -> EvalResult<Value> {
        match op {
            UnaryOp::TypeOf => {
                // `typeof undeclared` is not an error
                if let ExprKind::Identifier(name) = &operand.kind {
                    if matches!(scope.get(name), Lookup::Missing) {
                        return Ok(Value::str("undefined"));
                    }
                }
                let value = self.eval_expr(operand, scope)?;
                Ok(Value::str(value.type_of()))
            }
            UnaryOp::Delete => match &operand.kind {
                ExprKind::Member {
                    object, property, ..
                } => {
                    let target = self.eval_expr(object, scope)?;
                    let key = self.member_key(property, scope)?;
                    self.delete_property(&target, &key).map(Value::Bool)
                }
                ExprKind::Identifier(_) => Ok(Value::Bool(false)),
                _ => {
                    self.eval_expr(operand, scope)?;
                    Ok(Value::Bool(true))
                }
            },
            UnaryOp::Void => {
                self.eval_expr(operand, scope)?;
                Ok(Value::Undefined)
            }
            UnaryOp::Not => Ok(Value::Bool(!self.eval_expr(operand, scope)?.truthy())),
            UnaryOp::Neg => {
                let value = self.eval_expr(operand, scope)?;
                Ok(match self.to_numeric(&value)? {
                    Numeric::Number(n) => Value::Number(-n),
                    Numeric::BigInt(b) => Value::from(-&*b),
                })
            }
            UnaryOp::Plus => {
                let value = self.eval_expr(operand, scope)?;
                self.to_number(&value).map(Value::Number)
            }
        }
    }

    fn eval_update(
        &mut self,
        op: UpdateOp,
        prefix: bool,
        target: &Expr,
        scope: &Scope,
    ) -> EvalResult<Value> {
        let reference = self.resolve_reference(target, scope)?;
        let old = self.read_reference(&reference, scope)?;
        let (old, new) = match self.to_numeric(&old)? {
            Numeric::Number(n) => {
                let delta = if op == UpdateOp::Increment { 1.0 } else { -1.0 };
                (Value::Number(n), Value::Number(n + delta))
            }
            Numeric::BigInt(b) => {
                let delta = BigInt::from(if op == UpdateOp::Increment { 1 } else { -1 });
                let new = &*b + delta;
                (Value::BigInt(b), Value::from(new))
            }
        };
        self.write_reference(&reference, new.clone(), scope)?;
        Ok(if prefix { new } else { old })
    }

    fn eval_assign(
        &mut self,
        op: AssignOp,
        target: &Expr,
        value: &Expr,
        scope: &Scope,
    ) -> EvalResult<Value> {
        let reference = self.resolve_reference(target, scope)?;
        let result = match op {
            AssignOp::Assign => {
                let name = match &reference {
                    Reference::Binding(name) => name.clone(),
                    Reference::Property(_, key) => key.to_string(),
                };
                self.eval_named(value, &name, scope)?
            }
            AssignOp::Compound(bin_op) => {
                let current = self.read_reference(&reference, scope)?;
                let rhs = self.eval_expr(value, scope)?;
                self.binary_op(bin_op, &current, &rhs)?
            }
            AssignOp::Logical(logical_op) => {
                let current = self.read_reference(&reference, scope)?;
                if short_circuits(logical_op, &current) {
                    return Ok(current);
                }
                self.eval_expr(value, scope)?
            }
        };
        self.write_reference(&reference, result.clone(), scope)?;
        Ok(result)
    }

    fn resolve_reference(&mut self, target: &Expr, scope: &Scope) -> EvalResult<Reference> {
        match &target.kind {
            ExprKind::Identifier(name) => Ok(Reference::Binding(name.clone())),
            ExprKind::Member {
                object, property, ..
            } => {
                let object = self.eval_expr(object, scope)?;
                let key = self.member_key(property, scope)?;
                Ok(Reference::Property(object, key))
            }
            _ => Err(self.throw_error(
                ErrorKind::SyntaxError,
                "Invalid left-hand side in assignment",
            )),
        }
    }

    fn read_reference(&mut self, reference: &Reference, scope: &Scope) -> EvalResult<Value> {
        match reference {
            Reference::Binding(name) => self.lookup_identifier(name, scope),
            Reference::Property(object, key) => self.get_property(object, key),
        }
    }

    fn write_reference(&mut self, reference: &Reference, value: Value, scope: &Scope) -> EvalResult<()> {
        match reference {
            Reference::Binding(name) => self.assign_identifier(name, value, scope),
            Reference::Property(object, key) => self.set_property(object, key, value),
        }
    }
}

/// Whether a logical operator returns its left operand without evaluating
/// the right one.
fn short_circuits(op: LogicalOp, left: &Value) -> bool {
    match op {
        LogicalOp::And => !left.truthy(),
        LogicalOp::Or => left.truthy(),
        LogicalOp::Nullish => !left.is_nullish(),
    }
}

/// Source-like text for a callee in "is not a function" messages.
fn callee_text(expr: &Expr) -> String {
    match &expr.kind {
        ExprKind::Identifier(name) => name.clone(),
        ExprKind::This => "this".to_string(),
        ExprKind::Member {
            object,
            property: MemberProperty::Named(ident),
            ..
        } => format!("{}.{}", callee_text(object), ident.name),
        ExprKind::Member { object, .. } => format!("{}[...]", callee_text(object)),
        ExprKind::Call { callee, .. } => format!("{}(...)", callee_text(callee)),
        _ => "(intermediate value)".to_string(),
    }
}

/// Digits of a bigint literal, with an optional radix prefix.
pub(crate) fn parse_bigint_literal(text: &str) -> Option<BigInt> {
    let (digits, radix) = match text.get(..2) {
        Some("0x" | "0X") => (&text[2..], 16),
        Some("0o" | "0O") => (&text[2..], 8),
        Some("0b" | "0B") => (&text[2..], 2),
        _ => (text, 10),
    };
    let cleaned: String = digits.chars().filter(|&c| c != '_').collect();
    BigInt::parse_bytes(cleaned.as_bytes(), radix)
}
