//! Tree-walking interpreter: calls, property access, conversions and
//! error construction. Statements live in `exec.rs`, expressions in
//! `expr.rs` and operators in `ops.rs`.

use std::rc::Rc;

use snippet_types::ast::{FunctionBody, Program};
use snippet_types::Span;

use crate::config::EngineConfig;
use crate::env::Scope;
use crate::error::{ErrorKind, EvalError, EvalResult};
use crate::exec::Flow;
use crate::format::{self, ValueFormatter};
use crate::output::OutputSink;
use crate::realm::Realm;
use crate::value::{
    array_index, number_to_string, Closure, Function, JsObject, ObjectKind, ObjectRef, Value,
};

/// Arrays grow densely; writes past this length are rejected.
pub(crate) const MAX_ARRAY_LENGTH: usize = 1 << 24;

/// One active script call, innermost last.
struct Frame {
    name: Rc<str>,
    call_site: Span,
}

/// Preferred type for object-to-primitive conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Hint {
    Default,
    Number,
    String,
}

/// Evaluates one program against a realm.
///
/// The interpreter is created per run; all persistent state lives in the
/// [`Realm`]. Console output goes to the attached [`OutputSink`], or to
/// `tracing` when there is none.
pub struct Interpreter<'a> {
    realm: &'a Realm,
    config: &'a EngineConfig,
    sink: Option<&'a mut dyn OutputSink>,
    pub(crate) call_depth: usize,
    frames: Vec<Frame>,
    pub(crate) current_span: Span,
    /// Value of the last top-level expression statement.
    pub(crate) completion: Value,
}

impl<'a> Interpreter<'a> {
    pub fn new(realm: &'a Realm, config: &'a EngineConfig) -> Self {
        Self {
            realm,
            config,
            sink: None,
            call_depth: 0,
            frames: Vec::new(),
            current_span: Span::point(1, 1),
            completion: Value::Undefined,
        }
    }

    /// Route console lines to `sink`.
    pub fn with_sink(mut self, sink: &'a mut dyn OutputSink) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn realm(&self) -> &'a Realm {
        self.realm
    }

    pub fn config(&self) -> &'a EngineConfig {
        self.config
    }

    /// The formatter configured for this run.
    pub fn formatter(&self) -> ValueFormatter {
        ValueFormatter::new(self.config.max_format_depth)
    }

    /// Deliver one console line.
    pub fn emit_line(&mut self, line: &str) {
        match self.sink.as_mut() {
            Some(sink) => sink.write_line(line),
            None => tracing::info!(target: "snippet::console", "{line}"),
        }
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Programs
    // ══════════════════════════════════════════════════════════════════════════

    /// Run `program` with `scope` as both its variable and lexical scope.
    ///
    /// Returns the completion value of the last top-level expression
    /// statement, or the value of a top-level `return`.
    pub fn run_program(&mut self, program: &Program, scope: &Scope) -> EvalResult<Value> {
        self.completion = Value::Undefined;
        self.hoist_declarations(&program.body, scope, scope);
        match self.exec_statements(&program.body, scope)? {
            Flow::Return(value) => Ok(value),
            _ => Ok(std::mem::take(&mut self.completion)),
        }
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Calls
    // ══════════════════════════════════════════════════════════════════════════

    /// Call `callee` with the given receiver. Used by builtins that take
    /// callbacks.
    pub fn call(&mut self, callee: &Value, this: &Value, args: &[Value]) -> EvalResult<Value> {
        let call_site = self.current_span;
        self.call_at(callee, this, args, call_site)
    }

    pub(crate) fn call_at(
        &mut self,
        callee: &Value,
        this: &Value,
        args: &[Value],
        call_site: Span,
    ) -> EvalResult<Value> {
        let Some((object, function)) = callee
            .as_object()
            .and_then(|obj| obj.function().map(|f| (obj.clone(), f)))
        else {
            let shown = self.display(callee);
            return Err(self.type_error(format!("{shown} is not a function")));
        };
        match function {
            Function::Native(native) => (native.func)(self, this, args),
            Function::Closure(closure) => {
                self.call_closure(&object, &closure, this.clone(), args, call_site)
            }
        }
    }

    /// `new callee(...args)`
    pub(crate) fn construct(
        &mut self,
        callee: &Value,
        args: &[Value],
        call_site: Span,
        callee_text: &str,
    ) -> EvalResult<Value> {
        let target = callee
            .as_object()
            .and_then(|obj| obj.function().map(|f| (obj.clone(), f)));
        match target {
            Some((_, Function::Native(native))) if native.constructible => {
                (native.func)(self, &Value::Undefined, args)
            }
            Some((object, Function::Closure(closure))) if !closure.node.is_arrow => {
                let proto = match self.get_property(callee, "prototype")? {
                    Value::Object(proto) => proto,
                    _ => self.realm.intrinsics().object_proto.clone(),
                };
                let instance = self.realm.new_object_with_proto(Some(proto));
                let result = self.call_closure(
                    &object,
                    &closure,
                    Value::Object(instance.clone()),
                    args,
                    call_site,
                )?;
                Ok(match result {
                    Value::Object(_) => result,
                    _ => Value::Object(instance),
                })
            }
            _ => Err(self.type_error(format!("{callee_text} is not a constructor"))),
        }
    }

    fn call_closure(
        &mut self,
        function: &ObjectRef,
        closure: &Closure,
        this: Value,
        args: &[Value],
        call_site: Span,
    ) -> EvalResult<Value> {
        if self.call_depth >= self.config.max_call_depth {
            return Err(self.throw_error(
                ErrorKind::RangeError,
                "Maximum call stack size exceeded",
            ));
        }
        self.call_depth += 1;
        self.frames.push(Frame {
            name: closure.name.clone(),
            call_site,
        });
        let result = self.invoke_closure(function, closure, this, args);
        self.frames.pop();
        self.call_depth -= 1;
        self.current_span = call_site;
        result
    }

    fn invoke_closure(
        &mut self,
        function: &ObjectRef,
        closure: &Closure,
        this: Value,
        args: &[Value],
    ) -> EvalResult<Value> {
        let node = &closure.node;
        let this = if node.is_arrow { None } else { Some(this) };
        let scope = Scope::function(&closure.env, this);

        if !node.is_arrow {
            scope.define("arguments", self.realm.new_array(args.to_vec()), true);
        }
        // A named function expression can refer to itself
        if let Some(name) = &node.name {
            if !node.params.iter().any(|p| p.name.name == name.name) {
                scope.define(&name.name, Value::Object(function.clone()), true);
            }
        }

        for (i, param) in node.params.iter().enumerate() {
            let value = if param.rest {
                self.realm
                    .new_array(args.get(i..).map(<[Value]>::to_vec).unwrap_or_default())
            } else {
                match (args.get(i), &param.default) {
                    (Some(arg), _) if !arg.is_undefined() => arg.clone(),
                    (_, Some(default)) => self.eval_named(default, &param.name.name, &scope)?,
                    _ => Value::Undefined,
                }
            };
            scope.define(&param.name.name, value, true);
        }

        match &node.body {
            FunctionBody::Expr(expr) => self.eval_expr(expr, &scope),
            FunctionBody::Block(block) => {
                self.hoist_declarations(&block.stmts, &scope, &scope);
                match self.exec_statements(&block.stmts, &scope)? {
                    Flow::Return(value) => Ok(value),
                    _ => Ok(Value::Undefined),
                }
            }
        }
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Errors
    // ══════════════════════════════════════════════════════════════════════════

    /// A fresh error object with a stack captured at the current position.
    pub fn create_error(&self, kind: ErrorKind, message: &str) -> ObjectRef {
        let error = ObjectRef::new(JsObject::new(
            ObjectKind::Error,
            Some(self.realm.intrinsics().error_proto(kind).clone()),
        ));
        if !message.is_empty() {
            error.set_own("message", Value::str(message));
        }
        let header = if message.is_empty() {
            kind.name().to_string()
        } else {
            format!("{}: {message}", kind.name())
        };
        error.set_own("stack", Value::from(self.stack_trace(&header)));
        error
    }

    /// An interpreter-raised error. These carry the line they were raised on.
    pub fn throw_error(&self, kind: ErrorKind, message: impl AsRef<str>) -> EvalError {
        let error = self.create_error(kind, message.as_ref());
        error.set_own(
            "lineNumber",
            Value::Number(f64::from(self.current_span.start_line)),
        );
        EvalError::Thrown(Value::Object(error))
    }

    pub fn type_error(&self, message: impl AsRef<str>) -> EvalError {
        self.throw_error(ErrorKind::TypeError, message)
    }

    pub fn range_error(&self, message: impl AsRef<str>) -> EvalError {
        self.throw_error(ErrorKind::RangeError, message)
    }

    pub fn reference_error(&self, message: impl AsRef<str>) -> EvalError {
        self.throw_error(ErrorKind::ReferenceError, message)
    }

    /// V8-style stack text: `header`, then one `at` line per active frame.
    fn stack_trace(&self, header: &str) -> String {
        let file = &self.config.file_name;
        let mut out = header.to_string();
        let mut position = self.current_span;
        for frame in self.frames.iter().rev() {
            out.push_str(&frame_line(&frame.name, file, position));
            position = frame.call_site;
        }
        out.push_str(&frame_line("", file, position));
        out
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Property Access
    // ══════════════════════════════════════════════════════════════════════════

    /// `target[key]`
    pub fn get_property(&mut self, target: &Value, key: &str) -> EvalResult<Value> {
        let intrinsics = self.realm.intrinsics();
        let holder = match target {
            Value::Undefined | Value::Null => {
                return Err(self.type_error(format!(
                    "Cannot read properties of {} (reading '{key}')",
                    self.display(target)
                )));
            }
            Value::String(s) => {
                if key == "length" {
                    return Ok(Value::Number(s.chars().count() as f64));
                }
                if let Some(index) = array_index(key) {
                    return Ok(s
                        .chars()
                        .nth(index)
                        .map(|c| Value::from(c.to_string()))
                        .unwrap_or_default());
                }
                intrinsics.string_proto.clone()
            }
            Value::Number(_) => intrinsics.number_proto.clone(),
            Value::Bool(_) => intrinsics.boolean_proto.clone(),
            Value::BigInt(_) => intrinsics.bigint_proto.clone(),
            Value::Object(obj) => obj.clone(),
        };
        Ok(self.lookup(&holder, key))
    }

    /// Property lookup along the prototype chain, including virtual
    /// properties (`length`, function `name`, lazily created `prototype`).
    pub(crate) fn lookup(&self, obj: &ObjectRef, key: &str) -> Value {
        let mut current = Some(obj.clone());
        while let Some(holder) = current {
            if let Some(value) = self.own_property(&holder, key) {
                return value;
            }
            current = holder.prototype();
        }
        Value::Undefined
    }

    /// An own property, including the virtual ones.
    pub(crate) fn own_property(&self, obj: &ObjectRef, key: &str) -> Option<Value> {
        let needs_prototype = {
            let data = obj.borrow();
            if let Some(value) = data.properties.get(key) {
                return Some(value.clone());
            }
            match &data.kind {
                ObjectKind::Array(items) => {
                    if key == "length" {
                        return Some(Value::Number(items.len() as f64));
                    }
                    if let Some(index) = array_index(key) {
                        return items.get(index).cloned();
                    }
                    false
                }
                ObjectKind::Function(func) => match key {
                    "name" => return Some(Value::str(func.name())),
                    "length" => return Some(Value::Number(func.arity() as f64)),
                    "prototype" => matches!(func, Function::Closure(_)) && !func.is_arrow(),
                    _ => false,
                },
                _ => false,
            }
        };
        if needs_prototype {
            let proto = self.realm.new_object();
            proto.set_own("constructor", Value::Object(obj.clone()));
            obj.set_own("prototype", Value::Object(proto.clone()));
            return Some(Value::Object(proto));
        }
        None
    }

    /// `key in obj`
    pub(crate) fn has_property(&self, obj: &ObjectRef, key: &str) -> bool {
        let mut current = Some(obj.clone());
        while let Some(holder) = current {
            if self.own_property(&holder, key).is_some() {
                return true;
            }
            current = holder.prototype();
        }
        false
    }

    /// `target[key] = value`
    pub fn set_property(&mut self, target: &Value, key: &str, value: Value) -> EvalResult<()> {
        let obj = match target {
            Value::Undefined | Value::Null => {
                return Err(self.type_error(format!(
                    "Cannot set properties of {} (setting '{key}')",
                    self.display(target)
                )));
            }
            Value::Object(obj) => obj,
            // Writes to primitives are silently dropped
            _ => return Ok(()),
        };

        if obj.is_array() {
            if key == "length" {
                let length = self.to_number(&value)?;
                if length < 0.0 || length.fract() != 0.0 || length > MAX_ARRAY_LENGTH as f64 {
                    return Err(self.range_error("Invalid array length"));
                }
                if let ObjectKind::Array(items) = &mut obj.borrow_mut().kind {
                    items.resize(length as usize, Value::Undefined);
                }
                return Ok(());
            }
            if let Some(index) = array_index(key) {
                if index >= MAX_ARRAY_LENGTH {
                    return Err(self.range_error("Invalid array length"));
                }
                if let ObjectKind::Array(items) = &mut obj.borrow_mut().kind {
                    if index >= items.len() {
                        items.resize(index + 1, Value::Undefined);
                    }
                    items[index] = value;
                }
                return Ok(());
            }
        }
        obj.set_own(key, value);
        Ok(())
    }

    /// `delete target[key]`
    pub(crate) fn delete_property(&mut self, target: &Value, key: &str) -> EvalResult<bool> {
        let obj = match target {
            Value::Undefined | Value::Null => {
                return Err(self.type_error(format!(
                    "Cannot convert undefined or null to object (deleting '{key}')"
                )));
            }
            Value::Object(obj) => obj,
            _ => return Ok(true),
        };
        if let Some(index) = array_index(key) {
            if let ObjectKind::Array(items) = &mut obj.borrow_mut().kind {
                if let Some(slot) = items.get_mut(index) {
                    *slot = Value::Undefined;
                }
                return Ok(true);
            }
        }
        obj.remove_own(key);
        Ok(true)
    }

    /// Values produced by `for...of` and spread.
    pub(crate) fn iterate(&mut self, value: &Value) -> EvalResult<Vec<Value>> {
        match value {
            Value::String(s) => Ok(s.chars().map(|c| Value::from(c.to_string())).collect()),
            Value::Object(obj) => match obj.array_elements() {
                Some(items) => Ok(items),
                None => {
                    let shown = self.display(value);
                    Err(self.type_error(format!("{shown} is not iterable")))
                }
            },
            _ => {
                let shown = self.display(value);
                Err(self.type_error(format!("{shown} is not iterable")))
            }
        }
    }

    /// Keys visited by `for...in`.
    pub(crate) fn enumerable_keys(&self, value: &Value) -> Vec<Rc<str>> {
        match value {
            Value::Object(obj) => obj.own_keys(),
            Value::String(s) => (0..s.chars().count())
                .map(|i| Rc::from(i.to_string()))
                .collect(),
            _ => Vec::new(),
        }
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Conversions
    // ══════════════════════════════════════════════════════════════════════════

    /// ToPrimitive. Script-defined `valueOf`/`toString` are honoured;
    /// builtin objects convert through their plain text form.
    pub(crate) fn to_primitive(&mut self, value: &Value, hint: Hint) -> EvalResult<Value> {
        let Value::Object(obj) = value else {
            return Ok(value.clone());
        };
        let order = if hint == Hint::String {
            ["toString", "valueOf"]
        } else {
            ["valueOf", "toString"]
        };
        for method in order {
            let candidate = self.lookup(obj, method);
            let is_script_function = matches!(
                candidate.as_object().and_then(ObjectRef::function),
                Some(Function::Closure(_))
            );
            if is_script_function {
                let result = self.call(&candidate, value, &[])?;
                if !matches!(result, Value::Object(_)) {
                    return Ok(result);
                }
            }
        }
        Ok(Value::from(self.display(value)))
    }

    /// ToString.
    pub fn to_string(&mut self, value: &Value) -> EvalResult<Rc<str>> {
        match value {
            Value::String(s) => Ok(s.clone()),
            Value::Object(_) => {
                let primitive = self.to_primitive(value, Hint::String)?;
                self.to_string(&primitive)
            }
            other => Ok(Rc::from(self.display(other))),
        }
    }

    /// ToNumber.
    pub fn to_number(&mut self, value: &Value) -> EvalResult<f64> {
        match value {
            Value::Undefined => Ok(f64::NAN),
            Value::Null => Ok(0.0),
            Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
            Value::Number(n) => Ok(*n),
            Value::String(s) => Ok(string_to_number(s)),
            Value::BigInt(_) => Err(self.type_error("Cannot convert a BigInt value to a number")),
            Value::Object(_) => {
                let primitive = self.to_primitive(value, Hint::Number)?;
                self.to_number(&primitive)
            }
        }
    }

    /// ToPropertyKey.
    pub fn to_property_key(&mut self, value: &Value) -> EvalResult<Rc<str>> {
        match value {
            Value::Number(n) => Ok(Rc::from(number_to_string(*n))),
            other => self.to_string(other),
        }
    }

    /// Plain text for a value without running script code. Used in error
    /// messages and as the builtin object-to-string conversion.
    pub fn display(&self, value: &Value) -> String {
        format::plain_string(value, self.config.max_format_depth).unwrap_or_default()
    }
}

fn frame_line(name: &str, file: &str, span: Span) -> String {
    if name.is_empty() {
        format!("\n    at {file}:{}:{}", span.start_line, span.start_col)
    } else {
        format!(
            "\n    at {name} ({file}:{}:{})",
            span.start_line, span.start_col
        )
    }
}

/// StringToNumber: trimmed decimal, `0x`/`0o`/`0b` integers, `Infinity`.
pub(crate) fn string_to_number(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    let radix = match trimmed.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return u64::from_str_radix(&trimmed[2..], radix)
            .map(|n| n as f64)
            .unwrap_or(f64::NAN);
    }
    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    let well_formed = trimmed
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'));
    if !well_formed {
        return f64::NAN;
    }
    trimmed.parse().unwrap_or(f64::NAN)
}
