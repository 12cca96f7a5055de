//! Runtime values.
//!
//! Primitives are stored inline; everything else is a reference-counted
//! [`JsObject`] behind an [`ObjectRef`]. Object identity is pointer
//! identity, which is what `===`, the formatter's visited set and the
//! console restoration checks rely on.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use num_bigint::BigInt;
use snippet_types::ast::FunctionNode;

use crate::env::Scope;
use crate::error::EvalResult;
use crate::interpreter::Interpreter;

/// Signature of a builtin implemented in Rust: `(interpreter, this, args)`.
pub type NativeFn = Rc<dyn Fn(&mut Interpreter<'_>, &Value, &[Value]) -> EvalResult<Value>>;

// ══════════════════════════════════════════════════════════════════════════════
// Value
// ══════════════════════════════════════════════════════════════════════════════

/// A runtime value.
#[derive(Clone, Debug, Default)]
pub enum Value {
    /// The absence-of-value marker.
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    BigInt(Rc<BigInt>),
    String(Rc<str>),
    Object(ObjectRef),
}

impl Value {
    /// Build a string value.
    pub fn str(s: &str) -> Self {
        Value::String(Rc::from(s))
    }

    /// The `typeof` result.
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "object",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::BigInt(_) => "bigint",
            Value::String(_) => "string",
            Value::Object(obj) if obj.is_callable() => "function",
            Value::Object(_) => "object",
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// `null` or `undefined`.
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Object(obj) if obj.is_callable())
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// ToBoolean.
    pub fn truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => !(*n == 0.0 || n.is_nan()),
            Value::BigInt(b) => b.sign() != num_bigint::Sign::NoSign,
            Value::String(s) => !s.is_empty(),
            Value::Object(_) => true,
        }
    }

    /// `===`
    pub fn strict_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::BigInt(a), Value::BigInt(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// SameValueZero: like `===` but `NaN` equals itself (`includes`).
    pub fn same_value_zero(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) if a.is_nan() && b.is_nan() => true,
            _ => self.strict_equals(other),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.same_value_zero(other)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::str(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Rc::from(s))
    }
}

impl From<BigInt> for Value {
    fn from(b: BigInt) -> Self {
        Value::BigInt(Rc::new(b))
    }
}

impl From<ObjectRef> for Value {
    fn from(obj: ObjectRef) -> Self {
        Value::Object(obj)
    }
}

/// Render a number the way JavaScript's `String(n)` does.
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n == 0.0 {
        // Covers -0
        return "0".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let abs = n.abs();
    if (1e-6..1e21).contains(&abs) {
        return format!("{n}");
    }
    let sci = format!("{n:e}");
    match sci.split_once('e') {
        Some((mantissa, exp)) if exp.starts_with('-') => format!("{mantissa}e{exp}"),
        Some((mantissa, exp)) => format!("{mantissa}e+{exp}"),
        None => sci,
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Objects
// ══════════════════════════════════════════════════════════════════════════════

/// Shared, mutable handle to a heap object.
#[derive(Clone)]
pub struct ObjectRef(Rc<RefCell<JsObject>>);

impl ObjectRef {
    pub fn new(object: JsObject) -> Self {
        Self(Rc::new(RefCell::new(object)))
    }

    pub fn borrow(&self) -> Ref<'_, JsObject> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, JsObject> {
        self.0.borrow_mut()
    }

    /// Identity comparison.
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// A stable identity key for visited sets.
    pub fn id(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }

    pub fn is_callable(&self) -> bool {
        matches!(self.borrow().kind, ObjectKind::Function(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self.borrow().kind, ObjectKind::Array(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self.borrow().kind, ObjectKind::Error)
    }

    pub fn prototype(&self) -> Option<ObjectRef> {
        self.borrow().prototype.clone()
    }

    /// Own data property (no array/function virtuals, no prototype walk).
    pub fn get_own(&self, key: &str) -> Option<Value> {
        self.borrow().properties.get(key).cloned()
    }

    pub fn set_own(&self, key: &str, value: Value) {
        self.borrow_mut().properties.set(key, value);
    }

    pub fn remove_own(&self, key: &str) -> Option<Value> {
        self.borrow_mut().properties.remove(key)
    }

    /// Data property lookup along the prototype chain. Never runs user
    /// code, so the formatter can use it safely.
    pub fn get_raw(&self, key: &str) -> Option<Value> {
        let mut current = Some(self.clone());
        while let Some(obj) = current {
            if let Some(value) = obj.get_own(key) {
                return Some(value);
            }
            current = obj.prototype();
        }
        None
    }

    /// Whether `proto` appears on this object's prototype chain.
    pub fn inherits_from(&self, proto: &ObjectRef) -> bool {
        let mut current = self.prototype();
        while let Some(obj) = current {
            if obj.ptr_eq(proto) {
                return true;
            }
            current = obj.prototype();
        }
        false
    }

    /// The function payload, if this object is callable.
    pub fn function(&self) -> Option<Function> {
        match &self.borrow().kind {
            ObjectKind::Function(func) => Some(func.clone()),
            _ => None,
        }
    }

    /// Whether this is a script function that closes over `scope`.
    pub fn captures(&self, scope: &Scope) -> bool {
        matches!(
            &self.borrow().kind,
            ObjectKind::Function(Function::Closure(closure)) if closure.env.ptr_eq(scope)
        )
    }

    /// Whether this handle is the only reference to the object.
    pub fn is_unshared(&self) -> bool {
        Rc::strong_count(&self.0) == 1
    }

    /// Own enumerable keys: array indices first, then named properties.
    /// Error bookkeeping and function `prototype` are not enumerable.
    pub fn own_keys(&self) -> Vec<Rc<str>> {
        let data = self.borrow();
        let (mut keys, hidden): (Vec<Rc<str>>, &[&str]) = match &data.kind {
            ObjectKind::Array(items) => ((0..items.len()).map(|i| Rc::from(i.to_string())).collect(), &[]),
            ObjectKind::Error => (Vec::new(), &["stack", "message", "lineNumber"]),
            ObjectKind::Function(_) => (Vec::new(), &["prototype"]),
            ObjectKind::Ordinary => (Vec::new(), &[]),
        };
        keys.extend(
            data.properties
                .keys()
                .into_iter()
                .filter(|k| !hidden.contains(&k.as_ref())),
        );
        keys
    }

    /// Snapshot of the elements, if this is an array.
    pub fn array_elements(&self) -> Option<Vec<Value>> {
        match &self.borrow().kind {
            ObjectKind::Array(items) => Some(items.clone()),
            _ => None,
        }
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Objects may be cyclic: never recurse into them here
        let kind = match &self.borrow().kind {
            ObjectKind::Ordinary => "Object",
            ObjectKind::Array(_) => "Array",
            ObjectKind::Function(_) => "Function",
            ObjectKind::Error => "Error",
        };
        write!(f, "{kind}#{:x}", self.id())
    }
}

/// A heap object.
pub struct JsObject {
    pub kind: ObjectKind,
    pub properties: PropertyMap,
    pub prototype: Option<ObjectRef>,
}

impl JsObject {
    pub fn new(kind: ObjectKind, prototype: Option<ObjectRef>) -> Self {
        Self {
            kind,
            properties: PropertyMap::default(),
            prototype,
        }
    }
}

/// What kind of object this is. Drives formatting and builtin dispatch.
pub enum ObjectKind {
    Ordinary,
    Array(Vec<Value>),
    Function(Function),
    Error,
}

// ── Properties ────────────────────────────────────────────────────────────────

/// Insertion-ordered property storage.
///
/// Key enumeration follows the language rule: integer-like keys first in
/// ascending order, then the rest in insertion order.
#[derive(Clone, Default)]
pub struct PropertyMap {
    entries: Vec<(Rc<str>, Value)>,
}

impl PropertyMap {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k.as_ref() == key)
            .map(|(_, v)| v)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn set(&mut self, key: &str, value: Value) {
        match self.entries.iter_mut().find(|(k, _)| k.as_ref() == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((Rc::from(key), value)),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let idx = self.entries.iter().position(|(k, _)| k.as_ref() == key)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in enumeration order.
    pub fn keys(&self) -> Vec<Rc<str>> {
        let mut indexed: Vec<(u32, Rc<str>)> = Vec::new();
        let mut named: Vec<Rc<str>> = Vec::new();
        for (key, _) in &self.entries {
            match array_index(key) {
                Some(idx) => indexed.push((idx as u32, key.clone())),
                None => named.push(key.clone()),
            }
        }
        indexed.sort_by_key(|(idx, _)| *idx);
        indexed.into_iter().map(|(_, k)| k).chain(named).collect()
    }

    /// Entries in enumeration order.
    pub fn entries(&self) -> Vec<(Rc<str>, Value)> {
        self.keys()
            .into_iter()
            .filter_map(|k| self.get(&k).cloned().map(|v| (k, v)))
            .collect()
    }
}

/// Parse a canonical array index (`"0"`, `"17"`, not `"01"` or `"-1"`).
pub fn array_index(key: &str) -> Option<usize> {
    if key.is_empty() || key.len() > 10 || !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if key.len() > 1 && key.starts_with('0') {
        return None;
    }
    key.parse::<u32>()
        .ok()
        .filter(|&i| i < u32::MAX)
        .map(|i| i as usize)
}

// ══════════════════════════════════════════════════════════════════════════════
// Functions
// ══════════════════════════════════════════════════════════════════════════════

/// The callable payload of a function object.
#[derive(Clone)]
pub enum Function {
    /// A function defined in script source.
    Closure(Closure),
    /// A builtin implemented in Rust.
    Native(NativeFunction),
}

/// A script function together with its defining scope.
#[derive(Clone)]
pub struct Closure {
    pub node: Rc<FunctionNode>,
    pub env: Scope,
    /// Declared or inferred name (`""` when anonymous).
    pub name: Rc<str>,
}

/// A builtin function.
#[derive(Clone)]
pub struct NativeFunction {
    pub name: Rc<str>,
    pub func: NativeFn,
    /// Whether `new` may be applied to it.
    pub constructible: bool,
}

impl Function {
    pub fn name(&self) -> &str {
        match self {
            Function::Closure(c) => &c.name,
            Function::Native(n) => &n.name,
        }
    }

    /// Number of declared parameters before the first default or rest.
    pub fn arity(&self) -> usize {
        match self {
            Function::Closure(c) => c
                .node
                .params
                .iter()
                .take_while(|p| p.default.is_none() && !p.rest)
                .count(),
            Function::Native(_) => 0,
        }
    }

    pub fn is_arrow(&self) -> bool {
        matches!(self, Function::Closure(c) if c.node.is_arrow)
    }

    /// The text a function prints as: its source, or a native stub.
    pub fn source_text(&self) -> String {
        match self {
            Function::Closure(c) => c.node.source.clone(),
            Function::Native(n) => format!("function {}() {{ [native code] }}", n.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_to_string_integers_and_fractions() {
        assert_eq!(number_to_string(42.0), "42");
        assert_eq!(number_to_string(-7.0), "-7");
        assert_eq!(number_to_string(3.5), "3.5");
        assert_eq!(number_to_string(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(number_to_string(-0.0), "0");
    }

    #[test]
    fn test_number_to_string_special_values() {
        assert_eq!(number_to_string(f64::NAN), "NaN");
        assert_eq!(number_to_string(f64::INFINITY), "Infinity");
        assert_eq!(number_to_string(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn test_number_to_string_exponent_forms() {
        assert_eq!(number_to_string(1e21), "1e+21");
        assert_eq!(number_to_string(1.5e300), "1.5e+300");
        assert_eq!(number_to_string(1e-7), "1e-7");
        assert_eq!(number_to_string(0.000001), "0.000001");
        assert_eq!(number_to_string(1e20), "100000000000000000000");
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::Undefined.truthy());
        assert!(!Value::Number(f64::NAN).truthy());
        assert!(!Value::str("").truthy());
        assert!(Value::str("0").truthy());
        assert!(!Value::from(BigInt::from(0)).truthy());
        assert!(Value::from(BigInt::from(3)).truthy());
    }

    #[test]
    fn test_strict_equality() {
        assert!(Value::Number(1.0).strict_equals(&Value::Number(1.0)));
        assert!(!Value::Number(f64::NAN).strict_equals(&Value::Number(f64::NAN)));
        assert!(Value::Number(f64::NAN).same_value_zero(&Value::Number(f64::NAN)));
        assert!(!Value::Null.strict_equals(&Value::Undefined));
        assert!(Value::str("a").strict_equals(&Value::str("a")));
    }

    #[test]
    fn test_object_identity() {
        let a = ObjectRef::new(JsObject::new(ObjectKind::Ordinary, None));
        let b = ObjectRef::new(JsObject::new(ObjectKind::Ordinary, None));
        assert!(a.ptr_eq(&a.clone()));
        assert!(!a.ptr_eq(&b));
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_property_order_puts_indices_first() {
        let mut props = PropertyMap::default();
        props.set("b", Value::Number(1.0));
        props.set("10", Value::Number(2.0));
        props.set("a", Value::Number(3.0));
        props.set("2", Value::Number(4.0));
        let keys: Vec<String> = props.keys().iter().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["2", "10", "b", "a"]);
    }

    #[test]
    fn test_property_overwrite_keeps_position() {
        let mut props = PropertyMap::default();
        props.set("x", Value::Number(1.0));
        props.set("y", Value::Number(2.0));
        props.set("x", Value::Number(3.0));
        assert_eq!(props.len(), 2);
        assert_eq!(props.keys()[0].as_ref(), "x");
        assert_eq!(props.get("x"), Some(&Value::Number(3.0)));
    }

    #[test]
    fn test_array_index_parsing() {
        assert_eq!(array_index("0"), Some(0));
        assert_eq!(array_index("42"), Some(42));
        assert_eq!(array_index("01"), None);
        assert_eq!(array_index("-1"), None);
        assert_eq!(array_index("1.5"), None);
        assert_eq!(array_index("length"), None);
    }

    #[test]
    fn test_prototype_chain_lookup() {
        let proto = ObjectRef::new(JsObject::new(ObjectKind::Ordinary, None));
        proto.set_own("greeting", Value::str("hi"));
        let child = ObjectRef::new(JsObject::new(ObjectKind::Ordinary, Some(proto.clone())));
        assert_eq!(child.get_raw("greeting"), Some(Value::str("hi")));
        assert!(child.get_own("greeting").is_none());
        assert!(child.inherits_from(&proto));
    }
}
