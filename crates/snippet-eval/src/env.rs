//! Scoped variable environment for the snippet interpreter.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::value::Value;

/// What introduced a scope. `var` declarations land in the nearest
/// `Function` or `Global` scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    Function,
    Block,
}

#[derive(Clone)]
struct Binding {
    value: Value,
    mutable: bool,
    /// `false` between hoisting and the `let`/`const` statement (TDZ).
    initialized: bool,
}

struct ScopeData {
    bindings: HashMap<String, Binding>,
    parent: Option<Scope>,
    kind: ScopeKind,
    /// The `this` value of a function scope; arrow and block scopes
    /// inherit their parent's.
    this: Option<Value>,
}

/// Result of a name lookup.
#[derive(Debug, Clone)]
pub enum Lookup {
    Found(Value),
    /// Declared with `let`/`const` but not yet initialized.
    Uninitialized,
    Missing,
}

/// Result of an assignment to an existing name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assign {
    Done,
    Constant,
    Uninitialized,
    Missing,
}

/// A lexical scope. Cloning shares the underlying bindings, which is what
/// closures capture.
///
/// Variables are looked up from this scope outward through the parent
/// chain. `define` always creates in this scope; `set` updates the first
/// scope where the name exists.
#[derive(Clone)]
pub struct Scope(Rc<RefCell<ScopeData>>);

impl Scope {
    fn with(kind: ScopeKind, parent: Option<Scope>, this: Option<Value>) -> Self {
        Self(Rc::new(RefCell::new(ScopeData {
            bindings: HashMap::new(),
            parent,
            kind,
            this,
        })))
    }

    /// A new outermost scope.
    pub fn global() -> Self {
        Self::with(ScopeKind::Global, None, None)
    }

    /// A function body scope. `this` is `None` for arrow functions.
    pub fn function(parent: &Scope, this: Option<Value>) -> Self {
        Self::with(ScopeKind::Function, Some(parent.clone()), this)
    }

    /// A block scope for `let`/`const`.
    pub fn block(parent: &Scope) -> Self {
        Self::with(ScopeKind::Block, Some(parent.clone()), None)
    }

    pub fn kind(&self) -> ScopeKind {
        self.0.borrow().kind
    }

    pub fn parent(&self) -> Option<Scope> {
        self.0.borrow().parent.clone()
    }

    pub fn ptr_eq(&self, other: &Scope) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    // ── Declaration ──

    /// Define an initialized binding in this scope, replacing any previous one.
    pub fn define(&self, name: &str, value: Value, mutable: bool) {
        self.0.borrow_mut().bindings.insert(
            name.to_string(),
            Binding {
                value,
                mutable,
                initialized: true,
            },
        );
    }

    /// Hoist a `let`/`const` binding into its temporal dead zone.
    pub fn define_uninitialized(&self, name: &str, mutable: bool) {
        self.0.borrow_mut().bindings.insert(
            name.to_string(),
            Binding {
                value: Value::Undefined,
                mutable,
                initialized: false,
            },
        );
    }

    /// End the TDZ of a binding in this scope.
    pub fn initialize(&self, name: &str, value: Value) {
        let mut data = self.0.borrow_mut();
        match data.bindings.get_mut(name) {
            Some(binding) => {
                binding.value = value;
                binding.initialized = true;
            }
            None => {
                data.bindings.insert(
                    name.to_string(),
                    Binding {
                        value,
                        mutable: true,
                        initialized: true,
                    },
                );
            }
        }
    }

    /// Hoist a `var`: create it as `undefined` unless it already exists.
    pub fn define_var(&self, name: &str) {
        let mut data = self.0.borrow_mut();
        if !data.bindings.contains_key(name) {
            data.bindings.insert(
                name.to_string(),
                Binding {
                    value: Value::Undefined,
                    mutable: true,
                    initialized: true,
                },
            );
        }
    }

    /// The nearest enclosing function or global scope.
    pub fn var_scope(&self) -> Scope {
        let mut current = self.clone();
        loop {
            if current.kind() != ScopeKind::Block {
                return current;
            }
            match current.parent() {
                Some(parent) => current = parent,
                None => return current,
            }
        }
    }

    /// The outermost scope.
    pub fn root(&self) -> Scope {
        let mut current = self.clone();
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }

    // ── Access ──

    /// Look up a name, searching outward.
    pub fn get(&self, name: &str) -> Lookup {
        let mut current = self.clone();
        loop {
            {
                let data = current.0.borrow();
                if let Some(binding) = data.bindings.get(name) {
                    return if binding.initialized {
                        Lookup::Found(binding.value.clone())
                    } else {
                        Lookup::Uninitialized
                    };
                }
            }
            match current.parent() {
                Some(parent) => current = parent,
                None => return Lookup::Missing,
            }
        }
    }

    /// Update the first binding named `name`, searching outward.
    pub fn set(&self, name: &str, value: Value) -> Assign {
        let mut current = self.clone();
        loop {
            {
                let mut data = current.0.borrow_mut();
                if let Some(binding) = data.bindings.get_mut(name) {
                    if !binding.initialized {
                        return Assign::Uninitialized;
                    }
                    if !binding.mutable {
                        return Assign::Constant;
                    }
                    binding.value = value;
                    return Assign::Done;
                }
            }
            match current.parent() {
                Some(parent) => current = parent,
                None => return Assign::Missing,
            }
        }
    }

    /// An initialized binding declared directly in this scope.
    pub fn get_own(&self, name: &str) -> Option<Value> {
        self.0
            .borrow()
            .bindings
            .get(name)
            .filter(|b| b.initialized)
            .map(|b| b.value.clone())
    }

    pub fn has_own(&self, name: &str) -> bool {
        self.0.borrow().bindings.contains_key(name)
    }

    /// The `this` of the nearest scope that binds one.
    pub fn this_value(&self) -> Value {
        let mut current = self.clone();
        loop {
            if let Some(this) = current.0.borrow().this.clone() {
                return this;
            }
            match current.parent() {
                Some(parent) => current = parent,
                None => return Value::Undefined,
            }
        }
    }

    /// Copy the named bindings of `from` into this scope (fresh per-iteration
    /// bindings for `for (let ...)` loops).
    pub fn copy_bindings_from(&self, from: &Scope, names: &[String]) {
        let source = from.0.borrow();
        let mut target = self.0.borrow_mut();
        for name in names {
            if let Some(binding) = source.bindings.get(name) {
                target.bindings.insert(name.clone(), binding.clone());
            }
        }
    }

    // ── Release ──

    /// Clear this scope if the only things keeping it alive are closures
    /// bound in it that nothing else references. Returns whether it was
    /// cleared.
    ///
    /// Such closures and their defining scope form an `Rc` cycle that is
    /// never freed on its own. Any other reference (an escaped closure, a
    /// child scope, an object holding a closure) leaves the scope intact.
    pub fn release_if_unreachable(&self) -> bool {
        let mut captured = 0;
        for binding in self.0.borrow().bindings.values() {
            if let Value::Object(obj) = &binding.value {
                if obj.captures(self) {
                    if !obj.is_unshared() {
                        return false;
                    }
                    captured += 1;
                }
            }
        }
        // This handle plus one per bound closure
        if captured == 0 || Rc::strong_count(&self.0) != captured + 1 {
            return false;
        }
        let bindings = std::mem::take(&mut self.0.borrow_mut().bindings);
        drop(bindings);
        true
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0.borrow();
        write!(f, "Scope({:?}, {} bindings)", data.kind, data.bindings.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_walks_outward() {
        let global = Scope::global();
        global.define("x", Value::Number(1.0), true);
        let inner = Scope::block(&Scope::function(&global, None));
        assert!(matches!(inner.get("x"), Lookup::Found(Value::Number(n)) if n == 1.0));
        assert!(matches!(inner.get("y"), Lookup::Missing));
    }

    #[test]
    fn test_tdz_and_initialize() {
        let scope = Scope::global();
        scope.define_uninitialized("a", true);
        assert!(matches!(scope.get("a"), Lookup::Uninitialized));
        assert_eq!(scope.set("a", Value::Null), Assign::Uninitialized);
        scope.initialize("a", Value::Bool(true));
        assert!(matches!(scope.get("a"), Lookup::Found(Value::Bool(true))));
    }

    #[test]
    fn test_const_rejects_assignment() {
        let scope = Scope::global();
        scope.define("c", Value::Number(1.0), false);
        assert_eq!(scope.set("c", Value::Number(2.0)), Assign::Constant);
        assert_eq!(scope.set("nope", Value::Null), Assign::Missing);
    }

    #[test]
    fn test_var_scope_skips_blocks() {
        let global = Scope::global();
        let func = Scope::function(&global, None);
        let block = Scope::block(&Scope::block(&func));
        assert!(block.var_scope().ptr_eq(&func));
        assert!(block.root().ptr_eq(&global));
    }

    #[test]
    fn test_define_var_keeps_existing_value() {
        let scope = Scope::global();
        scope.define("v", Value::Number(5.0), true);
        scope.define_var("v");
        assert_eq!(scope.get_own("v"), Some(Value::Number(5.0)));
    }

    #[test]
    fn test_this_inherited_through_arrow_scopes() {
        let global = Scope::global();
        let method = Scope::function(&global, Some(Value::str("me")));
        let arrow = Scope::function(&method, None);
        assert_eq!(arrow.this_value(), Value::str("me"));
        assert_eq!(global.this_value(), Value::Undefined);
    }
}
