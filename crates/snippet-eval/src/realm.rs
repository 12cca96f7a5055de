//! The realm: ambient global state shared by every run of one engine.

use std::cell::Cell;
use std::rc::Rc;

use snippet_types::ast::FunctionNode;

use crate::builtins;
use crate::env::Scope;
use crate::error::ErrorKind;
use crate::value::{
    Closure, Function, JsObject, NativeFn, NativeFunction, ObjectKind, ObjectRef, Value,
};

/// Prototype objects the interpreter needs direct access to.
pub struct Intrinsics {
    pub object_proto: ObjectRef,
    pub function_proto: ObjectRef,
    pub array_proto: ObjectRef,
    pub string_proto: ObjectRef,
    pub number_proto: ObjectRef,
    pub boolean_proto: ObjectRef,
    pub bigint_proto: ObjectRef,
    error_protos: Vec<ObjectRef>,
}

impl Intrinsics {
    fn new() -> Self {
        let object_proto = ObjectRef::new(JsObject::new(ObjectKind::Ordinary, None));
        let derived = || {
            ObjectRef::new(JsObject::new(
                ObjectKind::Ordinary,
                Some(object_proto.clone()),
            ))
        };
        let function_proto = derived();
        let array_proto = derived();
        let string_proto = derived();
        let number_proto = derived();
        let boolean_proto = derived();
        let bigint_proto = derived();

        let base_error = derived();
        base_error.set_own("name", Value::str("Error"));
        base_error.set_own("message", Value::str(""));
        let mut error_protos = vec![base_error.clone()];
        for kind in &ErrorKind::ALL[1..] {
            let proto = ObjectRef::new(JsObject::new(
                ObjectKind::Ordinary,
                Some(base_error.clone()),
            ));
            proto.set_own("name", Value::str(kind.name()));
            proto.set_own("message", Value::str(""));
            error_protos.push(proto);
        }

        Self {
            object_proto,
            function_proto,
            array_proto,
            string_proto,
            number_proto,
            boolean_proto,
            bigint_proto,
            error_protos,
        }
    }

    pub fn error_proto(&self, kind: ErrorKind) -> &ObjectRef {
        &self.error_protos[kind.index()]
    }
}

/// Global scope, `console` object and intrinsics.
///
/// A realm lives as long as its engine, so shared-scope declarations and
/// anything user code hangs off globals persist between runs.
pub struct Realm {
    global: Scope,
    console: ObjectRef,
    intrinsics: Intrinsics,
    rng: Cell<u64>,
}

impl Realm {
    /// A realm with every builtin installed.
    pub fn new() -> Self {
        let intrinsics = Intrinsics::new();
        let console = ObjectRef::new(JsObject::new(
            ObjectKind::Ordinary,
            Some(intrinsics.object_proto.clone()),
        ));
        let realm = Self {
            global: Scope::global(),
            console,
            intrinsics,
            rng: Cell::new(0x2545_f491_4f6c_dd1d),
        };
        builtins::install(&realm);
        realm
    }

    pub fn global(&self) -> &Scope {
        &self.global
    }

    /// The `console` object the logging redirect patches.
    pub fn console(&self) -> &ObjectRef {
        &self.console
    }

    pub fn intrinsics(&self) -> &Intrinsics {
        &self.intrinsics
    }

    // ── Object Construction ──

    pub fn new_object(&self) -> ObjectRef {
        ObjectRef::new(JsObject::new(
            ObjectKind::Ordinary,
            Some(self.intrinsics.object_proto.clone()),
        ))
    }

    pub fn new_array(&self, items: Vec<Value>) -> Value {
        Value::Object(ObjectRef::new(JsObject::new(
            ObjectKind::Array(items),
            Some(self.intrinsics.array_proto.clone()),
        )))
    }

    fn new_function(&self, function: Function) -> ObjectRef {
        ObjectRef::new(JsObject::new(
            ObjectKind::Function(function),
            Some(self.intrinsics.function_proto.clone()),
        ))
    }

    /// A builtin function that `new` rejects.
    pub fn new_native(&self, name: &str, func: NativeFn) -> Value {
        Value::Object(self.new_function(Function::Native(NativeFunction {
            name: Rc::from(name),
            func,
            constructible: false,
        })))
    }

    /// A builtin constructor whose `prototype` property is `proto`.
    pub fn new_constructor(&self, name: &str, func: NativeFn, proto: &ObjectRef) -> ObjectRef {
        let ctor = self.new_function(Function::Native(NativeFunction {
            name: Rc::from(name),
            func,
            constructible: true,
        }));
        ctor.set_own("prototype", Value::Object(proto.clone()));
        proto.set_own("constructor", Value::Object(ctor.clone()));
        ctor
    }

    /// A script function closing over `env`.
    pub fn new_closure(&self, node: &Rc<FunctionNode>, env: &Scope, name: &str) -> Value {
        Value::Object(self.new_function(Function::Closure(Closure {
            node: node.clone(),
            env: env.clone(),
            name: Rc::from(name),
        })))
    }

    /// An ordinary object whose prototype is `proto`.
    pub fn new_object_with_proto(&self, proto: Option<ObjectRef>) -> ObjectRef {
        ObjectRef::new(JsObject::new(ObjectKind::Ordinary, proto))
    }

    /// Deterministic xorshift64* stream in `[0, 1)` for `Math.random`.
    pub(crate) fn next_random(&self) -> f64 {
        let mut x = self.rng.get();
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.rng.set(x);
        let bits = x.wrapping_mul(0x2545_f491_4f6c_dd1d) >> 11;
        bits as f64 / (1u64 << 53) as f64
    }
}

impl Default for Realm {
    fn default() -> Self {
        Self::new()
    }
}
