//! Integration tests for the value formatter.
//!
//! Covers:
//! - primitives (undefined, null, numbers, booleans, strings, bigints)
//! - functions printed as their source text
//! - structured values as 2-space indented JSON
//! - nested bigints, functions and errors inside structures
//! - repeated and circular references
//! - the plain-string and last-resort fallbacks

use snippet_eval::{
    format, plain_string, Engine, Realm, ScopeMode, Value, ValueFormatter, CIRCULAR,
    UNFORMATTABLE,
};

// ══════════════════════════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════════════════════════

/// Evaluate `source` in a fresh engine and format the result.
fn render(source: &str) -> String {
    let mut engine = Engine::new();
    let value = engine
        .evaluate(source, ScopeMode::Shared)
        .unwrap_or_else(|err| panic!("evaluation of {source:?} failed: {err}"));
    format(&value)
}

// ══════════════════════════════════════════════════════════════════════════════
// Primitives
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn undefined_is_empty() {
    assert_eq!(format(&Value::Undefined), "");
}

#[test]
fn null_prints_null() {
    assert_eq!(format(&Value::Null), "null");
}

#[test]
fn numbers_use_canonical_text() {
    assert_eq!(format(&Value::Number(42.0)), "42");
    assert_eq!(format(&Value::Number(-1.5)), "-1.5");
    assert_eq!(format(&Value::Number(f64::NAN)), "NaN");
    assert_eq!(format(&Value::Number(f64::NEG_INFINITY)), "-Infinity");
    assert_eq!(format(&Value::Number(1e21)), "1e+21");
    assert_eq!(render("0.1 + 0.2"), "0.30000000000000004");
}

#[test]
fn booleans_print_as_words() {
    assert_eq!(format(&Value::Bool(true)), "true");
    assert_eq!(format(&Value::Bool(false)), "false");
}

#[test]
fn strings_are_verbatim() {
    assert_eq!(format(&Value::str("hello \"world\"")), "hello \"world\"");
    assert_eq!(render("'a' + 'b'"), "ab");
}

#[test]
fn bigints_print_without_suffix() {
    assert_eq!(render("10n ** 20n"), "100000000000000000000");
}

// ══════════════════════════════════════════════════════════════════════════════
// Functions
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn function_prints_source_text() {
    assert_eq!(
        render("function add(a, b) { return a + b; }\nadd"),
        "function add(a, b) { return a + b; }"
    );
}

#[test]
fn arrow_prints_source_text() {
    assert_eq!(render("(x) => x * 2"), "(x) => x * 2");
}

#[test]
fn builtin_prints_native_stub() {
    assert_eq!(render("Math.max"), "function max() { [native code] }");
}

// ══════════════════════════════════════════════════════════════════════════════
// Structures
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn object_is_indented_json() {
    assert_eq!(
        render("({ a: 1, b: 'two', c: [true, null] })"),
        "{\n  \"a\": 1,\n  \"b\": \"two\",\n  \"c\": [\n    true,\n    null\n  ]\n}"
    );
}

#[test]
fn empty_structures() {
    assert_eq!(render("({})"), "{}");
    assert_eq!(render("[]"), "[]");
}

#[test]
fn undefined_members_are_skipped_and_elements_become_null() {
    assert_eq!(render("({ a: undefined, b: 1 })"), "{\n  \"b\": 1\n}");
    assert_eq!(render("[undefined, 1]"), "[\n  null,\n  1\n]");
}

#[test]
fn non_finite_members_become_null() {
    assert_eq!(render("[NaN, Infinity]"), "[\n  null,\n  null\n]");
}

#[test]
fn integer_keys_come_first() {
    assert_eq!(
        render("({ b: 1, 2: 'x', a: 3, 1: 'y' })"),
        "{\n  \"1\": \"y\",\n  \"2\": \"x\",\n  \"b\": 1,\n  \"a\": 3\n}"
    );
}

#[test]
fn nested_bigint_gets_suffix() {
    assert_eq!(render("({ big: 12n })"), "{\n  \"big\": \"12n\"\n}");
}

#[test]
fn nested_functions_print_placeholders() {
    assert_eq!(
        render("[function named() {}, () => 1]"),
        "[\n  \"[Function named]\",\n  \"[Function anonymous]\"\n]"
    );
}

#[test]
fn nested_error_prints_name_message_stack() {
    let text = render("({ err: new TypeError('bad input') })");
    assert!(text.contains("\"name\": \"TypeError\""), "{text}");
    assert!(text.contains("\"message\": \"bad input\""), "{text}");
    assert!(text.contains("\"stack\": \"TypeError: bad input"), "{text}");
}

#[test]
fn top_level_error_prints_as_json() {
    let text = render("new Error('boom')");
    assert!(text.starts_with("{\n  \"name\": \"Error\",\n  \"message\": \"boom\""), "{text}");
}

// ══════════════════════════════════════════════════════════════════════════════
// References
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn self_reference_is_circular() {
    let text = render("const o = { name: 'loop' }; o.self = o; o");
    assert_eq!(
        text,
        format!("{{\n  \"name\": \"loop\",\n  \"self\": \"{CIRCULAR}\"\n}}")
    );
}

#[test]
fn repeated_reference_is_marked_on_second_visit() {
    let text = render("const shared = { v: 1 }; ({ first: shared, second: shared })");
    assert_eq!(
        text,
        "{\n  \"first\": {\n    \"v\": 1\n  },\n  \"second\": \"[Circular]\"\n}"
    );
}

#[test]
fn circular_array() {
    assert_eq!(render("const a = [1]; a.push(a); a"), "[\n  1,\n  \"[Circular]\"\n]");
}

// ══════════════════════════════════════════════════════════════════════════════
// Fallbacks
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn too_deep_object_falls_back_to_plain_string() {
    let text = render("let o = {}; for (let i = 0; i < 100; i++) { o = { next: o }; } o");
    assert_eq!(text, "[object Object]");
}

#[test]
fn too_deep_array_falls_back_to_plain_string() {
    let text = render("let a = []; for (let i = 0; i < 100; i++) { a = [a, 1]; } a");
    assert_eq!(text, ",1".repeat(100));
}

#[test]
fn plain_tier_has_its_own_bound() {
    let realm = Realm::new();
    let nest = |levels: usize| {
        let mut value = realm.new_array(vec![Value::Number(1.0)]);
        for _ in 0..levels {
            value = realm.new_array(vec![value]);
        }
        value
    };
    let formatter = ValueFormatter::new(2);
    assert_eq!(formatter.format(&nest(20)), "1");
    assert_eq!(formatter.format(&nest(40)), UNFORMATTABLE);
}

#[test]
fn custom_depth_limit() {
    let realm = Realm::new();
    let inner = realm.new_array(vec![Value::Number(1.0)]);
    let outer = realm.new_array(vec![inner.clone(), Value::Number(2.0)]);

    assert_eq!(ValueFormatter::new(8).format(&outer), "[\n  [\n    1\n  ],\n  2\n]");
    // Both tiers hit the limit on the nested array.
    assert_eq!(ValueFormatter::new(0).format(&outer), UNFORMATTABLE);
    assert_eq!(ValueFormatter::new(1).format(&inner), "[\n  1\n]");
}

#[test]
fn plain_string_matches_script_conversion() {
    let realm = Realm::new();
    let nested = realm.new_array(vec![Value::Number(2.0), Value::Null]);
    let array = realm.new_array(vec![Value::Number(1.0), nested, Value::str("x")]);
    assert_eq!(plain_string(&array, 8).unwrap(), "1,2,,x");
    assert_eq!(
        plain_string(&Value::Object(realm.new_object()), 8).unwrap(),
        "[object Object]"
    );
}

#[test]
fn formatting_is_deterministic() {
    let source = "({ list: [1, 2, { deep: [3n, 'x'] }], f: function g() {} })";
    let first = render(source);
    for _ in 0..100 {
        assert_eq!(render(source), first);
    }
}
