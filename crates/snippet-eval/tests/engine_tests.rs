//! Integration tests for the execution engine.
//!
//! Covers:
//! - result lines and the error flag protocol
//! - console capture with severity prefixes
//! - error reporting (with and without a line number)
//! - shared and isolated scope modes
//! - restoration of the console entry points
//! - engine configuration

use snippet_eval::{
    Engine, EngineConfig, ExecutionOutcome, ExecutionRequest, OutputEvent, ScopeMode, Transcript,
    Value,
};

// ══════════════════════════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════════════════════════

/// Run `source` on `engine` and return everything it reported.
fn run_on(engine: &mut Engine, source: &str, scope: ScopeMode) -> Transcript {
    let mut transcript = Transcript::new();
    engine.execute(&ExecutionRequest::new(source, scope), &mut transcript);
    transcript
}

/// Run `source` in a fresh engine, shared scope.
fn run(source: &str) -> Transcript {
    run_on(&mut Engine::new(), source, ScopeMode::Shared)
}

/// The console entry points as objects, in log/info/warn/error order.
fn console_entries(engine: &Engine) -> Vec<Option<Value>> {
    ["log", "info", "warn", "error"]
        .iter()
        .map(|method| engine.console_entry(method))
        .collect()
}

fn same_entries(a: &[Option<Value>], b: &[Option<Value>]) -> bool {
    a.len() == b.len()
        && a.iter().zip(b).all(|pair| match pair {
            (Some(Value::Object(x)), Some(Value::Object(y))) => x.ptr_eq(y),
            (None, None) => true,
            _ => false,
        })
}

// ══════════════════════════════════════════════════════════════════════════════
// Results
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn expression_result_is_last_line() {
    let transcript = run("2 + 2");
    assert_eq!(transcript.lines(), ["4"]);
    assert!(!transcript.is_error());
}

#[test]
fn error_flag_is_cleared_first_and_never_raised_on_success() {
    let transcript = run("'ok'");
    assert_eq!(
        transcript.events,
        vec![
            OutputEvent::SetErrorState(false),
            OutputEvent::WriteLine("ok".to_string()),
        ]
    );
}

#[test]
fn undefined_result_writes_nothing() {
    let transcript = run("let x = 1;");
    assert_eq!(transcript.events, vec![OutputEvent::SetErrorState(false)]);
}

#[test]
fn null_and_primitive_results() {
    assert_eq!(run("null").lines(), ["null"]);
    assert_eq!(run("40 + 2").lines(), ["42"]);
    assert_eq!(run("1 < 2").lines(), ["true"]);
    assert_eq!(run("'text'").lines(), ["text"]);
    assert_eq!(run("undefined").lines(), Vec::<&str>::new());
}

#[test]
fn outcome_reports_result_text() {
    let mut engine = Engine::new();
    let request = engine.request("[1, 2].length");
    let outcome = engine.execute(&request, &mut Transcript::new());
    assert_eq!(outcome, ExecutionOutcome::Success(Some("2".to_string())));
}

#[test]
fn run_with_callbacks() {
    let mut engine = Engine::new();
    let mut lines = Vec::new();
    let mut flags = Vec::new();
    engine.run(
        "console.log('a', 1, [2]); 'done'",
        ScopeMode::Shared,
        |line| lines.push(line.to_string()),
        |flag| flags.push(flag),
    );
    assert_eq!(lines, ["a 1 [\n  2\n]", "done"]);
    assert_eq!(flags, [false]);
}

// ══════════════════════════════════════════════════════════════════════════════
// Console Capture
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn console_lines_arrive_in_order_with_prefixes() {
    let transcript = run("console.log('a'); console.warn('b'); console.info('c'); console.error('d'); 5");
    assert_eq!(transcript.lines(), ["a", "WARN: b", "c", "ERROR: d", "5"]);
    assert!(!transcript.is_error());
}

#[test]
fn console_arguments_are_space_joined_and_formatted() {
    let transcript = run("console.log('x =', { y: 1 }, null, undefined, 2n)");
    assert_eq!(transcript.lines(), ["x = {\n  \"y\": 1\n} null  2"]);
}

#[test]
fn console_inside_functions_and_loops() {
    let transcript = run(
        "function shout(n) { console.log('n=' + n); }\nfor (let i = 0; i < 3; i++) { shout(i); }",
    );
    assert_eq!(transcript.lines(), ["n=0", "n=1", "n=2"]);
}

#[test]
fn console_entries_are_restored_after_success() {
    let mut engine = Engine::new();
    let before = console_entries(&engine);
    run_on(&mut engine, "console.log('hi'); 1", ScopeMode::Shared);
    assert!(same_entries(&before, &console_entries(&engine)));
}

#[test]
fn console_entries_are_restored_after_error() {
    let mut engine = Engine::new();
    let before = console_entries(&engine);
    let transcript = run_on(&mut engine, "console.warn('x'); null.y", ScopeMode::Shared);
    assert!(transcript.is_error());
    assert!(same_entries(&before, &console_entries(&engine)));
}

#[test]
fn console_entries_are_restored_after_syntax_error() {
    let mut engine = Engine::new();
    let before = console_entries(&engine);
    run_on(&mut engine, "let = ;", ScopeMode::Isolated);
    assert!(same_entries(&before, &console_entries(&engine)));
}

#[test]
fn snippet_replacement_of_console_method_is_undone() {
    let mut engine = Engine::new();
    let original = console_entries(&engine);
    // The snippet's own replacement is overwritten by the restore.
    run_on(&mut engine, "console.log = function () {};", ScopeMode::Shared);
    assert!(same_entries(&original, &console_entries(&engine)));
}

// ══════════════════════════════════════════════════════════════════════════════
// Errors
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn thrown_error_reports_message_and_location() {
    let transcript = run("throw new Error('boom')");
    assert!(transcript.is_error());
    assert_eq!(transcript.lines(), ["Error: boom", "at <anonymous>:1:7"]);
}

#[test]
fn thrown_error_inside_function_reports_caller_frame() {
    let transcript = run("function fail() {\n  throw new Error('deep');\n}\nfail();");
    assert_eq!(transcript.lines(), ["Error: deep", "at fail (<anonymous>:2:9)"]);
}

#[test]
fn error_flag_follows_output_before_error() {
    let transcript = run("console.log('before'); throw new Error('after')");
    assert_eq!(
        transcript.events,
        vec![
            OutputEvent::SetErrorState(false),
            OutputEvent::WriteLine("before".to_string()),
            OutputEvent::SetErrorState(true),
            OutputEvent::WriteLine("Error: after".to_string()),
            OutputEvent::WriteLine("at <anonymous>:1:30".to_string()),
        ]
    );
}

#[test]
fn runtime_errors_carry_their_line() {
    let transcript = run("let a = 1;\nlet b = a.b.c;");
    assert_eq!(
        transcript.lines(),
        ["Error in line 2: Cannot read properties of undefined (reading 'c')"]
    );
}

#[test]
fn reference_error_carries_its_line() {
    let transcript = run("1;\n\nmissing + 1");
    assert_eq!(transcript.lines(), ["Error in line 3: missing is not defined"]);
}

#[test]
fn syntax_error_carries_its_line() {
    let transcript = run("let ok = 1;\nlet = ;");
    let lines = transcript.lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("Error in line 2: "), "{lines:?}");
    assert!(transcript.is_error());
}

#[test]
fn thrown_primitive_is_formatted() {
    assert_eq!(run("throw 'plain'").lines(), ["Error: plain"]);
    assert_eq!(run("throw 42").lines(), ["Error: 42"]);
}

#[test]
fn thrown_object_with_message() {
    let transcript = run("throw { message: 'custom' }");
    assert_eq!(transcript.lines(), ["Error: custom"]);
}

#[test]
fn caught_errors_do_not_reach_the_output() {
    let transcript = run("let r; try { null.x } catch (e) { r = e.message } r");
    assert_eq!(
        transcript.lines(),
        ["Cannot read properties of null (reading 'x')"]
    );
    assert!(!transcript.is_error());
}

#[test]
fn runaway_recursion_is_a_range_error() {
    let transcript = run("function f(n) { return f(n + 1); }\nf(0)");
    assert_eq!(
        transcript.lines(),
        ["Error in line 1: Maximum call stack size exceeded"]
    );
}

#[test]
fn outcome_reports_failure() {
    let mut engine = Engine::new();
    let outcome = engine.execute(
        &ExecutionRequest::new("undefinedFn()", ScopeMode::Shared),
        &mut Transcript::new(),
    );
    assert_eq!(
        outcome,
        ExecutionOutcome::Failure("Error in line 1: undefinedFn is not defined".to_string())
    );
}

// ══════════════════════════════════════════════════════════════════════════════
// Scope Modes
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn shared_declarations_persist_between_runs() {
    let mut engine = Engine::new();
    run_on(&mut engine, "var counter = 1; let label = 'x';", ScopeMode::Shared);
    let transcript = run_on(&mut engine, "counter + 1 + label", ScopeMode::Shared);
    assert_eq!(transcript.lines(), ["2x"]);
    assert_eq!(engine.global("counter"), Some(Value::Number(1.0)));
}

#[test]
fn isolated_declarations_do_not_leak() {
    let mut engine = Engine::new();
    run_on(&mut engine, "var leaked = 1; let also = 2;", ScopeMode::Isolated);
    let transcript = run_on(&mut engine, "typeof leaked + ' ' + typeof also", ScopeMode::Shared);
    assert_eq!(transcript.lines(), ["undefined undefined"]);
}

#[test]
fn isolated_runs_can_read_shared_globals() {
    let mut engine = Engine::new();
    run_on(&mut engine, "var base = 10;", ScopeMode::Shared);
    let transcript = run_on(&mut engine, "base * 2", ScopeMode::Isolated);
    assert_eq!(transcript.lines(), ["20"]);
}

#[test]
fn isolated_undeclared_assignment_still_leaks() {
    let mut engine = Engine::new();
    run_on(&mut engine, "sloppy = 'global';", ScopeMode::Isolated);
    assert_eq!(engine.global("sloppy"), Some(Value::str("global")));
}

#[test]
fn isolated_allows_top_level_return() {
    let transcript = run_on(&mut Engine::new(), "return 7;\n8", ScopeMode::Isolated);
    assert_eq!(transcript.lines(), ["7"]);
}

#[test]
fn shared_rejects_top_level_return() {
    let transcript = run("return 7;");
    assert!(transcript.is_error());
    assert!(transcript.lines()[0].starts_with("Error in line 1: "));
}

#[test]
fn shared_functions_survive_between_runs() {
    let mut engine = Engine::new();
    run_on(&mut engine, "function twice(x) { return x * 2; }", ScopeMode::Shared);
    let transcript = run_on(&mut engine, "twice(21)", ScopeMode::Shared);
    assert_eq!(transcript.lines(), ["42"]);
}

#[test]
fn escaped_isolated_function_keeps_its_scope() {
    let mut engine = Engine::new();
    run_on(
        &mut engine,
        "let base = 40; function add(x) { return base + x; } escaped = add;",
        ScopeMode::Isolated,
    );
    assert_eq!(run_on(&mut engine, "escaped(2)", ScopeMode::Shared).lines(), ["42"]);
}

#[test]
fn repeated_isolated_runs_with_local_functions() {
    let mut engine = Engine::new();
    for i in 0..20 {
        let source = format!("function twice(x) {{ return x * 2; }}\nconst k = {i};\ntwice(k)");
        let transcript = run_on(&mut engine, &source, ScopeMode::Isolated);
        assert_eq!(transcript.lines(), [(i * 2).to_string()]);
    }
    assert_eq!(run_on(&mut engine, "typeof twice", ScopeMode::Shared).lines(), ["undefined"]);
}

// ══════════════════════════════════════════════════════════════════════════════
// Configuration
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn configured_call_depth() {
    let config = EngineConfig {
        max_call_depth: 5,
        ..EngineConfig::default()
    };
    let mut engine = Engine::with_config(config);
    let ok = run_on(&mut engine, "function d(n) { return n ? d(n - 1) : 'bottom'; } d(3)", ScopeMode::Shared);
    assert_eq!(ok.lines(), ["bottom"]);
    let deep = run_on(&mut engine, "d(10)", ScopeMode::Shared);
    assert!(deep.is_error());
}

#[test]
fn configured_default_scope() {
    let config = EngineConfig::from_json(r#"{ "default_scope": "isolated" }"#).unwrap();
    let mut engine = Engine::with_config(config);
    let request = engine.request("var hidden = 1;");
    assert_eq!(request.scope_mode(), ScopeMode::Isolated);
    engine.execute(&request, &mut Transcript::new());
    assert_eq!(engine.global("hidden"), None);
}

#[test]
fn configured_file_name_appears_in_locations() {
    let config = EngineConfig {
        file_name: "snippet.js".to_string(),
        ..EngineConfig::default()
    };
    let mut engine = Engine::with_config(config);
    let transcript = run_on(&mut engine, "throw new Error('x')", ScopeMode::Shared);
    assert_eq!(transcript.lines(), ["Error: x", "at snippet.js:1:7"]);
}

// ══════════════════════════════════════════════════════════════════════════════
// Determinism
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn runs_are_deterministic() {
    let source = "console.log(Math.random()); const o = { a: [1, 2] }; o.self = o; o";
    let first = run(source);
    for _ in 0..100 {
        assert_eq!(run(source), first);
    }
}
