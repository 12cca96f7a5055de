//! Parser tests.
//!
//! Covers: statements, declarations, operator precedence, automatic
//! semicolon insertion, functions and arrows (including recovered source
//! text), object/array/template literals, error messages and codes, the
//! nesting limit, and determinism.

use snippet_parser::{parse_source, ParseOptions, ParseResult};
use snippet_types::ast::*;
use snippet_types::{ErrorCode, SourceFile};

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

/// Parse source with default options.
fn parse(source: &str) -> ParseResult {
    let sf = SourceFile::new("test.js", source);
    parse_source(&sf, ParseOptions::default())
}

/// Parse source and return the program, panicking if there are errors.
fn parse_ok(source: &str) -> Program {
    let result = parse(source);
    if result.errors.has_errors() {
        for e in &result.errors.errors {
            eprintln!("  ERROR: {} ({}) at {}", e.message, e.code, e.span);
        }
        panic!("unexpected parse errors (see above)");
    }
    result.program.expect("no program returned")
}

/// Parse source and return the first error's (code, message, line).
fn first_error(source: &str) -> (ErrorCode, String, u32) {
    let result = parse(source);
    let err = result
        .first_error()
        .unwrap_or_else(|| panic!("expected a parse error for {source:?}"));
    (err.code, err.message.clone(), err.line())
}

/// The expression of the first statement, which must be an expression
/// statement.
fn first_expr(source: &str) -> Expr {
    let prog = parse_ok(source);
    match prog.body.into_iter().next().map(|s| s.kind) {
        Some(StmtKind::Expr(expr)) => expr,
        other => panic!("expected expression statement, got {other:?}"),
    }
}

// ─────────────────────────────────────────────────────────────────────
// Declarations
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_var_let_const() {
    let prog = parse_ok("var a = 1; let b; const c = 3, d = 4;");
    assert_eq!(prog.body.len(), 3);
    match &prog.body[2].kind {
        StmtKind::VarDecl(decl) => {
            assert_eq!(decl.kind, DeclKind::Const);
            assert_eq!(decl.declarators.len(), 2);
            assert_eq!(decl.declarators[1].name.name, "d");
        }
        other => panic!("expected VarDecl, got {other:?}"),
    }
}

#[test]
fn test_const_requires_initializer() {
    let (code, message, _) = first_error("const x;");
    assert_eq!(code, ErrorCode::MISSING_INITIALIZER);
    assert_eq!(message, "Missing initializer in const declaration");
}

#[test]
fn test_duplicate_lexical_declaration() {
    let (code, message, line) = first_error("let a = 1;\nlet a = 2;");
    assert_eq!(code, ErrorCode::DUPLICATE_DECLARATION);
    assert_eq!(message, "Identifier 'a' has already been declared");
    assert_eq!(line, 2);
}

#[test]
fn test_var_redeclaration_is_allowed() {
    parse_ok("var a = 1; var a = 2;");
    parse_ok("{ let a; } { let a; }");
}

#[test]
fn test_let_clashes_with_var() {
    let (code, _, _) = first_error("var a; let a;");
    assert_eq!(code, ErrorCode::DUPLICATE_DECLARATION);
}

#[test]
fn test_function_declaration_source_text() {
    let src = "function add(a, b) {\n  return a + b;\n}";
    let prog = parse_ok(src);
    match &prog.body[0].kind {
        StmtKind::FunctionDecl(func) => {
            assert_eq!(func.name.as_ref().map(|n| n.name.as_str()), Some("add"));
            assert_eq!(func.params.len(), 2);
            assert_eq!(func.source, src);
            assert!(!func.is_arrow);
        }
        other => panic!("expected FunctionDecl, got {other:?}"),
    }
}

#[test]
fn test_default_and_rest_params() {
    let prog = parse_ok("function f(a, b = 2, ...rest) {}");
    match &prog.body[0].kind {
        StmtKind::FunctionDecl(func) => {
            assert!(func.params[1].default.is_some());
            assert!(func.params[2].rest);
        }
        other => panic!("expected FunctionDecl, got {other:?}"),
    }
}

#[test]
fn test_rest_param_must_be_last() {
    let (_, message, _) = first_error("function f(...a, b) {}");
    assert_eq!(message, "Rest parameter must be last formal parameter");
}

// ─────────────────────────────────────────────────────────────────────
// Arrow functions
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_arrow_source_text() {
    let prog = parse_ok("const double = (x) => x * 2;");
    let StmtKind::VarDecl(decl) = &prog.body[0].kind else {
        panic!("expected VarDecl");
    };
    match &decl.declarators[0].init.as_ref().map(|e| &e.kind) {
        Some(ExprKind::Function(func)) => {
            assert!(func.is_arrow);
            assert_eq!(func.source, "(x) => x * 2");
            assert!(matches!(func.body, FunctionBody::Expr(_)));
        }
        other => panic!("expected arrow, got {other:?}"),
    }
}

#[test]
fn test_single_param_arrow_with_block() {
    let expr = first_expr("n => { return n + 1; }");
    match expr.kind {
        ExprKind::Function(func) => {
            assert_eq!(func.params.len(), 1);
            assert!(matches!(func.body, FunctionBody::Block(_)));
        }
        other => panic!("expected arrow, got {other:?}"),
    }
}

#[test]
fn test_parenthesized_expression_is_not_arrow() {
    let expr = first_expr("(a + b) * c");
    assert!(matches!(
        expr.kind,
        ExprKind::Binary {
            op: BinOp::Mul,
            ..
        }
    ));
}

// ─────────────────────────────────────────────────────────────────────
// Precedence
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_multiplication_binds_tighter() {
    let expr = first_expr("1 + 2 * 3");
    match expr.kind {
        ExprKind::Binary { op, right, .. } => {
            assert_eq!(op, BinOp::Add);
            assert!(matches!(
                right.kind,
                ExprKind::Binary {
                    op: BinOp::Mul,
                    ..
                }
            ));
        }
        other => panic!("expected Binary, got {other:?}"),
    }
}

#[test]
fn test_exponent_is_right_associative() {
    let expr = first_expr("2 ** 3 ** 2");
    match expr.kind {
        ExprKind::Binary { op, left, right } => {
            assert_eq!(op, BinOp::Exp);
            assert!(matches!(left.kind, ExprKind::Number(n) if n == 2.0));
            assert!(matches!(
                right.kind,
                ExprKind::Binary {
                    op: BinOp::Exp,
                    ..
                }
            ));
        }
        other => panic!("expected Binary, got {other:?}"),
    }
}

#[test]
fn test_unary_before_exponent_is_rejected() {
    let (code, _, _) = first_error("-2 ** 2");
    assert_eq!(code, ErrorCode::UNEXPECTED_TOKEN);
    parse_ok("(-2) ** 2");
}

#[test]
fn test_logical_and_nullish() {
    let expr = first_expr("a ?? b || c && d");
    match expr.kind {
        ExprKind::Logical { op, right, .. } => {
            assert_eq!(op, LogicalOp::Nullish);
            assert!(matches!(
                right.kind,
                ExprKind::Logical {
                    op: LogicalOp::Or,
                    ..
                }
            ));
        }
        other => panic!("expected Logical, got {other:?}"),
    }
}

#[test]
fn test_assignment_is_right_associative() {
    let expr = first_expr("a = b += 2");
    match expr.kind {
        ExprKind::Assign { op, value, .. } => {
            assert_eq!(op, AssignOp::Assign);
            assert!(matches!(
                value.kind,
                ExprKind::Assign {
                    op: AssignOp::Compound(BinOp::Add),
                    ..
                }
            ));
        }
        other => panic!("expected Assign, got {other:?}"),
    }
}

#[test]
fn test_conditional_and_sequence() {
    let expr = first_expr("x ? 1 : 2, y");
    match expr.kind {
        ExprKind::Sequence(items) => {
            assert_eq!(items.len(), 2);
            assert!(matches!(items[0].kind, ExprKind::Conditional { .. }));
        }
        other => panic!("expected Sequence, got {other:?}"),
    }
}

#[test]
fn test_typeof_and_instanceof() {
    let expr = first_expr("typeof x === 'string' && e instanceof Error");
    assert!(matches!(
        expr.kind,
        ExprKind::Logical {
            op: LogicalOp::And,
            ..
        }
    ));
}

// ─────────────────────────────────────────────────────────────────────
// Calls, members, new
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_method_call_chain() {
    let expr = first_expr("console.log(a, ...rest)");
    match expr.kind {
        ExprKind::Call { callee, args, .. } => {
            assert_eq!(args.len(), 2);
            assert!(matches!(args[1], Argument::Spread(_)));
            assert!(matches!(callee.kind, ExprKind::Member { .. }));
        }
        other => panic!("expected Call, got {other:?}"),
    }
}

#[test]
fn test_optional_chain() {
    let expr = first_expr("a?.b.c");
    match expr.kind {
        ExprKind::Member {
            object, optional, ..
        } => {
            assert!(!optional);
            assert!(matches!(object.kind, ExprKind::Member { optional: true, .. }));
        }
        other => panic!("expected Member, got {other:?}"),
    }
}

#[test]
fn test_keyword_as_property_name() {
    parse_ok("obj.default = obj.new + obj.class;");
}

#[test]
fn test_new_with_and_without_arguments() {
    let expr = first_expr("new Error('boom').message");
    match expr.kind {
        ExprKind::Member { object, .. } => match object.kind {
            ExprKind::New { args, .. } => assert_eq!(args.len(), 1),
            other => panic!("expected New, got {other:?}"),
        },
        other => panic!("expected Member, got {other:?}"),
    }
    assert!(matches!(first_expr("new Foo").kind, ExprKind::New { .. }));
}

#[test]
fn test_invalid_assignment_target() {
    let (code, message, _) = first_error("1 = 2");
    assert_eq!(code, ErrorCode::INVALID_ASSIGNMENT_TARGET);
    assert_eq!(message, "Invalid left-hand side in assignment");
    let (code, _, _) = first_error("a?.b = 1");
    assert_eq!(code, ErrorCode::INVALID_ASSIGNMENT_TARGET);
}

// ─────────────────────────────────────────────────────────────────────
// Literals
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_template_literal_parts() {
    let expr = first_expr("`a${1}b${x}`");
    match expr.kind {
        ExprKind::Template(parts) => {
            assert_eq!(parts.len(), 4);
            assert_eq!(parts[0], TemplatePart::Literal("a".into()));
            assert!(matches!(parts[3], TemplatePart::Expr(_)));
        }
        other => panic!("expected Template, got {other:?}"),
    }
}

#[test]
fn test_array_literal_with_holes_and_spread() {
    let expr = first_expr("[1, , ...xs, 4,]");
    match expr.kind {
        ExprKind::Array(elements) => {
            assert_eq!(elements.len(), 4);
            assert_eq!(elements[1], ArrayElement::Hole);
            assert!(matches!(elements[2], ArrayElement::Spread(_)));
        }
        other => panic!("expected Array, got {other:?}"),
    }
}

#[test]
fn test_object_literal_forms() {
    let expr = first_expr("({ a: 1, b, [k]: 2, 'x y': 3, 4: 5, ...rest, m() { return 1; } })");
    match expr.kind {
        ExprKind::Object(props) => {
            assert_eq!(props.len(), 7);
            match &props[1] {
                Property::KeyValue { key, value } => {
                    assert_eq!(key, &PropertyKey::Named("b".into()));
                    assert_eq!(value.kind, ExprKind::Identifier("b".into()));
                }
                other => panic!("expected shorthand, got {other:?}"),
            }
            assert!(matches!(
                &props[4],
                Property::KeyValue { key: PropertyKey::Named(k), .. } if k == "4"
            ));
            assert!(matches!(props[5], Property::Spread(_)));
        }
        other => panic!("expected Object, got {other:?}"),
    }
}

// ─────────────────────────────────────────────────────────────────────
// Statements
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_brace_at_statement_start_is_block() {
    let prog = parse_ok("{ let a = 1; }");
    assert!(matches!(prog.body[0].kind, StmtKind::Block(_)));
}

#[test]
fn test_labels_are_unsupported() {
    assert_eq!(
        first_error("outer: for (;;) {}").0,
        ErrorCode::UNSUPPORTED_SYNTAX
    );
}

#[test]
fn test_control_flow_statements() {
    let prog = parse_ok(
        r#"
        if (a) { b(); } else if (c) d(); else { e(); }
        while (i < 3) i++;
        do { i--; } while (i > 0)
        switch (x) { case 1: y(); break; default: z(); }
        try { risky(); } catch (e) { handle(e); } finally { done(); }
        try { risky(); } catch { }
        "#,
    );
    assert_eq!(prog.body.len(), 6);
    assert!(matches!(prog.body[3].kind, StmtKind::Switch { .. }));
}

#[test]
fn test_for_loop_forms() {
    let prog = parse_ok(
        r#"
        for (let i = 0; i < 3; i++) {}
        for (;;) { break; }
        for (const x of [1, 2]) {}
        for (k in obj) {}
        "#,
    );
    assert!(matches!(prog.body[0].kind, StmtKind::For { .. }));
    match &prog.body[2].kind {
        StmtKind::ForEach(each) => {
            assert_eq!(each.kind, ForEachKind::Of);
            assert_eq!(each.decl, Some(DeclKind::Const));
            assert_eq!(each.binding.name, "x");
        }
        other => panic!("expected ForEach, got {other:?}"),
    }
    match &prog.body[3].kind {
        StmtKind::ForEach(each) => {
            assert_eq!(each.kind, ForEachKind::In);
            assert_eq!(each.decl, None);
        }
        other => panic!("expected ForEach, got {other:?}"),
    }
}

#[test]
fn test_in_operator_inside_for_test() {
    parse_ok("for (var i = 0; 'a' in o; i++) {}");
}

#[test]
fn test_try_requires_handler() {
    let (_, message, _) = first_error("try { }");
    assert_eq!(message, "Missing catch or finally after try");
}

#[test]
fn test_illegal_return_at_top_level() {
    let (code, message, _) = first_error("return 1;");
    assert_eq!(code, ErrorCode::ILLEGAL_RETURN);
    assert_eq!(message, "Illegal return statement");
}

#[test]
fn test_top_level_return_allowed_by_option() {
    let sf = SourceFile::new("test.js", "const x = 2;\nreturn x * 21;");
    let options = ParseOptions {
        allow_top_level_return: true,
        ..ParseOptions::default()
    };
    let result = parse_source(&sf, options);
    assert!(!result.errors.has_errors());
    let prog = result.program.expect("program");
    assert!(matches!(prog.body[1].kind, StmtKind::Return(Some(_))));
}

#[test]
fn test_illegal_break_and_continue() {
    assert_eq!(first_error("break;").0, ErrorCode::ILLEGAL_BREAK);
    assert_eq!(first_error("continue;").0, ErrorCode::ILLEGAL_CONTINUE);
    assert_eq!(
        first_error("while (1) { function f() { break; } }").0,
        ErrorCode::ILLEGAL_BREAK
    );
    assert_eq!(
        first_error("switch (x) { case 1: continue; }").0,
        ErrorCode::ILLEGAL_CONTINUE
    );
}

// ─────────────────────────────────────────────────────────────────────
// Automatic semicolon insertion
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_newline_terminates_statements() {
    let prog = parse_ok("let a = 1\nlet b = 2\na + b");
    assert_eq!(prog.body.len(), 3);
}

#[test]
fn test_postfix_operator_after_newline_starts_new_statement() {
    let prog = parse_ok("a\n++b");
    assert_eq!(prog.body.len(), 2);
    match &prog.body[1].kind {
        StmtKind::Expr(Expr {
            kind: ExprKind::Update { prefix, .. },
            ..
        }) => assert!(*prefix),
        other => panic!("expected prefix update, got {other:?}"),
    }
}

#[test]
fn test_return_followed_by_newline() {
    let prog = parse_ok("function f() {\n  return\n  42\n}");
    let StmtKind::FunctionDecl(func) = &prog.body[0].kind else {
        panic!("expected FunctionDecl");
    };
    let FunctionBody::Block(block) = &func.body else {
        panic!("expected block body");
    };
    assert_eq!(block.stmts.len(), 2);
    assert_eq!(block.stmts[0].kind, StmtKind::Return(None));
}

#[test]
fn test_missing_separator_on_same_line() {
    let (code, message, _) = first_error("let a = 1 let b = 2");
    assert_eq!(code, ErrorCode::UNEXPECTED_TOKEN);
    assert_eq!(message, "Unexpected token 'let'");
}

// ─────────────────────────────────────────────────────────────────────
// Error messages
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_unexpected_token_message_and_line() {
    let (code, message, line) = first_error("let a = 1;\nlet b = );");
    assert_eq!(code, ErrorCode::UNEXPECTED_TOKEN);
    assert_eq!(message, "Unexpected token ')'");
    assert_eq!(line, 2);
}

#[test]
fn test_unexpected_end_of_input() {
    let (_, message, _) = first_error("let x = ");
    assert_eq!(message, "Unexpected end of input");
    let (_, message, _) = first_error("function f() {");
    assert_eq!(message, "Unexpected end of input");
}

#[test]
fn test_unexpected_identifier_and_number() {
    assert_eq!(first_error("a b").1, "Unexpected identifier 'b'");
    assert_eq!(first_error("foo(1 2)").1, "Unexpected number");
    assert_eq!(first_error("x = 'a' 'b'").1, "Unexpected string");
}

#[test]
fn test_reserved_word_is_unsupported() {
    let (code, message, _) = first_error("class A {}");
    assert_eq!(code, ErrorCode::UNSUPPORTED_SYNTAX);
    assert_eq!(message, "Unexpected reserved word 'class'");
}

#[test]
fn test_regex_literal_is_unsupported() {
    let (code, _, _) = first_error("const r = /ab+c/;");
    assert_eq!(code, ErrorCode::UNSUPPORTED_SYNTAX);
}

#[test]
fn test_lexer_errors_short_circuit() {
    let result = parse("let s = 'abc");
    assert!(result.program.is_none());
    assert_eq!(
        result.first_error().map(|e| e.code),
        Some(ErrorCode::UNTERMINATED_STRING)
    );
}

#[test]
fn test_error_recovery_collects_multiple_errors() {
    let result = parse("let = 1;\nlet ok = 2;\nconst;");
    assert!(result.errors.total_errors >= 2);
    assert_eq!(result.first_error().map(|e| e.line()), Some(1));
}

#[test]
fn test_nesting_limit() {
    let depth = 100;
    let source = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
    let (code, _, _) = first_error(&source);
    assert_eq!(code, ErrorCode::NESTING_TOO_DEEP);

    // Well within the default limit
    parse_ok(&format!("{}1{}", "(".repeat(8), ")".repeat(8)));
}

#[test]
fn test_nesting_limit_is_configurable() {
    let sf = SourceFile::new("test.js", "[[[[1]]]]");
    let options = ParseOptions {
        max_nesting_depth: 3,
        ..ParseOptions::default()
    };
    let result = parse_source(&sf, options);
    assert_eq!(
        result.first_error().map(|e| e.code),
        Some(ErrorCode::NESTING_TOO_DEEP)
    );
}

// ─────────────────────────────────────────────────────────────────────
// Determinism
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_determinism_100_iterations() {
    let source = r#"
        function fib(n) { return n < 2 ? n : fib(n - 1) + fib(n - 2); }
        const xs = [1, 2, 3].map((x) => x * 2);
        let o = { a: 1, b: { c: `t${xs.length}` } };
        for (const k in o) console.log(k, o[k] ?? null);
    "#;
    let reference = parse_ok(source);
    for _ in 0..100 {
        assert_eq!(parse_ok(source), reference);
    }
}
