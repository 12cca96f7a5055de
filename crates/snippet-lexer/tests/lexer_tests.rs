//! Lexer tests.
//!
//! Covers keywords, reserved words, operators, number/string/template
//! literals, comments, line-break tracking, spans, error recovery, and the
//! 100-iteration determinism test.

use snippet_lexer::{Lexer, TokenKind};
use snippet_types::{ErrorCode, SourceFile};

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

/// Lex source text and return just the token kinds (excluding final Eof).
fn kinds(source: &str) -> Vec<TokenKind> {
    let sf = SourceFile::new("test.js", source);
    Lexer::new(&sf)
        .lex()
        .tokens
        .into_iter()
        .filter(|t| t.kind != TokenKind::Eof)
        .map(|t| t.kind)
        .collect()
}

/// Lex and return the error count.
fn error_count(source: &str) -> usize {
    let sf = SourceFile::new("test.js", source);
    Lexer::new(&sf).lex().errors.total_errors
}

/// Lex and return the code of the first error.
fn first_error_code(source: &str) -> Option<ErrorCode> {
    let sf = SourceFile::new("test.js", source);
    Lexer::new(&sf).lex().errors.errors.first().map(|e| e.code)
}

fn ident(name: &str) -> TokenKind {
    TokenKind::Identifier(name.to_string())
}

// ─────────────────────────────────────────────────────────────────────
// Keywords & identifiers
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_declaration_keywords() {
    assert_eq!(
        kinds("var let const function"),
        vec![
            TokenKind::Var,
            TokenKind::Let,
            TokenKind::Const,
            TokenKind::Function
        ]
    );
}

#[test]
fn test_operator_keywords() {
    assert_eq!(
        kinds("typeof void delete in instanceof new"),
        vec![
            TokenKind::Typeof,
            TokenKind::Void,
            TokenKind::Delete,
            TokenKind::In,
            TokenKind::Instanceof,
            TokenKind::New
        ]
    );
}

#[test]
fn test_reserved_words() {
    assert_eq!(
        kinds("class await"),
        vec![
            TokenKind::Reserved("class".into()),
            TokenKind::Reserved("await".into())
        ]
    );
}

#[test]
fn test_identifiers() {
    assert_eq!(
        kinds("foo _bar $baz of undefined café"),
        vec![
            ident("foo"),
            ident("_bar"),
            ident("$baz"),
            ident("of"),
            ident("undefined"),
            ident("café")
        ]
    );
}

#[test]
fn test_keyword_prefix_is_identifier() {
    assert_eq!(kinds("variable iffy"), vec![ident("variable"), ident("iffy")]);
}

// ─────────────────────────────────────────────────────────────────────
// Operators & punctuation
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_arithmetic_operators() {
    assert_eq!(
        kinds("+ - * ** / % ++ --"),
        vec![
            TokenKind::Plus,
            TokenKind::Minus,
            TokenKind::Star,
            TokenKind::StarStar,
            TokenKind::Slash,
            TokenKind::Percent,
            TokenKind::PlusPlus,
            TokenKind::MinusMinus
        ]
    );
}

#[test]
fn test_comparison_operators() {
    assert_eq!(
        kinds("== === != !== < > <= >="),
        vec![
            TokenKind::EqEq,
            TokenKind::EqEqEq,
            TokenKind::BangEq,
            TokenKind::BangEqEq,
            TokenKind::Less,
            TokenKind::Greater,
            TokenKind::LessEq,
            TokenKind::GreaterEq
        ]
    );
}

#[test]
fn test_assignment_operators() {
    assert_eq!(
        kinds("= += -= *= **= /= %= &&= ||= ??="),
        vec![
            TokenKind::Eq,
            TokenKind::PlusEq,
            TokenKind::MinusEq,
            TokenKind::StarEq,
            TokenKind::StarStarEq,
            TokenKind::SlashEq,
            TokenKind::PercentEq,
            TokenKind::AmpAmpEq,
            TokenKind::PipePipeEq,
            TokenKind::QuestionQuestionEq
        ]
    );
}

#[test]
fn test_logical_and_arrow() {
    assert_eq!(
        kinds("&& || ?? ! =>"),
        vec![
            TokenKind::AmpAmp,
            TokenKind::PipePipe,
            TokenKind::QuestionQuestion,
            TokenKind::Bang,
            TokenKind::Arrow
        ]
    );
}

#[test]
fn test_punctuation() {
    assert_eq!(
        kinds("( ) { } [ ] ; , . ... ? :"),
        vec![
            TokenKind::LParen,
            TokenKind::RParen,
            TokenKind::LBrace,
            TokenKind::RBrace,
            TokenKind::LBracket,
            TokenKind::RBracket,
            TokenKind::Semicolon,
            TokenKind::Comma,
            TokenKind::Dot,
            TokenKind::DotDotDot,
            TokenKind::Question,
            TokenKind::Colon
        ]
    );
}

#[test]
fn test_optional_chaining() {
    assert_eq!(
        kinds("a?.b"),
        vec![ident("a"), TokenKind::QuestionDot, ident("b")]
    );
}

#[test]
fn test_question_before_decimal_is_conditional() {
    assert_eq!(
        kinds("a?.5:1"),
        vec![
            ident("a"),
            TokenKind::Question,
            TokenKind::Number(0.5),
            TokenKind::Colon,
            TokenKind::Number(1.0)
        ]
    );
}

// ─────────────────────────────────────────────────────────────────────
// Number literals
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_decimal_numbers() {
    assert_eq!(
        kinds("0 42 3.25 .5 1e3 2.5e-3 1_000"),
        vec![
            TokenKind::Number(0.0),
            TokenKind::Number(42.0),
            TokenKind::Number(3.25),
            TokenKind::Number(0.5),
            TokenKind::Number(1000.0),
            TokenKind::Number(0.0025),
            TokenKind::Number(1000.0)
        ]
    );
}

#[test]
fn test_radix_numbers() {
    assert_eq!(
        kinds("0xff 0o17 0b101"),
        vec![
            TokenKind::Number(255.0),
            TokenKind::Number(15.0),
            TokenKind::Number(5.0)
        ]
    );
}

#[test]
fn test_bigint_literals() {
    assert_eq!(
        kinds("10n 0xffn"),
        vec![
            TokenKind::BigInt("10".into()),
            TokenKind::BigInt("0xff".into())
        ]
    );
}

#[test]
fn test_number_followed_by_identifier_is_error() {
    assert_eq!(first_error_code("3in"), Some(ErrorCode::INVALID_NUMBER));
    assert_eq!(first_error_code("1.5n"), Some(ErrorCode::INVALID_NUMBER));
}

#[test]
fn test_member_access_on_number_uses_dot() {
    assert_eq!(
        kinds("1..toString"),
        vec![TokenKind::Number(1.0), TokenKind::Dot, ident("toString")]
    );
}

// ─────────────────────────────────────────────────────────────────────
// String literals
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_quoted_strings() {
    assert_eq!(
        kinds(r#"'single' "double""#),
        vec![
            TokenKind::String("single".into()),
            TokenKind::String("double".into())
        ]
    );
}

#[test]
fn test_string_escapes() {
    assert_eq!(
        kinds(r"'a\nb\t\'q\'\\'"),
        vec![TokenKind::String("a\nb\t'q'\\".into())]
    );
    assert_eq!(
        kinds(r"'\x41B\u{43}'"),
        vec![TokenKind::String("ABC".into())]
    );
}

#[test]
fn test_unknown_escape_is_literal_char() {
    assert_eq!(kinds(r"'\q'"), vec![TokenKind::String("q".into())]);
}

#[test]
fn test_line_continuation() {
    assert_eq!(kinds("'ab\\\ncd'"), vec![TokenKind::String("abcd".into())]);
}

#[test]
fn test_unterminated_string() {
    assert_eq!(
        first_error_code("let s = 'abc"),
        Some(ErrorCode::UNTERMINATED_STRING)
    );
    assert_eq!(
        first_error_code("'abc\n'"),
        Some(ErrorCode::UNTERMINATED_STRING)
    );
}

#[test]
fn test_bad_hex_escape() {
    assert_eq!(first_error_code(r"'\xZZ'"), Some(ErrorCode::INVALID_ESCAPE));
}

// ─────────────────────────────────────────────────────────────────────
// Template literals
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_plain_template() {
    assert_eq!(kinds("`hello`"), vec![TokenKind::Template("hello".into())]);
}

#[test]
fn test_template_with_substitution() {
    assert_eq!(
        kinds("`a${b}c`"),
        vec![
            TokenKind::TemplateStart("a".into()),
            TokenKind::InterpolationStart,
            ident("b"),
            TokenKind::InterpolationEnd,
            TokenKind::TemplateEnd("c".into())
        ]
    );
}

#[test]
fn test_template_with_two_substitutions() {
    assert_eq!(
        kinds("`${x}-${y}`"),
        vec![
            TokenKind::TemplateStart(String::new()),
            TokenKind::InterpolationStart,
            ident("x"),
            TokenKind::InterpolationEnd,
            TokenKind::TemplatePart("-".into()),
            TokenKind::InterpolationStart,
            ident("y"),
            TokenKind::InterpolationEnd,
            TokenKind::TemplateEnd(String::new())
        ]
    );
}

#[test]
fn test_template_braces_inside_substitution() {
    assert_eq!(
        kinds("`${ {a: 1}.a }`"),
        vec![
            TokenKind::TemplateStart(String::new()),
            TokenKind::InterpolationStart,
            TokenKind::LBrace,
            ident("a"),
            TokenKind::Colon,
            TokenKind::Number(1.0),
            TokenKind::RBrace,
            TokenKind::Dot,
            ident("a"),
            TokenKind::InterpolationEnd,
            TokenKind::TemplateEnd(String::new())
        ]
    );
}

#[test]
fn test_multiline_template() {
    assert_eq!(
        kinds("`line1\nline2`"),
        vec![TokenKind::Template("line1\nline2".into())]
    );
}

#[test]
fn test_unterminated_template() {
    assert_eq!(
        first_error_code("`abc"),
        Some(ErrorCode::UNTERMINATED_TEMPLATE)
    );
}

// ─────────────────────────────────────────────────────────────────────
// Comments & line breaks
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_comments_are_skipped() {
    assert_eq!(
        kinds("a // line\n/* block */ b"),
        vec![ident("a"), ident("b")]
    );
}

#[test]
fn test_unterminated_block_comment() {
    assert_eq!(
        first_error_code("a /* never closed"),
        Some(ErrorCode::UNTERMINATED_COMMENT)
    );
}

#[test]
fn test_newline_before_flag() {
    let sf = SourceFile::new("test.js", "a\nb c /*\n*/ d");
    let tokens = Lexer::new(&sf).lex().tokens;
    let flags: Vec<bool> = tokens.iter().map(|t| t.newline_before).collect();
    // a, b, c, d, Eof
    assert_eq!(flags, vec![false, true, false, true, false]);
}

// ─────────────────────────────────────────────────────────────────────
// Spans
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_spans_track_lines_and_columns() {
    let sf = SourceFile::new("test.js", "let x = 1;\n  foo");
    let tokens = Lexer::new(&sf).lex().tokens;
    let x = &tokens[1];
    assert_eq!((x.span.start_line, x.span.start_col), (1, 5));
    assert_eq!((x.span.lo, x.span.hi), (4, 5));
    let foo = &tokens[5];
    assert_eq!(foo.kind, ident("foo"));
    assert_eq!((foo.span.start_line, foo.span.start_col), (2, 3));
    assert_eq!(sf.slice(foo.span), "foo");
}

#[test]
fn test_columns_count_characters_not_bytes() {
    let sf = SourceFile::new("test.js", "'éé' x");
    let tokens = Lexer::new(&sf).lex().tokens;
    let x = &tokens[1];
    assert_eq!(x.span.start_col, 6);
    assert_eq!(x.span.lo, 7);
}

// ─────────────────────────────────────────────────────────────────────
// Error recovery
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_invalid_character_is_skipped() {
    assert_eq!(kinds("a # b"), vec![ident("a"), ident("b")]);
    assert_eq!(error_count("a # b"), 1);
    assert_eq!(
        first_error_code("a @ b"),
        Some(ErrorCode::UNEXPECTED_CHARACTER)
    );
}

#[test]
fn test_bitwise_operators_rejected() {
    assert_eq!(error_count("a & b | c ^ d"), 3);
}

#[test]
fn test_invalid_token_message() {
    let sf = SourceFile::new("test.js", "x = #");
    let result = Lexer::new(&sf).lex();
    assert_eq!(result.errors.errors[0].message, "Invalid or unexpected token");
    assert_eq!(result.errors.errors[0].span.start_col, 5);
}

#[test]
fn test_error_collection_is_capped() {
    let source = "#".repeat(30);
    let sf = SourceFile::new("test.js", source.as_str());
    let result = Lexer::new(&sf).lex();
    assert_eq!(result.errors.errors.len(), 20);
    assert!(result.errors.is_full());
    assert_eq!(
        result.tokens.last().map(|t| t.kind.clone()),
        Some(TokenKind::Eof)
    );
}

#[test]
fn test_empty_source() {
    let sf = SourceFile::new("test.js", "");
    let result = Lexer::new(&sf).lex();
    assert_eq!(result.tokens.len(), 1);
    assert_eq!(result.tokens[0].kind, TokenKind::Eof);
    assert!(!result.errors.has_errors());
}

// ─────────────────────────────────────────────────────────────────────
// Determinism
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_determinism_100_iterations() {
    let source = r#"
        const greet = (name = "you") => `hi ${name}!`;
        let total = 0;
        for (let i = 0; i < 10; i++) { total += i ** 2; }
        console.log(greet(), total, 0xffn, obj?.a ?? null);
    "#;
    let sf = SourceFile::new("test.js", source);
    let reference = Lexer::new(&sf).lex().tokens;
    for _ in 0..100 {
        let tokens = Lexer::new(&sf).lex().tokens;
        assert_eq!(tokens, reference);
    }
}
