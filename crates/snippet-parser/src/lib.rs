//! Snippet parser: converts a token stream into an AST.

mod parse_expr;
mod parse_func;
mod parse_stmt;
mod parser;

pub use parser::{ParseOptions, ParseResult, Parser};

use snippet_lexer::Lexer;
use snippet_types::SourceFile;

/// Lex and parse a source file in one step.
///
/// Lexical errors short-circuit parsing: the returned result then has no
/// program and carries only the lexer's diagnostics.
pub fn parse_source(source_file: &SourceFile, options: ParseOptions) -> ParseResult {
    let lexed = Lexer::new(source_file).lex();
    if lexed.errors.has_errors() {
        return ParseResult {
            program: None,
            errors: lexed.errors,
        };
    }
    Parser::new(lexed.tokens, source_file)
        .with_options(options)
        .parse()
}
