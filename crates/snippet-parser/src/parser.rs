//! Core parser infrastructure: token cursor, error reporting, helpers.

use std::collections::HashSet;

use snippet_lexer::token::{Token, TokenKind};
use snippet_types::ast::{Ident, Program, Stmt, StmtKind};
use snippet_types::{Diagnostics, ErrorCode, SourceFile, Span, SyntaxDiagnostic, MAX_ERRORS};

/// Options that change what the parser accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Accept `return` outside of any function (isolated snippets run as a
    /// function body).
    pub allow_top_level_return: bool,
    /// Maximum nesting of statements and expressions.
    pub max_nesting_depth: u32,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            allow_top_level_return: false,
            max_nesting_depth: 32,
        }
    }
}

/// The snippet parser.
///
/// Consumes a token stream produced by the lexer and builds an AST.
/// Collects errors and attempts recovery when possible.
pub struct Parser<'src> {
    /// The token stream.
    tokens: Vec<Token>,
    /// Current index into `tokens`.
    pos: usize,
    /// Source file for error context and function source text.
    pub(crate) source_file: &'src SourceFile,
    /// File name for error messages.
    file_name: String,
    /// Collected errors.
    errors: Diagnostics,
    pub(crate) options: ParseOptions,
    /// Current statement/expression nesting depth.
    depth: u32,
    /// Number of enclosing function bodies.
    pub(crate) function_depth: u32,
    /// Enclosing loops within the current function.
    pub(crate) loop_depth: u32,
    /// Enclosing `switch` statements within the current function.
    pub(crate) switch_depth: u32,
    /// `in` is not a binary operator while parsing a `for` initializer.
    pub(crate) no_in: bool,
}

/// Result of parsing.
pub struct ParseResult {
    pub program: Option<Program>,
    pub errors: Diagnostics,
}

impl ParseResult {
    /// The earliest diagnostic, if parsing failed.
    pub fn first_error(&self) -> Option<&SyntaxDiagnostic> {
        self.errors.first()
    }
}

impl<'src> Parser<'src> {
    /// Create a new parser from a token stream and source file.
    pub fn new(mut tokens: Vec<Token>, source_file: &'src SourceFile) -> Self {
        if !matches!(tokens.last(), Some(t) if t.kind == TokenKind::Eof) {
            let end = tokens.last().map_or(Span::point(1, 1), |t| t.span);
            tokens.push(Token::new(TokenKind::Eof, end));
        }
        Self {
            tokens,
            pos: 0,
            file_name: source_file.name.clone(),
            source_file,
            errors: Diagnostics::empty(),
            options: ParseOptions::default(),
            depth: 0,
            function_depth: 0,
            loop_depth: 0,
            switch_depth: 0,
            no_in: false,
        }
    }

    /// Replace the parse options.
    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    // ── Token Cursor ──────────────────────────────────────────────────────────

    /// Returns the current token without advancing.
    pub(crate) fn peek(&self) -> &Token {
        // The stream always ends with Eof (see `new`)
        let last = self.tokens.len() - 1;
        &self.tokens[self.pos.min(last)]
    }

    /// Returns the kind of the current token.
    pub(crate) fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    /// Advance the cursor by one and return the consumed token.
    pub(crate) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    /// Returns the previously consumed token's span.
    pub(crate) fn previous_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span
        } else {
            Span::point(1, 1)
        }
    }

    /// Returns the span of the current token.
    pub(crate) fn current_span(&self) -> Span {
        self.peek().span
    }

    /// Returns `true` if the current token is `Eof`.
    pub(crate) fn at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    /// Check if the current token matches the given kind exactly.
    pub(crate) fn check_exact(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    /// If the current token matches, advance and return `true`.
    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check_exact(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Look ahead by `n` tokens from current position.
    pub(crate) fn look_ahead(&self, n: usize) -> &TokenKind {
        self.tokens
            .get(self.pos + n)
            .map(|t| &t.kind)
            .unwrap_or(&TokenKind::Eof)
    }

    /// A line terminator separates the current token from the previous one.
    pub(crate) fn newline_before_current(&self) -> bool {
        self.peek().newline_before
    }

    /// The token `offset` ahead is the contextual keyword `word` (`of`).
    pub(crate) fn at_contextual(&self, offset: usize, word: &str) -> bool {
        matches!(self.look_ahead(offset), TokenKind::Identifier(name) if name == word)
    }

    // ── Semicolons ────────────────────────────────────────────────────────────

    /// Consume a statement terminator, applying automatic semicolon
    /// insertion: `;`, a following `}`, end of input, or a line break.
    pub(crate) fn consume_semicolon(&mut self) {
        if self.eat(&TokenKind::Semicolon) {
            return;
        }
        if self.at_end() || self.check_exact(&TokenKind::RBrace) || self.newline_before_current() {
            return;
        }
        self.error_unexpected();
    }

    // ── Expect Helpers ────────────────────────────────────────────────────────

    /// Expect a specific token kind. Returns the token if matched, or emits an error.
    pub(crate) fn expect(&mut self, expected: &TokenKind) -> Option<Token> {
        if self.check_exact(expected) {
            Some(self.advance())
        } else {
            self.error_unexpected();
            None
        }
    }

    /// Expect a binding identifier (declaration names, parameters).
    pub(crate) fn expect_identifier(&mut self) -> Option<Ident> {
        match self.peek_kind().clone() {
            TokenKind::Identifier(name) => {
                let span = self.advance().span;
                Some(Ident::new(name, span))
            }
            _ => {
                self.error_unexpected();
                None
            }
        }
    }

    /// Expect a property name after `.`: identifiers and any keyword.
    pub(crate) fn expect_property_name(&mut self) -> Option<Ident> {
        match self.peek_kind().property_name() {
            Some(name) => {
                let span = self.advance().span;
                Some(Ident::new(name, span))
            }
            None => {
                self.error_unexpected();
                None
            }
        }
    }

    // ── Error Reporting ───────────────────────────────────────────────────────

    /// Report the current token as unexpected, phrased the way browsers do.
    pub(crate) fn error_unexpected(&mut self) {
        let token = self.peek().clone();
        let (code, message) = match &token.kind {
            TokenKind::Reserved(_) => (ErrorCode::UNSUPPORTED_SYNTAX, unexpected_message(&token.kind)),
            kind => (ErrorCode::UNEXPECTED_TOKEN, unexpected_message(kind)),
        };
        self.error_at(code, message, token.span);
    }

    /// Report an error at the current token position.
    pub(crate) fn error_at_current(&mut self, code: ErrorCode, message: impl Into<String>) {
        let span = self.current_span();
        self.error_at(code, message, span);
    }

    /// Report an error at a specific span.
    pub(crate) fn error_at(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        let source_line = self
            .source_file
            .line(span.start_line)
            .unwrap_or("")
            .to_string();
        let error = SyntaxDiagnostic::new(&self.file_name, code, message, span, source_line);
        self.errors.push_error(error);
    }

    /// Returns `true` if we've hit the error limit and should stop.
    pub(crate) fn too_many_errors(&self) -> bool {
        self.errors.total_errors >= MAX_ERRORS
    }

    // ── Nesting ───────────────────────────────────────────────────────────────

    /// Enter one nesting level. Returns `false` (after reporting) when the
    /// limit is exceeded; the caller must then bail out without calling
    /// [`Parser::exit_nesting`].
    pub(crate) fn enter_nesting(&mut self) -> bool {
        if self.depth >= self.options.max_nesting_depth {
            self.error_at_current(
                ErrorCode::NESTING_TOO_DEEP,
                format!(
                    "Maximum nesting depth of {} exceeded",
                    self.options.max_nesting_depth
                ),
            );
            return false;
        }
        self.depth += 1;
        true
    }

    pub(crate) fn exit_nesting(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    // ── Synchronization ───────────────────────────────────────────────────────

    /// Skip tokens until we reach a synchronization point.
    /// Used after an error to resume at a known-good position. Always makes
    /// progress when nothing was consumed since `start`.
    pub(crate) fn synchronize(&mut self, start: usize) {
        if self.pos == start && !self.at_end() {
            self.advance();
        }
        while !self.at_end() {
            if self.pos > 0 && self.tokens[self.pos - 1].kind == TokenKind::Semicolon {
                return;
            }
            if self.newline_before_current() {
                return;
            }
            match self.peek_kind() {
                TokenKind::Var
                | TokenKind::Let
                | TokenKind::Const
                | TokenKind::Function
                | TokenKind::If
                | TokenKind::For
                | TokenKind::While
                | TokenKind::Do
                | TokenKind::Return
                | TokenKind::Throw
                | TokenKind::Try
                | TokenKind::Switch
                | TokenKind::RBrace => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// Current cursor position, for [`Parser::synchronize`].
    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    // ── Declarations ──────────────────────────────────────────────────────────

    /// Report lexical declarations that clash with another declaration in
    /// the same statement list.
    pub(crate) fn check_duplicate_declarations(&mut self, stmts: &[Stmt]) {
        let mut lexical: HashSet<&str> = HashSet::new();
        let mut var_like: HashSet<&str> = HashSet::new();
        let mut clashes: Vec<Ident> = Vec::new();

        for stmt in stmts {
            match &stmt.kind {
                StmtKind::VarDecl(decl) => {
                    for declarator in &decl.declarators {
                        let name = declarator.name.name.as_str();
                        let clash = if decl.kind.is_lexical() {
                            !lexical.insert(name) || var_like.contains(name)
                        } else {
                            var_like.insert(name);
                            lexical.contains(name)
                        };
                        if clash {
                            clashes.push(declarator.name.clone());
                        }
                    }
                }
                StmtKind::FunctionDecl(func) => {
                    if let Some(name) = &func.name {
                        var_like.insert(name.name.as_str());
                        if lexical.contains(name.name.as_str()) {
                            clashes.push(name.clone());
                        }
                    }
                }
                _ => {}
            }
        }

        for ident in clashes {
            self.error_at(
                ErrorCode::DUPLICATE_DECLARATION,
                format!("Identifier '{}' has already been declared", ident.name),
                ident.span,
            );
        }
    }

    // ── Public API ────────────────────────────────────────────────────────────

    /// Parse the token stream into a `Program` AST.
    pub fn parse(mut self) -> ParseResult {
        let program = self.parse_program();
        ParseResult {
            program: if self.errors.has_errors() {
                None
            } else {
                Some(program)
            },
            errors: self.errors,
        }
    }

    fn parse_program(&mut self) -> Program {
        let start = self.current_span();
        let body = self.parse_statement_list(|kind| matches!(kind, TokenKind::Eof));
        self.check_duplicate_declarations(&body);
        Program {
            body,
            span: start.merge(self.previous_span()),
        }
    }

    /// Parse statements until `is_end` matches the current token (not
    /// consumed) or input ends.
    pub(crate) fn parse_statement_list(&mut self, is_end: impl Fn(&TokenKind) -> bool) -> Vec<Stmt> {
        let mut stmts = Vec::new();
        while !is_end(self.peek_kind()) && !self.at_end() {
            if self.too_many_errors() {
                break;
            }
            let start = self.position();
            match self.parse_statement() {
                Some(stmt) => stmts.push(stmt),
                None => self.synchronize(start),
            }
        }
        stmts
    }
}

/// The message a browser console prints for an unexpected token.
pub(crate) fn unexpected_message(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Eof => "Unexpected end of input".to_string(),
        TokenKind::Identifier(name) => format!("Unexpected identifier '{name}'"),
        TokenKind::Number(_) | TokenKind::BigInt(_) => "Unexpected number".to_string(),
        TokenKind::String(_) => "Unexpected string".to_string(),
        TokenKind::Template(_)
        | TokenKind::TemplateStart(_)
        | TokenKind::TemplatePart(_)
        | TokenKind::TemplateEnd(_) => "Unexpected template string".to_string(),
        TokenKind::Reserved(word) => format!("Unexpected reserved word '{word}'"),
        TokenKind::InterpolationEnd => "Unexpected token '}'".to_string(),
        other => format!("Unexpected token '{other}'"),
    }
}
