//! Core snippet lexer: converts source text to a token stream.
//!
//! Features:
//! - The operator and keyword set of the supported JavaScript subset
//! - Template literals with `${expr}` via a mode stack
//! - Line (`//`) and block (`/* */`) comments
//! - Line-break tracking on each token for automatic semicolon insertion
//! - Error recovery: collects up to 20 errors instead of stopping at the first

use snippet_types::{Diagnostics, ErrorCode, SourceFile, Span, SyntaxDiagnostic};

use crate::token::{Token, TokenKind};

/// Message browsers use for malformed tokens.
const INVALID_TOKEN: &str = "Invalid or unexpected token";

/// Lexer mode: tracks whether we're scanning code or the text of a
/// template literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Normal code scanning.
    Normal,
    /// Inside a template literal: scanning text until `` ` `` or `${`.
    Template,
    /// Inside a `${...}` substitution. The `u32` tracks the brace depth so
    /// we know when the substitution's closing `}` is reached.
    Interpolation { brace_depth: u32 },
}

/// Position a token started at.
#[derive(Debug, Clone, Copy)]
struct Mark {
    line: u32,
    col: u32,
    pos: usize,
}

/// The snippet lexer.
///
/// Converts source text into a vector of [`Token`]s, collecting up to
/// [`snippet_types::MAX_ERRORS`] errors along the way.
pub struct Lexer<'src> {
    /// The full source text.
    text: &'src str,
    /// The same text as bytes.
    source: &'src [u8],
    /// Source file for error reporting.
    source_file: &'src SourceFile,
    /// Current byte offset into `source`.
    pos: usize,
    /// Current line number (1-based).
    line: u32,
    /// Current column number (1-based, in characters).
    col: u32,
    /// Collected errors.
    errors: Diagnostics,
    /// Mode stack for template literals.
    mode_stack: Vec<Mode>,
    /// Pending tokens to emit before the next scan (used for substitutions).
    pending: Vec<Token>,
    /// A line terminator was skipped since the last emitted token.
    saw_newline: bool,
}

/// Result of lexing: tokens + any errors collected.
pub struct LexResult {
    /// The token stream (always ends with [`TokenKind::Eof`]).
    pub tokens: Vec<Token>,
    /// Errors encountered during lexing.
    pub errors: Diagnostics,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given source file.
    pub fn new(source_file: &'src SourceFile) -> Self {
        Self {
            text: &source_file.source,
            source: source_file.source.as_bytes(),
            source_file,
            pos: 0,
            line: 1,
            col: 1,
            errors: Diagnostics::empty(),
            mode_stack: vec![Mode::Normal],
            pending: Vec::new(),
            saw_newline: false,
        }
    }

    /// Lex the entire source file into a token stream.
    pub fn lex(mut self) -> LexResult {
        let mut tokens = Vec::new();

        loop {
            if self.errors.is_full() {
                break;
            }

            // Drain pending tokens first (InterpolationStart after TemplateStart)
            if let Some(pending) = self.pending.pop() {
                tokens.push(pending);
                continue;
            }

            let mut token = match self.current_mode() {
                Mode::Template => self.scan_template_continuation(),
                Mode::Normal | Mode::Interpolation { .. } => self.scan_normal(),
            };
            token.newline_before = std::mem::take(&mut self.saw_newline);

            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);

            if is_eof {
                break;
            }
        }

        if !matches!(tokens.last(), Some(t) if t.kind == TokenKind::Eof) {
            let span = self.span_from(self.mark());
            tokens.push(Token::new(TokenKind::Eof, span));
        }

        LexResult {
            tokens,
            errors: self.errors,
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Mode stack helpers
    // ─────────────────────────────────────────────────────────────

    fn current_mode(&self) -> Mode {
        *self.mode_stack.last().unwrap_or(&Mode::Normal)
    }

    fn push_mode(&mut self, mode: Mode) {
        self.mode_stack.push(mode);
    }

    fn pop_mode(&mut self) {
        if self.mode_stack.len() > 1 {
            self.mode_stack.pop();
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Character-level helpers
    // ─────────────────────────────────────────────────────────────

    fn peek(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.source.get(self.pos + offset).copied()
    }

    fn peek_char(&self) -> Option<char> {
        self.text.get(self.pos..)?.chars().next()
    }

    /// Consume one full character (UTF-8 aware).
    fn advance(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn mark(&self) -> Mark {
        Mark {
            line: self.line,
            col: self.col,
            pos: self.pos,
        }
    }

    fn span_from(&self, start: Mark) -> Span {
        Span::new(
            start.line,
            start.col,
            self.line,
            self.col.saturating_sub(1).max(1),
        )
        .with_offsets(start.pos, self.pos)
    }

    fn token_from(&self, kind: TokenKind, start: Mark) -> Token {
        Token::new(kind, self.span_from(start))
    }

    fn emit_error(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        let source_line = self.source_file.line(span.start_line).unwrap_or("");
        let err = SyntaxDiagnostic::new(&self.source_file.name, code, message, span, source_line);
        self.errors.push_error(err);
    }

    fn emit_error_with_suggestion(
        &mut self,
        code: ErrorCode,
        message: impl Into<String>,
        span: Span,
        suggestion: impl Into<String>,
    ) {
        let source_line = self.source_file.line(span.start_line).unwrap_or("");
        let err = SyntaxDiagnostic::new(&self.source_file.name, code, message, span, source_line)
            .with_suggestion(suggestion);
        self.errors.push_error(err);
    }

    // ─────────────────────────────────────────────────────────────
    // Whitespace & comments
    // ─────────────────────────────────────────────────────────────

    /// Skip whitespace, line breaks and comments, remembering whether a
    /// line break was crossed.
    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(b'\n') => {
                    self.advance();
                    self.saw_newline = true;
                }
                Some(b' ' | b'\t' | b'\r' | 0x0b | 0x0c) => {
                    self.advance();
                }
                Some(b'/') if self.peek_at(1) == Some(b'/') => self.skip_line_comment(),
                Some(b'/') if self.peek_at(1) == Some(b'*') => self.skip_block_comment(),
                Some(byte) if byte >= 0x80 => match self.peek_char() {
                    Some('\u{2028}' | '\u{2029}') => {
                        self.advance();
                        self.saw_newline = true;
                    }
                    Some(ch) if ch.is_whitespace() || ch == '\u{feff}' => {
                        self.advance();
                    }
                    _ => break,
                },
                _ => break,
            }
        }
    }

    /// Skip a single-line comment (`// ...`), leaving the newline in place.
    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == b'\n' {
                break;
            }
            self.advance();
        }
    }

    /// Skip a block comment (`/* ... */`). A line break inside counts as a
    /// line break between the surrounding tokens.
    fn skip_block_comment(&mut self) {
        let start = self.mark();
        self.advance(); // consume '/'
        self.advance(); // consume '*'
        loop {
            match self.peek() {
                None => {
                    let span = self.span_from(start);
                    self.emit_error_with_suggestion(
                        ErrorCode::UNTERMINATED_COMMENT,
                        INVALID_TOKEN,
                        span,
                        "Close the comment with */",
                    );
                    return;
                }
                Some(b'*') if self.peek_at(1) == Some(b'/') => {
                    self.advance();
                    self.advance();
                    return;
                }
                Some(b'\n') => {
                    self.advance();
                    self.saw_newline = true;
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Normal-mode scanning
    // ─────────────────────────────────────────────────────────────

    /// Scan one token in normal (code) mode.
    fn scan_normal(&mut self) -> Token {
        loop {
            self.skip_trivia();

            if self.errors.is_full() || self.at_end() {
                if self
                    .mode_stack
                    .iter()
                    .any(|m| matches!(m, Mode::Template | Mode::Interpolation { .. }))
                    && !self.errors.is_full()
                {
                    let span = self.span_from(self.mark());
                    self.emit_error(ErrorCode::UNTERMINATED_TEMPLATE, "Unterminated template literal", span);
                    self.mode_stack.truncate(1);
                }
                return self.token_from(TokenKind::Eof, self.mark());
            }

            if let Some(token) = self.scan_token() {
                return token;
            }
            // An invalid character was reported; keep scanning.
        }
    }

    /// Scan a token starting at the current position. Returns `None` after
    /// reporting an invalid character.
    fn scan_token(&mut self) -> Option<Token> {
        let start = self.mark();
        let ch = self.advance()?;

        let kind = match ch {
            // ── String literals ──
            '\'' | '"' => return Some(self.scan_string(ch, start)),
            '`' => return Some(self.scan_template(start)),

            // ── Number literals ──
            '0'..='9' => return Some(self.scan_number(ch, start)),
            '.' if matches!(self.peek(), Some(b'0'..=b'9')) => {
                return Some(self.scan_number(ch, start))
            }

            // ── Identifiers & keywords ──
            c if is_identifier_start(c) => return Some(self.scan_identifier(start)),

            // ── Operators & punctuation ──
            '+' => {
                if self.eat_byte(b'+') {
                    TokenKind::PlusPlus
                } else if self.eat_byte(b'=') {
                    TokenKind::PlusEq
                } else {
                    TokenKind::Plus
                }
            }
            '-' => {
                if self.eat_byte(b'-') {
                    TokenKind::MinusMinus
                } else if self.eat_byte(b'=') {
                    TokenKind::MinusEq
                } else {
                    TokenKind::Minus
                }
            }
            '*' => {
                if self.eat_byte(b'*') {
                    if self.eat_byte(b'=') {
                        TokenKind::StarStarEq
                    } else {
                        TokenKind::StarStar
                    }
                } else if self.eat_byte(b'=') {
                    TokenKind::StarEq
                } else {
                    TokenKind::Star
                }
            }
            // Comments were consumed as trivia, so a bare `/` is division
            '/' => {
                if self.eat_byte(b'=') {
                    TokenKind::SlashEq
                } else {
                    TokenKind::Slash
                }
            }
            '%' => {
                if self.eat_byte(b'=') {
                    TokenKind::PercentEq
                } else {
                    TokenKind::Percent
                }
            }
            '=' => {
                if self.eat_byte(b'=') {
                    if self.eat_byte(b'=') {
                        TokenKind::EqEqEq
                    } else {
                        TokenKind::EqEq
                    }
                } else if self.eat_byte(b'>') {
                    TokenKind::Arrow
                } else {
                    TokenKind::Eq
                }
            }
            '!' => {
                if self.eat_byte(b'=') {
                    if self.eat_byte(b'=') {
                        TokenKind::BangEqEq
                    } else {
                        TokenKind::BangEq
                    }
                } else {
                    TokenKind::Bang
                }
            }
            '<' => {
                if self.eat_byte(b'=') {
                    TokenKind::LessEq
                } else {
                    TokenKind::Less
                }
            }
            '>' => {
                if self.eat_byte(b'=') {
                    TokenKind::GreaterEq
                } else {
                    TokenKind::Greater
                }
            }
            '&' if self.peek() == Some(b'&') => {
                self.advance();
                if self.eat_byte(b'=') {
                    TokenKind::AmpAmpEq
                } else {
                    TokenKind::AmpAmp
                }
            }
            '|' if self.peek() == Some(b'|') => {
                self.advance();
                if self.eat_byte(b'=') {
                    TokenKind::PipePipeEq
                } else {
                    TokenKind::PipePipe
                }
            }
            '?' => {
                if self.peek() == Some(b'?') {
                    self.advance();
                    if self.eat_byte(b'=') {
                        TokenKind::QuestionQuestionEq
                    } else {
                        TokenKind::QuestionQuestion
                    }
                } else if self.peek() == Some(b'.') && !matches!(self.peek_at(1), Some(b'0'..=b'9'))
                {
                    // `a?.b` but not `a ? .5 : 1`
                    self.advance();
                    TokenKind::QuestionDot
                } else {
                    TokenKind::Question
                }
            }
            '.' => {
                if self.peek() == Some(b'.') && self.peek_at(1) == Some(b'.') {
                    self.advance();
                    self.advance();
                    TokenKind::DotDotDot
                } else {
                    TokenKind::Dot
                }
            }
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ';' => TokenKind::Semicolon,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,

            '{' => {
                if let Some(Mode::Interpolation { brace_depth }) = self.mode_stack.last_mut() {
                    *brace_depth += 1;
                }
                TokenKind::LBrace
            }

            '}' => {
                if let Some(Mode::Interpolation { brace_depth }) = self.mode_stack.last_mut() {
                    if *brace_depth == 0 {
                        // This `}` ends the substitution: back to template text
                        self.pop_mode();
                        self.push_mode(Mode::Template);
                        return Some(self.token_from(TokenKind::InterpolationEnd, start));
                    }
                    *brace_depth -= 1;
                }
                TokenKind::RBrace
            }

            other => {
                let span = self.span_from(start);
                if matches!(other, '&' | '|' | '^' | '~') {
                    self.emit_error_with_suggestion(
                        ErrorCode::UNEXPECTED_CHARACTER,
                        INVALID_TOKEN,
                        span,
                        "Bitwise operators are not supported",
                    );
                } else {
                    self.emit_error(ErrorCode::UNEXPECTED_CHARACTER, INVALID_TOKEN, span);
                }
                return None;
            }
        };

        Some(self.token_from(kind, start))
    }

    fn eat_byte(&mut self, expected: u8) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Number literals
    // ─────────────────────────────────────────────────────────────

    fn scan_number(&mut self, first: char, start: Mark) -> Token {
        // Radix-prefixed integers: 0x.., 0o.., 0b..
        if first == '0' {
            let radix = match self.peek() {
                Some(b'x' | b'X') => Some(16),
                Some(b'o' | b'O') => Some(8),
                Some(b'b' | b'B') => Some(2),
                _ => None,
            };
            if let Some(radix) = radix {
                self.advance();
                return self.scan_radix_number(radix, start);
            }
        }

        let mut is_integer = first != '.';
        self.consume_digits();

        if first != '.' && self.peek() == Some(b'.') {
            self.advance(); // consume '.'
            is_integer = false;
            self.consume_digits();
        }

        if matches!(self.peek(), Some(b'e' | b'E')) {
            let has_digits = match self.peek_at(1) {
                Some(b'0'..=b'9') => true,
                Some(b'+' | b'-') => matches!(self.peek_at(2), Some(b'0'..=b'9')),
                _ => false,
            };
            if has_digits {
                is_integer = false;
                self.advance(); // 'e'
                if matches!(self.peek(), Some(b'+' | b'-')) {
                    self.advance();
                }
                self.consume_digits();
            }
        }

        let text: String = self.text[start.pos..self.pos]
            .chars()
            .filter(|&c| c != '_')
            .collect();

        if is_integer && self.peek() == Some(b'n') {
            self.advance();
            return self.finish_number(TokenKind::BigInt(text), start);
        }

        let value: f64 = text.parse().unwrap_or(f64::NAN);
        self.finish_number(TokenKind::Number(value), start)
    }

    fn scan_radix_number(&mut self, radix: u32, start: Mark) -> Token {
        let digits_start = self.pos;
        while let Some(ch) = self.peek_char() {
            if ch.is_digit(radix) || ch == '_' {
                self.advance();
            } else {
                break;
            }
        }
        let digits: String = self.text[digits_start..self.pos]
            .chars()
            .filter(|&c| c != '_')
            .collect();

        if digits.is_empty() {
            let span = self.span_from(start);
            self.emit_error(ErrorCode::INVALID_NUMBER, INVALID_TOKEN, span);
            return self.token_from(TokenKind::Number(0.0), start);
        }

        if self.peek() == Some(b'n') {
            self.advance();
            let literal = self.text[start.pos..digits_start].to_string() + &digits;
            return self.finish_number(TokenKind::BigInt(literal), start);
        }

        let value = digits
            .chars()
            .filter_map(|c| c.to_digit(radix))
            .fold(0f64, |acc, d| acc * radix as f64 + d as f64);
        self.finish_number(TokenKind::Number(value), start)
    }

    fn consume_digits(&mut self) {
        while let Some(b'0'..=b'9' | b'_') = self.peek() {
            self.advance();
        }
    }

    /// A number must not run straight into an identifier (`3in`, `1px`).
    fn finish_number(&mut self, kind: TokenKind, start: Mark) -> Token {
        if self.peek_char().is_some_and(is_identifier_start) {
            while self.peek_char().is_some_and(is_identifier_part) {
                self.advance();
            }
            let span = self.span_from(start);
            self.emit_error(ErrorCode::INVALID_NUMBER, INVALID_TOKEN, span);
        }
        self.token_from(kind, start)
    }

    // ─────────────────────────────────────────────────────────────
    // Identifiers & keywords
    // ─────────────────────────────────────────────────────────────

    fn scan_identifier(&mut self, start: Mark) -> Token {
        // First character was already consumed
        while self.peek_char().is_some_and(is_identifier_part) {
            self.advance();
        }

        let text = &self.text[start.pos..self.pos];
        let kind =
            TokenKind::from_keyword(text).unwrap_or_else(|| TokenKind::Identifier(text.to_string()));

        self.token_from(kind, start)
    }

    // ─────────────────────────────────────────────────────────────
    // String literals
    // ─────────────────────────────────────────────────────────────

    /// Scan a quoted string after its opening quote.
    fn scan_string(&mut self, quote: char, start: Mark) -> Token {
        let mut buf = String::new();

        loop {
            match self.peek_char() {
                None | Some('\n') => {
                    let span = self.span_from(start);
                    self.emit_error(ErrorCode::UNTERMINATED_STRING, INVALID_TOKEN, span);
                    return self.token_from(TokenKind::String(buf), start);
                }
                Some(ch) if ch == quote => {
                    self.advance();
                    return self.token_from(TokenKind::String(buf), start);
                }
                Some('\\') => {
                    if let Some(escaped) = self.scan_escape_sequence() {
                        buf.push(escaped);
                    }
                }
                Some(_) => {
                    if let Some(ch) = self.advance() {
                        buf.push(ch);
                    }
                }
            }
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Template literals
    // ─────────────────────────────────────────────────────────────

    /// Scan a template literal after its opening backtick.
    ///
    /// 1. No substitution → `Template`
    /// 2. With substitution → `TemplateStart`, then mode switch
    fn scan_template(&mut self, start: Mark) -> Token {
        match self.scan_template_text() {
            TemplateStop::Backtick(text) => self.token_from(TokenKind::Template(text), start),
            TemplateStop::Substitution(text, interp_start) => {
                self.enter_substitution(interp_start);
                self.token_from(TokenKind::TemplateStart(text), start)
            }
            TemplateStop::Eof(text) => self.token_from(TokenKind::Template(text), start),
        }
    }

    /// Continue scanning template text after a substitution ends.
    /// Called when we're in `Mode::Template`.
    fn scan_template_continuation(&mut self) -> Token {
        let start = self.mark();
        match self.scan_template_text() {
            TemplateStop::Backtick(text) => {
                self.pop_mode();
                self.token_from(TokenKind::TemplateEnd(text), start)
            }
            TemplateStop::Substitution(text, interp_start) => {
                // Replace Template mode with Interpolation
                self.pop_mode();
                self.enter_substitution(interp_start);
                self.token_from(TokenKind::TemplatePart(text), start)
            }
            TemplateStop::Eof(text) => {
                self.pop_mode();
                self.token_from(TokenKind::TemplateEnd(text), start)
            }
        }
    }

    fn enter_substitution(&mut self, interp_start: Mark) {
        self.push_mode(Mode::Interpolation { brace_depth: 0 });
        // Queue InterpolationStart so it appears after the text token
        let span = self.span_from(interp_start);
        self.pending
            .push(Token::new(TokenKind::InterpolationStart, span));
    }

    /// Read template text up to a closing backtick or `${`.
    fn scan_template_text(&mut self) -> TemplateStop {
        let mut buf = String::new();
        loop {
            match self.peek_char() {
                None => {
                    let span = self.span_from(self.mark());
                    self.emit_error(
                        ErrorCode::UNTERMINATED_TEMPLATE,
                        "Unterminated template literal",
                        span,
                    );
                    return TemplateStop::Eof(buf);
                }
                Some('`') => {
                    self.advance();
                    return TemplateStop::Backtick(buf);
                }
                Some('$') if self.peek_at(1) == Some(b'{') => {
                    let interp_start = self.mark();
                    self.advance(); // consume '$'
                    self.advance(); // consume '{'
                    return TemplateStop::Substitution(buf, interp_start);
                }
                Some('\\') => {
                    if let Some(escaped) = self.scan_escape_sequence() {
                        buf.push(escaped);
                    }
                }
                Some(_) => {
                    if let Some(ch) = self.advance() {
                        buf.push(ch);
                    }
                }
            }
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Escapes
    // ─────────────────────────────────────────────────────────────

    /// Scan an escape sequence starting at the `\`.
    /// Returns the unescaped character, or `None` for a line continuation
    /// or an invalid escape (error emitted).
    fn scan_escape_sequence(&mut self) -> Option<char> {
        let start = self.mark();
        self.advance(); // consume the '\'

        match self.advance() {
            Some('n') => Some('\n'),
            Some('t') => Some('\t'),
            Some('r') => Some('\r'),
            Some('b') => Some('\u{8}'),
            Some('f') => Some('\u{c}'),
            Some('v') => Some('\u{b}'),
            Some('0') if !matches!(self.peek(), Some(b'0'..=b'9')) => Some('\0'),
            Some('x') => self.scan_hex_escape(2, start),
            Some('u') => {
                if self.eat_byte(b'{') {
                    self.scan_braced_unicode_escape(start)
                } else {
                    self.scan_hex_escape(4, start)
                }
            }
            // Line continuation
            Some('\n') => None,
            Some('\r') => {
                self.eat_byte(b'\n');
                None
            }
            // `\'`, `\"`, `` \` ``, `\\`, `\$` and any other character
            // stand for themselves
            Some(ch) => Some(ch),
            None => {
                let span = self.span_from(start);
                self.emit_error(ErrorCode::INVALID_ESCAPE, INVALID_TOKEN, span);
                None
            }
        }
    }

    fn scan_hex_escape(&mut self, len: usize, start: Mark) -> Option<char> {
        let mut value = 0u32;
        for _ in 0..len {
            match self.peek_char().and_then(|c| c.to_digit(16)) {
                Some(d) => {
                    self.advance();
                    value = value * 16 + d;
                }
                None => {
                    let span = self.span_from(start);
                    self.emit_error(ErrorCode::INVALID_ESCAPE, INVALID_TOKEN, span);
                    return None;
                }
            }
        }
        Some(char::from_u32(value).unwrap_or('\u{fffd}'))
    }

    fn scan_braced_unicode_escape(&mut self, start: Mark) -> Option<char> {
        let mut value = 0u32;
        let mut digits = 0;
        while let Some(d) = self.peek_char().and_then(|c| c.to_digit(16)) {
            self.advance();
            value = value.saturating_mul(16).saturating_add(d);
            digits += 1;
        }
        if digits == 0 || !self.eat_byte(b'}') || value > 0x10_ffff {
            let span = self.span_from(start);
            self.emit_error(ErrorCode::INVALID_ESCAPE, INVALID_TOKEN, span);
            return None;
        }
        Some(char::from_u32(value).unwrap_or('\u{fffd}'))
    }
}

/// Where template text scanning stopped.
enum TemplateStop {
    Backtick(String),
    Substitution(String, Mark),
    Eof(String),
}

fn is_identifier_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_' || ch == '$' || (!ch.is_ascii() && ch.is_alphabetic())
}

fn is_identifier_part(ch: char) -> bool {
    is_identifier_start(ch) || ch.is_ascii_digit() || (!ch.is_ascii() && ch.is_alphanumeric())
}
