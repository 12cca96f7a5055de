//! Functions, arrow functions and object literals (which carry methods).

use std::rc::Rc;

use crate::parser::Parser;
use snippet_lexer::token::TokenKind;
use snippet_types::ast::*;
use snippet_types::{ErrorCode, Span};

impl<'src> Parser<'src> {
    // ══════════════════════════════════════════════════════════════════════════
    // Function Context
    // ══════════════════════════════════════════════════════════════════════════

    /// Run `f` as the body of a new function: `return` becomes legal and
    /// enclosing loops/switches no longer accept `break`/`continue`.
    fn in_function_context<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved_loop = std::mem::take(&mut self.loop_depth);
        let saved_switch = std::mem::take(&mut self.switch_depth);
        let saved_no_in = std::mem::replace(&mut self.no_in, false);
        self.function_depth += 1;
        let result = f(self);
        self.function_depth -= 1;
        self.loop_depth = saved_loop;
        self.switch_depth = saved_switch;
        self.no_in = saved_no_in;
        result
    }

    /// Build the node, recovering the function's source text from its span.
    fn function_node(
        &self,
        name: Option<Ident>,
        params: Vec<Param>,
        body: FunctionBody,
        is_arrow: bool,
        span: Span,
    ) -> Rc<FunctionNode> {
        Rc::new(FunctionNode {
            name,
            params,
            body,
            is_arrow,
            source: self.source_file.slice(span).to_string(),
            span,
        })
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Functions
    // ══════════════════════════════════════════════════════════════════════════

    /// `function [name](params) { body }`
    ///
    /// Declarations require a name; expressions may omit it.
    pub(crate) fn parse_function(&mut self, is_declaration: bool) -> Option<Rc<FunctionNode>> {
        let start = self.advance().span; // consume `function`
        if self.check_exact(&TokenKind::Star) {
            self.error_at_current(ErrorCode::UNSUPPORTED_SYNTAX, "Generator functions are not supported");
            return None;
        }
        let name = if matches!(self.peek_kind(), TokenKind::Identifier(_)) {
            self.expect_identifier()
        } else if is_declaration {
            self.error_at_current(ErrorCode::UNEXPECTED_TOKEN, "Function statements require a function name");
            return None;
        } else {
            None
        };
        let params = self.parse_params()?;
        let body = self.in_function_context(|p| p.parse_block())?;
        let span = start.merge(self.previous_span());
        Some(self.function_node(name, params, FunctionBody::Block(body), false, span))
    }

    /// `( a, b = 1, ...rest )`
    fn parse_params(&mut self) -> Option<Vec<Param>> {
        self.expect(&TokenKind::LParen)?;
        let mut params = Vec::new();
        while !self.check_exact(&TokenKind::RParen) {
            let rest = self.eat(&TokenKind::DotDotDot);
            if matches!(self.peek_kind(), TokenKind::LBrace | TokenKind::LBracket) {
                self.error_at_current(
                    ErrorCode::UNSUPPORTED_SYNTAX,
                    "Destructuring parameters are not supported",
                );
                return None;
            }
            let name = self.expect_identifier()?;
            let default = if !rest && self.eat(&TokenKind::Eq) {
                Some(self.in_function_context(|p| p.parse_assignment())?)
            } else {
                None
            };
            params.push(Param {
                name,
                default,
                rest,
            });
            if rest && !self.check_exact(&TokenKind::RParen) {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    "Rest parameter must be last formal parameter",
                );
                return None;
            }
            if !self.check_exact(&TokenKind::RParen) {
                self.expect(&TokenKind::Comma)?;
            }
        }
        self.expect(&TokenKind::RParen)?;
        Some(params)
    }

    /// `x => body` or `(params) => body`
    pub(crate) fn parse_arrow_function(&mut self) -> Option<Expr> {
        let start = self.current_span();
        let params = if matches!(self.peek_kind(), TokenKind::Identifier(_)) {
            let name = self.expect_identifier()?;
            vec![Param {
                name,
                default: None,
                rest: false,
            }]
        } else {
            self.parse_params()?
        };
        if self.newline_before_current() {
            self.error_unexpected();
            return None;
        }
        self.expect(&TokenKind::Arrow)?;

        let body = if self.check_exact(&TokenKind::LBrace) {
            FunctionBody::Block(self.in_function_context(|p| p.parse_block())?)
        } else {
            FunctionBody::Expr(Box::new(self.in_function_context(|p| p.parse_assignment())?))
        };
        let span = start.merge(self.previous_span());
        let func = self.function_node(None, params, body, true, span);
        Some(Expr::new(ExprKind::Function(func), span))
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Object Literals
    // ══════════════════════════════════════════════════════════════════════════

    /// `{ a: 1, b, [k]: v, m() {}, ...rest }`
    pub(crate) fn parse_object_literal(&mut self) -> Option<Expr> {
        let start = self.advance().span; // consume `{`
        let mut properties = Vec::new();
        while !self.check_exact(&TokenKind::RBrace) {
            if self.eat(&TokenKind::DotDotDot) {
                let value = self.allow_in(|p| p.parse_assignment())?;
                properties.push(Property::Spread(value));
            } else {
                properties.push(self.parse_property()?);
            }
            if !self.check_exact(&TokenKind::RBrace) {
                self.expect(&TokenKind::Comma)?;
            }
        }
        self.expect(&TokenKind::RBrace)?;
        let span = start.merge(self.previous_span());
        Some(Expr::new(ExprKind::Object(properties), span))
    }

    /// One `key: value`, shorthand `key`, or method `key() {}` entry.
    fn parse_property(&mut self) -> Option<Property> {
        let key_token = self.peek().clone();
        let key = match &key_token.kind {
            TokenKind::LBracket => {
                self.advance();
                let expr = self.allow_in(|p| p.parse_assignment())?;
                self.expect(&TokenKind::RBracket)?;
                PropertyKey::Computed(Box::new(expr))
            }
            TokenKind::String(s) => {
                self.advance();
                PropertyKey::Named(s.clone())
            }
            TokenKind::Number(n) => {
                self.advance();
                PropertyKey::Named(n.to_string())
            }
            kind => match kind.property_name() {
                Some(name) => {
                    self.advance();
                    PropertyKey::Named(name)
                }
                None => {
                    self.error_unexpected();
                    return None;
                }
            },
        };

        // Method shorthand: `name(params) { body }`
        if self.check_exact(&TokenKind::LParen) {
            let params = self.parse_params()?;
            let body = self.in_function_context(|p| p.parse_block())?;
            let span = key_token.span.merge(self.previous_span());
            let func = self.function_node(None, params, FunctionBody::Block(body), false, span);
            let value = Expr::new(ExprKind::Function(func), span);
            return Some(Property::KeyValue { key, value });
        }

        if self.eat(&TokenKind::Colon) {
            let value = self.allow_in(|p| p.parse_assignment())?;
            return Some(Property::KeyValue { key, value });
        }

        // Shorthand `{ name }`: only for plain identifiers
        match key_token.kind {
            TokenKind::Identifier(name) => Some(Property::KeyValue {
                key,
                value: Expr::new(ExprKind::Identifier(name), key_token.span),
            }),
            _ => {
                self.error_unexpected();
                None
            }
        }
    }
}
