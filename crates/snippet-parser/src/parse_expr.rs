//! Expression parsing with full operator precedence.
//!
//! Precedence (lowest → highest):
//! 14. `,` (sequence)
//! 13. `=`, `+=`, `&&=`, ... (assignment, right-assoc), arrow functions
//! 12. `? :` (conditional)
//! 11. `??`
//! 10. `||`
//! 9. `&&`
//! 8. `==`, `!=`, `===`, `!==`
//! 7. `<`, `>`, `<=`, `>=`, `in`, `instanceof`
//! 6. `+`, `-`
//! 5. `*`, `/`, `%`
//! 4. `**` (right-assoc)
//! 3. unary `!`, `-`, `+`, `typeof`, `void`, `delete`, prefix `++`/`--`
//! 2. postfix `++`/`--`
//! 1. `.`, `?.`, `[]`, `()` and `new`

use snippet_lexer::token::TokenKind;
use snippet_types::ast::*;
use snippet_types::{ErrorCode, Span};

use crate::parser::Parser;

impl<'src> Parser<'src> {
    // ══════════════════════════════════════════════════════════════════════════
    // Entry Points
    // ══════════════════════════════════════════════════════════════════════════

    /// Run `f` with `in` accepted as a binary operator again.
    pub(crate) fn allow_in<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved = std::mem::replace(&mut self.no_in, false);
        let result = f(self);
        self.no_in = saved;
        result
    }

    /// `Expression = Assignment { "," Assignment }`
    pub(crate) fn parse_expression(&mut self) -> Option<Expr> {
        let first = self.parse_assignment()?;
        if !self.check_exact(&TokenKind::Comma) {
            return Some(first);
        }
        let mut exprs = vec![first];
        while self.eat(&TokenKind::Comma) {
            exprs.push(self.parse_assignment()?);
        }
        let span = exprs[0].span.merge(self.previous_span());
        Some(Expr::new(ExprKind::Sequence(exprs), span))
    }

    /// `Assignment = Arrow | Conditional [ AssignOp Assignment ]`
    pub(crate) fn parse_assignment(&mut self) -> Option<Expr> {
        if !self.enter_nesting() {
            return None;
        }
        let result = self.parse_assignment_inner();
        self.exit_nesting();
        result
    }

    fn parse_assignment_inner(&mut self) -> Option<Expr> {
        if self.at_arrow_function() {
            return self.parse_arrow_function();
        }

        let target = self.parse_conditional()?;
        let op = match self.peek_kind() {
            TokenKind::Eq => AssignOp::Assign,
            TokenKind::PlusEq => AssignOp::Compound(BinOp::Add),
            TokenKind::MinusEq => AssignOp::Compound(BinOp::Sub),
            TokenKind::StarEq => AssignOp::Compound(BinOp::Mul),
            TokenKind::SlashEq => AssignOp::Compound(BinOp::Div),
            TokenKind::PercentEq => AssignOp::Compound(BinOp::Mod),
            TokenKind::StarStarEq => AssignOp::Compound(BinOp::Exp),
            TokenKind::AmpAmpEq => AssignOp::Logical(LogicalOp::And),
            TokenKind::PipePipeEq => AssignOp::Logical(LogicalOp::Or),
            TokenKind::QuestionQuestionEq => AssignOp::Logical(LogicalOp::Nullish),
            _ => return Some(target),
        };

        if !is_assignment_target(&target) {
            self.error_at(
                ErrorCode::INVALID_ASSIGNMENT_TARGET,
                "Invalid left-hand side in assignment",
                target.span,
            );
            return None;
        }
        self.advance(); // consume operator
        let value = self.parse_assignment()?;
        let span = target.span.merge(value.span);
        Some(Expr::new(
            ExprKind::Assign {
                op,
                target: Box::new(target),
                value: Box::new(value),
            },
            span,
        ))
    }

    /// `x => ...` or `( ... ) => ...` starts at the current token.
    fn at_arrow_function(&self) -> bool {
        match self.peek_kind() {
            TokenKind::Identifier(_) => self.look_ahead(1) == &TokenKind::Arrow,
            TokenKind::LParen => {
                let mut depth = 0usize;
                let mut offset = 0;
                loop {
                    match self.look_ahead(offset) {
                        TokenKind::LParen
                        | TokenKind::LBracket
                        | TokenKind::LBrace
                        | TokenKind::InterpolationStart => depth += 1,
                        TokenKind::RParen
                        | TokenKind::RBracket
                        | TokenKind::RBrace
                        | TokenKind::InterpolationEnd => {
                            depth = depth.saturating_sub(1);
                            if depth == 0 {
                                return self.look_ahead(offset + 1) == &TokenKind::Arrow;
                            }
                        }
                        TokenKind::Eof => return false,
                        _ => {}
                    }
                    offset += 1;
                }
            }
            _ => false,
        }
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Precedence Chain
    // ══════════════════════════════════════════════════════════════════════════

    /// `Conditional = Nullish [ "?" Assignment ":" Assignment ]`
    fn parse_conditional(&mut self) -> Option<Expr> {
        let test = self.parse_nullish()?;
        if !self.eat(&TokenKind::Question) {
            return Some(test);
        }
        let consequent = self.allow_in(|p| p.parse_assignment())?;
        self.expect(&TokenKind::Colon)?;
        let alternate = self.parse_assignment()?;
        let span = test.span.merge(alternate.span);
        Some(Expr::new(
            ExprKind::Conditional {
                test: Box::new(test),
                consequent: Box::new(consequent),
                alternate: Box::new(alternate),
            },
            span,
        ))
    }

    /// `Nullish = Or { "??" Or }`
    fn parse_nullish(&mut self) -> Option<Expr> {
        let mut left = self.parse_or()?;
        while self.eat(&TokenKind::QuestionQuestion) {
            let right = self.parse_or()?;
            left = logical(left, LogicalOp::Nullish, right);
        }
        Some(left)
    }

    /// `Or = And { "||" And }`
    fn parse_or(&mut self) -> Option<Expr> {
        let mut left = self.parse_and()?;
        while self.eat(&TokenKind::PipePipe) {
            let right = self.parse_and()?;
            left = logical(left, LogicalOp::Or, right);
        }
        Some(left)
    }

    /// `And = Equality { "&&" Equality }`
    fn parse_and(&mut self) -> Option<Expr> {
        let mut left = self.parse_equality()?;
        while self.eat(&TokenKind::AmpAmp) {
            let right = self.parse_equality()?;
            left = logical(left, LogicalOp::And, right);
        }
        Some(left)
    }

    /// `Equality = Relational { EqOp Relational }`
    fn parse_equality(&mut self) -> Option<Expr> {
        let mut left = self.parse_relational()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::EqEq => BinOp::Eq,
                TokenKind::BangEq => BinOp::NotEq,
                TokenKind::EqEqEq => BinOp::StrictEq,
                TokenKind::BangEqEq => BinOp::StrictNotEq,
                _ => break,
            };
            self.advance();
            let right = self.parse_relational()?;
            left = binary(left, op, right);
        }
        Some(left)
    }

    /// `Relational = Additive { RelOp Additive }`
    fn parse_relational(&mut self) -> Option<Expr> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Less => BinOp::Less,
                TokenKind::Greater => BinOp::Greater,
                TokenKind::LessEq => BinOp::LessEq,
                TokenKind::GreaterEq => BinOp::GreaterEq,
                TokenKind::Instanceof => BinOp::InstanceOf,
                TokenKind::In if !self.no_in => BinOp::In,
                _ => break,
            };
            self.advance();
            let right = self.parse_additive()?;
            left = binary(left, op, right);
        }
        Some(left)
    }

    /// `Additive = Multiplicative { ("+" | "-") Multiplicative }`
    fn parse_additive(&mut self) -> Option<Expr> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = binary(left, op, right);
        }
        Some(left)
    }

    /// `Multiplicative = Exponent { ("*" | "/" | "%") Exponent }`
    fn parse_multiplicative(&mut self) -> Option<Expr> {
        let mut left = self.parse_exponent()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                TokenKind::Percent => BinOp::Mod,
                _ => break,
            };
            self.advance();
            let right = self.parse_exponent()?;
            left = binary(left, op, right);
        }
        Some(left)
    }

    /// `Exponent = Unary [ "**" Exponent ]`
    ///
    /// An unparenthesized unary operand of `**` is ambiguous and rejected.
    fn parse_exponent(&mut self) -> Option<Expr> {
        let starts_with_unary = matches!(
            self.peek_kind(),
            TokenKind::Minus
                | TokenKind::Plus
                | TokenKind::Bang
                | TokenKind::Typeof
                | TokenKind::Void
                | TokenKind::Delete
        );
        let base = self.parse_unary()?;
        if !self.check_exact(&TokenKind::StarStar) {
            return Some(base);
        }
        if starts_with_unary {
            self.error_at_current(
                ErrorCode::UNEXPECTED_TOKEN,
                "Unary operator used immediately before exponentiation expression. \
                 Parenthesis must be used to disambiguate operator precedence",
            );
            return None;
        }
        self.advance(); // consume `**`
        let exponent = self.parse_exponent()?;
        Some(binary(base, BinOp::Exp, exponent))
    }

    /// `Unary = UnaryOp Unary | ("++" | "--") Unary | Postfix`
    fn parse_unary(&mut self) -> Option<Expr> {
        let start = self.current_span();
        let op = match self.peek_kind() {
            TokenKind::Bang => UnaryOp::Not,
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::Typeof => UnaryOp::TypeOf,
            TokenKind::Void => UnaryOp::Void,
            TokenKind::Delete => UnaryOp::Delete,
            TokenKind::PlusPlus | TokenKind::MinusMinus => return self.parse_prefix_update(),
            _ => return self.parse_postfix(),
        };
        if !self.enter_nesting() {
            return None;
        }
        self.advance(); // consume operator
        let operand = self.parse_unary();
        self.exit_nesting();
        let operand = operand?;
        let span = start.merge(operand.span);
        Some(Expr::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            span,
        ))
    }

    /// `++x` / `--x`
    fn parse_prefix_update(&mut self) -> Option<Expr> {
        let token = self.advance();
        let op = if token.kind == TokenKind::PlusPlus {
            UpdateOp::Increment
        } else {
            UpdateOp::Decrement
        };
        if !self.enter_nesting() {
            return None;
        }
        let target = self.parse_unary();
        self.exit_nesting();
        let target = target?;
        if !is_assignment_target(&target) {
            self.error_at(
                ErrorCode::INVALID_ASSIGNMENT_TARGET,
                "Invalid left-hand side expression in prefix operation",
                target.span,
            );
            return None;
        }
        let span = token.span.merge(target.span);
        Some(Expr::new(
            ExprKind::Update {
                op,
                prefix: true,
                target: Box::new(target),
            },
            span,
        ))
    }

    /// `Postfix = CallMember [ "++" | "--" ]`: no line break before the operator.
    fn parse_postfix(&mut self) -> Option<Expr> {
        let expr = self.parse_call_member()?;
        let op = match self.peek_kind() {
            TokenKind::PlusPlus if !self.newline_before_current() => UpdateOp::Increment,
            TokenKind::MinusMinus if !self.newline_before_current() => UpdateOp::Decrement,
            _ => return Some(expr),
        };
        if !is_assignment_target(&expr) {
            self.error_at(
                ErrorCode::INVALID_ASSIGNMENT_TARGET,
                "Invalid left-hand side expression in postfix operation",
                expr.span,
            );
            return None;
        }
        self.advance(); // consume operator
        let span = expr.span.merge(self.previous_span());
        Some(Expr::new(
            ExprKind::Update {
                op,
                prefix: false,
                target: Box::new(expr),
            },
            span,
        ))
    }

    /// `CallMember = (New | Primary) { "." Name | "?." ... | "[" Expr "]" | Arguments }`
    fn parse_call_member(&mut self) -> Option<Expr> {
        let mut expr = if self.check_exact(&TokenKind::New) {
            self.parse_new()?
        } else {
            self.parse_primary()?
        };
        loop {
            expr = match self.peek_kind() {
                TokenKind::Dot => {
                    self.advance();
                    let name = self.expect_property_name()?;
                    member(expr, MemberProperty::Named(name), false, self.previous_span())
                }
                TokenKind::LBracket => {
                    let property = self.parse_computed_property()?;
                    member(expr, property, false, self.previous_span())
                }
                TokenKind::LParen => {
                    let args = self.parse_arguments()?;
                    call(expr, args, false, self.previous_span())
                }
                TokenKind::QuestionDot => {
                    self.advance();
                    match self.peek_kind() {
                        TokenKind::LParen => {
                            let args = self.parse_arguments()?;
                            call(expr, args, true, self.previous_span())
                        }
                        TokenKind::LBracket => {
                            let property = self.parse_computed_property()?;
                            member(expr, property, true, self.previous_span())
                        }
                        _ => {
                            let name = self.expect_property_name()?;
                            member(expr, MemberProperty::Named(name), true, self.previous_span())
                        }
                    }
                }
                TokenKind::Template(_) | TokenKind::TemplateStart(_) => {
                    self.error_at_current(
                        ErrorCode::UNSUPPORTED_SYNTAX,
                        "Tagged templates are not supported",
                    );
                    return None;
                }
                _ => break,
            };
        }
        Some(expr)
    }

    /// `new Callee [Arguments]`: the callee stops before the first call.
    fn parse_new(&mut self) -> Option<Expr> {
        let start = self.advance().span; // consume `new`
        if !self.enter_nesting() {
            return None;
        }
        let callee = if self.check_exact(&TokenKind::New) {
            self.parse_new()
        } else {
            self.parse_primary()
        };
        self.exit_nesting();
        let mut callee = callee?;
        loop {
            callee = match self.peek_kind() {
                TokenKind::Dot => {
                    self.advance();
                    let name = self.expect_property_name()?;
                    member(callee, MemberProperty::Named(name), false, self.previous_span())
                }
                TokenKind::LBracket => {
                    let property = self.parse_computed_property()?;
                    member(callee, property, false, self.previous_span())
                }
                _ => break,
            };
        }
        let args = if self.check_exact(&TokenKind::LParen) {
            self.parse_arguments()?
        } else {
            Vec::new()
        };
        let span = start.merge(self.previous_span());
        Some(Expr::new(
            ExprKind::New {
                callee: Box::new(callee),
                args,
            },
            span,
        ))
    }

    /// `[ expr ]`
    fn parse_computed_property(&mut self) -> Option<MemberProperty> {
        self.expect(&TokenKind::LBracket)?;
        let property = self.allow_in(|p| p.parse_expression())?;
        self.expect(&TokenKind::RBracket)?;
        Some(MemberProperty::Computed(Box::new(property)))
    }

    /// `( [...]expr, ... )`
    fn parse_arguments(&mut self) -> Option<Vec<Argument>> {
        self.expect(&TokenKind::LParen)?;
        let mut args = Vec::new();
        while !self.check_exact(&TokenKind::RParen) {
            let arg = if self.eat(&TokenKind::DotDotDot) {
                Argument::Spread(self.allow_in(|p| p.parse_assignment())?)
            } else {
                Argument::Expr(self.allow_in(|p| p.parse_assignment())?)
            };
            args.push(arg);
            if !self.check_exact(&TokenKind::RParen) {
                self.expect(&TokenKind::Comma)?;
            }
        }
        self.expect(&TokenKind::RParen)?;
        Some(args)
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Primary Expressions
    // ══════════════════════════════════════════════════════════════════════════

    /// Parse a primary expression.
    fn parse_primary(&mut self) -> Option<Expr> {
        let start = self.current_span();
        match self.peek_kind().clone() {
            // ── Literals ────────────────────────────────────────────────
            TokenKind::Number(n) => {
                self.advance();
                Some(Expr::new(ExprKind::Number(n), start))
            }
            TokenKind::BigInt(digits) => {
                self.advance();
                Some(Expr::new(ExprKind::BigInt(digits), start))
            }
            TokenKind::String(s) => {
                self.advance();
                Some(Expr::new(ExprKind::String(s), start))
            }
            TokenKind::Template(s) => {
                self.advance();
                Some(Expr::new(
                    ExprKind::Template(vec![TemplatePart::Literal(s)]),
                    start,
                ))
            }
            TokenKind::TemplateStart(head) => self.parse_template(head, start),
            TokenKind::True => {
                self.advance();
                Some(Expr::new(ExprKind::Bool(true), start))
            }
            TokenKind::False => {
                self.advance();
                Some(Expr::new(ExprKind::Bool(false), start))
            }
            TokenKind::Null => {
                self.advance();
                Some(Expr::new(ExprKind::Null, start))
            }

            // ── Names ───────────────────────────────────────────────────
            TokenKind::This => {
                self.advance();
                Some(Expr::new(ExprKind::This, start))
            }
            TokenKind::Identifier(name) => {
                self.advance();
                Some(Expr::new(ExprKind::Identifier(name), start))
            }

            // ── Grouping ────────────────────────────────────────────────
            TokenKind::LParen => {
                self.advance();
                if self.check_exact(&TokenKind::RParen) {
                    self.error_unexpected();
                    return None;
                }
                let inner = self.allow_in(|p| p.parse_expression())?;
                self.expect(&TokenKind::RParen)?;
                Some(inner)
            }

            // ── Collections & functions ─────────────────────────────────
            TokenKind::LBracket => self.parse_array_literal(),
            TokenKind::LBrace => self.parse_object_literal(),
            TokenKind::Function => {
                let func = self.parse_function(false)?;
                let span = func.span;
                Some(Expr::new(ExprKind::Function(func), span))
            }

            TokenKind::Slash | TokenKind::SlashEq => {
                self.error_at_current(
                    ErrorCode::UNSUPPORTED_SYNTAX,
                    "Regular expression literals are not supported",
                );
                None
            }
            _ => {
                self.error_unexpected();
                None
            }
        }
    }

    /// `` `head${expr}part${expr}tail` ``
    fn parse_template(&mut self, head: String, start: Span) -> Option<Expr> {
        self.advance(); // consume TemplateStart
        let mut parts = Vec::new();
        if !head.is_empty() {
            parts.push(TemplatePart::Literal(head));
        }
        loop {
            self.expect(&TokenKind::InterpolationStart)?;
            let expr = self.allow_in(|p| p.parse_expression())?;
            parts.push(TemplatePart::Expr(expr));
            self.expect(&TokenKind::InterpolationEnd)?;
            match self.peek_kind().clone() {
                TokenKind::TemplatePart(text) => {
                    self.advance();
                    if !text.is_empty() {
                        parts.push(TemplatePart::Literal(text));
                    }
                }
                TokenKind::TemplateEnd(text) => {
                    self.advance();
                    if !text.is_empty() {
                        parts.push(TemplatePart::Literal(text));
                    }
                    break;
                }
                _ => {
                    self.error_unexpected();
                    return None;
                }
            }
        }
        let span = start.merge(self.previous_span());
        Some(Expr::new(ExprKind::Template(parts), span))
    }

    /// `[a, , ...b]`
    fn parse_array_literal(&mut self) -> Option<Expr> {
        let start = self.advance().span; // consume `[`
        let mut elements = Vec::new();
        while !self.check_exact(&TokenKind::RBracket) {
            if self.eat(&TokenKind::Comma) {
                elements.push(ArrayElement::Hole);
                continue;
            }
            let element = if self.eat(&TokenKind::DotDotDot) {
                ArrayElement::Spread(self.allow_in(|p| p.parse_assignment())?)
            } else {
                ArrayElement::Expr(self.allow_in(|p| p.parse_assignment())?)
            };
            elements.push(element);
            if !self.check_exact(&TokenKind::RBracket) {
                self.expect(&TokenKind::Comma)?;
            }
        }
        self.expect(&TokenKind::RBracket)?;
        let span = start.merge(self.previous_span());
        Some(Expr::new(ExprKind::Array(elements), span))
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Node builders
// ══════════════════════════════════════════════════════════════════════════════

/// Only plain names and non-optional member expressions can be assigned to.
pub(crate) fn is_assignment_target(expr: &Expr) -> bool {
    matches!(
        expr.kind,
        ExprKind::Identifier(_) | ExprKind::Member { optional: false, .. }
    )
}

fn binary(left: Expr, op: BinOp, right: Expr) -> Expr {
    let span = left.span.merge(right.span);
    Expr::new(
        ExprKind::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        },
        span,
    )
}

fn logical(left: Expr, op: LogicalOp, right: Expr) -> Expr {
    let span = left.span.merge(right.span);
    Expr::new(
        ExprKind::Logical {
            left: Box::new(left),
            op,
            right: Box::new(right),
        },
        span,
    )
}

fn member(object: Expr, property: MemberProperty, optional: bool, end: Span) -> Expr {
    let span = object.span.merge(end);
    Expr::new(
        ExprKind::Member {
            object: Box::new(object),
            property,
            optional,
        },
        span,
    )
}

fn call(callee: Expr, args: Vec<Argument>, optional: bool, end: Span) -> Expr {
    let span = callee.span.merge(end);
    Expr::new(
        ExprKind::Call {
            callee: Box::new(callee),
            args,
            optional,
        },
        span,
    )
}
