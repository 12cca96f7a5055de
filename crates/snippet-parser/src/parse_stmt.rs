//! Statement parsing.

use crate::parser::Parser;
use snippet_lexer::token::TokenKind;
use snippet_types::ast::*;
use snippet_types::ErrorCode;

impl<'src> Parser<'src> {
    /// Parse a single statement.
    pub(crate) fn parse_statement(&mut self) -> Option<Stmt> {
        if !self.enter_nesting() {
            return None;
        }
        let stmt = self.parse_statement_inner();
        self.exit_nesting();
        stmt
    }

    fn parse_statement_inner(&mut self) -> Option<Stmt> {
        let start = self.current_span();
        match self.peek_kind() {
            TokenKind::LBrace => {
                let block = self.parse_block()?;
                let span = block.span;
                Some(Stmt::new(StmtKind::Block(block), span))
            }
            TokenKind::Var | TokenKind::Let | TokenKind::Const => {
                let decl = self.parse_var_decl()?;
                self.consume_semicolon();
                let span = start.merge(self.previous_span());
                Some(Stmt::new(StmtKind::VarDecl(decl), span))
            }
            TokenKind::Function => {
                let func = self.parse_function(true)?;
                let span = func.span;
                Some(Stmt::new(StmtKind::FunctionDecl(func), span))
            }
            TokenKind::If => self.parse_if_stmt(),
            TokenKind::While => self.parse_while_stmt(),
            TokenKind::Do => self.parse_do_while_stmt(),
            TokenKind::For => self.parse_for_stmt(),
            TokenKind::Switch => self.parse_switch_stmt(),
            TokenKind::Return => self.parse_return_stmt(),
            TokenKind::Break | TokenKind::Continue => self.parse_jump_stmt(),
            TokenKind::Throw => self.parse_throw_stmt(),
            TokenKind::Try => self.parse_try_stmt(),
            TokenKind::Semicolon => {
                let span = self.advance().span;
                Some(Stmt::new(StmtKind::Empty, span))
            }
            TokenKind::Identifier(_) if self.look_ahead(1) == &TokenKind::Colon => {
                self.error_at_current(ErrorCode::UNSUPPORTED_SYNTAX, "Labeled statements are not supported");
                None
            }
            _ => {
                // Expression statement
                let expr = self.parse_expression()?;
                self.consume_semicolon();
                let span = start.merge(self.previous_span());
                Some(Stmt::new(StmtKind::Expr(expr), span))
            }
        }
    }

    /// Parse a block of statements: `{ stmts... }`
    pub(crate) fn parse_block(&mut self) -> Option<Block> {
        let start = self.current_span();
        self.expect(&TokenKind::LBrace)?;
        let stmts = self.parse_statement_list(|kind| matches!(kind, TokenKind::RBrace));
        self.expect(&TokenKind::RBrace)?;
        self.check_duplicate_declarations(&stmts);
        let span = start.merge(self.previous_span());
        Some(Block { stmts, span })
    }

    /// `var|let|const name [= init], ...` without the terminator.
    pub(crate) fn parse_var_decl(&mut self) -> Option<VarDecl> {
        let start = self.current_span();
        let kind = match self.advance().kind {
            TokenKind::Let => DeclKind::Let,
            TokenKind::Const => DeclKind::Const,
            _ => DeclKind::Var,
        };
        let mut declarators = Vec::new();
        loop {
            let name = self.expect_identifier()?;
            let init = if self.eat(&TokenKind::Eq) {
                Some(self.parse_assignment()?)
            } else {
                None
            };
            if init.is_none() && kind == DeclKind::Const {
                self.error_at_current(
                    ErrorCode::MISSING_INITIALIZER,
                    "Missing initializer in const declaration",
                );
                return None;
            }
            declarators.push(Declarator { name, init });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        let span = start.merge(self.previous_span());
        Some(VarDecl {
            kind,
            declarators,
            span,
        })
    }

    /// `if (cond) stmt [else stmt]`
    fn parse_if_stmt(&mut self) -> Option<Stmt> {
        let start = self.advance().span; // eat `if`
        let condition = self.parse_paren_condition()?;
        let consequent = Box::new(self.parse_statement()?);
        let alternate = if self.eat(&TokenKind::Else) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        let span = start.merge(self.previous_span());
        Some(Stmt::new(
            StmtKind::If {
                condition,
                consequent,
                alternate,
            },
            span,
        ))
    }

    /// `( expr )` after `if`, `while` and `switch`.
    fn parse_paren_condition(&mut self) -> Option<Expr> {
        self.expect(&TokenKind::LParen)?;
        let expr = self.allow_in(|p| p.parse_expression())?;
        self.expect(&TokenKind::RParen)?;
        Some(expr)
    }

    /// Parse a loop body with `break`/`continue` enabled.
    fn parse_loop_body(&mut self) -> Option<Stmt> {
        self.loop_depth += 1;
        let body = self.parse_statement();
        self.loop_depth -= 1;
        body
    }

    /// `while (cond) stmt`
    fn parse_while_stmt(&mut self) -> Option<Stmt> {
        let start = self.advance().span; // eat `while`
        let condition = self.parse_paren_condition()?;
        let body = Box::new(self.parse_loop_body()?);
        let span = start.merge(self.previous_span());
        Some(Stmt::new(StmtKind::While { condition, body }, span))
    }

    /// `do stmt while (cond)`
    fn parse_do_while_stmt(&mut self) -> Option<Stmt> {
        let start = self.advance().span; // eat `do`
        let body = Box::new(self.parse_loop_body()?);
        self.expect(&TokenKind::While)?;
        let condition = self.parse_paren_condition()?;
        // A semicolon after `do ... while (x)` is always optional
        self.eat(&TokenKind::Semicolon);
        let span = start.merge(self.previous_span());
        Some(Stmt::new(StmtKind::DoWhile { body, condition }, span))
    }

    /// `for (init; test; update) stmt`, `for (x of xs) stmt`, `for (k in o) stmt`
    fn parse_for_stmt(&mut self) -> Option<Stmt> {
        let start = self.advance().span; // eat `for`
        self.expect(&TokenKind::LParen)?;

        if let Some(foreach) = self.try_parse_for_each_head()? {
            let (kind, decl, binding, subject) = foreach;
            let body = self.parse_loop_body()?;
            let span = start.merge(self.previous_span());
            return Some(Stmt::new(
                StmtKind::ForEach(Box::new(ForEachStmt {
                    kind,
                    decl,
                    binding,
                    subject,
                    body,
                })),
                span,
            ));
        }

        let init = match self.peek_kind() {
            TokenKind::Semicolon => None,
            TokenKind::Var | TokenKind::Let | TokenKind::Const => {
                let saved = std::mem::replace(&mut self.no_in, true);
                let decl = self.parse_var_decl();
                self.no_in = saved;
                Some(ForInit::VarDecl(decl?))
            }
            _ => {
                let saved = std::mem::replace(&mut self.no_in, true);
                let expr = self.parse_expression();
                self.no_in = saved;
                Some(ForInit::Expr(expr?))
            }
        };
        self.expect(&TokenKind::Semicolon)?;
        let test = if self.check_exact(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.allow_in(|p| p.parse_expression())?)
        };
        self.expect(&TokenKind::Semicolon)?;
        let update = if self.check_exact(&TokenKind::RParen) {
            None
        } else {
            Some(self.allow_in(|p| p.parse_expression())?)
        };
        self.expect(&TokenKind::RParen)?;
        let body = Box::new(self.parse_loop_body()?);
        let span = start.merge(self.previous_span());
        Some(Stmt::new(
            StmtKind::For {
                init,
                test,
                update,
                body,
            },
            span,
        ))
    }

    /// Recognise `[decl] name of|in subject )` after `for (`.
    ///
    /// Returns `Some(None)` when the head is a classic three-clause loop.
    #[allow(clippy::type_complexity)]
    fn try_parse_for_each_head(
        &mut self,
    ) -> Option<Option<(ForEachKind, Option<DeclKind>, Ident, Expr)>> {
        let decl = match self.peek_kind() {
            TokenKind::Var => Some(DeclKind::Var),
            TokenKind::Let => Some(DeclKind::Let),
            TokenKind::Const => Some(DeclKind::Const),
            _ => None,
        };
        let name_offset = usize::from(decl.is_some());
        if !matches!(self.look_ahead(name_offset), TokenKind::Identifier(_)) {
            return Some(None);
        }
        let kind = if self.at_contextual(name_offset + 1, "of") {
            ForEachKind::Of
        } else if self.look_ahead(name_offset + 1) == &TokenKind::In {
            ForEachKind::In
        } else {
            return Some(None);
        };

        if decl.is_some() {
            self.advance(); // eat declaration keyword
        }
        let binding = self.expect_identifier()?;
        self.advance(); // eat `of` / `in`
        let subject = match kind {
            ForEachKind::Of => self.allow_in(|p| p.parse_assignment())?,
            ForEachKind::In => self.allow_in(|p| p.parse_expression())?,
        };
        self.expect(&TokenKind::RParen)?;
        Some(Some((kind, decl, binding, subject)))
    }

    /// `switch (disc) { case v: ... default: ... }`
    fn parse_switch_stmt(&mut self) -> Option<Stmt> {
        let start = self.advance().span; // eat `switch`
        let discriminant = self.parse_paren_condition()?;
        self.expect(&TokenKind::LBrace)?;

        self.switch_depth += 1;
        let cases = self.parse_switch_cases();
        self.switch_depth -= 1;
        let cases = cases?;

        self.expect(&TokenKind::RBrace)?;
        let all: Vec<Stmt> = cases.iter().flat_map(|c| c.body.iter().cloned()).collect();
        self.check_duplicate_declarations(&all);
        let span = start.merge(self.previous_span());
        Some(Stmt::new(
            StmtKind::Switch {
                discriminant,
                cases,
            },
            span,
        ))
    }

    fn parse_switch_cases(&mut self) -> Option<Vec<SwitchCase>> {
        let mut cases = Vec::new();
        let mut seen_default = false;
        while !self.check_exact(&TokenKind::RBrace) && !self.at_end() {
            let case_start = self.current_span();
            let test = match self.peek_kind() {
                TokenKind::Case => {
                    self.advance();
                    Some(self.allow_in(|p| p.parse_expression())?)
                }
                TokenKind::Default => {
                    if seen_default {
                        self.error_at_current(
                            ErrorCode::UNEXPECTED_TOKEN,
                            "More than one default clause in switch statement",
                        );
                        return None;
                    }
                    seen_default = true;
                    self.advance();
                    None
                }
                _ => {
                    self.error_unexpected();
                    return None;
                }
            };
            self.expect(&TokenKind::Colon)?;
            let body = self.parse_statement_list(|kind| {
                matches!(kind, TokenKind::Case | TokenKind::Default | TokenKind::RBrace)
            });
            let span = case_start.merge(self.previous_span());
            cases.push(SwitchCase { test, body, span });
        }
        Some(cases)
    }

    /// `return [expr]`
    fn parse_return_stmt(&mut self) -> Option<Stmt> {
        let start = self.current_span();
        if self.function_depth == 0 && !self.options.allow_top_level_return {
            self.error_at_current(ErrorCode::ILLEGAL_RETURN, "Illegal return statement");
            return None;
        }
        self.advance(); // eat `return`
        let value = if self.at_statement_end() {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.consume_semicolon();
        let span = start.merge(self.previous_span());
        Some(Stmt::new(StmtKind::Return(value), span))
    }

    /// `break` / `continue`
    fn parse_jump_stmt(&mut self) -> Option<Stmt> {
        let token = self.advance();
        let kind = match token.kind {
            TokenKind::Break => {
                if self.loop_depth == 0 && self.switch_depth == 0 {
                    self.error_at(ErrorCode::ILLEGAL_BREAK, "Illegal break statement", token.span);
                    return None;
                }
                StmtKind::Break
            }
            _ => {
                if self.loop_depth == 0 {
                    self.error_at(
                        ErrorCode::ILLEGAL_CONTINUE,
                        "Illegal continue statement: no surrounding iteration statement",
                        token.span,
                    );
                    return None;
                }
                StmtKind::Continue
            }
        };
        if matches!(self.peek_kind(), TokenKind::Identifier(_)) && !self.newline_before_current() {
            self.error_at_current(ErrorCode::UNSUPPORTED_SYNTAX, "Labeled statements are not supported");
            return None;
        }
        self.consume_semicolon();
        let span = token.span.merge(self.previous_span());
        Some(Stmt::new(kind, span))
    }

    /// `throw expr`
    fn parse_throw_stmt(&mut self) -> Option<Stmt> {
        let start = self.advance().span; // eat `throw`
        if self.newline_before_current() {
            self.error_at_current(ErrorCode::UNEXPECTED_TOKEN, "Illegal newline after throw");
            return None;
        }
        let value = self.parse_expression()?;
        self.consume_semicolon();
        let span = start.merge(self.previous_span());
        Some(Stmt::new(StmtKind::Throw(value), span))
    }

    /// `try { } catch (e) { } finally { }`
    fn parse_try_stmt(&mut self) -> Option<Stmt> {
        let start = self.advance().span; // eat `try`
        let block = self.parse_block()?;

        let handler = if self.eat(&TokenKind::Catch) {
            let param = if self.eat(&TokenKind::LParen) {
                let ident = self.expect_identifier()?;
                self.expect(&TokenKind::RParen)?;
                Some(ident)
            } else {
                None
            };
            let body = self.parse_block()?;
            Some(CatchClause { param, body })
        } else {
            None
        };

        let finalizer = if self.eat(&TokenKind::Finally) {
            Some(self.parse_block()?)
        } else {
            None
        };

        if handler.is_none() && finalizer.is_none() {
            self.error_at_current(ErrorCode::UNEXPECTED_TOKEN, "Missing catch or finally after try");
            return None;
        }

        let span = start.merge(self.previous_span());
        Some(Stmt::new(
            StmtKind::Try(Box::new(TryStmt {
                block,
                handler,
                finalizer,
            })),
            span,
        ))
    }

    /// Nothing more belongs to the current statement (`return;`, `return }`,
    /// `return` followed by a line break).
    fn at_statement_end(&self) -> bool {
        matches!(
            self.peek_kind(),
            TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof
        ) || self.newline_before_current()
    }
}
