//! Statement execution and declaration hoisting.

use snippet_types::ast::*;

use crate::env::{Assign, Lookup, Scope};
use crate::error::{EvalError, EvalResult};
use crate::interpreter::Interpreter;
use crate::value::Value;

/// How a statement completed.
#[derive(Debug)]
pub(crate) enum Flow {
    Normal,
    Return(Value),
    Break,
    Continue,
}

impl Interpreter<'_> {
    // ══════════════════════════════════════════════════════════════════════════
    // Hoisting
    // ══════════════════════════════════════════════════════════════════════════

    /// Hoist `var`s into `var_scope` and `let`/`const`/function
    /// declarations into `scope`.
    pub(crate) fn hoist_declarations(&self, stmts: &[Stmt], scope: &Scope, var_scope: &Scope) {
        hoist_vars(stmts, var_scope);
        self.hoist_lexical(stmts, scope);
    }

    fn hoist_lexical(&self, stmts: &[Stmt], scope: &Scope) {
        for stmt in stmts {
            match &stmt.kind {
                StmtKind::VarDecl(decl) if decl.kind.is_lexical() => {
                    for declarator in &decl.declarators {
                        scope.define_uninitialized(
                            &declarator.name.name,
                            decl.kind != DeclKind::Const,
                        );
                    }
                }
                StmtKind::FunctionDecl(node) => {
                    let name = node.name.as_ref().map_or("", |n| n.name.as_str());
                    let function = self.realm().new_closure(node, scope, name);
                    scope.define(name, function, true);
                }
                _ => {}
            }
        }
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Statements
    // ══════════════════════════════════════════════════════════════════════════

    pub(crate) fn exec_statements(&mut self, stmts: &[Stmt], scope: &Scope) -> EvalResult<Flow> {
        for stmt in stmts {
            match self.exec_stmt(stmt, scope)? {
                Flow::Normal => {}
                flow => return Ok(flow),
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_stmt(&mut self, stmt: &Stmt, scope: &Scope) -> EvalResult<Flow> {
        self.current_span = stmt.span;
        match &stmt.kind {
            StmtKind::Expr(expr) => {
                let value = self.eval_expr(expr, scope)?;
                if self.call_depth == 0 {
                    self.completion = value;
                }
                Ok(Flow::Normal)
            }
            StmtKind::VarDecl(decl) => {
                self.exec_var_decl(decl, scope)?;
                Ok(Flow::Normal)
            }
            StmtKind::FunctionDecl(_) | StmtKind::Empty => Ok(Flow::Normal),
            StmtKind::Block(block) => self.exec_block(block, scope),
            StmtKind::If {
                condition,
                consequent,
                alternate,
            } => {
                if self.eval_expr(condition, scope)?.truthy() {
                    self.exec_stmt(consequent, scope)
                } else if let Some(alternate) = alternate {
                    self.exec_stmt(alternate, scope)
                } else {
                    Ok(Flow::Normal)
                }
            }
            StmtKind::While { condition, body } => self.exec_while(condition, body, scope),
            StmtKind::DoWhile { body, condition } => self.exec_do_while(body, condition, scope),
            StmtKind::For {
                init,
                test,
                update,
                body,
            } => self.exec_for(init.as_ref(), test.as_ref(), update.as_ref(), body, scope),
            StmtKind::ForEach(each) => self.exec_for_each(each, scope),
            StmtKind::Switch {
                discriminant,
                cases,
            } => self.exec_switch(discriminant, cases, scope),
            StmtKind::Return(value) => {
                let value = match value {
                    Some(expr) => self.eval_expr(expr, scope)?,
                    None => Value::Undefined,
                };
                Ok(Flow::Return(value))
            }
            StmtKind::Break => Ok(Flow::Break),
            StmtKind::Continue => Ok(Flow::Continue),
            StmtKind::Throw(expr) => {
                let value = self.eval_expr(expr, scope)?;
                Err(EvalError::Thrown(value))
            }
            StmtKind::Try(try_stmt) => self.exec_try(try_stmt, scope),
        }
    }

    fn exec_var_decl(&mut self, decl: &VarDecl, scope: &Scope) -> EvalResult<()> {
        for declarator in &decl.declarators {
            let name = &declarator.name.name;
            match (decl.kind, &declarator.init) {
                (DeclKind::Var, Some(init)) => {
                    let value = self.eval_named(init, name, scope)?;
                    self.assign_identifier(name, value, scope)?;
                }
                (DeclKind::Var, None) => {}
                (_, init) => {
                    let value = match init {
                        Some(init) => self.eval_named(init, name, scope)?,
                        None => Value::Undefined,
                    };
                    scope.initialize(name, value);
                }
            }
        }
        Ok(())
    }

    pub(crate) fn exec_block(&mut self, block: &Block, scope: &Scope) -> EvalResult<Flow> {
        let inner = Scope::block(scope);
        self.hoist_lexical(&block.stmts, &inner);
        self.exec_statements(&block.stmts, &inner)
    }

    // ── Loops ──

    fn exec_while(&mut self, condition: &Expr, body: &Stmt, scope: &Scope) -> EvalResult<Flow> {
        while self.eval_expr(condition, scope)?.truthy() {
            match self.exec_stmt(body, scope)? {
                Flow::Break => break,
                Flow::Return(value) => return Ok(Flow::Return(value)),
                Flow::Normal | Flow::Continue => {}
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_do_while(&mut self, body: &Stmt, condition: &Expr, scope: &Scope) -> EvalResult<Flow> {
        loop {
            match self.exec_stmt(body, scope)? {
                Flow::Break => break,
                Flow::Return(value) => return Ok(Flow::Return(value)),
                Flow::Normal | Flow::Continue => {}
            }
            if !self.eval_expr(condition, scope)?.truthy() {
                break;
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_for(
        &mut self,
        init: Option<&ForInit>,
        test: Option<&Expr>,
        update: Option<&Expr>,
        body: &Stmt,
        scope: &Scope,
    ) -> EvalResult<Flow> {
        let loop_scope = Scope::block(scope);
        // `let` bindings get a fresh copy per iteration so closures
        // capture the value of their own iteration
        let mut per_iteration = Vec::new();
        match init {
            Some(ForInit::VarDecl(decl)) => {
                if decl.kind.is_lexical() {
                    for declarator in &decl.declarators {
                        loop_scope.define_uninitialized(
                            &declarator.name.name,
                            decl.kind == DeclKind::Let,
                        );
                    }
                }
                if decl.kind == DeclKind::Let {
                    per_iteration = decl
                        .declarators
                        .iter()
                        .map(|d| d.name.name.clone())
                        .collect();
                }
                self.exec_var_decl(decl, &loop_scope)?;
            }
            Some(ForInit::Expr(expr)) => {
                self.eval_expr(expr, &loop_scope)?;
            }
            None => {}
        }

        let mut iteration = next_iteration(&loop_scope, scope, &per_iteration);
        loop {
            if let Some(test) = test {
                if !self.eval_expr(test, &iteration)?.truthy() {
                    break;
                }
            }
            match self.exec_stmt(body, &iteration)? {
                Flow::Break => break,
                Flow::Return(value) => return Ok(Flow::Return(value)),
                Flow::Normal | Flow::Continue => {}
            }
            iteration = next_iteration(&iteration, scope, &per_iteration);
            if let Some(update) = update {
                self.eval_expr(update, &iteration)?;
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_for_each(&mut self, each: &ForEachStmt, scope: &Scope) -> EvalResult<Flow> {
        let subject = self.eval_expr(&each.subject, scope)?;
        let items = match each.kind {
            ForEachKind::Of => self.iterate(&subject)?,
            ForEachKind::In => self
                .enumerable_keys(&subject)
                .into_iter()
                .map(Value::String)
                .collect(),
        };
        let name = &each.binding.name;
        for item in items {
            let iteration = Scope::block(scope);
            match each.decl {
                Some(kind) if kind.is_lexical() => {
                    iteration.define(name, item, kind == DeclKind::Let)
                }
                _ => self.assign_identifier(name, item, &iteration)?,
            }
            match self.exec_stmt(&each.body, &iteration)? {
                Flow::Break => break,
                Flow::Return(value) => return Ok(Flow::Return(value)),
                Flow::Normal | Flow::Continue => {}
            }
        }
        Ok(Flow::Normal)
    }

    // ── Switch / Try ──

    fn exec_switch(
        &mut self,
        discriminant: &Expr,
        cases: &[SwitchCase],
        scope: &Scope,
    ) -> EvalResult<Flow> {
        let value = self.eval_expr(discriminant, scope)?;
        let inner = Scope::block(scope);
        for case in cases {
            self.hoist_lexical(&case.body, &inner);
        }

        let mut start = None;
        for (i, case) in cases.iter().enumerate() {
            if let Some(test) = &case.test {
                if value.strict_equals(&self.eval_expr(test, &inner)?) {
                    start = Some(i);
                    break;
                }
            }
        }
        let Some(start) = start.or_else(|| cases.iter().position(|c| c.test.is_none())) else {
            return Ok(Flow::Normal);
        };

        for case in &cases[start..] {
            match self.exec_statements(&case.body, &inner)? {
                Flow::Normal => {}
                Flow::Break => break,
                flow => return Ok(flow),
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_try(&mut self, try_stmt: &TryStmt, scope: &Scope) -> EvalResult<Flow> {
        let mut result = self.exec_block(&try_stmt.block, scope);

        if let Some(handler) = &try_stmt.handler {
            result = match result {
                Err(EvalError::Thrown(value)) => {
                    let catch_scope = Scope::block(scope);
                    if let Some(param) = &handler.param {
                        catch_scope.define(&param.name, value, true);
                    }
                    self.exec_block(&handler.body, &catch_scope)
                }
                other => other,
            };
        }

        if let Some(finalizer) = &try_stmt.finalizer {
            match self.exec_block(finalizer, scope)? {
                Flow::Normal => {}
                flow => return Ok(flow),
            }
        }
        result
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Bindings
    // ══════════════════════════════════════════════════════════════════════════

    pub(crate) fn lookup_identifier(&self, name: &str, scope: &Scope) -> EvalResult<Value> {
        match scope.get(name) {
            Lookup::Found(value) => Ok(value),
            Lookup::Uninitialized => Err(self.reference_error(format!(
                "Cannot access '{name}' before initialization"
            ))),
            Lookup::Missing => Err(self.reference_error(format!("{name} is not defined"))),
        }
    }

    /// Assign to a name. Undeclared names become globals.
    pub(crate) fn assign_identifier(
        &self,
        name: &str,
        value: Value,
        scope: &Scope,
    ) -> EvalResult<()> {
        match scope.set(name, value.clone()) {
            Assign::Done => Ok(()),
            Assign::Constant => Err(self.type_error("Assignment to constant variable.")),
            Assign::Uninitialized => Err(self.reference_error(format!(
                "Cannot access '{name}' before initialization"
            ))),
            Assign::Missing => {
                scope.root().define(name, value, true);
                Ok(())
            }
        }
    }
}

/// Recursively declare every `var` reachable without entering a nested
/// function.
fn hoist_vars(stmts: &[Stmt], var_scope: &Scope) {
    for stmt in stmts {
        hoist_vars_in(stmt, var_scope);
    }
}

fn hoist_vars_in(stmt: &Stmt, var_scope: &Scope) {
    match &stmt.kind {
        StmtKind::VarDecl(decl) => declare_vars(decl, var_scope),
        StmtKind::Block(block) => hoist_vars(&block.stmts, var_scope),
        StmtKind::If {
            consequent,
            alternate,
            ..
        } => {
            hoist_vars_in(consequent, var_scope);
            if let Some(alternate) = alternate {
                hoist_vars_in(alternate, var_scope);
            }
        }
        StmtKind::While { body, .. } | StmtKind::DoWhile { body, .. } => {
            hoist_vars_in(body, var_scope)
        }
        StmtKind::For { init, body, .. } => {
            if let Some(ForInit::VarDecl(decl)) = init {
                declare_vars(decl, var_scope);
            }
            hoist_vars_in(body, var_scope);
        }
        StmtKind::ForEach(each) => {
            if each.decl == Some(DeclKind::Var) {
                var_scope.define_var(&each.binding.name);
            }
            hoist_vars_in(&each.body, var_scope);
        }
        StmtKind::Switch { cases, .. } => {
            for case in cases {
                hoist_vars(&case.body, var_scope);
            }
        }
        StmtKind::Try(try_stmt) => {
            hoist_vars(&try_stmt.block.stmts, var_scope);
            if let Some(handler) = &try_stmt.handler {
                hoist_vars(&handler.body.stmts, var_scope);
            }
            if let Some(finalizer) = &try_stmt.finalizer {
                hoist_vars(&finalizer.stmts, var_scope);
            }
        }
        _ => {}
    }
}

fn declare_vars(decl: &VarDecl, var_scope: &Scope) {
    if decl.kind == DeclKind::Var {
        for declarator in &decl.declarators {
            var_scope.define_var(&declarator.name.name);
        }
    }
}

/// The scope for the next loop iteration: a fresh copy of the `let`
/// bindings, or the same scope when there are none.
fn next_iteration(current: &Scope, outer: &Scope, names: &[String]) -> Scope {
    if names.is_empty() {
        return current.clone();
    }
    let next = Scope::block(outer);
    next.copy_bindings_from(current, names);
    next
}
