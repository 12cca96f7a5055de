//! AST node types for the snippet language (a JavaScript subset).
//!
//! Every node carries a [`Span`] for error reporting and stack traces.
//! Function nodes are reference-counted so closures can share them with
//! the tree without cloning bodies.

use crate::Span;
use std::rc::Rc;

// ══════════════════════════════════════════════════════════════════════════════
// Top Level
// ══════════════════════════════════════════════════════════════════════════════

/// A complete snippet: a list of statements.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// A spanned identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Statements
// ══════════════════════════════════════════════════════════════════════════════

/// A statement node.
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// The kind of statement.
#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// `var|let|const a = 1, b;`
    VarDecl(VarDecl),
    /// `function name(params) { body }`
    FunctionDecl(Rc<FunctionNode>),
    /// A bare expression statement.
    Expr(Expr),
    /// `{ stmts... }`
    Block(Block),
    /// `if (cond) stmt [else stmt]`
    If {
        condition: Expr,
        consequent: Box<Stmt>,
        alternate: Option<Box<Stmt>>,
    },
    /// `while (cond) stmt`
    While { condition: Expr, body: Box<Stmt> },
    /// `do stmt while (cond)`
    DoWhile { body: Box<Stmt>, condition: Expr },
    /// `for (init; test; update) stmt`
    For {
        init: Option<ForInit>,
        test: Option<Expr>,
        update: Option<Expr>,
        body: Box<Stmt>,
    },
    /// `for (decl x of iterable) stmt` / `for (decl x in object) stmt`
    ForEach(Box<ForEachStmt>),
    /// `switch (disc) { case v: ... default: ... }`
    Switch {
        discriminant: Expr,
        cases: Vec<SwitchCase>,
    },
    /// `return [expr]`
    Return(Option<Expr>),
    /// `break`
    Break,
    /// `continue`
    Continue,
    /// `throw expr`
    Throw(Expr),
    /// `try { } catch (e) { } finally { }`
    Try(Box<TryStmt>),
    /// `;`
    Empty,
}

/// Declaration keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Var,
    Let,
    Const,
}

impl DeclKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeclKind::Var => "var",
            DeclKind::Let => "let",
            DeclKind::Const => "const",
        }
    }

    /// `let` and `const` are block scoped; `var` is function scoped.
    pub fn is_lexical(&self) -> bool {
        !matches!(self, DeclKind::Var)
    }
}

/// `var|let|const` followed by one or more declarators.
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub kind: DeclKind,
    pub declarators: Vec<Declarator>,
    pub span: Span,
}

/// `name [= init]`
#[derive(Debug, Clone, PartialEq)]
pub struct Declarator {
    pub name: Ident,
    pub init: Option<Expr>,
}

/// The first clause of a classic `for` loop.
#[derive(Debug, Clone, PartialEq)]
pub enum ForInit {
    VarDecl(VarDecl),
    Expr(Expr),
}

/// Which flavour of for-each loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForEachKind {
    /// `for (x of iterable)`: values
    Of,
    /// `for (k in object)`: keys
    In,
}

/// `for ([decl] binding of|in subject) body`
#[derive(Debug, Clone, PartialEq)]
pub struct ForEachStmt {
    pub kind: ForEachKind,
    /// `None` when the loop assigns to an existing binding.
    pub decl: Option<DeclKind>,
    pub binding: Ident,
    pub subject: Expr,
    pub body: Stmt,
}

/// `case test:` or `default:` followed by statements.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    /// `None` for `default`.
    pub test: Option<Expr>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// `try block [catch ([param]) block] [finally block]`
#[derive(Debug, Clone, PartialEq)]
pub struct TryStmt {
    pub block: Block,
    pub handler: Option<CatchClause>,
    pub finalizer: Option<Block>,
}

/// `catch (param) { body }`
#[derive(Debug, Clone, PartialEq)]
pub struct CatchClause {
    pub param: Option<Ident>,
    pub body: Block,
}

/// `{ stmts... }`
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

// ══════════════════════════════════════════════════════════════════════════════
// Functions
// ══════════════════════════════════════════════════════════════════════════════

/// A function declaration, expression, method or arrow.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionNode {
    pub name: Option<Ident>,
    pub params: Vec<Param>,
    pub body: FunctionBody,
    /// Arrow functions have no own `this` and cannot be constructed.
    pub is_arrow: bool,
    /// The function's original source text.
    pub source: String,
    pub span: Span,
}

/// A formal parameter: `name`, `name = default` or `...name`.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: Ident,
    pub default: Option<Expr>,
    pub rest: bool,
}

/// Arrow functions may have a bare expression body.
#[derive(Debug, Clone, PartialEq)]
pub enum FunctionBody {
    Block(Block),
    Expr(Box<Expr>),
}

// ══════════════════════════════════════════════════════════════════════════════
// Expressions
// ══════════════════════════════════════════════════════════════════════════════

/// An expression node. Uses `Box` for recursive variants.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// The kind of expression.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    // ── Literals ──
    /// `42`, `3.14`, `0xff`
    Number(f64),
    /// `123n`, `0xffn`: literal text without the `n` suffix (may keep a
    /// `0x`/`0o`/`0b` prefix)
    BigInt(String),
    /// `'hello'`, `"hello"`
    String(String),
    /// `` `a ${b} c` ``
    Template(Vec<TemplatePart>),
    /// `true` / `false`
    Bool(bool),
    /// `null`
    Null,
    /// `[a, ...b]`
    Array(Vec<ArrayElement>),
    /// `{ a: 1, b, [k]: v, m() {}, ...rest }`
    Object(Vec<Property>),
    /// `function () {}`, `() => x`
    Function(Rc<FunctionNode>),

    // ── Names ──
    /// `my_var`
    Identifier(String),
    /// `this`
    This,

    // ── Access & Calls ──
    /// `obj.name`, `obj[expr]`, `obj?.name`
    Member {
        object: Box<Expr>,
        property: MemberProperty,
        optional: bool,
    },
    /// `callee(args...)`, `callee?.(args...)`
    Call {
        callee: Box<Expr>,
        args: Vec<Argument>,
        optional: bool,
    },
    /// `new Callee(args...)`
    New {
        callee: Box<Expr>,
        args: Vec<Argument>,
    },

    // ── Operators ──
    /// `-x`, `!x`, `typeof x`, ...
    Unary { op: UnaryOp, operand: Box<Expr> },
    /// `++x`, `x--`
    Update {
        op: UpdateOp,
        prefix: bool,
        target: Box<Expr>,
    },
    /// `a + b`, `a === b`, `a in b`, ...
    Binary {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
    },
    /// `a && b`, `a || b`, `a ?? b`: short-circuiting
    Logical {
        left: Box<Expr>,
        op: LogicalOp,
        right: Box<Expr>,
    },
    /// `a = b`, `a += b`, `a ??= b`
    Assign {
        op: AssignOp,
        target: Box<Expr>,
        value: Box<Expr>,
    },
    /// `test ? a : b`
    Conditional {
        test: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Box<Expr>,
    },
    /// `a, b, c`
    Sequence(Vec<Expr>),
}

/// A part of a template literal.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplatePart {
    /// Literal text segment.
    Literal(String),
    /// An interpolated expression `${expr}`.
    Expr(Expr),
}

/// An element of an array literal.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayElement {
    Expr(Expr),
    Spread(Expr),
    /// `[1, , 3]`
    Hole,
}

/// A call argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    Expr(Expr),
    Spread(Expr),
}

/// An entry in an object literal.
#[derive(Debug, Clone, PartialEq)]
pub enum Property {
    /// `key: value`, `key`, `key() {}`
    KeyValue { key: PropertyKey, value: Expr },
    /// `...expr`
    Spread(Expr),
}

/// An object literal key.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKey {
    /// `name`, `'name'`, `42`
    Named(String),
    /// `[expr]`
    Computed(Box<Expr>),
}

/// The property part of a member expression.
#[derive(Debug, Clone, PartialEq)]
pub enum MemberProperty {
    /// `.name`
    Named(Ident),
    /// `[expr]`
    Computed(Box<Expr>),
}

// ── Operators ─────────────────────────────────────────────────────────────────

/// Binary (non short-circuiting) operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Equality
    Eq,
    NotEq,
    StrictEq,
    StrictNotEq,
    // Relational
    Less,
    Greater,
    LessEq,
    GreaterEq,
    In,
    InstanceOf,
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Exp,
}

impl BinOp {
    /// Returns the operator symbol for error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            BinOp::Eq => "==",
            BinOp::NotEq => "!=",
            BinOp::StrictEq => "===",
            BinOp::StrictNotEq => "!==",
            BinOp::Less => "<",
            BinOp::Greater => ">",
            BinOp::LessEq => "<=",
            BinOp::GreaterEq => ">=",
            BinOp::In => "in",
            BinOp::InstanceOf => "instanceof",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Exp => "**",
        }
    }
}

/// Short-circuiting operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
    Nullish,
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `-x`
    Neg,
    /// `+x`
    Plus,
    /// `!x`
    Not,
    /// `typeof x`
    TypeOf,
    /// `void x`
    Void,
    /// `delete x.y`
    Delete,
}

/// `++` / `--`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOp {
    Increment,
    Decrement,
}

/// Assignment operators. Compound forms carry the operator they apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    /// `=`
    Assign,
    /// `+=`, `-=`, `*=`, `/=`, `%=`, `**=`
    Compound(BinOp),
    /// `&&=`, `||=`, `??=`
    Logical(LogicalOp),
}
