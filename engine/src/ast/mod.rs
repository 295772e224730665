//! A language-neutral abstract syntax tree.
//!
//! Every source language's frontend lowers its own CST into these types;
//! nothing above this module ever matches on a CST node kind string again.
//! The three node families — [`Decl`], [`Stmt`], [`Expr`] — are closed sum
//! types on purpose (see [`BadNode`]): an unhandled CST shape always has
//! somewhere to go without a panic in release builds.
//!
//! Grounded on `models::unified_ast` (closed, `#[repr]`-tagged enums for a
//! cross-language node shape) and `services::ast_kotlin` (the parser-driver
//! idiom of building an owned tree once per file and discarding the CST).

pub mod printer;

use crate::cst::CstNode;
use serde::{Deserialize, Serialize};

/// A source coordinate, row normalized to 1-based (tree-sitter reports
/// 0-based rows; nothing past this module ever sees that convention).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub byte: u32,
    pub row: u32,
    pub column: u32,
}

impl From<crate::cst::Point> for Point {
    fn from(p: crate::cst::Point) -> Self {
        Point {
            byte: p.byte,
            row: p.row + 1,
            column: p.column,
        }
    }
}

/// Derives `Serialize`/`Deserialize` so a [`crate::rule::Finding`]'s
/// `SourceLocation` can round-trip through the crate's public JSON surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub start: Point,
    pub end: Point,
}

impl Position {
    pub fn of(node: CstNode<'_>) -> Self {
        Position {
            start: node.start_point().into(),
            end: node.end_point().into(),
        }
    }
}

/// Implemented by every node in all three families so that callers never
/// need to match on the node's variant just to recover a source span.
pub trait Pos {
    fn pos(&self) -> Position;
}

/// Stands in for any family. Carries the CST node kind it couldn't lower,
/// so a checker that trips over one at least gets told what it was.
#[derive(Debug, Clone)]
pub struct BadNode {
    pub message: String,
    pub pos: Position,
}

impl Pos for BadNode {
    fn pos(&self) -> Position {
        self.pos
    }
}

/// `"unsupported node type <kind>"` at `node`'s position.
pub fn new_unsupported_node(node: CstNode<'_>) -> BadNode {
    BadNode {
        message: format!("unsupported node type {}", node.kind()),
        pos: Position::of(node),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LitKind {
    Number,
    String,
    Bool,
    Null,
    Regex,
}

/// Function parameters and default-parameter slots are Exprs restricted to
/// [`Expr::Ident`] or [`Expr::Object`] tagged [`ObjectKind::DefaultParameter`]
/// — `Field`/`FieldList` exist only as this alias, never as their own node
/// family, matching their narrow use in signatures alone.
pub type Field = Expr;
pub type FieldList = Vec<Field>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Constructor,
    HashMap,
    Array,
    DefaultParameter,
}

#[derive(Debug, Clone)]
pub struct SwitchCase {
    /// `None` marks the `default:` arm.
    pub test: Option<Expr>,
    pub body: Vec<Stmt>,
}

// ---------------------------------------------------------------------
// Declarations
// ---------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum Decl {
    Func(FuncDecl),
    Import(ImportDecl),
    Value(ValueDecl),
    Class(ClassDecl),
    Bad(BadNode),
}

#[derive(Debug, Clone)]
pub struct FuncDecl {
    pub name: String,
    pub params: FieldList,
    pub body: Vec<Stmt>,
    pub pos: Position,
}

#[derive(Debug, Clone)]
pub struct ImportDecl {
    pub path: String,
    pub name: Option<String>,
    pub alias: Option<String>,
    pub pos: Position,
}

/// Parallel `names`/`values`; `values.len() < names.len()` means the
/// trailing names were declared with no initializer.
#[derive(Debug, Clone)]
pub struct ValueDecl {
    pub names: Vec<String>,
    pub values: Vec<Expr>,
    pub pos: Position,
}

#[derive(Debug, Clone)]
pub struct ClassDecl {
    pub name: String,
    pub methods: Vec<FuncDecl>,
    pub fields: Vec<ValueDecl>,
    pub pos: Position,
}

impl Pos for Decl {
    fn pos(&self) -> Position {
        match self {
            Decl::Func(d) => d.pos,
            Decl::Import(d) => d.pos,
            Decl::Value(d) => d.pos,
            Decl::Class(d) => d.pos,
            Decl::Bad(b) => b.pos,
        }
    }
}

// ---------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum Stmt {
    Block(Vec<Stmt>),
    Expr(Expr),
    /// Nested variable declarations lower here too (not to `Decl::Value`):
    /// the initializer-splitting rules (arrow → FuncDecl, `require` call →
    /// ImportDecl) only apply at file scope.
    Assign(AssignStmt),
    Return(ReturnStmt),
    If(IfStmt),
    While(WhileStmt),
    For(ForStmt),
    ForIn(ForInStmt),
    Try(TryStmt),
    Switch(SwitchStmt),
    Labeled(LabeledStmt),
    Break(Option<String>, Position),
    Continue(Option<String>, Position),
    Bad(BadNode),
}

#[derive(Debug, Clone)]
pub struct AssignStmt {
    pub lhs: Vec<Expr>,
    pub rhs: Vec<Expr>,
    pub pos: Position,
}

#[derive(Debug, Clone)]
pub struct ReturnStmt {
    pub results: Vec<Expr>,
    pub pos: Position,
}

#[derive(Debug, Clone)]
pub struct IfStmt {
    pub cond: Box<Expr>,
    pub then_branch: Box<Stmt>,
    pub else_branch: Option<Box<Stmt>>,
    pub pos: Position,
}

#[derive(Debug, Clone)]
pub struct WhileStmt {
    pub cond: Box<Expr>,
    pub body: Box<Stmt>,
    pub pos: Position,
}

#[derive(Debug, Clone)]
pub struct ForStmt {
    pub init: Option<Box<Stmt>>,
    pub cond: Option<Box<Expr>>,
    pub post: Option<Box<Stmt>>,
    pub body: Box<Stmt>,
    pub pos: Position,
}

#[derive(Debug, Clone)]
pub struct ForInStmt {
    pub left: Box<Expr>,
    pub right: Box<Expr>,
    pub body: Box<Stmt>,
    /// `for...of` vs `for...in`; both share one AST shape.
    pub is_of: bool,
    pub pos: Position,
}

#[derive(Debug, Clone)]
pub struct TryStmt {
    pub body: Vec<Stmt>,
    pub catch_param: Option<String>,
    pub catch_body: Option<Vec<Stmt>>,
    pub finally_body: Option<Vec<Stmt>>,
    pub pos: Position,
}

#[derive(Debug, Clone)]
pub struct SwitchStmt {
    pub discriminant: Box<Expr>,
    pub cases: Vec<SwitchCase>,
    pub pos: Position,
}

#[derive(Debug, Clone)]
pub struct LabeledStmt {
    pub label: String,
    pub body: Box<Stmt>,
    pub pos: Position,
}

impl Pos for Stmt {
    fn pos(&self) -> Position {
        match self {
            Stmt::Block(stmts) => stmts
                .first()
                .map(Stmt::pos)
                .unwrap_or_default(),
            Stmt::Expr(e) => e.pos(),
            Stmt::Assign(s) => s.pos,
            Stmt::Return(s) => s.pos,
            Stmt::If(s) => s.pos,
            Stmt::While(s) => s.pos,
            Stmt::For(s) => s.pos,
            Stmt::ForIn(s) => s.pos,
            Stmt::Try(s) => s.pos,
            Stmt::Switch(s) => s.pos,
            Stmt::Labeled(s) => s.pos,
            Stmt::Break(_, pos) | Stmt::Continue(_, pos) => *pos,
            Stmt::Bad(b) => b.pos,
        }
    }
}

// ---------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum Expr {
    Ident(IdentExpr),
    BasicLit(BasicLitExpr),
    Binary(BinaryExpr),
    Unary(UnaryExpr),
    Inc(IncExpr),
    Conditional(ConditionalExpr),
    Call(CallExpr),
    Member(MemberExpr),
    Object(ObjectExpr),
    KeyValue(KeyValueExpr),
    Template(TemplateExpr),
    FuncLit(FuncLit),
    Bad(BadNode),
}

#[derive(Debug, Clone)]
pub struct IdentExpr {
    pub name: String,
    pub pos: Position,
}

#[derive(Debug, Clone)]
pub struct BasicLitExpr {
    pub kind: LitKind,
    pub value: String,
    pub pos: Position,
}

#[derive(Debug, Clone)]
pub struct BinaryExpr {
    pub op: String,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
    pub pos: Position,
}

#[derive(Debug, Clone)]
pub struct UnaryExpr {
    pub op: String,
    pub operand: Box<Expr>,
    pub pos: Position,
}

/// `++x` / `x++` (update expressions). `prefix` distinguishes the two.
#[derive(Debug, Clone)]
pub struct IncExpr {
    pub op: String,
    pub operand: Box<Expr>,
    pub prefix: bool,
    pub pos: Position,
}

#[derive(Debug, Clone)]
pub struct ConditionalExpr {
    pub cond: Box<Expr>,
    pub then_expr: Box<Expr>,
    pub else_expr: Box<Expr>,
    pub pos: Position,
}

#[derive(Debug, Clone)]
pub struct CallExpr {
    pub callee: Box<Expr>,
    pub args: Vec<Expr>,
    pub pos: Position,
}

/// `a.b` or `a[b]`; `computed` distinguishes bracket access from dotted
/// access. The IR builder only special-cases the non-computed, identifier
/// form (call-target selectors); computed member reads lower generically.
#[derive(Debug, Clone)]
pub struct MemberExpr {
    pub object: Box<Expr>,
    pub property: Box<Expr>,
    pub computed: bool,
    pub pos: Position,
}

/// Object/array literals, `new` constructor calls, and default-parameter
/// values all share this one tagged shape (see `kind`).
#[derive(Debug, Clone)]
pub struct ObjectExpr {
    pub name: Option<String>,
    pub type_expr: Option<Box<Expr>>,
    pub elts: Vec<Expr>,
    pub kind: ObjectKind,
    pub pos: Position,
}

#[derive(Debug, Clone)]
pub struct KeyValueExpr {
    pub key: Box<Expr>,
    pub value: Box<Expr>,
    pub pos: Position,
}

#[derive(Debug, Clone)]
pub struct TemplateExpr {
    pub raw: String,
    pub subs: Vec<Expr>,
    pub pos: Position,
}

/// A function expression or arrow function in expression position.
#[derive(Debug, Clone)]
pub struct FuncLit {
    pub params: FieldList,
    pub body: Vec<Stmt>,
    pub pos: Position,
}

impl Pos for Expr {
    fn pos(&self) -> Position {
        match self {
            Expr::Ident(e) => e.pos,
            Expr::BasicLit(e) => e.pos,
            Expr::Binary(e) => e.pos,
            Expr::Unary(e) => e.pos,
            Expr::Inc(e) => e.pos,
            Expr::Conditional(e) => e.pos,
            Expr::Call(e) => e.pos,
            Expr::Member(e) => e.pos,
            Expr::Object(e) => e.pos,
            Expr::KeyValue(e) => e.pos,
            Expr::Template(e) => e.pos,
            Expr::FuncLit(e) => e.pos,
            Expr::Bad(b) => b.pos,
        }
    }
}

// ---------------------------------------------------------------------
// File
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct File {
    pub name: Option<String>,
    pub decls: Vec<Decl>,
    pub exprs: Vec<Expr>,
    pub bad_nodes: Vec<BadNode>,
}

impl File {
    pub fn named(name: impl Into<String>) -> Self {
        File {
            name: Some(name.into()),
            ..Default::default()
        }
    }
}
