//! Functions, their basic blocks, and the instructions those blocks hold.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use rustc_hash::FxHashMap;

use crate::ast::{self, Position};
use crate::ir::file::File;
use crate::ir::value::ValueRef;

pub type FunctionRef = Rc<RefCell<Function>>;

/// An instruction occupying a [`BasicBlock`]. `Value` covers both `Var` and
/// `Call` (the two IR entities that are both members of a block's
/// instruction list *and* satisfy the value contract); `Return` only acts,
/// it never defines a value.
#[derive(Debug)]
pub enum Instruction {
    Value(ValueRef),
    Return(Return),
}

#[derive(Debug)]
pub struct Return {
    pub results: Vec<ValueRef>,
    pub pos: Position,
}

#[derive(Debug, Default)]
pub struct BasicBlock {
    pub index: usize,
    pub comment: String,
    pub instructions: Vec<Instruction>,
}

/// Unbuilt state: the AST this function still needs to lower. Cleared (by
/// taking the `Vec`s) once `Build()` has run so the syntax isn't held onto
/// past the point the checker framework needs it.
#[derive(Debug, Default)]
pub(crate) struct PendingBody {
    pub params: ast::FieldList,
    pub body: Vec<ast::Stmt>,
}

#[derive(Debug)]
pub struct Function {
    pub name: String,
    pub params: Vec<ValueRef>,
    pub blocks: Vec<BasicBlock>,
    pub locals: FxHashMap<String, ValueRef>,
    pub anon_funcs: Vec<FunctionRef>,
    pub parent: Option<Weak<RefCell<Function>>>,
    pub file: Weak<RefCell<File>>,
    pub pos: Option<Position>,
    pub built: bool,
    /// A stub synthesized for an unresolved call target; never has a body
    /// to build and never appears in disassembly as anything but
    /// `(external)`.
    pub is_stub: bool,
    pub(crate) pending: Option<PendingBody>,
}

impl Function {
    pub fn new_stub(name: impl Into<String>, file: Weak<RefCell<File>>) -> FunctionRef {
        Rc::new(RefCell::new(Function {
            name: name.into(),
            params: Vec::new(),
            blocks: Vec::new(),
            locals: FxHashMap::default(),
            anon_funcs: Vec::new(),
            parent: None,
            file,
            pos: None,
            built: false,
            is_stub: true,
            pending: None,
        }))
    }

    pub fn new(
        name: impl Into<String>,
        params: ast::FieldList,
        body: Vec<ast::Stmt>,
        pos: Position,
        parent: Option<Weak<RefCell<Function>>>,
        file: Weak<RefCell<File>>,
    ) -> FunctionRef {
        Rc::new(RefCell::new(Function {
            name: name.into(),
            params: Vec::new(),
            blocks: Vec::new(),
            locals: FxHashMap::default(),
            anon_funcs: Vec::new(),
            parent,
            file,
            pos: Some(pos),
            built: false,
            is_stub: false,
            pending: Some(PendingBody { params, body }),
        }))
    }

    /// `fn.lookup(name)`: the current function's own locals only —
    /// cross-scope resolution goes through `File::func` instead.
    pub fn lookup(&self, name: &str) -> Option<ValueRef> {
        self.locals.get(name).cloned()
    }
}
