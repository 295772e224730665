//! The IR file: owns every member by name, plus the subset that are
//! imports, plus whatever top-level expressions weren't attached to a decl.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::ast::Position;
use crate::ir::function::FunctionRef;
use crate::ir::value::ValueRef;

pub type StructRef = Rc<RefCell<Struct>>;

#[derive(Debug, Clone)]
pub enum Member {
    Func(FunctionRef),
    Global(ValueRef),
    Struct(StructRef),
    Import(ExternalMember),
}

#[derive(Debug, Clone)]
pub struct ExternalMember {
    pub name: String,
    pub path: String,
    pub alias: Option<String>,
    pub pos: Position,
}

#[derive(Debug)]
pub struct Struct {
    pub name: String,
    pub methods: Vec<FunctionRef>,
    pub fields: Vec<ValueRef>,
    pub pos: Position,
}

#[derive(Debug, Default)]
pub struct File {
    pub name: Option<String>,
    pub members: FxHashMap<String, Member>,
    /// The subset of `members` that are imports, keyed by the name used to
    /// reference them (alias if present, else the declared name) — not a
    /// separate storage, a view a caller builds once at registration time.
    pub imported: FxHashMap<String, ExternalMember>,
    pub top_level_exprs: Vec<ValueRef>,
    pub built: bool,
}

impl File {
    /// `File.Func(name)`: cross-scope call-target lookup, used by the
    /// builder when a call's callee isn't a known local.
    pub fn func(&self, name: &str) -> Option<FunctionRef> {
        match self.members.get(name)? {
            Member::Func(f) => Some(f.clone()),
            _ => None,
        }
    }
}
