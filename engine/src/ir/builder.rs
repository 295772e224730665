//! Two-phase IR construction: [`new_file`] registers every file-level
//! member so cross-function calls resolve regardless of declaration order,
//! then [`build_file`] lowers each function's body.
//!
//! Grounded on `services::unified_ast_engine`'s "collect symbols, then
//! lower" shape; the per-statement builder loop below mirrors
//! `ast_kotlin.rs`'s `visit_node` recursion but mutates through
//! `Rc<RefCell<_>>` instead of an arena index, per the ownership model this
//! crate picked for the Function↔File cycle.

use std::cell::Cell;
use std::rc::{Rc, Weak};

use crate::ast::{self, Expr, Pos, Position, Stmt};
use crate::config::{EngineConfig, UnsupportedNodePolicy};
use crate::error::Result;
use crate::ir::file::{ExternalMember, File, Member, Struct};
use crate::ir::function::{BasicBlock, Function, FunctionRef, Instruction, Return};
use crate::ir::value::{self, Call, Closure, Global, Template, Value, ValueRef, Var};

pub type FileRef = Rc<std::cell::RefCell<File>>;

/// `NewFile`: register every top-level member without building any bodies.
pub fn new_file(ast_file: ast::File) -> FileRef {
    let file = Rc::new(std::cell::RefCell::new(File {
        name: ast_file.name,
        ..Default::default()
    }));

    // Pass 1: functions, classes and imports first, so a global's
    // initializer (pass 2) can already resolve a call to any of them.
    for decl in &ast_file.decls {
        match decl {
            ast::Decl::Func(d) => register_func(&file, d.clone(), None),
            ast::Decl::Class(d) => register_class(&file, d.clone()),
            ast::Decl::Import(d) => register_import(&file, d.clone()),
            ast::Decl::Value(_) | ast::Decl::Bad(_) => {}
        }
    }
    // Pass 2: globals, whose initializers may call a function from pass 1.
    for decl in &ast_file.decls {
        if let ast::Decl::Value(d) = decl {
            register_global(&file, d.clone());
        }
    }

    for expr in ast_file.exprs {
        let ctx = Ctx::top_level(&file);
        let value = expr_value(&ctx, &expr);
        file.borrow_mut().top_level_exprs.push(value);
    }

    file
}

fn register_func(file: &FileRef, d: ast::FuncDecl, parent: Option<Weak<std::cell::RefCell<Function>>>) {
    let func = Function::new(
        d.name.clone(),
        d.params,
        d.body,
        d.pos,
        parent,
        Rc::downgrade(file),
    );
    let mut f = file.borrow_mut();
    if f.members.contains_key(&d.name) {
        panic!("duplicate file-level member {}", d.name);
    }
    f.members.insert(d.name, Member::Func(func));
}

fn register_class(file: &FileRef, d: ast::ClassDecl) {
    let mut methods = Vec::new();
    for m in d.methods {
        let func = Function::new(
            m.name.clone(),
            m.params,
            m.body,
            m.pos,
            None,
            Rc::downgrade(file),
        );
        methods.push(func);
    }
    let mut fields = Vec::new();
    for field in d.fields {
        for (i, name) in field.names.iter().enumerate() {
            let initializer = field
                .values
                .get(i)
                .map(|v| expr_value(&Ctx::top_level(file), v))
                .unwrap_or_else(|| value::new_const(String::new(), None));
            fields.push(Rc::new(std::cell::RefCell::new(Value::Global(Global {
                name: name.clone(),
                initializer,
                pos: Some(field.pos),
            }))));
        }
    }
    let strukt = Rc::new(std::cell::RefCell::new(Struct {
        name: d.name.clone(),
        methods,
        fields,
        pos: d.pos,
    }));
    let mut f = file.borrow_mut();
    if f.members.contains_key(&d.name) {
        panic!("duplicate file-level member {}", d.name);
    }
    f.members.insert(d.name, Member::Struct(strukt));
}

fn register_import(file: &FileRef, d: ast::ImportDecl) {
    let Some(declared_name) = d.name.clone() else {
        return;
    };
    let key = d.alias.clone().unwrap_or_else(|| declared_name.clone());
    let member = ExternalMember {
        name: declared_name,
        path: d.path,
        alias: d.alias,
        pos: d.pos,
    };
    let mut f = file.borrow_mut();
    f.imported.insert(key.clone(), member.clone());
    f.members.insert(key, Member::Import(member));
}

fn register_global(file: &FileRef, d: ast::ValueDecl) {
    for (i, name) in d.names.iter().enumerate() {
        let initializer = match d.values.get(i) {
            Some(v) => expr_value(&Ctx::top_level(file), v),
            None => value::new_const(String::new(), Some(d.pos)),
        };
        let global = Rc::new(std::cell::RefCell::new(Value::Global(Global {
            name: name.clone(),
            initializer,
            pos: Some(d.pos),
        })));
        file.borrow_mut()
            .members
            .insert(name.clone(), Member::Global(global));
    }
}

/// `file.Build()`: lower every function's body, including class methods and
/// anonymous closures created along the way.
pub fn build_file(file: &FileRef, config: &EngineConfig) -> Result<()> {
    let funcs: Vec<FunctionRef> = file
        .borrow()
        .members
        .values()
        .filter_map(|m| match m {
            Member::Func(f) => Some(f.clone()),
            _ => None,
        })
        .collect();
    for func in &funcs {
        build_function(func, file, config)?;
    }
    let structs: Vec<_> = file
        .borrow()
        .members
        .values()
        .filter_map(|m| match m {
            Member::Struct(s) => Some(s.clone()),
            _ => None,
        })
        .collect();
    for strukt in &structs {
        let methods = strukt.borrow().methods.clone();
        for method in &methods {
            build_function(method, file, config)?;
        }
    }
    file.borrow_mut().built = true;
    Ok(())
}

/// `fn.Build()`. Idempotent: a function that already built its entry block
/// is left untouched on a second call.
fn build_function(func: &FunctionRef, file: &FileRef, config: &EngineConfig) -> Result<()> {
    if func.borrow().built || func.borrow().is_stub {
        return Ok(());
    }
    let pending = func.borrow_mut().pending.take();
    let Some(pending) = pending else {
        func.borrow_mut().built = true;
        return Ok(());
    };

    let ctx = Ctx::of_function(func, file, config);
    let params: Vec<ValueRef> = pending
        .params
        .iter()
        .map(|field| build_parameter(&ctx, field))
        .collect();
    func.borrow_mut().params = params;

    new_block(&ctx, "entry");
    for stmt in &pending.body {
        lower_stmt(&ctx, stmt);
    }
    func.borrow_mut().built = true;
    Ok(())
}

fn build_parameter(ctx: &Ctx, field: &ast::Field) -> ValueRef {
    match field {
        Expr::Ident(ident) => Rc::new(std::cell::RefCell::new(Value::Parameter(value::Parameter {
            name: ident.name.clone(),
            default: None,
            pos: Some(ident.pos),
        }))),
        Expr::Object(obj) if obj.kind == ast::ObjectKind::DefaultParameter => {
            let default = obj.elts.first().map(|e| expr_value(ctx, e));
            Rc::new(std::cell::RefCell::new(Value::Parameter(value::Parameter {
                name: obj.name.clone().unwrap_or_default(),
                default,
                pos: Some(obj.pos),
            })))
        }
        other => Rc::new(std::cell::RefCell::new(Value::Parameter(value::Parameter {
            name: String::new(),
            default: None,
            pos: Some(other.pos()),
        }))),
    }
}

// ---------------------------------------------------------------------
// Builder context
// ---------------------------------------------------------------------

struct Ctx<'a> {
    func: Option<&'a FunctionRef>,
    file: &'a FileRef,
    config: EngineConfig,
    current_block: Cell<usize>,
}

impl<'a> Ctx<'a> {
    fn of_function(func: &'a FunctionRef, file: &'a FileRef, config: &EngineConfig) -> Self {
        Ctx {
            func: Some(func),
            file,
            config: config.clone(),
            current_block: Cell::new(0),
        }
    }

    fn top_level(file: &'a FileRef) -> Self {
        Ctx {
            func: None,
            file,
            config: EngineConfig::default(),
            current_block: Cell::new(0),
        }
    }
}

fn new_block(ctx: &Ctx, comment: &str) -> usize {
    let Some(func) = ctx.func else { return 0 };
    let mut f = func.borrow_mut();
    let index = f.blocks.len();
    f.blocks.push(BasicBlock {
        index,
        comment: comment.to_string(),
        instructions: Vec::new(),
    });
    drop(f);
    ctx.current_block.set(index);
    index
}

fn push_instruction(ctx: &Ctx, instr: Instruction) {
    let Some(func) = ctx.func else { return };
    let mut f = func.borrow_mut();
    let idx = ctx.current_block.get();
    if let Some(block) = f.blocks.get_mut(idx) {
        block.instructions.push(instr);
    }
}

fn add_named_local(ctx: &Ctx, name: &str, value: ValueRef) -> ValueRef {
    let var = Rc::new(std::cell::RefCell::new(Value::Var(Var {
        name: name.to_string(),
        value,
        pos: None,
    })));
    if let Some(func) = ctx.func {
        func.borrow_mut()
            .locals
            .insert(name.to_string(), var.clone());
    }
    push_instruction(ctx, Instruction::Value(var.clone()));
    var
}

fn add_local(ctx: &Ctx, value: ValueRef) -> ValueRef {
    let n = ctx.func.map(|f| f.borrow().locals.len()).unwrap_or(0);
    add_named_local(ctx, &format!("%t{n}"), value)
}

fn lookup(ctx: &Ctx, name: &str) -> Option<ValueRef> {
    ctx.func.and_then(|f| f.borrow().lookup(name))
}

fn unsupported_value(ctx: &Ctx, message: impl Into<String>, pos: Option<Position>) -> ValueRef {
    let message = message.into();
    match ctx.config.unsupported_node_policy {
        UnsupportedNodePolicy::Panic => panic!("unsupported node: {message} at {pos:?}"),
        UnsupportedNodePolicy::Drop => value::new_unsupported(message, pos),
    }
}

// ---------------------------------------------------------------------
// Statement lowering
// ---------------------------------------------------------------------

/// Control-flow bodies are flattened into the current block: this IR has
/// no branch/jump/phi entities (see the data model), so `If`/`While`/`For`/
/// etc. contribute their nested statements' instructions to the same block
/// rather than splitting into separate ones. This keeps every call site
/// reachable for the analyzer framework without modeling real edges.
fn lower_stmt(ctx: &Ctx, stmt: &Stmt) {
    match stmt {
        Stmt::Block(stmts) => {
            for s in stmts {
                lower_stmt(ctx, s);
            }
        }
        Stmt::Expr(e) => {
            lower_for_effect(ctx, e);
        }
        Stmt::Assign(a) => lower_assign(ctx, a),
        Stmt::Return(r) => lower_return(ctx, r),
        Stmt::If(s) => {
            lower_for_effect(ctx, &s.cond);
            lower_stmt(ctx, &s.then_branch);
            if let Some(e) = &s.else_branch {
                lower_stmt(ctx, e);
            }
        }
        Stmt::While(s) => {
            lower_for_effect(ctx, &s.cond);
            lower_stmt(ctx, &s.body);
        }
        Stmt::For(s) => {
            if let Some(init) = &s.init {
                lower_stmt(ctx, init);
            }
            if let Some(cond) = &s.cond {
                lower_for_effect(ctx, cond);
            }
            if let Some(post) = &s.post {
                lower_stmt(ctx, post);
            }
            lower_stmt(ctx, &s.body);
        }
        Stmt::ForIn(s) => {
            lower_for_effect(ctx, &s.right);
            lower_stmt(ctx, &s.body);
        }
        Stmt::Try(s) => {
            for st in &s.body {
                lower_stmt(ctx, st);
            }
            if let Some(catch) = &s.catch_body {
                for st in catch {
                    lower_stmt(ctx, st);
                }
            }
            if let Some(fin) = &s.finally_body {
                for st in fin {
                    lower_stmt(ctx, st);
                }
            }
        }
        Stmt::Switch(s) => {
            lower_for_effect(ctx, &s.discriminant);
            for case in &s.cases {
                for st in &case.body {
                    lower_stmt(ctx, st);
                }
            }
        }
        Stmt::Labeled(s) => lower_stmt(ctx, &s.body),
        Stmt::Break(..) | Stmt::Continue(..) => {}
        Stmt::Bad(_) => {}
    }
}

/// `ExprStmt` and the condition/discriminant slots flattened above all
/// share this rule: a bare call emits a `Call` instruction directly (not
/// wrapped in a `Var`); any other expression kind is evaluated but not
/// surfaced as an instruction, matching spec's "other expr kinds become
/// BadNode/unsupported" for the non-call case.
fn lower_for_effect(ctx: &Ctx, e: &Expr) {
    if let Expr::Call(call) = e {
        let value = lower_call(ctx, call);
        push_instruction(ctx, Instruction::Value(value));
    } else {
        let _ = expr_value(ctx, e);
    }
}

fn lower_assign(ctx: &Ctx, a: &ast::AssignStmt) {
    if a.lhs.len() != a.rhs.len() {
        // Tuple unpacking: unimplemented upstream, so treated as BadNode.
        unsupported_value(ctx, "unsupported assignment shape (tuple unpacking)", Some(a.pos));
        return;
    }
    for (lhs, rhs) in a.lhs.iter().zip(a.rhs.iter()) {
        let Expr::Ident(ident) = lhs else {
            unsupported_value(ctx, "unsupported assignment target", Some(a.pos));
            continue;
        };
        if let Expr::FuncLit(lit) = rhs {
            lower_named_closure(ctx, &ident.name, lit);
        } else {
            let value = expr_value(ctx, rhs);
            add_named_local(ctx, &ident.name, value);
        }
    }
}

fn lower_named_closure(ctx: &Ctx, name: &str, lit: &ast::FuncLit) -> ValueRef {
    let parent_func = ctx.func.cloned();
    let count = ctx.func.map(|f| f.borrow().anon_funcs.len()).unwrap_or(0);
    let closure_name = format!("{name}${count}");
    let inner = Function::new(
        closure_name,
        lit.params.clone(),
        lit.body.clone(),
        lit.pos,
        parent_func.as_ref().map(Rc::downgrade),
        Rc::downgrade(ctx.file),
    );
    if let Some(func) = ctx.func {
        func.borrow_mut().anon_funcs.push(inner.clone());
    }
    build_function(&inner, ctx.file, &ctx.config).expect("closures never fail to build");
    let closure_value = Rc::new(std::cell::RefCell::new(Value::Closure(Closure {
        func: inner,
        pos: Some(lit.pos),
    })));
    add_named_local(ctx, name, closure_value)
}

fn lower_return(ctx: &Ctx, r: &ast::ReturnStmt) {
    let results = r.results.iter().map(|e| expr_value(ctx, e)).collect();
    push_instruction(
        ctx,
        Instruction::Return(Return {
            results,
            pos: r.pos,
        }),
    );
    new_block(ctx, "unreachable");
}

// ---------------------------------------------------------------------
// Expression lowering
// ---------------------------------------------------------------------

fn expr_value(ctx: &Ctx, e: &Expr) -> ValueRef {
    match e {
        Expr::BasicLit(lit) => value::new_const(lit.value.clone(), Some(lit.pos)),
        Expr::Ident(ident) => resolve_ident(ctx, &ident.name),
        Expr::Call(call) => lower_call(ctx, call),
        Expr::Binary(bin) => {
            let left = expr_value(ctx, &bin.left);
            let right = expr_value(ctx, &bin.right);
            Rc::new(std::cell::RefCell::new(Value::BinOp(value::BinOp {
                op: bin.op.clone(),
                left,
                right,
                pos: Some(bin.pos),
            })))
        }
        Expr::Unary(u) => unsupported_value(ctx, format!("unsupported expression ({u:?})"), Some(u.pos)),
        Expr::Conditional(c) => unsupported_value(ctx, format!("unsupported expression ({c:?})"), Some(c.pos)),
        Expr::FuncLit(lit) => {
            let count = ctx.func.map(|f| f.borrow().anon_funcs.len()).unwrap_or(0);
            let parent_func = ctx.func.cloned();
            let closure_name = format!("anon${count}");
            let inner = Function::new(
                closure_name,
                lit.params.clone(),
                lit.body.clone(),
                lit.pos,
                parent_func.as_ref().map(Rc::downgrade),
                Rc::downgrade(ctx.file),
            );
            if let Some(func) = ctx.func {
                func.borrow_mut().anon_funcs.push(inner.clone());
            }
            build_function(&inner, ctx.file, &ctx.config).expect("closures never fail to build");
            Rc::new(std::cell::RefCell::new(Value::Closure(Closure {
                func: inner,
                pos: Some(lit.pos),
            })))
        }
        Expr::Template(t) => {
            let subs = t.subs.iter().map(|s| expr_value(ctx, s)).collect();
            Rc::new(std::cell::RefCell::new(Value::Template(Template {
                raw: t.raw.clone(),
                subs,
                pos: Some(t.pos),
            })))
        }
        other => unsupported_value(ctx, format!("unsupported expression ({other:?})"), Some(other.pos())),
    }
}

/// Not found as a local: consult file-level globals (needed for the
/// "constant propagates through a global" checker scenario) before falling
/// back to an opaque placeholder for a genuinely free identifier (an
/// unresolved binding, not an unhandled AST shape — so this never goes
/// through the debug-panic switch).
fn resolve_ident(ctx: &Ctx, name: &str) -> ValueRef {
    if let Some(local) = lookup(ctx, name) {
        return local;
    }
    if let Some(func) = ctx.func {
        if let Some(param) = func.borrow().params.iter().find(|p| {
            matches!(&*p.borrow(), Value::Parameter(param) if param.name == name)
        }) {
            return param.clone();
        }
    }
    if let Some(Member::Global(g)) = ctx.file.borrow().members.get(name) {
        return g.clone();
    }
    // Not found anywhere: still register it as a local with a defining
    // instruction, the same way every other `Var` gets one — a call
    // argument with no antecedent instruction would violate the one
    // invariant this layer guarantees unconditionally.
    add_named_local(
        ctx,
        name,
        value::new_unsupported(format!("unresolved identifier {name}"), None),
    )
}

fn lower_call(ctx: &Ctx, call: &ast::CallExpr) -> ValueRef {
    let Some(target) = resolve_call_target(ctx, &call.callee) else {
        return unsupported_value(ctx, "unsupported call-expression shape", Some(call.pos));
    };
    let args = call
        .args
        .iter()
        .map(|arg| lower_call_argument(ctx, arg))
        .collect();
    Rc::new(std::cell::RefCell::new(Value::Call(Call {
        target,
        args,
        pos: Some(call.pos),
    })))
}

fn lower_call_argument(ctx: &Ctx, arg: &Expr) -> ValueRef {
    match arg {
        Expr::Ident(ident) => {
            if let Some(local) = lookup(ctx, &ident.name) {
                return local;
            }
            resolve_ident(ctx, &ident.name)
        }
        Expr::Call(nested) => {
            let value = lower_call(ctx, nested);
            add_local(ctx, value)
        }
        other => expr_value(ctx, other),
    }
}

/// `None` means "other call-expression shapes → BadNode" (spec.md §4.4):
/// the caller turns that into an unsupported value instead of a `Call`.
fn resolve_call_target(ctx: &Ctx, callee: &Expr) -> Option<crate::ir::function::FunctionRef> {
    match callee {
        Expr::Ident(ident) => Some(
            ctx.file
                .borrow()
                .func(&ident.name)
                .unwrap_or_else(|| Function::new_stub(ident.name.clone(), Rc::downgrade(ctx.file))),
        ),
        Expr::Member(m) if !m.computed => {
            let (Expr::Ident(obj), Expr::Ident(prop)) = (&*m.object, &*m.property) else {
                return None;
            };
            let resolved_obj = ctx
                .file
                .borrow()
                .imported
                .get(&obj.name)
                .map(|imp| imp.name.clone())
                .unwrap_or_else(|| obj.name.clone());
            let full_name = format!("{resolved_obj}.{}", prop.name);
            Some(Function::new_stub(full_name, Rc::downgrade(ctx.file)))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::frontend::{ecma::EcmaFrontend, Frontend};
    use crate::cst::CancellationToken;

    fn build(src: &str) -> FileRef {
        let cancel = CancellationToken::new();
        let config = EngineConfig::default();
        let ast_file = EcmaFrontend
            .parse(Some("t.js"), src.as_bytes(), &config, &cancel)
            .unwrap();
        let file = new_file(ast_file);
        build_file(&file, &config).unwrap();
        file
    }

    #[test]
    fn require_import_has_no_function_member() {
        let file = build("const foo = require('bar');");
        let f = file.borrow();
        assert!(f.func("foo").is_none());
        let imported = f.imported.get("foo").unwrap();
        assert_eq!(imported.path, "bar");
    }

    #[test]
    fn closure_named_after_parent_is_built() {
        let file = build("function f(){ const g = (a,b)=>{ return a+b; }; }");
        let f = file.borrow();
        let Some(Member::Func(func)) = f.members.get("f") else {
            panic!("expected function f")
        };
        let func = func.borrow();
        assert_eq!(func.anon_funcs.len(), 1);
        let closure_fn = func.anon_funcs[0].borrow();
        assert!(closure_fn.built);
        assert_eq!(closure_fn.blocks.len(), 2); // entry + post-return unreachable
    }

    #[test]
    fn nested_call_is_hoisted_into_a_temp() {
        let file = build("function f(){ insecureCall(Math.random()) }");
        let f = file.borrow();
        let Some(Member::Func(func)) = f.members.get("f") else {
            panic!("expected function f")
        };
        let func = func.borrow();
        let Instruction::Value(first) = &func.blocks[0].instructions[0] else {
            panic!("expected a value instruction")
        };
        let Value::Var(v) = &*first.borrow() else {
            panic!("expected a Var instruction")
        };
        assert_eq!(v.name, "%t0");
    }

    #[test]
    fn selector_call_resolves_via_aliased_import() {
        let file = build("import { spawn as exec } from 'child_process'; function f(c){ exec(c) }");
        let f = file.borrow();
        let Some(Member::Func(func)) = f.members.get("f") else {
            panic!("expected function f")
        };
        let func = func.borrow();
        let Instruction::Value(call_value) = &func.blocks[0].instructions[0] else {
            panic!("expected a value instruction")
        };
        let Value::Call(call) = &*call_value.borrow() else {
            panic!("expected a Call")
        };
        assert_eq!(call.target.borrow().name, "child_process.spawn");
    }
}
