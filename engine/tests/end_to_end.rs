//! End-to-end scenarios exercised through the crate's public surface only
//! (no `crate::` internals) — the way the teacher's `tests/` integration
//! suite drives its parsers and analyzers from the outside.

use sastcore::analyzer::{self, CallAnalyzer, Contains, IsConst, ALL_ARGUMENTS, NO_ARGUMENTS};
use sastcore::config::EngineConfig;
use sastcore::cst::{CancellationToken, Language};
use sastcore::frontend::{self, Frontend};
use sastcore::ir;
use sastcore::ir::file::Member;
use sastcore::ir::function::Instruction;
use sastcore::ir::value::Value;

fn build(src: &str) -> ir::FileRef {
    let cancel = CancellationToken::new();
    let config = EngineConfig::default();
    let frontend = frontend::get(Language::JavaScript);
    let ast_file = frontend
        .parse(Some("fixture.js"), src.as_bytes(), &config, &cancel)
        .expect("fixture source parses");
    let file = ir::new_file(ast_file);
    ir::build_file(&file, &config).expect("fixture source builds");
    file
}

#[test]
fn scenario_1_resolve_a_require_style_import() {
    let file = build("const foo = require('bar')");
    let f = file.borrow();
    assert!(f.func("foo").is_none());
    let imported = f.imported.get("foo").expect("foo registered as an import");
    assert_eq!(imported.path, "bar");
    assert_eq!(imported.alias, None);
}

#[test]
fn scenario_2_closure_named_after_parent() {
    let file = build("function f(){ const g = (a,b)=>{ return a+b; }; }");
    let f = file.borrow();
    let Some(Member::Func(outer)) = f.members.get("f") else {
        panic!("expected a function member named f");
    };
    let outer = outer.borrow();
    assert_eq!(outer.anon_funcs.len(), 1);

    let g = outer
        .locals
        .get("g")
        .expect("g registered as a local in f's entry block");
    let Value::Var(var) = &*g.borrow() else {
        panic!("expected g to be a Var")
    };
    assert!(matches!(&*var.value.borrow(), Value::Closure(_)));

    let closure_fn = outer.anon_funcs[0].borrow();
    assert!(closure_fn.built);
    let Instruction::Return(ret) = closure_fn.blocks[0]
        .instructions
        .iter()
        .find(|i| matches!(i, Instruction::Return(_)))
        .expect("closure body has a return")
    else {
        unreachable!()
    };
    assert!(matches!(&*ret.results[0].borrow(), Value::BinOp(_)));
}

#[test]
fn scenario_3_call_argument_aliasing() {
    let file = build("function f(){ const s = '1+1'; eval(s) }");
    let analyzer = CallAnalyzer::new("eval", 1).with_arg_value(IsConst);
    let issues = analyzer::run(&file.borrow(), &analyzer);
    assert!(issues.is_empty(), "local alias to a Const must not be flagged");
}

#[test]
fn scenario_4_hoisting_nested_calls() {
    let file = build("function f(){ insecureCall(Math.random()) }");
    let f = file.borrow();
    let Some(Member::Func(func)) = f.members.get("f") else {
        panic!("expected function f");
    };
    let func = func.borrow();
    let Instruction::Value(first) = &func.blocks[0].instructions[0] else {
        panic!("expected a value instruction first")
    };
    let Value::Var(hoisted) = &*first.borrow() else {
        panic!("expected the hoisted call to be a Var")
    };
    assert_eq!(hoisted.name, "%t0");
    assert!(matches!(&*hoisted.value.borrow(), Value::Call(_)));

    let analyzer = CallAnalyzer::new("insecureCall", ALL_ARGUMENTS).with_arg_value(IsConst);
    let issues = analyzer::run(&file.borrow(), &analyzer);
    assert_eq!(
        issues.len(),
        1,
        "the hoisted Math.random() call isn't constant, so ALL_ARGUMENTS + IsConst must flag it"
    );
}

#[test]
fn scenario_5_selector_via_aliased_import() {
    let file = build("import { spawn as exec } from 'child_process'; function f(c){ exec(c) }");
    let analyzer = CallAnalyzer::new("child_process.spawn", NO_ARGUMENTS);
    let issues = analyzer::run(&file.borrow(), &analyzer);
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].line, 1);
}

#[test]
fn scenario_6_contains_over_global() {
    let file = build("const algo = 'md5'; function f(){ crypto.createHash(algo) }");
    let analyzer = CallAnalyzer::new("crypto.createHash", 1).with_arg_value(Contains::new(["sha256"]));
    let issues = analyzer::run(&file.borrow(), &analyzer);
    assert_eq!(issues.len(), 1);
}

#[test]
fn disassembly_round_trips_byte_identical() {
    let file = build("function f(){ const s = '1+1'; eval(s) }");
    let first = ir::disassemble(&file.borrow());
    let second = ir::disassemble(&file.borrow());
    assert_eq!(first, second);
}
