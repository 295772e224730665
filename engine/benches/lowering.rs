//! Throughput of the CST→AST→IR pipeline on a handful of representative
//! snippets, grounded on the same `criterion` setup the teacher used for
//! its parser benchmarks.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use sastcore::config::EngineConfig;
use sastcore::cst::CancellationToken;
use sastcore::frontend::{self, Frontend};
use sastcore::ir;

const SNIPPETS: &[(&str, &str)] = &[
    ("require_import", "const foo = require('bar');"),
    (
        "closure",
        "function f(){ const g = (a,b)=>{ return a+b; }; return g(1,2); }",
    ),
    (
        "hoisted_call",
        "function f(){ insecureCall(Math.random()); }",
    ),
    (
        "aliased_selector",
        "import { spawn as exec } from 'child_process'; function f(c){ exec(c); }",
    ),
    (
        "control_flow",
        "function f(x){ if (x) { for (let i=0;i<10;i++) { eval(String(i)); } } }",
    ),
];

fn lowering_benchmark(c: &mut Criterion) {
    let config = EngineConfig::default();
    let cancel = CancellationToken::new();
    let ecma = frontend::get(sastcore::cst::Language::JavaScript);

    let mut group = c.benchmark_group("lowering");
    for (name, source) in SNIPPETS {
        group.bench_function(*name, |b| {
            b.iter(|| {
                let ast_file = ecma
                    .parse(Some("bench.js"), source.as_bytes(), &config, &cancel)
                    .expect("bench snippet parses");
                let file = ir::new_file(black_box(ast_file));
                ir::build_file(&file, &config).expect("bench snippet builds");
                black_box(file);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, lowering_benchmark);
criterion_main!(benches);
