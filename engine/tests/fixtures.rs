//! Fixture-driven snapshot tests: every `tests/fixtures/source/<lang>/*.js`
//! file gets its AST and IR dumped and compared against the matching file
//! under `tests/fixtures/expected/<lang>/{ast,ir}/`. Set `REWRITE=1` (or
//! pass `-rewrite` after `--` to the test binary) to regenerate the
//! expected files in place instead of asserting against them.

use std::fs;
use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use sastcore::ast::printer::print_file;
use sastcore::config::EngineConfig;
use sastcore::cst::{CancellationToken, Language};
use sastcore::frontend::{self, Frontend};
use sastcore::ir;

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn rewrite_requested() -> bool {
    std::env::var("REWRITE").is_ok()
        || std::env::args().any(|a| a == "-rewrite" || a == "--rewrite")
}

fn check_or_write(path: &Path, actual: &str) {
    if rewrite_requested() {
        fs::write(path, actual).unwrap_or_else(|e| panic!("writing {path:?}: {e}"));
        return;
    }
    let expected = fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("missing expected fixture {path:?}: {e}"));
    assert_eq!(expected, actual, "fixture mismatch for {path:?}");
}

#[test]
fn js_fixtures_match_expected_ast_and_ir_dumps() {
    let root = fixtures_root();
    let source_dir = root.join("source/js");
    let mut entries: Vec<_> = fs::read_dir(&source_dir)
        .unwrap_or_else(|e| panic!("reading {source_dir:?}: {e}"))
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().map(|e| e == "js").unwrap_or(false))
        .collect();
    entries.sort();
    assert!(!entries.is_empty(), "no fixture sources found under {source_dir:?}");

    for source_path in entries {
        let stem = source_path
            .file_stem()
            .unwrap()
            .to_string_lossy()
            .to_string();
        let source =
            fs::read(&source_path).unwrap_or_else(|e| panic!("reading {source_path:?}: {e}"));
        let name = format!("{stem}.js");

        let cancel = CancellationToken::new();
        let config = EngineConfig::default();
        let frontend = frontend::get(Language::JavaScript);
        let ast_file = frontend
            .parse(Some(&name), &source, &config, &cancel)
            .unwrap_or_else(|e| panic!("{name} failed to parse: {e}"));

        let ast_dump = print_file(&ast_file);
        check_or_write(&root.join(format!("expected/js/ast/{stem}.out")), &ast_dump);

        let file = ir::new_file(ast_file);
        ir::build_file(&file, &config).unwrap_or_else(|e| panic!("{name} failed to build: {e}"));
        let ir_dump = ir::disassemble(&file.borrow());
        check_or_write(&root.join(format!("expected/js/ir/{stem}.out")), &ir_dump);
    }
}
