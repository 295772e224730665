//! The checker framework: a [`Pass`] carries per-function context and a
//! reporting sink; [`Analyzer`] walks a function looking for vulnerable
//! instructions, [`AnalyzerValue`] decides truth over a single IR value.
//!
//! Grounded on `horusec-engine`'s analyzer/value split, reshaped as traits
//! over this crate's IR rather than the Go engine's interface pair.

pub mod call;
pub mod value;

use crate::ast::Position;
use crate::ir::file::File;
use crate::ir::function::Function;

pub use call::{CallAnalyzer, ALL_ARGUMENTS, NO_ARGUMENTS};
pub use value::{Contains, IsConst};

/// An analyzer-internal report: byte offsets plus the 1-based line/column
/// the driver turns into a [`crate::rule::Finding`]'s `SourceLocation`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub filename: String,
    pub start_offset: u32,
    pub end_offset: u32,
    pub line: u32,
    pub column: u32,
}

impl Issue {
    pub fn at(pos: Position) -> Self {
        Issue {
            filename: String::new(),
            start_offset: pos.start.byte,
            end_offset: pos.end.byte,
            line: pos.start.row,
            column: pos.start.column,
        }
    }
}

/// The per-function context handed to an [`Analyzer`]: the file it belongs
/// to (for cross-scope lookups), the function under analysis, and the
/// accumulator issues get pushed into.
pub struct Pass<'a> {
    pub file: &'a File,
    pub function: &'a Function,
    issues: Vec<Issue>,
}

impl<'a> Pass<'a> {
    pub fn new(file: &'a File, function: &'a Function) -> Self {
        Pass {
            file,
            function,
            issues: Vec::new(),
        }
    }

    pub fn report(&mut self, mut issue: Issue) {
        issue.filename = self.file.name.clone().unwrap_or_default();
        self.issues.push(issue);
    }

    pub fn into_issues(self) -> Vec<Issue> {
        self.issues
    }
}

/// Walks a single [`Function`], reporting [`Issue`]s through the [`Pass`].
pub trait Analyzer {
    fn analyze(&self, pass: &mut Pass<'_>);
}

/// A predicate over a single IR [`crate::ir::value::Value`] — `true` means
/// the value satisfies the rule (e.g. is constant), not that it is unsafe.
pub trait AnalyzerValue {
    fn holds(&self, value: &crate::ir::value::ValueRef) -> bool;
}

/// Runs `analyzer` over every function reachable from `file`: top-level
/// functions, their anonymous closures, and every struct method — the walk
/// order spec'd so closures and methods are never missed.
pub fn run(file: &File, analyzer: &dyn Analyzer) -> Vec<Issue> {
    let mut issues = Vec::new();
    let mut names: Vec<&String> = file.members.keys().collect();
    names.sort();
    for name in names {
        if let crate::ir::file::Member::Func(f) = &file.members[name] {
            run_function(file, f, analyzer, &mut issues);
        }
    }
    let mut names: Vec<&String> = file.members.keys().collect();
    names.sort();
    for name in names {
        if let crate::ir::file::Member::Struct(s) = &file.members[name] {
            for method in &s.borrow().methods {
                run_function(file, method, analyzer, &mut issues);
            }
        }
    }
    issues
}

fn run_function(
    file: &File,
    func: &crate::ir::function::FunctionRef,
    analyzer: &dyn Analyzer,
    issues: &mut Vec<Issue>,
) {
    {
        let f = func.borrow();
        let mut pass = Pass::new(file, &f);
        analyzer.analyze(&mut pass);
        issues.extend(pass.into_issues());
    }
    let anon = func.borrow().anon_funcs.clone();
    for inner in &anon {
        run_function(file, inner, analyzer, issues);
    }
}
