//! The reference `Call` analyzer: match a call by its dotted target name,
//! inspect one argument (or all, or none) against an [`AnalyzerValue`].
//!
//! Grounded on `horusec-engine`'s `CallExpr` rule kind.

use crate::analyzer::{Analyzer, AnalyzerValue, Issue, Pass};
use crate::ir::function::Instruction;
use crate::ir::value::{Call, Value, ValueRef};

/// Match any call to `Name` regardless of arity.
pub const NO_ARGUMENTS: i32 = -2;
/// Vulnerable if *any* argument fails `ArgValue`.
pub const ALL_ARGUMENTS: i32 = -1;

pub struct CallAnalyzer {
    pub name: String,
    pub args_index: i32,
    pub arg_value: Option<Box<dyn AnalyzerValue>>,
}

impl CallAnalyzer {
    pub fn new(name: impl Into<String>, args_index: i32) -> Self {
        CallAnalyzer {
            name: name.into(),
            args_index,
            arg_value: None,
        }
    }

    pub fn with_arg_value(mut self, value: impl AnalyzerValue + 'static) -> Self {
        self.arg_value = Some(Box::new(value));
        self
    }

    fn arg_passes(&self, value: &ValueRef) -> bool {
        match &self.arg_value {
            Some(predicate) => predicate.holds(value),
            None => true,
        }
    }

    fn check_call(&self, pass: &mut Pass<'_>, call: &Call) {
        if call.target.borrow().name != self.name {
            return;
        }
        let vulnerable = match self.args_index {
            NO_ARGUMENTS => true,
            ALL_ARGUMENTS => call.args.iter().any(|a| !self.arg_passes(a)),
            n if n >= 1 => match call.args.get(n as usize - 1) {
                Some(arg) => !self.arg_passes(arg),
                None => false,
            },
            _ => false,
        };
        if vulnerable {
            if let Some(pos) = call.pos {
                pass.report(Issue::at(pos));
            }
        }
    }

    /// A `Var` whose value is itself an instruction-producing value (a
    /// `Call`, most notably) is unwrapped so `const x = foo()` still flags
    /// the call to `foo`.
    fn inspect(&self, pass: &mut Pass<'_>, v: &ValueRef) {
        match &*v.borrow() {
            Value::Call(call) => self.check_call(pass, call),
            Value::Var(var) => self.inspect(pass, &var.value),
            _ => {}
        }
    }
}

impl Analyzer for CallAnalyzer {
    fn analyze(&self, pass: &mut Pass<'_>) {
        for block in &pass.function.blocks {
            for instr in &block.instructions {
                if let Instruction::Value(v) = instr {
                    self.inspect(pass, v);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{run, IsConst};
    use crate::config::EngineConfig;
    use crate::cst::CancellationToken;
    use crate::frontend::{ecma::EcmaFrontend, Frontend};
    use crate::ir::builder::{build_file, new_file};

    fn build(src: &str) -> crate::ir::builder::FileRef {
        let cancel = CancellationToken::new();
        let config = EngineConfig::default();
        let ast = EcmaFrontend
            .parse(Some("t.js"), src.as_bytes(), &config, &cancel)
            .unwrap();
        let file = new_file(ast);
        build_file(&file, &config).unwrap();
        file
    }

    #[test]
    fn aliased_argument_resolving_to_const_reports_nothing() {
        let file = build("function f(){ const s = '1+1'; eval(s) }");
        let analyzer = CallAnalyzer::new("eval", 1).with_arg_value(IsConst);
        let issues = run(&file.borrow(), &analyzer);
        assert!(issues.is_empty());
    }

    #[test]
    fn no_arguments_sentinel_matches_regardless_of_arity() {
        let file = build(
            "import { spawn as exec } from 'child_process'; function f(c){ exec(c) }",
        );
        let analyzer = CallAnalyzer::new("child_process.spawn", NO_ARGUMENTS);
        let issues = run(&file.borrow(), &analyzer);
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn contains_predicate_over_a_resolved_global_flags_the_call() {
        let file = build("const algo = 'md5'; function f(){ crypto.createHash(algo) }");
        let analyzer = CallAnalyzer::new("crypto.createHash", 1)
            .with_arg_value(crate::analyzer::Contains::new(["sha256"]));
        let issues = run(&file.borrow(), &analyzer);
        assert_eq!(issues.len(), 1);
    }
}
