//! The rule driver: read a file, pick a frontend by declared language,
//! build AST and IR, run an [`crate::analyzer::Analyzer`] over every
//! function (including anonymous closures and struct methods), and turn
//! the resulting [`crate::analyzer::Issue`]s into user-visible [`Finding`]s.
//!
//! Grounded on `horusec-engine`'s rule/metadata split; the struct layout
//! follows `services::context`'s plain-data `Metadata` records.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::analyzer::{self, Analyzer};
use crate::config::EngineConfig;
use crate::cst::{CancellationToken, Language};
use crate::error::{EngineError, Result};
use crate::frontend;
use crate::ir;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Confidence {
    Low,
    Medium,
    High,
}

/// Carried unchanged from a rule's configuration onto every [`Finding`] it
/// produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    pub id: String,
    pub name: String,
    pub description: String,
    pub severity: Severity,
    pub confidence: Confidence,
    #[serde(default)]
    pub filter: Option<String>,
    #[serde(default)]
    pub cwes: Vec<String>,
    #[serde(default)]
    pub cves: Vec<String>,
    #[serde(default)]
    pub mitigation: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub safe_example: Option<String>,
    #[serde(default)]
    pub unsafe_example: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub filename: String,
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub id: String,
    pub name: String,
    pub severity: Severity,
    pub confidence: Confidence,
    pub description: String,
    pub code_sample: String,
    pub source_location: SourceLocation,
}

/// A rule pairs an [`Analyzer`] with the [`Metadata`] it reports under.
pub struct Rule<A: Analyzer> {
    pub metadata: Metadata,
    pub analyzer: A,
    pub language: Language,
    pub config: EngineConfig,
}

impl<A: Analyzer> Rule<A> {
    pub fn new(metadata: Metadata, language: Language, analyzer: A) -> Self {
        Rule {
            metadata,
            analyzer,
            language,
            config: EngineConfig::default(),
        }
    }

    /// `Run(path) → (Findings, Error)`. Only parse, I/O, and configuration
    /// errors are surfaced; an unsupported AST shape inside an otherwise
    /// well-formed file never fails the run.
    #[instrument(skip(self), fields(rule = %self.metadata.id))]
    pub fn run(&self, path: &Path) -> Result<Vec<Finding>> {
        let source = fs::read(path).map_err(|source| EngineError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let name = path.to_string_lossy().into_owned();
        let cancel = CancellationToken::new();
        let frontend = frontend::get(self.language);
        let ast_file = frontend.parse(Some(&name), &source, &self.config, &cancel)?;

        let file = ir::new_file(ast_file);
        ir::build_file(&file, &self.config)?;

        let issues = analyzer::run(&file.borrow(), &self.analyzer);
        if !issues.is_empty() {
            warn!(count = issues.len(), rule = %self.metadata.id, "issues found");
        }

        Ok(issues
            .into_iter()
            .map(|issue| self.to_finding(&source, issue))
            .collect())
    }

    fn to_finding(&self, source: &[u8], issue: analyzer::Issue) -> Finding {
        let start = issue.start_offset as usize;
        let end = issue.end_offset as usize;
        let code_sample = source
            .get(start..end)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
            .unwrap_or_default();

        Finding {
            id: self.metadata.id.clone(),
            name: self.metadata.name.clone(),
            severity: self.metadata.severity,
            confidence: self.metadata.confidence,
            description: self.metadata.description.clone(),
            code_sample,
            source_location: SourceLocation {
                filename: issue.filename,
                line: issue.line,
                column: issue.column,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{CallAnalyzer, IsConst, NO_ARGUMENTS};
    use std::io::Write;

    fn metadata() -> Metadata {
        Metadata {
            id: "eval-with-non-const-argument".into(),
            name: "eval with non-constant argument".into(),
            description: "eval() called with a value that isn't provably constant".into(),
            severity: Severity::High,
            confidence: Confidence::Medium,
            filter: None,
            cwes: vec!["CWE-95".into()],
            cves: Vec::new(),
            mitigation: None,
            reference: None,
            safe_example: None,
            unsafe_example: None,
        }
    }

    #[test]
    fn run_reports_a_finding_with_a_sliced_code_sample() {
        let mut file = tempfile_js("function f(){ eval(untrusted) }");
        let analyzer = CallAnalyzer::new("eval", NO_ARGUMENTS);
        let rule = Rule::new(metadata(), Language::JavaScript, analyzer);
        let findings = rule.run(file.path()).unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].source_location.line, 1);
        file.flush().unwrap();
    }

    #[test]
    fn run_on_well_formed_safe_code_reports_nothing() {
        let file = tempfile_js("function f(){ const s = '1+1'; eval(s) }");
        let analyzer = CallAnalyzer::new("eval", 1).with_arg_value(IsConst);
        let rule = Rule::new(metadata(), Language::JavaScript, analyzer);
        let findings = rule.run(file.path()).unwrap();
        assert!(findings.is_empty());
    }

    fn tempfile_js(source: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".js")
            .tempfile()
            .expect("create temp file");
        file.write_all(source.as_bytes()).expect("write source");
        file
    }
}
