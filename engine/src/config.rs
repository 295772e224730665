//! Resource limits for the CST/IR lowering pipeline.
//!
//! Grounded on `services::ast_kotlin::KotlinAstParser::with_limits` — the
//! teacher's pattern of plain, explicit `Duration`/`usize` fields with a
//! field-by-field `Default` rather than a builder.

use std::time::Duration;

/// What the IR builder does when it meets an AST shape it doesn't lower.
///
/// `panic-on-unsupported` (a cargo feature, not a runtime choice — see
/// the design-notes "debug panic switch" requirement) selects
/// [`UnsupportedNodePolicy::Panic`] at compile time; otherwise the engine
/// always runs with [`UnsupportedNodePolicy::Drop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsupportedNodePolicy {
    Drop,
    Panic,
}

impl UnsupportedNodePolicy {
    pub const fn compiled() -> Self {
        if cfg!(feature = "panic-on-unsupported") {
            UnsupportedNodePolicy::Panic
        } else {
            UnsupportedNodePolicy::Drop
        }
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum depth of recursive expression/statement lowering before the
    /// frontend bails out with a parse error instead of overflowing the
    /// native stack.
    pub max_recursion_depth: usize,
    /// Source files larger than this are rejected before parsing.
    pub max_source_bytes: usize,
    /// Upper bound on tree-sitter parse time before the parse is cancelled.
    pub parse_timeout: Duration,
    pub unsupported_node_policy: UnsupportedNodePolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_recursion_depth: 1000,
            max_source_bytes: 10 * 1024 * 1024,
            parse_timeout: Duration::from_secs(30),
            unsupported_node_policy: UnsupportedNodePolicy::compiled(),
        }
    }
}
