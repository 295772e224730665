//! Semantic static-analysis engine: lowers source text through a concrete
//! syntax tree, a language-neutral abstract syntax tree, and a basic-block
//! intermediate representation, then runs call-site security checkers over
//! that IR.
//!
//! The pipeline, leaves first:
//!
//! - [`cst`] wraps the incremental parser. Nothing past this module
//!   matches on a grammar node-kind string.
//! - [`ast`] is the language-neutral tree every frontend lowers into.
//! - [`frontend`] converts one source language's CST into [`ast::File`];
//!   [`frontend::ecma`] is the reference ECMAScript-family converter.
//! - [`ir`] lowers an [`ast::File`] into basic blocks of instructions over
//!   shared, typed values.
//! - [`analyzer`] is the checker framework: a [`analyzer::Pass`] walks one
//!   function, an [`analyzer::Analyzer`] decides what's vulnerable.
//! - [`rule`] drives one analyzer over one file end to end and maps its
//!   issues onto user-visible [`rule::Finding`]s.
//!
//! Text/regex rule matching, file discovery and encoding detection,
//! structured-data rule engines, and report serialization live outside
//! this crate; it covers only the semantic pipeline.

pub mod analyzer;
pub mod ast;
pub mod config;
pub mod cst;
pub mod error;
pub mod frontend;
pub mod ir;
pub mod rule;

pub use config::EngineConfig;
pub use error::{EngineError, Result};
pub use rule::{Finding, Metadata, Rule};

/// Installs a `tracing` subscriber reading `RUST_LOG` (falling back to
/// `info`), the way a standalone binary embedding this crate would wire up
/// logging. A library consumer that already has a subscriber installed has
/// no reason to call this.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init();
}
