//! Consolidated error type for the engine's public surface.
//!
//! Internal lowering helpers use `anyhow::Result` the way the teacher's
//! tree-sitter-backed parsers do (`services::ast_kotlin`): they never need
//! to distinguish error variants, only to propagate a message with context.
//! Everything that crosses the crate boundary collapses into `EngineError`.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error in {file}: {message}")]
    Parse { file: String, message: String },

    #[error("language not supported: {0}")]
    UnsupportedLanguage(String),

    #[error("analysis cancelled")]
    Cancelled,
}
