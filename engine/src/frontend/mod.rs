//! The Frontend seam: every source-language converter implements this one
//! trait, and the rule driver never knows which converter it got.
//!
//! Grounded on `services::unified_ast_parser`'s dispatch-by-`Language`
//! idiom, collapsed to a single closed registry function since the CST
//! layer's [`Language`](crate::cst::Language) enumeration is itself closed.

pub mod ecma;

#[cfg(test)]
mod ecma_property_tests;

use crate::ast::File;
use crate::config::EngineConfig;
use crate::cst::{CancellationToken, Language};
use crate::error::Result;

/// Lowers one source file from its CST into the language-neutral AST.
///
/// Per spec: never fails except on a parser error; any CST shape this
/// frontend doesn't recognize becomes a [`crate::ast::BadNode`] instead of
/// propagating an error.
pub trait Frontend {
    fn parse(
        &self,
        name: Option<&str>,
        source: &[u8],
        config: &EngineConfig,
        cancel: &CancellationToken,
    ) -> Result<File>;
}

/// Look up the frontend registered for `language`. The registry is closed:
/// every [`Language`] variant the CST layer knows how to parse also has a
/// frontend here, so this never returns `None` today, but stays fallible in
/// shape so a future language tag can't silently fall through to the wrong
/// converter.
pub fn get(language: Language) -> &'static dyn Frontend {
    match language {
        Language::JavaScript | Language::Jsx | Language::TypeScript | Language::Tsx => {
            static ECMA: ecma::EcmaFrontend = ecma::EcmaFrontend;
            &ECMA
        }
    }
}
