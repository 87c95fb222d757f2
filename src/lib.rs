// Copyright (C) Brian G. Milnes 2025

//! Restitch - AST-based structural call rewriting for Rust code
//!
//! This library locates call expressions matching declared signature
//! patterns and replaces them with expressions built from parameterized
//! templates, preserving surrounding formatting and keeping the file's
//! imports consistent. Rules are pure configuration over a shared core:
//! signature matcher, usage gate, template compiler, splice engine,
//! reference ledger, and the rewrite driver that orchestrates them.

pub mod args;
pub mod driver;
pub mod errors;
pub mod ledger;
pub mod logging;
pub mod parser;
pub mod resolver;
pub mod rules;
pub mod signature;
pub mod splice;
pub mod template;
pub mod tool_runner;
pub mod types;
pub mod usage_gate;

use std::path::Path;

use anyhow::Result;

// Re-export commonly used items
pub use args::args::{find_rust_files, format_number, get_search_dirs, StandardArgs};
pub use driver::driver::{EngineContext, Outcome, RewriteEngine};
pub use errors::errors::{Diagnostic, RewriteError};
pub use ledger::ledger::{apply_delta, ImportDelta, ReferenceLedger};
pub use parser::parser::ParsedFile;
pub use resolver::resolver::{
    Capture, FileResolver, ImportTable, MethodCatalog, MethodSig, ResolvedCall, TypeResolution,
};
pub use rules::rules::{default_catalog, default_rules, ArgTest, Rule, TemplateChoice, TemplateSelector};
pub use signature::signature::SignaturePattern;
pub use splice::splice::{Coordinates, SpliceMode, SpliceResult};
pub use template::template::{BoundFragment, CompiledTemplate, TemplateCache};
pub use types::types::TypeRef;
pub use usage_gate::usage_gate::may_contain;

/// Rewrite one source text with the bundled rules.
pub fn rewrite_source(source: &str) -> Result<Outcome> {
    let engine = RewriteEngine::with_default_rules()?;
    Ok(engine.rewrite_source(source))
}

/// Rewrite a file with the bundled rules, optionally writing in place.
pub fn rewrite_file(file: &Path, in_place: bool) -> Result<Outcome> {
    let source = std::fs::read_to_string(file)?;
    let outcome = rewrite_source(&source)?;
    if in_place {
        if let Outcome::Rewritten { text, .. } = &outcome {
            std::fs::write(file, text)?;
        }
    }
    Ok(outcome)
}
