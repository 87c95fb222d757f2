// Copyright (C) Brian G. Milnes 2025

//! Apply the bundled rewrite rules to Rust files, in place
//!
//! Runs every rule over every selected file (files in parallel, rules
//! sequential per file), writes rewritten files back, and reports a
//! per-file status plus a summary line.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use restitch::{format_number, Outcome, RewriteEngine, StandardArgs};
use restitch::tool_runner::tool_runner::{run_tool, ToolConfig};

fn main() -> Result<()> {
    let args = StandardArgs::parse();
    let base_dir = std::env::current_dir()?;

    let config = ToolConfig::new("rewrite", base_dir).with_logging();
    run_tool(config, |logger| {
        let files = args.collect_files();
        if files.is_empty() {
            return Ok("Summary: no files selected".to_string());
        }

        let engine = RewriteEngine::with_default_rules()?;
        let outcomes = engine.rewrite_files(&files);

        let mut rewritten = 0usize;
        let mut failed = 0usize;
        for (path, outcome) in &outcomes {
            match outcome {
                Outcome::Rewritten {
                    text,
                    applied_rules,
                    diagnostics,
                } => {
                    std::fs::write(path, text)?;
                    rewritten += 1;
                    logger.log(&format!(
                        "✓ {} ({})",
                        path.display(),
                        applied_rules.join(", ")
                    ));
                    log_diagnostics(logger, path, diagnostics);
                }
                Outcome::Unchanged { diagnostics } => {
                    logger.log_silent(&format!("  {} unchanged", path.display()));
                    log_diagnostics(logger, path, diagnostics);
                }
                Outcome::Failed { diagnostics } => {
                    failed += 1;
                    logger.log(&format!("✗ {} failed", path.display()));
                    log_diagnostics(logger, path, diagnostics);
                }
            }
        }

        Ok(format!(
            "Summary: {} files checked, {} files rewritten, {} files failed",
            format_number(files.len()),
            format_number(rewritten),
            format_number(failed)
        ))
    })
}

fn log_diagnostics(
    logger: &mut restitch::logging::logging::ToolLogger,
    path: &PathBuf,
    diagnostics: &[restitch::Diagnostic],
) {
    for diagnostic in diagnostics {
        logger.log(&format!("  {}: {diagnostic}", path.display()));
    }
}
