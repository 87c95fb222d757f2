// Copyright (C) Brian G. Milnes 2025

//! Report which files the bundled rewrite rules would change
//!
//! Dry run: nothing is written. Exit code 1 when at least one file would
//! be rewritten or failed, so the check can gate CI. With --json the
//! per-file outcomes are emitted as JSON instead of text.

use anyhow::Result;
use clap::Parser;
use restitch::{format_number, Outcome, RewriteEngine, StandardArgs};
use restitch::tool_runner::tool_runner::{run_tool, ToolConfig};

fn main() -> Result<()> {
    let args = StandardArgs::parse();
    let base_dir = std::env::current_dir()?;

    let mut would_change = 0usize;
    let mut failed = 0usize;
    let config = ToolConfig::new("check", base_dir);
    run_tool(config, |logger| {
        let files = args.collect_files();
        let engine = RewriteEngine::with_default_rules()?;
        let outcomes = engine.rewrite_files(&files);

        if args.json {
            let report: Vec<_> = outcomes
                .iter()
                .map(|(path, outcome)| serde_json::json!({ "file": path, "outcome": outcome }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        for (path, outcome) in &outcomes {
            match outcome {
                Outcome::Rewritten { applied_rules, .. } => {
                    would_change += 1;
                    if !args.json {
                        logger.log(&format!(
                            "✗ {} would be rewritten ({})",
                            path.display(),
                            applied_rules.join(", ")
                        ));
                    }
                }
                Outcome::Failed { diagnostics } => {
                    failed += 1;
                    if !args.json {
                        logger.log(&format!("✗ {} failed", path.display()));
                        for diagnostic in diagnostics {
                            logger.log(&format!("  {diagnostic}"));
                        }
                    }
                }
                Outcome::Unchanged { .. } => {}
            }
        }

        if would_change > 0 && !args.json {
            logger.log(&format!("✗ Found {} violation(s)", format_number(would_change)));
        }
        Ok(format!(
            "Summary: {} files checked, {} files would change, {} files failed",
            format_number(files.len()),
            format_number(would_change),
            format_number(failed)
        ))
    })?;

    if would_change > 0 || failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}
