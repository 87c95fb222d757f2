// Copyright (C) Brian G. Milnes 2025

//! Tool runner infrastructure for restitch binaries
//!
//! Wraps every tool run with the same plumbing:
//! - timing measurement
//! - directory context for Emacs compile-mode
//! - optional logging to files
//! - standard error handling

pub mod tool_runner {
    use std::path::PathBuf;
    use std::time::Instant;

    use anyhow::Result;

    use crate::logging::logging::ToolLogger;

    /// Configuration for a tool run.
    pub struct ToolConfig {
        /// Name of the tool (for the logging directory)
        pub tool_name: String,
        /// Base directory to display in "Entering directory"
        pub base_dir: PathBuf,
        /// Whether to enable file logging
        pub enable_logging: bool,
    }

    impl ToolConfig {
        pub fn new(tool_name: &str, base_dir: PathBuf) -> ToolConfig {
            ToolConfig {
                tool_name: tool_name.to_string(),
                base_dir,
                enable_logging: false,
            }
        }

        pub fn with_logging(mut self) -> ToolConfig {
            self.enable_logging = true;
            self
        }
    }

    /// Run a tool with standard timing, context, and optional logging.
    /// The closure returns the summary line printed at the end.
    pub fn run_tool<F>(config: ToolConfig, tool_fn: F) -> Result<()>
    where
        F: FnOnce(&mut ToolLogger) -> Result<String>,
    {
        let start = Instant::now();

        // Directory context for Emacs compile-mode.
        println!("Entering directory '{}'", config.base_dir.display());
        println!();

        let mut logger = if config.enable_logging {
            ToolLogger::new(&config.tool_name)
        } else {
            ToolLogger::disabled()
        };

        let summary = tool_fn(&mut logger)?;

        println!();
        println!("{summary}");
        println!("Completed in {}ms", start.elapsed().as_millis());

        if config.enable_logging {
            logger.finalize(&summary);
        }

        Ok(())
    }
}
