// Copyright (C) Brian G. Milnes 2025

//! Logging infrastructure for restitch tools
//!
//! Logs go to files organized by tool and date:
//! - logs/<tool-name>/<date>/run-<timestamp>.log
//!
//! Multiple runs on the same day create timestamped log files. If the log
//! file cannot be created, the tool continues without file logging.

pub mod logging {
    use std::fs;
    use std::io::Write;
    use std::path::{Path, PathBuf};

    use anyhow::Result;
    use chrono::{DateTime, Local};

    /// Logger for a restitch tool. Messages always go to stdout; the log
    /// file is best-effort.
    pub struct ToolLogger {
        log_file: Option<fs::File>,
        log_path: Option<PathBuf>,
        start_time: DateTime<Local>,
    }

    impl ToolLogger {
        /// Logger without file output, for runs where logging is off.
        pub fn disabled() -> ToolLogger {
            ToolLogger {
                log_file: None,
                log_path: None,
                start_time: Local::now(),
            }
        }

        /// Create logs/<tool-name>/<YYYY-MM-DD>/run-<HH-MM-SS>.log and log
        /// into it; degrade to stdout-only if that fails.
        pub fn new(tool_name: &str) -> ToolLogger {
            let start_time = Local::now();
            match Self::create_log_file(tool_name, &start_time) {
                Ok((file, path)) => ToolLogger {
                    log_file: Some(file),
                    log_path: Some(path),
                    start_time,
                },
                Err(e) => {
                    eprintln!("Warning: could not create log file: {e}");
                    ToolLogger {
                        log_file: None,
                        log_path: None,
                        start_time,
                    }
                }
            }
        }

        fn create_log_file(
            tool_name: &str,
            start_time: &DateTime<Local>,
        ) -> Result<(fs::File, PathBuf)> {
            let date_str = start_time.format("%Y-%m-%d").to_string();
            let time_str = start_time.format("%H-%M-%S").to_string();

            let log_dir = PathBuf::from("logs").join(tool_name).join(&date_str);
            fs::create_dir_all(&log_dir)?;

            let log_path = log_dir.join(format!("run-{time_str}.log"));
            let log_file = fs::File::create(&log_path)?;
            Ok((log_file, log_path))
        }

        /// Log to stdout and, when enabled, the log file.
        pub fn log(&mut self, message: &str) {
            println!("{message}");
            if let Some(ref mut file) = self.log_file {
                let _ = writeln!(file, "{message}");
            }
        }

        /// Log to the file only.
        pub fn log_silent(&mut self, message: &str) {
            if let Some(ref mut file) = self.log_file {
                let _ = writeln!(file, "{message}");
            }
        }

        pub fn log_path(&self) -> Option<&Path> {
            self.log_path.as_deref()
        }

        /// Close out the run with a summary block.
        pub fn finalize(&mut self, summary: &str) {
            let end_time = Local::now();
            let duration = end_time.signed_duration_since(self.start_time);

            self.log("");
            self.log("=== Run Summary ===");
            self.log(summary);
            self.log(&format!(
                "Started: {}",
                self.start_time.format("%Y-%m-%d %H:%M:%S")
            ));
            self.log(&format!("Ended: {}", end_time.format("%Y-%m-%d %H:%M:%S")));
            self.log(&format!("Duration: {}ms", duration.num_milliseconds()));

            if let Some(ref path) = self.log_path {
                self.log(&format!("Log saved to: {}", path.display()));
            }
        }
    }

    impl Drop for ToolLogger {
        fn drop(&mut self) {
            if let Some(ref mut file) = self.log_file {
                let _ = file.flush();
            }
        }
    }
}
