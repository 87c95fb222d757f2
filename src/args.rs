// Copyright (C) Brian G. Milnes 2025

//! Standard command line arguments shared by the restitch binaries

pub mod args {
    use std::path::{Path, PathBuf};

    use clap::Parser;
    use walkdir::WalkDir;

    #[derive(Parser, Debug, Default)]
    pub struct StandardArgs {
        /// Directory to process recursively
        #[arg(short = 'd', long)]
        pub dir: Option<PathBuf>,

        /// Single file to process
        #[arg(short = 'f', long)]
        pub file: Option<PathBuf>,

        /// Process the whole codebase (src, tests, benches)
        #[arg(short = 'c', long)]
        pub codebase: bool,

        /// Emit results as JSON
        #[arg(long)]
        pub json: bool,

        /// Additional files or directories
        pub paths: Vec<PathBuf>,
    }

    impl StandardArgs {
        /// Every Rust file the arguments select, in deterministic order.
        pub fn collect_files(&self) -> Vec<PathBuf> {
            let mut files = Vec::new();
            if let Some(ref file) = self.file {
                files.push(file.clone());
            }
            for dir in get_search_dirs(self) {
                files.extend(find_rust_files(&dir));
            }
            for path in &self.paths {
                if path.is_dir() {
                    files.extend(find_rust_files(path));
                } else {
                    files.push(path.clone());
                }
            }
            files.sort();
            files.dedup();
            files
        }
    }

    /// Directories implied by -d / -c.
    pub fn get_search_dirs(args: &StandardArgs) -> Vec<PathBuf> {
        let mut dirs = Vec::new();
        if let Some(ref dir) = args.dir {
            dirs.push(dir.clone());
        }
        if args.codebase {
            for name in ["src", "tests", "benches"] {
                let dir = PathBuf::from(name);
                if dir.is_dir() {
                    dirs.push(dir);
                }
            }
        }
        dirs
    }

    /// All .rs files under a directory, skipping build output.
    pub fn find_rust_files(dir: &Path) -> Vec<PathBuf> {
        WalkDir::new(dir)
            .into_iter()
            .filter_entry(|e| e.file_name() != "target")
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "rs"))
            .map(|e| e.path().to_path_buf())
            .collect()
    }

    /// 1234567 -> "1,234,567" for summary lines.
    pub fn format_number(n: usize) -> String {
        let digits = n.to_string();
        let mut out = String::new();
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                out.push(',');
            }
            out.push(c);
        }
        out
    }
}
