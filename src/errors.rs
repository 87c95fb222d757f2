// Copyright (C) Brian G. Milnes 2025

//! Error taxonomy and structured diagnostics for the rewrite engine
//!
//! Every failure in the core is either node-scoped (the current match is
//! abandoned and traversal continues) or file-scoped (the file is reported
//! Failed). Nothing aborts a batch.

pub mod errors {
    use serde::Serialize;
    use thiserror::Error;

    /// Failures raised by the matcher, template compiler, splice engine
    /// and reference ledger.
    #[derive(Debug, Error)]
    pub enum RewriteError {
        /// The callee or an argument type could not be resolved.
        /// The matcher treats this as "no match" (fails closed).
        #[error("unresolved type for `{0}`")]
        UnresolvedType(String),

        /// Template text (or the bound fragment built from it) does not
        /// parse under the Rust grammar.
        #[error("template syntax error: {0}")]
        TemplateSyntax(String),

        /// Bound argument count differs from the declared placeholder count.
        #[error("template expects {expected} placeholder argument(s), got {actual}")]
        PlaceholderArity { expected: usize, actual: usize },

        /// A constrained placeholder received an incompatible capture.
        #[error("placeholder #{index} expects `{expected}`, capture has type `{actual}`")]
        PlaceholderType {
            index: usize,
            expected: String,
            actual: String,
        },

        /// Coordinates are stale or out of bounds for the current revision.
        /// Rules run sequentially per file, so this is a programming error.
        #[error("splice target {start}..{end} out of bounds for revision of length {len}")]
        SpliceConflict {
            start: usize,
            end: usize,
            len: usize,
        },

        /// An import removal would leave a dangling reference; the import
        /// is kept instead.
        #[error("import removal would leave dangling reference to `{0}`")]
        LedgerInconsistency(String),

        /// The source file did not parse.
        #[error("parse error: {0}")]
        Parse(String),
    }

    /// A per-node or per-file diagnostic attached to a file's outcome.
    #[derive(Debug, Clone, Serialize)]
    pub struct Diagnostic {
        pub rule_id: String,
        /// 1-indexed line of the offending node (0 for file-scoped).
        pub line: usize,
        /// Byte offset of the offending node in the revision it was seen in.
        pub offset: usize,
        pub message: String,
    }

    impl Diagnostic {
        pub fn node_scoped(rule_id: &str, source: &str, offset: usize, error: &RewriteError) -> Self {
            let prefix = &source.as_bytes()[..offset.min(source.len())];
            let line = prefix.iter().filter(|&&b| b == b'\n').count() + 1;
            Diagnostic {
                rule_id: rule_id.to_string(),
                line,
                offset,
                message: error.to_string(),
            }
        }

        pub fn file_scoped(rule_id: &str, error: &RewriteError) -> Self {
            Diagnostic {
                rule_id: rule_id.to_string(),
                line: 0,
                offset: 0,
                message: error.to_string(),
            }
        }
    }

    impl std::fmt::Display for Diagnostic {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            if self.line == 0 {
                write!(f, "[{}] {}", self.rule_id, self.message)
            } else {
                write!(f, "[{}] line {}: {}", self.rule_id, self.line, self.message)
            }
        }
    }
}
