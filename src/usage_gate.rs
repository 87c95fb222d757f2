// Copyright (C) Brian G. Milnes 2025

//! Usage gate: a cheap whole-file precondition
//!
//! Before paying for a traversal, a rule checks whether the file can
//! possibly reference the owner it rewrites. False positives are fine and
//! expected (name collisions, comments); a false negative would silently
//! skip a real match, so the check errs wide open.

pub mod usage_gate {
    use regex::Regex;

    use crate::parser::parser::ParsedFile;
    use crate::resolver::resolver::{last_segment, ImportTable};

    /// True unless the file provably cannot contain a reference to
    /// `qualified_name` (fully qualified, imported, or star-imported).
    pub fn may_contain(file: &ParsedFile, qualified_name: &str) -> bool {
        let name = last_segment(qualified_name);
        if word_pattern(name).is_match(file.text()) {
            return true;
        }
        // `use parent::*;` can bind the name without ever spelling it.
        if let Some((parent, _)) = qualified_name.rsplit_once("::") {
            let imports = ImportTable::build(file);
            if imports.star_modules().iter().any(|m| m == parent) {
                return true;
            }
        }
        false
    }

    fn word_pattern(name: &str) -> Regex {
        // The name is an escaped identifier, so the pattern always compiles.
        Regex::new(&format!(r"\b{}\b", regex::escape(name))).unwrap()
    }
}
