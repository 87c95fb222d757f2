// Copyright (C) Brian G. Milnes 2025

//! Reference ledger: usage-aware import bookkeeping
//!
//! During a rewrite pass the ledger only records intent: symbols a template
//! introduced, and owners whose calls were rewritten away. Nothing touches
//! the use-items mid-pass. `finalize` runs once after the pass settles,
//! counts surviving references over the final tree, and emits a minimal
//! add/remove delta. `apply_delta` re-checks references before deleting a
//! use-item and keeps the import rather than leave a dangling reference.

pub mod ledger {
    use std::collections::{BTreeSet, HashMap};

    use ra_ap_syntax::{
        ast,
        ast::{AstNode, HasName},
        SyntaxKind,
    };

    use crate::errors::errors::RewriteError;
    use crate::parser::parser::ParsedFile;
    use crate::resolver::resolver::{join_path, last_segment, ImportTable, MethodCatalog};

    /// Minimal import edit for one file: paths to add, bound paths to
    /// remove (`owner::name`, `owner::*`, or a plain module path).
    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    pub struct ImportDelta {
        pub add: BTreeSet<String>,
        pub remove: BTreeSet<String>,
    }

    impl ImportDelta {
        pub fn is_empty(&self) -> bool {
            self.add.is_empty() && self.remove.is_empty()
        }
    }

    #[derive(Debug, Clone, Default)]
    pub struct ReferenceLedger {
        introduced: BTreeSet<String>,
        removal_candidates: BTreeSet<String>,
    }

    /// One use-item and what it binds.
    #[derive(Debug, Clone)]
    struct UseBinding {
        start: usize,
        end: usize,
        /// (local name, full path) pairs bound by this item.
        entries: Vec<(String, String)>,
        /// Star-imported module paths in this item.
        stars: Vec<String>,
    }

    impl ReferenceLedger {
        pub fn new() -> ReferenceLedger {
            ReferenceLedger::default()
        }

        /// A symbol the rewrite now uses, queued for import addition.
        pub fn record_introduced(&mut self, symbol: &str) {
            self.introduced.insert(symbol.to_string());
        }

        /// The qualified owner of a rewritten-away call, queued for import
        /// removal pending the surviving-reference check.
        pub fn record_removed_candidate(&mut self, symbol: &str) {
            self.removal_candidates.insert(symbol.to_string());
        }

        pub fn is_empty(&self) -> bool {
            self.introduced.is_empty() && self.removal_candidates.is_empty()
        }

        /// One full reference count over the final tree, then the delta.
        /// An introduced symbol already covered by an exact or star import
        /// is suppressed; a removal candidate with any surviving reference
        /// is suppressed.
        pub fn finalize(&self, file: &ParsedFile, catalog: &MethodCatalog) -> ImportDelta {
            let mut delta = ImportDelta::default();
            let imports = ImportTable::build(file);
            for path in &self.introduced {
                if !imports.covers(path) {
                    delta.add.insert(path.clone());
                }
            }

            let refs = surviving_names(file);
            for binding in use_bindings(file) {
                for (local, full) in &binding.entries {
                    if self.owns(full) && !refs.contains_key(local) {
                        delta.remove.insert(full.clone());
                    }
                }
                for star in &binding.stars {
                    if self.removal_candidates.contains(star) {
                        let members = catalog.member_names(star);
                        let alive = members.is_empty()
                            || members.iter().any(|m| refs.contains_key(*m));
                        if !alive {
                            delta.remove.insert(format!("{star}::*"));
                        }
                    }
                }
            }
            delta
        }

        /// True when `full` is bound from a removal-candidate owner.
        fn owns(&self, full: &str) -> bool {
            self.removal_candidates.iter().any(|owner| {
                full == owner || full.strip_prefix(owner.as_str()).is_some_and(|r| r.starts_with("::"))
            })
        }
    }

    /// Apply a finalized delta as the last edit of the pass. Removals that
    /// would orphan a surviving reference are refused and reported;
    /// the output must always keep compiling.
    pub fn apply_delta(
        file: &ParsedFile,
        delta: &ImportDelta,
    ) -> Result<(ParsedFile, Vec<RewriteError>), RewriteError> {
        if delta.is_empty() {
            return Ok((file.clone(), Vec::new()));
        }

        let mut inconsistencies = Vec::new();
        let refs = surviving_names(file);
        let mut edits: Vec<(usize, usize, String)> = Vec::new();

        for binding in use_bindings(file) {
            let mut kept: Vec<(String, String)> = Vec::new();
            let mut dropped = 0usize;
            for (local, full) in &binding.entries {
                if delta.remove.contains(full) {
                    if refs.contains_key(local) {
                        inconsistencies.push(RewriteError::LedgerInconsistency(full.clone()));
                        kept.push((local.clone(), full.clone()));
                    } else {
                        dropped += 1;
                    }
                } else {
                    kept.push((local.clone(), full.clone()));
                }
            }
            let mut kept_stars: Vec<String> = Vec::new();
            for star in &binding.stars {
                if delta.remove.contains(&format!("{star}::*")) {
                    dropped += 1;
                } else {
                    kept_stars.push(star.clone());
                }
            }
            if dropped == 0 {
                continue;
            }
            if kept.is_empty() && kept_stars.is_empty() {
                let (start, end) = full_line_span(file.text(), binding.start, binding.end);
                edits.push((start, end, String::new()));
            } else {
                edits.push((binding.start, binding.end, rebuild_use(&kept, &kept_stars)));
            }
        }

        // End-to-start so earlier byte offsets stay valid.
        edits.sort_by_key(|(start, _, _)| *start);
        let mut text = file.text().to_string();
        for (start, end, replacement) in edits.iter().rev() {
            text.replace_range(*start..*end, replacement);
        }

        if !delta.add.is_empty() {
            let interim = ParsedFile::parse(&text)?;
            let at = insertion_point(&interim);
            let mut block = String::new();
            for path in &delta.add {
                block.push_str(&format!("use {path};\n"));
            }
            if !has_top_level_use(&interim) && !text[at..].starts_with('\n') {
                block.push('\n');
            }
            text.insert_str(at, &block);
        }

        let rewritten = ParsedFile::parse(&text)?;
        Ok((rewritten, inconsistencies))
    }

    /// Counts of NAME_REF spellings outside use-items in the final tree.
    fn surviving_names(file: &ParsedFile) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for node in file.syntax().descendants() {
            if node.kind() != SyntaxKind::NAME_REF {
                continue;
            }
            if node.ancestors().any(|a| a.kind() == SyntaxKind::USE) {
                continue;
            }
            *counts.entry(node.text().to_string()).or_insert(0usize) += 1;
        }
        counts
    }

    fn use_bindings(file: &ParsedFile) -> Vec<UseBinding> {
        let mut bindings = Vec::new();
        for node in file.syntax().descendants() {
            let Some(use_item) = ast::Use::cast(node) else {
                continue;
            };
            let range = use_item.syntax().text_range();
            let mut binding = UseBinding {
                start: range.start().into(),
                end: range.end().into(),
                entries: Vec::new(),
                stars: Vec::new(),
            };
            if let Some(tree) = use_item.use_tree() {
                collect_tree("", &tree, &mut binding);
            }
            bindings.push(binding);
        }
        bindings
    }

    fn collect_tree(prefix: &str, tree: &ast::UseTree, binding: &mut UseBinding) {
        let path_text = tree
            .path()
            .map(|p| p.syntax().text().to_string())
            .unwrap_or_default();
        let full = join_path(prefix, &path_text);
        if tree.star_token().is_some() {
            binding.stars.push(full);
        } else if let Some(list) = tree.use_tree_list() {
            for inner in list.use_trees() {
                collect_tree(&full, &inner, binding);
            }
        } else if !full.is_empty() {
            let local = tree
                .rename()
                .and_then(|r| r.name())
                .map(|n| n.text().to_string())
                .unwrap_or_else(|| last_segment(&full).to_string());
            binding.entries.push((local, full));
        }
    }

    /// Rebuild a partially surviving use-item on one line.
    fn rebuild_use(entries: &[(String, String)], stars: &[String]) -> String {
        let mut parts: Vec<String> = Vec::new();
        for (local, full) in entries {
            if last_segment(full) == local {
                parts.push(full.clone());
            } else {
                parts.push(format!("{full} as {local}"));
            }
        }
        for star in stars {
            parts.push(format!("{star}::*"));
        }
        if parts.len() == 1 {
            return format!("use {};", parts[0]);
        }
        // Single shared parent keeps the braced form readable; otherwise
        // fall back to the first part's spelling per line is overkill for
        // one item, so brace the tails under the common parent when all
        // parts share one.
        if let Some(parent) = common_parent(&parts) {
            let tails: Vec<String> = parts
                .iter()
                .map(|p| p[parent.len() + 2..].to_string())
                .collect();
            return format!("use {parent}::{{{}}};", tails.join(", "));
        }
        format!("use {{{}}};", parts.join(", "))
    }

    fn common_parent(parts: &[String]) -> Option<String> {
        let first = parts.first()?;
        let (parent, _) = first.rsplit_once("::")?;
        for part in &parts[1..] {
            let (p, _) = part.rsplit_once("::")?;
            if p != parent {
                return None;
            }
        }
        Some(parent.to_string())
    }

    /// Widen a removal to whole lines when only whitespace surrounds the
    /// item on its line.
    fn full_line_span(text: &str, start: usize, end: usize) -> (usize, usize) {
        let line_start = text[..start].rfind('\n').map(|i| i + 1).unwrap_or(0);
        let line_end = text[end..]
            .find('\n')
            .map(|i| end + i + 1)
            .unwrap_or(text.len());
        if text[line_start..start].trim().is_empty() && text[end..line_end].trim().is_empty() {
            (line_start, line_end)
        } else {
            (start, end)
        }
    }

    fn has_top_level_use(file: &ParsedFile) -> bool {
        file.syntax()
            .children()
            .any(|n| n.kind() == SyntaxKind::USE)
    }

    /// Where added imports go: after the last top-level use-item's line,
    /// else after the leading inner attributes and module doc comments.
    fn insertion_point(file: &ParsedFile) -> usize {
        let text = file.text();
        let last_use = file
            .syntax()
            .children()
            .filter(|n| n.kind() == SyntaxKind::USE)
            .last();
        if let Some(use_item) = last_use {
            let end: usize = use_item.text_range().end().into();
            return text[end..]
                .find('\n')
                .map(|i| end + i + 1)
                .unwrap_or(text.len());
        }
        let mut at = 0;
        for line in text.split_inclusive('\n') {
            let trimmed = line.trim();
            if trimmed.starts_with("//!") || trimmed.starts_with("#![") || trimmed.is_empty() {
                // Stop at a blank line only after real content follows it.
                if trimmed.is_empty() && at == 0 {
                    break;
                }
                at += line.len();
            } else {
                break;
            }
        }
        at
    }
}
