// Copyright (C) Brian G. Milnes 2025

//! Rewrite driver: orchestrates gate, match, template, splice and ledger
//!
//! Per (file, rule): usage gate, then a pre-order scan of call expressions.
//! A match flows synchronously through template selection, compile (cached),
//! bind, and splice; traversal then resumes on the new revision just past
//! the fragment. Recoverable failures become per-node diagnostics and the
//! scan continues; only parse failures and splice conflicts fail the file.
//! Rules run strictly sequentially per file; files run in parallel.

pub mod driver {
    use std::path::{Path, PathBuf};

    use anyhow::Result;
    use ra_ap_syntax::{ast, ast::AstNode, SyntaxKind};
    use rayon::prelude::*;
    use serde::Serialize;

    use crate::errors::errors::{Diagnostic, RewriteError};
    use crate::ledger::ledger::{apply_delta, ReferenceLedger};
    use crate::parser::parser::ParsedFile;
    use crate::resolver::resolver::{Capture, FileResolver, MethodCatalog, TypeResolution};
    use crate::rules::rules::{default_catalog, default_rules, Rule};
    use crate::splice::splice::{apply as apply_splice, Coordinates};
    use crate::template::template::{BoundFragment, TemplateCache};
    use crate::usage_gate::usage_gate::may_contain;

    /// Per-file result. Diagnostics never abort a batch; a failure is
    /// scoped to the offending file.
    #[derive(Debug, Serialize)]
    #[serde(tag = "status", rename_all = "snake_case")]
    pub enum Outcome {
        Unchanged {
            diagnostics: Vec<Diagnostic>,
        },
        Rewritten {
            text: String,
            applied_rules: Vec<String>,
            diagnostics: Vec<Diagnostic>,
        },
        Failed {
            diagnostics: Vec<Diagnostic>,
        },
    }

    impl Outcome {
        pub fn is_rewritten(&self) -> bool {
            matches!(self, Outcome::Rewritten { .. })
        }

        pub fn is_failed(&self) -> bool {
            matches!(self, Outcome::Failed { .. })
        }

        pub fn diagnostics(&self) -> &[Diagnostic] {
            match self {
                Outcome::Unchanged { diagnostics }
                | Outcome::Rewritten { diagnostics, .. }
                | Outcome::Failed { diagnostics } => diagnostics,
            }
        }
    }

    /// Everything shared across one batch run: the resolution catalog and
    /// the compile-once template cache. Constructed per run, shared by
    /// reference across worker threads.
    #[derive(Debug, Default)]
    pub struct EngineContext {
        pub catalog: MethodCatalog,
        pub templates: TemplateCache,
    }

    impl EngineContext {
        pub fn new(catalog: MethodCatalog) -> EngineContext {
            EngineContext {
                catalog,
                templates: TemplateCache::new(),
            }
        }
    }

    pub struct RewriteEngine {
        context: EngineContext,
        rules: Vec<Rule>,
    }

    /// What the scan decided for one visited call.
    enum Step {
        /// Not a match; continue scanning from this offset (the node's
        /// start + 1, so nested calls are still visited).
        Skip(usize),
        /// Recoverable failure; report and resume at the next sibling.
        Abandon(usize, Diagnostic),
        /// Splice this fragment over these coordinates.
        Splice(Coordinates, BoundFragment),
        Done,
    }

    impl RewriteEngine {
        pub fn new(context: EngineContext, rules: Vec<Rule>) -> RewriteEngine {
            RewriteEngine { context, rules }
        }

        /// Engine preloaded with the bundled migration rules and catalog.
        pub fn with_default_rules() -> Result<RewriteEngine> {
            Ok(RewriteEngine::new(
                EngineContext::new(default_catalog()),
                default_rules()?,
            ))
        }

        pub fn rules(&self) -> &[Rule] {
            &self.rules
        }

        pub fn context(&self) -> &EngineContext {
            &self.context
        }

        /// Rewrite one file's text through every rule, sequentially.
        pub fn rewrite_source(&self, source: &str) -> Outcome {
            let mut file = match ParsedFile::parse(source) {
                Ok(file) => file,
                Err(e) => {
                    return Outcome::Failed {
                        diagnostics: vec![Diagnostic::file_scoped("parse", &e)],
                    }
                }
            };

            let mut diagnostics = Vec::new();
            let mut applied_rules = Vec::new();
            for rule in &self.rules {
                match self.apply_rule(rule, file) {
                    Ok((next, changed, mut diags)) => {
                        diagnostics.append(&mut diags);
                        if changed {
                            applied_rules.push(rule.id.clone());
                        }
                        file = next;
                    }
                    Err(e) => {
                        diagnostics.push(Diagnostic::file_scoped(&rule.id, &e));
                        return Outcome::Failed { diagnostics };
                    }
                }
            }

            if applied_rules.is_empty() {
                Outcome::Unchanged { diagnostics }
            } else {
                Outcome::Rewritten {
                    text: file.text().to_string(),
                    applied_rules,
                    diagnostics,
                }
            }
        }

        /// Rewrite a fixed set of files, one independent unit of work each.
        pub fn rewrite_files(&self, paths: &[PathBuf]) -> Vec<(PathBuf, Outcome)> {
            paths
                .par_iter()
                .map(|path| (path.clone(), self.rewrite_path(path)))
                .collect()
        }

        fn rewrite_path(&self, path: &Path) -> Outcome {
            match std::fs::read_to_string(path) {
                Ok(source) => self.rewrite_source(&source),
                Err(e) => Outcome::Failed {
                    diagnostics: vec![Diagnostic::file_scoped(
                        "io",
                        &RewriteError::Parse(format!("{}: {e}", path.display())),
                    )],
                },
            }
        }

        /// One rule over one file: gate, scan, splice, finalize.
        fn apply_rule(
            &self,
            rule: &Rule,
            mut file: ParsedFile,
        ) -> Result<(ParsedFile, bool, Vec<Diagnostic>), RewriteError> {
            if !may_contain(&file, rule.pattern.owner()) {
                return Ok((file, false, Vec::new()));
            }

            let mut ledger = ReferenceLedger::new();
            let mut diagnostics = Vec::new();
            let mut changed = false;
            let mut cursor = 0usize;

            loop {
                // One resolver (and type cache) per revision; a splice
                // produces a new revision and a fresh resolver.
                let pending = {
                    let resolver = FileResolver::new(&file, &self.context.catalog);
                    let mut found = None;
                    loop {
                        match self.visit_next(rule, &file, &resolver, cursor) {
                            Step::Done => break,
                            Step::Skip(next) => cursor = next,
                            Step::Abandon(next, diagnostic) => {
                                diagnostics.push(diagnostic);
                                cursor = next;
                            }
                            Step::Splice(coordinates, fragment) => {
                                found = Some((coordinates, fragment));
                                break;
                            }
                        }
                    }
                    found
                };
                let Some((coordinates, fragment)) = pending else {
                    break;
                };
                match apply_splice(&file, &coordinates, &fragment.text) {
                    Ok(result) => {
                        for import in &fragment.static_imports {
                            ledger.record_introduced(import);
                        }
                        ledger.record_removed_candidate(&rule.removable_import);
                        cursor = result.fragment_start + 1;
                        file = result.file;
                        changed = true;
                    }
                    Err(e @ RewriteError::SpliceConflict { .. }) => return Err(e),
                    // A fragment that fails to parse in context is
                    // node-scoped; the rest of the file still rewrites.
                    Err(e) => {
                        diagnostics.push(Diagnostic::node_scoped(
                            &rule.id,
                            file.text(),
                            coordinates.start,
                            &e,
                        ));
                        cursor = coordinates.end;
                    }
                }
            }

            if changed {
                let delta = ledger.finalize(&file, &self.context.catalog);
                let (finalized, inconsistencies) = apply_delta(&file, &delta)?;
                for inconsistency in &inconsistencies {
                    diagnostics.push(Diagnostic::file_scoped(&rule.id, inconsistency));
                }
                file = finalized;
            }

            Ok((file, changed, diagnostics))
        }

        /// Visit the first call expression at or past `cursor` and decide
        /// what to do with it.
        fn visit_next(
            &self,
            rule: &Rule,
            file: &ParsedFile,
            resolver: &FileResolver<'_>,
            cursor: usize,
        ) -> Step {
            let Some(call) = next_call(file, cursor) else {
                return Step::Done;
            };
            let start: usize = call.syntax().text_range().start().into();
            let end: usize = call.syntax().text_range().end().into();

            let resolved = match resolver.resolve_call(&call) {
                Ok(resolved) => resolved,
                // Fails closed: unresolvable is never a match.
                Err(_) => return Step::Skip(start + 1),
            };
            if !rule.pattern.matches(&resolved.sig, &self.context.catalog) {
                return Step::Skip(start + 1);
            }

            let Some(choice) = rule.selector.select(&resolved.args) else {
                return Step::Abandon(
                    end,
                    Diagnostic {
                        rule_id: rule.id.clone(),
                        line: line_of(file.text(), start),
                        offset: start,
                        message: "no template variant covers this call shape".to_string(),
                    },
                );
            };

            let bound = self
                .context
                .templates
                .get_or_compile(&choice.template, &choice.static_imports)
                .and_then(|template| {
                    let captures = ordered_captures(&resolved.args, &choice.capture_order)?;
                    template.bind(&captures)
                });
            match bound {
                Ok(fragment) => Step::Splice(Coordinates::replace(call.syntax()), fragment),
                Err(e) => Step::Abandon(end, Diagnostic::node_scoped(&rule.id, file.text(), start, &e)),
            }
        }
    }

    fn next_call(file: &ParsedFile, cursor: usize) -> Option<ast::CallExpr> {
        file.syntax()
            .descendants()
            .filter(|node| node.kind() == SyntaxKind::CALL_EXPR)
            .find(|node| usize::from(node.text_range().start()) >= cursor)
            .and_then(ast::CallExpr::cast)
    }

    fn ordered_captures(args: &[Capture], order: &[usize]) -> Result<Vec<Capture>, RewriteError> {
        order
            .iter()
            .map(|&i| {
                args.get(i).cloned().ok_or(RewriteError::PlaceholderArity {
                    expected: order.len(),
                    actual: args.len(),
                })
            })
            .collect()
    }

    fn line_of(source: &str, offset: usize) -> usize {
        let prefix = &source.as_bytes()[..offset.min(source.len())];
        prefix.iter().filter(|&&b| b == b'\n').count() + 1
    }
}
