// Copyright (C) Brian G. Milnes 2025

//! Parsing and rendering of source files
//!
//! Wraps ra_ap_syntax so the rest of the engine only sees `ParsedFile`:
//! an immutable lossless syntax tree plus the exact text it came from.
//! Rendering an unmodified tree reproduces the input byte for byte.

pub mod parser {
    use ra_ap_syntax::{ast, ast::AstNode, Edition, SourceFile, SyntaxNode};

    use crate::errors::errors::RewriteError;

    /// One immutable revision of a source file. Node handles and byte
    /// offsets taken from a revision are valid only against that revision.
    #[derive(Debug, Clone)]
    pub struct ParsedFile {
        text: String,
        tree: SourceFile,
    }

    impl ParsedFile {
        pub fn parse(source: &str) -> Result<ParsedFile, RewriteError> {
            let parsed = SourceFile::parse(source, Edition::Edition2021);
            if !parsed.errors().is_empty() {
                return Err(RewriteError::Parse(format!("{:?}", parsed.errors())));
            }
            Ok(ParsedFile {
                text: source.to_string(),
                tree: parsed.tree(),
            })
        }

        pub fn text(&self) -> &str {
            &self.text
        }

        pub fn tree(&self) -> &SourceFile {
            &self.tree
        }

        pub fn syntax(&self) -> &SyntaxNode {
            self.tree.syntax()
        }

        /// Render the tree back to text. Byte-identical to `text()` since
        /// revisions are immutable and edits always reparse.
        pub fn render(&self) -> String {
            self.tree.syntax().text().to_string()
        }
    }

    /// Parse a fragment of expression text by probing it inside a synthetic
    /// function. Returns the expression node (owned by the probe's tree).
    pub fn parse_expr_fragment(fragment: &str) -> Result<SyntaxNode, RewriteError> {
        let wrapped = format!("fn __probe() {{ let _ = {fragment}; }}");
        let parsed = SourceFile::parse(&wrapped, Edition::Edition2021);
        if !parsed.errors().is_empty() {
            return Err(RewriteError::TemplateSyntax(format!(
                "`{fragment}`: {:?}",
                parsed.errors()
            )));
        }
        let expr = parsed
            .tree()
            .syntax()
            .descendants()
            .find_map(ast::LetStmt::cast)
            .and_then(|stmt| stmt.initializer())
            .ok_or_else(|| RewriteError::TemplateSyntax(format!("`{fragment}`: no expression")))?;
        Ok(expr.syntax().clone())
    }
}
