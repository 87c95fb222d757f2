// Copyright (C) Brian G. Milnes 2025

//! Splice engine: graft a bound fragment into a file at exact coordinates
//!
//! Edits are byte-range text edits followed by a full reparse, producing a
//! new immutable revision. Everything outside the edited span is
//! byte-identical to the input. Coordinates computed against one revision
//! are invalid against any other; callers re-root traversal at the
//! returned span.

pub mod splice {
    use ra_ap_syntax::SyntaxNode;

    use crate::errors::errors::RewriteError;
    use crate::parser::parser::ParsedFile;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum SpliceMode {
        Replace,
        InsertBefore,
        InsertAfter,
    }

    /// An anchor in a specific revision: the node's byte span plus how the
    /// fragment relates to it.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Coordinates {
        pub start: usize,
        pub end: usize,
        pub mode: SpliceMode,
    }

    impl Coordinates {
        pub fn replace(node: &SyntaxNode) -> Coordinates {
            Coordinates::of(node, SpliceMode::Replace)
        }

        pub fn insert_before(node: &SyntaxNode) -> Coordinates {
            Coordinates::of(node, SpliceMode::InsertBefore)
        }

        pub fn insert_after(node: &SyntaxNode) -> Coordinates {
            Coordinates::of(node, SpliceMode::InsertAfter)
        }

        fn of(node: &SyntaxNode, mode: SpliceMode) -> Coordinates {
            let range = node.text_range();
            Coordinates {
                start: range.start().into(),
                end: range.end().into(),
                mode,
            }
        }
    }

    /// The new revision plus the fragment's span within it.
    #[derive(Debug)]
    pub struct SpliceResult {
        pub file: ParsedFile,
        pub fragment_start: usize,
        pub fragment_end: usize,
    }

    /// Apply one edit. Stale or overlapping coordinates cannot occur when
    /// rules run sequentially per file; a bounds violation here is a
    /// programming error surfaced as `SpliceConflict`.
    pub fn apply(
        file: &ParsedFile,
        coordinates: &Coordinates,
        fragment: &str,
    ) -> Result<SpliceResult, RewriteError> {
        let text = file.text();
        if coordinates.start > coordinates.end || coordinates.end > text.len() {
            return Err(RewriteError::SpliceConflict {
                start: coordinates.start,
                end: coordinates.end,
                len: text.len(),
            });
        }

        let insert_at = match coordinates.mode {
            SpliceMode::Replace => coordinates.start,
            SpliceMode::InsertBefore => coordinates.start,
            SpliceMode::InsertAfter => coordinates.end,
        };
        let resume_from = match coordinates.mode {
            SpliceMode::Replace => coordinates.end,
            SpliceMode::InsertBefore => coordinates.start,
            SpliceMode::InsertAfter => coordinates.end,
        };

        let mut new_text = String::with_capacity(text.len() + fragment.len());
        new_text.push_str(&text[..insert_at]);
        new_text.push_str(fragment);
        new_text.push_str(&text[resume_from..]);

        let new_file = ParsedFile::parse(&new_text)
            .map_err(|e| RewriteError::TemplateSyntax(format!("spliced output: {e}")))?;

        Ok(SpliceResult {
            file: new_file,
            fragment_start: insert_at,
            fragment_end: insert_at + fragment.len(),
        })
    }
}
