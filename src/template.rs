// Copyright (C) Brian G. Milnes 2025

//! Template compiler: placeholder snippets into reusable fragment builders
//!
//! A template is expression text containing positional placeholders,
//! `#{any}` or `#{any(ty)}`. Compilation splits the text into literal
//! segments and slots and validates the shape by parsing a probe with
//! dummy identifiers in the slots. Binding splices each captured subtree's
//! original text into its slot (the capture keeps its own formatting and
//! comments) and re-validates the result.
//!
//! Compiling costs a parse, and template text is reused across many files,
//! so compiled templates live in a shared cache keyed by
//! (template text, static imports).

pub mod template {
    use std::collections::HashMap;
    use std::sync::{Arc, RwLock};

    use crate::errors::errors::RewriteError;
    use crate::parser::parser::parse_expr_fragment;
    use crate::resolver::resolver::Capture;
    use crate::types::types::TypeRef;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Placeholder {
        pub index: usize,
        /// Expected capture type; `None` and `Any` accept anything.
        pub constraint: Option<TypeRef>,
    }

    #[derive(Debug, Clone)]
    enum Segment {
        Text(String),
        Slot(usize),
    }

    /// A compiled, reusable fragment generator.
    #[derive(Debug, Clone)]
    pub struct CompiledTemplate {
        text: String,
        segments: Vec<Segment>,
        placeholders: Vec<Placeholder>,
        static_imports: Vec<String>,
    }

    /// The output of `bind`: validated replacement text plus the imports
    /// it relies on. Resolution against the target file happens at splice
    /// and ledger time, not here.
    #[derive(Debug, Clone)]
    pub struct BoundFragment {
        pub text: String,
        pub static_imports: Vec<String>,
    }

    impl CompiledTemplate {
        pub fn compile(
            template_text: &str,
            static_imports: &[String],
        ) -> Result<CompiledTemplate, RewriteError> {
            let (segments, placeholders) = scan(template_text)?;

            // Probe parse with dummy identifiers standing in for slots.
            let mut probe = String::new();
            for segment in &segments {
                match segment {
                    Segment::Text(t) => probe.push_str(t),
                    Segment::Slot(i) => probe.push_str(&format!("__slot{i}")),
                }
            }
            parse_expr_fragment(&probe)?;

            Ok(CompiledTemplate {
                text: template_text.to_string(),
                segments,
                placeholders,
                static_imports: static_imports.to_vec(),
            })
        }

        pub fn text(&self) -> &str {
            &self.text
        }

        pub fn placeholder_count(&self) -> usize {
            self.placeholders.len()
        }

        /// Substitute each placeholder with its capture. The capture's text
        /// goes in verbatim; only the surrounding template text is new.
        pub fn bind(&self, captures: &[Capture]) -> Result<BoundFragment, RewriteError> {
            if captures.len() != self.placeholders.len() {
                return Err(RewriteError::PlaceholderArity {
                    expected: self.placeholders.len(),
                    actual: captures.len(),
                });
            }
            for (placeholder, capture) in self.placeholders.iter().zip(captures.iter()) {
                if let Some(want) = &placeholder.constraint {
                    let ok = matches!(want, TypeRef::Any) || *want == capture.ty;
                    if !ok {
                        return Err(RewriteError::PlaceholderType {
                            index: placeholder.index,
                            expected: want.spelling(),
                            actual: capture.ty.spelling(),
                        });
                    }
                }
            }

            let mut out = String::new();
            for segment in &self.segments {
                match segment {
                    Segment::Text(t) => out.push_str(t),
                    Segment::Slot(i) => out.push_str(&captures[*i].text()),
                }
            }
            parse_expr_fragment(&out)?;

            Ok(BoundFragment {
                text: out,
                static_imports: self.static_imports.clone(),
            })
        }
    }

    /// Split template text into literal segments and positional slots.
    fn scan(text: &str) -> Result<(Vec<Segment>, Vec<Placeholder>), RewriteError> {
        let mut segments = Vec::new();
        let mut placeholders = Vec::new();
        let mut rest = text;
        while let Some(start) = rest.find("#{") {
            if !rest[..start].is_empty() {
                segments.push(Segment::Text(rest[..start].to_string()));
            }
            let close = rest[start..]
                .find('}')
                .ok_or_else(|| RewriteError::TemplateSyntax(format!("unclosed placeholder in `{text}`")))?;
            let body = &rest[start + 2..start + close];
            let constraint = parse_placeholder(body)
                .ok_or_else(|| RewriteError::TemplateSyntax(format!("bad placeholder `#{{{body}}}` in `{text}`")))?;
            let index = placeholders.len();
            placeholders.push(Placeholder { index, constraint });
            segments.push(Segment::Slot(index));
            rest = &rest[start + close + 1..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Text(rest.to_string()));
        }
        Ok((segments, placeholders))
    }

    /// `any` -> unconstrained; `any(ty)` -> constrained to ty.
    fn parse_placeholder(body: &str) -> Option<Option<TypeRef>> {
        let body = body.trim();
        if body == "any" {
            return Some(None);
        }
        let inner = body.strip_prefix("any(")?.strip_suffix(')')?;
        Some(Some(TypeRef::parse(inner)))
    }

    type CacheKey = (String, Vec<String>);

    /// Shared compile-once cache. Read-mostly; a concurrent duplicate
    /// compile is wasted work, never unsafe.
    #[derive(Debug, Default)]
    pub struct TemplateCache {
        inner: RwLock<HashMap<CacheKey, Arc<CompiledTemplate>>>,
    }

    impl TemplateCache {
        pub fn new() -> TemplateCache {
            TemplateCache::default()
        }

        pub fn len(&self) -> usize {
            self.inner.read().map(|m| m.len()).unwrap_or(0)
        }

        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }

        pub fn get_or_compile(
            &self,
            template_text: &str,
            static_imports: &[String],
        ) -> Result<Arc<CompiledTemplate>, RewriteError> {
            let key = (template_text.to_string(), static_imports.to_vec());
            if let Ok(map) = self.inner.read() {
                if let Some(hit) = map.get(&key) {
                    return Ok(Arc::clone(hit));
                }
            }
            // Compile outside the lock; a racing thread may do the same.
            let compiled = Arc::new(CompiledTemplate::compile(template_text, static_imports)?);
            if let Ok(mut map) = self.inner.write() {
                return Ok(Arc::clone(
                    map.entry(key).or_insert_with(|| Arc::clone(&compiled)),
                ));
            }
            Ok(compiled)
        }
    }
}
