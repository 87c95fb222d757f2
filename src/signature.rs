// Copyright (C) Brian G. Milnes 2025

//! Signature patterns: what a rule matches
//!
//! A pattern is written as "owner method(params)" where params are a
//! comma-separated list of type spellings, `_` for any type, and an
//! optional trailing `..` (unchecked variadic tail) or `Ty..` (typed tail).
//! Patterns are parsed once per rule and reused across all files.

pub mod signature {
    use anyhow::{anyhow, Result};

    use crate::resolver::resolver::{MethodCatalog, MethodSig};
    use crate::types::types::TypeRef;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum ParamMatcher {
        Exact(TypeRef),
        Any,
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum TailMatcher {
        /// `..`: any number of further parameters, unchecked.
        Unchecked,
        /// `Ty..`: any number of further parameters, each compatible with Ty.
        Typed(TypeRef),
    }

    #[derive(Debug, Clone)]
    pub struct SignaturePattern {
        owner: String,
        method: String,
        fixed: Vec<ParamMatcher>,
        tail: Option<TailMatcher>,
    }

    impl SignaturePattern {
        /// Parse a pattern like "legacy_assert assert_false(bool, ..)".
        pub fn parse(pattern: &str) -> Result<SignaturePattern> {
            let trimmed = pattern.trim();
            let (owner, rest) = trimmed
                .split_once(char::is_whitespace)
                .ok_or_else(|| anyhow!("pattern `{pattern}` missing owner"))?;
            let rest = rest.trim();
            let open = rest
                .find('(')
                .ok_or_else(|| anyhow!("pattern `{pattern}` missing parameter list"))?;
            if !rest.ends_with(')') {
                return Err(anyhow!("pattern `{pattern}` missing `)`"));
            }
            let method = rest[..open].trim();
            if method.is_empty() {
                return Err(anyhow!("pattern `{pattern}` missing method name"));
            }
            let params_text = &rest[open + 1..rest.len() - 1];

            let mut fixed = Vec::new();
            let mut tail = None;
            for (i, raw) in params_text.split(',').enumerate() {
                let p = raw.trim();
                if p.is_empty() {
                    if i == 0 && params_text.trim().is_empty() {
                        break;
                    }
                    return Err(anyhow!("pattern `{pattern}` has an empty parameter"));
                }
                if tail.is_some() {
                    return Err(anyhow!("pattern `{pattern}`: `..` must be last"));
                }
                if p == ".." {
                    tail = Some(TailMatcher::Unchecked);
                } else if let Some(ty) = p.strip_suffix("..") {
                    tail = Some(TailMatcher::Typed(TypeRef::parse(ty)));
                } else if p == "_" {
                    fixed.push(ParamMatcher::Any);
                } else {
                    fixed.push(ParamMatcher::Exact(TypeRef::parse(p)));
                }
            }

            Ok(SignaturePattern {
                owner: owner.to_string(),
                method: method.to_string(),
                fixed,
                tail,
            })
        }

        pub fn owner(&self) -> &str {
            &self.owner
        }

        pub fn method(&self) -> &str {
            &self.method
        }

        /// Structural match against a concrete resolved signature. Arity is
        /// the resolved declaration's, never the call's spelled argument
        /// count, so same-name overloads of different arity cannot
        /// cross-match. Pure predicate.
        pub fn matches(&self, sig: &MethodSig, catalog: &MethodCatalog) -> bool {
            if sig.owner != self.owner || sig.name != self.method {
                return false;
            }
            let declared = &sig.params;
            if declared.len() < self.fixed.len() {
                return false;
            }
            if self.tail.is_none() && declared.len() != self.fixed.len() {
                return false;
            }
            for (matcher, ty) in self.fixed.iter().zip(declared.iter()) {
                match matcher {
                    ParamMatcher::Any => {}
                    ParamMatcher::Exact(want) => {
                        if !catalog.is_assignable(ty, want) {
                            return false;
                        }
                    }
                }
            }
            match &self.tail {
                None | Some(TailMatcher::Unchecked) => true,
                Some(TailMatcher::Typed(want)) => declared[self.fixed.len()..]
                    .iter()
                    .all(|ty| catalog.is_assignable(ty, want)),
            }
        }
    }
}
