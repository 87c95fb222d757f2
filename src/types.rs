// Copyright (C) Brian G. Milnes 2025

//! Resolved-type representation used by signatures, captures and templates

pub mod types {
    use serde::{Deserialize, Serialize};

    /// A resolved type. Collapses the spellings the engine cares about:
    /// all integer types are `Int`, `f32`/`f64` are `Float`, `&str` and
    /// `String` are `Str`. `Any` appears only in signatures and matchers
    /// (the `_` spelling); `Unknown` only as a resolution result.
    #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub enum TypeRef {
        Bool,
        Int,
        Float,
        Str,
        Unit,
        Named(String),
        Any,
        Unknown,
    }

    impl TypeRef {
        /// Parse a type spelling as written in signature patterns,
        /// template placeholders, and source annotations.
        pub fn parse(spelling: &str) -> TypeRef {
            let s = spelling.trim().trim_start_matches('&').trim();
            match s {
                "_" => TypeRef::Any,
                "bool" => TypeRef::Bool,
                "i8" | "i16" | "i32" | "i64" | "i128" | "isize" | "u8" | "u16" | "u32"
                | "u64" | "u128" | "usize" => TypeRef::Int,
                "f32" | "f64" => TypeRef::Float,
                "str" | "String" => TypeRef::Str,
                "()" => TypeRef::Unit,
                "" => TypeRef::Unknown,
                other => TypeRef::Named(other.to_string()),
            }
        }

        pub fn is_str(&self) -> bool {
            matches!(self, TypeRef::Str)
        }

        pub fn is_float(&self) -> bool {
            matches!(self, TypeRef::Float)
        }

        pub fn is_unknown(&self) -> bool {
            matches!(self, TypeRef::Unknown)
        }

        /// Display spelling used in diagnostics.
        pub fn spelling(&self) -> String {
            match self {
                TypeRef::Bool => "bool".to_string(),
                TypeRef::Int => "integer".to_string(),
                TypeRef::Float => "float".to_string(),
                TypeRef::Str => "&str".to_string(),
                TypeRef::Unit => "()".to_string(),
                TypeRef::Named(name) => name.clone(),
                TypeRef::Any => "_".to_string(),
                TypeRef::Unknown => "{unknown}".to_string(),
            }
        }
    }

    impl std::fmt::Display for TypeRef {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{}", self.spelling())
        }
    }
}
