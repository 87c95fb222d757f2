// Copyright (C) Brian G. Milnes 2025

//! Tests for template compilation, binding, and the shared cache

use restitch::parser::parser::parse_expr_fragment;
use restitch::{Capture, CompiledTemplate, RewriteError, TemplateCache, TypeRef};

fn capture(text: &str, ty: TypeRef) -> Capture {
    Capture {
        node: parse_expr_fragment(text).unwrap(),
        ty,
    }
}

#[test]
fn test_compile_counts_placeholders() {
    let template =
        CompiledTemplate::compile("assert_that(#{any(bool)}).is_false()", &[]).unwrap();
    assert_eq!(template.placeholder_count(), 1);

    let template = CompiledTemplate::compile(
        "assert_that(#{any}).described_as(#{any(&str)}).is_true()",
        &[],
    )
    .unwrap();
    assert_eq!(template.placeholder_count(), 2);
}

#[test]
fn test_compile_rejects_bad_syntax() {
    let err = CompiledTemplate::compile("assert_that(#{any}.is_false(", &[]).unwrap_err();
    assert!(matches!(err, RewriteError::TemplateSyntax(_)));

    let err = CompiledTemplate::compile("assert_that(#{any", &[]).unwrap_err();
    assert!(matches!(err, RewriteError::TemplateSyntax(_)));

    let err = CompiledTemplate::compile("assert_that(#{first})", &[]).unwrap_err();
    assert!(matches!(err, RewriteError::TemplateSyntax(_)));
}

#[test]
fn test_bind_substitutes_captures_verbatim() {
    let template =
        CompiledTemplate::compile("assert_that(#{any(bool)}).is_false()", &[]).unwrap();
    let bound = template
        .bind(&[capture("flags[0] /* first */", TypeRef::Bool)])
        .unwrap();
    // Capture text goes in untouched, comment included.
    assert_eq!(bound.text, "assert_that(flags[0] /* first */).is_false()");
}

#[test]
fn test_bind_checks_arity() {
    let template =
        CompiledTemplate::compile("assert_that(#{any}).is_equal_to(#{any})", &[]).unwrap();
    let err = template.bind(&[capture("x", TypeRef::Int)]).unwrap_err();
    assert!(matches!(
        err,
        RewriteError::PlaceholderArity {
            expected: 2,
            actual: 1
        }
    ));
}

#[test]
fn test_bind_checks_constrained_placeholder_types() {
    let template =
        CompiledTemplate::compile("assert_that(#{any(bool)}).is_false()", &[]).unwrap();
    let err = template.bind(&[capture("1", TypeRef::Int)]).unwrap_err();
    assert!(matches!(err, RewriteError::PlaceholderType { index: 0, .. }));

    // Unconstrained placeholders accept anything.
    let template = CompiledTemplate::compile("assert_that(#{any}).is_null()", &[]).unwrap();
    assert!(template.bind(&[capture("1", TypeRef::Int)]).is_ok());
}

#[test]
fn test_cache_compiles_once_per_key() {
    let cache = TemplateCache::new();
    let imports = vec!["fluent_assert::assert_that".to_string()];

    let first = cache
        .get_or_compile("assert_that(#{any}).is_null()", &imports)
        .unwrap();
    let second = cache
        .get_or_compile("assert_that(#{any}).is_null()", &imports)
        .unwrap();
    assert!(std::sync::Arc::ptr_eq(&first, &second));
    assert_eq!(cache.len(), 1);

    // Different imports are a different key even with the same text.
    cache
        .get_or_compile("assert_that(#{any}).is_null()", &[])
        .unwrap();
    assert_eq!(cache.len(), 2);
}
