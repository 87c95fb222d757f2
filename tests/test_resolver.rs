// Copyright (C) Brian G. Milnes 2025

//! Tests for import-table building and catalog-backed type resolution

use ra_ap_syntax::{ast, ast::AstNode, SyntaxKind};
use restitch::{
    default_catalog, FileResolver, ImportTable, MethodCatalog, MethodSig, ParsedFile,
    TypeRef, TypeResolution,
};

fn first_call(file: &ParsedFile) -> ast::CallExpr {
    file.syntax()
        .descendants()
        .find(|n| n.kind() == SyntaxKind::CALL_EXPR)
        .and_then(ast::CallExpr::cast)
        .unwrap()
}

#[test]
fn test_import_table_bindings() {
    let file = ParsedFile::parse(
        "use legacy_assert::assert_false;\nuse legacy_assert::{assert_true, assert_eq as eq};\nuse fluent_assert::*;\n",
    )
    .unwrap();
    let table = ImportTable::build(&file);

    assert_eq!(table.lookup("assert_false"), Some("legacy_assert::assert_false"));
    assert_eq!(table.lookup("assert_true"), Some("legacy_assert::assert_true"));
    assert_eq!(table.lookup("eq"), Some("legacy_assert::assert_eq"));
    assert_eq!(table.lookup("assert_eq"), None);
    assert_eq!(table.star_modules().to_vec(), vec!["fluent_assert".to_string()]);

    assert!(table.covers("legacy_assert::assert_false"));
    assert!(table.covers("fluent_assert::assert_that"));
    assert!(!table.covers("other::thing"));
}

#[test]
fn test_resolves_imported_call_and_param_types() {
    let file = ParsedFile::parse(
        "use legacy_assert::assert_false;\n\nfn check(flag: bool) {\n    assert_false(flag);\n}\n",
    )
    .unwrap();
    let catalog = default_catalog();
    let resolver = FileResolver::new(&file, &catalog);

    let resolved = resolver.resolve_call(&first_call(&file)).unwrap();
    assert_eq!(resolved.sig.owner, "legacy_assert");
    assert_eq!(resolved.sig.name, "assert_false");
    assert_eq!(resolved.args.len(), 1);
    assert_eq!(resolved.args[0].ty, TypeRef::Bool);
    assert_eq!(resolved.args[0].text(), "flag");
}

#[test]
fn test_resolves_qualified_and_star_imported_calls() {
    let qualified = ParsedFile::parse(
        "fn check(flag: bool) {\n    legacy_assert::assert_true(flag);\n}\n",
    )
    .unwrap();
    let catalog = default_catalog();
    let resolver = FileResolver::new(&qualified, &catalog);
    let resolved = resolver.resolve_call(&first_call(&qualified)).unwrap();
    assert_eq!(resolved.sig.qualified_name(), "legacy_assert::assert_true");

    let starred = ParsedFile::parse(
        "use legacy_assert::*;\n\nfn check(flag: bool) {\n    assert_true(flag);\n}\n",
    )
    .unwrap();
    let resolver = FileResolver::new(&starred, &catalog);
    let resolved = resolver.resolve_call(&first_call(&starred)).unwrap();
    assert_eq!(resolved.sig.qualified_name(), "legacy_assert::assert_true");
}

#[test]
fn test_unresolvable_argument_fails_closed() {
    let file = ParsedFile::parse(
        "use legacy_assert::assert_false;\n\nfn check() {\n    assert_false(mystery);\n}\n",
    )
    .unwrap();
    let catalog = default_catalog();
    let resolver = FileResolver::new(&file, &catalog);
    assert!(resolver.resolve_call(&first_call(&file)).is_err());
}

#[test]
fn test_unknown_callee_fails_closed() {
    let file = ParsedFile::parse("fn check(flag: bool) {\n    assert_false(flag);\n}\n").unwrap();
    let catalog = default_catalog();
    let resolver = FileResolver::new(&file, &catalog);
    // No import binds the name and no star module exports it.
    assert!(resolver.resolve_call(&first_call(&file)).is_err());
}

#[test]
fn test_let_binding_types_with_shadowing() {
    let file = ParsedFile::parse(
        "use legacy_assert::assert_null;\n\nfn check() {\n    let v = 1;\n    let v = \"text\";\n    assert_null(v);\n}\n",
    )
    .unwrap();
    let catalog = default_catalog();
    let resolver = FileResolver::new(&file, &catalog);
    let resolved = resolver.resolve_call(&first_call(&file)).unwrap();
    // The later binding shadows the earlier one.
    assert_eq!(resolved.args[0].ty, TypeRef::Str);
}

#[test]
fn test_literal_and_expression_typing() {
    let source = "use legacy_assert::assert_eq;\n\nfn check(a: f64) {\n    assert_eq(a, 0.5, 0.1_f64);\n}\n";
    let file = ParsedFile::parse(source).unwrap();
    let catalog = default_catalog();
    let resolver = FileResolver::new(&file, &catalog);
    let resolved = resolver.resolve_call(&first_call(&file)).unwrap();
    let types: Vec<TypeRef> = resolved.args.iter().map(|c| c.ty.clone()).collect();
    assert_eq!(types, vec![TypeRef::Float, TypeRef::Float, TypeRef::Float]);
}

#[test]
fn test_catalog_return_types_flow_through_nested_calls() {
    let mut catalog = MethodCatalog::new();
    catalog.add(MethodSig::new("sensors", "reading", &[], TypeRef::Float));
    catalog.add(MethodSig::new(
        "legacy_assert",
        "assert_null",
        &[TypeRef::Any],
        TypeRef::Unit,
    ));
    let file = ParsedFile::parse(
        "use legacy_assert::assert_null;\nuse sensors::reading;\n\nfn check() {\n    assert_null(reading());\n}\n",
    )
    .unwrap();
    let resolver = FileResolver::new(&file, &catalog);
    let resolved = resolver.resolve_call(&first_call(&file)).unwrap();
    assert_eq!(resolved.sig.name, "assert_null");
    assert_eq!(resolved.args[0].ty, TypeRef::Float);
}

#[test]
fn test_overloads_select_by_arity_never_cross_match() {
    let catalog = default_catalog();
    let one = ParsedFile::parse(
        "use legacy_assert::assert_true;\n\nfn check(flag: bool) {\n    assert_true(flag);\n}\n",
    )
    .unwrap();
    let resolver = FileResolver::new(&one, &catalog);
    let resolved = resolver.resolve_call(&first_call(&one)).unwrap();
    assert_eq!(resolved.sig.params.len(), 1);

    let two = ParsedFile::parse(
        "use legacy_assert::assert_true;\n\nfn check(flag: bool) {\n    assert_true(flag, \"why\");\n}\n",
    )
    .unwrap();
    let resolver = FileResolver::new(&two, &catalog);
    let resolved = resolver.resolve_call(&first_call(&two)).unwrap();
    assert_eq!(resolved.sig.params.len(), 2);
}
