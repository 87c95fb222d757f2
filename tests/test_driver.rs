// Copyright (C) Brian G. Milnes 2025

//! End-to-end tests for the rewrite driver with the bundled rules

use restitch::{rewrite_source, Outcome, RewriteEngine};

fn rewritten_text(outcome: &Outcome) -> &str {
    match outcome {
        Outcome::Rewritten { text, .. } => text,
        other => panic!("expected a rewrite, got {other:?}"),
    }
}

#[test]
fn test_plain_assert_rewrites_and_swaps_imports() {
    let input = "use legacy_assert::assert_false;\n\nfn check(flag: bool) {\n    assert_false(flag);\n}\n";
    let outcome = rewrite_source(input).unwrap();
    assert_eq!(
        rewritten_text(&outcome),
        "use fluent_assert::assert_that;\n\nfn check(flag: bool) {\n    assert_that(flag).is_false();\n}\n"
    );
    match &outcome {
        Outcome::Rewritten { applied_rules, diagnostics, .. } => {
            assert_eq!(applied_rules, &["assert-false-to-assert-that".to_string()]);
            assert!(diagnostics.is_empty());
        }
        _ => unreachable!(),
    }
}

#[test]
fn test_message_argument_becomes_described_as() {
    let input = "use legacy_assert::assert_true;\n\nfn check(flag: bool) {\n    assert_true(flag, \"should be set\");\n}\n";
    let outcome = rewrite_source(input).unwrap();
    assert_eq!(
        rewritten_text(&outcome),
        "use fluent_assert::assert_that;\n\nfn check(flag: bool) {\n    assert_that(flag).described_as(\"should be set\").is_true();\n}\n"
    );
}

#[test]
fn test_float_delta_becomes_is_close_to_with_both_imports() {
    let input = "use legacy_assert::assert_eq;\n\nfn check() {\n    let actual = 0.1;\n    assert_eq(actual, 0.0, 0.2);\n}\n";
    let outcome = rewrite_source(input).unwrap();
    assert_eq!(
        rewritten_text(&outcome),
        "use fluent_assert::assert_that;\nuse fluent_assert::within;\n\nfn check() {\n    let actual = 0.1;\n    assert_that(actual).is_close_to(0.0, within(0.2));\n}\n"
    );
}

#[test]
fn test_rewrite_is_idempotent() {
    let input = "use legacy_assert::assert_false;\n\nfn check(flag: bool) {\n    assert_false(flag);\n}\n";
    let first = rewrite_source(input).unwrap();
    let second = rewrite_source(rewritten_text(&first)).unwrap();
    assert!(matches!(second, Outcome::Unchanged { .. }));
}

#[test]
fn test_two_matches_share_one_import_edit() {
    let input = "use legacy_assert::assert_false;\n\nfn check(a: bool, b: bool) {\n    assert_false(a);\n    assert_false(b);\n}\n";
    let outcome = rewrite_source(input).unwrap();
    let text = rewritten_text(&outcome);
    assert_eq!(text.matches("use fluent_assert::assert_that;").count(), 1);
    assert_eq!(text.matches("assert_that(").count(), 2);
    assert!(!text.contains("legacy_assert"));
}

#[test]
fn test_rules_compose_across_one_file() {
    let input = "use legacy_assert::{assert_false, assert_true};\n\nfn check(a: bool, b: bool) {\n    assert_true(a);\n    assert_false(b);\n}\n";
    let outcome = rewrite_source(input).unwrap();
    assert_eq!(
        rewritten_text(&outcome),
        "use fluent_assert::assert_that;\n\nfn check(a: bool, b: bool) {\n    assert_that(a).is_true();\n    assert_that(b).is_false();\n}\n"
    );
    match &outcome {
        Outcome::Rewritten { applied_rules, .. } => {
            assert_eq!(
                applied_rules,
                &[
                    "assert-true-to-assert-that".to_string(),
                    "assert-false-to-assert-that".to_string(),
                ]
            );
        }
        _ => unreachable!(),
    }
}

#[test]
fn test_typed_locals_resolve_across_successive_splices() {
    // One rule pass splices twice, so argument types must resolve correctly
    // both within a revision and after the tree is rebuilt.
    let input = "use legacy_assert::{assert_eq, assert_true};\n\nfn check(flag: bool) {\n    let actual = 0.5;\n    assert_true(flag);\n    assert_eq(actual, 0.25, 0.5);\n    assert_true(!flag);\n}\n";
    let outcome = rewrite_source(input).unwrap();
    assert_eq!(
        rewritten_text(&outcome),
        "use fluent_assert::assert_that;\nuse fluent_assert::within;\n\nfn check(flag: bool) {\n    let actual = 0.5;\n    assert_that(flag).is_true();\n    assert_that(actual).is_close_to(0.25, within(0.5));\n    assert_that(!flag).is_true();\n}\n"
    );
}

#[test]
fn test_untouched_lines_stay_byte_identical() {
    let input = "use legacy_assert::assert_false;\n\n// tracker for the flag   (odd   spacing)\nfn check(flag: bool) {\n    let  keep_me   =  1;\n    assert_false(flag);\n    let _ = keep_me;\n}\n";
    let outcome = rewrite_source(input).unwrap();
    let text = rewritten_text(&outcome);
    for line in [
        "// tracker for the flag   (odd   spacing)",
        "fn check(flag: bool) {",
        "    let  keep_me   =  1;",
        "    let _ = keep_me;",
    ] {
        assert!(text.contains(line), "missing untouched line: {line}");
    }
}

#[test]
fn test_star_imported_legacy_calls_rewrite() {
    let input = "use legacy_assert::*;\n\nfn check(flag: bool) {\n    assert_true(flag);\n}\n";
    let outcome = rewrite_source(input).unwrap();
    assert_eq!(
        rewritten_text(&outcome),
        "use fluent_assert::assert_that;\n\nfn check(flag: bool) {\n    assert_that(flag).is_true();\n}\n"
    );
}

#[test]
fn test_unresolvable_argument_leaves_file_untouched() {
    let input = "use legacy_assert::assert_true;\n\nfn check() {\n    assert_true(mystery());\n}\n";
    let outcome = rewrite_source(input).unwrap();
    assert!(matches!(outcome, Outcome::Unchanged { .. }));
}

#[test]
fn test_same_named_local_function_is_not_rewritten() {
    let input = "fn assert_true(_flag: bool) {}\n\nfn check() {\n    assert_true(true);\n}\n";
    let outcome = rewrite_source(input).unwrap();
    assert!(matches!(outcome, Outcome::Unchanged { .. }));
    assert!(outcome.diagnostics().is_empty());
}

#[test]
fn test_constraint_violation_is_reported_not_applied() {
    // Arity four selects a closeness variant, but the actual is an integer,
    // so binding refuses and the call is left alone with a diagnostic.
    let input = "use legacy_assert::assert_eq;\n\nfn check() {\n    assert_eq(1, 2, \"ctx\", \"msg\");\n}\n";
    let outcome = rewrite_source(input).unwrap();
    assert!(matches!(outcome, Outcome::Unchanged { .. }));
    let diags = outcome.diagnostics();
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].rule_id, "assert-eq-to-assert-that");
    assert_eq!(diags[0].line, 4);
}

#[test]
fn test_trailing_comment_in_argument_survives() {
    let input = "use legacy_assert::assert_false;\n\nfn check(flag: bool) {\n    assert_false(flag /* why */);\n}\n";
    let outcome = rewrite_source(input).unwrap();
    assert!(rewritten_text(&outcome).contains("assert_that(flag /* why */).is_false();"));
}

#[test]
fn test_diagnostic_line_at_column_zero() {
    let input = "use legacy_assert::assert_eq;\nfn check() {\nassert_eq(1, 2, \"ctx\", \"msg\");\n}\n";
    let outcome = rewrite_source(input).unwrap();
    let diags = outcome.diagnostics();
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].line, 3);
}

#[test]
fn test_captures_keep_interior_formatting() {
    let input = "use legacy_assert::assert_false;\n\nfn check(flags: &[bool]) {\n    assert_false(flags[0] /* first */ == true);\n}\n";
    let outcome = rewrite_source(input).unwrap();
    assert!(rewritten_text(&outcome)
        .contains("assert_that(flags[0] /* first */ == true).is_false();"));
}

#[test]
fn test_equality_without_delta() {
    let input = "use legacy_assert::assert_eq;\n\nfn check(actual: i32, expected: i32) {\n    assert_eq(actual, expected);\n}\n";
    let outcome = rewrite_source(input).unwrap();
    assert_eq!(
        rewritten_text(&outcome),
        "use fluent_assert::assert_that;\n\nfn check(actual: i32, expected: i32) {\n    assert_that(actual).is_equal_to(expected);\n}\n"
    );
}

#[test]
fn test_engine_reuse_across_sources() {
    let engine = RewriteEngine::with_default_rules().unwrap();
    let a = engine.rewrite_source(
        "use legacy_assert::assert_null;\n\nfn check(v: Option<i32>) {\n    assert_null(v);\n}\n",
    );
    assert!(rewritten_text(&a).contains("assert_that(v).is_null();"));
    let b = engine.rewrite_source(
        "use legacy_assert::assert_not_null;\n\nfn check(v: Option<i32>) {\n    assert_not_null(v, \"present\");\n}\n",
    );
    assert!(rewritten_text(&b)
        .contains("assert_that(v).described_as(\"present\").is_not_null();"));
}
