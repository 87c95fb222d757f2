// Copyright (C) Brian G. Milnes 2025

//! Tests for lossless parsing and expression-fragment probing

use restitch::parser::parser::parse_expr_fragment;
use restitch::{ParsedFile, RewriteError};

#[test]
fn test_render_is_lossless() {
    let source = "// leading comment\nfn main() {\n    let x  =  1; // trailing\n}\n";
    let file = ParsedFile::parse(source).unwrap();
    assert_eq!(file.text(), source);
    assert_eq!(file.render(), source);
}

#[test]
fn test_broken_source_is_a_parse_error() {
    let result = ParsedFile::parse("fn main( {");
    assert!(matches!(result, Err(RewriteError::Parse(_))));
}

#[test]
fn test_expr_fragment_probe() {
    let node = parse_expr_fragment("assert_that(flag).is_false()").unwrap();
    assert_eq!(node.text().to_string(), "assert_that(flag).is_false()");
}

#[test]
fn test_statement_fragment_is_rejected() {
    // Probing embeds the fragment in expression position, so an item or
    // statement does not parse there.
    assert!(parse_expr_fragment("let x = 1;").is_err());
    assert!(parse_expr_fragment("][").is_err());
}
