// Copyright (C) Brian G. Milnes 2025

//! Rewrite rules: pure configuration over the engine core
//!
//! A rule is a signature pattern, a conditional template selector, and an
//! import delta (static imports the templates introduce, the owner whose
//! imports become removable). The bundled catalog migrates `legacy_assert`
//! free-function asserts to `fluent_assert` chains:
//!
//! ```text
//! assert_false(x)            ->  assert_that(x).is_false()
//! assert_eq(a, b, "msg")     ->  assert_that(a).described_as("msg").is_equal_to(b)
//! assert_eq(a, b, 0.2)       ->  assert_that(a).is_close_to(b, within(0.2))
//! ```

pub mod rules {
    use anyhow::Result;

    use crate::resolver::resolver::{Capture, MethodCatalog, MethodSig};
    use crate::signature::signature::SignaturePattern;
    use crate::types::types::TypeRef;

    /// A predicate over the matched call's captures, used to pick among
    /// alternative template texts.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum ArgTest {
        Count(usize),
        CountAtLeast(usize),
        IsStr(usize),
        IsFloat(usize),
    }

    impl ArgTest {
        fn passes(&self, captures: &[Capture]) -> bool {
            match self {
                ArgTest::Count(n) => captures.len() == *n,
                ArgTest::CountAtLeast(n) => captures.len() >= *n,
                ArgTest::IsStr(i) => captures.get(*i).is_some_and(|c| c.ty.is_str()),
                ArgTest::IsFloat(i) => captures.get(*i).is_some_and(|c| c.ty.is_float()),
            }
        }
    }

    /// One template alternative: guards, template text, which captures feed
    /// the placeholders (in placeholder order), and the static imports this
    /// shape introduces.
    #[derive(Debug, Clone)]
    pub struct TemplateChoice {
        pub tests: Vec<ArgTest>,
        pub template: String,
        pub capture_order: Vec<usize>,
        pub static_imports: Vec<String>,
    }

    /// Ordered alternatives; the first whose guards all pass wins.
    #[derive(Debug, Clone, Default)]
    pub struct TemplateSelector {
        pub choices: Vec<TemplateChoice>,
    }

    impl TemplateSelector {
        pub fn select(&self, captures: &[Capture]) -> Option<&TemplateChoice> {
            self.choices
                .iter()
                .find(|choice| choice.tests.iter().all(|t| t.passes(captures)))
        }
    }

    /// One rewrite rule. Constructed once, reused across all files.
    #[derive(Debug, Clone)]
    pub struct Rule {
        pub id: String,
        pub display_name: String,
        pub description: String,
        pub pattern: SignaturePattern,
        pub selector: TemplateSelector,
        /// Owner whose imports may be removed once its calls are gone.
        pub removable_import: String,
    }

    const ASSERT_THAT: &str = "fluent_assert::assert_that";
    const WITHIN: &str = "fluent_assert::within";

    fn choice(tests: &[ArgTest], template: &str, order: &[usize], imports: &[&str]) -> TemplateChoice {
        TemplateChoice {
            tests: tests.to_vec(),
            template: template.to_string(),
            capture_order: order.to_vec(),
            static_imports: imports.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// The plain / string-message / provider-message triple every simple
    /// assert rule shares.
    fn message_variants(slot: &str, check: &str) -> Vec<TemplateChoice> {
        vec![
            choice(
                &[ArgTest::Count(1)],
                &format!("assert_that(#{{any({slot})}}).{check}()"),
                &[0],
                &[ASSERT_THAT],
            ),
            choice(
                &[ArgTest::Count(2), ArgTest::IsStr(1)],
                &format!("assert_that(#{{any({slot})}}).described_as(#{{any(&str)}}).{check}()"),
                &[0, 1],
                &[ASSERT_THAT],
            ),
            choice(
                &[ArgTest::Count(2)],
                &format!("assert_that(#{{any({slot})}}).described_as(#{{any}}).{check}()"),
                &[0, 1],
                &[ASSERT_THAT],
            ),
        ]
    }

    fn simple_rule(id: &str, method: &str, slot: &str, check: &str) -> Result<Rule> {
        Ok(Rule {
            id: id.to_string(),
            display_name: format!("`{method}` to fluent assertion"),
            description: format!(
                "Convert `legacy_assert::{method}` to `assert_that(..).{check}()`."
            ),
            pattern: SignaturePattern::parse(&format!("legacy_assert {method}({slot}, ..)"))?,
            selector: TemplateSelector {
                choices: message_variants(slot, check),
            },
            removable_import: "legacy_assert".to_string(),
        })
    }

    fn assert_eq_rule() -> Result<Rule> {
        let choices = vec![
            choice(
                &[ArgTest::Count(2)],
                "assert_that(#{any}).is_equal_to(#{any})",
                &[0, 1],
                &[ASSERT_THAT],
            ),
            // Closeness shape: a float actual with a float delta argument.
            choice(
                &[ArgTest::Count(3), ArgTest::IsFloat(0), ArgTest::IsFloat(2)],
                "assert_that(#{any(f64)}).is_close_to(#{any(f64)}, within(#{any(f64)}))",
                &[0, 1, 2],
                &[ASSERT_THAT, WITHIN],
            ),
            choice(
                &[ArgTest::Count(3), ArgTest::IsStr(2)],
                "assert_that(#{any}).described_as(#{any(&str)}).is_equal_to(#{any})",
                &[0, 2, 1],
                &[ASSERT_THAT],
            ),
            choice(
                &[ArgTest::Count(3)],
                "assert_that(#{any}).described_as(#{any}).is_equal_to(#{any})",
                &[0, 2, 1],
                &[ASSERT_THAT],
            ),
            choice(
                &[ArgTest::Count(4), ArgTest::IsStr(3)],
                "assert_that(#{any(f64)}).described_as(#{any(&str)}).is_close_to(#{any(f64)}, within(#{any(f64)}))",
                &[0, 3, 1, 2],
                &[ASSERT_THAT, WITHIN],
            ),
            choice(
                &[ArgTest::Count(4)],
                "assert_that(#{any(f64)}).described_as(#{any}).is_close_to(#{any(f64)}, within(#{any(f64)}))",
                &[0, 3, 1, 2],
                &[ASSERT_THAT, WITHIN],
            ),
        ];
        Ok(Rule {
            id: "assert-eq-to-assert-that".to_string(),
            display_name: "`assert_eq` to fluent assertion".to_string(),
            description: "Convert `legacy_assert::assert_eq` to `assert_that(..).is_equal_to(..)`, \
                          or `is_close_to(.., within(..))` when a float delta is given."
                .to_string(),
            pattern: SignaturePattern::parse("legacy_assert assert_eq(_, _, ..)")?,
            selector: TemplateSelector { choices },
            removable_import: "legacy_assert".to_string(),
        })
    }

    /// The bundled migration rules.
    pub fn default_rules() -> Result<Vec<Rule>> {
        Ok(vec![
            simple_rule("assert-true-to-assert-that", "assert_true", "bool", "is_true")?,
            simple_rule("assert-false-to-assert-that", "assert_false", "bool", "is_false")?,
            simple_rule("assert-null-to-assert-that", "assert_null", "_", "is_null")?,
            simple_rule(
                "assert-not-null-to-assert-that",
                "assert_not_null",
                "_",
                "is_not_null",
            )?,
            assert_eq_rule()?,
        ])
    }

    /// Signatures resolution can target when running the bundled rules:
    /// the legacy assert surface plus the fluent replacement entry points.
    pub fn default_catalog() -> MethodCatalog {
        let mut catalog = MethodCatalog::new();
        let b = TypeRef::Bool;
        let any = TypeRef::Any;
        let f = TypeRef::Float;

        for method in ["assert_true", "assert_false"] {
            catalog.add(MethodSig::new("legacy_assert", method, &[b.clone()], TypeRef::Unit));
            catalog.add(MethodSig::new(
                "legacy_assert",
                method,
                &[b.clone(), any.clone()],
                TypeRef::Unit,
            ));
        }
        for method in ["assert_null", "assert_not_null"] {
            catalog.add(MethodSig::new("legacy_assert", method, &[any.clone()], TypeRef::Unit));
            catalog.add(MethodSig::new(
                "legacy_assert",
                method,
                &[any.clone(), any.clone()],
                TypeRef::Unit,
            ));
        }
        catalog.add(MethodSig::new(
            "legacy_assert",
            "assert_eq",
            &[any.clone(), any.clone()],
            TypeRef::Unit,
        ));
        catalog.add(MethodSig::new(
            "legacy_assert",
            "assert_eq",
            &[any.clone(), any.clone(), any.clone()],
            TypeRef::Unit,
        ));
        catalog.add(MethodSig::new(
            "legacy_assert",
            "assert_eq",
            &[any.clone(), any.clone(), any.clone(), any.clone()],
            TypeRef::Unit,
        ));

        catalog.add(MethodSig::new(
            "fluent_assert",
            "assert_that",
            &[any.clone()],
            TypeRef::Named("Assertion".to_string()),
        ));
        catalog.add(MethodSig::new(
            "fluent_assert",
            "within",
            &[f],
            TypeRef::Named("Offset".to_string()),
        ));
        catalog
    }
}
