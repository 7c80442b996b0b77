//! End-to-end tests for the `assertFalse` cleanups.
//!
//! Units are built with `TreeBuilder`, run through `run_recipe` and compared
//! through the canonical printer. Behavioral equivalence is checked by
//! evaluating the assertion before and after the rewrite under every
//! valuation of its free variables.

mod support;

use std::collections::HashMap;

use migrant_core::matcher::MethodMatcher;
use migrant_core::template::{Template, TemplateArg, TemplateEngine, TemplateError};
use migrant_core::tree::{BinaryOp, LiteralValue, NodeId, NodeKind, Tree, UnaryOp};
use migrant_core::{run_recipe, Recipe, TreeBuilder};
use migrant_junit::types::ASSERTIONS;
use migrant_junit::{AssertFalseNegationToAssertTrue, AssertFalseNullToAssertNotNull};

use support::*;

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn negated_unqualified_call_swaps_static_import() {
    let source = unit_with_statements(
        |b| vec![b.static_import(ASSERTIONS, "assertFalse")],
        |b| {
            let call = local_call(b, "isValid", "boolean");
            let not = b.not(call);
            vec![assertion(b, None, "assertFalse", vec![not])]
        },
    );

    let outcome = run(&AssertFalseNegationToAssertTrue, source);

    assert!(outcome.changed);
    assert!(outcome.diagnostics.is_empty());
    assert_eq!(
        printed(&outcome),
        "package com.example;\n\
         \n\
         import static org.junit.jupiter.api.Assertions.assertTrue;\n\
         \n\
         class SampleTest {\n\
         \x20   void check() {\n\
         \x20       assertTrue(isValid());\n\
         \x20   }\n\
         }\n"
    );
}

#[test]
fn qualified_null_check_keeps_receiver_and_imports() {
    let source = unit_with_statements(
        |b| vec![b.import(ASSERTIONS)],
        |b| {
            let receiver = assertions_receiver(b);
            let x = object(b, "x");
            let null = b.null();
            let eq = b.binary(BinaryOp::Equal, x, null);
            vec![assertion(b, Some(receiver), "assertFalse", vec![eq])]
        },
    );

    let outcome = run(&AssertFalseNullToAssertNotNull, source);

    assert!(outcome.changed);
    assert_eq!(
        imports_of(&outcome.source),
        ["org.junit.jupiter.api.Assertions"]
    );
    assert!(printed(&outcome).contains("        Assertions.assertNotNull(x);\n"));
}

#[test]
fn null_on_the_left_keeps_right_operand() {
    let source = unit_with_statements(
        |b| vec![b.static_import(ASSERTIONS, "assertFalse")],
        |b| {
            let null = b.null();
            let call = local_call(b, "getName", "java.lang.String");
            let eq = b.binary(BinaryOp::Equal, null, call);
            vec![assertion(b, None, "assertFalse", vec![eq])]
        },
    );

    let outcome = run(&AssertFalseNullToAssertNotNull, source);

    assert!(printed(&outcome).contains("        assertNotNull(getName());\n"));
    assert_eq!(
        imports_of(&outcome.source),
        ["static org.junit.jupiter.api.Assertions.assertNotNull"]
    );
}

// ============================================================================
// Argument and import handling
// ============================================================================

#[test]
fn trailing_arguments_survive() {
    let source = unit_with_statements(
        |b| vec![b.static_import(ASSERTIONS, "assertFalse")],
        |b| {
            let x = object(b, "x");
            let null = b.null();
            let eq = b.binary(BinaryOp::Equal, x, null);
            let message = b.string("x must be set");
            vec![assertion(b, None, "assertFalse", vec![eq, message])]
        },
    );

    let outcome = run(&AssertFalseNullToAssertNotNull, source);

    let calls = invocations_named(&outcome.source, "assertNotNull");
    assert_eq!(calls.len(), 1);
    let NodeKind::MethodInvocation { arguments, .. } = outcome.source.tree.kind(calls[0]) else {
        panic!("expected an invocation");
    };
    assert_eq!(arguments.len(), 2);
    assert!(printed(&outcome).contains("assertNotNull(x, \"x must be set\");"));
}

#[test]
fn forwarded_message_keeps_the_two_argument_overload() {
    let source = unit_with_statements(
        |b| vec![b.static_import(ASSERTIONS, "assertFalse")],
        |b| {
            let a = boolean(b, "a");
            let not = b.not(a);
            let message = b.string("a must hold");
            let qualified_a = boolean(b, "a");
            let qualified_not = b.not(qualified_a);
            let receiver = assertions_receiver(b);
            vec![
                assertion(b, None, "assertFalse", vec![not, message]),
                assertion(b, Some(receiver), "assertFalse", vec![qualified_not]),
            ]
        },
    );

    let outcome = run(&AssertFalseNegationToAssertTrue, source);

    let calls = invocations_named(&outcome.source, "assertTrue");
    assert_eq!(calls.len(), 2);
    let tree = &outcome.source.tree;
    let with_message = MethodMatcher::parse(
        "org.junit.jupiter.api.Assertions assertTrue(boolean, java.lang.String)",
    )
    .unwrap();
    let plain = MethodMatcher::parse("org.junit.jupiter.api.Assertions assertTrue(boolean)").unwrap();

    let method = tree.ty(calls[0]).and_then(|ty| ty.as_method()).unwrap();
    assert_eq!(method.name, "assertTrue");
    assert_eq!(method.parameter_types, vec!["boolean", "java.lang.String"]);
    assert!(with_message.matches(tree, calls[0]));
    assert!(!plain.matches(tree, calls[0]));

    assert!(plain.matches(tree, calls[1]));
}

#[test]
fn static_import_kept_while_still_used() {
    let source = unit_with_statements(
        |b| vec![b.static_import(ASSERTIONS, "assertFalse")],
        |b| {
            let a = boolean(b, "a");
            let not = b.not(a);
            let first = assertion(b, None, "assertFalse", vec![not]);
            let c = boolean(b, "c");
            let second = assertion(b, None, "assertFalse", vec![c]);
            vec![first, second]
        },
    );

    let outcome = run(&AssertFalseNegationToAssertTrue, source);

    assert_eq!(
        imports_of(&outcome.source),
        [
            "static org.junit.jupiter.api.Assertions.assertFalse",
            "static org.junit.jupiter.api.Assertions.assertTrue",
        ]
    );
}

#[test]
fn wildcard_static_import_covers_replacement() {
    let source = unit_with_statements(
        |b| vec![b.static_import(ASSERTIONS, "*")],
        |b| {
            let a = boolean(b, "a");
            let not = b.not(a);
            vec![assertion(b, None, "assertFalse", vec![not])]
        },
    );

    let outcome = run(&AssertFalseNegationToAssertTrue, source);

    assert!(outcome.changed);
    assert_eq!(
        imports_of(&outcome.source),
        ["static org.junit.jupiter.api.Assertions.*"]
    );
}

#[test]
fn unrelated_assertions_untouched() {
    let source = unit_with_statements(
        |b| vec![b.static_import(ASSERTIONS, "assertFalse")],
        |b| {
            let x = object(b, "x");
            let null = b.null();
            let ne = b.binary(BinaryOp::NotEqual, x, null);
            let first = assertion(b, None, "assertFalse", vec![ne]);
            let y = object(b, "y");
            let z = object(b, "z");
            let eq = b.binary(BinaryOp::Equal, y, z);
            let second = assertion(b, None, "assertFalse", vec![eq]);
            let flag = boolean(b, "flag");
            let third = assertion(b, None, "assertFalse", vec![flag]);
            vec![first, second, third]
        },
    );
    let before = source.clone();

    let outcome = run(&AssertFalseNullToAssertNotNull, source);

    assert!(!outcome.changed);
    assert_eq!(outcome.source, before);
}

#[test]
fn recipes_are_idempotent() {
    let source = unit_with_statements(
        |b| vec![b.static_import(ASSERTIONS, "assertFalse")],
        |b| {
            let a = boolean(b, "a");
            let not = b.not(a);
            let first = assertion(b, None, "assertFalse", vec![not]);
            let x = object(b, "x");
            let null = b.null();
            let eq = b.binary(BinaryOp::Equal, x, null);
            let second = assertion(b, None, "assertFalse", vec![eq]);
            vec![first, second]
        },
    );

    let recipes: [&dyn Recipe; 2] = [
        &AssertFalseNegationToAssertTrue,
        &AssertFalseNullToAssertNotNull,
    ];
    let mut current = source;
    for recipe in recipes {
        let once = run(recipe, current);
        assert!(once.changed, "{} should rewrite", recipe.name());
        let twice = run(recipe, once.source.clone());
        assert!(!twice.changed, "{} is not idempotent", recipe.name());
        assert_eq!(printed(&once), printed(&twice));
        current = once.source;
    }
    assert!(imports_of(&current)
        .iter()
        .all(|import| !import.ends_with("assertFalse")));
}

// ============================================================================
// Behavioral equivalence
// ============================================================================

fn eval(tree: &Tree, id: NodeId, env: &HashMap<&str, bool>) -> bool {
    match tree.kind(id) {
        NodeKind::Identifier { name } => env[name.as_str()],
        NodeKind::Literal {
            value: LiteralValue::Boolean(value),
        } => *value,
        NodeKind::Unary {
            operator: UnaryOp::Not,
            operand,
        } => !eval(tree, *operand, env),
        NodeKind::Binary {
            operator,
            left,
            right,
        } => {
            let (l, r) = (eval(tree, *left, env), eval(tree, *right, env));
            match operator {
                BinaryOp::And => l && r,
                BinaryOp::Or => l || r,
                BinaryOp::Equal => l == r,
                BinaryOp::NotEqual => l != r,
                other => panic!("not a boolean operator: {:?}", other),
            }
        }
        other => panic!("cannot evaluate {:?}", other),
    }
}

/// Whether the assertion statement `call` passes under `env`.
fn passes(tree: &Tree, call: NodeId, env: &HashMap<&str, bool>) -> bool {
    let NodeKind::MethodInvocation {
        name, arguments, ..
    } = tree.kind(call)
    else {
        panic!("not an invocation");
    };
    let value = eval(tree, arguments[0], env);
    match name.as_str() {
        "assertTrue" => value,
        "assertFalse" => !value,
        other => panic!("unexpected assertion {}", other),
    }
}

/// `a`, `!a`, `a && c`, `a || !c`, `a == c`.
fn boolean_shapes(b: &mut TreeBuilder) -> Vec<NodeId> {
    let a = boolean(b, "a");
    let negated = {
        let a = boolean(b, "a");
        b.not(a)
    };
    let and = {
        let a = boolean(b, "a");
        let c = boolean(b, "c");
        b.binary(BinaryOp::And, a, c)
    };
    let or = {
        let a = boolean(b, "a");
        let c = boolean(b, "c");
        let not_c = b.not(c);
        b.binary(BinaryOp::Or, a, not_c)
    };
    let equal = {
        let a = boolean(b, "a");
        let c = boolean(b, "c");
        b.binary(BinaryOp::Equal, a, c)
    };
    vec![a, negated, and, or, equal]
}

#[test]
fn negation_rewrite_preserves_truth_table() {
    let source = unit_with_statements(
        |b| vec![b.static_import(ASSERTIONS, "assertFalse")],
        |b| {
            boolean_shapes(b)
                .into_iter()
                .map(|e| {
                    let not = b.not(e);
                    assertion(b, None, "assertFalse", vec![not])
                })
                .collect()
        },
    );
    let before = source.clone();

    let outcome = run(&AssertFalseNegationToAssertTrue, source);
    let after = &outcome.source;

    let old_calls = statements_of(&before, method_named(&before, "check").unwrap());
    let new_calls = statements_of(after, method_named(after, "check").unwrap());
    assert_eq!(old_calls.len(), new_calls.len());
    for (old, new) in old_calls.iter().zip(&new_calls) {
        assert!(matches!(
            after.tree.kind(*new),
            NodeKind::MethodInvocation { name, .. } if name == "assertTrue"
        ));
        for a in [false, true] {
            for c in [false, true] {
                let env = HashMap::from([("a", a), ("c", c)]);
                assert_eq!(
                    passes(&before.tree, *old, &env),
                    passes(&after.tree, *new, &env),
                    "a={} c={}",
                    a,
                    c
                );
            }
        }
    }
}

/// Nullness semantics: `x == null` with one literal side holds iff both
/// sides are null.
fn is_null(tree: &Tree, id: NodeId, nulls: &HashMap<&str, bool>) -> bool {
    match tree.kind(id) {
        NodeKind::Literal { value } => value.is_null(),
        NodeKind::Identifier { name } => nulls[name.as_str()],
        other => panic!("cannot evaluate {:?}", other),
    }
}

fn null_assertion_passes(tree: &Tree, call: NodeId, nulls: &HashMap<&str, bool>) -> bool {
    let NodeKind::MethodInvocation {
        name, arguments, ..
    } = tree.kind(call)
    else {
        panic!("not an invocation");
    };
    match (name.as_str(), tree.kind(arguments[0])) {
        ("assertFalse", NodeKind::Binary { left, right, .. }) => {
            !(is_null(tree, *left, nulls) && is_null(tree, *right, nulls))
        }
        ("assertNotNull", _) => !is_null(tree, arguments[0], nulls),
        (other, _) => panic!("unexpected assertion {}", other),
    }
}

#[test]
fn null_rewrite_preserves_outcome() {
    let source = unit_with_statements(
        |b| vec![b.static_import(ASSERTIONS, "assertFalse")],
        |b| {
            let x = object(b, "x");
            let null = b.null();
            let right = b.binary(BinaryOp::Equal, x, null);
            let first = assertion(b, None, "assertFalse", vec![right]);
            let null = b.null();
            let x = object(b, "x");
            let left = b.binary(BinaryOp::Equal, null, x);
            let second = assertion(b, None, "assertFalse", vec![left]);
            let null = b.null();
            let other = b.null();
            let both = b.binary(BinaryOp::Equal, null, other);
            let third = assertion(b, None, "assertFalse", vec![both]);
            vec![first, second, third]
        },
    );
    let before = source.clone();

    let outcome = run(&AssertFalseNullToAssertNotNull, source);
    let after = &outcome.source;

    let old_calls = statements_of(&before, method_named(&before, "check").unwrap());
    let new_calls = statements_of(after, method_named(after, "check").unwrap());
    assert_eq!(new_calls.len(), 3);
    for (old, new) in old_calls.iter().zip(&new_calls) {
        for x_is_null in [false, true] {
            let nulls = HashMap::from([("x", x_is_null)]);
            assert_eq!(
                null_assertion_passes(&before.tree, *old, &nulls),
                null_assertion_passes(&after.tree, *new, &nulls),
            );
        }
    }
    assert!(printed(&outcome).contains("        assertNotNull(null);\n"));
}

// ============================================================================
// Template failure
// ============================================================================

/// An engine whose snippet compiler never resolves anything.
struct UnresolvingEngine;

impl TemplateEngine for UnresolvingEngine {
    fn instantiate(
        &self,
        _tree: &mut Tree,
        template: &Template,
        _args: &[TemplateArg],
    ) -> Result<Vec<NodeId>, TemplateError> {
        Err(TemplateError::UnresolvedType {
            snippet: template.snippet().to_string(),
            type_name: ASSERTIONS.to_string(),
        })
    }
}

#[test]
fn template_failure_is_reported_per_occurrence() {
    let source = unit_with_statements(
        |b| vec![b.static_import(ASSERTIONS, "assertFalse")],
        |b| {
            let a = boolean(b, "a");
            let first = b.not(a);
            let c = boolean(b, "c");
            let second = b.not(c);
            vec![
                assertion(b, None, "assertFalse", vec![first]),
                assertion(b, None, "assertFalse", vec![second]),
            ]
        },
    );
    let before = source.clone();

    let outcome = run_recipe(&AssertFalseNegationToAssertTrue, source, &UnresolvingEngine);

    assert!(!outcome.changed);
    assert_eq!(outcome.source, before);
    assert_eq!(outcome.diagnostics.len(), 2);
    for diagnostic in &outcome.diagnostics {
        assert_eq!(
            diagnostic.recipe,
            "cleanup.assert-false-negation-to-assert-true"
        );
        assert!(diagnostic.message.contains("unresolvable type"));
    }
}

