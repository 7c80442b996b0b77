//! `assertFalse(!E)` to `assertTrue(E)`.

use migrant_core::search::Applicability;
use migrant_core::tree::{NodeId, NodeKind, UnaryOp};
use migrant_core::visitor::{walk_children, Transformer, VisitCtx};
use migrant_core::Recipe;

use super::{AssertionReplacement, ASSERT_FALSE};

/// Collapses a negated `assertFalse` into `assertTrue`. Trailing arguments
/// such as a failure message are kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssertFalseNegationToAssertTrue;

impl Recipe for AssertFalseNegationToAssertTrue {
    fn name(&self) -> &'static str {
        "cleanup.assert-false-negation-to-assert-true"
    }

    fn display_name(&self) -> &'static str {
        "Replace JUnit `assertFalse(!<boolean>)` to `assertTrue(<boolean>)`"
    }

    fn description(&self) -> &'static str {
        "Using `assertTrue` is simpler and more clear."
    }

    fn applicability(&self) -> Option<Applicability> {
        Some(Applicability::uses_method(ASSERT_FALSE))
    }

    fn visitor(&self) -> Box<dyn Transformer> {
        Box::new(NegationVisitor {
            replacement: AssertionReplacement::new(
                "assertTrue",
                "boolean",
                "assertTrue(#{any(boolean)}#{anyArgs()})",
                "#{any()}.assertTrue(#{any(boolean)}#{anyArgs()})",
            ),
        })
    }
}

struct NegationVisitor {
    replacement: AssertionReplacement,
}

impl Transformer for NegationVisitor {
    fn visit_method_invocation(&mut self, cx: &mut VisitCtx<'_>, id: NodeId) -> NodeId {
        let id = walk_children(self, cx, id);
        if !ASSERT_FALSE.matches(cx.tree, id) {
            return id;
        }
        let NodeKind::MethodInvocation { arguments, .. } = cx.tree.kind(id) else {
            return id;
        };
        let Some(first) = arguments.first() else {
            return id;
        };
        let NodeKind::Unary {
            operator: UnaryOp::Not,
            operand,
        } = cx.tree.kind(*first)
        else {
            return id;
        };
        let operand = *operand;
        self.replacement.apply(cx, id, operand)
    }
}
