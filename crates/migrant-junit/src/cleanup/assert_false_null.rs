//! `assertFalse(a == null)` to `assertNotNull(a)`.

use migrant_core::search::Applicability;
use migrant_core::tree::{BinaryOp, NodeId, NodeKind, Tree};
use migrant_core::visitor::{walk_children, Transformer, VisitCtx};
use migrant_core::Recipe;

use super::{AssertionReplacement, ASSERT_FALSE};
use crate::types::OBJECT;

/// Collapses `assertFalse` over a null equality into `assertNotNull`.
///
/// Only `==` with a `null` literal on at least one side qualifies. When the
/// right operand is `null` the left one is kept, otherwise the right one.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssertFalseNullToAssertNotNull;

impl Recipe for AssertFalseNullToAssertNotNull {
    fn name(&self) -> &'static str {
        "cleanup.assert-false-null-to-assert-not-null"
    }

    fn display_name(&self) -> &'static str {
        "Replace JUnit `assertFalse(a == null)` to `assertNotNull(a)`"
    }

    fn description(&self) -> &'static str {
        "Using `assertNotNull(a)` is simpler and more clear."
    }

    fn applicability(&self) -> Option<Applicability> {
        Some(Applicability::uses_method(ASSERT_FALSE))
    }

    fn visitor(&self) -> Box<dyn Transformer> {
        Box::new(NullCheckVisitor {
            replacement: AssertionReplacement::new(
                "assertNotNull",
                OBJECT,
                "assertNotNull(#{any(java.lang.Object)}#{anyArgs()})",
                "#{any()}.assertNotNull(#{any(java.lang.Object)}#{anyArgs()})",
            ),
        })
    }
}

fn is_null_literal(tree: &Tree, id: NodeId) -> bool {
    matches!(tree.kind(id), NodeKind::Literal { value } if value.is_null())
}

/// The operand to keep from `left == right`, if one side is `null`.
fn non_null_operand(tree: &Tree, comparison: NodeId) -> Option<NodeId> {
    let NodeKind::Binary {
        operator: BinaryOp::Equal,
        left,
        right,
    } = tree.kind(comparison)
    else {
        return None;
    };
    if is_null_literal(tree, *right) {
        Some(*left)
    } else if is_null_literal(tree, *left) {
        Some(*right)
    } else {
        None
    }
}

struct NullCheckVisitor {
    replacement: AssertionReplacement,
}

impl Transformer for NullCheckVisitor {
    fn visit_method_invocation(&mut self, cx: &mut VisitCtx<'_>, id: NodeId) -> NodeId {
        let id = walk_children(self, cx, id);
        if !ASSERT_FALSE.matches(cx.tree, id) {
            return id;
        }
        let NodeKind::MethodInvocation { arguments, .. } = cx.tree.kind(id) else {
            return id;
        };
        let Some(kept) = arguments
            .first()
            .and_then(|first| non_null_operand(cx.tree, *first))
        else {
            return id;
        };
        self.replacement.apply(cx, id, kept)
    }
}
