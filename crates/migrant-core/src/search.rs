//! Whole-unit applicability filters.

use crate::matcher::MethodMatcher;
use crate::tree::{NodeId, NodeKind, Tree};

/// Cheap pre-check deciding whether a recipe's traversal runs on a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applicability {
    /// Some node's type attribution or some import mentions the type.
    UsesType(String),
    /// Some invocation matches the method.
    UsesMethod(MethodMatcher),
}

impl Applicability {
    pub fn uses_type(fqn: impl Into<String>) -> Self {
        Applicability::UsesType(fqn.into())
    }

    pub fn uses_method(matcher: MethodMatcher) -> Self {
        Applicability::UsesMethod(matcher)
    }

    pub fn test(&self, tree: &Tree, root: NodeId) -> bool {
        let nodes = tree.descendants(root);
        match self {
            Applicability::UsesType(fqn) => nodes.iter().any(|id| {
                let imported = matches!(
                    tree.kind(*id),
                    NodeKind::Import { type_name, .. } if type_name == fqn
                );
                imported || tree.ty(*id).is_some_and(|ty| ty.mentions(fqn))
            }),
            Applicability::UsesMethod(matcher) => nodes.iter().any(|id| matcher.matches(tree, *id)),
        }
    }
}
