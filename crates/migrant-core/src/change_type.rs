//! Retarget every reference to one type onto another.

use tracing::debug;

use crate::tree::{simple_name, JavaType, NodeId, NodeKind};
use crate::visitor::{walk_children, Transformer, VisitCtx};

/// Rewrites type references and type attribution from `old` to `new`.
///
/// Spelled type references are renamed (a qualified spelling stays
/// qualified), and any attribution that mentions `old` (including method
/// signatures and type arguments) is rewritten. Imports are reconciled
/// through the ledger at the end of the unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeType {
    old: String,
    new: String,
}

impl ChangeType {
    pub fn new(old: impl Into<String>, new: impl Into<String>) -> Self {
        Self {
            old: old.into(),
            new: new.into(),
        }
    }

    fn spelled(&self, current: &str) -> String {
        if current.contains('.') {
            self.new.clone()
        } else {
            simple_name(&self.new).to_string()
        }
    }

    /// Rename a type-valued name node (`TestName` or `org.junit.rules.TestName`).
    fn rename(&self, cx: &mut VisitCtx<'_>, id: NodeId) -> NodeId {
        let old_type = Some(JavaType::class(self.old.as_str()));
        if cx.tree.ty(id) != old_type.as_ref() {
            return id;
        }
        let kind = match cx.tree.kind(id) {
            NodeKind::TypeRef { name } => NodeKind::TypeRef {
                name: self.spelled(name),
            },
            // Only an identifier spelled as the type itself is a type reference.
            NodeKind::Identifier { name }
                if name == simple_name(&self.old) || *name == self.old =>
            {
                NodeKind::Identifier {
                    name: self.spelled(name),
                }
            }
            _ => return id,
        };
        let renamed = cx.tree.with_kind(id, kind);
        cx.tree
            .with_type(renamed, Some(JavaType::class(self.new.as_str())))
    }
}

impl Transformer for ChangeType {
    fn visit_compilation_unit(&mut self, cx: &mut VisitCtx<'_>, id: NodeId) -> NodeId {
        let out = walk_children(self, cx, id);
        if out != id {
            debug!(old = %self.old, new = %self.new, "changed type");
        }
        cx.maybe_remove_import(&self.old, None);
        cx.maybe_add_import(&self.new, None);
        out
    }

    fn visit_import(&mut self, _cx: &mut VisitCtx<'_>, id: NodeId) -> NodeId {
        id
    }

    fn visit_type_ref(&mut self, cx: &mut VisitCtx<'_>, id: NodeId) -> NodeId {
        self.rename(cx, id)
    }

    fn visit_identifier(&mut self, cx: &mut VisitCtx<'_>, id: NodeId) -> NodeId {
        self.rename(cx, id)
    }

    fn post_visit(&mut self, cx: &mut VisitCtx<'_>, id: NodeId) -> NodeId {
        match cx.tree.ty(id).and_then(|ty| ty.replace_class(&self.old, &self.new)) {
            Some(ty) => cx.tree.with_type(id, Some(ty)),
            None => id,
        }
    }
}
