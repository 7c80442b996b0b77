//! Assertion simplifications.

mod assert_false_negation;
mod assert_false_null;

pub use assert_false_negation::AssertFalseNegationToAssertTrue;
pub use assert_false_null::AssertFalseNullToAssertNotNull;

use migrant_core::matcher::MethodMatcher;
use migrant_core::template::{Coordinates, Template, TemplateArg};
use migrant_core::tree::{JavaType, MethodType, NodeId, NodeKind, Tree};
use migrant_core::visitor::VisitCtx;
use tracing::debug;

use crate::types::ASSERTIONS;

pub(crate) const ASSERT_FALSE: MethodMatcher = MethodMatcher::any_args(ASSERTIONS, "assertFalse");

/// The two spellings of a replacement `Assertions.<name>(first, rest..)`.
///
/// Unqualified calls rely on a static import, which the template requests
/// and the old one gives up. Qualified calls keep their receiver as written.
pub(crate) struct AssertionReplacement {
    name: &'static str,
    parameter_type: &'static str,
    unqualified: Template,
    qualified: Template,
}

impl AssertionReplacement {
    pub(crate) fn new(
        name: &'static str,
        parameter_type: &'static str,
        unqualified_snippet: &'static str,
        qualified_snippet: &'static str,
    ) -> Self {
        let method = || MethodType::new(ASSERTIONS, name, &[parameter_type], "void");
        let unqualified = Template::builder(unqualified_snippet)
            .static_import(ASSERTIONS, name)
            .depends_on(&[ASSERTIONS])
            .build(|b| {
                let first = b.placeholder(0);
                let rest = b.spread(1);
                vec![b.invoke(None, method(), vec![first, rest])]
            });
        let qualified = Template::builder(qualified_snippet)
            .depends_on(&[ASSERTIONS])
            .build(|b| {
                let select = b.placeholder(0);
                let first = b.placeholder(1);
                let rest = b.spread(2);
                vec![b.invoke(Some(select), method(), vec![first, rest])]
            });
        Self {
            name,
            parameter_type,
            unqualified,
            qualified,
        }
    }

    /// The matched `assertFalse` overload renamed, with its first parameter
    /// swapped, so trailing arguments keep their declared types.
    fn overload_of(&self, tree: &Tree, id: NodeId) -> Option<MethodType> {
        let matched = tree.ty(id)?.as_method()?;
        let mut method = matched.clone();
        method.name = self.name.to_string();
        match method.parameter_types.first_mut() {
            Some(first) => *first = self.parameter_type.to_string(),
            None => method.parameter_types.push(self.parameter_type.to_string()),
        }
        Some(method)
    }

    /// Replace invocation `id` by the new assertion with `first` as its first
    /// argument and the original trailing arguments after it.
    pub(crate) fn apply(&self, cx: &mut VisitCtx<'_>, id: NodeId, first: NodeId) -> NodeId {
        let NodeKind::MethodInvocation {
            select, arguments, ..
        } = cx.tree.kind(id).clone()
        else {
            return id;
        };
        let mut args = Vec::with_capacity(arguments.len() + 1);
        let template = match select {
            Some(select) => {
                args.push(TemplateArg::Node(select));
                &self.qualified
            }
            None => &self.unqualified,
        };
        args.push(TemplateArg::Node(first));
        args.extend(arguments.iter().skip(1).copied().map(TemplateArg::Node));

        match cx.try_apply_template(template, Coordinates::Replace(id), &args) {
            Some(replacement) => {
                let replacement = match self.overload_of(cx.tree, id) {
                    Some(method) => cx.tree.with_type(replacement, Some(JavaType::Method(method))),
                    None => replacement,
                };
                if select.is_none() {
                    cx.maybe_remove_import(ASSERTIONS, None);
                }
                debug!(uid = %cx.tree.uid(id), to = self.name, "rewrote assertFalse");
                replacement
            }
            None => id,
        }
    }
}
