//! Rewriting traversal over the node arena.
//!
//! A [`Transformer`] has one hook per node kind. Every hook receives the
//! current id and returns the id that should take its place; returning the
//! same id means "unchanged". The default hook walks the children and only
//! rebuilds the node when at least one child came back different, so
//! untouched subtrees keep their ids.
//!
//! # Traversal Order
//!
//! - [`visit`] pushes the node onto the cursor, runs the kind hook, then
//!   [`Transformer::post_visit`], then pops the cursor frame.
//! - Hooks decide when children are walked by calling [`walk_children`].
//!   Calling it first gives post-order rewriting, which is what every rule in
//!   this workspace does.
//! - Children are visited in source order.
//!
//! # Example
//!
//! ```
//! use migrant_core::tree::{NodeId, NodeKind};
//! use migrant_core::visitor::{walk_children, Transformer, VisitCtx};
//!
//! /// Renames every identifier `a` to `b`.
//! struct Rename;
//!
//! impl Transformer for Rename {
//!     fn visit_identifier(&mut self, cx: &mut VisitCtx<'_>, id: NodeId) -> NodeId {
//!         match cx.tree.kind(id) {
//!             NodeKind::Identifier { name } if name == "a" => cx
//!                 .tree
//!                 .with_kind(id, NodeKind::Identifier { name: "b".to_string() }),
//!             _ => walk_children(self, cx, id),
//!         }
//!     }
//! }
//! ```

use serde::Serialize;
use tracing::warn;

use crate::cursor::Cursor;
use crate::ledger::ImportLedger;
use crate::pipeline::PassQueue;
use crate::template::{Coordinates, Template, TemplateArg, TemplateEngine, TemplateError};
use crate::tree::{NodeId, NodeTag, Tree, Uid};

/// A problem found while rewriting one occurrence. The occurrence is left as
/// it was.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub recipe: String,
    pub uid: Uid,
    pub message: String,
}

/// Everything a hook may touch besides its own state.
pub struct VisitCtx<'a> {
    pub tree: &'a mut Tree,
    pub cursor: Cursor,
    ledger: &'a mut ImportLedger,
    queue: &'a mut PassQueue,
    engine: &'a dyn TemplateEngine,
    diagnostics: &'a mut Vec<Diagnostic>,
    recipe: &'a str,
}

impl<'a> VisitCtx<'a> {
    pub fn new(
        tree: &'a mut Tree,
        ledger: &'a mut ImportLedger,
        queue: &'a mut PassQueue,
        engine: &'a dyn TemplateEngine,
        diagnostics: &'a mut Vec<Diagnostic>,
        recipe: &'a str,
    ) -> Self {
        Self {
            tree,
            cursor: Cursor::new(),
            ledger,
            queue,
            engine,
            diagnostics,
            recipe,
        }
    }

    pub fn recipe(&self) -> &str {
        self.recipe
    }

    /// Queue a pass that runs over the whole unit after the current pass and
    /// every pass queued before it.
    pub fn do_after_visit(&mut self, pass: Box<dyn Transformer>) {
        self.queue.push(pass);
    }

    pub fn maybe_add_import(&mut self, type_name: &str, member: Option<&str>) {
        self.ledger.add(type_name, member);
    }

    pub fn maybe_remove_import(&mut self, type_name: &str, member: Option<&str>) {
        self.ledger.remove(type_name, member);
    }

    pub fn ledger(&self) -> &ImportLedger {
        self.ledger
    }

    /// Post `value` under `key` on the innermost enclosing class frame.
    pub fn put_message_on_enclosing_class(&mut self, key: &'static str, value: NodeId) -> bool {
        match self.cursor.enclosing(self.tree, NodeTag::ClassDeclaration) {
            Some(class) => self.cursor.put_message(class, key, value),
            None => false,
        }
    }

    /// Take the message posted to the node being visited.
    pub fn poll_message(&mut self, key: &'static str) -> Option<NodeId> {
        self.cursor.poll_message(key)
    }

    /// Record a per-occurrence failure against `id`.
    pub fn report(&mut self, id: NodeId, message: impl Into<String>) {
        let diagnostic = Diagnostic {
            recipe: self.recipe.to_string(),
            uid: self.tree.uid(id),
            message: message.into(),
        };
        warn!(recipe = %diagnostic.recipe, uid = %diagnostic.uid, "{}", diagnostic.message);
        self.diagnostics.push(diagnostic);
    }

    /// Instantiate `template` and splice it at `coordinates`. On success the
    /// template's import requirements are registered with the ledger.
    pub fn apply_template(
        &mut self,
        template: &Template,
        coordinates: Coordinates,
        args: &[TemplateArg],
    ) -> Result<NodeId, TemplateError> {
        let nodes = self.engine.instantiate(self.tree, template, args)?;
        let spliced = coordinates.splice(self.tree, nodes)?;
        for type_name in template.imports() {
            self.ledger.add(type_name, None);
        }
        for (type_name, member) in template.static_imports() {
            self.ledger.add(type_name, Some(member));
        }
        Ok(spliced)
    }

    /// Like [`apply_template`](Self::apply_template), but a failure is
    /// reported and the owner comes back unchanged.
    pub fn try_apply_template(
        &mut self,
        template: &Template,
        coordinates: Coordinates,
        args: &[TemplateArg],
    ) -> Option<NodeId> {
        match self.apply_template(template, coordinates, args) {
            Ok(id) => Some(id),
            Err(err) => {
                self.report(coordinates.owner(), err.to_string());
                None
            }
        }
    }
}

/// Generates the per-kind hooks of [`Transformer`].
macro_rules! transformer_hooks {
    (
        $(
            $base_name:ident : $kind:ident
        ),* $(,)?
    ) => {
        paste::paste! {
            $(
                #[doc = concat!("Rewrite a `", stringify!($kind), "` node.")]
                #[doc = ""]
                #[doc = "Defaults to walking the children."]
                fn [<visit_ $base_name>](&mut self, cx: &mut VisitCtx<'_>, id: NodeId) -> NodeId {
                    walk_children(self, cx, id)
                }
            )*
        }
    };
}

/// A rewriting pass. Implementors override the hooks for the kinds they care
/// about; everything else is walked.
pub trait Transformer {
    transformer_hooks! {
        compilation_unit: CompilationUnit,
        import: Import,
        class_declaration: ClassDeclaration,
        method_declaration: MethodDeclaration,
        variable_declarations: VariableDeclarations,
        named_variable: NamedVariable,
        block: Block,
        if_statement: If,
        return_statement: Return,
        assignment: Assignment,
        method_invocation: MethodInvocation,
        field_access: FieldAccess,
        identifier: Identifier,
        type_ref: TypeRef,
        parameterized_type: ParameterizedType,
        unary: Unary,
        binary: Binary,
        literal: Literal,
        new_class: NewClass,
        annotation: Annotation,
        placeholder: Placeholder,
    }

    /// Runs after the kind hook with the id it returned, for every node.
    #[allow(unused_variables)]
    fn post_visit(&mut self, cx: &mut VisitCtx<'_>, id: NodeId) -> NodeId {
        id
    }
}

/// Visit `id` with `v`, returning the id that replaces it.
pub fn visit<V: Transformer + ?Sized>(v: &mut V, cx: &mut VisitCtx<'_>, id: NodeId) -> NodeId {
    cx.cursor.push(id);
    let out = match cx.tree.tag(id) {
        NodeTag::CompilationUnit => v.visit_compilation_unit(cx, id),
        NodeTag::Import => v.visit_import(cx, id),
        NodeTag::ClassDeclaration => v.visit_class_declaration(cx, id),
        NodeTag::MethodDeclaration => v.visit_method_declaration(cx, id),
        NodeTag::VariableDeclarations => v.visit_variable_declarations(cx, id),
        NodeTag::NamedVariable => v.visit_named_variable(cx, id),
        NodeTag::Block => v.visit_block(cx, id),
        NodeTag::If => v.visit_if_statement(cx, id),
        NodeTag::Return => v.visit_return_statement(cx, id),
        NodeTag::Assignment => v.visit_assignment(cx, id),
        NodeTag::MethodInvocation => v.visit_method_invocation(cx, id),
        NodeTag::FieldAccess => v.visit_field_access(cx, id),
        NodeTag::Identifier => v.visit_identifier(cx, id),
        NodeTag::TypeRef => v.visit_type_ref(cx, id),
        NodeTag::ParameterizedType => v.visit_parameterized_type(cx, id),
        NodeTag::Unary => v.visit_unary(cx, id),
        NodeTag::Binary => v.visit_binary(cx, id),
        NodeTag::Literal => v.visit_literal(cx, id),
        NodeTag::NewClass => v.visit_new_class(cx, id),
        NodeTag::Annotation => v.visit_annotation(cx, id),
        NodeTag::Placeholder => v.visit_placeholder(cx, id),
    };
    let out = v.post_visit(cx, out);
    cx.cursor.pop();
    out
}

/// Visit every child of `id` and rebuild it if any child changed.
pub fn walk_children<V: Transformer + ?Sized>(
    v: &mut V,
    cx: &mut VisitCtx<'_>,
    id: NodeId,
) -> NodeId {
    let kind = cx.tree.kind(id).clone();
    let mut changed = false;
    let rebuilt = kind.map_children(&mut |child| {
        let out = visit(v, cx, child);
        changed |= out != child;
        out
    });
    if changed {
        cx.tree.with_kind(id, rebuilt)
    } else {
        id
    }
}
