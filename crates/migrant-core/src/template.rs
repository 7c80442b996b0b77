//! Snippet templates and their instantiation into a tree.
//!
//! A [`Template`] pairs the snippet text it stands for (used in diagnostics
//! and previews) with a pre-built, attributed tree containing
//! [`Placeholder`](crate::tree::NodeKind::Placeholder) holes. The
//! [`TemplateEngine`] trait is the seam where a real snippet compiler plugs
//! in; [`ArenaTemplateEngine`] instantiates the pre-built trees directly.
//!
//! Instantiation deep-copies the template nodes into the target arena with
//! fresh identities. Arguments are spliced in by id, so an argument subtree is
//! shared with the tree it came from rather than copied.
//!
//! ```
//! use migrant_core::template::{ArenaTemplateEngine, Template, TemplateArg, TemplateEngine};
//! use migrant_core::tree::{MethodType, TreeBuilder};
//!
//! let template = Template::builder("assertTrue(#{any(boolean)})")
//!     .static_import("org.junit.jupiter.api.Assertions", "assertTrue")
//!     .depends_on(&["org.junit.jupiter.api.Assertions"])
//!     .build(|b| {
//!         let hole = b.placeholder(0);
//!         let method = MethodType::new(
//!             "org.junit.jupiter.api.Assertions",
//!             "assertTrue",
//!             &["boolean"],
//!             "void",
//!         );
//!         vec![b.invoke(None, method, vec![hole])]
//!     });
//!
//! let mut b = TreeBuilder::new();
//! let flag = b.boolean(true);
//! let mut tree = b.into_tree();
//! let roots = ArenaTemplateEngine::default()
//!     .instantiate(&mut tree, &template, &[TemplateArg::Node(flag)])
//!     .unwrap();
//! assert_eq!(tree.children_of(roots[0]), vec![flag]);
//! ```

use std::collections::BTreeSet;

use thiserror::Error;

use crate::tree::{NodeId, NodeKind, Space, Tree, TreeBuilder};

// ============================================================================
// Errors
// ============================================================================

/// Failure to produce or splice a template instance. Always local to one
/// occurrence: the caller leaves that occurrence unchanged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("template `{snippet}` requires unresolvable type {type_name}")]
    UnresolvedType { snippet: String, type_name: String },

    #[error("template `{snippet}` has no argument for hole {index}")]
    MissingArgument { snippet: String, index: usize },

    #[error("template `{snippet}` takes {expected} arguments, got {actual}")]
    UnexpectedArguments {
        snippet: String,
        expected: usize,
        actual: usize,
    },

    #[error("template `{snippet}` produced no nodes")]
    EmptyTemplate { snippet: String },

    #[error("template `{snippet}` has a spread hole {index} outside an argument list")]
    MisplacedSpread { snippet: String, index: usize },

    #[error("cannot splice into {target}: {reason}")]
    InvalidCoordinates { target: NodeId, reason: &'static str },
}

// ============================================================================
// Templates
// ============================================================================

/// A pre-built snippet with holes.
#[derive(Debug, Clone)]
pub struct Template {
    snippet: &'static str,
    tree: Tree,
    roots: Vec<NodeId>,
    imports: Vec<String>,
    static_imports: Vec<(String, String)>,
    depends_on: Vec<String>,
    required_args: usize,
    spread: bool,
}

/// Builder returned by [`Template::builder`].
#[derive(Debug)]
pub struct TemplateBuilder {
    snippet: &'static str,
    imports: Vec<String>,
    static_imports: Vec<(String, String)>,
    depends_on: Vec<String>,
}

impl TemplateBuilder {
    /// Types the generated code refers to by simple name.
    pub fn imports(mut self, types: &[&str]) -> Self {
        self.imports.extend(types.iter().map(|t| t.to_string()));
        self
    }

    pub fn static_import(mut self, type_name: &str, member: &str) -> Self {
        self.static_imports
            .push((type_name.to_string(), member.to_string()));
        self
    }

    /// Types the snippet compiler can resolve beyond the engine's classpath.
    pub fn depends_on(mut self, types: &[&str]) -> Self {
        self.depends_on.extend(types.iter().map(|t| t.to_string()));
        self
    }

    /// Describe the generated shape. The closure returns the template roots.
    pub fn build(self, shape: impl FnOnce(&mut TreeBuilder) -> Vec<NodeId>) -> Template {
        let mut b = TreeBuilder::new();
        let roots = shape(&mut b);
        let tree = b.into_tree();

        let mut required_args = 0;
        let mut spread = false;
        for root in &roots {
            for id in tree.descendants(*root) {
                if let NodeKind::Placeholder {
                    index,
                    spread: is_spread,
                } = tree.kind(id)
                {
                    if *is_spread {
                        spread = true;
                        required_args = required_args.max(*index);
                    } else {
                        required_args = required_args.max(index + 1);
                    }
                }
            }
        }

        Template {
            snippet: self.snippet,
            tree,
            roots,
            imports: self.imports,
            static_imports: self.static_imports,
            depends_on: self.depends_on,
            required_args,
            spread,
        }
    }
}

impl Template {
    pub fn builder(snippet: &'static str) -> TemplateBuilder {
        TemplateBuilder {
            snippet,
            imports: Vec::new(),
            static_imports: Vec::new(),
            depends_on: Vec::new(),
        }
    }

    pub fn snippet(&self) -> &'static str {
        self.snippet
    }

    pub fn imports(&self) -> &[String] {
        &self.imports
    }

    pub fn static_imports(&self) -> &[(String, String)] {
        &self.static_imports
    }

    pub fn depends_on(&self) -> &[String] {
        &self.depends_on
    }

    /// Number of positional holes that must be filled.
    pub fn required_args(&self) -> usize {
        self.required_args
    }

    pub fn has_spread(&self) -> bool {
        self.spread
    }

    /// Every type that must resolve for the snippet to compile.
    pub fn required_types(&self) -> impl Iterator<Item = &str> {
        self.imports
            .iter()
            .map(String::as_str)
            .chain(self.static_imports.iter().map(|(t, _)| t.as_str()))
    }
}

/// Value bound to a template hole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateArg {
    /// An existing node of the target tree, spliced by id.
    Node(NodeId),
    /// A bare name; becomes an untyped identifier.
    Name(String),
}

// ============================================================================
// Engines
// ============================================================================

/// Produces fresh nodes in `tree` from a template and its arguments.
pub trait TemplateEngine {
    fn instantiate(
        &self,
        tree: &mut Tree,
        template: &Template,
        args: &[TemplateArg],
    ) -> Result<Vec<NodeId>, TemplateError>;
}

/// Set of fully-qualified types the engine can resolve.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classpath(BTreeSet<String>);

impl Classpath {
    pub fn new<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(types.into_iter().map(Into::into).collect())
    }

    /// JDK types always resolve.
    pub fn resolves(&self, fqn: &str) -> bool {
        fqn.starts_with("java.") || self.0.contains(fqn)
    }

    pub fn extend<I, S>(&mut self, types: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0.extend(types.into_iter().map(Into::into));
    }
}

/// Instantiates pre-built template trees.
#[derive(Debug, Clone, Default)]
pub struct ArenaTemplateEngine {
    classpath: Classpath,
}

impl ArenaTemplateEngine {
    pub fn new(classpath: Classpath) -> Self {
        Self { classpath }
    }

    pub fn classpath(&self) -> &Classpath {
        &self.classpath
    }
}

impl TemplateEngine for ArenaTemplateEngine {
    fn instantiate(
        &self,
        tree: &mut Tree,
        template: &Template,
        args: &[TemplateArg],
    ) -> Result<Vec<NodeId>, TemplateError> {
        let snippet = template.snippet;
        if template.roots.is_empty() {
            return Err(TemplateError::EmptyTemplate {
                snippet: snippet.to_string(),
            });
        }
        for type_name in template.required_types() {
            let declared = template.depends_on.iter().any(|d| d == type_name);
            if !declared && !self.classpath.resolves(type_name) {
                return Err(TemplateError::UnresolvedType {
                    snippet: snippet.to_string(),
                    type_name: type_name.to_string(),
                });
            }
        }
        if args.len() < template.required_args {
            return Err(TemplateError::MissingArgument {
                snippet: snippet.to_string(),
                index: args.len(),
            });
        }
        if args.len() > template.required_args && !template.spread {
            return Err(TemplateError::UnexpectedArguments {
                snippet: snippet.to_string(),
                expected: template.required_args,
                actual: args.len(),
            });
        }

        let mut copier = Copier {
            source: &template.tree,
            target: tree,
            args,
            snippet,
        };
        template
            .roots
            .iter()
            .map(|root| copier.copy(*root))
            .collect()
    }
}

struct Copier<'a> {
    source: &'a Tree,
    target: &'a mut Tree,
    args: &'a [TemplateArg],
    snippet: &'static str,
}

impl Copier<'_> {
    fn bind(&mut self, index: usize) -> Result<NodeId, TemplateError> {
        match self.args.get(index) {
            Some(TemplateArg::Node(id)) => Ok(*id),
            Some(TemplateArg::Name(name)) => Ok(self.target.alloc(
                NodeKind::Identifier { name: name.clone() },
                None,
            )),
            None => Err(TemplateError::MissingArgument {
                snippet: self.snippet.to_string(),
                index,
            }),
        }
    }

    /// Copy a list, expanding spread holes in place.
    fn copy_list(&mut self, ids: &[NodeId]) -> Result<Vec<NodeId>, TemplateError> {
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            match self.source.kind(*id) {
                NodeKind::Placeholder {
                    index,
                    spread: true,
                } => {
                    for i in *index..self.args.len() {
                        out.push(self.bind(i)?);
                    }
                }
                _ => out.push(self.copy(*id)?),
            }
        }
        Ok(out)
    }

    fn copy(&mut self, id: NodeId) -> Result<NodeId, TemplateError> {
        let kind = match self.source.kind(id) {
            NodeKind::Placeholder {
                index,
                spread: false,
            } => return self.bind(*index),
            NodeKind::Placeholder {
                index,
                spread: true,
            } => {
                return Err(TemplateError::MisplacedSpread {
                    snippet: self.snippet.to_string(),
                    index: *index,
                })
            }
            NodeKind::MethodInvocation {
                select,
                name,
                arguments,
            } => NodeKind::MethodInvocation {
                select: select.map(|s| self.copy(s)).transpose()?,
                name: name.clone(),
                arguments: self.copy_list(arguments)?,
            },
            NodeKind::NewClass { class, arguments } => NodeKind::NewClass {
                class: self.copy(*class)?,
                arguments: self.copy_list(arguments)?,
            },
            NodeKind::Block { statements } => NodeKind::Block {
                statements: self.copy_list(statements)?,
            },
            NodeKind::MethodDeclaration {
                annotations,
                modifiers,
                return_type,
                name,
                parameters,
                body,
            } => NodeKind::MethodDeclaration {
                annotations: self.copy_list(annotations)?,
                modifiers: modifiers.clone(),
                return_type: return_type.map(|r| self.copy(r)).transpose()?,
                name: name.clone(),
                parameters: self.copy_list(parameters)?,
                body: body.map(|b| self.copy(b)).transpose()?,
            },
            other => {
                let mut failure = None;
                let kind = other.map_children(&mut |child| match self.copy(child) {
                    Ok(copied) => copied,
                    Err(err) => {
                        failure.get_or_insert(err);
                        child
                    }
                });
                if let Some(err) = failure {
                    return Err(err);
                }
                kind
            }
        };
        let node = self.source.node(id);
        Ok(self
            .target
            .alloc_with_prefix(node.prefix.clone(), kind, node.ty.clone()))
    }
}

// ============================================================================
// Splicing
// ============================================================================

/// Where instantiated nodes go, relative to an owner node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coordinates {
    /// Replace the owner with the single instantiated node. The replacement
    /// takes over the owner's prefix.
    Replace(NodeId),
    /// Append to the body of a class, a method or a block.
    BodyLastStatement(NodeId),
    /// Replace a method's parameter list.
    ReplaceParameters(NodeId),
}

impl Coordinates {
    pub fn owner(self) -> NodeId {
        match self {
            Coordinates::Replace(id)
            | Coordinates::BodyLastStatement(id)
            | Coordinates::ReplaceParameters(id) => id,
        }
    }

    /// Splice `nodes` into `tree`. Returns the node that replaces the owner.
    pub fn splice(self, tree: &mut Tree, nodes: Vec<NodeId>) -> Result<NodeId, TemplateError> {
        match self {
            Coordinates::Replace(owner) => {
                let [replacement] = nodes.as_slice() else {
                    return Err(TemplateError::InvalidCoordinates {
                        target: owner,
                        reason: "replacement must be exactly one node",
                    });
                };
                let prefix: Space = tree.prefix(owner).clone();
                Ok(tree.with_prefix(*replacement, prefix))
            }
            Coordinates::BodyLastStatement(owner) => {
                let body = body_of(tree, owner).ok_or(TemplateError::InvalidCoordinates {
                    target: owner,
                    reason: "owner has no body",
                })?;
                let NodeKind::Block { statements } = tree.kind(body) else {
                    return Err(TemplateError::InvalidCoordinates {
                        target: owner,
                        reason: "body is not a block",
                    });
                };
                let mut statements = statements.clone();
                statements.extend(nodes);
                let new_body = tree.with_kind(body, NodeKind::Block { statements });
                Ok(replace_body(tree, owner, body, new_body))
            }
            Coordinates::ReplaceParameters(owner) => {
                let NodeKind::MethodDeclaration {
                    annotations,
                    modifiers,
                    return_type,
                    name,
                    body,
                    ..
                } = tree.kind(owner).clone()
                else {
                    return Err(TemplateError::InvalidCoordinates {
                        target: owner,
                        reason: "owner is not a method",
                    });
                };
                Ok(tree.with_kind(
                    owner,
                    NodeKind::MethodDeclaration {
                        annotations,
                        modifiers,
                        return_type,
                        name,
                        parameters: nodes,
                        body,
                    },
                ))
            }
        }
    }
}

/// Body block of a class or method, or the block itself.
pub fn body_of(tree: &Tree, owner: NodeId) -> Option<NodeId> {
    match tree.kind(owner) {
        NodeKind::ClassDeclaration { body, .. } => Some(*body),
        NodeKind::MethodDeclaration { body, .. } => *body,
        NodeKind::Block { .. } => Some(owner),
        _ => None,
    }
}

/// Rebuild `owner` with `old_body` swapped for `new_body`.
pub fn replace_body(tree: &mut Tree, owner: NodeId, old_body: NodeId, new_body: NodeId) -> NodeId {
    if owner == old_body {
        return new_body;
    }
    let kind = tree
        .kind(owner)
        .map_children(&mut |child| if child == old_body { new_body } else { child });
    tree.with_kind(owner, kind)
}
