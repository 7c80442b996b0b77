//! Arena-backed node model for Java-like compilation units.
//!
//! A [`Tree`] owns every node ever allocated for one compilation unit. Nodes
//! are immutable once allocated: a rewrite allocates a fresh slot holding the
//! new shape and hands back its [`NodeId`]. Untouched subtrees are shared by
//! reference, so a rewritten parent simply points at the same child ids as
//! before.
//!
//! # Identity
//!
//! Two ids describe a node:
//!
//! - [`NodeId`] is the arena slot. It changes every time a node is rebuilt.
//! - [`Uid`] is the logical identity. [`Tree::with_kind`], [`Tree::with_prefix`]
//!   and [`Tree::with_type`] keep it, so a method found in one pass can be
//!   located again in a later pass even after its children were rewritten.
//!
//! # Invariant
//!
//! Every child id is strictly smaller than its parent id. The builder, the
//! rewrite helpers and template instantiation all allocate children first,
//! which keeps the arena acyclic. [`SourceFile::validate`] checks this for
//! trees that arrive from outside.

pub mod build;
pub mod print;

pub use build::TreeBuilder;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Identifiers
// ============================================================================

/// Arena slot of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u32);

impl NodeId {
    /// The raw arena index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Stable identity of a node across rewrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Uid(u64);

impl Uid {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Uid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "u{}", self.0)
    }
}

// ============================================================================
// Formatting metadata
// ============================================================================

/// Source formatting that precedes a node: whitespace and leading comments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Space {
    #[serde(default)]
    pub whitespace: String,
    /// Comment lines, verbatim (including `//` or `/* */`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<String>,
}

impl Space {
    pub const fn empty() -> Self {
        Self {
            whitespace: String::new(),
            comments: Vec::new(),
        }
    }

    pub fn format(whitespace: impl Into<String>) -> Self {
        Self {
            whitespace: whitespace.into(),
            comments: Vec::new(),
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comments.push(comment.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.whitespace.is_empty() && self.comments.is_empty()
    }
}

// ============================================================================
// Type attribution
// ============================================================================

/// Resolved type attached to a node by the external type attribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JavaType {
    /// A class, interface or annotation type.
    Class { fqn: String },
    /// A generic type with its type arguments.
    Parameterized { fqn: String, parameters: Vec<JavaType> },
    Primitive { name: String },
    /// The resolved overload of an invocation or declaration.
    Method(MethodType),
}

/// Signature of a resolved method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodType {
    pub declaring_type: String,
    pub name: String,
    #[serde(default)]
    pub parameter_types: Vec<String>,
    #[serde(default = "void_type")]
    pub return_type: String,
}

fn void_type() -> String {
    "void".to_string()
}

impl MethodType {
    pub fn new(
        declaring_type: impl Into<String>,
        name: impl Into<String>,
        parameter_types: &[&str],
        return_type: impl Into<String>,
    ) -> Self {
        Self {
            declaring_type: declaring_type.into(),
            name: name.into(),
            parameter_types: parameter_types.iter().map(|p| p.to_string()).collect(),
            return_type: return_type.into(),
        }
    }

    fn mentions(&self, fqn: &str) -> bool {
        self.declaring_type == fqn
            || self.return_type == fqn
            || self.parameter_types.iter().any(|p| p == fqn)
    }

    fn replace_class(&self, old: &str, new: &str) -> Self {
        let swap = |name: &String| {
            if name == old {
                new.to_string()
            } else {
                name.clone()
            }
        };
        Self {
            declaring_type: swap(&self.declaring_type),
            name: self.name.clone(),
            parameter_types: self.parameter_types.iter().map(swap).collect(),
            return_type: swap(&self.return_type),
        }
    }
}

impl JavaType {
    pub fn class(fqn: impl Into<String>) -> Self {
        JavaType::Class { fqn: fqn.into() }
    }

    pub fn primitive(name: impl Into<String>) -> Self {
        JavaType::Primitive { name: name.into() }
    }

    pub fn parameterized(fqn: impl Into<String>, parameters: Vec<JavaType>) -> Self {
        JavaType::Parameterized {
            fqn: fqn.into(),
            parameters,
        }
    }

    /// Fully-qualified name for class-like types.
    pub fn fully_qualified_name(&self) -> Option<&str> {
        match self {
            JavaType::Class { fqn } | JavaType::Parameterized { fqn, .. } => Some(fqn),
            JavaType::Primitive { .. } | JavaType::Method(_) => None,
        }
    }

    pub fn as_method(&self) -> Option<&MethodType> {
        match self {
            JavaType::Method(method) => Some(method),
            _ => None,
        }
    }

    /// True if `fqn` appears anywhere in this type.
    pub fn mentions(&self, fqn: &str) -> bool {
        match self {
            JavaType::Class { fqn: own } => own == fqn,
            JavaType::Parameterized {
                fqn: own,
                parameters,
            } => own == fqn || parameters.iter().any(|p| p.mentions(fqn)),
            JavaType::Primitive { .. } => false,
            JavaType::Method(method) => method.mentions(fqn),
        }
    }

    /// Returns a copy with every occurrence of `old` replaced by `new`, or
    /// `None` when `old` does not occur.
    pub fn replace_class(&self, old: &str, new: &str) -> Option<JavaType> {
        if !self.mentions(old) {
            return None;
        }
        Some(match self {
            JavaType::Class { .. } => JavaType::class(new),
            JavaType::Parameterized { fqn, parameters } => JavaType::Parameterized {
                fqn: if fqn == old { new.to_string() } else { fqn.clone() },
                parameters: parameters
                    .iter()
                    .map(|p| p.replace_class(old, new).unwrap_or_else(|| p.clone()))
                    .collect(),
            },
            JavaType::Primitive { .. } => self.clone(),
            JavaType::Method(method) => JavaType::Method(method.replace_class(old, new)),
        })
    }
}

/// Simple name of a fully-qualified name (`java.util.Optional` -> `Optional`).
pub fn simple_name(fqn: &str) -> &str {
    fqn.rsplit('.').next().unwrap_or(fqn)
}

/// Package of a fully-qualified name, empty for the default package.
pub fn package_of(fqn: &str) -> &str {
    fqn.rfind('.').map(|i| &fqn[..i]).unwrap_or("")
}

// ============================================================================
// Operators and literals
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOp {
    Not,
    Negative,
    Positive,
    Complement,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::Negative => "-",
            UnaryOp::Positive => "+",
            UnaryOp::Complement => "~",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    And,
    Or,
    Addition,
    Subtraction,
    Multiplication,
    Division,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::LessThan => "<",
            BinaryOp::LessThanOrEqual => "<=",
            BinaryOp::GreaterThan => ">",
            BinaryOp::GreaterThanOrEqual => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::Addition => "+",
            BinaryOp::Subtraction => "-",
            BinaryOp::Multiplication => "*",
            BinaryOp::Division => "/",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum LiteralValue {
    Null,
    Boolean(bool),
    Int(i64),
    String(String),
}

impl LiteralValue {
    pub fn is_null(&self) -> bool {
        matches!(self, LiteralValue::Null)
    }
}

// ============================================================================
// Node kinds
// ============================================================================

/// The closed set of node shapes.
///
/// Fields that hold [`NodeId`]s are children; everything else is payload.
/// Adding a variant forces every exhaustive match in this crate
/// ([`NodeKind::map_children`], [`NodeKind::tag`], the visitor dispatch and
/// the printer) to handle it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum NodeKind {
    CompilationUnit {
        #[serde(default)]
        package: Option<String>,
        imports: Vec<NodeId>,
        classes: Vec<NodeId>,
    },
    /// `import a.b.C;`, `import static a.b.C.m;`, `import static a.b.C.*;`
    Import {
        type_name: String,
        #[serde(default)]
        member: Option<String>,
        #[serde(default)]
        is_static: bool,
    },
    ClassDeclaration {
        annotations: Vec<NodeId>,
        modifiers: Vec<String>,
        name: String,
        body: NodeId,
    },
    MethodDeclaration {
        annotations: Vec<NodeId>,
        modifiers: Vec<String>,
        return_type: Option<NodeId>,
        name: String,
        parameters: Vec<NodeId>,
        body: Option<NodeId>,
    },
    /// Fields, locals and parameters.
    VariableDeclarations {
        annotations: Vec<NodeId>,
        modifiers: Vec<String>,
        type_expr: Option<NodeId>,
        variables: Vec<NodeId>,
    },
    NamedVariable {
        name: String,
        initializer: Option<NodeId>,
    },
    Block {
        statements: Vec<NodeId>,
    },
    If {
        condition: NodeId,
        then_part: NodeId,
        else_part: Option<NodeId>,
    },
    Return {
        expression: Option<NodeId>,
    },
    Assignment {
        target: NodeId,
        value: NodeId,
    },
    MethodInvocation {
        select: Option<NodeId>,
        name: String,
        arguments: Vec<NodeId>,
    },
    FieldAccess {
        target: NodeId,
        name: NodeId,
    },
    Identifier {
        name: String,
    },
    /// A type in source position, simple (`TestName`) or qualified.
    TypeRef {
        name: String,
    },
    ParameterizedType {
        base: NodeId,
        parameters: Vec<NodeId>,
    },
    Unary {
        operator: UnaryOp,
        operand: NodeId,
    },
    Binary {
        operator: BinaryOp,
        left: NodeId,
        right: NodeId,
    },
    Literal {
        value: LiteralValue,
    },
    NewClass {
        class: NodeId,
        arguments: Vec<NodeId>,
    },
    Annotation {
        annotation_type: NodeId,
        arguments: Vec<NodeId>,
    },
    /// Template hole. `spread` holes expand to all remaining arguments.
    Placeholder {
        index: usize,
        spread: bool,
    },
}

/// Payload-free discriminant of [`NodeKind`], cheap to copy out of the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeTag {
    CompilationUnit,
    Import,
    ClassDeclaration,
    MethodDeclaration,
    VariableDeclarations,
    NamedVariable,
    Block,
    If,
    Return,
    Assignment,
    MethodInvocation,
    FieldAccess,
    Identifier,
    TypeRef,
    ParameterizedType,
    Unary,
    Binary,
    Literal,
    NewClass,
    Annotation,
    Placeholder,
}

fn map_vec(ids: &[NodeId], f: &mut dyn FnMut(NodeId) -> NodeId) -> Vec<NodeId> {
    ids.iter().map(|id| f(*id)).collect()
}

fn map_opt(id: Option<NodeId>, f: &mut dyn FnMut(NodeId) -> NodeId) -> Option<NodeId> {
    id.map(f)
}

impl NodeKind {
    pub fn tag(&self) -> NodeTag {
        match self {
            NodeKind::CompilationUnit { .. } => NodeTag::CompilationUnit,
            NodeKind::Import { .. } => NodeTag::Import,
            NodeKind::ClassDeclaration { .. } => NodeTag::ClassDeclaration,
            NodeKind::MethodDeclaration { .. } => NodeTag::MethodDeclaration,
            NodeKind::VariableDeclarations { .. } => NodeTag::VariableDeclarations,
            NodeKind::NamedVariable { .. } => NodeTag::NamedVariable,
            NodeKind::Block { .. } => NodeTag::Block,
            NodeKind::If { .. } => NodeTag::If,
            NodeKind::Return { .. } => NodeTag::Return,
            NodeKind::Assignment { .. } => NodeTag::Assignment,
            NodeKind::MethodInvocation { .. } => NodeTag::MethodInvocation,
            NodeKind::FieldAccess { .. } => NodeTag::FieldAccess,
            NodeKind::Identifier { .. } => NodeTag::Identifier,
            NodeKind::TypeRef { .. } => NodeTag::TypeRef,
            NodeKind::ParameterizedType { .. } => NodeTag::ParameterizedType,
            NodeKind::Unary { .. } => NodeTag::Unary,
            NodeKind::Binary { .. } => NodeTag::Binary,
            NodeKind::Literal { .. } => NodeTag::Literal,
            NodeKind::NewClass { .. } => NodeTag::NewClass,
            NodeKind::Annotation { .. } => NodeTag::Annotation,
            NodeKind::Placeholder { .. } => NodeTag::Placeholder,
        }
    }

    /// Rebuilds this kind with every child passed through `f`, in source order.
    pub fn map_children(&self, f: &mut dyn FnMut(NodeId) -> NodeId) -> NodeKind {
        match self {
            NodeKind::CompilationUnit {
                package,
                imports,
                classes,
            } => NodeKind::CompilationUnit {
                package: package.clone(),
                imports: map_vec(imports, f),
                classes: map_vec(classes, f),
            },
            NodeKind::ClassDeclaration {
                annotations,
                modifiers,
                name,
                body,
            } => NodeKind::ClassDeclaration {
                annotations: map_vec(annotations, f),
                modifiers: modifiers.clone(),
                name: name.clone(),
                body: f(*body),
            },
            NodeKind::MethodDeclaration {
                annotations,
                modifiers,
                return_type,
                name,
                parameters,
                body,
            } => NodeKind::MethodDeclaration {
                annotations: map_vec(annotations, f),
                modifiers: modifiers.clone(),
                return_type: map_opt(*return_type, f),
                name: name.clone(),
                parameters: map_vec(parameters, f),
                body: map_opt(*body, f),
            },
            NodeKind::VariableDeclarations {
                annotations,
                modifiers,
                type_expr,
                variables,
            } => NodeKind::VariableDeclarations {
                annotations: map_vec(annotations, f),
                modifiers: modifiers.clone(),
                type_expr: map_opt(*type_expr, f),
                variables: map_vec(variables, f),
            },
            NodeKind::NamedVariable { name, initializer } => NodeKind::NamedVariable {
                name: name.clone(),
                initializer: map_opt(*initializer, f),
            },
            NodeKind::Block { statements } => NodeKind::Block {
                statements: map_vec(statements, f),
            },
            NodeKind::If {
                condition,
                then_part,
                else_part,
            } => NodeKind::If {
                condition: f(*condition),
                then_part: f(*then_part),
                else_part: map_opt(*else_part, f),
            },
            NodeKind::Return { expression } => NodeKind::Return {
                expression: map_opt(*expression, f),
            },
            NodeKind::Assignment { target, value } => NodeKind::Assignment {
                target: f(*target),
                value: f(*value),
            },
            NodeKind::MethodInvocation {
                select,
                name,
                arguments,
            } => NodeKind::MethodInvocation {
                select: map_opt(*select, f),
                name: name.clone(),
                arguments: map_vec(arguments, f),
            },
            NodeKind::FieldAccess { target, name } => NodeKind::FieldAccess {
                target: f(*target),
                name: f(*name),
            },
            NodeKind::ParameterizedType { base, parameters } => NodeKind::ParameterizedType {
                base: f(*base),
                parameters: map_vec(parameters, f),
            },
            NodeKind::Unary { operator, operand } => NodeKind::Unary {
                operator: *operator,
                operand: f(*operand),
            },
            NodeKind::Binary {
                operator,
                left,
                right,
            } => NodeKind::Binary {
                operator: *operator,
                left: f(*left),
                right: f(*right),
            },
            NodeKind::NewClass { class, arguments } => NodeKind::NewClass {
                class: f(*class),
                arguments: map_vec(arguments, f),
            },
            NodeKind::Annotation {
                annotation_type,
                arguments,
            } => NodeKind::Annotation {
                annotation_type: f(*annotation_type),
                arguments: map_vec(arguments, f),
            },
            NodeKind::Import { .. }
            | NodeKind::Identifier { .. }
            | NodeKind::TypeRef { .. }
            | NodeKind::Literal { .. }
            | NodeKind::Placeholder { .. } => self.clone(),
        }
    }

    /// Children in source order.
    pub fn children(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.map_children(&mut |id| {
            out.push(id);
            id
        });
        out
    }
}

// ============================================================================
// Nodes and the arena
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub uid: Uid,
    #[serde(default, skip_serializing_if = "Space::is_empty")]
    pub prefix: Space,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<JavaType>,
    pub kind: NodeKind,
}

/// Arena of immutable nodes for one compilation unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tree {
    nodes: Vec<Node>,
    next_uid: u64,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn fresh_uid(&mut self) -> Uid {
        let uid = Uid(self.next_uid);
        self.next_uid += 1;
        uid
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Allocate a brand-new node with a fresh identity.
    pub fn alloc(&mut self, kind: NodeKind, ty: Option<JavaType>) -> NodeId {
        self.alloc_with_prefix(Space::empty(), kind, ty)
    }

    pub fn alloc_with_prefix(
        &mut self,
        prefix: Space,
        kind: NodeKind,
        ty: Option<JavaType>,
    ) -> NodeId {
        let uid = self.fresh_uid();
        self.push(Node {
            uid,
            prefix,
            ty,
            kind,
        })
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    pub fn tag(&self, id: NodeId) -> NodeTag {
        self.kind(id).tag()
    }

    pub fn ty(&self, id: NodeId) -> Option<&JavaType> {
        self.node(id).ty.as_ref()
    }

    pub fn uid(&self, id: NodeId) -> Uid {
        self.node(id).uid
    }

    pub fn prefix(&self, id: NodeId) -> &Space {
        &self.node(id).prefix
    }

    /// Copy of `id` with a new shape. Identity, prefix and type are kept.
    pub fn with_kind(&mut self, id: NodeId, kind: NodeKind) -> NodeId {
        let node = self.node(id);
        let copy = Node {
            uid: node.uid,
            prefix: node.prefix.clone(),
            ty: node.ty.clone(),
            kind,
        };
        self.push(copy)
    }

    pub fn with_prefix(&mut self, id: NodeId, prefix: Space) -> NodeId {
        if self.node(id).prefix == prefix {
            return id;
        }
        let mut copy = self.node(id).clone();
        copy.prefix = prefix;
        self.push(copy)
    }

    pub fn with_type(&mut self, id: NodeId, ty: Option<JavaType>) -> NodeId {
        if self.node(id).ty == ty {
            return id;
        }
        let mut copy = self.node(id).clone();
        copy.ty = ty;
        self.push(copy)
    }

    /// Children of `id` in source order.
    pub fn children_of(&self, id: NodeId) -> Vec<NodeId> {
        self.kind(id).children()
    }

    /// Pre-order walk of `root` and everything below it.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            out.push(id);
            let children = self.kind(id).children();
            stack.extend(children.into_iter().rev());
        }
        out
    }

    /// Current slot of the node with identity `uid` reachable from `root`.
    pub fn find_by_uid(&self, root: NodeId, uid: Uid) -> Option<NodeId> {
        self.descendants(root)
            .into_iter()
            .find(|id| self.uid(*id) == uid)
    }

    /// Name of the first variable of a `VariableDeclarations` node.
    pub fn first_variable_name(&self, decls: NodeId) -> Option<&str> {
        let NodeKind::VariableDeclarations { variables, .. } = self.kind(decls) else {
            return None;
        };
        match self.kind(*variables.first()?) {
            NodeKind::NamedVariable { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Annotations on a declaration, empty for other kinds.
    pub fn annotations(&self, id: NodeId) -> &[NodeId] {
        match self.kind(id) {
            NodeKind::ClassDeclaration { annotations, .. }
            | NodeKind::MethodDeclaration { annotations, .. }
            | NodeKind::VariableDeclarations { annotations, .. } => annotations,
            _ => &[],
        }
    }
}

// ============================================================================
// Source files
// ============================================================================

/// Structural problems in a tree received from outside the process.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("root {root} is out of bounds for a tree of {len} nodes")]
    RootOutOfBounds { root: NodeId, len: usize },

    #[error("root {root} is not a compilation unit")]
    RootNotCompilationUnit { root: NodeId },

    #[error("node {parent} refers to {child}, which is not an earlier node")]
    InvalidChild { parent: NodeId, child: NodeId },

    #[error("nodes {first} and {second} share identity {uid}")]
    DuplicateUid { uid: Uid, first: NodeId, second: NodeId },

    #[error("next uid {next_uid} is not above identity {uid} of node {node}")]
    StaleNextUid { next_uid: u64, uid: Uid, node: NodeId },
}

/// One compilation unit: its path, arena and current root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    pub path: String,
    pub tree: Tree,
    pub root: NodeId,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, tree: Tree, root: NodeId) -> Self {
        Self {
            path: path.into(),
            tree,
            root,
        }
    }

    /// Check the arena invariants so traversal cannot index out of bounds or loop.
    pub fn validate(&self) -> Result<(), TreeError> {
        let len = self.tree.len();
        if self.root.index() >= len {
            return Err(TreeError::RootOutOfBounds {
                root: self.root,
                len,
            });
        }
        for (index, node) in self.tree.nodes.iter().enumerate() {
            let parent = NodeId(index as u32);
            for child in node.kind.children() {
                if child.index() >= index {
                    return Err(TreeError::InvalidChild { parent, child });
                }
            }
            if node.uid.0 >= self.tree.next_uid {
                return Err(TreeError::StaleNextUid {
                    next_uid: self.tree.next_uid,
                    uid: node.uid,
                    node: parent,
                });
            }
        }
        if self.tree.tag(self.root) != NodeTag::CompilationUnit {
            return Err(TreeError::RootNotCompilationUnit { root: self.root });
        }

        // Superseded copies keep their uid; only the live tree must be unique.
        let mut seen: HashMap<Uid, NodeId> = HashMap::new();
        for id in self.tree.descendants(self.root) {
            let uid = self.tree.uid(id);
            match seen.get(&uid) {
                Some(first) if *first != id => {
                    return Err(TreeError::DuplicateUid {
                        uid,
                        first: *first,
                        second: id,
                    });
                }
                Some(_) => {}
                None => {
                    seen.insert(uid, id);
                }
            }
        }
        Ok(())
    }

    pub fn package(&self) -> Option<&str> {
        match self.tree.kind(self.root) {
            NodeKind::CompilationUnit { package, .. } => package.as_deref(),
            _ => None,
        }
    }

    pub fn imports(&self) -> &[NodeId] {
        match self.tree.kind(self.root) {
            NodeKind::CompilationUnit { imports, .. } => imports,
            _ => &[],
        }
    }

    pub fn classes(&self) -> &[NodeId] {
        match self.tree.kind(self.root) {
            NodeKind::CompilationUnit { classes, .. } => classes,
            _ => &[],
        }
    }
}
