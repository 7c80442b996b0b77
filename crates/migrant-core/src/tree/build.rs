//! Fluent construction of attributed trees.
//!
//! [`TreeBuilder`] is how templates describe the shape they generate and how
//! tests stand in for the external parser. Every helper attaches the type
//! attribution a parser would have produced, so matchers and the import
//! ledger behave the same on built trees as on parsed ones.
//!
//! ```
//! use migrant_core::tree::{MethodType, TreeBuilder};
//!
//! let mut b = TreeBuilder::new();
//! let cond = b.ident("valid", Some(migrant_core::tree::JavaType::primitive("boolean")));
//! let not = b.not(cond);
//! let call = b.invoke(
//!     None,
//!     MethodType::new("org.junit.jupiter.api.Assertions", "assertFalse", &["boolean"], "void"),
//!     vec![not],
//! );
//! assert_eq!(b.tree().children_of(call).len(), 1);
//! ```

use super::{
    simple_name, BinaryOp, JavaType, LiteralValue, MethodType, NodeId, NodeKind, SourceFile,
    Space, Tree, UnaryOp,
};

/// Builder over a [`Tree`] arena.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    tree: Tree,
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue building on an existing arena.
    pub fn from_tree(tree: Tree) -> Self {
        Self { tree }
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn into_tree(self) -> Tree {
        self.tree
    }

    pub fn finish(self, path: impl Into<String>, root: NodeId) -> SourceFile {
        SourceFile::new(path, self.tree, root)
    }

    pub fn node(&mut self, kind: NodeKind, ty: Option<JavaType>) -> NodeId {
        self.tree.alloc(kind, ty)
    }

    /// Attach a leading comment to `id`.
    pub fn comment(&mut self, id: NodeId, comment: &str) -> NodeId {
        let prefix = self.tree.prefix(id).clone().with_comment(comment);
        self.tree.with_prefix(id, prefix)
    }

    pub fn with_prefix(&mut self, id: NodeId, prefix: Space) -> NodeId {
        self.tree.with_prefix(id, prefix)
    }

    // ------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------

    /// `Optional` for `java.util.Optional`.
    pub fn type_ref(&mut self, fqn: &str) -> NodeId {
        self.node(
            NodeKind::TypeRef {
                name: simple_name(fqn).to_string(),
            },
            Some(JavaType::class(fqn)),
        )
    }

    /// `java.util.Optional` spelled out in full.
    pub fn qualified_type_ref(&mut self, fqn: &str) -> NodeId {
        self.node(
            NodeKind::TypeRef {
                name: fqn.to_string(),
            },
            Some(JavaType::class(fqn)),
        )
    }

    pub fn primitive(&mut self, name: &str) -> NodeId {
        self.node(
            NodeKind::TypeRef {
                name: name.to_string(),
            },
            Some(JavaType::primitive(name)),
        )
    }

    /// `Optional<Method>` for `("java.util.Optional", ["java.lang.reflect.Method"])`.
    pub fn parameterized(&mut self, base: &str, parameters: &[&str]) -> NodeId {
        let base_ref = self.type_ref(base);
        let parameter_refs = parameters.iter().map(|p| self.type_ref(p)).collect();
        let ty = JavaType::parameterized(
            base,
            parameters.iter().map(|p| JavaType::class(*p)).collect(),
        );
        self.node(
            NodeKind::ParameterizedType {
                base: base_ref,
                parameters: parameter_refs,
            },
            Some(ty),
        )
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    pub fn ident(&mut self, name: &str, ty: Option<JavaType>) -> NodeId {
        self.node(
            NodeKind::Identifier {
                name: name.to_string(),
            },
            ty,
        )
    }

    pub fn this(&mut self) -> NodeId {
        self.ident("this", None)
    }

    pub fn field_access(&mut self, target: NodeId, name: &str, ty: Option<JavaType>) -> NodeId {
        let name = self.ident(name, ty.clone());
        self.node(NodeKind::FieldAccess { target, name }, ty)
    }

    pub fn literal(&mut self, value: LiteralValue) -> NodeId {
        let ty = match &value {
            LiteralValue::Null => None,
            LiteralValue::Boolean(_) => Some(JavaType::primitive("boolean")),
            LiteralValue::Int(_) => Some(JavaType::primitive("int")),
            LiteralValue::String(_) => Some(JavaType::class("java.lang.String")),
        };
        self.node(NodeKind::Literal { value }, ty)
    }

    pub fn null(&mut self) -> NodeId {
        self.literal(LiteralValue::Null)
    }

    pub fn boolean(&mut self, value: bool) -> NodeId {
        self.literal(LiteralValue::Boolean(value))
    }

    pub fn int(&mut self, value: i64) -> NodeId {
        self.literal(LiteralValue::Int(value))
    }

    pub fn string(&mut self, value: &str) -> NodeId {
        self.literal(LiteralValue::String(value.to_string()))
    }

    pub fn unary(&mut self, operator: UnaryOp, operand: NodeId, ty: Option<JavaType>) -> NodeId {
        self.node(NodeKind::Unary { operator, operand }, ty)
    }

    pub fn not(&mut self, operand: NodeId) -> NodeId {
        self.unary(UnaryOp::Not, operand, Some(JavaType::primitive("boolean")))
    }

    pub fn binary(&mut self, operator: BinaryOp, left: NodeId, right: NodeId) -> NodeId {
        let ty = match operator {
            BinaryOp::Addition
            | BinaryOp::Subtraction
            | BinaryOp::Multiplication
            | BinaryOp::Division => self.tree.ty(left).cloned(),
            _ => Some(JavaType::primitive("boolean")),
        };
        self.node(
            NodeKind::Binary {
                operator,
                left,
                right,
            },
            ty,
        )
    }

    pub fn invoke(
        &mut self,
        select: Option<NodeId>,
        method: MethodType,
        arguments: Vec<NodeId>,
    ) -> NodeId {
        self.node(
            NodeKind::MethodInvocation {
                select,
                name: method.name.clone(),
                arguments,
            },
            Some(JavaType::Method(method)),
        )
    }

    pub fn new_class(&mut self, fqn: &str, arguments: Vec<NodeId>) -> NodeId {
        let class = self.type_ref(fqn);
        self.node(
            NodeKind::NewClass { class, arguments },
            Some(JavaType::class(fqn)),
        )
    }

    pub fn assign(&mut self, target: NodeId, value: NodeId) -> NodeId {
        let ty = self.tree.ty(target).cloned();
        self.node(NodeKind::Assignment { target, value }, ty)
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    pub fn block(&mut self, statements: Vec<NodeId>) -> NodeId {
        self.node(NodeKind::Block { statements }, None)
    }

    /// `Type name = initializer;`, typed after `type_expr`.
    pub fn local(&mut self, type_expr: NodeId, name: &str, initializer: Option<NodeId>) -> NodeId {
        self.variable(vec![], &[], type_expr, name, initializer)
    }

    pub fn if_then(&mut self, condition: NodeId, statements: Vec<NodeId>) -> NodeId {
        let then_part = self.block(statements);
        self.node(
            NodeKind::If {
                condition,
                then_part,
                else_part: None,
            },
            None,
        )
    }

    pub fn ret(&mut self, expression: Option<NodeId>) -> NodeId {
        self.node(NodeKind::Return { expression }, None)
    }

    // ------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------

    pub fn annotation(&mut self, fqn: &str) -> NodeId {
        let annotation_type = self.type_ref(fqn);
        self.node(
            NodeKind::Annotation {
                annotation_type,
                arguments: vec![],
            },
            Some(JavaType::class(fqn)),
        )
    }

    pub fn variable(
        &mut self,
        annotations: Vec<NodeId>,
        modifiers: &[&str],
        type_expr: NodeId,
        name: &str,
        initializer: Option<NodeId>,
    ) -> NodeId {
        let ty = self.tree.ty(type_expr).cloned();
        let named = self.node(
            NodeKind::NamedVariable {
                name: name.to_string(),
                initializer,
            },
            ty.clone(),
        );
        self.node(
            NodeKind::VariableDeclarations {
                annotations,
                modifiers: strings(modifiers),
                type_expr: Some(type_expr),
                variables: vec![named],
            },
            ty,
        )
    }

    /// A field declaration; identical in shape to a local.
    pub fn field(
        &mut self,
        annotations: Vec<NodeId>,
        modifiers: &[&str],
        type_fqn: &str,
        name: &str,
        initializer: Option<NodeId>,
    ) -> NodeId {
        let type_expr = self.type_ref(type_fqn);
        self.variable(annotations, modifiers, type_expr, name, initializer)
    }

    pub fn param(&mut self, type_fqn: &str, name: &str) -> NodeId {
        let type_expr = self.type_ref(type_fqn);
        self.variable(vec![], &[], type_expr, name, None)
    }

    pub fn method(
        &mut self,
        annotations: Vec<NodeId>,
        modifiers: &[&str],
        name: &str,
        parameters: Vec<NodeId>,
        statements: Vec<NodeId>,
    ) -> NodeId {
        let return_type = self.primitive("void");
        let body = self.block(statements);
        self.node(
            NodeKind::MethodDeclaration {
                annotations,
                modifiers: strings(modifiers),
                return_type: Some(return_type),
                name: name.to_string(),
                parameters,
                body: Some(body),
            },
            None,
        )
    }

    /// A method without a body (`abstract void m();`).
    pub fn method_signature(
        &mut self,
        annotations: Vec<NodeId>,
        modifiers: &[&str],
        name: &str,
        parameters: Vec<NodeId>,
    ) -> NodeId {
        let return_type = self.primitive("void");
        self.node(
            NodeKind::MethodDeclaration {
                annotations,
                modifiers: strings(modifiers),
                return_type: Some(return_type),
                name: name.to_string(),
                parameters,
                body: None,
            },
            None,
        )
    }

    pub fn class(
        &mut self,
        annotations: Vec<NodeId>,
        modifiers: &[&str],
        name: &str,
        members: Vec<NodeId>,
    ) -> NodeId {
        let body = self.block(members);
        self.node(
            NodeKind::ClassDeclaration {
                annotations,
                modifiers: strings(modifiers),
                name: name.to_string(),
                body,
            },
            None,
        )
    }

    pub fn import(&mut self, fqn: &str) -> NodeId {
        self.node(
            NodeKind::Import {
                type_name: fqn.to_string(),
                member: None,
                is_static: false,
            },
            None,
        )
    }

    /// `import static type_name.member;` (`member` may be `*`).
    pub fn static_import(&mut self, type_name: &str, member: &str) -> NodeId {
        self.node(
            NodeKind::Import {
                type_name: type_name.to_string(),
                member: Some(member.to_string()),
                is_static: true,
            },
            None,
        )
    }

    pub fn unit(
        &mut self,
        package: Option<&str>,
        imports: Vec<NodeId>,
        classes: Vec<NodeId>,
    ) -> NodeId {
        self.node(
            NodeKind::CompilationUnit {
                package: package.map(str::to_string),
                imports,
                classes,
            },
            None,
        )
    }

    // ------------------------------------------------------------------
    // Template holes
    // ------------------------------------------------------------------

    pub fn placeholder(&mut self, index: usize) -> NodeId {
        self.node(
            NodeKind::Placeholder {
                index,
                spread: false,
            },
            None,
        )
    }

    /// Hole that expands to arguments `index..` of the template call.
    pub fn spread(&mut self, index: usize) -> NodeId {
        self.node(
            NodeKind::Placeholder {
                index,
                spread: true,
            },
            None,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::NodeTag;

    #[test]
    fn test_field_is_typed_after_its_type_ref() {
        let mut b = TreeBuilder::new();
        let field = b.field(vec![], &["public"], "org.junit.rules.TestName", "name", None);
        assert_eq!(
            b.tree().ty(field),
            Some(&JavaType::class("org.junit.rules.TestName"))
        );
        assert_eq!(b.tree().first_variable_name(field), Some("name"));
    }

    #[test]
    fn test_parameterized_type() {
        let mut b = TreeBuilder::new();
        let id = b.parameterized("java.util.Optional", &["java.lang.reflect.Method"]);
        let ty = b.tree().ty(id).unwrap();
        assert_eq!(ty.fully_qualified_name(), Some("java.util.Optional"));
        assert!(ty.mentions("java.lang.reflect.Method"));
    }

    #[test]
    fn test_comment_keeps_identity() {
        let mut b = TreeBuilder::new();
        let id = b.ident("x", None);
        let commented = b.comment(id, "// note");
        assert_eq!(b.tree().uid(id), b.tree().uid(commented));
        assert_eq!(b.tree().tag(commented), NodeTag::Identifier);
    }
}
