//! Canonical Java rendering of a tree.
//!
//! This is not the formatting-preserving printer that writes files back to
//! disk. It ignores recorded whitespace and lays code out with four-space
//! indentation, which makes its output stable enough to compare in tests and
//! readable enough for CLI previews. Leading comments are kept: they are
//! printed on their own lines before the member or statement they precede.
//!
//! Import layout: non-static imports in tree order, a blank line, then the
//! static imports in tree order.

use super::{LiteralValue, NodeId, NodeKind, SourceFile, Tree};

const INDENT: &str = "    ";

/// Render a whole compilation unit.
pub fn print(source: &SourceFile) -> String {
    print_node(&source.tree, source.root)
}

/// Render any node. Declarations and statements end with a newline,
/// expressions do not.
pub fn print_node(tree: &Tree, id: NodeId) -> String {
    let mut printer = Printer {
        tree,
        out: String::new(),
        depth: 0,
    };
    match tree.kind(id) {
        NodeKind::CompilationUnit { .. }
        | NodeKind::ClassDeclaration { .. }
        | NodeKind::MethodDeclaration { .. }
        | NodeKind::VariableDeclarations { .. }
        | NodeKind::Block { .. }
        | NodeKind::If { .. }
        | NodeKind::Return { .. }
        | NodeKind::Import { .. } => printer.statement(id),
        _ => {
            let text = printer.expression(id);
            printer.out.push_str(&text);
        }
    }
    printer.out
}

struct Printer<'t> {
    tree: &'t Tree,
    out: String,
    depth: usize,
}

impl Printer<'_> {
    fn indent(&mut self) {
        for _ in 0..self.depth {
            self.out.push_str(INDENT);
        }
    }

    fn line(&mut self, text: &str) {
        self.indent();
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn comments(&mut self, id: NodeId) {
        let comments = self.tree.prefix(id).comments.clone();
        for comment in comments {
            self.line(&comment);
        }
    }

    fn statement(&mut self, id: NodeId) {
        let tree = self.tree;
        match tree.kind(id) {
            NodeKind::CompilationUnit {
                package,
                imports,
                classes,
            } => self.compilation_unit(package.as_deref(), imports, classes),
            NodeKind::Import { .. } => {
                let text = self.import(id);
                self.line(&text);
            }
            NodeKind::ClassDeclaration {
                annotations,
                modifiers,
                name,
                body,
            } => {
                self.comments(id);
                self.annotation_lines(annotations);
                let header = format!("{}class {} {{", modifier_prefix(modifiers), name);
                self.line(&header);
                self.depth += 1;
                self.class_body(*body);
                self.depth -= 1;
                self.line("}");
            }
            NodeKind::MethodDeclaration {
                annotations,
                modifiers,
                return_type,
                name,
                parameters,
                body,
            } => {
                self.comments(id);
                self.annotation_lines(annotations);
                let return_type = return_type
                    .map(|r| format!("{} ", self.expression(r)))
                    .unwrap_or_default();
                let params = parameters
                    .iter()
                    .map(|p| self.inline_declaration(*p))
                    .collect::<Vec<_>>()
                    .join(", ");
                let header = format!(
                    "{}{}{}({})",
                    modifier_prefix(modifiers),
                    return_type,
                    name,
                    params
                );
                match body {
                    Some(body) => {
                        self.line(&format!("{} {{", header));
                        self.block_statements(*body);
                        self.line("}");
                    }
                    None => self.line(&format!("{};", header)),
                }
            }
            NodeKind::VariableDeclarations { annotations, .. } => {
                self.comments(id);
                self.annotation_lines(annotations);
                let text = format!("{};", self.declaration_without_annotations(id));
                self.line(&text);
            }
            NodeKind::Block { .. } => {
                self.comments(id);
                self.line("{");
                self.block_statements(id);
                self.line("}");
            }
            NodeKind::If {
                condition,
                then_part,
                else_part,
            } => {
                self.comments(id);
                let head = format!("if ({}) {{", self.expression(*condition));
                self.line(&head);
                self.block_statements(*then_part);
                match else_part {
                    Some(else_part) => {
                        self.line("} else {");
                        self.block_statements(*else_part);
                        self.line("}");
                    }
                    None => self.line("}"),
                }
            }
            NodeKind::Return { expression } => {
                self.comments(id);
                let text = match expression {
                    Some(e) => format!("return {};", self.expression(*e)),
                    None => "return;".to_string(),
                };
                self.line(&text);
            }
            _ => {
                self.comments(id);
                let text = format!("{};", self.expression(id));
                self.line(&text);
            }
        }
    }

    fn compilation_unit(&mut self, package: Option<&str>, imports: &[NodeId], classes: &[NodeId]) {
        if let Some(package) = package {
            self.out.push_str(&format!("package {};\n\n", package));
        }
        let tree = self.tree;
        let mut previous_static = None;
        for import in imports {
            let is_static = matches!(
                tree.kind(*import),
                NodeKind::Import {
                    is_static: true,
                    ..
                }
            );
            if previous_static == Some(false) && is_static {
                self.out.push('\n');
            }
            self.statement(*import);
            previous_static = Some(is_static);
        }
        if !imports.is_empty() {
            self.out.push('\n');
        }
        for (i, class) in classes.iter().enumerate() {
            if i > 0 {
                self.out.push('\n');
            }
            self.statement(*class);
        }
    }

    fn import(&self, id: NodeId) -> String {
        match self.tree.kind(id) {
            NodeKind::Import {
                type_name,
                member,
                is_static,
            } => {
                let target = match member {
                    Some(member) => format!("{}.{}", type_name, member),
                    None => type_name.clone(),
                };
                if *is_static {
                    format!("import static {};", target)
                } else {
                    format!("import {};", target)
                }
            }
            _ => String::new(),
        }
    }

    fn annotation_lines(&mut self, annotations: &[NodeId]) {
        for annotation in annotations {
            let text = self.expression(*annotation);
            self.line(&text);
        }
    }

    /// Members separated by a blank line, except between consecutive fields.
    fn class_body(&mut self, body: NodeId) {
        let tree = self.tree;
        let NodeKind::Block { statements } = tree.kind(body) else {
            return;
        };
        let mut previous_field = None;
        for member in statements {
            let is_field = matches!(
                tree.kind(*member),
                NodeKind::VariableDeclarations { .. }
            );
            if let Some(previous_field) = previous_field {
                if !(previous_field && is_field) {
                    self.out.push('\n');
                }
            }
            self.statement(*member);
            previous_field = Some(is_field);
        }
    }

    fn block_statements(&mut self, block: NodeId) {
        let statements = match self.tree.kind(block) {
            NodeKind::Block { statements } => statements.clone(),
            _ => vec![block],
        };
        self.depth += 1;
        for statement in statements {
            self.statement(statement);
        }
        self.depth -= 1;
    }

    /// `final Type a = 1, b` without annotations or a trailing semicolon.
    fn declaration_without_annotations(&self, id: NodeId) -> String {
        let NodeKind::VariableDeclarations {
            modifiers,
            type_expr,
            variables,
            ..
        } = self.tree.kind(id)
        else {
            return self.expression(id);
        };
        let type_text = type_expr
            .map(|t| format!("{} ", self.expression(t)))
            .unwrap_or_default();
        let names = variables
            .iter()
            .map(|v| self.expression(*v))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{}{}{}", modifier_prefix(modifiers), type_text, names)
    }

    /// Parameters: annotations inline.
    fn inline_declaration(&self, id: NodeId) -> String {
        let annotations = self
            .tree
            .annotations(id)
            .iter()
            .map(|a| format!("{} ", self.expression(*a)))
            .collect::<String>();
        format!("{}{}", annotations, self.declaration_without_annotations(id))
    }

    fn list(&self, ids: &[NodeId]) -> String {
        ids.iter()
            .map(|id| self.expression(*id))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn expression(&self, id: NodeId) -> String {
        match self.tree.kind(id) {
            NodeKind::MethodInvocation {
                select,
                name,
                arguments,
            } => {
                let select = select
                    .map(|s| format!("{}.", self.expression(s)))
                    .unwrap_or_default();
                format!("{}{}({})", select, name, self.list(arguments))
            }
            NodeKind::FieldAccess { target, name } => {
                format!("{}.{}", self.expression(*target), self.expression(*name))
            }
            NodeKind::Identifier { name } | NodeKind::TypeRef { name } => name.clone(),
            NodeKind::ParameterizedType { base, parameters } => {
                format!("{}<{}>", self.expression(*base), self.list(parameters))
            }
            NodeKind::Unary { operator, operand } => {
                let operand_text = self.expression(*operand);
                if matches!(self.tree.kind(*operand), NodeKind::Binary { .. }) {
                    format!("{}({})", operator.symbol(), operand_text)
                } else {
                    format!("{}{}", operator.symbol(), operand_text)
                }
            }
            NodeKind::Binary {
                operator,
                left,
                right,
            } => format!(
                "{} {} {}",
                self.expression(*left),
                operator.symbol(),
                self.expression(*right)
            ),
            NodeKind::Literal { value } => literal(value),
            NodeKind::NewClass { class, arguments } => {
                format!("new {}({})", self.expression(*class), self.list(arguments))
            }
            NodeKind::Annotation {
                annotation_type,
                arguments,
            } => {
                if arguments.is_empty() {
                    format!("@{}", self.expression(*annotation_type))
                } else {
                    format!(
                        "@{}({})",
                        self.expression(*annotation_type),
                        self.list(arguments)
                    )
                }
            }
            NodeKind::Assignment { target, value } => {
                format!("{} = {}", self.expression(*target), self.expression(*value))
            }
            NodeKind::NamedVariable { name, initializer } => match initializer {
                Some(init) => format!("{} = {}", name, self.expression(*init)),
                None => name.clone(),
            },
            NodeKind::VariableDeclarations { .. } => self.inline_declaration(id),
            NodeKind::Placeholder { spread, .. } => {
                if *spread {
                    "#{anyArgs()}".to_string()
                } else {
                    "#{any()}".to_string()
                }
            }
            NodeKind::Import { .. } => self.import(id),
            NodeKind::CompilationUnit { .. }
            | NodeKind::ClassDeclaration { .. }
            | NodeKind::MethodDeclaration { .. }
            | NodeKind::Block { .. }
            | NodeKind::If { .. }
            | NodeKind::Return { .. } => print_node(self.tree, id).trim_end().to_string(),
        }
    }
}

fn modifier_prefix(modifiers: &[String]) -> String {
    modifiers.iter().map(|m| format!("{} ", m)).collect()
}

fn literal(value: &LiteralValue) -> String {
    match value {
        LiteralValue::Null => "null".to_string(),
        LiteralValue::Boolean(b) => b.to_string(),
        LiteralValue::Int(i) => i.to_string(),
        LiteralValue::String(s) => format!(
            "\"{}\"",
            s.replace('\\', "\\\\").replace('"', "\\\"")
        ),
    }
}
