//! `@Rule TestName` to an injected `TestInfo`.
//!
//! JUnit 4 exposes the running test's name through a rule field:
//!
//! ```java
//! @Rule
//! public TestName name = new TestName();
//!
//! @Before
//! public void setUp() {
//!     log(name.getMethodName());
//! }
//! ```
//!
//! JUnit 5 injects a `TestInfo` into lifecycle methods instead. The migration
//! keeps the field (retyped to `String`) and fills it from `TestInfo` before
//! each test:
//!
//! ```java
//! public String name;
//!
//! @BeforeEach
//! public void setUp(TestInfo testInfo) {
//!     Optional<Method> testMethod = testInfo.getTestMethod();
//!     if (testMethod.isPresent()) {
//!         this.name = testMethod.get().getName();
//!     }
//!     log(name);
//! }
//! ```
//!
//! # Passes
//!
//! 1. The primary pass rewrites `x.getMethodName()` to `x`, strips `@Rule`
//!    and the `new TestName()` initializer from the field, and posts two
//!    facts to the enclosing class: the field, and the last `@Before` or
//!    `@BeforeEach` method with a body. When the class finishes it either
//!    appends a synthesized `setup` method (no lifecycle method) or queues
//!    [`BeforeMethodToTestInfo`] for the existing one.
//! 2. [`BeforeMethodToTestInfo`] swaps in the `TestInfo` parameter, appends
//!    the retrieval statements and moves them in front of the original body.
//! 3. Two [`ChangeType`] passes retype `TestName` to `String` and `@Before`
//!    to `@BeforeEach`.
//!
//! The import ledger then drops `Rule`/`TestName` and adds whatever the new
//! code references.

use migrant_core::matcher::{is_of_class_type, AnnotationMatcher, MethodMatcher};
use migrant_core::search::Applicability;
use migrant_core::template::{body_of, replace_body, Coordinates, Template, TemplateArg};
use migrant_core::tree::{JavaType, MethodType, NodeId, NodeKind, NodeTag, TreeBuilder, Uid};
use migrant_core::visitor::{walk_children, Transformer, VisitCtx};
use migrant_core::{ChangeType, Recipe};
use tracing::debug;

use crate::types::{
    BEFORE, BEFORE_EACH, METHOD, OBJECT, OPTIONAL, RULE, STRING, TEST_INFO, TEST_NAME,
};

const HAS_TEST_NAME_RULE: &str = "has-test-name-rule";
const BEFORE_METHOD: &str = "before-method";

const GET_METHOD_NAME: MethodMatcher = MethodMatcher::no_args(TEST_NAME, "getMethodName");
const RULE_ANNOTATION: AnnotationMatcher = AnnotationMatcher::new(RULE);
const BEFORE_ANNOTATION: AnnotationMatcher = AnnotationMatcher::new(BEFORE);
const BEFORE_EACH_ANNOTATION: AnnotationMatcher = AnnotationMatcher::new(BEFORE_EACH);

/// Replaces JUnit 4's `@Rule TestName` with JUnit 5's `TestInfo`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TestRuleToTestInfo;

impl Recipe for TestRuleToTestInfo {
    fn name(&self) -> &'static str {
        "junit5.test-rule-to-test-info"
    }

    fn display_name(&self) -> &'static str {
        "JUnit TestName @Rule to JUnit Jupiter TestInfo"
    }

    fn description(&self) -> &'static str {
        "Replace usages of JUnit 4's `@Rule TestName` with JUnit 5's TestInfo."
    }

    fn applicability(&self) -> Option<Applicability> {
        Some(Applicability::uses_type(TEST_NAME))
    }

    fn visitor(&self) -> Box<dyn Transformer> {
        Box::new(TestNameRuleVisitor {
            setup: setup_template(),
        })
    }
}

// ============================================================================
// Templates
// ============================================================================

/// `Optional<Method> testMethod = testInfo.getTestMethod();` and the guarded
/// assignment to `this.<hole 0>`.
fn retrieval_statements(b: &mut TreeBuilder) -> Vec<NodeId> {
    let optional_method = || JavaType::parameterized(OPTIONAL, vec![JavaType::class(METHOD)]);

    let declared_type = b.parameterized(OPTIONAL, &[METHOD]);
    let test_info = b.ident("testInfo", Some(JavaType::class(TEST_INFO)));
    let get_test_method = b.invoke(
        Some(test_info),
        MethodType::new(TEST_INFO, "getTestMethod", &[], OPTIONAL),
        vec![],
    );
    let local = b.local(declared_type, "testMethod", Some(get_test_method));

    let test_method = b.ident("testMethod", Some(optional_method()));
    let is_present = b.invoke(
        Some(test_method),
        MethodType::new(OPTIONAL, "isPresent", &[], "boolean"),
        vec![],
    );

    let test_method = b.ident("testMethod", Some(optional_method()));
    let get = b.invoke(
        Some(test_method),
        MethodType::new(OPTIONAL, "get", &[], OBJECT),
        vec![],
    );
    let get_name = b.invoke(
        Some(get),
        MethodType::new(METHOD, "getName", &[], STRING),
        vec![],
    );
    let this = b.this();
    let field = b.placeholder(0);
    let target = b.node(
        NodeKind::FieldAccess {
            target: this,
            name: field,
        },
        Some(JavaType::class(STRING)),
    );
    let assign = b.assign(target, get_name);
    let guarded = b.if_then(is_present, vec![assign]);

    vec![local, guarded]
}

fn setup_template() -> Template {
    Template::builder(
        "@BeforeEach public void setup(TestInfo testInfo) {Optional<Method> testMethod = \
         testInfo.getTestMethod(); if (testMethod.isPresent()) { this.#{} = \
         testMethod.get().getName(); }}",
    )
    .imports(&[BEFORE_EACH, TEST_INFO, OPTIONAL, METHOD])
    .depends_on(&[BEFORE_EACH, TEST_INFO])
    .build(|b| {
        let before_each = b.annotation(BEFORE_EACH);
        let param = b.param(TEST_INFO, "testInfo");
        let statements = retrieval_statements(b);
        vec![b.method(vec![before_each], &["public"], "setup", vec![param], statements)]
    })
}

fn parameter_template() -> Template {
    Template::builder("TestInfo testInfo")
        .imports(&[TEST_INFO])
        .depends_on(&[TEST_INFO])
        .build(|b| vec![b.param(TEST_INFO, "testInfo")])
}

fn statements_template() -> Template {
    Template::builder(
        "Optional<Method> testMethod = testInfo.getTestMethod();\n\
         if (testMethod.isPresent()) {\n    this.#{} = testMethod.get().getName();\n}",
    )
    .imports(&[OPTIONAL, METHOD])
    .depends_on(&[TEST_INFO])
    .build(retrieval_statements)
}

// ============================================================================
// Primary pass
// ============================================================================

struct TestNameRuleVisitor {
    setup: Template,
}

impl TestNameRuleVisitor {
    /// True for a declaration directly inside a class body.
    fn is_field(cx: &VisitCtx<'_>) -> bool {
        let (Some(parent), Some(owner)) = (cx.cursor.parent(), cx.cursor.ancestor(2)) else {
            return false;
        };
        cx.tree.tag(parent) == NodeTag::Block && cx.tree.tag(owner) == NodeTag::ClassDeclaration
    }

    /// Drop `@Rule` and any `new TestName()` initializer.
    fn strip_rule(cx: &mut VisitCtx<'_>, id: NodeId) -> NodeId {
        let NodeKind::VariableDeclarations {
            annotations,
            modifiers,
            type_expr,
            variables,
        } = cx.tree.kind(id).clone()
        else {
            return id;
        };

        let kept: Vec<NodeId> = annotations
            .iter()
            .copied()
            .filter(|a| !RULE_ANNOTATION.matches(cx.tree, *a))
            .collect();

        let mut changed = kept.len() != annotations.len();
        let mut rewritten = Vec::with_capacity(variables.len());
        for variable in variables {
            let initializer = match cx.tree.kind(variable) {
                NodeKind::NamedVariable {
                    name,
                    initializer: Some(init),
                } if matches!(cx.tree.kind(*init), NodeKind::NewClass { .. })
                    && is_of_class_type(cx.tree.ty(*init), TEST_NAME) =>
                {
                    Some(name.clone())
                }
                _ => None,
            };
            match initializer {
                Some(name) => {
                    changed = true;
                    rewritten.push(cx.tree.with_kind(
                        variable,
                        NodeKind::NamedVariable {
                            name,
                            initializer: None,
                        },
                    ));
                }
                None => rewritten.push(variable),
            }
        }

        if !changed {
            return id;
        }
        cx.tree.with_kind(
            id,
            NodeKind::VariableDeclarations {
                annotations: kept,
                modifiers,
                type_expr,
                variables: rewritten,
            },
        )
    }
}

impl Transformer for TestNameRuleVisitor {
    fn visit_compilation_unit(&mut self, cx: &mut VisitCtx<'_>, id: NodeId) -> NodeId {
        let id = walk_children(self, cx, id);
        cx.maybe_remove_import(RULE, None);
        cx.maybe_remove_import(TEST_NAME, None);
        cx.maybe_add_import(TEST_INFO, None);
        cx.do_after_visit(Box::new(ChangeType::new(TEST_NAME, STRING)));
        cx.do_after_visit(Box::new(ChangeType::new(BEFORE, BEFORE_EACH)));
        id
    }

    fn visit_method_invocation(&mut self, cx: &mut VisitCtx<'_>, id: NodeId) -> NodeId {
        let id = walk_children(self, cx, id);
        if !GET_METHOD_NAME.matches(cx.tree, id) {
            return id;
        }
        let NodeKind::MethodInvocation {
            select: Some(select),
            ..
        } = cx.tree.kind(id)
        else {
            return id;
        };
        let select = *select;
        let prefix = cx.tree.prefix(id).clone();
        debug!(uid = %cx.tree.uid(id), "replaced getMethodName() with its receiver");
        cx.tree.with_prefix(select, prefix)
    }

    fn visit_variable_declarations(&mut self, cx: &mut VisitCtx<'_>, id: NodeId) -> NodeId {
        let id = walk_children(self, cx, id);
        if !Self::is_field(cx) {
            return id;
        }
        let declared = cx.tree.ty(id).cloned().or_else(|| match cx.tree.kind(id) {
            NodeKind::VariableDeclarations {
                type_expr: Some(t),
                ..
            } => cx.tree.ty(*t).cloned(),
            _ => None,
        });
        if !is_of_class_type(declared.as_ref(), TEST_NAME) {
            return id;
        }
        let id = Self::strip_rule(cx, id);
        cx.put_message_on_enclosing_class(HAS_TEST_NAME_RULE, id);
        id
    }

    fn visit_method_declaration(&mut self, cx: &mut VisitCtx<'_>, id: NodeId) -> NodeId {
        let id = walk_children(self, cx, id);
        let has_body = matches!(
            cx.tree.kind(id),
            NodeKind::MethodDeclaration { body: Some(_), .. }
        );
        let lifecycle = BEFORE_ANNOTATION.any_on(cx.tree, id)
            || BEFORE_EACH_ANNOTATION.any_on(cx.tree, id);
        if has_body && lifecycle {
            cx.put_message_on_enclosing_class(BEFORE_METHOD, id);
        }
        id
    }

    fn visit_class_declaration(&mut self, cx: &mut VisitCtx<'_>, id: NodeId) -> NodeId {
        let id = walk_children(self, cx, id);
        let field = cx.poll_message(HAS_TEST_NAME_RULE);
        let before = cx.poll_message(BEFORE_METHOD);

        let Some(field_name) = field
            .and_then(|f| cx.tree.first_variable_name(f))
            .map(str::to_string)
        else {
            return id;
        };

        match before {
            None => {
                let args = [TemplateArg::Name(field_name)];
                cx.try_apply_template(&self.setup, Coordinates::BodyLastStatement(id), &args)
                    .unwrap_or(id)
            }
            Some(method) => {
                cx.do_after_visit(Box::new(BeforeMethodToTestInfo::new(
                    cx.tree.uid(method),
                    field_name,
                )));
                id
            }
        }
    }
}

// ============================================================================
// Lifecycle method rewrite
// ============================================================================

/// Injects `TestInfo` into an existing lifecycle method and assigns the field
/// from it before the method's original statements run.
pub struct BeforeMethodToTestInfo {
    method: Uid,
    field: String,
    parameters: Template,
    statements: Template,
}

impl BeforeMethodToTestInfo {
    pub fn new(method: Uid, field: impl Into<String>) -> Self {
        Self {
            method,
            field: field.into(),
            parameters: parameter_template(),
            statements: statements_template(),
        }
    }

    fn statement_count(cx: &VisitCtx<'_>, method: NodeId) -> usize {
        match body_of(cx.tree, method).map(|body| cx.tree.kind(body)) {
            Some(NodeKind::Block { statements }) => statements.len(),
            _ => 0,
        }
    }

    /// Move the last `count` statements of the body to the front.
    fn relocate(cx: &mut VisitCtx<'_>, method: NodeId, count: usize) -> NodeId {
        let Some(body) = body_of(cx.tree, method) else {
            return method;
        };
        let NodeKind::Block { statements } = cx.tree.kind(body) else {
            return method;
        };
        if statements.len() <= count {
            return method;
        }
        let split = statements.len() - count;
        let mut reordered = statements[split..].to_vec();
        reordered.extend_from_slice(&statements[..split]);
        let new_body = cx.tree.with_kind(
            body,
            NodeKind::Block {
                statements: reordered,
            },
        );
        replace_body(cx.tree, method, body, new_body)
    }
}

impl Transformer for BeforeMethodToTestInfo {
    fn visit_method_declaration(&mut self, cx: &mut VisitCtx<'_>, id: NodeId) -> NodeId {
        let id = walk_children(self, cx, id);
        if cx.tree.uid(id) != self.method {
            return id;
        }

        let Some(with_parameter) =
            cx.try_apply_template(&self.parameters, Coordinates::ReplaceParameters(id), &[])
        else {
            return id;
        };
        let before = Self::statement_count(cx, with_parameter);
        let args = [TemplateArg::Name(self.field.clone())];
        let Some(appended) = cx.try_apply_template(
            &self.statements,
            Coordinates::BodyLastStatement(with_parameter),
            &args,
        ) else {
            return id;
        };
        let added = Self::statement_count(cx, appended).saturating_sub(before);
        debug!(uid = %self.method, field = %self.field, "injected TestInfo");
        Self::relocate(cx, appended, added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use migrant_core::template::{ArenaTemplateEngine, TemplateEngine};
    use migrant_core::tree::print::print_node;
    use migrant_core::tree::Tree;

    #[test]
    fn test_templates_resolve() {
        let engine = ArenaTemplateEngine::default();
        let mut tree = Tree::new();
        let name = [TemplateArg::Name("name".to_string())];
        assert_eq!(
            engine
                .instantiate(&mut tree, &statements_template(), &name)
                .unwrap()
                .len(),
            2
        );
        assert_eq!(
            engine
                .instantiate(&mut tree, &parameter_template(), &[])
                .unwrap()
                .len(),
            1
        );
        let setup = engine
            .instantiate(&mut tree, &setup_template(), &name)
            .unwrap();
        assert_eq!(
            print_node(&tree, setup[0]),
            "@BeforeEach\n\
             public void setup(TestInfo testInfo) {\n\
             \x20   Optional<Method> testMethod = testInfo.getTestMethod();\n\
             \x20   if (testMethod.isPresent()) {\n\
             \x20       this.name = testMethod.get().getName();\n\
             \x20   }\n\
             }\n"
        );
    }
}
