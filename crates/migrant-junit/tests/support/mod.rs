//! Shared helpers for building JUnit test classes and inspecting results.

#![allow(dead_code)]

use migrant_core::template::ArenaTemplateEngine;
use migrant_core::tree::print::print;
use migrant_core::tree::{JavaType, MethodType, NodeId, NodeKind};
use migrant_core::{run_recipe, Recipe, RecipeOutcome, SourceFile, TreeBuilder};
use migrant_junit::types::ASSERTIONS;

pub const PACKAGE: &str = "com.example";
pub const CLASS: &str = "com.example.SampleTest";

/// Run `recipe` with the bundled engine.
pub fn run(recipe: &dyn Recipe, source: SourceFile) -> RecipeOutcome {
    run_recipe(recipe, source, &ArenaTemplateEngine::default())
}

/// `package com.example;`, the given imports and one class `SampleTest`
/// whose single method `check` holds `statements`.
pub fn unit_with_statements(
    imports: impl FnOnce(&mut TreeBuilder) -> Vec<NodeId>,
    statements: impl FnOnce(&mut TreeBuilder) -> Vec<NodeId>,
) -> SourceFile {
    let mut b = TreeBuilder::new();
    let imports = imports(&mut b);
    let statements = statements(&mut b);
    let method = b.method(vec![], &[], "check", vec![], statements);
    let class = b.class(vec![], &[], "SampleTest", vec![method]);
    let unit = b.unit(Some(PACKAGE), imports, vec![class]);
    b.finish("SampleTest.json", unit)
}

/// A call on `Assertions`, unqualified when `select` is `None`.
pub fn assertion(
    b: &mut TreeBuilder,
    select: Option<NodeId>,
    name: &str,
    arguments: Vec<NodeId>,
) -> NodeId {
    let parameter = if name == "assertFalse" || name == "assertTrue" {
        "boolean"
    } else {
        "java.lang.Object"
    };
    let mut parameters = vec![parameter];
    if arguments.len() > 1 {
        parameters.push("java.lang.String");
    }
    b.invoke(
        select,
        MethodType::new(ASSERTIONS, name, &parameters, "void"),
        arguments,
    )
}

/// `Assertions` as a receiver.
pub fn assertions_receiver(b: &mut TreeBuilder) -> NodeId {
    b.ident("Assertions", Some(JavaType::class(ASSERTIONS)))
}

/// An instance method of the sample class, invoked without a receiver.
pub fn local_call(b: &mut TreeBuilder, name: &str, return_type: &str) -> NodeId {
    b.invoke(None, MethodType::new(CLASS, name, &[], return_type), vec![])
}

pub fn boolean(b: &mut TreeBuilder, name: &str) -> NodeId {
    b.ident(name, Some(JavaType::primitive("boolean")))
}

pub fn object(b: &mut TreeBuilder, name: &str) -> NodeId {
    b.ident(name, Some(JavaType::class("java.lang.Object")))
}

pub fn printed(outcome: &RecipeOutcome) -> String {
    print(&outcome.source)
}

/// Text of every import, in order.
pub fn imports_of(source: &SourceFile) -> Vec<String> {
    source
        .imports()
        .iter()
        .map(|id| match source.tree.kind(*id) {
            NodeKind::Import {
                type_name,
                member: Some(member),
                is_static: true,
            } => format!("static {}.{}", type_name, member),
            NodeKind::Import { type_name, .. } => type_name.clone(),
            _ => String::new(),
        })
        .collect()
}

/// The method declaration called `name`, anywhere in the unit.
pub fn method_named(source: &SourceFile, name: &str) -> Option<NodeId> {
    source.tree.descendants(source.root).into_iter().find(|id| {
        matches!(
            source.tree.kind(*id),
            NodeKind::MethodDeclaration { name: n, .. } if n == name
        )
    })
}

/// Statements of a method's body.
pub fn statements_of(source: &SourceFile, method: NodeId) -> Vec<NodeId> {
    let NodeKind::MethodDeclaration {
        body: Some(body), ..
    } = source.tree.kind(method)
    else {
        return Vec::new();
    };
    match source.tree.kind(*body) {
        NodeKind::Block { statements } => statements.clone(),
        _ => Vec::new(),
    }
}

/// Every invocation named `name`, in pre-order.
pub fn invocations_named(source: &SourceFile, name: &str) -> Vec<NodeId> {
    source
        .tree
        .descendants(source.root)
        .into_iter()
        .filter(|id| {
            matches!(
                source.tree.kind(*id),
                NodeKind::MethodInvocation { name: n, .. } if n == name
            )
        })
        .collect()
}
