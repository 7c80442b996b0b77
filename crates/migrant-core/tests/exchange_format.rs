//! Source files as an external parser hands them over: JSON in, rewritten
//! tree out.

use migrant_core::error::OutputErrorCode;
use migrant_core::template::ArenaTemplateEngine;
use migrant_core::tree::print::print;
use migrant_core::tree::TreeError;
use migrant_core::{run_recipe, ChangeType, MigrantError, Recipe, SourceFile, Transformer};

const TEST_NAME: &str = "org.junit.rules.TestName";
const STRING: &str = "java.lang.String";

/// `package com.example; import org.junit.rules.TestName; class T { TestName name; }`
const UNIT: &str = r#"{
  "path": "T.java",
  "tree": {
    "nodes": [
      { "uid": 0, "kind": { "node": "import", "type_name": "org.junit.rules.TestName" } },
      { "uid": 1, "ty": { "kind": "class", "fqn": "org.junit.rules.TestName" },
        "kind": { "node": "type_ref", "name": "TestName" } },
      { "uid": 2, "ty": { "kind": "class", "fqn": "org.junit.rules.TestName" },
        "kind": { "node": "named_variable", "name": "name", "initializer": null } },
      { "uid": 3, "ty": { "kind": "class", "fqn": "org.junit.rules.TestName" },
        "kind": { "node": "variable_declarations", "annotations": [], "modifiers": [],
                  "type_expr": 1, "variables": [2] } },
      { "uid": 4, "kind": { "node": "block", "statements": [3] } },
      { "uid": 5, "kind": { "node": "class_declaration", "annotations": [], "modifiers": [],
                            "name": "T", "body": 4 } },
      { "uid": 6, "kind": { "node": "compilation_unit", "package": "com.example",
                            "imports": [0], "classes": [5] } }
    ],
    "next_uid": 7
  },
  "root": 6
}"#;

struct Retype;

impl Recipe for Retype {
    fn name(&self) -> &'static str {
        "test.retype"
    }

    fn display_name(&self) -> &'static str {
        "Retype TestName"
    }

    fn description(&self) -> &'static str {
        "Change `TestName` to `String`."
    }

    fn visitor(&self) -> Box<dyn Transformer> {
        Box::new(ChangeType::new(TEST_NAME, STRING))
    }
}

#[test]
fn parser_output_loads_and_prints() {
    let source: SourceFile = serde_json::from_str(UNIT).unwrap();

    source.validate().unwrap();
    assert_eq!(source.package(), Some("com.example"));
    assert_eq!(
        print(&source),
        "package com.example;\n\
         \n\
         import org.junit.rules.TestName;\n\
         \n\
         class T {\n\
         \x20   TestName name;\n\
         }\n"
    );
}

#[test]
fn rewritten_tree_survives_serialization() {
    let source: SourceFile = serde_json::from_str(UNIT).unwrap();

    let outcome = run_recipe(&Retype, source, &ArenaTemplateEngine::default());
    assert!(outcome.changed);

    let json = serde_json::to_string(&outcome.source).unwrap();
    let reloaded: SourceFile = serde_json::from_str(&json).unwrap();
    reloaded.validate().unwrap();
    assert_eq!(reloaded, outcome.source);
    assert_eq!(
        print(&reloaded),
        "package com.example;\n\
         \n\
         class T {\n\
         \x20   String name;\n\
         }\n"
    );
}

#[test]
fn forward_references_are_rejected() {
    let broken = UNIT.replace("\"statements\": [3]", "\"statements\": [5]");
    let source: SourceFile = serde_json::from_str(&broken).unwrap();

    let err = source.validate().unwrap_err();
    assert!(matches!(err, TreeError::InvalidChild { .. }));

    let err = MigrantError::from_tree("T.json", err);
    assert_eq!(OutputErrorCode::from(&err), OutputErrorCode::InvalidArguments);
}

#[test]
fn root_must_be_a_compilation_unit() {
    let broken = UNIT.replace("\"root\": 6", "\"root\": 5");
    let source: SourceFile = serde_json::from_str(&broken).unwrap();

    assert_eq!(
        source.validate(),
        Err(TreeError::RootNotCompilationUnit {
            root: serde_json::from_str("5").unwrap()
        })
    );
}

#[test]
fn stale_next_uid_is_rejected() {
    let stale = UNIT.replace("\"next_uid\": 7", "\"next_uid\": 4");
    let source: SourceFile = serde_json::from_str(&stale).unwrap();

    let err = source.validate().unwrap_err();
    assert!(matches!(err, TreeError::StaleNextUid { next_uid: 4, .. }));
}
