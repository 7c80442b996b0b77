//! Fully-qualified names the recipes match on or generate.

pub const ASSERTIONS: &str = "org.junit.jupiter.api.Assertions";

pub const RULE: &str = "org.junit.Rule";
pub const TEST_NAME: &str = "org.junit.rules.TestName";
pub const BEFORE: &str = "org.junit.Before";

pub const BEFORE_EACH: &str = "org.junit.jupiter.api.BeforeEach";
pub const TEST_INFO: &str = "org.junit.jupiter.api.TestInfo";

pub const OBJECT: &str = "java.lang.Object";
pub const STRING: &str = "java.lang.String";
pub const OPTIONAL: &str = "java.util.Optional";
pub const METHOD: &str = "java.lang.reflect.Method";
