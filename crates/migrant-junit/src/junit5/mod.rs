//! JUnit 4 to JUnit 5 migrations.

mod test_rule_to_test_info;

pub use test_rule_to_test_info::TestRuleToTestInfo;
