//! JUnit recipes for migrant.
//!
//! - [`cleanup`]: `assertFalse` simplifications.
//! - [`junit5`]: the `@Rule TestName` to `TestInfo` migration.
//!
//! [`all_recipes`] and [`find_recipe`] form the registry the CLI resolves
//! recipe names against.

pub mod cleanup;
pub mod junit5;
pub mod types;

use migrant_core::Recipe;

pub use cleanup::{AssertFalseNegationToAssertTrue, AssertFalseNullToAssertNotNull};
pub use junit5::TestRuleToTestInfo;

/// Every registered recipe, in listing order.
pub fn all_recipes() -> Vec<Box<dyn Recipe>> {
    vec![
        Box::new(AssertFalseNegationToAssertTrue),
        Box::new(AssertFalseNullToAssertNotNull),
        Box::new(TestRuleToTestInfo),
    ]
}

/// Look up a recipe by its exact name.
pub fn find_recipe(name: &str) -> Option<Box<dyn Recipe>> {
    all_recipes().into_iter().find(|r| r.name() == name)
}
