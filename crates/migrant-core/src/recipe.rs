//! Named, documented transformations.

use std::time::Duration;

use serde::Serialize;

use crate::search::Applicability;
use crate::visitor::Transformer;

/// A transformation with its metadata. [`visitor`](Recipe::visitor) builds a
/// fresh primary pass for each unit.
pub trait Recipe {
    /// Stable, case-sensitive registry name (`cleanup.assert-false-negation-to-assert-true`).
    fn name(&self) -> &'static str;

    fn display_name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn estimated_effort_per_occurrence(&self) -> Duration {
        Duration::from_secs(5 * 60)
    }

    /// Units failing this check are returned untouched.
    fn applicability(&self) -> Option<Applicability> {
        None
    }

    fn visitor(&self) -> Box<dyn Transformer>;

    fn descriptor(&self) -> RecipeDescriptor {
        RecipeDescriptor {
            name: self.name(),
            display_name: self.display_name(),
            description: self.description(),
            effort_minutes: self.estimated_effort_per_occurrence().as_secs() / 60,
        }
    }
}

/// Serializable summary of a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeDescriptor {
    pub name: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    pub effort_minutes: u64,
}
