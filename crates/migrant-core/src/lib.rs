//! Core infrastructure for migrant.
//!
//! This crate provides the language-level machinery recipes are built from:
//! - An arena node model with stable identities and a canonical printer
//! - A cursor with scoped messages for child-to-ancestor facts
//! - Method and annotation matchers, and whole-unit applicability filters
//! - A rewriting visitor with per-kind hooks
//! - Snippet templates and the template engine seam
//! - A deferred import ledger
//! - The pass queue and recipe driver
//! - Error types, exit codes and configuration

pub mod change_type;
pub mod config;
pub mod cursor;
pub mod error;
pub mod ledger;
pub mod matcher;
pub mod pipeline;
pub mod recipe;
pub mod search;
pub mod template;
pub mod tree;
pub mod visitor;

pub use change_type::ChangeType;
pub use config::Config;
pub use error::{MigrantError, OutputErrorCode};
pub use pipeline::{run_recipe, run_recipes, RecipeOutcome};
pub use recipe::{Recipe, RecipeDescriptor};
pub use tree::{NodeId, SourceFile, Tree, TreeBuilder};
pub use visitor::{Diagnostic, Transformer, VisitCtx};
