//! Migrant: structural rewrites for attributed Java syntax trees.
//!
//! The engine lives in `migrant-core`, the JUnit recipes in `migrant-junit`.
//! This crate adds the `migrant` command-line front door.

// Core infrastructure - re-exported from migrant-core
pub use migrant_core::change_type;
pub use migrant_core::config;
pub use migrant_core::cursor;
pub use migrant_core::error;
pub use migrant_core::ledger;
pub use migrant_core::matcher;
pub use migrant_core::pipeline;
pub use migrant_core::recipe;
pub use migrant_core::search;
pub use migrant_core::template;
pub use migrant_core::tree;
pub use migrant_core::visitor;

// Recipes
pub use migrant_junit as junit;

// Front door
pub mod cli;
pub mod output;
