//! Database layer
//!
//! SQLite access for the page tree, snippets, media rows, and site settings.
//! Migrations are code-embedded; repositories are trait-based so services
//! stay testable against in-memory databases.

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, create_test_pool};
