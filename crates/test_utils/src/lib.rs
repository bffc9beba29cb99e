//! Test Utilities for the Expense Claims Crates
//!
//! Shared fixtures, builders, test doubles, and proptest strategies.
//!
//! # Modules
//!
//! - `fixtures`: Ready-made policies, documents, and owners
//! - `builders`: Builders for claim records and wired-up services
//! - `doubles`: Scripted classifier and failing stores
//! - `generators`: Property-based testing strategies
//! - `assertions`: Domain-specific assertion helpers
//! - `database`: PostgreSQL test container management

pub mod assertions;
pub mod builders;
pub mod database;
pub mod doubles;
pub mod fixtures;
pub mod generators;

pub use assertions::*;
pub use builders::*;
pub use doubles::*;
pub use fixtures::*;
pub use generators::*;
