//! Repository implementations
//!
//! Repositories encapsulate SQL and map between database rows and plain row
//! structs. Queries are built at runtime with `sqlx::query_as` so the crate
//! compiles without a live database.

pub mod claims;

pub use claims::{ClaimRow, ClaimsRepository, NewClaimRow};
