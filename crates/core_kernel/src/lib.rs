//! Core Kernel - Foundational types shared by the expense-claims crates
//!
//! - Money and rates with precise decimal arithmetic
//! - Strongly-typed identifiers
//! - Port error and health-check abstractions used by every adapter

pub mod money;
pub mod identifiers;
pub mod ports;
pub mod error;

pub use money::{Money, Currency, MoneyError, Rate};
pub use identifiers::{ClaimId, SubmissionId, OwnerId};
pub use ports::{PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth};
pub use error::CoreError;
