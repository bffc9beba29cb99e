//! Claims domain errors

use std::time::Duration;

use thiserror::Error;

use core_kernel::{Money, PortError};
use crate::claim_type::ClaimType;

/// Errors that can occur in the claims domain
#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("Unknown claim type: {0}")]
    UnknownClaimType(String),

    #[error("Unknown claim status: {0}")]
    UnknownStatus(String),

    #[error("Claim not found: {0}")]
    ClaimNotFound(String),

    #[error("Invalid status transition from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    #[error(transparent)]
    Port(#[from] PortError),
}

/// A claim request that breaks a submission rule
///
/// The `Display` text is the message shown next to the offending form field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("You need to select a claim type.")]
    MissingType,

    #[error("Claim amount must be positive.")]
    NonPositiveAmount,

    #[error("Claim amount can have at most {places} decimal places.")]
    TooManyDecimals { places: u32 },

    #[error("Amount seems too high.")]
    ExceedsAbsoluteCap { cap: Money },

    #[error("Amount cannot exceed {} for {} claims.", whole_amount(.limit), .claim_type)]
    ExceedsTypeLimit { claim_type: ClaimType, limit: Money },

    #[error("A supporting document is required.")]
    MissingDocument,
}

impl ValidationError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::MissingType => "missing_type",
            ValidationError::NonPositiveAmount => "non_positive_amount",
            ValidationError::TooManyDecimals { .. } => "invalid_amount",
            ValidationError::ExceedsAbsoluteCap { .. } => "exceeds_absolute_cap",
            ValidationError::ExceedsTypeLimit { .. } => "exceeds_type_limit",
            ValidationError::MissingDocument => "missing_document",
        }
    }

    /// Name of the form field the error belongs to
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::MissingType => "claimType",
            ValidationError::NonPositiveAmount
            | ValidationError::TooManyDecimals { .. }
            | ValidationError::ExceedsAbsoluteCap { .. }
            | ValidationError::ExceedsTypeLimit { .. } => "claimAmount",
            ValidationError::MissingDocument => "file",
        }
    }
}

// "$350" rather than "$350.00"
fn whole_amount(money: &Money) -> String {
    format!("{}{}", money.currency().symbol(), money.amount().normalize())
}

/// The document classifier could not produce a verdict
///
/// Every variant reports the same code, `verification_failed`. A negative
/// verdict is never an `AdmissionError`.
#[derive(Debug, Clone, Error)]
pub enum AdmissionError {
    #[error("Document classifier unreachable: {0}")]
    Transport(String),

    #[error("Document classifier timed out after {}ms", .0.as_millis())]
    TimedOut(Duration),

    #[error("Document classifier returned HTTP {status}")]
    UnexpectedStatus { status: u16 },

    #[error("Document classifier returned a malformed response: {0}")]
    MalformedResponse(String),
}

impl AdmissionError {
    pub const CODE: &'static str = "verification_failed";

    pub fn code(&self) -> &'static str {
        Self::CODE
    }
}

/// Why an accepted-for-checking submission did not produce a record
#[derive(Debug, Error)]
pub enum SubmissionFailure {
    #[error("Document verification failed: {0}")]
    Admission(#[from] AdmissionError),

    #[error("Submission failed: {0}")]
    Persistence(#[from] PortError),
}

impl SubmissionFailure {
    pub fn code(&self) -> &'static str {
        match self {
            SubmissionFailure::Admission(err) => err.code(),
            SubmissionFailure::Persistence(_) => "submission_failed",
        }
    }
}

/// A submit request that was refused before any work started
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("A submission is already in progress")]
    AlreadyInFlight,

    #[error("This claim has already been submitted")]
    AlreadyAccepted,
}
