//! Expense Claims Domain
//!
//! This crate implements expense-claim submission from the first keystroke
//! on the form through document admission to the recorded claim, plus the
//! reviewer decision that follows.
//!
//! # Claim Lifecycle
//!
//! ```text
//! Draft -> Validating -> AwaitingAdmission -> Submitted -> Approved/Rejected
//!                                          \-> Rejected (not a document)
//!                                          \-> Failed (classifier or storage)
//! ```
//!
//! The policy (per-type ceilings, absolute cap, reimbursement rate) is
//! evaluated synchronously by [`PolicyEvaluator`]; everything that talks to
//! the outside world sits behind the ports in [`ports`] and [`admission`].

pub mod adapters;
pub mod admission;
pub mod claim;
pub mod claim_type;
pub mod document;
pub mod error;
pub mod feed;
pub mod policy;
pub mod ports;
pub mod review;
pub mod submission;

pub use admission::{AdmissionVerdict, DocumentAdmissionPort, VerifyDocumentRequest};
pub use claim::{ClaimRecord, ClaimStatus, NewClaimRecord};
pub use claim_type::ClaimType;
pub use document::{DocumentError, DocumentPayload};
pub use error::{AdmissionError, ClaimError, SubmissionError, SubmissionFailure, ValidationError};
pub use feed::ClaimFeed;
pub use policy::{ClaimPolicy, Evaluation, FieldError, PolicyEvaluator, ValidatedClaim};
pub use ports::{owner_folder, ClaimQuery, ClaimStore, DocumentStore, StoredDocument};
pub use review::ReviewService;
pub use submission::{
    ClaimDraft, ClaimSession, SubmissionOutcome, SubmissionService, SubmissionState,
    DEFAULT_ADMISSION_TIMEOUT,
};
