//! Claim submission
//!
//! # Flow
//!
//! ```text
//!          submit                 valid                 verdict=true, stored
//!  Idle ───────────▶ Validating ────────▶ AwaitingAdmission ───────────────▶ Accepted
//!   ▲                    │                    │        │
//!   │   field errors     │                    │        └── verdict=false ──▶ Rejected
//!   └────────────────────┘                    └─ classifier/storage error ─▶ Failed
//! ```
//!
//! Rejected and Failed sessions return to Idle on the next submit. A record
//! is written only when validation passed, the verdict was positive, the
//! document upload succeeded and the record write succeeded.
//!
//! [`ClaimDraft`] is the form state; every setter recomputes the policy
//! evaluation so the reimbursement shown is never stale.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, info_span, warn, Instrument};

use core_kernel::{ClaimId, CoreError, Money, OwnerId, SubmissionId};
use crate::admission::DocumentAdmissionPort;
use crate::claim::{ClaimRecord, NewClaimRecord};
use crate::claim_type::ClaimType;
use crate::document::DocumentPayload;
use crate::error::{AdmissionError, SubmissionError, SubmissionFailure, ValidationError};
use crate::feed::ClaimFeed;
use crate::policy::{Evaluation, FieldError, PolicyEvaluator, ValidatedClaim};
use crate::ports::{ClaimStore, DocumentStore};

/// Default bound on the wait for a classifier verdict
pub const DEFAULT_ADMISSION_TIMEOUT: Duration = Duration::from_secs(30);

/// Form state for a claim that has not been submitted yet
#[derive(Debug, Clone)]
pub struct ClaimDraft {
    evaluator: PolicyEvaluator,
    claim_type: Option<ClaimType>,
    claim_amount: Option<Decimal>,
    document: Option<DocumentPayload>,
    evaluation: Evaluation,
}

impl ClaimDraft {
    pub fn new(evaluator: PolicyEvaluator) -> Self {
        let evaluation = evaluator.evaluate(None, None);
        Self {
            evaluator,
            claim_type: None,
            claim_amount: None,
            document: None,
            evaluation,
        }
    }

    pub fn set_claim_type(&mut self, claim_type: Option<ClaimType>) {
        self.claim_type = claim_type;
        self.recompute();
    }

    pub fn set_claim_amount(&mut self, claim_amount: Option<Decimal>) {
        self.claim_amount = claim_amount;
        self.recompute();
    }

    /// Sets the amount from raw text input; blank input clears it
    ///
    /// Unparseable input clears the amount and is reported as a validation
    /// error.
    pub fn set_amount_input(&mut self, input: &str) -> Result<(), CoreError> {
        if input.trim().is_empty() {
            self.set_claim_amount(None);
            return Ok(());
        }

        let currency = self.evaluator.policy().currency();
        match Money::parse(input, currency) {
            Ok(amount) => {
                self.set_claim_amount(Some(amount.amount()));
                Ok(())
            }
            Err(_) => {
                self.set_claim_amount(None);
                Err(CoreError::invalid_input("claimAmount", format!("'{input}' is not an amount")))
            }
        }
    }

    pub fn set_document(&mut self, document: DocumentPayload) {
        self.document = Some(document);
        self.recompute();
    }

    pub fn clear_document(&mut self) {
        self.document = None;
        self.recompute();
    }

    pub fn claim_type(&self) -> Option<ClaimType> {
        self.claim_type
    }

    pub fn claim_amount(&self) -> Option<Decimal> {
        self.claim_amount
    }

    pub fn document(&self) -> Option<&DocumentPayload> {
        self.document.as_ref()
    }

    pub fn document_present(&self) -> bool {
        self.document.as_ref().is_some_and(DocumentPayload::is_present)
    }

    /// Ceiling and reimbursement for the current input
    pub fn evaluation(&self) -> &Evaluation {
        &self.evaluation
    }

    pub fn validate(&self) -> Result<ValidatedClaim, ValidationError> {
        self.evaluator
            .validate_submission(self.claim_type, self.claim_amount, self.document_present())
    }

    pub fn field_errors(&self) -> Vec<FieldError> {
        self.evaluator
            .field_errors(self.claim_type, self.claim_amount, self.document_present())
    }

    fn validated(&self) -> Result<(ValidatedClaim, &DocumentPayload), ValidationError> {
        let claim = self.validate()?;
        let document = self
            .document
            .as_ref()
            .filter(|d| d.is_present())
            .ok_or(ValidationError::MissingDocument)?;
        Ok((claim, document))
    }

    fn recompute(&mut self) {
        self.evaluation = self.evaluator.evaluate(self.claim_type, self.claim_amount);
    }
}

/// Where a session is in the submission flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SubmissionState {
    Idle,
    Validating,
    AwaitingAdmission,
    Accepted { claim_id: ClaimId },
    Rejected,
    Failed { code: String, message: String },
}

impl SubmissionState {
    /// True while a submit is running; the submit control stays disabled
    pub fn is_in_flight(&self) -> bool {
        matches!(self, SubmissionState::Validating | SubmissionState::AwaitingAdmission)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SubmissionState::Accepted { .. } | SubmissionState::Rejected | SubmissionState::Failed { .. }
        )
    }
}

/// Result of one submit
#[derive(Debug)]
pub enum SubmissionOutcome {
    /// Validation failed; nothing left the process
    Invalid(Vec<FieldError>),
    /// The classifier said the upload is not a document
    Rejected,
    /// Verdict could not be obtained, or storing the claim failed
    Failed(SubmissionFailure),
    Accepted(ClaimRecord),
}

/// One user's claim form and its submission state
#[derive(Debug, Clone)]
pub struct ClaimSession {
    owner_id: OwnerId,
    owner_name: Option<String>,
    draft: ClaimDraft,
    state: SubmissionState,
    field_errors: Vec<FieldError>,
}

impl ClaimSession {
    pub fn new(owner_id: OwnerId, owner_name: Option<String>, evaluator: PolicyEvaluator) -> Self {
        Self {
            owner_id,
            owner_name,
            draft: ClaimDraft::new(evaluator),
            state: SubmissionState::Idle,
            field_errors: Vec::new(),
        }
    }

    pub fn owner_id(&self) -> &OwnerId {
        &self.owner_id
    }

    pub fn draft(&self) -> &ClaimDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut ClaimDraft {
        &mut self.draft
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    /// Errors from the last failed validation
    pub fn field_errors(&self) -> &[FieldError] {
        &self.field_errors
    }

    /// Gives up on an in-flight submit whose future was dropped
    pub fn abandon(&mut self) {
        if self.state.is_in_flight() {
            self.state = SubmissionState::Idle;
        }
    }

    fn begin(&mut self) -> Result<(), SubmissionError> {
        match self.state {
            SubmissionState::Validating | SubmissionState::AwaitingAdmission => {
                Err(SubmissionError::AlreadyInFlight)
            }
            SubmissionState::Accepted { .. } => Err(SubmissionError::AlreadyAccepted),
            SubmissionState::Idle | SubmissionState::Rejected | SubmissionState::Failed { .. } => {
                self.state = SubmissionState::Validating;
                self.field_errors.clear();
                Ok(())
            }
        }
    }
}

/// Runs claim sessions through validation, admission and persistence
pub struct SubmissionService {
    evaluator: PolicyEvaluator,
    admission: Arc<dyn DocumentAdmissionPort>,
    documents: Arc<dyn DocumentStore>,
    claims: Arc<dyn ClaimStore>,
    feed: Option<ClaimFeed>,
    admission_timeout: Duration,
}

impl SubmissionService {
    pub fn new(
        evaluator: PolicyEvaluator,
        admission: Arc<dyn DocumentAdmissionPort>,
        documents: Arc<dyn DocumentStore>,
        claims: Arc<dyn ClaimStore>,
    ) -> Self {
        Self {
            evaluator,
            admission,
            documents,
            claims,
            feed: None,
            admission_timeout: DEFAULT_ADMISSION_TIMEOUT,
        }
    }

    /// Refreshes `feed` after every accepted claim
    pub fn with_feed(mut self, feed: ClaimFeed) -> Self {
        self.feed = Some(feed);
        self
    }

    pub fn with_admission_timeout(mut self, timeout: Duration) -> Self {
        self.admission_timeout = timeout;
        self
    }

    pub fn evaluator(&self) -> &PolicyEvaluator {
        &self.evaluator
    }

    /// Starts an empty form for `owner_id`
    pub fn new_session(&self, owner_id: OwnerId, owner_name: Option<String>) -> ClaimSession {
        ClaimSession::new(owner_id, owner_name, self.evaluator.clone())
    }

    /// Submits the session's draft
    ///
    /// Refuses to start while a submit is in flight or after the claim was
    /// accepted. A Rejected or Failed session is reset to Idle first.
    pub async fn submit(&self, session: &mut ClaimSession) -> Result<SubmissionOutcome, SubmissionError> {
        session.begin()?;

        let submission_id = SubmissionId::new_v7();
        let span = info_span!(
            "claim_submission",
            %submission_id,
            owner = %session.owner_id,
        );

        Ok(self.run(session).instrument(span).await)
    }

    async fn run(&self, session: &mut ClaimSession) -> SubmissionOutcome {
        let (claim, document) = match session.draft.validated() {
            Ok(validated) => validated,
            Err(error) => {
                info!(code = error.code(), "claim failed validation");
                session.field_errors = session.draft.field_errors();
                session.state = SubmissionState::Idle;
                return SubmissionOutcome::Invalid(session.field_errors.clone());
            }
        };

        session.state = SubmissionState::AwaitingAdmission;
        info!(
            claim_type = %claim.claim_type,
            amount = %claim.claim_amount.amount(),
            media_type = document.media_type(),
            size = document.size(),
            "checking supporting document"
        );

        let check = self.admission.check_document(document);
        let verdict = match tokio::time::timeout(self.admission_timeout, check).await {
            Ok(Ok(verdict)) => verdict,
            Ok(Err(error)) => return fail(&mut session.state, error.into()),
            Err(_) => {
                let error = AdmissionError::TimedOut(self.admission_timeout);
                return fail(&mut session.state, error.into());
            }
        };

        if !verdict.is_document {
            info!(verdict = false, "supporting document rejected");
            session.state = SubmissionState::Rejected;
            return SubmissionOutcome::Rejected;
        }
        info!(verdict = true, "supporting document accepted");

        let stored = match self.documents.upload(&session.owner_id, document).await {
            Ok(stored) => stored,
            Err(error) => return fail(&mut session.state, error.into()),
        };

        let new_claim = NewClaimRecord::submitted(
            session.owner_id.clone(),
            session.owner_name.clone(),
            &claim,
            &stored,
        );
        let record = match self.claims.insert(new_claim).await {
            Ok(record) => record,
            Err(error) => {
                // No compensation: the uploaded document stays where it is
                warn!(path = %stored.path, "document stored but claim record was not written");
                return fail(&mut session.state, error.into());
            }
        };

        info!(
            claim_id = %record.id,
            return_amount = %record.return_amount.amount(),
            "claim submitted"
        );
        session.state = SubmissionState::Accepted { claim_id: record.id };

        if let Some(feed) = &self.feed {
            if let Err(error) = feed.refresh().await {
                warn!(%error, "claim feed refresh failed");
            }
        }

        SubmissionOutcome::Accepted(record)
    }
}

fn fail(state: &mut SubmissionState, failure: SubmissionFailure) -> SubmissionOutcome {
    warn!(code = failure.code(), error = %failure, "claim submission failed");
    *state = SubmissionState::Failed {
        code: failure.code().to_string(),
        message: failure.to_string(),
    };
    SubmissionOutcome::Failed(failure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn draft() -> ClaimDraft {
        ClaimDraft::new(PolicyEvaluator::default())
    }

    #[test]
    fn test_draft_recomputes_on_every_change() {
        let mut draft = draft();
        assert!(draft.evaluation().max_amount.is_zero());

        draft.set_claim_type(Some(ClaimType::Mobile));
        assert_eq!(draft.evaluation().max_amount.amount(), dec!(350));

        draft.set_claim_amount(Some(dec!(100)));
        assert_eq!(draft.evaluation().return_amount.amount(), dec!(83.00));

        draft.set_claim_type(Some(ClaimType::Broadband));
        assert_eq!(draft.evaluation().max_amount.amount(), dec!(650));
        assert_eq!(draft.evaluation().return_amount.amount(), dec!(83.00));

        draft.set_claim_amount(Some(dec!(700)));
        assert!(draft.evaluation().return_amount.is_zero());
    }

    #[test]
    fn test_amount_input_parsing() {
        let mut draft = draft();
        draft.set_claim_type(Some(ClaimType::Mobile));

        draft.set_amount_input("120.50").unwrap();
        assert_eq!(draft.claim_amount(), Some(dec!(120.50)));

        draft.set_amount_input("  ").unwrap();
        assert_eq!(draft.claim_amount(), None);

        assert!(draft.set_amount_input("12O").is_err());
        assert_eq!(draft.claim_amount(), None);
        assert!(draft.evaluation().return_amount.is_zero());
    }

    #[test]
    fn test_empty_document_is_not_present() {
        let mut draft = draft();
        draft.set_document(DocumentPayload::new("a.png", "image/png", Vec::new()));
        assert!(!draft.document_present());
        draft.set_document(DocumentPayload::new("a.png", "image/png", vec![1]));
        assert!(draft.document_present());
        draft.clear_document();
        assert!(draft.document().is_none());
    }

    #[test]
    fn test_session_refuses_resubmit_while_in_flight() {
        let mut session = ClaimSession::new(OwnerId::anonymous(), None, PolicyEvaluator::default());
        session.state = SubmissionState::AwaitingAdmission;
        assert_eq!(session.begin(), Err(SubmissionError::AlreadyInFlight));

        session.abandon();
        assert_eq!(session.state(), &SubmissionState::Idle);
        assert!(session.begin().is_ok());
    }

    #[test]
    fn test_state_serializes_with_tag() {
        let json = serde_json::to_value(SubmissionState::AwaitingAdmission).unwrap();
        assert_eq!(json, serde_json::json!({ "state": "awaiting_admission" }));
    }
}
