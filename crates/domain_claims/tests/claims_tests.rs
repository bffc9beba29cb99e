//! Comprehensive tests for domain_claims

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{Currency, OwnerId};

use domain_claims::adapters::{InMemoryClaimStore, InMemoryDocumentStore};
use domain_claims::{
    AdmissionError, ClaimFeed, ClaimPolicy, ClaimQuery, ClaimStatus, ClaimStore,
    ClaimType, DocumentPayload, PolicyEvaluator, ReviewService, SubmissionError, SubmissionFailure,
    SubmissionOutcome, SubmissionService, SubmissionState,
};
use test_utils::{DocumentFixtures, FailingClaimStore, FailingDocumentStore, ScriptedAdmission};

struct Harness {
    service: SubmissionService,
    classifier: Arc<ScriptedAdmission>,
    documents: InMemoryDocumentStore,
    claims: InMemoryClaimStore,
    feed: ClaimFeed,
}

fn harness(classifier: Arc<ScriptedAdmission>) -> Harness {
    let documents = InMemoryDocumentStore::new();
    let claims = InMemoryClaimStore::new();
    let feed = ClaimFeed::new(Arc::new(claims.clone()));
    let service = SubmissionService::new(
        PolicyEvaluator::default(),
        classifier.clone(),
        Arc::new(documents.clone()),
        Arc::new(claims.clone()),
    )
    .with_feed(feed.clone());

    Harness {
        service,
        classifier,
        documents,
        claims,
        feed,
    }
}

fn bill() -> DocumentPayload {
    DocumentFixtures::bill()
}

// ============================================================================
// Policy Tests
// ============================================================================

mod policy_tests {
    use super::*;

    #[test]
    fn test_standard_policy_values() {
        let policy = ClaimPolicy::standard(Currency::USD);
        assert_eq!(policy.limit_for(ClaimType::Mobile).amount(), dec!(350));
        assert_eq!(policy.limit_for(ClaimType::Broadband).amount(), dec!(650));
        assert_eq!(policy.return_rate().as_decimal(), dec!(0.83));
        assert_eq!(policy.absolute_cap().amount(), dec!(10000));
    }

    #[test]
    fn test_validation_order_first_failure_wins() {
        let evaluator = PolicyEvaluator::default();

        let err = evaluator.validate_submission(None, Some(dec!(-1)), false).unwrap_err();
        assert_eq!(err.code(), "missing_type");

        let err = evaluator
            .validate_submission(Some(ClaimType::Mobile), Some(dec!(0)), false)
            .unwrap_err();
        assert_eq!(err.code(), "non_positive_amount");

        let err = evaluator
            .validate_submission(Some(ClaimType::Mobile), Some(dec!(10001)), false)
            .unwrap_err();
        assert_eq!(err.to_string(), "Amount seems too high.");

        let err = evaluator
            .validate_submission(Some(ClaimType::Mobile), Some(dec!(351)), false)
            .unwrap_err();
        assert_eq!(err.to_string(), "Amount cannot exceed $350 for Mobile claims.");

        let err = evaluator
            .validate_submission(Some(ClaimType::Mobile), Some(dec!(350)), false)
            .unwrap_err();
        assert_eq!(err.to_string(), "A supporting document is required.");
    }

    #[test]
    fn test_validated_claim_carries_evaluation() {
        let claim = PolicyEvaluator::default()
            .validate_submission(Some(ClaimType::Broadband), Some(dec!(650)), true)
            .unwrap();
        assert_eq!(claim.max_amount.amount(), dec!(650));
        assert_eq!(claim.return_amount.amount(), dec!(539.50));
    }

    #[test]
    fn test_field_errors_report_every_field() {
        let errors = PolicyEvaluator::default().field_errors(Some(ClaimType::Mobile), Some(dec!(400)), false);
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["claimAmount", "file"]);
    }
}

// ============================================================================
// Submission Tests
// ============================================================================

mod submission_tests {
    use super::*;

    fn filled_session(h: &Harness, claim_type: ClaimType, amount: Decimal) -> domain_claims::ClaimSession {
        let mut session = h.service.new_session(OwnerId::anonymous(), Some("Ada".to_string()));
        session.draft_mut().set_claim_type(Some(claim_type));
        session.draft_mut().set_claim_amount(Some(amount));
        session.draft_mut().set_document(bill());
        session
    }

    #[tokio::test]
    async fn test_accepted_claim_is_recorded() {
        let h = harness(ScriptedAdmission::accepting());
        let mut session = filled_session(&h, ClaimType::Mobile, dec!(300));

        let outcome = h.service.submit(&mut session).await.unwrap();

        let SubmissionOutcome::Accepted(record) = outcome else {
            panic!("expected acceptance, got {outcome:?}");
        };
        assert_eq!(record.claim_type, ClaimType::Mobile);
        assert_eq!(record.claim_amount.amount(), dec!(300));
        assert_eq!(record.return_amount.amount(), dec!(249.00));
        assert_eq!(record.claim_limit.amount(), dec!(350));
        assert_eq!(record.status, ClaimStatus::Submitted);
        assert_eq!(record.owner_name.as_deref(), Some("Ada"));
        assert_eq!(record.file_name, "bill.png");
        assert!(record.file_url.starts_with("memory://claims/anonymous_user/"));

        assert_eq!(session.state(), &SubmissionState::Accepted { claim_id: record.id });
        assert_eq!(h.classifier.calls(), 1);
        assert_eq!(h.documents.len().await, 1);
        assert_eq!(h.claims.len().await, 1);
        assert_eq!(h.feed.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn test_over_limit_never_reaches_classifier() {
        let h = harness(ScriptedAdmission::accepting());
        let mut session = filled_session(&h, ClaimType::Broadband, dec!(700));

        let outcome = h.service.submit(&mut session).await.unwrap();

        let SubmissionOutcome::Invalid(errors) = outcome else {
            panic!("expected validation failure");
        };
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Amount cannot exceed $650 for Broadband claims.");
        assert_eq!(session.field_errors(), errors.as_slice());
        assert_eq!(session.state(), &SubmissionState::Idle);
        assert_eq!(h.classifier.calls(), 0);
        assert!(h.claims.is_empty().await);
    }

    #[tokio::test]
    async fn test_missing_document_is_invalid() {
        let h = harness(ScriptedAdmission::accepting());
        let mut session = filled_session(&h, ClaimType::Mobile, dec!(100));
        session.draft_mut().clear_document();

        let outcome = h.service.submit(&mut session).await.unwrap();

        assert!(matches!(outcome, SubmissionOutcome::Invalid(ref errors) if errors[0].field == "file"));
        assert_eq!(h.classifier.calls(), 0);
    }

    #[tokio::test]
    async fn test_not_a_document_is_rejected_without_storage() {
        let h = harness(ScriptedAdmission::refusing());
        let mut session = filled_session(&h, ClaimType::Mobile, dec!(120));

        let outcome = h.service.submit(&mut session).await.unwrap();

        assert!(matches!(outcome, SubmissionOutcome::Rejected));
        assert_eq!(session.state(), &SubmissionState::Rejected);
        assert!(h.documents.is_empty().await);
        assert!(h.claims.is_empty().await);
    }

    #[tokio::test]
    async fn test_classifier_failure_is_verification_failed() {
        let h = harness(ScriptedAdmission::answering(Err(AdmissionError::UnexpectedStatus {
            status: 503,
        })));
        let mut session = filled_session(&h, ClaimType::Mobile, dec!(120));

        let outcome = h.service.submit(&mut session).await.unwrap();

        let SubmissionOutcome::Failed(failure) = outcome else {
            panic!("expected failure");
        };
        assert_eq!(failure.code(), "verification_failed");
        assert!(matches!(session.state(), SubmissionState::Failed { code, .. } if code == "verification_failed"));
        assert!(h.claims.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_classifier_times_out() {
        let h = harness(ScriptedAdmission::slow(Duration::from_secs(120)));
        let service = SubmissionService::new(
            PolicyEvaluator::default(),
            h.classifier.clone(),
            Arc::new(h.documents.clone()),
            Arc::new(h.claims.clone()),
        )
        .with_admission_timeout(Duration::from_secs(5));
        let mut session = filled_session(&h, ClaimType::Mobile, dec!(120));

        let outcome = service.submit(&mut session).await.unwrap();

        assert!(matches!(
            outcome,
            SubmissionOutcome::Failed(SubmissionFailure::Admission(AdmissionError::TimedOut(_)))
        ));
        assert!(h.claims.is_empty().await);
    }

    #[tokio::test]
    async fn test_storage_failure_is_submission_failed() {
        let classifier = ScriptedAdmission::accepting();
        let claims = InMemoryClaimStore::new();
        let service = SubmissionService::new(
            PolicyEvaluator::default(),
            classifier,
            Arc::new(FailingDocumentStore),
            Arc::new(claims.clone()),
        );
        let mut session = service.new_session(OwnerId::anonymous(), None);
        session.draft_mut().set_claim_type(Some(ClaimType::Broadband));
        session.draft_mut().set_claim_amount(Some(dec!(50)));
        session.draft_mut().set_document(bill());

        let outcome = service.submit(&mut session).await.unwrap();

        assert!(matches!(outcome, SubmissionOutcome::Failed(ref f) if f.code() == "submission_failed"));
        assert!(claims.is_empty().await);
    }

    #[tokio::test]
    async fn test_record_write_failure_leaves_uploaded_document() {
        let documents = InMemoryDocumentStore::new();
        let service = SubmissionService::new(
            PolicyEvaluator::default(),
            ScriptedAdmission::accepting(),
            Arc::new(documents.clone()),
            Arc::new(FailingClaimStore),
        );
        let mut session = service.new_session(OwnerId::new("user-7"), None);
        session.draft_mut().set_claim_type(Some(ClaimType::Mobile));
        session.draft_mut().set_claim_amount(Some(dec!(200)));
        session.draft_mut().set_document(bill());

        let outcome = service.submit(&mut session).await.unwrap();

        assert!(matches!(
            outcome,
            SubmissionOutcome::Failed(SubmissionFailure::Persistence(_))
        ));
        assert!(matches!(session.state(), SubmissionState::Failed { code, .. } if code == "submission_failed"));
        assert_eq!(documents.len().await, 1);
    }

    #[tokio::test]
    async fn test_rejected_session_can_retry_but_accepted_cannot() {
        let h = harness(ScriptedAdmission::refusing());
        let mut session = filled_session(&h, ClaimType::Mobile, dec!(120));
        h.service.submit(&mut session).await.unwrap();
        assert_eq!(session.state(), &SubmissionState::Rejected);

        let h2 = harness(ScriptedAdmission::accepting());
        let outcome = h2.service.submit(&mut session).await.unwrap();
        assert!(matches!(outcome, SubmissionOutcome::Accepted(_)));

        let err = h2.service.submit(&mut session).await.unwrap_err();
        assert_eq!(err, SubmissionError::AlreadyAccepted);
        assert_eq!(h2.classifier.calls(), 1);
    }
}

// ============================================================================
// Review Tests
// ============================================================================

mod review_tests {
    use super::*;
    use domain_claims::ClaimError;

    async fn recorded_claim(h: &Harness) -> domain_claims::ClaimRecord {
        let mut session = h.service.new_session(OwnerId::new("user-7"), None);
        session.draft_mut().set_claim_type(Some(ClaimType::Mobile));
        session.draft_mut().set_claim_amount(Some(dec!(99.99)));
        session.draft_mut().set_document(bill());
        match h.service.submit(&mut session).await.unwrap() {
            SubmissionOutcome::Accepted(record) => record,
            other => panic!("expected acceptance, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_reviewer_approves_once() {
        let h = harness(ScriptedAdmission::accepting());
        let record = recorded_claim(&h).await;
        assert_eq!(record.return_amount.amount(), dec!(82.99));

        let review = ReviewService::new(Arc::new(h.claims.clone())).with_feed(h.feed.clone());
        let approved = review.decide(record.id, ClaimStatus::Approved, "reviewer-1").await.unwrap();
        assert_eq!(approved.status, ClaimStatus::Approved);
        assert_eq!(h.feed.snapshot()[0].status, ClaimStatus::Approved);

        let err = review.decide(record.id, ClaimStatus::Rejected, "reviewer-1").await.unwrap_err();
        assert!(matches!(err, ClaimError::InvalidStatusTransition { .. }));
    }

    #[tokio::test]
    async fn test_unknown_claim_is_not_found() {
        let h = harness(ScriptedAdmission::accepting());
        let review = ReviewService::new(Arc::new(h.claims.clone()));
        let err = review.get(core_kernel::ClaimId::new()).await.unwrap_err();
        assert!(matches!(err, ClaimError::ClaimNotFound(_)));
    }

    #[tokio::test]
    async fn test_list_by_owner() {
        let h = harness(ScriptedAdmission::accepting());
        recorded_claim(&h).await;
        let review = ReviewService::new(Arc::new(h.claims.clone()));
        assert_eq!(review.list(ClaimQuery::by_owner(OwnerId::new("user-7"))).await.unwrap().len(), 1);
        assert!(review.list(ClaimQuery::by_owner(OwnerId::new("other"))).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_feed_subscribers_see_new_claims() {
        let h = harness(ScriptedAdmission::accepting());
        let mut rx = h.feed.subscribe();
        recorded_claim(&h).await;
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().len(), 1);
        let listed = h.claims.list(ClaimQuery::all()).await.unwrap();
        assert_eq!(listed[0].id, rx.borrow()[0].id);
    }
}

// ============================================================================
// Property Tests
// ============================================================================

mod proptests {
    use super::*;
    use proptest::prelude::*;
    use test_utils::fine_amount_strategy;

    fn claim_type() -> impl Strategy<Value = ClaimType> {
        prop_oneof![Just(ClaimType::Mobile), Just(ClaimType::Broadband)]
    }

    // Amounts in cents up to 20000.00
    fn amount() -> impl Strategy<Value = Decimal> {
        (-100i64..2_000_000).prop_map(|cents| Decimal::new(cents, 2))
    }

    proptest! {
        #[test]
        fn return_is_rate_times_amount_or_zero(t in claim_type(), a in amount()) {
            let evaluator = PolicyEvaluator::default();
            let eval = evaluator.evaluate(Some(t), Some(a));
            let limit = evaluator.policy().limit_for(t).amount();

            if a > Decimal::ZERO && a <= limit {
                prop_assert!(eval.within_policy);
                prop_assert_eq!(eval.return_amount.amount(), a * dec!(0.83));
            } else {
                prop_assert!(!eval.within_policy);
                prop_assert!(eval.return_amount.is_zero());
            }
        }

        #[test]
        fn return_never_exceeds_rate_times_limit(t in claim_type(), a in amount()) {
            let evaluator = PolicyEvaluator::default();
            let eval = evaluator.evaluate(Some(t), Some(a));
            let ceiling = evaluator.policy().limit_for(t).amount() * dec!(0.83);
            prop_assert!(eval.return_amount.amount() <= ceiling);
        }

        #[test]
        fn validation_agrees_with_evaluation(t in claim_type(), a in amount()) {
            let evaluator = PolicyEvaluator::default();
            let eval = evaluator.evaluate(Some(t), Some(a));
            let validated = evaluator.validate_submission(Some(t), Some(a), true);
            prop_assert_eq!(validated.is_ok(), eval.within_policy);
        }

        #[test]
        fn validation_agrees_with_evaluation_at_any_precision(t in claim_type(), a in fine_amount_strategy()) {
            let evaluator = PolicyEvaluator::default();
            let eval = evaluator.evaluate(Some(t), Some(a));
            let validated = evaluator.validate_submission(Some(t), Some(a), true);
            prop_assert_eq!(validated.is_ok(), eval.within_policy);

            if let Ok(claim) = validated {
                prop_assert_eq!(claim.claim_amount.amount(), a);
                prop_assert!(a <= claim.max_amount.amount());
                prop_assert!(!claim.return_amount.is_zero());
            }
        }

        #[test]
        fn first_field_error_matches_validation(a in amount(), has_type in any::<bool>(), has_doc in any::<bool>()) {
            let evaluator = PolicyEvaluator::default();
            let t = has_type.then_some(ClaimType::Mobile);
            let errors = evaluator.field_errors(t, Some(a), has_doc);
            match evaluator.validate_submission(t, Some(a), has_doc) {
                Ok(_) => prop_assert!(errors.is_empty()),
                Err(e) => prop_assert_eq!(&errors[0].code, e.code()),
            }
        }
    }
}
