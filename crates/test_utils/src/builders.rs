//! Test Data Builders
//!
//! Builders with sensible defaults so tests only spell out the fields
//! they care about.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use core_kernel::{ClaimId, Currency, Money, OwnerId};
use domain_claims::adapters::{InMemoryClaimStore, InMemoryDocumentStore};
use domain_claims::{
    ClaimFeed, ClaimRecord, ClaimStatus, ClaimType, DocumentAdmissionPort, DocumentStore,
    NewClaimRecord, PolicyEvaluator, ReviewService, SubmissionService,
};

use crate::doubles::ScriptedAdmission;
use crate::fixtures::{MoneyFixtures, OwnerFixtures, PolicyFixtures};

/// Builder for claim records
///
/// Defaults to a Submitted 300 USD Mobile claim by Alice; the return
/// amount and ceiling follow the standard policy unless overridden.
pub struct ClaimRecordBuilder {
    owner_id: OwnerId,
    owner_name: Option<String>,
    claim_type: ClaimType,
    claim_amount: Money,
    return_amount: Option<Money>,
    file_name: String,
    status: ClaimStatus,
}

impl Default for ClaimRecordBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaimRecordBuilder {
    pub fn new() -> Self {
        Self {
            owner_id: OwnerFixtures::alice(),
            owner_name: Some("Alice".to_string()),
            claim_type: ClaimType::Mobile,
            claim_amount: MoneyFixtures::phone_bill(),
            return_amount: None,
            file_name: "bill.png".to_string(),
            status: ClaimStatus::Submitted,
        }
    }

    pub fn with_owner(mut self, owner_id: OwnerId) -> Self {
        self.owner_id = owner_id;
        self
    }

    pub fn with_owner_name(mut self, name: impl Into<String>) -> Self {
        self.owner_name = Some(name.into());
        self
    }

    pub fn with_type(mut self, claim_type: ClaimType) -> Self {
        self.claim_type = claim_type;
        self
    }

    /// Sets the claimed amount in USD
    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.claim_amount = Money::new(amount, Currency::USD);
        self
    }

    pub fn with_return_amount(mut self, amount: Money) -> Self {
        self.return_amount = Some(amount);
        self
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    pub fn with_status(mut self, status: ClaimStatus) -> Self {
        self.status = status;
        self
    }

    /// Builds the insert payload a store receives
    pub fn build_new(self) -> NewClaimRecord {
        let policy = PolicyFixtures::standard();
        let claim_limit = policy.limit_for(self.claim_type);
        let return_amount = self
            .return_amount
            .unwrap_or_else(|| policy.return_rate().apply(&self.claim_amount).round_to_currency());
        let file_url = format!("memory://claims/{}/{}", self.owner_id, self.file_name);

        NewClaimRecord {
            owner_id: self.owner_id,
            owner_name: self.owner_name,
            claim_type: self.claim_type,
            claim_amount: self.claim_amount,
            return_amount,
            claim_limit,
            file_url,
            file_name: self.file_name,
            status: self.status,
        }
    }

    /// Builds a stored record with a fresh id
    pub fn build_at(self, created_at: DateTime<Utc>) -> ClaimRecord {
        self.build_new().into_record(ClaimId::new_v7(), created_at)
    }

    pub fn build(self) -> ClaimRecord {
        self.build_at(Utc::now())
    }
}

/// Submission and review services wired to in-memory adapters
pub struct TestServices {
    pub submissions: SubmissionService,
    pub reviews: ReviewService,
    pub feed: ClaimFeed,
    pub claims: Arc<InMemoryClaimStore>,
    pub documents: Arc<InMemoryDocumentStore>,
}

/// Builder for [`TestServices`]
pub struct TestServicesBuilder {
    evaluator: PolicyEvaluator,
    admission: Arc<dyn DocumentAdmissionPort>,
    documents: Option<Arc<dyn DocumentStore>>,
    admission_timeout: Option<Duration>,
}

impl Default for TestServicesBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestServicesBuilder {
    /// Standard policy and a classifier that accepts everything
    pub fn new() -> Self {
        Self {
            evaluator: PolicyFixtures::evaluator(),
            admission: ScriptedAdmission::accepting(),
            documents: None,
            admission_timeout: None,
        }
    }

    pub fn with_evaluator(mut self, evaluator: PolicyEvaluator) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn with_admission(mut self, admission: Arc<dyn DocumentAdmissionPort>) -> Self {
        self.admission = admission;
        self
    }

    /// Uploads go here instead of the in-memory document store
    pub fn with_documents(mut self, documents: Arc<dyn DocumentStore>) -> Self {
        self.documents = Some(documents);
        self
    }

    pub fn with_admission_timeout(mut self, timeout: Duration) -> Self {
        self.admission_timeout = Some(timeout);
        self
    }

    pub fn build(self) -> TestServices {
        let claims = Arc::new(InMemoryClaimStore::new());
        let memory_documents = Arc::new(InMemoryDocumentStore::new());
        let documents: Arc<dyn DocumentStore> = self
            .documents
            .unwrap_or_else(|| memory_documents.clone() as Arc<dyn DocumentStore>);
        let feed = ClaimFeed::new(claims.clone());

        let mut submissions = SubmissionService::new(self.evaluator, self.admission, documents, claims.clone())
            .with_feed(feed.clone());
        if let Some(timeout) = self.admission_timeout {
            submissions = submissions.with_admission_timeout(timeout);
        }
        let reviews = ReviewService::new(claims.clone()).with_feed(feed.clone());

        TestServices {
            submissions,
            reviews,
            feed,
            claims,
            documents: memory_documents,
        }
    }
}
