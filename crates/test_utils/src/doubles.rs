//! Test Doubles for the Claim Ports
//!
//! In-memory stand-ins for the outside world: a classifier that answers
//! whatever it is told to, and stores that always fail.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use core_kernel::{ClaimId, DomainPort, OwnerId, PortError};
use domain_claims::{
    AdmissionError, AdmissionVerdict, ClaimQuery, ClaimRecord, ClaimStatus, ClaimStore,
    DocumentAdmissionPort, DocumentPayload, DocumentStore, NewClaimRecord, StoredDocument,
};

/// Classifier with a canned answer
///
/// Counts calls so tests can assert the classifier was, or was not,
/// consulted.
#[derive(Debug)]
pub struct ScriptedAdmission {
    answer: Result<AdmissionVerdict, AdmissionError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl ScriptedAdmission {
    pub fn answering(answer: Result<AdmissionVerdict, AdmissionError>) -> Arc<Self> {
        Arc::new(Self {
            answer,
            delay: None,
            calls: AtomicUsize::new(0),
        })
    }

    /// Says every file is a document
    pub fn accepting() -> Arc<Self> {
        Self::answering(Ok(AdmissionVerdict::document()))
    }

    /// Says no file is a document
    pub fn refusing() -> Arc<Self> {
        Self::answering(Ok(AdmissionVerdict::not_a_document()))
    }

    /// Fails as if the classifier were down
    pub fn unreachable() -> Arc<Self> {
        Self::answering(Err(AdmissionError::Transport("connection refused".to_string())))
    }

    /// Accepts, but only after `delay`
    pub fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            answer: Ok(AdmissionVerdict::document()),
            delay: Some(delay),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DomainPort for ScriptedAdmission {}

#[async_trait]
impl DocumentAdmissionPort for ScriptedAdmission {
    async fn check_document(&self, _document: &DocumentPayload) -> Result<AdmissionVerdict, AdmissionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.answer.clone()
    }
}

/// Document store whose uploads always fail
#[derive(Debug, Default)]
pub struct FailingDocumentStore;

impl DomainPort for FailingDocumentStore {}

#[async_trait]
impl DocumentStore for FailingDocumentStore {
    async fn upload(&self, _owner_id: &OwnerId, _document: &DocumentPayload) -> Result<StoredDocument, PortError> {
        Err(PortError::unavailable("document storage", "connection refused"))
    }
}

/// Claim store that refuses writes and reads nothing
#[derive(Debug, Default)]
pub struct FailingClaimStore;

impl DomainPort for FailingClaimStore {}

#[async_trait]
impl ClaimStore for FailingClaimStore {
    async fn insert(&self, _claim: NewClaimRecord) -> Result<ClaimRecord, PortError> {
        Err(PortError::unavailable("claim database", "connection refused"))
    }

    async fn get(&self, id: ClaimId) -> Result<ClaimRecord, PortError> {
        Err(PortError::not_found("Claim", id))
    }

    async fn list(&self, _query: ClaimQuery) -> Result<Vec<ClaimRecord>, PortError> {
        Ok(Vec::new())
    }

    async fn update_status(&self, _id: ClaimId, _status: ClaimStatus) -> Result<ClaimRecord, PortError> {
        Err(PortError::unavailable("claim database", "connection refused"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::DocumentFixtures;

    #[tokio::test]
    async fn test_scripted_admission_counts_calls() {
        let classifier = ScriptedAdmission::refusing();
        let verdict = classifier.check_document(&DocumentFixtures::bill()).await.unwrap();
        assert!(!verdict.is_document);
        assert_eq!(classifier.calls(), 1);
    }

    #[tokio::test]
    async fn test_failing_stores_fail() {
        let owner = OwnerId::new("user-1");
        assert!(FailingDocumentStore.upload(&owner, &DocumentFixtures::bill()).await.is_err());
        assert!(FailingClaimStore.get(ClaimId::new()).await.unwrap_err().is_not_found());
    }
}
