//! In-memory stores
//!
//! Used when no database is configured and by tests. Contents are lost on
//! restart.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use core_kernel::{ClaimId, DomainPort, HealthCheckResult, HealthCheckable, OwnerId, PortError};
use crate::claim::{ClaimRecord, ClaimStatus, NewClaimRecord};
use crate::document::DocumentPayload;
use crate::ports::{document_path, sanitize_file_name, ClaimQuery, ClaimStore, DocumentStore, StoredDocument};

/// [`ClaimStore`] kept in a map
#[derive(Debug, Clone, Default)]
pub struct InMemoryClaimStore {
    claims: Arc<RwLock<HashMap<ClaimId, ClaimRecord>>>,
}

// Creation times are strictly increasing so listing order matches insert order
fn next_created_at(claims: &HashMap<ClaimId, ClaimRecord>) -> DateTime<Utc> {
    let now = Utc::now();
    match claims.values().map(|r| r.created_at).max() {
        Some(latest) if latest >= now => latest + chrono::Duration::microseconds(1),
        _ => now,
    }
}

impl InMemoryClaimStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.claims.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.claims.read().await.is_empty()
    }
}

impl DomainPort for InMemoryClaimStore {}

#[async_trait]
impl HealthCheckable for InMemoryClaimStore {
    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult::healthy("memory_claim_store", 0)
    }
}

#[async_trait]
impl ClaimStore for InMemoryClaimStore {
    async fn insert(&self, claim: NewClaimRecord) -> Result<ClaimRecord, PortError> {
        let mut claims = self.claims.write().await;
        let record = claim.into_record(ClaimId::new_v7(), next_created_at(&claims));
        claims.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get(&self, id: ClaimId) -> Result<ClaimRecord, PortError> {
        self.claims
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Claim", id))
    }

    async fn list(&self, query: ClaimQuery) -> Result<Vec<ClaimRecord>, PortError> {
        let claims = self.claims.read().await;
        let mut records: Vec<ClaimRecord> = claims.values().filter(|r| query.matches(r)).cloned().collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        if let Some(limit) = query.limit {
            records.truncate(limit as usize);
        }
        Ok(records)
    }

    async fn update_status(&self, id: ClaimId, status: ClaimStatus) -> Result<ClaimRecord, PortError> {
        let mut claims = self.claims.write().await;
        let record = claims.get_mut(&id).ok_or_else(|| PortError::not_found("Claim", id))?;
        if !record.status.can_transition_to(status) {
            return Err(PortError::conflict(format!(
                "claim {id} is {} and cannot become {status}",
                record.status
            )));
        }
        record.status = status;
        Ok(record.clone())
    }
}

/// [`DocumentStore`] kept in a map, with `memory://` URLs
#[derive(Debug, Clone, Default)]
pub struct InMemoryDocumentStore {
    documents: Arc<RwLock<HashMap<String, DocumentPayload>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Document stored at `path`
    pub async fn get(&self, path: &str) -> Option<DocumentPayload> {
        self.documents.read().await.get(path).cloned()
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

impl DomainPort for InMemoryDocumentStore {}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn upload(&self, owner_id: &OwnerId, document: &DocumentPayload) -> Result<StoredDocument, PortError> {
        let path = document_path(
            owner_id,
            document.file_name(),
            Utc::now().timestamp_millis(),
            Uuid::new_v4(),
        );
        self.documents.write().await.insert(path.clone(), document.clone());
        Ok(StoredDocument {
            url: format!("memory://{path}"),
            file_name: sanitize_file_name(document.file_name()),
            path,
        })
    }
}
