//! Claims Domain Ports
//!
//! Persistence is an external collaborator. The submission flow needs two
//! things from it: somewhere to put the document, and somewhere to write the
//! record. Both sit behind traits so the same flow runs against PostgreSQL,
//! the local filesystem, or in-memory doubles.
//!
//! ```rust,ignore
//! let service = SubmissionService::new(
//!     evaluator,
//!     Arc::new(HttpDocumentClassifier::new(classifier_config)?),
//!     Arc::new(LocalDocumentStore::new(root, base_url)),
//!     Arc::new(PostgresClaimStore::new(pool)),
//! );
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use core_kernel::{ClaimId, DomainPort, OwnerId, PortError};
use crate::claim::{ClaimRecord, ClaimStatus, NewClaimRecord};
use crate::document::DocumentPayload;

/// Filter for listing claims
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimQuery {
    /// Only claims owned by this user
    pub owner_id: Option<OwnerId>,
    /// Maximum number of records
    pub limit: Option<u32>,
}

impl ClaimQuery {
    /// Every claim, newest first
    pub fn all() -> Self {
        Self::default()
    }

    /// Claims of one owner, newest first
    pub fn by_owner(owner_id: OwnerId) -> Self {
        Self {
            owner_id: Some(owner_id),
            ..Default::default()
        }
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// True when `record` passes the owner filter
    pub fn matches(&self, record: &ClaimRecord) -> bool {
        self.owner_id
            .as_ref()
            .map_or(true, |owner| &record.owner_id == owner)
    }
}

/// Durable claim records
///
/// `list` returns records ordered by `created_at` descending, ties broken by
/// id descending.
#[async_trait]
pub trait ClaimStore: DomainPort {
    /// Writes a record, assigning its id and creation time
    async fn insert(&self, claim: NewClaimRecord) -> Result<ClaimRecord, PortError>;

    /// Loads one record
    async fn get(&self, id: ClaimId) -> Result<ClaimRecord, PortError>;

    /// Loads records matching the query, newest first
    async fn list(&self, query: ClaimQuery) -> Result<Vec<ClaimRecord>, PortError>;

    /// Applies a reviewer decision
    ///
    /// Implementations reject transitions that
    /// [`ClaimStatus::can_transition_to`] refuses with `PortError::Conflict`.
    async fn update_status(&self, id: ClaimId, status: ClaimStatus) -> Result<ClaimRecord, PortError>;
}

/// Where a document ended up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredDocument {
    /// Store-relative path, `claims/<owner>/<millis>_<file name>`
    pub path: String,
    /// Retrievable URL
    pub url: String,
    pub file_name: String,
}

/// Durable document storage
#[async_trait]
pub trait DocumentStore: DomainPort {
    async fn upload(&self, owner_id: &OwnerId, document: &DocumentPayload) -> Result<StoredDocument, PortError>;
}

/// Storage path for an uploaded document
///
/// Only the last path component of the client-supplied name is kept, so a
/// name like `../../etc/passwd` lands as `passwd` under the owner's folder.
/// The random `token` keeps paths from being guessed from the owner and time.
pub fn document_path(owner_id: &OwnerId, file_name: &str, unix_millis: i64, token: Uuid) -> String {
    format!(
        "claims/{}/{}_{}_{}",
        owner_folder(owner_id),
        unix_millis,
        token.simple(),
        sanitize_file_name(file_name)
    )
}

/// Folder under `claims/` holding one owner's documents
pub fn owner_folder(owner_id: &OwnerId) -> String {
    sanitize_component(owner_id.as_str())
}

/// Last path component of a client-supplied file name
pub fn sanitize_file_name(file_name: &str) -> String {
    let last = file_name
        .rsplit(['/', '\\'])
        .find(|part| !part.is_empty() && *part != "." && *part != "..")
        .unwrap_or("document");
    sanitize_component(last)
}

fn sanitize_component(value: &str) -> String {
    let cleaned: String = value
        .chars()
        .map(|c| if c.is_control() || c == '/' || c == '\\' { '_' } else { c })
        .collect();
    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        "_".to_string()
    } else {
        cleaned
    }
}
