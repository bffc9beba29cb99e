//! Filesystem document store
//!
//! Writes each document under `<root>/claims/<owner>/<millis>_<token>_<name>` and
//! hands back `<public base url>/claims/<owner>/<millis>_<token>_<name>` as its URL.

use std::path::{Path, PathBuf};
use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use core_kernel::{DomainPort, HealthCheckResult, HealthCheckable, OwnerId, PortError};
use crate::document::DocumentPayload;
use crate::ports::{document_path, sanitize_file_name, DocumentStore, StoredDocument};

const ADAPTER_ID: &str = "local_document_store";

/// [`DocumentStore`] on the local filesystem
#[derive(Debug, Clone)]
pub struct LocalDocumentStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalDocumentStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.public_base_url, path)
    }
}

impl DomainPort for LocalDocumentStore {}

#[async_trait]
impl DocumentStore for LocalDocumentStore {
    async fn upload(&self, owner_id: &OwnerId, document: &DocumentPayload) -> Result<StoredDocument, PortError> {
        let path = document_path(
            owner_id,
            document.file_name(),
            Utc::now().timestamp_millis(),
            Uuid::new_v4(),
        );
        let target = self.root.join(&path);

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| PortError::internal_with_source("failed to create document directory", e))?;
        }
        tokio::fs::write(&target, document.bytes())
            .await
            .map_err(|e| PortError::internal_with_source("failed to write document", e))?;

        debug!(path = %path, size = document.size(), "document stored");

        Ok(StoredDocument {
            url: self.url_for(&path),
            file_name: sanitize_file_name(document.file_name()),
            path,
        })
    }
}

#[async_trait]
impl HealthCheckable for LocalDocumentStore {
    async fn health_check(&self) -> HealthCheckResult {
        let started = Instant::now();
        let result = tokio::fs::create_dir_all(&self.root).await;
        let latency = started.elapsed().as_millis() as u64;
        match result {
            Ok(()) => HealthCheckResult::healthy(ADAPTER_ID, latency),
            Err(e) => HealthCheckResult::unhealthy(ADAPTER_ID, latency, e.to_string()),
        }
    }
}
