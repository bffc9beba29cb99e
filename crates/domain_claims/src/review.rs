//! Reviewer decisions on recorded claims

use std::sync::Arc;

use tracing::{info, warn};

use core_kernel::{ClaimId, PortError};
use crate::claim::{ClaimRecord, ClaimStatus};
use crate::error::ClaimError;
use crate::feed::ClaimFeed;
use crate::ports::{ClaimQuery, ClaimStore};

/// Reads claims and applies reviewer decisions
pub struct ReviewService {
    claims: Arc<dyn ClaimStore>,
    feed: Option<ClaimFeed>,
}

impl ReviewService {
    pub fn new(claims: Arc<dyn ClaimStore>) -> Self {
        Self { claims, feed: None }
    }

    pub fn with_feed(mut self, feed: ClaimFeed) -> Self {
        self.feed = Some(feed);
        self
    }

    pub async fn get(&self, id: ClaimId) -> Result<ClaimRecord, ClaimError> {
        self.claims.get(id).await.map_err(|e| not_found(e, id))
    }

    pub async fn list(&self, query: ClaimQuery) -> Result<Vec<ClaimRecord>, ClaimError> {
        Ok(self.claims.list(query).await?)
    }

    /// Moves a Submitted claim to Approved or Rejected
    pub async fn decide(&self, id: ClaimId, status: ClaimStatus, reviewer: &str) -> Result<ClaimRecord, ClaimError> {
        let current = self.get(id).await?;
        current.status.transition_to(status)?;

        let updated = self
            .claims
            .update_status(id, status)
            .await
            .map_err(|e| not_found(e, id))?;

        info!(claim_id = %id, %status, reviewer, "claim reviewed");

        if let Some(feed) = &self.feed {
            if let Err(error) = feed.refresh().await {
                warn!(%error, "claim feed refresh failed");
            }
        }

        Ok(updated)
    }
}

fn not_found(error: PortError, id: ClaimId) -> ClaimError {
    if error.is_not_found() {
        ClaimError::ClaimNotFound(id.to_string())
    } else {
        ClaimError::Port(error)
    }
}
