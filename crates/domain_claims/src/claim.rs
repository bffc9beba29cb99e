//! Persisted claim records

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{ClaimId, Money, OwnerId};
use crate::claim_type::ClaimType;
use crate::error::ClaimError;
use crate::policy::ValidatedClaim;
use crate::ports::StoredDocument;

/// Review status of a recorded claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClaimStatus {
    /// Recorded, waiting for a reviewer
    Submitted,
    Approved,
    Rejected,
}

impl ClaimStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::Submitted => "Submitted",
            ClaimStatus::Approved => "Approved",
            ClaimStatus::Rejected => "Rejected",
        }
    }

    /// Reviewers decide once; decided claims stay decided
    pub fn can_transition_to(&self, target: ClaimStatus) -> bool {
        use ClaimStatus::*;
        matches!((self, target), (Submitted, Approved) | (Submitted, Rejected))
    }

    /// Checks a transition, naming both ends on failure
    pub fn transition_to(&self, target: ClaimStatus) -> Result<ClaimStatus, ClaimError> {
        if !self.can_transition_to(target) {
            return Err(ClaimError::InvalidStatusTransition {
                from: self.to_string(),
                to: target.to_string(),
            });
        }
        Ok(target)
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClaimStatus {
    type Err = ClaimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "submitted" => Ok(ClaimStatus::Submitted),
            "approved" => Ok(ClaimStatus::Approved),
            "rejected" => Ok(ClaimStatus::Rejected),
            other => Err(ClaimError::UnknownStatus(other.to_string())),
        }
    }
}

/// A claim as stored, after it passed validation and document admission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRecord {
    pub id: ClaimId,
    pub owner_id: OwnerId,
    pub owner_name: Option<String>,
    pub claim_type: ClaimType,
    pub claim_amount: Money,
    pub return_amount: Money,
    /// Ceiling that applied when the claim was submitted
    pub claim_limit: Money,
    pub file_url: String,
    pub file_name: String,
    pub status: ClaimStatus,
    pub created_at: DateTime<Utc>,
}

/// Everything a store needs to create a [`ClaimRecord`]
///
/// The store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClaimRecord {
    pub owner_id: OwnerId,
    pub owner_name: Option<String>,
    pub claim_type: ClaimType,
    pub claim_amount: Money,
    pub return_amount: Money,
    pub claim_limit: Money,
    pub file_url: String,
    pub file_name: String,
    pub status: ClaimStatus,
}

impl NewClaimRecord {
    /// Builds a Submitted record from a validated request and its stored document
    ///
    /// The return amount is rounded to the currency's minor unit here, once,
    /// so the stored value is what the claimant was shown.
    pub fn submitted(
        owner_id: OwnerId,
        owner_name: Option<String>,
        claim: &ValidatedClaim,
        document: &StoredDocument,
    ) -> Self {
        Self {
            owner_id,
            owner_name,
            claim_type: claim.claim_type,
            claim_amount: claim.claim_amount,
            return_amount: claim.return_amount.round_to_currency(),
            claim_limit: claim.max_amount,
            file_url: document.url.clone(),
            file_name: document.file_name.clone(),
            status: ClaimStatus::Submitted,
        }
    }

    /// Attaches store-assigned identity and timestamp
    pub fn into_record(self, id: ClaimId, created_at: DateTime<Utc>) -> ClaimRecord {
        ClaimRecord {
            id,
            owner_id: self.owner_id,
            owner_name: self.owner_name,
            claim_type: self.claim_type,
            claim_amount: self.claim_amount,
            return_amount: self.return_amount,
            claim_limit: self.claim_limit,
            file_url: self.file_url,
            file_name: self.file_name,
            status: self.status,
            created_at,
        }
    }
}
