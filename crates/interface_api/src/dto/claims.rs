//! Claims DTOs

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use domain_claims::{ClaimRecord, ClaimType, DocumentPayload, Evaluation};

use crate::error::ApiError;

/// A claim amount as typed into the form or sent as a JSON number
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Text(String),
    Number(Decimal),
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateRequest {
    pub claim_type: Option<String>,
    pub claim_amount: Option<Decimal>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResponse {
    pub max_amount: Decimal,
    pub return_amount: Decimal,
    pub within_policy: bool,
    pub currency: String,
}

impl From<Evaluation> for EvaluationResponse {
    fn from(evaluation: Evaluation) -> Self {
        Self {
            max_amount: evaluation.max_amount.amount(),
            return_amount: evaluation.return_amount.round_to_currency().amount(),
            within_policy: evaluation.within_policy,
            currency: evaluation.max_amount.currency().code().to_string(),
        }
    }
}

/// Claim submission
///
/// `fileData` is either a full data URI or bare base64 with `mediaType`
/// alongside.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitClaimRequest {
    pub claim_type: Option<String>,
    pub claim_amount: Option<AmountInput>,
    #[validate(length(min = 1, max = 255))]
    pub file_name: Option<String>,
    #[validate(length(min = 3, max = 127))]
    pub media_type: Option<String>,
    pub file_data: Option<String>,
}

impl SubmitClaimRequest {
    /// Unknown type names are treated as no selection
    pub fn claim_type(&self) -> Option<ClaimType> {
        self.claim_type.as_deref().and_then(|t| t.parse().ok())
    }

    /// Decodes the attached file, `None` when nothing was attached
    pub fn document(&self) -> Result<Option<DocumentPayload>, ApiError> {
        let Some(data) = self.file_data.as_deref().filter(|d| !d.trim().is_empty()) else {
            return Ok(None);
        };
        let file_name = self.file_name.clone().unwrap_or_else(|| "document".to_string());

        let document = if data.starts_with("data:") {
            DocumentPayload::from_data_uri(file_name, data)
                .map_err(|e| ApiError::field("file", "invalid_document", e.to_string()))?
        } else {
            let bytes = STANDARD
                .decode(data.trim())
                .map_err(|e| ApiError::field("file", "invalid_document", format!("File is not valid base64: {e}")))?;
            let media_type = self
                .media_type
                .clone()
                .unwrap_or_else(|| "application/octet-stream".to_string());
            DocumentPayload::new(file_name, media_type, bytes)
        };

        Ok(Some(document))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListClaimsQuery {
    /// Every owner's claims; reviewers only
    #[serde(default)]
    pub all: bool,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimResponse {
    pub id: Uuid,
    pub owner_id: String,
    pub owner_name: Option<String>,
    pub claim_type: ClaimType,
    pub claim_amount: Decimal,
    pub return_amount: Decimal,
    pub claim_limit: Decimal,
    pub currency: String,
    pub file_url: String,
    pub file_name: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<&ClaimRecord> for ClaimResponse {
    fn from(record: &ClaimRecord) -> Self {
        Self {
            id: *record.id.as_uuid(),
            owner_id: record.owner_id.as_str().to_string(),
            owner_name: record.owner_name.clone(),
            claim_type: record.claim_type,
            claim_amount: record.claim_amount.round_to_currency().amount(),
            return_amount: record.return_amount.round_to_currency().amount(),
            claim_limit: record.claim_limit.round_to_currency().amount(),
            currency: record.claim_amount.currency().code().to_string(),
            file_url: record.file_url.clone(),
            file_name: record.file_name.clone(),
            status: record.status.to_string(),
            created_at: record.created_at,
        }
    }
}
