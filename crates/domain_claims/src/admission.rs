//! Document admission check
//!
//! Before a claim is recorded, its supporting image is shown to an external
//! classifier that answers one question: is this a bill, receipt or invoice,
//! or is it an unrelated photo?
//!
//! # Wire contract
//!
//! ```text
//! POST <classifier url>
//! { "photoDataUri": "data:image/png;base64,iVBORw0..." }
//!
//! 200 OK
//! { "isDocument": true }
//! ```
//!
//! One request per submission attempt; no retries, no caching, no batching.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use core_kernel::DomainPort;
use crate::document::DocumentPayload;
use crate::error::AdmissionError;

/// The classifier's decision for one document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionVerdict {
    #[serde(rename = "isDocument")]
    pub is_document: bool,
}

impl AdmissionVerdict {
    pub fn document() -> Self {
        Self { is_document: true }
    }

    pub fn not_a_document() -> Self {
        Self { is_document: false }
    }
}

/// Request body sent to the classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyDocumentRequest {
    pub photo_data_uri: String,
}

impl VerifyDocumentRequest {
    pub fn for_document(document: &DocumentPayload) -> Self {
        Self {
            photo_data_uri: document.to_data_uri(),
        }
    }
}

/// Port for the external document classifier
///
/// Implementations issue exactly one request per call and never retry. Any
/// failure to obtain a verdict is an [`AdmissionError`]; a negative verdict is
/// `Ok` with `is_document == false`.
#[async_trait]
pub trait DocumentAdmissionPort: DomainPort {
    async fn check_document(&self, document: &DocumentPayload) -> Result<AdmissionVerdict, AdmissionError>;
}
