//! HTTP document classifier adapter
//!
//! Sends the supporting image to the classifier endpoint as a data URI and
//! reads back a boolean verdict. Failures are mapped as follows:
//!
//! - connect errors and other transport failures -> `AdmissionError::Transport`
//! - request timeout -> `AdmissionError::TimedOut`
//! - non-2xx status -> `AdmissionError::UnexpectedStatus`
//! - body without a boolean `isDocument` -> `AdmissionError::MalformedResponse`
//!
//! No retries: a repeated classification costs money and a retry after a
//! timeout may race the first request.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use core_kernel::{DomainPort, HealthCheckResult, HealthCheckable};
use crate::admission::{AdmissionVerdict, DocumentAdmissionPort, VerifyDocumentRequest};
use crate::document::DocumentPayload;
use crate::error::AdmissionError;

const ADAPTER_ID: &str = "document_classifier";

/// Classifier endpoint configuration
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Full URL the verification request is POSTed to
    pub endpoint: String,

    /// Sent as a bearer token when set
    pub api_key: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: None,
            timeout_secs: 30,
        }
    }
}

impl ClassifierConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// [`DocumentAdmissionPort`] backed by an HTTP classifier
#[derive(Debug, Clone)]
pub struct HttpDocumentClassifier {
    client: Client,
    config: ClassifierConfig,
}

impl HttpDocumentClassifier {
    pub fn new(config: ClassifierConfig) -> Result<Self, AdmissionError> {
        if config.endpoint.trim().is_empty() {
            return Err(AdmissionError::Transport("classifier endpoint not configured".to_string()));
        }

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| AdmissionError::Transport(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    fn map_error(&self, error: reqwest::Error) -> AdmissionError {
        if error.is_timeout() {
            AdmissionError::TimedOut(self.config.timeout())
        } else if error.is_decode() {
            AdmissionError::MalformedResponse(error.to_string())
        } else {
            AdmissionError::Transport(error.to_string())
        }
    }
}

impl DomainPort for HttpDocumentClassifier {}

#[async_trait]
impl DocumentAdmissionPort for HttpDocumentClassifier {
    async fn check_document(&self, document: &DocumentPayload) -> Result<AdmissionVerdict, AdmissionError> {
        let started = Instant::now();
        let body = VerifyDocumentRequest::for_document(document);

        let mut request = self.client.post(&self.config.endpoint).json(&body);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| self.map_error(e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "classifier returned an error status");
            return Err(AdmissionError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(|e| self.map_error(e))?;
        let verdict: AdmissionVerdict = serde_json::from_slice(&bytes)
            .map_err(|e| AdmissionError::MalformedResponse(e.to_string()))?;

        debug!(
            is_document = verdict.is_document,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "classifier verdict received"
        );

        Ok(verdict)
    }
}

#[async_trait]
impl HealthCheckable for HttpDocumentClassifier {
    // Classifications are billed per call, so health is reported from
    // configuration rather than by probing the endpoint.
    async fn health_check(&self) -> HealthCheckResult {
        match reqwest::Url::parse(&self.config.endpoint) {
            Ok(_) => HealthCheckResult::healthy(ADAPTER_ID, 0),
            Err(e) => HealthCheckResult::unhealthy(ADAPTER_ID, 0, format!("invalid endpoint: {e}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_endpoint_is_rejected() {
        let result = HttpDocumentClassifier::new(ClassifierConfig::default());
        assert!(matches!(result, Err(AdmissionError::Transport(_))));
    }

    #[tokio::test]
    async fn test_health_reflects_endpoint() {
        let classifier = HttpDocumentClassifier::new(ClassifierConfig {
            endpoint: "http://127.0.0.1:9/verify".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert!(classifier.health_check().await.is_healthy());
    }

    #[tokio::test]
    async fn test_unreachable_classifier_is_transport_error() {
        // Port 9 (discard) is closed on test hosts
        let classifier = HttpDocumentClassifier::new(ClassifierConfig {
            endpoint: "http://127.0.0.1:9/verify".to_string(),
            timeout_secs: 2,
            ..Default::default()
        })
        .unwrap();
        let doc = DocumentPayload::new("bill.png", "image/png", vec![1, 2, 3]);
        let err = classifier.check_document(&doc).await.unwrap_err();
        assert!(matches!(err, AdmissionError::Transport(_) | AdmissionError::TimedOut(_)));
        assert_eq!(err.code(), "verification_failed");
    }
}
