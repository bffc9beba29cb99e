//! Adapters for the claims ports
//!
//! - **HttpDocumentClassifier**: document admission over HTTP
//! - **LocalDocumentStore**: documents on the local filesystem
//! - **InMemoryClaimStore** / **InMemoryDocumentStore**: process-local stores
//!
//! The PostgreSQL claim store lives in `infra_db`.
//!
//! ```rust,ignore
//! use domain_claims::adapters::{ClassifierConfig, HttpDocumentClassifier};
//! use domain_claims::DocumentAdmissionPort;
//! use std::sync::Arc;
//!
//! let classifier = HttpDocumentClassifier::new(ClassifierConfig {
//!     endpoint: "https://classifier.internal/verify".to_string(),
//!     ..Default::default()
//! })?;
//! let port: Arc<dyn DocumentAdmissionPort> = Arc::new(classifier);
//! ```

pub mod http_classifier;
pub mod local_storage;
pub mod memory;

pub use http_classifier::{ClassifierConfig, HttpDocumentClassifier};
pub use local_storage::LocalDocumentStore;
pub use memory::{InMemoryClaimStore, InMemoryDocumentStore};
