//! API configuration

use std::time::Duration;

use serde::Deserialize;

use core_kernel::{CoreError, Currency};

/// API configuration
///
/// Every field can be set from an `API_`-prefixed environment variable, for
/// example `API_CLASSIFIER_URL`. Unset fields keep their defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// JWT secret for authentication
    pub jwt_secret: String,
    /// JWT expiration in seconds
    pub jwt_expiration_secs: u64,
    /// Database URL; claims are kept in memory when unset
    pub database_url: Option<String>,
    /// Log level
    pub log_level: String,
    /// Document classifier endpoint
    pub classifier_url: String,
    /// Bearer token for the classifier
    pub classifier_api_key: Option<String>,
    /// Longest wait for a classifier verdict
    pub admission_timeout_secs: u64,
    /// Directory uploaded documents are written to
    pub document_root: String,
    /// URL prefix under which `document_root` is served
    pub document_base_url: String,
    /// ISO code of the currency claims are made in
    pub currency: String,
    /// Largest claims request body accepted, base64 document included
    pub max_upload_bytes: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            jwt_secret: "change-me-in-production".to_string(),
            jwt_expiration_secs: 3600,
            database_url: None,
            log_level: "info".to_string(),
            classifier_url: "http://localhost:3400/verify-document".to_string(),
            classifier_api_key: None,
            admission_timeout_secs: 30,
            document_root: "./data/documents".to_string(),
            document_base_url: "http://localhost:8080/files".to_string(),
            currency: "USD".to_string(),
            max_upload_bytes: 25 * 1024 * 1024,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("API"))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn admission_timeout(&self) -> Duration {
        Duration::from_secs(self.admission_timeout_secs)
    }

    pub fn currency(&self) -> Result<Currency, CoreError> {
        Ok(self.currency.parse::<Currency>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.server_addr(), "0.0.0.0:8080");
        assert!(config.database_url.is_none());
        assert_eq!(config.admission_timeout(), Duration::from_secs(30));
        assert_eq!(config.currency().unwrap(), Currency::USD);
        assert!(config.max_upload_bytes > 2 * 1024 * 1024);
    }

    #[test]
    fn test_unknown_currency_is_rejected() {
        let config = ApiConfig {
            currency: "XYZ".to_string(),
            ..Default::default()
        };
        assert!(config.currency().is_err());
    }
}
