//! Errors raised while configuring the claim model or reading form input

use thiserror::Error;
use crate::money::MoneyError;

#[derive(Debug, Error)]
pub enum CoreError {
    /// A form field held something that cannot be read
    #[error("Invalid {field}: {message}")]
    InvalidInput { field: &'static str, message: String },

    #[error(transparent)]
    Money(#[from] MoneyError),

    /// Policy or service settings that make no sense together
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl CoreError {
    pub fn invalid_input(field: &'static str, message: impl Into<String>) -> Self {
        CoreError::InvalidInput {
            field,
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        CoreError::Configuration(message.into())
    }
}
