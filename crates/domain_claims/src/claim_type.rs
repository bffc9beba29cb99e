//! Claim categories

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ClaimError;

/// The expense a claim is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ClaimType {
    Mobile,
    Broadband,
}

impl ClaimType {
    pub const ALL: [ClaimType; 2] = [ClaimType::Mobile, ClaimType::Broadband];

    /// Stored and wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimType::Mobile => "Mobile",
            ClaimType::Broadband => "Broadband",
        }
    }
}

impl fmt::Display for ClaimType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClaimType {
    type Err = ClaimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mobile" => Ok(ClaimType::Mobile),
            "broadband" => Ok(ClaimType::Broadband),
            other => Err(ClaimError::UnknownClaimType(other.to_string())),
        }
    }
}
