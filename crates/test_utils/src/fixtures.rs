//! Pre-built Test Fixtures
//!
//! Consistent data for unit tests: the standard USD policy, a handful of
//! supporting documents, and claimant identities.

use fake::faker::name::en::Name;
use fake::Fake;
use once_cell::sync::Lazy;
use rust_decimal_macros::dec;

use core_kernel::{Currency, Money, OwnerId};
use domain_claims::{ClaimPolicy, DocumentPayload, PolicyEvaluator};

/// Smallest valid PNG header, enough for anything that sniffs bytes
static PNG_BYTES: Lazy<Vec<u8>> = Lazy::new(|| {
    vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D]
});

/// Fixture for policy data
pub struct PolicyFixtures;

impl PolicyFixtures {
    /// Mobile 350, Broadband 650, 83% back, capped at 10000
    pub fn standard() -> ClaimPolicy {
        ClaimPolicy::standard(Currency::USD)
    }

    pub fn evaluator() -> PolicyEvaluator {
        PolicyEvaluator::new(Self::standard())
    }
}

/// Fixture for money amounts under the standard policy
pub struct MoneyFixtures;

impl MoneyFixtures {
    pub fn usd(amount: rust_decimal::Decimal) -> Money {
        Money::new(amount, Currency::USD)
    }

    /// A typical phone bill, inside the Mobile ceiling
    pub fn phone_bill() -> Money {
        Self::usd(dec!(300))
    }

    /// 83% of [`MoneyFixtures::phone_bill`]
    pub fn phone_bill_return() -> Money {
        Self::usd(dec!(249))
    }

    pub fn mobile_limit() -> Money {
        Self::usd(dec!(350))
    }

    pub fn broadband_limit() -> Money {
        Self::usd(dec!(650))
    }
}

/// Fixture for supporting documents
pub struct DocumentFixtures;

impl DocumentFixtures {
    /// A scanned bill
    pub fn bill() -> DocumentPayload {
        DocumentPayload::new("bill.png", "image/png", PNG_BYTES.clone())
    }

    /// A PDF invoice
    pub fn invoice() -> DocumentPayload {
        DocumentPayload::new("invoice.pdf", "application/pdf", b"%PDF-1.7\n".to_vec())
    }

    /// A file the classifier should refuse
    pub fn holiday_photo() -> DocumentPayload {
        DocumentPayload::new("beach.jpg", "image/jpeg", vec![0xFF, 0xD8, 0xFF, 0xE0])
    }

    /// Data URI form of [`DocumentFixtures::bill`]
    pub fn bill_data_uri() -> String {
        Self::bill().to_data_uri()
    }
}

/// Fixture for claimants
pub struct OwnerFixtures;

impl OwnerFixtures {
    pub fn alice() -> OwnerId {
        OwnerId::new("user-alice")
    }

    pub fn bob() -> OwnerId {
        OwnerId::new("user-bob")
    }

    /// A fresh owner with a generated display name
    pub fn random() -> (OwnerId, String) {
        let name: String = Name().fake();
        (OwnerId::new(format!("user-{}", uuid::Uuid::new_v4())), name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_policy_limits() {
        let policy = PolicyFixtures::standard();
        assert_eq!(policy.limit_for(domain_claims::ClaimType::Mobile), MoneyFixtures::mobile_limit());
        assert_eq!(policy.limit_for(domain_claims::ClaimType::Broadband), MoneyFixtures::broadband_limit());
    }

    #[test]
    fn test_bill_round_trips_through_data_uri() {
        let uri = DocumentFixtures::bill_data_uri();
        assert!(uri.starts_with("data:image/png;base64,"));
        let decoded = DocumentPayload::from_data_uri("bill.png", &uri).unwrap();
        assert_eq!(decoded, DocumentFixtures::bill());
    }

    #[test]
    fn test_random_owners_differ() {
        let (a, name) = OwnerFixtures::random();
        let (b, _) = OwnerFixtures::random();
        assert_ne!(a, b);
        assert!(!name.is_empty());
    }
}
