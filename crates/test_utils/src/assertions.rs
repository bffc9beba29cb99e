//! Custom Test Assertions
//!
//! Assertion helpers for claim types with more useful failure messages
//! than a bare `assert_eq!`.

use rust_decimal::Decimal;

use core_kernel::Money;
use domain_claims::{ClaimRecord, ClaimType, FieldError, NewClaimRecord, SubmissionOutcome};

/// Asserts two Money values share a currency and differ by at most `tolerance`
pub fn assert_money_approx_eq(actual: &Money, expected: &Money, tolerance: Decimal) {
    assert_eq!(
        actual.currency(),
        expected.currency(),
        "Currency mismatch: actual={}, expected={}",
        actual.currency(),
        expected.currency()
    );

    let diff = (actual.amount() - expected.amount()).abs();
    assert!(
        diff <= tolerance,
        "Money amounts differ by more than tolerance: actual={}, expected={}, diff={}, tolerance={}",
        actual.amount(),
        expected.amount(),
        diff,
        tolerance
    );
}

/// Asserts the amount has no more decimals than the currency's minor unit
pub fn assert_rounded_to_currency(money: &Money) {
    assert_eq!(
        money.amount(),
        money.round_to_currency().amount(),
        "Expected {} rounded to {} places",
        money.currency(),
        money.currency().decimal_places()
    );
}

/// Asserts a stored record matches what was inserted
pub fn assert_record_matches(record: &ClaimRecord, expected: &NewClaimRecord) {
    assert_eq!(record.owner_id, expected.owner_id, "owner_id");
    assert_eq!(record.owner_name, expected.owner_name, "owner_name");
    assert_eq!(record.claim_type, expected.claim_type, "claim_type");
    assert_eq!(record.claim_amount, expected.claim_amount, "claim_amount");
    assert_eq!(record.return_amount, expected.return_amount, "return_amount");
    assert_eq!(record.claim_limit, expected.claim_limit, "claim_limit");
    assert_eq!(record.file_url, expected.file_url, "file_url");
    assert_eq!(record.file_name, expected.file_name, "file_name");
    assert_eq!(record.status, expected.status, "status");
}

/// Asserts a list is ordered newest first
pub fn assert_newest_first(records: &[ClaimRecord]) {
    for pair in records.windows(2) {
        assert!(
            pair[0].created_at >= pair[1].created_at,
            "Claims out of order: {} ({}) listed before {} ({})",
            pair[0].id,
            pair[0].created_at,
            pair[1].id,
            pair[1].created_at
        );
    }
}

/// Unwraps an accepted outcome, panicking with the actual outcome otherwise
pub fn assert_accepted(outcome: SubmissionOutcome) -> ClaimRecord {
    match outcome {
        SubmissionOutcome::Accepted(record) => record,
        other => panic!("Expected an accepted submission, got {other:?}"),
    }
}

/// Asserts the outcome is a validation failure whose first error has `code`
pub fn assert_invalid_with(outcome: &SubmissionOutcome, code: &str) -> Vec<FieldError> {
    match outcome {
        SubmissionOutcome::Invalid(errors) => {
            assert_eq!(
                errors.first().map(|e| e.code.as_str()),
                Some(code),
                "Unexpected validation errors: {errors:?}"
            );
            errors.clone()
        }
        other => panic!("Expected a validation failure, got {other:?}"),
    }
}

/// Asserts the record was accepted under the ceiling for its type
pub fn assert_within_limit(record: &ClaimRecord, claim_type: ClaimType) {
    assert_eq!(record.claim_type, claim_type);
    assert!(
        record.claim_amount.amount() <= record.claim_limit.amount(),
        "Claim {} exceeds its limit {}",
        record.claim_amount,
        record.claim_limit
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_approx_eq() {
        let a = Money::new(dec!(249.00), Currency::USD);
        let b = Money::new(dec!(249.004), Currency::USD);
        assert_money_approx_eq(&a, &b, dec!(0.01));
    }

    #[test]
    #[should_panic(expected = "Currency mismatch")]
    fn test_money_approx_eq_currency_mismatch() {
        let a = Money::new(dec!(1), Currency::USD);
        let b = Money::new(dec!(1), Currency::EUR);
        assert_money_approx_eq(&a, &b, dec!(0.01));
    }
}
