//! Property-Based Test Generators
//!
//! Proptest strategies for claim inputs. Amounts carry two decimal places,
//! as typed into the form.

use proptest::prelude::*;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use core_kernel::{Currency, Money, OwnerId};
use domain_claims::{ClaimStatus, ClaimType};

/// Strategy for either claim type
pub fn claim_type_strategy() -> impl Strategy<Value = ClaimType> {
    prop_oneof![Just(ClaimType::Mobile), Just(ClaimType::Broadband)]
}

/// Strategy for an optional claim type, as an untouched form would have
pub fn maybe_claim_type_strategy() -> impl Strategy<Value = Option<ClaimType>> {
    prop::option::of(claim_type_strategy())
}

/// Amounts from 0.01 up to 20000.00, straddling every ceiling
pub fn positive_amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..=2_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Amounts from -1000.00 to 20000.00, zero included
pub fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (-100_000i64..=2_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Amounts with up to 6 decimal places, finer than any currency's minor unit
pub fn fine_amount_strategy() -> impl Strategy<Value = Decimal> {
    (-1_000_000i64..=20_000_000_000i64, 0u32..=6)
        .prop_map(|(units, scale)| Decimal::new(units, scale))
}

/// Amounts that never exceed the given ceiling
pub fn amount_within_strategy(limit: Decimal) -> impl Strategy<Value = Decimal> {
    let max_cents = (limit * Decimal::ONE_HUNDRED).trunc().to_i64().unwrap_or(1);
    (1i64..=max_cents.max(1)).prop_map(|cents| Decimal::new(cents, 2))
}

/// USD amounts a claim can be recorded with
pub fn usd_money_strategy() -> impl Strategy<Value = Money> {
    positive_amount_strategy().prop_map(|amount| Money::new(amount, Currency::USD))
}

pub fn claim_status_strategy() -> impl Strategy<Value = ClaimStatus> {
    prop_oneof![
        Just(ClaimStatus::Submitted),
        Just(ClaimStatus::Approved),
        Just(ClaimStatus::Rejected),
    ]
}

/// Strategy for owner identifiers
pub fn owner_id_strategy() -> impl Strategy<Value = OwnerId> {
    "user-[a-z0-9]{4,12}".prop_map(OwnerId::new)
}

/// Strategy for client-supplied file names, hostile ones included
pub fn file_name_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z]{1,12}\\.(png|jpg|pdf)",
        "(\\.\\./){1,3}[a-z]{1,8}\\.png",
        "[a-z]{1,6}/[a-z]{1,6}\\.pdf",
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    proptest! {
        #[test]
        fn positive_amounts_are_positive(amount in positive_amount_strategy()) {
            prop_assert!(amount > Decimal::ZERO);
            prop_assert!(amount.scale() <= 2);
        }

        #[test]
        fn bounded_amounts_stay_bounded(amount in amount_within_strategy(dec!(350))) {
            prop_assert!(amount > Decimal::ZERO);
            prop_assert!(amount <= dec!(350));
        }
    }
}
