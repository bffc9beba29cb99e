//! Claim policy: per-type ceilings, the absolute cap, and reimbursement
//!
//! [`PolicyEvaluator::evaluate`] is total and side-effect free; it is what a
//! form calls on every keystroke. [`PolicyEvaluator::validate_submission`]
//! is the gate a request must pass before anything leaves the process.
//!
//! # Rules
//!
//! | Claim type | Ceiling |
//! |------------|---------|
//! | Mobile     | 350     |
//! | Broadband  | 650     |
//!
//! Any amount above 10000 is refused outright. In-policy amounts are
//! reimbursed at 83%; out-of-policy amounts are reimbursed at nothing (they
//! are never clamped down to the ceiling).

use std::collections::BTreeMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use core_kernel::{CoreError, Currency, Money, Rate};
use crate::claim_type::ClaimType;
use crate::error::ValidationError;

/// Immutable policy configuration injected into the evaluator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimPolicy {
    currency: Currency,
    limits: BTreeMap<ClaimType, Decimal>,
    return_rate: Rate,
    absolute_cap: Decimal,
}

impl ClaimPolicy {
    /// Builds a policy, checking that every claim type has a positive ceiling
    pub fn new(
        currency: Currency,
        limits: BTreeMap<ClaimType, Decimal>,
        return_rate: Rate,
        absolute_cap: Decimal,
    ) -> Result<Self, CoreError> {
        for claim_type in ClaimType::ALL {
            match limits.get(&claim_type) {
                Some(limit) if *limit > Decimal::ZERO => {}
                Some(limit) => {
                    return Err(CoreError::configuration(format!(
                        "limit for {claim_type} must be positive, got {limit}"
                    )))
                }
                None => {
                    return Err(CoreError::configuration(format!(
                        "no limit configured for {claim_type}"
                    )))
                }
            }
        }

        let rate = return_rate.as_decimal();
        if rate <= Decimal::ZERO || rate > Decimal::ONE {
            return Err(CoreError::configuration(format!(
                "return rate must be within (0, 1], got {rate}"
            )));
        }

        if absolute_cap <= Decimal::ZERO {
            return Err(CoreError::configuration("absolute cap must be positive"));
        }

        Ok(Self {
            currency,
            limits,
            return_rate,
            absolute_cap,
        })
    }

    /// Mobile 350, Broadband 650, 83% back, nothing above 10000
    pub fn standard(currency: Currency) -> Self {
        let limits = BTreeMap::from([
            (ClaimType::Mobile, dec!(350)),
            (ClaimType::Broadband, dec!(650)),
        ]);

        Self {
            currency,
            limits,
            return_rate: Rate::new(dec!(0.83)),
            absolute_cap: dec!(10000),
        }
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Ceiling for a claim type
    pub fn limit_for(&self, claim_type: ClaimType) -> Money {
        let limit = self.limits.get(&claim_type).copied().unwrap_or(Decimal::ZERO);
        Money::new(limit, self.currency)
    }

    pub fn return_rate(&self) -> Rate {
        self.return_rate
    }

    pub fn absolute_cap(&self) -> Money {
        Money::new(self.absolute_cap, self.currency)
    }
}

impl Default for ClaimPolicy {
    fn default() -> Self {
        Self::standard(Currency::USD)
    }
}

/// What the form shows for the current type and amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub max_amount: Money,
    pub return_amount: Money,
    pub within_policy: bool,
}

/// A request that passed every submission rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedClaim {
    pub claim_type: ClaimType,
    pub claim_amount: Money,
    pub max_amount: Money,
    pub return_amount: Money,
}

/// One problem with one form field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub code: String,
    pub message: String,
}

impl From<&ValidationError> for FieldError {
    fn from(error: &ValidationError) -> Self {
        Self {
            field: error.field().to_string(),
            code: error.code().to_string(),
            message: error.to_string(),
        }
    }
}

/// Applies a [`ClaimPolicy`] to claim input
#[derive(Debug, Clone)]
pub struct PolicyEvaluator {
    policy: Arc<ClaimPolicy>,
}

impl PolicyEvaluator {
    pub fn new(policy: ClaimPolicy) -> Self {
        Self {
            policy: Arc::new(policy),
        }
    }

    pub fn policy(&self) -> &ClaimPolicy {
        &self.policy
    }

    /// Computes the ceiling and reimbursement for the current input
    ///
    /// An unset type yields a ceiling of zero; an unset amount counts as zero.
    /// The input is within policy exactly when it passes the amount rules of
    /// [`PolicyEvaluator::validate_submission`].
    pub fn evaluate(
        &self,
        claim_type: Option<ClaimType>,
        claim_amount: Option<Decimal>,
    ) -> Evaluation {
        let currency = self.policy.currency();
        let max_amount = claim_type
            .map(|t| self.policy.limit_for(t))
            .unwrap_or_else(|| Money::zero(currency));
        let amount = claim_amount.unwrap_or(Decimal::ZERO);

        let within_policy =
            claim_type.is_some() && self.amount_error(claim_type, claim_amount).is_none();
        let return_amount = if within_policy {
            self.policy.return_rate().apply(&Money::new(amount, currency))
        } else {
            Money::zero(currency)
        };

        Evaluation {
            max_amount,
            return_amount,
            within_policy,
        }
    }

    /// Checks a request against every submission rule, first failure wins
    ///
    /// Rules are checked in this order: type chosen, amount positive, amount
    /// in whole minor units of the currency, amount under the absolute cap, amount under the type ceiling, document attached.
    pub fn validate_submission(
        &self,
        claim_type: Option<ClaimType>,
        claim_amount: Option<Decimal>,
        document_present: bool,
    ) -> Result<ValidatedClaim, ValidationError> {
        let claim_type = claim_type.ok_or(ValidationError::MissingType)?;

        if let Some(error) = self.amount_error(Some(claim_type), claim_amount) {
            return Err(error);
        }

        if !document_present {
            return Err(ValidationError::MissingDocument);
        }

        let evaluation = self.evaluate(Some(claim_type), claim_amount);
        let amount = claim_amount.unwrap_or(Decimal::ZERO);

        Ok(ValidatedClaim {
            claim_type,
            claim_amount: Money::new(amount, self.policy.currency()),
            max_amount: evaluation.max_amount,
            return_amount: evaluation.return_amount,
        })
    }

    /// Every rule the request breaks, one entry per field
    ///
    /// The first entry is always the error `validate_submission` reports.
    pub fn field_errors(
        &self,
        claim_type: Option<ClaimType>,
        claim_amount: Option<Decimal>,
        document_present: bool,
    ) -> Vec<FieldError> {
        let mut errors = Vec::new();

        if claim_type.is_none() {
            errors.push(FieldError::from(&ValidationError::MissingType));
        }
        if let Some(error) = self.amount_error(claim_type, claim_amount) {
            errors.push(FieldError::from(&error));
        }
        if !document_present {
            errors.push(FieldError::from(&ValidationError::MissingDocument));
        }

        errors
    }

    // Compares the amount as given, before any rounding; the ceiling check
    // only applies once a type has been chosen
    fn amount_error(
        &self,
        claim_type: Option<ClaimType>,
        claim_amount: Option<Decimal>,
    ) -> Option<ValidationError> {
        let amount = claim_amount.unwrap_or(Decimal::ZERO);

        if amount <= Decimal::ZERO {
            return Some(ValidationError::NonPositiveAmount);
        }

        let places = self.policy.currency().decimal_places();
        if amount.normalize().scale() > places {
            return Some(ValidationError::TooManyDecimals { places });
        }

        let cap = self.policy.absolute_cap();
        if amount > cap.amount() {
            return Some(ValidationError::ExceedsAbsoluteCap { cap });
        }

        let claim_type = claim_type?;
        let limit = self.policy.limit_for(claim_type);
        if amount > limit.amount() {
            return Some(ValidationError::ExceedsTypeLimit { claim_type, limit });
        }

        None
    }
}

impl Default for PolicyEvaluator {
    fn default() -> Self {
        Self::new(ClaimPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evaluator() -> PolicyEvaluator {
        PolicyEvaluator::default()
    }

    #[test]
    fn test_evaluate_in_policy() {
        let eval = evaluator().evaluate(Some(ClaimType::Mobile), Some(dec!(300)));
        assert!(eval.within_policy);
        assert_eq!(eval.max_amount.amount(), dec!(350));
        assert_eq!(eval.return_amount.amount(), dec!(249.00));
    }

    #[test]
    fn test_evaluate_over_limit_is_not_clamped() {
        let eval = evaluator().evaluate(Some(ClaimType::Broadband), Some(dec!(700)));
        assert!(!eval.within_policy);
        assert!(eval.return_amount.is_zero());
    }

    #[test]
    fn test_evaluate_without_type() {
        let eval = evaluator().evaluate(None, Some(dec!(10)));
        assert!(eval.max_amount.is_zero());
        assert!(!eval.within_policy);
    }

    #[test]
    fn test_amount_at_limit_is_in_policy() {
        let eval = evaluator().evaluate(Some(ClaimType::Mobile), Some(dec!(350)));
        assert!(eval.within_policy);
    }

    #[test]
    fn test_policy_rejects_missing_limit() {
        let limits = BTreeMap::from([(ClaimType::Mobile, dec!(350))]);
        let result = ClaimPolicy::new(Currency::USD, limits, Rate::new(dec!(0.83)), dec!(10000));
        assert!(matches!(result, Err(CoreError::Configuration(_))));
    }

    #[test]
    fn test_policy_rejects_rate_above_one() {
        let limits = BTreeMap::from([
            (ClaimType::Mobile, dec!(350)),
            (ClaimType::Broadband, dec!(650)),
        ]);
        let result = ClaimPolicy::new(Currency::USD, limits, Rate::new(dec!(1.5)), dec!(10000));
        assert!(result.is_err());
    }

    #[test]
    fn test_sub_cent_amounts_are_judged_before_rounding() {
        let eval = evaluator();

        let err = eval
            .validate_submission(Some(ClaimType::Mobile), Some(dec!(350.00004)), true)
            .unwrap_err();
        assert_eq!(err.code(), "invalid_amount");
        assert!(!eval.evaluate(Some(ClaimType::Mobile), Some(dec!(350.00004))).within_policy);

        let err = eval
            .validate_submission(Some(ClaimType::Mobile), Some(dec!(0.00004)), true)
            .unwrap_err();
        assert_eq!(err.code(), "invalid_amount");
        assert!(!eval.evaluate(Some(ClaimType::Mobile), Some(dec!(0.00004))).within_policy);
    }

    #[test]
    fn test_trailing_zeros_are_not_extra_places() {
        let claim = evaluator()
            .validate_submission(Some(ClaimType::Mobile), Some(dec!(120.5000)), true)
            .unwrap();
        assert_eq!(claim.return_amount.amount(), dec!(100.015));
    }

    #[test]
    fn test_field_errors_without_type_skip_ceiling() {
        let errors = evaluator().field_errors(None, Some(dec!(5000)), true);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, "missing_type");
    }
}
