//! Unit tests for the Money module
//!
//! Tests cover creation, parsing of form input, rounding for display and
//! storage, and rate application for reimbursement.

use core_kernel::{Money, Currency, MoneyError, Rate};
use rust_decimal_macros::dec;

mod creation {
    use super::*;

    #[test]
    fn test_new_rounds_to_four_decimal_places() {
        let m = Money::new(dec!(100.123456789), Currency::USD);
        assert_eq!(m.amount(), dec!(100.1235));
    }

    #[test]
    fn test_jpy_display_has_no_minor_units() {
        let m = Money::new(dec!(10000), Currency::JPY);
        assert_eq!(m.to_string(), "¥10000");
    }

    #[test]
    fn test_zero_creates_zero_amount() {
        let m = Money::zero(Currency::EUR);
        assert!(m.is_zero());
        assert_eq!(m.currency(), Currency::EUR);
    }
}

mod parsing {
    use super::*;

    #[test]
    fn test_parse_plain_and_fractional_input() {
        assert_eq!(Money::parse("300", Currency::USD).unwrap().amount(), dec!(300));
        assert_eq!(Money::parse("300.50", Currency::USD).unwrap().amount(), dec!(300.50));
    }

    #[test]
    fn test_parse_negative_input_is_allowed() {
        // Negative input is a policy concern, not a parse error
        let m = Money::parse("-5", Currency::USD).unwrap();
        assert!(m.amount() < rust_decimal::Decimal::ZERO);
    }

    #[test]
    fn test_parse_rejects_text() {
        let err = Money::parse("three hundred", Currency::USD).unwrap_err();
        assert!(matches!(err, MoneyError::InvalidAmount(_)));
    }

    #[test]
    fn test_currency_from_str() {
        assert_eq!("usd".parse::<Currency>().unwrap(), Currency::USD);
        assert!(matches!("XYZ".parse::<Currency>(), Err(MoneyError::UnknownCurrency(_))));
    }
}

mod display {
    use super::*;

    #[test]
    fn test_display_uses_symbol_and_minor_units() {
        assert_eq!(Money::new(dec!(249), Currency::USD).to_string(), "$249.00");
        assert_eq!(Money::new(dec!(350), Currency::USD).to_string(), "$350.00");
    }
}

mod rates {
    use super::*;

    #[test]
    fn test_reimbursement_rate() {
        let rate = Rate::new(dec!(0.83));
        let claimed = Money::new(dec!(200), Currency::USD);

        assert_eq!(rate.apply(&claimed).amount(), dec!(166.00));
        assert_eq!(rate.as_percentage(), dec!(83.00));
    }

    #[test]
    fn test_rate_keeps_fractional_cents_until_rounded() {
        let rate = Rate::new(dec!(0.83));
        let claimed = Money::new(dec!(0.01), Currency::USD);

        let exact = rate.apply(&claimed);
        assert_eq!(exact.amount(), dec!(0.0083));
        assert_eq!(exact.round_to_currency().amount(), dec!(0.01));
    }
}
