//! Integration tests for the money helpers
//!
//! Covers the rounding policy applied to published quote figures, checked
//! ratios used for bucket scaling, and percentage rates.

use core_kernel::money::{checked_product, QUOTE_DECIMAL_PLACES};
use core_kernel::{checked_ratio, round2, round_half_away, Currency, MoneyError, Rate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

mod rounding {
    use super::*;

    #[test]
    fn test_midpoint_rounds_away_from_zero() {
        assert_eq!(round2(dec!(1.005)), dec!(1.01));
        assert_eq!(round2(dec!(1.015)), dec!(1.02));
        assert_eq!(round2(dec!(-1.005)), dec!(-1.01));
    }

    #[test]
    fn test_below_midpoint_rounds_down() {
        assert_eq!(round2(dec!(106.2049)), dec!(106.20));
    }

    #[test]
    fn test_installment_example() {
        // 1180.00 paid monthly at the 0.09 modal factor
        assert_eq!(round2(dec!(1180.00) * dec!(0.09)), dec!(106.20));
    }

    #[test]
    fn test_other_precisions() {
        assert_eq!(round_half_away(dec!(2.5), 0), dec!(3));
        assert_eq!(round_half_away(dec!(0.0005), 3), dec!(0.001));
        assert_eq!(QUOTE_DECIMAL_PLACES, 2);
    }
}

mod ratios {
    use super::*;

    #[test]
    fn test_zero_denominator_is_an_error() {
        assert_eq!(checked_ratio(dec!(500000), Decimal::ZERO), Err(MoneyError::DivisionByZero));
    }

    #[test]
    fn test_exact_ratio() {
        assert_eq!(checked_ratio(dec!(1000000), dec!(500000)), Ok(dec!(2)));
    }

    #[test]
    fn test_overflow_is_reported() {
        assert_eq!(checked_product(Decimal::MAX, dec!(2)), Err(MoneyError::Overflow));
    }
}

mod rates {
    use super::*;

    #[test]
    fn test_percentage_round_trip() {
        let rate = Rate::from_percentage(dec!(18));
        assert_eq!(rate.as_decimal(), dec!(0.18));
        assert_eq!(rate.as_percentage(), dec!(18));
    }

    #[test]
    fn test_apply_keeps_full_precision() {
        let rate = Rate::new(dec!(0.02));
        assert_eq!(rate.apply(dec!(3333.333)), Ok(dec!(66.66666)));
    }
}

mod currencies {
    use super::*;

    #[test]
    fn test_default_currency_is_inr() {
        assert_eq!(Currency::default(), Currency::INR);
        assert_eq!(Currency::INR.symbol(), "₹");
    }

    #[test]
    fn test_serde_uses_iso_codes() {
        let json = serde_json::to_string(&Currency::INR).unwrap();
        assert_eq!(json, "\"INR\"");
    }

    #[test]
    fn test_jpy_has_no_minor_units() {
        assert_eq!(Currency::JPY.decimal_places(), 0);
        assert_eq!(Currency::USD.decimal_places(), 2);
    }
}
