//! Custom Test Assertions
//!
//! Provides specialized assertion helpers for quote types that give
//! more meaningful error messages than standard assertions.

use domain_quote::{Quote, QuoteOutcome};
use rust_decimal::Decimal;
use serde_json::Value;

/// Asserts that two amounts are equal within a tolerance
///
/// # Panics
///
/// Panics if the amounts differ by more than `tolerance`
pub fn assert_decimal_approx_eq(actual: Decimal, expected: Decimal, tolerance: Decimal) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= tolerance,
        "Amounts differ by more than tolerance: actual={}, expected={}, diff={}, tolerance={}",
        actual,
        expected,
        diff,
        tolerance
    );
}

/// Asserts that an amount carries at most two decimal places
pub fn assert_rounded_to_cents(amount: Decimal) {
    assert_eq!(
        amount,
        amount.round_dp(2),
        "Expected an amount rounded to 2 decimal places, got {}",
        amount
    );
}

/// Asserts the internal arithmetic of a quote holds after rounding
///
/// Checks that add-on amounts sum to the add-on total, that the subtotal is
/// base plus add-ons and that the total is subtotal plus tax, each within a
/// cent per rounded term.
pub fn assert_quote_consistent(quote: &Quote) {
    let cent = Decimal::new(1, 2);
    let add_on_sum: Decimal = quote.add_ons.iter().map(|a| a.amount).sum();
    let add_on_terms = Decimal::from(quote.add_ons.len() as u64);

    assert_decimal_approx_eq(add_on_sum, quote.total_add_ons, cent * add_on_terms);
    assert_decimal_approx_eq(
        quote.scaled_base_premium + quote.total_add_ons,
        quote.sub_total,
        cent,
    );
    assert_decimal_approx_eq(quote.sub_total + quote.tax_amount, quote.total_payable, cent);

    for amount in [
        quote.scaled_base_premium,
        quote.total_add_ons,
        quote.sub_total,
        quote.tax_amount,
        quote.total_payable,
        quote.payment_schedule.installment_amount,
    ] {
        assert_rounded_to_cents(amount);
    }
}

/// Unwraps a matched outcome
///
/// # Panics
///
/// Panics if no rule matched
pub fn expect_quoted(outcome: QuoteOutcome) -> Quote {
    match outcome {
        QuoteOutcome::Quoted(quote) => *quote,
        QuoteOutcome::NoMatchingRule => panic!("Expected a quote, got NoMatchingRule"),
    }
}

/// Asserts that a JSON number or numeric string equals an amount
pub fn assert_json_amount(value: &Value, expected: Decimal) {
    let actual = match value {
        Value::Number(n) => n.to_string().parse::<Decimal>().ok(),
        Value::String(s) => s.parse::<Decimal>().ok(),
        _ => None,
    };
    assert_eq!(
        actual,
        Some(expected),
        "Expected JSON amount {}, got {}",
        expected,
        value
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_approx_eq_within_tolerance() {
        assert_decimal_approx_eq(dec!(100.004), dec!(100.00), dec!(0.01));
    }

    #[test]
    #[should_panic(expected = "differ by more than tolerance")]
    fn test_approx_eq_outside_tolerance() {
        assert_decimal_approx_eq(dec!(100.02), dec!(100.00), dec!(0.01));
    }

    #[test]
    fn test_json_amount() {
        assert_json_amount(&json!(106.2), dec!(106.20));
        assert_json_amount(&json!("3540"), dec!(3540));
    }
}
