//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating random quoting data
//! that maintains domain invariants.

use domain_quote::{AddOnDefinition, PaymentFrequency, PricingRule, QuoteRequest};
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Strategy for generating product types, including casing noise
pub fn product_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("health".to_string()),
        Just("term".to_string()),
        Just("motor".to_string()),
        Just(" Health ".to_string()),
        Just("MOTOR".to_string()),
    ]
}

/// Strategy for generating payment frequencies
pub fn frequency_strategy() -> impl Strategy<Value = PaymentFrequency> {
    prop_oneof![
        Just(PaymentFrequency::Annual),
        Just(PaymentFrequency::Quarterly),
        Just(PaymentFrequency::Monthly),
    ]
}

/// Strategy for generating whole or half-year ages (0 to 100)
pub fn age_strategy() -> impl Strategy<Value = Decimal> {
    (0u32..=200u32).prop_map(|halves| Decimal::new(halves as i64 * 5, 1))
}

/// Strategy for generating sums insured (1000 to 100,000,000)
pub fn sum_insured_strategy() -> impl Strategy<Value = Decimal> {
    (1u64..100_000u64).prop_map(|thousands| Decimal::from(thousands * 1000))
}

/// Strategy for generating base premiums with cents
pub fn base_premium_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for generating tax percentages (0% to 30%, two decimals)
pub fn tax_percent_strategy() -> impl Strategy<Value = Decimal> {
    (0u32..=3000u32).prop_map(|n| Decimal::new(n as i64, 2))
}

/// Strategy for generating add-ons with distinct codes
pub fn add_ons_strategy() -> impl Strategy<Value = Vec<AddOnDefinition>> {
    proptest::collection::vec((any::<bool>(), 0u32..5000u32), 0..4).prop_map(|items| {
        items
            .into_iter()
            .enumerate()
            .map(|(i, (percent, n))| {
                let code = format!("addon-{}", i);
                if percent {
                    AddOnDefinition::percent(code, Decimal::new(n as i64, 4))
                } else {
                    AddOnDefinition::absolute(code, Decimal::new(n as i64, 0))
                }
            })
            .collect()
    })
}

/// Strategy for generating well-formed pricing rules
pub fn pricing_rule_strategy() -> impl Strategy<Value = PricingRule> {
    (
        product_strategy(),
        prop::option::of(0u32..60u32),
        prop::option::of(0u32..40u32),
        sum_insured_strategy(),
        base_premium_strategy(),
        add_ons_strategy(),
        0u32..10_000u32,
    )
        .prop_map(|(product, min, span, sum_insured, base, add_ons, n)| {
            let min_age = min.map(Decimal::from);
            let max_age = span.map(|s| Decimal::from(min.unwrap_or(0) + s));
            let mut rule = PricingRule::new(format!("rule-{}", n), product, sum_insured, base)
                .with_age_band(min_age, max_age);
            rule.add_ons = add_ons;
            rule
        })
}

/// Strategy for generating valid full quote requests
pub fn quote_request_strategy() -> impl Strategy<Value = QuoteRequest> {
    (
        product_strategy(),
        age_strategy(),
        sum_insured_strategy(),
        prop::option::of(tax_percent_strategy()),
        frequency_strategy(),
    )
        .prop_map(|(product, age, sum_insured, tax, frequency)| {
            let mut request = QuoteRequest::new(product, age, sum_insured).with_frequency(frequency);
            request.tax_percent = tax;
            request
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn test_generated_rules_have_valid_buckets(rule in pricing_rule_strategy()) {
            prop_assert!(rule.bucket().is_ok());
            if let (Some(min), Some(max)) = (rule.min_age.value(), rule.max_age.value()) {
                prop_assert!(min <= max);
            }
        }

        #[test]
        fn test_generated_requests_validate(request in quote_request_strategy()) {
            prop_assert!(request.validate().is_ok());
        }
    }
}
