//! Rule Selection Tests
//!
//! Exercises first-match-wins selection through the public API, including
//! property tests over randomly generated catalogs.
//!
//! # Test Organization
//!
//! - `ordering_tests` - catalog order decides between overlapping rules
//! - `predicate_tests` - product, age band and effective date predicates
//! - `stored_record_tests` - rules deserialized from stored documents
//! - `property_tests` - determinism and first-match-wins over random catalogs

use chrono::{DateTime, Duration, TimeZone, Utc};
use domain_quote::{select_rule, PricingRule, RuleCatalog, RuleNumber};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn as_of() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
}

fn banded(id: &str, product: &str, min: Option<Decimal>, max: Option<Decimal>) -> PricingRule {
    PricingRule::new(id, product, dec!(500000), dec!(2500)).with_age_band(min, max)
}

// ============================================================================
// ORDERING TESTS
// ============================================================================

mod ordering_tests {
    use super::*;

    /// The earlier rule wins even when a later one is tighter
    #[test]
    fn test_earlier_rule_wins_regardless_of_tightness() {
        let rules = vec![
            banded("wide", "health", Some(dec!(0)), Some(dec!(100))),
            banded("narrow", "health", Some(dec!(30)), Some(dec!(35))),
        ];
        assert_eq!(select_rule(&rules, "health", dec!(32), as_of()).unwrap().id, "wide");

        let reversed: Vec<PricingRule> = rules.into_iter().rev().collect();
        assert_eq!(select_rule(&reversed, "health", dec!(32), as_of()).unwrap().id, "narrow");
    }

    /// Non-matching rules before the winner are skipped
    #[test]
    fn test_skips_until_first_match() {
        let rules = vec![
            banded("motor", "motor", None, None),
            banded("young", "health", None, Some(dec!(25))),
            banded("adult", "health", Some(dec!(26)), Some(dec!(60))),
            banded("any", "health", None, None),
        ];
        assert_eq!(select_rule(&rules, "health", dec!(40), as_of()).unwrap().id, "adult");
        assert_eq!(select_rule(&rules, "health", dec!(70), as_of()).unwrap().id, "any");
    }

    /// The catalog keeps selection order after excluding broken rules
    #[test]
    fn test_catalog_preserves_order_after_exclusion() {
        let mut broken = banded("broken", "health", None, None);
        broken.sum_insured = RuleNumber::Value(Decimal::ZERO);
        let catalog = RuleCatalog::load(vec![
            broken,
            banded("second", "health", None, None),
            banded("third", "health", None, None),
        ]);
        assert_eq!(catalog.select("health", dec!(40), as_of()).unwrap().id, "second");
    }
}

// ============================================================================
// PREDICATE TESTS
// ============================================================================

mod predicate_tests {
    use super::*;

    /// Bounds 18..=65 accept 18 and 65 exactly, reject 17 and 66
    #[test]
    fn test_age_bounds_are_inclusive() {
        let rules = vec![banded("adult", "health", Some(dec!(18)), Some(dec!(65)))];
        for (age, expected) in [(dec!(18), true), (dec!(65), true), (dec!(17), false), (dec!(66), false)] {
            assert_eq!(
                select_rule(&rules, "health", age, as_of()).is_some(),
                expected,
                "age {}",
                age
            );
        }
    }

    /// Fractional ages compare numerically
    #[test]
    fn test_fractional_age() {
        let rules = vec![banded("adult", "health", Some(dec!(18)), Some(dec!(65)))];
        assert!(select_rule(&rules, "health", dec!(65.5), as_of()).is_none());
        assert!(select_rule(&rules, "health", dec!(17.9), as_of()).is_none());
        assert!(select_rule(&rules, "health", dec!(18.0), as_of()).is_some());
    }

    /// A rule starting one day after the quote date is never selected
    #[test]
    fn test_future_dated_rule_excluded() {
        let tomorrow = (as_of() + Duration::days(1)).to_rfc3339();
        let rules = vec![banded("future", "health", None, None).with_effective_from(tomorrow)];
        assert!(select_rule(&rules, "health", dec!(30), as_of()).is_none());
    }

    /// A rule starting exactly on the quote date is selectable
    #[test]
    fn test_rule_effective_on_quote_date() {
        let rules = vec![banded("today", "health", None, None).with_effective_from(as_of().to_rfc3339())];
        assert!(select_rule(&rules, "health", dec!(30), as_of()).is_some());
    }

    /// Future start dates are honoured in every stored date shape
    #[test]
    fn test_future_dates_in_loose_formats_are_excluded() {
        for raw in [
            "2030",
            "2030-01",
            "Tue, 01 Jan 2030 00:00:00 GMT",
            "2030-01-01T00:00:00.000+0000",
        ] {
            let rules = vec![banded("later", "health", None, None).with_effective_from(raw)];
            assert!(
                select_rule(&rules, "health", dec!(30), as_of()).is_none(),
                "{raw:?} should read as a 2030 start date"
            );
        }
    }

    /// Past start dates in the same shapes still select
    #[test]
    fn test_past_dates_in_loose_formats_are_effective() {
        for raw in ["2020", "2020-01", "Wed, 01 Jan 2020 00:00:00 GMT", "2020-01-01T00:00:00.000+0000"] {
            let rules = vec![banded("earlier", "health", None, None).with_effective_from(raw)];
            assert_eq!(
                select_rule(&rules, "health", dec!(30), as_of()).map(|r| r.id.as_str()),
                Some("earlier"),
                "{raw:?} should read as a 2020 start date"
            );
        }
    }

    /// An unparsable start date never disqualifies a rule
    #[test]
    fn test_unparsable_effective_from_is_ignored() {
        let rules = vec![banded("odd", "health", None, None).with_effective_from("soon")];
        assert_eq!(select_rule(&rules, "health", dec!(30), as_of()).unwrap().id, "odd");
    }

    /// Product types compare trimmed and case-insensitively
    #[test]
    fn test_product_type_normalization() {
        let rules = vec![banded("r", " Health", None, None)];
        assert!(select_rule(&rules, "HEALTH ", dec!(30), as_of()).is_some());
        assert!(select_rule(&rules, "health-plus", dec!(30), as_of()).is_none());
    }

    /// An empty catalog always misses
    #[test]
    fn test_empty_catalog() {
        assert!(select_rule(&[], "health", dec!(30), as_of()).is_none());
    }
}

// ============================================================================
// STORED RECORD TESTS
// ============================================================================

mod stored_record_tests {
    use super::*;

    /// Loosely typed stored fields are read the way they were written
    #[test]
    fn test_stored_document_selection() {
        let rules: Vec<PricingRule> = serde_json::from_str(
            r#"[
                { "_id": "r1", "productType": "health", "minAge": "adult", "sumInsured": 500000, "basePremium": 2500 },
                { "_id": "r2", "productType": "health", "minAge": "18", "maxAge": "65", "sumInsured": "500000", "basePremium": "2500" }
            ]"#,
        )
        .unwrap();

        assert!(rules[0].min_age.is_malformed());
        let selected = select_rule(&rules, "health", dec!(30), as_of()).unwrap();
        assert_eq!(selected.id, "r2");
        assert_eq!(selected.bucket().unwrap().sum_insured, dec!(500000));
    }
}

// ============================================================================
// PROPERTY TESTS
// ============================================================================

mod property_tests {
    use super::*;
    use domain_quote::selector::check_rule;
    use domain_quote::normalize_product;
    use proptest::prelude::*;

    fn rule_strategy() -> impl Strategy<Value = PricingRule> {
        (
            prop::sample::select(vec!["health", "term", "motor"]),
            prop::option::of(0u32..80),
            prop::option::of(0u32..80),
            0u32..1000,
        )
            .prop_map(|(product, lo, hi, n)| {
                let min = lo.map(Decimal::from);
                let max = match (lo, hi) {
                    (Some(lo), Some(hi)) => Some(Decimal::from(lo.max(hi))),
                    (_, hi) => hi.map(Decimal::from),
                };
                banded(&format!("rule-{}", n), product, min, max)
            })
    }

    proptest! {
        #[test]
        fn prop_selection_is_deterministic(
            rules in prop::collection::vec(rule_strategy(), 0..12),
            age in 0u32..100,
        ) {
            let age = Decimal::from(age);
            let first = select_rule(&rules, "health", age, as_of()).map(|r| r as *const PricingRule);
            let second = select_rule(&rules, "health", age, as_of()).map(|r| r as *const PricingRule);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_selects_first_applicable_index(
            rules in prop::collection::vec(rule_strategy(), 0..12),
            age in 0u32..100,
        ) {
            let age = Decimal::from(age);
            let wanted = normalize_product("health");
            let expected = rules
                .iter()
                .position(|r| check_rule(r, &wanted, age, as_of()).is_ok());
            let selected = select_rule(&rules, "health", age, as_of())
                .map(|r| rules.iter().position(|x| std::ptr::eq(x, r)).unwrap());
            prop_assert_eq!(selected, expected);
        }

        #[test]
        fn prop_open_rule_in_front_always_wins(
            rules in prop::collection::vec(rule_strategy(), 0..12),
            age in 0u32..100,
        ) {
            let mut catalog = vec![banded("front", "health", None, None)];
            catalog.extend(rules);
            let selected = select_rule(&catalog, "health", Decimal::from(age), as_of()).unwrap();
            prop_assert_eq!(selected.id.as_str(), "front");
        }
    }
}
