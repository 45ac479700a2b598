//! Pre-built Test Fixtures
//!
//! Provides ready-to-use test data for the quoting system: a sample rule
//! catalog, fixed dates and clocks, and a ready-wired quote service.
//! These fixtures are designed to be consistent and predictable for unit tests.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use core_kernel::{Currency, FixedClock, SharedClock};
use domain_quote::{AddOnDefinition, PricingRule, QuoteService, RatingTables, RuleCatalog};
use rust_decimal_macros::dec;

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// Standard quote date (Jun 1, 2024)
    pub fn quote_date() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    /// Start of the next rate revision (Jan 1, 2025)
    pub fn next_revision() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    /// Clock frozen at [`TemporalFixtures::quote_date`]
    pub fn fixed_clock() -> SharedClock {
        Arc::new(FixedClock::new(Self::quote_date()))
    }

    /// Clock frozen at an arbitrary instant
    pub fn clock_at(instant: DateTime<Utc>) -> SharedClock {
        Arc::new(FixedClock::new(instant))
    }
}

/// Fixture for pricing rules
pub struct RuleFixtures;

impl RuleFixtures {
    /// Health cover for ages 18 to 45 with two add-ons
    pub fn health_young_adult() -> PricingRule {
        PricingRule::new("health-18-45", "health", dec!(500000), dec!(2500))
            .with_age_band(Some(dec!(18)), Some(dec!(45)))
            .with_add_on(AddOnDefinition::percent("maternity", dec!(0.02)))
            .with_add_on(AddOnDefinition::absolute("hospitalcash", dec!(200)))
    }

    /// Health cover for ages 46 to 65
    pub fn health_senior() -> PricingRule {
        PricingRule::new("health-46-65", "health", dec!(500000), dec!(4200))
            .with_age_band(Some(dec!(46)), Some(dec!(65)))
            .with_add_on(AddOnDefinition::percent("opd", dec!(0.05)))
    }

    /// Health rate revision that starts on [`TemporalFixtures::next_revision`]
    pub fn health_revision() -> PricingRule {
        PricingRule::new("health-2025", "health", dec!(500000), dec!(2750))
            .with_age_band(Some(dec!(18)), Some(dec!(45)))
            .with_effective_from("2025-01-01")
    }

    /// Term cover for any age, no add-ons
    pub fn term_any_age() -> PricingRule {
        PricingRule::new("term-any", "term", dec!(10000000), dec!(6000))
    }

    /// Motor cover with a fixed-fee add-on
    pub fn motor_standard() -> PricingRule {
        PricingRule::new("motor-std", "motor", dec!(800000), dec!(9600))
            .with_age_band(Some(dec!(18)), None)
            .with_add_on(AddOnDefinition::absolute("roadside", dec!(499)))
    }

    /// The sample catalog, in selection order
    ///
    /// The 2025 revision is listed first so it wins once effective.
    pub fn sample_rules() -> Vec<PricingRule> {
        vec![
            Self::health_revision(),
            Self::health_young_adult(),
            Self::health_senior(),
            Self::term_any_age(),
            Self::motor_standard(),
        ]
    }

    /// The sample rules loaded into a catalog
    pub fn sample_catalog() -> RuleCatalog {
        RuleCatalog::load_at(Self::sample_rules(), TemporalFixtures::quote_date())
    }

    /// The sample catalog as stored JSON documents
    pub fn sample_rules_json() -> serde_json::Value {
        serde_json::json!([
            {
                "_id": { "$oid": "6650a1f0c2e4b0a1b2c3d4e5" },
                "productType": "health",
                "minAge": 18,
                "maxAge": "45",
                "sumInsured": 500000,
                "basePremium": "2500",
                "addOns": [
                    { "code": "maternity", "type": "percent", "value": 0.02 },
                    { "code": "hospitalcash", "type": "absolute", "value": 200 }
                ]
            },
            {
                "_id": "motor-std",
                "productType": "Motor",
                "minAge": 18,
                "sumInsured": 800000,
                "basePremium": 9600,
                "addOns": "roadside:absolute:499",
                "effectiveFrom": { "$date": "2024-01-01T00:00:00Z" }
            },
            {
                "_id": "broken",
                "productType": "health",
                "sumInsured": 0,
                "basePremium": 100
            }
        ])
    }
}

/// Fixture for wired services
pub struct ServiceFixtures;

impl ServiceFixtures {
    /// Quote service on default tables and the fixed clock
    pub fn quote_service() -> QuoteService {
        QuoteService::new(Arc::new(RatingTables::default()), TemporalFixtures::fixed_clock())
            .with_currency(Currency::INR)
    }
}
