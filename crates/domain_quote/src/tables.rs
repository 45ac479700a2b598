//! Rating tables
//!
//! Every business constant the calculators use (modal factors, quick-quote
//! base rates, age and smoker loadings, tax defaults) lives in one value that
//! is handed to the calculators. The defaults reproduce the production
//! literals; deployments can override any part of it from configuration.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::QuoteError;
use crate::premium::ModalFactors;
use crate::rule::normalize_product;

/// One step of the age loading function
///
/// Applies to ages up to and including `max_age`; `None` closes the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeLoadingBand {
    pub max_age: Option<Decimal>,
    /// Fraction of base premium added (0.20 = 20%)
    pub loading: Decimal,
}

impl AgeLoadingBand {
    pub fn up_to(max_age: Decimal, loading: Decimal) -> Self {
        Self {
            max_age: Some(max_age),
            loading,
        }
    }

    pub fn above(loading: Decimal) -> Self {
        Self {
            max_age: None,
            loading,
        }
    }
}

/// Injectable rating configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RatingTables {
    pub modal_factors: ModalFactors,
    /// Quick-quote annual rate per unit of sum insured, keyed by product
    pub base_rates: BTreeMap<String, Decimal>,
    /// Rate for products missing from `base_rates`
    pub default_base_rate: Decimal,
    /// Ascending step function; the first band covering the age wins
    pub age_loading_bands: Vec<AgeLoadingBand>,
    /// Fraction of base premium added for smokers
    pub smoker_loading: Decimal,
    /// Tax applied by quick quotes
    pub quick_quote_tax_percent: Decimal,
    /// Tax applied to full quotes when the request names none
    pub default_tax_percent: Decimal,
}

impl Default for RatingTables {
    fn default() -> Self {
        let base_rates = BTreeMap::from([
            ("health".to_string(), dec!(0.005)),
            ("term".to_string(), dec!(0.0006)),
            ("motor".to_string(), dec!(0.012)),
        ]);

        Self {
            modal_factors: ModalFactors::default(),
            base_rates,
            default_base_rate: dec!(0.005),
            age_loading_bands: vec![
                AgeLoadingBand::up_to(dec!(25), dec!(0)),
                AgeLoadingBand::up_to(dec!(40), dec!(0.20)),
                AgeLoadingBand::up_to(dec!(55), dec!(0.40)),
                AgeLoadingBand::above(dec!(0.80)),
            ],
            smoker_loading: dec!(0.25),
            quick_quote_tax_percent: dec!(18.0),
            default_tax_percent: dec!(18),
        }
    }
}

impl RatingTables {
    /// Quick-quote base rate for a product
    pub fn base_rate(&self, product: &str) -> Decimal {
        let wanted = normalize_product(product);
        self.base_rates
            .iter()
            .find(|(key, _)| normalize_product(key) == wanted)
            .map(|(_, rate)| *rate)
            .unwrap_or(self.default_base_rate)
    }

    /// Age loading fraction for an age
    pub fn age_loading(&self, age: Decimal) -> Decimal {
        self.age_loading_bands
            .iter()
            .find(|band| band.max_age.map_or(true, |max| age <= max))
            .map(|band| band.loading)
            .unwrap_or(Decimal::ZERO)
    }

    /// Checks the tables are usable before they are shared
    ///
    /// # Errors
    ///
    /// `QuoteError::Configuration` when a factor, rate or loading is negative,
    /// the age bands are not strictly ascending, or the last band is bounded.
    pub fn validate(&self) -> Result<(), QuoteError> {
        let factors = &self.modal_factors;
        for (name, value) in [
            ("annual", factors.annual),
            ("quarterly", factors.quarterly),
            ("monthly", factors.monthly),
        ] {
            if value.is_sign_negative() && !value.is_zero() {
                return Err(QuoteError::configuration(format!(
                    "modal factor {} must not be negative",
                    name
                )));
            }
        }

        if let Some((product, _)) = self
            .base_rates
            .iter()
            .find(|(_, rate)| rate.is_sign_negative() && !rate.is_zero())
        {
            return Err(QuoteError::configuration(format!(
                "base rate for {} must not be negative",
                product
            )));
        }

        if self.age_loading_bands.is_empty() {
            return Err(QuoteError::configuration("age loading table is empty"));
        }

        let mut previous: Option<Decimal> = None;
        let last = self.age_loading_bands.len() - 1;
        for (index, band) in self.age_loading_bands.iter().enumerate() {
            match band.max_age {
                None if index != last => {
                    return Err(QuoteError::configuration(
                        "only the last age loading band may be open-ended",
                    ))
                }
                None => {}
                Some(_) if index == last => {
                    return Err(QuoteError::configuration(
                        "the last age loading band must be open-ended",
                    ))
                }
                Some(max) => {
                    if previous.is_some_and(|p| max <= p) {
                        return Err(QuoteError::configuration(
                            "age loading bands must be strictly ascending",
                        ));
                    }
                    previous = Some(max);
                }
            }
        }

        let negative = |d: Decimal| d.is_sign_negative() && !d.is_zero();
        if self.age_loading_bands.iter().any(|b| negative(b.loading)) || negative(self.smoker_loading) {
            return Err(QuoteError::configuration("loadings must not be negative"));
        }

        if negative(self.quick_quote_tax_percent) || negative(self.default_tax_percent) {
            return Err(QuoteError::configuration("tax percentages must not be negative"));
        }

        Ok(())
    }
}
