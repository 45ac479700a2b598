//! Quote requests
//!
//! Numeric inputs are validated before any arithmetic. Pricing a validated
//! request never panics: amounts that do not fit a `Decimal` surface as
//! `QuoteError::Money`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::QuoteError;
use crate::premium::PaymentFrequency;

/// Largest sum insured accepted, keeps every product inside `Decimal` range
pub const MAX_SUM_INSURED: Decimal = dec!(1000000000000000);

/// Oldest age accepted
pub const MAX_AGE: Decimal = dec!(150);

/// Caller-supplied parameters for a full quote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub product_type: String,
    /// May be fractional
    pub age: Decimal,
    pub sum_insured: Decimal,
    /// Empty means every add-on on the rule
    #[serde(default)]
    pub add_ons_requested: BTreeSet<String>,
    /// Falls back to the rating tables' default when absent
    #[serde(default)]
    pub tax_percent: Option<Decimal>,
    #[serde(default)]
    pub payment_frequency: PaymentFrequency,
    /// Falls back to the evaluation time when absent
    #[serde(default)]
    pub quote_date: Option<DateTime<Utc>>,
}

impl QuoteRequest {
    pub fn new(product_type: impl Into<String>, age: Decimal, sum_insured: Decimal) -> Self {
        Self {
            product_type: product_type.into(),
            age,
            sum_insured,
            add_ons_requested: BTreeSet::new(),
            tax_percent: None,
            payment_frequency: PaymentFrequency::Annual,
            quote_date: None,
        }
    }

    pub fn with_add_ons<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_ons_requested = codes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_tax_percent(mut self, tax_percent: Decimal) -> Self {
        self.tax_percent = Some(tax_percent);
        self
    }

    pub fn with_frequency(mut self, frequency: PaymentFrequency) -> Self {
        self.payment_frequency = frequency;
        self
    }

    pub fn with_quote_date(mut self, quote_date: DateTime<Utc>) -> Self {
        self.quote_date = Some(quote_date);
        self
    }

    /// Rejects requests the calculator must not price
    ///
    /// # Errors
    ///
    /// `QuoteError::InvalidInput` naming the offending field when the product
    /// type is blank, the age is negative or implausible, the sum insured is
    /// not positive or too large, or the tax percent is negative. Tax percents
    /// above 100 are accepted.
    pub fn validate(&self) -> Result<(), QuoteError> {
        if self.product_type.trim().is_empty() {
            return Err(QuoteError::invalid_input("productType", "must not be blank"));
        }
        validate_age(self.age)?;
        validate_sum_insured(self.sum_insured)?;
        if let Some(tax) = self.tax_percent {
            if tax.is_sign_negative() && !tax.is_zero() {
                return Err(QuoteError::invalid_input("taxPercent", "must not be negative"));
            }
        }
        Ok(())
    }
}

pub(crate) fn validate_age(age: Decimal) -> Result<(), QuoteError> {
    if age.is_sign_negative() && !age.is_zero() {
        return Err(QuoteError::invalid_input("age", "must not be negative"));
    }
    if age > MAX_AGE {
        return Err(QuoteError::invalid_input("age", format!("must not exceed {}", MAX_AGE)));
    }
    Ok(())
}

pub(crate) fn validate_sum_insured(sum_insured: Decimal) -> Result<(), QuoteError> {
    if sum_insured <= Decimal::ZERO {
        return Err(QuoteError::invalid_input("sumInsured", "must be positive"));
    }
    if sum_insured > MAX_SUM_INSURED {
        return Err(QuoteError::invalid_input(
            "sumInsured",
            format!("must not exceed {}", MAX_SUM_INSURED),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(err: QuoteError) -> String {
        match err {
            QuoteError::InvalidInput { field, .. } => field,
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_request() {
        QuoteRequest::new("health", dec!(35.5), dec!(500000)).validate().unwrap();
    }

    #[test]
    fn test_rejects_bad_numbers() {
        let base = QuoteRequest::new("health", dec!(35), dec!(500000));

        let mut r = base.clone();
        r.sum_insured = Decimal::ZERO;
        assert_eq!(field_of(r.validate().unwrap_err()), "sumInsured");

        let mut r = base.clone();
        r.age = dec!(-1);
        assert_eq!(field_of(r.validate().unwrap_err()), "age");

        let r = base.clone().with_tax_percent(dec!(-5));
        assert_eq!(field_of(r.validate().unwrap_err()), "taxPercent");

        let mut r = base;
        r.product_type = "  ".to_string();
        assert_eq!(field_of(r.validate().unwrap_err()), "productType");
    }

    #[test]
    fn test_tax_percent_has_no_upper_bound() {
        let request = QuoteRequest::new("health", dec!(35), dec!(500000)).with_tax_percent(dec!(250));
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_deserialize_defaults() {
        let request: QuoteRequest = serde_json::from_str(
            r#"{ "productType": "health", "age": 30, "sumInsured": "1000000" }"#,
        )
        .unwrap();
        assert!(request.add_ons_requested.is_empty());
        assert_eq!(request.payment_frequency, PaymentFrequency::Annual);
        assert_eq!(request.tax_percent, None);
        assert_eq!(request.sum_insured, dec!(1000000));
    }
}
