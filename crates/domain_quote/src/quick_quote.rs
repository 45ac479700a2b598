//! Quick quotes
//!
//! Instant estimates straight from the rating tables, with no rule catalog.
//! The tax and payment schedule tail is shared with full quotes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use core_kernel::{checked_product, checked_sum, round2, Currency, QuoteId};

use crate::error::QuoteError;
use crate::premium::{settle, PaymentFrequency, PaymentSchedule};
use crate::quote::QuoteStamp;
use crate::request::{validate_age, validate_sum_insured};
use crate::tables::RatingTables;

/// Longest tenure accepted
pub const MAX_TENURE_YEARS: Decimal = rust_decimal_macros::dec!(100);

/// Quick quote payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickQuoteRequest {
    pub product: String,
    pub sum_insured: Decimal,
    pub age: Decimal,
    /// Defaults to one year
    #[serde(default)]
    pub tenure_years: Option<Decimal>,
    #[serde(default)]
    pub smoker: bool,
    #[serde(default)]
    pub payment_frequency: PaymentFrequency,
}

impl QuickQuoteRequest {
    pub fn new(product: impl Into<String>, sum_insured: Decimal, age: Decimal) -> Self {
        Self {
            product: product.into(),
            sum_insured,
            age,
            tenure_years: None,
            smoker: false,
            payment_frequency: PaymentFrequency::Annual,
        }
    }

    pub fn with_tenure(mut self, years: Decimal) -> Self {
        self.tenure_years = Some(years);
        self
    }

    pub fn smoker(mut self) -> Self {
        self.smoker = true;
        self
    }

    pub fn with_frequency(mut self, frequency: PaymentFrequency) -> Self {
        self.payment_frequency = frequency;
        self
    }

    pub fn tenure(&self) -> Decimal {
        self.tenure_years.unwrap_or(Decimal::ONE)
    }

    /// # Errors
    ///
    /// `QuoteError::InvalidInput` for a blank product, an out-of-range age or
    /// sum insured, or a tenure that is not positive.
    pub fn validate(&self) -> Result<(), QuoteError> {
        if self.product.trim().is_empty() {
            return Err(QuoteError::invalid_input("product", "must not be blank"));
        }
        validate_age(self.age)?;
        validate_sum_insured(self.sum_insured)?;
        let tenure = self.tenure();
        if tenure <= Decimal::ZERO {
            return Err(QuoteError::invalid_input("tenureYears", "must be positive"));
        }
        if tenure > MAX_TENURE_YEARS {
            return Err(QuoteError::invalid_input(
                "tenureYears",
                format!("must not exceed {}", MAX_TENURE_YEARS),
            ));
        }
        Ok(())
    }
}

/// Itemized quick quote
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickQuote {
    pub quote_id: QuoteId,
    pub product: String,
    pub sum_insured: Decimal,
    pub tenure_years: Decimal,
    pub age: Decimal,
    pub base_premium: Decimal,
    pub age_loading: Decimal,
    pub smoker_loading: Decimal,
    pub sub_total: Decimal,
    pub tax_percent: Decimal,
    pub tax_amount: Decimal,
    pub total_payable: Decimal,
    pub payment_schedule: PaymentSchedule,
    pub currency: Currency,
    pub quoted_at: DateTime<Utc>,
}

/// Prices quick quotes from rating tables
#[derive(Debug, Clone)]
pub struct QuickQuoteCalculator {
    tables: Arc<RatingTables>,
    currency: Currency,
}

impl QuickQuoteCalculator {
    pub fn new(tables: Arc<RatingTables>) -> Self {
        Self {
            tables,
            currency: Currency::default(),
        }
    }

    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    /// Computes a quick quote
    ///
    /// # Errors
    ///
    /// * `QuoteError::InvalidInput` when the payload fails validation
    /// * `QuoteError::Money` if any amount overflows a `Decimal`
    pub fn quick_quote(
        &self,
        request: &QuickQuoteRequest,
        stamp: QuoteStamp,
    ) -> Result<QuickQuote, QuoteError> {
        request.validate()?;

        let tables = &self.tables;
        let tenure = request.tenure();
        let base_rate = tables.base_rate(&request.product);
        let base_premium = checked_product(checked_product(request.sum_insured, base_rate)?, tenure)?;
        let age_loading = checked_product(base_premium, tables.age_loading(request.age))?;
        let smoker_loading = if request.smoker {
            checked_product(base_premium, tables.smoker_loading)?
        } else {
            Decimal::ZERO
        };

        let sub_total = checked_sum([base_premium, age_loading, smoker_loading])?;
        let tax_percent = tables.quick_quote_tax_percent;
        let settlement = settle(
            sub_total,
            tax_percent,
            request.payment_frequency,
            &tables.modal_factors,
        )?;

        tracing::debug!(
            quote_id = %stamp.quote_id,
            product = %request.product,
            %base_rate,
            total_payable = %settlement.total_payable,
            "computed quick quote"
        );

        Ok(QuickQuote {
            quote_id: stamp.quote_id,
            product: request.product.clone(),
            sum_insured: request.sum_insured,
            tenure_years: tenure,
            age: request.age,
            base_premium: round2(base_premium),
            age_loading: round2(age_loading),
            smoker_loading: round2(smoker_loading),
            sub_total: round2(sub_total),
            tax_percent,
            tax_amount: round2(settlement.tax_amount),
            total_payable: round2(settlement.total_payable),
            payment_schedule: settlement.schedule,
            currency: self.currency,
            quoted_at: stamp.quote_date,
        })
    }
}

impl Default for QuickQuoteCalculator {
    fn default() -> Self {
        Self::new(Arc::new(RatingTables::default()))
    }
}
