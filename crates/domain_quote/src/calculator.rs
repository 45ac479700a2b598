//! Premium calculation
//!
//! Turns a selected rule and a request into an itemized quote:
//!
//! ```text
//! multiplier   = requested sum insured / bucket sum insured
//! scaled base  = bucket base premium * multiplier
//! add-ons      = percent: scaled base * value | absolute: value
//! subtotal     = scaled base + sum(add-ons)
//! tax          = subtotal * taxPercent / 100
//! total        = subtotal + tax
//! installment  = round2(total * modal factor)
//! ```
//!
//! Intermediate values keep full decimal precision; every published amount
//! is rounded half away from zero to two places at the end.

use rust_decimal::Decimal;
use std::collections::BTreeSet;
use std::sync::Arc;

use core_kernel::{checked_product, checked_ratio, checked_sum, round2, Currency, MoneyError};

use crate::error::QuoteError;
use crate::premium::settle;
use crate::quote::{AddOnCharge, Quote, QuoteStamp};
use crate::request::QuoteRequest;
use crate::rule::{AddOnDefinition, PricingRule};
use crate::tables::RatingTables;

/// Keeps the rule's add-ons the caller asked for, in rule order
///
/// An empty request keeps every add-on.
pub fn select_add_ons<'a>(
    add_ons: &'a [AddOnDefinition],
    requested: &'a BTreeSet<String>,
) -> impl Iterator<Item = &'a AddOnDefinition> + 'a {
    add_ons
        .iter()
        .filter(move |add_on| requested.is_empty() || requested.contains(&add_on.code))
}

/// Prices full quotes against injected rating tables
#[derive(Debug, Clone)]
pub struct PremiumCalculator {
    tables: Arc<RatingTables>,
    currency: Currency,
}

impl PremiumCalculator {
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

    pub fn tables(&self) -> &RatingTables {
        &self.tables
    }

    /// Computes the itemized quote for a selected rule
    ///
    /// # Errors
    ///
    /// * `QuoteError::InvalidInput` if the request fails validation
    /// * `QuoteError::MalformedRule` if the rule's bucket cannot anchor scaling
    /// * `QuoteError::Money` if any amount overflows a `Decimal`
    pub fn compute_quote(
        &self,
        rule: &PricingRule,
        request: &QuoteRequest,
        stamp: QuoteStamp,
    ) -> Result<Quote, QuoteError> {
        request.validate()?;
        let bucket = rule.bucket()?;

        let multiplier = checked_ratio(request.sum_insured, bucket.sum_insured).map_err(|e| match e {
            MoneyError::DivisionByZero => QuoteError::malformed_rule(&rule.id, "bucket sum insured is zero"),
            other => QuoteError::Money(other),
        })?;
        let scaled_base_premium = checked_product(bucket.base_premium, multiplier)?;

        let priced = select_add_ons(&rule.add_ons, &request.add_ons_requested)
            .map(|add_on| add_on.price(scaled_base_premium).map(|amount| (add_on, amount)))
            .collect::<Result<Vec<(&AddOnDefinition, Decimal)>, MoneyError>>()?;
        let total_add_ons = checked_sum(priced.iter().map(|(_, amount)| *amount))?;

        let sub_total = checked_sum([scaled_base_premium, total_add_ons])?;
        let tax_percent = request
            .tax_percent
            .unwrap_or(self.tables.default_tax_percent);
        let settlement = settle(
            sub_total,
            tax_percent,
            request.payment_frequency,
            &self.tables.modal_factors,
        )?;

        tracing::debug!(
            quote_id = %stamp.quote_id,
            rule_id = %rule.id,
            %multiplier,
            total_payable = %settlement.total_payable,
            "computed full quote"
        );

        Ok(Quote {
            quote_id: stamp.quote_id,
            product_type: request.product_type.clone(),
            applied_rule_id: rule.id.clone(),
            rule_bucket: bucket,
            requested_sum_insured: request.sum_insured,
            multiplier: round2(multiplier),
            scaled_base_premium: round2(scaled_base_premium),
            add_ons: priced
                .into_iter()
                .map(|(add_on, amount)| AddOnCharge {
                    code: add_on.code.clone(),
                    kind: add_on.kind,
                    value: add_on.value,
                    amount: round2(amount),
                })
                .collect(),
            total_add_ons: round2(total_add_ons),
            sub_total: round2(sub_total),
            tax_percent,
            tax_amount: round2(settlement.tax_amount),
            total_payable: round2(settlement.total_payable),
            payment_schedule: settlement.schedule,
            currency: self.currency,
            quote_date: stamp.quote_date,
        })
    }
}

impl Default for PremiumCalculator {
    fn default() -> Self {
        Self::new(Arc::new(RatingTables::default()))
    }
}
