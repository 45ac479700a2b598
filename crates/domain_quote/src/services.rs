//! Quote service
//!
//! Wires selection, calculation and the clock together. The service holds no
//! catalog; callers pass the snapshot they want evaluated.

use std::sync::Arc;

use core_kernel::{Currency, SharedClock, SystemClock};

use crate::calculator::PremiumCalculator;
use crate::catalog::RuleCatalog;
use crate::error::QuoteError;
use crate::quick_quote::{QuickQuote, QuickQuoteCalculator, QuickQuoteRequest};
use crate::quote::{QuoteOutcome, QuoteStamp};
use crate::request::QuoteRequest;
use crate::tables::RatingTables;

/// Entry point for full and quick quotes
#[derive(Clone)]
pub struct QuoteService {
    calculator: PremiumCalculator,
    quick: QuickQuoteCalculator,
    clock: SharedClock,
}

impl QuoteService {
    pub fn new(tables: Arc<RatingTables>, clock: SharedClock) -> Self {
        Self {
            calculator: PremiumCalculator::new(tables.clone()),
            quick: QuickQuoteCalculator::new(tables),
            clock,
        }
    }

    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.calculator = self.calculator.with_currency(currency);
        self.quick = self.quick.with_currency(currency);
        self
    }

    pub fn tables(&self) -> &RatingTables {
        self.calculator.tables()
    }

    /// Selects a rule from the snapshot and prices it
    ///
    /// The request is validated before selection, so bad input is reported
    /// as such rather than as a selection miss.
    ///
    /// # Errors
    ///
    /// `QuoteError::InvalidInput` for a bad request, `QuoteError::MalformedRule`
    /// when the selected rule cannot price. A miss is `Ok(NoMatchingRule)`.
    pub fn full_quote(
        &self,
        catalog: &RuleCatalog,
        request: &QuoteRequest,
    ) -> Result<QuoteOutcome, QuoteError> {
        request.validate()?;
        let stamp = QuoteStamp::issue(self.clock.as_ref(), request.quote_date);

        let Some(rule) = catalog.select(&request.product_type, request.age, stamp.quote_date) else {
            tracing::info!(
                product = %request.product_type,
                age = %request.age,
                catalog_id = %catalog.id(),
                "no pricing rule matches"
            );
            return Ok(QuoteOutcome::NoMatchingRule);
        };

        let quote = self.calculator.compute_quote(rule, request, stamp)?;
        tracing::info!(quote_id = %quote.quote_id, rule_id = %quote.applied_rule_id, "issued full quote");
        Ok(quote.into())
    }

    /// Prices a quick quote
    ///
    /// # Errors
    ///
    /// `QuoteError::InvalidInput` when the payload fails validation.
    pub fn quick_quote(&self, request: &QuickQuoteRequest) -> Result<QuickQuote, QuoteError> {
        let stamp = QuoteStamp::issue(self.clock.as_ref(), None);
        let quote = self.quick.quick_quote(request, stamp)?;
        tracing::info!(quote_id = %quote.quote_id, product = %quote.product, "issued quick quote");
        Ok(quote)
    }
}

impl Default for QuoteService {
    fn default() -> Self {
        Self::new(Arc::new(RatingTables::default()), Arc::new(SystemClock))
    }
}

impl std::fmt::Debug for QuoteService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuoteService")
            .field("calculator", &self.calculator)
            .field("quick", &self.quick)
            .finish_non_exhaustive()
    }
}
