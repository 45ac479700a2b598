//! Quote values
//!
//! A quote is a self-contained, rounded snapshot: it copies what it needs
//! from the rule and request and never points back at them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use core_kernel::{Clock, Currency, QuoteId};

use crate::premium::PaymentSchedule;
use crate::rule::{AddOnKind, RuleBucket};

/// Message returned when selection finds nothing
pub const NO_MATCHING_RULE: &str = "No pricing rule matches the productType/age/date";

/// Identity and date of a quote being produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteStamp {
    pub quote_id: QuoteId,
    /// Date the quote is evaluated for
    pub quote_date: DateTime<Utc>,
}

impl QuoteStamp {
    pub fn new(quote_id: QuoteId, quote_date: DateTime<Utc>) -> Self {
        Self {
            quote_id,
            quote_date,
        }
    }

    /// Stamps a quote from the clock, honouring a caller-supplied date
    pub fn issue(clock: &dyn Clock, requested_date: Option<DateTime<Utc>>) -> Self {
        let now = clock.now();
        Self {
            quote_id: QuoteId::at(now),
            quote_date: requested_date.unwrap_or(now),
        }
    }
}

/// A priced add-on, kept for audit and display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddOnCharge {
    pub code: String,
    #[serde(rename = "type")]
    pub kind: AddOnKind,
    pub value: Decimal,
    pub amount: Decimal,
}

/// Itemized full quote
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub quote_id: QuoteId,
    pub product_type: String,
    pub applied_rule_id: String,
    pub rule_bucket: RuleBucket,
    pub requested_sum_insured: Decimal,
    pub multiplier: Decimal,
    pub scaled_base_premium: Decimal,
    pub add_ons: Vec<AddOnCharge>,
    pub total_add_ons: Decimal,
    pub sub_total: Decimal,
    pub tax_percent: Decimal,
    pub tax_amount: Decimal,
    pub total_payable: Decimal,
    pub payment_schedule: PaymentSchedule,
    pub currency: Currency,
    pub quote_date: DateTime<Utc>,
}

/// Result of a full quote evaluation
///
/// A selection miss is an ordinary outcome, serialized as the
/// `{"error": "..."}` sentinel callers already check for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuoteOutcome {
    Quoted(Box<Quote>),
    NoMatchingRule,
}

impl QuoteOutcome {
    pub fn quote(&self) -> Option<&Quote> {
        match self {
            QuoteOutcome::Quoted(quote) => Some(quote),
            QuoteOutcome::NoMatchingRule => None,
        }
    }

    pub fn into_quote(self) -> Option<Quote> {
        match self {
            QuoteOutcome::Quoted(quote) => Some(*quote),
            QuoteOutcome::NoMatchingRule => None,
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, QuoteOutcome::Quoted(_))
    }
}

impl From<Quote> for QuoteOutcome {
    fn from(quote: Quote) -> Self {
        QuoteOutcome::Quoted(Box::new(quote))
    }
}

impl Serialize for QuoteOutcome {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            QuoteOutcome::Quoted(quote) => quote.serialize(serializer),
            QuoteOutcome::NoMatchingRule => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("error", NO_MATCHING_RULE)?;
                map.end()
            }
        }
    }
}
