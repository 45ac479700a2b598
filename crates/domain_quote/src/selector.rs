//! Rule selection
//!
//! Selection is a linear, first-match-wins scan in catalog order. There is no
//! "best match" tie-break: when bands overlap, whichever rule comes first in
//! the catalog wins, so catalogs must list specific bands before broad ones.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fmt;

use crate::rule::{normalize_product, Effectivity, PricingRule, RuleNumber};

/// Why a rule was passed over
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    ProductMismatch { rule_product: String },
    MalformedAgeBound { bound: &'static str, raw: String },
    AgeOutOfBand { min: Option<Decimal>, max: Option<Decimal> },
    NotYetEffective { effective_from: DateTime<Utc> },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::ProductMismatch { rule_product } => {
                write!(f, "product {:?} does not match", rule_product)
            }
            SkipReason::MalformedAgeBound { bound, raw } => {
                write!(f, "{} {:?} is not a number", bound, raw)
            }
            SkipReason::AgeOutOfBand { min, max } => {
                let lo = min.map_or("-inf".to_string(), |m| m.to_string());
                let hi = max.map_or("+inf".to_string(), |m| m.to_string());
                write!(f, "age outside [{}, {}]", lo, hi)
            }
            SkipReason::NotYetEffective { effective_from } => {
                write!(f, "not effective until {}", effective_from.to_rfc3339())
            }
        }
    }
}

fn bound(value: &RuleNumber, name: &'static str) -> Result<Option<Decimal>, SkipReason> {
    match value {
        RuleNumber::Unset => Ok(None),
        RuleNumber::Value(v) => Ok(Some(*v)),
        RuleNumber::Malformed(raw) => Err(SkipReason::MalformedAgeBound {
            bound: name,
            raw: raw.clone(),
        }),
    }
}

/// Checks one rule against the normalized product, age and date
///
/// `wanted_product` must already be normalized with
/// [`normalize_product`].
pub fn check_rule(
    rule: &PricingRule,
    wanted_product: &str,
    age: Decimal,
    as_of: DateTime<Utc>,
) -> Result<(), SkipReason> {
    let rule_product = rule.normalized_product();
    if rule_product != wanted_product {
        return Err(SkipReason::ProductMismatch { rule_product });
    }

    let min = bound(&rule.min_age, "minAge")?;
    let max = bound(&rule.max_age, "maxAge")?;
    let above_min = min.map_or(true, |m| age >= m);
    let below_max = max.map_or(true, |m| age <= m);
    if !(above_min && below_max) {
        return Err(SkipReason::AgeOutOfBand { min, max });
    }

    match rule.effectivity() {
        Effectivity::From(start) if start > as_of => {
            return Err(SkipReason::NotYetEffective {
                effective_from: start,
            })
        }
        Effectivity::Unparsable(raw) => {
            tracing::debug!(rule_id = %rule.id, effective_from = %raw, "unparsable effectiveFrom, treating as effective");
        }
        _ => {}
    }

    Ok(())
}

/// Picks the first applicable rule, or `None`
///
/// # Arguments
///
/// * `rules` - The catalog, in administrator-defined order
/// * `product_type` - Requested product; compared trimmed and case-insensitively
/// * `age` - Applicant age; bounds are inclusive on both ends
/// * `as_of` - Quote date; rules starting strictly after it are skipped
pub fn select_rule<'a>(
    rules: &'a [PricingRule],
    product_type: &str,
    age: Decimal,
    as_of: DateTime<Utc>,
) -> Option<&'a PricingRule> {
    let wanted = normalize_product(product_type);

    for (index, rule) in rules.iter().enumerate() {
        match check_rule(rule, &wanted, age, as_of) {
            Ok(()) => {
                tracing::debug!(index, rule_id = %rule.id, "matched pricing rule");
                return Some(rule);
            }
            Err(reason) => {
                tracing::trace!(index, rule_id = %rule.id, %reason, "skipping pricing rule");
            }
        }
    }

    tracing::debug!(product = %wanted, %age, "no pricing rule matched");
    None
}
