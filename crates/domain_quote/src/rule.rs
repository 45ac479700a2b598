//! Pricing rule records
//!
//! Rules arrive from a document store that was populated by hand and by bulk
//! uploads over several years, so the record types here are deliberately
//! forgiving on the way in: numbers may be numeric strings, bounds may be
//! blank, add-ons may be an array, a single object, a JSON string, or the
//! compact `code:type:value` list. Whether a field is *usable* is decided
//! later, by the selector and the calculator, never by deserialization.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use core_kernel::{checked_product, parse_instant, MoneyError};

use crate::error::QuoteError;

/// A numeric rule field as it was stored
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RuleNumber {
    /// Absent, null or blank
    #[default]
    Unset,
    /// A usable number
    Value(Decimal),
    /// Present but not a number
    Malformed(String),
}

impl RuleNumber {
    /// Interprets a stored JSON value
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => RuleNumber::Unset,
            Value::Number(n) => {
                let text = n.to_string();
                parse_decimal(&text)
                    .map(RuleNumber::Value)
                    .unwrap_or(RuleNumber::Malformed(text))
            }
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    RuleNumber::Unset
                } else {
                    parse_decimal(trimmed)
                        .map(RuleNumber::Value)
                        .unwrap_or_else(|| RuleNumber::Malformed(s.clone()))
                }
            }
            other => RuleNumber::Malformed(other.to_string()),
        }
    }

    /// Returns the number when usable
    pub fn value(&self) -> Option<Decimal> {
        match self {
            RuleNumber::Value(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, RuleNumber::Unset)
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, RuleNumber::Malformed(_))
    }
}

impl From<Decimal> for RuleNumber {
    fn from(value: Decimal) -> Self {
        RuleNumber::Value(value)
    }
}

impl From<Option<Decimal>> for RuleNumber {
    fn from(value: Option<Decimal>) -> Self {
        value.map(RuleNumber::Value).unwrap_or_default()
    }
}

impl fmt::Display for RuleNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleNumber::Unset => write!(f, "unset"),
            RuleNumber::Value(v) => write!(f, "{}", v),
            RuleNumber::Malformed(raw) => write!(f, "{:?}", raw),
        }
    }
}

impl Serialize for RuleNumber {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            RuleNumber::Unset => serializer.serialize_none(),
            RuleNumber::Value(v) => Serialize::serialize(v, serializer),
            RuleNumber::Malformed(raw) => serializer.serialize_str(raw),
        }
    }
}

impl<'de> Deserialize<'de> for RuleNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(RuleNumber::from_json(&value))
    }
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

/// How an add-on is priced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddOnKind {
    /// `value` is a fraction of the scaled base premium
    Percent,
    /// `value` is a fixed amount
    Absolute,
}

impl AddOnKind {
    /// Reads a stored type label
    ///
    /// A blank label means `percent`; any label other than `percent` prices
    /// as a fixed amount.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "" | "percent" | "percentage" => AddOnKind::Percent,
            _ => AddOnKind::Absolute,
        }
    }
}

/// An optional premium rider defined on a rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddOnDefinition {
    pub code: String,
    #[serde(rename = "type")]
    pub kind: AddOnKind,
    pub value: Decimal,
}

impl AddOnDefinition {
    pub fn new(code: impl Into<String>, kind: AddOnKind, value: Decimal) -> Self {
        Self {
            code: code.into(),
            kind,
            value,
        }
    }

    pub fn percent(code: impl Into<String>, fraction: Decimal) -> Self {
        Self::new(code, AddOnKind::Percent, fraction)
    }

    pub fn absolute(code: impl Into<String>, amount: Decimal) -> Self {
        Self::new(code, AddOnKind::Absolute, amount)
    }

    /// Prices this add-on against a scaled base premium, unrounded
    ///
    /// # Errors
    ///
    /// `MoneyError::Overflow` when a percent add-on does not fit a `Decimal`.
    pub fn price(&self, scaled_base_premium: Decimal) -> Result<Decimal, MoneyError> {
        match self.kind {
            AddOnKind::Percent => checked_product(scaled_base_premium, self.value),
            AddOnKind::Absolute => Ok(self.value),
        }
    }
}

/// Normalizes a stored `addOns` field into definitions, in stored order
///
/// Accepts an array of objects, a single object, a JSON string holding
/// either, or a compact list such as `"maternity:percent:0.02,opd:absolute:500"`
/// where the type defaults to `percent` and the value to `0`. Entries without
/// a code or with a non-numeric value are dropped.
pub fn parse_add_ons(raw: &Value) -> Vec<AddOnDefinition> {
    match raw {
        Value::Array(items) => items.iter().filter_map(add_on_from_json).collect(),
        Value::Object(_) => add_on_from_json(raw).into_iter().collect(),
        Value::String(text) => parse_add_ons_text(text),
        _ => Vec::new(),
    }
}

fn parse_add_ons_text(text: &str) -> Vec<AddOnDefinition> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    if let Ok(parsed) = serde_json::from_str::<Value>(trimmed) {
        if parsed.is_array() || parsed.is_object() {
            return parse_add_ons(&parsed);
        }
    }

    trimmed
        .split(',')
        .filter_map(|entry| {
            let mut parts = entry.split(':').map(str::trim);
            let code = parts.next().filter(|c| !c.is_empty())?;
            let kind = AddOnKind::from_label(parts.next().unwrap_or(""));
            let value = match parts.next() {
                None | Some("") => Decimal::ZERO,
                Some(v) => match parse_decimal(v) {
                    Some(d) => d,
                    None => {
                        tracing::warn!(code, value = v, "dropping add-on with non-numeric value");
                        return None;
                    }
                },
            };
            Some(AddOnDefinition::new(code, kind, value))
        })
        .collect()
}

fn add_on_from_json(item: &Value) -> Option<AddOnDefinition> {
    let object = item.as_object()?;

    let code = match object.get("code") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => {
            tracing::warn!(add_on = %item, "dropping add-on without a code");
            return None;
        }
    };

    let kind = object
        .get("type")
        .and_then(Value::as_str)
        .map(AddOnKind::from_label)
        .unwrap_or(AddOnKind::Percent);

    let value = match object.get("value").map(RuleNumber::from_json).unwrap_or_default() {
        RuleNumber::Unset => Decimal::ZERO,
        RuleNumber::Value(v) => v,
        RuleNumber::Malformed(raw) => {
            tracing::warn!(code = %code, value = %raw, "dropping add-on with non-numeric value");
            return None;
        }
    };

    Some(AddOnDefinition::new(code, kind, value))
}

fn deserialize_add_ons<'de, D>(deserializer: D) -> Result<Vec<AddOnDefinition>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(parse_add_ons(&raw))
}

fn deserialize_rule_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(match raw {
        Value::String(s) => s,
        Value::Object(map) => match map.get("$oid") {
            Some(Value::String(oid)) => oid.clone(),
            _ => Value::Object(map).to_string(),
        },
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn deserialize_rule_date<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(rule_date_text(&raw))
}

fn rule_date_text(raw: &Value) -> Option<String> {
    match raw {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(
            n.as_i64()
                .and_then(DateTime::<Utc>::from_timestamp_millis)
                .map(|dt| dt.to_rfc3339())
                .unwrap_or_else(|| n.to_string()),
        ),
        Value::Object(map) => match map.get("$date") {
            Some(inner) => rule_date_text(inner),
            None => Some(raw.to_string()),
        },
        other => Some(other.to_string()),
    }
}

/// When a rule starts to apply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effectivity {
    /// No start date recorded
    Always,
    /// A start date that could not be read; treated as already effective
    Unparsable(String),
    /// Effective from this instant on
    From(DateTime<Utc>),
}

impl Effectivity {
    /// Returns true if the rule applies at `as_of`
    pub fn is_effective_at(&self, as_of: DateTime<Utc>) -> bool {
        match self {
            Effectivity::From(start) => *start <= as_of,
            Effectivity::Always | Effectivity::Unparsable(_) => true,
        }
    }
}

/// The reference sum-insured / base-premium pair premiums scale from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleBucket {
    pub sum_insured: Decimal,
    pub base_premium: Decimal,
}

/// A versioned, time-bounded premium schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingRule {
    #[serde(alias = "_id", default, deserialize_with = "deserialize_rule_id")]
    pub id: String,
    #[serde(default)]
    pub product_type: String,
    #[serde(default)]
    pub min_age: RuleNumber,
    #[serde(default)]
    pub max_age: RuleNumber,
    /// Bucket size
    #[serde(default)]
    pub sum_insured: RuleNumber,
    /// Bucket price
    #[serde(default)]
    pub base_premium: RuleNumber,
    #[serde(default, deserialize_with = "deserialize_add_ons")]
    pub add_ons: Vec<AddOnDefinition>,
    #[serde(
        default,
        deserialize_with = "deserialize_rule_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub effective_from: Option<String>,
}

impl PricingRule {
    /// Creates an unbounded rule for a product with the given bucket
    pub fn new(
        id: impl Into<String>,
        product_type: impl Into<String>,
        sum_insured: Decimal,
        base_premium: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            product_type: product_type.into(),
            min_age: RuleNumber::Unset,
            max_age: RuleNumber::Unset,
            sum_insured: RuleNumber::Value(sum_insured),
            base_premium: RuleNumber::Value(base_premium),
            add_ons: Vec::new(),
            effective_from: None,
        }
    }

    /// Sets the inclusive age band; `None` leaves that side open
    pub fn with_age_band(mut self, min: Option<Decimal>, max: Option<Decimal>) -> Self {
        self.min_age = min.into();
        self.max_age = max.into();
        self
    }

    pub fn with_add_on(mut self, add_on: AddOnDefinition) -> Self {
        self.add_ons.push(add_on);
        self
    }

    pub fn with_effective_from(mut self, raw: impl Into<String>) -> Self {
        self.effective_from = Some(raw.into());
        self
    }

    /// Product type trimmed and lower-cased for matching
    pub fn normalized_product(&self) -> String {
        normalize_product(&self.product_type)
    }

    /// Reads the start date
    pub fn effectivity(&self) -> Effectivity {
        match self.effective_from.as_deref() {
            None => Effectivity::Always,
            Some(raw) => match parse_instant(raw) {
                Some(start) => Effectivity::From(start),
                None => Effectivity::Unparsable(raw.to_string()),
            },
        }
    }

    /// Returns the scaling anchor, or why this rule cannot price
    ///
    /// # Errors
    ///
    /// `QuoteError::MalformedRule` when the bucket size is missing, non-numeric,
    /// zero or negative, or the bucket price is missing, non-numeric or negative.
    pub fn bucket(&self) -> Result<RuleBucket, QuoteError> {
        let sum_insured = match &self.sum_insured {
            RuleNumber::Value(v) if v.is_sign_positive() && !v.is_zero() => *v,
            RuleNumber::Value(v) if v.is_zero() => {
                return Err(QuoteError::malformed_rule(&self.id, "bucket sum insured is zero"))
            }
            RuleNumber::Value(v) => {
                return Err(QuoteError::malformed_rule(
                    &self.id,
                    format!("bucket sum insured {} is negative", v),
                ))
            }
            RuleNumber::Unset => {
                return Err(QuoteError::malformed_rule(&self.id, "bucket sum insured is missing"))
            }
            RuleNumber::Malformed(raw) => {
                return Err(QuoteError::malformed_rule(
                    &self.id,
                    format!("bucket sum insured {:?} is not a number", raw),
                ))
            }
        };

        let base_premium = match &self.base_premium {
            RuleNumber::Value(v) if !v.is_sign_negative() || v.is_zero() => *v,
            RuleNumber::Value(v) => {
                return Err(QuoteError::malformed_rule(
                    &self.id,
                    format!("base premium {} is negative", v),
                ))
            }
            RuleNumber::Unset => {
                return Err(QuoteError::malformed_rule(&self.id, "base premium is missing"))
            }
            RuleNumber::Malformed(raw) => {
                return Err(QuoteError::malformed_rule(
                    &self.id,
                    format!("base premium {:?} is not a number", raw),
                ))
            }
        };

        Ok(RuleBucket {
            sum_insured,
            base_premium,
        })
    }
}

/// Trims and lower-cases a product type for comparison
pub fn normalize_product(product_type: &str) -> String {
    product_type.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_rule_number_forms() {
        assert_eq!(RuleNumber::from_json(&json!(18)), RuleNumber::Value(dec!(18)));
        assert_eq!(RuleNumber::from_json(&json!(" 65 ")), RuleNumber::Value(dec!(65)));
        assert_eq!(RuleNumber::from_json(&json!("")), RuleNumber::Unset);
        assert_eq!(RuleNumber::from_json(&json!(null)), RuleNumber::Unset);
        assert_eq!(
            RuleNumber::from_json(&json!("eighteen")),
            RuleNumber::Malformed("eighteen".to_string())
        );
        assert!(RuleNumber::from_json(&json!(true)).is_malformed());
    }

    #[test]
    fn test_deserialize_stored_rule() {
        let rule: PricingRule = serde_json::from_value(json!({
            "_id": "r-health-1",
            "productType": " Health ",
            "minAge": "18",
            "maxAge": 65,
            "sumInsured": "500000",
            "basePremium": 2500,
            "addOns": [
                { "code": "maternity", "type": "percent", "value": 0.02 },
                { "code": "hospitalcash", "type": "absolute", "value": "200" }
            ],
            "effectiveFrom": "2024-01-01"
        }))
        .unwrap();

        assert_eq!(rule.id, "r-health-1");
        assert_eq!(rule.normalized_product(), "health");
        assert_eq!(rule.min_age.value(), Some(dec!(18)));
        assert_eq!(rule.add_ons.len(), 2);
        assert_eq!(rule.add_ons[1].value, dec!(200));
        assert!(matches!(rule.effectivity(), Effectivity::From(_)));
    }

    #[test]
    fn test_deserialize_extended_json_ids_and_dates() {
        let rule: PricingRule = serde_json::from_value(json!({
            "_id": { "$oid": "65f0c0ffee" },
            "productType": "term",
            "effectiveFrom": { "$date": "2024-02-01T00:00:00Z" }
        }))
        .unwrap();

        assert_eq!(rule.id, "65f0c0ffee");
        assert_eq!(rule.effective_from.as_deref(), Some("2024-02-01T00:00:00Z"));
        assert!(rule.sum_insured.is_unset());
    }

    #[test]
    fn test_parse_add_ons_single_object() {
        let parsed = parse_add_ons(&json!({ "code": "opd", "value": 0.05 }));
        assert_eq!(parsed, vec![AddOnDefinition::percent("opd", dec!(0.05))]);
    }

    #[test]
    fn test_parse_add_ons_json_string() {
        let parsed = parse_add_ons(&json!("[{\"code\":\"opd\",\"type\":\"absolute\",\"value\":500}]"));
        assert_eq!(parsed, vec![AddOnDefinition::absolute("opd", dec!(500))]);
    }

    #[test]
    fn test_parse_add_ons_compact_list() {
        let parsed = parse_add_ons(&json!("maternity:percent:0.02, hospitalcash:absolute:200, opd"));
        assert_eq!(
            parsed,
            vec![
                AddOnDefinition::percent("maternity", dec!(0.02)),
                AddOnDefinition::absolute("hospitalcash", dec!(200)),
                AddOnDefinition::percent("opd", Decimal::ZERO),
            ]
        );
    }

    #[test]
    fn test_parse_add_ons_drops_unusable_entries() {
        let parsed = parse_add_ons(&json!([
            { "type": "percent", "value": 0.1 },
            { "code": "ok", "value": "abc" },
            "not-an-object",
            { "code": "kept" }
        ]));
        assert_eq!(parsed, vec![AddOnDefinition::percent("kept", Decimal::ZERO)]);
        assert!(parse_add_ons(&json!(42)).is_empty());
        assert!(parse_add_ons(&json!("")).is_empty());
    }

    #[test]
    fn test_bucket_validation() {
        let rule = PricingRule::new("r1", "health", dec!(500000), dec!(2500));
        assert_eq!(
            rule.bucket().unwrap(),
            RuleBucket { sum_insured: dec!(500000), base_premium: dec!(2500) }
        );

        let zero = PricingRule::new("r2", "health", Decimal::ZERO, dec!(2500));
        assert!(matches!(zero.bucket(), Err(QuoteError::MalformedRule { .. })));

        let mut missing = PricingRule::new("r3", "health", dec!(1), dec!(1));
        missing.sum_insured = RuleNumber::Unset;
        assert!(matches!(missing.bucket(), Err(QuoteError::MalformedRule { .. })));
    }

    #[test]
    fn test_rule_numbers_serialize_as_stored() {
        let rule = PricingRule::new("r1", "health", dec!(500000), dec!(2500))
            .with_age_band(Some(dec!(18)), None);
        let json = serde_json::to_value(&rule).unwrap();

        assert_eq!(json["minAge"], json!(18.0));
        assert_eq!(json["maxAge"], Value::Null);
        assert_eq!(json["sumInsured"], json!(500000.0));

        let mut malformed = rule;
        malformed.base_premium = RuleNumber::Malformed("n/a".to_string());
        assert_eq!(serde_json::to_value(&malformed).unwrap()["basePremium"], json!("n/a"));
    }

    #[test]
    fn test_add_on_price_overflow() {
        let add_on = AddOnDefinition::percent("opd", dec!(10));
        assert_eq!(add_on.price(dec!(2500)), Ok(dec!(25000)));
        assert_eq!(add_on.price(Decimal::MAX), Err(MoneyError::Overflow));
        assert_eq!(AddOnDefinition::absolute("cash", dec!(200)).price(Decimal::MAX), Ok(dec!(200)));
    }

    #[test]
    fn test_unparsable_effective_from_is_effective() {
        let rule = PricingRule::new("r1", "health", dec!(1), dec!(1)).with_effective_from("someday");
        let effectivity = rule.effectivity();
        assert_eq!(effectivity, Effectivity::Unparsable("someday".to_string()));
        assert!(effectivity.is_effective_at(Utc::now()));
    }
}
