//! Test Data Builders
//!
//! Provides builder patterns for constructing test data with sensible defaults.
//! These builders allow tests to specify only the relevant fields while using
//! defaults for everything else.

use chrono::{DateTime, Utc};
use domain_quote::{
    AddOnDefinition, PaymentFrequency, PricingRule, QuickQuoteRequest, QuoteRequest, RuleNumber,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Map, Value};

/// Builder for pricing rules
pub struct PricingRuleBuilder {
    rule: PricingRule,
}

impl Default for PricingRuleBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PricingRuleBuilder {
    /// Creates an open-ended health rule with a 500000 / 2500 bucket
    pub fn new() -> Self {
        Self {
            rule: PricingRule::new("rule-1", "health", dec!(500000), dec!(2500)),
        }
    }

    /// Sets the rule ID
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.rule.id = id.into();
        self
    }

    /// Sets the product type
    pub fn with_product(mut self, product: impl Into<String>) -> Self {
        self.rule.product_type = product.into();
        self
    }

    /// Sets an inclusive age band
    pub fn with_ages(mut self, min: u32, max: u32) -> Self {
        self.rule.min_age = RuleNumber::Value(Decimal::from(min));
        self.rule.max_age = RuleNumber::Value(Decimal::from(max));
        self
    }

    /// Sets the bucket
    pub fn with_bucket(mut self, sum_insured: Decimal, base_premium: Decimal) -> Self {
        self.rule.sum_insured = RuleNumber::Value(sum_insured);
        self.rule.base_premium = RuleNumber::Value(base_premium);
        self
    }

    /// Adds a percent add-on
    pub fn with_percent_add_on(mut self, code: &str, fraction: Decimal) -> Self {
        self.rule.add_ons.push(AddOnDefinition::percent(code, fraction));
        self
    }

    /// Adds an absolute add-on
    pub fn with_absolute_add_on(mut self, code: &str, amount: Decimal) -> Self {
        self.rule.add_ons.push(AddOnDefinition::absolute(code, amount));
        self
    }

    /// Sets the stored start date text
    pub fn effective_from(mut self, raw: impl Into<String>) -> Self {
        self.rule.effective_from = Some(raw.into());
        self
    }

    /// Builds the rule
    pub fn build(self) -> PricingRule {
        self.rule
    }
}

/// Builder for full quote requests
pub struct QuoteRequestBuilder {
    request: QuoteRequest,
}

impl Default for QuoteRequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl QuoteRequestBuilder {
    /// Creates a health request for age 30 and 500000 sum insured
    pub fn new() -> Self {
        Self {
            request: QuoteRequest::new("health", dec!(30), dec!(500000)),
        }
    }

    pub fn with_product(mut self, product: impl Into<String>) -> Self {
        self.request.product_type = product.into();
        self
    }

    pub fn with_age(mut self, age: Decimal) -> Self {
        self.request.age = age;
        self
    }

    pub fn with_sum_insured(mut self, sum_insured: Decimal) -> Self {
        self.request.sum_insured = sum_insured;
        self
    }

    pub fn with_add_ons(mut self, codes: &[&str]) -> Self {
        self.request = self.request.with_add_ons(codes.iter().copied());
        self
    }

    pub fn with_tax_percent(mut self, tax_percent: Decimal) -> Self {
        self.request.tax_percent = Some(tax_percent);
        self
    }

    pub fn with_frequency(mut self, frequency: PaymentFrequency) -> Self {
        self.request.payment_frequency = frequency;
        self
    }

    pub fn with_quote_date(mut self, quote_date: DateTime<Utc>) -> Self {
        self.request.quote_date = Some(quote_date);
        self
    }

    /// Builds the domain request
    pub fn build(self) -> QuoteRequest {
        self.request
    }

    /// Builds the camelCase JSON body the HTTP API accepts
    pub fn build_json(self) -> Value {
        let request = self.request;
        let mut body = Map::new();
        body.insert("productType".into(), json!(request.product_type));
        body.insert("age".into(), json!(request.age.to_string()));
        body.insert("sumInsured".into(), json!(request.sum_insured.to_string()));
        if !request.add_ons_requested.is_empty() {
            body.insert("addOnsRequested".into(), json!(request.add_ons_requested));
        }
        if let Some(tax) = request.tax_percent {
            body.insert("taxPercent".into(), json!(tax.to_string()));
        }
        body.insert("paymentFrequency".into(), json!(request.payment_frequency.label()));
        if let Some(date) = request.quote_date {
            body.insert("quoteDate".into(), json!(date.to_rfc3339()));
        }
        Value::Object(body)
    }
}

/// Builder for quick quote payloads
pub struct QuickQuoteRequestBuilder {
    request: QuickQuoteRequest,
}

impl Default for QuickQuoteRequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl QuickQuoteRequestBuilder {
    /// Creates a health payload for 500000 at age 35
    pub fn new() -> Self {
        Self {
            request: QuickQuoteRequest::new("health", dec!(500000), dec!(35)),
        }
    }

    pub fn with_product(mut self, product: impl Into<String>) -> Self {
        self.request.product = product.into();
        self
    }

    pub fn with_sum_insured(mut self, sum_insured: Decimal) -> Self {
        self.request.sum_insured = sum_insured;
        self
    }

    pub fn with_age(mut self, age: Decimal) -> Self {
        self.request.age = age;
        self
    }

    pub fn with_tenure(mut self, years: Decimal) -> Self {
        self.request.tenure_years = Some(years);
        self
    }

    pub fn smoker(mut self) -> Self {
        self.request.smoker = true;
        self
    }

    pub fn with_frequency(mut self, frequency: PaymentFrequency) -> Self {
        self.request.payment_frequency = frequency;
        self
    }

    pub fn build(self) -> QuickQuoteRequest {
        self.request
    }

    /// Builds the camelCase JSON body the HTTP API accepts
    pub fn build_json(self) -> Value {
        let request = self.request;
        let mut body = Map::new();
        body.insert("product".into(), json!(request.product));
        body.insert("sumInsured".into(), json!(request.sum_insured.to_string()));
        body.insert("age".into(), json!(request.age.to_string()));
        if let Some(tenure) = request.tenure_years {
            body.insert("tenureYears".into(), json!(tenure.to_string()));
        }
        body.insert("smoker".into(), json!(request.smoker));
        body.insert("paymentFrequency".into(), json!(request.payment_frequency.label()));
        Value::Object(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_builder() {
        let rule = PricingRuleBuilder::new()
            .with_id("r-9")
            .with_product("term")
            .with_ages(18, 60)
            .with_percent_add_on("adb", dec!(0.01))
            .build();
        assert_eq!(rule.id, "r-9");
        assert_eq!(rule.max_age.value(), Some(dec!(60)));
        assert_eq!(rule.add_ons.len(), 1);
    }

    #[test]
    fn test_request_json_shape() {
        let body = QuoteRequestBuilder::new()
            .with_add_ons(&["maternity"])
            .with_frequency(PaymentFrequency::Monthly)
            .build_json();
        assert_eq!(body["productType"], "health");
        assert_eq!(body["addOnsRequested"][0], "maternity");
        assert_eq!(body["paymentFrequency"], "monthly");
        assert!(body.get("taxPercent").is_none());
    }
}
