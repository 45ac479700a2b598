//! Quote DTOs
//!
//! Wire shapes are camelCase and lenient about representation: amounts may
//! be JSON numbers or numeric strings, `addOnsRequested` may be a list or a
//! comma-separated string, and `quoteDate` accepts RFC 3339 or a bare date.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use validator::Validate;

use core_kernel::temporal::parse_instant_strict;
use domain_quote::{PaymentFrequency, QuickQuoteRequest, QuoteError, QuoteRequest};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FullQuoteRequest {
    #[validate(length(min = 1, max = 64, message = "must be between 1 and 64 characters"))]
    pub product_type: String,
    pub age: Decimal,
    pub sum_insured: Decimal,
    #[serde(default, deserialize_with = "list_or_csv")]
    #[validate(length(max = 32, message = "at most 32 add-ons may be requested"))]
    pub add_ons_requested: Vec<String>,
    #[serde(default)]
    pub tax_percent: Option<Decimal>,
    #[serde(default)]
    pub payment_frequency: Option<String>,
    #[serde(default)]
    pub quote_date: Option<String>,
}

impl FullQuoteRequest {
    /// Converts the wire request into a domain request
    ///
    /// # Errors
    ///
    /// `QuoteError::InvalidInput` for an unparsable `quoteDate`.
    pub fn into_domain(self) -> Result<QuoteRequest, QuoteError> {
        let quote_date = match self.quote_date.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(parse_instant_strict(raw)?),
            _ => None,
        };

        let mut request = QuoteRequest::new(self.product_type, self.age, self.sum_insured)
            .with_add_ons(self.add_ons_requested.into_iter().filter(|c| !c.trim().is_empty()))
            .with_frequency(frequency(self.payment_frequency.as_deref()));
        request.tax_percent = self.tax_percent;
        request.quote_date = quote_date;
        Ok(request)
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QuickQuotePayload {
    #[validate(length(min = 1, max = 64, message = "must be between 1 and 64 characters"))]
    pub product: String,
    pub sum_insured: Decimal,
    pub age: Decimal,
    #[serde(default)]
    pub tenure_years: Option<Decimal>,
    #[serde(default)]
    pub smoker: Option<bool>,
    #[serde(default)]
    pub payment_frequency: Option<String>,
}

impl QuickQuotePayload {
    pub fn into_domain(self) -> QuickQuoteRequest {
        let mut request = QuickQuoteRequest::new(self.product, self.sum_insured, self.age)
            .with_frequency(frequency(self.payment_frequency.as_deref()));
        request.tenure_years = self.tenure_years;
        request.smoker = self.smoker.unwrap_or(false);
        request
    }
}

fn frequency(label: Option<&str>) -> PaymentFrequency {
    label.map(PaymentFrequency::from_label).unwrap_or_default()
}

fn list_or_csv<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Codes {
        List(Vec<String>),
        Csv(String),
        Missing(()),
    }

    Ok(match Codes::deserialize(deserializer)? {
        Codes::List(codes) => codes.into_iter().map(|c| c.trim().to_string()).collect(),
        Codes::Csv(text) => text
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect(),
        Codes::Missing(()) => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(body: serde_json::Value) -> FullQuoteRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_lenient_full_request() {
        let request = parse(json!({
            "productType": "health",
            "age": "35",
            "sumInsured": 1000000,
            "addOnsRequested": "maternity, opd",
            "paymentFrequency": "Monthly",
            "quoteDate": "2024-06-01"
        }))
        .into_domain()
        .unwrap();

        assert_eq!(request.age, Decimal::new(35, 0));
        assert_eq!(request.add_ons_requested.len(), 2);
        assert!(request.add_ons_requested.contains("opd"));
        assert_eq!(request.payment_frequency, PaymentFrequency::Monthly);
        assert_eq!(request.quote_date.unwrap().to_rfc3339(), "2024-06-01T00:00:00+00:00");
    }

    #[test]
    fn test_null_add_ons_and_blank_date() {
        let request = parse(json!({
            "productType": "health",
            "age": 35,
            "sumInsured": 1000000,
            "addOnsRequested": null,
            "quoteDate": "  "
        }))
        .into_domain()
        .unwrap();

        assert!(request.add_ons_requested.is_empty());
        assert!(request.quote_date.is_none());
        assert_eq!(request.payment_frequency, PaymentFrequency::Annual);
    }

    #[test]
    fn test_bad_quote_date() {
        let err = parse(json!({
            "productType": "health",
            "age": 35,
            "sumInsured": 1000000,
            "quoteDate": "someday"
        }))
        .into_domain()
        .unwrap_err();
        assert!(matches!(err, QuoteError::InvalidInput { field, .. } if field == "quoteDate"));
    }

    #[test]
    fn test_blank_product_fails_validation() {
        let request = parse(json!({ "productType": "", "age": 35, "sumInsured": 1 }));
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_quick_payload() {
        let payload: QuickQuotePayload = serde_json::from_value(json!({
            "product": "term",
            "sumInsured": "2500000",
            "age": 42,
            "tenureYears": 20,
            "smoker": true
        }))
        .unwrap();
        let request = payload.into_domain();
        assert!(request.smoker);
        assert_eq!(request.tenure(), Decimal::new(20, 0));
    }
}
