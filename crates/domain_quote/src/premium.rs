//! Payment frequencies, modal factors and the tax/total settlement
//!
//! Both calculators finish the same way: tax is added to the subtotal and the
//! annual total is converted into a per-installment amount with a modal
//! factor. That shared tail lives here.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use core_kernel::{checked_product, checked_sum, round2, MoneyError, Rate};

/// Premium payment frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum PaymentFrequency {
    /// One payment per year
    #[default]
    Annual,
    /// Four payments per year
    Quarterly,
    /// Twelve payments per year
    Monthly,
}

impl PaymentFrequency {
    /// Reads a frequency label; anything unrecognized is treated as annual
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "monthly" => PaymentFrequency::Monthly,
            "quarterly" => PaymentFrequency::Quarterly,
            "annual" => PaymentFrequency::Annual,
            other => {
                if !other.is_empty() {
                    tracing::debug!(frequency = other, "unrecognized payment frequency, using annual");
                }
                PaymentFrequency::Annual
            }
        }
    }

    /// Returns the number of installments per year
    pub fn installments(&self) -> u32 {
        match self {
            PaymentFrequency::Annual => 1,
            PaymentFrequency::Quarterly => 4,
            PaymentFrequency::Monthly => 12,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PaymentFrequency::Annual => "annual",
            PaymentFrequency::Quarterly => "quarterly",
            PaymentFrequency::Monthly => "monthly",
        }
    }
}

impl From<String> for PaymentFrequency {
    fn from(label: String) -> Self {
        PaymentFrequency::from_label(&label)
    }
}

impl From<&str> for PaymentFrequency {
    fn from(label: &str) -> Self {
        PaymentFrequency::from_label(label)
    }
}

/// Fractions of the annual total charged per installment
///
/// These are business-chosen constants, not `1/n`: four quarterly
/// installments at 0.26 cost 104% of the annual total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModalFactors {
    pub annual: Decimal,
    pub quarterly: Decimal,
    pub monthly: Decimal,
}

impl Default for ModalFactors {
    fn default() -> Self {
        Self {
            annual: dec!(1.0),
            quarterly: dec!(0.26),
            monthly: dec!(0.09),
        }
    }
}

impl ModalFactors {
    /// Returns the modal factor for this frequency
    pub fn factor(&self, frequency: PaymentFrequency) -> Decimal {
        match frequency {
            PaymentFrequency::Annual => self.annual,
            PaymentFrequency::Quarterly => self.quarterly,
            PaymentFrequency::Monthly => self.monthly,
        }
    }

    /// Builds the payment schedule for an annual total
    ///
    /// # Errors
    ///
    /// `MoneyError::Overflow` when the installment does not fit a `Decimal`.
    pub fn schedule(
        &self,
        frequency: PaymentFrequency,
        total_payable: Decimal,
    ) -> Result<PaymentSchedule, MoneyError> {
        let installment = checked_product(total_payable, self.factor(frequency))?;
        Ok(PaymentSchedule {
            frequency,
            installments: frequency.installments(),
            installment_amount: round2(installment),
        })
    }
}

/// How the total payable is collected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSchedule {
    pub frequency: PaymentFrequency,
    pub installments: u32,
    pub installment_amount: Decimal,
}

/// Tax, total and schedule derived from an unrounded subtotal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    pub tax_amount: Decimal,
    pub total_payable: Decimal,
    pub schedule: PaymentSchedule,
}

/// Adds tax to a subtotal and converts the total into installments
///
/// Amounts stay unrounded except for the installment, which is rounded from
/// the unrounded total.
///
/// # Errors
///
/// `MoneyError::Overflow` when the tax, total or installment does not fit a
/// `Decimal`.
pub fn settle(
    sub_total: Decimal,
    tax_percent: Decimal,
    frequency: PaymentFrequency,
    factors: &ModalFactors,
) -> Result<Settlement, MoneyError> {
    let tax_amount = Rate::from_percentage(tax_percent).apply(sub_total)?;
    let total_payable = checked_sum([sub_total, tax_amount])?;

    Ok(Settlement {
        tax_amount,
        total_payable,
        schedule: factors.schedule(frequency, total_payable)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_installments() {
        assert_eq!(PaymentFrequency::Annual.installments(), 1);
        assert_eq!(PaymentFrequency::Quarterly.installments(), 4);
        assert_eq!(PaymentFrequency::Monthly.installments(), 12);
    }

    #[test]
    fn test_literal_modal_factors() {
        let factors = ModalFactors::default();
        assert_eq!(factors.factor(PaymentFrequency::Annual), dec!(1.0));
        assert_eq!(factors.factor(PaymentFrequency::Quarterly), dec!(0.26));
        assert_eq!(factors.factor(PaymentFrequency::Monthly), dec!(0.09));
    }

    #[test]
    fn test_unknown_label_is_annual() {
        assert_eq!(PaymentFrequency::from_label("weekly"), PaymentFrequency::Annual);
        assert_eq!(PaymentFrequency::from_label(" Monthly "), PaymentFrequency::Monthly);
        let parsed: PaymentFrequency = serde_json::from_str("\"fortnightly\"").unwrap();
        assert_eq!(parsed, PaymentFrequency::Annual);
    }

    #[test]
    fn test_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&PaymentFrequency::Quarterly).unwrap(), "\"quarterly\"");
    }

    #[test]
    fn test_settle_monthly() {
        let settlement =
            settle(dec!(1000), dec!(18), PaymentFrequency::Monthly, &ModalFactors::default()).unwrap();
        assert_eq!(settlement.tax_amount, dec!(180));
        assert_eq!(settlement.total_payable, dec!(1180));
        assert_eq!(settlement.schedule.installments, 12);
        assert_eq!(settlement.schedule.installment_amount, dec!(106.20));
    }

    #[test]
    fn test_settle_reports_overflow() {
        let factors = ModalFactors::default();
        let huge = Decimal::MAX - dec!(1);
        assert_eq!(
            settle(huge, dec!(18), PaymentFrequency::Annual, &factors),
            Err(MoneyError::Overflow)
        );
    }
}
