//! Quoting domain errors
//!
//! A selection miss is not an error: it is reported as
//! [`QuoteOutcome::NoMatchingRule`](crate::quote::QuoteOutcome). Everything
//! here is a local, recoverable failure of a single evaluation.

use core_kernel::{MoneyError, PortError, TemporalError};
use thiserror::Error;

/// Errors that can occur in the quoting domain
#[derive(Debug, Error)]
pub enum QuoteError {
    /// A caller-supplied field failed validation
    #[error("Invalid input for {field}: {reason}")]
    InvalidInput {
        field: String,
        reason: String,
    },

    /// A pricing rule cannot be used for calculation
    #[error("Malformed pricing rule {rule_id}: {reason}")]
    MalformedRule {
        rule_id: String,
        reason: String,
    },

    /// Arithmetic failure while pricing
    #[error("Calculation error: {0}")]
    Money(#[from] MoneyError),

    /// Rating tables are inconsistent
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The rule catalog could not be loaded
    #[error("Rule source error: {0}")]
    Source(#[from] PortError),
}

impl QuoteError {
    /// Creates an input validation error
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        QuoteError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates a malformed rule error
    pub fn malformed_rule(rule_id: impl Into<String>, reason: impl Into<String>) -> Self {
        QuoteError::MalformedRule {
            rule_id: rule_id.into(),
            reason: reason.into(),
        }
    }

    /// Creates a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        QuoteError::Configuration(message.into())
    }

    /// Returns true when the caller, not the catalog, is at fault
    pub fn is_caller_error(&self) -> bool {
        matches!(self, QuoteError::InvalidInput { .. })
    }
}

impl From<TemporalError> for QuoteError {
    fn from(err: TemporalError) -> Self {
        QuoteError::invalid_input("quoteDate", err.to_string())
    }
}
