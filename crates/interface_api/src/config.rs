//! API configuration

use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;

use core_kernel::Currency;
use domain_quote::{QuoteError, RatingTables};

/// API configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Log level
    pub log_level: String,
    /// JSON file holding the stored pricing rules, in selection order
    pub rules_path: Option<String>,
    /// JSON file with rating table overrides
    pub tables_path: Option<String>,
    /// ISO 4217 code stamped on quotes
    pub currency: String,
    /// Tax applied when a full quote request names none
    pub default_tax_percent: Option<Decimal>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            rules_path: None,
            tables_path: None,
            currency: "INR".to_string(),
            default_tax_percent: None,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from `API_*` environment variables
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("API"))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Parses the configured currency
    pub fn currency(&self) -> Result<Currency, QuoteError> {
        Currency::from_str(&self.currency).map_err(|e| QuoteError::configuration(e.to_string()))
    }

    /// Builds the rating tables: defaults, then the overrides file, then
    /// the configured default tax
    ///
    /// # Errors
    ///
    /// `QuoteError::Configuration` if the overrides file cannot be read or
    /// parsed, or the resulting tables fail validation.
    pub fn rating_tables(&self) -> Result<RatingTables, QuoteError> {
        let mut tables = match &self.tables_path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|e| {
                    QuoteError::configuration(format!("reading rating tables {}: {}", path, e))
                })?;
                serde_json::from_str::<RatingTables>(&raw).map_err(|e| {
                    QuoteError::configuration(format!("parsing rating tables {}: {}", path, e))
                })?
            }
            None => RatingTables::default(),
        };

        if let Some(tax) = self.default_tax_percent {
            tables.default_tax_percent = tax;
        }

        tables.validate()?;
        Ok(tables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.server_addr(), "0.0.0.0:8080");
        assert_eq!(config.currency().unwrap(), Currency::INR);
        assert_eq!(config.rating_tables().unwrap(), RatingTables::default());
    }

    #[test]
    fn test_default_tax_override() {
        let config = ApiConfig {
            default_tax_percent: Some(Decimal::new(5, 0)),
            ..ApiConfig::default()
        };
        assert_eq!(config.rating_tables().unwrap().default_tax_percent, Decimal::new(5, 0));
    }

    #[test]
    fn test_unknown_currency() {
        let config = ApiConfig {
            currency: "XYZ".to_string(),
            ..ApiConfig::default()
        };
        assert!(matches!(config.currency(), Err(QuoteError::Configuration(_))));
    }

    #[test]
    fn test_missing_tables_file() {
        let config = ApiConfig {
            tables_path: Some("/nonexistent/tables.json".to_string()),
            ..ApiConfig::default()
        };
        assert!(config.rating_tables().is_err());
    }
}
