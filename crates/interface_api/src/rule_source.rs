//! JSON file pricing rule source
//!
//! Reads the stored rule documents from a JSON file: either a bare array or
//! an object with a `rules` array. Array order is selection order.

use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};

use core_kernel::{DomainPort, HealthCheckResult, HealthCheckable, PortError};
use domain_quote::{PricingRule, PricingRuleSource};

const ADAPTER_ID: &str = "json-file-rules";

/// Pricing rules read from a JSON file on every load
#[derive(Debug, Clone)]
pub struct JsonFileRuleSource {
    path: PathBuf,
}

impl JsonFileRuleSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Parses a stored rule listing
///
/// # Errors
///
/// `PortError::Transformation` when the text is not JSON, is not a listing,
/// or an entry cannot be read as a rule.
pub fn parse_rule_listing(text: &str) -> Result<Vec<PricingRule>, PortError> {
    let document: Value = serde_json::from_str(text)
        .map_err(|e| PortError::transformation(format!("rules file is not JSON: {}", e)))?;

    let entries = match document {
        Value::Array(entries) => entries,
        Value::Object(mut object) => match object.remove("rules") {
            Some(Value::Array(entries)) => entries,
            _ => return Err(PortError::transformation("expected a `rules` array")),
        },
        _ => return Err(PortError::transformation("expected an array of rules")),
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(position, entry)| {
            serde_json::from_value::<PricingRule>(entry).map_err(|e| {
                PortError::transformation(format!("rule at position {}: {}", position, e))
            })
        })
        .collect()
}

impl DomainPort for JsonFileRuleSource {}

#[async_trait]
impl HealthCheckable for JsonFileRuleSource {
    async fn health_check(&self) -> HealthCheckResult {
        match tokio::fs::metadata(&self.path).await {
            Ok(meta) if meta.is_file() => HealthCheckResult::healthy(ADAPTER_ID),
            Ok(_) => HealthCheckResult::unhealthy(ADAPTER_ID, format!("{} is not a file", self.path.display())),
            Err(e) => HealthCheckResult::unhealthy(ADAPTER_ID, format!("{}: {}", self.path.display(), e)),
        }
    }
}

#[async_trait]
impl PricingRuleSource for JsonFileRuleSource {
    async fn load_rules(&self) -> Result<Vec<PricingRule>, PortError> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| PortError::connection(format!("reading {}", self.path.display()), e))?;
        parse_rule_listing(&text)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
