//! Pricing rule catalog DTOs

use chrono::{DateTime, Utc};
use serde::Serialize;

use domain_quote::{RuleCatalog, RuleIssue};

/// Catalog snapshot summary with its load-time validation report
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogReport {
    pub catalog_id: String,
    pub loaded_at: DateTime<Utc>,
    pub rule_count: usize,
    pub excluded_count: usize,
    pub issues: Vec<RuleIssue>,
}

impl From<&RuleCatalog> for CatalogReport {
    fn from(catalog: &RuleCatalog) -> Self {
        Self {
            catalog_id: catalog.id().to_string(),
            loaded_at: catalog.loaded_at(),
            rule_count: catalog.len(),
            excluded_count: catalog.excluded_count(),
            issues: catalog.issues().to_vec(),
        }
    }
}
