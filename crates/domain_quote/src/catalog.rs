//! Rule catalog
//!
//! An immutable, ordered snapshot of pricing rules plus the report from the
//! load-time validation pass. Rules whose bucket cannot anchor scaling are
//! excluded here, once, instead of failing individual quotes later. Rules
//! with suspicious but tolerable data stay in the catalog with a warning.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashSet;

use core_kernel::RuleSetId;

use crate::rule::{Effectivity, PricingRule, RuleNumber};
use crate::selector::select_rule;

/// How a catalog issue affects selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    /// The rule was removed from the catalog
    Excluded,
    /// The rule stays but may never match or may match unexpectedly
    Warning,
}

/// A problem found while loading a rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleIssue {
    pub rule_id: String,
    /// Position in the source listing
    pub position: usize,
    pub severity: IssueSeverity,
    pub message: String,
}

/// Validated, ordered pricing rules
#[derive(Debug, Clone)]
pub struct RuleCatalog {
    id: RuleSetId,
    loaded_at: DateTime<Utc>,
    rules: Vec<PricingRule>,
    issues: Vec<RuleIssue>,
}

impl RuleCatalog {
    /// Validates and loads rules, keeping their order
    pub fn load(rules: Vec<PricingRule>) -> Self {
        Self::load_at(rules, Utc::now())
    }

    /// Same as [`RuleCatalog::load`] with an explicit load time
    pub fn load_at(rules: Vec<PricingRule>, loaded_at: DateTime<Utc>) -> Self {
        let mut issues = Vec::new();
        let mut kept = Vec::with_capacity(rules.len());
        let mut seen_ids = HashSet::new();

        for (position, rule) in rules.into_iter().enumerate() {
            let mut issue = |severity: IssueSeverity, message: String| {
                issues.push(RuleIssue {
                    rule_id: rule.id.clone(),
                    position,
                    severity,
                    message,
                })
            };

            if let Err(err) = rule.bucket() {
                tracing::warn!(rule_id = %rule.id, position, error = %err, "excluding pricing rule");
                issue(IssueSeverity::Excluded, err.to_string());
                continue;
            }

            for warning in rule_warnings(&rule) {
                tracing::warn!(rule_id = %rule.id, position, warning = %warning, "suspicious pricing rule");
                issue(IssueSeverity::Warning, warning);
            }

            if !rule.id.is_empty() && !seen_ids.insert(rule.id.clone()) {
                issue(IssueSeverity::Warning, format!("duplicate rule id {}", rule.id));
            }

            kept.push(rule);
        }

        let catalog = Self {
            id: RuleSetId::at(loaded_at),
            loaded_at,
            rules: kept,
            issues,
        };
        tracing::info!(
            catalog_id = %catalog.id,
            rules = catalog.rules.len(),
            issues = catalog.issues.len(),
            "loaded pricing rule catalog"
        );
        catalog
    }

    /// An empty catalog; every selection misses
    pub fn empty() -> Self {
        Self::load(Vec::new())
    }

    /// First applicable rule, see [`select_rule`]
    pub fn select(&self, product_type: &str, age: Decimal, as_of: DateTime<Utc>) -> Option<&PricingRule> {
        select_rule(&self.rules, product_type, age, as_of)
    }

    pub fn id(&self) -> RuleSetId {
        self.id
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn rules(&self) -> &[PricingRule] {
        &self.rules
    }

    pub fn issues(&self) -> &[RuleIssue] {
        &self.issues
    }

    pub fn excluded_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == IssueSeverity::Excluded)
            .count()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn rule_warnings(rule: &PricingRule) -> Vec<String> {
    let mut warnings = Vec::new();

    if rule.id.trim().is_empty() {
        warnings.push("rule has no id".to_string());
    }
    if rule.normalized_product().is_empty() {
        warnings.push("productType is blank, rule can never match".to_string());
    }

    for (name, bound) in [("minAge", &rule.min_age), ("maxAge", &rule.max_age)] {
        if let RuleNumber::Malformed(raw) = bound {
            warnings.push(format!("{} {:?} is not a number, rule can never match", name, raw));
        }
    }

    if let (Some(min), Some(max)) = (rule.min_age.value(), rule.max_age.value()) {
        if min > max {
            warnings.push(format!("minAge {} exceeds maxAge {}, rule can never match", min, max));
        }
    }

    if let Effectivity::Unparsable(raw) = rule.effectivity() {
        warnings.push(format!("effectiveFrom {:?} is unparsable, rule is always effective", raw));
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn rule(id: &str) -> PricingRule {
        PricingRule::new(id, "health", dec!(500000), dec!(2500))
    }

    #[test]
    fn test_clean_catalog() {
        let catalog = RuleCatalog::load(vec![rule("a"), rule("b")]);
        assert_eq!(catalog.len(), 2);
        assert!(catalog.issues().is_empty());
    }

    #[test]
    fn test_zero_bucket_is_excluded() {
        let mut broken = rule("broken");
        broken.sum_insured = RuleNumber::Value(Decimal::ZERO);
        let mut missing = rule("missing");
        missing.sum_insured = RuleNumber::Unset;

        let catalog = RuleCatalog::load(vec![broken, missing, rule("ok")]);

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.rules()[0].id, "ok");
        assert_eq!(catalog.excluded_count(), 2);
        assert_eq!(catalog.issues()[0].position, 0);
        assert_eq!(catalog.issues()[1].rule_id, "missing");
    }

    #[test]
    fn test_warnings_keep_rule() {
        let mut odd = rule("odd").with_age_band(Some(dec!(60)), Some(dec!(18)));
        odd.effective_from = Some("next tuesday".to_string());

        let catalog = RuleCatalog::load(vec![odd, rule("odd")]);

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.excluded_count(), 0);
        let messages: Vec<&str> = catalog.issues().iter().map(|i| i.message.as_str()).collect();
        assert!(messages.iter().any(|m| m.contains("exceeds maxAge")));
        assert!(messages.iter().any(|m| m.contains("unparsable")));
        assert!(messages.iter().any(|m| m.contains("duplicate rule id")));
    }

    #[test]
    fn test_select_delegates_in_order() {
        let catalog = RuleCatalog::load(vec![rule("first"), rule("second")]);
        let as_of = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(catalog.select("health", dec!(40), as_of).unwrap().id, "first");
        assert!(RuleCatalog::empty().select("health", dec!(40), as_of).is_none());
    }

    #[test]
    fn test_catalog_id_follows_load_time() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let catalog = RuleCatalog::load_at(vec![], at);
        assert_eq!(catalog.loaded_at(), at);
        assert!(catalog.id().to_string().starts_with("RSET-"));
    }
}
