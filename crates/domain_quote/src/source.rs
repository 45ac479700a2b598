//! Pricing rule source port
//!
//! Where the catalog comes from is an adapter concern. The quoting core only
//! needs an ordered listing of rules as stored; storage ordering is the
//! selection order.

use async_trait::async_trait;
use std::sync::RwLock;

use core_kernel::{DomainPort, HealthCheckResult, HealthCheckable, PortError};

use crate::catalog::RuleCatalog;
use crate::rule::PricingRule;

/// Port for fetching the stored rule listing
#[async_trait]
pub trait PricingRuleSource: DomainPort + HealthCheckable {
    /// Returns every stored rule in catalog order
    async fn load_rules(&self) -> Result<Vec<PricingRule>, PortError>;

    /// Human-readable location, for logs
    fn describe(&self) -> String;

    /// Loads and validates a fresh catalog snapshot
    async fn load_catalog(&self) -> Result<RuleCatalog, PortError> {
        let rules = self.load_rules().await?;
        tracing::debug!(source = %self.describe(), count = rules.len(), "fetched pricing rules");
        Ok(RuleCatalog::load(rules))
    }
}

/// Rules held in memory, for tests and fixed deployments
#[derive(Debug, Default)]
pub struct InMemoryRuleSource {
    rules: RwLock<Vec<PricingRule>>,
}

impl InMemoryRuleSource {
    pub fn new(rules: Vec<PricingRule>) -> Self {
        Self {
            rules: RwLock::new(rules),
        }
    }

    /// Replaces the stored listing
    pub fn replace(&self, rules: Vec<PricingRule>) -> Result<(), PortError> {
        let mut guard = self
            .rules
            .write()
            .map_err(|_| PortError::internal("rule store lock poisoned"))?;
        *guard = rules;
        Ok(())
    }
}

impl DomainPort for InMemoryRuleSource {}

#[async_trait]
impl HealthCheckable for InMemoryRuleSource {
    async fn health_check(&self) -> HealthCheckResult {
        match self.rules.read() {
            Ok(_) => HealthCheckResult::healthy("in-memory-rules"),
            Err(_) => HealthCheckResult::unhealthy("in-memory-rules", "rule store lock poisoned"),
        }
    }
}

#[async_trait]
impl PricingRuleSource for InMemoryRuleSource {
    async fn load_rules(&self) -> Result<Vec<PricingRule>, PortError> {
        let guard = self
            .rules
            .read()
            .map_err(|_| PortError::internal("rule store lock poisoned"))?;
        Ok(guard.clone())
    }

    fn describe(&self) -> String {
        "in-memory".to_string()
    }
}
