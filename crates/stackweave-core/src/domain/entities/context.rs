//! The deployment context every rule is evaluated against.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{
    Compliance, ConsistencyLevel, Environment, ExpectedLoad, IsolationLevel, LatencyRequirement,
    TenancyStrategy,
};

/// Multi-tenant deployment parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiTenancy {
    pub strategy: TenancyStrategy,
    #[serde(default)]
    pub isolation: IsolationLevel,
    #[serde(default)]
    pub max_tenants: u32,
}

impl MultiTenancy {
    pub fn new(strategy: TenancyStrategy) -> Self {
        Self {
            strategy,
            isolation: IsolationLevel::default(),
            max_tenants: 0,
        }
    }

    pub fn isolation(mut self, isolation: IsolationLevel) -> Self {
        self.isolation = isolation;
        self
    }

    pub fn max_tenants(mut self, max_tenants: u32) -> Self {
        self.max_tenants = max_tenants;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalingFlags {
    #[serde(default)]
    pub horizontal: bool,
    #[serde(default)]
    pub serverless: bool,
    #[serde(default)]
    pub auto_scaling: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceTargets {
    #[serde(default)]
    pub expected_load: ExpectedLoad,
    #[serde(default)]
    pub latency: LatencyRequirement,
    #[serde(default)]
    pub consistency: ConsistencyLevel,
}

/// Deployment context. Built once per call and never mutated during
/// resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityContext {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_tenancy: Option<MultiTenancy>,
    #[serde(default)]
    pub scaling: ScalingFlags,
    #[serde(default)]
    pub compliance: BTreeSet<Compliance>,
    #[serde(default)]
    pub performance: PerformanceTargets,
}

impl CompatibilityContext {
    pub fn new(environment: Environment) -> Self {
        Self {
            environment,
            ..Self::default()
        }
    }

    pub fn production() -> Self {
        Self::new(Environment::Production)
    }

    pub fn with_load(mut self, load: ExpectedLoad) -> Self {
        self.performance.expected_load = load;
        self
    }

    pub fn with_latency(mut self, latency: LatencyRequirement) -> Self {
        self.performance.latency = latency;
        self
    }

    pub fn with_consistency(mut self, consistency: ConsistencyLevel) -> Self {
        self.performance.consistency = consistency;
        self
    }

    pub fn with_multi_tenancy(mut self, tenancy: MultiTenancy) -> Self {
        self.multi_tenancy = Some(tenancy);
        self
    }

    pub fn with_scaling(mut self, scaling: ScalingFlags) -> Self {
        self.scaling = scaling;
        self
    }

    pub fn with_compliance(mut self, compliance: Compliance) -> Self {
        self.compliance.insert(compliance);
        self
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    pub fn requires(&self, compliance: Compliance) -> bool {
        self.compliance.contains(&compliance)
    }

    pub fn tenancy_strategy(&self) -> Option<TenancyStrategy> {
        self.multi_tenancy.map(|t| t.strategy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_context_is_development_low_load() {
        let ctx = CompatibilityContext::default();
        assert_eq!(ctx.environment, Environment::Development);
        assert_eq!(ctx.performance.expected_load, ExpectedLoad::Low);
        assert!(ctx.multi_tenancy.is_none());
    }

    #[test]
    fn builder_methods_compose() {
        let ctx = CompatibilityContext::production()
            .with_load(ExpectedLoad::High)
            .with_compliance(Compliance::Soc2)
            .with_multi_tenancy(
                MultiTenancy::new(TenancyStrategy::RowLevelSecurity)
                    .isolation(IsolationLevel::Strict)
                    .max_tenants(50),
            );
        assert!(ctx.is_production());
        assert!(ctx.requires(Compliance::Soc2));
        assert_eq!(
            ctx.tenancy_strategy(),
            Some(TenancyStrategy::RowLevelSecurity)
        );
    }

    #[test]
    fn deserializes_partial_json() {
        let ctx: CompatibilityContext = serde_json::from_str(
            r#"{"environment":"production","multi_tenancy":{"strategy":"row-level-security"}}"#,
        )
        .unwrap();
        assert!(ctx.is_production());
        let tenancy = ctx.multi_tenancy.unwrap();
        assert_eq!(tenancy.isolation, IsolationLevel::Standard);
        assert_eq!(tenancy.max_tenants, 0);
    }
}
