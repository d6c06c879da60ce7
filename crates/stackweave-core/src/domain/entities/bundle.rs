//! Curated bundles and the business requirements they are matched against.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::{
    DomainError,
    entities::service::ServiceIdentifier,
    value_objects::{
        BudgetTier, BundleCategory, Compliance, ExpectedLoad, PricingTier, TeamSize, Timeline,
    },
};

// ============================================================================
// Bundle
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleServices {
    pub core: Vec<ServiceIdentifier>,
    #[serde(default)]
    pub optional: Vec<ServiceIdentifier>,
}

/// What a team needs to operate a bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleRequirements {
    pub budget: BudgetTier,
    /// Minimum team able to operate the bundle.
    pub team_size: TeamSize,
    /// Load the bundle is designed for.
    pub expected_load: ExpectedLoad,
}

/// A named, curated set of services. Never mutated once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bundle {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: BundleCategory,
    pub services: BundleServices,
    pub requirements: BundleRequirements,
    pub pricing_tier: PricingTier,
    #[serde(default)]
    pub features: BTreeSet<String>,
    #[serde(default)]
    pub compliance: BTreeSet<Compliance>,
}

impl Bundle {
    /// `core ∪ optional`, core first, duplicates dropped by identity.
    pub fn all_services(&self) -> Vec<ServiceIdentifier> {
        let mut seen = BTreeSet::new();
        self.services
            .core
            .iter()
            .chain(&self.services.optional)
            .filter(|s| seen.insert(s.key()))
            .cloned()
            .collect()
    }

    pub fn has_feature(&self, feature: &str) -> bool {
        self.features.contains(feature)
    }

    pub fn covers(&self, compliance: &BTreeSet<Compliance>) -> bool {
        compliance.is_subset(&self.compliance)
    }

    /// Whether any service of this bundle is provided by `provider`.
    pub fn uses_provider(&self, provider: &str) -> bool {
        self.services
            .core
            .iter()
            .chain(&self.services.optional)
            .any(|s| s.provider == provider)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        let invalid = |reason: &str| DomainError::InvalidBundle {
            bundle_id: self.id.clone(),
            reason: reason.to_string(),
        };

        if self.id.trim().is_empty() {
            return Err(invalid("id cannot be empty"));
        }
        if self.name.trim().is_empty() {
            return Err(invalid("name cannot be empty"));
        }
        if self.services.core.is_empty() {
            return Err(invalid("a bundle needs at least one core service"));
        }
        for service in self.services.core.iter().chain(&self.services.optional) {
            service.validate()?;
        }
        Ok(())
    }
}

// ============================================================================
// BusinessRequirements
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechnicalConstraints {
    /// Providers already running (e.g. `sqlite`, `mysql`).
    #[serde(default)]
    pub existing_infrastructure: Vec<String>,
}

/// Input of the bundle recommender.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessRequirements {
    pub expected_users: u64,
    pub expected_tenants: u64,
    pub budget: BudgetTier,
    pub team_size: TeamSize,
    pub timeline: Timeline,
    pub compliance: BTreeSet<Compliance>,
    pub features: BTreeSet<String>,
    pub technical_constraints: TechnicalConstraints,
}

impl BusinessRequirements {
    pub fn builder() -> BusinessRequirementsBuilder {
        BusinessRequirementsBuilder::default()
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if let Some(empty) = self.features.iter().find(|f| f.trim().is_empty()) {
            return Err(DomainError::InvalidRequirements(format!(
                "feature names cannot be empty (got {empty:?})"
            )));
        }
        if self
            .technical_constraints
            .existing_infrastructure
            .iter()
            .any(|p| p.trim().is_empty())
        {
            return Err(DomainError::InvalidRequirements(
                "existing infrastructure entries cannot be empty".into(),
            ));
        }
        if self.expected_tenants > u64::from(u32::MAX) {
            return Err(DomainError::InvalidRequirements(format!(
                "expected tenants must not exceed {}",
                u32::MAX
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct BusinessRequirementsBuilder {
    inner: BusinessRequirements,
}

impl BusinessRequirementsBuilder {
    pub fn expected_users(mut self, users: u64) -> Self {
        self.inner.expected_users = users;
        self
    }

    pub fn expected_tenants(mut self, tenants: u64) -> Self {
        self.inner.expected_tenants = tenants;
        self
    }

    pub fn budget(mut self, budget: BudgetTier) -> Self {
        self.inner.budget = budget;
        self
    }

    pub fn team_size(mut self, team_size: TeamSize) -> Self {
        self.inner.team_size = team_size;
        self
    }

    pub fn timeline(mut self, timeline: Timeline) -> Self {
        self.inner.timeline = timeline;
        self
    }

    pub fn compliance(mut self, compliance: Compliance) -> Self {
        self.inner.compliance.insert(compliance);
        self
    }

    pub fn feature(mut self, feature: impl Into<String>) -> Self {
        self.inner.features.insert(feature.into());
        self
    }

    pub fn existing_infrastructure(mut self, provider: impl Into<String>) -> Self {
        self.inner
            .technical_constraints
            .existing_infrastructure
            .push(provider.into());
        self
    }

    pub fn build(self) -> Result<BusinessRequirements, DomainError> {
        self.inner.validate()?;
        Ok(self.inner)
    }
}
