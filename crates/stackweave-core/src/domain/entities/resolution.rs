//! Values produced by evaluation, resolution and recommendation.
//!
//! All of these are created fresh per call and owned by the caller.

use serde::{Deserialize, Serialize};

use crate::domain::{
    entities::{
        bundle::Bundle,
        service::{EnvVariable, InjectionPoint, ServiceIdentifier},
    },
    value_objects::{RiskLevel, Severity, Verdict},
};

// ============================================================================
// Evaluation
// ============================================================================

/// A rule violation. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityIssue {
    pub rule_id: String,
    pub severity: Severity,
    pub affected_services: Vec<ServiceIdentifier>,
    pub message: String,
}

impl CompatibilityIssue {
    pub fn new(
        rule_id: impl Into<String>,
        severity: Severity,
        affected_services: Vec<ServiceIdentifier>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            severity,
            affected_services,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn affects_provider(&self, provider: &str) -> bool {
        self.affected_services.iter().any(|s| s.provider == provider)
    }
}

/// Issues plus their aggregate: a continuous score and a binary gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub issues: Vec<CompatibilityIssue>,
    pub score: u8,
    pub compatible: bool,
    pub verdict: Verdict,
}

impl Evaluation {
    pub fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Renderer contract: where each resolved service must be injected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjectionStep {
    pub service: ServiceIdentifier,
    /// Sorted by priority, highest first.
    pub points: Vec<InjectionPoint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostInstallStep {
    pub service: ServiceIdentifier,
    pub command: String,
}

/// Outcome of a full resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionResult {
    /// Dependencies strictly before dependents.
    pub resolved_order: Vec<ServiceIdentifier>,
    /// Services pulled in by expansion, in resolved order.
    pub implied: Vec<ServiceIdentifier>,
    /// Dependency patterns no catalog entry satisfied (wildcards as `*`).
    pub missing: Vec<ServiceIdentifier>,
    pub issues: Vec<CompatibilityIssue>,
    pub score: u8,
    pub compatible: bool,
    pub verdict: Verdict,
    pub injection_plan: Vec<InjectionStep>,
    pub env_variables: Vec<EnvVariable>,
    pub post_install_steps: Vec<PostInstallStep>,
}

impl ResolutionResult {
    pub fn position(&self, service_type: &str, provider: &str) -> Option<usize> {
        self.resolved_order
            .iter()
            .position(|s| s.is(service_type, provider))
    }

    pub fn contains(&self, service_type: &str, provider: &str) -> bool {
        self.position(service_type, provider).is_some()
    }
}

// ============================================================================
// Recommendation
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationStep {
    pub title: String,
    pub description: String,
    pub risk: RiskLevel,
    pub reversible: bool,
}

/// Advisory only; nothing here is ever executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationPath {
    /// Provider currently in use.
    pub from: ServiceIdentifier,
    /// Provider the recommended bundle uses instead.
    pub to: ServiceIdentifier,
    /// Another bundle that already uses `from`.
    pub source_bundle: String,
    pub steps: Vec<MigrationStep>,
    pub risk: RiskLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub bundle: Bundle,
    /// Weighted score in `[0, 1]`.
    pub score: f64,
    /// Compatibility score of the bundle under the synthesized context.
    pub compatibility_score: u8,
    pub reasoning: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub migration_path: Option<MigrationPath>,
}

/// Why a bundle was not recommended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Elimination {
    pub bundle_id: String,
    pub constraint: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RecommendationOutcome {
    Recommended(Recommendation),
    NoEligibleBundle {
        reasoning: Vec<String>,
        eliminations: Vec<Elimination>,
    },
}

impl RecommendationOutcome {
    pub fn recommended(&self) -> Option<&Recommendation> {
        match self {
            Self::Recommended(rec) => Some(rec),
            Self::NoEligibleBundle { .. } => None,
        }
    }

    pub fn reasoning(&self) -> &[String] {
        match self {
            Self::Recommended(rec) => &rec.reasoning,
            Self::NoEligibleBundle { reasoning, .. } => reasoning,
        }
    }
}
