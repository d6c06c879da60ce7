//! Domain value objects: the closed vocabularies used by contexts, rules,
//! bundles and requirements.
//!
//! # Design
//!
//! These are pure value types: `Copy` and compared by value, with no identity.
//! They hold NO compatibility logic. Rules live in `rules/`, bundle ranking
//! lives in `recommender.rs`. This file's only job is to define the types,
//! their string representations, their ordering, and their `FromStr` parsers.
//!
//! # Adding New Variants
//!
//! 1. Add the enum variant here
//! 2. Add the `as_str` arm and the `FromStr` arm here
//! 3. If a rule should react to it, add the rule in `rules/builtin.rs`

use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Implements `Display` by delegating to `as_str`.
macro_rules! display_as_str {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )+
    };
}

fn unknown(field: &'static str, value: &str) -> DomainError {
    DomainError::UnknownValue {
        field,
        value: value.to_string(),
    }
}

// ── Severity / Verdict ───────────────────────────────────────────────────────

/// Severity of a compatibility issue.
///
/// Ordered so that `Error` is the greatest; `max()` over a list of issues
/// yields the worst one.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl FromStr for Severity {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "info" => Ok(Self::Info),
            "warning" | "warn" => Ok(Self::Warning),
            "error" | "err" => Ok(Self::Error),
            other => Err(unknown("severity", other)),
        }
    }
}

/// Overall outcome of an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Pass,
    Warn,
    Fail,
}

impl Verdict {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Warn => "warn",
            Self::Fail => "fail",
        }
    }

    /// Derive the verdict from the worst issue severity present.
    pub fn from_worst(worst: Option<Severity>) -> Self {
        match worst {
            Some(Severity::Error) => Self::Fail,
            Some(Severity::Warning) => Self::Warn,
            Some(Severity::Info) | None => Self::Pass,
        }
    }
}

// ── Deployment context ───────────────────────────────────────────────────────

/// Target deployment environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Staging => "staging",
            Self::Production => "production",
        }
    }
}

impl FromStr for Environment {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" | "local" => Ok(Self::Development),
            "staging" | "stage" => Ok(Self::Staging),
            "production" | "prod" => Ok(Self::Production),
            other => Err(unknown("environment", other)),
        }
    }
}

/// Expected traffic the deployment must sustain.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ExpectedLoad {
    #[default]
    Low,
    Medium,
    High,
    Enterprise,
}

impl ExpectedLoad {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Enterprise => "enterprise",
        }
    }

    /// Fixed user-count thresholds: <1k low, <10k medium, <100k high.
    pub const fn from_users(expected_users: u64) -> Self {
        match expected_users {
            0..1_000 => Self::Low,
            1_000..10_000 => Self::Medium,
            10_000..100_000 => Self::High,
            _ => Self::Enterprise,
        }
    }

    pub const fn is_heavy(self) -> bool {
        matches!(self, Self::High | Self::Enterprise)
    }
}

impl FromStr for ExpectedLoad {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" | "med" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "enterprise" => Ok(Self::Enterprise),
            other => Err(unknown("expected load", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LatencyRequirement {
    Relaxed,
    #[default]
    Standard,
    Realtime,
}

impl LatencyRequirement {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Relaxed => "relaxed",
            Self::Standard => "standard",
            Self::Realtime => "realtime",
        }
    }
}

impl FromStr for LatencyRequirement {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "relaxed" => Ok(Self::Relaxed),
            "standard" => Ok(Self::Standard),
            "realtime" | "real-time" => Ok(Self::Realtime),
            other => Err(unknown("latency requirement", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsistencyLevel {
    #[default]
    Eventual,
    Strong,
}

impl ConsistencyLevel {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Eventual => "eventual",
            Self::Strong => "strong",
        }
    }
}

impl FromStr for ConsistencyLevel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "eventual" => Ok(Self::Eventual),
            "strong" => Ok(Self::Strong),
            other => Err(unknown("consistency level", other)),
        }
    }
}

// ── Multi-tenancy ────────────────────────────────────────────────────────────

/// Multi-tenant isolation approach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TenancyStrategy {
    RowLevelSecurity,
    SchemaPerTenant,
    DatabasePerTenant,
    SharedDatabase,
}

impl TenancyStrategy {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::RowLevelSecurity => "row-level-security",
            Self::SchemaPerTenant => "schema-per-tenant",
            Self::DatabasePerTenant => "database-per-tenant",
            Self::SharedDatabase => "shared-database",
        }
    }
}

impl FromStr for TenancyStrategy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "row-level-security" | "rls" => Ok(Self::RowLevelSecurity),
            "schema-per-tenant" | "schema" => Ok(Self::SchemaPerTenant),
            "database-per-tenant" | "db-per-tenant" => Ok(Self::DatabasePerTenant),
            "shared-database" | "shared" => Ok(Self::SharedDatabase),
            other => Err(unknown("tenancy strategy", other)),
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum IsolationLevel {
    Basic,
    #[default]
    Standard,
    Strict,
}

impl IsolationLevel {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Standard => "standard",
            Self::Strict => "strict",
        }
    }
}

impl FromStr for IsolationLevel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "basic" => Ok(Self::Basic),
            "standard" => Ok(Self::Standard),
            "strict" => Ok(Self::Strict),
            other => Err(unknown("isolation level", other)),
        }
    }
}

// ── Compliance ───────────────────────────────────────────────────────────────

/// Regulatory regimes a stack may have to satisfy.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Compliance {
    Gdpr,
    Soc2,
    Hipaa,
    PciDss,
}

impl Compliance {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Gdpr => "gdpr",
            Self::Soc2 => "soc2",
            Self::Hipaa => "hipaa",
            Self::PciDss => "pci-dss",
        }
    }
}

impl FromStr for Compliance {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gdpr" => Ok(Self::Gdpr),
            "soc2" | "soc-2" => Ok(Self::Soc2),
            "hipaa" => Ok(Self::Hipaa),
            "pci-dss" | "pci" | "pcidss" => Ok(Self::PciDss),
            other => Err(unknown("compliance", other)),
        }
    }
}

// ── Business tiers ───────────────────────────────────────────────────────────

/// Budget tier, ordered from cheapest to most expensive.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum BudgetTier {
    #[default]
    Low,
    Medium,
    High,
    Enterprise,
}

impl BudgetTier {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Enterprise => "enterprise",
        }
    }
}

impl FromStr for BudgetTier {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" | "med" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "enterprise" => Ok(Self::Enterprise),
            other => Err(unknown("budget", other)),
        }
    }
}

/// Team size, ordered from smallest to largest.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TeamSize {
    Solo,
    #[default]
    Small,
    Medium,
    Large,
}

impl TeamSize {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Solo => "solo",
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }
}

impl FromStr for TeamSize {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "solo" | "1" => Ok(Self::Solo),
            "small" => Ok(Self::Small),
            "medium" | "med" => Ok(Self::Medium),
            "large" => Ok(Self::Large),
            other => Err(unknown("team size", other)),
        }
    }
}

/// Pricing tier of a bundle, ordered from free upward.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PricingTier {
    Free,
    Starter,
    Pro,
    Enterprise,
}

impl PricingTier {
    /// Highest ordinal; used to normalise the inverse-price score.
    pub const MAX_ORDINAL: u8 = 3;

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Starter => "starter",
            Self::Pro => "pro",
            Self::Enterprise => "enterprise",
        }
    }

    pub const fn ordinal(self) -> u8 {
        match self {
            Self::Free => 0,
            Self::Starter => 1,
            Self::Pro => 2,
            Self::Enterprise => 3,
        }
    }
}

impl FromStr for PricingTier {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "free" => Ok(Self::Free),
            "starter" => Ok(Self::Starter),
            "pro" => Ok(Self::Pro),
            "enterprise" => Ok(Self::Enterprise),
            other => Err(unknown("pricing tier", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BundleCategory {
    Starter,
    Saas,
    Ecommerce,
    Enterprise,
}

impl BundleCategory {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Starter => "starter",
            Self::Saas => "saas",
            Self::Ecommerce => "ecommerce",
            Self::Enterprise => "enterprise",
        }
    }
}

impl FromStr for BundleCategory {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "starter" => Ok(Self::Starter),
            "saas" => Ok(Self::Saas),
            "ecommerce" | "e-commerce" | "shop" => Ok(Self::Ecommerce),
            "enterprise" => Ok(Self::Enterprise),
            other => Err(unknown("bundle category", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeline {
    Urgent,
    #[default]
    Standard,
    Flexible,
}

impl Timeline {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Urgent => "urgent",
            Self::Standard => "standard",
            Self::Flexible => "flexible",
        }
    }
}

impl FromStr for Timeline {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "urgent" | "asap" => Ok(Self::Urgent),
            "standard" | "normal" => Ok(Self::Standard),
            "flexible" => Ok(Self::Flexible),
            other => Err(unknown("timeline", other)),
        }
    }
}

/// Risk attached to a migration step.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

display_as_str!(
    Severity,
    Verdict,
    Environment,
    ExpectedLoad,
    LatencyRequirement,
    ConsistencyLevel,
    TenancyStrategy,
    IsolationLevel,
    Compliance,
    BudgetTier,
    TeamSize,
    PricingTier,
    BundleCategory,
    Timeline,
    RiskLevel,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_orders_error_highest() {
        assert!(Severity::Error > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);
        let worst = [Severity::Info, Severity::Error, Severity::Warning]
            .into_iter()
            .max();
        assert_eq!(worst, Some(Severity::Error));
    }

    #[test]
    fn verdict_follows_worst_severity() {
        assert_eq!(Verdict::from_worst(None), Verdict::Pass);
        assert_eq!(Verdict::from_worst(Some(Severity::Info)), Verdict::Pass);
        assert_eq!(Verdict::from_worst(Some(Severity::Warning)), Verdict::Warn);
        assert_eq!(Verdict::from_worst(Some(Severity::Error)), Verdict::Fail);
    }

    #[test]
    fn environment_from_str_accepts_aliases() {
        assert_eq!(
            "prod".parse::<Environment>().unwrap(),
            Environment::Production
        );
        assert_eq!(
            "dev".parse::<Environment>().unwrap(),
            Environment::Development
        );
        assert!("moon".parse::<Environment>().is_err());
    }

    #[test]
    fn expected_load_thresholds() {
        assert_eq!(ExpectedLoad::from_users(0), ExpectedLoad::Low);
        assert_eq!(ExpectedLoad::from_users(999), ExpectedLoad::Low);
        assert_eq!(ExpectedLoad::from_users(1_000), ExpectedLoad::Medium);
        assert_eq!(ExpectedLoad::from_users(9_999), ExpectedLoad::Medium);
        assert_eq!(ExpectedLoad::from_users(10_000), ExpectedLoad::High);
        assert_eq!(ExpectedLoad::from_users(99_999), ExpectedLoad::High);
        assert_eq!(ExpectedLoad::from_users(100_000), ExpectedLoad::Enterprise);
    }

    #[test]
    fn compliance_serializes_kebab_case() {
        let json = serde_json::to_string(&Compliance::PciDss).unwrap();
        assert_eq!(json, "\"pci-dss\"");
        assert_eq!("pci".parse::<Compliance>().unwrap(), Compliance::PciDss);
    }

    #[test]
    fn tenancy_strategy_round_trips_display() {
        for strategy in [
            TenancyStrategy::RowLevelSecurity,
            TenancyStrategy::SchemaPerTenant,
            TenancyStrategy::DatabasePerTenant,
            TenancyStrategy::SharedDatabase,
        ] {
            assert_eq!(
                strategy.to_string().parse::<TenancyStrategy>().unwrap(),
                strategy
            );
        }
        assert_eq!(
            "rls".parse::<TenancyStrategy>().unwrap(),
            TenancyStrategy::RowLevelSecurity
        );
    }

    #[test]
    fn tiers_are_ordered() {
        assert!(BudgetTier::Low < BudgetTier::Enterprise);
        assert!(TeamSize::Solo < TeamSize::Large);
        assert_eq!(PricingTier::Enterprise.ordinal(), PricingTier::MAX_ORDINAL);
    }

    #[test]
    fn unknown_value_names_the_field() {
        let err = "gigantic".parse::<TeamSize>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown value 'gigantic' for team size");
    }
}
