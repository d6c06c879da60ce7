// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for Stackweave.
//!
//! This module contains pure business logic with ZERO I/O. Loading catalogs,
//! logging and configuration are handled by the application layer and the
//! adapters crate.
//!
//! ## Hexagonal Architecture Compliance
//!
//! - **No async**: Domain logic is synchronous
//! - **No I/O**: No filesystem, network, or external calls
//! - **No logging**: `tracing` is used by the application layer only
//! - **Immutable inputs**: catalogs, rules and contexts are never mutated by
//!   an algorithm; every call allocates its own working state
//!
// Public API - what the world sees
pub mod catalog;
pub mod entities;
pub mod error;
pub mod evaluator;
pub mod recommender;
pub mod resolver;
pub mod rules;
pub mod value_objects;

// Private implementation details - not visible outside domain
mod validation;

// Re-exports for convenience
pub use catalog::{BundleCatalog, ServiceCatalog};
pub use entities::{
    Bundle, BundleRequirements, BundleServices, BusinessRequirements, CompatibilityContext,
    CompatibilityIssue, Elimination, EnvVariable, Evaluation, InjectionPoint, InjectionStep,
    MigrationPath, MigrationStep, MultiTenancy, PerformanceTargets, PostInstallStep,
    Recommendation, RecommendationOutcome, ResolutionResult, ScalingFlags, ServiceIdentifier,
    ServiceKey, ServicePattern, ServiceTemplate, TechnicalConstraints,
};
pub use error::{DomainError, ErrorCategory};
pub use evaluator::{CompatibilityEvaluator, PenaltyTable};
pub use recommender::BundleRecommender;
pub use resolver::{DependencyResolver, MissingDependency, ResolvedGraph};
pub use rules::{CompatibilityRule, RuleCheck, RuleSet};
pub use validation::DomainValidator;
pub use value_objects::{
    BudgetTier, BundleCategory, Compliance, ConsistencyLevel, Environment, ExpectedLoad,
    IsolationLevel, LatencyRequirement, PricingTier, RiskLevel, Severity, TeamSize,
    TenancyStrategy, Timeline, Verdict,
};
