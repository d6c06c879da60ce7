pub mod bundle;
pub mod context;
pub mod resolution;
pub mod service;

pub use crate::domain::DomainError;
pub use bundle::{
    Bundle, BundleRequirements, BundleServices, BusinessRequirements,
    BusinessRequirementsBuilder, TechnicalConstraints,
};
pub use context::{CompatibilityContext, MultiTenancy, PerformanceTargets, ScalingFlags};
pub use resolution::{
    CompatibilityIssue, Elimination, Evaluation, InjectionStep, MigrationPath, MigrationStep,
    PostInstallStep, Recommendation, RecommendationOutcome, ResolutionResult,
};
pub use service::{
    EnvVariable, InjectionPoint, ServiceIdentifier, ServiceKey, ServicePattern, ServiceTemplate,
    ServiceTemplateBuilder, WILDCARD,
};
