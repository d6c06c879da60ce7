// ============================================================================
// domain/error.rs - DOMAIN ERRORS
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (results are handed across threads and retried by callers)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
///
/// Routine outcomes (a missing transitive dependency, an incompatible
/// combination, no eligible bundle) are NOT errors; they are fields of the
/// returned results. Only structural failures and the two fatal resolution
/// conditions live here.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Validation Errors (400-level equivalent)
    // ========================================================================
    #[error("Invalid service identifier '{input}': {reason}")]
    InvalidIdentifier { input: String, reason: String },

    #[error("Invalid service pattern '{input}': {reason}")]
    InvalidPattern { input: String, reason: String },

    #[error("Invalid service template '{service}': {reason}")]
    InvalidTemplate { service: String, reason: String },

    #[error("Service '{service}' is registered twice")]
    DuplicateService { service: String },

    #[error("Invalid bundle '{bundle_id}': {reason}")]
    InvalidBundle { bundle_id: String, reason: String },

    #[error("Bundle '{bundle_id}' is registered twice")]
    DuplicateBundle { bundle_id: String },

    #[error("Invalid business requirements: {0}")]
    InvalidRequirements(String),

    #[error("Invalid penalty table: {0}")]
    InvalidPenaltyTable(String),

    #[error("Unknown value '{value}' for {field}")]
    UnknownValue { field: &'static str, value: String },

    // ========================================================================
    // Not Found Errors (404-level equivalent)
    // ========================================================================
    #[error("Service '{service_type}:{provider}' is not in the catalog")]
    ServiceNotFound {
        service_type: String,
        provider: String,
    },

    // ========================================================================
    // Resolution Failures
    // ========================================================================
    #[error("Cyclic dependency detected: {}", format_cycle(cycle))]
    CyclicDependency { cycle: Vec<String> },
}

fn format_cycle(cycle: &[String]) -> String {
    match cycle.first() {
        Some(first) => format!("{} → {first}", cycle.join(" → ")),
        None => "expansion did not reach a fixed point".into(),
    }
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidIdentifier { .. } | Self::InvalidPattern { .. } => vec![
                "Services are written as type:provider, e.g. database:postgresql".into(),
                "Tags are appended with '+', e.g. database:postgresql+multi-tenant".into(),
            ],
            Self::ServiceNotFound {
                service_type,
                provider,
            } => vec![
                format!("'{provider}' is not a known {service_type} provider"),
                format!("Try: stackweave list services --type {service_type}"),
            ],
            Self::CyclicDependency { cycle } if !cycle.is_empty() => vec![
                "The catalog declares services that depend on each other".into(),
                format!("Break the cycle between: {}", cycle.join(", ")),
            ],
            Self::CyclicDependency { .. } => vec![
                "Dependency expansion did not settle; the catalog likely contains a cycle".into(),
            ],
            Self::InvalidPenaltyTable(_) => vec![
                "Penalties must lie between 0 and 100".into(),
                "Check the [scoring] section of your configuration".into(),
            ],
            Self::InvalidRequirements(msg) => vec![
                format!("Details: {msg}"),
                "Try: stackweave recommend --help".into(),
            ],
            Self::UnknownValue { field, .. } => {
                vec![format!("Run with --help to see accepted values for {field}")]
            }
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidIdentifier { .. }
            | Self::InvalidPattern { .. }
            | Self::InvalidRequirements(_)
            | Self::UnknownValue { .. } => ErrorCategory::Validation,
            Self::CyclicDependency { .. } => ErrorCategory::Compatibility,
            Self::ServiceNotFound { .. } => ErrorCategory::NotFound,
            Self::InvalidPenaltyTable(_) => ErrorCategory::Configuration,
            Self::InvalidTemplate { .. }
            | Self::DuplicateService { .. }
            | Self::InvalidBundle { .. }
            | Self::DuplicateBundle { .. } => ErrorCategory::Internal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Compatibility,
    NotFound,
    Configuration,
    Internal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_message_closes_the_loop() {
        let err = DomainError::CyclicDependency {
            cycle: vec!["svc:a".into(), "svc:b".into()],
        };
        assert_eq!(
            err.to_string(),
            "Cyclic dependency detected: svc:a → svc:b → svc:a"
        );
    }

    #[test]
    fn not_found_suggests_listing_type() {
        let err = DomainError::ServiceNotFound {
            service_type: "database".into(),
            provider: "oracle".into(),
        };
        assert!(
            err.suggestions()
                .iter()
                .any(|s| s.contains("list services --type database"))
        );
        assert_eq!(err.category(), ErrorCategory::NotFound);
    }
}
