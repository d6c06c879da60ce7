//! Application layer errors.
//!
//! These errors represent failures in orchestration, not business logic.
//! Business logic errors are `DomainError` from `crate::domain`.

use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur during application orchestration.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// Catalog lock poisoned by a panicking writer.
    #[error("Service catalog lock error")]
    CatalogLockError,

    /// A store could not produce a catalog.
    #[error("Catalog unavailable: {reason}")]
    CatalogUnavailable { reason: String },

    /// Validation failed (application-level, not domain).
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::CatalogLockError => vec![
                "The service catalog is locked".into(),
                "Try again in a moment".into(),
            ],
            Self::CatalogUnavailable { reason } => vec![
                format!("Catalog could not be loaded: {reason}"),
                "Check catalog.dir in your configuration or STACKWEAVE_CATALOG_DIR".into(),
            ],
            Self::ValidationFailed(_) => vec!["Check the error details above".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::CatalogLockError => ErrorCategory::Internal,
            Self::CatalogUnavailable { .. } => ErrorCategory::Configuration,
            Self::ValidationFailed(_) => ErrorCategory::Validation,
        }
    }
}
