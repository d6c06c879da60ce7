//! Catalog loading errors.

use std::path::PathBuf;

use thiserror::Error;

use stackweave_core::{application::ApplicationError, domain::DomainError, error::StackweaveError};

/// Failures while reading a catalog from disk or from the embedded copy.
#[derive(Debug, Error)]
pub enum CatalogLoadError {
    #[error("catalog directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {origin}: {reason}")]
    Parse { origin: String, reason: String },

    #[error("directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl From<CatalogLoadError> for StackweaveError {
    fn from(err: CatalogLoadError) -> Self {
        match err {
            CatalogLoadError::Domain(e) => e.into(),
            other => ApplicationError::CatalogUnavailable {
                reason: other.to_string(),
            }
            .into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackweave_core::error::ErrorCategory;

    #[test]
    fn io_failures_surface_as_unavailable_catalog() {
        let err: StackweaveError = CatalogLoadError::DirectoryNotFound("nope".into()).into();
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert!(err.to_string().contains("catalog directory not found: nope"));
    }

    #[test]
    fn domain_errors_pass_through() {
        let err: StackweaveError = CatalogLoadError::Domain(DomainError::DuplicateService {
            service: "cache:redis".into(),
        })
        .into();
        assert!(matches!(err, StackweaveError::Domain(_)));
    }
}
