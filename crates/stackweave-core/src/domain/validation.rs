use crate::domain::{
    entities::{Bundle, BusinessRequirements, ServiceIdentifier, ServiceTemplate},
    error::DomainError,
};

/// Centralized domain validation.
///
/// All validation logic lives here, not scattered across callers. Each check
/// runs before any algorithm touches the input.
pub struct DomainValidator;

impl DomainValidator {
    pub fn validate_services(services: &[ServiceIdentifier]) -> Result<(), DomainError> {
        services.iter().try_for_each(ServiceIdentifier::validate)
    }

    pub fn validate_template(template: &ServiceTemplate) -> Result<(), DomainError> {
        template.validate()
    }

    pub fn validate_bundle(bundle: &Bundle) -> Result<(), DomainError> {
        bundle.validate()
    }

    pub fn validate_requirements(requirements: &BusinessRequirements) -> Result<(), DomainError> {
        requirements.validate()
    }
}
