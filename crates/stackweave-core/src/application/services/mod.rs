//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish
//! high-level use cases like "resolve a stack" or "recommend a bundle".

pub mod catalog_service;
pub mod recommendation_service;
pub mod resolution_service;

pub use catalog_service::CatalogService;
pub use recommendation_service::RecommendationService;
pub use resolution_service::ResolutionService;
