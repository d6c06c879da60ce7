//! Stackweave Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for Stackweave,
//! a service dependency resolution and compatibility engine, following
//! hexagonal (ports and adapters) architecture.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │         stackweave-cli (CLI)            │
//! │     (Drives the application layer)      │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │  (ResolutionService, Recommendation-    │
//! │   Service, CatalogService)              │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │       (CatalogStore, BundleStore)       │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │   stackweave-adapters (Infrastructure)  │
//! │ (InMemoryCatalogStore, catalog loader)  │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │ (DependencyResolver, RuleSet, Evaluator,│
//! │  BundleRecommender)                     │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use stackweave_core::prelude::*;
//!
//! // 1. Requested services
//! let requested = vec![
//!     ServiceIdentifier::parse("payment:stripe")?,
//!     ServiceIdentifier::parse("auth:better-auth")?,
//! ];
//!
//! // 2. Use application service (with an injected catalog store)
//! let service = ResolutionService::new(store, Arc::new(RuleSet::builtin()));
//! let result = service.resolve(&requested, &CompatibilityContext::production())?;
//! println!("{} ({}/100)", result.verdict, result.score);
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        CatalogService, RecommendationService, ResolutionService,
        ports::{BundleStore, CatalogStore},
    };
    pub use crate::domain::{
        Bundle, BundleCatalog, BusinessRequirements, CompatibilityContext, CompatibilityIssue,
        Environment, Evaluation, ExpectedLoad, PenaltyTable, RecommendationOutcome,
        ResolutionResult, RuleSet, ServiceCatalog, ServiceIdentifier, ServicePattern,
        ServiceTemplate, Severity, Verdict,
    };
    pub use crate::error::{StackweaveError, StackweaveResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
