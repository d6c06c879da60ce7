//! Command handlers. Each one translates parsed arguments into service
//! calls and renders the result; no business logic lives here.

use std::sync::Arc;

use tracing::{debug, info};

use stackweave_adapters::discover;
use stackweave_core::{
    application::{CatalogService, RecommendationService, ResolutionService},
    domain::RuleSet,
};

use crate::{config::AppConfig, error::CliResult};

pub mod check;
pub mod completions;
pub mod config;
pub mod init;
pub mod list;
pub mod recommend;
pub mod render;
pub mod resolve;

/// Application services wired to the discovered catalog.
pub struct Services {
    pub resolution: ResolutionService,
    pub recommendation: RecommendationService,
    pub catalog: CatalogService,
}

impl Services {
    /// Discover and load the catalog, then build every service over it.
    pub fn from_config(config: &AppConfig) -> CliResult<Self> {
        let (loaded, source) = discover(config.catalog.dir.as_deref())?;
        info!(source = %source, "Catalog loaded");

        let penalties = config.penalty_table();
        debug!(?penalties, "Scoring configured");

        let (services, bundles) = loaded.into_stores();
        let rules = Arc::new(RuleSet::builtin());

        Ok(Self {
            resolution: ResolutionService::new(Arc::clone(&services), Arc::clone(&rules))
                .with_penalties(penalties),
            recommendation: RecommendationService::new(Arc::clone(&bundles), rules)
                .with_penalties(penalties),
            catalog: CatalogService::new(services, bundles),
        })
    }
}
