//! Recommendation Service - picks a pre-built bundle for business requirements.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::{
    application::ports::BundleStore,
    domain::{
        BundleRecommender, BusinessRequirements, CompatibilityEvaluator, DomainValidator,
        PenaltyTable, RecommendationOutcome, RuleSet,
    },
    error::StackweaveResult,
};

/// Bundle recommendation use case.
#[derive(Clone)]
pub struct RecommendationService {
    bundles: Arc<dyn BundleStore>,
    rules: Arc<RuleSet>,
    penalties: PenaltyTable,
}

impl RecommendationService {
    pub fn new(bundles: Arc<dyn BundleStore>, rules: Arc<RuleSet>) -> Self {
        Self {
            bundles,
            rules,
            penalties: PenaltyTable::default(),
        }
    }

    pub fn with_penalties(mut self, penalties: PenaltyTable) -> Self {
        self.penalties = penalties;
        self
    }

    /// Recommend a bundle for `requirements`.
    ///
    /// "No eligible bundle" is returned as an outcome, not an error; only
    /// malformed requirements or an unavailable bundle store fail.
    #[instrument(
        skip_all,
        fields(
            users = requirements.expected_users,
            tenants = requirements.expected_tenants,
            budget = %requirements.budget
        )
    )]
    pub fn recommend(
        &self,
        requirements: &BusinessRequirements,
    ) -> StackweaveResult<RecommendationOutcome> {
        DomainValidator::validate_requirements(requirements)?;

        let bundles = self.bundles.snapshot()?;
        let evaluator = CompatibilityEvaluator::new(&self.rules, self.penalties);
        let outcome = BundleRecommender::new(&bundles, evaluator).recommend(requirements)?;

        match &outcome {
            RecommendationOutcome::Recommended(rec) => info!(
                bundle = %rec.bundle.id,
                score = rec.score,
                migration = rec.migration_path.is_some(),
                "Bundle recommended"
            ),
            RecommendationOutcome::NoEligibleBundle { eliminations, .. } => info!(
                eliminated = eliminations.len(),
                "No bundle satisfies the requirements"
            ),
        }
        Ok(outcome)
    }
}
