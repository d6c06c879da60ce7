//! Bundle recommendation.
//!
//! 1. **Filter** by budget tier, minimum team size and compliance coverage.
//! 2. **Evaluate** each survivor's `core ∪ optional` services under a context
//!    synthesized from the requirements; incompatible bundles are dropped.
//! 3. **Rank** by `0.5 * feature coverage + 0.3 * compatibility + 0.2 *
//!    inverse price`; ties go to the cheaper tier, then the lower id.
//! 4. **Migrate**: when existing infrastructure is used by another bundle but
//!    not by the winner, attach an advisory migration path.
//!
//! Every eliminated bundle is reported with the constraint that removed it.

use std::cmp::Ordering;

use crate::domain::{
    DomainError,
    catalog::BundleCatalog,
    entities::{
        Bundle, BusinessRequirements, CompatibilityContext, Elimination, Evaluation,
        MigrationPath, MigrationStep, MultiTenancy, Recommendation, RecommendationOutcome,
        ServiceIdentifier,
    },
    evaluator::{CompatibilityEvaluator, MAX_SCORE},
    value_objects::{
        ExpectedLoad, IsolationLevel, PricingTier, RiskLevel, TenancyStrategy, Timeline,
    },
};

const FEATURE_WEIGHT: f64 = 0.5;
const COMPATIBILITY_WEIGHT: f64 = 0.3;
const PRICE_WEIGHT: f64 = 0.2;

#[derive(Debug, Clone, Copy)]
pub struct BundleRecommender<'a> {
    bundles: &'a BundleCatalog,
    evaluator: CompatibilityEvaluator<'a>,
}

struct Candidate<'a> {
    bundle: &'a Bundle,
    evaluation: Evaluation,
    coverage: f64,
    score: f64,
}

impl<'a> BundleRecommender<'a> {
    pub fn new(bundles: &'a BundleCatalog, evaluator: CompatibilityEvaluator<'a>) -> Self {
        Self { bundles, evaluator }
    }

    /// # Errors
    ///
    /// Only `InvalidRequirements` for malformed input. "No eligible bundle"
    /// is a normal outcome.
    pub fn recommend(
        &self,
        requirements: &BusinessRequirements,
    ) -> Result<RecommendationOutcome, DomainError> {
        requirements.validate()?;
        let context = synthesize_context(requirements);

        let mut eliminations = Vec::new();
        let mut candidates = Vec::new();

        for bundle in self.bundles.iter() {
            if let Some(elimination) = filter(bundle, requirements) {
                eliminations.push(elimination);
                continue;
            }

            let evaluation = self.evaluator.evaluate(&bundle.all_services(), &context);
            if !evaluation.compatible {
                let rules: Vec<&str> = evaluation
                    .issues
                    .iter()
                    .filter(|i| i.is_error())
                    .map(|i| i.rule_id.as_str())
                    .collect();
                eliminations.push(Elimination {
                    bundle_id: bundle.id.clone(),
                    constraint: "compatibility".into(),
                    reason: format!(
                        "incompatible with the required deployment ({})",
                        rules.join(", ")
                    ),
                });
                continue;
            }

            let coverage = feature_coverage(bundle, requirements);
            let score = weighted_score(coverage, evaluation.score, bundle.pricing_tier);
            candidates.push(Candidate {
                bundle,
                evaluation,
                coverage,
                score,
            });
        }

        candidates.sort_by(rank);

        let Some(winner) = candidates.first() else {
            return Ok(no_eligible_bundle(self.bundles.is_empty(), eliminations));
        };

        let reasoning = explain(winner, requirements, &context, &candidates, &eliminations);
        let migration_path = self.migration_path(winner.bundle, requirements);

        Ok(RecommendationOutcome::Recommended(Recommendation {
            bundle: winner.bundle.clone(),
            score: winner.score,
            compatibility_score: winner.evaluation.score,
            reasoning,
            migration_path,
        }))
    }

    /// First existing provider the winner drops that another bundle keeps.
    fn migration_path(
        &self,
        winner: &Bundle,
        requirements: &BusinessRequirements,
    ) -> Option<MigrationPath> {
        requirements
            .technical_constraints
            .existing_infrastructure
            .iter()
            .filter(|provider| !winner.uses_provider(provider))
            .find_map(|provider| {
                let source = self
                    .bundles
                    .iter()
                    .find(|b| b.id != winner.id && b.uses_provider(provider))?;
                let from = source
                    .all_services()
                    .into_iter()
                    .find(|s| &s.provider == provider)?;
                let to = winner
                    .all_services()
                    .into_iter()
                    .find(|s| s.service_type == from.service_type)?;
                Some(build_migration(from, to, &source.id))
            })
    }
}

/// Deployment context implied by business requirements.
pub fn synthesize_context(requirements: &BusinessRequirements) -> CompatibilityContext {
    let load = ExpectedLoad::from_users(requirements.expected_users);
    let mut context = CompatibilityContext::production().with_load(load);

    if requirements.expected_tenants > 1 {
        let isolation = if requirements.compliance.is_empty() {
            IsolationLevel::Standard
        } else {
            IsolationLevel::Strict
        };
        let max_tenants = u32::try_from(requirements.expected_tenants).unwrap_or(u32::MAX);
        context = context.with_multi_tenancy(
            MultiTenancy::new(TenancyStrategy::RowLevelSecurity)
                .isolation(isolation)
                .max_tenants(max_tenants),
        );
    }

    context.scaling.horizontal = load.is_heavy();
    context.compliance = requirements.compliance.clone();
    context
}

fn filter(bundle: &Bundle, requirements: &BusinessRequirements) -> Option<Elimination> {
    let eliminate = |constraint: &str, reason: String| {
        Some(Elimination {
            bundle_id: bundle.id.clone(),
            constraint: constraint.to_string(),
            reason,
        })
    };

    if bundle.requirements.budget > requirements.budget {
        return eliminate(
            "budget",
            format!(
                "needs a {} budget, above the available {}",
                bundle.requirements.budget, requirements.budget
            ),
        );
    }
    if bundle.requirements.team_size > requirements.team_size {
        return eliminate(
            "team-size",
            format!(
                "needs at least a {} team, the team is {}",
                bundle.requirements.team_size, requirements.team_size
            ),
        );
    }
    if !bundle.covers(&requirements.compliance) {
        let uncovered: Vec<&str> = requirements
            .compliance
            .iter()
            .filter(|c| !bundle.compliance.contains(*c))
            .map(|c| c.as_str())
            .collect();
        return eliminate(
            "compliance",
            format!("does not cover {}", uncovered.join(", ")),
        );
    }
    None
}

fn feature_coverage(bundle: &Bundle, requirements: &BusinessRequirements) -> f64 {
    if requirements.features.is_empty() {
        return 1.0;
    }
    let covered = requirements
        .features
        .iter()
        .filter(|f| bundle.has_feature(f))
        .count();
    covered as f64 / requirements.features.len() as f64
}

fn weighted_score(coverage: f64, compatibility: u8, pricing: PricingTier) -> f64 {
    let compatibility = f64::from(compatibility) / f64::from(MAX_SCORE);
    let inverse_price = 1.0 - f64::from(pricing.ordinal()) / f64::from(PricingTier::MAX_ORDINAL);
    FEATURE_WEIGHT * coverage + COMPATIBILITY_WEIGHT * compatibility + PRICE_WEIGHT * inverse_price
}

/// Highest score first, then cheapest tier, then id.
fn rank(a: &Candidate<'_>, b: &Candidate<'_>) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.bundle.pricing_tier.cmp(&b.bundle.pricing_tier))
        .then_with(|| a.bundle.id.cmp(&b.bundle.id))
}

fn explain(
    winner: &Candidate<'_>,
    requirements: &BusinessRequirements,
    context: &CompatibilityContext,
    candidates: &[Candidate<'_>],
    eliminations: &[Elimination],
) -> Vec<String> {
    let bundle = winner.bundle;
    let mut reasoning = vec![format!(
        "{} fits a {} budget and a {} team (needs {} / {})",
        bundle.name,
        requirements.budget,
        requirements.team_size,
        bundle.requirements.budget,
        bundle.requirements.team_size
    )];

    if requirements.features.is_empty() {
        reasoning.push("No specific features requested".into());
    } else {
        let missing: Vec<&str> = requirements
            .features
            .iter()
            .filter(|f| !bundle.has_feature(f))
            .map(String::as_str)
            .collect();
        let covered = requirements.features.len() - missing.len();
        let mut line = format!(
            "Covers {covered} of {} requested features ({:.0}%)",
            requirements.features.len(),
            winner.coverage * 100.0
        );
        if !missing.is_empty() {
            line.push_str(&format!("; not included: {}", missing.join(", ")));
        }
        reasoning.push(line);
    }

    reasoning.push(format!(
        "Compatibility score {}/100 at {} load in {}",
        winner.evaluation.score, context.performance.expected_load, context.environment
    ));

    if !requirements.compliance.is_empty() {
        let flags: Vec<&str> = requirements.compliance.iter().map(|c| c.as_str()).collect();
        reasoning.push(format!("Covers required compliance: {}", flags.join(", ")));
    }

    if let Some(tenancy) = context.multi_tenancy {
        reasoning.push(format!(
            "Sized for {} tenants with {} isolation",
            tenancy.max_tenants, tenancy.isolation
        ));
    }

    if let Some(runner_up) = candidates.get(1) {
        reasoning.push(format!(
            "Ranked above {} ({:.2} vs {:.2})",
            runner_up.bundle.id, winner.score, runner_up.score
        ));
    }

    if !eliminations.is_empty() {
        reasoning.push(format!(
            "{} other bundle(s) eliminated by budget, team, compliance or compatibility",
            eliminations.len()
        ));
    }

    if requirements.timeline == Timeline::Urgent && !bundle.services.optional.is_empty() {
        reasoning.push("Urgent timeline: start with the core services and add optional ones later".into());
    }

    reasoning
}

fn no_eligible_bundle(catalog_empty: bool, eliminations: Vec<Elimination>) -> RecommendationOutcome {
    let reasoning = if catalog_empty {
        vec!["The bundle catalog is empty".to_string()]
    } else {
        std::iter::once("No bundle satisfies every requirement".to_string())
            .chain(
                eliminations
                    .iter()
                    .map(|e| format!("{}: {} ({})", e.bundle_id, e.reason, e.constraint)),
            )
            .collect()
    };
    RecommendationOutcome::NoEligibleBundle {
        reasoning,
        eliminations,
    }
}

fn build_migration(from: ServiceIdentifier, to: ServiceIdentifier, source: &str) -> MigrationPath {
    let (from_id, to_id) = (from.id(), to.id());
    let cut_over_risk = if from.is_type("database") {
        RiskLevel::High
    } else {
        RiskLevel::Medium
    };

    let steps = vec![
        MigrationStep {
            title: "Export".into(),
            description: format!("Export schema and data from {from_id}"),
            risk: RiskLevel::Low,
            reversible: true,
        },
        MigrationStep {
            title: "Provision".into(),
            description: format!("Provision {to_id} alongside the existing {from_id}"),
            risk: RiskLevel::Low,
            reversible: true,
        },
        MigrationStep {
            title: "Migrate".into(),
            description: format!("Import the export into {to_id} and verify record counts"),
            risk: RiskLevel::Medium,
            reversible: true,
        },
        MigrationStep {
            title: "Cut over".into(),
            description: format!("Point the application at {to_id} and retire {from_id}"),
            risk: cut_over_risk,
            reversible: false,
        },
    ];
    let risk = steps
        .iter()
        .map(|s| s.risk)
        .max()
        .unwrap_or(RiskLevel::Low);

    MigrationPath {
        from,
        to,
        source_bundle: source.to_string(),
        steps,
        risk,
    }
}
