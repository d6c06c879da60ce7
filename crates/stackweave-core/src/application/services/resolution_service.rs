//! Resolution Service - the single entry point for resolving a stack.
//!
//! Composes the domain pieces for one call:
//! 1. Snapshot the catalog
//! 2. Expand, cycle-check and order the requested services
//! 3. Evaluate the resolved set (rules, unmet dependencies, declared conflicts)
//! 4. Assemble the renderer-facing plan (injection points, env, post-install)
//!
//! Pure computation over the snapshot: no I/O, no effects. Anything that
//! touches files happens after `resolve` returns.

use std::{collections::HashSet, sync::Arc};

use tracing::{debug, info, instrument, warn};

use crate::{
    application::ports::CatalogStore,
    domain::{
        CompatibilityContext, CompatibilityEvaluator, DependencyResolver, DomainValidator,
        EnvVariable, Evaluation, InjectionStep, PenaltyTable, PostInstallStep, ResolutionResult,
        RuleSet, ServiceCatalog, ServiceIdentifier, ServiceKey,
        evaluator::{declared_conflict_issue, unmet_dependency_issue},
    },
    error::StackweaveResult,
};

/// Resolution Facade.
///
/// Cheap to clone; the catalog store and rule set are shared.
#[derive(Clone)]
pub struct ResolutionService {
    catalog: Arc<dyn CatalogStore>,
    rules: Arc<RuleSet>,
    penalties: PenaltyTable,
}

impl ResolutionService {
    /// Create a resolution service over a catalog store and rule set.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use std::sync::Arc;
    /// use stackweave_core::{application::ResolutionService, domain::RuleSet};
    ///
    /// let service = ResolutionService::new(store, Arc::new(RuleSet::builtin()));
    /// ```
    pub fn new(catalog: Arc<dyn CatalogStore>, rules: Arc<RuleSet>) -> Self {
        Self {
            catalog,
            rules,
            penalties: PenaltyTable::default(),
        }
    }

    pub fn with_penalties(mut self, penalties: PenaltyTable) -> Self {
        self.penalties = penalties;
        self
    }

    pub fn penalties(&self) -> PenaltyTable {
        self.penalties
    }

    /// Resolve `requested` under `context`.
    ///
    /// # Errors
    ///
    /// - malformed identifiers (before anything runs)
    /// - a directly requested service missing from the catalog
    /// - a dependency cycle (no partial order is returned)
    ///
    /// Missing transitive dependencies and incompatibilities are NOT errors;
    /// they are reported in the result.
    #[instrument(
        skip_all,
        fields(
            requested = requested.len(),
            environment = %context.environment,
            load = %context.performance.expected_load
        )
    )]
    pub fn resolve(
        &self,
        requested: &[ServiceIdentifier],
        context: &CompatibilityContext,
    ) -> StackweaveResult<ResolutionResult> {
        DomainValidator::validate_services(requested)?;

        let catalog = self.catalog.snapshot()?;
        debug!(catalog_size = catalog.len(), "Catalog snapshot taken");

        let graph = DependencyResolver::new(&catalog).resolve(requested)?;
        debug!(
            resolved = graph.order.len(),
            implied = graph.implied.len(),
            "Dependencies expanded"
        );
        for missing in &graph.missing {
            warn!(pattern = %missing.pattern, "No catalog service satisfies dependency");
        }

        let evaluator = CompatibilityEvaluator::new(&self.rules, self.penalties);
        let mut issues = evaluator.issues(&graph.order, context);
        issues.extend(graph.missing.iter().map(unmet_dependency_issue));
        issues.extend(
            graph
                .conflicts
                .iter()
                .map(|(a, b)| declared_conflict_issue(a, b)),
        );
        let evaluation = evaluator.summarize(issues);

        let result = ResolutionResult {
            injection_plan: injection_plan(&catalog, &graph.order),
            env_variables: env_variables(&catalog, &graph.order),
            post_install_steps: post_install_steps(&catalog, &graph.order),
            resolved_order: graph.order,
            implied: graph.implied,
            missing: graph
                .missing
                .iter()
                .map(|m| m.pattern.to_identifier())
                .collect(),
            issues: evaluation.issues,
            score: evaluation.score,
            compatible: evaluation.compatible,
            verdict: evaluation.verdict,
        };

        info!(
            score = result.score,
            compatible = result.compatible,
            issues = result.issues.len(),
            "Resolution completed"
        );
        Ok(result)
    }

    /// Evaluate `services` as given, without dependency expansion.
    ///
    /// Services found in the catalog get its capability tags merged in;
    /// unknown services are evaluated with the tags they carry.
    #[instrument(skip_all, fields(services = services.len(), environment = %context.environment))]
    pub fn check(
        &self,
        services: &[ServiceIdentifier],
        context: &CompatibilityContext,
    ) -> StackweaveResult<Evaluation> {
        DomainValidator::validate_services(services)?;
        let catalog = self.catalog.snapshot()?;

        let mut merged: Vec<ServiceIdentifier> = Vec::with_capacity(services.len());
        for service in services {
            match merged.iter_mut().find(|m| *m == service) {
                Some(existing) => existing.tags.extend(service.tags.iter().cloned()),
                None => {
                    let tags = catalog
                        .get(&service.service_type, &service.provider)
                        .map(|t| t.tags.clone())
                        .unwrap_or_default();
                    merged.push(service.clone().with_tags(tags));
                }
            }
        }

        let evaluation =
            CompatibilityEvaluator::new(&self.rules, self.penalties).evaluate(&merged, context);
        info!(
            score = evaluation.score,
            compatible = evaluation.compatible,
            "Compatibility check completed"
        );
        Ok(evaluation)
    }
}

fn injection_plan(catalog: &ServiceCatalog, order: &[ServiceIdentifier]) -> Vec<InjectionStep> {
    order
        .iter()
        .filter_map(|service| {
            let template = catalog.get_by_key(&service.key())?;
            Some(InjectionStep {
                service: service.clone(),
                points: template.injection_points_by_priority(),
            })
        })
        .collect()
}

/// First declaration of a name wins.
fn env_variables(catalog: &ServiceCatalog, order: &[ServiceIdentifier]) -> Vec<EnvVariable> {
    let mut seen = HashSet::new();
    order
        .iter()
        .filter_map(|service| catalog.get_by_key(&service.key()))
        .flat_map(|template| template.env_variables.iter())
        .filter(|var| seen.insert(var.name.clone()))
        .cloned()
        .collect()
}

fn post_install_steps(
    catalog: &ServiceCatalog,
    order: &[ServiceIdentifier],
) -> Vec<PostInstallStep> {
    order
        .iter()
        .filter_map(|service| {
            catalog
                .get_by_key(&ServiceKey::new(&service.service_type, &service.provider))
                .map(|template| (service, template))
        })
        .flat_map(|(service, template)| {
            template.post_install.iter().map(move |command| PostInstallStep {
                service: service.clone(),
                command: command.clone(),
            })
        })
        .collect()
}
