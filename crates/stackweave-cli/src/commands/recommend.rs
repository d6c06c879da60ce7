//! Implementation of the `stackweave recommend` command.

use tracing::{info, instrument};

use stackweave_core::{
    domain::{Recommendation, RecommendationOutcome},
    error::StackweaveError,
};

use crate::{
    cli::RecommendArgs,
    commands::Services,
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

/// Recommend a bundle. Finding no eligible bundle is a normal outcome and
/// exits 0 with the eliminations listed.
#[instrument(skip_all, fields(users = args.users, tenants = args.tenants))]
pub fn execute(args: RecommendArgs, config: &AppConfig, output: OutputManager) -> CliResult<()> {
    let requirements = args.to_requirements().map_err(StackweaveError::from)?;
    let services = Services::from_config(config)?;

    let spinner = output.spinner("Evaluating bundles...");
    let outcome = services.recommendation.recommend(&requirements);
    if let Some(bar) = spinner {
        bar.finish_and_clear();
    }
    let outcome = outcome?;

    if output.is_json() {
        return output.json("recommend", &outcome);
    }

    match &outcome {
        RecommendationOutcome::Recommended(rec) => print_recommendation(&output, rec)?,
        RecommendationOutcome::NoEligibleBundle {
            reasoning,
            eliminations,
        } => {
            info!(eliminated = eliminations.len(), "No eligible bundle");
            output.warning("No bundle satisfies these requirements")?;
            for line in reasoning {
                output.print(&format!("  {line}"))?;
            }
            output.header("Eliminated:")?;
            for elimination in eliminations {
                output.print(&format!(
                    "  {} [{}] {}",
                    elimination.bundle_id, elimination.constraint, elimination.reason
                ))?;
            }
        }
    }
    Ok(())
}

fn print_recommendation(output: &OutputManager, rec: &Recommendation) -> CliResult<()> {
    output.success(&format!(
        "Recommended: {} ({})",
        rec.bundle.name, rec.bundle.id
    ))?;
    output.print(&format!(
        "  Score {:.1}, compatibility {}/100, pricing {}",
        rec.score, rec.compatibility_score, rec.bundle.pricing_tier
    ))?;

    output.header("Services:")?;
    for service in &rec.bundle.services.core {
        output.print(&format!("  {service}"))?;
    }
    for service in &rec.bundle.services.optional {
        output.print(&format!("  {service} (optional)"))?;
    }

    output.header("Reasoning:")?;
    for line in &rec.reasoning {
        output.print(&format!("  - {line}"))?;
    }

    if let Some(path) = &rec.migration_path {
        output.header(&format!(
            "Migration: {} -> {} (risk {})",
            path.from, path.to, path.risk
        ))?;
        for (i, step) in path.steps.iter().enumerate() {
            let reversible = if step.reversible { "reversible" } else { "one-way" };
            output.print(&format!(
                "  {}. {} [{}, {reversible}] {}",
                i + 1,
                step.title,
                step.risk,
                step.description
            ))?;
        }
    }
    Ok(())
}
