//! Implementation of the `stackweave resolve` command.

use tracing::instrument;

use stackweave_core::domain::ResolutionResult;

use crate::{
    cli::ResolveArgs,
    commands::{Services, render},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

/// Resolve the requested services and print the ordered, evaluated stack.
///
/// Incompatibility is reported, not fatal, unless `--strict` is given.
#[instrument(skip_all, fields(services = args.services.len()))]
pub fn execute(args: ResolveArgs, config: &AppConfig, output: OutputManager) -> CliResult<()> {
    let services = Services::from_config(config)?;
    let context = args.context.to_context(&config.defaults);

    let result = services.resolution.resolve(&args.services, &context)?;

    if output.is_json() {
        output.json("resolve", &result)?;
    } else {
        print_result(&output, &result)?;
    }

    render::enforce_strict(args.strict, result.compatible, result.score, &result.issues)
}

fn print_result(output: &OutputManager, result: &ResolutionResult) -> CliResult<()> {
    output.header("Resolved order:")?;
    for (i, service) in result.resolved_order.iter().enumerate() {
        let implied = if result.implied.contains(service) {
            " (implied)"
        } else {
            ""
        };
        output.print(&format!("  {}. {service}{implied}", i + 1))?;
    }

    for missing in &result.missing {
        output.warning(&format!("No catalog service satisfies {missing}"))?;
    }

    if !result.env_variables.is_empty() {
        output.header("Environment variables:")?;
        for var in &result.env_variables {
            let required = if var.required { "required" } else { "optional" };
            match &var.description {
                Some(desc) => output.print(&format!("  {} ({required}) {desc}", var.name))?,
                None => output.print(&format!("  {} ({required})", var.name))?,
            }
        }
    }

    if !result.post_install_steps.is_empty() {
        output.header("Post-install:")?;
        for step in &result.post_install_steps {
            output.print(&format!("  {}: {}", step.service.id(), step.command))?;
        }
    }

    render::issues(output, &result.issues)?;
    render::verdict(output, result.score, result.verdict)
}
