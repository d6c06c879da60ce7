//! Implementation of the `stackweave check` command.

use tracing::instrument;

use crate::{
    cli::ResolveArgs,
    commands::{Services, render},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

/// Evaluate the services exactly as given; dependencies are not expanded.
#[instrument(skip_all, fields(services = args.services.len()))]
pub fn execute(args: ResolveArgs, config: &AppConfig, output: OutputManager) -> CliResult<()> {
    let services = Services::from_config(config)?;
    let context = args.context.to_context(&config.defaults);

    let evaluation = services.resolution.check(&args.services, &context)?;

    if output.is_json() {
        output.json("check", &evaluation)?;
    } else {
        let names: Vec<String> = args.services.iter().map(ToString::to_string).collect();
        output.header(&format!("Checking {}", names.join(", ")))?;
        render::issues(&output, &evaluation.issues)?;
        render::verdict(&output, evaluation.score, evaluation.verdict)?;
    }

    render::enforce_strict(
        args.strict,
        evaluation.compatible,
        evaluation.score,
        &evaluation.issues,
    )
}
