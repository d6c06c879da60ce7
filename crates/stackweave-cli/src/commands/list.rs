//! Implementation of the `stackweave list` command.

use std::collections::BTreeMap;

use stackweave_core::domain::{Bundle, ServiceTemplate};

use crate::{
    cli::ListCommands,
    commands::Services,
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

pub fn execute(cmd: ListCommands, config: &AppConfig, output: OutputManager) -> CliResult<()> {
    let services = Services::from_config(config)?;

    match cmd {
        ListCommands::Services { service_type } => {
            let templates = services.catalog.list_services(service_type.as_deref())?;
            if output.is_json() {
                return output.json("list-services", &templates);
            }
            print_services(&output, &templates)
        }
        ListCommands::Bundles => {
            let bundles = services.catalog.list_bundles()?;
            if output.is_json() {
                return output.json("list-bundles", &bundles);
            }
            print_bundles(&output, &bundles)
        }
    }
}

fn print_services(output: &OutputManager, templates: &[ServiceTemplate]) -> CliResult<()> {
    if templates.is_empty() {
        output.warning("No services match")?;
        return Ok(());
    }

    let mut by_type: BTreeMap<&str, Vec<&ServiceTemplate>> = BTreeMap::new();
    for template in templates {
        by_type
            .entry(template.service_type.as_str())
            .or_default()
            .push(template);
    }

    for (service_type, group) in by_type {
        output.header(&format!("{service_type}:"))?;
        for template in group {
            let default = if template.is_default { " [default]" } else { "" };
            output.print(&format!(
                "  {:<14} {}{default}",
                template.provider, template.description
            ))?;
        }
    }
    Ok(())
}

fn print_bundles(output: &OutputManager, bundles: &[Bundle]) -> CliResult<()> {
    if bundles.is_empty() {
        output.warning("The catalog has no bundles")?;
        return Ok(());
    }
    output.header("Bundles:")?;
    for bundle in bundles {
        let compliance = if bundle.compliance.is_empty() {
            "none".to_owned()
        } else {
            bundle
                .compliance
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        };
        output.print(&format!(
            "  {:<14} {} (budget {}, team {}+, compliance: {compliance})",
            bundle.id, bundle.name, bundle.requirements.budget, bundle.requirements.team_size,
        ))?;
    }
    Ok(())
}
