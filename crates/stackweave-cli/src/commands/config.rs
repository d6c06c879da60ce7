//! `stackweave config`: inspect the effective configuration.

use crate::{
    cli::ConfigCommands,
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Dispatch to the correct config subcommand.
pub fn execute(cmd: ConfigCommands, config: &AppConfig, output: OutputManager) -> CliResult<()> {
    match cmd {
        ConfigCommands::Get { key } => {
            let value = get_config_value(config, &key)?;
            if output.is_json() {
                return output.json("config-get", &serde_json::json!({ key: value }));
            }
            output.print(&value)?;
        }

        ConfigCommands::List => {
            if output.is_json() {
                return output.json("config-list", config);
            }
            output.header("Current Configuration:")?;
            for (key, value) in entries(config)? {
                output.print(&format!("{key} = {value}"))?;
            }
        }

        ConfigCommands::Path => {
            output.print(&AppConfig::config_path().display().to_string())?;
        }
    }

    Ok(())
}

// ── helpers ───────────────────────────────────────────────────────────────────

fn entries(config: &AppConfig) -> CliResult<Vec<(String, String)>> {
    config.entries().map_err(|e| CliError::ConfigError {
        message: format!("{e:#}"),
        source: None,
    })
}

fn get_config_value(config: &AppConfig, key: &str) -> CliResult<String> {
    config
        .get(key)
        .map_err(|e| CliError::ConfigError {
            message: format!("{e:#}"),
            source: None,
        })?
        .ok_or_else(|| CliError::UnknownConfigKey { key: key.to_owned() })
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_known_key() {
        let cfg = AppConfig::default();
        assert_eq!(get_config_value(&cfg, "scoring.error_penalty").unwrap(), "40");
    }

    #[test]
    fn get_unknown_key_is_not_found() {
        let cfg = AppConfig::default();
        let err = get_config_value(&cfg, "does.not.exist").unwrap_err();
        assert!(matches!(err, CliError::UnknownConfigKey { .. }));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn get_no_color_default() {
        let cfg = AppConfig::default();
        assert_eq!(get_config_value(&cfg, "output.no_color").unwrap(), "false");
    }

    #[test]
    fn list_includes_every_section() {
        let keys: Vec<String> = entries(&AppConfig::default())
            .unwrap()
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        for section in ["defaults.", "scoring.", "output."] {
            assert!(keys.iter().any(|k| k.starts_with(section)), "{section}");
        }
    }
}
