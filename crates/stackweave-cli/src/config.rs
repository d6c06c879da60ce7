//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value. The
//! CLI layer owns config; the core crate never sees it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. Environment variables: `STACKWEAVE__SECTION__KEY`
//!    (e.g. `STACKWEAVE__SCORING__ERROR_PENALTY=50`)
//! 3. Config file (`--config FILE`, or `config.toml` in the platform config dir)
//! 4. Built-in defaults (always present)

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use config::{Config, Environment as EnvSource, File, FileFormat};
use serde::{Deserialize, Serialize};

use stackweave_core::domain::{DomainError, Environment, ExpectedLoad, PenaltyTable, Severity};

use crate::cli::OutputFormat;

const ENV_PREFIX: &str = "STACKWEAVE";

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Context used when `resolve`/`check` flags are omitted.
    pub defaults: Defaults,
    /// Issue penalties used for compatibility scores.
    pub scoring: ScoringConfig,
    /// Where service manifests are read from.
    pub catalog: CatalogConfig,
    /// Output settings.
    pub output: OutputConfig,
    /// Log file settings.
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    pub environment: Environment,
    pub expected_load: ExpectedLoad,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub error_penalty: u8,
    pub warning_penalty: u8,
    pub info_penalty: u8,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        let defaults = PenaltyTable::default();
        Self {
            error_penalty: defaults.penalty(Severity::Error),
            warning_penalty: defaults.penalty(Severity::Warning),
            info_penalty: defaults.penalty(Severity::Info),
        }
    }
}

impl ScoringConfig {
    /// # Errors
    ///
    /// `InvalidPenaltyTable` when a penalty is above 100.
    pub fn penalty_table(&self) -> Result<PenaltyTable, DomainError> {
        PenaltyTable::new(self.error_penalty, self.warning_penalty, self.info_penalty)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Also write logs to this file (never rotated).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration: defaults, then the config file, then the
    /// environment.
    ///
    /// `config_file` is the path passed via `--config`; it must exist. Without
    /// it the default location is read when present.
    pub fn load(config_file: Option<&Path>) -> anyhow::Result<Self> {
        Self::load_with_env(config_file, None)
    }

    /// `env` replaces the process environment as the variable source; tests
    /// use it to avoid mutating global state.
    fn load_with_env(
        config_file: Option<&Path>,
        env: Option<config::Map<String, String>>,
    ) -> anyhow::Result<Self> {
        let (path, required) = match config_file {
            Some(path) => (path.to_path_buf(), true),
            None => (Self::config_path(), false),
        };

        let settings = Config::builder()
            .add_source(
                Config::try_from(&Self::default()).context("Failed to serialize defaults")?,
            )
            .add_source(
                File::from(path.as_path())
                    .format(FileFormat::Toml)
                    .required(required),
            )
            .add_source(
                EnvSource::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()
            .with_context(|| format!("Failed to read configuration from {}", path.display()))?;

        let config: Self = settings
            .try_deserialize()
            .context("Invalid configuration")?;

        config
            .scoring
            .penalty_table()
            .context("Invalid [scoring] section")?;

        Ok(config)
    }

    /// Path to the default configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.stackweave.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("dev", "stackweave", "stackweave")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".stackweave.toml"))
    }

    /// Penalty table for the core services. Validated during [`Self::load`].
    pub fn penalty_table(&self) -> PenaltyTable {
        self.scoring.penalty_table().unwrap_or_default()
    }

    /// Render as a TOML document, as written by `stackweave init`.
    pub fn to_toml(&self) -> anyhow::Result<String> {
        toml::to_string_pretty(self).context("Failed to render configuration as TOML")
    }

    /// Every leaf setting as `(dotted.key, value)`, sorted by key.
    pub fn entries(&self) -> anyhow::Result<Vec<(String, String)>> {
        let value = serde_json::to_value(self).context("Failed to inspect configuration")?;
        let mut entries = Vec::new();
        flatten("", &value, &mut entries);
        entries.sort();
        Ok(entries)
    }

    /// Look up one dotted key (e.g. `scoring.error_penalty`).
    ///
    /// Unset optional keys report as an empty string.
    pub fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        if let Some((_, value)) = self.entries()?.into_iter().find(|(k, _)| k == key) {
            return Ok(Some(value));
        }
        let known_optional = matches!(key, "catalog.dir" | "logging.file");
        Ok(known_optional.then(String::new))
    }
}

fn flatten(prefix: &str, value: &serde_json::Value, out: &mut Vec<(String, String)>) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten(&path, child, out);
            }
        }
        serde_json::Value::String(s) => out.push((prefix.to_owned(), s.clone())),
        serde_json::Value::Null => out.push((prefix.to_owned(), String::new())),
        other => out.push((prefix.to_owned(), other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> Option<config::Map<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect(),
        )
    }

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_match_builtin_penalties() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.penalty_table(), PenaltyTable::default());
        assert_eq!(cfg.defaults.environment, Environment::Development);
        assert!(!cfg.output.no_color);
    }

    #[test]
    fn missing_default_file_yields_defaults() {
        let cfg = AppConfig::load_with_env(None, env(&[])).unwrap();
        assert_eq!(cfg.scoring, ScoringConfig::default());
    }

    #[test]
    fn explicit_file_must_exist() {
        let err = AppConfig::load_with_env(Some(Path::new("/no/such/stackweave.toml")), env(&[]));
        assert!(err.is_err());
    }

    #[test]
    fn file_overrides_defaults() {
        let file = write_config(
            r#"
[defaults]
environment = "production"
expected_load = "high"

[scoring]
error_penalty = 50

[catalog]
dir = "/srv/catalog"
"#,
        );
        let cfg = AppConfig::load_with_env(Some(file.path()), env(&[])).unwrap();
        assert_eq!(cfg.defaults.environment, Environment::Production);
        assert_eq!(cfg.defaults.expected_load, ExpectedLoad::High);
        assert_eq!(cfg.scoring.error_penalty, 50);
        assert_eq!(cfg.scoring.warning_penalty, 15);
        assert_eq!(cfg.catalog.dir, Some(PathBuf::from("/srv/catalog")));
    }

    #[test]
    fn environment_overrides_file() {
        let file = write_config("[scoring]\nerror_penalty = 50\n");
        let cfg = AppConfig::load_with_env(
            Some(file.path()),
            env(&[
                ("STACKWEAVE__SCORING__ERROR_PENALTY", "60"),
                ("STACKWEAVE__OUTPUT__NO_COLOR", "true"),
            ]),
        )
        .unwrap();
        assert_eq!(cfg.scoring.error_penalty, 60);
        assert!(cfg.output.no_color);
    }

    #[test]
    fn out_of_range_penalty_is_rejected() {
        let file = write_config("[scoring]\ninfo_penalty = 101\n");
        let err = AppConfig::load_with_env(Some(file.path()), env(&[])).unwrap_err();
        assert!(format!("{err:#}").contains("scoring"));
    }

    #[test]
    fn toml_output_parses_back() {
        let rendered = AppConfig::default().to_toml().unwrap();
        assert!(rendered.contains("[scoring]"));
        let parsed: AppConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, AppConfig::default());
    }

    #[test]
    fn entries_use_dotted_keys() {
        let entries = AppConfig::default().entries().unwrap();
        assert!(entries.contains(&("scoring.error_penalty".into(), "40".into())));
        assert!(entries.contains(&("defaults.environment".into(), "development".into())));
        assert!(entries.contains(&("output.format".into(), "auto".into())));
    }

    #[test]
    fn get_known_and_unknown_keys() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.get("scoring.info_penalty").unwrap().as_deref(), Some("3"));
        assert_eq!(cfg.get("catalog.dir").unwrap().as_deref(), Some(""));
        assert_eq!(cfg.get("nope.nothing").unwrap(), None);
    }

    #[test]
    fn config_path_is_not_empty() {
        assert!(!AppConfig::config_path().as_os_str().is_empty());
    }
}
