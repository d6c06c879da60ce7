//! Filesystem-based catalog loader.
//!
//! Discovers `*.toml` service manifests and an optional `bundles.json` in a
//! directory tree and turns them into a [`ServiceCatalog`] and a
//! [`BundleCatalog`].
//!
//! # Directory layout expected
//!
//! ```text
//! catalog/
//! ├── services.toml          ← any number of *.toml manifests, any depth
//! ├── payments/
//! │   └── regional.toml
//! └── bundles.json           ← optional, root only
//! ```
//!
//! # Manifest format
//!
//! ```toml
//! [[service]]
//! type         = "payment"
//! provider     = "stripe"
//! version      = "17"               # optional, defaults to 1.0.0
//! description  = "Stripe checkout"  # optional
//! default      = true               # preferred match for `payment:*`
//! tags         = ["hosted"]
//! depends_on   = ["database:*"]
//! conflicts_with = ["payment:lemonsqueezy"]
//! post_install = ["stripe login"]
//!
//! [[service.injection_points]]
//! path     = "src/lib/stripe.ts"
//! priority = 60
//!
//! [[service.env]]
//! name     = "STRIPE_SECRET_KEY"
//! required = true                   # optional, defaults to true
//! ```

use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

use stackweave_core::domain::{
    Bundle, BundleCatalog, BundleCategory, BundleRequirements, BundleServices, Compliance,
    EnvVariable, InjectionPoint, PricingTier, ServiceCatalog, ServiceIdentifier, ServiceKey,
    ServicePattern, ServiceTemplate,
};

use crate::error::CatalogLoadError;

pub const BUNDLES_FILE: &str = "bundles.json";

// ── Manifest types ────────────────────────────────────────────────────────────

/// One `*.toml` manifest file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceManifest {
    #[serde(default)]
    pub service: Vec<ServiceEntry>,
}

/// One `[[service]]` table.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceEntry {
    #[serde(rename = "type")]
    pub service_type: String,
    pub provider: String,
    pub version: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub default: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub depends_on: Vec<ServicePattern>,
    #[serde(default)]
    pub conflicts_with: Vec<ServicePattern>,
    #[serde(default)]
    pub injection_points: Vec<InjectionPoint>,
    #[serde(default)]
    pub env: Vec<EnvVariable>,
    #[serde(default)]
    pub post_install: Vec<String>,
}

impl ServiceEntry {
    fn into_template(self) -> Result<ServiceTemplate, CatalogLoadError> {
        let mut builder = ServiceTemplate::builder(self.service_type, self.provider)
            .description(self.description)
            .default_for_type(self.default);
        if let Some(version) = self.version {
            builder = builder.version(version);
        }
        for tag in self.tags {
            builder = builder.tag(tag);
        }
        for pattern in self.depends_on {
            builder = builder.depends_on(pattern);
        }
        for pattern in self.conflicts_with {
            builder = builder.conflicts_with(pattern);
        }
        for point in self.injection_points {
            builder = builder.injection_point(point.path, point.priority);
        }
        for var in self.env {
            builder = builder.env(var);
        }
        for step in self.post_install {
            builder = builder.post_install(step);
        }
        Ok(builder.build()?)
    }
}

/// One entry of `bundles.json`. Services are written in identifier syntax.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BundleEntry {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    category: BundleCategory,
    services: BundleServicesEntry,
    requirements: BundleRequirements,
    pricing_tier: PricingTier,
    #[serde(default)]
    features: Vec<String>,
    #[serde(default)]
    compliance: Vec<Compliance>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BundleServicesEntry {
    core: Vec<String>,
    #[serde(default)]
    optional: Vec<String>,
}

impl BundleEntry {
    fn into_bundle(self) -> Result<Bundle, CatalogLoadError> {
        let parse = |list: Vec<String>| -> Result<Vec<ServiceIdentifier>, CatalogLoadError> {
            list.iter()
                .map(|s| ServiceIdentifier::parse(s).map_err(CatalogLoadError::from))
                .collect()
        };
        Ok(Bundle {
            id: self.id,
            name: self.name,
            description: self.description,
            category: self.category,
            services: BundleServices {
                core: parse(self.services.core)?,
                optional: parse(self.services.optional)?,
            },
            requirements: self.requirements,
            pricing_tier: self.pricing_tier,
            features: self.features.into_iter().collect(),
            compliance: self.compliance.into_iter().collect(),
        })
    }
}

// ── Parsing ───────────────────────────────────────────────────────────────────

/// Parse one TOML manifest. `origin` names the source in error messages.
pub fn parse_manifest(raw: &str, origin: &str) -> Result<Vec<ServiceTemplate>, CatalogLoadError> {
    let manifest: ServiceManifest = toml::from_str(raw).map_err(|e| CatalogLoadError::Parse {
        origin: origin.to_string(),
        reason: e.to_string(),
    })?;
    manifest
        .service
        .into_iter()
        .map(ServiceEntry::into_template)
        .collect()
}

/// Parse a `bundles.json` document.
pub fn parse_bundles(raw: &str, origin: &str) -> Result<BundleCatalog, CatalogLoadError> {
    let entries: Vec<BundleEntry> =
        serde_json::from_str(raw).map_err(|e| CatalogLoadError::Parse {
            origin: origin.to_string(),
            reason: e.to_string(),
        })?;
    let bundles = entries
        .into_iter()
        .map(BundleEntry::into_bundle)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(BundleCatalog::new(bundles)?)
}

/// Build a catalog, keeping the first template seen for each identity.
pub fn catalog_from_templates(
    templates: Vec<ServiceTemplate>,
) -> Result<ServiceCatalog, CatalogLoadError> {
    let mut seen: HashSet<ServiceKey> = HashSet::new();
    let unique: Vec<ServiceTemplate> = templates
        .into_iter()
        .filter(|t| {
            let fresh = seen.insert(t.key());
            if !fresh {
                warn!(service = %t.key(), "duplicate service definition ignored");
            }
            fresh
        })
        .collect();
    Ok(ServiceCatalog::from_templates(unique)?)
}

// ── Loader ────────────────────────────────────────────────────────────────────

/// Service and bundle catalogs read from one source.
#[derive(Debug, Clone)]
pub struct LoadedCatalog {
    pub services: ServiceCatalog,
    pub bundles: BundleCatalog,
}

/// Loads catalogs from a directory of manifests.
///
/// Manifests that fail to parse or validate emit a `WARN` log and are
/// skipped; they do not prevent other manifests from loading.
///
/// # Example
///
/// ```no_run
/// use stackweave_adapters::FilesystemCatalogLoader;
///
/// let loaded = FilesystemCatalogLoader::new("./catalog").load()?;
/// println!("Loaded {} services", loaded.services.len());
/// # Ok::<(), stackweave_adapters::CatalogLoadError>(())
/// ```
pub struct FilesystemCatalogLoader {
    catalog_dir: PathBuf,
}

impl FilesystemCatalogLoader {
    pub fn new(catalog_dir: impl Into<PathBuf>) -> Self {
        Self {
            catalog_dir: catalog_dir.into(),
        }
    }

    pub fn catalog_dir(&self) -> &Path {
        &self.catalog_dir
    }

    /// Load every valid manifest under the catalog directory.
    ///
    /// # Errors
    ///
    /// - the directory does not exist or cannot be walked
    /// - `bundles.json` exists but cannot be read or parsed
    #[instrument(skip(self), fields(dir = %self.catalog_dir.display()))]
    pub fn load(&self) -> Result<LoadedCatalog, CatalogLoadError> {
        if !self.catalog_dir.is_dir() {
            return Err(CatalogLoadError::DirectoryNotFound(self.catalog_dir.clone()));
        }

        let mut templates = Vec::new();
        for entry in WalkDir::new(&self.catalog_dir).sort_by_file_name() {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type().is_file() || path.extension().is_none_or(|e| e != "toml") {
                continue;
            }

            match self.load_manifest(path) {
                Ok(loaded) => {
                    debug!(path = %path.display(), count = loaded.len(), "loaded manifest");
                    templates.extend(loaded);
                }
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "skipping manifest due to load error"
                    );
                }
            }
        }

        let services = catalog_from_templates(templates)?;
        let bundles = self.load_bundles()?;

        info!(
            services = services.len(),
            bundles = bundles.len(),
            "catalog loaded"
        );
        Ok(LoadedCatalog { services, bundles })
    }

    fn load_manifest(&self, path: &Path) -> Result<Vec<ServiceTemplate>, CatalogLoadError> {
        let raw = read(path)?;
        parse_manifest(&raw, &path.display().to_string())
    }

    fn load_bundles(&self) -> Result<BundleCatalog, CatalogLoadError> {
        let path = self.catalog_dir.join(BUNDLES_FILE);
        if !path.is_file() {
            debug!(path = %path.display(), "no bundle catalog, using an empty one");
            return Ok(BundleCatalog::default());
        }
        let raw = read(&path)?;
        parse_bundles(&raw, &path.display().to_string())
    }
}

fn read(path: &Path) -> Result<String, CatalogLoadError> {
    fs::read_to_string(path).map_err(|source| CatalogLoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}
