//! Application configuration for mddocset.
//!
//! The config file lives at `./mddocset.toml` unless another path is given.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DocsetError, Result};

/// Default configuration file name, resolved against the working directory.
pub const CONFIG_FILE_NAME: &str = "mddocset.toml";

// ---------------------------------------------------------------------------
// Config structs (matching mddocset.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Bundle identity and manifest values.
    #[serde(default)]
    pub docset: DocsetConfig,

    /// Input, output, and static asset locations.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Link rewriting.
    #[serde(default)]
    pub links: LinksConfig,

    /// Build execution settings.
    #[serde(default)]
    pub build: BuildSettings,
}

/// `[docset]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocsetConfig {
    /// Docset name: input subdirectory, output bundle directory, display name.
    #[serde(default = "default_name")]
    pub name: String,

    /// Virtual catalog segment under `Documents/` (may be empty).
    #[serde(default = "default_section_prefix")]
    pub section_prefix: String,

    /// `CFBundleIdentifier` value.
    #[serde(default = "default_cheatsheet")]
    pub bundle_identifier: String,

    /// `DocSetPlatformFamily` value.
    #[serde(default = "default_cheatsheet")]
    pub platform_family: String,

    /// `DashDocSetFamily` value.
    #[serde(default = "default_docset_family")]
    pub docset_family: String,

    /// Landing page, relative to the section prefix.
    #[serde(default = "default_index_page")]
    pub index_page: String,
}

impl Default for DocsetConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            section_prefix: default_section_prefix(),
            bundle_identifier: default_cheatsheet(),
            platform_family: default_cheatsheet(),
            docset_family: default_docset_family(),
            index_page: default_index_page(),
        }
    }
}

fn default_name() -> String {
    "redux-form".into()
}
fn default_section_prefix() -> String {
    "api".into()
}
fn default_cheatsheet() -> String {
    "cheatsheet".into()
}
fn default_docset_family() -> String {
    "dashtoc".into()
}
fn default_index_page() -> String {
    "README.html".into()
}

/// `[paths]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Root holding `<name>/<section_prefix>/<section>/*.md`.
    #[serde(default = "default_source_root")]
    pub source_root: PathBuf,

    /// Root under which `<name>/Contents/...` is written.
    #[serde(default = "default_output_root")]
    pub output_root: PathBuf,

    /// Directory holding `header.txt` and `footer.txt`.
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source_root: default_source_root(),
            output_root: default_output_root(),
            static_dir: default_static_dir(),
        }
    }
}

fn default_source_root() -> PathBuf {
    PathBuf::from("source_doc")
}
fn default_output_root() -> PathBuf {
    PathBuf::from("docset")
}
fn default_static_dir() -> PathBuf {
    PathBuf::from("static")
}

/// `[links]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinksConfig {
    /// Documentation site whose absolute `docs/api/*.html` links become relative.
    #[serde(default = "default_site_domain")]
    pub site_domain: String,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            site_domain: default_site_domain(),
        }
    }
}

fn default_site_domain() -> String {
    "redux-form.com".into()
}

/// `[build]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildSettings {
    /// Maximum number of documents processed at once.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
        }
    }
}

fn default_concurrency() -> usize {
    8
}

// ---------------------------------------------------------------------------
// Build config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime build configuration, merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    pub name: String,
    pub section_prefix: String,
    pub bundle_identifier: String,
    pub platform_family: String,
    pub docset_family: String,
    pub index_page: String,
    pub source_root: PathBuf,
    pub output_root: PathBuf,
    pub static_dir: PathBuf,
    pub site_domain: String,
    pub concurrency: usize,
}

impl From<&AppConfig> for BuildConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            name: config.docset.name.clone(),
            section_prefix: config.docset.section_prefix.clone(),
            bundle_identifier: config.docset.bundle_identifier.clone(),
            platform_family: config.docset.platform_family.clone(),
            docset_family: config.docset.docset_family.clone(),
            index_page: config.docset.index_page.clone(),
            source_root: config.paths.source_root.clone(),
            output_root: config.paths.output_root.clone(),
            static_dir: config.paths.static_dir.clone(),
            site_domain: config.links.site_domain.clone(),
            concurrency: config.build.concurrency,
        }
    }
}

impl BuildConfig {
    /// Input directory whose subdirectories are the catalog sections.
    pub fn input_dir(&self) -> PathBuf {
        let dir = self.source_root.join(&self.name);
        if self.section_prefix.is_empty() {
            dir
        } else {
            dir.join(&self.section_prefix)
        }
    }

    /// Root directory of the generated bundle.
    pub fn bundle_dir(&self) -> PathBuf {
        self.output_root.join(&self.name)
    }

    /// Reject values that would escape the bundle or stall the build.
    pub fn validate(&self) -> Result<()> {
        if self.name.contains(['/', '\\']) || self.name == ".." {
            return Err(DocsetError::config(format!(
                "docset name '{}' must be a single path segment",
                self.name
            )));
        }
        if self
            .section_prefix
            .split('/')
            .any(|segment| segment == "..")
        {
            return Err(DocsetError::config(format!(
                "section prefix '{}' must not contain '..'",
                self.section_prefix
            )));
        }
        if self.concurrency == 0 {
            return Err(DocsetError::config("build concurrency must be at least 1"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Path of the default config file (`./mddocset.toml`).
pub fn default_config_path() -> PathBuf {
    PathBuf::from(CONFIG_FILE_NAME)
}

/// Load the config from `path`, or from the default location when `None`.
/// Returns defaults if the file does not exist.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| DocsetError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        DocsetError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Write a default config file to `path` and return it.
pub fn init_config(path: &Path) -> Result<PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| DocsetError::io(parent, e))?;
    }

    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| DocsetError::config(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| DocsetError::io(path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path.to_path_buf())
}
