//! Docset bundle layout, scaffolding, and the `Info.plist` descriptor.

use std::path::{Path, PathBuf};

use tracing::{info, instrument};

use mddocset_shared::{BuildConfig, BundleManifest, DocsetError, Result};

/// Display name used when the configured docset name is empty.
const UNTITLED_BUNDLE_NAME: &str = "No Title";

/// Paths inside one docset bundle.
///
/// ```text
/// <bundle>/
/// └── Contents/
///     ├── Info.plist
///     └── Resources/
///         ├── docSet.dsidx
///         └── Documents/
///             └── <section prefix>/
///                 └── <name>.html
/// ```
#[derive(Debug, Clone)]
pub struct BundleLayout {
    pub root: PathBuf,
    /// `Documents/<section prefix>/`: where pages are written.
    pub documents_dir: PathBuf,
    pub index_path: PathBuf,
    pub manifest_path: PathBuf,
    section_prefix: String,
}

impl BundleLayout {
    pub fn new(bundle_dir: &Path, section_prefix: &str) -> Self {
        let contents_dir = bundle_dir.join("Contents");
        let resources_dir = contents_dir.join("Resources");
        let section_prefix = section_prefix.trim_matches('/').to_string();

        let mut documents_dir = resources_dir.join("Documents");
        if !section_prefix.is_empty() {
            documents_dir.push(&section_prefix);
        }

        Self {
            root: bundle_dir.to_path_buf(),
            index_path: resources_dir.join("docSet.dsidx"),
            manifest_path: contents_dir.join("Info.plist"),
            documents_dir,
            section_prefix,
        }
    }

    /// Path of a page relative to `Documents/`, as stored in the index.
    pub fn page_url(&self, file_name: &str) -> String {
        if self.section_prefix.is_empty() {
            file_name.to_string()
        } else {
            format!("{}/{file_name}", self.section_prefix)
        }
    }

    /// On-disk location of the page for canonical name `name`.
    pub fn page_file(&self, name: &str) -> PathBuf {
        self.documents_dir.join(format!("{name}.html"))
    }
}

/// Create `Documents/<section prefix>/` and every directory above it.
///
/// Succeeds when the directories already exist.
#[instrument(skip_all, fields(path = %layout.documents_dir.display()))]
pub async fn scaffold(layout: &BundleLayout) -> Result<()> {
    tokio::fs::create_dir_all(&layout.documents_dir)
        .await
        .map_err(|e| DocsetError::io(&layout.documents_dir, e))?;
    info!("bundle directories ready");
    Ok(())
}

/// Manifest values for the configured docset.
pub fn build_manifest(config: &BuildConfig, layout: &BundleLayout) -> BundleManifest {
    let bundle_name = if config.name.trim().is_empty() {
        UNTITLED_BUNDLE_NAME.to_string()
    } else {
        config.name.clone()
    };

    BundleManifest {
        bundle_identifier: config.bundle_identifier.clone(),
        bundle_name,
        platform_family: config.platform_family.clone(),
        docset_family: config.docset_family.clone(),
        is_dash_docset: true,
        index_file_path: layout.page_url(&config.index_page),
    }
}

/// Serialize `manifest` as an XML property list at `Contents/Info.plist`.
#[instrument(skip_all, fields(path = %layout.manifest_path.display()))]
pub async fn write_manifest(layout: &BundleLayout, manifest: &BundleManifest) -> Result<()> {
    let mut buf = Vec::new();
    plist::to_writer_xml(&mut buf, manifest)
        .map_err(|e| DocsetError::Manifest(e.to_string()))?;

    tokio::fs::write(&layout.manifest_path, buf)
        .await
        .map_err(|e| DocsetError::io(&layout.manifest_path, e))?;

    info!(name = %manifest.bundle_name, "Info.plist written");
    Ok(())
}
