//! Core domain types for docset bundles.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Index entry type used for anchor-level (heading) entries.
pub const ANCHOR_ENTRY_TYPE: &str = "Property";

/// File extensions recognized as Markdown sources (case-sensitive).
pub const MARKDOWN_EXTENSIONS: [&str; 2] = ["md", "markdown"];

// ---------------------------------------------------------------------------
// IndexEntry
// ---------------------------------------------------------------------------

/// A single `(name, type, path)` row of the docset search index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexEntry {
    /// Symbol or page name shown in the viewer's search.
    pub name: String,
    /// Entry type: the section name for pages, [`ANCHOR_ENTRY_TYPE`] for anchors.
    pub kind: String,
    /// Page path relative to `Documents/`, optionally with a `#fragment`.
    pub path: String,
}

impl IndexEntry {
    /// Page-level entry: one per rendered document.
    pub fn page(name: impl Into<String>, section: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: section.into(),
            path: path.into(),
        }
    }

    /// Anchor-level entry pointing at a heading inside `page_path`.
    pub fn anchor(symbol: impl Into<String>, page_path: &str, anchor: &str) -> Self {
        Self {
            name: symbol.into(),
            kind: ANCHOR_ENTRY_TYPE.to_string(),
            path: format!("{page_path}#{anchor}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Sections and documents
// ---------------------------------------------------------------------------

/// A catalog section: an immediate subdirectory of the input root.
#[derive(Debug, Clone)]
pub struct Section {
    /// Directory name, also used as the page entry type.
    pub name: String,
    /// Markdown documents found directly inside the directory.
    pub documents: Vec<DocumentSource>,
}

/// A Markdown source file discovered by the walker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSource {
    /// Owning section name.
    pub section: String,
    /// File name including extension (e.g. `Field.md`).
    pub file_name: String,
    /// Full path to the source file.
    pub path: PathBuf,
}

impl DocumentSource {
    /// Canonical page name: the file name with its Markdown extension removed.
    pub fn canonical_name(&self) -> &str {
        strip_markdown_extension(&self.file_name)
    }
}

/// Strip a trailing `.md` / `.markdown` extension from a file name.
pub fn strip_markdown_extension(file_name: &str) -> &str {
    MARKDOWN_EXTENSIONS
        .iter()
        .find_map(|ext| {
            file_name
                .strip_suffix(ext)
                .and_then(|rest| rest.strip_suffix('.'))
        })
        .unwrap_or(file_name)
}

// ---------------------------------------------------------------------------
// BundleManifest
// ---------------------------------------------------------------------------

/// The `Info.plist` contents describing a docset bundle to its viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleManifest {
    #[serde(rename = "CFBundleIdentifier")]
    pub bundle_identifier: String,
    #[serde(rename = "CFBundleName")]
    pub bundle_name: String,
    #[serde(rename = "DocSetPlatformFamily")]
    pub platform_family: String,
    #[serde(rename = "DashDocSetFamily")]
    pub docset_family: String,
    #[serde(rename = "isDashDocset")]
    pub is_dash_docset: bool,
    /// Landing page relative to `Documents/`.
    #[serde(rename = "dashIndexFilePath")]
    pub index_file_path: String,
}
