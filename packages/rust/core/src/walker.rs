//! Input tree discovery: catalog sections and their Markdown documents.

use std::ffi::OsStr;
use std::path::Path;

use tracing::{debug, info, instrument, warn};

use mddocset_shared::{DocsetError, DocumentSource, MARKDOWN_EXTENSIONS, Result, Section};

/// Enumerate the sections under `input_dir` and the Markdown files in each.
///
/// Only immediate subdirectories are sections and only their direct children
/// are considered; nothing is recursed into. Results are sorted by name.
#[instrument(skip_all, fields(input = %input_dir.display()))]
pub async fn discover(input_dir: &Path) -> Result<Vec<Section>> {
    let mut sections = Vec::new();

    for (name, path) in list_dir(input_dir).await? {
        if !is_dir(&path).await {
            debug!(entry = %name, "not a directory, skipping");
            continue;
        }

        let mut documents = Vec::new();
        for (file_name, file_path) in list_dir(&path).await? {
            if !is_markdown(&file_name) || !is_file(&file_path).await {
                continue;
            }
            documents.push(DocumentSource {
                section: name.clone(),
                file_name,
                path: file_path,
            });
        }

        debug!(section = %name, documents = documents.len(), "section discovered");
        sections.push(Section { name, documents });
    }

    info!(
        sections = sections.len(),
        documents = sections.iter().map(|s| s.documents.len()).sum::<usize>(),
        "input tree walked"
    );

    Ok(sections)
}

/// Extension is exactly one of the recognized Markdown extensions.
pub fn is_markdown(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| MARKDOWN_EXTENSIONS.contains(&ext))
}

/// Directory entries as `(name, path)`, sorted by name.
async fn list_dir(dir: &Path) -> Result<Vec<(String, std::path::PathBuf)>> {
    let mut reader = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| DocsetError::io(dir, e))?;

    let mut entries = Vec::new();
    while let Some(entry) = reader
        .next_entry()
        .await
        .map_err(|e| DocsetError::io(dir, e))?
    {
        match entry.file_name().into_string() {
            Ok(name) => entries.push((name, entry.path())),
            Err(raw) => warn!(name = ?raw, "skipping entry with non-UTF-8 name"),
        }
    }

    entries.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(entries)
}

async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path).await.is_ok_and(|m| m.is_dir())
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path).await.is_ok_and(|m| m.is_file())
}
