//! Per-document transform chain: read → render → rewrite links → index → write.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use mddocset_markdown::{LinkRewriter, extract_symbol_anchors, render_html};
use mddocset_shared::{BuildConfig, DocsetError, DocumentSource, IndexEntry, Result};
use mddocset_storage::IndexStore;

use crate::bundle::BundleLayout;

/// Static fragment written before every page body.
pub const HEADER_FILE: &str = "header.txt";
/// Static fragment written after every page body.
pub const FOOTER_FILE: &str = "footer.txt";

/// Everything a build stage needs, constructed once per run.
pub struct BuildContext {
    pub config: BuildConfig,
    pub layout: BundleLayout,
    pub links: LinkRewriter,
    pub index: Arc<IndexStore>,
}

/// Outcome of one document's chain.
#[derive(Debug)]
pub struct DocumentReport {
    pub source: DocumentSource,
    /// Index entries extracted before any failure in the write step.
    pub entries: Vec<IndexEntry>,
    /// Written page path, or the error that stopped the chain.
    pub written: Result<PathBuf>,
}

/// Run the five-step chain for `source`. Failures are logged and captured in
/// the report, never propagated.
#[instrument(skip_all, fields(section = %source.section, file = %source.file_name))]
pub async fn process_document(ctx: &BuildContext, source: DocumentSource) -> DocumentReport {
    let mut entries = Vec::new();
    let written = run_chain(ctx, &source, &mut entries).await;

    match &written {
        Ok(path) => debug!(path = %path.display(), entries = entries.len(), "page written"),
        Err(e) => warn!(path = %source.path.display(), error = %e, "document failed"),
    }

    DocumentReport {
        source,
        entries,
        written,
    }
}

async fn run_chain(
    ctx: &BuildContext,
    source: &DocumentSource,
    entries: &mut Vec<IndexEntry>,
) -> Result<PathBuf> {
    let markdown = tokio::fs::read_to_string(&source.path)
        .await
        .map_err(|e| DocsetError::io(&source.path, e))?;

    let html = render_html(&markdown)?;
    let html = ctx.links.rewrite(&html);

    let name = source.canonical_name();
    entries.extend(index_entries(&ctx.layout, source, &html));

    write_page(&ctx.config.static_dir, &ctx.layout.page_file(name), &html).await
}

/// One page entry for the document plus one entry per symbol heading.
pub fn index_entries(layout: &BundleLayout, source: &DocumentSource, html: &str) -> Vec<IndexEntry> {
    let name = source.canonical_name();
    let page_url = layout.page_url(&format!("{name}.html"));

    let mut entries = vec![IndexEntry::page(name, &source.section, &page_url)];
    entries.extend(
        extract_symbol_anchors(html)
            .into_iter()
            .map(|anchor| IndexEntry::anchor(anchor.symbol, &page_url, &anchor.id)),
    );
    entries
}

/// Wrap `body` in the static header and footer and write it to `target`.
///
/// The fragments are read fresh for every page.
pub async fn write_page(static_dir: &Path, target: &Path, body: &str) -> Result<PathBuf> {
    let header_path = static_dir.join(HEADER_FILE);
    let footer_path = static_dir.join(FOOTER_FILE);

    let header = tokio::fs::read(&header_path)
        .await
        .map_err(|e| DocsetError::io(&header_path, e))?;
    let footer = tokio::fs::read(&footer_path)
        .await
        .map_err(|e| DocsetError::io(&footer_path, e))?;

    let mut page = Vec::with_capacity(header.len() + body.len() + footer.len());
    page.extend_from_slice(&header);
    page.extend_from_slice(body.as_bytes());
    page.extend_from_slice(&footer);

    tokio::fs::write(target, page)
        .await
        .map_err(|e| DocsetError::io(target, e))?;
    Ok(target.to_path_buf())
}
