//! End-to-end `build` pipeline: scaffold → index store → walk → documents → manifest.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{info, instrument, warn};

use mddocset_markdown::LinkRewriter;
use mddocset_shared::{BuildConfig, DocsetError, IndexEntry, Result};
use mddocset_storage::IndexStore;

use crate::bundle::{self, BundleLayout};
use crate::document::{self, BuildContext};
use crate::walker;

/// Result of the `build_docset` pipeline.
#[derive(Debug)]
pub struct BuildReport {
    /// Root of the generated bundle.
    pub bundle_path: PathBuf,
    /// Sections found under the input directory.
    pub sections: usize,
    /// Markdown documents dispatched.
    pub documents_found: usize,
    /// Pages written successfully.
    pub documents_written: usize,
    /// Documents whose chain failed (logged individually).
    pub documents_failed: usize,
    /// Rows in the search index.
    pub index_entries: usize,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called as each document's chain is joined.
    fn document_done(&self, file: &str, current: usize, total: usize);
    /// Called when the pipeline completes.
    fn done(&self, report: &BuildReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn document_done(&self, _file: &str, _current: usize, _total: usize) {}
    fn done(&self, _report: &BuildReport) {}
}

/// Run the full build.
///
/// 1. Scaffold the bundle directories
/// 2. Create a fresh search index
/// 3. Walk the input tree
/// 4. Transform every document in its own task, then wait for all of them
/// 5. Record index entries and write `Info.plist`
///
/// Steps 1-3 failing abort the run. Document failures are logged and counted.
#[instrument(skip_all, fields(name = %config.name))]
pub async fn build_docset(
    config: &BuildConfig,
    progress: &dyn ProgressReporter,
) -> Result<BuildReport> {
    let start = Instant::now();
    config.validate()?;

    // --- Phase 1: Scaffold ---
    progress.phase("Creating bundle directories");
    let layout = BundleLayout::new(&config.bundle_dir(), &config.section_prefix);
    bundle::scaffold(&layout).await?;

    // --- Phase 2: Index store ---
    progress.phase("Creating search index");
    let index = Arc::new(IndexStore::open(&layout.index_path).await?);

    // --- Phase 3: Walk ---
    progress.phase("Discovering documents");
    let input_dir = config.input_dir();
    let sections = walker::discover(&input_dir).await?;

    let ctx = Arc::new(BuildContext {
        config: config.clone(),
        links: LinkRewriter::new(&config.site_domain)?,
        layout,
        index,
    });

    // --- Phase 4: Documents ---
    progress.phase("Rendering documents");
    let limiter = Arc::new(Semaphore::new(config.concurrency));
    let mut handles = Vec::new();

    for source in sections.iter().flat_map(|s| s.documents.iter().cloned()) {
        let permit = acquire_slot(&limiter).await?;
        let ctx = Arc::clone(&ctx);
        let file = source.file_name.clone();

        handles.push((
            file,
            tokio::spawn(async move {
                let report = document::process_document(&ctx, source).await;
                drop(permit);
                report
            }),
        ));
    }

    // Barrier: every chain finishes before anything is indexed or described.
    let total = handles.len();
    let mut entries: Vec<IndexEntry> = Vec::new();
    let mut written = 0;
    let mut failed = 0;

    for (i, (file, handle)) in handles.into_iter().enumerate() {
        match handle.await {
            Ok(report) => {
                if report.written.is_ok() {
                    written += 1;
                } else {
                    failed += 1;
                }
                entries.extend(report.entries);
            }
            Err(e) => {
                warn!(file = %file, error = %e, "document task aborted");
                failed += 1;
            }
        }
        progress.document_done(&file, i + 1, total);
    }

    // --- Phase 5: Index + manifest ---
    progress.phase("Recording search index");
    let inserted = ctx.index.insert_all(&entries).await?;
    info!(offered = entries.len(), inserted, "search index entries recorded");

    progress.phase("Writing Info.plist");
    let manifest = bundle::build_manifest(config, &ctx.layout);
    bundle::write_manifest(&ctx.layout, &manifest).await?;

    let report = BuildReport {
        bundle_path: ctx.layout.root.clone(),
        sections: sections.len(),
        documents_found: total,
        documents_written: written,
        documents_failed: failed,
        index_entries: ctx.index.count().await? as usize,
        elapsed: start.elapsed(),
    };

    progress.done(&report);

    info!(
        documents = report.documents_found,
        written = report.documents_written,
        failed = report.documents_failed,
        index_entries = report.index_entries,
        elapsed_ms = report.elapsed.as_millis(),
        "docset build complete"
    );

    Ok(report)
}

/// Wait for a free document slot.
async fn acquire_slot(limiter: &Arc<Semaphore>) -> Result<OwnedSemaphorePermit> {
    Arc::clone(limiter)
        .acquire_owned()
        .await
        .map_err(|e| DocsetError::Task(format!("document limiter closed: {e}")))
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    use mddocset_shared::{ANCHOR_ENTRY_TYPE, AppConfig};

    use super::*;

    const FIELD_MD: &str = "\
# Field

The `Field` component. See [Props](Props.md) and
[FieldArray](https://redux-form.com/6.2.0/docs/api/FieldArray.html).

## Props

#### `name : String` [required]

The field name.

#### `component : Component|Function|String` [required]

```js
<Field name=\"email\" component=\"input\"/>
```

#### Not a symbol heading
";

    /// Source tree + static fragments under a temp dir, config pointing at it.
    fn setup(dir: &Path) -> BuildConfig {
        let input = dir.join("source_doc/redux-form/api");
        fs::create_dir_all(input.join("api")).unwrap();
        fs::create_dir_all(input.join("guides")).unwrap();
        fs::write(input.join("api/Field.md"), FIELD_MD).unwrap();
        fs::write(input.join("api/README.md"), "# API\n\n- [Field](Field.md)\n").unwrap();
        fs::write(input.join("api/notes.txt"), "not markdown").unwrap();
        fs::write(input.join("guides/Intro.markdown"), "# Intro\n").unwrap();

        let static_dir = dir.join("static");
        fs::create_dir_all(&static_dir).unwrap();
        fs::write(static_dir.join("header.txt"), "<!-- header -->\n").unwrap();
        fs::write(static_dir.join("footer.txt"), "\n<!-- footer -->").unwrap();

        let mut config = BuildConfig::from(&AppConfig::default());
        config.source_root = dir.join("source_doc");
        config.output_root = dir.join("docset");
        config.static_dir = static_dir;
        config.concurrency = 2;
        config
    }

    fn documents_dir(config: &BuildConfig) -> PathBuf {
        config
            .bundle_dir()
            .join("Contents/Resources/Documents/api")
    }

    /// Index rows of the finished bundle, read straight from the store file.
    async fn index_rows(config: &BuildConfig) -> Vec<(i64, IndexEntry)> {
        let path = config.bundle_dir().join("Contents/Resources/docSet.dsidx");
        let db = libsql::Builder::new_local(&path)
            .build()
            .await
            .expect("open finished index");
        let conn = db.connect().expect("connect");
        let mut rows = conn
            .query("SELECT id, name, type, path FROM searchIndex ORDER BY id", ())
            .await
            .expect("query rows");

        let mut out = Vec::new();
        while let Some(row) = rows.next().await.expect("next row") {
            let entry = IndexEntry {
                name: row.get(1).unwrap(),
                kind: row.get(2).unwrap(),
                path: row.get(3).unwrap(),
            };
            out.push((row.get::<i64>(0).unwrap(), entry));
        }
        out
    }

    /// Checks the bundle state at the moment the manifest phase starts.
    struct ManifestOrderCheck {
        docs_dir: PathBuf,
        manifest_path: PathBuf,
        pages: Vec<&'static str>,
        finished: Mutex<Vec<String>>,
        checked: AtomicBool,
    }

    impl ProgressReporter for ManifestOrderCheck {
        fn phase(&self, name: &str) {
            if name != "Writing Info.plist" {
                return;
            }
            let finished = self.finished.lock().unwrap();
            assert_eq!(finished.len(), self.pages.len(), "documents still pending");
            for page in &self.pages {
                assert!(self.docs_dir.join(page).exists(), "{page} not written yet");
            }
            assert!(!self.manifest_path.exists());
            self.checked.store(true, Ordering::SeqCst);
        }

        fn document_done(&self, file: &str, _current: usize, _total: usize) {
            assert!(!self.manifest_path.exists());
            self.finished.lock().unwrap().push(file.to_string());
        }

        fn done(&self, _report: &BuildReport) {}
    }

    #[tokio::test]
    async fn builds_complete_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let config = setup(dir.path());

        let report = build_docset(&config, &SilentProgress).await.expect("build");
        assert_eq!(report.sections, 2);
        assert_eq!(report.documents_found, 3);
        assert_eq!(report.documents_written, 3);
        assert_eq!(report.documents_failed, 0);
        // 3 pages + 2 property anchors
        assert_eq!(report.index_entries, 5);

        let docs = documents_dir(&config);
        let field = fs::read_to_string(docs.join("Field.html")).unwrap();
        assert!(field.starts_with("<!-- header -->\n<h1 id=\"field\">Field</h1>"));
        assert!(field.ends_with("\n<!-- footer -->"));
        assert!(field.contains(r#"<a href="Props.html">Props</a>"#));
        assert!(field.contains(r#"<a href="FieldArray.html">FieldArray</a>"#));
        assert!(field.contains("class=\"hljs language-js\""));

        assert!(docs.join("README.html").exists());
        assert!(docs.join("Intro.html").exists());
        assert!(!docs.join("notes.html").exists());
        assert!(!docs.join("notes.txt.html").exists());

        let plist = fs::read_to_string(config.bundle_dir().join("Contents/Info.plist")).unwrap();
        assert!(plist.contains("<string>redux-form</string>"));
        assert!(plist.contains("<string>api/README.html</string>"));
    }

    #[tokio::test]
    async fn index_contains_pages_and_anchors() {
        let dir = tempfile::tempdir().unwrap();
        let config = setup(dir.path());
        build_docset(&config, &SilentProgress).await.unwrap();

        let store = index_rows(&config).await;
        let entries: Vec<IndexEntry> = store.into_iter().map(|(_, e)| e).collect();

        assert!(entries.contains(&IndexEntry::page("Field", "api", "api/Field.html")));
        assert!(entries.contains(&IndexEntry::page("Intro", "guides", "api/Intro.html")));
        assert!(entries.contains(&IndexEntry {
            name: "name".into(),
            kind: ANCHOR_ENTRY_TYPE.into(),
            path: "api/Field.html#name--string-required".into(),
        }));
        assert!(entries.contains(&IndexEntry {
            name: "component".into(),
            kind: ANCHOR_ENTRY_TYPE.into(),
            path: "api/Field.html#component--componentfunctionstring-required".into(),
        }));
        assert!(!entries.iter().any(|e| e.name.contains("notes")));
    }

    #[tokio::test]
    async fn manifest_waits_for_every_document() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = setup(dir.path());
        config.concurrency = 1;

        let check = ManifestOrderCheck {
            docs_dir: documents_dir(&config),
            manifest_path: config.bundle_dir().join("Contents/Info.plist"),
            pages: vec!["Field.html", "README.html", "Intro.html"],
            finished: Mutex::new(Vec::new()),
            checked: AtomicBool::new(false),
        };

        build_docset(&config, &check).await.expect("build");
        assert!(check.checked.load(Ordering::SeqCst));
        assert!(check.manifest_path.exists());
        assert_eq!(
            *check.finished.lock().unwrap(),
            ["Field.md", "README.md", "Intro.markdown"]
        );
    }

    #[tokio::test]
    async fn closed_limiter_is_a_task_error() {
        let limiter = Arc::new(Semaphore::new(1));
        limiter.close();
        let Err(err) = acquire_slot(&limiter).await else {
            panic!("closed limiter must not hand out permits");
        };
        assert!(matches!(err, DocsetError::Task(_)));
    }

    #[tokio::test]
    async fn rebuild_produces_identical_index() {
        let dir = tempfile::tempdir().unwrap();
        let config = setup(dir.path());

        build_docset(&config, &SilentProgress).await.unwrap();
        let first = index_rows(&config).await;
        build_docset(&config, &SilentProgress).await.unwrap();
        let second = index_rows(&config).await;

        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn unreadable_document_does_not_stop_siblings_or_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let config = setup(dir.path());
        // Invalid UTF-8 makes the read step fail for this one document.
        let input = config.input_dir().join("api");
        fs::write(input.join("Broken.md"), [0xff, 0xfe, 0x00]).unwrap();

        let report = build_docset(&config, &SilentProgress).await.unwrap();
        assert_eq!(report.documents_found, 4);
        assert_eq!(report.documents_written, 3);
        assert_eq!(report.documents_failed, 1);
        assert!(config.bundle_dir().join("Contents/Info.plist").exists());
        assert!(!documents_dir(&config).join("Broken.html").exists());
    }

    #[tokio::test]
    async fn missing_input_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = setup(dir.path());
        config.name = "absent".into();

        let err = build_docset(&config, &SilentProgress).await.unwrap_err();
        assert!(matches!(err, DocsetError::Io { .. }));
        assert!(!config.bundle_dir().join("Contents/Info.plist").exists());
    }
}
