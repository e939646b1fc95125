//! Link rewriting for rendered pages.
//!
//! Two passes run in order:
//! 1. local `*.md` links point at the rendered `*.html` pages
//! 2. absolute links into the documentation site's `docs/api/` pages become
//!    bare relative page references

use std::sync::LazyLock;

use regex::Regex;

use mddocset_shared::{DocsetError, Result};

/// Rewrites links in rendered HTML so they resolve inside the bundle.
#[derive(Debug, Clone)]
pub struct LinkRewriter {
    site_api_re: Regex,
}

impl LinkRewriter {
    /// Build a rewriter for absolute links into `site_domain`.
    pub fn new(site_domain: &str) -> Result<Self> {
        if site_domain.trim().is_empty() {
            return Err(DocsetError::config("links.site_domain must not be empty"));
        }

        let pattern = format!(
            r#"https://{}/[^"'\s<>]*?docs/api/([^"'\s<>/]*)\.html"#,
            regex::escape(site_domain.trim())
        );
        let site_api_re =
            Regex::new(&pattern).map_err(|e| DocsetError::config(format!("site domain: {e}")))?;

        Ok(Self { site_api_re })
    }

    /// Apply both passes to `html`.
    pub fn rewrite(&self, html: &str) -> String {
        let local = rewrite_local_markdown_links(html);
        self.site_api_re.replace_all(&local, "$1.html").into_owned()
    }
}

/// `<a href="PATH.md">` becomes `<a href="PATH.html">`; fragments are kept.
fn rewrite_local_markdown_links(html: &str) -> String {
    static MD_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r##"<a href="([^"#]*)\.md(#[^"]*)?""##).expect("valid regex")
    });

    MD_LINK_RE
        .replace_all(html, r#"<a href="${1}.html${2}""#)
        .into_owned()
}
