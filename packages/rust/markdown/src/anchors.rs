//! Symbol anchors scraped from rendered API pages.
//!
//! API reference pages document each property as an `h4` whose first code
//! span starts with the symbol name, e.g. `#### \`name : String\` [required]`.

use std::sync::LazyLock;

use regex::Regex;

/// A heading anchor that names a documented symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolAnchor {
    /// Heading `id` attribute (the URL fragment).
    pub id: String,
    /// Symbol text: the first code span up to the first `:` or `(`.
    pub symbol: String,
}

/// Find every `<h4 id="ID">...<code>SYMBOL...</code>` heading in `html`.
///
/// Matching is per line; headings in any other shape are skipped.
pub fn extract_symbol_anchors(html: &str) -> Vec<SymbolAnchor> {
    static H4_SYMBOL_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r#"<h4 id="([^"]*)"[^\n]*?<code>([^:(<\n]*)[^\n]*?</code>"#)
            .expect("valid regex")
    });

    H4_SYMBOL_RE
        .captures_iter(html)
        .filter_map(|caps| {
            let id = caps[1].to_string();
            let symbol = decode_entities(caps[2].trim());
            if id.is_empty() || symbol.is_empty() {
                return None;
            }
            Some(SymbolAnchor { id, symbol })
        })
        .collect()
}

/// Undo the HTML escaping applied to code span text.
fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
