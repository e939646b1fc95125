//! Markdown-to-HTML rendering and post-render passes for docset pages.
//!
//! Renders GitHub-flavored Markdown with `pulldown-cmark`, assigns
//! GitHub-compatible heading ids, and highlights fenced code blocks with
//! `syntect`. The [`links`] and [`anchors`] passes then operate on the
//! rendered HTML text.

pub mod anchors;
mod highlight;
pub mod links;

use std::collections::HashMap;
use std::sync::LazyLock;

use pulldown_cmark::{CodeBlockKind, CowStr, Event, LinkType, Options, Parser, Tag, TagEnd, html};
use regex::Regex;
use tracing::{debug, instrument};

use mddocset_shared::Result;

pub use anchors::{SymbolAnchor, extract_symbol_anchors};
pub use links::LinkRewriter;

/// Parser options for the GitHub flavor.
fn gfm_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_GFM
}

/// Render Markdown to an HTML fragment.
///
/// 1. Parse with GitHub-flavored extensions
/// 2. Give every heading a GitHub-compatible `id`
/// 3. Replace fenced code blocks that name a language with highlighted HTML
/// 4. Turn bare URLs into links and single newlines into `<br />`
/// 5. Serialize to HTML
#[instrument(skip_all, fields(len = markdown.len()))]
pub fn render_html(markdown: &str) -> Result<String> {
    let mut ids = HeadingIds::default();
    let mut events: Vec<Event<'_>> = Vec::new();
    let mut parser = Parser::new_ext(markdown, gfm_options());

    while let Some(event) = parser.next() {
        match event {
            Event::Start(Tag::Heading {
                level,
                id,
                classes,
                attrs,
            }) => {
                let mut inner = Vec::new();
                let mut text = String::new();
                for event in parser.by_ref() {
                    let end = matches!(event, Event::End(TagEnd::Heading(_)));
                    if let Event::Text(t) | Event::Code(t) = &event {
                        text.push_str(t);
                    }
                    inner.push(event);
                    if end {
                        break;
                    }
                }

                let id = id.unwrap_or_else(|| CowStr::from(ids.assign(&text)));
                events.push(Event::Start(Tag::Heading {
                    level,
                    id: Some(id),
                    classes,
                    attrs,
                }));
                events.extend(inner);
            }
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))) => {
                let lang = info.split_whitespace().next().unwrap_or_default().to_string();
                if lang.is_empty() {
                    events.push(Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))));
                    continue;
                }

                let mut code = String::new();
                for event in parser.by_ref() {
                    match event {
                        Event::End(TagEnd::CodeBlock) => break,
                        Event::Text(t) => code.push_str(&t),
                        _ => {}
                    }
                }
                events.push(Event::Html(highlight::highlight_block(&lang, &code)?.into()));
            }
            other => events.push(other),
        }
    }

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, github_inline(events).into_iter());

    debug!(html_len = out.len(), headings = ids.seen.len(), "markdown rendered");
    Ok(out)
}

// ---------------------------------------------------------------------------
// Bare URLs and line breaks
// ---------------------------------------------------------------------------

static BARE_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s<>"'`]+"#).expect("valid regex"));

/// GitHub inline conventions pulldown-cmark leaves out: bare `http(s)://`
/// URLs become links, soft line breaks become hard breaks.
///
/// Text inside links, images, and code blocks is left alone. Adjacent text
/// events are merged first so a URL split by the parser is still found.
fn github_inline(events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut out = Vec::with_capacity(events.len());
    let mut pending = String::new();
    let mut link_depth = 0usize;
    let mut in_code_block = false;

    for event in events {
        if link_depth == 0 && !in_code_block {
            if let Event::Text(text) = &event {
                pending.push_str(text);
                continue;
            }
        }
        if !pending.is_empty() {
            linkify(&std::mem::take(&mut pending), &mut out);
        }

        match &event {
            Event::Start(Tag::Link { .. } | Tag::Image { .. }) => link_depth += 1,
            Event::End(TagEnd::Link | TagEnd::Image) => link_depth = link_depth.saturating_sub(1),
            Event::Start(Tag::CodeBlock(_)) => in_code_block = true,
            Event::End(TagEnd::CodeBlock) => in_code_block = false,
            Event::SoftBreak => {
                out.push(Event::HardBreak);
                continue;
            }
            _ => {}
        }
        out.push(event);
    }
    if !pending.is_empty() {
        linkify(&pending, &mut out);
    }
    out
}

/// Push `text` as text events, wrapping every bare URL in an autolink.
fn linkify(text: &str, out: &mut Vec<Event<'_>>) {
    let mut last = 0;
    for m in BARE_URL_RE.find_iter(text) {
        let url = m
            .as_str()
            .trim_end_matches(['.', ',', ';', ':', '!', '?', ')']);
        if url.ends_with("://") {
            continue;
        }

        if m.start() > last {
            out.push(Event::Text(text[last..m.start()].to_string().into()));
        }
        let dest = CowStr::from(url.to_string());
        out.push(Event::Start(Tag::Link {
            link_type: LinkType::Autolink,
            dest_url: dest.clone(),
            title: CowStr::from(""),
            id: CowStr::from(""),
        }));
        out.push(Event::Text(dest));
        out.push(Event::End(TagEnd::Link));
        last = m.start() + url.len();
    }
    if last < text.len() {
        out.push(Event::Text(text[last..].to_string().into()));
    }
}

// ---------------------------------------------------------------------------
// Heading ids
// ---------------------------------------------------------------------------

/// Hands out unique heading ids within one page.
#[derive(Debug, Default)]
struct HeadingIds {
    seen: HashMap<String, usize>,
}

impl HeadingIds {
    /// Slug for `text`; repeats get `-1`, `-2`, ... appended.
    fn assign(&mut self, text: &str) -> String {
        let slug = github_slug(text);
        match self.seen.get_mut(&slug) {
            Some(count) => {
                let id = format!("{slug}-{count}");
                *count += 1;
                id
            }
            None => {
                self.seen.insert(slug.clone(), 1);
                slug
            }
        }
    }
}

/// GitHub-compatible heading id: spaces become `-`, punctuation is dropped,
/// everything is lowercased.
pub fn github_slug(text: &str) -> String {
    const STRIPPED: &str = "&+$,/:;=?@\"#{}|^¨~[]`\\*)(%.!'<>";

    text.trim()
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('-'),
            c if STRIPPED.contains(c) => None,
            c => Some(c),
        })
        .collect::<String>()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_paragraph_and_emphasis() {
        let html = render_html("Hello *world*").unwrap();
        assert_eq!(html, "<p>Hello <em>world</em></p>\n");
    }

    #[test]
    fn headings_get_github_ids() {
        let html = render_html("#### `name : String` [required]").unwrap();
        assert_eq!(
            html,
            "<h4 id=\"name--string-required\"><code>name : String</code> [required]</h4>\n"
        );
    }

    #[test]
    fn duplicate_headings_get_suffixes() {
        let html = render_html("## Usage\n\n## Usage\n\n## Usage\n").unwrap();
        assert!(html.contains("<h2 id=\"usage\">"));
        assert!(html.contains("<h2 id=\"usage-1\">"));
        assert!(html.contains("<h2 id=\"usage-2\">"));
    }

    #[test]
    fn gfm_tables_and_strikethrough() {
        let md = "| a | b |\n|---|---|\n| 1 | 2 |\n\n~~gone~~\n";
        let html = render_html(md).unwrap();
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>1</td>"));
        assert!(html.contains("<del>gone</del>"));
    }

    #[test]
    fn task_lists() {
        let html = render_html("- [x] done\n- [ ] todo\n").unwrap();
        assert!(html.contains("checkbox"));
    }

    #[test]
    fn fenced_code_with_language_is_highlighted() {
        let html = render_html("```js\nconst a = 1;\n```\n").unwrap();
        assert!(html.contains("<pre><code class=\"hljs language-js\">"));
        assert!(html.contains("<span class="));
        assert!(!html.contains("```"));
    }

    #[test]
    fn fenced_code_without_language_is_plain() {
        let html = render_html("```\n<b>raw</b>\n```\n").unwrap();
        assert!(html.contains("<pre><code>&lt;b&gt;raw&lt;/b&gt;"));
    }

    #[test]
    fn code_block_contents_do_not_leak_into_heading_ids() {
        let html = render_html("```js\n// comment\n```\n\n# Title\n").unwrap();
        assert!(html.contains("<h1 id=\"title\">Title</h1>"));
    }

    #[test]
    fn bare_urls_become_links() {
        let html = render_html("See https://example.com/docs/a_b?x=1&y=2. Done").unwrap();
        assert_eq!(
            html,
            "<p>See <a href=\"https://example.com/docs/a_b?x=1&amp;y=2\">https://example.com/docs/a_b?x=1&amp;y=2</a>. Done</p>\n"
        );
    }

    #[test]
    fn bare_site_url_ends_up_as_relative_link() {
        let html = render_html("See https://redux-form.com/6.2.0/docs/api/Field.html for details.")
            .unwrap();
        let html = LinkRewriter::new("redux-form.com").unwrap().rewrite(&html);
        assert_eq!(html, "<p>See <a href=\"Field.html\">Field.html</a> for details.</p>\n");
    }

    #[test]
    fn urls_in_links_and_code_are_not_linked_again() {
        let md = "[site](https://example.com) `https://example.com/code`\n\n```\nhttps://example.com/block\n```\n";
        let html = render_html(md).unwrap();
        assert_eq!(html.matches("<a ").count(), 1);
        assert!(html.contains("<code>https://example.com/code</code>"));
        assert!(html.contains("<pre><code>https://example.com/block\n</code></pre>"));
    }

    #[test]
    fn single_newline_is_a_line_break() {
        let html = render_html("line one\nline two").unwrap();
        assert_eq!(html, "<p>line one<br />\nline two</p>\n");
    }

    #[test]
    fn slug_rules() {
        assert_eq!(github_slug("Getting Started!"), "getting-started");
        assert_eq!(github_slug("  `bar: string`  "), "bar-string");
        assert_eq!(github_slug("onChange(value) : Function"), "onchangevalue--function");
        assert_eq!(github_slug("under_score"), "under_score");
    }
}
