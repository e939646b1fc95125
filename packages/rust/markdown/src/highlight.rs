//! Server-side syntax highlighting for fenced code blocks.
//!
//! Tokens are emitted as `<span class="...">` so the page header's stylesheet
//! decides the colors.

use std::sync::LazyLock;

use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use mddocset_shared::{DocsetError, Result};

static SYNTAXES: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);

/// Render `code` as a highlighted `<pre><code>` block for the fence language `lang`.
///
/// Unknown languages are highlighted as plain text but keep their
/// `language-*` class.
pub(crate) fn highlight_block(lang: &str, code: &str) -> Result<String> {
    let syntax = SYNTAXES
        .find_syntax_by_token(lang)
        .unwrap_or_else(|| SYNTAXES.find_syntax_plain_text());

    let mut generator =
        ClassedHTMLGenerator::new_with_class_style(syntax, &SYNTAXES, ClassStyle::Spaced);
    for line in LinesWithEndings::from(code) {
        generator
            .parse_html_for_line_which_includes_newline(line)
            .map_err(|e| DocsetError::Render(format!("highlighting {lang} block: {e}")))?;
    }

    Ok(format!(
        "<pre><code class=\"hljs language-{}\">{}</code></pre>\n",
        class_safe(lang),
        generator.finalize()
    ))
}

/// Keep only characters that are harmless inside a class attribute.
fn class_safe(lang: &str) -> String {
    lang.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+' | '#' | '.'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_language_gets_token_spans() {
        let html = highlight_block("js", "const a = 1;\n").unwrap();
        assert!(html.starts_with("<pre><code class=\"hljs language-js\">"));
        assert!(html.contains("<span class="));
        assert!(html.contains("const"));
    }

    #[test]
    fn unknown_language_is_escaped_plain_text() {
        let html = highlight_block("nosuchlang", "<div>&</div>\n").unwrap();
        assert!(html.contains("language-nosuchlang"));
        assert!(html.contains("&lt;div&gt;&amp;&lt;/div&gt;"));
    }

    #[test]
    fn class_attribute_is_sanitized() {
        assert_eq!(class_safe("c++\"onload"), "c++onload");
    }
}
