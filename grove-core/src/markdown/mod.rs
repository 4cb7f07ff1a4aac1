//! Markdown preprocessing applied before the external renderer runs.

pub mod footnotes;
pub mod wikilinks;

use grove_types::Footnote;

pub use footnotes::{extract_definitions, render_section, rewrite_references};
pub use wikilinks::rewrite_wikilinks;

/// Result of one preprocessing pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Preprocessed {
    /// Transformed markdown, ready for the renderer.
    pub markdown: String,

    /// Footnote definitions in insertion order.
    pub footnotes: Vec<Footnote>,
}

/// Source-to-source transforms applied before markdown rendering.
///
/// Rules run in a fixed order (wikilinks, then footnote definition
/// extraction, then footnote reference rewriting) and later rules must
/// not corrupt earlier substitutions. The pass is pure: same input,
/// same output, no side effects.
pub struct Preprocessor;

impl Preprocessor {
    pub fn new() -> Self {
        Self
    }

    pub fn preprocess(&self, source: &str) -> Preprocessed {
        let markdown = wikilinks::rewrite_wikilinks(source);
        let (markdown, footnotes) = footnotes::extract_definitions(&markdown);
        let markdown = footnotes::rewrite_references(&markdown);

        Preprocessed {
            markdown,
            footnotes,
        }
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rules_compose_in_order() {
        let source = "See [[Other Note]] for details[^a].\n\n[^a]: the fine print\n";
        let result = Preprocessor::new().preprocess(source);

        assert!(result.markdown.contains(r#"data-note="Other Note""#));
        assert!(result.markdown.contains(r##"href="#fn-a""##));
        assert!(!result.markdown.contains("[^a]:"));
        assert_eq!(result.footnotes.len(), 1);
        assert_eq!(result.footnotes[0].text, "the fine print");
    }

    #[test]
    fn preprocess_is_pure() {
        let source = "# Title\n\n[[A]] [^x]\n\n[^x]: note\n";
        let pre = Preprocessor::new();
        assert_eq!(pre.preprocess(source), pre.preprocess(source));
    }

    #[test]
    fn plain_markdown_passes_through() {
        let source = "# Title\n\nJust **bold** text.\n";
        let result = Preprocessor::new().preprocess(source);
        assert_eq!(result.markdown, source);
        assert!(result.footnotes.is_empty());
    }
}
