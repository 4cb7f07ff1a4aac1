//! Markdown renderer adapter.
//!
//! The markdown-to-HTML conversion is an external collaborator, not
//! part of the engine. Embedders hand us whatever renderer their
//! platform ships, a plain callable or an object exposing `parse`,
//! and both shapes sit behind the one [`MarkdownRenderer`] trait.
//! [`CmarkRenderer`] is the default implementation.

use pulldown_cmark::{html, Options, Parser};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("markdown renderer failed: {0}")]
    Failed(String),
}

/// External markdown renderer contract: markdown text in, HTML out.
/// Assumed synchronous and pure for a given input.
pub trait MarkdownRenderer {
    fn render(&self, markdown: &str) -> Result<String, RenderError>;
}

/// Plain callables are renderers.
impl<F> MarkdownRenderer for F
where
    F: Fn(&str) -> String,
{
    fn render(&self, markdown: &str) -> Result<String, RenderError> {
        Ok(self(markdown))
    }
}

/// The object-with-`parse` renderer calling convention.
pub trait Parse {
    fn parse(&self, markdown: &str) -> String;
}

/// Adapter carrying a [`Parse`] object into the renderer seat.
pub struct ParseAdapter<P>(pub P);

impl<P: Parse> MarkdownRenderer for ParseAdapter<P> {
    fn render(&self, markdown: &str) -> Result<String, RenderError> {
        Ok(self.0.parse(markdown))
    }
}

/// Default renderer backed by pulldown-cmark.
pub struct CmarkRenderer {
    options: Options,
}

impl CmarkRenderer {
    pub fn new() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_HEADING_ATTRIBUTES);
        // Note: ENABLE_FOOTNOTES stays off; footnote syntax is owned
        // by the preprocessor, which has already rewritten it.

        Self { options }
    }
}

impl Default for CmarkRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownRenderer for CmarkRenderer {
    fn render(&self, markdown: &str) -> Result<String, RenderError> {
        let parser = Parser::new_ext(markdown, self.options);
        let mut out = String::new();
        html::push_html(&mut out, parser);
        Ok(out)
    }
}

/// Inline error panel substituted into the preview pane when the
/// renderer fails. The source pane stays usable; a rendering failure
/// is local and non-fatal.
pub fn error_panel(message: &str) -> String {
    format!(
        r#"<div class="preview-error">⚠️ Error rendering markdown:<br>{}</div>"#,
        crate::markdown::escape_html(message)
    )
}
