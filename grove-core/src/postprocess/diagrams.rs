//! Diagram code-block materialization.
//!
//! Fenced blocks tagged with a diagram language are swapped for
//! container elements holding the raw diagram source. The containers
//! are handed to the external diagram renderer after the synchronous
//! DOM swap completes; a renderer failure keeps the source container
//! and is logged, never propagated.

use super::{unescape_html, NoteContext, PostRenderHook};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiagramError {
    #[error("diagram rendering failed: {0}")]
    Failed(String),
}

/// External diagram renderer contract: raw diagram source in, rendered
/// markup (typically SVG) out.
pub trait DiagramRenderer {
    fn render(&self, source: &str) -> Result<String, DiagramError>;
}

static CONTAINER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?s)<div class="mermaid">(.*?)</div>"#).unwrap());

/// Replaces diagram-language code blocks with `<div class="mermaid">`
/// containers.
pub struct DiagramBlockHook {
    pattern: Option<Regex>,
}

impl DiagramBlockHook {
    pub fn new(languages: &[String]) -> Self {
        let pattern = if languages.is_empty() {
            None
        } else {
            let alternatives = languages
                .iter()
                .map(|lang| regex::escape(lang))
                .collect::<Vec<_>>()
                .join("|");
            Some(
                Regex::new(&format!(
                    r#"(?s)<pre><code class="language-(?:{alternatives})">(.*?)</code></pre>"#
                ))
                .expect("diagram block pattern"),
            )
        };

        Self { pattern }
    }
}

impl PostRenderHook for DiagramBlockHook {
    fn name(&self) -> &'static str {
        "diagram-blocks"
    }

    fn apply(&self, html: String, _ctx: &NoteContext) -> String {
        let Some(pattern) = &self.pattern else {
            return html;
        };

        pattern
            .replace_all(&html, |caps: &Captures| {
                format!(r#"<div class="mermaid">{}</div>"#, &caps[1])
            })
            .into_owned()
    }
}

/// Raw (unescaped) sources of every diagram container, in document
/// order, for handing to the async renderer.
pub fn container_sources(html: &str) -> Vec<String> {
    CONTAINER
        .captures_iter(html)
        .map(|caps| unescape_html(caps[1].trim_end()))
        .collect()
}

/// Run the external renderer over every container, substituting its
/// output in place. A failing container keeps its source.
pub fn run_renderer(html: &str, renderer: &dyn DiagramRenderer) -> String {
    CONTAINER
        .replace_all(html, |caps: &Captures| {
            let source = unescape_html(caps[1].trim_end());
            match renderer.render(&source) {
                Ok(rendered) => format!(r#"<div class="mermaid">{rendered}</div>"#),
                Err(err) => {
                    tracing::warn!("diagram renderer failed: {err}");
                    caps[0].to_string()
                }
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::escape_html;
    use grove_types::ThemeVariant;

    fn ctx() -> NoteContext {
        NoteContext {
            note_path: None,
            theme: ThemeVariant::Dark,
        }
    }

    #[test]
    fn mermaid_block_becomes_container() {
        let hook = DiagramBlockHook::new(&["mermaid".to_string()]);
        let html =
            "<pre><code class=\"language-mermaid\">graph TD;\nA--&gt;B;\n</code></pre>".to_string();
        let out = hook.apply(html, &ctx());

        assert!(out.starts_with(r#"<div class="mermaid">"#));
        assert!(!out.contains("<pre>"));
    }

    #[test]
    fn other_languages_untouched() {
        let hook = DiagramBlockHook::new(&["mermaid".to_string()]);
        let html = "<pre><code class=\"language-rust\">fn main() {}\n</code></pre>".to_string();
        assert_eq!(hook.apply(html.clone(), &ctx()), html);
    }

    #[test]
    fn container_sources_are_unescaped() {
        let html = r#"<div class="mermaid">graph TD;
A--&gt;B;</div>"#;
        assert_eq!(container_sources(html), vec!["graph TD;\nA-->B;"]);
    }

    #[test]
    fn renderer_failure_keeps_the_container() {
        struct Broken;
        impl DiagramRenderer for Broken {
            fn render(&self, _source: &str) -> Result<String, DiagramError> {
                Err(DiagramError::Failed("no layout engine".into()))
            }
        }

        let html = r#"<div class="mermaid">graph TD;</div>"#;
        assert_eq!(run_renderer(html, &Broken), html);
    }

    #[test]
    fn renderer_output_replaces_the_source() {
        struct Svg;
        impl DiagramRenderer for Svg {
            fn render(&self, source: &str) -> Result<String, DiagramError> {
                Ok(format!("<svg><!--{}--></svg>", source.len()))
            }
        }

        let html = r#"<div class="mermaid">graph TD;</div>"#;
        let out = run_renderer(html, &Svg);
        assert!(out.contains("<svg>"));
        assert!(!out.contains("graph TD;"));
    }

    #[test]
    fn escaped_source_survives_round_trip() {
        let raw = "graph TD;\nA-->B;";
        let escaped = escape_html(raw);
        let html = format!(r#"<div class="mermaid">{escaped}</div>"#);
        assert_eq!(container_sources(&html), vec![raw]);
    }
}
