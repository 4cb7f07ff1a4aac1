//! Footnote extraction and reference rewriting.
//!
//! Definitions (`[^id]: text` on a line of its own) are pulled out of
//! the body and rendered as an ordered-list section after the body
//! HTML. Inline references (`[^id]`) become superscript anchors. A
//! reference to an id that was never defined still renders as a
//! dangling anchor; nothing validates the pairing.

use grove_types::Footnote;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static DEFINITION: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\[\^(\w+)\]:\s*(.+)$").unwrap());

static REFERENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\^(\w+)\]").unwrap());

/// Pull footnote definitions out of the body.
///
/// Returns the body with definition lines removed, plus the captured
/// footnotes in insertion order. A duplicate id overwrites the earlier
/// text but keeps the earlier position: last write wins. The editor
/// has always behaved this way, so it stays.
pub fn extract_definitions(source: &str) -> (String, Vec<Footnote>) {
    let mut footnotes: Vec<Footnote> = Vec::new();

    for caps in DEFINITION.captures_iter(source) {
        let id = &caps[1];
        let text = caps[2].to_string();

        match footnotes.iter_mut().find(|f| f.id == id) {
            Some(existing) => existing.text = text,
            None => footnotes.push(Footnote {
                id: id.to_string(),
                text,
            }),
        }
    }

    let body = DEFINITION.replace_all(source, "").into_owned();
    (body, footnotes)
}

/// Rewrite remaining inline `[^id]` references into superscript
/// anchors pointing at `#fn-id`. Must run after definition extraction.
pub fn rewrite_references(source: &str) -> String {
    REFERENCE
        .replace_all(source, |caps: &Captures| {
            let id = &caps[1];
            format!(
                r##"<sup class="footnote-ref"><a href="#fn-{id}" id="fnref-{id}">{id}</a></sup>"##
            )
        })
        .into_owned()
}

/// Render the bottom-of-document footnotes section.
///
/// `None` when there are no footnotes, so empty documents do not grow
/// an empty section.
pub fn render_section(footnotes: &[Footnote]) -> Option<String> {
    if footnotes.is_empty() {
        return None;
    }

    let mut html = String::from(
        r#"<hr class="footnotes-sep"><section class="footnotes"><ol class="footnotes-list">"#,
    );
    for footnote in footnotes {
        html.push_str(&format!(
            r##"<li id="fn-{id}" class="footnote-item"><p>{text} <a href="#fnref-{id}" class="footnote-backref">↩</a></p></li>"##,
            id = footnote.id,
            text = footnote.text,
        ));
    }
    html.push_str("</ol></section>");

    Some(html)
}
