//! Wikilink rewriting for [[Note Title]] syntax.
//!
//! Every `[[name]]` becomes an inline anchor carrying the raw title in
//! a `data-note` attribute. Resolution to a note path happens at click
//! time through [`crate::resolve::WikilinkResolver`]; the title-to-path
//! index can go stale between renders, so the render pass never bakes
//! a target in.

use super::escape_html;

/// Rewrite every `[[name]]` into an inline anchor tag.
///
/// A `[[` with no closing `]]`, an empty title, or a title spanning a
/// line break is left as literal text.
pub fn rewrite_wikilinks(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut remaining = source;

    while let Some(start) = remaining.find("[[") {
        out.push_str(&remaining[..start]);
        let after_open = &remaining[start + 2..];

        match after_open.find("]]") {
            Some(end) => {
                let name = &after_open[..end];
                if name.is_empty() || name.contains(']') || name.contains('\n') {
                    // Not a wikilink; emit the brackets and rescan from
                    // just past them so nested candidates still match.
                    out.push_str("[[");
                    remaining = after_open;
                } else {
                    out.push_str(&anchor_for(name));
                    remaining = &after_open[end + 2..];
                }
            }
            None => {
                out.push_str(&remaining[start..]);
                return out;
            }
        }
    }

    out.push_str(remaining);
    out
}

fn anchor_for(name: &str) -> String {
    let escaped = escape_html(name);
    format!(r##"<a href="#" class="wikilink" data-note="{escaped}">{escaped}</a>"##)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_wikilink() {
        let out = rewrite_wikilinks("Check out [[Rust Safety]]");
        assert_eq!(
            out,
            r##"Check out <a href="#" class="wikilink" data-note="Rust Safety">Rust Safety</a>"##
        );
    }

    #[test]
    fn multiple_wikilinks_rewrite_independently() {
        let out = rewrite_wikilinks("[[Foo]] and [[Foo]]");
        assert_eq!(out.matches(r#"data-note="Foo""#).count(), 2);
    }

    #[test]
    fn unterminated_link_is_literal() {
        let out = rewrite_wikilinks("dangling [[Foo");
        assert_eq!(out, "dangling [[Foo");
    }

    #[test]
    fn stray_bracket_is_literal_but_later_links_match() {
        let out = rewrite_wikilinks("[[a]b]] then [[Real]]");
        assert!(out.starts_with("[[a]b]] then "));
        assert!(out.contains(r#"data-note="Real""#));
    }

    #[test]
    fn empty_title_is_literal() {
        assert_eq!(rewrite_wikilinks("[[]]"), "[[]]");
    }

    #[test]
    fn title_is_attribute_escaped() {
        let out = rewrite_wikilinks(r#"[[Say "hi" & bye]]"#);
        assert!(out.contains(r#"data-note="Say &quot;hi&quot; &amp; bye""#));
    }
}
