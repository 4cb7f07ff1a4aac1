//! Frontmatter stripping for preview rendering.
//!
//! When the source pane shows the note's YAML frontmatter block, the
//! preview must not render it as markdown. This split is lenient by
//! design: the preview path never fails over frontmatter, and a block
//! whose YAML does not parse is still stripped (its metadata is just
//! unavailable).

use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

static FRONTMATTER_REGEX: OnceLock<Regex> = OnceLock::new();

fn frontmatter_regex() -> &'static Regex {
    FRONTMATTER_REGEX.get_or_init(|| Regex::new(r"(?s)^---\s*\n(.*?)\n---\s*\n(.*)$").unwrap())
}

/// The frontmatter fields the preview path cares about.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NoteMeta {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,
}

/// Split a leading frontmatter block off the note body.
///
/// Returns the parsed metadata (when the YAML is valid) and the body.
/// Content without a frontmatter block comes back untouched.
pub fn strip_frontmatter(content: &str) -> (Option<NoteMeta>, &str) {
    match frontmatter_regex().captures(content) {
        Some(caps) => {
            let meta = serde_yaml::from_str(caps.get(1).unwrap().as_str()).ok();
            (meta, caps.get(2).unwrap().as_str())
        }
        None => (None, content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frontmatter_is_split_off() {
        let content = "---\ntitle: Standup\ntags: [work, daily]\n---\n# Notes\n";
        let (meta, body) = strip_frontmatter(content);

        let meta = meta.unwrap();
        assert_eq!(meta.title.as_deref(), Some("Standup"));
        assert_eq!(meta.tags, vec!["work", "daily"]);
        assert_eq!(body, "# Notes\n");
    }

    #[test]
    fn no_frontmatter_returns_content_unchanged() {
        let content = "# Just a note\n";
        assert_eq!(strip_frontmatter(content), (None, content));
    }

    #[test]
    fn malformed_yaml_is_still_stripped() {
        let content = "---\ntitle: [unclosed\n---\nbody\n";
        let (meta, body) = strip_frontmatter(content);
        assert_eq!(meta, None);
        assert_eq!(body, "body\n");
    }

    #[test]
    fn a_rule_mid_document_is_not_frontmatter() {
        let content = "intro\n---\nnot: yaml\n---\nrest\n";
        assert_eq!(strip_frontmatter(content), (None, content));
    }
}
