//! Relative asset path resolution in rendered HTML.
//!
//! Notes reference images and attachments relative to their own
//! directory (`./shot.png`, `assets/shot.png`). The rendered pane needs
//! absolute API-file references, so this hook rewrites `<img src>` and
//! local file `<a href>` values against the open note's directory.
//! Intra-app and external navigation (leading `/` or `#`, `http(s)`,
//! `data:` URIs, `.md` note links) is left untouched.

use super::{NoteContext, PostRenderHook};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static IMG_SRC: Lazy<Regex> = Lazy::new(|| Regex::new(r#"<img([^>]*?) src="([^"]*)""#).unwrap());

static A_HREF: Lazy<Regex> = Lazy::new(|| Regex::new(r#"<a([^>]*?) href="([^"]*)""#).unwrap());

pub struct RelativePathHook {
    file_base: String,
}

impl RelativePathHook {
    pub fn new(file_base: impl Into<String>) -> Self {
        Self {
            file_base: file_base.into(),
        }
    }
}

impl PostRenderHook for RelativePathHook {
    fn name(&self) -> &'static str {
        "relative-paths"
    }

    fn apply(&self, html: String, ctx: &NoteContext) -> String {
        let Some(note_path) = ctx.note_path.as_deref() else {
            return html;
        };
        let dir = note_dir(note_path);

        let html = IMG_SRC.replace_all(&html, |caps: &Captures| {
            let src = &caps[2];
            if !is_relative_image(src) {
                return caps[0].to_string();
            }
            format!(
                r#"<img{} src="{}{}""#,
                &caps[1],
                self.file_base,
                resolve(dir, src)
            )
        });

        A_HREF
            .replace_all(&html, |caps: &Captures| {
                let href = &caps[2];
                if !is_relative_file_link(href) {
                    return caps[0].to_string();
                }
                format!(
                    r#"<a{} href="{}{}" target="_blank""#,
                    &caps[1],
                    self.file_base,
                    resolve(dir, href)
                )
            })
            .into_owned()
    }
}

fn is_relative_image(src: &str) -> bool {
    !(src.starts_with('/') || src.starts_with("http") || src.starts_with("data:"))
}

fn is_relative_file_link(href: &str) -> bool {
    if href.starts_with('/')
        || href.starts_with("http")
        || href.starts_with('#')
        || href.ends_with(".md")
    {
        return false;
    }
    // Must look like a file: has an extension, no scheme.
    href.contains('.') && !href.contains("://")
}

/// Directory of a vault-relative note path ("" for vault-root notes).
fn note_dir(note_path: &str) -> &str {
    note_path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

fn resolve(dir: &str, raw: &str) -> String {
    let rel = raw.strip_prefix("./").unwrap_or(raw);
    if dir.is_empty() {
        rel.to_string()
    } else {
        format!("{dir}/{rel}")
    }
}
