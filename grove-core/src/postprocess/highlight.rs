//! Code syntax highlighting and the fixed token palette.
//!
//! Code blocks are tokenized by an external tokenizer (syntect by
//! default), which marks tokens with class names. Colors are then
//! applied from a fixed class→color palette as highest-priority inline
//! styles, deliberately, so content-overriding browser extensions
//! (dark-mode repainters and the like) cannot restyle code blocks.

use super::{unescape_html, NoteContext, PostRenderHook};
use grove_types::ThemeVariant;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::sync::OnceLock;
use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HighlightError {
    #[error("tokenizer failed: {0}")]
    Tokenize(String),
}

/// External tokenizer contract: code text in, class-annotated span
/// markup out. Classes are prefixed `tok-`; the palette maps the
/// suffix to a color.
pub trait SyntaxTokenizer {
    fn highlight(&self, code: &str, lang: &str) -> Result<String, HighlightError>;
}

const CLASS_PREFIX: &str = "tok-";

static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();

fn syntax_set() -> &'static SyntaxSet {
    SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines)
}

/// Default tokenizer backed by syntect.
pub struct SyntectTokenizer;

impl SyntectTokenizer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SyntectTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntaxTokenizer for SyntectTokenizer {
    fn highlight(&self, code: &str, lang: &str) -> Result<String, HighlightError> {
        let ss = syntax_set();
        let syntax = ss
            .find_syntax_by_token(lang)
            .or_else(|| ss.find_syntax_by_extension(lang))
            .unwrap_or_else(|| ss.find_syntax_plain_text());

        let mut generator = ClassedHTMLGenerator::new_with_class_style(
            syntax,
            ss,
            ClassStyle::SpacedPrefixed {
                prefix: CLASS_PREFIX,
            },
        );
        for line in LinesWithEndings::from(code) {
            generator
                .parse_html_for_line_which_includes_newline(line)
                .map_err(|err| HighlightError::Tokenize(err.to_string()))?;
        }

        Ok(generator.finalize())
    }
}

/// Fixed token-class→color lookup, one variant per theme. Colors are
/// the atom-one-dark / atom-one-light values the editor has always
/// shipped.
pub struct TokenPalette {
    pub base: &'static str,
    pub background: &'static str,
    pub border: &'static str,
    tokens: &'static [(&'static str, &'static str)],
}

static DARK: TokenPalette = TokenPalette {
    base: "#abb2bf",
    background: "#282c34",
    border: "#3e4451",
    tokens: &[
        ("keyword", "#c678dd"),
        ("storage", "#c678dd"),
        ("comment", "#5c6370"),
        ("string", "#98c379"),
        ("constant", "#d19a66"),
        ("variable", "#e06c75"),
        ("entity", "#61aeee"),
        ("support", "#e6c07b"),
        ("meta", "#61aeee"),
        ("invalid", "#e06c75"),
    ],
};

static LIGHT: TokenPalette = TokenPalette {
    base: "#383a42",
    background: "#fafafa",
    border: "#e0e0e0",
    tokens: &[
        ("keyword", "#a626a4"),
        ("storage", "#a626a4"),
        ("comment", "#a0a1a7"),
        ("string", "#50a14f"),
        ("constant", "#986801"),
        ("variable", "#e45649"),
        ("entity", "#4078f2"),
        ("support", "#c18401"),
        ("meta", "#4078f2"),
        ("invalid", "#e45649"),
    ],
};

impl TokenPalette {
    pub fn for_theme(theme: ThemeVariant) -> &'static TokenPalette {
        match theme {
            ThemeVariant::Dark => &DARK,
            ThemeVariant::Light => &LIGHT,
        }
    }

    /// Color for a span's class list: the first prefixed class with a
    /// palette entry wins.
    pub fn color_for(&self, classes: &str) -> Option<&'static str> {
        classes
            .split_whitespace()
            .filter_map(|class| class.strip_prefix(CLASS_PREFIX))
            .find_map(|token| {
                self.tokens
                    .iter()
                    .find(|(name, _)| *name == token)
                    .map(|(_, color)| *color)
            })
    }
}

static TOKEN_SPAN: Lazy<Regex> = Lazy::new(|| Regex::new(r#"<span class="([^"]*)">"#).unwrap());

static CODE_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<pre><code( class="language-([^"]*)")?>(.*?)</code></pre>"#).unwrap()
});

/// Highlights remaining code blocks and pins the palette colors on as
/// inline styles.
pub struct HighlightHook {
    tokenizer: Box<dyn SyntaxTokenizer>,
}

impl HighlightHook {
    pub fn new(tokenizer: Box<dyn SyntaxTokenizer>) -> Self {
        Self { tokenizer }
    }

    fn rewrite_block(&self, caps: &Captures, palette: &TokenPalette) -> String {
        let lang = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        let code = unescape_html(&caps[3]);

        let tokenized = match self.tokenizer.highlight(&code, lang) {
            Ok(tokenized) => tokenized,
            Err(err) => {
                tracing::warn!("syntax tokenizer failed: {err}");
                return caps[0].to_string();
            }
        };
        let painted = paint_tokens(&tokenized, palette);

        let label = if lang.is_empty() || lang == "plaintext" {
            String::new()
        } else {
            format!(r#"<span class="code-lang-label">{lang}</span>"#)
        };
        let class_attr = if lang.is_empty() {
            String::new()
        } else {
            format!(r#" class="language-{lang}""#)
        };

        format!(
            "<pre class=\"code-block\" style=\"background:{bg} !important;border-color:{border} !important\">{label}<code{class_attr} style=\"color:{base} !important;background:transparent !important\">{painted}</code></pre>",
            bg = palette.background,
            border = palette.border,
            base = palette.base,
        )
    }
}

impl PostRenderHook for HighlightHook {
    fn name(&self) -> &'static str {
        "highlight"
    }

    fn apply(&self, html: String, ctx: &NoteContext) -> String {
        let palette = TokenPalette::for_theme(ctx.theme);
        CODE_BLOCK
            .replace_all(&html, |caps: &Captures| self.rewrite_block(caps, palette))
            .into_owned()
    }
}

/// Pin palette colors onto tokenized spans as inline styles.
fn paint_tokens(html: &str, palette: &TokenPalette) -> String {
    TOKEN_SPAN
        .replace_all(html, |caps: &Captures| match palette.color_for(&caps[1]) {
            Some(color) => format!(
                r#"<span class="{}" style="color:{color} !important">"#,
                &caps[1]
            ),
            None => caps[0].to_string(),
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(theme: ThemeVariant) -> NoteContext {
        NoteContext {
            note_path: None,
            theme,
        }
    }

    #[test]
    fn palette_lookup_takes_first_known_class() {
        let palette = TokenPalette::for_theme(ThemeVariant::Dark);
        assert_eq!(
            palette.color_for("tok-source tok-keyword tok-rust"),
            Some("#c678dd")
        );
        assert_eq!(palette.color_for("tok-source tok-rust"), None);
        assert_eq!(palette.color_for("unprefixed keyword"), None);
    }

    #[test]
    fn variants_disagree_on_colors() {
        let dark = TokenPalette::for_theme(ThemeVariant::Dark);
        let light = TokenPalette::for_theme(ThemeVariant::Light);
        assert_ne!(dark.color_for("tok-string"), light.color_for("tok-string"));
    }

    #[test]
    fn paint_pins_inline_styles() {
        let palette = TokenPalette::for_theme(ThemeVariant::Dark);
        let html = r#"<span class="tok-keyword">fn</span><span class="tok-rust">x</span>"#;
        let painted = paint_tokens(html, palette);

        assert!(painted.contains(r#"style="color:#c678dd !important""#));
        assert!(painted.contains(r#"<span class="tok-rust">x</span>"#));
    }

    #[test]
    fn hook_rewrites_code_blocks_with_inline_styles() {
        let hook = HighlightHook::new(Box::new(SyntectTokenizer::new()));
        let html = "<pre><code class=\"language-rs\">fn main() {}\n</code></pre>".to_string();
        let out = hook.apply(html, &ctx(ThemeVariant::Dark));

        assert!(out.contains("background:#282c34 !important"));
        assert!(out.contains("color:#abb2bf !important"));
        assert!(out.contains(r#"<span class="code-lang-label">rs</span>"#));
    }

    #[test]
    fn plain_block_gets_base_colors_but_no_label() {
        let hook = HighlightHook::new(Box::new(SyntectTokenizer::new()));
        let html = "<pre><code>just text\n</code></pre>".to_string();
        let out = hook.apply(html, &ctx(ThemeVariant::Light));

        assert!(out.contains("background:#fafafa !important"));
        assert!(!out.contains("code-lang-label"));
    }

    #[test]
    fn tokenizer_failure_keeps_the_original_block() {
        struct Broken;
        impl SyntaxTokenizer for Broken {
            fn highlight(&self, _code: &str, _lang: &str) -> Result<String, HighlightError> {
                Err(HighlightError::Tokenize("grammar missing".into()))
            }
        }

        let hook = HighlightHook::new(Box::new(Broken));
        let html = "<pre><code class=\"language-rs\">fn main() {}\n</code></pre>".to_string();
        assert_eq!(hook.apply(html.clone(), &ctx(ThemeVariant::Dark)), html);
    }
}
