//! Post-render hooks applied to the rendered HTML.
//!
//! The original editor patched extra behavior onto the renderer after
//! the fact; here every rewrite is an explicit [`PostRenderHook`] run
//! by a [`HookPipeline`] in a fixed order: relative path resolution,
//! diagram container materialization, syntax highlighting.

pub mod diagrams;
pub mod highlight;
pub mod paths;

pub use diagrams::{DiagramBlockHook, DiagramError, DiagramRenderer};
pub use highlight::{HighlightError, HighlightHook, SyntaxTokenizer, SyntectTokenizer, TokenPalette};
pub use paths::RelativePathHook;

use crate::config::PreviewConfig;
use grove_types::ThemeVariant;

/// Context a hook may consult while rewriting.
#[derive(Debug, Clone)]
pub struct NoteContext {
    /// Vault-relative path of the open note, e.g. `work/today.md`.
    /// `None` when no note is open (relative resolution is skipped).
    pub note_path: Option<String>,

    pub theme: ThemeVariant,
}

/// One post-render rewrite stage. Hooks take the rendered HTML and
/// return it transformed; they never fail the render.
pub trait PostRenderHook {
    fn name(&self) -> &'static str;

    fn apply(&self, html: String, ctx: &NoteContext) -> String;
}

/// Ordered hook pipeline. Hooks run in registration order, each seeing
/// the previous hook's output.
pub struct HookPipeline {
    hooks: Vec<Box<dyn PostRenderHook>>,
}

impl HookPipeline {
    pub fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    /// The standard pipeline: paths, diagrams, highlighting.
    pub fn standard(config: &PreviewConfig) -> Self {
        let mut pipeline = Self::new();
        pipeline.push(Box::new(RelativePathHook::new(config.file_base.as_str())));
        pipeline.push(Box::new(DiagramBlockHook::new(&config.diagram_languages)));
        pipeline.push(Box::new(HighlightHook::new(Box::new(SyntectTokenizer::new()))));
        pipeline
    }

    pub fn push(&mut self, hook: Box<dyn PostRenderHook>) {
        self.hooks.push(hook);
    }

    pub fn apply(&self, html: String, ctx: &NoteContext) -> String {
        self.hooks.iter().fold(html, |html, hook| {
            tracing::debug!(hook = hook.name(), "running post-render hook");
            hook.apply(html, ctx)
        })
    }
}

impl Default for HookPipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Undo the renderer's entity escaping for text handed back to
/// external tools (tokenizer, diagram renderer). `&amp;` goes last so
/// double-escaped input survives.
pub(crate) fn unescape_html(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
