//! Editor session: owns preview state and wires the pipeline together.
//!
//! One [`EditorSession`] per open editor. It carries what used to be
//! global module state (current note, mode, cached section map) so
//! multiple sessions can coexist and everything is testable in
//! isolation.

use crate::config::PreviewConfig;
use crate::markdown::{footnotes, Preprocessor};
use crate::measure::{measure_line_offsets, MirrorMetrics};
use crate::postprocess::{diagrams, DiagramRenderer, HookPipeline, NoteContext};
use crate::render::{error_panel, CmarkRenderer, MarkdownRenderer};
use crate::resolve::WikilinkResolver;
use crate::section_map::{build_section_map, RenderedLayout};
use crate::sync::{Clock, RenderScroll, ScrollExtents, ScrollSync, SystemClock};
use crate::{anchors, frontmatter};
use grove_types::{Footnote, LayoutEvent, PreviewMode, SectionMap};

/// Output of one preview render pass.
#[derive(Debug, Clone)]
pub struct PreviewOutput {
    /// Full preview HTML: rendered body, then the footnotes section
    /// when any footnotes exist.
    pub html: String,

    /// Footnotes extracted this pass. Rebuilt from scratch every
    /// render; never incrementally updated.
    pub footnotes: Vec<Footnote>,

    /// Raw sources of diagram containers, in document order, awaiting
    /// the async diagram renderer.
    pub diagram_sources: Vec<String>,

    /// True when the renderer failed and `html` is the inline error
    /// panel instead of rendered content.
    pub render_failed: bool,
}

/// What activating a wikilink should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WikilinkOutcome {
    /// Load the resolved note.
    Navigate(String),

    /// Show a transient "not found" notification; do not navigate.
    NotFound { title: String },
}

/// Token for one section-map rebuild. A map installed under a stale
/// ticket is discarded: the newest rebuild wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RebuildTicket(u64);

pub struct EditorSession {
    config: PreviewConfig,
    preprocessor: Preprocessor,
    renderer: Box<dyn MarkdownRenderer>,
    hooks: HookPipeline,
    clock: Box<dyn Clock>,

    note_path: Option<String>,
    content: String,
    mode: PreviewMode,

    section_map: Option<SectionMap>,
    sync: ScrollSync,
    rebuild_epoch: u64,
}

impl EditorSession {
    pub fn new(config: PreviewConfig) -> Self {
        let hooks = HookPipeline::standard(&config);
        let sync = ScrollSync::new(config.suppress_window_ms);

        Self {
            config,
            preprocessor: Preprocessor::new(),
            renderer: Box::new(CmarkRenderer::new()),
            hooks,
            clock: Box::new(SystemClock::new()),
            note_path: None,
            content: String::new(),
            mode: PreviewMode::Edit,
            section_map: None,
            sync,
            rebuild_epoch: 0,
        }
    }

    /// Swap in a different external renderer.
    pub fn with_renderer(mut self, renderer: Box<dyn MarkdownRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Swap in a different clock (tests use a manual one).
    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the hook pipeline.
    pub fn with_hooks(mut self, hooks: HookPipeline) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn open_note(&mut self, path: impl Into<String>, content: impl Into<String>) {
        self.note_path = Some(path.into());
        self.content = content.into();
        self.section_map = None;
    }

    pub fn note_path(&self) -> Option<&str> {
        self.note_path.as_deref()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Apply an edit. Invalidates the cached section map.
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.apply_layout_event(LayoutEvent::ContentEdited);
    }

    pub fn mode(&self) -> PreviewMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: PreviewMode) {
        self.mode = mode;
    }

    /// Render the preview for the current content.
    ///
    /// Renderer failure is local: the output carries an inline error
    /// panel and `render_failed`, and the source pane stays usable.
    pub fn render_preview(&self) -> PreviewOutput {
        let body = if self.config.show_frontmatter {
            frontmatter::strip_frontmatter(&self.content).1
        } else {
            self.content.as_str()
        };

        let pre = self.preprocessor.preprocess(body);

        let (mut html, render_failed) = match self.renderer.render(&pre.markdown) {
            Ok(html) => (html, false),
            Err(err) => {
                tracing::warn!("markdown renderer failed: {err}");
                (error_panel(&err.to_string()), true)
            }
        };

        if !render_failed {
            let ctx = NoteContext {
                note_path: self.note_path.clone(),
                theme: self.config.theme,
            };
            html = self.hooks.apply(html, &ctx);

            if let Some(section) = footnotes::render_section(&pre.footnotes) {
                html.push_str(&section);
            }
        }

        let diagram_sources = diagrams::container_sources(&html);

        PreviewOutput {
            html,
            footnotes: pre.footnotes,
            diagram_sources,
            render_failed,
        }
    }

    /// Run the external diagram renderer over the preview's containers
    /// after the synchronous swap. Failing containers keep their
    /// source.
    pub fn materialize_diagrams(&self, html: &str, renderer: &dyn DiagramRenderer) -> String {
        diagrams::run_renderer(html, renderer)
    }

    // --- section map lifecycle ---

    /// Start a rebuild. Any result installed under an older ticket is
    /// stale and will be dropped: last writer wins, no partial maps.
    pub fn begin_rebuild(&mut self) -> RebuildTicket {
        self.rebuild_epoch += 1;
        RebuildTicket(self.rebuild_epoch)
    }

    /// Install a freshly built map. Returns false (and drops the map)
    /// when a newer rebuild has started since the ticket was issued.
    pub fn install_section_map(&mut self, ticket: RebuildTicket, map: SectionMap) -> bool {
        if ticket.0 != self.rebuild_epoch {
            tracing::debug!("discarding section map from superseded rebuild");
            return false;
        }
        self.section_map = Some(map);
        true
    }

    /// Measure, build, and install in one synchronous step. The whole
    /// pass runs without suspension, so it never observes a half-built
    /// preview.
    pub fn rebuild_section_map(
        &mut self,
        metrics: &MirrorMetrics,
        layout: &RenderedLayout,
        max_source_scroll: f64,
    ) {
        let ticket = self.begin_rebuild();

        let anchors = anchors::extract_anchors(&self.content);
        let lines: Vec<usize> = anchors.iter().map(|a| a.line).collect();
        let offsets = measure_line_offsets(&self.content, &lines, metrics);
        let map = build_section_map(&anchors, &offsets, layout, max_source_scroll);

        tracing::debug!(
            anchors = anchors.len(),
            points = map.len(),
            "section map rebuilt"
        );
        self.install_section_map(ticket, map);
    }

    pub fn section_map(&self) -> Option<&SectionMap> {
        self.section_map.as_ref()
    }

    /// Anything that changes source wrapping or rendered layout makes
    /// the cached map stale.
    pub fn apply_layout_event(&mut self, event: LayoutEvent) {
        if self.section_map.is_some() {
            tracing::debug!(?event, "section map invalidated");
        }
        self.section_map = None;
    }

    // --- scroll events ---

    /// Record a source-pane scroll. Returns true when the embedder
    /// should schedule an animation-frame callback. Only split view
    /// syncs.
    pub fn on_source_scroll(&mut self, source_offset: f64) -> bool {
        if self.mode != PreviewMode::Split {
            return false;
        }
        self.sync.on_source_scroll(source_offset)
    }

    /// Run the coalesced sync computation for this frame. Returns the
    /// render-pane scroll target, if a scroll is pending.
    pub fn on_frame(&mut self, extents: ScrollExtents) -> Option<f64> {
        let now_ms = self.clock.now_ms();
        self.sync.on_frame(now_ms, self.section_map.as_ref(), extents)
    }

    /// Classify a render-pane scroll event (echo of our own write vs a
    /// genuine user scroll).
    pub fn on_render_scroll(&mut self) -> RenderScroll {
        let now_ms = self.clock.now_ms();
        self.sync.on_render_scroll(now_ms)
    }

    /// Fallback scroll basis from the last synced frame.
    pub fn last_source_ratio(&self) -> f64 {
        self.sync.last_source_ratio()
    }

    // --- wikilinks ---

    /// Resolve a clicked wikilink. Unresolved titles surface as a
    /// notification to the user, never as an error.
    pub fn activate_wikilink(
        &self,
        title: &str,
        resolver: &dyn WikilinkResolver,
    ) -> WikilinkOutcome {
        match resolver.resolve(title) {
            Some(path) => WikilinkOutcome::Navigate(path),
            None => {
                tracing::debug!(title, "wikilink target not found");
                WikilinkOutcome::NotFound {
                    title: title.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RenderError;
    use crate::resolve::TitleIndex;
    use grove_types::SectionPoint;

    fn session() -> EditorSession {
        EditorSession::new(PreviewConfig::default())
    }

    #[test]
    fn render_preview_appends_footnote_section() {
        let mut session = session();
        session.open_note("a.md", "text[^a]\n\n[^a]: alpha\n");

        let output = session.render_preview();
        assert!(!output.render_failed);
        assert!(output.html.contains(r#"<section class="footnotes">"#));
        assert_eq!(output.footnotes.len(), 1);
    }

    #[test]
    fn renderer_failure_produces_error_panel() {
        struct Broken;
        impl MarkdownRenderer for Broken {
            fn render(&self, _markdown: &str) -> Result<String, RenderError> {
                Err(RenderError::Failed("bad input".into()))
            }
        }

        let mut session = session().with_renderer(Box::new(Broken));
        session.open_note("a.md", "# hi");

        let output = session.render_preview();
        assert!(output.render_failed);
        assert!(output.html.contains("preview-error"));
        assert!(output.html.contains("bad input"));
    }

    #[test]
    fn frontmatter_is_stripped_from_preview() {
        let mut session = session();
        session.open_note("a.md", "---\ntitle: T\n---\n# Body\n");

        let output = session.render_preview();
        assert!(output.html.contains("<h1"));
        assert!(!output.html.contains("title: T"));
    }

    #[test]
    fn edits_invalidate_the_section_map() {
        let mut session = session();
        session.open_note("a.md", "# one\ntext\n");
        session.rebuild_section_map(&MirrorMetrics::default(), &RenderedLayout::default(), 100.0);
        assert!(session.section_map().is_some());

        session.set_content("# one\nmore text\n");
        assert!(session.section_map().is_none());
    }

    #[test]
    fn stale_rebuild_loses_to_the_newer_one() {
        let mut session = session();

        let stale = session.begin_rebuild();
        let fresh = session.begin_rebuild();

        let fresh_map = SectionMap(vec![
            SectionPoint::new(0.0, 0.0),
            SectionPoint::new(1.0, 2.0),
        ]);
        assert!(session.install_section_map(fresh, fresh_map.clone()));

        let stale_map = SectionMap(vec![
            SectionPoint::new(0.0, 0.0),
            SectionPoint::new(1.0, 99.0),
        ]);
        assert!(!session.install_section_map(stale, stale_map));

        assert_eq!(session.section_map(), Some(&fresh_map));
    }

    #[test]
    fn scroll_sync_only_runs_in_split_mode() {
        let mut session = session();
        assert!(!session.on_source_scroll(10.0));

        session.set_mode(PreviewMode::Split);
        assert!(session.on_source_scroll(10.0));
    }

    #[test]
    fn echo_suppression_is_deterministic_with_a_manual_clock() {
        use std::cell::Cell;
        use std::rc::Rc;

        struct ManualClock(Rc<Cell<f64>>);
        impl Clock for ManualClock {
            fn now_ms(&self) -> f64 {
                self.0.get()
            }
        }

        let time = Rc::new(Cell::new(0.0));
        let mut session = session().with_clock(Box::new(ManualClock(time.clone())));
        session.set_mode(PreviewMode::Split);

        let extents = ScrollExtents::new(100.0, 200.0);
        session.on_source_scroll(50.0);
        assert_eq!(session.on_frame(extents), Some(100.0));

        // Inside the 10ms window: echo. After it: a real user scroll.
        time.set(5.0);
        assert_eq!(session.on_render_scroll(), RenderScroll::SuppressedEcho);
        time.set(15.0);
        assert_eq!(session.on_render_scroll(), RenderScroll::UserScroll);
    }

    #[test]
    fn wikilink_resolution_navigates_or_notifies() {
        let session = session();
        let mut index = TitleIndex::new();
        index.insert("Foo", "notes/foo.md");

        assert_eq!(
            session.activate_wikilink("Foo", &index),
            WikilinkOutcome::Navigate("notes/foo.md".into())
        );
        assert_eq!(
            session.activate_wikilink("Bar", &index),
            WikilinkOutcome::NotFound {
                title: "Bar".into()
            }
        );
    }
}
