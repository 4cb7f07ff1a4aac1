//! # grove-core
//!
//! Core engine for the grove markdown note editor's live preview: the
//! preprocessing pipeline (wikilinks, footnotes), the post-render hook
//! pipeline (relative paths, diagram containers, syntax highlighting),
//! and the split-view scroll synchronizer (anchor extraction, mirror
//! measurement, section maps, interpolated sync).
//!
//! Everything here is pure and headless. The pieces that would touch a
//! DOM in the browser (the markdown renderer, the diagram renderer,
//! the syntax tokenizer, the note store, the wikilink resolver, the
//! rendered-pane geometry) are trait seams, so the engine is unit
//! testable and embeddable behind a wasm or server adapter.

pub mod anchors;
pub mod config;
pub mod frontmatter;
pub mod markdown;
pub mod measure;
pub mod postprocess;
pub mod render;
pub mod resolve;
pub mod section_map;
pub mod session;
pub mod store;
pub mod sync;

pub use anchors::extract_anchors;
pub use config::{ConfigError, PreviewConfig};
pub use frontmatter::{strip_frontmatter, NoteMeta};
pub use markdown::{Preprocessed, Preprocessor};
pub use measure::{measure_line_offsets, MirrorMetrics, WrapMode};
pub use postprocess::{
    DiagramError, DiagramRenderer, HighlightError, HookPipeline, NoteContext, PostRenderHook,
    SyntaxTokenizer, SyntectTokenizer, TokenPalette,
};
pub use render::{CmarkRenderer, MarkdownRenderer, Parse, ParseAdapter, RenderError};
pub use resolve::{TitleIndex, WikilinkResolver};
pub use section_map::{build_section_map, RenderedLayout};
pub use session::{EditorSession, PreviewOutput, RebuildTicket, WikilinkOutcome};
pub use store::{MemoryStore, NoteRecord, NoteStore, StoreError};
pub use sync::{
    interpolate, Clock, RenderScroll, ScrollExtents, ScrollSync, SyncState, SystemClock,
};
