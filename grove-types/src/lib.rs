//! Shared types for grove
//!
//! This crate provides the plain data types used across the grove
//! preview engine: synchronization anchors, section maps, footnotes,
//! and layout-invalidation events.

use serde::{Deserialize, Serialize};

/// Kind of synchronization landmark found in the raw source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnchorKind {
    Heading,
    CodeFenceStart,
    CodeFenceEnd,
}

/// A source-text position used as a scroll-sync landmark.
///
/// Anchors are derived deterministically from the raw source and
/// regenerated on every render; they are never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anchor {
    /// 0-based line index in the raw source.
    pub line: usize,

    pub kind: AnchorKind,

    /// 0-based occurrence count within `kind`. A fence start and its
    /// matching end share one index.
    pub sequence_index: usize,
}

/// One control point pairing a source-pane scroll offset with a
/// render-pane scroll offset, both in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionPoint {
    pub source_offset: f64,
    pub render_offset: f64,
}

impl SectionPoint {
    pub fn new(source_offset: f64, render_offset: f64) -> Self {
        Self {
            source_offset,
            render_offset,
        }
    }
}

/// Piecewise-linear correspondence between the two panes' scroll
/// offsets.
///
/// Invariants: always bookended by `(0,0)` and
/// `(max_source, max_render)`; `source_offset` strictly increasing
/// across consecutive points; `render_offset` non-decreasing; at least
/// two points exist even with zero anchors (degrading to one linear
/// segment). Valid only for the layout in effect at build time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionMap(pub Vec<SectionPoint>);

impl SectionMap {
    pub fn points(&self) -> &[SectionPoint] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Source-pane extent this map was built for.
    pub fn max_source(&self) -> f64 {
        self.0.last().map(|p| p.source_offset).unwrap_or(0.0)
    }

    /// Render-pane extent this map was built for.
    pub fn max_render(&self) -> f64 {
        self.0.last().map(|p| p.render_offset).unwrap_or(0.0)
    }
}

/// A footnote definition extracted from the source.
///
/// Ids are unique per render pass and keep their first position; a
/// duplicate definition overwrites the text (last write wins).
/// Footnotes live for one render cycle and are rebuilt from scratch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Footnote {
    pub id: String,
    pub text: String,
}

/// Display mode of the editor; scroll sync only runs in `Split`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewMode {
    Edit,
    Split,
    Preview,
}

/// Color scheme variant used by the highlight palette.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeVariant {
    #[default]
    Dark,
    Light,
}

/// An event that invalidates a cached section map.
///
/// Anything that changes source wrapping or rendered element positions
/// makes the map stale: edits, pane resizes (wrap width), async image
/// loads (element positions), and theme/font changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayoutEvent {
    ContentEdited,
    PaneResized,
    ImageLoaded,
    ThemeChanged,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_map_extents() {
        let map = SectionMap(vec![
            SectionPoint::new(0.0, 0.0),
            SectionPoint::new(100.0, 250.0),
            SectionPoint::new(400.0, 1000.0),
        ]);

        assert_eq!(map.len(), 3);
        assert_eq!(map.max_source(), 400.0);
        assert_eq!(map.max_render(), 1000.0);
    }

    #[test]
    fn empty_section_map_extents_are_zero() {
        let map = SectionMap(Vec::new());
        assert!(map.is_empty());
        assert_eq!(map.max_source(), 0.0);
        assert_eq!(map.max_render(), 0.0);
    }
}
