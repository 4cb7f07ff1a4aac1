//! Section map construction: pairing source anchors with rendered
//! elements.
//!
//! Runs after the preview has been populated and post-processed, since
//! diagram and highlight rewriting can change which block elements
//! exist and where they sit.

use grove_types::{Anchor, AnchorKind, SectionMap, SectionPoint};

/// Geometry of the rendered pane, extracted by the embedding adapter
/// once layout has settled.
#[derive(Debug, Clone, Default)]
pub struct RenderedLayout {
    /// Top offsets of rendered headings, in document order, relative
    /// to the pane's scroll origin.
    pub heading_tops: Vec<f64>,

    /// (top, bottom) edges of rendered code blocks, in document order.
    pub code_block_edges: Vec<(f64, f64)>,

    /// Scrollable extent of the render pane
    /// (`scroll_height - client_height`).
    pub max_render_scroll: f64,
}

/// Build the control-point list mapping source offsets to render
/// offsets.
///
/// `source_offsets` runs parallel to `anchors`: one measured offset
/// per anchor. An anchor with no matching rendered element (dangling
/// fence, heading swallowed by an HTML comment) is skipped; the map is
/// never abandoned over one bad anchor. Accepted points are clamped to
/// their pane, must strictly advance in source offset, must not
/// regress in render offset, and must leave room for the final
/// bookend, so the result always satisfies the `SectionMap`
/// invariants.
pub fn build_section_map(
    anchors: &[Anchor],
    source_offsets: &[f64],
    layout: &RenderedLayout,
    max_source_scroll: f64,
) -> SectionMap {
    debug_assert_eq!(anchors.len(), source_offsets.len());

    let max_source = max_source_scroll.max(1.0);
    let max_render = layout.max_render_scroll.max(1.0);

    let mut points = vec![SectionPoint::new(0.0, 0.0)];

    for (anchor, &measured) in anchors.iter().zip(source_offsets) {
        let Some(render_offset) = render_offset_for(anchor, layout) else {
            continue;
        };

        let source_offset = measured.clamp(0.0, max_source);
        let render_offset = render_offset.clamp(0.0, max_render);

        let last = *points.last().expect("bookend present");
        if source_offset <= last.source_offset || source_offset >= max_source {
            continue;
        }
        if render_offset < last.render_offset {
            continue;
        }

        points.push(SectionPoint::new(source_offset, render_offset));
    }

    points.push(SectionPoint::new(max_source, max_render));
    SectionMap(points)
}

fn render_offset_for(anchor: &Anchor, layout: &RenderedLayout) -> Option<f64> {
    match anchor.kind {
        AnchorKind::Heading => layout.heading_tops.get(anchor.sequence_index).copied(),
        AnchorKind::CodeFenceStart => layout
            .code_block_edges
            .get(anchor.sequence_index)
            .map(|&(top, _)| top),
        AnchorKind::CodeFenceEnd => layout
            .code_block_edges
            .get(anchor.sequence_index)
            .map(|&(_, bottom)| bottom),
    }
}
