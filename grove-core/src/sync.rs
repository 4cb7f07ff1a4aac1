//! Scroll synchronization between the source and render panes.
//!
//! One-directional: source scrolls drive the render pane. The
//! [`ScrollSync`] machine coalesces scroll events to one computation
//! per animation frame and suppresses the echo scroll event that our
//! own render-pane write produces. Time is injected so the suppression
//! window is deterministic under test.

use grove_types::SectionMap;
use std::time::Instant;

/// Default length of the echo-suppression window, milliseconds. Long
/// enough for the programmatic write's own scroll event to have fired
/// and been ignored.
pub const DEFAULT_SUPPRESS_WINDOW_MS: f64 = 10.0;

/// Monotonic time source.
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// Wall clock backed by `std::time::Instant`.
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Scrollable extents of both panes, floored at one pixel so ratio
/// arithmetic never divides by zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollExtents {
    pub max_source: f64,
    pub max_render: f64,
}

impl ScrollExtents {
    pub fn new(max_source: f64, max_render: f64) -> Self {
        Self {
            max_source: max_source.max(1.0),
            max_render: max_render.max(1.0),
        }
    }
}

/// Map a source-pane scroll offset to a render-pane offset.
///
/// No map, or a map with fewer than 3 control points, degrades to
/// plain ratio scaling. Otherwise the bracketing control-point pair is
/// found and linearly interpolated; a zero-width segment is treated as
/// `t = 0`. The result is clamped to the render pane's range.
pub fn interpolate(map: Option<&SectionMap>, source_offset: f64, extents: ScrollExtents) -> f64 {
    let target = match map {
        Some(map) if map.len() >= 3 => {
            let points = map.points();

            // Last point at or below the current offset.
            let mut index = 0;
            for (i, point) in points[..points.len() - 1].iter().enumerate() {
                if source_offset >= point.source_offset {
                    index = i;
                } else {
                    break;
                }
            }
            let a = points[index];
            let b = points[index + 1];

            let span = b.source_offset - a.source_offset;
            let t = if span > 0.0 {
                (source_offset - a.source_offset) / span
            } else {
                0.0
            };
            a.render_offset + t * (b.render_offset - a.render_offset)
        }
        _ => (source_offset / extents.max_source) * extents.max_render,
    };

    target.clamp(0.0, extents.max_render)
}

/// Feedback-suppression states.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SyncState {
    Idle,

    /// A programmatic render-pane write is in flight; scroll events
    /// from that pane are echoes until the window passes.
    Syncing { until_ms: f64 },
}

/// Events driving the state machine.
#[derive(Debug, Clone, Copy)]
enum SyncEvent {
    WroteRenderScroll { now_ms: f64 },
    RenderScrolled { now_ms: f64 },
}

impl SyncState {
    /// The one place state changes.
    fn step(self, event: SyncEvent, suppress_window_ms: f64) -> SyncState {
        match (self, event) {
            (_, SyncEvent::WroteRenderScroll { now_ms }) => SyncState::Syncing {
                until_ms: now_ms + suppress_window_ms,
            },
            (SyncState::Syncing { until_ms }, SyncEvent::RenderScrolled { now_ms })
                if now_ms < until_ms =>
            {
                SyncState::Syncing { until_ms }
            }
            (_, SyncEvent::RenderScrolled { .. }) => SyncState::Idle,
        }
    }
}

/// Classification of a render-pane scroll event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderScroll {
    /// A genuine user scroll of the render pane.
    UserScroll,

    /// The echo of our own programmatic write; ignore it.
    SuppressedEcho,
}

/// Frame-coalesced scroll synchronizer.
///
/// Source-scroll events park the newest offset; the embedder runs
/// [`ScrollSync::on_frame`] once per animation frame to consume it. A
/// pending offset is superseded by a newer one, never queued.
#[derive(Debug)]
pub struct ScrollSync {
    state: SyncState,
    pending: Option<f64>,
    last_source_ratio: f64,
    suppress_window_ms: f64,
}

impl ScrollSync {
    pub fn new(suppress_window_ms: f64) -> Self {
        Self {
            state: SyncState::Idle,
            pending: None,
            last_source_ratio: 0.0,
            suppress_window_ms,
        }
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    /// Last known source scroll ratio: the fallback interpolation
    /// basis when no section map is available.
    pub fn last_source_ratio(&self) -> f64 {
        self.last_source_ratio
    }

    /// Record a source-pane scroll. Returns true when a frame callback
    /// needs scheduling (false means one is already pending and the
    /// new offset simply superseded the old).
    pub fn on_source_scroll(&mut self, source_offset: f64) -> bool {
        let needs_frame = self.pending.is_none();
        self.pending = Some(source_offset);
        needs_frame
    }

    /// Run the coalesced computation for this animation frame.
    ///
    /// Returns the render-pane scroll target, or `None` when no scroll
    /// arrived since the last frame. The map is read-only here; it is
    /// owned by the render pipeline.
    pub fn on_frame(
        &mut self,
        now_ms: f64,
        map: Option<&SectionMap>,
        extents: ScrollExtents,
    ) -> Option<f64> {
        let source_offset = self.pending.take()?;
        self.last_source_ratio = source_offset / extents.max_source;

        let target = interpolate(map, source_offset, extents);
        self.state = self
            .state
            .step(SyncEvent::WroteRenderScroll { now_ms }, self.suppress_window_ms);

        Some(target)
    }

    /// Classify a render-pane scroll event and advance the machine.
    pub fn on_render_scroll(&mut self, now_ms: f64) -> RenderScroll {
        let classification = match self.state {
            SyncState::Syncing { until_ms } if now_ms < until_ms => RenderScroll::SuppressedEcho,
            _ => RenderScroll::UserScroll,
        };
        self.state = self
            .state
            .step(SyncEvent::RenderScrolled { now_ms }, self.suppress_window_ms);
        classification
    }
}

impl Default for ScrollSync {
    fn default() -> Self {
        Self::new(DEFAULT_SUPPRESS_WINDOW_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grove_types::SectionPoint;

    fn three_point_map() -> SectionMap {
        SectionMap(vec![
            SectionPoint::new(0.0, 0.0),
            SectionPoint::new(100.0, 400.0),
            SectionPoint::new(200.0, 600.0),
        ])
    }

    #[test]
    fn no_map_falls_back_to_ratio() {
        let extents = ScrollExtents::new(200.0, 1000.0);
        assert_eq!(interpolate(None, 50.0, extents), 250.0);
    }

    #[test]
    fn two_point_map_equals_ratio_scaling() {
        let map = SectionMap(vec![
            SectionPoint::new(0.0, 0.0),
            SectionPoint::new(400.0, 1000.0),
        ]);
        let extents = ScrollExtents::new(400.0, 1000.0);

        for offset in [0.0, 1.0, 123.0, 250.0, 399.0, 400.0] {
            let via_map = interpolate(Some(&map), offset, extents);
            let via_ratio = interpolate(None, offset, extents);
            assert!((via_map - via_ratio).abs() < 1e-9, "offset {offset}");
        }
    }

    #[test]
    fn interpolates_within_the_bracketing_segment() {
        let map = three_point_map();
        let extents = ScrollExtents::new(200.0, 600.0);

        assert_eq!(interpolate(Some(&map), 0.0, extents), 0.0);
        assert_eq!(interpolate(Some(&map), 50.0, extents), 200.0);
        assert_eq!(interpolate(Some(&map), 100.0, extents), 400.0);
        assert_eq!(interpolate(Some(&map), 150.0, extents), 500.0);
        assert_eq!(interpolate(Some(&map), 200.0, extents), 600.0);
    }

    #[test]
    fn zero_width_segment_pins_to_segment_start() {
        let map = SectionMap(vec![
            SectionPoint::new(0.0, 0.0),
            SectionPoint::new(100.0, 300.0),
            SectionPoint::new(100.0, 500.0),
            SectionPoint::new(200.0, 600.0),
        ]);
        let extents = ScrollExtents::new(200.0, 600.0);

        // Degenerate map (never produced by the builder, but the
        // interpolator must not divide by zero on it).
        assert_eq!(interpolate(Some(&map), 100.0, extents), 500.0);
    }

    #[test]
    fn output_is_clamped_to_the_render_range() {
        let map = three_point_map();
        let extents = ScrollExtents::new(200.0, 600.0);
        assert_eq!(interpolate(Some(&map), 1e9, extents), 600.0);
        assert_eq!(interpolate(Some(&map), -50.0, extents), 0.0);
    }

    #[test]
    fn scroll_events_coalesce_to_one_frame() {
        let mut sync = ScrollSync::default();

        assert!(sync.on_source_scroll(10.0));
        assert!(!sync.on_source_scroll(20.0));
        assert!(!sync.on_source_scroll(30.0));

        let extents = ScrollExtents::new(100.0, 100.0);
        // Newest offset wins; the older two were superseded.
        assert_eq!(sync.on_frame(0.0, None, extents), Some(30.0));
        assert_eq!(sync.on_frame(1.0, None, extents), None);
    }

    #[test]
    fn echo_is_suppressed_then_window_expires() {
        let mut sync = ScrollSync::new(10.0);
        let extents = ScrollExtents::new(100.0, 100.0);

        sync.on_source_scroll(50.0);
        sync.on_frame(1000.0, None, extents);
        assert_eq!(
            sync.state(),
            SyncState::Syncing { until_ms: 1010.0 }
        );

        assert_eq!(sync.on_render_scroll(1005.0), RenderScroll::SuppressedEcho);
        assert_eq!(sync.on_render_scroll(1012.0), RenderScroll::UserScroll);
        assert_eq!(sync.state(), SyncState::Idle);
    }

    #[test]
    fn user_scroll_while_idle_is_genuine() {
        let mut sync = ScrollSync::default();
        assert_eq!(sync.on_render_scroll(0.0), RenderScroll::UserScroll);
    }

    #[test]
    fn frame_records_the_fallback_ratio() {
        let mut sync = ScrollSync::default();
        let extents = ScrollExtents::new(200.0, 1000.0);

        sync.on_source_scroll(50.0);
        sync.on_frame(0.0, None, extents);
        assert_eq!(sync.last_source_ratio(), 0.25);
    }
}
