// Copyright 2026 the Locus Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A simulated page: a viewport, some elements, and the two callback
//! sources a browser would provide.

use alloc::vec::Vec;
use core::cell::Cell;
use core::fmt;

use kurbo::{Rect, Vec2};
use locus_core::geometry::{Margins, intersection_ratio, overlap};
use locus_core::host::{
    FrameId, FrameSource, IntersectionEntry, IntersectionSource, TargetGeometry, ViewportMetrics,
    WatchId, WatchSpec,
};

/// Handle to a simulated element.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(pub u32);

impl fmt::Debug for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ElementId({})", self.0)
    }
}

/// Counters for host calls, used to assert on resource usage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SimStats {
    /// Subscriptions created.
    pub watches: u32,
    /// Subscriptions ended.
    pub unwatches: u32,
    /// Frames requested.
    pub frames_requested: u32,
    /// Frames cancelled before firing.
    pub frames_cancelled: u32,
    /// Bounding-rect queries answered.
    pub bounds_queries: u32,
}

#[derive(Clone, Debug)]
struct SimWatch {
    id: WatchId,
    target: ElementId,
    margins: Margins,
    thresholds: Vec<f64>,
    /// `(threshold band, intersecting)` last delivered; `None` before the
    /// initial notification.
    last: Option<(usize, bool)>,
}

/// Deterministic host with intersection and frame semantics close to a
/// browser's.
///
/// Geometry only changes when the caller says so. Intersection
/// notifications are computed on demand by
/// [`collect_notifications`](Self::collect_notifications), and frame
/// callbacks queue up until [`take_frames`](Self::take_frames).
#[derive(Debug)]
pub struct SimHost {
    viewport: Rect,
    elements: Vec<Option<Rect>>,
    watches: Vec<SimWatch>,
    frames: Vec<FrameId>,
    next_handle: u32,
    stats: SimStats,
    bounds_queries: Cell<u32>,
}

impl SimHost {
    /// Creates a page with the given visual viewport and no elements.
    #[must_use]
    pub fn new(viewport: Rect) -> Self {
        Self {
            viewport,
            elements: Vec::new(),
            watches: Vec::new(),
            frames: Vec::new(),
            next_handle: 0,
            stats: SimStats::default(),
            bounds_queries: Cell::new(0),
        }
    }

    /// Adds an element at `bounds` (viewport coordinates).
    pub fn insert(&mut self, bounds: Rect) -> ElementId {
        let id = ElementId(u32::try_from(self.elements.len()).unwrap_or(u32::MAX));
        self.elements.push(Some(bounds));
        id
    }

    /// Returns an element's current bounds, or `None` if it is detached or
    /// unknown.
    #[must_use]
    pub fn bounds(&self, id: ElementId) -> Option<Rect> {
        self.elements.get(id.0 as usize).copied().flatten()
    }

    /// Moves an element to `bounds`. Detached elements stay detached.
    pub fn set_bounds(&mut self, id: ElementId, bounds: Rect) {
        if let Some(Some(slot)) = self.elements.get_mut(id.0 as usize) {
            *slot = bounds;
        }
    }

    /// Translates one element.
    pub fn move_by(&mut self, id: ElementId, delta: Vec2) {
        if let Some(bounds) = self.bounds(id) {
            self.set_bounds(id, bounds + delta);
        }
    }

    /// Scrolls the page: every element moves by `-delta` in viewport
    /// coordinates.
    pub fn scroll_by(&mut self, delta: Vec2) {
        for bounds in self.elements.iter_mut().flatten() {
            *bounds = *bounds - delta;
        }
    }

    /// Removes an element from the page.
    pub fn detach(&mut self, id: ElementId) {
        if let Some(slot) = self.elements.get_mut(id.0 as usize) {
            *slot = None;
        }
    }

    /// Puts an element back on the page at `bounds`.
    pub fn attach(&mut self, id: ElementId, bounds: Rect) {
        if let Some(slot) = self.elements.get_mut(id.0 as usize) {
            *slot = Some(bounds);
        }
    }

    /// Replaces the visual viewport.
    pub fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn active_watches(&self) -> usize {
        self.watches.len()
    }

    /// Margins of every live subscription, oldest first.
    pub fn watch_margins(&self) -> impl Iterator<Item = Margins> + '_ {
        self.watches.iter().map(|w| w.margins)
    }

    /// Number of frame callbacks waiting to fire.
    #[must_use]
    pub fn pending_frames(&self) -> usize {
        self.frames.len()
    }

    /// Returns the call counters.
    #[must_use]
    pub fn stats(&self) -> SimStats {
        SimStats {
            bounds_queries: self.bounds_queries.get(),
            ..self.stats
        }
    }

    /// Removes and returns every pending frame callback, in request order.
    pub fn take_frames(&mut self) -> Vec<FrameId> {
        core::mem::take(&mut self.frames)
    }

    /// Computes the notifications every live subscription owes.
    ///
    /// A subscription notifies once on creation, then whenever its ratio
    /// moves to a different threshold band or the target starts or stops
    /// intersecting.
    pub fn collect_notifications(&mut self) -> Vec<IntersectionEntry> {
        let viewport = self.viewport;
        let mut entries = Vec::new();
        for watch in &mut self.watches {
            let bounds = self.elements.get(watch.target.0 as usize).copied().flatten();
            let root = watch.margins.apply(viewport);
            let (bounding_rect, ratio, intersecting) = match bounds {
                Some(b) => {
                    let visible = overlap(b, root);
                    let intersecting = visible.x0 < visible.x1 && visible.y0 < visible.y1;
                    (b, intersection_ratio(b, root), intersecting)
                }
                None => (Rect::ZERO, 0.0, false),
            };
            let band = watch.thresholds.partition_point(|t| *t <= ratio);
            if watch.last == Some((band, intersecting)) {
                continue;
            }
            watch.last = Some((band, intersecting));
            entries.push(IntersectionEntry {
                watch: watch.id,
                bounding_rect,
                root_bounds: Some(root),
                intersection_rect: if intersecting {
                    overlap(bounding_rect, root)
                } else {
                    Rect::ZERO
                },
                ratio,
            });
        }
        entries
    }

    fn next_handle(&mut self) -> u32 {
        self.next_handle += 1;
        self.next_handle
    }
}

impl TargetGeometry for SimHost {
    type Target = ElementId;

    fn bounding_rect(&self, target: &ElementId) -> Option<Rect> {
        self.bounds_queries.set(self.bounds_queries.get() + 1);
        self.bounds(*target)
    }
}

impl IntersectionSource for SimHost {
    fn watch(&mut self, target: &ElementId, spec: &WatchSpec<'_>) -> WatchId {
        let id = WatchId(self.next_handle());
        self.stats.watches += 1;
        self.watches.push(SimWatch {
            id,
            target: *target,
            margins: spec.margins,
            thresholds: spec.thresholds.to_vec(),
            last: None,
        });
        id
    }

    fn unwatch(&mut self, watch: WatchId) {
        let before = self.watches.len();
        self.watches.retain(|w| w.id != watch);
        if self.watches.len() != before {
            self.stats.unwatches += 1;
        }
    }
}

impl FrameSource for SimHost {
    fn request_frame(&mut self) -> FrameId {
        let id = FrameId(self.next_handle());
        self.stats.frames_requested += 1;
        self.frames.push(id);
        id
    }

    fn cancel_frame(&mut self, frame: FrameId) {
        let before = self.frames.len();
        self.frames.retain(|f| *f != frame);
        if self.frames.len() != before {
            self.stats.frames_cancelled += 1;
        }
    }
}

impl ViewportMetrics for SimHost {
    fn visual_viewport(&self) -> Rect {
        self.viewport
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Rect = Rect::new(0.0, 0.0, 800.0, 600.0);
    const HALVES: &[f64] = &[0.0, 0.5, 1.0];

    fn spec(margins: Margins) -> WatchSpec<'static> {
        WatchSpec {
            margins,
            thresholds: HALVES,
        }
    }

    #[test]
    fn initial_notification_is_always_sent() {
        let mut host = SimHost::new(VIEWPORT);
        let el = host.insert(Rect::new(10.0, 10.0, 20.0, 20.0));
        let watch = host.watch(&el, &spec(Margins::ZERO));

        let entries = host.collect_notifications();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].watch, watch);
        assert_eq!(entries[0].ratio, 1.0);
        assert_eq!(entries[0].root_bounds, Some(VIEWPORT));
        assert!(host.collect_notifications().is_empty(), "nothing changed");
    }

    #[test]
    fn notifies_only_on_band_change() {
        let mut host = SimHost::new(VIEWPORT);
        let el = host.insert(Rect::new(10.0, 10.0, 110.0, 110.0));
        host.watch(&el, &spec(Margins::ZERO));
        host.collect_notifications();

        // Ratio 0.8: crosses the 1.0 threshold.
        host.scroll_by(Vec2::new(30.0, 0.0));
        assert_eq!(host.collect_notifications().len(), 1);
        // Ratio 0.7: same band.
        host.scroll_by(Vec2::new(10.0, 0.0));
        assert!(host.collect_notifications().is_empty());
        // Ratio 0.4: below 0.5.
        host.scroll_by(Vec2::new(30.0, 0.0));
        let entries = host.collect_notifications();
        assert_eq!(entries.len(), 1);
        assert!((entries[0].ratio - 0.4).abs() < 1e-9);
    }

    #[test]
    fn margins_shrink_the_root() {
        let mut host = SimHost::new(VIEWPORT);
        let el = host.insert(Rect::new(10.0, 10.0, 20.0, 20.0));
        let margins = Margins {
            top: 0.0,
            right: -700.0,
            bottom: -500.0,
            left: 0.0,
        };
        host.watch(&el, &spec(margins));
        let entries = host.collect_notifications();
        assert_eq!(entries[0].root_bounds, Some(Rect::new(0.0, 0.0, 100.0, 100.0)));
    }

    #[test]
    fn detached_target_reports_zero() {
        let mut host = SimHost::new(VIEWPORT);
        let el = host.insert(Rect::new(10.0, 10.0, 20.0, 20.0));
        host.watch(&el, &spec(Margins::ZERO));
        host.collect_notifications();

        host.detach(el);
        let entries = host.collect_notifications();
        assert_eq!(entries[0].ratio, 0.0);
        assert_eq!(entries[0].bounding_rect, Rect::ZERO);
        assert_eq!(host.bounding_rect(&el), None);

        host.attach(el, Rect::new(30.0, 30.0, 40.0, 40.0));
        let entries = host.collect_notifications();
        assert_eq!(entries[0].ratio, 1.0);
        assert_eq!(host.bounds(el), Some(Rect::new(30.0, 30.0, 40.0, 40.0)));
    }

    #[test]
    fn frames_fire_in_order_and_cancel() {
        let mut host = SimHost::new(VIEWPORT);
        let a = host.request_frame();
        let b = host.request_frame();
        host.cancel_frame(a);
        host.cancel_frame(a);
        assert_eq!(host.take_frames(), [b]);
        assert_eq!(host.pending_frames(), 0);
        assert_eq!(host.stats().frames_cancelled, 1);
    }
}
