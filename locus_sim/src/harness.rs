// Copyright 2026 the Locus Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame-stepped driver that wires a [`Tracker`] to a [`SimHost`].

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

use kurbo::Rect;
use locus_core::config::TrackerConfig;
use locus_core::trace::Tracer;
use locus_core::tracker::{PositionReport, Tracker, TrackingState};

use crate::host::{ElementId, SimHost};

/// Notification rounds per step before the harness stops draining.
///
/// Each state change can create a subscription that owes an initial
/// notification, so a step may need several rounds to go quiet.
pub const MAX_ROUNDS: usize = 8;

/// A position report as recorded by the harness.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimReport {
    /// Step during which the report fired.
    pub step: u64,
    /// Target left edge.
    pub x: f64,
    /// Target top edge.
    pub y: f64,
    /// Reported target.
    pub target: ElementId,
    /// Whether the target was entirely outside the viewport.
    pub out_of_viewport: bool,
    /// Root bounds carried by the report.
    pub root_bounds: Option<Rect>,
}

/// Drives one tracker against a simulated page, one frame at a time.
///
/// Each [`step`](Self::step) models a browser frame: queued frame callbacks
/// fire first, then intersection notifications are computed and delivered
/// until no subscription owes one.
#[derive(Debug)]
pub struct SimHarness {
    host: SimHost,
    tracker: Tracker<ElementId>,
    reports: Rc<RefCell<Vec<SimReport>>>,
    step: Rc<Cell<u64>>,
}

impl SimHarness {
    /// Creates a harness with an empty page of the given viewport.
    #[must_use]
    pub fn new(config: TrackerConfig, viewport: Rect) -> Self {
        let reports = Rc::new(RefCell::new(Vec::new()));
        let step = Rc::new(Cell::new(0));
        let tracker = {
            let reports = Rc::clone(&reports);
            let step = Rc::clone(&step);
            Tracker::new(config, move |r: &PositionReport<'_, ElementId>| {
                reports.borrow_mut().push(SimReport {
                    step: step.get(),
                    x: r.x,
                    y: r.y,
                    target: *r.target,
                    out_of_viewport: r.out_of_viewport,
                    root_bounds: r.root_bounds,
                });
            })
        };
        Self {
            host: SimHost::new(viewport),
            tracker,
            reports,
            step,
        }
    }

    /// The simulated page.
    #[must_use]
    pub fn host(&self) -> &SimHost {
        &self.host
    }

    /// The simulated page, for moving elements between steps.
    pub fn host_mut(&mut self) -> &mut SimHost {
        &mut self.host
    }

    /// The tracker under test.
    #[must_use]
    pub fn tracker(&self) -> &Tracker<ElementId> {
        &self.tracker
    }

    /// Shorthand for the tracker's state.
    #[must_use]
    pub fn state(&self) -> TrackingState {
        self.tracker.state()
    }

    /// Steps taken so far.
    #[must_use]
    pub fn steps(&self) -> u64 {
        self.step.get()
    }

    /// Starts tracking `target`.
    pub fn observe(&mut self, target: ElementId, tracer: &mut Tracer<'_>) {
        self.tracker.observe(&mut self.host, target, tracer);
    }

    /// Stops tracking.
    pub fn disconnect(&mut self, tracer: &mut Tracer<'_>) {
        self.tracker.disconnect(&mut self.host, tracer);
    }

    /// Runs one frame.
    pub fn step(&mut self, tracer: &mut Tracer<'_>) {
        self.step.set(self.step.get() + 1);
        for frame in self.host.take_frames() {
            self.tracker.handle_frame(&mut self.host, frame, tracer);
        }
        for _ in 0..MAX_ROUNDS {
            let entries = self.host.collect_notifications();
            if entries.is_empty() {
                break;
            }
            self.tracker
                .handle_intersections(&mut self.host, &entries, tracer);
        }
    }

    /// Runs `steps` frames.
    pub fn run(&mut self, steps: u32, tracer: &mut Tracer<'_>) {
        for _ in 0..steps {
            self.step(tracer);
        }
    }

    /// Runs frames until nothing is scheduled and no notification is owed,
    /// up to `max_steps`. Returns the number of steps taken.
    pub fn settle(&mut self, max_steps: u32, tracer: &mut Tracer<'_>) -> u32 {
        for taken in 0..max_steps {
            if self.host.pending_frames() == 0 && taken > 0 {
                return taken;
            }
            self.step(tracer);
        }
        max_steps
    }

    /// Reports recorded so far.
    #[must_use]
    pub fn reports(&self) -> Vec<SimReport> {
        self.reports.borrow().clone()
    }

    /// Removes and returns the reports recorded so far.
    pub fn take_reports(&mut self) -> Vec<SimReport> {
        core::mem::take(&mut *self.reports.borrow_mut())
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Vec2;
    use locus_core::config::{EnterPolicy, StillnessRearm};

    use super::*;

    const VIEWPORT: Rect = Rect::new(0.0, 0.0, 800.0, 600.0);
    const BOX: Rect = Rect::new(100.0, 100.0, 150.0, 150.0);

    fn harness_with(config: TrackerConfig, bounds: Rect) -> (SimHarness, ElementId) {
        let mut harness = SimHarness::new(config, VIEWPORT);
        let el = harness.host_mut().insert(bounds);
        harness.observe(el, &mut Tracer::none());
        (harness, el)
    }

    /// Observes a visible box and runs until it rests in fine watching.
    fn resting(config: TrackerConfig) -> (SimHarness, ElementId) {
        let (mut harness, el) = harness_with(config, BOX);
        harness.settle(64, &mut Tracer::none());
        assert_eq!(harness.state(), TrackingState::FineWatching);
        harness.take_reports();
        (harness, el)
    }

    #[test]
    fn visible_target_comes_to_rest_in_fine_watching() {
        let (mut harness, el) = harness_with(TrackerConfig::web(), BOX);
        harness.step(&mut Tracer::none());
        assert_eq!(harness.state(), TrackingState::StopConfirming);

        harness.settle(64, &mut Tracer::none());
        assert_eq!(harness.state(), TrackingState::FineWatching);
        assert_eq!(harness.host().active_watches(), 1);
        assert_eq!(harness.host().pending_frames(), 0);

        let reports = harness.take_reports();
        assert!(!reports.is_empty());
        assert!(reports.iter().all(|r| r.target == el && r.x == 100.0 && r.y == 100.0));
        assert!(reports.iter().all(|r| !r.out_of_viewport));

        harness.run(30, &mut Tracer::none());
        assert!(harness.reports().is_empty(), "quiet while nothing moves");
    }

    #[test]
    fn offscreen_target_reports_once_until_scrolled_in() {
        let (mut harness, _) =
            harness_with(TrackerConfig::web(), Rect::new(100.0, 900.0, 150.0, 950.0));
        harness.run(5, &mut Tracer::none());

        let reports = harness.take_reports();
        assert_eq!(reports.len(), 1);
        assert!(reports[0].out_of_viewport);
        assert_eq!(reports[0].root_bounds, Some(VIEWPORT));
        assert_eq!(harness.state(), TrackingState::CoarseWatching);

        harness.host_mut().scroll_by(Vec2::new(0.0, 500.0));
        harness.settle(64, &mut Tracer::none());
        assert_eq!(harness.state(), TrackingState::FineWatching);
        let last = *harness.reports().last().expect("report after scrolling in");
        assert_eq!((last.x, last.y), (100.0, 400.0));
        assert!(!last.out_of_viewport);
    }

    #[test]
    fn animation_is_followed_frame_by_frame_then_settles() {
        let (mut harness, el) = resting(TrackerConfig::web());

        for _ in 0..10 {
            harness.host_mut().move_by(el, Vec2::new(5.0, 0.0));
            harness.step(&mut Tracer::none());
        }
        let xs: Vec<f64> = harness.take_reports().iter().map(|r| r.x).collect();
        let expected: Vec<f64> = (1..=10_i32).map(|i| 100.0 + 5.0 * f64::from(i)).collect();
        assert_eq!(xs, expected);
        assert_eq!(harness.state(), TrackingState::Polling);

        let stop_ticks = TrackerConfig::web().stop_ticks();
        let taken = harness.settle(64, &mut Tracer::none());
        assert_eq!(taken, stop_ticks);
        assert_eq!(harness.state(), TrackingState::FineWatching);
        assert!(harness.reports().iter().all(|r| r.x == 150.0));

        harness.take_reports();
        harness.run(20, &mut Tracer::none());
        assert!(harness.reports().is_empty());
    }

    #[test]
    fn scrolling_target_away_reports_out_of_viewport() {
        let (mut harness, _) = resting(TrackerConfig::web());
        harness.host_mut().scroll_by(Vec2::new(0.0, 1000.0));
        harness.step(&mut Tracer::none());

        assert_eq!(harness.state(), TrackingState::CoarseWatching);
        let reports = harness.take_reports();
        assert_eq!(reports.len(), 1);
        assert!(reports[0].out_of_viewport);
        assert_eq!(reports[0].y, -900.0);
    }

    #[test]
    fn partially_visible_target_waits_for_full_visibility() {
        let (mut harness, _) =
            harness_with(TrackerConfig::web(), Rect::new(100.0, 580.0, 150.0, 630.0));
        harness.step(&mut Tracer::none());
        assert_eq!(harness.state(), TrackingState::CoarseWatching);
        assert_eq!(harness.take_reports().len(), 1);

        harness.host_mut().scroll_by(Vec2::new(0.0, 100.0));
        harness.step(&mut Tracer::none());
        assert_ne!(harness.state(), TrackingState::CoarseWatching);
    }

    #[test]
    fn eager_config_tracks_partially_visible_targets() {
        let config = TrackerConfig::eager();
        assert_eq!(config.enter_policy, EnterPolicy::AnyVisible);
        assert_eq!(config.stillness_rearm, StillnessRearm::Never);
        let (mut harness, el) = harness_with(config, Rect::new(100.0, 580.0, 150.0, 630.0));
        harness.step(&mut Tracer::none());
        assert_eq!(harness.state(), TrackingState::FineWatching);

        // Sliding further out of view lowers the visible fraction.
        harness.take_reports();
        harness.host_mut().move_by(el, Vec2::new(0.0, 10.0));
        harness.step(&mut Tracer::none());
        let reports = harness.take_reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].y, 590.0);
    }

    #[test]
    fn detached_target_is_picked_up_again_after_reattaching() {
        let (mut harness, el) = resting(TrackerConfig::web());
        harness.host_mut().move_by(el, Vec2::new(0.0, 8.0));
        harness.step(&mut Tracer::none());
        assert_eq!(harness.state(), TrackingState::Polling);
        harness.take_reports();

        harness.host_mut().detach(el);
        harness.run(3, &mut Tracer::none());

        assert_eq!(harness.state(), TrackingState::CoarseWatching);
        assert_eq!(harness.tracker().target(), Some(&el));
        assert_eq!(harness.host().pending_frames(), 0);
        assert_eq!(harness.host().active_watches(), 1);
        let reports = harness.take_reports();
        assert_eq!(reports.len(), 1);
        assert!(reports[0].out_of_viewport);

        harness
            .host_mut()
            .attach(el, Rect::new(300.0, 200.0, 350.0, 250.0));
        harness.settle(64, &mut Tracer::none());

        assert_eq!(harness.state(), TrackingState::FineWatching);
        let reports = harness.take_reports();
        assert!(!reports.is_empty());
        assert!(
            reports
                .iter()
                .all(|r| (r.x, r.y) == (300.0, 200.0) && !r.out_of_viewport)
        );
    }

    #[test]
    fn offscreen_scroll_in_and_single_jump_round_trip() {
        let (mut harness, el) =
            harness_with(TrackerConfig::web(), Rect::new(100.0, 900.0, 150.0, 950.0));
        let stop_ticks = TrackerConfig::web().stop_ticks();
        assert_eq!(stop_ticks, 7);

        // Offscreen: exactly one out-of-viewport report.
        harness.run(5, &mut Tracer::none());
        let reports = harness.take_reports();
        assert_eq!(reports.len(), 1);
        assert!(reports[0].out_of_viewport);

        // Scrolled in: reported on entry, then again once the watcher is
        // re-armed after stillness is confirmed.
        harness.host_mut().scroll_by(Vec2::new(0.0, 500.0));
        harness.settle(64, &mut Tracer::none());
        assert_eq!(harness.state(), TrackingState::FineWatching);
        let reports = harness.take_reports();
        assert_eq!(reports.len(), 2);
        assert!(
            reports
                .iter()
                .all(|r| (r.x, r.y) == (100.0, 400.0) && !r.out_of_viewport)
        );

        // A 50px jump in one frame: one motion report, then polling.
        harness.host_mut().move_by(el, Vec2::new(50.0, 0.0));
        harness.step(&mut Tracer::none());
        assert_eq!(harness.state(), TrackingState::Polling);
        let reports = harness.take_reports();
        assert_eq!(reports.len(), 1);
        assert_eq!((reports[0].x, reports[0].y), (150.0, 400.0));
        let watches_before = harness.host().stats().watches;

        // Quiet frames until the last one settles the loop.
        for _ in 1..stop_ticks {
            harness.step(&mut Tracer::none());
            assert_eq!(harness.state(), TrackingState::StopConfirming);
            assert_eq!(harness.host().active_watches(), 0);
            assert_eq!(harness.host().pending_frames(), 1);
        }
        assert!(harness.reports().is_empty());

        harness.step(&mut Tracer::none());
        assert_eq!(harness.state(), TrackingState::FineWatching);
        assert_eq!(harness.host().pending_frames(), 0);
        assert_eq!(harness.host().active_watches(), 1);
        // Coarse watch re-armed, then narrowed to a fine one.
        assert_eq!(harness.host().stats().watches, watches_before + 2);
        let reports = harness.take_reports();
        assert_eq!(reports.len(), 1);
        assert_eq!((reports[0].x, reports[0].y), (150.0, 400.0));

        harness.run(20, &mut Tracer::none());
        assert!(harness.reports().is_empty());
    }

    #[test]
    fn one_pixel_move_stays_inside_the_edge_slack() {
        let (mut harness, el) = resting(TrackerConfig::web());

        harness.host_mut().move_by(el, Vec2::new(1.0, 0.0));
        harness.run(30, &mut Tracer::none());
        assert_eq!(harness.state(), TrackingState::FineWatching);
        assert!(harness.reports().is_empty());

        // A second pixel crosses the slack and is reported.
        harness.host_mut().move_by(el, Vec2::new(1.0, 0.0));
        harness.step(&mut Tracer::none());
        assert_eq!(harness.state(), TrackingState::Polling);
        let reports = harness.take_reports();
        assert_eq!(reports.len(), 1);
        assert_eq!((reports[0].x, reports[0].y), (102.0, 100.0));
    }

    #[test]
    fn disconnect_mid_poll_releases_everything() {
        let (mut harness, el) = resting(TrackerConfig::web());
        harness.host_mut().move_by(el, Vec2::new(3.0, 0.0));
        harness.step(&mut Tracer::none());
        harness.take_reports();

        harness.disconnect(&mut Tracer::none());
        harness.disconnect(&mut Tracer::none());
        harness.host_mut().move_by(el, Vec2::new(30.0, 0.0));
        harness.run(10, &mut Tracer::none());

        assert!(harness.reports().is_empty());
        assert_eq!(harness.host().pending_frames(), 0);
        assert_eq!(harness.host().active_watches(), 0);
        let stats = harness.host().stats();
        assert_eq!(stats.watches, stats.unwatches);
        assert_eq!(stats.frames_cancelled, 1);
    }

    #[test]
    fn at_most_one_mechanism_is_live() {
        let (mut harness, el) = harness_with(TrackerConfig::web(), BOX);
        for i in 0..60 {
            if i % 20 < 6 {
                harness.host_mut().move_by(el, Vec2::new(4.0, 2.0));
            }
            harness.step(&mut Tracer::none());
            let host = harness.host();
            assert!(
                host.active_watches() + host.pending_frames() <= 1,
                "step {i}: {} watches, {} frames",
                host.active_watches(),
                host.pending_frames()
            );
        }
    }
}
