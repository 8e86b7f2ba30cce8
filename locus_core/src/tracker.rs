// Copyright 2026 the Locus Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The tracking state machine.
//!
//! [`Tracker`] owns the current [`TrackingState`] and the handle of the one
//! detection mechanism that is live for it: a coarse or fine intersection
//! subscription, or a pending poll frame. Hosts push deliveries into
//! [`handle_intersections`](Tracker::handle_intersections) and
//! [`handle_frame`](Tracker::handle_frame); the tracker reacts by reporting
//! positions and swapping mechanisms through the [`Host`] it is handed.
//!
//! ```text
//!            observe
//!               │
//!               ▼
//!   ┌──► CoarseWatching ──── ratio 0 ──► report (out of viewport)
//!   │           │ enter
//!   │           ▼
//!   ├──── FineWatching ──── contained ──► report ──► StopConfirming*
//!   │  exited   │ moved
//!   │           ▼
//!   │        Polling ◄──── changed ────┐
//!   │           │ quiet                │
//!   │           ▼                      │
//!   └──── StopConfirming ──────────────┘
//!        settled
//! ```
//!
//! `*` only when [`StillnessRearm::UnlessConfirmed`] applies.
//!
//! Every transition tears down the previous mechanism before creating the
//! next, and deliveries are matched against the handle currently held, so
//! at most one mechanism is ever live and anything queued by an older one
//! is ignored.

use alloc::boxed::Box;
use core::fmt;

use kurbo::Rect;

use crate::config::{StillnessRearm, TrackerConfig};
use crate::geometry::Margins;
use crate::host::{FrameId, Host, IntersectionEntry, WatchId, WatchSpec};
use crate::poll::{MotionPoller, PollPhase, PollStep};
use crate::threshold::ThresholdTable;
use crate::trace::{
    NotificationEvent, PollTickEvent, ReportEvent, StaleEvent, StaleKind, Tracer,
    TransitionCause, TransitionEvent, WindowEvent,
};
use crate::watch::{CoarseOutcome, FineOutcome, FineWindow, classify_coarse};

/// Which detection mechanism is active.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TrackingState {
    /// Watching the target against the whole viewport.
    CoarseWatching,
    /// Watching the target against its fitted window.
    FineWatching,
    /// Sampling every frame while the target moves.
    Polling,
    /// Sampling every frame until stillness is confirmed.
    StopConfirming,
    /// No target bound.
    Disconnected,
}

/// Position data handed to the reporting callback.
#[derive(Clone, Copy, Debug)]
pub struct PositionReport<'a, T> {
    /// Target left edge in viewport coordinates.
    pub x: f64,
    /// Target top edge in viewport coordinates.
    pub y: f64,
    /// The tracked target.
    pub target: &'a T,
    /// `true` only when the coarse watcher sees no overlap with the viewport.
    pub out_of_viewport: bool,
    /// Outer boundary in effect, if the host provided one.
    pub root_bounds: Option<Rect>,
}

/// Boxed reporting callback.
pub type Reporter<T> = Box<dyn FnMut(&PositionReport<'_, T>)>;

/// The live mechanism and its handle.
#[derive(Clone, Debug)]
enum Mode {
    Idle,
    Coarse {
        watch: WatchId,
    },
    Fine {
        watch: WatchId,
        window: FineWindow,
    },
    Poll {
        frame: FrameId,
        poller: MotionPoller,
        root_bounds: Option<Rect>,
    },
}

/// Adaptive position tracker for a single target.
///
/// The tracker does not own its host; every entry point borrows it. Call
/// [`disconnect`](Self::disconnect) before dropping a tracker that is still
/// observing so the host can release its subscription.
///
/// # Usage
///
/// ```rust,ignore
/// let mut tracker = Tracker::new(TrackerConfig::web(), |report| {
///     draw_marker(report.x, report.y, report.out_of_viewport);
/// });
/// tracker.observe(&mut host, element, &mut Tracer::none());
///
/// // In the host's notification and frame callbacks:
/// tracker.handle_intersections(&mut host, &entries, &mut Tracer::none());
/// tracker.handle_frame(&mut host, frame_id, &mut Tracer::none());
/// ```
pub struct Tracker<T> {
    config: TrackerConfig,
    thresholds: ThresholdTable,
    target: Option<T>,
    mode: Mode,
    confirmed_still: bool,
    reporter: Reporter<T>,
}

impl<T> fmt::Debug for Tracker<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracker")
            .field("state", &self.state())
            .field("config", &self.config)
            .field("observing", &self.target.is_some())
            .field("confirmed_still", &self.confirmed_still)
            .finish_non_exhaustive()
    }
}

impl<T> Tracker<T> {
    /// Creates an idle tracker that will call `reporter` with every position
    /// report.
    pub fn new(
        config: TrackerConfig,
        reporter: impl FnMut(&PositionReport<'_, T>) + 'static,
    ) -> Self {
        Self {
            thresholds: ThresholdTable::new(config.threshold_steps),
            config,
            target: None,
            mode: Mode::Idle,
            confirmed_still: false,
            reporter: Box::new(reporter),
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Returns the threshold table requested from the host.
    #[must_use]
    pub fn thresholds(&self) -> &ThresholdTable {
        &self.thresholds
    }

    /// Returns the bound target, if any.
    #[must_use]
    pub fn target(&self) -> Option<&T> {
        self.target.as_ref()
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> TrackingState {
        match &self.mode {
            Mode::Idle => TrackingState::Disconnected,
            Mode::Coarse { .. } => TrackingState::CoarseWatching,
            Mode::Fine { .. } => TrackingState::FineWatching,
            Mode::Poll { poller, .. } => match poller.phase() {
                PollPhase::Polling => TrackingState::Polling,
                PollPhase::StopConfirming => TrackingState::StopConfirming,
            },
        }
    }

    /// Returns the fitted window while fine watching.
    #[must_use]
    pub fn fine_window(&self) -> Option<&FineWindow> {
        match &self.mode {
            Mode::Fine { window, .. } => Some(window),
            _ => None,
        }
    }

    /// Binds `target` and starts coarse watching.
    ///
    /// Any previous subscription or pending frame is torn down first, so
    /// calling this repeatedly is safe.
    pub fn observe<H: Host<Target = T>>(&mut self, host: &mut H, target: T, tracer: &mut Tracer<'_>) {
        let from = self.state();
        self.teardown(host);
        self.confirmed_still = false;
        self.target = Some(target);
        self.watch_coarse(host);
        self.transitioned(from, TransitionCause::Observe, tracer);
    }

    /// Tears down the active mechanism and releases the target.
    ///
    /// No report fires after this returns until the next
    /// [`observe`](Self::observe). Calling it while idle does nothing.
    pub fn disconnect<H: Host<Target = T>>(&mut self, host: &mut H, tracer: &mut Tracer<'_>) {
        if matches!(self.mode, Mode::Idle) && self.target.is_none() {
            return;
        }
        let from = self.state();
        self.teardown(host);
        self.target = None;
        self.confirmed_still = false;
        self.transitioned(from, TransitionCause::Disconnect, tracer);
    }

    /// Handles a batch of intersection notifications in arrival order.
    pub fn handle_intersections<H: Host<Target = T>>(
        &mut self,
        host: &mut H,
        entries: &[IntersectionEntry],
        tracer: &mut Tracer<'_>,
    ) {
        for entry in entries {
            self.handle_intersection(host, entry, tracer);
        }
    }

    /// Handles one intersection notification.
    ///
    /// Notifications for any subscription other than the live one are
    /// ignored.
    pub fn handle_intersection<H: Host<Target = T>>(
        &mut self,
        host: &mut H,
        entry: &IntersectionEntry,
        tracer: &mut Tracer<'_>,
    ) {
        match self.mode {
            Mode::Coarse { watch } if watch == entry.watch => {
                self.notified(entry, tracer);
                self.on_coarse(host, entry, tracer);
            }
            Mode::Fine { watch, window } if watch == entry.watch => {
                self.notified(entry, tracer);
                self.on_fine(host, entry, window, tracer);
            }
            _ => tracer.stale(&StaleEvent {
                kind: StaleKind::Notification,
                state: self.state(),
            }),
        }
    }

    /// Handles a frame callback for the poll loop.
    ///
    /// Frames other than the one the loop is waiting for are ignored.
    pub fn handle_frame<H: Host<Target = T>>(
        &mut self,
        host: &mut H,
        frame: FrameId,
        tracer: &mut Tracer<'_>,
    ) {
        let pending = match &self.mode {
            Mode::Poll { frame: pending, .. } => Some(*pending),
            _ => None,
        };
        if pending != Some(frame) {
            tracer.stale(&StaleEvent {
                kind: StaleKind::Frame,
                state: self.state(),
            });
            return;
        }

        let from = self.state();
        let Some(bounds) = self.target.as_ref().and_then(|t| host.bounding_rect(t)) else {
            // The frame already fired, so there is nothing to cancel. The
            // target stays bound; coarse watching picks it up if it returns.
            self.mode = Mode::Idle;
            self.confirmed_still = false;
            self.watch_coarse(host);
            self.transitioned(from, TransitionCause::TargetLost, tracer);
            return;
        };

        let (step, root_bounds) = match &mut self.mode {
            Mode::Poll {
                poller,
                root_bounds,
                ..
            } => {
                let step = poller.step(bounds);
                tracer.poll_tick(&PollTickEvent {
                    frame,
                    phase: poller.phase(),
                    changed: step == PollStep::Changed,
                    remaining: poller.remaining(),
                });
                (step, *root_bounds)
            }
            _ => return,
        };

        match step {
            PollStep::Changed => {
                self.report(bounds, false, root_bounds, tracer);
                self.schedule_next_frame(host);
            }
            PollStep::Quiet => self.schedule_next_frame(host),
            PollStep::Settled => {
                self.mode = Mode::Idle;
                self.confirmed_still = true;
                self.watch_coarse(host);
                self.transitioned(from, TransitionCause::StillnessConfirmed, tracer);
            }
        }
    }

    fn on_coarse<H: Host<Target = T>>(
        &mut self,
        host: &mut H,
        entry: &IntersectionEntry,
        tracer: &mut Tracer<'_>,
    ) {
        match classify_coarse(entry.ratio, self.config.enter_policy) {
            CoarseOutcome::OutOfViewport => {
                self.confirmed_still = false;
                self.report(entry.bounding_rect, true, entry.root_bounds, tracer);
            }
            CoarseOutcome::Visible => {
                self.confirmed_still = false;
                self.report(entry.bounding_rect, false, entry.root_bounds, tracer);
            }
            CoarseOutcome::Enter => {
                self.teardown(host);
                let window = FineWindow::from_entry(entry, host.visual_viewport());
                tracer.window(&WindowEvent {
                    fitted: window.fitted,
                    margins: window.margins,
                    expected_ratio: window.expected_ratio,
                });
                let Some(target) = self.target.as_ref() else {
                    return;
                };
                let watch = host.watch(
                    target,
                    &WatchSpec {
                        margins: window.margins,
                        thresholds: self.thresholds.as_slice(),
                    },
                );
                self.mode = Mode::Fine { watch, window };
                self.transitioned(
                    TrackingState::CoarseWatching,
                    TransitionCause::Entered,
                    tracer,
                );
            }
        }
    }

    fn on_fine<H: Host<Target = T>>(
        &mut self,
        host: &mut H,
        entry: &IntersectionEntry,
        window: FineWindow,
        tracer: &mut Tracer<'_>,
    ) {
        let bounds = entry.bounding_rect;
        match window.classify(entry.ratio) {
            FineOutcome::Contained => {
                self.report(bounds, false, window.root_bounds, tracer);
                let confirm = match self.config.stillness_rearm {
                    StillnessRearm::UnlessConfirmed => !self.confirmed_still,
                    StillnessRearm::Never => false,
                };
                if confirm {
                    self.teardown(host);
                    let poller = MotionPoller::confirming(&self.config, Some(bounds));
                    self.start_poll(host, poller, window.root_bounds);
                    self.transitioned(
                        TrackingState::FineWatching,
                        TransitionCause::StillnessArmed,
                        tracer,
                    );
                }
            }
            FineOutcome::Moved => {
                self.confirmed_still = false;
                self.report(bounds, false, window.root_bounds, tracer);
                self.teardown(host);
                let poller = MotionPoller::moving(&self.config, Some(bounds));
                self.start_poll(host, poller, window.root_bounds);
                self.transitioned(
                    TrackingState::FineWatching,
                    TransitionCause::MotionStarted,
                    tracer,
                );
            }
            FineOutcome::Exited => {
                self.confirmed_still = false;
                self.teardown(host);
                self.watch_coarse(host);
                self.transitioned(
                    TrackingState::FineWatching,
                    TransitionCause::ExitedWindow,
                    tracer,
                );
            }
        }
    }

    /// Releases whatever mechanism is live and leaves the mode idle.
    fn teardown<H: Host<Target = T>>(&mut self, host: &mut H) {
        match core::mem::replace(&mut self.mode, Mode::Idle) {
            Mode::Idle => {}
            Mode::Coarse { watch } | Mode::Fine { watch, .. } => host.unwatch(watch),
            Mode::Poll { frame, .. } => host.cancel_frame(frame),
        }
    }

    fn watch_coarse<H: Host<Target = T>>(&mut self, host: &mut H) {
        let Some(target) = self.target.as_ref() else {
            return;
        };
        let watch = host.watch(
            target,
            &WatchSpec {
                margins: Margins::ZERO,
                thresholds: self.thresholds.as_slice(),
            },
        );
        self.mode = Mode::Coarse { watch };
    }

    fn start_poll<H: Host<Target = T>>(
        &mut self,
        host: &mut H,
        poller: MotionPoller,
        root_bounds: Option<Rect>,
    ) {
        let frame = host.request_frame();
        self.mode = Mode::Poll {
            frame,
            poller,
            root_bounds,
        };
    }

    fn schedule_next_frame<H: Host<Target = T>>(&mut self, host: &mut H) {
        if let Mode::Poll { frame, .. } = &mut self.mode {
            *frame = host.request_frame();
        }
    }

    fn report(
        &mut self,
        bounds: Rect,
        out_of_viewport: bool,
        root_bounds: Option<Rect>,
        tracer: &mut Tracer<'_>,
    ) {
        let state = self.state();
        let Some(target) = self.target.as_ref() else {
            return;
        };
        tracer.report(&ReportEvent {
            state,
            x: bounds.x0,
            y: bounds.y0,
            out_of_viewport,
        });
        (self.reporter)(&PositionReport {
            x: bounds.x0,
            y: bounds.y0,
            target,
            out_of_viewport,
            root_bounds,
        });
    }

    fn notified(&self, entry: &IntersectionEntry, tracer: &mut Tracer<'_>) {
        tracer.notification(&NotificationEvent {
            state: self.state(),
            watch: entry.watch,
            ratio: entry.ratio,
        });
    }

    fn transitioned(&self, from: TrackingState, cause: TransitionCause, tracer: &mut Tracer<'_>) {
        tracer.transition(&TransitionEvent {
            from,
            to: self.state(),
            cause,
        });
    }
}
