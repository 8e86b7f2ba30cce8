// Copyright 2026 the Locus Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-kind event counters.

use locus_core::trace::{
    HostFailureEvent, NotificationEvent, PollTickEvent, ReportEvent, StaleEvent, TraceSink,
    TransitionCause, TransitionEvent, WindowEvent,
};
use locus_core::tracker::TrackingState;

/// A [`TraceSink`] that only counts events.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CountingSink {
    /// Notifications handled by the live subscription.
    pub notifications: u64,
    /// Notifications and frames ignored as stale.
    pub stale: u64,
    /// State changes.
    pub transitions: u64,
    /// Fine windows built.
    pub windows: u64,
    /// Poll ticks handled.
    pub poll_ticks: u64,
    /// Poll ticks that saw the bounds change.
    pub moving_ticks: u64,
    /// Position reports.
    pub reports: u64,
    /// Reports flagged out of viewport.
    pub out_of_viewport_reports: u64,
    /// Poll loops that ended in confirmed stillness.
    pub settles: u64,
    /// Degraded host calls.
    pub host_failures: u64,
    /// Most recent state seen in any event.
    pub last_state: Option<TrackingState>,
}

impl CountingSink {
    /// Creates a sink with all counters at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets every counter.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl TraceSink for CountingSink {
    fn on_notification(&mut self, e: &NotificationEvent) {
        self.notifications += 1;
        self.last_state = Some(e.state);
    }

    fn on_stale(&mut self, e: &StaleEvent) {
        self.stale += 1;
        self.last_state = Some(e.state);
    }

    fn on_transition(&mut self, e: &TransitionEvent) {
        self.transitions += 1;
        if e.cause == TransitionCause::StillnessConfirmed {
            self.settles += 1;
        }
        self.last_state = Some(e.to);
    }

    fn on_window(&mut self, _e: &WindowEvent) {
        self.windows += 1;
    }

    fn on_poll_tick(&mut self, e: &PollTickEvent) {
        self.poll_ticks += 1;
        if e.changed {
            self.moving_ticks += 1;
        }
    }

    fn on_report(&mut self, e: &ReportEvent) {
        self.reports += 1;
        if e.out_of_viewport {
            self.out_of_viewport_reports += 1;
        }
        self.last_state = Some(e.state);
    }

    fn on_host_failure(&mut self, e: &HostFailureEvent) {
        self.host_failures += 1;
        self.last_state = Some(e.state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_settles_and_out_of_viewport_reports() {
        let mut sink = CountingSink::new();
        sink.on_transition(&TransitionEvent {
            from: TrackingState::StopConfirming,
            to: TrackingState::CoarseWatching,
            cause: TransitionCause::StillnessConfirmed,
        });
        sink.on_report(&ReportEvent {
            state: TrackingState::CoarseWatching,
            x: 0.0,
            y: -50.0,
            out_of_viewport: true,
        });
        assert_eq!(sink.transitions, 1);
        assert_eq!(sink.settles, 1);
        assert_eq!(sink.reports, 1);
        assert_eq!(sink.out_of_viewport_reports, 1);
        assert_eq!(sink.last_state, Some(TrackingState::CoarseWatching));

        sink.reset();
        assert_eq!(sink, CountingSink::default());
    }

    #[test]
    fn simulated_motion_is_counted() {
        use locus_core::config::TrackerConfig;
        use locus_core::kurbo::{Rect, Vec2};
        use locus_core::trace::Tracer;
        use locus_sim::harness::SimHarness;

        let mut sink = CountingSink::new();
        let mut harness = SimHarness::new(TrackerConfig::web(), Rect::new(0.0, 0.0, 800.0, 600.0));
        let el = harness
            .host_mut()
            .insert(Rect::new(100.0, 100.0, 140.0, 140.0));
        harness.observe(el, &mut Tracer::new(&mut sink));
        harness.settle(64, &mut Tracer::new(&mut sink));
        assert_eq!(sink.settles, 1);
        assert_eq!(sink.windows, 2);

        sink.reset();
        for _ in 0..4 {
            harness.host_mut().move_by(el, Vec2::new(0.0, 6.0));
            harness.step(&mut Tracer::new(&mut sink));
        }
        harness.settle(64, &mut Tracer::new(&mut sink));

        // The fine watcher catches the first move; the poller the other three.
        assert_eq!(sink.moving_ticks, 3);
        assert_eq!(sink.settles, 1);
        assert_eq!(sink.reports, 5);
        assert_eq!(sink.out_of_viewport_reports, 0);
        assert_eq!(sink.last_state, Some(TrackingState::FineWatching));
    }
}
