// Copyright 2026 the Locus Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the tracker.
//!
//! This module provides a [`TraceSink`] trait with one method per tracker
//! event. All method bodies default to no-ops, so implementing only the
//! events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink` and is passed to every
//! [`Tracker`](crate::tracker::Tracker) entry point. When the `trace`
//! feature is **off**, every `Tracer` method compiles to nothing (zero
//! overhead). When **on**, each method performs a single `Option` branch
//! before dispatching.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).

use kurbo::Rect;

use crate::geometry::Margins;
use crate::host::{FrameId, WatchId};
use crate::poll::PollPhase;
use crate::tracker::TrackingState;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Why the tracker changed state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransitionCause {
    /// `observe` bound a new target.
    Observe,
    /// `disconnect` was called.
    Disconnect,
    /// The target became visible enough to fit a window around it.
    Entered,
    /// The target partially left its fitted window.
    MotionStarted,
    /// The target entirely left its fitted window.
    ExitedWindow,
    /// Containment was regained and stillness is being confirmed.
    StillnessArmed,
    /// The poller saw enough quiet frames.
    StillnessConfirmed,
    /// The target's geometry became unavailable while polling.
    TargetLost,
}

/// Which kind of delivery was discarded as stale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StaleKind {
    /// An intersection notification for a subscription no longer held.
    Notification,
    /// A frame callback for a loop no longer running.
    Frame,
}

/// Host capability a [`HostFailureEvent`] refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HostOperation {
    /// Creating an intersection subscription.
    Watch,
    /// Scheduling a frame callback.
    RequestFrame,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted for every intersection notification addressed to the active
/// subscription.
#[derive(Clone, Copy, Debug)]
pub struct NotificationEvent {
    /// State that handled the notification.
    pub state: TrackingState,
    /// Subscription the notification belongs to.
    pub watch: WatchId,
    /// Reported intersection ratio.
    pub ratio: f64,
}

/// Emitted when a delivery is ignored because its handle is not current.
#[derive(Clone, Copy, Debug)]
pub struct StaleEvent {
    /// What was ignored.
    pub kind: StaleKind,
    /// State at the time.
    pub state: TrackingState,
}

/// Emitted on every state change.
#[derive(Clone, Copy, Debug)]
pub struct TransitionEvent {
    /// Previous state.
    pub from: TrackingState,
    /// New state.
    pub to: TrackingState,
    /// Why.
    pub cause: TransitionCause,
}

/// Emitted when a fitted window is built for the fine watcher.
#[derive(Clone, Copy, Debug)]
pub struct WindowEvent {
    /// Fitted window in viewport coordinates.
    pub fitted: Rect,
    /// Margins handed to the host.
    pub margins: Margins,
    /// Ratio a still target is expected to report against the window.
    pub expected_ratio: f64,
}

/// Emitted for every poll tick the active loop handles.
#[derive(Clone, Copy, Debug)]
pub struct PollTickEvent {
    /// The frame callback that fired.
    pub frame: FrameId,
    /// Phase after the tick.
    pub phase: PollPhase,
    /// Whether the bounds differed from the last sample.
    pub changed: bool,
    /// Quiet ticks left in the phase.
    pub remaining: u32,
}

/// Emitted for every position report handed to the callback.
#[derive(Clone, Copy, Debug)]
pub struct ReportEvent {
    /// State that produced the report.
    pub state: TrackingState,
    /// Target left edge.
    pub x: f64,
    /// Target top edge.
    pub y: f64,
    /// Whether the target was entirely outside the viewport.
    pub out_of_viewport: bool,
}

/// Emitted by hosts when a platform call fails and they degrade instead.
///
/// The tracker never produces this event; hosts that own a [`Tracer`] emit
/// it after the dispatch that hit the failure.
#[derive(Clone, Copy, Debug)]
pub struct HostFailureEvent {
    /// Which capability failed.
    pub operation: HostOperation,
    /// Tracker state after the dispatch.
    pub state: TrackingState,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the tracker.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called for each notification addressed to the active subscription.
    fn on_notification(&mut self, e: &NotificationEvent) {
        _ = e;
    }

    /// Called when a stale notification or frame is ignored.
    fn on_stale(&mut self, e: &StaleEvent) {
        _ = e;
    }

    /// Called on every state change.
    fn on_transition(&mut self, e: &TransitionEvent) {
        _ = e;
    }

    /// Called when a fitted window is built.
    fn on_window(&mut self, e: &WindowEvent) {
        _ = e;
    }

    /// Called for each handled poll tick.
    fn on_poll_tick(&mut self, e: &PollTickEvent) {
        _ = e;
    }

    /// Called for each position report.
    fn on_report(&mut self, e: &ReportEvent) {
        _ = e;
    }

    /// Called when a host reports a degraded platform call.
    fn on_host_failure(&mut self, e: &HostFailureEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`NotificationEvent`].
    #[inline]
    pub fn notification(&mut self, e: &NotificationEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_notification(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`StaleEvent`].
    #[inline]
    pub fn stale(&mut self, e: &StaleEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_stale(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`TransitionEvent`].
    #[inline]
    pub fn transition(&mut self, e: &TransitionEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_transition(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`WindowEvent`].
    #[inline]
    pub fn window(&mut self, e: &WindowEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_window(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PollTickEvent`].
    #[inline]
    pub fn poll_tick(&mut self, e: &PollTickEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_poll_tick(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`ReportEvent`].
    #[inline]
    pub fn report(&mut self, e: &ReportEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_report(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`HostFailureEvent`].
    #[inline]
    pub fn host_failure(&mut self, e: &HostFailureEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_host_failure(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
