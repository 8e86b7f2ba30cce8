// Copyright 2026 the Locus Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame-driven motion sampling with stillness hysteresis.
//!
//! [`MotionPoller`] is the pure step logic of the poll loop. The tracker owns
//! the frame callback that drives it and feeds it one bounds sample per tick;
//! the poller decides whether the sample is motion, a quiet frame, or the
//! quiet frame that settles the loop.
//!
//! # Phases
//!
//! The loop has two phases that share one step function:
//!
//! - [`PollPhase::Polling`] tolerates
//!   [`motion_ticks`](crate::config::TrackerConfig::motion_ticks) quiet
//!   frames (the mid-motion grace period) and then moves to
//!   `StopConfirming`.
//! - [`PollPhase::StopConfirming`] needs
//!   [`stop_ticks`](crate::config::TrackerConfig::stop_ticks) quiet frames;
//!   the last one settles the loop.
//!
//! Any changed sample returns the loop to `Polling` with a fresh grace
//! period. With the default zero grace period, motion stops exactly
//! `stop_ticks` frames after the last change.

use kurbo::Rect;

use crate::config::TrackerConfig;
use crate::geometry::same_placement;

/// Phase of the poll loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PollPhase {
    /// Sampling while the target is (or was just) moving.
    Polling,
    /// Counting quiet frames before declaring the target still.
    StopConfirming,
}

/// Outcome of one poll step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PollStep {
    /// The bounds changed; report them and keep polling.
    Changed,
    /// The bounds are unchanged; keep polling.
    Quiet,
    /// Enough quiet frames have passed; the loop is over.
    Settled,
}

/// Step logic for one poll loop.
#[derive(Clone, Debug)]
pub struct MotionPoller {
    phase: PollPhase,
    sample: Option<Rect>,
    remaining: u32,
    motion_ticks: u32,
    stop_ticks: u32,
}

impl MotionPoller {
    /// Starts a loop in [`PollPhase::Polling`].
    ///
    /// `seed` is the last reported position, so an unchanged first frame is
    /// not reported twice.
    #[must_use]
    pub fn moving(config: &TrackerConfig, seed: Option<Rect>) -> Self {
        Self {
            phase: PollPhase::Polling,
            sample: seed,
            remaining: config.motion_ticks(),
            motion_ticks: config.motion_ticks(),
            stop_ticks: config.stop_ticks(),
        }
    }

    /// Starts a loop directly in [`PollPhase::StopConfirming`].
    #[must_use]
    pub fn confirming(config: &TrackerConfig, seed: Option<Rect>) -> Self {
        Self {
            phase: PollPhase::StopConfirming,
            sample: seed,
            remaining: config.stop_ticks(),
            motion_ticks: config.motion_ticks(),
            stop_ticks: config.stop_ticks(),
        }
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> PollPhase {
        self.phase
    }

    /// Last recorded bounds, cleared once the loop settles.
    #[must_use]
    pub fn sample(&self) -> Option<Rect> {
        self.sample
    }

    /// Quiet frames left in the current phase.
    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Feeds one frame's bounds.
    pub fn step(&mut self, bounds: Rect) -> PollStep {
        if self.sample.is_none_or(|last| !same_placement(last, bounds)) {
            self.sample = Some(bounds);
            self.phase = PollPhase::Polling;
            self.remaining = self.motion_ticks;
            return PollStep::Changed;
        }

        if self.phase == PollPhase::Polling {
            if self.remaining > 0 {
                self.remaining -= 1;
                return PollStep::Quiet;
            }
            // Grace period used up; this frame is the first confirming one.
            self.phase = PollPhase::StopConfirming;
            self.remaining = self.stop_ticks;
        }

        if self.remaining <= 1 {
            self.remaining = 0;
            self.sample = None;
            PollStep::Settled
        } else {
            self.remaining -= 1;
            PollStep::Quiet
        }
    }
}
