// Copyright 2026 the Locus Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracker configuration.
//!
//! [`TrackerConfig`] is a plain `Copy` struct with public fields and `const`
//! presets. The two policy enums resolve points where hosts disagree about
//! when a target should be considered "in view" and when stillness needs to
//! be re-confirmed.

/// When the coarse watcher hands a visible target to the fine watcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EnterPolicy {
    /// Only once the target is entirely inside the viewport (ratio `== 1`).
    ///
    /// The fitted window then has exactly the target's footprint, so any
    /// displacement is detectable. Partially visible targets stay on the
    /// coarse watcher, which reports their position on every ratio change.
    FullyVisible,
    /// As soon as any part of the target is visible (ratio `> 0`).
    ///
    /// The fitted window is built from the visible part only. Motion that
    /// keeps the visible part inside the target's new footprint (for
    /// example scrolling an overhanging target further in) is only picked up
    /// once the visible fraction changes.
    AnyVisible,
}

/// Whether a fine-window containment notification confirms stillness with a
/// short poll before settling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StillnessRearm {
    /// Confirm unless the poller already confirmed stillness at this
    /// position.
    ///
    /// Confirmation is needed after the target arrives from outside the
    /// window (it may still be moving slowly) but not after the poller has
    /// just watched it come to rest.
    UnlessConfirmed,
    /// Never confirm; containment alone counts as still.
    Never,
}

/// Configuration for the [`Tracker`](crate::tracker::Tracker).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrackerConfig {
    /// Subdivisions of the notification threshold table.
    pub threshold_steps: u32,
    /// Assumed frame interval, in milliseconds, for converting wait times to
    /// tick counts.
    pub frame_interval_ms: u32,
    /// Quiet time tolerated mid-motion before stillness confirmation begins.
    pub wait_time_ms: u32,
    /// Quiet time required to declare that motion has stopped.
    pub stop_wait_time_ms: u32,
    /// Coarse-to-fine hand-off trigger.
    pub enter_policy: EnterPolicy,
    /// Stillness confirmation on fine-window containment.
    pub stillness_rearm: StillnessRearm,
}

impl TrackerConfig {
    /// Default configuration for browser hosts.
    #[must_use]
    pub const fn web() -> Self {
        Self {
            threshold_steps: crate::threshold::DEFAULT_STEPS,
            frame_interval_ms: 16,
            wait_time_ms: 0,
            stop_wait_time_ms: 100,
            enter_policy: EnterPolicy::FullyVisible,
            stillness_rearm: StillnessRearm::UnlessConfirmed,
        }
    }

    /// Configuration for hosts where targets rarely move.
    ///
    /// Hands off to the fine watcher as soon as anything is visible and does
    /// not spend frames confirming stillness.
    #[must_use]
    pub const fn eager() -> Self {
        Self {
            threshold_steps: crate::threshold::DEFAULT_STEPS,
            frame_interval_ms: 16,
            wait_time_ms: 0,
            stop_wait_time_ms: 0,
            enter_policy: EnterPolicy::AnyVisible,
            stillness_rearm: StillnessRearm::Never,
        }
    }

    /// Quiet ticks tolerated while actively polling, `ceil(wait / interval)`.
    #[must_use]
    pub const fn motion_ticks(&self) -> u32 {
        ticks_for(self.wait_time_ms, self.frame_interval_ms)
    }

    /// Quiet ticks needed to confirm stillness; always at least one.
    #[must_use]
    pub const fn stop_ticks(&self) -> u32 {
        let ticks = ticks_for(self.stop_wait_time_ms, self.frame_interval_ms);
        if ticks == 0 { 1 } else { ticks }
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self::web()
    }
}

/// `ceil(wait / interval)`, treating a zero interval as one millisecond.
const fn ticks_for(wait_ms: u32, interval_ms: u32) -> u32 {
    let interval = if interval_ms == 0 { 1 } else { interval_ms };
    wait_ms.div_ceil(interval)
}
