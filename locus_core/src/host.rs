// Copyright 2026 the Locus Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host capability contract.
//!
//! The tracker never talks to a platform directly. Hosts provide four
//! capabilities, each a small trait:
//!
//! - [`TargetGeometry`]: synchronous bounding-rect queries for a target.
//! - [`IntersectionSource`]: visibility-ratio subscriptions against the
//!   viewport, optionally shrunk by [`Margins`]. Notifications are delivered
//!   back to [`Tracker::handle_intersections`] as [`IntersectionEntry`]
//!   batches.
//! - [`FrameSource`]: one-shot "before next repaint" callbacks, delivered
//!   back to [`Tracker::handle_frame`].
//! - [`ViewportMetrics`]: the visible viewport rectangle, used when a
//!   notification carries no root bounds.
//!
//! [`Host`] is implemented for every type that provides all four.
//!
//! # Handles
//!
//! Hosts mint [`WatchId`]s and [`FrameId`]s and echo them back with every
//! delivery. The tracker treats them as opaque and compares them against the
//! subscription it currently holds, so deliveries from a subscription it has
//! already torn down are ignored.
//!
//! [`Tracker::handle_intersections`]: crate::tracker::Tracker::handle_intersections
//! [`Tracker::handle_frame`]: crate::tracker::Tracker::handle_frame

use core::fmt;

use kurbo::Rect;

use crate::geometry::Margins;

/// Identifies one intersection subscription.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct WatchId(pub u32);

impl fmt::Debug for WatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WatchId({})", self.0)
    }
}

/// Identifies one pending frame callback.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FrameId(pub u32);

impl fmt::Debug for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FrameId({})", self.0)
    }
}

/// Parameters of an intersection subscription.
#[derive(Clone, Copy, Debug)]
pub struct WatchSpec<'a> {
    /// Adjustment applied to the viewport boundary. [`Margins::ZERO`] watches
    /// the full viewport.
    pub margins: Margins,
    /// Ratios at which the host must notify, ascending.
    pub thresholds: &'a [f64],
}

/// One visibility notification.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntersectionEntry {
    /// Subscription this notification belongs to.
    pub watch: WatchId,
    /// Target bounds at notification time.
    pub bounding_rect: Rect,
    /// Boundary rect after margins were applied, if the host knows it.
    pub root_bounds: Option<Rect>,
    /// Visible part of the target within the boundary.
    pub intersection_rect: Rect,
    /// `intersection area / target area`, in `0.0..=1.0`.
    pub ratio: f64,
}

/// Synchronous geometry queries.
pub trait TargetGeometry {
    /// Handle to a tracked element.
    type Target: Clone;

    /// Returns the target's bounding rect in viewport coordinates, or `None`
    /// if the target no longer exists.
    fn bounding_rect(&self, target: &Self::Target) -> Option<Rect>;
}

/// Visibility-ratio subscriptions.
pub trait IntersectionSource: TargetGeometry {
    /// Starts watching `target` and returns the subscription handle.
    ///
    /// Hosts should deliver an initial notification with the current ratio,
    /// then one whenever the ratio crosses a threshold.
    fn watch(&mut self, target: &Self::Target, spec: &WatchSpec<'_>) -> WatchId;

    /// Ends a subscription. Unknown or already-ended handles are ignored.
    fn unwatch(&mut self, watch: WatchId);
}

/// One-shot frame callbacks.
pub trait FrameSource {
    /// Requests a single callback before the next repaint.
    fn request_frame(&mut self) -> FrameId;

    /// Cancels a pending callback. Unknown or already-fired handles are
    /// ignored.
    fn cancel_frame(&mut self, frame: FrameId);
}

/// Viewport fallback for notifications without root bounds.
pub trait ViewportMetrics {
    /// Returns the visible viewport's offset and size.
    fn visual_viewport(&self) -> Rect;
}

/// Everything the tracker needs from its host.
pub trait Host: IntersectionSource + FrameSource + ViewportMetrics {}

impl<H: IntersectionSource + FrameSource + ViewportMetrics> Host for H {}
