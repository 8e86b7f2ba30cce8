// Copyright 2026 the Locus Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Classification rules for the coarse and fine boundary watchers.
//!
//! Both watchers are host intersection subscriptions; what distinguishes
//! them is how a notification's ratio is read:
//!
//! - The **coarse** watcher observes the target against the whole viewport
//!   and only cares whether it is out of view, partially visible, or visible
//!   enough to hand to the fine watcher ([`classify_coarse`]).
//! - The **fine** watcher observes the target against a [`FineWindow`]
//!   built around the target's own footprint. Because the window matches
//!   the footprint, any displacement lowers the ratio below its resting
//!   value before it can reach zero ([`FineWindow::classify`]).

use kurbo::Rect;

use crate::config::EnterPolicy;
use crate::geometry::{Margins, compute_margins, fit_window, intersection_ratio};
use crate::host::IntersectionEntry;

/// Tolerance for comparing host-reported ratios against exact values.
pub const RATIO_EPSILON: f64 = 1e-9;

/// How the coarse watcher reads a notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CoarseOutcome {
    /// No part of the target is in the viewport.
    OutOfViewport,
    /// Visible, but not enough to satisfy the [`EnterPolicy`].
    Visible,
    /// Hand the target to the fine watcher.
    Enter,
}

/// Classifies a coarse notification ratio.
#[must_use]
pub fn classify_coarse(ratio: f64, policy: EnterPolicy) -> CoarseOutcome {
    if ratio <= 0.0 {
        return CoarseOutcome::OutOfViewport;
    }
    match policy {
        EnterPolicy::AnyVisible => CoarseOutcome::Enter,
        EnterPolicy::FullyVisible if ratio >= 1.0 - RATIO_EPSILON => CoarseOutcome::Enter,
        EnterPolicy::FullyVisible => CoarseOutcome::Visible,
    }
}

/// How the fine watcher reads a notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FineOutcome {
    /// The target still sits in its window.
    Contained,
    /// The target partially left its window.
    Moved,
    /// The target entirely left its window.
    Exited,
}

/// The fine watcher's detection window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FineWindow {
    /// Window of the target's size, clamped inside the outer boundary.
    pub fitted: Rect,
    /// Margins that carve the window out of the outer boundary.
    pub margins: Margins,
    /// Ratio the target reports against the window while it stays put.
    ///
    /// `1.0` whenever the target was fully visible when the window was built.
    pub expected_ratio: f64,
    /// Root bounds from the notification the window was built from.
    pub root_bounds: Option<Rect>,
}

impl FineWindow {
    /// Builds a window from a coarse notification.
    ///
    /// The window is fitted around the notification's intersection rect.
    /// `viewport` stands in for the outer boundary when the notification
    /// carries no root bounds.
    #[must_use]
    pub fn from_entry(entry: &IntersectionEntry, viewport: Rect) -> Self {
        let outer = entry.root_bounds.unwrap_or(viewport);
        let fitted = fit_window(entry.intersection_rect, outer);
        let margins = compute_margins(fitted, outer);
        let expected_ratio = intersection_ratio(entry.bounding_rect, margins.apply(outer));
        Self {
            fitted,
            margins,
            expected_ratio,
            root_bounds: entry.root_bounds,
        }
    }

    /// Classifies a fine notification ratio.
    #[must_use]
    pub fn classify(&self, ratio: f64) -> FineOutcome {
        if ratio <= 0.0 {
            FineOutcome::Exited
        } else if ratio + RATIO_EPSILON >= self.expected_ratio {
            FineOutcome::Contained
        } else {
            FineOutcome::Moved
        }
    }
}
