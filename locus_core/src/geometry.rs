// Copyright 2026 the Locus Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pure geometry for building the fine tracking window.
//!
//! The fine watcher detects motion by observing the target against a window
//! that has exactly the target's footprint. Hosts express detection regions
//! as an outer boundary (the viewport) shrunk by per-side margins, so this
//! module provides the two halves of that projection:
//!
//! - [`fit_window`] clamps a rectangle of the target's size into the outer
//!   boundary.
//! - [`compute_margins`] expresses the fitted window as inward-only
//!   [`Margins`] on the outer boundary.
//!
//! [`intersection_ratio`] is the same overlap measure hosts report, used to
//! predict the ratio a still target will produce against a fitted window.
//!
//! All rectangles use viewport coordinates: `x0`/`y0` are left/top and
//! `x1`/`y1` are right/bottom.

use core::fmt;

use kurbo::{Insets, Rect};

/// Slack, in pixels, left between the fitted window and each outer edge.
///
/// Keeps a window that touches the outer boundary from collapsing to zero
/// width in the host's margin arithmetic.
pub const EDGE_BIAS: f64 = 1.0;

/// Inward offsets that project a window onto an outer boundary.
///
/// Ordered like CSS `rootMargin`: top, right, bottom, left. Every value is
/// `<= 0`; margins only ever shrink the outer boundary.
#[derive(Clone, Copy, PartialEq, Default)]
pub struct Margins {
    /// Offset applied to the top edge.
    pub top: f64,
    /// Offset applied to the right edge.
    pub right: f64,
    /// Offset applied to the bottom edge.
    pub bottom: f64,
    /// Offset applied to the left edge.
    pub left: f64,
}

impl Margins {
    /// No adjustment: the detection region is the outer boundary itself.
    pub const ZERO: Self = Self {
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
        left: 0.0,
    };

    /// Returns `true` if every side is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Converts to [`kurbo::Insets`] (negative insets shrink a rect).
    #[must_use]
    pub fn to_insets(self) -> Insets {
        Insets::new(self.left, self.top, self.right, self.bottom)
    }

    /// Returns the detection region these margins carve out of `outer`.
    #[must_use]
    pub fn apply(self, outer: Rect) -> Rect {
        outer + self.to_insets()
    }

    /// Returns a [`fmt::Display`] adapter producing a CSS `rootMargin` value.
    #[must_use]
    pub fn css(&self) -> CssMargins<'_> {
        CssMargins(self)
    }
}

impl fmt::Debug for Margins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Margins({} {} {} {})",
            self.top, self.right, self.bottom, self.left
        )
    }
}

/// Formats [`Margins`] as `"{top}px {right}px {bottom}px {left}px"`.
#[derive(Debug)]
pub struct CssMargins<'a>(&'a Margins);

impl fmt::Display for CssMargins<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.0;
        write!(f, "{}px {}px {}px {}px", m.top, m.right, m.bottom, m.left)
    }
}

/// Returns a rect of `target`'s size moved to lie inside `outer`.
///
/// Each axis is clamped independently. When the target is larger than
/// `outer` on an axis, the window collapses onto `outer`'s origin on that
/// axis instead of failing.
#[must_use]
pub fn fit_window(target: Rect, outer: Rect) -> Rect {
    let width = target.width();
    let height = target.height();
    // `min` before `max` so an oversize target lands on the outer origin.
    let left = target.x0.min(outer.x1 - width).max(outer.x0);
    let top = target.y0.min(outer.y1 - height).max(outer.y0);
    Rect::new(left, top, left + width, top + height)
}

/// Computes the margins that shrink `outer` down to `fitted`.
///
/// Each side is `min(0, -(gap - EDGE_BIAS))`, where `gap` is the distance
/// from the fitted edge to the matching outer edge. The resulting region is
/// the fitted window grown by [`EDGE_BIAS`] on every side that has room.
#[must_use]
pub fn compute_margins(fitted: Rect, outer: Rect) -> Margins {
    let side = |gap: f64| (-(gap - EDGE_BIAS)).min(0.0);
    Margins {
        top: side(fitted.y0 - outer.y0),
        right: side(outer.x1 - fitted.x1),
        bottom: side(outer.y1 - fitted.y1),
        left: side(fitted.x0 - outer.x0),
    }
}

/// Fraction of `target`'s area that overlaps `region`, in `0.0..=1.0`.
///
/// A zero-area target reports `1.0` if its origin lies inside `region`
/// (edges inclusive) and `0.0` otherwise.
#[must_use]
pub fn intersection_ratio(target: Rect, region: Rect) -> f64 {
    let area = target.width() * target.height();
    if area <= 0.0 {
        let inside = target.x0 >= region.x0
            && target.x0 <= region.x1
            && target.y0 >= region.y0
            && target.y0 <= region.y1;
        return if inside { 1.0 } else { 0.0 };
    }
    let overlap = overlap(target, region);
    (overlap.width() * overlap.height() / area).clamp(0.0, 1.0)
}

/// Returns the overlap of two rects, or a zero-area rect at the nearest
/// corner when they are disjoint.
#[must_use]
pub fn overlap(a: Rect, b: Rect) -> Rect {
    let x0 = a.x0.max(b.x0);
    let y0 = a.y0.max(b.y0);
    let x1 = a.x1.min(b.x1).max(x0);
    let y1 = a.y1.min(b.y1).max(y0);
    Rect::new(x0, y0, x1, y1)
}

/// Componentwise comparison on left, top, width and height.
#[must_use]
pub fn same_placement(a: Rect, b: Rect) -> bool {
    a.x0 == b.x0 && a.y0 == b.y0 && a.width() == b.width() && a.height() == b.height()
}
