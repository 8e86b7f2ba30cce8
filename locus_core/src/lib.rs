// Copyright 2026 the Locus Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Adaptive position tracking for a single on-screen element.
//!
//! `locus_core` keeps a reporting callback informed of where a target sits
//! in the viewport while spending as little work as possible when nothing
//! moves. It is `no_std` compatible (with `alloc`) and talks to its platform
//! only through the small capability traits in [`host`].
//!
//! # Architecture
//!
//! The tracker escalates from cheap event-driven watching to per-frame
//! sampling only while the target actually moves, then steps back down:
//!
//! ```text
//!   Host (intersection + frame callbacks)
//!       │
//!       ▼
//!   IntersectionEntry ──► Tracker::handle_intersections()
//!   FrameId ───────────► Tracker::handle_frame()
//!                                │
//!            ┌───────────────────┤
//!            ▼                   ▼
//!   watch::classify_*    poll::MotionPoller::step()
//!            │                   │
//!            └─────────┬─────────┘
//!                      ▼
//!   PositionReport ──► reporting callback
//! ```
//!
//! **[`tracker`]**: The state machine over coarse watching, fine watching,
//! polling and stop confirming. Owns exactly one live mechanism at a time
//! and ignores deliveries from any other.
//!
//! **[`watch`]**: How coarse and fine notifications are read, and the
//! [`FineWindow`](watch::FineWindow) fitted around a visible target.
//!
//! **[`poll`]**: Frame-driven motion sampling with a grace period and a
//! stillness-confirmation countdown.
//!
//! **[`geometry`]**: Window fitting, boundary margins, and overlap ratios
//! on [`kurbo::Rect`].
//!
//! **[`threshold`]**: The evenly spaced ratio table handed to hosts.
//!
//! **[`config`]**: [`TrackerConfig`](config::TrackerConfig) timing and
//! policy knobs, with presets.
//!
//! **[`host`]**: Capability traits a platform implements.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! tracker instrumentation, with zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub use kurbo;

pub mod config;
pub mod geometry;
pub mod host;
pub mod poll;
pub mod threshold;
pub mod trace;
pub mod tracker;
pub mod watch;
