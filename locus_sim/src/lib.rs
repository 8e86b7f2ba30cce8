// Copyright 2026 the Locus Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deterministic simulated host for exercising `locus_core` trackers without
//! a browser.
//!
//! - [`host::SimHost`] implements every `locus_core::host` capability over
//!   a list of element rects and a viewport. Intersection notifications
//!   follow threshold-crossing semantics; frame callbacks queue until taken.
//! - [`harness::SimHarness`] wires one tracker to a `SimHost` and steps it
//!   frame by frame, recording every position report.
//!
//! ```rust,ignore
//! let mut harness = SimHarness::new(TrackerConfig::web(), viewport);
//! let el = harness.host_mut().insert(Rect::new(10.0, 10.0, 60.0, 60.0));
//! harness.observe(el, &mut Tracer::none());
//! harness.host_mut().move_by(el, Vec2::new(4.0, 0.0));
//! harness.step(&mut Tracer::none());
//! ```

#![no_std]

extern crate alloc;

pub mod harness;
pub mod host;
