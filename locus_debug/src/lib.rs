// Copyright 2026 the Locus Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pretty-printing, JSON Lines export, and event counting for locus
//! diagnostics.
//!
//! This crate provides [`TraceSink`](locus_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`jsonl::JsonLinesSink`]: one JSON object per event, for piping into
//!   `jq` or loading into a notebook.
//! - [`counting::CountingSink`]: per-kind event counters for assertions
//!   and HUDs.

pub mod counting;
pub mod jsonl;
pub mod pretty;
