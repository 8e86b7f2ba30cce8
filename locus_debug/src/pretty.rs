// Copyright 2026 the Locus Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Rects are
//! printed as `x,y wxh`.

use std::io::Write;

use locus_core::kurbo::Rect;
use locus_core::trace::{
    HostFailureEvent, NotificationEvent, PollTickEvent, ReportEvent, StaleEvent, TraceSink,
    TransitionEvent, WindowEvent,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    prefix: &'static str,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
            prefix: "",
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer, prefix: "" }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer, prefix: "" }
    }

    /// Prepends `prefix` to every line, to tell several trackers apart.
    #[must_use]
    pub fn with_prefix(mut self, prefix: &'static str) -> Self {
        self.prefix = prefix;
        self
    }

    /// Consumes the sink and returns the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

struct Compact(Rect);

impl std::fmt::Display for Compact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let r = self.0;
        write!(f, "{},{} {}x{}", r.x0, r.y0, r.width(), r.height())
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_notification(&mut self, e: &NotificationEvent) {
        let _ = writeln!(
            self.writer,
            "{}[notify] {:?} watch={} ratio={:.4}",
            self.prefix, e.state, e.watch.0, e.ratio,
        );
    }

    fn on_stale(&mut self, e: &StaleEvent) {
        let _ = writeln!(
            self.writer,
            "{}[stale] {:?} ignored in {:?}",
            self.prefix, e.kind, e.state,
        );
    }

    fn on_transition(&mut self, e: &TransitionEvent) {
        let _ = writeln!(
            self.writer,
            "{}[state] {:?} -> {:?} ({:?})",
            self.prefix, e.from, e.to, e.cause,
        );
    }

    fn on_window(&mut self, e: &WindowEvent) {
        let _ = writeln!(
            self.writer,
            "{}[window] fitted={} margins=\"{}\" expect={:.4}",
            self.prefix,
            Compact(e.fitted),
            e.margins.css(),
            e.expected_ratio,
        );
    }

    fn on_poll_tick(&mut self, e: &PollTickEvent) {
        let changed = if e.changed { "moved" } else { "still" };
        let _ = writeln!(
            self.writer,
            "{}[tick] frame={} {:?} {changed} remaining={}",
            self.prefix, e.frame.0, e.phase, e.remaining,
        );
    }

    fn on_report(&mut self, e: &ReportEvent) {
        let visibility = if e.out_of_viewport { " OUT" } else { "" };
        let _ = writeln!(
            self.writer,
            "{}[report] x={} y={}{visibility} from {:?}",
            self.prefix, e.x, e.y, e.state,
        );
    }

    fn on_host_failure(&mut self, e: &HostFailureEvent) {
        let _ = writeln!(
            self.writer,
            "{}[host] {:?} FAILED in {:?}",
            self.prefix, e.operation, e.state,
        );
    }
}
