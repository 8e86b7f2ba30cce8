// Copyright 2026 the Locus Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Browser console trace output.

use alloc::format;
use alloc::string::String;

use locus_core::trace::{
    HostFailureEvent, NotificationEvent, PollTickEvent, ReportEvent, StaleEvent, TraceSink,
    TransitionEvent, WindowEvent,
};
use wasm_bindgen::JsValue;
use web_sys::console;

/// A [`TraceSink`] that logs one line per event to the browser console.
///
/// Notifications and poll ticks are frequent; they are only logged when
/// [`verbose`](Self::verbose) is set. Host failures go to `console.warn`.
#[derive(Clone, Debug, Default)]
pub struct ConsoleSink {
    prefix: String,
    verbose: bool,
}

impl ConsoleSink {
    /// Creates a sink that logs transitions, windows, reports and failures.
    #[must_use]
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.into(),
            verbose: false,
        }
    }

    /// Also log every notification and poll tick.
    #[must_use]
    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }

    fn log(&self, line: &str) {
        console::log_1(&JsValue::from_str(&format!("{}{line}", self.prefix)));
    }
}

fn transition_line(e: &TransitionEvent) -> String {
    format!("{:?} -> {:?} ({:?})", e.from, e.to, e.cause)
}

fn window_line(e: &WindowEvent) -> String {
    format!(
        "window {}x{} at {},{} rootMargin=\"{}\"",
        e.fitted.width(),
        e.fitted.height(),
        e.fitted.x0,
        e.fitted.y0,
        e.margins.css(),
    )
}

fn report_line(e: &ReportEvent) -> String {
    let out = if e.out_of_viewport {
        " (out of viewport)"
    } else {
        ""
    };
    format!("report {},{}{out}", e.x, e.y)
}

impl TraceSink for ConsoleSink {
    fn on_notification(&mut self, e: &NotificationEvent) {
        if self.verbose {
            self.log(&format!("{:?} ratio={:.4}", e.state, e.ratio));
        }
    }

    fn on_stale(&mut self, e: &StaleEvent) {
        if self.verbose {
            self.log(&format!("stale {:?}", e.kind));
        }
    }

    fn on_transition(&mut self, e: &TransitionEvent) {
        self.log(&transition_line(e));
    }

    fn on_window(&mut self, e: &WindowEvent) {
        self.log(&window_line(e));
    }

    fn on_poll_tick(&mut self, e: &PollTickEvent) {
        if self.verbose {
            self.log(&format!(
                "tick {:?} changed={} remaining={}",
                e.phase, e.changed, e.remaining
            ));
        }
    }

    fn on_report(&mut self, e: &ReportEvent) {
        self.log(&report_line(e));
    }

    fn on_host_failure(&mut self, e: &HostFailureEvent) {
        console::warn_1(&JsValue::from_str(&format!(
            "{}{:?} failed; tracking degraded in {:?}",
            self.prefix, e.operation, e.state
        )));
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Rect;
    use locus_core::geometry::Margins;
    use locus_core::trace::TransitionCause;
    use locus_core::tracker::TrackingState;

    use super::*;

    #[test]
    fn lines_read_naturally() {
        assert_eq!(
            transition_line(&TransitionEvent {
                from: TrackingState::Polling,
                to: TrackingState::StopConfirming,
                cause: TransitionCause::StillnessArmed,
            }),
            "Polling -> StopConfirming (StillnessArmed)"
        );
        assert_eq!(
            report_line(&ReportEvent {
                state: TrackingState::CoarseWatching,
                x: 3.0,
                y: -40.5,
                out_of_viewport: true,
            }),
            "report 3,-40.5 (out of viewport)"
        );
        assert_eq!(
            window_line(&WindowEvent {
                fitted: Rect::new(10.0, 20.0, 30.0, 60.0),
                margins: Margins::ZERO,
                expected_ratio: 1.0,
            }),
            "window 20x40 at 10,20 rootMargin=\"0px 0px 0px 0px\""
        );
    }
}
