// Copyright 2026 the Locus Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON Lines trace export.
//!
//! [`JsonLinesSink`] writes one self-describing JSON object per event, each
//! carrying a monotonically increasing `seq` and an `event` tag:
//!
//! ```text
//! {"seq":0,"event":"transition","from":"Disconnected","to":"CoarseWatching","cause":"Observe"}
//! {"seq":1,"event":"notification","state":"CoarseWatching","watch":1,"ratio":1.0}
//! ```

use std::io::Write;

use serde_json::{Value, json};

use locus_core::kurbo::Rect;
use locus_core::trace::{
    HostFailureEvent, NotificationEvent, PollTickEvent, ReportEvent, StaleEvent, TraceSink,
    TransitionEvent, WindowEvent,
};

/// Writes one JSON object per trace event to a [`Write`] destination.
pub struct JsonLinesSink<W: Write> {
    writer: W,
    seq: u64,
}

impl<W: Write> std::fmt::Debug for JsonLinesSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonLinesSink")
            .field("seq", &self.seq)
            .finish_non_exhaustive()
    }
}

impl<W: Write> JsonLinesSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self { writer, seq: 0 }
    }

    /// Number of events written so far.
    #[must_use]
    pub fn events_written(&self) -> u64 {
        self.seq
    }

    /// Consumes the sink and returns the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn emit(&mut self, event: &str, mut body: Value) {
        if let Value::Object(map) = &mut body {
            map.insert("seq".into(), json!(self.seq));
            map.insert("event".into(), json!(event));
        }
        self.seq += 1;
        if serde_json::to_writer(&mut self.writer, &body).is_ok() {
            let _ = self.writer.write_all(b"\n");
        }
    }
}

fn rect(r: Rect) -> Value {
    json!({ "x": r.x0, "y": r.y0, "width": r.width(), "height": r.height() })
}

impl<W: Write> TraceSink for JsonLinesSink<W> {
    fn on_notification(&mut self, e: &NotificationEvent) {
        self.emit(
            "notification",
            json!({
                "state": format!("{:?}", e.state),
                "watch": e.watch.0,
                "ratio": e.ratio,
            }),
        );
    }

    fn on_stale(&mut self, e: &StaleEvent) {
        self.emit(
            "stale",
            json!({
                "kind": format!("{:?}", e.kind),
                "state": format!("{:?}", e.state),
            }),
        );
    }

    fn on_transition(&mut self, e: &TransitionEvent) {
        self.emit(
            "transition",
            json!({
                "from": format!("{:?}", e.from),
                "to": format!("{:?}", e.to),
                "cause": format!("{:?}", e.cause),
            }),
        );
    }

    fn on_window(&mut self, e: &WindowEvent) {
        self.emit(
            "window",
            json!({
                "fitted": rect(e.fitted),
                "root_margin": e.margins.css().to_string(),
                "expected_ratio": e.expected_ratio,
            }),
        );
    }

    fn on_poll_tick(&mut self, e: &PollTickEvent) {
        self.emit(
            "poll_tick",
            json!({
                "frame": e.frame.0,
                "phase": format!("{:?}", e.phase),
                "changed": e.changed,
                "remaining": e.remaining,
            }),
        );
    }

    fn on_report(&mut self, e: &ReportEvent) {
        self.emit(
            "report",
            json!({
                "state": format!("{:?}", e.state),
                "x": e.x,
                "y": e.y,
                "out_of_viewport": e.out_of_viewport,
            }),
        );
    }

    fn on_host_failure(&mut self, e: &HostFailureEvent) {
        self.emit(
            "host_failure",
            json!({
                "operation": format!("{:?}", e.operation),
                "state": format!("{:?}", e.state),
            }),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use locus_core::host::FrameId;
    use locus_core::poll::PollPhase;
    use locus_core::tracker::TrackingState;

    fn lines(bytes: Vec<u8>) -> Vec<Value> {
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn events_are_tagged_and_sequenced() {
        let mut sink = JsonLinesSink::new(Vec::<u8>::new());
        sink.on_poll_tick(&PollTickEvent {
            frame: FrameId(4),
            phase: PollPhase::StopConfirming,
            changed: false,
            remaining: 3,
        });
        sink.on_report(&ReportEvent {
            state: TrackingState::Polling,
            x: 12.5,
            y: 40.0,
            out_of_viewport: false,
        });
        assert_eq!(sink.events_written(), 2);

        let events = lines(sink.into_inner());
        assert_eq!(events.len(), 2);
        assert_eq!(events[0]["seq"], 0);
        assert_eq!(events[0]["event"], "poll_tick");
        assert_eq!(events[0]["phase"], "StopConfirming");
        assert_eq!(events[0]["remaining"], 3);
        assert_eq!(events[1]["seq"], 1);
        assert_eq!(events[1]["event"], "report");
        assert_eq!(events[1]["x"], 12.5);
    }

    #[test]
    fn window_carries_root_margin_string() {
        let mut sink = JsonLinesSink::new(Vec::<u8>::new());
        sink.on_window(&WindowEvent {
            fitted: Rect::new(0.0, 0.0, 10.0, 10.0),
            margins: locus_core::geometry::Margins::ZERO,
            expected_ratio: 1.0,
        });
        let events = lines(sink.into_inner());
        assert_eq!(events[0]["root_margin"], "0px 0px 0px 0px");
        assert_eq!(events[0]["fitted"]["width"], 10.0);
    }
}
