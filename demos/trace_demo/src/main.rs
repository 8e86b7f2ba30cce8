// Copyright 2026 the Locus Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated page that exercises the tracing and diagnostics pipeline.
//!
//! Tracks one element through a scripted session (scroll in, slide, rest,
//! scroll away) on a [`SimHarness`], printing every event with a
//! [`PrettyPrintSink`], writing them to `trace.jsonl` with a
//! [`JsonLinesSink`], and summarizing with a [`CountingSink`].

use std::fs::File;
use std::io::BufWriter;

use locus_core::config::TrackerConfig;
use locus_core::kurbo::{Rect, Vec2};
use locus_core::trace::{
    HostFailureEvent, NotificationEvent, PollTickEvent, ReportEvent, StaleEvent, TraceSink,
    Tracer, TransitionEvent, WindowEvent,
};
use locus_debug::counting::CountingSink;
use locus_debug::jsonl::JsonLinesSink;
use locus_debug::pretty::PrettyPrintSink;
use locus_sim::harness::SimHarness;

const VIEWPORT: Rect = Rect::new(0.0, 0.0, 1280.0, 720.0);
const SLIDE_FRAMES: u32 = 12;
const SLIDE_STEP: Vec2 = Vec2::new(6.0, 1.5);

/// Forwards every event to all three sinks.
struct Tee<'a> {
    pretty: &'a mut PrettyPrintSink,
    jsonl: &'a mut JsonLinesSink<BufWriter<File>>,
    counting: &'a mut CountingSink,
}

macro_rules! forward {
    ($($method:ident($event:ty)),* $(,)?) => {
        $(
            fn $method(&mut self, e: &$event) {
                self.pretty.$method(e);
                self.jsonl.$method(e);
                self.counting.$method(e);
            }
        )*
    };
}

impl TraceSink for Tee<'_> {
    forward! {
        on_notification(NotificationEvent),
        on_stale(StaleEvent),
        on_transition(TransitionEvent),
        on_window(WindowEvent),
        on_poll_tick(PollTickEvent),
        on_report(ReportEvent),
        on_host_failure(HostFailureEvent),
    }
}

fn main() {
    // -- sinks -------------------------------------------------------------
    let mut pretty = PrettyPrintSink::new(Box::new(std::io::stdout()));
    let file = File::create("trace.jsonl").expect("failed to create trace.jsonl");
    let mut jsonl = JsonLinesSink::new(BufWriter::new(file));
    let mut counting = CountingSink::new();
    let mut tee = Tee {
        pretty: &mut pretty,
        jsonl: &mut jsonl,
        counting: &mut counting,
    };

    // -- page --------------------------------------------------------------
    let mut harness = SimHarness::new(TrackerConfig::web(), VIEWPORT);
    let anchor = harness
        .host_mut()
        .insert(Rect::new(200.0, 1100.0, 320.0, 1140.0));

    // 1. Below the fold.
    println!("-- observe below the fold");
    harness.observe(anchor, &mut Tracer::new(&mut tee));
    harness.run(3, &mut Tracer::new(&mut tee));

    // 2. Scroll it into view and let it rest.
    println!("-- scroll into view");
    harness.host_mut().scroll_by(Vec2::new(0.0, 800.0));
    harness.settle(64, &mut Tracer::new(&mut tee));

    // 3. Slide it across the page.
    println!("-- slide");
    for _ in 0..SLIDE_FRAMES {
        harness.host_mut().move_by(anchor, SLIDE_STEP);
        harness.step(&mut Tracer::new(&mut tee));
    }
    let taken = harness.settle(64, &mut Tracer::new(&mut tee));
    println!("-- came to rest {taken} frames after the slide");

    // 4. Scroll it away, then stop.
    println!("-- scroll away");
    harness.host_mut().scroll_by(Vec2::new(0.0, 1000.0));
    harness.step(&mut Tracer::new(&mut tee));
    harness.disconnect(&mut Tracer::new(&mut tee));
    harness.run(5, &mut Tracer::new(&mut tee));

    // -- summary -------------------------------------------------------------
    let stats = harness.host().stats();
    println!(
        "{} frames, {} reports ({} out of viewport), {} poll ticks ({} moving), {} settles",
        harness.steps(),
        counting.reports,
        counting.out_of_viewport_reports,
        counting.poll_ticks,
        counting.moving_ticks,
        counting.settles,
    );
    println!(
        "host: {} watches / {} unwatches, {} frames requested / {} cancelled, {} rect queries",
        stats.watches,
        stats.unwatches,
        stats.frames_requested,
        stats.frames_cancelled,
        stats.bounds_queries,
    );
    println!("Wrote trace.jsonl ({} events)", jsonl.events_written());
}
