// Copyright 2026 the Locus Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Web backend for locus.
//!
//! This crate connects a [`Tracker`] to browser APIs:
//!
//! - `IntersectionObserver` for the coarse and fine watchers, with the fine
//!   window expressed as a CSS `rootMargin`
//! - `requestAnimationFrame` for the motion poller
//! - `getBoundingClientRect` and `visualViewport` for geometry
//!
//! [`ElementTracker`] owns the tracker and its host behind an `Rc`, so the
//! JS callbacks can reach it. Calls to [`observe`](ElementTracker::observe)
//! or [`disconnect`](ElementTracker::disconnect) made from inside the
//! reporting callback (through a [`TrackerHandle`]) are queued and run as
//! soon as the current dispatch returns.
//!
//! ```rust,ignore
//! let tracker = ElementTracker::new(TrackerConfig::web(), |report| {
//!     place_tooltip(report.x, report.y, report.out_of_viewport);
//! })?;
//! tracker.set_trace_sink(ConsoleSink::new("[anchor] "));
//! tracker.observe(&anchor);
//! ```

#![no_std]

extern crate alloc;

mod console;
mod host;
mod raf;

use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::rc::{Rc, Weak};
use core::cell::RefCell;

use js_sys::Array;
use locus_core::trace::{HostFailureEvent, TraceSink, Tracer};
use locus_core::tracker::Tracker;
use wasm_bindgen::prelude::*;
use web_sys::Element;

pub use console::ConsoleSink;
pub use locus_core::config::TrackerConfig;
pub use locus_core::tracker::{PositionReport, TrackingState};

use host::WebHost;

enum Command {
    Observe(Element),
    Disconnect,
    SetSink(Option<Box<dyn TraceSink>>),
}

struct Inner {
    tracker: RefCell<Tracker<Element>>,
    host: RefCell<WebHost>,
    sink: RefCell<Option<Box<dyn TraceSink>>>,
    deferred: RefCell<VecDeque<Command>>,
}

impl Inner {
    fn on_intersect(&self, records: &Array, observer: &JsValue) {
        self.run(|tracker, host, tracer| {
            let entries = host.entries_for(records, observer);
            tracker.handle_intersections(host, &entries, tracer);
        });
        self.drain();
    }

    fn on_frame(&self) {
        self.run(|tracker, host, tracer| {
            if let Some(frame) = host.fire_frame() {
                tracker.handle_frame(host, frame, tracer);
            }
        });
        self.drain();
    }

    /// Queues `command` and runs the queue unless a dispatch is in progress.
    fn command(&self, command: Command) {
        self.deferred.borrow_mut().push_back(command);
        if self.tracker.try_borrow_mut().is_ok() {
            self.drain();
        }
    }

    fn drain(&self) {
        loop {
            let Some(command) = self.deferred.borrow_mut().pop_front() else {
                break;
            };
            match command {
                Command::Observe(element) => {
                    self.run(|tracker, host, tracer| tracker.observe(host, element, tracer));
                }
                Command::Disconnect => {
                    self.run(|tracker, host, tracer| tracker.disconnect(host, tracer));
                }
                Command::SetSink(sink) => {
                    if let Ok(mut slot) = self.sink.try_borrow_mut() {
                        *slot = sink;
                    }
                }
            }
        }
    }

    fn run(&self, f: impl FnOnce(&mut Tracker<Element>, &mut WebHost, &mut Tracer<'_>)) {
        let (Ok(mut tracker), Ok(mut host), Ok(mut sink)) = (
            self.tracker.try_borrow_mut(),
            self.host.try_borrow_mut(),
            self.sink.try_borrow_mut(),
        ) else {
            return;
        };
        let mut tracer = match sink.as_deref_mut() {
            Some(sink) => Tracer::new(sink),
            None => Tracer::none(),
        };
        f(&mut tracker, &mut host, &mut tracer);
        for operation in host.take_failures() {
            tracer.host_failure(&HostFailureEvent {
                operation,
                state: tracker.state(),
            });
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        let host = self.host.get_mut();
        self.tracker.get_mut().disconnect(host, &mut Tracer::none());
        host.release_all();
    }
}

/// Tracks one DOM element's position and reports it through a callback.
///
/// Dropping the tracker disconnects every observer and cancels any pending
/// animation frame.
pub struct ElementTracker {
    inner: Rc<Inner>,
}

impl core::fmt::Debug for ElementTracker {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ElementTracker")
            .field("state", &self.state())
            .field("host", &self.inner.host.try_borrow().ok())
            .finish_non_exhaustive()
    }
}

impl ElementTracker {
    /// Creates an idle tracker bound to the global `window`.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no global `window` (e.g. in a worker).
    pub fn new(
        config: TrackerConfig,
        reporter: impl FnMut(&PositionReport<'_, Element>) + 'static,
    ) -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no global `window`"))?;
        let inner = Rc::new_cyclic(|weak: &Weak<Inner>| {
            let on_intersect = {
                let weak = weak.clone();
                Closure::wrap(Box::new(move |records: Array, observer: JsValue| {
                    if let Some(inner) = weak.upgrade() {
                        inner.on_intersect(&records, &observer);
                    }
                }) as Box<dyn FnMut(Array, JsValue)>)
            };
            let on_frame = {
                let weak = weak.clone();
                Closure::wrap(Box::new(move |_timestamp_ms: f64| {
                    if let Some(inner) = weak.upgrade() {
                        inner.on_frame();
                    }
                }) as Box<dyn FnMut(f64)>)
            };
            Inner {
                tracker: RefCell::new(Tracker::new(config, reporter)),
                host: RefCell::new(WebHost::new(window, on_intersect, on_frame)),
                sink: RefCell::new(None),
                deferred: RefCell::new(VecDeque::new()),
            }
        });
        Ok(Self { inner })
    }

    /// Starts tracking `element`, replacing any previous target.
    pub fn observe(&self, element: &Element) {
        self.inner.command(Command::Observe(element.clone()));
    }

    /// Stops tracking. Idempotent.
    pub fn disconnect(&self) {
        self.inner.command(Command::Disconnect);
    }

    /// Routes trace events to `sink`.
    ///
    /// Events are only produced when the `trace` feature is enabled.
    pub fn set_trace_sink(&self, sink: impl TraceSink + 'static) {
        self.inner.command(Command::SetSink(Some(Box::new(sink))));
    }

    /// Stops tracing.
    pub fn clear_trace_sink(&self) {
        self.inner.command(Command::SetSink(None));
    }

    /// Returns the current state, or `None` while a dispatch is running
    /// (i.e. when called from the reporting callback).
    #[must_use]
    pub fn state(&self) -> Option<TrackingState> {
        self.inner.tracker.try_borrow().ok().map(|t| t.state())
    }

    /// Returns a weak handle usable from inside the reporting callback.
    #[must_use]
    pub fn handle(&self) -> TrackerHandle {
        TrackerHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }
}

/// Weak reference to an [`ElementTracker`].
///
/// Capturing an `ElementTracker` in its own reporter would keep it alive
/// forever; capture a handle instead. Calls on a handle whose tracker has
/// been dropped do nothing.
#[derive(Clone)]
pub struct TrackerHandle {
    inner: Weak<Inner>,
}

impl core::fmt::Debug for TrackerHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TrackerHandle")
            .field("alive", &self.is_alive())
            .finish()
    }
}

impl TrackerHandle {
    /// Starts tracking `element` once the current dispatch returns.
    pub fn observe(&self, element: &Element) {
        if let Some(inner) = self.inner.upgrade() {
            inner.command(Command::Observe(element.clone()));
        }
    }

    /// Stops tracking once the current dispatch returns.
    pub fn disconnect(&self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.command(Command::Disconnect);
        }
    }

    /// Returns `true` while the tracker exists.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}
