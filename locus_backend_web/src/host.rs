// Copyright 2026 the Locus Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! DOM implementation of the host capabilities.
//!
//! Every `IntersectionObserver` shares one JS callback; deliveries are
//! matched back to their [`WatchId`] by observer identity. Frames share one
//! `requestAnimationFrame` callback, paired with ids by [`FrameQueue`].

use alloc::string::ToString;
use alloc::vec::Vec;

use js_sys::Array;
use kurbo::Rect;
use locus_core::host::{
    FrameId, FrameSource, IntersectionEntry, IntersectionSource, TargetGeometry, ViewportMetrics,
    WatchId, WatchSpec,
};
use locus_core::trace::HostOperation;
use wasm_bindgen::JsCast as _;
use wasm_bindgen::prelude::*;
use web_sys::{
    DomRectReadOnly, Element, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit, Window,
};

use crate::raf::{FrameQueue, cancel_animation_frame, request_animation_frame};

pub(crate) type IntersectClosure = Closure<dyn FnMut(Array, JsValue)>;
pub(crate) type FrameClosure = Closure<dyn FnMut(f64)>;

pub(crate) struct WebHost {
    window: Window,
    observers: Vec<(WatchId, IntersectionObserver)>,
    on_intersect: IntersectClosure,
    on_frame: FrameClosure,
    frames: FrameQueue,
    next_handle: u32,
    failures: Vec<HostOperation>,
}

impl core::fmt::Debug for WebHost {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WebHost")
            .field("observers", &self.observers.len())
            .field("pending_frames", &self.frames.len())
            .field("failures", &self.failures)
            .finish_non_exhaustive()
    }
}

impl WebHost {
    pub(crate) fn new(window: Window, on_intersect: IntersectClosure, on_frame: FrameClosure) -> Self {
        Self {
            window,
            observers: Vec::new(),
            on_intersect,
            on_frame,
            frames: FrameQueue::default(),
            next_handle: 0,
            failures: Vec::new(),
        }
    }

    /// Converts a JS delivery into entries tagged with the observer's watch.
    ///
    /// Returns nothing for observers this host no longer holds.
    pub(crate) fn entries_for(&self, records: &Array, observer: &JsValue) -> Vec<IntersectionEntry> {
        let Some(watch) = self
            .observers
            .iter()
            .find(|(_, o)| AsRef::<JsValue>::as_ref(o) == observer)
            .map(|(id, _)| *id)
        else {
            return Vec::new();
        };
        records
            .iter()
            .filter_map(|record| record.dyn_into::<IntersectionObserverEntry>().ok())
            .map(|record| IntersectionEntry {
                watch,
                bounding_rect: dom_rect(&record.bounding_client_rect()),
                root_bounds: record.root_bounds().as_ref().map(dom_rect),
                intersection_rect: dom_rect(&record.intersection_rect()),
                ratio: record.intersection_ratio(),
            })
            .collect()
    }

    /// Pairs a fired animation frame with its id.
    pub(crate) fn fire_frame(&mut self) -> Option<FrameId> {
        self.frames.fire()
    }

    /// Takes the platform failures recorded since the last call.
    pub(crate) fn take_failures(&mut self) -> Vec<HostOperation> {
        core::mem::take(&mut self.failures)
    }

    /// Disconnects every observer and cancels every frame.
    pub(crate) fn release_all(&mut self) {
        for (_, observer) in self.observers.drain(..) {
            observer.disconnect();
        }
        for raf_id in self.frames.drain() {
            cancel_animation_frame(raf_id);
        }
    }

    fn next_handle(&mut self) -> u32 {
        self.next_handle = self.next_handle.wrapping_add(1);
        self.next_handle
    }
}

fn dom_rect(r: &DomRectReadOnly) -> Rect {
    Rect::from_origin_size((r.x(), r.y()), (r.width(), r.height()))
}

impl TargetGeometry for WebHost {
    type Target = Element;

    fn bounding_rect(&self, target: &Element) -> Option<Rect> {
        if !target.is_connected() {
            return None;
        }
        Some(dom_rect(&target.get_bounding_client_rect()))
    }
}

impl IntersectionSource for WebHost {
    fn watch(&mut self, target: &Element, spec: &WatchSpec<'_>) -> WatchId {
        let id = WatchId(self.next_handle());

        let init = IntersectionObserverInit::new();
        init.set_root_margin(&spec.margins.css().to_string());
        let thresholds: Array = spec.thresholds.iter().map(|t| JsValue::from_f64(*t)).collect();
        init.set_threshold(&thresholds);

        match IntersectionObserver::new_with_options(
            self.on_intersect.as_ref().unchecked_ref(),
            &init,
        ) {
            Ok(observer) => {
                observer.observe(target);
                self.observers.push((id, observer));
            }
            // The handle stays valid; it simply never delivers.
            Err(_) => self.failures.push(HostOperation::Watch),
        }
        id
    }

    fn unwatch(&mut self, watch: WatchId) {
        if let Some(index) = self.observers.iter().position(|(id, _)| *id == watch) {
            let (_, observer) = self.observers.swap_remove(index);
            observer.disconnect();
        }
    }
}

impl FrameSource for WebHost {
    fn request_frame(&mut self) -> FrameId {
        let id = FrameId(self.next_handle());
        match request_animation_frame(self.on_frame.as_ref()) {
            Ok(raf_id) => self.frames.push(id, raf_id),
            Err(_) => self.failures.push(HostOperation::RequestFrame),
        }
        id
    }

    fn cancel_frame(&mut self, frame: FrameId) {
        if let Some(raf_id) = self.frames.cancel(frame) {
            cancel_animation_frame(raf_id);
        }
    }
}

impl ViewportMetrics for WebHost {
    fn visual_viewport(&self) -> Rect {
        if let Some(vv) = self.window.visual_viewport() {
            return Rect::from_origin_size(
                (vv.offset_left(), vv.offset_top()),
                (vv.width(), vv.height()),
            );
        }
        let dimension = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        Rect::new(
            0.0,
            0.0,
            dimension(self.window.inner_width()),
            dimension(self.window.inner_height()),
        )
    }
}
