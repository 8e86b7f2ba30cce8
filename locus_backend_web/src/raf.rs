// Copyright 2026 the Locus Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `requestAnimationFrame` frame source.
//!
//! The host registers one persistent JS closure and hands it to
//! `requestAnimationFrame` for every [`FrameId`] it mints. Callbacks fire in
//! registration order, so [`FrameQueue`] pairs each browser callback with the
//! oldest outstanding id.

use alloc::collections::VecDeque;

use locus_core::host::FrameId;
use wasm_bindgen::prelude::*;

// Direct global bindings instead of `web_sys::Window` methods, so a frame
// request never has to fetch (and unwrap) the Window object.
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(catch, js_name = "requestAnimationFrame")]
    pub(crate) fn request_animation_frame(callback: &JsValue) -> Result<i32, JsValue>;

    #[wasm_bindgen(js_name = "cancelAnimationFrame")]
    pub(crate) fn cancel_animation_frame(id: i32);
}

/// Outstanding frame requests, oldest first.
#[derive(Debug, Default)]
pub(crate) struct FrameQueue {
    pending: VecDeque<(FrameId, i32)>,
}

impl FrameQueue {
    /// Records a request the browser accepted under `raf_id`.
    pub(crate) fn push(&mut self, frame: FrameId, raf_id: i32) {
        self.pending.push_back((frame, raf_id));
    }

    /// Forgets `frame` and returns the browser id to cancel, if it was still
    /// outstanding.
    pub(crate) fn cancel(&mut self, frame: FrameId) -> Option<i32> {
        let index = self.pending.iter().position(|(f, _)| *f == frame)?;
        self.pending.remove(index).map(|(_, raf_id)| raf_id)
    }

    /// Pairs a fired browser callback with the frame it was requested for.
    pub(crate) fn fire(&mut self) -> Option<FrameId> {
        self.pending.pop_front().map(|(frame, _)| frame)
    }

    /// Removes every outstanding request, returning the browser ids.
    pub(crate) fn drain(&mut self) -> impl Iterator<Item = i32> + '_ {
        self.pending.drain(..).map(|(_, raf_id)| raf_id)
    }

    pub(crate) fn len(&self) -> usize {
        self.pending.len()
    }
}
