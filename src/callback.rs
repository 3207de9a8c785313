// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Toupcam-rs Contributors. All Rights Reserved.

//! Trampolines turning native SDK callbacks into Rust calls.
//!
//! The SDK invokes callbacks on its own worker threads with a user supplied
//! context pointer. Each context is a boxed struct owned by the camera (or
//! the SDK for hotplug) and is only freed after the SDK has been told to stop
//! calling back. Panics are caught here since unwinding into C is undefined.

use crate::{
    event::Event,
    frame::{FrameRef, PixelLayout},
};
use std::{
    ffi::{c_int, c_uint, c_void},
    panic::{catch_unwind, AssertUnwindSafe},
    sync::Arc,
};
use toupcam_sys::BITMAPINFOHEADER;
use tracing::{debug, error, warn};

/// Receives frames delivered in push mode.
///
/// Methods run on the SDK's capture thread. Frames borrow SDK memory and
/// must be copied with [`FrameRef::to_owned`] to outlive the call. Slow
/// listeners stall capture, so hand heavy work to another thread.
pub trait StreamListener: Send + Sync + 'static {
    /// Called for every live video frame.
    fn on_preview(&self, frame: FrameRef<'_>);

    /// Called for a still frame requested with `Camera::snap`.
    fn on_still(&self, frame: FrameRef<'_>);
}

/// Adapts a closure into a [`StreamListener`]; use
/// [`FrameRef::is_still`] to tell previews and stills apart.
pub struct FnListener<F>(pub F);

impl<F> StreamListener for FnListener<F>
where
    F: Fn(FrameRef<'_>) + Send + Sync + 'static,
{
    fn on_preview(&self, frame: FrameRef<'_>) {
        (self.0)(frame)
    }

    fn on_still(&self, frame: FrameRef<'_>) {
        (self.0)(frame)
    }
}

pub(crate) struct PushContext {
    pub listener: Arc<dyn StreamListener>,
    pub byte_order: PixelLayout,
}

pub(crate) struct EventContext {
    pub sender: kanal::Sender<Event>,
}

pub(crate) struct HotplugContext {
    pub callback: Box<dyn Fn() + Send + Sync>,
}

/// `PTOUPCAM_DATA_CALLBACK` implementation; `ctx` is a `*const PushContext`.
pub(crate) unsafe extern "system" fn push_trampoline(
    data: *const c_void,
    header: *const BITMAPINFOHEADER,
    snap: c_int,
    ctx: *mut c_void,
) {
    if ctx.is_null() {
        return;
    }
    let ctx = &*(ctx as *const PushContext);
    if data.is_null() || header.is_null() {
        warn!("push callback without image data, ignored");
        return;
    }

    let res = catch_unwind(AssertUnwindSafe(|| {
        match FrameRef::from_raw(data, &*header, ctx.byte_order, snap != 0) {
            Ok(frame) if frame.is_still() => ctx.listener.on_still(frame),
            Ok(frame) => ctx.listener.on_preview(frame),
            Err(e) => warn!("dropping pushed frame: {}", e),
        }
    }));
    if res.is_err() {
        error!("stream listener panicked");
    }
}

/// `PTOUPCAM_EVENT_CALLBACK` implementation; `ctx` is a `*const EventContext`.
///
/// Never blocks the SDK thread: events are dropped when the queue is full.
pub(crate) unsafe extern "system" fn event_trampoline(event: c_uint, ctx: *mut c_void) {
    if ctx.is_null() {
        return;
    }
    let ctx = &*(ctx as *const EventContext);
    let event = Event::from(event);
    match ctx.sender.try_send(event) {
        Ok(true) => {}
        Ok(false) => warn!("event queue full, dropping {:?}", event),
        Err(e) => debug!("event receiver gone, dropping {:?}: {}", event, e),
    }
}

/// `PTOUPCAM_HOTPLUG` implementation; `ctx` is a `*const HotplugContext`.
pub(crate) unsafe extern "system" fn hotplug_trampoline(ctx: *mut c_void) {
    if ctx.is_null() {
        return;
    }
    let ctx = &*(ctx as *const HotplugContext);
    if catch_unwind(AssertUnwindSafe(|| (ctx.callback)())).is_err() {
        error!("hotplug callback panicked");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    };
    use toupcam_sys::{TOUPCAM_EVENT_IMAGE, TOUPCAM_EVENT_STILLIMAGE};

    #[derive(Default)]
    struct Recorder {
        frames: Mutex<Vec<(u32, u32, bool, Vec<u8>)>>,
    }

    impl StreamListener for Recorder {
        fn on_preview(&self, frame: FrameRef<'_>) {
            let bytes = frame.to_bytes(PixelLayout::Rgb);
            self.frames
                .lock()
                .unwrap()
                .push((frame.width(), frame.height(), false, bytes));
        }

        fn on_still(&self, frame: FrameRef<'_>) {
            let bytes = frame.to_bytes(PixelLayout::Rgb);
            self.frames
                .lock()
                .unwrap()
                .push((frame.width(), frame.height(), true, bytes));
        }
    }

    fn header(width: i32, height: i32) -> BITMAPINFOHEADER {
        BITMAPINFOHEADER {
            biSize: 40,
            biWidth: width,
            biHeight: height,
            biPlanes: 1,
            biBitCount: 24,
            ..Default::default()
        }
    }

    #[test]
    fn push_dispatches_preview_and_still() {
        let recorder = Arc::new(Recorder::default());
        let ctx = Box::new(PushContext {
            listener: recorder.clone(),
            byte_order: PixelLayout::Rgb,
        });
        let ctx_ptr = &*ctx as *const PushContext as *mut c_void;

        // 2x1 RGB24, row padded from 6 to 8 bytes
        let pixels = [1u8, 2, 3, 4, 5, 6, 0, 0];
        let hdr = header(2, -1);
        unsafe {
            push_trampoline(pixels.as_ptr().cast(), &hdr, 0, ctx_ptr);
            push_trampoline(pixels.as_ptr().cast(), &hdr, 1, ctx_ptr);
        }

        let frames = recorder.frames.lock().unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0], (2, 1, false, vec![1, 2, 3, 4, 5, 6]));
        assert!(frames[1].2);
    }

    #[test]
    fn push_ignores_null_pointers() {
        let recorder = Arc::new(Recorder::default());
        let ctx = Box::new(PushContext {
            listener: recorder.clone(),
            byte_order: PixelLayout::Rgb,
        });
        let ctx_ptr = &*ctx as *const PushContext as *mut c_void;
        let hdr = header(2, 1);
        unsafe {
            push_trampoline(std::ptr::null(), &hdr, 0, ctx_ptr);
            push_trampoline([0u8; 8].as_ptr().cast(), std::ptr::null(), 0, ctx_ptr);
            push_trampoline([0u8; 8].as_ptr().cast(), &hdr, 0, std::ptr::null_mut());
        }
        assert!(recorder.frames.lock().unwrap().is_empty());
    }

    #[test]
    fn push_skips_unsupported_depth() {
        let recorder = Arc::new(Recorder::default());
        let ctx = Box::new(PushContext {
            listener: recorder.clone(),
            byte_order: PixelLayout::Rgb,
        });
        let mut hdr = header(2, 1);
        hdr.biBitCount = 48;
        let pixels = [0u8; 12];
        unsafe {
            push_trampoline(
                pixels.as_ptr().cast(),
                &hdr,
                0,
                &*ctx as *const PushContext as *mut c_void,
            );
        }
        assert!(recorder.frames.lock().unwrap().is_empty());
    }

    #[test]
    fn push_catches_listener_panic() {
        let ctx = Box::new(PushContext {
            listener: Arc::new(FnListener(|_frame: FrameRef<'_>| panic!("listener failure"))),
            byte_order: PixelLayout::Bgr,
        });
        let hdr = header(1, 1);
        let pixels = [0u8; 4];
        unsafe {
            push_trampoline(
                pixels.as_ptr().cast(),
                &hdr,
                0,
                &*ctx as *const PushContext as *mut c_void,
            );
        }
    }

    #[test]
    fn events_are_queued_without_blocking() {
        let (sender, receiver) = kanal::bounded(1);
        let ctx = Box::new(EventContext { sender });
        let ctx_ptr = &*ctx as *const EventContext as *mut c_void;
        unsafe {
            event_trampoline(TOUPCAM_EVENT_IMAGE, ctx_ptr);
            // queue full, dropped
            event_trampoline(TOUPCAM_EVENT_STILLIMAGE, ctx_ptr);
        }
        assert_eq!(receiver.try_recv().unwrap(), Some(Event::Image));
        assert_eq!(receiver.try_recv().unwrap(), None);

        drop(receiver);
        unsafe { event_trampoline(0x1234, ctx_ptr) };
    }

    #[test]
    fn hotplug_invokes_callback() {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = count.clone();
        let ctx = Box::new(HotplugContext {
            callback: Box::new(move || {
                seen.fetch_add(1, Ordering::SeqCst);
            }),
        });
        unsafe {
            hotplug_trampoline(&*ctx as *const HotplugContext as *mut c_void);
            hotplug_trampoline(&*ctx as *const HotplugContext as *mut c_void);
        }
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }
}
