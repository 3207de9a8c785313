// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Toupcam-rs Contributors. All Rights Reserved.

//! Open camera handles: settings, push/pull streaming and frame pulls.

use crate::{
    callback::{event_trampoline, push_trampoline, EventContext, PushContext, StreamListener},
    device::Resolution,
    error::{check, Error, HResult, Result},
    event::{Event, Options, TriggerMode},
    frame::{row_pitch, Frame, FrameRef, ImageHeader, PixelLayout, NATIVE_LAYOUT},
    sdk::Sdk,
};
use core::fmt;
use std::{
    ffi::{c_char, c_int, c_uint, c_void},
    ptr::null_mut,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, MutexGuard,
    },
};
use toupcam_sys::{HToupcam, ToupcamFrameInfoV2};
use tracing::{debug, info, warn};

struct Handle(HToupcam);

// The SDK serialises access to a handle internally.
unsafe impl Send for Handle {}
unsafe impl Sync for Handle {}

#[derive(Default)]
struct StreamState {
    push: Option<Box<PushContext>>,
    pull: Option<Box<EventContext>>,
    listener: Option<Arc<dyn StreamListener>>,
}

impl StreamState {
    fn active(&self) -> bool {
        self.push.is_some() || self.pull.is_some()
    }
}

/// Raw sensor format reported by `Toupcam_get_RawFormat`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RawFormat {
    /// Bayer pattern or pixel format, e.g. `GBRG` or `Y800`
    pub fourcc: [u8; 4],
    pub bits: u32,
}

impl fmt::Display for RawFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {}bit",
            String::from_utf8_lossy(&self.fourcc),
            self.bits
        )
    }
}

/// Exposure time limits in microseconds.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ExposureRange {
    pub min: u32,
    pub max: u32,
    pub default: u32,
}

/// Metadata returned alongside a frame by `Toupcam_PullImageV2`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameInfo {
    pub width: u32,
    pub height: u32,
    pub flag: u32,
    /// Frame sequence number
    pub seq: u32,
    /// Capture timestamp in microseconds
    pub timestamp: u64,
}

impl From<&ToupcamFrameInfoV2> for FrameInfo {
    fn from(info: &ToupcamFrameInfoV2) -> Self {
        Self {
            width: info.width,
            height: info.height,
            flag: info.flag,
            seq: info.seq,
            timestamp: info.timestamp,
        }
    }
}

/// An open Toupcam camera.
///
/// Frames are delivered either in push mode, where a [`StreamListener`] is
/// called from the SDK thread for every frame, or in pull mode, where the
/// SDK only signals [`Event`]s and the caller fetches frames with
/// [`Camera::pull_image`] / [`Camera::pull_still_image`].
///
/// `Camera` is `Send + Sync`; wrap it in an `Arc` to pull frames from a
/// different thread than the one controlling the camera. Streaming methods
/// must not be called from inside a listener, since stopping waits for the
/// SDK callback thread to finish.
///
/// # Example
///
/// ```no_run
/// use toupcam::{FnListener, Sdk};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let sdk = Sdk::load(None)?;
/// let cam = sdk.open(None)?;
/// cam.set_resolution(0)?;
/// cam.start_push(FnListener(|frame: toupcam::FrameRef<'_>| {
///     println!("{}", frame.header());
/// }))?;
/// std::thread::sleep(std::time::Duration::from_secs(1));
/// cam.stop_streaming()?;
/// # Ok(())
/// # }
/// ```
pub struct Camera {
    sdk: Arc<Sdk>,
    handle: Handle,
    byte_order: PixelLayout,
    streaming: AtomicBool,
    state: Mutex<StreamState>,
}

impl Camera {
    pub(crate) fn new(sdk: Arc<Sdk>, handle: HToupcam) -> Self {
        Self {
            sdk,
            handle: Handle(handle),
            byte_order: NATIVE_LAYOUT,
            streaming: AtomicBool::new(false),
            state: Mutex::new(StreamState::default()),
        }
    }

    fn h(&self) -> HToupcam {
        self.handle.0
    }

    fn state(&self) -> MutexGuard<'_, StreamState> {
        match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn sdk(&self) -> &Arc<Sdk> {
        &self.sdk
    }

    /// Number of preview resolutions.
    pub fn resolution_count(&self) -> Result<u32> {
        let hr = unsafe { self.sdk.lib().Toupcam_get_ResolutionNumber(self.h()) };
        Ok(check("Toupcam_get_ResolutionNumber", hr)?.0 as u32)
    }

    pub fn resolution(&self, index: u32) -> Result<Resolution> {
        let (mut width, mut height): (c_int, c_int) = (0, 0);
        check("Toupcam_get_Resolution", unsafe {
            self.sdk
                .lib()
                .Toupcam_get_Resolution(self.h(), index, &mut width, &mut height)
        })?;
        Ok(Resolution::new(width as u32, height as u32))
    }

    pub fn resolutions(&self) -> Result<Vec<Resolution>> {
        (0..self.resolution_count()?)
            .map(|i| self.resolution(i))
            .collect()
    }

    pub fn still_resolution_count(&self) -> Result<u32> {
        let hr = unsafe { self.sdk.lib().Toupcam_get_StillResolutionNumber(self.h()) };
        Ok(check("Toupcam_get_StillResolutionNumber", hr)?.0 as u32)
    }

    pub fn still_resolution(&self, index: u32) -> Result<Resolution> {
        let (mut width, mut height): (c_int, c_int) = (0, 0);
        check("Toupcam_get_StillResolution", unsafe {
            self.sdk
                .lib()
                .Toupcam_get_StillResolution(self.h(), index, &mut width, &mut height)
        })?;
        Ok(Resolution::new(width as u32, height as u32))
    }

    pub fn still_resolutions(&self) -> Result<Vec<Resolution>> {
        (0..self.still_resolution_count()?)
            .map(|i| self.still_resolution(i))
            .collect()
    }

    /// Selects the preview resolution by index into [`Camera::resolutions`].
    pub fn set_resolution(&self, index: u32) -> Result<HResult> {
        let hr = check("Toupcam_put_eSize", unsafe {
            self.sdk.lib().Toupcam_put_eSize(self.h(), index)
        })?;
        debug!("resolution index set to {}", index);
        Ok(hr)
    }

    pub fn current_resolution_index(&self) -> Result<u32> {
        let mut index: c_uint = 0;
        check("Toupcam_get_eSize", unsafe {
            self.sdk.lib().Toupcam_get_eSize(self.h(), &mut index)
        })?;
        Ok(index)
    }

    /// Size of the selected resolution.
    pub fn size(&self) -> Result<Resolution> {
        let (mut width, mut height): (c_int, c_int) = (0, 0);
        check("Toupcam_get_Size", unsafe {
            self.sdk
                .lib()
                .Toupcam_get_Size(self.h(), &mut width, &mut height)
        })?;
        Ok(Resolution::new(width as u32, height as u32))
    }

    /// Size of delivered frames once ROI, binning and rotation are applied.
    pub fn final_size(&self) -> Result<Resolution> {
        let (mut width, mut height): (c_int, c_int) = (0, 0);
        check("Toupcam_get_FinalSize", unsafe {
            self.sdk
                .lib()
                .Toupcam_get_FinalSize(self.h(), &mut width, &mut height)
        })?;
        Ok(Resolution::new(width as u32, height as u32))
    }

    pub fn raw_format(&self) -> Result<RawFormat> {
        let (mut fourcc, mut bits): (c_uint, c_uint) = (0, 0);
        check("Toupcam_get_RawFormat", unsafe {
            self.sdk
                .lib()
                .Toupcam_get_RawFormat(self.h(), &mut fourcc, &mut bits)
        })?;
        Ok(RawFormat {
            fourcc: fourcc.to_le_bytes(),
            bits,
        })
    }

    pub fn option(&self, option: Options) -> Result<i32> {
        let mut value: c_int = 0;
        check("Toupcam_get_Option", unsafe {
            self.sdk
                .lib()
                .Toupcam_get_Option(self.h(), option.code(), &mut value)
        })?;
        Ok(value)
    }

    pub fn set_option(&self, option: Options, value: i32) -> Result<HResult> {
        let hr = check("Toupcam_put_Option", unsafe {
            self.sdk
                .lib()
                .Toupcam_put_Option(self.h(), option.code(), value)
        })?;
        debug!("option {:?} set to {}", option, value);
        Ok(hr)
    }

    pub fn trigger_mode(&self) -> Result<TriggerMode> {
        TriggerMode::try_from(self.option(Options::Trigger)?).map_err(Error::UnknownTriggerMode)
    }

    pub fn set_trigger_mode(&self, mode: TriggerMode) -> Result<HResult> {
        self.set_option(Options::Trigger, mode.into())
    }

    /// Requests `count` frames in software trigger mode.
    ///
    /// `0xffff` triggers continuously and `0` cancels pending triggers.
    pub fn trigger(&self, count: u16) -> Result<HResult> {
        check("Toupcam_Trigger", unsafe {
            self.sdk.lib().Toupcam_Trigger(self.h(), count)
        })
    }

    /// Requests a still image at the given still resolution index.
    ///
    /// The still arrives through [`StreamListener::on_still`] in push mode or
    /// as [`Event::StillImage`] in pull mode.
    pub fn snap(&self, resolution_index: u32) -> Result<HResult> {
        check("Toupcam_Snap", unsafe {
            self.sdk.lib().Toupcam_Snap(self.h(), resolution_index)
        })
    }

    /// Starts push mode, delivering frames to `listener`.
    ///
    /// The listener is cached so [`Camera::restart_streaming`] can resume
    /// with it after a stop.
    pub fn start_push<L: StreamListener>(&self, listener: L) -> Result<HResult> {
        self.start_push_shared(Arc::new(listener))
    }

    pub fn start_push_shared(&self, listener: Arc<dyn StreamListener>) -> Result<HResult> {
        let mut state = self.state();
        if state.active() {
            return Err(Error::AlreadyStreaming);
        }
        state.listener = Some(listener.clone());

        let ctx = Box::new(PushContext {
            listener,
            byte_order: self.byte_order,
        });
        let ptr = &*ctx as *const PushContext as *mut c_void;
        let hr = check("Toupcam_StartPushMode", unsafe {
            self.sdk
                .lib()
                .Toupcam_StartPushMode(self.h(), Some(push_trampoline), ptr)
        })?;
        state.push = Some(ctx);
        self.streaming.store(true, Ordering::SeqCst);
        info!("push mode started");
        Ok(hr)
    }

    /// Starts push mode again with the listener of the last
    /// [`Camera::start_push`], stopping any running stream first.
    pub fn restart_streaming(&self) -> Result<HResult> {
        let (listener, active) = {
            let state = self.state();
            (state.listener.clone(), state.active())
        };
        let listener = listener.ok_or(Error::NoCachedListener)?;
        if active {
            self.stop_streaming()?;
        }
        self.start_push_shared(listener)
    }

    /// Starts pull mode and returns the queue events are delivered on.
    ///
    /// The queue holds up to `capacity` events; further events are dropped
    /// until the receiver catches up.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ZeroCapacity`] for a zero `capacity`, which would
    /// drop every event.
    pub fn start_pull(&self, capacity: usize) -> Result<kanal::Receiver<Event>> {
        if capacity == 0 {
            return Err(Error::ZeroCapacity);
        }
        let mut state = self.state();
        if state.active() {
            return Err(Error::AlreadyStreaming);
        }
        let (sender, receiver) = kanal::bounded(capacity);
        let ctx = Box::new(EventContext { sender });
        let ptr = &*ctx as *const EventContext as *mut c_void;
        check("Toupcam_StartPullModeWithCallback", unsafe {
            self.sdk.lib().Toupcam_StartPullModeWithCallback(
                self.h(),
                Some(event_trampoline),
                ptr,
            )
        })?;
        state.pull = Some(ctx);
        self.streaming.store(true, Ordering::SeqCst);
        info!("pull mode started");
        Ok(receiver)
    }

    fn pull_buffer(&self, size: Resolution, bits: u16) -> Result<Vec<u8>> {
        PixelLayout::from_bits(bits, self.byte_order)?;
        Ok(vec![0u8; row_pitch(size.width, bits) * size.height as usize])
    }

    fn pulled_frame(
        &self,
        buf: &[u8],
        width: u32,
        height: u32,
        bits: u16,
        still: bool,
    ) -> Result<Frame> {
        let header = ImageHeader::top_down(width, height, bits);
        Ok(FrameRef::new(header, self.byte_order, still, buf)?.to_owned())
    }

    /// Pulls the pending live frame after an [`Event::Image`].
    ///
    /// `bits` is 8, 24 or 32; the buffer is sized from
    /// [`Camera::final_size`].
    pub fn pull_image(&self, bits: u16) -> Result<Frame> {
        let mut buf = self.pull_buffer(self.final_size()?, bits)?;
        let (mut width, mut height): (c_uint, c_uint) = (0, 0);
        check("Toupcam_PullImage", unsafe {
            self.sdk.lib().Toupcam_PullImage(
                self.h(),
                buf.as_mut_ptr().cast(),
                bits as c_int,
                &mut width,
                &mut height,
            )
        })?;
        self.pulled_frame(&buf, width, height, bits, false)
    }

    /// Like [`Camera::pull_image`] but also returns sequence number and
    /// timestamp.
    pub fn pull_image_with_info(&self, bits: u16) -> Result<(Frame, FrameInfo)> {
        let mut buf = self.pull_buffer(self.final_size()?, bits)?;
        let mut info = ToupcamFrameInfoV2::default();
        check("Toupcam_PullImageV2", unsafe {
            self.sdk.lib().Toupcam_PullImageV2(
                self.h(),
                buf.as_mut_ptr().cast(),
                bits as c_int,
                &mut info,
            )
        })?;
        let info = FrameInfo::from(&info);
        let frame = self.pulled_frame(&buf, info.width, info.height, bits, false)?;
        Ok((frame, info))
    }

    /// Pulls the pending still after an [`Event::StillImage`].
    ///
    /// The still's size is peeked first so the buffer always fits.
    pub fn pull_still_image(&self, bits: u16) -> Result<Frame> {
        let (mut width, mut height): (c_uint, c_uint) = (0, 0);
        check("Toupcam_PullStillImage", unsafe {
            self.sdk.lib().Toupcam_PullStillImage(
                self.h(),
                null_mut(),
                bits as c_int,
                &mut width,
                &mut height,
            )
        })?;
        let mut buf = self.pull_buffer(Resolution::new(width, height), bits)?;
        check("Toupcam_PullStillImage", unsafe {
            self.sdk.lib().Toupcam_PullStillImage(
                self.h(),
                buf.as_mut_ptr().cast(),
                bits as c_int,
                &mut width,
                &mut height,
            )
        })?;
        self.pulled_frame(&buf, width, height, bits, true)
    }

    /// Pauses frame delivery without tearing down the stream.
    pub fn pause_streaming(&self) -> Result<HResult> {
        let hr = check("Toupcam_Pause", unsafe {
            self.sdk.lib().Toupcam_Pause(self.h(), 1)
        })?;
        if hr == HResult::S_OK || hr == HResult::S_FALSE {
            self.streaming.store(false, Ordering::SeqCst);
        }
        Ok(hr)
    }

    pub fn resume_streaming(&self) -> Result<HResult> {
        let hr = check("Toupcam_Pause", unsafe {
            self.sdk.lib().Toupcam_Pause(self.h(), 0)
        })?;
        if hr == HResult::S_OK || hr == HResult::S_FALSE {
            self.streaming.store(true, Ordering::SeqCst);
        }
        Ok(hr)
    }

    /// Stops push or pull mode. The cached listener is kept for
    /// [`Camera::restart_streaming`].
    pub fn stop_streaming(&self) -> Result<HResult> {
        let mut state = self.state();
        let hr = check("Toupcam_Stop", unsafe { self.sdk.lib().Toupcam_Stop(self.h()) })?;
        self.streaming.store(false, Ordering::SeqCst);
        // the SDK no longer calls back once Stop has returned
        state.push = None;
        state.pull = None;
        info!("streaming stopped");
        Ok(hr)
    }

    pub fn is_streaming(&self) -> bool {
        self.streaming.load(Ordering::SeqCst)
    }

    pub fn serial_number(&self) -> Result<String> {
        let mut buf = [0 as c_char; 32];
        check("Toupcam_get_SerialNumber", unsafe {
            self.sdk
                .lib()
                .Toupcam_get_SerialNumber(self.h(), buf.as_mut_ptr())
        })?;
        Ok(string_from_chars(&buf))
    }

    pub fn fw_version(&self) -> Result<String> {
        let mut buf = [0 as c_char; 16];
        check("Toupcam_get_FwVersion", unsafe {
            self.sdk.lib().Toupcam_get_FwVersion(self.h(), buf.as_mut_ptr())
        })?;
        Ok(string_from_chars(&buf))
    }

    pub fn hw_version(&self) -> Result<String> {
        let mut buf = [0 as c_char; 16];
        check("Toupcam_get_HwVersion", unsafe {
            self.sdk.lib().Toupcam_get_HwVersion(self.h(), buf.as_mut_ptr())
        })?;
        Ok(string_from_chars(&buf))
    }

    /// Exposure time in microseconds.
    pub fn exposure_time(&self) -> Result<u32> {
        let mut time: c_uint = 0;
        check("Toupcam_get_ExpoTime", unsafe {
            self.sdk.lib().Toupcam_get_ExpoTime(self.h(), &mut time)
        })?;
        Ok(time)
    }

    pub fn set_exposure_time(&self, micros: u32) -> Result<HResult> {
        check("Toupcam_put_ExpoTime", unsafe {
            self.sdk.lib().Toupcam_put_ExpoTime(self.h(), micros)
        })
    }

    pub fn exposure_range(&self) -> Result<ExposureRange> {
        let (mut min, mut max, mut default): (c_uint, c_uint, c_uint) = (0, 0, 0);
        check("Toupcam_get_ExpTimeRange", unsafe {
            self.sdk
                .lib()
                .Toupcam_get_ExpTimeRange(self.h(), &mut min, &mut max, &mut default)
        })?;
        Ok(ExposureRange { min, max, default })
    }

    /// Analog gain in percent, 100 means 1x.
    pub fn gain(&self) -> Result<u16> {
        let mut gain: u16 = 0;
        check("Toupcam_get_ExpoAGain", unsafe {
            self.sdk.lib().Toupcam_get_ExpoAGain(self.h(), &mut gain)
        })?;
        Ok(gain)
    }

    pub fn set_gain(&self, percent: u16) -> Result<HResult> {
        check("Toupcam_put_ExpoAGain", unsafe {
            self.sdk.lib().Toupcam_put_ExpoAGain(self.h(), percent)
        })
    }

    pub fn auto_exposure(&self) -> Result<bool> {
        let mut enabled: c_int = 0;
        check("Toupcam_get_AutoExpoEnable", unsafe {
            self.sdk
                .lib()
                .Toupcam_get_AutoExpoEnable(self.h(), &mut enabled)
        })?;
        Ok(enabled != 0)
    }

    pub fn set_auto_exposure(&self, enabled: bool) -> Result<HResult> {
        check("Toupcam_put_AutoExpoEnable", unsafe {
            self.sdk
                .lib()
                .Toupcam_put_AutoExpoEnable(self.h(), enabled as c_int)
        })
    }

    pub fn set_hflip(&self, flip: bool) -> Result<HResult> {
        check("Toupcam_put_HFlip", unsafe {
            self.sdk.lib().Toupcam_put_HFlip(self.h(), flip as c_int)
        })
    }

    pub fn set_vflip(&self, flip: bool) -> Result<HResult> {
        check("Toupcam_put_VFlip", unsafe {
            self.sdk.lib().Toupcam_put_VFlip(self.h(), flip as c_int)
        })
    }

    /// Sensor temperature in units of 0.1 degrees Celsius.
    pub fn temperature(&self) -> Result<i16> {
        let mut temp: i16 = 0;
        check("Toupcam_get_Temperature", unsafe {
            self.sdk.lib().Toupcam_get_Temperature(self.h(), &mut temp)
        })?;
        Ok(temp)
    }
}

impl fmt::Debug for Camera {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Camera")
            .field("handle", &self.handle.0)
            .field("streaming", &self.is_streaming())
            .finish()
    }
}

impl Drop for Camera {
    fn drop(&mut self) {
        let state = match self.state.get_mut() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        if state.active() {
            let hr = unsafe { self.sdk.lib().Toupcam_Stop(self.h()) };
            if let Err(e) = check("Toupcam_Stop", hr) {
                warn!("{}", e);
            }
        }
        // Close also joins the SDK threads, callback contexts are freed after
        unsafe { self.sdk.lib().Toupcam_Close(self.h()) };
        debug!("camera closed");
    }
}

fn string_from_chars(buf: &[c_char]) -> String {
    let len = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
    let bytes: Vec<u8> = buf[..len].iter().map(|&c| c as u8).collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        cell::{Cell, RefCell},
        ptr::NonNull,
    };
    use toupcam_sys::{
        toupcam as toupcam_library, Stubs, E_FAIL, HRESULT, PTOUPCAM_DATA_CALLBACK,
        PTOUPCAM_EVENT_CALLBACK, S_FALSE, S_OK,
    };

    thread_local! {
        static CALLS: RefCell<Vec<&'static str>> = const { RefCell::new(Vec::new()) };
        static STOP_HR: Cell<HRESULT> = const { Cell::new(S_OK) };
        static PAUSE_HR: Cell<HRESULT> = const { Cell::new(S_OK) };
        static TRIGGER_OPTION: Cell<c_int> = const { Cell::new(0) };
    }

    fn record(call: &'static str) {
        CALLS.with(|calls| calls.borrow_mut().push(call));
    }

    fn calls() -> Vec<&'static str> {
        CALLS.with(|calls| calls.borrow().clone())
    }

    unsafe extern "system" fn start_push_mode(
        _: HToupcam,
        _: PTOUPCAM_DATA_CALLBACK,
        _: *mut c_void,
    ) -> HRESULT {
        record("StartPushMode");
        S_OK
    }

    unsafe extern "system" fn start_pull_mode(
        _: HToupcam,
        _: PTOUPCAM_EVENT_CALLBACK,
        _: *mut c_void,
    ) -> HRESULT {
        record("StartPullModeWithCallback");
        S_OK
    }

    unsafe extern "system" fn stop(_: HToupcam) -> HRESULT {
        record("Stop");
        STOP_HR.with(Cell::get)
    }

    unsafe extern "system" fn pause(_: HToupcam, paused: c_int) -> HRESULT {
        record(if paused != 0 { "Pause(1)" } else { "Pause(0)" });
        PAUSE_HR.with(Cell::get)
    }

    unsafe extern "system" fn close(_: HToupcam) {
        record("Close");
    }

    unsafe extern "system" fn get_option(_: HToupcam, _: c_uint, value: *mut c_int) -> HRESULT {
        *value = TRIGGER_OPTION.with(Cell::get);
        S_OK
    }

    fn camera() -> Camera {
        CALLS.with(|calls| calls.borrow_mut().clear());
        STOP_HR.with(|hr| hr.set(S_OK));
        PAUSE_HR.with(|hr| hr.set(S_OK));
        let lib = toupcam_library::from_stubs(Stubs {
            start_push_mode,
            start_pull_mode_with_callback: start_pull_mode,
            stop,
            pause,
            close,
            get_option,
            ..Stubs::default()
        })
        .unwrap();
        let handle = NonNull::<c_void>::dangling().as_ptr();
        Camera::new(Sdk::from_library(lib), handle)
    }

    struct Discard;

    impl StreamListener for Discard {
        fn on_preview(&self, _: FrameRef<'_>) {}
        fn on_still(&self, _: FrameRef<'_>) {}
    }

    fn listener() -> Discard {
        Discard
    }

    #[test]
    fn test_restart_needs_listener() {
        let cam = camera();
        assert!(matches!(
            cam.restart_streaming(),
            Err(Error::NoCachedListener)
        ));
        assert!(calls().is_empty());
        assert!(!cam.is_streaming());
    }

    #[test]
    fn test_restart_reuses_listener() {
        let cam = camera();
        cam.start_push(listener()).unwrap();
        cam.restart_streaming().unwrap();
        assert!(cam.is_streaming());
        assert_eq!(calls(), ["StartPushMode", "Stop", "StartPushMode"]);
    }

    #[test]
    fn test_push_already_streaming() {
        let cam = camera();
        cam.start_push(listener()).unwrap();
        assert!(cam.is_streaming());
        assert!(matches!(
            cam.start_push(listener()),
            Err(Error::AlreadyStreaming)
        ));
        assert!(matches!(cam.start_pull(4), Err(Error::AlreadyStreaming)));
        assert_eq!(calls(), ["StartPushMode"]);
    }

    #[test]
    fn test_pull_already_streaming() {
        let cam = camera();
        let _events = cam.start_pull(4).unwrap();
        assert!(cam.is_streaming());
        assert!(matches!(cam.start_pull(4), Err(Error::AlreadyStreaming)));
        assert!(matches!(
            cam.start_push(listener()),
            Err(Error::AlreadyStreaming)
        ));
        assert_eq!(calls(), ["StartPullModeWithCallback"]);
    }

    #[test]
    fn test_pull_zero_capacity() {
        let cam = camera();
        assert!(matches!(cam.start_pull(0), Err(Error::ZeroCapacity)));
        assert!(calls().is_empty());
        assert!(!cam.is_streaming());

        // a single slot is enough to start
        let _events = cam.start_pull(1).unwrap();
        assert!(cam.is_streaming());
    }

    #[test]
    fn test_pause_resume() {
        let cam = camera();
        let _events = cam.start_pull(4).unwrap();

        assert_eq!(cam.pause_streaming().unwrap(), HResult::S_OK);
        assert!(!cam.is_streaming());
        PAUSE_HR.with(|hr| hr.set(S_FALSE));
        assert_eq!(cam.resume_streaming().unwrap(), HResult::S_FALSE);
        assert!(cam.is_streaming());

        PAUSE_HR.with(|hr| hr.set(E_FAIL));
        assert!(cam.pause_streaming().is_err());
        assert!(cam.is_streaming());
        assert_eq!(
            calls(),
            ["StartPullModeWithCallback", "Pause(1)", "Pause(0)", "Pause(1)"]
        );
    }

    #[test]
    fn test_failed_stop_keeps_stream() {
        let cam = camera();
        cam.start_push(listener()).unwrap();

        STOP_HR.with(|hr| hr.set(E_FAIL));
        assert!(matches!(
            cam.stop_streaming(),
            Err(Error::Sdk {
                call: "Toupcam_Stop",
                ..
            })
        ));
        assert!(cam.is_streaming());
        assert!(cam.state().push.is_some());

        STOP_HR.with(|hr| hr.set(S_OK));
        cam.stop_streaming().unwrap();
        assert!(!cam.is_streaming());
        let state = cam.state();
        assert!(state.push.is_none());
        assert!(state.listener.is_some());
    }

    #[test]
    fn test_drop_stops_before_close() {
        let cam = camera();
        let _events = cam.start_pull(4).unwrap();
        drop(cam);
        assert_eq!(calls(), ["StartPullModeWithCallback", "Stop", "Close"]);
    }

    #[test]
    fn test_drop_idle_only_closes() {
        let cam = camera();
        drop(cam);
        assert_eq!(calls(), ["Close"]);
    }

    #[test]
    fn test_unknown_trigger_mode() {
        let cam = camera();
        TRIGGER_OPTION.with(|value| value.set(1));
        assert_eq!(cam.trigger_mode().unwrap(), TriggerMode::Software);
        TRIGGER_OPTION.with(|value| value.set(7));
        assert!(matches!(
            cam.trigger_mode(),
            Err(Error::UnknownTriggerMode(7))
        ));
    }
}
