// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Toupcam-rs Contributors. All Rights Reserved.

//! Low-level FFI bindings for the Toupcam camera SDK.
//!
//! The SDK ships as a closed binary (`libtoupcam.so`, `toupcam.dll` or
//! `libtoupcam.dylib`) so the library is loaded at runtime with
//! [`libloading`] rather than linked. Structures mirror `toupcam.h` and keep
//! its C names; higher level code should use the `toupcam` crate instead.

#![allow(non_camel_case_types, non_snake_case, clippy::missing_safety_doc)]

use libc::{c_char, c_int, c_short, c_uint, c_ushort, c_void};
use libloading::Library;
use std::ffi::OsStr;

/// Character type of SDK strings: `wchar_t` on Windows, `char` elsewhere.
#[cfg(windows)]
pub type TChar = u16;
#[cfg(not(windows))]
pub type TChar = c_char;

pub type HToupcam = *mut c_void;
pub type HRESULT = c_int;

/// Default shared library name for the current platform.
#[cfg(windows)]
pub const TOUPCAM_LIBRARY: &str = "toupcam.dll";
#[cfg(target_os = "macos")]
pub const TOUPCAM_LIBRARY: &str = "libtoupcam.dylib";
#[cfg(all(not(windows), not(target_os = "macos")))]
pub const TOUPCAM_LIBRARY: &str = "libtoupcam.so";

/// Maximum number of cameras returned by `Toupcam_EnumV2`.
pub const TOUPCAM_MAX: usize = 128;
/// Number of resolution slots in a model descriptor.
pub const TOUPCAM_MAX_RES: usize = 16;

pub const S_OK: HRESULT = 0x0000_0000;
pub const S_FALSE: HRESULT = 0x0000_0001;
pub const E_UNEXPECTED: HRESULT = 0x8000_ffff_u32 as HRESULT;
pub const E_NOTIMPL: HRESULT = 0x8000_4001_u32 as HRESULT;
pub const E_NOINTERFACE: HRESULT = 0x8000_4002_u32 as HRESULT;
pub const E_POINTER: HRESULT = 0x8000_4003_u32 as HRESULT;
pub const E_FAIL: HRESULT = 0x8000_4005_u32 as HRESULT;
pub const E_PENDING: HRESULT = 0x8000_000a_u32 as HRESULT;
pub const E_WRONG_THREAD: HRESULT = 0x8001_010e_u32 as HRESULT;
pub const E_TIMEOUT: HRESULT = 0x8001_011f_u32 as HRESULT;
pub const E_ACCESSDENIED: HRESULT = 0x8007_0005_u32 as HRESULT;
pub const E_OUTOFMEMORY: HRESULT = 0x8007_000e_u32 as HRESULT;
pub const E_GEN_FAILURE: HRESULT = 0x8007_001f_u32 as HRESULT;
pub const E_INVALIDARG: HRESULT = 0x8007_0057_u32 as HRESULT;
pub const E_BUSY: HRESULT = 0x8007_00aa_u32 as HRESULT;

pub const TOUPCAM_FLAG_CMOS: u64 = 0x0000_0001;
pub const TOUPCAM_FLAG_CCD_PROGRESSIVE: u64 = 0x0000_0002;
pub const TOUPCAM_FLAG_CCD_INTERLACED: u64 = 0x0000_0004;
pub const TOUPCAM_FLAG_ROI_HARDWARE: u64 = 0x0000_0008;
pub const TOUPCAM_FLAG_MONO: u64 = 0x0000_0010;
pub const TOUPCAM_FLAG_BINSKIP_SUPPORTED: u64 = 0x0000_0020;
pub const TOUPCAM_FLAG_USB30: u64 = 0x0000_0040;
pub const TOUPCAM_FLAG_TEC: u64 = 0x0000_0080;
pub const TOUPCAM_FLAG_USB30_OVER_USB20: u64 = 0x0000_0100;
pub const TOUPCAM_FLAG_ST4: u64 = 0x0000_0200;
pub const TOUPCAM_FLAG_GETTEMPERATURE: u64 = 0x0000_0400;
pub const TOUPCAM_FLAG_RAW10: u64 = 0x0000_1000;
pub const TOUPCAM_FLAG_RAW12: u64 = 0x0000_2000;
pub const TOUPCAM_FLAG_RAW14: u64 = 0x0000_4000;
pub const TOUPCAM_FLAG_RAW16: u64 = 0x0000_8000;
pub const TOUPCAM_FLAG_FAN: u64 = 0x0001_0000;
pub const TOUPCAM_FLAG_TEC_ONOFF: u64 = 0x0002_0000;
pub const TOUPCAM_FLAG_ISP: u64 = 0x0004_0000;
pub const TOUPCAM_FLAG_TRIGGER_SOFTWARE: u64 = 0x0008_0000;
pub const TOUPCAM_FLAG_TRIGGER_EXTERNAL: u64 = 0x0010_0000;
pub const TOUPCAM_FLAG_TRIGGER_SINGLE: u64 = 0x0020_0000;
pub const TOUPCAM_FLAG_BLACKLEVEL: u64 = 0x0040_0000;
pub const TOUPCAM_FLAG_AUTO_FOCUS: u64 = 0x0080_0000;
pub const TOUPCAM_FLAG_BUFFER: u64 = 0x0100_0000;
pub const TOUPCAM_FLAG_DDR: u64 = 0x0200_0000;
pub const TOUPCAM_FLAG_CG: u64 = 0x0400_0000;
pub const TOUPCAM_FLAG_RGB888: u64 = 0x4000_0000;
pub const TOUPCAM_FLAG_RAW8: u64 = 0x8000_0000;
pub const TOUPCAM_FLAG_GLOBALSHUTTER: u64 = 0x0010_0000_0000;

pub const TOUPCAM_EVENT_EXPOSURE: c_uint = 0x0001;
pub const TOUPCAM_EVENT_TEMPTINT: c_uint = 0x0002;
pub const TOUPCAM_EVENT_IMAGE: c_uint = 0x0004;
pub const TOUPCAM_EVENT_STILLIMAGE: c_uint = 0x0005;
pub const TOUPCAM_EVENT_WBGAIN: c_uint = 0x0006;
pub const TOUPCAM_EVENT_TRIGGERFAIL: c_uint = 0x0007;
pub const TOUPCAM_EVENT_BLACK: c_uint = 0x0008;
pub const TOUPCAM_EVENT_FFC: c_uint = 0x0009;
pub const TOUPCAM_EVENT_DFC: c_uint = 0x000a;
pub const TOUPCAM_EVENT_ROI: c_uint = 0x000b;
pub const TOUPCAM_EVENT_LEVELRANGE: c_uint = 0x000c;
pub const TOUPCAM_EVENT_ERROR: c_uint = 0x0080;
pub const TOUPCAM_EVENT_DISCONNECTED: c_uint = 0x0081;
pub const TOUPCAM_EVENT_NOFRAMETIMEOUT: c_uint = 0x0082;
pub const TOUPCAM_EVENT_AFFEEDBACK: c_uint = 0x0083;
pub const TOUPCAM_EVENT_AFPOSITION: c_uint = 0x0084;
pub const TOUPCAM_EVENT_NOPACKETTIMEOUT: c_uint = 0x0085;
pub const TOUPCAM_EVENT_EXPO_START: c_uint = 0x4000;
pub const TOUPCAM_EVENT_EXPO_STOP: c_uint = 0x4001;
pub const TOUPCAM_EVENT_TRIGGER_ALLOW: c_uint = 0x4002;
pub const TOUPCAM_EVENT_FACTORY: c_uint = 0x8001;

pub const TOUPCAM_OPTION_NOFRAME_TIMEOUT: c_uint = 0x01;
pub const TOUPCAM_OPTION_THREAD_PRIORITY: c_uint = 0x02;
pub const TOUPCAM_OPTION_PROCESSMODE: c_uint = 0x03;
pub const TOUPCAM_OPTION_RAW: c_uint = 0x04;
pub const TOUPCAM_OPTION_HISTOGRAM: c_uint = 0x05;
pub const TOUPCAM_OPTION_BITDEPTH: c_uint = 0x06;
pub const TOUPCAM_OPTION_FAN: c_uint = 0x07;
pub const TOUPCAM_OPTION_TEC: c_uint = 0x08;
pub const TOUPCAM_OPTION_LINEAR: c_uint = 0x09;
pub const TOUPCAM_OPTION_CURVE: c_uint = 0x0a;
pub const TOUPCAM_OPTION_TRIGGER: c_uint = 0x0b;
pub const TOUPCAM_OPTION_RGB: c_uint = 0x0c;
pub const TOUPCAM_OPTION_COLORMATIX: c_uint = 0x0d;
pub const TOUPCAM_OPTION_WBGAIN: c_uint = 0x0e;
pub const TOUPCAM_OPTION_TECTARGET: c_uint = 0x0f;
pub const TOUPCAM_OPTION_AUTOEXP_POLICY: c_uint = 0x10;
pub const TOUPCAM_OPTION_FRAMERATE: c_uint = 0x11;
pub const TOUPCAM_OPTION_DEMOSAIC: c_uint = 0x12;
pub const TOUPCAM_OPTION_DEMOSAIC_VIDEO: c_uint = 0x13;
pub const TOUPCAM_OPTION_DEMOSAIC_STILL: c_uint = 0x14;
pub const TOUPCAM_OPTION_BLACKLEVEL: c_uint = 0x15;
pub const TOUPCAM_OPTION_BINNING: c_uint = 0x17;
pub const TOUPCAM_OPTION_ROTATE: c_uint = 0x18;
pub const TOUPCAM_OPTION_CG: c_uint = 0x19;
pub const TOUPCAM_OPTION_PIXEL_FORMAT: c_uint = 0x1a;
pub const TOUPCAM_OPTION_FFC: c_uint = 0x1b;
pub const TOUPCAM_OPTION_DFC: c_uint = 0x1d;
pub const TOUPCAM_OPTION_SHARPENING: c_uint = 0x1e;
pub const TOUPCAM_OPTION_UPSIDE_DOWN: c_uint = 0x23;

pub const TOUPCAM_TRIGGER_VIDEO: c_int = 0;
pub const TOUPCAM_TRIGGER_SOFTWARE: c_int = 1;
pub const TOUPCAM_TRIGGER_EXTERNAL: c_int = 2;
pub const TOUPCAM_TRIGGER_BOTH: c_int = 3;

#[repr(C)]
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct ToupcamResolution {
    pub width: c_uint,
    pub height: c_uint,
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct ToupcamModelV2 {
    pub name: *const TChar,
    pub flag: u64,
    pub maxspeed: c_uint,
    pub preview: c_uint,
    pub still: c_uint,
    pub maxfanspeed: c_uint,
    pub ioctrol: c_uint,
    pub xpixsz: f32,
    pub ypixsz: f32,
    pub res: [ToupcamResolution; TOUPCAM_MAX_RES],
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct ToupcamDeviceV2 {
    pub displayname: [TChar; 64],
    pub id: [TChar; 64],
    pub model: *const ToupcamModelV2,
}

impl Default for ToupcamDeviceV2 {
    fn default() -> Self {
        Self {
            displayname: [0; 64],
            id: [0; 64],
            model: std::ptr::null(),
        }
    }
}

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct ToupcamFrameInfoV2 {
    pub width: c_uint,
    pub height: c_uint,
    pub flag: c_uint,
    pub seq: c_uint,
    pub timestamp: u64,
}

/// Windows DIB header handed to push-mode data callbacks.
#[repr(C)]
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct BITMAPINFOHEADER {
    pub biSize: u32,
    pub biWidth: i32,
    pub biHeight: i32,
    pub biPlanes: u16,
    pub biBitCount: u16,
    pub biCompression: u32,
    pub biSizeImage: u32,
    pub biXPelsPerMeter: i32,
    pub biYPelsPerMeter: i32,
    pub biClrUsed: u32,
    pub biClrImportant: u32,
}

pub type PTOUPCAM_DATA_CALLBACK = Option<
    unsafe extern "system" fn(
        pData: *const c_void,
        pHeader: *const BITMAPINFOHEADER,
        bSnap: c_int,
        pCallbackCtx: *mut c_void,
    ),
>;
pub type PTOUPCAM_EVENT_CALLBACK =
    Option<unsafe extern "system" fn(nEvent: c_uint, pCallbackCtx: *mut c_void)>;
pub type PTOUPCAM_HOTPLUG = Option<unsafe extern "system" fn(pCallbackCtx: *mut c_void)>;

pub type FnVersion = unsafe extern "system" fn() -> *const TChar;
pub type FnEnumV2 = unsafe extern "system" fn(arr: *mut ToupcamDeviceV2) -> c_uint;
pub type FnOpen = unsafe extern "system" fn(camId: *const TChar) -> HToupcam;
pub type FnOpenByIndex = unsafe extern "system" fn(index: c_uint) -> HToupcam;
pub type FnClose = unsafe extern "system" fn(h: HToupcam);
pub type FnHandle = unsafe extern "system" fn(h: HToupcam) -> HRESULT;
pub type FnStartPushMode = unsafe extern "system" fn(
    h: HToupcam,
    pDataCallback: PTOUPCAM_DATA_CALLBACK,
    pCallbackCtx: *mut c_void,
) -> HRESULT;
pub type FnStartPullModeWithCallback = unsafe extern "system" fn(
    h: HToupcam,
    pEventCallback: PTOUPCAM_EVENT_CALLBACK,
    pCallbackContext: *mut c_void,
) -> HRESULT;
pub type FnPullImage = unsafe extern "system" fn(
    h: HToupcam,
    pImageData: *mut c_void,
    bits: c_int,
    pnWidth: *mut c_uint,
    pnHeight: *mut c_uint,
) -> HRESULT;
pub type FnPullImageV2 = unsafe extern "system" fn(
    h: HToupcam,
    pImageData: *mut c_void,
    bits: c_int,
    pInfo: *mut ToupcamFrameInfoV2,
) -> HRESULT;
pub type FnPutInt = unsafe extern "system" fn(h: HToupcam, value: c_int) -> HRESULT;
pub type FnPutUint = unsafe extern "system" fn(h: HToupcam, value: c_uint) -> HRESULT;
pub type FnGetInt = unsafe extern "system" fn(h: HToupcam, value: *mut c_int) -> HRESULT;
pub type FnGetUint = unsafe extern "system" fn(h: HToupcam, value: *mut c_uint) -> HRESULT;
pub type FnTrigger = unsafe extern "system" fn(h: HToupcam, nNumber: c_ushort) -> HRESULT;
pub type FnGetSize = unsafe extern "system" fn(h: HToupcam, pWidth: *mut c_int, pHeight: *mut c_int)
    -> HRESULT;
pub type FnGetResolution = unsafe extern "system" fn(
    h: HToupcam,
    nResolutionIndex: c_uint,
    pWidth: *mut c_int,
    pHeight: *mut c_int,
) -> HRESULT;
pub type FnGetRawFormat = unsafe extern "system" fn(
    h: HToupcam,
    nFourCC: *mut c_uint,
    bitsperpixel: *mut c_uint,
) -> HRESULT;
pub type FnPutOption = unsafe extern "system" fn(h: HToupcam, iOption: c_uint, iValue: c_int) -> HRESULT;
pub type FnGetOption =
    unsafe extern "system" fn(h: HToupcam, iOption: c_uint, piValue: *mut c_int) -> HRESULT;
pub type FnGetString = unsafe extern "system" fn(h: HToupcam, buf: *mut c_char) -> HRESULT;
pub type FnGetExpTimeRange = unsafe extern "system" fn(
    h: HToupcam,
    nMin: *mut c_uint,
    nMax: *mut c_uint,
    nDef: *mut c_uint,
) -> HRESULT;
pub type FnGetExpoAGain = unsafe extern "system" fn(h: HToupcam, AGain: *mut c_ushort) -> HRESULT;
pub type FnPutExpoAGain = unsafe extern "system" fn(h: HToupcam, AGain: c_ushort) -> HRESULT;
pub type FnGetTemperature = unsafe extern "system" fn(h: HToupcam, pTemperature: *mut c_short) -> HRESULT;
pub type FnHotPlug = unsafe extern "system" fn(pHotPlugCallback: PTOUPCAM_HOTPLUG, pCallbackCtx: *mut c_void);

/// Runtime-loaded function table for the Toupcam SDK.
///
/// Function pointers stay valid for as long as the table is alive since it
/// owns the [`Library`] they were resolved from.
pub struct toupcam {
    __library: Library,
    version: FnVersion,
    enum_v2: FnEnumV2,
    open: FnOpen,
    open_by_index: FnOpenByIndex,
    close: FnClose,
    start_push_mode: FnStartPushMode,
    start_pull_mode_with_callback: FnStartPullModeWithCallback,
    pull_image: FnPullImage,
    pull_still_image: FnPullImage,
    pull_image_v2: FnPullImageV2,
    stop: FnHandle,
    pause: FnPutInt,
    snap: FnPutUint,
    trigger: FnTrigger,
    put_esize: FnPutUint,
    get_esize: FnGetUint,
    get_size: FnGetSize,
    get_final_size: FnGetSize,
    get_resolution_number: FnHandle,
    get_resolution: FnGetResolution,
    get_still_resolution_number: FnHandle,
    get_still_resolution: FnGetResolution,
    get_raw_format: FnGetRawFormat,
    put_option: FnPutOption,
    get_option: FnGetOption,
    get_serial_number: FnGetString,
    get_fw_version: FnGetString,
    get_hw_version: FnGetString,
    get_expo_time: FnGetUint,
    put_expo_time: FnPutUint,
    get_exp_time_range: FnGetExpTimeRange,
    get_expo_again: FnGetExpoAGain,
    put_expo_again: FnPutExpoAGain,
    get_auto_expo_enable: FnGetInt,
    put_auto_expo_enable: FnPutInt,
    put_hflip: FnPutInt,
    put_vflip: FnPutInt,
    get_temperature: FnGetTemperature,
    hotplug: Option<FnHotPlug>,
}

unsafe impl Send for toupcam {}
unsafe impl Sync for toupcam {}

macro_rules! symbol {
    ($lib:expr, $ty:ty, $name:literal) => {
        *$lib.get::<$ty>(concat!($name, "\0").as_bytes())?
    };
}

impl toupcam {
    /// Loads the SDK from `path` and resolves every required export.
    ///
    /// # Safety
    ///
    /// Loading a shared library runs its initialisers. The caller must trust
    /// the library at `path` to be a genuine Toupcam SDK build whose exports
    /// match the signatures declared here.
    pub unsafe fn new<P: AsRef<OsStr>>(path: P) -> Result<Self, libloading::Error> {
        let lib = Library::new(path)?;
        let hotplug = lib
            .get::<FnHotPlug>(b"Toupcam_HotPlug\0")
            .ok()
            .map(|sym| *sym);
        Ok(Self {
            version: symbol!(lib, FnVersion, "Toupcam_Version"),
            enum_v2: symbol!(lib, FnEnumV2, "Toupcam_EnumV2"),
            open: symbol!(lib, FnOpen, "Toupcam_Open"),
            open_by_index: symbol!(lib, FnOpenByIndex, "Toupcam_OpenByIndex"),
            close: symbol!(lib, FnClose, "Toupcam_Close"),
            start_push_mode: symbol!(lib, FnStartPushMode, "Toupcam_StartPushMode"),
            start_pull_mode_with_callback: symbol!(lib, FnStartPullModeWithCallback, "Toupcam_StartPullModeWithCallback"),
            pull_image: symbol!(lib, FnPullImage, "Toupcam_PullImage"),
            pull_still_image: symbol!(lib, FnPullImage, "Toupcam_PullStillImage"),
            pull_image_v2: symbol!(lib, FnPullImageV2, "Toupcam_PullImageV2"),
            stop: symbol!(lib, FnHandle, "Toupcam_Stop"),
            pause: symbol!(lib, FnPutInt, "Toupcam_Pause"),
            snap: symbol!(lib, FnPutUint, "Toupcam_Snap"),
            trigger: symbol!(lib, FnTrigger, "Toupcam_Trigger"),
            put_esize: symbol!(lib, FnPutUint, "Toupcam_put_eSize"),
            get_esize: symbol!(lib, FnGetUint, "Toupcam_get_eSize"),
            get_size: symbol!(lib, FnGetSize, "Toupcam_get_Size"),
            get_final_size: symbol!(lib, FnGetSize, "Toupcam_get_FinalSize"),
            get_resolution_number: symbol!(lib, FnHandle, "Toupcam_get_ResolutionNumber"),
            get_resolution: symbol!(lib, FnGetResolution, "Toupcam_get_Resolution"),
            get_still_resolution_number: symbol!(lib, FnHandle, "Toupcam_get_StillResolutionNumber"),
            get_still_resolution: symbol!(lib, FnGetResolution, "Toupcam_get_StillResolution"),
            get_raw_format: symbol!(lib, FnGetRawFormat, "Toupcam_get_RawFormat"),
            put_option: symbol!(lib, FnPutOption, "Toupcam_put_Option"),
            get_option: symbol!(lib, FnGetOption, "Toupcam_get_Option"),
            get_serial_number: symbol!(lib, FnGetString, "Toupcam_get_SerialNumber"),
            get_fw_version: symbol!(lib, FnGetString, "Toupcam_get_FwVersion"),
            get_hw_version: symbol!(lib, FnGetString, "Toupcam_get_HwVersion"),
            get_expo_time: symbol!(lib, FnGetUint, "Toupcam_get_ExpoTime"),
            put_expo_time: symbol!(lib, FnPutUint, "Toupcam_put_ExpoTime"),
            get_exp_time_range: symbol!(lib, FnGetExpTimeRange, "Toupcam_get_ExpTimeRange"),
            get_expo_again: symbol!(lib, FnGetExpoAGain, "Toupcam_get_ExpoAGain"),
            put_expo_again: symbol!(lib, FnPutExpoAGain, "Toupcam_put_ExpoAGain"),
            get_auto_expo_enable: symbol!(lib, FnGetInt, "Toupcam_get_AutoExpoEnable"),
            put_auto_expo_enable: symbol!(lib, FnPutInt, "Toupcam_put_AutoExpoEnable"),
            put_hflip: symbol!(lib, FnPutInt, "Toupcam_put_HFlip"),
            put_vflip: symbol!(lib, FnPutInt, "Toupcam_put_VFlip"),
            get_temperature: symbol!(lib, FnGetTemperature, "Toupcam_get_Temperature"),
            hotplug,
            __library: lib,
        })
    }

    pub unsafe fn Toupcam_Version(&self) -> *const TChar {
        (self.version)()
    }

    pub unsafe fn Toupcam_EnumV2(&self, arr: *mut ToupcamDeviceV2) -> c_uint {
        (self.enum_v2)(arr)
    }

    pub unsafe fn Toupcam_Open(&self, camId: *const TChar) -> HToupcam {
        (self.open)(camId)
    }

    pub unsafe fn Toupcam_OpenByIndex(&self, index: c_uint) -> HToupcam {
        (self.open_by_index)(index)
    }

    pub unsafe fn Toupcam_Close(&self, h: HToupcam) {
        (self.close)(h)
    }

    pub unsafe fn Toupcam_StartPushMode(
        &self,
        h: HToupcam,
        pDataCallback: PTOUPCAM_DATA_CALLBACK,
        pCallbackCtx: *mut c_void,
    ) -> HRESULT {
        (self.start_push_mode)(h, pDataCallback, pCallbackCtx)
    }

    pub unsafe fn Toupcam_StartPullModeWithCallback(
        &self,
        h: HToupcam,
        pEventCallback: PTOUPCAM_EVENT_CALLBACK,
        pCallbackContext: *mut c_void,
    ) -> HRESULT {
        (self.start_pull_mode_with_callback)(h, pEventCallback, pCallbackContext)
    }

    pub unsafe fn Toupcam_PullImage(
        &self,
        h: HToupcam,
        pImageData: *mut c_void,
        bits: c_int,
        pnWidth: *mut c_uint,
        pnHeight: *mut c_uint,
    ) -> HRESULT {
        (self.pull_image)(h, pImageData, bits, pnWidth, pnHeight)
    }

    /// Passing a NULL `pImageData` peeks the size of the pending still
    /// without dequeuing it.
    pub unsafe fn Toupcam_PullStillImage(
        &self,
        h: HToupcam,
        pImageData: *mut c_void,
        bits: c_int,
        pnWidth: *mut c_uint,
        pnHeight: *mut c_uint,
    ) -> HRESULT {
        (self.pull_still_image)(h, pImageData, bits, pnWidth, pnHeight)
    }

    pub unsafe fn Toupcam_PullImageV2(
        &self,
        h: HToupcam,
        pImageData: *mut c_void,
        bits: c_int,
        pInfo: *mut ToupcamFrameInfoV2,
    ) -> HRESULT {
        (self.pull_image_v2)(h, pImageData, bits, pInfo)
    }

    pub unsafe fn Toupcam_Stop(&self, h: HToupcam) -> HRESULT {
        (self.stop)(h)
    }

    pub unsafe fn Toupcam_Pause(&self, h: HToupcam, bPause: c_int) -> HRESULT {
        (self.pause)(h, bPause)
    }

    pub unsafe fn Toupcam_Snap(&self, h: HToupcam, nResolutionIndex: c_uint) -> HRESULT {
        (self.snap)(h, nResolutionIndex)
    }

    pub unsafe fn Toupcam_Trigger(&self, h: HToupcam, nNumber: c_ushort) -> HRESULT {
        (self.trigger)(h, nNumber)
    }

    pub unsafe fn Toupcam_put_eSize(&self, h: HToupcam, nResolutionIndex: c_uint) -> HRESULT {
        (self.put_esize)(h, nResolutionIndex)
    }

    pub unsafe fn Toupcam_get_eSize(&self, h: HToupcam, pnResolutionIndex: *mut c_uint) -> HRESULT {
        (self.get_esize)(h, pnResolutionIndex)
    }

    pub unsafe fn Toupcam_get_Size(
        &self,
        h: HToupcam,
        pWidth: *mut c_int,
        pHeight: *mut c_int,
    ) -> HRESULT {
        (self.get_size)(h, pWidth, pHeight)
    }

    pub unsafe fn Toupcam_get_FinalSize(
        &self,
        h: HToupcam,
        pWidth: *mut c_int,
        pHeight: *mut c_int,
    ) -> HRESULT {
        (self.get_final_size)(h, pWidth, pHeight)
    }

    /// Returns the number of preview resolutions, or a negative HRESULT.
    pub unsafe fn Toupcam_get_ResolutionNumber(&self, h: HToupcam) -> HRESULT {
        (self.get_resolution_number)(h)
    }

    pub unsafe fn Toupcam_get_Resolution(
        &self,
        h: HToupcam,
        nResolutionIndex: c_uint,
        pWidth: *mut c_int,
        pHeight: *mut c_int,
    ) -> HRESULT {
        (self.get_resolution)(h, nResolutionIndex, pWidth, pHeight)
    }

    pub unsafe fn Toupcam_get_StillResolutionNumber(&self, h: HToupcam) -> HRESULT {
        (self.get_still_resolution_number)(h)
    }

    pub unsafe fn Toupcam_get_StillResolution(
        &self,
        h: HToupcam,
        nResolutionIndex: c_uint,
        pWidth: *mut c_int,
        pHeight: *mut c_int,
    ) -> HRESULT {
        (self.get_still_resolution)(h, nResolutionIndex, pWidth, pHeight)
    }

    pub unsafe fn Toupcam_get_RawFormat(
        &self,
        h: HToupcam,
        nFourCC: *mut c_uint,
        bitsperpixel: *mut c_uint,
    ) -> HRESULT {
        (self.get_raw_format)(h, nFourCC, bitsperpixel)
    }

    pub unsafe fn Toupcam_put_Option(&self, h: HToupcam, iOption: c_uint, iValue: c_int) -> HRESULT {
        (self.put_option)(h, iOption, iValue)
    }

    pub unsafe fn Toupcam_get_Option(
        &self,
        h: HToupcam,
        iOption: c_uint,
        piValue: *mut c_int,
    ) -> HRESULT {
        (self.get_option)(h, iOption, piValue)
    }

    /// `sn` must point to at least 32 bytes.
    pub unsafe fn Toupcam_get_SerialNumber(&self, h: HToupcam, sn: *mut c_char) -> HRESULT {
        (self.get_serial_number)(h, sn)
    }

    /// `fwver` must point to at least 16 bytes.
    pub unsafe fn Toupcam_get_FwVersion(&self, h: HToupcam, fwver: *mut c_char) -> HRESULT {
        (self.get_fw_version)(h, fwver)
    }

    /// `hwver` must point to at least 16 bytes.
    pub unsafe fn Toupcam_get_HwVersion(&self, h: HToupcam, hwver: *mut c_char) -> HRESULT {
        (self.get_hw_version)(h, hwver)
    }

    pub unsafe fn Toupcam_get_ExpoTime(&self, h: HToupcam, Time: *mut c_uint) -> HRESULT {
        (self.get_expo_time)(h, Time)
    }

    pub unsafe fn Toupcam_put_ExpoTime(&self, h: HToupcam, Time: c_uint) -> HRESULT {
        (self.put_expo_time)(h, Time)
    }

    pub unsafe fn Toupcam_get_ExpTimeRange(
        &self,
        h: HToupcam,
        nMin: *mut c_uint,
        nMax: *mut c_uint,
        nDef: *mut c_uint,
    ) -> HRESULT {
        (self.get_exp_time_range)(h, nMin, nMax, nDef)
    }

    pub unsafe fn Toupcam_get_ExpoAGain(&self, h: HToupcam, AGain: *mut c_ushort) -> HRESULT {
        (self.get_expo_again)(h, AGain)
    }

    pub unsafe fn Toupcam_put_ExpoAGain(&self, h: HToupcam, AGain: c_ushort) -> HRESULT {
        (self.put_expo_again)(h, AGain)
    }

    pub unsafe fn Toupcam_get_AutoExpoEnable(&self, h: HToupcam, bAutoExposure: *mut c_int) -> HRESULT {
        (self.get_auto_expo_enable)(h, bAutoExposure)
    }

    pub unsafe fn Toupcam_put_AutoExpoEnable(&self, h: HToupcam, bAutoExposure: c_int) -> HRESULT {
        (self.put_auto_expo_enable)(h, bAutoExposure)
    }

    pub unsafe fn Toupcam_put_HFlip(&self, h: HToupcam, bHFlip: c_int) -> HRESULT {
        (self.put_hflip)(h, bHFlip)
    }

    pub unsafe fn Toupcam_put_VFlip(&self, h: HToupcam, bVFlip: c_int) -> HRESULT {
        (self.put_vflip)(h, bVFlip)
    }

    /// Temperature in units of 0.1 degrees Celsius.
    pub unsafe fn Toupcam_get_Temperature(&self, h: HToupcam, pTemperature: *mut c_short) -> HRESULT {
        (self.get_temperature)(h, pTemperature)
    }

    /// Whether the library exports `Toupcam_HotPlug` (Linux and macOS only).
    pub fn has_hotplug(&self) -> bool {
        self.hotplug.is_some()
    }

    /// Registers (or with a `None` callback, clears) the hotplug callback.
    /// Returns `false` when the export is missing.
    pub unsafe fn Toupcam_HotPlug(
        &self,
        pHotPlugCallback: PTOUPCAM_HOTPLUG,
        pCallbackCtx: *mut c_void,
    ) -> bool {
        match self.hotplug {
            Some(f) => {
                f(pHotPlugCallback, pCallbackCtx);
                true
            }
            None => false,
        }
    }
}

#[cfg(feature = "stubs")]
mod stubs {
    use super::*;
    use std::ptr::null_mut;

    static EMPTY: [TChar; 1] = [0];

    pub unsafe extern "system" fn version() -> *const TChar {
        EMPTY.as_ptr()
    }
    pub unsafe extern "system" fn enum_v2(_: *mut ToupcamDeviceV2) -> c_uint {
        0
    }
    pub unsafe extern "system" fn open(_: *const TChar) -> HToupcam {
        null_mut()
    }
    pub unsafe extern "system" fn open_by_index(_: c_uint) -> HToupcam {
        null_mut()
    }
    pub unsafe extern "system" fn close(_: HToupcam) {}
    pub unsafe extern "system" fn handle(_: HToupcam) -> HRESULT {
        E_NOTIMPL
    }
    pub unsafe extern "system" fn start_push_mode(
        _: HToupcam,
        _: PTOUPCAM_DATA_CALLBACK,
        _: *mut c_void,
    ) -> HRESULT {
        E_NOTIMPL
    }
    pub unsafe extern "system" fn start_pull_mode(
        _: HToupcam,
        _: PTOUPCAM_EVENT_CALLBACK,
        _: *mut c_void,
    ) -> HRESULT {
        E_NOTIMPL
    }
    pub unsafe extern "system" fn pull_image(
        _: HToupcam,
        _: *mut c_void,
        _: c_int,
        _: *mut c_uint,
        _: *mut c_uint,
    ) -> HRESULT {
        E_NOTIMPL
    }
    pub unsafe extern "system" fn pull_image_v2(
        _: HToupcam,
        _: *mut c_void,
        _: c_int,
        _: *mut ToupcamFrameInfoV2,
    ) -> HRESULT {
        E_NOTIMPL
    }
    pub unsafe extern "system" fn put_int(_: HToupcam, _: c_int) -> HRESULT {
        E_NOTIMPL
    }
    pub unsafe extern "system" fn put_uint(_: HToupcam, _: c_uint) -> HRESULT {
        E_NOTIMPL
    }
    pub unsafe extern "system" fn get_int(_: HToupcam, _: *mut c_int) -> HRESULT {
        E_NOTIMPL
    }
    pub unsafe extern "system" fn get_uint(_: HToupcam, _: *mut c_uint) -> HRESULT {
        E_NOTIMPL
    }
    pub unsafe extern "system" fn trigger(_: HToupcam, _: c_ushort) -> HRESULT {
        E_NOTIMPL
    }
    pub unsafe extern "system" fn get_size(_: HToupcam, _: *mut c_int, _: *mut c_int) -> HRESULT {
        E_NOTIMPL
    }
    pub unsafe extern "system" fn get_resolution(
        _: HToupcam,
        _: c_uint,
        _: *mut c_int,
        _: *mut c_int,
    ) -> HRESULT {
        E_NOTIMPL
    }
    pub unsafe extern "system" fn get_raw_format(
        _: HToupcam,
        _: *mut c_uint,
        _: *mut c_uint,
    ) -> HRESULT {
        E_NOTIMPL
    }
    pub unsafe extern "system" fn put_option(_: HToupcam, _: c_uint, _: c_int) -> HRESULT {
        E_NOTIMPL
    }
    pub unsafe extern "system" fn get_option(_: HToupcam, _: c_uint, _: *mut c_int) -> HRESULT {
        E_NOTIMPL
    }
    pub unsafe extern "system" fn get_string(_: HToupcam, _: *mut c_char) -> HRESULT {
        E_NOTIMPL
    }
    pub unsafe extern "system" fn get_exp_time_range(
        _: HToupcam,
        _: *mut c_uint,
        _: *mut c_uint,
        _: *mut c_uint,
    ) -> HRESULT {
        E_NOTIMPL
    }
    pub unsafe extern "system" fn get_ushort(_: HToupcam, _: *mut c_ushort) -> HRESULT {
        E_NOTIMPL
    }
    pub unsafe extern "system" fn put_ushort(_: HToupcam, _: c_ushort) -> HRESULT {
        E_NOTIMPL
    }
    pub unsafe extern "system" fn get_short(_: HToupcam, _: *mut c_short) -> HRESULT {
        E_NOTIMPL
    }
}

/// Exports for a function table that is not backed by a vendor library.
///
/// Every entry defaults to a stub returning `E_NOTIMPL` (NULL handles,
/// zero cameras); override the ones under test with struct update syntax.
#[cfg(feature = "stubs")]
#[derive(Copy, Clone)]
pub struct Stubs {
    pub version: FnVersion,
    pub enum_v2: FnEnumV2,
    pub open: FnOpen,
    pub open_by_index: FnOpenByIndex,
    pub close: FnClose,
    pub start_push_mode: FnStartPushMode,
    pub start_pull_mode_with_callback: FnStartPullModeWithCallback,
    pub pull_image: FnPullImage,
    pub pull_still_image: FnPullImage,
    pub pull_image_v2: FnPullImageV2,
    pub stop: FnHandle,
    pub pause: FnPutInt,
    pub snap: FnPutUint,
    pub trigger: FnTrigger,
    pub put_esize: FnPutUint,
    pub get_esize: FnGetUint,
    pub get_size: FnGetSize,
    pub get_final_size: FnGetSize,
    pub get_resolution_number: FnHandle,
    pub get_resolution: FnGetResolution,
    pub get_still_resolution_number: FnHandle,
    pub get_still_resolution: FnGetResolution,
    pub get_raw_format: FnGetRawFormat,
    pub put_option: FnPutOption,
    pub get_option: FnGetOption,
    pub get_serial_number: FnGetString,
    pub get_fw_version: FnGetString,
    pub get_hw_version: FnGetString,
    pub get_expo_time: FnGetUint,
    pub put_expo_time: FnPutUint,
    pub get_exp_time_range: FnGetExpTimeRange,
    pub get_expo_again: FnGetExpoAGain,
    pub put_expo_again: FnPutExpoAGain,
    pub get_auto_expo_enable: FnGetInt,
    pub put_auto_expo_enable: FnPutInt,
    pub put_hflip: FnPutInt,
    pub put_vflip: FnPutInt,
    pub get_temperature: FnGetTemperature,
    pub hotplug: Option<FnHotPlug>,
}

#[cfg(feature = "stubs")]
impl Default for Stubs {
    fn default() -> Self {
        Self {
            version: stubs::version,
            enum_v2: stubs::enum_v2,
            open: stubs::open,
            open_by_index: stubs::open_by_index,
            close: stubs::close,
            start_push_mode: stubs::start_push_mode,
            start_pull_mode_with_callback: stubs::start_pull_mode,
            pull_image: stubs::pull_image,
            pull_still_image: stubs::pull_image,
            pull_image_v2: stubs::pull_image_v2,
            stop: stubs::handle,
            pause: stubs::put_int,
            snap: stubs::put_uint,
            trigger: stubs::trigger,
            put_esize: stubs::put_uint,
            get_esize: stubs::get_uint,
            get_size: stubs::get_size,
            get_final_size: stubs::get_size,
            get_resolution_number: stubs::handle,
            get_resolution: stubs::get_resolution,
            get_still_resolution_number: stubs::handle,
            get_still_resolution: stubs::get_resolution,
            get_raw_format: stubs::get_raw_format,
            put_option: stubs::put_option,
            get_option: stubs::get_option,
            get_serial_number: stubs::get_string,
            get_fw_version: stubs::get_string,
            get_hw_version: stubs::get_string,
            get_expo_time: stubs::get_uint,
            put_expo_time: stubs::put_uint,
            get_exp_time_range: stubs::get_exp_time_range,
            get_expo_again: stubs::get_ushort,
            put_expo_again: stubs::put_ushort,
            get_auto_expo_enable: stubs::get_int,
            put_auto_expo_enable: stubs::put_int,
            put_hflip: stubs::put_int,
            put_vflip: stubs::put_int,
            get_temperature: stubs::get_short,
            hotplug: None,
        }
    }
}

#[cfg(feature = "stubs")]
impl toupcam {
    /// Builds a table from Rust functions, with the current process standing
    /// in as the owning library.
    pub fn from_stubs(stubs: Stubs) -> Result<Self, libloading::Error> {
        #[cfg(unix)]
        let library = Library::from(libloading::os::unix::Library::this());
        #[cfg(windows)]
        let library = Library::from(libloading::os::windows::Library::this()?);
        Ok(Self {
            __library: library,
            version: stubs.version,
            enum_v2: stubs.enum_v2,
            open: stubs.open,
            open_by_index: stubs.open_by_index,
            close: stubs.close,
            start_push_mode: stubs.start_push_mode,
            start_pull_mode_with_callback: stubs.start_pull_mode_with_callback,
            pull_image: stubs.pull_image,
            pull_still_image: stubs.pull_still_image,
            pull_image_v2: stubs.pull_image_v2,
            stop: stubs.stop,
            pause: stubs.pause,
            snap: stubs.snap,
            trigger: stubs.trigger,
            put_esize: stubs.put_esize,
            get_esize: stubs.get_esize,
            get_size: stubs.get_size,
            get_final_size: stubs.get_final_size,
            get_resolution_number: stubs.get_resolution_number,
            get_resolution: stubs.get_resolution,
            get_still_resolution_number: stubs.get_still_resolution_number,
            get_still_resolution: stubs.get_still_resolution,
            get_raw_format: stubs.get_raw_format,
            put_option: stubs.put_option,
            get_option: stubs.get_option,
            get_serial_number: stubs.get_serial_number,
            get_fw_version: stubs.get_fw_version,
            get_hw_version: stubs.get_hw_version,
            get_expo_time: stubs.get_expo_time,
            put_expo_time: stubs.put_expo_time,
            get_exp_time_range: stubs.get_exp_time_range,
            get_expo_again: stubs.get_expo_again,
            put_expo_again: stubs.put_expo_again,
            get_auto_expo_enable: stubs.get_auto_expo_enable,
            put_auto_expo_enable: stubs.put_auto_expo_enable,
            put_hflip: stubs.put_hflip,
            put_vflip: stubs.put_vflip,
            get_temperature: stubs.get_temperature,
            hotplug: stubs.hotplug,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{offset_of, size_of};

    #[test]
    fn bitmap_header_layout() {
        assert_eq!(size_of::<BITMAPINFOHEADER>(), 40);
        assert_eq!(offset_of!(BITMAPINFOHEADER, biBitCount), 14);
        assert_eq!(offset_of!(BITMAPINFOHEADER, biClrImportant), 36);
    }

    #[test]
    fn resolution_layout() {
        assert_eq!(size_of::<ToupcamResolution>(), 8);
        assert_eq!(size_of::<ToupcamFrameInfoV2>(), 24);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn model_layout() {
        let ptr = size_of::<*const TChar>();
        assert_eq!(offset_of!(ToupcamModelV2, flag), ptr);
        assert_eq!(offset_of!(ToupcamModelV2, res), ptr + 8 + 5 * 4 + 2 * 4);
    }

    #[test]
    fn device_layout() {
        let tchar = size_of::<TChar>();
        assert_eq!(offset_of!(ToupcamDeviceV2, id), 64 * tchar);
        assert_eq!(offset_of!(ToupcamDeviceV2, model), 128 * tchar);
    }
}
