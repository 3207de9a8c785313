// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Toupcam-rs Contributors. All Rights Reserved.

//! Event, option and trigger mode codes.

use toupcam_sys as sys;

/// Notification delivered by the SDK in pull mode.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// Exposure time or gain changed
    Exposure,
    /// White balance changed, Temp/Tint mode
    TempTint,
    /// A live frame is ready to pull
    Image,
    /// A snapped still image is ready to pull
    StillImage,
    /// White balance changed, RGB gain mode
    WbGain,
    /// Trigger failed
    TriggerFail,
    /// Black balance changed
    Black,
    /// Flat field correction status changed
    Ffc,
    /// Dark field correction status changed
    Dfc,
    /// ROI changed
    Roi,
    /// Level range changed
    LevelRange,
    /// Generic error, the stream is no longer usable
    Error,
    /// Camera was unplugged
    Disconnected,
    /// No frame arrived within the configured timeout
    NoFrameTimeout,
    /// Auto focus feedback
    AfFeedback,
    /// Auto focus sensor board position
    AfPosition,
    /// No USB packet arrived within the configured timeout
    NoPacketTimeout,
    /// Hardware event: exposure started
    ExposureStart,
    /// Hardware event: exposure stopped
    ExposureStop,
    /// Next trigger is allowed
    TriggerAllow,
    /// Restored to factory defaults
    Factory,
    Unknown(u32),
}

impl Event {
    pub fn code(self) -> u32 {
        match self {
            Event::Exposure => sys::TOUPCAM_EVENT_EXPOSURE,
            Event::TempTint => sys::TOUPCAM_EVENT_TEMPTINT,
            Event::Image => sys::TOUPCAM_EVENT_IMAGE,
            Event::StillImage => sys::TOUPCAM_EVENT_STILLIMAGE,
            Event::WbGain => sys::TOUPCAM_EVENT_WBGAIN,
            Event::TriggerFail => sys::TOUPCAM_EVENT_TRIGGERFAIL,
            Event::Black => sys::TOUPCAM_EVENT_BLACK,
            Event::Ffc => sys::TOUPCAM_EVENT_FFC,
            Event::Dfc => sys::TOUPCAM_EVENT_DFC,
            Event::Roi => sys::TOUPCAM_EVENT_ROI,
            Event::LevelRange => sys::TOUPCAM_EVENT_LEVELRANGE,
            Event::Error => sys::TOUPCAM_EVENT_ERROR,
            Event::Disconnected => sys::TOUPCAM_EVENT_DISCONNECTED,
            Event::NoFrameTimeout => sys::TOUPCAM_EVENT_NOFRAMETIMEOUT,
            Event::AfFeedback => sys::TOUPCAM_EVENT_AFFEEDBACK,
            Event::AfPosition => sys::TOUPCAM_EVENT_AFPOSITION,
            Event::NoPacketTimeout => sys::TOUPCAM_EVENT_NOPACKETTIMEOUT,
            Event::ExposureStart => sys::TOUPCAM_EVENT_EXPO_START,
            Event::ExposureStop => sys::TOUPCAM_EVENT_EXPO_STOP,
            Event::TriggerAllow => sys::TOUPCAM_EVENT_TRIGGER_ALLOW,
            Event::Factory => sys::TOUPCAM_EVENT_FACTORY,
            Event::Unknown(code) => code,
        }
    }

    /// Events after which the camera cannot deliver any more frames.
    pub fn is_fatal(self) -> bool {
        matches!(self, Event::Error | Event::Disconnected)
    }
}

impl From<u32> for Event {
    fn from(code: u32) -> Self {
        match code {
            sys::TOUPCAM_EVENT_EXPOSURE => Event::Exposure,
            sys::TOUPCAM_EVENT_TEMPTINT => Event::TempTint,
            sys::TOUPCAM_EVENT_IMAGE => Event::Image,
            sys::TOUPCAM_EVENT_STILLIMAGE => Event::StillImage,
            sys::TOUPCAM_EVENT_WBGAIN => Event::WbGain,
            sys::TOUPCAM_EVENT_TRIGGERFAIL => Event::TriggerFail,
            sys::TOUPCAM_EVENT_BLACK => Event::Black,
            sys::TOUPCAM_EVENT_FFC => Event::Ffc,
            sys::TOUPCAM_EVENT_DFC => Event::Dfc,
            sys::TOUPCAM_EVENT_ROI => Event::Roi,
            sys::TOUPCAM_EVENT_LEVELRANGE => Event::LevelRange,
            sys::TOUPCAM_EVENT_ERROR => Event::Error,
            sys::TOUPCAM_EVENT_DISCONNECTED => Event::Disconnected,
            sys::TOUPCAM_EVENT_NOFRAMETIMEOUT => Event::NoFrameTimeout,
            sys::TOUPCAM_EVENT_AFFEEDBACK => Event::AfFeedback,
            sys::TOUPCAM_EVENT_AFPOSITION => Event::AfPosition,
            sys::TOUPCAM_EVENT_NOPACKETTIMEOUT => Event::NoPacketTimeout,
            sys::TOUPCAM_EVENT_EXPO_START => Event::ExposureStart,
            sys::TOUPCAM_EVENT_EXPO_STOP => Event::ExposureStop,
            sys::TOUPCAM_EVENT_TRIGGER_ALLOW => Event::TriggerAllow,
            sys::TOUPCAM_EVENT_FACTORY => Event::Factory,
            other => Event::Unknown(other),
        }
    }
}

/// Camera option selectors for `get_Option` / `put_Option`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Options {
    NoFrameTimeout,
    ThreadPriority,
    ProcessMode,
    /// 0 = processed RGB, 1 = raw sensor data
    Raw,
    Histogram,
    /// 0 = 8 bits, 1 = the sensor's maximum bit depth
    BitDepth,
    Fan,
    Tec,
    Linear,
    Curve,
    /// See [`TriggerMode`]
    Trigger,
    /// 0 = RGB24, 1 = RGB48, 2 = RGB32, 3 = grey8, 4 = grey16
    Rgb,
    ColorMatrix,
    WbGain,
    TecTarget,
    AutoExposurePolicy,
    FrameRate,
    Demosaic,
    DemosaicVideo,
    DemosaicStill,
    BlackLevel,
    Binning,
    Rotate,
    ConversionGain,
    PixelFormat,
    Ffc,
    Dfc,
    Sharpening,
    UpsideDown,
    Other(u32),
}

impl Options {
    pub fn code(self) -> u32 {
        match self {
            Options::NoFrameTimeout => sys::TOUPCAM_OPTION_NOFRAME_TIMEOUT,
            Options::ThreadPriority => sys::TOUPCAM_OPTION_THREAD_PRIORITY,
            Options::ProcessMode => sys::TOUPCAM_OPTION_PROCESSMODE,
            Options::Raw => sys::TOUPCAM_OPTION_RAW,
            Options::Histogram => sys::TOUPCAM_OPTION_HISTOGRAM,
            Options::BitDepth => sys::TOUPCAM_OPTION_BITDEPTH,
            Options::Fan => sys::TOUPCAM_OPTION_FAN,
            Options::Tec => sys::TOUPCAM_OPTION_TEC,
            Options::Linear => sys::TOUPCAM_OPTION_LINEAR,
            Options::Curve => sys::TOUPCAM_OPTION_CURVE,
            Options::Trigger => sys::TOUPCAM_OPTION_TRIGGER,
            Options::Rgb => sys::TOUPCAM_OPTION_RGB,
            Options::ColorMatrix => sys::TOUPCAM_OPTION_COLORMATIX,
            Options::WbGain => sys::TOUPCAM_OPTION_WBGAIN,
            Options::TecTarget => sys::TOUPCAM_OPTION_TECTARGET,
            Options::AutoExposurePolicy => sys::TOUPCAM_OPTION_AUTOEXP_POLICY,
            Options::FrameRate => sys::TOUPCAM_OPTION_FRAMERATE,
            Options::Demosaic => sys::TOUPCAM_OPTION_DEMOSAIC,
            Options::DemosaicVideo => sys::TOUPCAM_OPTION_DEMOSAIC_VIDEO,
            Options::DemosaicStill => sys::TOUPCAM_OPTION_DEMOSAIC_STILL,
            Options::BlackLevel => sys::TOUPCAM_OPTION_BLACKLEVEL,
            Options::Binning => sys::TOUPCAM_OPTION_BINNING,
            Options::Rotate => sys::TOUPCAM_OPTION_ROTATE,
            Options::ConversionGain => sys::TOUPCAM_OPTION_CG,
            Options::PixelFormat => sys::TOUPCAM_OPTION_PIXEL_FORMAT,
            Options::Ffc => sys::TOUPCAM_OPTION_FFC,
            Options::Dfc => sys::TOUPCAM_OPTION_DFC,
            Options::Sharpening => sys::TOUPCAM_OPTION_SHARPENING,
            Options::UpsideDown => sys::TOUPCAM_OPTION_UPSIDE_DOWN,
            Options::Other(code) => code,
        }
    }
}

/// Value of [`Options::Trigger`].
#[derive(clap::ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum TriggerMode {
    /// Free-running video
    Video,
    /// Frames are produced by `Camera::trigger`
    Software,
    /// Frames are produced by the external trigger input
    External,
    /// External and software triggers both fire
    Both,
}

impl From<TriggerMode> for i32 {
    fn from(mode: TriggerMode) -> Self {
        match mode {
            TriggerMode::Video => sys::TOUPCAM_TRIGGER_VIDEO,
            TriggerMode::Software => sys::TOUPCAM_TRIGGER_SOFTWARE,
            TriggerMode::External => sys::TOUPCAM_TRIGGER_EXTERNAL,
            TriggerMode::Both => sys::TOUPCAM_TRIGGER_BOTH,
        }
    }
}

impl TryFrom<i32> for TriggerMode {
    type Error = i32;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            sys::TOUPCAM_TRIGGER_VIDEO => Ok(TriggerMode::Video),
            sys::TOUPCAM_TRIGGER_SOFTWARE => Ok(TriggerMode::Software),
            sys::TOUPCAM_TRIGGER_EXTERNAL => Ok(TriggerMode::External),
            sys::TOUPCAM_TRIGGER_BOTH => Ok(TriggerMode::Both),
            other => Err(other),
        }
    }
}
