// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Toupcam-rs Contributors. All Rights Reserved.

//! Decoding of the camera enumeration structures.

use core::fmt;
use toupcam_sys::{self as sys, TChar, ToupcamDeviceV2, ToupcamModelV2, ToupcamResolution};

/// Frame size in pixels.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn pixels(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

impl From<&ToupcamResolution> for Resolution {
    fn from(res: &ToupcamResolution) -> Self {
        Self::new(res.width, res.height)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Capability bits of a camera model (`TOUPCAM_FLAG_*`).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ModelFlags(pub u64);

impl ModelFlags {
    pub const CMOS: ModelFlags = ModelFlags(sys::TOUPCAM_FLAG_CMOS);
    pub const CCD_PROGRESSIVE: ModelFlags = ModelFlags(sys::TOUPCAM_FLAG_CCD_PROGRESSIVE);
    pub const CCD_INTERLACED: ModelFlags = ModelFlags(sys::TOUPCAM_FLAG_CCD_INTERLACED);
    pub const ROI_HARDWARE: ModelFlags = ModelFlags(sys::TOUPCAM_FLAG_ROI_HARDWARE);
    pub const MONO: ModelFlags = ModelFlags(sys::TOUPCAM_FLAG_MONO);
    pub const BINSKIP_SUPPORTED: ModelFlags = ModelFlags(sys::TOUPCAM_FLAG_BINSKIP_SUPPORTED);
    pub const USB30: ModelFlags = ModelFlags(sys::TOUPCAM_FLAG_USB30);
    pub const TEC: ModelFlags = ModelFlags(sys::TOUPCAM_FLAG_TEC);
    pub const USB30_OVER_USB20: ModelFlags = ModelFlags(sys::TOUPCAM_FLAG_USB30_OVER_USB20);
    pub const ST4: ModelFlags = ModelFlags(sys::TOUPCAM_FLAG_ST4);
    pub const GET_TEMPERATURE: ModelFlags = ModelFlags(sys::TOUPCAM_FLAG_GETTEMPERATURE);
    pub const RAW10: ModelFlags = ModelFlags(sys::TOUPCAM_FLAG_RAW10);
    pub const RAW12: ModelFlags = ModelFlags(sys::TOUPCAM_FLAG_RAW12);
    pub const RAW14: ModelFlags = ModelFlags(sys::TOUPCAM_FLAG_RAW14);
    pub const RAW16: ModelFlags = ModelFlags(sys::TOUPCAM_FLAG_RAW16);
    pub const FAN: ModelFlags = ModelFlags(sys::TOUPCAM_FLAG_FAN);
    pub const TEC_ONOFF: ModelFlags = ModelFlags(sys::TOUPCAM_FLAG_TEC_ONOFF);
    pub const ISP: ModelFlags = ModelFlags(sys::TOUPCAM_FLAG_ISP);
    pub const TRIGGER_SOFTWARE: ModelFlags = ModelFlags(sys::TOUPCAM_FLAG_TRIGGER_SOFTWARE);
    pub const TRIGGER_EXTERNAL: ModelFlags = ModelFlags(sys::TOUPCAM_FLAG_TRIGGER_EXTERNAL);
    pub const TRIGGER_SINGLE: ModelFlags = ModelFlags(sys::TOUPCAM_FLAG_TRIGGER_SINGLE);
    pub const BLACKLEVEL: ModelFlags = ModelFlags(sys::TOUPCAM_FLAG_BLACKLEVEL);
    pub const AUTO_FOCUS: ModelFlags = ModelFlags(sys::TOUPCAM_FLAG_AUTO_FOCUS);
    pub const BUFFER: ModelFlags = ModelFlags(sys::TOUPCAM_FLAG_BUFFER);
    pub const DDR: ModelFlags = ModelFlags(sys::TOUPCAM_FLAG_DDR);
    pub const CG: ModelFlags = ModelFlags(sys::TOUPCAM_FLAG_CG);
    pub const RGB888: ModelFlags = ModelFlags(sys::TOUPCAM_FLAG_RGB888);
    pub const RAW8: ModelFlags = ModelFlags(sys::TOUPCAM_FLAG_RAW8);
    pub const GLOBAL_SHUTTER: ModelFlags = ModelFlags(sys::TOUPCAM_FLAG_GLOBALSHUTTER);

    pub fn contains(self, other: ModelFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_mono(self) -> bool {
        self.contains(Self::MONO)
    }

    pub fn has_trigger_software(self) -> bool {
        self.contains(Self::TRIGGER_SOFTWARE)
    }

    pub fn has_trigger_external(self) -> bool {
        self.contains(Self::TRIGGER_EXTERNAL)
    }
}

impl fmt::Display for ModelFlags {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

/// Capability model shared by every camera of the same product.
#[derive(Clone, Debug, PartialEq)]
pub struct Model {
    pub name: String,
    pub flags: ModelFlags,
    /// Highest speed level, the valid range is `0..=max_speed`
    pub max_speed: u32,
    /// Number of preview resolutions
    pub preview: u32,
    /// Number of still resolutions
    pub still: u32,
    pub max_fan_speed: u32,
    pub io_control: u32,
    /// Physical pixel size in micrometers (x, y)
    pub pixel_size: (f32, f32),
    pub resolutions: Vec<Resolution>,
}

impl Model {
    /// Copies a native model descriptor.
    ///
    /// Only the first `max(preview, still)` resolution slots are populated
    /// by the SDK, clamped to the array size.
    ///
    /// # Safety
    ///
    /// `model.name` must be NULL or point to a NUL-terminated string that
    /// stays valid for the duration of the call.
    pub unsafe fn from_raw(model: &ToupcamModelV2) -> Self {
        let count = (model.preview.max(model.still) as usize).min(sys::TOUPCAM_MAX_RES);
        Self {
            name: string_from_tchar_ptr(model.name),
            flags: ModelFlags(model.flag),
            max_speed: model.maxspeed,
            preview: model.preview,
            still: model.still,
            max_fan_speed: model.maxfanspeed,
            io_control: model.ioctrol,
            pixel_size: (model.xpixsz, model.ypixsz),
            resolutions: model.res[..count].iter().map(Resolution::from).collect(),
        }
    }
}

/// One enumerated camera.
#[derive(Clone, Debug, PartialEq)]
pub struct DeviceInfo {
    /// Name shown to users, e.g. in a device list
    pub display_name: String,
    /// Unique id to pass to `Sdk::open`
    pub id: String,
    pub model: Option<Model>,
}

impl DeviceInfo {
    /// Copies a native device entry and the model it points to.
    ///
    /// # Safety
    ///
    /// `dev.model` must be NULL or point to a valid `ToupcamModelV2`, which
    /// the SDK guarantees for entries filled by `Toupcam_EnumV2`.
    pub unsafe fn from_raw(dev: &ToupcamDeviceV2) -> Self {
        let model = if dev.model.is_null() {
            None
        } else {
            Some(Model::from_raw(&*dev.model))
        };
        Self {
            display_name: string_from_tchars(&dev.displayname),
            id: string_from_tchars(&dev.id),
            model,
        }
    }
}

impl fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} [{}]", self.display_name, self.id)?;
        if let Some(model) = &self.model {
            write!(f, " model: {} flags: {}", model.name, model.flags)?;
        }
        Ok(())
    }
}

/// Decodes a fixed-size SDK character array up to the first NUL.
pub fn string_from_tchars(chars: &[TChar]) -> String {
    let len = chars.iter().position(|&c| c == 0).unwrap_or(chars.len());
    decode_tchars(&chars[..len])
}

/// Decodes a NUL-terminated SDK string, returning an empty string for NULL.
///
/// # Safety
///
/// `ptr` must be NULL or point to a NUL-terminated string.
pub unsafe fn string_from_tchar_ptr(ptr: *const TChar) -> String {
    if ptr.is_null() {
        return String::new();
    }
    let mut len = 0;
    while *ptr.add(len) != 0 {
        len += 1;
    }
    decode_tchars(std::slice::from_raw_parts(ptr, len))
}

#[cfg(windows)]
fn decode_tchars(chars: &[TChar]) -> String {
    String::from_utf16_lossy(chars)
}

#[cfg(not(windows))]
fn decode_tchars(chars: &[TChar]) -> String {
    let bytes: Vec<u8> = chars.iter().map(|&c| c as u8).collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Encodes a string for SDK calls taking `const TChar*`, NUL terminated.
#[cfg(windows)]
pub(crate) fn encode_tchars(s: &str) -> Option<Vec<TChar>> {
    if s.contains('\0') {
        return None;
    }
    Some(s.encode_utf16().chain(std::iter::once(0)).collect())
}

#[cfg(not(windows))]
pub(crate) fn encode_tchars(s: &str) -> Option<Vec<TChar>> {
    if s.contains('\0') {
        return None;
    }
    Some(
        s.bytes()
            .map(|b| b as TChar)
            .chain(std::iter::once(0))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_rejects_nul() {
        assert!(encode_tchars("bad\0id").is_none());
        assert!(encode_tchars("\0").is_none());
    }

    #[test]
    fn test_encode_terminated() {
        let chars = encode_tchars("tp-1234").unwrap();
        assert_eq!(chars.len(), "tp-1234".len() + 1);
        assert_eq!(chars.last(), Some(&0));
        assert_eq!(string_from_tchars(&chars), "tp-1234");

        assert_eq!(encode_tchars("").unwrap(), [0 as TChar]);
    }
}
