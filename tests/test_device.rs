// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Toupcam-rs Contributors. All Rights Reserved.

use toupcam::{
    device::{string_from_tchar_ptr, string_from_tchars},
    DeviceInfo, Model, ModelFlags, Resolution,
};
use toupcam_sys::{
    TChar, ToupcamDeviceV2, ToupcamModelV2, ToupcamResolution, TOUPCAM_FLAG_MONO,
    TOUPCAM_FLAG_TRIGGER_SOFTWARE, TOUPCAM_MAX_RES,
};

fn tchars(s: &str) -> Vec<TChar> {
    s.bytes()
        .map(|b| b as TChar)
        .chain(std::iter::once(0))
        .collect()
}

fn fill<const N: usize>(s: &str) -> [TChar; N] {
    let mut out = [0 as TChar; N];
    for (dst, b) in out.iter_mut().zip(s.bytes()) {
        *dst = b as TChar;
    }
    out
}

fn model(name: &[TChar], preview: u32, still: u32) -> ToupcamModelV2 {
    let mut res = [ToupcamResolution {
        width: 0,
        height: 0,
    }; TOUPCAM_MAX_RES];
    for (i, r) in res.iter_mut().enumerate() {
        r.width = 4096 >> i;
        r.height = 3072 >> i;
    }
    ToupcamModelV2 {
        name: name.as_ptr(),
        flag: TOUPCAM_FLAG_MONO | TOUPCAM_FLAG_TRIGGER_SOFTWARE,
        maxspeed: 2,
        preview,
        still,
        maxfanspeed: 0,
        ioctrol: 4,
        xpixsz: 2.4,
        ypixsz: 2.4,
        res,
    }
}

#[test]
fn test_model_decode() {
    let name = tchars("MU1200");
    let raw = model(&name, 3, 2);
    let model = unsafe { Model::from_raw(&raw) };

    assert_eq!(model.name, "MU1200");
    assert!(model.flags.is_mono());
    assert!(model.flags.has_trigger_software());
    assert!(!model.flags.has_trigger_external());
    assert_eq!(model.max_speed, 2);
    assert_eq!(model.io_control, 4);
    assert_eq!(model.pixel_size, (2.4, 2.4));
    assert_eq!(
        model.resolutions,
        vec![
            Resolution::new(4096, 3072),
            Resolution::new(2048, 1536),
            Resolution::new(1024, 768),
        ]
    );
}

#[test]
fn test_model_resolutions_use_larger_count() {
    let name = tchars("still-heavy");
    let model = unsafe { Model::from_raw(&model(&name, 1, 4)) };
    assert_eq!(model.resolutions.len(), 4);
}

#[test]
fn test_model_resolution_count_clamped() {
    let name = tchars("bogus");
    let model = unsafe { Model::from_raw(&model(&name, 200, 0)) };
    assert_eq!(model.resolutions.len(), TOUPCAM_MAX_RES);
}

#[test]
fn test_device_decode() {
    let name = tchars("GPCMOS02000KPA");
    let raw_model = model(&name, 2, 2);
    let raw = ToupcamDeviceV2 {
        displayname: fill::<64>("GPCMOS02000KPA"),
        id: fill::<64>("tp-1-2-1547-3214"),
        model: &raw_model,
    };
    let dev = unsafe { DeviceInfo::from_raw(&raw) };

    assert_eq!(dev.display_name, "GPCMOS02000KPA");
    assert_eq!(dev.id, "tp-1-2-1547-3214");
    let model = dev.model.as_ref().expect("model decoded");
    assert_eq!(model.name, "GPCMOS02000KPA");
    assert_eq!(model.resolutions.len(), 2);

    let text = dev.to_string();
    assert!(text.contains("tp-1-2-1547-3214"), "{}", text);
}

#[test]
fn test_device_without_model() {
    let raw = ToupcamDeviceV2 {
        displayname: fill::<64>("cam"),
        id: fill::<64>("id0"),
        ..Default::default()
    };
    let dev = unsafe { DeviceInfo::from_raw(&raw) };
    assert_eq!(dev.display_name, "cam");
    assert!(dev.model.is_none());
    assert_eq!(dev.to_string(), "cam [id0]");
}

#[test]
fn test_name_without_terminator() {
    let full = "x".repeat(64);
    let chars = fill::<64>(&full);
    assert_eq!(string_from_tchars(&chars), full);

    let empty = [0 as TChar; 8];
    assert_eq!(string_from_tchars(&empty), "");
}

#[test]
fn test_null_string_pointer() {
    assert_eq!(unsafe { string_from_tchar_ptr(std::ptr::null()) }, "");
    let s = tchars("59.60.20250101");
    assert_eq!(unsafe { string_from_tchar_ptr(s.as_ptr()) }, "59.60.20250101");
}

#[test]
fn test_resolution() {
    let res = Resolution::new(1920, 1080);
    assert_eq!(res.pixels(), 2_073_600);
    assert_eq!(res.to_string(), "1920x1080");
    assert_eq!(
        Resolution::from(&ToupcamResolution {
            width: 640,
            height: 480
        }),
        Resolution::new(640, 480)
    );
}

#[test]
fn test_model_flags() {
    let flags = ModelFlags(TOUPCAM_FLAG_MONO);
    assert!(flags.contains(ModelFlags::MONO));
    assert!(!flags.contains(ModelFlags::TEC));
    assert_eq!(flags.to_string(), "0x10");
    assert!(!ModelFlags::default().is_mono());
}
