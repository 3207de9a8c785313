// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Toupcam-rs Contributors. All Rights Reserved.

use toupcam::{error::check, Error, Event, HResult, Options, TriggerMode};
use toupcam_sys as sys;

#[test]
fn test_hresult_names() {
    assert_eq!(HResult::S_OK.name(), Some("S_OK"));
    assert_eq!(HResult(sys::E_INVALIDARG).name(), Some("E_INVALIDARG"));
    assert_eq!(HResult(-12345).name(), None);

    assert_eq!(HResult(sys::E_NOTIMPL).to_string(), "E_NOTIMPL (0x80004001)");
    assert_eq!(HResult(-12345).to_string(), "0xffffcfc7");
}

#[test]
fn test_hresult_success() {
    assert!(HResult::S_OK.is_success());
    assert!(HResult::S_FALSE.is_success());
    assert!(HResult(42).is_success());
    assert!(!HResult(sys::E_FAIL).is_success());
}

#[test]
fn test_check() {
    assert_eq!(check("Toupcam_Stop", sys::S_OK).unwrap(), HResult::S_OK);
    assert_eq!(check("Toupcam_Pause", sys::S_FALSE).unwrap(), HResult::S_FALSE);

    let err = check("Toupcam_put_Size", sys::E_INVALIDARG).unwrap_err();
    match &err {
        Error::Sdk { call, code } => {
            assert_eq!(*call, "Toupcam_put_Size");
            assert_eq!(*code, HResult(sys::E_INVALIDARG));
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert_eq!(
        err.to_string(),
        "Toupcam_put_Size failed: E_INVALIDARG (0x80070057)"
    );
}

#[test]
fn test_event_codes() {
    assert_eq!(Event::from(sys::TOUPCAM_EVENT_IMAGE), Event::Image);
    assert_eq!(Event::from(sys::TOUPCAM_EVENT_STILLIMAGE), Event::StillImage);
    assert_eq!(
        Event::from(sys::TOUPCAM_EVENT_DISCONNECTED),
        Event::Disconnected
    );
    assert_eq!(Event::from(0xdead), Event::Unknown(0xdead));

    for code in [0x0001, 0x0004, 0x0005, 0x0080, 0x0081, 0x0082, 0xdead] {
        assert_eq!(Event::from(code).code(), code);
    }
}

#[test]
fn test_fatal_events() {
    assert!(Event::Error.is_fatal());
    assert!(Event::Disconnected.is_fatal());
    assert!(!Event::Image.is_fatal());
    assert!(!Event::NoFrameTimeout.is_fatal());
}

#[test]
fn test_option_codes() {
    assert_eq!(Options::Trigger.code(), sys::TOUPCAM_OPTION_TRIGGER);
    assert_eq!(Options::Raw.code(), sys::TOUPCAM_OPTION_RAW);
    assert_eq!(Options::Other(0x77).code(), 0x77);
}

#[test]
fn test_trigger_modes() {
    for mode in [
        TriggerMode::Video,
        TriggerMode::Software,
        TriggerMode::External,
        TriggerMode::Both,
    ] {
        let raw = i32::from(mode);
        assert_eq!(TriggerMode::try_from(raw), Ok(mode));
    }
    assert_eq!(i32::from(TriggerMode::Software), 1);
    assert_eq!(TriggerMode::try_from(9), Err(9));
}
