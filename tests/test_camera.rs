// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Toupcam-rs Contributors. All Rights Reserved.

//! Tests against a real SDK and camera. They are ignored by default; run with
//! `TOUPCAM_LIBRARY=/path/to/libtoupcam.so cargo test -- --include-ignored`.

use serial_test::serial;
use std::{
    error::Error,
    path::PathBuf,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    thread,
    time::{Duration, Instant},
};
use toupcam::{Event, FnListener, FrameRef, Sdk, TriggerMode};

fn load() -> Result<Arc<Sdk>, Box<dyn Error>> {
    let path = std::env::var_os("TOUPCAM_LIBRARY").map(PathBuf::from);
    Ok(Sdk::load(path.as_deref())?)
}

#[test]
#[serial]
fn test_missing_library() {
    let res = Sdk::load(Some(std::path::Path::new("/nonexistent/libtoupcam.so")));
    assert!(matches!(res, Err(toupcam::Error::Load(_))));
}

#[test]
#[serial]
#[ignore = "camera test is disabled by default (run with --include-ignored to enable)"]
fn test_enumerate() -> Result<(), Box<dyn Error>> {
    let sdk = load()?;
    println!("SDK {}", sdk.version());

    let devices = sdk.enumerate();
    assert_eq!(devices.len(), sdk.count_connected());
    assert!(!devices.is_empty(), "no camera connected");
    for dev in &devices {
        println!("{}", dev);
        assert!(!dev.id.is_empty());
    }
    Ok(())
}

#[test]
#[serial]
#[ignore = "camera test is disabled by default (run with --include-ignored to enable)"]
fn test_resolutions() -> Result<(), Box<dyn Error>> {
    let sdk = load()?;
    let cam = sdk.open(None)?;

    let count = cam.resolution_count()?;
    assert!(count > 0);
    let resolutions = cam.resolutions()?;
    assert_eq!(resolutions.len(), count as usize);

    let last = count - 1;
    cam.set_resolution(last)?;
    assert_eq!(cam.current_resolution_index()?, last);
    assert_eq!(cam.size()?, resolutions[last as usize]);
    println!("raw format {}", cam.raw_format()?);
    Ok(())
}

#[test]
#[serial]
#[ignore = "camera test is disabled by default (run with --include-ignored to enable)"]
fn test_push_mode() -> Result<(), Box<dyn Error>> {
    let sdk = load()?;
    let cam = sdk.open(None)?;
    let size = cam.final_size()?;

    let frames = Arc::new(AtomicUsize::new(0));
    let counter = frames.clone();
    cam.start_push(FnListener(move |frame: FrameRef<'_>| {
        assert_eq!(frame.width(), size.width);
        assert_eq!(frame.height(), size.height);
        counter.fetch_add(1, Ordering::SeqCst);
    }))?;
    assert!(cam.is_streaming());

    let start = Instant::now();
    while frames.load(Ordering::SeqCst) < 5 && start.elapsed() < Duration::from_secs(10) {
        thread::sleep(Duration::from_millis(10));
    }
    cam.stop_streaming()?;
    assert!(!cam.is_streaming());
    assert!(frames.load(Ordering::SeqCst) >= 5);

    // restart reuses the cached listener
    let before = frames.load(Ordering::SeqCst);
    cam.restart_streaming()?;
    thread::sleep(Duration::from_secs(1));
    cam.stop_streaming()?;
    assert!(frames.load(Ordering::SeqCst) > before);
    Ok(())
}

#[test]
#[serial]
#[ignore = "camera test is disabled by default (run with --include-ignored to enable)"]
fn test_pull_mode() -> Result<(), Box<dyn Error>> {
    let sdk = load()?;
    let cam = sdk.open(None)?;
    let events = cam.start_pull(8)?;
    assert!(matches!(
        cam.start_pull(8),
        Err(toupcam::Error::AlreadyStreaming)
    ));

    let mut pulled = 0;
    let start = Instant::now();
    while pulled < 3 && start.elapsed() < Duration::from_secs(10) {
        match events.recv_timeout(Duration::from_secs(2)) {
            Ok(Event::Image) => {
                let (frame, info) = cam.pull_image_with_info(24)?;
                println!("{} seq {}", frame, info.seq);
                assert_eq!(frame.width(), info.width);
                pulled += 1;
            }
            Ok(event) => println!("event {:?}", event),
            Err(e) => println!("no event: {}", e),
        }
    }
    cam.stop_streaming()?;
    assert_eq!(pulled, 3);
    Ok(())
}

#[test]
#[serial]
#[ignore = "camera test is disabled by default (run with --include-ignored to enable)"]
fn test_pause_resume() -> Result<(), Box<dyn Error>> {
    let sdk = load()?;
    let cam = sdk.open(None)?;
    let _events = cam.start_pull(8)?;

    cam.pause_streaming()?;
    assert!(!cam.is_streaming());
    cam.resume_streaming()?;
    assert!(cam.is_streaming());

    cam.stop_streaming()?;
    Ok(())
}

#[test]
#[serial]
#[ignore = "camera test is disabled by default (run with --include-ignored to enable)"]
fn test_snap_still() -> Result<(), Box<dyn Error>> {
    let sdk = load()?;
    let cam = sdk.open(None)?;
    if cam.still_resolution_count()? == 0 {
        return Ok(());
    }
    let expected = cam.still_resolution(0)?;
    let events = cam.start_pull(8)?;
    cam.snap(0)?;

    let start = Instant::now();
    let mut still = None;
    while still.is_none() && start.elapsed() < Duration::from_secs(10) {
        if let Ok(Event::StillImage) = events.recv_timeout(Duration::from_secs(1)) {
            still = Some(cam.pull_still_image(24)?);
        }
    }
    cam.stop_streaming()?;

    let still = still.ok_or("no still received")?;
    assert!(still.is_still());
    assert_eq!((still.width(), still.height()), (expected.width, expected.height));
    Ok(())
}

#[test]
#[serial]
#[ignore = "camera test is disabled by default (run with --include-ignored to enable)"]
fn test_trigger_mode() -> Result<(), Box<dyn Error>> {
    let sdk = load()?;
    let cam = sdk.open(None)?;

    cam.set_trigger_mode(TriggerMode::Software)?;
    assert_eq!(cam.trigger_mode()?, TriggerMode::Software);
    cam.set_trigger_mode(TriggerMode::Video)?;
    assert_eq!(cam.trigger_mode()?, TriggerMode::Video);
    Ok(())
}

#[test]
#[serial]
#[ignore = "camera test is disabled by default (run with --include-ignored to enable)"]
fn test_exposure() -> Result<(), Box<dyn Error>> {
    let sdk = load()?;
    let cam = sdk.open(None)?;

    let range = cam.exposure_range()?;
    assert!(range.min <= range.default && range.default <= range.max);

    cam.set_auto_exposure(false)?;
    assert!(!cam.auto_exposure()?);
    let target = range.min.max(10_000).min(range.max);
    cam.set_exposure_time(target)?;
    let actual = cam.exposure_time()?;
    assert!(actual.abs_diff(target) <= target / 10, "{} vs {}", actual, target);

    println!(
        "serial {} fw {} hw {}",
        cam.serial_number()?,
        cam.fw_version()?,
        cam.hw_version()?
    );
    Ok(())
}
