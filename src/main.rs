// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Toupcam-rs Contributors. All Rights Reserved.

mod args;

use args::{Args, CameraArgs, Command, StreamArgs, StreamMode};
use clap::Parser;
use serde_json::json;
use std::{
    error::Error,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
    time::{Duration, Instant},
};
use toupcam::{encode_jpeg, Camera, Event, FnListener, Frame, FrameRef, Sdk, TriggerMode};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{filter::LevelFilter, layer::SubscriberExt, EnvFilter};

const STILL_TIMEOUT: Duration = Duration::from_secs(10);

fn init_tracing(args: &Args) -> Result<(), Box<dyn Error>> {
    let level = if args.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer());

    #[cfg(unix)]
    let subscriber = subscriber.with(if args.journald {
        match tracing_journald::layer() {
            Ok(layer) => Some(layer),
            Err(e) => {
                eprintln!("journald unavailable: {e}");
                None
            }
        }
    } else {
        None
    });

    tracing::subscriber::set_global_default(subscriber)?;
    tracing_log::LogTracer::init()?;
    Ok(())
}

fn update_fps(prev: &mut Instant, history: &mut [i64], index: &mut usize) -> i64 {
    let now = Instant::now();

    let elapsed = now.duration_since(*prev);
    *prev = now;

    history[*index] = 1e9 as i64 / elapsed.as_nanos().max(1) as i64;
    *index = (*index + 1) % history.len();

    (history.iter().sum::<i64>() as f64 / history.len() as f64).round() as i64
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_tracing(&args)?;

    let sdk = Sdk::load(args.library.as_deref())?;

    match args.command {
        Command::List { json } => list(&sdk, json),
        Command::Info { camera } => show_info(&sdk, &camera),
        Command::Stream { camera, stream } => run_stream(&sdk, &camera, &stream).await,
        Command::Snap {
            camera,
            still_resolution,
            count,
            output,
            jpeg_quality,
            raw,
        } => {
            let save = SaveOptions {
                quality: jpeg_quality,
                raw,
            };
            run_snap(&sdk, &camera, still_resolution, count, &output, save).await
        }
        Command::Watch => watch(&sdk).await,
    }
}

fn list(sdk: &Sdk, as_json: bool) -> Result<(), Box<dyn Error>> {
    let devices = sdk.enumerate();

    if as_json {
        let devices: Vec<_> = devices
            .iter()
            .map(|dev| {
                json!({
                    "id": dev.id,
                    "name": dev.display_name,
                    "model": dev.model.as_ref().map(|model| json!({
                        "name": model.name,
                        "flags": model.flags.0,
                        "mono": model.flags.is_mono(),
                        "max_speed": model.max_speed,
                        "preview": model.preview,
                        "still": model.still,
                        "pixel_size": [model.pixel_size.0, model.pixel_size.1],
                        "resolutions": model.resolutions.iter().map(|r| json!({
                            "width": r.width,
                            "height": r.height,
                        })).collect::<Vec<_>>(),
                    })),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&devices)?);
        return Ok(());
    }

    if devices.is_empty() {
        println!("no cameras found");
    }
    for (index, dev) in devices.iter().enumerate() {
        println!("#{index} {dev}");
        if let Some(model) = &dev.model {
            for (i, res) in model.resolutions.iter().enumerate() {
                println!("    [{i}] {res}");
            }
        }
    }
    Ok(())
}

/// Opens the selected camera and applies the requested settings.
fn open_camera(sdk: &Arc<Sdk>, args: &CameraArgs) -> Result<Camera, Box<dyn Error>> {
    let cam = sdk.open(args.camera.as_deref())?;

    if let Some(index) = args.resolution {
        cam.set_resolution(index)?;
    }
    let size = cam.size()?;
    info!("camera resolution {}", size);

    if let Some(mode) = args.trigger {
        cam.set_trigger_mode(mode)?;
        info!("trigger mode {:?}", mode);
    }

    if let Some(exposure) = args.exposure {
        cam.set_auto_exposure(false)?;
        cam.set_exposure_time(exposure)?;
        let actual = cam.exposure_time()?;
        if actual != exposure {
            warn!(
                "requested {}us exposure but camera set {}us",
                exposure, actual
            );
        }
    }

    if let Some(gain) = args.gain {
        cam.set_gain(gain)?;
    }

    Ok(cam)
}

fn show_info(sdk: &Arc<Sdk>, args: &CameraArgs) -> Result<(), Box<dyn Error>> {
    let cam = open_camera(sdk, args)?;

    println!("SDK:         {} ({})", sdk.version(), sdk.path().display());
    println!("Serial:      {}", cam.serial_number()?);
    println!("Firmware:    {}", cam.fw_version()?);
    println!("Hardware:    {}", cam.hw_version()?);
    println!("Raw format:  {}", cam.raw_format()?);
    println!(
        "Resolution:  [{}] {}",
        cam.current_resolution_index()?,
        cam.size()?
    );

    println!("Preview resolutions:");
    for (i, res) in cam.resolutions()?.iter().enumerate() {
        println!("    [{i}] {res}");
    }
    println!("Still resolutions:");
    for (i, res) in cam.still_resolutions()?.iter().enumerate() {
        println!("    [{i}] {res}");
    }

    let range = cam.exposure_range()?;
    println!(
        "Exposure:    {}us ({}..{}, default {}) auto={}",
        cam.exposure_time()?,
        range.min,
        range.max,
        range.default,
        cam.auto_exposure()?
    );
    println!("Gain:        {}%", cam.gain()?);
    println!("Trigger:     {:?}", cam.trigger_mode()?);

    match cam.temperature() {
        Ok(t) => println!("Temperature: {:.1}C", t as f32 / 10.0),
        Err(e) => debug!("temperature unavailable: {}", e),
    }

    Ok(())
}

/// Per-stream bookkeeping: frame counting, fps, still requests and saving.
struct Recorder<'a> {
    args: &'a StreamArgs,
    software_trigger: bool,
    prev: Instant,
    history: Vec<i64>,
    index: usize,
    frames: u64,
    stills: u64,
}

impl<'a> Recorder<'a> {
    fn new(args: &'a StreamArgs, software_trigger: bool) -> Self {
        Self {
            args,
            software_trigger,
            prev: Instant::now(),
            history: vec![0; 30],
            index: 0,
            frames: 0,
            stills: 0,
        }
    }

    fn save_options(&self) -> SaveOptions {
        SaveOptions {
            quality: self.args.jpeg_quality,
            raw: self.args.raw,
        }
    }

    fn done(&self) -> bool {
        self.args.frames.is_some_and(|max| self.frames >= max)
    }

    /// Requests the first frame when the camera waits for software triggers.
    fn arm(&self, cam: &Camera) -> Result<(), Box<dyn Error>> {
        if self.software_trigger {
            cam.trigger(self.args.trigger_count)?;
        }
        Ok(())
    }

    fn on_frame(&mut self, cam: &Camera, frame: Frame) -> Result<(), Box<dyn Error>> {
        if frame.is_still() {
            self.stills += 1;
            info!("still #{} {}", self.stills, frame);
            let path = self.args.output.join(format!("still_{:04}.jpg", self.stills));
            save_in_background(frame, path, self.save_options());
            return Ok(());
        }

        self.frames += 1;
        let fps = update_fps(&mut self.prev, &mut self.history, &mut self.index);
        debug!("frame #{} {} fps: {}", self.frames, frame, fps);

        if let Some(every) = self.args.save_every {
            if every > 0 && self.frames % every == 0 {
                let path = self
                    .args
                    .output
                    .join(format!("frame_{:06}.jpg", self.frames));
                save_in_background(frame, path, self.save_options());
            }
        }

        if let Some(index) = self.args.snap {
            let interval = self.args.snap_interval.max(1);
            if self.frames % interval == 0 {
                cam.snap(index)?;
            }
        }

        if self.software_trigger && self.frames % u64::from(self.args.trigger_count.max(1)) == 0
        {
            cam.trigger(self.args.trigger_count)?;
        }

        Ok(())
    }
}

#[derive(Copy, Clone, Debug)]
struct SaveOptions {
    quality: i32,
    /// Also dump the pixel buffer next to the JPEG
    raw: bool,
}

// JPEG encoding lives on the blocking pool since it can be slower than the
// camera's frame rate.
fn save_in_background(frame: Frame, path: PathBuf, save: SaveOptions) {
    tokio::task::spawn_blocking(move || {
        if let Err(e) = save_frame(&frame, &path, save) {
            error!("failed to save {}: {}", path.display(), e);
        }
    });
}

fn save_frame(frame: &Frame, path: &Path, save: SaveOptions) -> Result<(), Box<dyn Error>> {
    save_jpeg(frame, path, save.quality)?;
    if save.raw {
        save_raw(frame, &raw_path(path, frame))?;
    }
    Ok(())
}

/// `dir/frame_000010.jpg` becomes `dir/frame_000010_640x480_rgb.raw` so the
/// file can be read back without a header.
fn raw_path(jpeg: &Path, frame: &Frame) -> PathBuf {
    let stem = jpeg
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "frame".to_string());
    let layout = format!("{:?}", frame.layout()).to_lowercase();
    jpeg.with_file_name(format!(
        "{}_{}x{}_{}.raw",
        stem,
        frame.width(),
        frame.height(),
        layout
    ))
}

fn save_raw(frame: &Frame, path: &Path) -> Result<(), Box<dyn Error>> {
    fs::write(path, frame.as_bytes())?;
    debug!(
        "saved {} {}KB {}bit",
        path.display(),
        frame.size() / 1024,
        frame.bits()
    );
    Ok(())
}

fn save_jpeg(frame: &Frame, path: &Path, quality: i32) -> Result<(), Box<dyn Error>> {
    let now = Instant::now();
    let jpeg = encode_jpeg(frame, quality)?;
    fs::write(path, &jpeg)?;
    debug!(
        "saved {} {}KB encode: {:?}",
        path.display(),
        jpeg.len() / 1024,
        now.elapsed()
    );
    Ok(())
}

async fn run_stream(
    sdk: &Arc<Sdk>,
    cam_args: &CameraArgs,
    args: &StreamArgs,
) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(&args.output)?;
    let cam = open_camera(sdk, cam_args)?;
    let software_trigger = cam.trigger_mode()? == TriggerMode::Software;
    let mut recorder = Recorder::new(args, software_trigger);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    match args.mode {
        StreamMode::Push => {
            let (tx, rx) = kanal::bounded::<Frame>(4);
            cam.start_push(FnListener(move |frame: FrameRef<'_>| {
                match tx.try_send(frame.to_owned()) {
                    Ok(true) => {}
                    Ok(false) => debug!("frame queue full, dropping {}", frame.header()),
                    Err(e) => debug!("frame queue closed: {}", e),
                }
            }))?;
            recorder.arm(&cam)?;
            let rx = rx.to_async();

            while !recorder.done() {
                tokio::select! {
                    _ = &mut ctrl_c => break,
                    frame = rx.recv() => match frame {
                        Ok(frame) => recorder.on_frame(&cam, frame)?,
                        Err(e) => {
                            error!("frame queue closed: {}", e);
                            break;
                        }
                    },
                }
            }
        }
        StreamMode::Pull => {
            let events = cam.start_pull(args.event_queue)?.to_async();
            recorder.arm(&cam)?;

            while !recorder.done() {
                let event = tokio::select! {
                    _ = &mut ctrl_c => break,
                    event = events.recv() => match event {
                        Ok(event) => event,
                        Err(e) => {
                            error!("event queue closed: {}", e);
                            break;
                        }
                    },
                };

                match event {
                    Event::Image => {
                        let (frame, meta) = cam.pull_image_with_info(args.bits)?;
                        debug!("seq {} timestamp {}us", meta.seq, meta.timestamp);
                        recorder.on_frame(&cam, frame)?;
                    }
                    Event::StillImage => {
                        let frame = cam.pull_still_image(args.bits)?;
                        recorder.on_frame(&cam, frame)?;
                    }
                    event if event.is_fatal() => {
                        error!("camera reported {:?}, stopping", event);
                        break;
                    }
                    event => debug!("event {:?}", event),
                }
            }
        }
    }

    cam.stop_streaming()?;
    info!(
        "captured {} frame(s) and {} still(s)",
        recorder.frames, recorder.stills
    );
    Ok(())
}

async fn run_snap(
    sdk: &Arc<Sdk>,
    cam_args: &CameraArgs,
    still_resolution: u32,
    count: u32,
    output: &Path,
    save: SaveOptions,
) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(output)?;
    let cam = open_camera(sdk, cam_args)?;

    let (tx, rx) = kanal::bounded::<Frame>(count.max(1) as usize);
    cam.start_push(FnListener(move |frame: FrameRef<'_>| {
        if frame.is_still() {
            if let Err(e) = tx.try_send(frame.to_owned()) {
                debug!("still queue closed: {}", e);
            }
        }
    }))?;
    let rx = rx.to_async();

    for n in 1..=count {
        cam.snap(still_resolution)?;
        let frame = match tokio::time::timeout(STILL_TIMEOUT, rx.recv()).await {
            Ok(Ok(frame)) => frame,
            Ok(Err(e)) => {
                error!("still queue closed: {}", e);
                break;
            }
            Err(_) => {
                error!("no still received within {:?}", STILL_TIMEOUT);
                break;
            }
        };
        let path = output.join(format!("snap_{:04}.jpg", n));
        info!("still #{} {} -> {}", n, frame, path.display());
        tokio::task::spawn_blocking(move || {
            save_frame(&frame, &path, save).map_err(|e| e.to_string())
        })
        .await??;
    }

    cam.stop_streaming()?;
    Ok(())
}

async fn watch(sdk: &Sdk) -> Result<(), Box<dyn Error>> {
    let (tx, rx) = kanal::bounded::<()>(1);
    sdk.set_hotplug(Some(move || {
        let _ = tx.try_send(());
    }))?;
    let rx = rx.to_async();

    info!("{} camera(s) connected, waiting for changes", sdk.count_connected());
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            changed = rx.recv() => {
                if changed.is_err() {
                    break;
                }
                let devices = sdk.enumerate();
                info!("hotplug: {} camera(s) connected", devices.len());
                for dev in &devices {
                    info!("    {}", dev);
                }
            }
        }
    }

    sdk.set_hotplug(None::<fn()>)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use toupcam::PixelLayout;

    #[test]
    fn test_raw_path() {
        let frame = Frame::new(4, 2, PixelLayout::Bgra, vec![0; 32]).unwrap();
        assert_eq!(
            raw_path(Path::new("out/frame_000010.jpg"), &frame),
            Path::new("out/frame_000010_4x2_bgra.raw")
        );
    }

    #[test]
    fn test_save_raw_next_to_jpeg() {
        let dir = std::env::temp_dir().join(format!("toupcam-raw-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let data: Vec<u8> = (0..16 * 8 * 3).map(|i| (i % 251) as u8).collect();
        let frame = Frame::new(16, 8, PixelLayout::Rgb, data.clone()).unwrap();
        let jpeg = dir.join("snap_0001.jpg");

        let save = SaveOptions {
            quality: 80,
            raw: true,
        };
        save_frame(&frame, &jpeg, save).unwrap();
        assert!(jpeg.exists());
        let raw = fs::read(dir.join("snap_0001_16x8_rgb.raw")).unwrap();
        assert_eq!(raw, data);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_raw_flag() {
        let args = Args::try_parse_from(["toupcam", "snap", "--raw"]).unwrap();
        assert!(matches!(args.command, Command::Snap { raw: true, .. }));

        let args =
            Args::try_parse_from(["toupcam", "stream", "--raw", "--save-every", "5"]).unwrap();
        match args.command {
            Command::Stream { stream, .. } => {
                assert!(stream.raw);
                assert_eq!(stream.save_every, Some(5));
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
