// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Toupcam-rs Contributors. All Rights Reserved.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use toupcam::TriggerMode;

/// Frame delivery mode.
#[derive(clap::ValueEnum, Clone, Debug, PartialEq, Copy)]
pub enum StreamMode {
    /// SDK calls back with every frame
    Push,
    /// SDK signals events and frames are pulled on demand
    Pull,
}

/// Command-line arguments for the Toupcam capture tool.
///
/// Every option can also be given through the environment.
///
/// # Example
///
/// ```bash
/// # List cameras as JSON
/// toupcam list --json
///
/// # Stream 100 frames from the first camera, saving every 10th as JPEG
/// toupcam stream --frames 100 --save-every 10 --output ./captures
///
/// # Via environment variables
/// export TOUPCAM_LIBRARY=/opt/toupcam/libtoupcam.so
/// export MODE=pull
/// toupcam stream
/// ```
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the Toupcam SDK shared library
    #[arg(long, env = "TOUPCAM_LIBRARY", global = true)]
    pub library: Option<PathBuf>,

    /// Enable verbose debug logging
    #[arg(short, long, env = "VERBOSE", global = true)]
    pub verbose: bool,

    /// Also send logs to the systemd journal
    #[arg(long, env = "JOURNALD", global = true)]
    pub journald: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List connected cameras
    List {
        /// Print the list as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show resolutions, raw format and settings of a camera
    Info {
        #[command(flatten)]
        camera: CameraArgs,
    },

    /// Stream frames from a camera
    Stream {
        #[command(flatten)]
        camera: CameraArgs,

        #[command(flatten)]
        stream: StreamArgs,
    },

    /// Capture still images
    Snap {
        #[command(flatten)]
        camera: CameraArgs,

        /// Still resolution index
        #[arg(long, env = "STILL_RESOLUTION", default_value = "0")]
        still_resolution: u32,

        /// Number of stills to capture
        #[arg(short = 'n', long, env = "COUNT", default_value = "1")]
        count: u32,

        /// Directory captured JPEGs are written to
        #[arg(short, long, env = "OUTPUT", default_value = ".")]
        output: PathBuf,

        /// JPEG quality (1-100)
        #[arg(long, env = "JPEG_QUALITY", default_value = "90")]
        jpeg_quality: i32,

        /// Also write each still's pixel buffer to a headerless `.raw` file
        #[arg(long, env = "RAW")]
        raw: bool,
    },

    /// Watch for cameras being plugged in or out (Linux and macOS)
    Watch,
}

/// Camera selection and configuration shared by all camera commands.
#[derive(clap::Args, Debug, Clone)]
pub struct CameraArgs {
    /// Camera id as printed by `list`, defaults to the first camera
    #[arg(short, long, env = "CAMERA_ID")]
    pub camera: Option<String>,

    /// Preview resolution index
    #[arg(short, long, env = "RESOLUTION")]
    pub resolution: Option<u32>,

    /// Trigger mode
    #[arg(long, env = "TRIGGER", value_enum)]
    pub trigger: Option<TriggerMode>,

    /// Exposure time in microseconds, disables auto exposure
    #[arg(long, env = "EXPOSURE")]
    pub exposure: Option<u32>,

    /// Analog gain in percent (100 = 1x)
    #[arg(long, env = "GAIN")]
    pub gain: Option<u16>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct StreamArgs {
    /// Frame delivery mode
    #[arg(short, long, env = "MODE", default_value = "push", value_enum)]
    pub mode: StreamMode,

    /// Stop after this many frames, runs until Ctrl-C when omitted
    #[arg(short, long, env = "FRAMES")]
    pub frames: Option<u64>,

    /// Bits per pixel requested in pull mode (8, 24 or 32)
    #[arg(long, env = "BITS", default_value = "24")]
    pub bits: u16,

    /// Request a still at this resolution index every `snap_interval` frames
    #[arg(long, env = "SNAP")]
    pub snap: Option<u32>,

    /// Frames between still requests
    #[arg(long, env = "SNAP_INTERVAL", default_value = "30")]
    pub snap_interval: u64,

    /// Software trigger this many frames at a time in software trigger mode
    #[arg(long, env = "TRIGGER_COUNT", default_value = "1")]
    pub trigger_count: u16,

    /// Save every Nth preview frame as JPEG, stills are always saved
    #[arg(long, env = "SAVE_EVERY")]
    pub save_every: Option<u64>,

    /// Directory captured JPEGs are written to
    #[arg(short, long, env = "OUTPUT", default_value = ".")]
    pub output: PathBuf,

    /// JPEG quality (1-100)
    #[arg(long, env = "JPEG_QUALITY", default_value = "90")]
    pub jpeg_quality: i32,

    /// Also write each saved frame's pixel buffer to a headerless `.raw` file
    #[arg(long, env = "RAW")]
    pub raw: bool,

    /// Depth of the pull mode event queue
    #[arg(long, env = "EVENT_QUEUE", default_value = "16")]
    pub event_queue: usize,
}
