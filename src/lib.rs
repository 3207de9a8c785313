// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Toupcam-rs Contributors. All Rights Reserved.

//! # Toupcam
//!
//! Safe bindings for the closed-source Toupcam camera SDK. Image acquisition
//! and sensor control happen inside the vendor library; this crate loads it
//! at runtime, decodes the structures it hands out and routes its callbacks
//! into Rust.
//!
//! ## Features
//!
//! - **Enumeration**: list connected cameras together with their capability
//!   models and supported resolutions.
//! - **Configuration**: resolution, trigger mode, exposure, gain and the
//!   generic option interface.
//! - **Push mode**: frames are delivered to a [`StreamListener`] as soon as
//!   the SDK has them.
//! - **Pull mode**: the SDK signals [`Event`]s on a `kanal` queue and the
//!   caller fetches frames when ready.
//! - **Frame conversion**: strip DIB row padding, flip bottom-up frames,
//!   reorder channels, build `image` buffers or encode JPEG with turbojpeg.
//!
//! ## Example
//!
//! ```no_run
//! use toupcam::{Event, Sdk};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let sdk = Sdk::load(None)?;
//! for dev in sdk.enumerate() {
//!     println!("{}", dev);
//! }
//!
//! let cam = sdk.open(None)?;
//! let events = cam.start_pull(8)?;
//! while let Ok(event) = events.recv() {
//!     if event == Event::Image {
//!         let frame = cam.pull_image(24)?;
//!         println!("{}", frame);
//!         break;
//!     }
//! }
//! cam.stop_streaming()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Safety
//!
//! All FFI happens in the `toupcam-sys` function table. Raw pointers handed
//! to the SDK as callback contexts are owned by the [`Camera`] or [`Sdk`]
//! that registered them and outlive every callback.

pub mod callback;
pub mod camera;
pub mod device;
pub mod error;
pub mod event;
pub mod frame;
pub mod sdk;

pub use callback::{FnListener, StreamListener};
pub use camera::{Camera, ExposureRange, FrameInfo, RawFormat};
pub use device::{DeviceInfo, Model, ModelFlags, Resolution};
pub use error::{Error, HResult, Result};
pub use event::{Event, Options, TriggerMode};
pub use frame::{encode_jpeg, Frame, FrameRef, ImageHeader, PixelLayout};
pub use sdk::Sdk;
