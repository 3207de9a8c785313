// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Toupcam-rs Contributors. All Rights Reserved.

//! Error types and HRESULT decoding.

use std::fmt;
use thiserror::Error;
use toupcam_sys as sys;

/// Result type for Toupcam operations
pub type Result<T> = std::result::Result<T, Error>;

/// Status code returned by SDK calls.
///
/// Negative values are failures. Both `S_OK` and `S_FALSE` count as
/// success; `S_FALSE` usually means the call had nothing to do.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct HResult(pub i32);

impl HResult {
    pub const S_OK: HResult = HResult(sys::S_OK);
    pub const S_FALSE: HResult = HResult(sys::S_FALSE);

    pub fn is_success(self) -> bool {
        self.0 >= 0
    }

    /// Symbolic name for codes the SDK documents.
    pub fn name(self) -> Option<&'static str> {
        let name = match self.0 {
            sys::S_OK => "S_OK",
            sys::S_FALSE => "S_FALSE",
            sys::E_UNEXPECTED => "E_UNEXPECTED",
            sys::E_NOTIMPL => "E_NOTIMPL",
            sys::E_NOINTERFACE => "E_NOINTERFACE",
            sys::E_POINTER => "E_POINTER",
            sys::E_FAIL => "E_FAIL",
            sys::E_PENDING => "E_PENDING",
            sys::E_WRONG_THREAD => "E_WRONG_THREAD",
            sys::E_TIMEOUT => "E_TIMEOUT",
            sys::E_ACCESSDENIED => "E_ACCESSDENIED",
            sys::E_OUTOFMEMORY => "E_OUTOFMEMORY",
            sys::E_GEN_FAILURE => "E_GEN_FAILURE",
            sys::E_INVALIDARG => "E_INVALIDARG",
            sys::E_BUSY => "E_BUSY",
            _ => return None,
        };
        Some(name)
    }
}

impl From<i32> for HResult {
    fn from(value: i32) -> Self {
        HResult(value)
    }
}

impl fmt::Display for HResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{} (0x{:08x})", name, self.0 as u32),
            None => write!(f, "0x{:08x}", self.0 as u32),
        }
    }
}

impl fmt::Debug for HResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Errors that can occur while driving a Toupcam camera
#[derive(Debug, Error)]
pub enum Error {
    /// The SDK library or one of its exports could not be loaded
    #[error("failed to load Toupcam SDK: {0}")]
    Load(#[from] libloading::Error),

    /// An SDK call returned a failure code
    #[error("{call} failed: {code}")]
    Sdk { call: &'static str, code: HResult },

    /// The SDK returned a NULL handle when opening a camera
    #[error("failed to open camera {0}")]
    OpenFailed(String),

    /// Camera id could not be passed to the SDK
    #[error("camera id contains an interior NUL")]
    InvalidId,

    /// Streaming restart requested before any listener was registered
    #[error("no stream listener cached, start streaming first")]
    NoCachedListener,

    /// Push or pull mode is already running on this camera
    #[error("camera is already streaming")]
    AlreadyStreaming,

    /// Pull mode needs room for at least one queued event
    #[error("event queue capacity must be at least 1")]
    ZeroCapacity,

    /// The camera reported a trigger mode outside the known set
    #[error("unknown trigger mode value {0}")]
    UnknownTriggerMode(i32),

    /// Feature not provided by this SDK build or frame format
    #[error("unsupported: {0}")]
    Unsupported(&'static str),

    /// Pixel buffer shorter than its header claims
    #[error("buffer too small: need {needed} bytes, got {actual}")]
    BufferTooSmall { needed: usize, actual: usize },

    /// JPEG compression error
    #[error("JPEG error: {0}")]
    Jpeg(#[from] turbojpeg::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Converts a failed HRESULT into [`Error::Sdk`].
///
/// Successful codes are passed through so callers can still tell `S_OK`
/// apart from `S_FALSE`.
pub fn check(call: &'static str, hr: i32) -> Result<HResult> {
    let code = HResult(hr);
    if code.is_success() {
        Ok(code)
    } else {
        Err(Error::Sdk { call, code })
    }
}
