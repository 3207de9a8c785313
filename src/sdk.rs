// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Toupcam-rs Contributors. All Rights Reserved.

//! Loading the SDK library, enumerating cameras and hotplug notification.

use crate::{
    callback::{hotplug_trampoline, HotplugContext},
    camera::Camera,
    device::{encode_tchars, string_from_tchar_ptr, DeviceInfo},
    error::{Error, Result},
};
use std::{
    env,
    ffi::c_void,
    path::{Path, PathBuf},
    ptr::null_mut,
    sync::{Arc, Mutex, OnceLock},
};
use toupcam_sys::{self as sys, toupcam as toupcam_library, ToupcamDeviceV2};
use tracing::{debug, info, warn};

/// Environment variable overriding the SDK location for [`Sdk::global`].
pub const LIBRARY_ENV: &str = "TOUPCAM_LIBRARY";

/// Handle to the loaded Toupcam SDK.
///
/// Cameras keep the SDK alive through an `Arc`, so the library is only
/// unloaded after the last camera has been closed.
pub struct Sdk {
    lib: toupcam_library,
    path: PathBuf,
    hotplug: Mutex<Option<Box<HotplugContext>>>,
}

static GLOBAL: OnceLock<std::result::Result<Arc<Sdk>, String>> = OnceLock::new();

impl Sdk {
    /// Loads the SDK shared library.
    ///
    /// With no path the platform default name is resolved through the
    /// dynamic loader's search path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Load`] if the library cannot be opened or lacks one
    /// of the required exports.
    pub fn load(path: Option<&Path>) -> Result<Arc<Self>> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(sys::TOUPCAM_LIBRARY));
        let lib = unsafe { toupcam_library::new(&path) }?;
        let sdk = Self {
            lib,
            path,
            hotplug: Mutex::new(None),
        };
        info!(
            "loaded Toupcam SDK {} from {}",
            sdk.version(),
            sdk.path.display()
        );
        Ok(Arc::new(sdk))
    }

    /// Process-wide SDK instance, loaded on first use from `TOUPCAM_LIBRARY`
    /// or the platform default.
    pub fn global() -> std::result::Result<Arc<Self>, String> {
        GLOBAL
            .get_or_init(|| {
                let path = env::var_os(LIBRARY_ENV).map(PathBuf::from);
                Sdk::load(path.as_deref()).map_err(|e| e.to_string())
            })
            .clone()
    }

    #[cfg(test)]
    pub(crate) fn from_library(lib: toupcam_library) -> Arc<Self> {
        Arc::new(Self {
            lib,
            path: PathBuf::from("<stubs>"),
            hotplug: Mutex::new(None),
        })
    }

    pub(crate) fn lib(&self) -> &toupcam_library {
        &self.lib
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn version(&self) -> String {
        unsafe { string_from_tchar_ptr(self.lib.Toupcam_Version()) }
    }

    fn enum_raw(&self) -> (Vec<ToupcamDeviceV2>, usize) {
        let mut arr = vec![ToupcamDeviceV2::default(); sys::TOUPCAM_MAX];
        let count = unsafe { self.lib.Toupcam_EnumV2(arr.as_mut_ptr()) } as usize;
        (arr, count.min(sys::TOUPCAM_MAX))
    }

    /// Number of cameras currently connected.
    pub fn count_connected(&self) -> usize {
        self.enum_raw().1
    }

    /// Lists connected cameras with their capability models.
    pub fn enumerate(&self) -> Vec<DeviceInfo> {
        let (arr, count) = self.enum_raw();
        let devices: Vec<DeviceInfo> = arr[..count]
            .iter()
            .map(|dev| unsafe { DeviceInfo::from_raw(dev) })
            .collect();
        debug!("enumerated {} camera(s)", devices.len());
        devices
    }

    /// Opens a camera by id, or the first camera found when `id` is `None`.
    pub fn open(self: &Arc<Self>, id: Option<&str>) -> Result<Camera> {
        let handle = match id {
            Some(id) => {
                let id_chars = encode_tchars(id).ok_or(Error::InvalidId)?;
                unsafe { self.lib.Toupcam_Open(id_chars.as_ptr()) }
            }
            None => unsafe { self.lib.Toupcam_Open(std::ptr::null()) },
        };
        if handle.is_null() {
            return Err(Error::OpenFailed(id.unwrap_or("<first>").to_string()));
        }
        info!("opened camera {}", id.unwrap_or("<first>"));
        Ok(Camera::new(self.clone(), handle))
    }

    /// Opens the camera at `index` in enumeration order.
    pub fn open_by_index(self: &Arc<Self>, index: u32) -> Result<Camera> {
        let handle = unsafe { self.lib.Toupcam_OpenByIndex(index) };
        if handle.is_null() {
            return Err(Error::OpenFailed(format!("#{}", index)));
        }
        info!("opened camera #{}", index);
        Ok(Camera::new(self.clone(), handle))
    }

    /// Whether plug-in/out notifications are available (Linux and macOS).
    pub fn supports_hotplug(&self) -> bool {
        self.lib.has_hotplug()
    }

    /// Registers `callback` to run whenever a camera is plugged in or out,
    /// replacing any earlier registration. `None` clears it.
    ///
    /// The callback runs on an SDK thread; enumerate again to find out what
    /// changed.
    pub fn set_hotplug<F>(&self, callback: Option<F>) -> Result<()>
    where
        F: Fn() + Send + Sync + 'static,
    {
        if !self.lib.has_hotplug() {
            return Err(Error::Unsupported("Toupcam_HotPlug"));
        }
        let mut slot = match self.hotplug.lock() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        let ctx = callback.map(|f| {
            Box::new(HotplugContext {
                callback: Box::new(f),
            })
        });
        match &ctx {
            Some(ctx) => unsafe {
                let ptr = &**ctx as *const HotplugContext as *mut c_void;
                self.lib.Toupcam_HotPlug(Some(hotplug_trampoline), ptr);
            },
            None => unsafe {
                self.lib.Toupcam_HotPlug(None, null_mut());
            },
        }
        // the SDK has switched to the new context, the old one can go
        *slot = ctx;
        Ok(())
    }
}

impl Drop for Sdk {
    fn drop(&mut self) {
        let registered = match self.hotplug.get_mut() {
            Ok(slot) => slot.is_some(),
            Err(poisoned) => poisoned.get_ref().is_some(),
        };
        if registered {
            unsafe { self.lib.Toupcam_HotPlug(None, null_mut()) };
            warn!("hotplug callback still registered at unload, cleared");
        }
        debug!("Toupcam SDK unloaded");
    }
}
