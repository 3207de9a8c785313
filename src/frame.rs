// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Toupcam-rs Contributors. All Rights Reserved.

//! DIB frame headers, borrowed and owned frames, and JPEG encoding.

use crate::error::{Error, Result};
use core::fmt;
use std::{ffi::c_void, slice::from_raw_parts};
use toupcam_sys::BITMAPINFOHEADER;

/// Byte order of 24 and 32 bit frames as delivered by the SDK by default.
#[cfg(windows)]
pub const NATIVE_LAYOUT: PixelLayout = PixelLayout::Bgr;
#[cfg(not(windows))]
pub const NATIVE_LAYOUT: PixelLayout = PixelLayout::Rgb;

/// Stride of a DIB row: each row is padded to a multiple of four bytes.
pub const fn row_pitch(width: u32, bits: u16) -> usize {
    (width as usize * bits as usize).div_ceil(32) * 4
}

/// Image header decoded from the `BITMAPINFOHEADER` of a pushed frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ImageHeader {
    pub width: u32,
    pub height: u32,
    /// DIB convention: a positive native height stores the last row first
    pub bottom_up: bool,
    pub bit_count: u16,
    pub planes: u16,
    pub compression: u32,
    pub size_image: u32,
    pub x_pels_per_meter: i32,
    pub y_pels_per_meter: i32,
}

impl ImageHeader {
    /// Header for an uncompressed top-down frame, as returned by pull mode.
    pub fn top_down(width: u32, height: u32, bit_count: u16) -> Self {
        Self {
            width,
            height,
            bottom_up: false,
            bit_count,
            planes: 1,
            compression: 0,
            size_image: u32::try_from(row_pitch(width, bit_count) * height as usize)
                .unwrap_or(u32::MAX),
            x_pels_per_meter: 0,
            y_pels_per_meter: 0,
        }
    }

    pub fn row_pitch(&self) -> usize {
        row_pitch(self.width, self.bit_count)
    }

    /// Bytes of pixel data described by the header, padding included.
    pub fn data_len(&self) -> usize {
        self.row_pitch() * self.height as usize
    }
}

impl From<&BITMAPINFOHEADER> for ImageHeader {
    fn from(hdr: &BITMAPINFOHEADER) -> Self {
        Self {
            width: hdr.biWidth.unsigned_abs(),
            height: hdr.biHeight.unsigned_abs(),
            bottom_up: hdr.biHeight > 0,
            bit_count: hdr.biBitCount,
            planes: hdr.biPlanes,
            compression: hdr.biCompression,
            size_image: hdr.biSizeImage,
            x_pels_per_meter: hdr.biXPelsPerMeter,
            y_pels_per_meter: hdr.biYPelsPerMeter,
        }
    }
}

impl fmt::Display for ImageHeader {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}x{} {}bpp{} size:{}",
            self.width,
            self.height,
            self.bit_count,
            if self.bottom_up { " bottom-up" } else { "" },
            self.size_image
        )
    }
}

/// Pixel memory layouts frames can be read from or converted to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PixelLayout {
    /// 8-bit greyscale
    Mono8,
    Rgb,
    Bgr,
    Rgba,
    Bgra,
    Abgr,
}

impl PixelLayout {
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelLayout::Mono8 => 1,
            PixelLayout::Rgb | PixelLayout::Bgr => 3,
            PixelLayout::Rgba | PixelLayout::Bgra | PixelLayout::Abgr => 4,
        }
    }

    /// Layout the SDK uses for a given bit depth and 24-bit byte order.
    pub fn from_bits(bits: u16, byte_order: PixelLayout) -> Result<Self> {
        let bgr = byte_order == PixelLayout::Bgr;
        match bits {
            8 => Ok(PixelLayout::Mono8),
            24 if bgr => Ok(PixelLayout::Bgr),
            24 => Ok(PixelLayout::Rgb),
            32 if bgr => Ok(PixelLayout::Bgra),
            32 => Ok(PixelLayout::Rgba),
            _ => Err(Error::Unsupported("frame bit depth other than 8, 24 or 32")),
        }
    }

    fn read(self, px: &[u8]) -> [u8; 4] {
        match self {
            PixelLayout::Mono8 => [px[0], px[0], px[0], 255],
            PixelLayout::Rgb => [px[0], px[1], px[2], 255],
            PixelLayout::Bgr => [px[2], px[1], px[0], 255],
            PixelLayout::Rgba => [px[0], px[1], px[2], px[3]],
            PixelLayout::Bgra => [px[2], px[1], px[0], px[3]],
            PixelLayout::Abgr => [px[3], px[2], px[1], px[0]],
        }
    }

    fn write(self, [r, g, b, a]: [u8; 4], out: &mut Vec<u8>) {
        match self {
            PixelLayout::Mono8 => {
                let luma = (299 * r as u32 + 587 * g as u32 + 114 * b as u32) / 1000;
                out.push(luma as u8)
            }
            PixelLayout::Rgb => out.extend_from_slice(&[r, g, b]),
            PixelLayout::Bgr => out.extend_from_slice(&[b, g, r]),
            PixelLayout::Rgba => out.extend_from_slice(&[r, g, b, a]),
            PixelLayout::Bgra => out.extend_from_slice(&[b, g, r, a]),
            PixelLayout::Abgr => out.extend_from_slice(&[a, b, g, r]),
        }
    }
}

fn convert_row(row: &[u8], from: PixelLayout, to: PixelLayout, out: &mut Vec<u8>) {
    if from == to {
        out.extend_from_slice(row);
        return;
    }
    for px in row.chunks_exact(from.bytes_per_pixel()) {
        to.write(from.read(px), out);
    }
}

/// Borrowed view of a frame still owned by the SDK.
///
/// Only valid inside the push callback that produced it; call
/// [`FrameRef::to_owned`] to keep the pixels.
#[derive(Copy, Clone, Debug)]
pub struct FrameRef<'a> {
    header: ImageHeader,
    layout: PixelLayout,
    still: bool,
    data: &'a [u8],
}

impl<'a> FrameRef<'a> {
    /// Wraps `data`, which must hold at least `header.data_len()` bytes laid
    /// out as DIB rows.
    pub fn new(
        header: ImageHeader,
        byte_order: PixelLayout,
        still: bool,
        data: &'a [u8],
    ) -> Result<Self> {
        let layout = PixelLayout::from_bits(header.bit_count, byte_order)?;
        let needed = header.data_len();
        if data.len() < needed {
            return Err(Error::BufferTooSmall {
                needed,
                actual: data.len(),
            });
        }
        Ok(Self {
            header,
            layout,
            still,
            data: &data[..needed],
        })
    }

    /// Builds a view over native callback memory.
    ///
    /// # Safety
    ///
    /// `data` must point to at least `header.data_len()` readable bytes that
    /// remain valid and unmodified for `'a`.
    pub unsafe fn from_raw(
        data: *const c_void,
        header: &BITMAPINFOHEADER,
        byte_order: PixelLayout,
        still: bool,
    ) -> Result<Self> {
        let header = ImageHeader::from(header);
        let len = header.data_len();
        let bytes = from_raw_parts(data.cast::<u8>(), len);
        Self::new(header, byte_order, still, bytes)
    }

    pub fn header(&self) -> &ImageHeader {
        &self.header
    }

    pub fn width(&self) -> u32 {
        self.header.width
    }

    pub fn height(&self) -> u32 {
        self.header.height
    }

    pub fn layout(&self) -> PixelLayout {
        self.layout
    }

    /// Whether this frame answers a snap request rather than live video.
    pub fn is_still(&self) -> bool {
        self.still
    }

    /// Raw DIB bytes including row padding.
    pub fn raw(&self) -> &'a [u8] {
        self.data
    }

    /// Rows in top-down order with padding stripped.
    pub fn rows(&self) -> impl Iterator<Item = &'a [u8]> {
        let pitch = self.header.row_pitch();
        let used = self.width() as usize * self.layout.bytes_per_pixel();
        let height = self.height() as usize;
        let bottom_up = self.header.bottom_up;
        let data = self.data;
        (0..height).map(move |y| {
            let src = if bottom_up { height - 1 - y } else { y };
            &data[src * pitch..src * pitch + used]
        })
    }

    /// Copies the pixels into a tightly packed, top-down buffer in `layout`.
    pub fn to_bytes(&self, layout: PixelLayout) -> Vec<u8> {
        let mut out = Vec::with_capacity(
            self.width() as usize * self.height() as usize * layout.bytes_per_pixel(),
        );
        for row in self.rows() {
            convert_row(row, self.layout, layout, &mut out);
        }
        out
    }

    pub fn to_owned(&self) -> Frame {
        Frame {
            width: self.width(),
            height: self.height(),
            layout: self.layout,
            still: self.still,
            data: self.to_bytes(self.layout),
        }
    }
}

/// Owned frame with tightly packed, top-down rows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    layout: PixelLayout,
    still: bool,
    data: Vec<u8>,
}

impl Frame {
    pub fn new(width: u32, height: u32, layout: PixelLayout, data: Vec<u8>) -> Result<Self> {
        let needed = width as usize * height as usize * layout.bytes_per_pixel();
        if data.len() != needed {
            return Err(Error::BufferTooSmall {
                needed,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            layout,
            still: false,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn layout(&self) -> PixelLayout {
        self.layout
    }

    pub fn is_still(&self) -> bool {
        self.still
    }

    /// Bits per pixel of the packed data: 8, 24 or 32.
    pub fn bits(&self) -> u16 {
        (self.layout.bytes_per_pixel() * 8) as u16
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn to_bytes(&self, layout: PixelLayout) -> Vec<u8> {
        let mut out = Vec::with_capacity(
            self.width as usize * self.height as usize * layout.bytes_per_pixel(),
        );
        convert_row(&self.data, self.layout, layout, &mut out);
        out
    }

    pub fn to_rgb_image(&self) -> Result<image::RgbImage> {
        let data = self.to_bytes(PixelLayout::Rgb);
        let actual = data.len();
        image::RgbImage::from_raw(self.width, self.height, data).ok_or(Error::BufferTooSmall {
            needed: self.width as usize * self.height as usize * 3,
            actual,
        })
    }

    pub fn to_rgba_image(&self) -> Result<image::RgbaImage> {
        let data = self.to_bytes(PixelLayout::Rgba);
        let actual = data.len();
        image::RgbaImage::from_raw(self.width, self.height, data).ok_or(Error::BufferTooSmall {
            needed: self.width as usize * self.height as usize * 4,
            actual,
        })
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}x{} {:?}{} size:{}",
            self.width,
            self.height,
            self.layout,
            if self.still { " still" } else { "" },
            self.data.len()
        )
    }
}

/// Encodes a frame to JPEG using turbojpeg.
///
/// Greyscale frames are encoded as single channel JPEGs, colour frames with
/// 4:2:0 chroma subsampling.
///
/// # Example
///
/// ```
/// use toupcam::frame::{encode_jpeg, Frame, PixelLayout};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let frame = Frame::new(64, 48, PixelLayout::Rgb, vec![128; 64 * 48 * 3])?;
/// let jpeg = encode_jpeg(&frame, 90)?;
/// assert_eq!(&jpeg[..2], &[0xff, 0xd8]);
/// # Ok(())
/// # }
/// ```
pub fn encode_jpeg(frame: &Frame, quality: i32) -> Result<Vec<u8>> {
    let format = match frame.layout() {
        PixelLayout::Mono8 => turbojpeg::PixelFormat::GRAY,
        PixelLayout::Rgb => turbojpeg::PixelFormat::RGB,
        PixelLayout::Bgr => turbojpeg::PixelFormat::BGR,
        PixelLayout::Rgba => turbojpeg::PixelFormat::RGBA,
        PixelLayout::Bgra => turbojpeg::PixelFormat::BGRA,
        PixelLayout::Abgr => turbojpeg::PixelFormat::ABGR,
    };
    let subsamp = match frame.layout() {
        PixelLayout::Mono8 => turbojpeg::Subsamp::Gray,
        _ => turbojpeg::Subsamp::Sub2x2,
    };
    let img = turbojpeg::Image {
        pixels: frame.as_bytes(),
        width: frame.width() as usize,
        pitch: frame.width() as usize * frame.layout().bytes_per_pixel(),
        height: frame.height() as usize,
        format,
    };
    let buf = turbojpeg::compress(img, quality, subsamp)?;
    Ok(buf.to_vec())
}
