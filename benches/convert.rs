// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Toupcam-rs Contributors. All Rights Reserved.

use criterion::{criterion_group, criterion_main, Criterion};
use toupcam::{frame::row_pitch, FrameRef, ImageHeader, PixelLayout};
use toupcam_sys::BITMAPINFOHEADER;

/// Bottom-up DIB header, as pushed by the SDK.
fn dib_header(width: u32, height: u32, bits: u16) -> ImageHeader {
    ImageHeader::from(&BITMAPINFOHEADER {
        biSize: 40,
        biWidth: width as i32,
        biHeight: height as i32,
        biPlanes: 1,
        biBitCount: bits,
        biSizeImage: (row_pitch(width, bits) * height as usize) as u32,
        ..Default::default()
    })
}

pub fn benchmark_convert(c: &mut Criterion) {
    let depths = [(8, PixelLayout::Mono8), (24, PixelLayout::Rgb), (32, PixelLayout::Rgba)];
    let dims = [(642, 481), (1280, 960), (1920, 1080), (3840, 2160)];

    for (bits, layout) in depths.iter() {
        let mut group = c.benchmark_group(format!("convert/{:?}", layout));
        for dim in dims.iter() {
            let header = dib_header(dim.0, dim.1, *bits);
            let data = vec![0x5a; header.data_len()];

            group.bench_with_input(
                format!("{}x{}-owned", dim.0, dim.1),
                &(header, &data),
                |b, (header, data)| {
                    b.iter(|| {
                        FrameRef::new(*header, PixelLayout::Rgb, false, data)
                            .unwrap()
                            .to_owned()
                    })
                },
            );
            group.bench_with_input(
                format!("{}x{}-bgra", dim.0, dim.1),
                &(header, &data),
                |b, (header, data)| {
                    b.iter(|| {
                        FrameRef::new(*header, PixelLayout::Rgb, false, data)
                            .unwrap()
                            .to_bytes(PixelLayout::Bgra)
                    })
                },
            );
        }
        group.finish();
    }
}

criterion_group!(benches, benchmark_convert);
criterion_main!(benches);
