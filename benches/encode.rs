// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Toupcam-rs Contributors. All Rights Reserved.

use criterion::{criterion_group, criterion_main, Criterion};
use toupcam::{encode_jpeg, Frame, PixelLayout};

fn test_frame(width: u32, height: u32, layout: PixelLayout) -> Frame {
    let len = width as usize * height as usize * layout.bytes_per_pixel();
    let data = (0..len).map(|i| (i % 253) as u8).collect();
    Frame::new(width, height, layout, data).unwrap()
}

pub fn benchmark_encode(c: &mut Criterion) {
    for layout in [PixelLayout::Rgb, PixelLayout::Bgr, PixelLayout::Mono8] {
        let mut group = c.benchmark_group(format!("jpeg/{:?}", layout));
        for dim in [
            (320, 240),
            (640, 480),
            (1280, 960),
            (1920, 1080),
            (2592, 1944),
            (3840, 2160),
        ]
        .iter()
        {
            let frame = test_frame(dim.0, dim.1, layout);
            group.bench_with_input(format!("{}x{}", dim.0, dim.1), &frame, |b, frame| {
                b.iter(|| encode_jpeg(frame, 90).unwrap())
            });
        }
        group.finish();
    }
}

criterion_group!(benches, benchmark_encode);
criterion_main!(benches);
