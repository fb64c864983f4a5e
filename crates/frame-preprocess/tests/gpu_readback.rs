// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! GPU preprocessing round trips. All tests here need an adapter; run
//! with `cargo test -- --ignored`.

use frame_preprocess::{Frame, GpuPreprocessor, ReadbackResult, ScaleCrop};

fn poll_to_completion(pre: &mut GpuPreprocessor) -> ReadbackResult {
    for _ in 0..10_000 {
        if let Some(result) = pre.poll() {
            return result;
        }
        std::thread::sleep(std::time::Duration::from_micros(100));
    }
    panic!("readback never completed");
}

#[test]
#[ignore = "requires a GPU adapter"]
fn test_solid_frame_roundtrip() {
    let mut pre = GpuPreprocessor::new().unwrap();
    let pixels: Vec<u8> = [40u8, 80, 120, 255].repeat(64 * 48);
    let frame = Frame {
        pixels: &pixels,
        width: 64,
        height: 48,
    };

    assert!(pre.request_scale_crop(&frame, 32).unwrap());
    let ReadbackResult::Complete(rgb) = poll_to_completion(&mut pre) else {
        panic!("readback failed");
    };

    assert_eq!(rgb.len(), 32 * 32 * 3);
    // Solid input survives scaling untouched (within filtering noise).
    for px in rgb.chunks_exact(3) {
        assert!((px[0] as i16 - 40).abs() <= 1);
        assert!((px[1] as i16 - 80).abs() <= 1);
        assert!((px[2] as i16 - 120).abs() <= 1);
    }
}

#[test]
#[ignore = "requires a GPU adapter"]
fn test_busy_slot_drops_second_request() {
    let mut pre = GpuPreprocessor::new().unwrap();
    let pixels: Vec<u8> = [0u8, 0, 0, 255].repeat(16 * 16);
    let frame = Frame {
        pixels: &pixels,
        width: 16,
        height: 16,
    };

    assert!(pre.request_scale_crop(&frame, 8).unwrap());
    assert!(!pre.request_scale_crop(&frame, 8).unwrap());

    poll_to_completion(&mut pre);
    // Completion frees the slot for a new request.
    assert!(pre.request_scale_crop(&frame, 8).unwrap());
}

#[test]
#[ignore = "requires a GPU adapter"]
fn test_landscape_center_crop() {
    // Left half black, right half white: the centered crop of a 2:1
    // frame spans the boundary.
    let mut pixels = Vec::new();
    for _y in 0..32 {
        for x in 0..64 {
            let v = if x < 32 { 0u8 } else { 255 };
            pixels.extend_from_slice(&[v, v, v, 255]);
        }
    }
    let frame = Frame {
        pixels: &pixels,
        width: 64,
        height: 32,
    };

    let mut pre = GpuPreprocessor::new().unwrap();
    assert!(pre.request_scale_crop(&frame, 16).unwrap());
    let ReadbackResult::Complete(rgb) = poll_to_completion(&mut pre) else {
        panic!("readback failed");
    };

    let row = &rgb[..16 * 3];
    assert!(row[0] < 64, "left edge should come from the dark half");
    assert!(row[15 * 3] > 192, "right edge should come from the bright half");
}
