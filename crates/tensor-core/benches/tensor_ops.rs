// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Benchmarks for the per-frame math kernels.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tensor_core::ops;

fn bench_normalize(c: &mut Criterion) {
    // A full 224x224 RGB frame, the per-tick workload.
    let bytes: Vec<u8> = (0..224 * 224 * 3).map(|i| (i % 256) as u8).collect();
    let mut out = vec![0.0f32; bytes.len()];

    c.bench_function("normalize_224", |b| {
        b.iter(|| ops::normalize(black_box(&bytes), black_box(&mut out)).unwrap())
    });
}

fn bench_dense(c: &mut Criterion) {
    let input = vec![0.5f32; 768];
    let weights = vec![0.01f32; 768 * 128];
    let bias = vec![0.0f32; 128];
    let mut output = vec![0.0f32; 128];

    c.bench_function("dense_768x128", |b| {
        b.iter(|| {
            ops::dense(
                black_box(&input),
                black_box(&weights),
                black_box(&bias),
                black_box(&mut output),
                true,
            )
            .unwrap()
        })
    });
}

fn bench_softmax_argmax(c: &mut Criterion) {
    let scores = vec![0.3f32; 1000];

    c.bench_function("softmax_argmax_1000", |b| {
        b.iter(|| {
            let mut v = scores.clone();
            ops::softmax_in_place(black_box(&mut v));
            ops::argmax(black_box(&v))
        })
    });
}

criterion_group!(benches, bench_normalize, bench_dense, bench_softmax_argmax);
criterion_main!(benches);
