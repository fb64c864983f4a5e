// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Cross-backend agreement: every engine must produce the same
//! probability distribution for the same input.
//!
//! The GPU cases are `#[ignore]`d; run them with `cargo test -- --ignored`
//! on a machine with an adapter.

use classifier_model::{ModelLoader, ModelManifest};
use compute_backend::{create_engine, BackendKind};
use tensor_core::{Shape, Tensor};

fn synthetic_model() -> classifier_model::ModelHandle {
    let manifest = ModelManifest::from_json(
        r#"{
            "name": "agreement",
            "input": { "name": "images", "height": 8, "width": 8, "channels": 3 },
            "output": { "name": "Softmax", "classes": 10 },
            "hidden": [32, 16]
        }"#,
    )
    .unwrap();
    ModelLoader::synthetic(manifest)
}

fn gradient_input() -> Tensor {
    let n = 8 * 8 * 3;
    Tensor::from_vec(
        Shape::image(8, 8, 3),
        (0..n).map(|i| (i as f32 / n as f32) - 0.5).collect(),
    )
    .unwrap()
}

fn assert_agrees_with_cpu(kind: BackendKind) {
    let model = synthetic_model();
    let input = gradient_input();

    let mut cpu = create_engine(BackendKind::CpuVectorized, &model).unwrap();
    let mut other = create_engine(kind, &model).unwrap();

    let expected = cpu.execute(&input).unwrap();
    let actual = other.execute(&input).unwrap();

    assert_eq!(actual.shape(), expected.shape());
    for (i, (a, e)) in actual
        .as_slice()
        .iter()
        .zip(expected.as_slice())
        .enumerate()
    {
        assert!(
            (a - e).abs() < 1e-4,
            "class {i}: {kind} gave {a}, cpu gave {e}"
        );
    }
}

#[test]
fn test_cpu_engine_distribution_sums_to_one() {
    let model = synthetic_model();
    let mut cpu = create_engine(BackendKind::CpuVectorized, &model).unwrap();
    let out = cpu.execute(&gradient_input()).unwrap();
    let sum: f32 = out.as_slice().iter().sum();
    assert!((sum - 1.0).abs() < 1e-5);
}

#[test]
#[ignore = "requires a GPU adapter"]
fn test_gpu_compute_agrees_with_cpu() {
    assert_agrees_with_cpu(BackendKind::GpuCompute);
}

#[test]
#[ignore = "requires a GPU adapter"]
fn test_gpu_shader_agrees_with_cpu() {
    assert_agrees_with_cpu(BackendKind::GpuShader);
}

#[test]
#[ignore = "requires a GPU adapter"]
fn test_gpu_engines_reject_wrong_shape() {
    let model = synthetic_model();
    let mut engine = create_engine(BackendKind::GpuCompute, &model).unwrap();
    let bad = Tensor::zeros(Shape::image(4, 4, 3));
    assert!(engine.execute(&bad).is_err());
}
