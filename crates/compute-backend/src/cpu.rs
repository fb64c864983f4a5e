// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! CPU execution: dense layers over auto-vectorised loops.

use crate::{BackendError, BackendKind, InferenceEngine};
use classifier_model::{DenseLayer, ModelHandle};
use tensor_core::{ops, Shape, Tensor};

/// The always-available CPU engine.
///
/// Keeps its own copy of the layer parameters plus two ping-pong scratch
/// vectors sized to the widest layer, so `execute` allocates only the
/// output tensor.
pub struct CpuEngine {
    layers: Vec<DenseLayer>,
    input_shape: Shape,
    output_shape: Shape,
    scratch_a: Vec<f32>,
    scratch_b: Vec<f32>,
}

impl CpuEngine {
    pub fn new(model: &ModelHandle) -> Self {
        let width = model.max_features();
        Self {
            layers: model.layers().to_vec(),
            input_shape: model.input_shape(),
            output_shape: model.output_shape(),
            scratch_a: vec![0.0; width],
            scratch_b: vec![0.0; width],
        }
    }
}

impl InferenceEngine for CpuEngine {
    fn kind(&self) -> BackendKind {
        BackendKind::CpuVectorized
    }

    fn execute(&mut self, input: &Tensor) -> Result<Tensor, BackendError> {
        if input.shape() != &self.input_shape {
            return Err(BackendError::Input(tensor_core::TensorError::ShapeMismatch {
                op: "execute",
                lhs: input.shape().clone(),
                rhs: self.input_shape.clone(),
            }));
        }

        // NHWC input flattens in memory order; layer i reads scratch_a
        // and writes scratch_b, then the roles swap.
        let last = self.layers.len() - 1;
        self.scratch_a[..input.num_elements()].copy_from_slice(input.as_slice());

        for (i, layer) in self.layers.iter().enumerate() {
            let relu = i != last;
            ops::dense(
                &self.scratch_a[..layer.in_features],
                &layer.weights,
                &layer.bias,
                &mut self.scratch_b[..layer.out_features],
                relu,
            )?;
            std::mem::swap(&mut self.scratch_a, &mut self.scratch_b);
        }

        let classes = self.output_shape.num_elements();
        let mut scores = self.scratch_a[..classes].to_vec();
        ops::softmax_in_place(&mut scores);
        Ok(Tensor::from_vec(self.output_shape.clone(), scores)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use classifier_model::{ModelManifest, ModelLoader};

    fn tiny_model() -> ModelHandle {
        // 1x1x3 input → 2 classes, single layer with hand-picked weights.
        let manifest = ModelManifest::from_json(
            r#"{
                "name": "tiny",
                "input": { "name": "images", "height": 1, "width": 1, "channels": 3 },
                "output": { "name": "Softmax", "classes": 2 }
            }"#,
        )
        .unwrap();
        let layer = DenseLayer {
            in_features: 3,
            out_features: 2,
            // Row 0 picks channel 0, row 1 picks channel 1.
            weights: vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            bias: vec![0.0, 0.0],
        };
        ModelHandle::from_layers(manifest, vec![layer]).unwrap()
    }

    #[test]
    fn test_execute_produces_distribution() {
        let model = tiny_model();
        let mut engine = CpuEngine::new(&model);
        let input = Tensor::from_vec(Shape::image(1, 1, 3), vec![2.0, 0.0, 1.0]).unwrap();

        let out = engine.execute(&input).unwrap();
        assert_eq!(out.shape().dims(), &[1, 2]);
        let sum: f32 = out.as_slice().iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
        // Logits were [2.0, 0.0], so class 0 dominates.
        assert!(out.as_slice()[0] > out.as_slice()[1]);
    }

    #[test]
    fn test_execute_rejects_wrong_shape() {
        let model = tiny_model();
        let mut engine = CpuEngine::new(&model);
        let input = Tensor::zeros(Shape::image(2, 2, 3));

        let err = engine.execute(&input).unwrap_err();
        assert!(matches!(err, BackendError::Input(_)));
    }

    #[test]
    fn test_execute_applies_relu_between_layers() {
        // Two layers: the first produces a negative value that ReLU must
        // clamp before the second layer reads it.
        let manifest = ModelManifest::from_json(
            r#"{
                "name": "relu-check",
                "input": { "name": "images", "height": 1, "width": 1, "channels": 1 },
                "output": { "name": "Softmax", "classes": 2 },
                "hidden": [2]
            }"#,
        )
        .unwrap();
        let l0 = DenseLayer {
            in_features: 1,
            out_features: 2,
            weights: vec![1.0, -1.0],
            bias: vec![0.0, 0.0],
        };
        let l1 = DenseLayer {
            in_features: 2,
            out_features: 2,
            weights: vec![1.0, 0.0, 0.0, 1.0],
            bias: vec![0.0, 0.0],
        };
        let model = ModelHandle::from_layers(manifest, vec![l0, l1]).unwrap();
        let mut engine = CpuEngine::new(&model);

        let input = Tensor::from_vec(Shape::image(1, 1, 1), vec![1.0]).unwrap();
        let out = engine.execute(&input).unwrap();
        // Hidden is [1, -1] → ReLU → [1, 0]; logits [1, 0].
        let p = out.as_slice();
        let expected0 = 1.0f32.exp() / (1.0f32.exp() + 1.0);
        assert!((p[0] - expected0).abs() < 1e-6);
    }

    #[test]
    fn test_execute_is_repeatable() {
        let manifest = ModelManifest::from_json(
            r#"{
                "name": "synth",
                "input": { "name": "images", "height": 4, "width": 4 },
                "output": { "name": "Softmax", "classes": 5 },
                "hidden": [8]
            }"#,
        )
        .unwrap();
        let model = ModelLoader::synthetic(manifest);
        let mut engine = CpuEngine::new(&model);

        let input = Tensor::from_vec(
            Shape::image(4, 4, 3),
            (0..48).map(|i| (i as f32 - 24.0) / 24.0).collect(),
        )
        .unwrap();
        let a = engine.execute(&input).unwrap();
        let b = engine.execute(&input).unwrap();
        assert_eq!(a.as_slice(), b.as_slice());
    }
}
