// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Model loading: manifest plus dense-layer weights.
//!
//! [`ModelLoader`] supports two modes:
//!
//! 1. **File-backed** — `model.json` next to a `weights.bin` of raw
//!    little-endian f32 values, layer-major (each layer's row-major
//!    weight matrix followed by its bias vector).
//! 2. **Synthetic** — when `weights.bin` is absent, deterministic
//!    pseudo-random weights are generated from the manifest's shapes, so
//!    demos and tests run without real model files.

use crate::{ModelError, ModelManifest};
use std::path::Path;
use tensor_core::Shape;

/// Default manifest filename inside a model directory.
const MANIFEST_FILE: &str = "model.json";
/// Default weights filename inside a model directory.
const WEIGHTS_FILE: &str = "weights.bin";

/// One fully connected layer's parameters.
#[derive(Debug, Clone)]
pub struct DenseLayer {
    /// Input width.
    pub in_features: usize,
    /// Output width.
    pub out_features: usize,
    /// Row-major `[out_features][in_features]` weight matrix.
    pub weights: Vec<f32>,
    /// Bias vector of `out_features` elements.
    pub bias: Vec<f32>,
}

/// A loaded, validated model ready to hand to a compute backend.
///
/// The handle is immutable after load; backends read the layer data when
/// building their engine and never write it.
#[derive(Debug, Clone)]
pub struct ModelHandle {
    manifest: ModelManifest,
    layers: Vec<DenseLayer>,
    file_backed: bool,
}

impl ModelHandle {
    /// Builds a handle from explicit layer parameters.
    ///
    /// Validates every layer's dimensions against the manifest. Intended
    /// for embedders and tests that construct weights programmatically.
    pub fn from_layers(
        manifest: ModelManifest,
        layers: Vec<DenseLayer>,
    ) -> Result<Self, ModelError> {
        manifest.validate()?;
        let dims = manifest.layer_dims();
        if layers.len() != dims.len() {
            return Err(ModelError::InvalidManifest(format!(
                "expected {} layers, got {}",
                dims.len(),
                layers.len()
            )));
        }
        for (i, (layer, (in_f, out_f))) in layers.iter().zip(dims).enumerate() {
            if layer.in_features != in_f
                || layer.out_features != out_f
                || layer.weights.len() != in_f * out_f
                || layer.bias.len() != out_f
            {
                return Err(ModelError::InvalidManifest(format!(
                    "layer {i} dimensions disagree with manifest ({in_f}->{out_f})"
                )));
            }
        }
        Ok(Self {
            manifest,
            layers,
            file_backed: false,
        })
    }

    /// Returns the manifest this handle was built from.
    pub fn manifest(&self) -> &ModelManifest {
        &self.manifest
    }

    /// Returns the dense layers, input to output.
    pub fn layers(&self) -> &[DenseLayer] {
        &self.layers
    }

    /// Returns the declared NHWC input shape.
    pub fn input_shape(&self) -> Shape {
        self.manifest.input_shape()
    }

    /// Returns the declared `[1, classes]` output shape.
    pub fn output_shape(&self) -> Shape {
        self.manifest.output_shape()
    }

    /// Number of classes the model scores.
    pub fn num_classes(&self) -> usize {
        self.manifest.output.classes
    }

    /// Returns `true` if the weights came from disk rather than the
    /// synthetic generator.
    pub fn is_file_backed(&self) -> bool {
        self.file_backed
    }

    /// Widest layer dimension, used by backends to size scratch buffers.
    pub fn max_features(&self) -> usize {
        self.layers
            .iter()
            .flat_map(|l| [l.in_features, l.out_features])
            .max()
            .unwrap_or(0)
    }
}

/// Loads model directories into [`ModelHandle`]s.
pub struct ModelLoader;

impl ModelLoader {
    /// Loads `model.json` (and `weights.bin` if present) from a directory.
    ///
    /// A missing weights file switches to synthetic mode; a malformed
    /// manifest or a weights file of the wrong length is an error.
    pub fn load(model_dir: &Path) -> Result<ModelHandle, ModelError> {
        let manifest = ModelManifest::from_file(&model_dir.join(MANIFEST_FILE))?;
        manifest.validate()?;

        let weights_path = model_dir.join(WEIGHTS_FILE);
        if weights_path.exists() {
            let raw = std::fs::read(&weights_path)?;
            let layers = split_layers(&manifest, &decode_f32_le(&raw)?)?;
            tracing::info!(
                "loaded '{}' from '{}' ({} parameters, file-backed)",
                manifest.name,
                model_dir.display(),
                manifest.total_parameters(),
            );
            Ok(ModelHandle {
                manifest,
                layers,
                file_backed: true,
            })
        } else {
            tracing::warn!(
                "'{}' not found, generating synthetic weights for '{}'",
                weights_path.display(),
                manifest.name,
            );
            Ok(Self::synthetic(manifest))
        }
    }

    /// Builds a handle with deterministic synthetic weights.
    ///
    /// The generator is a fixed-seed LCG, so every load of the same
    /// manifest produces identical weights — backends can be compared
    /// bit-for-bit against each other in tests.
    pub fn synthetic(manifest: ModelManifest) -> ModelHandle {
        let mut rng = 0x2545_F491u32;
        let mut next = move || {
            rng = rng.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            // Map the top bits into [-0.5, 0.5).
            (rng >> 8) as f32 / (1u32 << 24) as f32 - 0.5
        };

        let layers = manifest
            .layer_dims()
            .into_iter()
            .map(|(in_features, out_features)| {
                // Scale keeps activations bounded regardless of fan-in.
                let scale = 1.0 / (in_features as f32).sqrt();
                DenseLayer {
                    in_features,
                    out_features,
                    weights: (0..in_features * out_features)
                        .map(|_| next() * scale)
                        .collect(),
                    bias: (0..out_features).map(|_| next() * 0.1).collect(),
                }
            })
            .collect();

        ModelHandle {
            manifest,
            layers,
            file_backed: false,
        }
    }
}

/// Reinterprets a little-endian byte buffer as f32 values.
fn decode_f32_le(raw: &[u8]) -> Result<Vec<f32>, ModelError> {
    if raw.len() % 4 != 0 {
        return Err(ModelError::InvalidManifest(format!(
            "weights file length {} is not a multiple of 4",
            raw.len()
        )));
    }
    Ok(raw
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

/// Splits a flat parameter vector into per-layer weight/bias pairs.
fn split_layers(
    manifest: &ModelManifest,
    values: &[f32],
) -> Result<Vec<DenseLayer>, ModelError> {
    let expected = manifest.total_parameters();
    if values.len() != expected {
        return Err(ModelError::WeightDataMismatch {
            expected,
            actual: values.len(),
        });
    }

    let mut offset = 0;
    let layers = manifest
        .layer_dims()
        .into_iter()
        .map(|(in_features, out_features)| {
            let w_len = in_features * out_features;
            let weights = values[offset..offset + w_len].to_vec();
            offset += w_len;
            let bias = values[offset..offset + out_features].to_vec();
            offset += out_features;
            DenseLayer {
                in_features,
                out_features,
                weights,
                bias,
            }
        })
        .collect();
    Ok(layers)
}
