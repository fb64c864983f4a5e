// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! JSON model manifest parsing.
//!
//! The manifest (`model.json`) declares the classifier's tensor names and
//! shapes, and the widths of its dense layers. The pipeline validates its
//! tensors against these shapes before every inference.
//!
//! # Format
//! ```json
//! {
//!   "name": "mobile-head",
//!   "input": { "name": "images", "height": 224, "width": 224, "channels": 3 },
//!   "output": { "name": "Softmax", "classes": 10 },
//!   "hidden": [64]
//! }
//! ```

use crate::ModelError;
use std::path::Path;
use tensor_core::Shape;

/// Input tensor declaration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct InputSpec {
    /// Input tensor name (e.g., `"images"`).
    pub name: String,
    /// Input height in pixels.
    pub height: usize,
    /// Input width in pixels.
    pub width: usize,
    /// Channel count (3 for RGB).
    #[serde(default = "default_channels")]
    pub channels: usize,
}

fn default_channels() -> usize {
    3
}

/// Output tensor declaration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct OutputSpec {
    /// Output tensor name (e.g., `"Softmax"`).
    pub name: String,
    /// Number of classes the model scores.
    pub classes: usize,
}

/// Top-level model manifest, deserialized from `model.json`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ModelManifest {
    /// Human-readable model name.
    pub name: String,
    /// Input tensor declaration.
    pub input: InputSpec,
    /// Output tensor declaration.
    pub output: OutputSpec,
    /// Hidden dense-layer widths between input and output, in order.
    /// Empty means a single input→output layer.
    #[serde(default)]
    pub hidden: Vec<usize>,
}

impl ModelManifest {
    /// Loads a manifest from a JSON file path.
    pub fn from_file(path: &Path) -> Result<Self, ModelError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parses a manifest from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let manifest: Self = serde_json::from_str(json)?;
        Ok(manifest)
    }

    /// Validates that the manifest is internally consistent.
    ///
    /// Checks that the input is square with positive dimensions, that the
    /// channel count is RGB-compatible, that at least one class exists,
    /// and that no hidden layer has zero width.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.input.height == 0 || self.input.width == 0 {
            return Err(ModelError::InvalidManifest(format!(
                "input dimensions must be positive, got {}x{}",
                self.input.width, self.input.height
            )));
        }
        if self.input.height != self.input.width {
            return Err(ModelError::InvalidManifest(format!(
                "input must be square, got {}x{}",
                self.input.width, self.input.height
            )));
        }
        if self.input.channels == 0 || self.input.channels > 4 {
            return Err(ModelError::InvalidManifest(format!(
                "unsupported channel count {}",
                self.input.channels
            )));
        }
        if self.output.classes == 0 {
            return Err(ModelError::InvalidManifest(
                "output must score at least one class".into(),
            ));
        }
        if let Some(zero) = self.hidden.iter().position(|&w| w == 0) {
            return Err(ModelError::InvalidManifest(format!(
                "hidden layer {zero} has zero width"
            )));
        }
        Ok(())
    }

    /// Returns the declared NHWC input shape.
    pub fn input_shape(&self) -> Shape {
        Shape::image(self.input.height, self.input.width, self.input.channels)
    }

    /// Returns the declared `[1, classes]` output shape.
    pub fn output_shape(&self) -> Shape {
        Shape::output(self.output.classes)
    }

    /// Returns the `(in_features, out_features)` pair for every dense
    /// layer, input to output.
    pub fn layer_dims(&self) -> Vec<(usize, usize)> {
        let mut widths = Vec::with_capacity(self.hidden.len() + 2);
        widths.push(self.input_shape().num_elements());
        widths.extend_from_slice(&self.hidden);
        widths.push(self.output.classes);
        widths.windows(2).map(|w| (w[0], w[1])).collect()
    }

    /// Total number of f32 values (weights plus biases) across all layers.
    pub fn total_parameters(&self) -> usize {
        self.layer_dims()
            .iter()
            .map(|&(i, o)| i * o + o)
            .sum()
    }

    /// Returns a one-line human-readable summary.
    pub fn summary(&self) -> String {
        format!(
            "Model '{}': input '{}' {}x{}x{}, output '{}' with {} classes, {} dense layers, {} parameters",
            self.name,
            self.input.name,
            self.input.width,
            self.input.height,
            self.input.channels,
            self.output.name,
            self.output.classes,
            self.layer_dims().len(),
            self.total_parameters(),
        )
    }
}
