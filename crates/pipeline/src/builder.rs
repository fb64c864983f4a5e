// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! RGB bytes → normalized NHWC input tensor.

use crate::PipelineError;
use tensor_core::{ops, Shape, Tensor};

/// Builds the model's input tensor from preprocessed RGB bytes.
///
/// Each byte `b` becomes `(b - 127) / 128`, mapping the pixel range onto
/// roughly `[-1, 1]` with 127 at zero.
pub struct TensorBuilder {
    shape: Shape,
}

impl TensorBuilder {
    /// `shape` is the model's declared NHWC input shape.
    pub fn new(shape: Shape) -> Self {
        Self { shape }
    }

    /// The shape every built tensor will have.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Converts a tightly packed byte image into the input tensor.
    ///
    /// # Errors
    /// Returns a tensor error when `bytes` does not hold exactly one
    /// element per tensor slot.
    pub fn build(&self, bytes: &[u8]) -> Result<Tensor, PipelineError> {
        let mut tensor = Tensor::zeros(self.shape.clone());
        ops::normalize(bytes, tensor.as_mut_slice())?;
        Ok(tensor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_normalizes() {
        let builder = TensorBuilder::new(Shape::image(1, 1, 3));
        let tensor = builder.build(&[127, 0, 255]).unwrap();
        let v = tensor.as_slice();
        assert_eq!(v[0], 0.0);
        assert_eq!(v[1], -0.9921875);
        assert_eq!(v[2], 1.0);
    }

    #[test]
    fn test_build_shape() {
        let builder = TensorBuilder::new(Shape::image(2, 2, 3));
        let tensor = builder.build(&[0u8; 12]).unwrap();
        assert_eq!(tensor.shape().dims(), &[1, 2, 2, 3]);
    }

    #[test]
    fn test_build_rejects_wrong_length() {
        let builder = TensorBuilder::new(Shape::image(2, 2, 3));
        assert!(builder.build(&[0u8; 11]).is_err());
    }
}
