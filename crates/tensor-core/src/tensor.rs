// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The owned f32 tensor moved between pipeline stages.

use crate::{Shape, TensorError};

/// An owned, contiguous f32 tensor in row-major order.
///
/// `Tensor` is the unit of exchange with an inference engine. Each frame
/// cycle creates one input tensor and one output tensor, and both are
/// dropped at the end of the cycle — the pipeline never holds tensors
/// across frames.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    shape: Shape,
    data: Vec<f32>,
}

impl Tensor {
    /// Creates a new tensor filled with zeros.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::{Tensor, Shape};
    /// let t = Tensor::zeros(Shape::output(10));
    /// assert_eq!(t.as_slice().len(), 10);
    /// ```
    pub fn zeros(shape: Shape) -> Self {
        let len = shape.num_elements();
        Self {
            shape,
            data: vec![0.0; len],
        }
    }

    /// Creates a tensor from an owned value buffer.
    ///
    /// Returns [`TensorError::ElementCountMismatch`] if the buffer length
    /// does not match `shape.num_elements()`.
    pub fn from_vec(shape: Shape, data: Vec<f32>) -> Result<Self, TensorError> {
        let expected = shape.num_elements();
        if data.len() != expected {
            return Err(TensorError::ElementCountMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { shape, data })
    }

    /// Returns the tensor's shape.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Total number of elements (same as `shape().num_elements()`).
    pub fn num_elements(&self) -> usize {
        self.data.len()
    }

    /// Returns the values as a slice.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Returns the values as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Consumes the tensor, returning the raw value buffer.
    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeros() {
        let t = Tensor::zeros(Shape::image(2, 2, 3));
        assert_eq!(t.as_slice().len(), 12);
        assert!(t.as_slice().iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_from_vec() {
        let t = Tensor::from_vec(Shape::vector(3), vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(t.as_slice(), &[1.0, 2.0, 3.0]);
        assert_eq!(t.shape(), &Shape::vector(3));
    }

    #[test]
    fn test_from_vec_length_mismatch() {
        let err = Tensor::from_vec(Shape::vector(4), vec![1.0, 2.0]).unwrap_err();
        match err {
            TensorError::ElementCountMismatch { expected, actual } => {
                assert_eq!(expected, 4);
                assert_eq!(actual, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_into_vec_roundtrip() {
        let t = Tensor::from_vec(Shape::vector(2), vec![0.5, -0.5]).unwrap();
        assert_eq!(t.into_vec(), vec![0.5, -0.5]);
    }

    #[test]
    fn test_mutation() {
        let mut t = Tensor::zeros(Shape::vector(3));
        t.as_mut_slice()[1] = 7.0;
        assert_eq!(t.as_slice(), &[0.0, 7.0, 0.0]);
    }
}
