// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Tensor shape descriptors.

use std::fmt;

/// Describes the dimensionality of a [`crate::Tensor`].
///
/// Shapes are immutable once created. Classification tensors use the
/// NHWC convention throughout: inputs are `[1, height, width, channels]`
/// and model outputs are `[1, classes]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Shape {
    dims: Vec<usize>,
}

impl Shape {
    /// Creates a new shape from the given dimensions.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::Shape;
    /// let s = Shape::new(vec![1, 224, 224, 3]);
    /// assert_eq!(s.rank(), 4);
    /// assert_eq!(s.num_elements(), 150_528);
    /// ```
    pub fn new(dims: Vec<usize>) -> Self {
        Self { dims }
    }

    /// Creates a 1-D shape.
    pub fn vector(len: usize) -> Self {
        Self { dims: vec![len] }
    }

    /// Creates a batch-of-one NHWC image shape `[1, height, width, channels]`.
    pub fn image(height: usize, width: usize, channels: usize) -> Self {
        Self {
            dims: vec![1, height, width, channels],
        }
    }

    /// Creates a batch-of-one output shape `[1, classes]`.
    pub fn output(classes: usize) -> Self {
        Self {
            dims: vec![1, classes],
        }
    }

    /// Returns the number of dimensions (rank).
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Returns the total number of elements.
    ///
    /// For an empty shape (rank 0), returns 1.
    pub fn num_elements(&self) -> usize {
        if self.dims.is_empty() {
            1
        } else {
            self.dims.iter().product()
        }
    }

    /// Returns the dimensions as a slice.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Returns the size of a specific dimension, or `None` if out of bounds.
    pub fn dim(&self, index: usize) -> Option<usize> {
        self.dims.get(index).copied()
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, d) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{d}")?;
        }
        write!(f, "]")
    }
}

/// Convenience: `Shape::from(vec![1, 224, 224, 3])`.
impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Self::new(dims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_shape() {
        let s = Shape::image(224, 224, 3);
        assert_eq!(s.rank(), 4);
        assert_eq!(s.dims(), &[1, 224, 224, 3]);
        assert_eq!(s.num_elements(), 224 * 224 * 3);
    }

    #[test]
    fn test_output_shape() {
        let s = Shape::output(1000);
        assert_eq!(s.dims(), &[1, 1000]);
        assert_eq!(s.num_elements(), 1000);
    }

    #[test]
    fn test_vector_shape() {
        let s = Shape::vector(5);
        assert_eq!(s.rank(), 1);
        assert_eq!(s.num_elements(), 5);
    }

    #[test]
    fn test_dim_access() {
        let s = Shape::image(8, 16, 3);
        assert_eq!(s.dim(1), Some(8));
        assert_eq!(s.dim(2), Some(16));
        assert_eq!(s.dim(4), None);
    }

    #[test]
    fn test_display() {
        let s = Shape::new(vec![1, 2, 3]);
        assert_eq!(format!("{s}"), "[1, 2, 3]");
    }

    #[test]
    fn test_empty_shape_one_element() {
        let s = Shape::new(vec![]);
        assert_eq!(s.num_elements(), 1);
    }
}
