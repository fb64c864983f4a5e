// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for tensor operations.

use crate::Shape;

/// Errors that can occur during tensor construction and math operations.
#[derive(Debug, thiserror::Error)]
pub enum TensorError {
    /// A buffer length does not match the element count implied by a shape.
    #[error("element count mismatch: expected {expected}, got {actual}")]
    ElementCountMismatch { expected: usize, actual: usize },

    /// Two tensors have incompatible shapes for the requested operation.
    #[error("incompatible shapes for {op}: {lhs} vs {rhs}")]
    ShapeMismatch {
        op: &'static str,
        lhs: Shape,
        rhs: Shape,
    },

    /// Slice dimensions disagree with the operation's contract.
    #[error("dimension mismatch in {op}: {detail}")]
    DimensionMismatch {
        op: &'static str,
        detail: String,
    },
}
