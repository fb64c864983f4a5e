// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # tensor-core
//!
//! Tensor types and math kernels for the live classification pipeline.
//!
//! The pipeline moves exactly one tensor per frame, so the types here are
//! deliberately small: a [`Shape`] descriptor, an owned f32 [`Tensor`] in
//! row-major NHWC layout, and the handful of operations the pipeline and
//! the CPU backend need ([`ops::normalize`], [`ops::dense`],
//! [`ops::softmax_in_place`], [`ops::argmax`]).
//!
//! Tensors are passed by value between stages — ownership transfer is the
//! sharing model, never `Arc`.

mod error;
pub mod ops;
mod shape;
mod tensor;

pub use error::TensorError;
pub use shape::Shape;
pub use tensor::Tensor;
