// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Math kernels used by the pipeline and the CPU backend.
//!
//! Each operation works on plain slices and pre-allocated outputs so the
//! per-frame hot path performs no hidden allocations. The loops are
//! written to auto-vectorise on current rustc.

mod argmax_op;
mod dense_op;
mod normalize_op;
mod softmax_op;

pub use argmax_op::argmax;
pub use dense_op::dense;
pub use normalize_op::normalize;
pub use softmax_op::softmax_in_place;
