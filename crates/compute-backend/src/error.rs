// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for backend selection and execution.

use crate::BackendKind;
use tensor_core::TensorError;

/// Errors raised while creating or running an inference engine.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The requested backend cannot run on this machine (e.g., no GPU
    /// adapter). Callers should fall back or surface the failure; they
    /// must not retry blindly.
    #[error("backend '{kind}' is unavailable: {detail}")]
    Unsupported { kind: BackendKind, detail: String },

    /// The backend name did not match any known kind.
    #[error("unknown backend '{0}' (expected one of: cpu-vectorized, gpu-compute, gpu-shader)")]
    UnknownKind(String),

    /// The model cannot be executed (e.g., no layers).
    #[error("model rejected: {0}")]
    InvalidModel(String),

    /// The input tensor does not match the engine's expected shape.
    #[error("input rejected: {0}")]
    Input(#[from] TensorError),

    /// A GPU operation failed after the engine was built.
    #[error("GPU execution failed: {0}")]
    Gpu(String),
}
