// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # compute-backend
//!
//! Interchangeable inference engines behind a single [`InferenceEngine`]
//! trait. Three backends execute the same dense-layer model:
//!
//! - [`BackendKind::CpuVectorized`] — auto-vectorised CPU loops.
//! - [`BackendKind::GpuCompute`] — a wgpu compute shader, one invocation
//!   per output neuron.
//! - [`BackendKind::GpuShader`] — a wgpu render pipeline whose fragment
//!   shader writes one neuron per pixel of a 1-row float target.
//!
//! All three produce the same probability distribution for the same input
//! (within floating-point tolerance), so the pipeline can switch between
//! them at runtime without changing results.

mod compute;
mod cpu;
mod error;
mod gpu;
mod shader;

pub use compute::GpuComputeEngine;
pub use cpu::CpuEngine;
pub use error::BackendError;
pub use gpu::GpuContext;
pub use shader::GpuShaderEngine;

use classifier_model::ModelHandle;
use std::str::FromStr;
use tensor_core::Tensor;

// ── Backend selection ───────────────────────────────────────────────────

/// The available execution backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// Dense layers on the CPU, relying on auto-vectorisation.
    CpuVectorized,
    /// Dense layers as a GPU compute shader dispatch.
    GpuCompute,
    /// Dense layers as a GPU fragment shader draw.
    GpuShader,
}

impl BackendKind {
    /// All kinds, in preference order (CPU first — it always works).
    pub fn all() -> [BackendKind; 3] {
        [
            BackendKind::CpuVectorized,
            BackendKind::GpuCompute,
            BackendKind::GpuShader,
        ]
    }

    /// Canonical name, as accepted by [`FromStr`].
    pub fn name(&self) -> &'static str {
        match self {
            BackendKind::CpuVectorized => "cpu-vectorized",
            BackendKind::GpuCompute => "gpu-compute",
            BackendKind::GpuShader => "gpu-shader",
        }
    }

    /// Returns `true` if this backend needs a GPU adapter.
    pub fn requires_gpu(&self) -> bool {
        !matches!(self, BackendKind::CpuVectorized)
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for BackendKind {
    type Err = BackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cpu" | "cpu-vectorized" => Ok(BackendKind::CpuVectorized),
            "compute" | "gpu-compute" => Ok(BackendKind::GpuCompute),
            "shader" | "gpu-shader" | "pixel-shader" => Ok(BackendKind::GpuShader),
            other => Err(BackendError::UnknownKind(other.to_string())),
        }
    }
}

// ── Engine trait ────────────────────────────────────────────────────────

/// A built, ready-to-run inference engine.
///
/// Engines own whatever resources they need (scratch buffers, GPU
/// pipelines, uploaded weights); those resources are released when the
/// engine is dropped. `execute` is synchronous from the caller's view —
/// the pipeline schedules around it.
pub trait InferenceEngine {
    /// Which backend this engine runs on.
    fn kind(&self) -> BackendKind;

    /// Runs the model over `input` and returns the `[1, classes]`
    /// probability tensor (softmax applied).
    ///
    /// # Errors
    /// Returns [`BackendError::Input`] when `input`'s shape disagrees
    /// with the model's declared input shape.
    fn execute(&mut self, input: &Tensor) -> Result<Tensor, BackendError>;
}

/// Builds an engine of the requested kind for the given model.
///
/// GPU kinds acquire an adapter eagerly, so an unusable machine fails
/// here rather than at first inference.
///
/// # Errors
/// Returns [`BackendError::InvalidModel`] for a layer-less model and
/// [`BackendError::Unsupported`] when a GPU kind finds no adapter.
pub fn create_engine(
    kind: BackendKind,
    model: &ModelHandle,
) -> Result<Box<dyn InferenceEngine>, BackendError> {
    if model.layers().is_empty() {
        return Err(BackendError::InvalidModel(
            "model has no dense layers".into(),
        ));
    }
    tracing::info!("creating '{kind}' engine for model '{}'", model.manifest().name);
    match kind {
        BackendKind::CpuVectorized => Ok(Box::new(CpuEngine::new(model))),
        BackendKind::GpuCompute => Ok(Box::new(GpuComputeEngine::new(model)?)),
        BackendKind::GpuShader => Ok(Box::new(GpuShaderEngine::new(model)?)),
    }
}
