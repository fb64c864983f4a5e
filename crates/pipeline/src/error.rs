// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for pipeline construction and ticking.

use classifier_model::ModelError;
use compute_backend::BackendError;
use frame_preprocess::PreprocessError;
use tensor_core::TensorError;

/// Errors surfaced by the pipeline controller.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The configuration file or its values are invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// A device-to-host readback failed; the frame is lost but the
    /// pipeline keeps running.
    #[error("frame readback failed")]
    Readback,

    /// The label table length disagrees with the model's class count.
    /// Raised at construction, before any frame is processed.
    #[error("label table mismatch: {labels} labels for {classes} classes")]
    LabelTableMismatch { labels: usize, classes: usize },

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("backend selection failed: {0}")]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Preprocess(#[from] PreprocessError),

    #[error(transparent)]
    Tensor(#[from] TensorError),
}
