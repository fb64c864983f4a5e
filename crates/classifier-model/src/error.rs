// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for model asset loading.

/// Errors that can occur while loading model assets.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Filesystem access failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The manifest is not valid JSON.
    #[error("manifest parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The manifest parsed but is internally inconsistent.
    #[error("invalid manifest: {0}")]
    InvalidManifest(String),

    /// The weights file length disagrees with the manifest's shapes.
    #[error("weight data mismatch: expected {expected} f32 values, file holds {actual}")]
    WeightDataMismatch { expected: usize, actual: usize },
}
