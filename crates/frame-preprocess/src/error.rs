// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for preprocessing.

/// Errors raised while setting up or requesting a scale/crop pass.
#[derive(Debug, thiserror::Error)]
pub enum PreprocessError {
    /// No GPU adapter or the device request failed.
    #[error("GPU preprocessing is unavailable: {0}")]
    Unavailable(String),

    /// The submitted frame is malformed (zero dimensions or a pixel
    /// buffer that disagrees with them).
    #[error("invalid frame: {0}")]
    InvalidFrame(String),

    /// The requested target size is zero.
    #[error("target size must be positive")]
    ZeroTargetSize,
}
