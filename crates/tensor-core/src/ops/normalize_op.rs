// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Byte-to-float affine normalization.

use crate::TensorError;

/// Maps each pixel byte into an approximately `[-1, 1)` float via
/// `(b - 127) / 128`.
///
/// The output slice must be exactly as long as the input. Byte 127 maps
/// to 0.0, byte 0 to −0.9921875, byte 255 to 1.0.
///
/// # Errors
/// Returns [`TensorError::ElementCountMismatch`] if the lengths differ.
pub fn normalize(bytes: &[u8], output: &mut [f32]) -> Result<(), TensorError> {
    if bytes.len() != output.len() {
        return Err(TensorError::ElementCountMismatch {
            expected: output.len(),
            actual: bytes.len(),
        });
    }

    for (dst, &b) in output.iter_mut().zip(bytes.iter()) {
        *dst = (b as f32 - 127.0) / 128.0;
    }

    Ok(())
}
