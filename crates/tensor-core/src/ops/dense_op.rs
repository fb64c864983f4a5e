// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Fully connected layer: `output = activation(weights · input + bias)`.

use crate::TensorError;

/// Computes a dense layer over a flat input vector.
///
/// `weights` is row-major `[out_features][in_features]`; `bias` and
/// `output` have `out_features` elements. When `relu` is set, negative
/// pre-activations are clamped to zero.
///
/// The inner product runs over contiguous weight rows, which rustc
/// auto-vectorises — this is the "CPU-vectorized" execution path.
///
/// # Errors
/// Returns [`TensorError::DimensionMismatch`] when the slice lengths are
/// inconsistent.
pub fn dense(
    input: &[f32],
    weights: &[f32],
    bias: &[f32],
    output: &mut [f32],
    relu: bool,
) -> Result<(), TensorError> {
    let in_features = input.len();
    let out_features = output.len();

    if bias.len() != out_features {
        return Err(TensorError::DimensionMismatch {
            op: "dense",
            detail: format!(
                "bias has {} elements, expected {out_features}",
                bias.len()
            ),
        });
    }
    if weights.len() != in_features * out_features {
        return Err(TensorError::DimensionMismatch {
            op: "dense",
            detail: format!(
                "weights has {} elements, expected {in_features}x{out_features}",
                weights.len()
            ),
        });
    }

    for (o, (dst, &b)) in output.iter_mut().zip(bias.iter()).enumerate() {
        let row = &weights[o * in_features..(o + 1) * in_features];
        let acc: f32 = row.iter().zip(input.iter()).map(|(w, x)| w * x).sum();
        let v = acc + b;
        *dst = if relu { v.max(0.0) } else { v };
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dense_identity() {
        // 2x2 identity weights, zero bias.
        let input = [3.0, -4.0];
        let weights = [1.0, 0.0, 0.0, 1.0];
        let bias = [0.0, 0.0];
        let mut output = [0.0; 2];

        dense(&input, &weights, &bias, &mut output, false).unwrap();
        assert_eq!(output, [3.0, -4.0]);
    }

    #[test]
    fn test_dense_relu_clamps() {
        let input = [3.0, -4.0];
        let weights = [1.0, 0.0, 0.0, 1.0];
        let bias = [0.0, 0.0];
        let mut output = [0.0; 2];

        dense(&input, &weights, &bias, &mut output, true).unwrap();
        assert_eq!(output, [3.0, 0.0]);
    }

    #[test]
    fn test_dense_bias_and_mix() {
        // output[0] = 1*1 + 2*2 + 0.5 = 5.5
        // output[1] = 3*1 + 4*2 - 1.0 = 10.0
        let input = [1.0, 2.0];
        let weights = [1.0, 2.0, 3.0, 4.0];
        let bias = [0.5, -1.0];
        let mut output = [0.0; 2];

        dense(&input, &weights, &bias, &mut output, false).unwrap();
        assert!((output[0] - 5.5).abs() < 1e-6);
        assert!((output[1] - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_dense_bad_weight_count() {
        let input = [1.0, 2.0];
        let weights = [1.0, 2.0, 3.0];
        let bias = [0.0, 0.0];
        let mut output = [0.0; 2];
        assert!(dense(&input, &weights, &bias, &mut output, false).is_err());
    }

    #[test]
    fn test_dense_bad_bias_count() {
        let input = [1.0];
        let weights = [1.0, 1.0];
        let bias = [0.0];
        let mut output = [0.0; 2];
        assert!(dense(&input, &weights, &bias, &mut output, false).is_err());
    }
}
