// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Softmax activation operation.

/// Computes softmax over the slice in place:
/// `x[i] = exp(x[i] - max) / sum(exp(x - max))`.
///
/// Uses the numerically stable variant that subtracts the maximum value
/// before exponentiation to prevent overflow. An empty slice is a no-op.
pub fn softmax_in_place(values: &mut [f32]) {
    if values.is_empty() {
        return;
    }

    let max_val = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);

    let mut sum = 0.0f32;
    for v in values.iter_mut() {
        let e = (*v - max_val).exp();
        *v = e;
        sum += e;
    }

    if sum > 0.0 {
        let inv_sum = 1.0 / sum;
        for v in values.iter_mut() {
            *v *= inv_sum;
        }
    }
}
