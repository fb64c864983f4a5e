// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Probability tensor → labeled classification.

use crate::PipelineError;
use tensor_core::{ops, Tensor};

/// The outcome of one inference cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceResult {
    /// Winning class index into the label table.
    pub class_index: usize,
    /// The winner's probability.
    pub confidence: f32,
    /// The winner's label.
    pub label: String,
}

impl std::fmt::Display for InferenceResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({:.1}%)",
            self.label,
            self.confidence * 100.0
        )
    }
}

/// Maps score tensors to labels via argmax.
///
/// Construction fails when the label count disagrees with the class
/// count, so a mismatched label file is caught before the first frame.
#[derive(Debug)]
pub struct ResultDecoder {
    labels: Vec<String>,
}

impl ResultDecoder {
    pub fn new(labels: Vec<String>, classes: usize) -> Result<Self, PipelineError> {
        if labels.len() != classes {
            return Err(PipelineError::LabelTableMismatch {
                labels: labels.len(),
                classes,
            });
        }
        Ok(Self { labels })
    }

    /// The label table, index-ordered.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Picks the highest-scoring class. Ties resolve to the lowest
    /// index.
    pub fn decode(&self, scores: &Tensor) -> Result<InferenceResult, PipelineError> {
        let values = scores.as_slice();
        if values.len() != self.labels.len() {
            return Err(PipelineError::LabelTableMismatch {
                labels: self.labels.len(),
                classes: values.len(),
            });
        }
        let class_index = ops::argmax(values).ok_or(PipelineError::LabelTableMismatch {
            labels: self.labels.len(),
            classes: 0,
        })?;
        Ok(InferenceResult {
            class_index,
            confidence: values[class_index],
            label: self.labels[class_index].clone(),
        })
    }
}
