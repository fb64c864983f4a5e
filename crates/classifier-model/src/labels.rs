// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Quote-delimited label table parsing.
//!
//! Label files are plain text where each label sits between double
//! quotes, e.g. `"cat","dog","bird"`. Splitting on `"` puts the quoted
//! spans at odd indices (1, 3, 5, …) of the split sequence; those spans,
//! in order, form the output-index → label mapping.

use crate::ModelError;
use std::path::Path;

/// Parses a quote-delimited label file into an ordered label list.
///
/// # Examples
/// ```
/// let labels = classifier_model::parse_labels(r#""cat","dog","bird""#);
/// assert_eq!(labels, vec!["cat", "dog", "bird"]);
/// ```
pub fn parse_labels(text: &str) -> Vec<String> {
    text.split('"')
        .enumerate()
        .filter(|(i, _)| i % 2 == 1)
        .map(|(_, s)| s.to_string())
        .collect()
}

/// Reads and parses a label file from disk.
pub fn load_labels(path: &Path) -> Result<Vec<String>, ModelError> {
    let text = std::fs::read_to_string(path)?;
    let labels = parse_labels(&text);
    tracing::debug!("loaded {} labels from '{}'", labels.len(), path.display());
    Ok(labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic() {
        let labels = parse_labels(r#""cat","dog","bird""#);
        assert_eq!(labels, vec!["cat", "dog", "bird"]);
    }

    #[test]
    fn test_parse_preserves_order() {
        let labels = parse_labels(r#""zebra","apple","mango""#);
        assert_eq!(labels, vec!["zebra", "apple", "mango"]);
    }

    #[test]
    fn test_parse_ignores_text_outside_quotes() {
        // Separators and stray text between quoted spans are not labels.
        let labels = parse_labels("0: \"cat\",\n1: \"dog\"\n");
        assert_eq!(labels, vec!["cat", "dog"]);
    }

    #[test]
    fn test_parse_label_with_comma_inside() {
        let labels = parse_labels(r#""great white, shark","tiger""#);
        assert_eq!(labels, vec!["great white, shark", "tiger"]);
    }

    #[test]
    fn test_parse_empty_input() {
        assert!(parse_labels("").is_empty());
        assert!(parse_labels("no quotes here").is_empty());
    }
}
