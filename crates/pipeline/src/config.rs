// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Pipeline configuration, loaded from TOML.
//!
//! ```toml
//! model_dir = "models/mobile-head"
//! labels_file = "models/mobile-head/labels.txt"
//! backend = "cpu-vectorized"
//! target_size = 224
//! min_dimension = 1
//! enable_profiling = false
//! ```

use crate::PipelineError;
use std::path::{Path, PathBuf};

/// Top-level pipeline configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PipelineConfig {
    /// Directory holding `model.json` (and optionally `weights.bin`).
    pub model_dir: PathBuf,

    /// Quote-delimited label file. When absent, numeric placeholder
    /// labels are generated from the class count.
    #[serde(default)]
    pub labels_file: Option<PathBuf>,

    /// Backend name, as understood by `BackendKind::from_str`.
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Square preprocessing target in pixels. When set, it must agree
    /// with the model manifest's input size; when absent the manifest
    /// decides.
    #[serde(default)]
    pub target_size: Option<u32>,

    /// Frames with either dimension below this are skipped unsampled.
    #[serde(default = "default_min_dimension")]
    pub min_dimension: u32,

    /// Emit per-stage timing at debug level.
    #[serde(default)]
    pub enable_profiling: bool,
}

fn default_backend() -> String {
    "cpu-vectorized".into()
}

fn default_min_dimension() -> u32 {
    1
}

impl PipelineConfig {
    /// Creates a configuration with defaults for everything but the
    /// model directory.
    pub fn new(model_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
            labels_file: None,
            backend: default_backend(),
            target_size: None,
            min_dimension: default_min_dimension(),
            enable_profiling: false,
        }
    }

    /// Loads a configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, PipelineError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| PipelineError::Config(format!("cannot read '{}': {e}", path.display())))?;
        Self::from_toml(&content)
    }

    /// Parses a configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, PipelineError> {
        let config: Self =
            toml::from_str(content).map_err(|e| PipelineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the configuration back to TOML.
    pub fn to_toml(&self) -> Result<String, PipelineError> {
        toml::to_string_pretty(self).map_err(|e| PipelineError::Config(e.to_string()))
    }

    /// Checks value ranges (paths are only checked at load time).
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.min_dimension == 0 {
            return Err(PipelineError::Config(
                "min_dimension must be at least 1".into(),
            ));
        }
        if self.target_size == Some(0) {
            return Err(PipelineError::Config("target_size must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full() {
        let config = PipelineConfig::from_toml(
            r#"
            model_dir = "models/head"
            labels_file = "models/head/labels.txt"
            backend = "gpu-compute"
            target_size = 224
            min_dimension = 16
            enable_profiling = true
            "#,
        )
        .unwrap();
        assert_eq!(config.backend, "gpu-compute");
        assert_eq!(config.target_size, Some(224));
        assert_eq!(config.min_dimension, 16);
        assert!(config.enable_profiling);
    }

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::from_toml(r#"model_dir = "m""#).unwrap();
        assert_eq!(config.backend, "cpu-vectorized");
        assert_eq!(config.target_size, None);
        assert_eq!(config.min_dimension, 1);
        assert!(!config.enable_profiling);
        assert!(config.labels_file.is_none());
    }

    #[test]
    fn test_zero_min_dimension_rejected() {
        let err = PipelineConfig::from_toml(
            r#"
            model_dir = "m"
            min_dimension = 0
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = PipelineConfig::new("models/head");
        let back = PipelineConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(back.model_dir, config.model_dir);
        assert_eq!(back.backend, config.backend);
    }
}
