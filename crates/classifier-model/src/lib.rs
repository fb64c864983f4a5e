// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # classifier-model
//!
//! Model assets for the live classification pipeline: the JSON manifest
//! describing tensor names and shapes, the quote-delimited label table,
//! and the dense-layer weights.
//!
//! Loading either succeeds with a fully usable [`ModelHandle`] or fails
//! with an explicit [`ModelError`] — there is no partially loaded state.

mod error;
mod labels;
mod loader;
mod manifest;

pub use error::ModelError;
pub use labels::{load_labels, parse_labels};
pub use loader::{DenseLayer, ModelHandle, ModelLoader};
pub use manifest::{InputSpec, ModelManifest, OutputSpec};
