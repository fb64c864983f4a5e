// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # pipeline
//!
//! Orchestration of the live classification loop: frames come in from a
//! [`FrameSource`], pass through an asynchronous scale/crop stage, become
//! normalized tensors, run through an interchangeable inference backend,
//! and leave as labeled [`InferenceResult`]s in a [`ResultSink`].
//!
//! The whole loop is driven by [`PipelineController::tick`] with a
//! single-frame in-flight discipline: while one frame is being processed
//! every newer frame is dropped, so a slow backend degrades the
//! classification rate instead of growing a queue.

mod builder;
mod config;
mod controller;
mod decoder;
mod error;
mod metrics;
mod source;

pub use builder::TensorBuilder;
pub use config::PipelineConfig;
pub use controller::{PipelineController, Stage};
pub use decoder::{InferenceResult, ResultDecoder};
pub use error::PipelineError;
pub use metrics::PipelineMetrics;
pub use source::{FrameSource, LatestResult, OwnedFrame, ResultSink};
