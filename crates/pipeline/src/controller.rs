// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The tick-driven pipeline controller.
//!
//! Each tick advances a three-stage cycle: sample a frame and submit it
//! for scale/crop, poll the asynchronous readback, then run inference
//! and publish the decoded result. At most one frame is in flight;
//! frames arriving while the slot is busy are shed at the source.
//!
//! Losing the engine (a failed backend switch) pauses sampling without
//! stopping the tick loop — installing a working engine resumes it.

use crate::{
    FrameSource, PipelineConfig, PipelineError, PipelineMetrics, ResultDecoder, ResultSink,
    TensorBuilder,
};
use classifier_model::{load_labels, ModelHandle, ModelLoader};
use compute_backend::{create_engine, BackendKind, InferenceEngine};
use frame_preprocess::{ReadbackResult, ScaleCrop};
use std::time::Instant;

/// Where the in-flight frame currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// No frame in flight; the next tick samples the source.
    Idle,
    /// A scale/crop request is awaiting readback.
    AwaitingReadback,
    /// Inference is executing (transient within a tick).
    Inferring,
}

/// Orchestrates preprocessing, inference, and decoding.
pub struct PipelineController {
    model: ModelHandle,
    builder: TensorBuilder,
    decoder: ResultDecoder,
    preprocessor: Option<Box<dyn ScaleCrop>>,
    engine: Option<Box<dyn InferenceEngine>>,
    stage: Stage,
    target_size: u32,
    min_dimension: u32,
    profiling: bool,
    metrics: PipelineMetrics,
}

impl PipelineController {
    /// Loads the model and labels per `config` and builds the engine.
    ///
    /// Fails fast: a label/class mismatch or an unavailable backend is
    /// an error here, before any frame is touched.
    pub fn new(
        config: &PipelineConfig,
        preprocessor: Box<dyn ScaleCrop>,
    ) -> Result<Self, PipelineError> {
        config.validate()?;
        let model = ModelLoader::load(&config.model_dir)?;

        let model_size = model.manifest().input.height as u32;
        if let Some(requested) = config.target_size {
            if requested != model_size {
                return Err(PipelineError::Config(format!(
                    "target_size {requested} disagrees with the model input size {model_size}"
                )));
            }
        }

        let labels = match &config.labels_file {
            Some(path) => load_labels(path)?,
            None => (0..model.num_classes())
                .map(|i| format!("class {i}"))
                .collect(),
        };

        let backend: BackendKind = config.backend.parse()?;
        let mut controller = Self::from_model(
            model,
            labels,
            preprocessor,
            config.min_dimension,
        )?;
        controller.profiling = config.enable_profiling;
        controller.switch_backend(backend)?;
        Ok(controller)
    }

    /// Builds a controller around an already loaded model, without an
    /// engine installed. Callers follow up with [`switch_backend`] or
    /// [`install_engine`].
    ///
    /// [`switch_backend`]: Self::switch_backend
    /// [`install_engine`]: Self::install_engine
    pub fn from_model(
        model: ModelHandle,
        labels: Vec<String>,
        preprocessor: Box<dyn ScaleCrop>,
        min_dimension: u32,
    ) -> Result<Self, PipelineError> {
        // Preprocessing always delivers tightly packed RGB; any other
        // channel count would fail on every single frame, so refuse it
        // up front.
        let channels = model.manifest().input.channels;
        if channels != 3 {
            return Err(PipelineError::Config(format!(
                "preprocessing delivers 3-channel RGB frames, model expects {channels}"
            )));
        }
        let decoder = ResultDecoder::new(labels, model.num_classes())?;
        let builder = TensorBuilder::new(model.input_shape());
        let target_size = model.manifest().input.height as u32;
        Ok(Self {
            model,
            builder,
            decoder,
            preprocessor: Some(preprocessor),
            engine: None,
            stage: Stage::Idle,
            target_size,
            min_dimension,
            profiling: false,
            metrics: PipelineMetrics::new(),
        })
    }

    /// Runs one pipeline step.
    ///
    /// Without an engine the tick is a no-op — nothing is sampled. A
    /// readback failure returns [`PipelineError::Readback`] after
    /// resetting to [`Stage::Idle`]; the caller may log it and keep
    /// ticking. Inference-side failures never escape: the frame is
    /// dropped, the failure counted, and the tick returns `Ok`.
    pub fn tick(
        &mut self,
        source: &mut dyn FrameSource,
        sink: &mut dyn ResultSink,
    ) -> Result<(), PipelineError> {
        self.metrics.ticks += 1;
        if self.engine.is_none() {
            return Ok(());
        }

        match self.stage {
            Stage::Idle => self.sample(source),
            Stage::AwaitingReadback => self.collect(sink),
            // Inferring never persists across ticks.
            Stage::Inferring => Ok(()),
        }
    }

    fn sample(&mut self, source: &mut dyn FrameSource) -> Result<(), PipelineError> {
        let Some(frame) = source.poll_frame() else {
            return Ok(());
        };
        self.metrics.frames_seen += 1;

        if frame.width < self.min_dimension || frame.height < self.min_dimension {
            tracing::trace!(
                "skipping {}x{} frame below minimum dimension {}",
                frame.width,
                frame.height,
                self.min_dimension
            );
            self.metrics.frames_dropped += 1;
            return Ok(());
        }

        let Some(preprocessor) = self.preprocessor.as_mut() else {
            return Ok(());
        };
        if preprocessor.request_scale_crop(&frame.as_frame(), self.target_size)? {
            self.metrics.frames_submitted += 1;
            self.stage = Stage::AwaitingReadback;
        } else {
            self.metrics.frames_dropped += 1;
        }
        Ok(())
    }

    fn collect(&mut self, sink: &mut dyn ResultSink) -> Result<(), PipelineError> {
        let Some(preprocessor) = self.preprocessor.as_mut() else {
            return Ok(());
        };
        match preprocessor.poll() {
            None => Ok(()),
            Some(ReadbackResult::Failed) => {
                tracing::warn!("readback failed, dropping the in-flight frame");
                self.metrics.readback_failures += 1;
                self.stage = Stage::Idle;
                Err(PipelineError::Readback)
            }
            Some(ReadbackResult::Complete(rgb)) => {
                self.stage = Stage::Inferring;
                let started = Instant::now();
                let outcome = self.infer(&rgb);
                self.stage = Stage::Idle;

                match outcome {
                    Ok(result) => {
                        self.metrics.inferences += 1;
                        if self.profiling {
                            tracing::debug!(
                                "inference cycle took {:?}: {result}",
                                started.elapsed()
                            );
                        }
                        sink.publish(result);
                    }
                    // Per-frame failures drop the frame; the loop keeps
                    // running.
                    Err(e) => {
                        tracing::warn!("inference failed, frame dropped: {e}");
                        self.metrics.inference_failures += 1;
                    }
                }
                Ok(())
            }
        }
    }

    fn infer(&mut self, rgb: &[u8]) -> Result<crate::InferenceResult, PipelineError> {
        let Some(engine) = self.engine.as_mut() else {
            return Err(PipelineError::Config("no engine installed".into()));
        };
        let input = self.builder.build(rgb)?;
        let scores = engine.execute(&input)?;
        self.decoder.decode(&scores)
    }

    /// Replaces the engine with one of the given kind.
    ///
    /// The old engine is released before the new one is built, so two
    /// engines' GPU resources never coexist. On failure the controller
    /// is left without an engine and ticks stop sampling until a later
    /// switch succeeds.
    pub fn switch_backend(&mut self, kind: BackendKind) -> Result<(), PipelineError> {
        self.engine = None;
        match create_engine(kind, &self.model) {
            Ok(engine) => {
                tracing::info!("active backend: {kind}");
                self.engine = Some(engine);
                Ok(())
            }
            Err(e) => {
                tracing::error!("backend switch to '{kind}' failed: {e}");
                Err(e.into())
            }
        }
    }

    /// Installs an externally built engine (embedders, tests).
    pub fn install_engine(&mut self, engine: Box<dyn InferenceEngine>) {
        self.engine = Some(engine);
    }

    /// Releases the engine and the preprocessor (including its scratch
    /// GPU surfaces), then logs the final counters. Callable from any
    /// stage.
    pub fn shutdown(&mut self) {
        self.engine = None;
        self.preprocessor = None;
        self.stage = Stage::Idle;
        tracing::info!("pipeline shut down: {}", self.metrics.summary());
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn has_engine(&self) -> bool {
        self.engine.is_some()
    }

    pub fn target_size(&self) -> u32 {
        self.target_size
    }

    pub fn metrics(&self) -> &PipelineMetrics {
        &self.metrics
    }

    pub fn model(&self) -> &ModelHandle {
        &self.model
    }
}
