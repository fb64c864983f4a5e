// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The `run` subcommand: tick the pipeline at a fixed rate over a
//! synthetic camera feed and log the classifications.

use classifier_model::{ModelLoader, ModelManifest};
use clap::Args;
use frame_preprocess::{GpuPreprocessor, ScaleCrop, SoftwarePreprocessor};
use pipeline::{
    FrameSource, LatestResult, OwnedFrame, PipelineConfig, PipelineController,
    PipelineError,
};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Args)]
pub struct RunArgs {
    /// Model directory holding model.json (and optionally weights.bin).
    /// Without it a built-in demo model with synthetic weights is used.
    #[arg(long)]
    model: Option<PathBuf>,

    /// Quote-delimited label file.
    #[arg(long)]
    labels: Option<PathBuf>,

    /// Inference backend: cpu-vectorized, gpu-compute, or gpu-shader.
    #[arg(long, default_value = "cpu-vectorized")]
    backend: String,

    /// How many ticks to run.
    #[arg(long, default_value_t = 300)]
    ticks: u64,

    /// Milliseconds between ticks.
    #[arg(long, default_value_t = 33)]
    interval_ms: u64,

    /// Skip the GPU preprocessor even when an adapter exists.
    #[arg(long)]
    software_preprocess: bool,

    /// Log per-cycle timing at debug level.
    #[arg(long)]
    profile: bool,
}

/// A camera stand-in: a horizontally drifting gradient, so consecutive
/// frames differ and the pipeline has something to chew on.
struct GradientSource {
    width: u32,
    height: u32,
    phase: u32,
}

impl GradientSource {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            phase: 0,
        }
    }
}

impl FrameSource for GradientSource {
    fn poll_frame(&mut self) -> Option<OwnedFrame> {
        self.phase = self.phase.wrapping_add(3);
        let mut pixels = Vec::with_capacity((self.width * self.height * 4) as usize);
        for y in 0..self.height {
            for x in 0..self.width {
                let r = ((x + self.phase) % self.width * 255 / self.width) as u8;
                let g = (y * 255 / self.height) as u8;
                pixels.extend_from_slice(&[r, g, 128, 255]);
            }
        }
        Some(OwnedFrame {
            pixels,
            width: self.width,
            height: self.height,
        })
    }
}

fn select_preprocessor(force_software: bool) -> Box<dyn ScaleCrop> {
    if !force_software {
        match GpuPreprocessor::new() {
            Ok(gpu) => return Box::new(gpu),
            Err(e) => tracing::warn!("falling back to software preprocessing: {e}"),
        }
    }
    Box::new(SoftwarePreprocessor::new(1))
}

fn demo_manifest() -> anyhow::Result<ModelManifest> {
    Ok(ModelManifest::from_json(
        r#"{
            "name": "demo",
            "input": { "name": "images", "height": 32, "width": 32, "channels": 3 },
            "output": { "name": "Softmax", "classes": 5 },
            "hidden": [24]
        }"#,
    )?)
}

fn build_controller(args: &RunArgs) -> anyhow::Result<PipelineController> {
    let preprocessor = select_preprocessor(args.software_preprocess);

    if let Some(model_dir) = &args.model {
        let mut config = PipelineConfig::new(model_dir);
        config.labels_file = args.labels.clone();
        config.backend = args.backend.clone();
        config.enable_profiling = args.profile;
        return Ok(PipelineController::new(&config, preprocessor)?);
    }

    tracing::info!("no --model given, running the built-in demo model");
    let model = ModelLoader::synthetic(demo_manifest()?);
    let labels = vec![
        "ambient".into(),
        "gradient".into(),
        "edge".into(),
        "texture".into(),
        "flat".into(),
    ];
    let mut controller = PipelineController::from_model(model, labels, preprocessor, 1)?;
    controller.switch_backend(args.backend.parse()?)?;
    Ok(controller)
}

pub async fn run(args: RunArgs) -> anyhow::Result<()> {
    let mut controller = build_controller(&args)?;
    let mut source = GradientSource::new(64, 48);
    let mut sink = LatestResult::new();

    tracing::info!(
        "running {} ticks at {}ms over a {}px target",
        args.ticks,
        args.interval_ms,
        controller.target_size()
    );

    let mut interval = tokio::time::interval(Duration::from_millis(args.interval_ms));
    let mut published = 0;
    for _ in 0..args.ticks {
        interval.tick().await;
        match controller.tick(&mut source, &mut sink) {
            Ok(()) => {}
            // Per-frame errors lose one frame; the loop keeps going.
            Err(PipelineError::Readback) => tracing::warn!("frame lost to readback failure"),
            Err(e) => tracing::warn!("tick failed, frame dropped: {e}"),
        }
        if sink.total() > published {
            published = sink.total();
            if let Some(result) = sink.latest() {
                tracing::info!("classified: {result}");
            }
        }
    }

    controller.shutdown();
    Ok(())
}
