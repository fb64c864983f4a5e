// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Shared GPU plumbing for the compute and shader engines: adapter
//! acquisition, weight upload, and synchronous buffer readback.

use crate::{BackendError, BackendKind};
use classifier_model::ModelHandle;
use wgpu::util::DeviceExt;

/// An acquired wgpu device/queue pair.
///
/// Each GPU engine owns its own context; dropping the engine drops the
/// device and every resource created from it.
pub struct GpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub adapter_name: String,
}

impl GpuContext {
    /// Requests a high-performance adapter and a device with default
    /// limits.
    ///
    /// # Errors
    /// Returns [`BackendError::Unsupported`] when no adapter exists or
    /// the device request fails — the caller decides whether to fall
    /// back to the CPU backend.
    pub fn acquire(kind: BackendKind) -> Result<Self, BackendError> {
        let instance = wgpu::Instance::default();
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            ..Default::default()
        }))
        .ok_or_else(|| BackendError::Unsupported {
            kind,
            detail: "no GPU adapter found".into(),
        })?;

        let info = adapter.get_info();
        tracing::debug!("acquired adapter '{}' ({:?})", info.name, info.backend);

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("classifier device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
            },
            None,
        ))
        .map_err(|e| BackendError::Unsupported {
            kind,
            detail: format!("device request failed: {e}"),
        })?;

        Ok(Self {
            device,
            queue,
            adapter_name: info.name,
        })
    }

    /// Blocks until `buffer` is mappable, then copies out `count` f32
    /// values from its start.
    ///
    /// The buffer must have `MAP_READ` usage and already hold the
    /// submitted results.
    pub fn read_back_f32(
        &self,
        buffer: &wgpu::Buffer,
        count: usize,
    ) -> Result<Vec<f32>, BackendError> {
        let slice = buffer.slice(..(count * 4) as u64);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |res| {
            tx.send(res).ok();
        });
        let _ = self.device.poll(wgpu::Maintain::Wait);

        rx.recv()
            .map_err(|_| BackendError::Gpu("readback channel closed".into()))?
            .map_err(|e| BackendError::Gpu(format!("buffer map failed: {e}")))?;

        let values = {
            let view = slice.get_mapped_range();
            bytemuck::cast_slice::<u8, f32>(&view).to_vec()
        };
        buffer.unmap();
        Ok(values)
    }
}

// ── Layer resources ─────────────────────────────────────────────────────

/// Per-layer shader parameters, std140-compatible.
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct DenseParams {
    pub in_features: u32,
    pub out_features: u32,
    pub apply_relu: u32,
    pub _pad: u32,
}

/// A dense layer's uploaded GPU buffers.
pub(crate) struct LayerResources {
    pub params: wgpu::Buffer,
    pub weights: wgpu::Buffer,
    pub bias: wgpu::Buffer,
    pub out_features: u32,
}

/// Uploads every layer's weights, bias, and parameter uniform.
///
/// ReLU is enabled for all but the final layer, matching the CPU path.
pub(crate) fn upload_layers(ctx: &GpuContext, model: &ModelHandle) -> Vec<LayerResources> {
    let last = model.layers().len() - 1;
    model
        .layers()
        .iter()
        .enumerate()
        .map(|(i, layer)| {
            let params = DenseParams {
                in_features: layer.in_features as u32,
                out_features: layer.out_features as u32,
                apply_relu: u32::from(i != last),
                _pad: 0,
            };
            LayerResources {
                params: ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("dense params"),
                    contents: bytemuck::bytes_of(&params),
                    usage: wgpu::BufferUsages::UNIFORM,
                }),
                weights: ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("dense weights"),
                    contents: bytemuck::cast_slice(&layer.weights),
                    usage: wgpu::BufferUsages::STORAGE,
                }),
                bias: ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("dense bias"),
                    contents: bytemuck::cast_slice(&layer.bias),
                    usage: wgpu::BufferUsages::STORAGE,
                }),
                out_features: layer.out_features as u32,
            }
        })
        .collect()
}
