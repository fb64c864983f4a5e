// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! GPU compute engine: each dense layer is one compute dispatch with one
//! shader invocation per output neuron.

use crate::gpu::{upload_layers, GpuContext, LayerResources};
use crate::{BackendError, BackendKind, InferenceEngine};
use classifier_model::ModelHandle;
use tensor_core::{ops, Shape, Tensor};

const SHADER: &str = include_str!("shaders/dense_compute.wgsl");
const WORKGROUP_SIZE: u32 = 64;

/// Inference engine backed by a wgpu compute pipeline.
///
/// Weights are uploaded once at build time. Layer activations ping-pong
/// between two on-device buffers; only the final class scores cross back
/// over the bus. Softmax runs on the CPU — the score vector is tiny and
/// a device-wide reduction would cost more than it saves.
pub struct GpuComputeEngine {
    ctx: GpuContext,
    pipeline: wgpu::ComputePipeline,
    layers: Vec<LayerResources>,
    bind_groups: Vec<wgpu::BindGroup>,
    io_a: wgpu::Buffer,
    io_b: wgpu::Buffer,
    staging: wgpu::Buffer,
    final_is_a: bool,
    input_shape: Shape,
    output_shape: Shape,
}

impl GpuComputeEngine {
    pub fn new(model: &ModelHandle) -> Result<Self, BackendError> {
        let ctx = GpuContext::acquire(BackendKind::GpuCompute)?;
        tracing::info!("gpu-compute engine on '{}'", ctx.adapter_name);

        let module = ctx
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("dense compute"),
                source: wgpu::ShaderSource::Wgsl(SHADER.into()),
            });

        let bind_layout = ctx
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("dense compute layout"),
                entries: &[
                    storage_entry(0, true),
                    storage_entry(1, true),
                    storage_entry(2, true),
                    storage_entry(3, false),
                    wgpu::BindGroupLayoutEntry {
                        binding: 4,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                ],
            });

        let pipeline_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("dense compute pipeline layout"),
                bind_group_layouts: &[&bind_layout],
                push_constant_ranges: &[],
            });

        let pipeline = ctx
            .device
            .create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some("dense compute pipeline"),
                layout: Some(&pipeline_layout),
                module: &module,
                entry_point: "dense_layer",
                compilation_options: Default::default(),
                cache: None,
            });

        let io_bytes = (model.max_features() * 4) as u64;
        let io_usage = wgpu::BufferUsages::STORAGE
            | wgpu::BufferUsages::COPY_DST
            | wgpu::BufferUsages::COPY_SRC;
        let io_a = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("activations a"),
            size: io_bytes,
            usage: io_usage,
            mapped_at_creation: false,
        });
        let io_b = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("activations b"),
            size: io_bytes,
            usage: io_usage,
            mapped_at_creation: false,
        });
        let staging = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("score staging"),
            size: (model.num_classes() * 4) as u64,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let layers = upload_layers(&ctx, model);

        // Layer i reads a and writes b when i is even, the reverse when
        // odd; the bind groups bake that alternation in.
        let bind_groups = layers
            .iter()
            .enumerate()
            .map(|(i, layer)| {
                let (src, dst) = if i % 2 == 0 { (&io_a, &io_b) } else { (&io_b, &io_a) };
                ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("dense compute bindings"),
                    layout: &bind_layout,
                    entries: &[
                        buffer_binding(0, src),
                        buffer_binding(1, &layer.weights),
                        buffer_binding(2, &layer.bias),
                        buffer_binding(3, dst),
                        buffer_binding(4, &layer.params),
                    ],
                })
            })
            .collect();

        let final_is_a = layers.len() % 2 == 0;

        Ok(Self {
            ctx,
            pipeline,
            layers,
            bind_groups,
            io_a,
            io_b,
            staging,
            final_is_a,
            input_shape: model.input_shape(),
            output_shape: model.output_shape(),
        })
    }
}

impl InferenceEngine for GpuComputeEngine {
    fn kind(&self) -> BackendKind {
        BackendKind::GpuCompute
    }

    fn execute(&mut self, input: &Tensor) -> Result<Tensor, BackendError> {
        if input.shape() != &self.input_shape {
            return Err(BackendError::Input(tensor_core::TensorError::ShapeMismatch {
                op: "execute",
                lhs: input.shape().clone(),
                rhs: self.input_shape.clone(),
            }));
        }

        // Layer 0 always reads buffer a; the final scores land in a for
        // an even layer count, b for odd.
        let classes = self.output_shape.num_elements();
        self.ctx
            .queue
            .write_buffer(&self.io_a, 0, bytemuck::cast_slice(input.as_slice()));

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("dense compute encoder"),
            });

        for (layer, bind_group) in self.layers.iter().zip(&self.bind_groups) {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("dense layer"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, bind_group, &[]);
            pass.dispatch_workgroups(layer.out_features.div_ceil(WORKGROUP_SIZE), 1, 1);
        }

        let final_buf = if self.final_is_a { &self.io_a } else { &self.io_b };
        encoder.copy_buffer_to_buffer(final_buf, 0, &self.staging, 0, (classes * 4) as u64);
        self.ctx.queue.submit(Some(encoder.finish()));

        let mut scores = self.ctx.read_back_f32(&self.staging, classes)?;
        ops::softmax_in_place(&mut scores);
        Ok(Tensor::from_vec(self.output_shape.clone(), scores)?)
    }
}

fn storage_entry(binding: u32, read_only: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn buffer_binding<'a>(binding: u32, buffer: &'a wgpu::Buffer) -> wgpu::BindGroupEntry<'a> {
    wgpu::BindGroupEntry {
        binding,
        resource: buffer.as_entire_binding(),
    }
}
