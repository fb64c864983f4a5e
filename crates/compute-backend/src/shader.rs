// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! GPU shader engine: dense layers as fragment-shader draws.
//!
//! Each layer renders a fullscreen triangle into a 1-row `R32Float`
//! texture whose columns are the layer's output neurons; the row is then
//! copied into a storage buffer that feeds the next layer. Slower than
//! the compute variant but exercises only the rasterisation path, which
//! some drivers support where compute is broken.

use crate::gpu::{upload_layers, GpuContext, LayerResources};
use crate::{BackendError, BackendKind, InferenceEngine};
use classifier_model::ModelHandle;
use tensor_core::{ops, Shape, Tensor};

const SHADER: &str = include_str!("shaders/dense_draw.wgsl");

pub struct GpuShaderEngine {
    ctx: GpuContext,
    pipeline: wgpu::RenderPipeline,
    layers: Vec<LayerResources>,
    bind_groups: Vec<wgpu::BindGroup>,
    target: wgpu::Texture,
    io_a: wgpu::Buffer,
    io_b: wgpu::Buffer,
    staging: wgpu::Buffer,
    final_is_a: bool,
    input_shape: Shape,
    output_shape: Shape,
}

impl GpuShaderEngine {
    pub fn new(model: &ModelHandle) -> Result<Self, BackendError> {
        let ctx = GpuContext::acquire(BackendKind::GpuShader)?;
        tracing::info!("gpu-shader engine on '{}'", ctx.adapter_name);

        let module = ctx
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("dense draw"),
                source: wgpu::ShaderSource::Wgsl(SHADER.into()),
            });

        let bind_layout = ctx
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("dense draw layout"),
                entries: &[
                    storage_entry(0),
                    storage_entry(1),
                    storage_entry(2),
                    wgpu::BindGroupLayoutEntry {
                        binding: 3,
                        visibility: wgpu::ShaderStages::FRAGMENT,
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
                label: Some("dense draw pipeline layout"),
                bind_group_layouts: &[&bind_layout],
                push_constant_ranges: &[],
            });

        let pipeline = ctx
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("dense draw pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &module,
                    entry_point: "vs_fullscreen",
                    compilation_options: Default::default(),
                    buffers: &[],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &module,
                    entry_point: "fs_dense",
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: wgpu::TextureFormat::R32Float,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState::default(),
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            });

        // One texture wide enough for the widest layer; narrower layers
        // render into a prefix of the row.
        let max_width = model.max_features() as u32;
        let target = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("neuron row"),
            size: wgpu::Extent3d {
                width: max_width,
                height: 1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::R32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
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

        // Layer i reads a when even, b when odd; its output is copied
        // from the texture row into the other buffer.
        let bind_groups = layers
            .iter()
            .enumerate()
            .map(|(i, layer)| {
                let src = if i % 2 == 0 { &io_a } else { &io_b };
                ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("dense draw bindings"),
                    layout: &bind_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: src.as_entire_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: layer.weights.as_entire_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2,
                            resource: layer.bias.as_entire_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 3,
                            resource: layer.params.as_entire_binding(),
                        },
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
            target,
            io_a,
            io_b,
            staging,
            final_is_a,
            input_shape: model.input_shape(),
            output_shape: model.output_shape(),
        })
    }
}

impl InferenceEngine for GpuShaderEngine {
    fn kind(&self) -> BackendKind {
        BackendKind::GpuShader
    }

    fn execute(&mut self, input: &Tensor) -> Result<Tensor, BackendError> {
        if input.shape() != &self.input_shape {
            return Err(BackendError::Input(tensor_core::TensorError::ShapeMismatch {
                op: "execute",
                lhs: input.shape().clone(),
                rhs: self.input_shape.clone(),
            }));
        }

        let classes = self.output_shape.num_elements();
        self.ctx
            .queue
            .write_buffer(&self.io_a, 0, bytemuck::cast_slice(input.as_slice()));

        let view = self
            .target
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("dense draw encoder"),
            });

        for (i, (layer, bind_group)) in self.layers.iter().zip(&self.bind_groups).enumerate() {
            {
                let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("dense layer"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                });
                pass.set_pipeline(&self.pipeline);
                pass.set_bind_group(0, bind_group, &[]);
                pass.draw(0..3, 0..1);
            }

            // Row prefix of out_features columns becomes the next input.
            // Single-row copies need no bytes_per_row padding.
            let dst = if i % 2 == 0 { &self.io_b } else { &self.io_a };
            encoder.copy_texture_to_buffer(
                wgpu::ImageCopyTexture {
                    texture: &self.target,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                wgpu::ImageCopyBuffer {
                    buffer: dst,
                    layout: wgpu::ImageDataLayout {
                        offset: 0,
                        bytes_per_row: None,
                        rows_per_image: None,
                    },
                },
                wgpu::Extent3d {
                    width: layer.out_features,
                    height: 1,
                    depth_or_array_layers: 1,
                },
            );
        }

        let final_buf = if self.final_is_a { &self.io_a } else { &self.io_b };
        encoder.copy_buffer_to_buffer(final_buf, 0, &self.staging, 0, (classes * 4) as u64);
        self.ctx.queue.submit(Some(encoder.finish()));

        let mut scores = self.ctx.read_back_f32(&self.staging, classes)?;
        ops::softmax_in_place(&mut scores);
        Ok(Tensor::from_vec(self.output_shape.clone(), scores)?)
    }
}

fn storage_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only: true },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}
