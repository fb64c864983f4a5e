// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! GPU scale/crop: a sampled blit into a square target plus an
//! asynchronous device-to-host readback.
//!
//! The render target, readback buffer, and source texture are scratch
//! resources allocated lazily on first use and reused across frames;
//! they are only recreated when the frame or target dimensions change.

use crate::transform::ScaleTransform;
use crate::{Frame, PreprocessError, ReadbackResult, ScaleCrop};

const SHADER: &str = include_str!("shaders/blit.wgsl");
const ROW_ALIGN: u32 = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct BlitParams {
    scale: [f32; 2],
    offset: [f32; 2],
}

struct SourceTexture {
    texture: wgpu::Texture,
    width: u32,
    height: u32,
}

struct Target {
    texture: wgpu::Texture,
    readback: wgpu::Buffer,
    size: u32,
    padded_bytes_per_row: u32,
}

struct InFlight {
    rx: std::sync::mpsc::Receiver<Result<(), wgpu::BufferAsyncError>>,
    size: u32,
    padded_bytes_per_row: u32,
}

/// The GPU-backed [`ScaleCrop`] implementation.
pub struct GpuPreprocessor {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: wgpu::RenderPipeline,
    bind_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    params_buf: wgpu::Buffer,
    source: Option<SourceTexture>,
    target: Option<Target>,
    in_flight: Option<InFlight>,
}

impl GpuPreprocessor {
    /// Acquires an adapter and builds the blit pipeline.
    ///
    /// # Errors
    /// Returns [`PreprocessError::Unavailable`] when no adapter exists.
    pub fn new() -> Result<Self, PreprocessError> {
        let instance = wgpu::Instance::default();
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            ..Default::default()
        }))
        .ok_or_else(|| PreprocessError::Unavailable("no GPU adapter found".into()))?;

        let info = adapter.get_info();
        tracing::debug!("preprocessor adapter '{}' ({:?})", info.name, info.backend);

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("preprocess device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
            },
            None,
        ))
        .map_err(|e| PreprocessError::Unavailable(format!("device request failed: {e}")))?;

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("blit"),
            source: wgpu::ShaderSource::Wgsl(SHADER.into()),
        });

        let bind_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("blit layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
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

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("blit pipeline layout"),
            bind_group_layouts: &[&bind_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("blit pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: "vs_blit",
                compilation_options: Default::default(),
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: "fs_blit",
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: wgpu::TextureFormat::Rgba8Unorm,
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

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("blit sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let params_buf = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("blit params"),
            size: std::mem::size_of::<BlitParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Ok(Self {
            device,
            queue,
            pipeline,
            bind_layout,
            sampler,
            params_buf,
            source: None,
            target: None,
            in_flight: None,
        })
    }

    fn create_source(device: &wgpu::Device, width: u32, height: u32) -> SourceTexture {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("source frame"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        SourceTexture {
            texture,
            width,
            height,
        }
    }

    fn create_target(device: &wgpu::Device, size: u32) -> Target {
        let padded_bytes_per_row = (size * 4).div_ceil(ROW_ALIGN) * ROW_ALIGN;
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("scaled target"),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let readback = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("frame readback"),
            size: (padded_bytes_per_row * size) as u64,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Target {
            texture,
            readback,
            size,
            padded_bytes_per_row,
        }
    }
}

impl ScaleCrop for GpuPreprocessor {
    fn request_scale_crop(
        &mut self,
        frame: &Frame<'_>,
        target_size: u32,
    ) -> Result<bool, PreprocessError> {
        frame.validate()?;
        if target_size == 0 {
            return Err(PreprocessError::ZeroTargetSize);
        }
        if self.in_flight.is_some() {
            tracing::trace!("scale/crop slot busy, dropping frame");
            return Ok(false);
        }

        // Scratch resources persist across frames; recreate only when
        // the dimensions change.
        let source = match self.source.take() {
            Some(s) if s.width == frame.width && s.height == frame.height => s,
            _ => Self::create_source(&self.device, frame.width, frame.height),
        };
        let target = match self.target.take() {
            Some(t) if t.size == target_size => t,
            _ => Self::create_target(&self.device, target_size),
        };

        self.queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &source.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            frame.pixels,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(frame.width * 4),
                rows_per_image: None,
            },
            wgpu::Extent3d {
                width: frame.width,
                height: frame.height,
                depth_or_array_layers: 1,
            },
        );

        let t = ScaleTransform::for_frame(frame.width, frame.height);
        let params = BlitParams {
            scale: [t.scale_x, t.scale_y],
            offset: [t.offset_x, t.offset_y],
        };
        self.queue
            .write_buffer(&self.params_buf, 0, bytemuck::bytes_of(&params));

        let source_view = source
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let target_view = target
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("blit bindings"),
            layout: &self.bind_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&source_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: self.params_buf.as_entire_binding(),
                },
            ],
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("scale/crop encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("blit pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.draw(0..3, 0..1);
        }
        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture: &target.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &target.readback,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(target.padded_bytes_per_row),
                    rows_per_image: None,
                },
            },
            wgpu::Extent3d {
                width: target.size,
                height: target.size,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit(Some(encoder.finish()));

        let (tx, rx) = std::sync::mpsc::channel();
        target
            .readback
            .slice(..)
            .map_async(wgpu::MapMode::Read, move |res| {
                tx.send(res).ok();
            });

        self.in_flight = Some(InFlight {
            rx,
            size: target.size,
            padded_bytes_per_row: target.padded_bytes_per_row,
        });
        self.source = Some(source);
        self.target = Some(target);
        Ok(true)
    }

    fn poll(&mut self) -> Option<ReadbackResult> {
        let in_flight = self.in_flight.as_ref()?;
        // Non-blocking tick: drive the device, then check the map result.
        let _ = self.device.poll(wgpu::Maintain::Poll);

        let outcome = match in_flight.rx.try_recv() {
            Err(std::sync::mpsc::TryRecvError::Empty) => return None,
            Ok(Ok(())) => {
                let size = in_flight.size as usize;
                let padded = in_flight.padded_bytes_per_row as usize;
                let target = self.target.as_ref()?;
                let rgb = {
                    let view = target.readback.slice(..).get_mapped_range();
                    // Strip the row padding and the alpha channel.
                    let mut rgb = Vec::with_capacity(size * size * 3);
                    for row in 0..size {
                        let row_bytes = &view[row * padded..row * padded + size * 4];
                        for px in row_bytes.chunks_exact(4) {
                            rgb.extend_from_slice(&px[..3]);
                        }
                    }
                    rgb
                };
                target.readback.unmap();
                ReadbackResult::Complete(rgb)
            }
            Ok(Err(e)) => {
                tracing::warn!("frame readback failed: {e}");
                ReadbackResult::Failed
            }
            Err(std::sync::mpsc::TryRecvError::Disconnected) => {
                tracing::warn!("frame readback channel closed");
                ReadbackResult::Failed
            }
        };

        self.in_flight = None;
        Some(outcome)
    }
}
