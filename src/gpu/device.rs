//! wgpu implementation of [`GraphicsDevice`].
//!
//! The stage renders into its own color and depth targets. The page host
//! samples the color target when composing the window, keyed by
//! [`WgpuDevice::target_id`] so it can tell when the targets were rebuilt.

use std::collections::HashMap;
use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use glam::Mat4;
use wgpu::util::DeviceExt;
use wgpu::{BindGroup, BindGroupLayout, Buffer, Device, RenderPipeline, Sampler, Texture, TextureView};

use super::context::GpuContext;
use crate::core::{ResourceId, ResourceKind, Viewport};
use crate::traits::{DeviceFactory, DrawList, GraphicsDevice};
use crate::types::{CameraUniform, LightUniform, MaterialData, MeshData, ModelUniform, TextureData, Vertex};

pub const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

static NEXT_TARGET_ID: AtomicU64 = AtomicU64::new(1);

struct Targets {
    id: u64,
    color: Texture,
    color_view: TextureView,
    depth: Texture,
    depth_view: TextureView,
}

impl Targets {
    fn new(device: &Device, viewport: Viewport) -> Self {
        let size = wgpu::Extent3d {
            width: viewport.width.max(1),
            height: viewport.height.max(1),
            depth_or_array_layers: 1,
        };
        let color = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Stage Color Target"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: COLOR_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let depth = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Stage Depth Target"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        Self {
            id: NEXT_TARGET_ID.fetch_add(1, Ordering::Relaxed),
            color_view: color.create_view(&wgpu::TextureViewDescriptor::default()),
            depth_view: depth.create_view(&wgpu::TextureViewDescriptor::default()),
            color,
            depth,
        }
    }

    fn destroy(self) {
        self.color.destroy();
        self.depth.destroy();
    }
}

struct GpuMesh {
    vertices: Buffer,
    indices: Buffer,
    index_count: u32,
}

struct GpuMaterial {
    base_color: [f32; 4],
    texture: Option<Texture>,
    bind_group: BindGroup,
}

/// Growable dynamic-offset uniform buffer holding one [`ModelUniform`] per draw
struct ModelSlots {
    buffer: Buffer,
    bind_group: BindGroup,
    capacity: usize,
    stride: u64,
}

pub struct WgpuDevice {
    gpu: Arc<GpuContext>,
    context: Option<ResourceId>,
    targets: Option<Targets>,
    pipeline: RenderPipeline,
    camera_buffer: Buffer,
    light_buffer: Buffer,
    frame_bind_group: BindGroup,
    model_layout: BindGroupLayout,
    material_layout: BindGroupLayout,
    sampler: Sampler,
    blank_view: TextureView,
    slots: ModelSlots,
    meshes: HashMap<ResourceId, GpuMesh>,
    materials: HashMap<ResourceId, GpuMaterial>,
}

impl WgpuDevice {
    pub fn new(gpu: Arc<GpuContext>) -> Self {
        let device = gpu.device();

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Stage Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("stage.wgsl").into()),
        });

        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Stage Frame Layout"),
            entries: &[uniform_entry(0, false, None), uniform_entry(1, false, None)],
        });
        let model_size = NonZeroU64::new(std::mem::size_of::<ModelUniform>() as u64);
        let model_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Stage Model Layout"),
            entries: &[uniform_entry(0, true, model_size)],
        });
        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Stage Material Layout"),
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
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Stage Pipeline Layout"),
            bind_group_layouts: &[&frame_layout, &model_layout, &material_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Stage Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::LAYOUT],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: COLOR_FORMAT,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Stage Camera Buffer"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let light_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Stage Light Buffer"),
            size: std::mem::size_of::<LightUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Stage Frame Bind Group"),
            layout: &frame_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: light_buffer.as_entire_binding(),
                },
            ],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Stage Material Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let blank = upload_texture(
            &gpu,
            &TextureData {
                width: 1,
                height: 1,
                data: vec![255; 4],
            },
        );
        let blank_view = blank.create_view(&wgpu::TextureViewDescriptor::default());

        let stride = slot_stride(device);
        let slots = ModelSlots::new(device, &model_layout, 16, stride);

        Self {
            gpu,
            context: None,
            targets: None,
            pipeline,
            camera_buffer,
            light_buffer,
            frame_bind_group,
            model_layout,
            material_layout,
            sampler,
            blank_view,
            slots,
            meshes: HashMap::new(),
            materials: HashMap::new(),
        }
    }

    /// View of the last rendered frame, while a context exists
    pub fn color_view(&self) -> Option<&TextureView> {
        self.targets.as_ref().map(|t| &t.color_view)
    }

    /// Changes whenever the color target is recreated
    pub fn target_id(&self) -> Option<u64> {
        self.targets.as_ref().map(|t| t.id)
    }

    pub fn geometry_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }
}

impl GraphicsDevice for WgpuDevice {
    fn create_context(&mut self, id: ResourceId, viewport: Viewport) -> Result<()> {
        if self.context.is_some() {
            bail!("Rendering context already created");
        }
        self.targets = Some(Targets::new(self.gpu.device(), viewport));
        self.context = Some(id);
        log::debug!("Created {} at {}x{}", id, viewport.width, viewport.height);
        Ok(())
    }

    fn resize(&mut self, viewport: Viewport) {
        if self.context.is_none() || viewport.is_empty() {
            return;
        }
        if let Some(old) = self.targets.replace(Targets::new(self.gpu.device(), viewport)) {
            old.destroy();
        }
    }

    fn upload_geometry(&mut self, id: ResourceId, mesh: &MeshData) -> Result<()> {
        let device = self.gpu.device();
        let vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Stage Vertex Buffer"),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let indices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Stage Index Buffer"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let index_count = u32::try_from(mesh.indices.len()).map_err(|_| anyhow!("Mesh has too many indices"))?;
        self.meshes.insert(
            id,
            GpuMesh {
                vertices,
                indices,
                index_count,
            },
        );
        Ok(())
    }

    fn upload_material(&mut self, id: ResourceId, material: &MaterialData) -> Result<()> {
        let texture = match &material.texture {
            Some(data) if data.width > 0 && data.height > 0 => {
                if data.data.len() != (data.width * data.height * 4) as usize {
                    bail!(
                        "Texture for '{}' has {} bytes, expected {}x{} RGBA",
                        material.name,
                        data.data.len(),
                        data.width,
                        data.height
                    );
                }
                Some(upload_texture(&self.gpu, data))
            }
            _ => None,
        };
        let own_view = texture
            .as_ref()
            .map(|t| t.create_view(&wgpu::TextureViewDescriptor::default()));
        let view = own_view.as_ref().unwrap_or(&self.blank_view);

        let bind_group = self.gpu.device().create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Stage Material Bind Group"),
            layout: &self.material_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        self.materials.insert(
            id,
            GpuMaterial {
                base_color: material.base_color,
                texture,
                bind_group,
            },
        );
        Ok(())
    }

    fn release(&mut self, id: ResourceId) {
        match id.kind() {
            ResourceKind::Context => {
                if self.context == Some(id) {
                    self.context = None;
                    if let Some(targets) = self.targets.take() {
                        targets.destroy();
                    }
                }
            }
            ResourceKind::Geometry => {
                if let Some(mesh) = self.meshes.remove(&id) {
                    mesh.vertices.destroy();
                    mesh.indices.destroy();
                }
            }
            ResourceKind::Material => {
                if let Some(texture) = self.materials.remove(&id).and_then(|m| m.texture) {
                    texture.destroy();
                }
            }
        }
    }

    fn draw(&mut self, list: &DrawList) -> Result<()> {
        let Some(targets) = &self.targets else {
            bail!("Draw without a rendering context");
        };
        let queue = self.gpu.queue();
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(&list.camera));
        queue.write_buffer(&self.light_buffer, 0, bytemuck::bytes_of(&list.lights));

        if list.items.len() > self.slots.capacity {
            let capacity = list.items.len().next_power_of_two();
            self.slots = ModelSlots::new(self.gpu.device(), &self.model_layout, capacity, self.slots.stride);
        }

        let stride = self.slots.stride as usize;
        let mut staging = vec![0u8; stride * list.items.len().max(1)];
        let mut batches = Vec::with_capacity(list.items.len());
        for (slot, item) in list.items.iter().enumerate() {
            let (Some(mesh), Some(material)) = (self.meshes.get(&item.geometry), self.materials.get(&item.material))
            else {
                log::debug!("Skipping draw of released {} / {}", item.geometry, item.material);
                continue;
            };
            let uniform = model_uniform(item.model, material);
            let offset = slot * stride;
            staging[offset..offset + std::mem::size_of::<ModelUniform>()]
                .copy_from_slice(bytemuck::bytes_of(&uniform));
            batches.push((offset as u32, mesh, material));
        }
        queue.write_buffer(&self.slots.buffer, 0, &staging);

        let mut encoder = self
            .gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Stage Encoder"),
            });
        {
            let [r, g, b] = list.clear_color;
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Stage Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &targets.color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: srgb_to_linear(r) as f64,
                            g: srgb_to_linear(g) as f64,
                            b: srgb_to_linear(b) as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &targets.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.frame_bind_group, &[]);
            for (offset, mesh, material) in batches {
                pass.set_bind_group(1, &self.slots.bind_group, &[offset]);
                pass.set_bind_group(2, &material.bind_group, &[]);
                pass.set_vertex_buffer(0, mesh.vertices.slice(..));
                pass.set_index_buffer(mesh.indices.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }
        }
        queue.submit(Some(encoder.finish()));
        Ok(())
    }
}

impl ModelSlots {
    fn new(device: &Device, layout: &BindGroupLayout, capacity: usize, stride: u64) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Stage Model Buffer"),
            size: stride * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Stage Model Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: NonZeroU64::new(std::mem::size_of::<ModelUniform>() as u64),
                }),
            }],
        });
        Self {
            buffer,
            bind_group,
            capacity,
            stride,
        }
    }
}

fn uniform_entry(binding: u32, dynamic: bool, min_size: Option<NonZeroU64>) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: dynamic,
            min_binding_size: min_size,
        },
        count: None,
    }
}

fn slot_stride(device: &Device) -> u64 {
    let align = device.limits().min_uniform_buffer_offset_alignment.max(1) as u64;
    let size = std::mem::size_of::<ModelUniform>() as u64;
    size.div_ceil(align) * align
}

fn upload_texture(gpu: &GpuContext, data: &TextureData) -> Texture {
    let size = wgpu::Extent3d {
        width: data.width,
        height: data.height,
        depth_or_array_layers: 1,
    };
    let texture = gpu.device().create_texture(&wgpu::TextureDescriptor {
        label: Some("Stage Material Texture"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    gpu.queue().write_texture(
        texture.as_image_copy(),
        &data.data,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * data.width),
            rows_per_image: Some(data.height),
        },
        size,
    );
    texture
}

fn model_uniform(model: Mat4, material: &GpuMaterial) -> ModelUniform {
    ModelUniform {
        model: model.to_cols_array_2d(),
        normal: model.inverse().transpose().to_cols_array_2d(),
        base_color: material.base_color,
        has_texture: u32::from(material.texture.is_some()),
        _pad: [0; 3],
    }
}

pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Builds a fresh [`WgpuDevice`] on the shared context for every mount
#[derive(Clone)]
pub struct WgpuFactory {
    gpu: Arc<GpuContext>,
}

impl WgpuFactory {
    pub fn new(gpu: Arc<GpuContext>) -> Self {
        Self { gpu }
    }
}

impl DeviceFactory for WgpuFactory {
    type Device = WgpuDevice;

    fn create_device(&mut self) -> Result<WgpuDevice> {
        Ok(WgpuDevice::new(self.gpu.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn srgb_endpoints() {
        assert_eq!(srgb_to_linear(0.0), 0.0);
        assert!((srgb_to_linear(1.0) - 1.0).abs() < 1e-6);
        assert!(srgb_to_linear(0.118) < 0.118);
    }
}
