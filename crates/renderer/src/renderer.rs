//! Main renderer managing wgpu state and rendering.

use crate::{
    camera::{Camera, CameraUniform},
    mesh::Mesh,
    pipeline::{create_camera_bind_group_layout, create_render_pipeline},
    texture::Texture,
    vertex::InstanceData,
};
use anyhow::Result;
use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use std::sync::Arc;
use wgpu::util::DeviceExt;
use winit::window::Window;

const INITIAL_MAX_INSTANCES: u32 = 4096;

/// Light shader uniform (must match mesh.wgsl Light).
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct LightUniform {
    /// xyz = direction toward the light, w = intensity
    pub direction: [f32; 4],
    pub color: [f32; 4],
    /// rgb = colour, w = intensity
    pub ambient: [f32; 4],
}

impl LightUniform {
    pub fn new(toward_light: Vec3, intensity: f32, ambient: f32) -> Self {
        let d = toward_light.normalize_or(Vec3::Y);
        Self {
            direction: [d.x, d.y, d.z, intensity],
            color: [1.0, 1.0, 1.0, 1.0],
            ambient: [1.0, 1.0, 1.0, ambient],
        }
    }
}

impl Default for LightUniform {
    /// White ambient at 0.5 plus a unit-intensity key light from (5, 5, 5).
    fn default() -> Self {
        Self::new(Vec3::new(5.0, 5.0, 5.0), 1.0, 0.5)
    }
}

/// One mesh drawn with a run of instances.
pub struct DrawBatch<'a> {
    pub mesh: &'a Mesh,
    pub instances: &'a [InstanceData],
}

/// Main renderer state.
pub struct Renderer {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub size: winit::dpi::PhysicalSize<u32>,
    pub window: Arc<Window>,

    render_pipeline: wgpu::RenderPipeline,

    camera_bind_group: wgpu::BindGroup,
    camera_buffer: wgpu::Buffer,
    camera_uniform: CameraUniform,

    // Depth buffer
    depth_texture: Texture,

    // Instance buffer for batched rendering; grows when a frame needs more
    instance_buffer: wgpu::Buffer,
    max_instances: u32,

    pub clear_color: wgpu::Color,
}

impl Renderer {
    /// Create a new renderer for the given window.
    pub async fn new(window: Arc<Window>, vsync: bool) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        // Create surface
        let surface = instance.create_surface(window.clone())?;

        // Request adapter
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("Failed to find suitable GPU adapter"))?;

        log::info!("Using GPU: {:?}", adapter.get_info().name);

        // Request device
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Main Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        // Configure surface
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or_else(|| anyhow::anyhow!("Surface reports no supported formats"))?;

        let present_mode = if vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode,
            view_formats: vec![],
            // 1 = minimum latency (CPU/GPU less parallel but snappier input)
            desired_maximum_frame_latency: 1,
        };
        surface.configure(&device, &config);

        // Camera and light uniforms share group 0
        let camera_uniform = CameraUniform::new();
        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[camera_uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let light_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Light Buffer"),
            contents: bytemuck::cast_slice(&[LightUniform::default()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let camera_bind_group_layout = create_camera_bind_group_layout(&device);
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Camera Bind Group"),
            layout: &camera_bind_group_layout,
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

        let render_pipeline = create_render_pipeline(&device, config.format, &camera_bind_group_layout);

        let depth_texture = Texture::create_depth_texture(&device, config.width, config.height, "Depth Texture");

        let max_instances = INITIAL_MAX_INSTANCES;
        let instance_buffer = create_instance_buffer(&device, max_instances);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            window,
            render_pipeline,
            camera_bind_group,
            camera_buffer,
            camera_uniform,
            depth_texture,
            instance_buffer,
            max_instances,
            clear_color: wgpu::Color::BLACK,
        })
    }

    /// Handle window resize.
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.depth_texture = Texture::create_depth_texture(
                &self.device,
                self.config.width,
                self.config.height,
                "Depth Texture",
            );
        }
    }

    /// Reconfigure the surface at its current size (after `Lost`/`Outdated`).
    pub fn reconfigure(&mut self) {
        self.resize(self.size);
    }

    /// Update camera uniform.
    pub fn update_camera(&mut self, camera: &Camera) {
        self.camera_uniform.update(camera);
        self.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[self.camera_uniform]),
        );
    }

    /// Upload a mesh.
    pub fn create_mesh(&self, data: &crate::mesh::MeshData) -> Mesh {
        data.upload(&self.device)
    }

    /// Draw every batch in one pass, clearing colour and depth first.
    pub fn render(&mut self, batches: &[DrawBatch<'_>]) -> Result<(), wgpu::SurfaceError> {
        let total: usize = batches.iter().map(|b| b.instances.len()).sum();
        self.ensure_instance_capacity(total as u32);

        // Pack every batch's instances back to back; each draw gets its own range
        let mut ranges = Vec::with_capacity(batches.len());
        let mut offset = 0u32;
        for batch in batches {
            let count = batch.instances.len() as u32;
            if count > 0 {
                let byte_offset = (offset as usize * std::mem::size_of::<InstanceData>()) as u64;
                self.queue
                    .write_buffer(&self.instance_buffer, byte_offset, bytemuck::cast_slice(batch.instances));
            }
            ranges.push(offset..offset + count);
            offset += count;
        }

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&self.render_pipeline);
            render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
            render_pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
            for (batch, range) in batches.iter().zip(ranges) {
                if range.is_empty() || batch.mesh.num_indices == 0 {
                    continue;
                }
                render_pass.set_vertex_buffer(0, batch.mesh.vertex_buffer.slice(..));
                render_pass.set_index_buffer(batch.mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..batch.mesh.num_indices, 0, range);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    fn ensure_instance_capacity(&mut self, needed: u32) {
        if needed <= self.max_instances {
            return;
        }
        let grown = needed.next_power_of_two();
        log::debug!("Growing instance buffer {} -> {}", self.max_instances, grown);
        self.instance_buffer = create_instance_buffer(&self.device, grown);
        self.max_instances = grown;
    }

    /// Get window dimensions.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }
}

fn create_instance_buffer(device: &wgpu::Device, max_instances: u32) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Instance Buffer"),
        size: (max_instances as usize * std::mem::size_of::<InstanceData>()) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}
