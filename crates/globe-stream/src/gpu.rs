//! wgpu-backed upload surface.
//!
//! One-time creation and partial update of the fixed-capacity atlas array,
//! the globe grid index buffer, and the per-frame tile settings UBO. Render
//! pipelines and the globe shader itself belong to the renderer, not here.

use crate::service::MapSurface;
use crate::types::TileSettings;
use bytemuck::Zeroable;
use wgpu::util::DeviceExt;

/// Fixed-capacity RGBA8 texture array holding one decoded tile per layer,
/// plus the sampler and bind group the globe material reads it through.
pub struct AtlasTexture {
    texture: wgpu::Texture,

    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub bind_layout: wgpu::BindGroupLayout,
    pub bind: wgpu::BindGroup,
}

impl AtlasTexture {
    pub fn new(device: &wgpu::Device, tile_size_px: u32, layer_count: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Tile Atlas"),
            size: wgpu::Extent3d {
                width: tile_size_px,
                height: tile_size_px,
                depth_or_array_layers: layer_count,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("Tile Atlas View"),
            dimension: Some(wgpu::TextureViewDimension::D2Array),
            ..Default::default()
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Tile Atlas Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let bind_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Tile Atlas BindGroup Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2Array,
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

        let bind = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Tile Atlas BindGroup"),
            layout: &bind_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        Self {
            texture,
            view,
            sampler,
            bind_layout,
            bind,
        }
    }

    /// Partial upload of one decoded RGBA8 tile into `layer`.
    pub fn upload_layer(
        &self,
        queue: &wgpu::Queue,
        layer: u32,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) {
        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d { x: 0, y: 0, z: layer },
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
    }
}

/// Index buffer for the globe mesh. The streaming service replaces its
/// contents wholesale whenever the vertex window changes.
pub struct GridIndexBuffer {
    buffer: wgpu::Buffer,
    len: u32,
}

impl GridIndexBuffer {
    pub fn new(device: &wgpu::Device) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Globe Grid Indices"),
            contents: &[],
            usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
        });
        Self { buffer, len: 0 }
    }

    pub fn upload(&mut self, device: &wgpu::Device, indices: &[u32]) {
        self.buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Globe Grid Indices"),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
        });
        self.len = indices.len() as u32;
    }

    /// Index count for the draw call.
    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn slice(&self) -> wgpu::BufferSlice<'_> {
        self.buffer.slice(..)
    }
}

/// Uniform buffer holding the per-frame [`TileSettings`] block.
pub struct TileSettingsBuffer {
    pub buffer: wgpu::Buffer,
}

impl TileSettingsBuffer {
    pub fn new(device: &wgpu::Device) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Tile Settings UBO"),
            contents: bytemuck::bytes_of(&TileSettings::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        Self { buffer }
    }

    pub fn write(&self, queue: &wgpu::Queue, settings: &TileSettings) {
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(settings));
    }
}

/// Borrowing adapter that lets the streaming service drive the wgpu
/// resources for one frame.
pub struct GpuSurface<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub atlas: &'a AtlasTexture,
    pub grid: &'a mut GridIndexBuffer,
    pub settings: &'a TileSettingsBuffer,
}

impl MapSurface for GpuSurface<'_> {
    fn upload_indices(&mut self, indices: &[u32]) {
        self.grid.upload(self.device, indices);
    }

    fn upload_tile_layer(&mut self, layer: u32, width: u32, height: u32, pixels: &[u8]) {
        self.atlas.upload_layer(self.queue, layer, width, height, pixels);
    }

    fn write_tile_settings(&mut self, settings: &TileSettings) {
        self.settings.write(self.queue, settings);
    }
}
