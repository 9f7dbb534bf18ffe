//! Pipeline and buffer creation helpers for the wgpu sprite device.

use bytemuck::{Pod, Zeroable};
use tessera_core::geometry::Size;
use tessera_core::math::Mat4;
use tessera_test_utils::{FrameParameters, LightingConstants, RenderStates, SamplerState};

use crate::vertex::SpriteVertex;

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Uniform block shared by the sprite vertex and fragment stages.
///
/// Field order matches `SpriteUniforms` in `sprite.wgsl` (160 bytes).
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct SpriteUniforms {
    pub projection: [[f32; 4]; 4],
    pub world: [[f32; 4]; 4],
    pub light_direction: [f32; 3],
    pub light_intensity: f32,
    pub viewport: [f32; 2],
    pub hue_count: f32,
    pub lighting_enabled: u32,
}

static_assertions::const_assert_eq!(std::mem::size_of::<SpriteUniforms>(), 160);

impl Default for SpriteUniforms {
    fn default() -> Self {
        let identity = Mat4::IDENTITY.to_cols_array_2d();
        Self {
            projection: identity,
            world: identity,
            light_direction: [0.0, 0.0, 1.0],
            light_intensity: 1.0,
            viewport: [0.0, 0.0],
            hue_count: 0.0,
            lighting_enabled: 0,
        }
    }
}

impl SpriteUniforms {
    pub fn apply_frame(&mut self, params: &FrameParameters) {
        self.projection = params.projection;
        self.world = params.world;
        self.viewport = params.viewport;
        self.lighting_enabled = params.lighting_enabled as u32;
    }

    pub fn apply_lighting(&mut self, constants: &LightingConstants) {
        self.light_direction = constants.light_direction;
        self.light_intensity = constants.light_intensity;
        self.hue_count = constants.hue_count;
    }
}

/// The uniform block bound at group 1, read by both shader stages.
pub struct UniformBinding {
    pub layout: wgpu::BindGroupLayout,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl UniformBinding {
    pub fn new(device: &wgpu::Device) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("sprite_uniform_layout"),
            entries: &[layout_entry(
                0,
                wgpu::ShaderStages::VERTEX_FRAGMENT,
                wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<SpriteUniforms>() as u64),
                },
            )],
        });
        let buffer = create_buffer(
            device,
            "sprite_uniforms",
            wgpu::BufferUsages::UNIFORM,
            std::mem::size_of::<SpriteUniforms>() as u64,
        );
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("sprite_uniform_bg"),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        Self {
            layout,
            buffer,
            bind_group,
        }
    }
}

fn layout_entry(binding: u32, visibility: wgpu::ShaderStages, ty: wgpu::BindingType) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty,
        count: None,
    }
}

/// Per-texture layout (group 0): the sprite texture at binding 0, the shared
/// sampler at binding 1.
pub fn create_texture_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    let texture = wgpu::BindingType::Texture {
        sample_type: wgpu::TextureSampleType::Float { filterable: true },
        view_dimension: wgpu::TextureViewDimension::D2,
        multisampled: false,
    };
    let sampler = wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering);
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("sprite_texture_layout"),
        entries: &[
            layout_entry(0, wgpu::ShaderStages::FRAGMENT, texture),
            layout_entry(1, wgpu::ShaderStages::FRAGMENT, sampler),
        ],
    })
}

pub fn create_sampler(device: &wgpu::Device, state: &SamplerState) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("sprite_sampler"),
        address_mode_u: state.address_mode,
        address_mode_v: state.address_mode,
        address_mode_w: state.address_mode,
        mag_filter: state.mag_filter,
        min_filter: state.min_filter,
        ..Default::default()
    })
}

/// Create the sprite pipeline for the given fixed-function states.
pub fn create_sprite_pipeline(
    device: &wgpu::Device,
    shader: &wgpu::ShaderModule,
    pipeline_layout: &wgpu::PipelineLayout,
    surface_format: wgpu::TextureFormat,
    states: &RenderStates,
    topology: wgpu::PrimitiveTopology,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("sprite_pipeline"),
        layout: Some(pipeline_layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[SpriteVertex::layout()],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: Some(states.blend),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology,
            strip_index_format: topology
                .is_strip()
                .then_some(wgpu::IndexFormat::Uint16),
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: states.cull_mode,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: states.depth.write_enabled,
            depth_compare: if states.depth.test_enabled {
                states.depth.compare
            } else {
                wgpu::CompareFunction::Always
            },
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

/// Number of indices consumed by `primitive_count` primitives.
pub fn index_count(topology: wgpu::PrimitiveTopology, primitive_count: u32) -> u32 {
    match topology {
        wgpu::PrimitiveTopology::PointList => primitive_count,
        wgpu::PrimitiveTopology::LineList => primitive_count * 2,
        wgpu::PrimitiveTopology::LineStrip => primitive_count + 1,
        wgpu::PrimitiveTopology::TriangleList => primitive_count * 3,
        wgpu::PrimitiveTopology::TriangleStrip => primitive_count + 2,
    }
}

/// A `COPY_DST` buffer written through the queue.
fn create_buffer(device: &wgpu::Device, label: &str, usage: wgpu::BufferUsages, size: u64) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size,
        usage: usage | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

/// Vertex buffer holding `vertices` sprite vertices.
pub fn create_vertex_buffer(device: &wgpu::Device, vertices: usize) -> wgpu::Buffer {
    let size = vertices as u64 * SpriteVertex::SIZE;
    create_buffer(device, "sprite_vertex_buffer", wgpu::BufferUsages::VERTEX, size)
}

/// Index buffer holding `indices` u16 indices.
pub fn create_index_buffer(device: &wgpu::Device, indices: usize) -> wgpu::Buffer {
    let size = (indices * std::mem::size_of::<u16>()) as u64;
    create_buffer(device, "sprite_index_buffer", wgpu::BufferUsages::INDEX, size)
}

/// Depth attachment covering `viewport`. A zero-sized viewport still gets a
/// 1x1 texture.
pub fn create_depth_texture(device: &wgpu::Device, viewport: Size<u32>) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("sprite_depth_texture"),
        size: wgpu::Extent3d {
            width: viewport.width.max(1),
            height: viewport.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_field_offsets() {
        assert_eq!(std::mem::offset_of!(SpriteUniforms, light_direction), 128);
        assert_eq!(std::mem::offset_of!(SpriteUniforms, viewport), 144);
        assert_eq!(std::mem::offset_of!(SpriteUniforms, lighting_enabled), 156);
    }

    #[test]
    fn test_index_count() {
        use wgpu::PrimitiveTopology as T;
        assert_eq!(index_count(T::TriangleList, 2), 6);
        assert_eq!(index_count(T::TriangleStrip, 2), 4);
        assert_eq!(index_count(T::LineList, 3), 6);
    }

    #[test]
    fn test_apply_frame_and_lighting() {
        let mut uniforms = SpriteUniforms::default();
        uniforms.apply_lighting(&LightingConstants {
            hue_count: 3000.0,
            light_direction: [0.0, -1.0, 0.0],
            light_intensity: 0.5,
        });
        uniforms.apply_frame(&FrameParameters {
            projection: Mat4::IDENTITY.to_cols_array_2d(),
            world: Mat4::IDENTITY.to_cols_array_2d(),
            viewport: [800.0, 600.0],
            lighting_enabled: true,
        });
        assert_eq!(uniforms.lighting_enabled, 1);
        assert_eq!(uniforms.hue_count, 3000.0);
        assert_eq!(uniforms.viewport, [800.0, 600.0]);
    }
}
