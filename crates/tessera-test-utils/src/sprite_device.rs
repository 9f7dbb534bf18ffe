//! The graphics device contract consumed by the sprite batcher.

use std::fmt;

use tessera_core::geometry::Size;

/// Stable identity of a texture resource instance.
///
/// Issued by whoever loads textures (for example `WgpuSpriteDevice::load_texture`)
/// and never reused for a different texture while the device lives. The batcher
/// merges draws by comparing these ids, never by resource address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(u64);

impl TextureId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TextureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "texture#{}", self.0)
    }
}

/// Sampler configuration applied to the sprite texture slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SamplerState {
    pub mag_filter: wgpu::FilterMode,
    pub min_filter: wgpu::FilterMode,
    pub address_mode: wgpu::AddressMode,
}

/// Depth buffer configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DepthState {
    pub test_enabled: bool,
    pub write_enabled: bool,
    pub compare: wgpu::CompareFunction,
}

/// The full set of fixed-function state objects applied once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderStates {
    pub blend: wgpu::BlendState,
    pub cull_mode: Option<wgpu::Face>,
    pub sampler: SamplerState,
    pub depth: DepthState,
}

impl RenderStates {
    /// Alpha blending, no face culling, point-sampled clamped textures, depth
    /// test and depth write enabled.
    ///
    /// Later sprites get larger depth values, which the screen projection maps
    /// to smaller depth-buffer values, hence `LessEqual`.
    pub const SPRITES: Self = Self {
        blend: wgpu::BlendState::ALPHA_BLENDING,
        cull_mode: None,
        sampler: SamplerState {
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            address_mode: wgpu::AddressMode::ClampToEdge,
        },
        depth: DepthState {
            test_enabled: true,
            write_enabled: true,
            compare: wgpu::CompareFunction::LessEqual,
        },
    };
}

/// Shader parameters set at the start of every non-empty frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameParameters {
    /// Screen-space orthographic projection (column-major).
    pub projection: [[f32; 4]; 4],
    /// World transform. Always identity for screen-space sprites.
    pub world: [[f32; 4]; 4],
    /// Viewport size in pixels.
    pub viewport: [f32; 2],
    pub lighting_enabled: bool,
}

/// Shader constants that are set at load time, outside the per-frame path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightingConstants {
    /// Number of hue rows per hue texture.
    pub hue_count: f32,
    pub light_direction: [f32; 3],
    pub light_intensity: f32,
}

/// Texture unit that sprite textures are bound to.
pub const SPRITE_TEXTURE_SLOT: u32 = 0;

/// Trait abstracting the graphics device used by the sprite batcher.
///
/// Methods take `&self` so a single device can be shared (via `Arc`) between
/// the batcher, the asset loader and test assertions. Implementations use
/// interior mutability for whatever state they record.
///
/// Call order within one flushed frame is always:
/// `upload_vertices`, `upload_indices`, `apply_render_states`,
/// `set_frame_parameters`, then `bind_texture` + `draw_indexed` per draw call.
pub trait SpriteDevice: Send + Sync {
    /// Current viewport size in pixels.
    fn viewport(&self) -> Size<u32>;

    /// Set the load-time shader constants.
    fn set_lighting_constants(&self, constants: &LightingConstants);

    /// Upload `vertex_count` vertices (raw bytes) to the device vertex buffer,
    /// replacing its previous contents.
    fn upload_vertices(&self, data: &[u8], vertex_count: usize);

    /// Upload 16-bit indices to the device index buffer, replacing its
    /// previous contents.
    fn upload_indices(&self, indices: &[u16]);

    /// Apply blend, rasterizer, sampler and depth-stencil state.
    fn apply_render_states(&self, states: &RenderStates);

    /// Set per-frame shader parameters.
    fn set_frame_parameters(&self, params: &FrameParameters);

    /// Bind a texture to the given texture unit for subsequent draws.
    fn bind_texture(&self, slot: u32, texture: TextureId);

    /// Issue an indexed draw over the uploaded buffers.
    fn draw_indexed(
        &self,
        topology: wgpu::PrimitiveTopology,
        base_vertex: i32,
        start_index: u32,
        primitive_count: u32,
    );
}
