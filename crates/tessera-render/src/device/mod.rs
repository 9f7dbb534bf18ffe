//! [`SpriteDevice`] backed by wgpu.
//!
//! The sprite batch issues its device calls at `end_draw`. This device
//! records them (uploads go straight to the queue, draws are kept as a list)
//! and replays the draw list into a caller-provided render pass in
//! [`WgpuSpriteDevice::render`]. This is the same prepare/render split the
//! rest of the renderer uses.
//!
//! A host that flushes mid-frame (`end_draw` + `begin_draw` when the batch
//! is full) produces several uploads before one `render`. Each upload is
//! appended after the previous one, and its draws are offset to match, so
//! `render` replays every flush of the frame in order. The first upload
//! after a `render` starts the next frame at offset zero, so submit the
//! encoder holding that pass before the next frame's `end_draw`.

mod pipeline;
mod texture_cache;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tessera_core::alloc::HashMap;
use tessera_core::geometry::Size;
use tessera_core::profiling::{profile_function, profile_scope};
use tessera_test_utils::{
    FrameParameters, LightingConstants, RenderStates, SPRITE_TEXTURE_SLOT, SpriteDevice, TextureId,
};

use crate::context::GraphicsContext;
use crate::texture::{SpriteTexture, TextureError};
use crate::vertex::SpriteVertex;

pub use pipeline::{DEPTH_FORMAT, SpriteUniforms};
use pipeline::UniformBinding;
use texture_cache::TextureCache;

/// A draw recorded during `end_draw`, replayed in [`WgpuSpriteDevice::render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RecordedDraw {
    texture: TextureId,
    topology: wgpu::PrimitiveTopology,
    base_vertex: i32,
    start_index: u32,
    index_count: u32,
}

struct DeviceState {
    viewport: Size<u32>,
    // Pipelines
    shader: wgpu::ShaderModule,
    pipeline_layout: wgpu::PipelineLayout,
    pipelines: HashMap<(RenderStates, wgpu::PrimitiveTopology), wgpu::RenderPipeline>,
    render_states: RenderStates,
    // Uniforms
    uniforms: SpriteUniforms,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    // Textures
    textures: TextureCache,
    bound: [Option<TextureId>; 1],
    // Geometry. CPU copies of the frame's uploads, so a grown buffer can be
    // refilled.
    vertex_buffer: wgpu::Buffer,
    vertex_capacity: usize,
    vertex_data: Vec<u8>,
    index_buffer: wgpu::Buffer,
    index_capacity: usize,
    index_data: Vec<u16>,
    // Recorded frame
    draws: Vec<RecordedDraw>,
    batch_base_vertex: i32,
    batch_start_index: u32,
    frame_rendered: bool,
    // Depth buffer
    depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,
}

impl DeviceState {
    /// Drop the previous frame once it has been rendered.
    fn start_frame_if_rendered(&mut self) {
        if self.frame_rendered {
            self.draws.clear();
            self.vertex_data.clear();
            self.index_data.clear();
            self.frame_rendered = false;
        }
    }
}

/// A [`SpriteDevice`] that renders through wgpu.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use tessera_render::{BatchConfig, GraphicsContext, SpriteBatch, WgpuSpriteDevice};
/// use tessera_core::geometry::Size;
///
/// let context = GraphicsContext::new_owned_sync()?;
/// let device = Arc::new(WgpuSpriteDevice::new(
///     context,
///     wgpu::TextureFormat::Bgra8UnormSrgb,
///     Size::new(800, 600),
/// ));
/// let texture = device.load_texture(&[255; 4 * 16 * 16], 16, 16)?;
/// let mut batch = SpriteBatch::new(device.clone(), BatchConfig::default());
/// # let _ = (texture, &mut batch);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct WgpuSpriteDevice {
    context: Arc<GraphicsContext>,
    surface_format: wgpu::TextureFormat,
    next_texture_id: AtomicU64,
    state: Mutex<DeviceState>,
}

impl WgpuSpriteDevice {
    const INITIAL_VERTICES: usize = 1024;
    const INITIAL_INDICES: usize = 1536;

    pub fn new(
        context: Arc<GraphicsContext>,
        surface_format: wgpu::TextureFormat,
        viewport: Size<u32>,
    ) -> Self {
        profile_function!();
        let device = context.device();

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("sprite_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/sprite.wgsl").into()),
        });

        let textures = TextureCache::new(device, RenderStates::SPRITES.sampler);
        let uniforms = UniformBinding::new(device);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("sprite_pipeline_layout"),
            bind_group_layouts: &[textures.layout(), &uniforms.layout],
            push_constant_ranges: &[],
        });

        let (depth_texture, depth_view) = pipeline::create_depth_texture(device, viewport);

        let state = DeviceState {
            viewport,
            shader,
            pipeline_layout,
            pipelines: HashMap::default(),
            render_states: RenderStates::SPRITES,
            uniforms: SpriteUniforms::default(),
            uniform_buffer: uniforms.buffer,
            uniform_bind_group: uniforms.bind_group,
            textures,
            bound: [None],
            vertex_buffer: pipeline::create_vertex_buffer(device, Self::INITIAL_VERTICES),
            vertex_capacity: Self::INITIAL_VERTICES,
            vertex_data: Vec::new(),
            index_buffer: pipeline::create_index_buffer(device, Self::INITIAL_INDICES),
            index_capacity: Self::INITIAL_INDICES,
            index_data: Vec::new(),
            draws: Vec::new(),
            batch_base_vertex: 0,
            batch_start_index: 0,
            frame_rendered: false,
            depth_texture,
            depth_view,
        };

        Self {
            context,
            surface_format,
            next_texture_id: AtomicU64::new(1),
            state: Mutex::new(state),
        }
    }

    pub fn context(&self) -> &Arc<GraphicsContext> {
        &self.context
    }

    /// Upload RGBA8 pixel data and return a handle the batch can draw with.
    pub fn load_texture(
        &self,
        rgba: &[u8],
        width: u32,
        height: u32,
    ) -> Result<SpriteTexture, TextureError> {
        profile_function!();
        let size = Size::new(width, height);
        if width == 0 || height == 0 {
            return Err(TextureError::ZeroSize);
        }
        let max = self.context.max_texture_dimension_2d();
        if width > max || height > max {
            return Err(TextureError::TooLarge { size, max });
        }
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(TextureError::DataLength {
                expected,
                actual: rgba.len(),
            });
        }

        let extent = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = self.context.device().create_texture(&wgpu::TextureDescriptor {
            label: Some("sprite_texture"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        self.context.queue().write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            extent,
        );

        let id = TextureId::new(self.next_texture_id.fetch_add(1, Ordering::Relaxed));
        self.state
            .lock()
            .textures
            .insert(self.context.device(), id, texture);
        tracing::debug!("Loaded {id} ({width}x{height})");

        Ok(SpriteTexture::new(id, size))
    }

    /// Release the GPU texture and mark the handle disposed.
    pub fn unload_texture(&self, texture: &mut SpriteTexture) {
        if texture.is_disposed() {
            return;
        }
        if !self.state.lock().textures.remove(texture.id()) {
            tracing::warn!("Unloading {} which this device does not own", texture.id());
        }
        texture.dispose();
    }

    /// Number of textures currently resident.
    pub fn texture_count(&self) -> usize {
        self.state.lock().textures.len()
    }

    /// Resize the viewport and depth buffer. Takes effect at the next frame.
    pub fn resize(&self, viewport: Size<u32>) {
        let mut state = self.state.lock();
        if state.viewport == viewport {
            return;
        }
        state.depth_texture.destroy();
        let (texture, view) = pipeline::create_depth_texture(self.context.device(), viewport);
        state.depth_texture = texture;
        state.depth_view = view;
        state.viewport = viewport;
    }

    /// Depth attachment view matching the current viewport.
    ///
    /// Clear it to `1.0` at the start of each pass.
    pub fn depth_view(&self) -> wgpu::TextureView {
        self.state.lock().depth_view.clone()
    }

    /// Number of draws recorded for the current frame, across all flushes.
    pub fn recorded_draw_count(&self) -> usize {
        self.state.lock().draws.len()
    }

    /// Replay every flush of the current frame into `pass`, in order.
    ///
    /// The pass must target `surface_format` with a [`DEPTH_FORMAT`] depth
    /// attachment. Uniforms hold the parameters of the latest flush.
    pub fn render(&self, pass: &mut wgpu::RenderPass<'_>) {
        profile_function!();
        let mut state = self.state.lock();
        if state.draws.is_empty() {
            return;
        }

        let draws = std::mem::take(&mut state.draws);
        let mut current_topology = None;
        for draw in &draws {
            if current_topology != Some(draw.topology) {
                let pipeline = self.pipeline_for(&mut state, draw.topology);
                pass.set_pipeline(&pipeline);
                pass.set_bind_group(1, &state.uniform_bind_group, &[]);
                pass.set_vertex_buffer(0, state.vertex_buffer.slice(..));
                pass.set_index_buffer(state.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                current_topology = Some(draw.topology);
            }

            let Some(bind_group) = state.textures.bind_group(draw.texture) else {
                tracing::warn!("Skipping draw for unknown {}", draw.texture);
                continue;
            };
            pass.set_bind_group(0, bind_group, &[]);
            pass.draw_indexed(
                draw.start_index..draw.start_index + draw.index_count,
                draw.base_vertex,
                0..1,
            );
        }
        state.draws = draws;
        state.frame_rendered = true;
    }

    fn pipeline_for(
        &self,
        state: &mut DeviceState,
        topology: wgpu::PrimitiveTopology,
    ) -> wgpu::RenderPipeline {
        let key = (state.render_states, topology);
        if let Some(pipeline) = state.pipelines.get(&key) {
            return pipeline.clone();
        }
        profile_scope!("create_sprite_pipeline");
        tracing::debug!("Creating sprite pipeline for {:?}", topology);
        let pipeline = pipeline::create_sprite_pipeline(
            self.context.device(),
            &state.shader,
            &state.pipeline_layout,
            self.surface_format,
            &state.render_states,
            topology,
        );
        state.pipelines.insert(key, pipeline.clone());
        pipeline
    }

    fn write_uniforms(&self, state: &DeviceState) {
        self.context.queue().write_buffer(
            &state.uniform_buffer,
            0,
            bytemuck::bytes_of(&state.uniforms),
        );
    }
}

impl SpriteDevice for WgpuSpriteDevice {
    fn viewport(&self) -> Size<u32> {
        self.state.lock().viewport
    }

    fn set_lighting_constants(&self, constants: &LightingConstants) {
        let mut state = self.state.lock();
        state.uniforms.apply_lighting(constants);
        self.write_uniforms(&state);
    }

    fn upload_vertices(&self, data: &[u8], vertex_count: usize) {
        profile_function!();
        let mut state = self.state.lock();
        state.start_frame_if_rendered();
        state.bound = [None];

        let stride = SpriteVertex::SIZE as usize;
        let offset = state.vertex_data.len();
        let len = vertex_count.min(data.len() / stride) * stride;
        state.batch_base_vertex = (offset / stride) as i32;
        state.vertex_data.extend_from_slice(&data[..len]);

        let queue = self.context.queue();
        let total = state.vertex_data.len() / stride;
        if total > state.vertex_capacity {
            let capacity = total.next_power_of_two();
            tracing::debug!("Growing sprite vertex buffer to {capacity} vertices");
            state.vertex_buffer = pipeline::create_vertex_buffer(self.context.device(), capacity);
            state.vertex_capacity = capacity;
            queue.write_buffer(&state.vertex_buffer, 0, &state.vertex_data);
        } else if len > 0 {
            queue.write_buffer(&state.vertex_buffer, offset as u64, &state.vertex_data[offset..]);
        }
    }

    fn upload_indices(&self, indices: &[u16]) {
        profile_function!();
        let mut state = self.state.lock();
        state.start_frame_if_rendered();

        // Kept at an even length: buffer writes must be a multiple of 4 bytes.
        let offset = state.index_data.len();
        state.batch_start_index = offset as u32;
        state.index_data.extend_from_slice(indices);
        if state.index_data.len() % 2 == 1 {
            state.index_data.push(0);
        }

        let queue = self.context.queue();
        let total = state.index_data.len();
        if total > state.index_capacity {
            let capacity = total.next_power_of_two();
            tracing::debug!("Growing sprite index buffer to {capacity} indices");
            state.index_buffer = pipeline::create_index_buffer(self.context.device(), capacity);
            state.index_capacity = capacity;
            queue.write_buffer(&state.index_buffer, 0, bytemuck::cast_slice(&state.index_data));
        } else if total > offset {
            queue.write_buffer(
                &state.index_buffer,
                (offset * std::mem::size_of::<u16>()) as u64,
                bytemuck::cast_slice(&state.index_data[offset..]),
            );
        }
    }

    fn apply_render_states(&self, states: &RenderStates) {
        let mut state = self.state.lock();
        state.textures.set_sampler(self.context.device(), states.sampler);
        state.render_states = *states;
    }

    fn set_frame_parameters(&self, params: &FrameParameters) {
        let mut state = self.state.lock();
        state.uniforms.apply_frame(params);
        self.write_uniforms(&state);
    }

    fn bind_texture(&self, slot: u32, texture: TextureId) {
        let mut state = self.state.lock();
        if slot != SPRITE_TEXTURE_SLOT {
            tracing::warn!("Ignoring bind of {texture} to unsupported slot {slot}");
            return;
        }
        if !state.textures.contains(texture) {
            tracing::warn!("Binding {texture} which is not loaded on this device");
        }
        state.bound[slot as usize] = Some(texture);
    }

    fn draw_indexed(
        &self,
        topology: wgpu::PrimitiveTopology,
        base_vertex: i32,
        start_index: u32,
        primitive_count: u32,
    ) {
        let mut state = self.state.lock();
        let Some(texture) = state.bound[SPRITE_TEXTURE_SLOT as usize] else {
            tracing::warn!("draw_indexed issued with no texture bound");
            return;
        };
        let (base_vertex, start_index) = (
            base_vertex + state.batch_base_vertex,
            start_index + state.batch_start_index,
        );
        state.draws.push(RecordedDraw {
            texture,
            topology,
            base_vertex,
            start_index,
            index_count: pipeline::index_count(topology, primitive_count),
        });
    }
}
