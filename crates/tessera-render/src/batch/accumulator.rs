//! The per-frame sprite accumulator.

use std::sync::Arc;

use tessera_core::geometry::{CullingVolume, Size};
use tessera_core::math::{Mat4, Vec3, orthographic_off_center};
use tessera_core::profiling::{profile_function, profile_scope};
use tessera_test_utils::{
    FrameParameters, RenderStates, SPRITE_TEXTURE_SLOT, SpriteDevice,
};

use crate::config::{
    BatchConfig, INDICES_PER_SPRITE, MAX_SPRITES_LIMIT, PRIMITIVES_PER_SPRITE, VERTICES_PER_SPRITE,
};
use crate::error::{BatchError, BatchResult, FrameStateError};
use crate::texture::SpriteTexture;
use crate::vertex::SpriteVertex;

use super::merger::DrawCallMerger;
use super::types::{BatchStats, DrawCall};

/// Index pattern for one quad: triangles (0, 1, 2) and (1, 3, 2).
const QUAD_INDICES: [u16; INDICES_PER_SPRITE] = [0, 1, 2, 1, 3, 2];

/// Screen-space orthographic projection for a y-down viewport.
///
/// Depth range is the full `i16` range, so sprite depths `0..=32767` all
/// land inside the clip volume.
pub fn screen_projection(viewport: Size<u32>) -> Mat4 {
    orthographic_off_center(
        0.0,
        viewport.width as f32,
        viewport.height as f32,
        0.0,
        i16::MIN as f32,
        i16::MAX as f32,
    )
}

/// World transform for screen-space sprites.
pub fn world_matrix() -> Mat4 {
    Mat4::IDENTITY
}

/// Accumulates textured quads for one frame and submits them with as few
/// draw calls as the submission order allows.
///
/// # Example
///
/// ```rust
/// # #[cfg(feature = "mock")]
/// # {
/// use std::sync::Arc;
/// use tessera_core::geometry::Size;
/// use tessera_render::{BatchConfig, SpriteBatch, SpriteTexture, SpriteVertex};
/// use tessera_test_utils::{MockSpriteDevice, TextureId};
///
/// let device = Arc::new(MockSpriteDevice::new(Size::new(800, 600)));
/// let mut batch = SpriteBatch::new(device.clone(), BatchConfig::default());
/// let grass = SpriteTexture::new(TextureId::new(1), Size::new(44, 44));
///
/// batch.begin_draw()?;
/// let quad = SpriteVertex::quad(10.0, 10.0, 44.0, 44.0, [0.0, 0.0, 1.0, 1.0], SpriteVertex::WHITE);
/// assert!(batch.draw_sprite(Some(&grass), quad)?);
/// batch.end_draw(false)?;
///
/// assert_eq!(device.count_draws(), 1);
/// # }
/// # Ok::<(), tessera_render::BatchError>(())
/// ```
pub struct SpriteBatch {
    device: Arc<dyn SpriteDevice>,
    config: BatchConfig,
    // Frame buffers. Capacity only changes in `begin_draw`.
    vertices: Vec<SpriteVertex>,
    indices: Vec<u16>,
    merger: DrawCallMerger,
    // Frame state
    capacity: usize,
    viewport: Size<u32>,
    culling: CullingVolume,
    depth: f32,
    active: bool,
    // Stats
    stats: BatchStats,
    last_stats: BatchStats,
}

impl SpriteBatch {
    /// Create a batch that submits to `device`.
    ///
    /// Pushes the load-time lighting constants from `config` to the device
    /// and pre-allocates the frame buffers.
    pub fn new(device: Arc<dyn SpriteDevice>, config: BatchConfig) -> Self {
        if config.max_sprites > MAX_SPRITES_LIMIT {
            tracing::warn!(
                "max_sprites {} exceeds the u16 index limit, clamping to {}",
                config.max_sprites,
                MAX_SPRITES_LIMIT
            );
        }
        let capacity = config.effective_max_sprites();

        device.set_lighting_constants(&config.lighting_constants());
        tracing::debug!("Created sprite batch with capacity for {capacity} sprites");

        Self {
            device,
            config,
            vertices: Vec::with_capacity(capacity * VERTICES_PER_SPRITE),
            indices: Vec::with_capacity(capacity * INDICES_PER_SPRITE),
            merger: DrawCallMerger::with_capacity(capacity),
            capacity,
            viewport: Size::new(0, 0),
            culling: CullingVolume::default(),
            depth: 0.0,
            active: false,
            stats: BatchStats::default(),
            last_stats: BatchStats::default(),
        }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    pub fn device(&self) -> &Arc<dyn SpriteDevice> {
        &self.device
    }

    /// Whether a frame is currently open.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Change the per-frame sprite limit. Takes effect at the next `begin_draw`.
    pub fn set_max_sprites(&mut self, max_sprites: usize) {
        if max_sprites > MAX_SPRITES_LIMIT {
            tracing::warn!(
                "max_sprites {} exceeds the u16 index limit, clamping to {}",
                max_sprites,
                MAX_SPRITES_LIMIT
            );
        }
        self.config.max_sprites = max_sprites;
    }

    pub fn set_light_direction(&mut self, direction: Vec3) {
        self.config.light_direction = direction;
        self.device
            .set_lighting_constants(&self.config.lighting_constants());
    }

    pub fn set_light_intensity(&mut self, intensity: f32) {
        self.config.light_intensity = intensity;
        self.device
            .set_lighting_constants(&self.config.lighting_constants());
    }

    pub fn set_hue_count(&mut self, hue_count: f32) {
        self.config.hue_count = hue_count;
        self.device
            .set_lighting_constants(&self.config.lighting_constants());
    }

    /// Open a frame.
    ///
    /// Resets the frame buffers and depth counter and rebuilds the culling
    /// volume from the device's current viewport.
    pub fn begin_draw(&mut self) -> BatchResult<()> {
        profile_function!();
        if self.active {
            return Err(FrameStateError::AlreadyActive.into());
        }

        self.capacity = self.config.effective_max_sprites();
        self.vertices.clear();
        self.indices.clear();
        self.merger.clear();
        self.vertices.reserve(self.capacity * VERTICES_PER_SPRITE);
        self.indices.reserve(self.capacity * INDICES_PER_SPRITE);
        self.merger.reserve(self.capacity);

        self.depth = 0.0;
        self.viewport = self.device.viewport();
        self.culling = CullingVolume::from_viewport(self.viewport);
        self.stats = BatchStats::default();
        self.active = true;
        Ok(())
    }

    /// Queue one sprite quad.
    ///
    /// `vertices` must be ordered top-left, top-right, bottom-left,
    /// bottom-right (see [`SpriteVertex::quad`]). Only `x`/`y` are read;
    /// `z` is ignored and replaced with the sprite's depth.
    ///
    /// Returns `Ok(false)` and leaves the frame untouched when the texture is
    /// missing or disposed, or when no vertex lies strictly inside the
    /// viewport. A single visible vertex keeps the whole quad; there is no
    /// clipping.
    pub fn draw_sprite(
        &mut self,
        texture: Option<&SpriteTexture>,
        mut vertices: [SpriteVertex; VERTICES_PER_SPRITE],
    ) -> BatchResult<bool> {
        if !self.active {
            return Err(FrameStateError::NotActive {
                operation: "draw_sprite",
            }
            .into());
        }
        self.stats.sprites_submitted += 1;

        let texture = match texture {
            Some(texture) if !texture.is_disposed() => texture,
            _ => {
                self.stats.sprites_rejected_texture += 1;
                return Ok(false);
            }
        };

        // Depth belongs to the batch; whatever z the caller left is dropped.
        for vertex in &mut vertices {
            vertex.position.z = 0.0;
        }
        if !self.culling.contains_any(vertices.iter().map(SpriteVertex::position)) {
            self.stats.sprites_culled += 1;
            return Ok(false);
        }

        if self.sprite_count() >= self.capacity {
            return Err(BatchError::CapacityOverflow {
                max_sprites: self.capacity,
            });
        }

        let depth = self.next_depth();
        for vertex in &mut vertices {
            vertex.position.z = depth;
        }

        // Both counts fit in u16/u32: capacity is at most MAX_SPRITES_LIMIT.
        let base = self.vertices.len() as u16;
        let start_index = self.indices.len() as u32;
        self.vertices.extend_from_slice(&vertices);
        self.indices.extend(QUAD_INDICES.iter().map(|i| base + i));

        self.merger.enqueue(DrawCall::new(
            texture.id(),
            start_index,
            PRIMITIVES_PER_SPRITE,
        ));
        self.stats.sprites_accepted += 1;
        Ok(true)
    }

    /// Close the frame and submit it.
    ///
    /// An empty frame submits nothing. Otherwise the frame buffers are
    /// uploaded, the fixed sprite render states and frame parameters are
    /// applied, and one indexed draw is issued per merged call, in order.
    pub fn end_draw(&mut self, lighting_enabled: bool) -> BatchResult<()> {
        profile_function!();
        if !self.active {
            return Err(FrameStateError::NotActive {
                operation: "end_draw",
            }
            .into());
        }

        if !self.merger.is_empty() {
            self.submit(lighting_enabled);
        }

        self.stats.draw_calls = self.merger.total_calls() as u32;
        self.stats.merges = self.merger.total_merges() as u32;
        self.stats.vertices = self.vertices.len() as u32;
        self.stats.indices = self.indices.len() as u32;
        self.last_stats = self.stats;

        tracing::trace!(
            "Sprite frame: {} accepted, {} culled, {} draw calls ({} merged)",
            self.stats.sprites_accepted,
            self.stats.sprites_culled,
            self.stats.draw_calls,
            self.stats.merges
        );

        self.vertices.clear();
        self.indices.clear();
        self.merger.clear();
        self.depth = 0.0;
        self.active = false;
        Ok(())
    }

    fn submit(&self, lighting_enabled: bool) {
        profile_scope!("sprite_batch_submit");
        let device = self.device.as_ref();

        device.upload_vertices(bytemuck::cast_slice(&self.vertices), self.vertices.len());
        device.upload_indices(&self.indices);

        device.apply_render_states(&RenderStates::SPRITES);
        device.set_frame_parameters(&FrameParameters {
            projection: screen_projection(self.viewport).to_cols_array_2d(),
            world: world_matrix().to_cols_array_2d(),
            viewport: [self.viewport.width as f32, self.viewport.height as f32],
            lighting_enabled,
        });

        for call in self.merger.calls() {
            device.bind_texture(SPRITE_TEXTURE_SLOT, call.texture);
            device.draw_indexed(
                wgpu::PrimitiveTopology::TriangleList,
                0,
                call.start_index,
                call.primitive_count,
            );
        }
    }

    #[inline]
    fn next_depth(&mut self) -> f32 {
        let depth = self.depth;
        self.depth += 1.0;
        depth
    }

    #[inline]
    fn sprite_count(&self) -> usize {
        self.vertices.len() / VERTICES_PER_SPRITE
    }

    /// Depth the next accepted sprite will receive.
    pub fn current_depth(&self) -> f32 {
        self.depth
    }

    /// Merged draw calls queued so far in the current frame.
    pub fn draw_calls(&self) -> &[DrawCall] {
        self.merger.calls()
    }

    /// Vertices queued so far in the current frame, depth already assigned.
    pub fn vertices(&self) -> &[SpriteVertex] {
        &self.vertices
    }

    /// Indices queued so far in the current frame.
    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    /// Draw calls after merging in the current frame.
    pub fn total_calls(&self) -> usize {
        self.merger.total_calls()
    }

    /// Merges performed in the current frame.
    pub fn total_merges(&self) -> usize {
        self.merger.total_merges()
    }

    /// Statistics of the most recently ended frame.
    pub fn last_frame_stats(&self) -> BatchStats {
        self.last_stats
    }

    /// Sprites the current frame can still accept.
    pub fn remaining_capacity(&self) -> usize {
        self.capacity.saturating_sub(self.sprite_count())
    }
}
