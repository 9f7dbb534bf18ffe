//! Sprite batch configuration.

use tessera_core::math::Vec3;
use tessera_test_utils::LightingConstants;

/// Sprites per frame when nothing else is configured (0x8000 vertices).
pub const DEFAULT_MAX_SPRITES: usize = 0x8000 / VERTICES_PER_SPRITE;

/// Upper bound on sprites per frame. Indices are `u16`, so a frame can
/// address at most 65536 vertices.
pub const MAX_SPRITES_LIMIT: usize = (u16::MAX as usize + 1) / VERTICES_PER_SPRITE;

/// Hue rows per hue texture.
pub const DEFAULT_HUE_COUNT: f32 = 3000.0;

pub(crate) const VERTICES_PER_SPRITE: usize = 4;
pub(crate) const INDICES_PER_SPRITE: usize = 6;
pub(crate) const PRIMITIVES_PER_SPRITE: u32 = 2;

/// Configuration for a [`SpriteBatch`](crate::SpriteBatch).
///
/// ```
/// use tessera_render::BatchConfig;
///
/// let config = BatchConfig::default()
///     .with_max_sprites(2048)
///     .with_light_intensity(0.8);
/// assert_eq!(config.max_sprites, 2048);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchConfig {
    /// Maximum sprites accepted between `begin_draw` and `end_draw`.
    pub max_sprites: usize,
    /// Hue rows per hue texture, forwarded to the shader.
    pub hue_count: f32,
    pub light_direction: Vec3,
    pub light_intensity: f32,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_sprites: DEFAULT_MAX_SPRITES,
            hue_count: DEFAULT_HUE_COUNT,
            light_direction: Vec3::Z,
            light_intensity: 1.0,
        }
    }
}

impl BatchConfig {
    pub fn with_max_sprites(mut self, max_sprites: usize) -> Self {
        self.max_sprites = max_sprites;
        self
    }

    pub fn with_hue_count(mut self, hue_count: f32) -> Self {
        self.hue_count = hue_count;
        self
    }

    pub fn with_light_direction(mut self, direction: Vec3) -> Self {
        self.light_direction = direction;
        self
    }

    pub fn with_light_intensity(mut self, intensity: f32) -> Self {
        self.light_intensity = intensity;
        self
    }

    /// `max_sprites` clamped to `1..=MAX_SPRITES_LIMIT`.
    pub fn effective_max_sprites(&self) -> usize {
        self.max_sprites.clamp(1, MAX_SPRITES_LIMIT)
    }

    pub(crate) fn lighting_constants(&self) -> LightingConstants {
        LightingConstants {
            hue_count: self.hue_count,
            light_direction: self.light_direction.to_array(),
            light_intensity: self.light_intensity,
        }
    }
}
