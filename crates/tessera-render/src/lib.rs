//! Tessera Render - frame-scoped sprite batching.
//!
//! Provides:
//! - [`SpriteBatch`]: accumulates textured quads between `begin_draw` and
//!   `end_draw`, culls off-screen sprites, assigns paint-order depth
//! - [`DrawCallMerger`]: folds consecutive same-texture draws together
//! - [`WgpuSpriteDevice`]: a [`SpriteDevice`] that renders through wgpu
//! - [`GraphicsContext`]: shared wgpu instance, adapter, device and queue
//!
//! The batch only depends on the [`SpriteDevice`] trait, so it runs
//! against `MockSpriteDevice` (feature `mock`) in tests without a GPU.

pub mod batch;
pub mod config;
pub mod context;
pub mod device;
pub mod error;
pub mod texture;
pub mod vertex;

pub use batch::*;
pub use config::*;
pub use context::*;
pub use device::*;
pub use error::*;
pub use texture::*;
pub use vertex::*;

// Re-export the device contract so users don't need tessera-test-utils directly.
pub use tessera_test_utils::{
    DepthState, FrameParameters, LightingConstants, RenderStates, SPRITE_TEXTURE_SLOT,
    SamplerState, SpriteDevice, TextureId,
};

#[cfg(feature = "mock")]
pub use tessera_test_utils::{DeviceCall, MockSpriteDevice};

// Re-export wgpu so downstream code uses the same version.
pub use wgpu;
