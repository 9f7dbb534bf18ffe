//! Graphics device contract for the Tessera sprite batcher.
//!
//! The batcher never talks to a GPU API directly. Everything it needs from the
//! device (buffer upload, fixed render states, shader parameters, texture
//! binding and indexed draws) goes through the [`SpriteDevice`] trait defined
//! here, so that tests can substitute a recording double.
//!
//! - [`SpriteDevice`] - the contract
//! - [`TextureId`] - stable texture handle issued at load time
//! - `MockSpriteDevice` - recording implementation (requires `mock` feature)
//!
//! # Example
//!
//! ```rust
//! # #[cfg(feature = "mock")]
//! # {
//! use tessera_core::geometry::Size;
//! use tessera_test_utils::{MockSpriteDevice, SpriteDevice, TextureId};
//!
//! let mock = MockSpriteDevice::new(Size::new(800, 600));
//! mock.bind_texture(0, TextureId::new(3));
//! mock.draw_indexed(wgpu::PrimitiveTopology::TriangleList, 0, 0, 2);
//!
//! assert_eq!(mock.draws(), vec![(TextureId::new(3), 0, 2)]);
//! # }
//! ```

#[cfg(feature = "mock")]
pub mod mock_device;
pub mod sprite_device;

pub use sprite_device::*;
#[cfg(feature = "mock")]
pub use mock_device::*;
