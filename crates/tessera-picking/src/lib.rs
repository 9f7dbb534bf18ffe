//! Tessera Picking - pixel-accurate hit testing for sprites.
//!
//! [`PixelPickingIndex`] stores one run-length encoded opacity map per
//! texture, built once when the texture is loaded, and answers "is pixel
//! `(x, y)` of this texture opaque?" without keeping a bitmap around.
//!
//! The index is written during asset loading and read afterwards. Reads take
//! `&self`, so a built index can be shared across threads without locking.

pub mod error;
pub mod index;
pub mod varint;

pub use error::*;
pub use index::*;
