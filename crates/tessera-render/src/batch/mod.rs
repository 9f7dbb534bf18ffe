//! Frame-scoped sprite batching.
//!
//! A frame is bracketed by [`SpriteBatch::begin_draw`] and
//! [`SpriteBatch::end_draw`]. In between, every accepted
//! [`SpriteBatch::draw_sprite`] appends one quad (4 vertices, 6 indices) to
//! the frame buffers and hands a two-triangle [`DrawCall`] to the
//! [`DrawCallMerger`]. The merger folds a call into its predecessor when both
//! use the same texture, so a run of same-texture sprites becomes a single
//! GPU draw. Calls are never reordered: the depth handed out per sprite
//! already encodes paint order, and transparent sprites only composite
//! correctly when drawn in that order.
//!
//! | Stage | Owner | Output |
//! |-------|-------|--------|
//! | cull + depth | [`SpriteBatch`] | vertices / indices |
//! | merge | [`DrawCallMerger`] | ordered [`DrawCall`] list |
//! | submit | [`SpriteDevice`](tessera_test_utils::SpriteDevice) | one indexed draw per call |

mod accumulator;
mod merger;
mod types;

pub use accumulator::*;
pub use merger::*;
pub use types::*;
