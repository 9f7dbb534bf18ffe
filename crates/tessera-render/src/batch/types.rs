//! Plain data types shared by the batch stages.

use tessera_test_utils::TextureId;

/// One GPU draw over the frame's index buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCall {
    pub texture: TextureId,
    /// First index in the frame index buffer. Always a multiple of 3.
    pub start_index: u32,
    /// Number of triangles.
    pub primitive_count: u32,
}

impl DrawCall {
    pub const fn new(texture: TextureId, start_index: u32, primitive_count: u32) -> Self {
        Self {
            texture,
            start_index,
            primitive_count,
        }
    }

    /// Fold `next` into `self` if both use the same texture.
    ///
    /// Only valid when `next` immediately follows `self` in the index buffer.
    #[inline]
    pub fn try_merge(&mut self, next: &DrawCall) -> bool {
        if self.texture != next.texture {
            return false;
        }
        self.primitive_count += next.primitive_count;
        true
    }

    /// Number of indices covered by this call.
    #[inline]
    pub fn index_count(&self) -> u32 {
        self.primitive_count * 3
    }
}

/// Statistics for one `begin_draw`/`end_draw` cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    /// Calls to `draw_sprite` while the frame was active.
    pub sprites_submitted: u32,
    pub sprites_accepted: u32,
    /// Rejected because no vertex was inside the viewport.
    pub sprites_culled: u32,
    /// Rejected because the texture was missing or disposed.
    pub sprites_rejected_texture: u32,
    /// GPU draw calls issued after merging.
    pub draw_calls: u32,
    /// Calls folded into their predecessor.
    pub merges: u32,
    pub vertices: u32,
    pub indices: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_merge_same_texture() {
        let mut call = DrawCall::new(TextureId::new(1), 0, 2);
        assert!(call.try_merge(&DrawCall::new(TextureId::new(1), 6, 2)));
        assert_eq!(call.primitive_count, 4);
        assert_eq!(call.index_count(), 12);
        assert_eq!(call.start_index, 0);
    }

    #[test]
    fn test_try_merge_different_texture() {
        let mut call = DrawCall::new(TextureId::new(1), 0, 2);
        assert!(!call.try_merge(&DrawCall::new(TextureId::new(2), 6, 2)));
        assert_eq!(call.primitive_count, 2);
    }
}
