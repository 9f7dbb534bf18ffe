//! Sprite vertex format.

use bytemuck::{Pod, Zeroable};
use tessera_core::math::{PackedVec2, PackedVec3, PackedVec4, Vec3};

/// One corner of a sprite quad.
///
/// 36 bytes, `#[repr(C)]`. The caller fills in `x`/`y`, the texture
/// coordinate and the tint; the batch overwrites `position.z` with the
/// sprite's depth when the quad is accepted.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct SpriteVertex {
    /// Screen-space position. `z` is the depth assigned by the batch.
    pub position: PackedVec3,
    /// Texture coordinate (normalized).
    pub tex_coord: PackedVec2,
    /// RGBA tint, multiplied with the sampled texel.
    pub color: PackedVec4,
}

impl SpriteVertex {
    pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

    pub fn new(x: f32, y: f32, u: f32, v: f32, color: [f32; 4]) -> Self {
        Self {
            position: PackedVec3::new(x, y, 0.0),
            tex_coord: PackedVec2::new(u, v),
            color: PackedVec4::new(color[0], color[1], color[2], color[3]),
        }
    }

    /// The four corners of an axis-aligned sprite rectangle, in the order
    /// the quad index pattern expects: top-left, top-right, bottom-left,
    /// bottom-right.
    ///
    /// `uv` is `[u_min, v_min, u_max, v_max]`.
    pub fn quad(x: f32, y: f32, width: f32, height: f32, uv: [f32; 4], color: [f32; 4]) -> [Self; 4] {
        let [u0, v0, u1, v1] = uv;
        [
            Self::new(x, y, u0, v0, color),
            Self::new(x + width, y, u1, v0, color),
            Self::new(x, y + height, u0, v1, color),
            Self::new(x + width, y + height, u1, v1, color),
        ]
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position.into()
    }

    /// Returns the wgpu vertex buffer layout.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRS: &[wgpu::VertexAttribute] = &wgpu::vertex_attr_array![
            0 => Float32x3,  // position
            1 => Float32x2,  // tex_coord
            2 => Float32x4,  // color
        ];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SpriteVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: ATTRS,
        }
    }

    /// Size of the vertex in bytes.
    pub const SIZE: u64 = std::mem::size_of::<Self>() as u64;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_size() {
        assert_eq!(std::mem::size_of::<SpriteVertex>(), 36);
        assert_eq!(SpriteVertex::layout().array_stride, 36);
    }

    #[test]
    fn test_quad_corner_order() {
        let quad = SpriteVertex::quad(10.0, 20.0, 4.0, 8.0, [0.0, 0.0, 1.0, 1.0], SpriteVertex::WHITE);
        assert_eq!(quad[0].position(), Vec3::new(10.0, 20.0, 0.0));
        assert_eq!(quad[1].position(), Vec3::new(14.0, 20.0, 0.0));
        assert_eq!(quad[2].position(), Vec3::new(10.0, 28.0, 0.0));
        assert_eq!(quad[3].position(), Vec3::new(14.0, 28.0, 0.0));
        assert_eq!(quad[3].tex_coord, PackedVec2::new(1.0, 1.0));
    }
}
