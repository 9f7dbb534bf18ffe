//! Math types.
//!
//! CPU-side math uses the SIMD-accelerated [`glam`] types re-exported from
//! [`fast`]. Vertex data that is uploaded to the GPU uses the `#[repr(C)]`
//! types from [`packed`], which can be cast to bytes with [`bytemuck`].

/// Re-export of [`glam`] for CPU-side calculations.
pub mod fast {
    pub use glam::*;
}

/// Packed vector types for GPU buffer uploads.
///
/// ```
/// use tessera_core::math::PackedVec3;
///
/// let positions = [PackedVec3::new(0.0, 0.0, 1.0), PackedVec3::new(8.0, 0.0, 1.0)];
/// let bytes: &[u8] = bytemuck::cast_slice(&positions);
/// assert_eq!(bytes.len(), 24);
/// ```
pub mod packed {
    use bytemuck::{Pod, Zeroable};

    /// A 2D vector with `#[repr(C)]` layout (8 bytes).
    #[repr(C)]
    #[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
    pub struct Vec2 {
        pub x: f32,
        pub y: f32,
    }

    /// A 3D vector with `#[repr(C)]` layout (12 bytes, no padding).
    #[repr(C)]
    #[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
    pub struct Vec3 {
        pub x: f32,
        pub y: f32,
        pub z: f32,
    }

    /// A 4D vector with `#[repr(C)]` layout (16 bytes).
    #[repr(C)]
    #[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
    pub struct Vec4 {
        pub x: f32,
        pub y: f32,
        pub z: f32,
        pub w: f32,
    }

    impl Vec2 {
        pub const fn new(x: f32, y: f32) -> Self {
            Self { x, y }
        }
    }

    impl Vec3 {
        pub const fn new(x: f32, y: f32, z: f32) -> Self {
            Self { x, y, z }
        }
    }

    impl Vec4 {
        pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
            Self { x, y, z, w }
        }
    }

    impl From<Vec3> for glam::Vec3 {
        fn from(v: Vec3) -> Self {
            glam::Vec3::new(v.x, v.y, v.z)
        }
    }

    impl From<glam::Vec3> for Vec3 {
        fn from(v: glam::Vec3) -> Self {
            Self::new(v.x, v.y, v.z)
        }
    }

    impl From<glam::Vec2> for Vec2 {
        fn from(v: glam::Vec2) -> Self {
            Self::new(v.x, v.y)
        }
    }

    impl From<glam::Vec4> for Vec4 {
        fn from(v: glam::Vec4) -> Self {
            Self::new(v.x, v.y, v.z, v.w)
        }
    }

    static_assertions::assert_eq_size!(Vec2, [f32; 2]);
    static_assertions::assert_eq_size!(Vec3, [f32; 3]);
    static_assertions::assert_eq_size!(Vec4, [f32; 4]);
}

pub use fast::*;
pub use packed::{Vec2 as PackedVec2, Vec3 as PackedVec3, Vec4 as PackedVec4};

/// Orthographic projection for screen-space drawing.
///
/// Maps `x` in `[left, right]` and `y` in `[bottom, top]` to clip space and
/// `z` in `[z_near, z_far]` to depth `[1, 0]`, so that larger `z` values end
/// up closer to the viewer. Pass `top < bottom` for a y-down screen.
pub fn orthographic_off_center(
    left: f32,
    right: f32,
    bottom: f32,
    top: f32,
    z_near: f32,
    z_far: f32,
) -> Mat4 {
    let rcp_width = 1.0 / (right - left);
    let rcp_height = 1.0 / (top - bottom);
    let rcp_depth = 1.0 / (z_near - z_far);
    Mat4::from_cols(
        Vec4::new(2.0 * rcp_width, 0.0, 0.0, 0.0),
        Vec4::new(0.0, 2.0 * rcp_height, 0.0, 0.0),
        Vec4::new(0.0, 0.0, rcp_depth, 0.0),
        Vec4::new(
            -(left + right) * rcp_width,
            -(top + bottom) * rcp_height,
            -z_far * rcp_depth,
            1.0,
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_off_center_maps_screen_corners() {
        let m = orthographic_off_center(0.0, 800.0, 600.0, 0.0, -100.0, 100.0);
        let top_left = m.project_point3(Vec3::new(0.0, 0.0, 0.0));
        let bottom_right = m.project_point3(Vec3::new(800.0, 600.0, 0.0));
        assert!((top_left.x + 1.0).abs() < 1e-6);
        assert!((top_left.y - 1.0).abs() < 1e-6);
        assert!((bottom_right.x - 1.0).abs() < 1e-6);
        assert!((bottom_right.y + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_off_center_depth_decreases_with_z() {
        let m = orthographic_off_center(0.0, 800.0, 600.0, 0.0, -100.0, 100.0);
        let near = m.project_point3(Vec3::new(0.0, 0.0, -100.0)).z;
        let far = m.project_point3(Vec3::new(0.0, 0.0, 100.0)).z;
        let low = m.project_point3(Vec3::new(0.0, 0.0, 1.0)).z;
        let high = m.project_point3(Vec3::new(0.0, 0.0, 2.0)).z;
        assert!((near - 1.0).abs() < 1e-6);
        assert!(far.abs() < 1e-6);
        assert!(high < low);
    }

    #[test]
    fn test_packed_round_trip_through_glam() {
        let v = glam::Vec3::new(1.0, 2.0, 3.0);
        let packed: PackedVec3 = v.into();
        assert_eq!(glam::Vec3::from(packed), v);
    }
}
