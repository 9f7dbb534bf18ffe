use crate::math::Vec3;

/// Width and height pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size<T> {
    pub width: T,
    pub height: T,
}

impl<T> Size<T> {
    pub const fn new(width: T, height: T) -> Self {
        Size { width, height }
    }
}

/// Axis-aligned box used for per-quad visibility tests.
///
/// Containment is strict: a point on a face is outside. This matches the
/// screen-space convention where a vertex at exactly `x == width` is off
/// screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CullingVolume {
    pub min: Vec3,
    pub max: Vec3,
}

impl CullingVolume {
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Volume covering a viewport with an unbounded depth range.
    pub fn from_viewport(viewport: Size<u32>) -> Self {
        Self {
            min: Vec3::new(0.0, 0.0, f32::MIN),
            max: Vec3::new(viewport.width as f32, viewport.height as f32, f32::MAX),
        }
    }

    /// Whether `point` lies strictly inside the volume. NaN components are outside.
    #[inline]
    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpgt(self.min).all() && point.cmplt(self.max).all()
    }

    /// Whether any of `points` lies strictly inside the volume.
    #[inline]
    pub fn contains_any(&self, points: impl IntoIterator<Item = Vec3>) -> bool {
        points.into_iter().any(|p| self.contains(p))
    }
}

impl Default for CullingVolume {
    fn default() -> Self {
        Self::from_viewport(Size::new(0, 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_is_strict() {
        let volume = CullingVolume::from_viewport(Size::new(100, 50));
        assert!(volume.contains(Vec3::new(1.0, 1.0, 0.0)));
        assert!(!volume.contains(Vec3::new(0.0, 10.0, 0.0)));
        assert!(!volume.contains(Vec3::new(100.0, 10.0, 0.0)));
        assert!(!volume.contains(Vec3::new(10.0, 50.0, 0.0)));
        assert!(!volume.contains(Vec3::new(-5.0, 10.0, 0.0)));
    }

    #[test]
    fn test_nan_is_outside() {
        let volume = CullingVolume::from_viewport(Size::new(100, 50));
        assert!(!volume.contains(Vec3::new(f32::NAN, 10.0, 0.0)));
    }

    #[test]
    fn test_empty_viewport_contains_nothing() {
        let volume = CullingVolume::default();
        assert!(!volume.contains(Vec3::ZERO));
        assert!(!volume.contains_any([Vec3::ONE, Vec3::new(0.5, 0.5, 0.0)]));
    }
}
