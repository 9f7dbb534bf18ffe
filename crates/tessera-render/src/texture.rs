//! Texture handles as seen by the sprite batch.

use std::fmt;

use tessera_core::geometry::Size;
use tessera_test_utils::TextureId;

/// A loaded sprite texture.
///
/// The batch only needs the stable [`TextureId`] and whether the texture is
/// still alive. Handles are created by a texture loader (for example
/// [`WgpuSpriteDevice::load_texture`](crate::WgpuSpriteDevice::load_texture))
/// and disposed when the loader releases the GPU resource.
#[derive(Debug, PartialEq, Eq)]
pub struct SpriteTexture {
    id: TextureId,
    size: Size<u32>,
    disposed: bool,
}

impl SpriteTexture {
    pub fn new(id: TextureId, size: Size<u32>) -> Self {
        Self {
            id,
            size,
            disposed: false,
        }
    }

    pub fn id(&self) -> TextureId {
        self.id
    }

    pub fn size(&self) -> Size<u32> {
        self.size
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Mark the texture as released. Disposed textures are never drawn.
    pub fn dispose(&mut self) {
        self.disposed = true;
    }
}

/// Errors from loading texture data onto a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextureError {
    /// Width or height is zero.
    ZeroSize,
    /// The pixel buffer does not match `width * height * 4` bytes.
    DataLength { expected: usize, actual: usize },
    /// The texture exceeds the device's 2D texture limit.
    TooLarge { size: Size<u32>, max: u32 },
}

impl fmt::Display for TextureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroSize => write!(f, "Texture has zero width or height"),
            Self::DataLength { expected, actual } => write!(
                f,
                "Texture data is {} bytes, expected {} (RGBA8)",
                actual, expected
            ),
            Self::TooLarge { size, max } => write!(
                f,
                "Texture {}x{} exceeds device limit of {}",
                size.width, size.height, max
            ),
        }
    }
}

impl std::error::Error for TextureError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispose() {
        let mut texture = SpriteTexture::new(TextureId::new(5), Size::new(32, 32));
        assert!(!texture.is_disposed());
        texture.dispose();
        assert!(texture.is_disposed());
        assert_eq!(texture.id(), TextureId::new(5));
    }
}
