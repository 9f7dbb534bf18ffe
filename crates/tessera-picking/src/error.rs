//! Error types for the picking index.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickingError {
    /// The sample buffer does not cover exactly `width * height` pixels.
    SampleCountMismatch { expected: usize, actual: usize },
    /// `width * height` does not fit the run-length domain.
    DimensionsTooLarge { width: u32, height: u32 },
    /// No entry exists for the texture.
    UnknownTexture { texture_id: u32 },
    /// The encoded entry is malformed: undecodable, not alternating, or its
    /// runs do not sum to the pixel count.
    Corrupt {
        texture_id: u32,
        run_sum: u64,
        expected: u64,
    },
}

impl fmt::Display for PickingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SampleCountMismatch { expected, actual } => write!(
                f,
                "Sample buffer has {} entries, expected {}",
                actual, expected
            ),
            Self::DimensionsTooLarge { width, height } => {
                write!(f, "Texture dimensions {}x{} are too large", width, height)
            }
            Self::UnknownTexture { texture_id } => {
                write!(f, "No picking entry for texture {}", texture_id)
            }
            Self::Corrupt {
                texture_id,
                run_sum,
                expected,
            } => write!(
                f,
                "Picking entry for texture {} is corrupt: runs sum to {}, expected {}",
                texture_id, run_sum, expected
            ),
        }
    }
}

impl std::error::Error for PickingError {}

pub type PickingResult<T> = Result<T, PickingError>;
