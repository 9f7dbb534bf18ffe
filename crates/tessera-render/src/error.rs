//! Error types for the sprite batcher.

use std::fmt;

/// A frame-scope contract violation.
///
/// `begin_draw` and `end_draw` must strictly alternate, and `draw_sprite`
/// is only valid between them. Seeing this error means the caller has a bug;
/// the current frame should be abandoned rather than retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStateError {
    /// `begin_draw` was called while a frame was already active.
    AlreadyActive,
    /// A frame operation was called with no active frame.
    NotActive {
        /// The operation that was attempted.
        operation: &'static str,
    },
}

impl fmt::Display for FrameStateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameStateError::AlreadyActive => {
                write!(f, "begin_draw called while a frame is already active")
            }
            FrameStateError::NotActive { operation } => {
                write!(f, "{} called without an active frame", operation)
            }
        }
    }
}

impl std::error::Error for FrameStateError {}

/// Errors returned by [`SpriteBatch`](crate::SpriteBatch).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchError {
    /// Frame operations were called out of order.
    FrameState(FrameStateError),
    /// The frame already holds its maximum number of sprites.
    ///
    /// The sprite was not added. Flush with `end_draw` + `begin_draw` and
    /// submit it again.
    CapacityOverflow {
        /// Sprite capacity of the current frame.
        max_sprites: usize,
    },
}

impl fmt::Display for BatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchError::FrameState(err) => write!(f, "Frame state error: {}", err),
            BatchError::CapacityOverflow { max_sprites } => {
                write!(
                    f,
                    "Sprite batch is full ({} sprites); flush before drawing more",
                    max_sprites
                )
            }
        }
    }
}

impl std::error::Error for BatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BatchError::FrameState(err) => Some(err),
            BatchError::CapacityOverflow { .. } => None,
        }
    }
}

impl From<FrameStateError> for BatchError {
    fn from(err: FrameStateError) -> Self {
        BatchError::FrameState(err)
    }
}

/// Result type alias for batch operations.
pub type BatchResult<T> = Result<T, BatchError>;
