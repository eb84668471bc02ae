//! Error types for the frame hierarchy

use thiserror::Error;

use crate::{FrameId, ObserverId};

/// Frame hierarchy errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    /// The requested reference is the frame itself or one of its descendants
    #[error("Setting {reference} as reference of frame {frame} would create a loop")]
    HierarchyCycle { frame: FrameId, reference: FrameId },

    /// Handle names a frame that was removed (or never existed)
    #[error("Frame not found: {0}")]
    StaleFrame(FrameId),

    /// Frame cannot be removed while another frame is expressed in it
    #[error("Frame {frame} is still the reference frame of {child}")]
    StillReferenced { frame: FrameId, child: FrameId },

    /// No frame slot left to allocate
    #[error("Frame arena exhausted")]
    ArenaExhausted,

    /// Observer was never registered on this frame, or already removed
    #[error("Observer not registered: {0:?}")]
    UnknownObserver(ObserverId),
}

/// Result type for frame operations
pub type Result<T> = std::result::Result<T, FrameError>;
