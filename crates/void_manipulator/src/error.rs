//! Error types for frame manipulation

use thiserror::Error;
use void_frame::FrameError;

/// Manipulation errors
#[derive(Debug, Error)]
pub enum ManipulatorError {
    /// Driven or camera frame lookup failed
    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),

    /// Damping coefficient outside [0, 1)
    #[error("Invalid damping coefficient {0}: must lie in [0, 1)")]
    InvalidDamping(f32),

    /// Invalid configuration value
    #[error("Invalid manipulation configuration: {0}")]
    InvalidConfig(String),

    /// Camera projection cannot be inverted
    #[error("Camera projection is singular")]
    SingularProjection,

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for manipulation operations
pub type Result<T> = std::result::Result<T, ManipulatorError>;
