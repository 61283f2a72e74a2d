//! Error types for playback management

use thiserror::Error;

/// Playback errors
///
/// These only ever travel between the device and the synchronization layer.
/// Session transitions never fail; device failures are logged and swallowed.
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// No source is loaded on the device
    #[error("No source loaded")]
    NoSourceLoaded,

    /// The platform refused to start rendering (autoplay policy, focus, ...)
    #[error("Play request rejected: {0}")]
    PlayRejected(String),

    /// Invalid seek position
    #[error("Invalid seek position: {0:?}")]
    InvalidSeekPosition(std::time::Duration),

    /// Any other device failure
    #[error("Device error: {0}")]
    Device(String),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
