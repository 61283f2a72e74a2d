/// Core error types for Cadence
use thiserror::Error;

/// Result type alias using `LoadError`
pub type Result<T> = std::result::Result<T, LoadError>;

/// Failure to obtain the playlist from a track source
///
/// Callers surface these as an empty or error state; the playback core keeps
/// operating on whatever playlist it already holds.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// Network failure or server-side error
    #[error("Track source unavailable: {0}")]
    Unavailable(String),

    /// The source rejected the credentials it was given
    #[error("Not authorized to list tracks: {0}")]
    Unauthorized(String),

    /// The source answered but the payload could not be understood
    #[error("Malformed track listing: {0}")]
    Malformed(String),
}

impl LoadError {
    /// Create an unavailable error
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Create a malformed-payload error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }
}
