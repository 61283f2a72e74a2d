//! Player Events
//!
//! Event-based communication for UI synchronization. The manager queues
//! these as transitions and device events are applied; the presentation
//! layer drains them with [`PlaybackManager::drain_events`].
//!
//! [`PlaybackManager::drain_events`]: crate::PlaybackManager::drain_events

use cadence_core::TrackId;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Events emitted by the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlayerEvent {
    /// Selected track changed (or was reselected)
    TrackChanged {
        /// ID of the new current track (None = cleared)
        track_id: Option<TrackId>,
        /// ID of the track selected before
        previous_track_id: Option<TrackId>,
    },

    /// Play intent changed
    StateChanged {
        /// Whether the player should be rendering
        is_playing: bool,
    },

    /// Device actually started or stopped rendering
    RenderingChanged {
        /// Whether the device reports rendering
        rendering: bool,
    },

    /// Shuffle toggled
    ShuffleChanged {
        /// New shuffle flag
        enabled: bool,
    },

    /// "Play all" mode entered or left
    AggregateModeChanged {
        /// New aggregate flag
        active: bool,
    },

    /// Displayed position moved
    PositionChanged {
        /// Position in milliseconds
        position_ms: u64,
    },

    /// Duration of the loaded source became known
    DurationChanged {
        /// Duration in milliseconds
        duration_ms: u64,
    },

    /// Volume changed
    VolumeChanged {
        /// New volume level (0-100)
        level: u8,
        /// Whether audio is muted
        is_muted: bool,
    },

    /// A playlist was loaded
    PlaylistLoaded {
        /// Number of tracks in the new playlist
        tracks: usize,
    },

    /// Selection dropped by an explicit clear or sign-out
    Cleared,

    /// Loading a playlist failed; the previous one stays
    PlaylistLoadFailed {
        /// Error message
        message: String,
    },
}

impl PlayerEvent {
    pub(crate) fn position(position: Duration) -> Self {
        PlayerEvent::PositionChanged {
            position_ms: position.as_millis() as u64,
        }
    }

    pub(crate) fn duration(duration: Duration) -> Self {
        PlayerEvent::DurationChanged {
            duration_ms: duration.as_millis() as u64,
        }
    }
}
