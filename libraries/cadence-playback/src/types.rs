//! Core types for playback management

use crate::device::LoadId;
use cadence_core::Track;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Abstract playback state
///
/// This is the *intent* side of the player: what is selected and whether it
/// should be rendering. What the device actually does lives in
/// [`DeviceState`].
///
/// Invariant: `is_playing` implies `current_track.is_some()`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaybackSession {
    /// Track selected for rendering (None = nothing loaded)
    pub current_track: Option<Track>,

    /// Whether the device should be rendering
    pub is_playing: bool,

    /// Random traversal
    pub shuffle: bool,

    /// Set by a "play all" gesture, cleared by any single-track selection
    pub aggregate_mode_active: bool,

    /// Bumped every time a track is (re)selected by a transition
    ///
    /// Lets the device layer tell a fresh selection of the same track (a
    /// one-track playlist advancing onto itself) from no change at all.
    pub selection: u64,
}

impl PlaybackSession {
    /// Identifier of the current track, if any
    pub fn current_id(&self) -> Option<&cadence_core::TrackId> {
        self.current_track.as_ref().map(|t| &t.id)
    }
}

/// Device-side state, derived from device events
///
/// Allowed to lag behind the session while a new source loads, but never
/// reports position/duration that belong to a source other than the one
/// currently loaded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceState {
    /// Displayed playback position
    pub position: Duration,

    /// Duration of the loaded source, once its metadata is known
    pub duration: Option<Duration>,

    /// Linear gain last sent to the device
    pub volume: f32,

    /// Media locator the device was last told to load
    pub loaded_source: Option<String>,

    /// Identity of that load; only its events are accepted
    pub load: Option<LoadId>,

    /// Whether the device reported that it is actually rendering
    pub rendering: bool,
}

/// Metadata published to the host platform's "now playing" surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NowPlaying {
    /// Track title
    pub title: String,

    /// Artist name
    pub artist: String,

    /// Cover art locator
    pub artwork_url: Option<String>,
}

impl From<&Track> for NowPlaying {
    fn from(track: &Track) -> Self {
        Self {
            title: track.title.clone(),
            artist: track.artist.clone(),
            artwork_url: track.artwork_url.clone(),
        }
    }
}

/// Configuration for playback manager
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Initial volume (0-100, default: 80)
    pub volume: u8,

    /// Initial shuffle flag (default: false)
    pub shuffle: bool,

    /// Window in which a second "previous" gesture skips back instead of
    /// restarting (default: 1200 ms)
    pub previous_restart_window_ms: u64,

    /// Seed for shuffle selection (default: entropy)
    pub shuffle_seed: Option<u64>,
}

impl PlaybackConfig {
    /// Double-click window as a `Duration`
    pub fn previous_restart_window(&self) -> Duration {
        Duration::from_millis(self.previous_restart_window_ms)
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            volume: 80,
            shuffle: false,
            previous_restart_window_ms: 1200,
            shuffle_seed: None,
        }
    }
}
