//! Session state store
//!
//! Owns the playlist and the abstract [`PlaybackSession`], and implements
//! every transition over them. Pure logic: nothing here talks to a device.
//!
//! All traversal degrades to a no-op when there is nothing to traverse. The
//! presentation layer calls these from buttons that cannot always know the
//! current state, so "nothing happened" is a valid answer, not an error.

use crate::shuffle::{pick_any, pick_other};
use crate::types::{PlaybackConfig, PlaybackSession};
use cadence_core::Track;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

/// Playlist plus playback session, mutated only through transitions
///
/// Every transition returns `true` when it changed the session, so callers
/// can skip device reconciliation on no-ops.
#[derive(Debug)]
pub struct SessionStore {
    playlist: Vec<Track>,
    session: PlaybackSession,
    rng: StdRng,
}

impl SessionStore {
    /// Create an empty store
    pub fn new(config: &PlaybackConfig) -> Self {
        let rng = match config.shuffle_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            playlist: Vec::new(),
            session: PlaybackSession {
                shuffle: config.shuffle,
                ..PlaybackSession::default()
            },
            rng,
        }
    }

    // ===== State Queries =====

    /// Current playback session
    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }

    /// Loaded playlist, in traversal order
    pub fn playlist(&self) -> &[Track] {
        &self.playlist
    }

    /// Position of the current track in the playlist
    ///
    /// `None` when nothing is selected or the selected track is not part of
    /// the playlist (it was replaced since).
    pub fn current_index(&self) -> Option<usize> {
        let current = self.session.current_track.as_ref()?;
        self.playlist.iter().position(|t| t.is(current))
    }

    // ===== Playlist =====

    /// Replace the playlist
    ///
    /// The current track stays selected even if the new list no longer
    /// contains it; traversal then restarts from the list boundaries.
    pub fn set_playlist(&mut self, tracks: Vec<Track>) {
        debug!(tracks = tracks.len(), "Playlist replaced");
        self.playlist = tracks;
    }

    // ===== Transitions =====

    /// Select one track and play it
    ///
    /// Always leaves aggregate mode. Re-selecting the current track resumes
    /// it rather than selecting it anew.
    pub fn play_track(&mut self, track: Track) -> bool {
        let was_aggregate = std::mem::replace(&mut self.session.aggregate_mode_active, false);

        let already_current = self
            .session
            .current_track
            .as_ref()
            .is_some_and(|current| current.is(&track));

        if already_current {
            let was_playing = std::mem::replace(&mut self.session.is_playing, true);
            return !was_playing || was_aggregate;
        }

        self.select(track);
        true
    }

    /// Pause `track` if it is the current one
    ///
    /// Callbacks for a track that is no longer selected are ignored.
    pub fn pause_track(&mut self, track: &Track) -> bool {
        match &self.session.current_track {
            Some(current) if current.is(track) && self.session.is_playing => {
                self.session.is_playing = false;
                true
            }
            _ => false,
        }
    }

    /// Set the play intent for the current track
    ///
    /// Asking to play with nothing selected is ignored.
    pub fn set_playing(&mut self, playing: bool) -> bool {
        if self.session.is_playing == playing {
            return false;
        }
        if playing && self.session.current_track.is_none() {
            return false;
        }
        self.session.is_playing = playing;
        true
    }

    /// Transport play/pause button
    pub fn toggle_playback(&mut self) -> bool {
        let playing = !self.session.is_playing;
        self.set_playing(playing)
    }

    /// "Play all" button
    ///
    /// - nothing selected: start aggregate playback from the first track
    ///   (or a random one when shuffling)
    /// - playing: pause in place and leave aggregate mode
    /// - paused: resume in place and re-enter aggregate mode
    pub fn toggle_play_all(&mut self) -> bool {
        if self.playlist.is_empty() {
            return false;
        }

        if self.session.current_track.is_some() {
            if self.session.is_playing {
                self.session.is_playing = false;
                self.session.aggregate_mode_active = false;
            } else {
                self.session.is_playing = true;
                self.session.aggregate_mode_active = true;
            }
            return true;
        }

        let start = if self.session.shuffle {
            pick_any(&mut self.rng, self.playlist.len())
        } else {
            Some(0)
        };

        match start {
            Some(index) => {
                self.select(self.playlist[index].clone());
                self.session.aggregate_mode_active = true;
                true
            }
            None => false,
        }
    }

    /// Advance to the next track
    ///
    /// In order, wrapping after the last track; or, when shuffling, any
    /// other track uniformly at random. A one-track shuffled playlist has
    /// nowhere to go.
    pub fn next(&mut self) -> bool {
        if self.session.current_track.is_none() || self.playlist.is_empty() {
            return false;
        }

        let len = self.playlist.len();
        let current = self.current_index();

        let target = if self.session.shuffle {
            pick_other(&mut self.rng, len, current)
        } else {
            Some(current.map_or(0, |i| (i + 1) % len))
        };

        self.advance_to(target)
    }

    /// Step back to the previous track, wrapping to the last one
    pub fn previous(&mut self) -> bool {
        if self.session.current_track.is_none() || self.playlist.is_empty() {
            return false;
        }

        let len = self.playlist.len();
        let target = self
            .current_index()
            .map_or(len - 1, |i| (i + len - 1) % len);

        self.advance_to(Some(target))
    }

    /// Toggle random traversal
    pub fn set_shuffle(&mut self, enabled: bool) -> bool {
        let changed = self.session.shuffle != enabled;
        self.session.shuffle = enabled;
        changed
    }

    /// Drop the selection (explicit clear or sign-out)
    pub fn clear(&mut self) -> bool {
        let had_state = self.session.current_track.is_some()
            || self.session.is_playing
            || self.session.aggregate_mode_active;

        self.session.current_track = None;
        self.session.is_playing = false;
        self.session.aggregate_mode_active = false;
        had_state
    }

    fn advance_to(&mut self, target: Option<usize>) -> bool {
        match target {
            Some(index) => {
                self.select(self.playlist[index].clone());
                true
            }
            None => false,
        }
    }

    fn select(&mut self, track: Track) {
        debug!(track_id = %track.id, title = %track.title, "Track selected");
        self.session.current_track = Some(track);
        self.session.is_playing = true;
        self.session.selection = self.session.selection.wrapping_add(1);
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(&PlaybackConfig::default())
    }
}
