//! Playback manager - core orchestration
//!
//! Coordinates the session store, device synchronization, the previous
//! gesture, volume and the remote-control bridge. Every input (user action,
//! device event, remote command, timer tick) is applied one at a time
//! through `&mut self`, so there is exactly one writer of playback state.

use crate::{
    clock::{Clock, SystemClock},
    device::{DeviceEvent, PlaybackDevice},
    events::PlayerEvent,
    gesture::{PreviousAction, PreviousGesture},
    remote::{MediaControls, RemoteBridge, RemoteCommand},
    session::SessionStore,
    sync::{DeviceSync, SyncOutcome},
    types::{DeviceState, PlaybackConfig, PlaybackSession},
    volume::Volume,
};
use cadence_core::{Track, TrackSource};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Main playback manager
///
/// Owns the playlist, the session and the single playback device. The
/// presentation layer calls transitions, forwards device events, and drains
/// [`PlayerEvent`]s to redraw.
pub struct PlaybackManager {
    store: SessionStore,
    sync: DeviceSync,
    gesture: PreviousGesture,
    clock: Arc<dyn Clock>,
    remote: RemoteBridge,
    volume: Volume,

    // Event queue for UI synchronization
    pending_events: Vec<PlayerEvent>,
}

impl PlaybackManager {
    /// Create new playback manager driving `device`
    pub fn new(config: PlaybackConfig, device: Box<dyn PlaybackDevice>) -> Self {
        let volume = Volume::new(config.volume);
        let mut sync = DeviceSync::new(device);
        sync.set_volume(volume.gain());

        Self {
            store: SessionStore::new(&config),
            sync,
            gesture: PreviousGesture::new(config.previous_restart_window()),
            clock: Arc::new(SystemClock),
            remote: RemoteBridge::default(),
            volume,
            pending_events: Vec::new(),
        }
    }

    /// Use a different time source for the previous gesture
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Attach host media controls
    #[must_use]
    pub fn with_media_controls(mut self, controls: Box<dyn MediaControls>) -> Self {
        self.remote = RemoteBridge::new(Some(controls));
        self
    }

    // ===== Playlist =====

    /// Replace the playlist
    pub fn set_playlist(&mut self, tracks: Vec<Track>) {
        let count = tracks.len();
        self.store.set_playlist(tracks);
        self.pending_events
            .push(PlayerEvent::PlaylistLoaded { tracks: count });
    }

    /// Fetch and install a playlist
    ///
    /// On failure the previous playlist stays in place and a
    /// [`PlayerEvent::PlaylistLoadFailed`] is queued.
    pub async fn load_tracks(&mut self, source: &dyn TrackSource) -> cadence_core::Result<usize> {
        match source.list_tracks().await {
            Ok(tracks) => {
                let count = tracks.len();
                info!(tracks = count, "Playlist loaded");
                self.set_playlist(tracks);
                Ok(count)
            }
            Err(e) => {
                warn!(error = %e, "Failed to load playlist; keeping previous one");
                self.pending_events.push(PlayerEvent::PlaylistLoadFailed {
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    // ===== Playback Control =====

    /// Select `track` and play it, leaving aggregate mode
    pub fn play_track(&mut self, track: Track) -> bool {
        self.apply(|store| store.play_track(track))
    }

    /// Pause `track` if it is the current one
    pub fn pause_track(&mut self, track: &Track) -> bool {
        self.apply(|store| store.pause_track(track))
    }

    /// Transport play/pause button
    pub fn toggle_playback(&mut self) -> bool {
        self.apply(SessionStore::toggle_playback)
    }

    /// "Play all" button
    pub fn toggle_play_all(&mut self) -> bool {
        self.apply(SessionStore::toggle_play_all)
    }

    /// Advance to the next track (in order, or random when shuffling)
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> bool {
        self.apply(SessionStore::next)
    }

    /// "Previous" gesture
    ///
    /// A single press restarts the current track. A second press within the
    /// configured window moves to the previous track instead.
    pub fn previous(&mut self) -> bool {
        if self.store.session().current_track.is_none() {
            return false;
        }

        match self.gesture.press(self.clock.now()) {
            PreviousAction::Restart => {
                debug!("Previous pressed; restarting current track");
                self.restart()
            }
            PreviousAction::SkipBack => {
                debug!("Previous pressed twice; skipping back");
                self.skip_previous()
            }
        }
    }

    /// Step back to the previous track immediately, bypassing the gesture
    pub fn skip_previous(&mut self) -> bool {
        self.apply(SessionStore::previous)
    }

    /// Jump within the current track
    ///
    /// Returns the applied (clamped) position, or `None` if nothing is
    /// loaded.
    pub fn seek(&mut self, position: Duration) -> Option<Duration> {
        let applied = self.sync.seek(position)?;
        self.pending_events.push(PlayerEvent::position(applied));
        Some(applied)
    }

    /// Toggle random traversal
    ///
    /// Every call is acknowledged with [`PlayerEvent::ShuffleChanged`], even
    /// when the flag already had the requested value. Returns whether the
    /// flag changed.
    pub fn set_shuffle(&mut self, enabled: bool) -> bool {
        let changed = self.apply(|store| store.set_shuffle(enabled));
        if !changed {
            self.pending_events
                .push(PlayerEvent::ShuffleChanged { enabled });
        }
        changed
    }

    /// Drop the selection and stop the device (explicit clear, sign-out)
    pub fn clear(&mut self) -> bool {
        self.gesture = PreviousGesture::new(self.gesture.window());
        let cleared = self.apply(SessionStore::clear);
        if cleared {
            self.pending_events.push(PlayerEvent::Cleared);
        }
        cleared
    }

    // ===== Volume =====

    /// Set volume (0-100)
    pub fn set_volume(&mut self, level: u8) {
        self.update_volume(|volume| volume.set_level(level));
    }

    /// Mute output, keeping the level
    pub fn mute(&mut self) {
        self.update_volume(Volume::mute);
    }

    /// Restore output at the kept level
    pub fn unmute(&mut self) {
        self.update_volume(Volume::unmute);
    }

    /// Toggle mute
    pub fn toggle_mute(&mut self) {
        self.update_volume(Volume::toggle_mute);
    }

    // ===== External Inputs =====

    /// Apply a device notification
    pub fn handle_device_event(&mut self, event: DeviceEvent) {
        let Some(outcome) = self.sync.handle_event(event, self.store.session()) else {
            return;
        };

        match outcome {
            SyncOutcome::DurationChanged(duration) => {
                self.pending_events.push(PlayerEvent::duration(duration));
            }
            SyncOutcome::PositionChanged(position) => {
                self.pending_events.push(PlayerEvent::position(position));
            }
            SyncOutcome::RenderingChanged(rendering) => {
                self.pending_events
                    .push(PlayerEvent::RenderingChanged { rendering });
            }
            SyncOutcome::TrackEnded => {
                if !self.next() {
                    // Nowhere to go (one-track shuffle): stop claiming to play
                    debug!("Track ended with no next track");
                    self.apply(|store| store.set_playing(false));
                }
            }
        }
    }

    /// Apply a host transport command
    ///
    /// Commands map onto the same operations as the in-app controls.
    pub fn handle_remote_command(&mut self, command: RemoteCommand) -> bool {
        debug!(?command, "Handling remote command");
        let current = self.store.session().current_track.clone();

        match command {
            RemoteCommand::Play => current.is_some_and(|track| self.play_track(track)),
            RemoteCommand::Pause => current.is_some_and(|track| self.pause_track(&track)),
            RemoteCommand::Previous => self.previous(),
            RemoteCommand::Next => self.next(),
        }
    }

    /// Apply every queued remote command
    ///
    /// Returns how many commands were processed.
    pub fn pump_remote(&mut self) -> usize {
        let mut handled = 0;
        while let Some(command) = self.remote.try_recv() {
            self.handle_remote_command(command);
            handled += 1;
        }
        handled
    }

    /// Sender that feeds [`pump_remote`](Self::pump_remote)
    pub fn remote_sender(&self) -> mpsc::UnboundedSender<RemoteCommand> {
        self.remote.sender()
    }

    /// Run due timers
    ///
    /// Returns `true` if a pending previous press expired.
    pub fn tick(&mut self) -> bool {
        self.gesture.expire(self.clock.now())
    }

    /// When [`tick`](Self::tick) next needs to run, if ever
    pub fn next_deadline(&self) -> Option<Instant> {
        self.gesture.deadline()
    }

    // ===== State Queries =====

    /// Current session (intent)
    pub fn session(&self) -> &PlaybackSession {
        self.store.session()
    }

    /// Device-side state (reality)
    pub fn device_state(&self) -> &DeviceState {
        self.sync.state()
    }

    /// Loaded playlist
    pub fn playlist(&self) -> &[Track] {
        self.store.playlist()
    }

    /// Selected track
    pub fn current_track(&self) -> Option<&Track> {
        self.store.session().current_track.as_ref()
    }

    /// Whether the player intends to render
    pub fn is_playing(&self) -> bool {
        self.store.session().is_playing
    }

    /// Displayed position
    pub fn position(&self) -> Duration {
        self.sync.state().position
    }

    /// Duration of the loaded source, once known
    pub fn duration(&self) -> Option<Duration> {
        self.sync.state().duration
    }

    /// Volume level (0-100)
    pub fn volume(&self) -> u8 {
        self.volume.level()
    }

    /// Whether output is muted
    pub fn is_muted(&self) -> bool {
        self.volume.is_muted()
    }

    /// Whether a first previous press is waiting for a second one
    pub fn previous_armed(&self) -> bool {
        self.gesture.is_armed()
    }

    // ===== Events =====

    /// Drain queued events
    pub fn drain_events(&mut self) -> Vec<PlayerEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Check if there are pending events
    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    // ===== Internal =====

    fn apply<F>(&mut self, transition: F) -> bool
    where
        F: FnOnce(&mut SessionStore) -> bool,
    {
        let before = self.store.session().clone();
        if !transition(&mut self.store) {
            return false;
        }
        self.commit(&before);
        true
    }

    /// Publish a session change: events, device, host controls
    fn commit(&mut self, before: &PlaybackSession) {
        let after = self.store.session();

        let selection = |s: &PlaybackSession| s.current_track.as_ref().map(|_| s.selection);
        let track_changed = selection(before) != selection(after);

        if track_changed {
            self.pending_events.push(PlayerEvent::TrackChanged {
                track_id: after.current_id().cloned(),
                previous_track_id: before.current_id().cloned(),
            });
        }
        if after.is_playing != before.is_playing {
            self.pending_events.push(PlayerEvent::StateChanged {
                is_playing: after.is_playing,
            });
        }
        if after.aggregate_mode_active != before.aggregate_mode_active {
            self.pending_events.push(PlayerEvent::AggregateModeChanged {
                active: after.aggregate_mode_active,
            });
        }
        if after.shuffle != before.shuffle {
            self.pending_events.push(PlayerEvent::ShuffleChanged {
                enabled: after.shuffle,
            });
        }

        self.sync.reconcile(after);

        if track_changed {
            self.pending_events.push(PlayerEvent::position(Duration::ZERO));
            self.remote.publish(after.current_track.as_ref());
        }
        if after.current_track.is_some() && (track_changed || after.is_playing != before.is_playing) {
            self.remote.publish_status(after.is_playing);
        }
    }

    fn restart(&mut self) -> bool {
        match self.sync.restart() {
            Some(position) => {
                self.pending_events.push(PlayerEvent::position(position));
                true
            }
            None => false,
        }
    }

    fn update_volume<F>(&mut self, change: F)
    where
        F: FnOnce(&mut Volume),
    {
        let before = self.volume;
        change(&mut self.volume);
        if self.volume == before {
            return;
        }

        self.sync.set_volume(self.volume.gain());
        self.pending_events.push(PlayerEvent::VolumeChanged {
            level: self.volume.level(),
            is_muted: self.volume.is_muted(),
        });
    }
}

impl std::fmt::Debug for PlaybackManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackManager")
            .field("session", self.store.session())
            .field("device", self.sync.state())
            .field("volume", &self.volume)
            .field("remote", &self.remote)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{DeviceCommand, RecordingDevice};
    use cadence_core::TrackId;

    fn create_test_track(id: &str) -> Track {
        Track::new(
            TrackId::new(id),
            format!("Track {}", id),
            "Test Artist",
            format!("https://cdn.test/{}.mp3", id),
        )
    }

    fn manager_with_tracks(ids: &[&str]) -> (PlaybackManager, RecordingDevice) {
        let device = RecordingDevice::new();
        let config = PlaybackConfig {
            shuffle_seed: Some(7),
            ..PlaybackConfig::default()
        };
        let mut manager = PlaybackManager::new(config, Box::new(device.clone()));
        manager.set_playlist(ids.iter().map(|id| create_test_track(id)).collect());
        manager.drain_events();
        device.take_commands();
        (manager, device)
    }

    #[test]
    fn test_new_manager_pushes_initial_volume() {
        let device = RecordingDevice::new();
        let manager = PlaybackManager::new(PlaybackConfig::default(), Box::new(device.clone()));

        assert_eq!(manager.volume(), 80);
        assert_eq!(device.take_commands(), vec![DeviceCommand::SetVolume(0.8)]);
    }

    #[test]
    fn test_play_track_emits_change_and_loads() {
        let (mut manager, device) = manager_with_tracks(&["a", "b"]);

        assert!(manager.play_track(create_test_track("b")));

        let events = manager.drain_events();
        assert_eq!(
            events[0],
            PlayerEvent::TrackChanged {
                track_id: Some(TrackId::new("b")),
                previous_track_id: None,
            }
        );
        assert!(events.contains(&PlayerEvent::StateChanged { is_playing: true }));
        assert_eq!(
            device.take_commands(),
            vec![
                DeviceCommand::Load("https://cdn.test/b.mp3".into()),
                DeviceCommand::Play,
            ]
        );
    }

    #[test]
    fn test_noop_transition_emits_nothing() {
        let (mut manager, device) = manager_with_tracks(&["a"]);
        manager.play_track(create_test_track("a"));
        manager.drain_events();
        device.take_commands();

        assert!(!manager.play_track(create_test_track("a")));
        assert!(!manager.has_pending_events());
        assert!(device.take_commands().is_empty());
    }

    #[test]
    fn test_seek_moves_position_without_touching_intent() {
        let (mut manager, _device) = manager_with_tracks(&["a"]);
        manager.play_track(create_test_track("a"));
        manager.pause_track(&create_test_track("a"));
        manager.drain_events();

        assert_eq!(manager.seek(Duration::from_secs(12)), Some(Duration::from_secs(12)));
        assert_eq!(manager.position(), Duration::from_secs(12));
        assert!(!manager.is_playing());
        assert_eq!(
            manager.drain_events(),
            vec![PlayerEvent::PositionChanged { position_ms: 12_000 }]
        );
    }

    #[test]
    fn test_volume_changes_reach_device() {
        let (mut manager, device) = manager_with_tracks(&[]);

        manager.set_volume(50);
        manager.mute();
        manager.mute();
        manager.unmute();

        assert_eq!(
            device.take_commands(),
            vec![
                DeviceCommand::SetVolume(0.5),
                DeviceCommand::SetVolume(0.0),
                DeviceCommand::SetVolume(0.5),
            ]
        );
        assert_eq!(manager.drain_events().len(), 3);
    }

    #[test]
    fn test_clear_unloads_and_reports() {
        let (mut manager, device) = manager_with_tracks(&["a"]);
        manager.play_track(create_test_track("a"));
        manager.drain_events();
        device.take_commands();

        assert!(manager.clear());
        assert!(manager.current_track().is_none());
        assert_eq!(device.take_commands(), vec![DeviceCommand::Unload]);
        let events = manager.drain_events();
        assert!(events.contains(&PlayerEvent::TrackChanged {
            track_id: None,
            previous_track_id: Some(TrackId::new("a")),
        }));
        assert_eq!(events.last(), Some(&PlayerEvent::Cleared));
    }

    #[test]
    fn test_clear_with_nothing_selected_is_silent() {
        let (mut manager, device) = manager_with_tracks(&["a"]);

        assert!(!manager.clear());
        assert!(!manager.has_pending_events());
        assert!(device.take_commands().is_empty());
    }

    #[test]
    fn test_shuffle_acknowledged_on_every_call() {
        let (mut manager, _device) = manager_with_tracks(&["a", "b"]);

        assert!(manager.set_shuffle(true));
        assert!(!manager.set_shuffle(true));
        assert!(manager.set_shuffle(false));

        assert_eq!(
            manager.drain_events(),
            vec![
                PlayerEvent::ShuffleChanged { enabled: true },
                PlayerEvent::ShuffleChanged { enabled: true },
                PlayerEvent::ShuffleChanged { enabled: false },
            ]
        );
    }
}
