//! Device synchronization
//!
//! Keeps the playback device consistent with the session (intent) and folds
//! device events back into [`DeviceState`] (reality). Two rules, never
//! conflated:
//!
//! 1. **Source change** - a new selection resets the displayed position and
//!    loads the new source. Play is requested right away and again once the
//!    source metadata arrives, so a play issued before the source was ready
//!    is not lost.
//! 2. **Intent change** - play/pause toggles on the same selection go
//!    straight to the device.
//!
//! Play rejections (autoplay policy and friends) are logged and swallowed:
//! the UI follows device events, not optimistic intent.

use crate::device::{DeviceEvent, LoadId, PlaybackDevice};
use crate::types::{DeviceState, PlaybackSession};
use cadence_core::Track;
use std::time::Duration;
use tracing::{debug, warn};

/// What a device event meant for the layers above
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SyncOutcome {
    /// Source duration became known
    DurationChanged(Duration),

    /// Displayed position moved
    PositionChanged(Duration),

    /// Device started or stopped rendering
    RenderingChanged(bool),

    /// Current source played to its end
    TrackEnded,
}

/// Sole owner of the playback device
pub struct DeviceSync {
    device: Box<dyn PlaybackDevice>,
    state: DeviceState,
    last_load: LoadId,

    // Last session values pushed to the device
    synced_selection: Option<u64>,
    synced_playing: bool,
}

impl DeviceSync {
    /// Wrap a device
    pub fn new(device: Box<dyn PlaybackDevice>) -> Self {
        Self {
            device,
            state: DeviceState::default(),
            last_load: LoadId::default(),
            synced_selection: None,
            synced_playing: false,
        }
    }

    /// Device-side state
    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    /// Push session changes down to the device
    pub fn reconcile(&mut self, session: &PlaybackSession) {
        let selection = session.current_track.as_ref().map(|_| session.selection);

        if selection != self.synced_selection {
            self.synced_selection = selection;
            self.change_source(session.current_track.as_ref());

            if session.is_playing {
                self.request_play();
            }
            self.synced_playing = session.is_playing;
            return;
        }

        if session.is_playing != self.synced_playing {
            self.synced_playing = session.is_playing;
            if session.is_playing {
                self.request_play();
            } else {
                self.device.pause();
            }
        }
    }

    /// Fold a device event into the device state
    ///
    /// Events from any load other than the current one are stale (a load
    /// that was redirected or restarted before its events arrived) and are
    /// dropped, even when both loads point at the same URL.
    pub fn handle_event(
        &mut self,
        event: DeviceEvent,
        session: &PlaybackSession,
    ) -> Option<SyncOutcome> {
        if self.state.load != Some(event.load_id()) {
            debug!(
                load = %event.load_id(),
                current = ?self.state.load,
                "Discarding event for stale load"
            );
            return None;
        }

        match event {
            DeviceEvent::MetadataLoaded { duration, .. } => {
                self.state.duration = Some(duration);
                if session.is_playing {
                    self.request_play();
                }
                Some(SyncOutcome::DurationChanged(duration))
            }
            DeviceEvent::TimeUpdate { position, .. } => {
                self.state.position = position;
                Some(SyncOutcome::PositionChanged(position))
            }
            DeviceEvent::Playing { .. } => {
                self.state.rendering = true;
                Some(SyncOutcome::RenderingChanged(true))
            }
            DeviceEvent::Paused { .. } => {
                self.state.rendering = false;
                Some(SyncOutcome::RenderingChanged(false))
            }
            DeviceEvent::Ended { .. } => {
                self.state.rendering = false;
                Some(SyncOutcome::TrackEnded)
            }
            DeviceEvent::Failed { message, .. } => {
                warn!(
                    source = ?self.state.loaded_source,
                    error = %message,
                    "Device failed to render source"
                );
                self.state.rendering = false;
                Some(SyncOutcome::RenderingChanged(false))
            }
        }
    }

    /// Jump within the loaded source
    ///
    /// The displayed position moves immediately; play intent is untouched.
    /// Returns the position applied, or `None` when nothing is loaded.
    pub fn seek(&mut self, to: Duration) -> Option<Duration> {
        self.state.loaded_source.as_ref()?;

        let target = match self.state.duration {
            Some(duration) => to.min(duration),
            None => to,
        };

        self.state.position = target;
        if let Err(e) = self.device.seek(target) {
            warn!(position = ?target, error = %e, "Device rejected seek");
        }
        Some(target)
    }

    /// Seek the loaded source back to its start
    pub fn restart(&mut self) -> Option<Duration> {
        self.seek(Duration::ZERO)
    }

    /// Forward output gain to the device
    pub fn set_volume(&mut self, gain: f32) {
        self.state.volume = gain;
        self.device.set_volume(gain);
    }

    fn change_source(&mut self, track: Option<&Track>) {
        // Never show the old position against the new track
        self.state.position = Duration::ZERO;
        self.state.duration = None;
        self.state.rendering = false;

        match track {
            Some(track) => {
                self.last_load = self.last_load.next();
                let load = self.last_load;
                debug!(track_id = %track.id, source = %track.media_url, %load, "Loading source");
                self.state.loaded_source = Some(track.media_url.clone());
                self.state.load = Some(load);
                self.device.load(&track.media_url, load);
            }
            None => {
                debug!("Unloading source");
                self.state.loaded_source = None;
                self.state.load = None;
                self.device.unload();
            }
        }
    }

    fn request_play(&mut self) {
        if let Err(e) = self.device.play() {
            // State keeps following device events; intent stays as is
            warn!(error = %e, "Play request rejected by device");
        }
    }
}

impl std::fmt::Debug for DeviceSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceSync")
            .field("state", &self.state)
            .field("synced_selection", &self.synced_selection)
            .field("synced_playing", &self.synced_playing)
            .finish_non_exhaustive()
    }
}
