//! OS-level media controls
//!
//! Publishes now-playing metadata to the host platform and funnels the
//! platform's transport buttons back into the player. Hosts without such a
//! surface simply pass no [`MediaControls`]; the bridge then does nothing.

use crate::types::NowPlaying;
use cadence_core::Track;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, trace};

/// Transport command from the host platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteCommand {
    Play,
    Pause,
    Previous,
    Next,
}

/// Playback status shown by the host platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStatus {
    Playing,
    Paused,
    Stopped,
}

/// Callback invoked by the platform when a transport button is pressed
pub type RemoteHandler = Arc<dyn Fn(RemoteCommand) + Send + Sync>;

/// Host "now playing" surface
///
/// Implementations must *replace* any previously registered handler in
/// [`set_handler`](MediaControls::set_handler); handlers never stack.
pub trait MediaControls: Send {
    /// Show metadata for the current track
    fn set_metadata(&mut self, now_playing: &NowPlaying);

    /// Remove any shown metadata
    fn clear_metadata(&mut self);

    /// Register the transport handler, replacing the previous one
    fn set_handler(&mut self, handler: RemoteHandler);

    /// Mirror play/pause status (optional)
    fn set_playback(&mut self, _status: PlaybackStatus) {}
}

/// Bridge between the player and optional host media controls
///
/// Platform callbacks may fire on any thread; they only enqueue commands.
/// The owner drains them with [`RemoteBridge::try_recv`] on its own loop.
pub struct RemoteBridge {
    controls: Option<Box<dyn MediaControls>>,
    tx: mpsc::UnboundedSender<RemoteCommand>,
    rx: mpsc::UnboundedReceiver<RemoteCommand>,
}

impl RemoteBridge {
    /// Create a bridge, with or without a host surface
    pub fn new(controls: Option<Box<dyn MediaControls>>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { controls, tx, rx }
    }

    /// Whether a host surface is attached
    pub fn is_attached(&self) -> bool {
        self.controls.is_some()
    }

    /// Sender for injecting commands from elsewhere (key bindings, IPC)
    pub fn sender(&self) -> mpsc::UnboundedSender<RemoteCommand> {
        self.tx.clone()
    }

    /// Publish a track change
    ///
    /// Re-registers the handler each time; the host keeps only the latest.
    pub fn publish(&mut self, track: Option<&Track>) {
        let Some(controls) = self.controls.as_mut() else {
            return;
        };

        match track {
            Some(track) => {
                debug!(track_id = %track.id, "Publishing now-playing metadata");
                controls.set_metadata(&NowPlaying::from(track));

                let tx = self.tx.clone();
                controls.set_handler(Arc::new(move |command| {
                    // Receiver gone means the player is shutting down
                    let _ = tx.send(command);
                }));
            }
            None => {
                debug!("Clearing now-playing metadata");
                controls.clear_metadata();
                controls.set_playback(PlaybackStatus::Stopped);
            }
        }
    }

    /// Mirror playing/paused to the host
    pub fn publish_status(&mut self, is_playing: bool) {
        if let Some(controls) = self.controls.as_mut() {
            controls.set_playback(if is_playing {
                PlaybackStatus::Playing
            } else {
                PlaybackStatus::Paused
            });
        }
    }

    /// Next queued command, if any
    pub fn try_recv(&mut self) -> Option<RemoteCommand> {
        let command = self.rx.try_recv().ok();
        if let Some(command) = command {
            trace!(?command, "Remote command received");
        }
        command
    }
}

impl Default for RemoteBridge {
    fn default() -> Self {
        Self::new(None)
    }
}

impl std::fmt::Debug for RemoteBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteBridge")
            .field("attached", &self.is_attached())
            .finish_non_exhaustive()
    }
}
