//! Terminal "now playing" surface
//!
//! The terminal plays the part of a host media session: published metadata
//! is printed as a status line, and the `media ...` commands press the
//! host's transport keys through whatever handler the player registered.

use cadence_playback::{MediaControls, NowPlaying, PlaybackStatus, RemoteCommand, RemoteHandler};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

#[derive(Default)]
struct Surface {
    handler: Option<RemoteHandler>,
    now_playing: Option<NowPlaying>,
    status: Option<PlaybackStatus>,
}

/// [`MediaControls`] printing to the terminal
pub struct TerminalControls {
    surface: Arc<Mutex<Surface>>,
}

/// Transport keys of a [`TerminalControls`] surface
#[derive(Clone)]
pub struct MediaKeys {
    surface: Arc<Mutex<Surface>>,
}

impl TerminalControls {
    pub fn new() -> (Self, MediaKeys) {
        let surface = Arc::new(Mutex::new(Surface::default()));
        (
            Self {
                surface: Arc::clone(&surface),
            },
            MediaKeys { surface },
        )
    }
}

impl MediaControls for TerminalControls {
    fn set_metadata(&mut self, now_playing: &NowPlaying) {
        println!("♪ {} - {}", now_playing.title, now_playing.artist);
        lock(&self.surface).now_playing = Some(now_playing.clone());
    }

    fn clear_metadata(&mut self) {
        lock(&self.surface).now_playing = None;
    }

    fn set_handler(&mut self, handler: RemoteHandler) {
        lock(&self.surface).handler = Some(handler);
    }

    fn set_playback(&mut self, status: PlaybackStatus) {
        lock(&self.surface).status = Some(status);
    }
}

impl MediaKeys {
    /// Press a transport key
    ///
    /// Returns false when no handler is registered yet (nothing has played).
    pub fn press(&self, command: RemoteCommand) -> bool {
        let handler = lock(&self.surface).handler.clone();
        match handler {
            Some(handler) => {
                debug!(?command, "Media key pressed");
                handler(command);
                true
            }
            None => false,
        }
    }

    /// Metadata currently shown on the surface
    pub fn now_playing(&self) -> Option<NowPlaying> {
        lock(&self.surface).now_playing.clone()
    }

    /// Status currently shown on the surface
    pub fn status(&self) -> Option<PlaybackStatus> {
        lock(&self.surface).status
    }
}

fn lock(surface: &Mutex<Surface>) -> MutexGuard<'_, Surface> {
    surface.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}
