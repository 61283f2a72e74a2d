//! Test doubles for the playback device and host media controls
//!
//! Both doubles are cheap handles over shared state: give one clone to the
//! manager, keep the other to inspect what happened.

use crate::device::{LoadId, PlaybackDevice};
use crate::error::{PlaybackError, Result};
use crate::remote::{MediaControls, PlaybackStatus, RemoteCommand, RemoteHandler};
use crate::types::NowPlaying;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Command received by a [`RecordingDevice`]
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCommand {
    Load(String),
    Play,
    Pause,
    Seek(Duration),
    SetVolume(f32),
    Unload,
}

#[derive(Debug, Default)]
struct DeviceLog {
    commands: Vec<DeviceCommand>,
    reject_play: bool,
}

/// Device that records every command it receives
#[derive(Debug, Clone, Default)]
pub struct RecordingDevice {
    log: Arc<Mutex<DeviceLog>>,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent play requests fail like an autoplay block
    pub fn reject_play(&self, reject: bool) {
        self.lock().reject_play = reject;
    }

    /// Commands received so far
    pub fn commands(&self) -> Vec<DeviceCommand> {
        self.lock().commands.clone()
    }

    /// Commands received since the last call
    pub fn take_commands(&self) -> Vec<DeviceCommand> {
        std::mem::take(&mut self.lock().commands)
    }

    fn lock(&self) -> MutexGuard<'_, DeviceLog> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, command: DeviceCommand) {
        self.lock().commands.push(command);
    }
}

impl PlaybackDevice for RecordingDevice {
    fn load(&mut self, source: &str, _load: LoadId) {
        self.record(DeviceCommand::Load(source.to_string()));
    }

    fn play(&mut self) -> Result<()> {
        self.record(DeviceCommand::Play);
        if self.lock().reject_play {
            return Err(PlaybackError::PlayRejected(
                "user gesture required".to_string(),
            ));
        }
        Ok(())
    }

    fn pause(&mut self) {
        self.record(DeviceCommand::Pause);
    }

    fn seek(&mut self, position: Duration) -> Result<()> {
        self.record(DeviceCommand::Seek(position));
        Ok(())
    }

    fn set_volume(&mut self, gain: f32) {
        self.record(DeviceCommand::SetVolume(gain));
    }

    fn unload(&mut self) {
        self.record(DeviceCommand::Unload);
    }
}

#[derive(Default)]
struct ControlsLog {
    metadata: Option<NowPlaying>,
    published: Vec<NowPlaying>,
    handler: Option<RemoteHandler>,
    registrations: usize,
    status: Option<PlaybackStatus>,
}

/// Host media controls that keep only the latest handler, like real hosts
#[derive(Clone, Default)]
pub struct RecordingControls {
    log: Arc<Mutex<ControlsLog>>,
}

impl RecordingControls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Metadata currently shown
    pub fn metadata(&self) -> Option<NowPlaying> {
        self.lock().metadata.clone()
    }

    /// Every metadata update, oldest first
    pub fn published(&self) -> Vec<NowPlaying> {
        self.lock().published.clone()
    }

    /// How many times a handler was registered
    pub fn registrations(&self) -> usize {
        self.lock().registrations
    }

    /// Last mirrored status
    pub fn status(&self) -> Option<PlaybackStatus> {
        self.lock().status
    }

    /// Simulate a transport button press
    ///
    /// Returns `false` if no handler is registered.
    pub fn press(&self, command: RemoteCommand) -> bool {
        let handler = self.lock().handler.clone();
        match handler {
            Some(handler) => {
                handler(command);
                true
            }
            None => false,
        }
    }

    fn lock(&self) -> MutexGuard<'_, ControlsLog> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl MediaControls for RecordingControls {
    fn set_metadata(&mut self, now_playing: &NowPlaying) {
        let mut log = self.lock();
        log.metadata = Some(now_playing.clone());
        log.published.push(now_playing.clone());
    }

    fn clear_metadata(&mut self) {
        self.lock().metadata = None;
    }

    fn set_handler(&mut self, handler: RemoteHandler) {
        let mut log = self.lock();
        log.handler = Some(handler);
        log.registrations += 1;
    }

    fn set_playback(&mut self, status: PlaybackStatus) {
        self.lock().status = Some(status);
    }
}

impl std::fmt::Debug for RecordingControls {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingControls")
            .field("registrations", &self.registrations())
            .finish_non_exhaustive()
    }
}
