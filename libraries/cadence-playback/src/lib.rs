//! Cadence - Playback Session Controller
//!
//! Platform-agnostic playback management for Cadence.
//!
//! This crate provides:
//! - The playback session (current track, play intent, shuffle, "play all")
//!   and its transitions
//! - Synchronization of that session with one playback device
//! - Double-press disambiguation for the "previous" button
//! - Volume control (0-100%, mute/unmute)
//! - A bridge to OS-level media controls
//!
//! # Architecture
//!
//! `cadence-playback` never renders audio itself. The platform provides a
//! [`PlaybackDevice`] (an audio element, a native player, a simulated
//! device) and forwards its [`DeviceEvent`]s. State is split in two:
//!
//! - [`PlaybackSession`] - what the user asked for (intent)
//! - [`DeviceState`] - what the device reports (reality)
//!
//! Everything is applied through `&mut PlaybackManager`, one input at a
//! time. Nothing here spawns tasks or sleeps; the host owns the event loop
//! and calls [`PlaybackManager::tick`] by [`PlaybackManager::next_deadline`].
//!
//! # Example
//!
//! ```rust
//! use cadence_core::{Track, TrackId};
//! use cadence_playback::{DeviceEvent, PlaybackConfig, PlaybackManager};
//! use cadence_playback::test_utils::RecordingDevice;
//! use std::time::Duration;
//!
//! let device = RecordingDevice::new();
//! let mut manager = PlaybackManager::new(PlaybackConfig::default(), Box::new(device));
//!
//! manager.set_playlist(vec![
//!     Track::new(TrackId::new("1"), "Baayo", "Baaba Maal", "https://cdn.test/1.mp3"),
//!     Track::new(TrackId::new("2"), "Yela", "Baaba Maal", "https://cdn.test/2.mp3"),
//! ]);
//!
//! // "Play all" starts from the first track
//! manager.toggle_play_all();
//! assert_eq!(manager.current_track().map(|t| t.title.as_str()), Some("Baayo"));
//!
//! // The device reports back, tagging events with the load they belong to
//! let load = manager.device_state().load.unwrap();
//! manager.handle_device_event(DeviceEvent::MetadataLoaded {
//!     load,
//!     duration: Duration::from_secs(241),
//! });
//! assert_eq!(manager.duration(), Some(Duration::from_secs(241)));
//!
//! // Reaching the end advances
//! manager.handle_device_event(DeviceEvent::Ended { load });
//! assert_eq!(manager.current_track().map(|t| t.title.as_str()), Some("Yela"));
//! ```

mod clock;
mod device;
mod error;
mod events;
mod gesture;
mod manager;
mod remote;
mod session;
mod shuffle;
mod sync;
pub mod types;
mod volume;

pub mod test_utils;

// Public exports
pub use clock::{Clock, ManualClock, SystemClock};
pub use device::{DeviceEvent, LoadId, PlaybackDevice};
pub use error::{PlaybackError, Result};
pub use events::PlayerEvent;
pub use gesture::{PreviousAction, PreviousGesture};
pub use manager::PlaybackManager;
pub use remote::{MediaControls, PlaybackStatus, RemoteBridge, RemoteCommand, RemoteHandler};
pub use session::SessionStore;
pub use types::{DeviceState, NowPlaying, PlaybackConfig, PlaybackSession};
pub use volume::Volume;
