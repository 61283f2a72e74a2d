//! Platform-agnostic playback device trait
//!
//! Abstracts the one real-time rendering endpoint (an audio element, a
//! native player, a simulated device). Commands go down through
//! [`PlaybackDevice`]; what the device actually does comes back up as
//! [`DeviceEvent`]s.

use crate::error::Result;
use std::fmt;
use std::time::Duration;

/// Identity of one load request
///
/// Every load gets a fresh id, even when it reloads the same media URL, and
/// the device stamps it on each event that load produces. Events carrying
/// any other id belong to an abandoned load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct LoadId(u64);

impl LoadId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    pub(crate) const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for LoadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "load#{}", self.0)
    }
}

/// Rendering endpoint driven by the playback manager
///
/// Loading and starting playback are asynchronous on every real platform:
/// the methods only *request* the operation, and its outcome arrives later
/// as a [`DeviceEvent`]. Only the manager's synchronization layer may call
/// these.
pub trait PlaybackDevice: Send {
    /// Start loading a new media source, replacing the current one
    ///
    /// Any in-flight load is abandoned. Every event caused by this load must
    /// carry `load`; events of abandoned loads may still arrive and are
    /// discarded upstream.
    fn load(&mut self, source: &str, load: LoadId);

    /// Request rendering of the loaded source
    ///
    /// # Returns
    /// * `Ok(())` - request accepted (rendering may still fail later)
    /// * `Err(PlaybackError::PlayRejected)` - refused, e.g. by autoplay policy
    fn play(&mut self) -> Result<()>;

    /// Stop rendering, keeping the position
    fn pause(&mut self);

    /// Jump to a position in the loaded source
    fn seek(&mut self, position: Duration) -> Result<()>;

    /// Set output gain (0.0 - 1.0)
    fn set_volume(&mut self, gain: f32);

    /// Drop the loaded source
    fn unload(&mut self) {
        self.pause();
    }
}

/// Notification from the device
///
/// Every event names the load it belongs to, so events from a load that
/// has since been replaced (even by a reload of the same URL) can be
/// recognised and dropped.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceEvent {
    /// Source metadata is available; the device can start rendering
    MetadataLoaded {
        /// Load the event belongs to
        load: LoadId,
        /// Total length of the source
        duration: Duration,
    },

    /// Periodic position report
    TimeUpdate {
        /// Load the event belongs to
        load: LoadId,
        /// Current position
        position: Duration,
    },

    /// Rendering actually started
    Playing {
        /// Load the event belongs to
        load: LoadId,
    },

    /// Rendering actually stopped
    Paused {
        /// Load the event belongs to
        load: LoadId,
    },

    /// Source played to its end
    Ended {
        /// Load the event belongs to
        load: LoadId,
    },

    /// Loading or rendering failed
    Failed {
        /// Load the event belongs to
        load: LoadId,
        /// Platform error message
        message: String,
    },
}

impl DeviceEvent {
    /// Load this event belongs to
    pub fn load_id(&self) -> LoadId {
        match self {
            DeviceEvent::MetadataLoaded { load, .. }
            | DeviceEvent::TimeUpdate { load, .. }
            | DeviceEvent::Playing { load }
            | DeviceEvent::Paused { load }
            | DeviceEvent::Ended { load }
            | DeviceEvent::Failed { load, .. } => *load,
        }
    }
}
