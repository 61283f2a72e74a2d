//! Previous-button disambiguation
//!
//! A first "previous" press restarts the current track and arms a
//! single-slot timer. A second press before the window elapses disarms it
//! and performs the real skip back. The window is measured from the
//! accepted first press, not from when any timer callback runs.

use std::time::{Duration, Instant};

/// What a "previous" press should do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviousAction {
    /// Seek the current track back to zero
    Restart,

    /// Move to the previous track in the playlist
    SkipBack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Idle,
    Armed { at: Instant },
}

/// Two-state (idle/armed) timer for "previous" presses
#[derive(Debug, Clone)]
pub struct PreviousGesture {
    window: Duration,
    slot: Slot,
}

impl PreviousGesture {
    /// Create an idle gesture tracker
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            slot: Slot::Idle,
        }
    }

    /// Register a press at `now`
    pub fn press(&mut self, now: Instant) -> PreviousAction {
        match self.slot {
            Slot::Armed { at } if now.saturating_duration_since(at) < self.window => {
                self.slot = Slot::Idle;
                PreviousAction::SkipBack
            }
            _ => {
                // Idle, or armed but the deferred clear has not run yet
                self.slot = Slot::Armed { at: now };
                PreviousAction::Restart
            }
        }
    }

    /// Deferred clear: disarm once the window has elapsed
    ///
    /// Returns `true` if the slot was cleared by this call.
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.slot {
            Slot::Armed { at } if now.saturating_duration_since(at) >= self.window => {
                self.slot = Slot::Idle;
                true
            }
            _ => false,
        }
    }

    /// When the deferred clear is due, if armed
    pub fn deadline(&self) -> Option<Instant> {
        match self.slot {
            Slot::Armed { at } => Some(at + self.window),
            Slot::Idle => None,
        }
    }

    /// Whether a first press is pending
    pub fn is_armed(&self) -> bool {
        matches!(self.slot, Slot::Armed { .. })
    }

    /// Configured window
    pub fn window(&self) -> Duration {
        self.window
    }
}
