//! Simulated playback device
//!
//! Stands in for a real audio output: loads take a configurable time,
//! rendering advances a position on a tokio timer, and every outcome is
//! reported as a [`DeviceEvent`] on a channel, just like a platform media
//! element would.

use crate::config::DeviceSettings;
use cadence_playback::{DeviceEvent, LoadId, PlaybackDevice, PlaybackError};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, trace};

#[derive(Debug, Default)]
struct DeviceInner {
    /// Current load; stale load timers compare against it
    load: Option<LoadId>,
    loaded: bool,
    playing: bool,
    position: Duration,
    duration: Duration,
    gain: f32,
    /// Bumped on every play/pause/load; stale render loops compare against it
    run_generation: u64,
}

/// [`PlaybackDevice`] driven by tokio timers
///
/// Must be used from within a tokio runtime.
pub struct SimulatedDevice {
    inner: Arc<Mutex<DeviceInner>>,
    events: mpsc::UnboundedSender<DeviceEvent>,
    settings: DeviceSettings,
}

impl SimulatedDevice {
    /// Create a device and the receiver its events arrive on
    pub fn new(settings: DeviceSettings) -> (Self, mpsc::UnboundedReceiver<DeviceEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let device = Self {
            inner: Arc::new(Mutex::new(DeviceInner::default())),
            events,
            settings,
        };
        (device, receiver)
    }

    /// Gain last set on the device
    pub fn gain(&self) -> f32 {
        lock(&self.inner).gain
    }

    fn spawn_render_loop(&self, load: LoadId, run: u64) {
        let inner = Arc::clone(&self.inner);
        let events = self.events.clone();
        let tick = self.settings.tick();

        tokio::spawn(async move {
            loop {
                tokio::time::sleep(tick).await;

                let mut state = lock(&inner);
                if state.run_generation != run || !state.playing {
                    return;
                }

                state.position = (state.position + tick).min(state.duration);
                let position = state.position;
                let finished = position >= state.duration;
                if finished {
                    state.playing = false;
                    state.run_generation += 1;
                }
                drop(state);

                let _ = events.send(DeviceEvent::TimeUpdate { load, position });

                if finished {
                    trace!(%load, "Simulated source ended");
                    let _ = events.send(DeviceEvent::Ended { load });
                    return;
                }
            }
        });
    }
}

impl PlaybackDevice for SimulatedDevice {
    fn load(&mut self, source: &str, load: LoadId) {
        {
            let mut state = lock(&self.inner);
            state.load = Some(load);
            state.loaded = false;
            state.playing = false;
            state.position = Duration::ZERO;
            state.duration = Duration::ZERO;
            state.run_generation += 1;
        }

        debug!(%load, "Simulated device loading {}", source);

        let inner = Arc::clone(&self.inner);
        let events = self.events.clone();
        let latency = self.settings.load_latency();
        let duration = self.settings.track_length();

        tokio::spawn(async move {
            tokio::time::sleep(latency).await;

            {
                let mut state = lock(&inner);
                if state.load != Some(load) {
                    trace!(%load, "Abandoned load");
                    return;
                }
                state.loaded = true;
                state.duration = duration;
            }

            let _ = events.send(DeviceEvent::MetadataLoaded { load, duration });
        });
    }

    fn play(&mut self) -> cadence_playback::Result<()> {
        let (load, run) = {
            let mut state = lock(&self.inner);
            let Some(load) = state.load else {
                return Err(PlaybackError::NoSourceLoaded);
            };
            // Rendering starts once metadata arrives and play is requested again
            if !state.loaded || state.playing {
                return Ok(());
            }
            if state.position >= state.duration {
                state.position = Duration::ZERO;
            }
            state.playing = true;
            state.run_generation += 1;
            (load, state.run_generation)
        };

        let _ = self.events.send(DeviceEvent::Playing { load });
        self.spawn_render_loop(load, run);
        Ok(())
    }

    fn pause(&mut self) {
        let load = {
            let mut state = lock(&self.inner);
            if !state.playing {
                return;
            }
            state.playing = false;
            state.run_generation += 1;
            state.load
        };

        if let Some(load) = load {
            let _ = self.events.send(DeviceEvent::Paused { load });
        }
    }

    fn seek(&mut self, position: Duration) -> cadence_playback::Result<()> {
        let (load, position) = {
            let mut state = lock(&self.inner);
            let Some(load) = state.load else {
                return Err(PlaybackError::NoSourceLoaded);
            };
            if !state.loaded {
                return Err(PlaybackError::InvalidSeekPosition(position));
            }
            state.position = position.min(state.duration);
            (load, state.position)
        };

        let _ = self.events.send(DeviceEvent::TimeUpdate { load, position });
        Ok(())
    }

    fn set_volume(&mut self, gain: f32) {
        lock(&self.inner).gain = gain.clamp(0.0, 1.0);
    }

    fn unload(&mut self) {
        let mut state = lock(&self.inner);
        state.load = None;
        state.loaded = false;
        state.playing = false;
        state.position = Duration::ZERO;
        state.run_generation += 1;
    }
}

fn lock(inner: &Mutex<DeviceInner>) -> MutexGuard<'_, DeviceInner> {
    inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: LoadId = LoadId::new(1);
    const B: LoadId = LoadId::new(2);

    fn settings() -> DeviceSettings {
        DeviceSettings {
            load_latency_ms: 100,
            track_length_secs: 3,
            tick_ms: 1000,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn load_reports_metadata_after_latency() {
        let (mut device, mut events) = SimulatedDevice::new(settings());

        device.load("a.mp3", A);

        assert_eq!(
            events.recv().await,
            Some(DeviceEvent::MetadataLoaded {
                load: A,
                duration: Duration::from_secs(3),
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn replaced_load_never_reports() {
        let (mut device, mut events) = SimulatedDevice::new(settings());

        device.load("a.mp3", A);
        device.load("a.mp3", B);

        let event = events.recv().await.unwrap();
        assert_eq!(event.load_id(), B);

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(events.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn play_before_metadata_is_deferred() {
        let (mut device, mut events) = SimulatedDevice::new(settings());

        device.load("a.mp3", A);
        assert!(device.play().is_ok());

        assert!(matches!(
            events.recv().await,
            Some(DeviceEvent::MetadataLoaded { .. })
        ));
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(events.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn renders_to_the_end() {
        let (mut device, mut events) = SimulatedDevice::new(settings());

        device.load("a.mp3", A);
        events.recv().await.unwrap();
        device.play().unwrap();

        let mut received = Vec::new();
        while let Some(event) = events.recv().await {
            let ended = matches!(event, DeviceEvent::Ended { .. });
            received.push(event);
            if ended {
                break;
            }
        }

        assert_eq!(received.first(), Some(&DeviceEvent::Playing { load: A }));
        assert!(received.contains(&DeviceEvent::TimeUpdate {
            load: A,
            position: Duration::from_secs(3),
        }));
        assert_eq!(received.last(), Some(&DeviceEvent::Ended { load: A }));
    }

    #[tokio::test(start_paused = true)]
    async fn pause_stops_position_reports() {
        let (mut device, mut events) = SimulatedDevice::new(settings());

        device.load("a.mp3", A);
        events.recv().await.unwrap();
        device.play().unwrap();
        assert!(matches!(events.recv().await, Some(DeviceEvent::Playing { .. })));

        device.pause();
        assert!(matches!(events.recv().await, Some(DeviceEvent::Paused { .. })));

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn play_without_source_fails() {
        let (mut device, _events) = SimulatedDevice::new(settings());
        assert!(matches!(device.play(), Err(PlaybackError::NoSourceLoaded)));
        assert!(matches!(
            device.seek(Duration::from_secs(1)),
            Err(PlaybackError::NoSourceLoaded)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn seek_clamps_to_duration() {
        let (mut device, mut events) = SimulatedDevice::new(settings());

        device.load("a.mp3", A);
        events.recv().await.unwrap();
        device.seek(Duration::from_secs(60)).unwrap();

        assert_eq!(
            events.recv().await,
            Some(DeviceEvent::TimeUpdate {
                load: A,
                position: Duration::from_secs(3),
            })
        );
    }

    #[tokio::test]
    async fn volume_is_clamped() {
        let (mut device, _events) = SimulatedDevice::new(settings());
        device.set_volume(1.5);
        assert_eq!(device.gain(), 1.0);
    }
}
