//! End-to-end tests for PlaybackManager
//!
//! Drive the manager the way a host does: user actions, device events,
//! remote commands and timer ticks, one at a time.

use cadence_core::{LoadError, Track, TrackId, TrackSource};
use cadence_playback::test_utils::{DeviceCommand, RecordingControls, RecordingDevice};
use cadence_playback::{
    DeviceEvent, LoadId, ManualClock, PlaybackConfig, PlaybackManager, PlaybackStatus, PlayerEvent,
    RemoteCommand,
};
use std::sync::Arc;
use std::time::Duration;

// ===== Helpers =====

fn create_test_track(id: &str) -> Track {
    Track::new(
        TrackId::new(id),
        format!("Track {}", id),
        "Test Artist",
        url(id),
    )
}

fn url(id: &str) -> String {
    format!("https://cdn.test/{}.mp3", id)
}

struct Harness {
    manager: PlaybackManager,
    device: RecordingDevice,
    controls: RecordingControls,
    clock: ManualClock,
}

fn harness(ids: &[&str]) -> Harness {
    let device = RecordingDevice::new();
    let controls = RecordingControls::new();
    let clock = ManualClock::new();
    let config = PlaybackConfig {
        shuffle_seed: Some(42),
        ..PlaybackConfig::default()
    };

    let mut manager = PlaybackManager::new(config, Box::new(device.clone()))
        .with_clock(Arc::new(clock.clone()))
        .with_media_controls(Box::new(controls.clone()));
    manager.set_playlist(ids.iter().map(|id| create_test_track(id)).collect());
    manager.drain_events();
    device.take_commands();

    Harness {
        manager,
        device,
        controls,
        clock,
    }
}

/// Load the device is currently expected to report for
fn current_load(manager: &PlaybackManager) -> LoadId {
    manager.device_state().load.unwrap()
}

fn current_id(manager: &PlaybackManager) -> Option<String> {
    manager.current_track().map(|t| t.id.to_string())
}

struct FailingSource;

#[async_trait::async_trait]
impl TrackSource for FailingSource {
    async fn list_tracks(&self) -> cadence_core::Result<Vec<Track>> {
        Err(LoadError::unavailable("connection refused"))
    }
}

// ===== Transitions =====

#[test]
fn test_next_wraps_after_last_track() {
    let mut h = harness(&["a", "b", "c"]);
    h.manager.play_track(create_test_track("c"));

    assert!(h.manager.next());
    assert_eq!(current_id(&h.manager).as_deref(), Some("a"));
    assert!(h.manager.is_playing());
}

#[test]
fn test_skip_previous_from_first_wraps_to_last() {
    let mut h = harness(&["a", "b", "c"]);
    h.manager.play_track(create_test_track("a"));

    assert!(h.manager.skip_previous());
    assert_eq!(current_id(&h.manager).as_deref(), Some("c"));
}

#[test]
fn test_play_all_cycle() {
    let mut h = harness(&["a", "b"]);

    assert!(h.manager.toggle_play_all());
    assert_eq!(current_id(&h.manager).as_deref(), Some("a"));
    assert!(h.manager.session().aggregate_mode_active);

    // Pause in place
    h.manager.toggle_play_all();
    assert!(!h.manager.is_playing());
    assert!(!h.manager.session().aggregate_mode_active);
    assert_eq!(current_id(&h.manager).as_deref(), Some("a"));

    // Resume in place
    h.manager.toggle_play_all();
    assert!(h.manager.is_playing());
    assert!(h.manager.session().aggregate_mode_active);
    assert_eq!(current_id(&h.manager).as_deref(), Some("a"));
}

#[test]
fn test_play_track_leaves_aggregate_mode() {
    let mut h = harness(&["a", "b"]);
    h.manager.toggle_play_all();
    h.manager.drain_events();

    h.manager.play_track(create_test_track("b"));
    assert!(!h.manager.session().aggregate_mode_active);
    assert!(h
        .manager
        .drain_events()
        .contains(&PlayerEvent::AggregateModeChanged { active: false }));
}

#[test]
fn test_traversal_on_empty_playlist_is_noop() {
    let mut h = harness(&[]);

    assert!(!h.manager.next());
    assert!(!h.manager.skip_previous());
    assert!(!h.manager.previous());
    assert!(!h.manager.toggle_play_all());
    assert!(h.device.take_commands().is_empty());
}

// ===== Device Synchronization =====

#[test]
fn test_play_deferred_until_metadata() {
    let mut h = harness(&["a"]);
    h.manager.play_track(create_test_track("a"));
    h.device.take_commands();

    h.manager.handle_device_event(DeviceEvent::MetadataLoaded {
        load: current_load(&h.manager),
        duration: Duration::from_secs(180),
    });

    assert_eq!(h.device.take_commands(), vec![DeviceCommand::Play]);
    assert_eq!(h.manager.duration(), Some(Duration::from_secs(180)));
}

#[test]
fn test_stale_events_from_replaced_source_are_ignored() {
    let mut h = harness(&["a", "b"]);
    h.manager.play_track(create_test_track("a"));
    let stale = current_load(&h.manager);
    h.manager.play_track(create_test_track("b"));
    h.manager.drain_events();

    // Late events for "a" arrive after the switch
    h.manager.handle_device_event(DeviceEvent::TimeUpdate {
        load: stale,
        position: Duration::from_secs(90),
    });
    h.manager.handle_device_event(DeviceEvent::Ended { load: stale });

    assert_eq!(h.manager.position(), Duration::ZERO);
    assert_eq!(current_id(&h.manager).as_deref(), Some("b"));
    assert!(!h.manager.has_pending_events());
}

#[test]
fn test_late_events_after_reloading_same_track_are_ignored() {
    let mut h = harness(&["a"]);
    h.manager.play_track(create_test_track("a"));
    let stale = current_load(&h.manager);

    // One-track playlist: next reloads the same URL
    assert!(h.manager.next());
    let selection = h.manager.session().selection;
    h.manager.drain_events();

    h.manager.handle_device_event(DeviceEvent::TimeUpdate {
        load: stale,
        position: Duration::from_secs(42),
    });
    h.manager.handle_device_event(DeviceEvent::Ended { load: stale });

    assert_eq!(h.manager.position(), Duration::ZERO);
    assert_eq!(h.manager.session().selection, selection);
    assert!(!h.manager.has_pending_events());

    // The fresh load still advances on its own end
    let fresh = current_load(&h.manager);
    h.manager.handle_device_event(DeviceEvent::Ended { load: fresh });
    assert_eq!(h.manager.session().selection, selection + 1);
}

#[test]
fn test_late_end_after_manual_skip_does_not_skip_twice() {
    let mut h = harness(&["a", "b", "c"]);
    h.manager.play_track(create_test_track("a"));
    let stale = current_load(&h.manager);

    h.manager.next();
    h.manager.handle_device_event(DeviceEvent::Ended { load: stale });

    assert_eq!(current_id(&h.manager).as_deref(), Some("b"));
}

#[test]
fn test_ended_advances_like_next() {
    let mut h = harness(&["a", "b"]);
    h.manager.play_track(create_test_track("a"));
    h.device.take_commands();

    let load = current_load(&h.manager);
    h.manager.handle_device_event(DeviceEvent::Ended { load });

    assert_eq!(current_id(&h.manager).as_deref(), Some("b"));
    assert_eq!(
        h.device.take_commands(),
        vec![DeviceCommand::Load(url("b")), DeviceCommand::Play]
    );
}

#[test]
fn test_single_track_playlist_repeats_on_end() {
    let mut h = harness(&["a"]);
    h.manager.play_track(create_test_track("a"));
    h.device.take_commands();

    let load = current_load(&h.manager);
    h.manager.handle_device_event(DeviceEvent::Ended { load });

    assert_eq!(current_id(&h.manager).as_deref(), Some("a"));
    assert_eq!(
        h.device.take_commands(),
        vec![DeviceCommand::Load(url("a")), DeviceCommand::Play]
    );
}

#[test]
fn test_single_track_shuffle_stops_on_end() {
    let mut h = harness(&["a"]);
    h.manager.set_shuffle(true);
    h.manager.play_track(create_test_track("a"));

    let load = current_load(&h.manager);
    h.manager.handle_device_event(DeviceEvent::Ended { load });

    assert_eq!(current_id(&h.manager).as_deref(), Some("a"));
    assert!(!h.manager.is_playing());
}

#[test]
fn test_autoplay_rejection_is_swallowed() {
    let mut h = harness(&["a"]);
    h.device.reject_play(true);

    assert!(h.manager.play_track(create_test_track("a")));

    // Intent stays, reality follows the device
    assert!(h.manager.is_playing());
    assert!(!h.manager.device_state().rendering);

    // A later user gesture can still start it
    h.device.reject_play(false);
    h.manager.toggle_playback();
    h.manager.toggle_playback();
    let load = current_load(&h.manager);
    h.manager.handle_device_event(DeviceEvent::Playing { load });
    assert!(h.manager.device_state().rendering);
}

// ===== Previous Gesture =====

#[test]
fn test_single_previous_restarts_current_track() {
    let mut h = harness(&["a", "b"]);
    h.manager.play_track(create_test_track("b"));
    h.manager.handle_device_event(DeviceEvent::TimeUpdate {
        load: current_load(&h.manager),
        position: Duration::from_secs(30),
    });
    h.device.take_commands();

    assert!(h.manager.previous());

    assert_eq!(current_id(&h.manager).as_deref(), Some("b"));
    assert_eq!(h.manager.position(), Duration::ZERO);
    assert_eq!(h.device.take_commands(), vec![DeviceCommand::Seek(Duration::ZERO)]);
    assert!(h.manager.previous_armed());
}

#[test]
fn test_double_previous_within_window_skips_back() {
    let mut h = harness(&["a", "b"]);
    h.manager.play_track(create_test_track("b"));

    h.manager.previous();
    h.clock.advance(Duration::from_millis(400));
    h.manager.previous();

    assert_eq!(current_id(&h.manager).as_deref(), Some("a"));
    assert!(!h.manager.previous_armed());
}

#[test]
fn test_previous_presses_beyond_window_each_restart() {
    let mut h = harness(&["a", "b"]);
    h.manager.play_track(create_test_track("b"));

    h.manager.previous();
    h.clock.advance(Duration::from_millis(1300));
    assert!(h.manager.tick());
    h.manager.previous();

    assert_eq!(current_id(&h.manager).as_deref(), Some("b"));
    assert!(h.manager.previous_armed());
}

#[test]
fn test_window_measured_from_first_press_not_timer() {
    let mut h = harness(&["a", "b"]);
    h.manager.play_track(create_test_track("b"));

    h.manager.previous();
    let deadline = h.manager.next_deadline();
    assert!(deadline.is_some());

    // Deferred clear has not run yet, but the window is over
    h.clock.advance(Duration::from_millis(1250));
    h.manager.previous();

    assert_eq!(current_id(&h.manager).as_deref(), Some("b"));
    assert!(h.manager.next_deadline() > deadline);
}

// ===== Remote Controls =====

#[test]
fn test_remote_metadata_follows_track_changes() {
    let mut h = harness(&["a", "b"]);
    h.manager.play_track(create_test_track("a"));
    h.manager.next();

    let titles: Vec<String> = h.controls.published().into_iter().map(|m| m.title).collect();
    assert_eq!(titles, vec!["Track a", "Track b"]);
    assert_eq!(h.controls.status(), Some(PlaybackStatus::Playing));
}

#[test]
fn test_remote_handler_does_not_accumulate() {
    let mut h = harness(&["a", "b", "c"]);
    h.manager.play_track(create_test_track("a"));
    h.manager.next();
    h.manager.next();
    assert_eq!(h.controls.registrations(), 3);

    // One press, one transition
    h.controls.press(RemoteCommand::Next);
    assert_eq!(h.manager.pump_remote(), 1);
    assert_eq!(current_id(&h.manager).as_deref(), Some("a"));
}

#[test]
fn test_remote_pause_and_play() {
    let mut h = harness(&["a"]);
    h.manager.play_track(create_test_track("a"));

    h.controls.press(RemoteCommand::Pause);
    h.manager.pump_remote();
    assert!(!h.manager.is_playing());
    assert_eq!(h.controls.status(), Some(PlaybackStatus::Paused));

    h.controls.press(RemoteCommand::Play);
    h.manager.pump_remote();
    assert!(h.manager.is_playing());
}

#[test]
fn test_remote_previous_uses_gesture() {
    let mut h = harness(&["a", "b"]);
    h.manager.play_track(create_test_track("b"));

    assert!(h.manager.handle_remote_command(RemoteCommand::Previous));
    assert_eq!(current_id(&h.manager).as_deref(), Some("b"));

    assert!(h.manager.handle_remote_command(RemoteCommand::Previous));
    assert_eq!(current_id(&h.manager).as_deref(), Some("a"));
}

#[test]
fn test_remote_play_without_track_is_noop() {
    let mut h = harness(&["a"]);
    assert!(!h.manager.handle_remote_command(RemoteCommand::Play));
    assert!(h.manager.current_track().is_none());
}

#[test]
fn test_clear_clears_now_playing() {
    let mut h = harness(&["a"]);
    h.manager.play_track(create_test_track("a"));
    h.manager.clear();

    assert!(h.controls.metadata().is_none());
    assert_eq!(h.controls.status(), Some(PlaybackStatus::Stopped));
}

// ===== Playlist Loading =====

#[tokio::test]
async fn test_load_tracks_installs_playlist() {
    let mut h = harness(&[]);
    let source = vec![create_test_track("x"), create_test_track("y")];

    let loaded = h.manager.load_tracks(&source).await.unwrap();

    assert_eq!(loaded, 2);
    assert_eq!(h.manager.playlist().len(), 2);
    assert_eq!(h.manager.drain_events(), vec![PlayerEvent::PlaylistLoaded { tracks: 2 }]);
}

#[tokio::test]
async fn test_failed_load_keeps_previous_playlist() {
    let mut h = harness(&["a", "b"]);

    let result = h.manager.load_tracks(&FailingSource).await;

    assert!(result.is_err());
    assert_eq!(h.manager.playlist().len(), 2);
    assert!(matches!(
        h.manager.drain_events().as_slice(),
        [PlayerEvent::PlaylistLoadFailed { .. }]
    ));
}
