//! Property-based tests for the playback session
//!
//! Uses proptest to verify invariants across many random inputs.

use cadence_core::{Track, TrackId};
use cadence_playback::test_utils::RecordingDevice;
use cadence_playback::{PlaybackConfig, PlaybackManager, SessionStore, Volume};
use proptest::prelude::*;

// ===== Helpers =====

fn playlist(len: usize) -> Vec<Track> {
    (0..len)
        .map(|i| {
            Track::new(
                TrackId::from(i as i64),
                format!("Track {}", i),
                "Artist",
                format!("https://cdn.test/{}.mp3", i),
            )
        })
        .collect()
}

fn seeded_store(seed: u64, shuffle: bool) -> SessionStore {
    SessionStore::new(&PlaybackConfig {
        shuffle,
        shuffle_seed: Some(seed),
        ..PlaybackConfig::default()
    })
}

#[derive(Debug, Clone)]
enum Op {
    PlayTrack(usize),
    PauseCurrent,
    Toggle,
    TogglePlayAll,
    Next,
    Previous,
    Shuffle(bool),
    Clear,
}

fn arbitrary_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..20).prop_map(Op::PlayTrack),
        Just(Op::PauseCurrent),
        Just(Op::Toggle),
        Just(Op::TogglePlayAll),
        Just(Op::Next),
        Just(Op::Previous),
        any::<bool>().prop_map(Op::Shuffle),
        Just(Op::Clear),
    ]
}

// ===== Property Tests =====

proptest! {
    /// Property: `len` in-order nexts return to the starting track
    #[test]
    fn in_order_next_cycles_through_playlist(len in 1usize..30, start in 0usize..30) {
        let tracks = playlist(len);
        let start = start % len;
        let mut store = seeded_store(0, false);
        store.set_playlist(tracks.clone());
        store.play_track(tracks[start].clone());

        for step in 1..=len {
            prop_assert!(store.next());
            prop_assert_eq!(store.current_index(), Some((start + step) % len));
        }
        prop_assert!(store.session().current_track.as_ref().unwrap().is(&tracks[start]));
    }

    /// Property: previous steps back with wrap-around and always plays
    #[test]
    fn previous_wraps_and_plays(len in 1usize..30, start in 0usize..30) {
        let tracks = playlist(len);
        let start = start % len;
        let mut store = seeded_store(0, false);
        store.set_playlist(tracks.clone());
        store.play_track(tracks[start].clone());
        store.toggle_playback();

        prop_assert!(store.previous());
        prop_assert_eq!(store.current_index(), Some((start + len - 1) % len));
        prop_assert!(store.session().is_playing);
    }

    /// Property: shuffled next never repeats the current track
    #[test]
    fn shuffle_never_repeats_current(len in 2usize..30, seed in any::<u64>(), steps in 1usize..50) {
        let tracks = playlist(len);
        let mut store = seeded_store(seed, true);
        store.set_playlist(tracks.clone());
        store.play_track(tracks[0].clone());

        for _ in 0..steps {
            let before = store.current_index();
            prop_assert!(store.next());
            let after = store.current_index();
            prop_assert!(after.is_some());
            prop_assert_ne!(before, after);
        }
    }

    /// Property: playing implies a selected track, whatever the sequence
    #[test]
    fn playing_implies_selection(
        len in 0usize..10,
        seed in any::<u64>(),
        ops in prop::collection::vec(arbitrary_op(), 0..60)
    ) {
        let tracks = playlist(len.max(1));
        let mut store = seeded_store(seed, false);
        if len > 0 {
            store.set_playlist(tracks.clone());
        }

        for op in ops {
            match op {
                Op::PlayTrack(i) => { store.play_track(tracks[i % tracks.len()].clone()); }
                Op::PauseCurrent => {
                    if let Some(current) = store.session().current_track.clone() {
                        store.pause_track(&current);
                    }
                }
                Op::Toggle => { store.toggle_playback(); }
                Op::TogglePlayAll => { store.toggle_play_all(); }
                Op::Next => { store.next(); }
                Op::Previous => { store.previous(); }
                Op::Shuffle(on) => { store.set_shuffle(on); }
                Op::Clear => { store.clear(); }
            }

            let session = store.session();
            prop_assert!(!session.is_playing || session.current_track.is_some());
            prop_assert!(!session.aggregate_mode_active || session.current_track.is_some());
        }
    }

    /// Property: device gain always stays within 0.0-1.0
    #[test]
    fn gain_is_bounded(level in any::<u8>(), muted in any::<bool>()) {
        let mut volume = Volume::new(level);
        if muted {
            volume.mute();
        }
        let gain = volume.gain();
        prop_assert!((0.0..=1.0).contains(&gain));
        prop_assert!(volume.level() <= 100);
    }

    /// Property: the manager's device only ever loads playlist sources
    #[test]
    fn device_loads_only_known_sources(
        len in 1usize..10,
        seed in any::<u64>(),
        ops in prop::collection::vec(arbitrary_op(), 0..40)
    ) {
        let tracks = playlist(len);
        let device = RecordingDevice::new();
        let config = PlaybackConfig { shuffle_seed: Some(seed), ..PlaybackConfig::default() };
        let mut manager = PlaybackManager::new(config, Box::new(device.clone()));
        manager.set_playlist(tracks.clone());

        for op in ops {
            match op {
                Op::PlayTrack(i) => { manager.play_track(tracks[i % len].clone()); }
                Op::PauseCurrent => {
                    if let Some(current) = manager.current_track().cloned() {
                        manager.pause_track(&current);
                    }
                }
                Op::Toggle => { manager.toggle_playback(); }
                Op::TogglePlayAll => { manager.toggle_play_all(); }
                Op::Next => { manager.next(); }
                Op::Previous => { manager.skip_previous(); }
                Op::Shuffle(on) => { manager.set_shuffle(on); }
                Op::Clear => { manager.clear(); }
            }
        }

        for command in device.commands() {
            if let cadence_playback::test_utils::DeviceCommand::Load(source) = command {
                prop_assert!(tracks.iter().any(|t| t.media_url == source));
            }
        }
    }
}
