//! Interactive player session
//!
//! One task owns the [`PlaybackManager`] and feeds it every input in turn:
//! typed commands, device events, media keys, the "previous" gesture
//! deadline and sign-in state changes.

use crate::commands::{Command, HELP};
use crate::config::CadenceConfig;
use crate::controls::{MediaKeys, TerminalControls};
use crate::device::SimulatedDevice;
use crate::error::Result;
use cadence_core::{Track, TrackSource};
use cadence_playback::{DeviceEvent, PlaybackManager, PlayerEvent};
use cadence_server_client::{AuthState, CadenceClient};
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// What the loop does after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Reload,
    Logout,
    Quit,
}

/// Player state plus the text it wants shown
pub struct Player {
    manager: PlaybackManager,
    keys: MediaKeys,
    output: Vec<String>,
}

impl Player {
    /// Build a player on a fresh simulated device
    pub fn new(config: &CadenceConfig) -> (Self, mpsc::UnboundedReceiver<DeviceEvent>) {
        let (device, events) = SimulatedDevice::new(config.device.clone());
        let (controls, keys) = TerminalControls::new();
        let manager = PlaybackManager::new(config.playback.clone(), Box::new(device))
            .with_media_controls(Box::new(controls));

        let player = Self {
            manager,
            keys,
            output: Vec::new(),
        };
        (player, events)
    }

    pub fn manager(&self) -> &PlaybackManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut PlaybackManager {
        &mut self.manager
    }

    /// Replace the playlist with whatever `source` lists
    pub async fn reload(&mut self, source: &dyn TrackSource) {
        if let Err(e) = self.manager.load_tracks(source).await {
            debug!("Library reload failed: {}", e);
        }
    }

    /// Apply one typed command
    pub fn execute(&mut self, command: Command) -> Flow {
        match command {
            Command::List => self.list(),
            Command::Reload => return Flow::Reload,
            Command::Play(number) => match number
                .checked_sub(1)
                .and_then(|i| self.manager.playlist().get(i))
                .cloned()
            {
                Some(track) => {
                    self.manager.play_track(track);
                }
                None => self.say(format!("No track {number}")),
            },
            Command::Pause => match self.manager.current_track().cloned() {
                Some(track) => {
                    self.manager.pause_track(&track);
                }
                None => self.say("Nothing is playing"),
            },
            Command::Toggle => {
                if !self.manager.toggle_playback() {
                    self.say("Nothing to toggle; pick a track with `play <n>`");
                }
            }
            Command::All => {
                if !self.manager.toggle_play_all() {
                    self.say("The library is empty");
                }
            }
            Command::Next => {
                if !self.manager.next() {
                    self.say("Nothing to skip to");
                }
            }
            Command::Prev => {
                if !self.manager.previous() {
                    self.say("Nothing is playing");
                }
            }
            Command::Seek(secs) => match self.manager.seek(Duration::from_secs(secs)) {
                Some(position) => self.say(format!("Seeked to {}", clock(position))),
                None => self.say("Nothing loaded"),
            },
            Command::Volume(level) => self.manager.set_volume(level),
            Command::Mute => self.manager.mute(),
            Command::Unmute => self.manager.unmute(),
            Command::Shuffle(enabled) => {
                self.manager.set_shuffle(enabled);
            }
            Command::Clear => {
                self.manager.clear();
            }
            Command::Media(key) => {
                if !self.keys.press(key) {
                    self.say("No media session yet");
                }
            }
            Command::Status => {
                let status = self.status();
                self.say(status);
            }
            Command::Help => self.say(HELP),
            Command::Logout => return Flow::Logout,
            Command::Quit => return Flow::Quit,
        }

        Flow::Continue
    }

    pub fn handle_device_event(&mut self, event: DeviceEvent) {
        self.manager.handle_device_event(event);
    }

    /// Drop the selection after sign-out
    pub fn sign_out(&mut self) {
        self.manager.clear();
        self.manager.set_playlist(Vec::new());
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.manager.next_deadline()
    }

    pub fn tick(&mut self) {
        if self.manager.tick() {
            debug!("Previous gesture window closed");
        }
    }

    /// Apply pending media keys and collect everything to print
    pub fn take_output(&mut self) -> Vec<String> {
        self.manager.pump_remote();

        let playlist = self.manager.playlist().to_vec();
        for event in self.manager.drain_events() {
            if let Some(line) = describe(&event, &playlist) {
                self.output.push(line);
            }
        }

        std::mem::take(&mut self.output)
    }

    /// One-line summary of the player
    pub fn status(&self) -> String {
        let Some(track) = self.manager.current_track() else {
            return "■ Stopped".to_string();
        };

        let marker = if self.manager.is_playing() { "▶" } else { "❚❚" };
        let duration = self
            .manager
            .duration()
            .map_or_else(|| "--:--".to_string(), clock);
        let volume = if self.manager.is_muted() {
            "muted".to_string()
        } else {
            format!("vol {}%", self.manager.volume())
        };
        let shuffle = if self.manager.session().shuffle {
            " shuffle"
        } else {
            ""
        };

        format!(
            "{marker} {} - {} [{} / {}] {volume}{shuffle}",
            track.title,
            track.artist,
            clock(self.manager.position()),
            duration
        )
    }

    fn list(&mut self) {
        if self.manager.playlist().is_empty() {
            self.say("The library is empty");
            return;
        }

        let current = self.manager.session().current_id().cloned();
        let lines: Vec<String> = self
            .manager
            .playlist()
            .iter()
            .enumerate()
            .map(|(i, track)| {
                let marker = if current.as_ref() == Some(&track.id) { '*' } else { ' ' };
                let length = track.duration_hint.as_deref().unwrap_or("");
                format!("{marker}{:>3}. {} - {} {length}", i + 1, track.title, track.artist)
            })
            .collect();
        self.output.extend(lines);
    }

    fn say(&mut self, line: impl Into<String>) {
        self.output.push(line.into());
    }
}

/// Text for a player event, if it is worth showing
pub fn describe(event: &PlayerEvent, playlist: &[Track]) -> Option<String> {
    match event {
        PlayerEvent::TrackChanged {
            track_id: Some(id), ..
        } => {
            let track = playlist.iter().find(|t| t.id == *id)?;
            Some(format!("Now playing: {} - {}", track.title, track.artist))
        }
        PlayerEvent::Cleared => Some("Stopped".to_string()),
        PlayerEvent::StateChanged { is_playing: false } => Some("Paused".to_string()),
        PlayerEvent::ShuffleChanged { enabled } => {
            Some(format!("Shuffle {}", if *enabled { "on" } else { "off" }))
        }
        PlayerEvent::AggregateModeChanged { active: true } => Some("Playing all".to_string()),
        PlayerEvent::VolumeChanged {
            is_muted: true, ..
        } => Some("Muted".to_string()),
        PlayerEvent::VolumeChanged { level, .. } => Some(format!("Volume {level}%")),
        PlayerEvent::PlaylistLoaded { tracks } => Some(format!("Loaded {tracks} tracks")),
        PlayerEvent::PlaylistLoadFailed { message } => {
            Some(format!("Could not load the library: {message}"))
        }
        PlayerEvent::TrackChanged { track_id: None, .. }
        | PlayerEvent::StateChanged { .. }
        | PlayerEvent::AggregateModeChanged { .. }
        | PlayerEvent::RenderingChanged { .. }
        | PlayerEvent::PositionChanged { .. }
        | PlayerEvent::DurationChanged { .. } => None,
    }
}

/// `mm:ss`
fn clock(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await,
        None => std::future::pending().await,
    }
}

/// Run the player until `quit`, end of input or sign-out
pub async fn run(client: &CadenceClient, config: &CadenceConfig) -> Result<()> {
    let (mut player, mut device_events) = Player::new(config);
    let mut auth_state = client.session().subscribe();

    player.reload(client).await;
    print(player.take_output());
    println!("Type `help` for commands");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let deadline = player.next_deadline();

        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                if !line.trim().is_empty() {
                    match line.parse::<Command>() {
                        Ok(command) => match player.execute(command) {
                            Flow::Continue => {}
                            Flow::Reload => player.reload(client).await,
                            Flow::Logout => client.logout().await?,
                            Flow::Quit => break,
                        },
                        Err(e) => println!("{e}"),
                    }
                }
            }
            Some(event) = device_events.recv() => player.handle_device_event(event),
            () = wait_until(deadline) => player.tick(),
            Ok(()) = auth_state.changed() => {
                let state = *auth_state.borrow_and_update();
                if !matches!(state, AuthState::Authenticated { .. }) {
                    info!(?state, "Signed out; stopping player");
                    player.sign_out();
                    print(player.take_output());
                    match state {
                        AuthState::ReauthenticationRequired => {
                            println!("Your session expired. Run `cadence login` again.");
                        }
                        _ => println!("Signed out."),
                    }
                    break;
                }
            }
        }

        print(player.take_output());
    }

    player.manager_mut().clear();
    Ok(())
}

fn print(lines: Vec<String>) {
    for line in lines {
        println!("{line}");
    }
}
