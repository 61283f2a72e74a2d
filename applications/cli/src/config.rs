/// Client configuration
use crate::error::{CliError, Result};
use cadence_playback::PlaybackConfig;
use cadence_server_client::ServerConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CadenceConfig {
    #[serde(default = "default_server")]
    pub server: ServerSettings,

    #[serde(default)]
    pub playback: PlaybackConfig,

    #[serde(default = "default_storage")]
    pub storage: StorageSettings,

    #[serde(default = "default_device")]
    pub device: DeviceSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    #[serde(default = "default_url")]
    pub url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    #[serde(default = "default_credentials_path")]
    pub credentials_path: PathBuf,
}

/// Behaviour of the simulated playback device
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeviceSettings {
    /// Delay between a load request and its metadata
    #[serde(default = "default_load_latency_ms")]
    pub load_latency_ms: u64,

    /// Length reported for every source
    #[serde(default = "default_track_length_secs")]
    pub track_length_secs: u64,

    /// Interval between position reports while rendering
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

impl DeviceSettings {
    pub fn load_latency(&self) -> Duration {
        Duration::from_millis(self.load_latency_ms)
    }

    pub fn track_length(&self) -> Duration {
        Duration::from_secs(self.track_length_secs)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

impl Default for DeviceSettings {
    fn default() -> Self {
        default_device()
    }
}

impl CadenceConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; otherwise `cadence.toml` in the
    /// working directory is used when present. `CADENCE_*` environment
    /// variables override both, with `__` between nested keys
    /// (`CADENCE_SERVER__URL`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(CliError::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let config_path = PathBuf::from("cadence.toml");
                if config_path.exists() {
                    settings = settings.add_source(config::File::from(config_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("CADENCE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        Ok(settings.build()?.try_deserialize()?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.url.trim().is_empty() {
            return Err(CliError::Config(
                "Server URL is required (set CADENCE_SERVER__URL)".to_string(),
            ));
        }

        if self.playback.previous_restart_window_ms == 0 {
            return Err(CliError::Config(
                "playback.previous_restart_window_ms must be greater than zero".to_string(),
            ));
        }

        if self.playback.volume > 100 {
            return Err(CliError::Config(format!(
                "playback.volume must be 0-100, got {}",
                self.playback.volume
            )));
        }

        if self.device.tick_ms == 0 {
            return Err(CliError::Config(
                "device.tick_ms must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Connection settings for the server client
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            url: self.server.url.clone(),
            timeout: Duration::from_secs(self.server.timeout_secs),
            connect_timeout: Duration::from_secs(self.server.connect_timeout_secs),
        }
    }
}

impl Default for CadenceConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            playback: PlaybackConfig::default(),
            storage: default_storage(),
            device: default_device(),
        }
    }
}

// Default values
fn default_server() -> ServerSettings {
    ServerSettings {
        url: default_url(),
        timeout_secs: default_timeout_secs(),
        connect_timeout_secs: default_connect_timeout_secs(),
    }
}

fn default_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_storage() -> StorageSettings {
    StorageSettings {
        credentials_path: default_credentials_path(),
    }
}

fn default_credentials_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cadence")
        .join("credentials.json")
}

fn default_device() -> DeviceSettings {
    DeviceSettings {
        load_latency_ms: default_load_latency_ms(),
        track_length_secs: default_track_length_secs(),
        tick_ms: default_tick_ms(),
    }
}

fn default_load_latency_ms() -> u64 {
    300
}

fn default_track_length_secs() -> u64 {
    180
}

fn default_tick_ms() -> u64 {
    1000
}
