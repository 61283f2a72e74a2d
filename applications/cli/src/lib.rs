//! Cadence terminal client
//!
//! Signs in to a Cadence server, lists its library and drives an
//! interactive player backed by a simulated playback device.
//!
//! This library exposes the pieces of the `cadence` binary for testing.

pub mod commands;
pub mod config;
pub mod controls;
pub mod device;
pub mod error;
pub mod interactive;

pub use commands::Command;
pub use config::CadenceConfig;
pub use controls::{MediaKeys, TerminalControls};
pub use device::SimulatedDevice;
pub use error::{CliError, Result};
