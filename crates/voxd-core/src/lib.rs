//! Core types and configuration for voxd.
//!
//! This crate provides platform-agnostic types shared by all voxd
//! sub-crates: the session state machine, the socket wire protocol and
//! configuration file handling.

mod config;
mod protocol;
mod state;

use std::path::PathBuf;

use anyhow::{Context, Result};
pub use config::{Config, ConfigManager};
pub use protocol::{Command, Reply, Response};
pub use state::SessionState;

/// Application name
pub const APP_NAME: &str = "voxd";

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default rendezvous socket path for the command server
pub const DEFAULT_SOCKET_PATH: &str = "/tmp/voxd.sock";

/// Sample rate all captured audio is delivered at (Hz)
pub const SAMPLE_RATE: u32 = 16_000;

/// Number of capture channels
pub const CHANNELS: u16 = 1;

/// Maximum number of bytes read from a single client connection
pub const MAX_COMMAND_BYTES: usize = 1024;

/// Returns the directory where whisper models are stored.
pub fn models_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().context("Failed to retrieve data directory")?;
    Ok(data_dir.join(APP_NAME).join("models"))
}
