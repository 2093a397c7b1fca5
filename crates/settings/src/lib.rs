//! busrelay Settings
//!
//! Startup configuration for the relay.
//!
//! ## Sources (lowest to highest precedence)
//!
//! - Built-in defaults (the ebusd address and the local dev frontend origins)
//! - JSON settings file
//! - Environment variables (see [`env`])
//! - Command-line flags (applied by the binary)
//!
//! ## Usage
//!
//! ```no_run
//! use std::path::PathBuf;
//! use busrelay_settings::Settings;
//!
//! let mut settings = Settings::load_from(&PathBuf::from("busrelay.json"))?;
//! settings.apply_env(&busrelay_settings::env::vars())?;
//! settings.validate()?;
//! # Ok::<(), busrelay_settings::SettingsError>(())
//! ```

mod config;
pub mod env;

pub use config::{CorsSettings, ServerSettings, Settings, UpstreamSettings, WILDCARD_ORIGIN};

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read settings: {0}")]
    ReadError(std::io::Error),

    #[error("Failed to write settings: {0}")]
    WriteError(std::io::Error),

    #[error("Failed to parse settings: {0}")]
    ParseError(serde_json::Error),

    #[error("Failed to create config directory: {0}")]
    CreateDirError(std::io::Error),

    #[error("Invalid value for {key}: {value:?}")]
    InvalidEnv { key: &'static str, value: String },

    #[error("Invalid settings: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, SettingsError>;

/// Settings file used when none is given on the command line
pub fn default_settings_path() -> PathBuf {
    PathBuf::from("busrelay.json")
}
