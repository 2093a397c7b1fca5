//! Configuration types

use std::collections::HashMap;
use std::net::{Ipv6Addr, SocketAddr};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{default_settings_path, env, Result, SettingsError};

/// Origin entry that allows every origin
pub const WILDCARD_ORIGIN: &str = "*";

/// Main settings structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Upstream ebusd service
    #[serde(default)]
    pub upstream: UpstreamSettings,

    /// Inbound HTTP server
    #[serde(default)]
    pub server: ServerSettings,

    /// Cross-origin policy
    #[serde(default)]
    pub cors: CorsSettings,

    /// Custom settings file path (not serialized)
    #[serde(skip)]
    config_path: Option<PathBuf>,
}

impl Settings {
    /// Load settings from a specific path, or create defaults
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path).map_err(SettingsError::ReadError)?;
            let mut settings: Settings =
                serde_json::from_str(&content).map_err(SettingsError::ParseError)?;
            settings.config_path = Some(path.clone());
            info!("Loaded settings from {:?}", path);
            Ok(settings)
        } else {
            debug!("No settings file at {:?}, using defaults", path);
            let mut settings = Self::default();
            settings.config_path = Some(path.clone());
            Ok(settings)
        }
    }

    /// Save settings to the path they were loaded from
    pub fn save(&self) -> Result<()> {
        let path = self.config_path.clone().unwrap_or_else(default_settings_path);
        self.save_to(&path)
    }

    /// Save settings to a specific path
    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(SettingsError::CreateDirError)?;
            }
        }

        let content = self.to_json()?;
        std::fs::write(path, content).map_err(SettingsError::WriteError)?;
        info!("Saved settings to {:?}", path);
        Ok(())
    }

    /// Pretty JSON rendering of the settings
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(SettingsError::ParseError)
    }

    /// Apply environment overrides on top of the current values.
    ///
    /// Blank variables are ignored.
    pub fn apply_env(&mut self, vars: &HashMap<String, String>) -> Result<()> {
        if let Some(host) = env::get(vars, env::EBUSD_HOST) {
            self.upstream.host = host.to_string();
        }
        if let Some(port) = env::get(vars, env::EBUSD_PORT) {
            self.upstream.port = parse_env(env::EBUSD_PORT, port)?;
        }
        if let Some(secs) = env::get(vars, env::TIMEOUT_SECS) {
            self.upstream.timeout_secs = parse_env(env::TIMEOUT_SECS, secs)?;
        }

        if let Some(addr) = env::get(vars, env::LISTEN_ADDR) {
            let addr: SocketAddr = parse_env(env::LISTEN_ADDR, addr)?;
            self.server.listen_addr = addr.to_string();
        } else if let Some(port) = env::get(vars, env::PORT) {
            let port: u16 = parse_env(env::PORT, port)?;
            self.server.set_port(port)?;
        }

        if let Some(origins) = env::get(vars, env::ALLOWED_ORIGINS) {
            self.cors.allowed_origins = env::csv(origins);
        }

        Ok(())
    }

    /// Check that the settings describe a usable relay
    pub fn validate(&self) -> Result<()> {
        if self.upstream.host.trim().is_empty() {
            return Err(SettingsError::Invalid("upstream host is empty".to_string()));
        }
        if self.upstream.port == 0 {
            return Err(SettingsError::Invalid("upstream port must be non-zero".to_string()));
        }
        if !self.upstream.path.starts_with('/') {
            return Err(SettingsError::Invalid(format!(
                "upstream path must start with '/': {:?}",
                self.upstream.path
            )));
        }
        if self.upstream.timeout_secs == 0 {
            return Err(SettingsError::Invalid("upstream timeout must be non-zero".to_string()));
        }
        self.server.socket_addr()?;
        if self.cors.allowed_origins.is_empty() {
            return Err(SettingsError::Invalid(
                "at least one allowed origin is required (use \"*\" for any)".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T> {
    value.parse().map_err(|_| SettingsError::InvalidEnv {
        key,
        value: value.to_string(),
    })
}

/// Upstream ebusd service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamSettings {
    /// Host name or IP of the ebusd HTTP service
    #[serde(default = "default_upstream_host")]
    pub host: String,

    /// ebusd HTTP port
    #[serde(default = "default_upstream_port")]
    pub port: u16,

    /// Path requested on the upstream
    #[serde(default = "default_upstream_path")]
    pub path: String,

    /// Upstream request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_upstream_host() -> String {
    "192.168.0.92".to_string()
}

fn default_upstream_port() -> u16 {
    8889
}

fn default_upstream_path() -> String {
    "/data".to_string()
}

fn default_timeout() -> u64 {
    5
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            host: default_upstream_host(),
            port: default_upstream_port(),
            path: default_upstream_path(),
            timeout_secs: default_timeout(),
        }
    }
}

impl UpstreamSettings {
    /// `http://host:port/path`, with IPv6 literals bracketed
    pub fn url(&self) -> String {
        if self.host.parse::<Ipv6Addr>().is_ok() {
            format!("http://[{}]:{}{}", self.host, self.port, self.path)
        } else {
            format!("http://{}:{}{}", self.host, self.port, self.path)
        }
    }
}

/// Inbound server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

fn default_listen_addr() -> String {
    "0.0.0.0:8000".to_string()
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

impl ServerSettings {
    /// Parsed listen address
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.listen_addr.parse().map_err(|_| {
            SettingsError::Invalid(format!("invalid listen address: {:?}", self.listen_addr))
        })
    }

    /// Replace the port, keeping the listen IP
    pub fn set_port(&mut self, port: u16) -> Result<()> {
        let mut addr = self.socket_addr()?;
        addr.set_port(port);
        self.listen_addr = addr.to_string();
        Ok(())
    }
}

/// Cross-origin policy settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsSettings {
    /// Origins allowed to read responses; `"*"` allows any
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

fn default_allowed_origins() -> Vec<String> {
    vec![
        "http://localhost:5173".to_string(),
        "http://127.0.0.1:5173".to_string(),
    ]
}

impl Default for CorsSettings {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
        }
    }
}

impl CorsSettings {
    /// Whether the list contains the wildcard entry
    pub fn allows_any(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == WILDCARD_ORIGIN)
    }
}
