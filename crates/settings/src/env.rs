//! Environment variable overrides

use std::collections::HashMap;

/// Upstream ebusd host
pub const EBUSD_HOST: &str = "EBUSD_HOST";
/// Upstream ebusd HTTP port
pub const EBUSD_PORT: &str = "EBUSD_PORT";
/// Listen port; keeps the configured listen IP
pub const PORT: &str = "PORT";
/// Full listen address, takes precedence over `PORT`
pub const LISTEN_ADDR: &str = "BUSRELAY_LISTEN_ADDR";
/// Upstream timeout in seconds
pub const TIMEOUT_SECS: &str = "BUSRELAY_TIMEOUT_SECS";
/// Comma separated list of allowed origins, `*` for any
pub const ALLOWED_ORIGINS: &str = "BUSRELAY_ALLOWED_ORIGINS";

/// Snapshot of the process environment
pub fn vars() -> HashMap<String, String> {
    std::env::vars().collect()
}

/// Non-empty value for `key`
pub(crate) fn get<'a>(vars: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// Split a comma separated list, dropping empty items
pub(crate) fn csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
