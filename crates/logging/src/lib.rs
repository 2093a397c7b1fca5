//! busrelay logging
//!
//! Installs the global `tracing` subscriber for the relay binaries.
//! `RUST_LOG` always wins over the built-in default filter.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default filter when `--verbose` is set
pub const VERBOSE_FILTER: &str = "info,busrelay=debug,tower_http=debug";

/// Default filter otherwise
pub const DEFAULT_FILTER: &str = "info";

/// Output format for log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable, one event per line
    #[default]
    Pretty,
    /// Newline-delimited JSON objects
    Json,
}

/// Logging options collected from the command line
#[derive(Debug, Clone, Copy, Default)]
pub struct LogConfig {
    pub verbose: bool,
    pub format: LogFormat,
}

impl LogConfig {
    /// Filter directive used when `RUST_LOG` is not set
    pub fn default_filter(&self) -> &'static str {
        if self.verbose {
            VERBOSE_FILTER
        } else {
            DEFAULT_FILTER
        }
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.default_filter()))
    }
}

/// Install the global subscriber.
///
/// Returns `false` if a subscriber was already set (e.g. by a test harness).
pub fn init_logging(config: LogConfig) -> bool {
    let filter = config.env_filter();

    let result = match config.format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .try_init(),
    };

    result.is_ok()
}
