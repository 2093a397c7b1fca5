//! busrelay CLI
//!
//! Runs the ebusd relay and offers a couple of operator helpers.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use busrelay_logging::{init_logging, LogConfig, LogFormat};
use busrelay_relay::{RelayConfig, RelayHandler};
use busrelay_settings::{default_settings_path, env, Settings};

/// busrelay - browser-facing relay for the ebusd HTTP service
#[derive(Parser)]
#[command(name = "busrelay")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Settings file (JSON); defaults are used if it does not exist
    #[arg(short, long, default_value_os_t = default_settings_path())]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the relay until interrupted
    Serve(Overrides),

    /// Fetch upstream data once and print it
    Fetch(Overrides),

    /// Print the effective settings
    Config {
        #[command(flatten)]
        overrides: Overrides,

        /// Write the effective settings back to the file they were loaded from
        #[arg(long)]
        save: bool,
    },
}

/// Command-line overrides, applied after the file and environment
#[derive(Args, Debug, Default)]
struct Overrides {
    /// Listen address, e.g. 0.0.0.0:8000
    #[arg(short, long)]
    listen: Option<String>,

    /// ebusd host
    #[arg(long)]
    upstream_host: Option<String>,

    /// ebusd HTTP port
    #[arg(long)]
    upstream_port: Option<u16>,

    /// Upstream timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Allowed origin (repeatable, "*" for any); replaces the configured list
    #[arg(long = "allow-origin")]
    allow_origins: Vec<String>,
}

impl Overrides {
    fn apply(self, settings: &mut Settings) {
        if let Some(listen) = self.listen {
            settings.server.listen_addr = listen;
        }
        if let Some(host) = self.upstream_host {
            settings.upstream.host = host;
        }
        if let Some(port) = self.upstream_port {
            settings.upstream.port = port;
        }
        if let Some(secs) = self.timeout_secs {
            settings.upstream.timeout_secs = secs;
        }
        if !self.allow_origins.is_empty() {
            settings.cors.allowed_origins = self.allow_origins;
        }
    }
}

fn load_settings(path: &PathBuf, overrides: Overrides) -> Result<Settings> {
    let mut settings = Settings::load_from(path)
        .with_context(|| format!("failed to load settings from {}", path.display()))?;
    settings
        .apply_env(&env::vars())
        .context("invalid environment override")?;
    overrides.apply(&mut settings);
    settings.validate().context("invalid settings")?;
    Ok(settings)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(LogConfig {
        verbose: cli.verbose,
        format: if cli.json_logs { LogFormat::Json } else { LogFormat::Pretty },
    });

    match cli.command {
        Commands::Serve(overrides) => serve(load_settings(&cli.config, overrides)?).await,
        Commands::Fetch(overrides) => fetch(load_settings(&cli.config, overrides)?).await,
        Commands::Config { overrides, save } => {
            let settings = load_settings(&cli.config, overrides)?;
            println!("{}", settings.to_json()?);
            if save {
                settings.save()?;
            }
            Ok(())
        }
    }
}

async fn serve(settings: Settings) -> Result<()> {
    let config = RelayConfig::from_settings(&settings)?;
    let handle = busrelay_relay::start(config)
        .await
        .context("failed to start relay")?;

    info!("Relay running at {}{}", handle.url, busrelay_relay::DATA_ROUTE);

    tokio::signal::ctrl_c().await?;
    info!("Received shutdown signal");
    handle.shutdown().await;
    Ok(())
}

async fn fetch(settings: Settings) -> Result<()> {
    let config = RelayConfig::from_settings(&settings)?;
    let handler = RelayHandler::new(config)?;

    let response = handler.fetch().await?;
    println!("{}", String::from_utf8_lossy(&response.body));
    Ok(())
}
