//! Command-line interface for RF/IR lamps driven through a learning remote.

mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::warn;

use rflamp_commands::{CommandTransport, DryRunTransport, HomeAssistantTransport};
use rflamp_core::ReportedState;
use rflamp_core::config::env_vars;
use rflamp_devices::{LampDescriptor, LampRegistry, TurnOnRequest};
use rflamp_storage::RedbStateStore;

use crate::config::CliConfig;

/// rflamp - Control one-way RF/IR lamps through a learning remote.
#[derive(Parser, Debug)]
#[command(name = "rflamp")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Action to perform.
    #[command(subcommand)]
    command: Command,

    /// Configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Database holding the last known lamp states.
    #[arg(long, global = true)]
    state_db: Option<PathBuf>,

    /// Log commands instead of sending them.
    #[arg(long, global = true)]
    dry_run: bool,

    /// Verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Command {
    /// List configured lamps with their state.
    List,
    /// Show the state of a lamp.
    Status {
        /// Lamp name or unique id.
        lamp: String,
    },
    /// Turn a lamp on, optionally adjusting it.
    On {
        /// Lamp name or unique id.
        lamp: String,
        /// Target brightness (1-255).
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..))]
        brightness: Option<u8>,
        /// Target color temperature in Kelvin.
        #[arg(short = 't', long)]
        color_temp: Option<u16>,
    },
    /// Turn a lamp off.
    Off {
        /// Lamp name or unique id.
        lamp: String,
    },
}

/// A lamp as printed by `list`.
#[derive(Debug, Serialize)]
struct LampListing {
    #[serde(flatten)]
    descriptor: LampDescriptor,
    state: ReportedState,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose);

    let config = CliConfig::load(&config::config_path(args.config))?;
    let transport = build_transport(&config, args.dry_run)?;

    let state_db = config::state_db_path(args.state_db);
    let store = RedbStateStore::open(&state_db)
        .with_context(|| format!("Failed to open state database {}", state_db.display()))?;

    let registry = LampRegistry::new(transport, Arc::new(store));
    for lamp in config.lamps {
        let name = lamp.lamp_name.clone();
        registry
            .setup_entry(lamp)
            .await
            .with_context(|| format!("Failed to set up lamp '{}'", name))?;
    }

    match args.command {
        Command::List => list_lamps(&registry).await,
        Command::Status { lamp } => {
            let controller = registry
                .get(&lamp)
                .await
                .with_context(|| format!("Lamp not found: {}", lamp))?;
            print_json(&controller.reported_state().await)
        }
        Command::On {
            lamp,
            brightness,
            color_temp,
        } => {
            let request = TurnOnRequest {
                brightness,
                color_temp_kelvin: color_temp,
            };
            let state = registry.turn_on(&lamp, request).await?;
            print_json(&state)
        }
        Command::Off { lamp } => {
            let state = registry.turn_off(&lamp).await?;
            print_json(&state)
        }
    }
}

/// Logs go to stderr so stdout only carries command output.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };

    let json_logging = std::env::var(env_vars::LOG_JSON)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(false);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("rflamp={}", level))
            .add_directive(tracing::Level::WARN.into())
    });

    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .compact()
            .with_writer(std::io::stderr)
            .init();
    }
}

fn build_transport(config: &CliConfig, dry_run: bool) -> Result<Arc<dyn CommandTransport>> {
    if dry_run {
        return Ok(Arc::new(DryRunTransport::new()));
    }

    match &config.home_assistant {
        Some(ha) => {
            let transport = HomeAssistantTransport::new(ha)
                .context("Failed to set up the Home Assistant transport")?;
            Ok(Arc::new(transport))
        }
        None => {
            warn!("No [home_assistant] section configured, commands will only be logged");
            Ok(Arc::new(DryRunTransport::new()))
        }
    }
}

async fn list_lamps(registry: &LampRegistry) -> Result<()> {
    let descriptors = registry.list().await;
    let listings = futures::future::join_all(descriptors.into_iter().map(|descriptor| async move {
        let state = match registry.get(&descriptor.unique_id).await {
            Some(controller) => controller.reported_state().await,
            None => ReportedState::default(),
        };
        LampListing { descriptor, state }
    }))
    .await;

    print_json(&listings)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
