//! fleetctl — one bounded pool operation per invocation.
//!
//! Loads `fleet.toml`, builds the configured provider, constructs the
//! pool (which performs the initial refresh), runs a single command,
//! and exits. This is deliberately not a control loop: no feedback,
//! no retries, no target tracking.
//!
//! # Usage
//!
//! ```text
//! fleetctl --config fleet.toml start -n 2
//! fleetctl --config fleet.toml list running
//! fleetctl --config fleet.toml status
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tracing::info;

use fleet_core::{FleetConfig, InstanceRecord, RunState};
use fleet_pool::{Pool, PoolSpec};
use fleet_provider::{ComputeProvider, MemoryProvider};

#[derive(Parser)]
#[command(name = "fleetctl", about = "Fleetpool — bulk instance start/stop", version)]
struct Cli {
    /// Path to the fleet.toml config file.
    #[arg(short, long, default_value = "fleet.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start up to N stopped instances and wait for them to run.
    Start {
        #[arg(short = 'n', long = "count", default_value = "1")]
        count: usize,
    },
    /// Stop up to N running instances and wait for them to stop.
    Stop {
        #[arg(short = 'n', long = "count", default_value = "1")]
        count: usize,
    },
    /// List instance identifiers in one bucket ("running" or "stopped").
    List {
        state: String,
        /// Output format: text or json.
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Show the pool's current view of the group.
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,fleet_pool=debug".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let config = FleetConfig::from_file(&cli.config)
        .with_context(|| format!("failed to load config from {}", cli.config.display()))?;

    let provider = build_provider(&config)?;
    let wait_timeout = config
        .wait_timeout()
        .context("invalid [wait] timeout in config")?;

    if let Some(region) = &config.pool.region {
        info!(region, "provider region configured");
    }

    let spec = PoolSpec::new(&config.pool.group, &config.pool.filter)
        .with_max_results(config.max_results())
        .with_wait_timeout(wait_timeout);
    let pool = Pool::new(provider, spec).await?;

    match cli.command {
        Command::Start { count } => {
            pool.start(count).await?;
            println!("✓ started up to {count} instance(s)");
        }
        Command::Stop { count } => {
            pool.stop(count).await?;
            println!("✓ stopped up to {count} instance(s)");
        }
        Command::List { state, format } => {
            let ids = pool.list_ids(&state).await;
            match format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&ids)?),
                _ => {
                    for id in ids {
                        println!("{id}");
                    }
                }
            }
        }
        Command::Status => {
            let (running, stopped) = pool.counts().await;
            println!("group:     {}", pool.group());
            println!("filter:    {}", pool.filter());
            println!("available: {}", pool.available().await);
            println!("running:   {running} {:?}", pool.list_ids("running").await);
            println!("stopped:   {stopped} {:?}", pool.list_ids("stopped").await);
        }
    }

    Ok(())
}

/// Construct the provider named by `[provider] kind`.
///
/// Only `memory` ships in-tree; real cloud backends implement
/// `ComputeProvider` out of tree and get wired in here.
fn build_provider(config: &FleetConfig) -> anyhow::Result<Arc<dyn ComputeProvider>> {
    match config.provider.kind.as_str() {
        "memory" => {
            let provider = MemoryProvider::new();
            for seed in config.provider.instances.iter().flatten() {
                let state: RunState = seed
                    .state
                    .parse()
                    .with_context(|| format!("seed instance {}", seed.id))?;
                let mut record = InstanceRecord::new(seed.id.as_str(), state);
                if let Some(name) = &seed.name {
                    record = record.with_name(name);
                }
                provider.insert(&config.pool.group, record);
            }
            Ok(Arc::new(provider))
        }
        other => bail!("unknown provider kind: {other}"),
    }
}
