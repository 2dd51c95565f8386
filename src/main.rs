//! Unit reconciliation manager (v1)
//!
//! Runs the manager against a control plane that writes unit events to
//! stdin, one JSON object per line.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌──────────────────────────────────────────────────┐
//!                       │                 UNIT RECONCILER                   │
//!                       │                                                   │
//!   stdin (unit events) │  ┌───────────┐    ┌────────────┐   ┌───────────┐ │
//!   ────────────────────┼─▶│ client    │───▶│  manager   │──▶│  reload   │ │
//!                       │  │ feed +    │    │ event loop │   │ registry  │ │
//!                       │  │ channel   │    └─────┬──────┘   └─────┬─────┘ │
//!                       │  └───────────┘          │                │       │
//!                       │                         ▼                ▼       │
//!   unit status         │                  ┌────────────┐   ┌───────────┐ │
//!   ◀───────────────────┼──────────────────│ unit state │   │ input /   │ │
//!                       │                  │  reports   │   │ output    │ │
//!                       │                  └────────────┘   └───────────┘ │
//!                       │                                                   │
//!                       │  config · lifecycle · observability · transform  │
//!                       └──────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::BufReader;

use unit_reconciler::client::{feed_lines, ChannelClient};
use unit_reconciler::config::{load_config, Settings};
use unit_reconciler::lifecycle::Shutdown;
use unit_reconciler::manager::{Manager, UnitManager};
use unit_reconciler::observability::logging::init_logging;
use unit_reconciler::reload::{self, ConfigWithMeta, ReloadError, ReloadRegistry, Reloadable, ReloadableList};

#[derive(Parser)]
#[command(name = "unit-reconciler")]
#[command(about = "Reconcile control-plane units with local subsystems", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log filter override (e.g. "debug").
    #[arg(short, long)]
    log_level: Option<String>,
}

/// Output subsystem stand-in: logs every configuration it receives.
struct LoggingOutput;

#[async_trait]
impl Reloadable for LoggingOutput {
    async fn reload(&self, config: ConfigWithMeta) -> Result<(), ReloadError> {
        let outputs: Vec<&String> = config.config.keys().collect();
        tracing::info!(?outputs, "Output reloaded");
        Ok(())
    }
}

/// Input subsystem stand-in: logs every configuration it receives.
struct LoggingInputs;

#[async_trait]
impl ReloadableList for LoggingInputs {
    async fn reload(&self, configs: Vec<ConfigWithMeta>) -> Result<(), ReloadError> {
        for config in &configs {
            let id = config.config.get("id").and_then(|v| v.as_str()).unwrap_or("-");
            tracing::info!(input_id = id, "Input reloaded");
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => load_config(path)?,
        None => Settings::default(),
    };
    init_logging(cli.log_level.as_deref().unwrap_or(&settings.management.log_level));

    let agent = settings.management.agent.to_agent_info();
    tracing::info!(
        agent_id = %agent.id,
        enabled = settings.management.enabled,
        "unit-reconciler v0.1.0 starting"
    );

    let reloadables = ReloadRegistry::new();
    reloadables.register(reload::OUTPUT, Arc::new(LoggingOutput))?;
    reloadables.register_list(reload::INPUT, Arc::new(LoggingInputs))?;

    let (client, plane) = ChannelClient::new(agent);
    let manager = UnitManager::new(settings.management.clone(), reloadables, Arc::new(client));
    if !manager.enabled() {
        tracing::warn!("Management disabled, nothing to reconcile");
        return Ok(());
    }

    let shutdown = Shutdown::new();
    let trigger = shutdown.clone();
    manager.set_stop_callback(Box::new(move || {
        trigger.trigger();
    }));
    manager.start().await?;

    let mut stopped = shutdown.subscribe();
    let feeder = tokio::spawn(feed_lines(
        BufReader::new(tokio::io::stdin()),
        plane,
        shutdown.subscribe(),
    ));

    tokio::select! {
        _ = stopped.recv() => {
            tracing::info!("Stop requested by control plane");
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
            manager.stop();
            shutdown.trigger();
        }
    }

    match tokio::time::timeout(std::time::Duration::from_secs(1), feeder).await {
        Ok(Ok(Err(e))) => tracing::error!(error = %e, "Unit event feed failed"),
        Ok(_) => {}
        Err(_) => tracing::debug!("Unit event feed still blocked on stdin"),
    }

    tracing::info!("Shutdown complete");
    // Stdin reads run on a blocking thread the runtime would otherwise wait on.
    std::process::exit(0);
}
