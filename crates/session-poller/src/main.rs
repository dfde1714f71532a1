mod config;
mod poller;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use sched_client::{ApiClient, CancellationToken, SessionListQuery};
use std::path::PathBuf;
use std::time::Duration;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::PollerConfig;
use crate::poller::{is_cancelled, SessionPoller};

#[derive(Parser)]
#[command(name = "session-poller")]
#[command(about = "Fetch conference sessions from a schedule API tenant")]
#[command(
    long_about = "Lists sessions for one schedule tenant, either once or on an interval.\n\n\
    In poll mode only sessions changed since the previous successful fetch are\n\
    requested, and each non-empty batch is written to the output directory as JSON."
)]
struct Cli {
    /// Path to a TOML configuration file.
    ///
    /// When omitted, configuration is read from SCHED_* environment variables
    /// (a .env file in the working directory is honoured).
    #[arg(short, long, env = "SCHED_POLLER_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the session list once and print it
    List {
        /// Only sessions changed after this instant (RFC 3339, e.g. 2015-10-25T09:00:00Z)
        #[arg(long, value_name = "TIMESTAMP")]
        since: Option<DateTime<Utc>>,

        /// Include soft-deleted sessions
        #[arg(long)]
        include_deleted: bool,

        /// Print the raw session records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Poll for changed sessions until interrupted
    Poll,

    /// Print an example configuration file
    ExampleConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "session_poller=info,sched_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Commands::ExampleConfig => {
            let text = toml::to_string_pretty(&PollerConfig::example())
                .context("Failed to render example config")?;
            print!("{}", text);
            Ok(())
        }
        Commands::List {
            since,
            include_deleted,
            json,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let query = SessionListQuery::new(since, include_deleted);
            list_sessions(&config, &query, json).await
        }
        Commands::Poll => {
            let config = load_config(cli.config.as_deref())?;
            poll_sessions(&config).await
        }
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<PollerConfig> {
    match path {
        Some(path) => PollerConfig::load(path),
        None => PollerConfig::from_env(),
    }
}

/// Cancel `token` on Ctrl+C.
fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received, stopping...");
            token.cancel();
        }
    });
}

async fn list_sessions(config: &PollerConfig, query: &SessionListQuery, json: bool) -> Result<()> {
    let client = ApiClient::from_config(&config.client)?;
    tracing::info!(
        subdomain = %client.subdomain(),
        "Listing sessions from {}",
        client.sessions_url()
    );

    let cancel = CancellationToken::new();
    cancel_on_ctrl_c(cancel.clone());

    let sessions = match client.list_sessions_until_cancelled(query, &cancel).await {
        Ok(sessions) => sessions,
        Err(e) if e.is_cancelled() => return Ok(()),
        Err(e) => return Err(e).context("Failed to list sessions"),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&sessions)?);
        return Ok(());
    }

    println!("{} sessions", sessions.len());
    for session in &sessions {
        match session.str_field("name") {
            Some(name) => println!("  {}", name),
            None => println!("  {}", session),
        }
    }
    Ok(())
}

async fn poll_sessions(config: &PollerConfig) -> Result<()> {
    let client = ApiClient::from_config(&config.client)?;
    let poller = SessionPoller::new(client, config);
    let interval = Duration::from_secs(config.poll_interval_secs.max(1));

    let shutdown = CancellationToken::new();
    let poller_handle = tokio::spawn(poller.run(interval, shutdown.clone()));

    tracing::info!("Session poller running. Press Ctrl+C to stop.");
    signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received, stopping...");
    shutdown.cancel();

    match poller_handle.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) if is_cancelled(&e) => {}
        Ok(Err(e)) => tracing::error!("Poller error: {:?}", e),
        Err(e) => tracing::error!("Poller task error: {:?}", e),
    }

    tracing::info!("Session poller stopped");
    Ok(())
}
