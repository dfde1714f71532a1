use anyhow::{Context, Result};
use sched_client::ClientConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollerConfig {
    /// Directory where session snapshots are written
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// How often to poll for changed sessions (seconds)
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Also fetch soft-deleted sessions
    #[serde(default)]
    pub include_deleted: bool,

    /// Tenant credentials and endpoint
    pub client: ClientConfig,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./sessions")
}

fn default_poll_interval() -> u64 {
    300 // 5 minutes
}

impl PollerConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            output_dir: env::var("SCHED_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_output_dir()),
            poll_interval_secs: env::var("SCHED_POLL_INTERVAL_SECS")
                .unwrap_or_else(|_| default_poll_interval().to_string())
                .parse()
                .context("SCHED_POLL_INTERVAL_SECS must be a valid number")?,
            include_deleted: env::var("SCHED_INCLUDE_DELETED")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .context("SCHED_INCLUDE_DELETED must be true or false")?,
            client: ClientConfig::from_env()?,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: PollerConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    pub fn example() -> Self {
        PollerConfig {
            output_dir: default_output_dir(),
            poll_interval_secs: default_poll_interval(),
            include_deleted: false,
            client: ClientConfig::new("your-conference", "your-api-key"),
        }
    }
}
