use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sched_client::{ApiClient, CancellationToken, ClientError};
use sched_types::{SessionListQuery, SessionRecord};
use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::Duration;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::time::{self, MissedTickBehavior};

use crate::config::PollerConfig;

/// Result of a single poll cycle
#[derive(Debug)]
pub struct PollOutcome {
    pub fetched: usize,
    pub snapshot: Option<PathBuf>,
}

/// Incrementally fetches sessions, remembering when the last successful
/// fetch started so the next one only asks for changes.
pub struct SessionPoller {
    client: ApiClient,
    output_dir: PathBuf,
    include_deleted: bool,
    since: Option<DateTime<Utc>>,
}

impl SessionPoller {
    pub fn new(client: ApiClient, config: &PollerConfig) -> Self {
        Self {
            client,
            output_dir: config.output_dir.clone(),
            include_deleted: config.include_deleted,
            since: None,
        }
    }

    pub fn since(&self) -> Option<DateTime<Utc>> {
        self.since
    }

    pub async fn poll_once(&mut self, cancel: &CancellationToken) -> Result<PollOutcome> {
        let started_at = Utc::now();
        let query = SessionListQuery::new(self.since, self.include_deleted);

        let sessions = self
            .client
            .list_sessions_until_cancelled(&query, cancel)
            .await?;

        let snapshot = if sessions.is_empty() {
            None
        } else {
            Some(self.write_snapshot(&sessions, started_at).await?)
        };

        // Advance only after the snapshot is written.
        self.since = Some(started_at);

        Ok(PollOutcome {
            fetched: sessions.len(),
            snapshot,
        })
    }

    async fn write_snapshot(
        &self,
        sessions: &[SessionRecord],
        started_at: DateTime<Utc>,
    ) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .with_context(|| format!("Failed to create {}", self.output_dir.display()))?;

        let stem = format!(
            "{}-{}",
            started_at.format("%y%m%d_%H%M%S%.3f"),
            self.client.subdomain()
        );
        let body = serde_json::to_vec_pretty(sessions).context("Failed to serialize sessions")?;

        // Never replace an earlier snapshot; suffix the name instead.
        let mut attempt = 0u32;
        let (path, mut file) = loop {
            let filename = match attempt {
                0 => format!("{}.json", stem),
                n => format!("{}-{}.json", stem, n),
            };
            let path = self.output_dir.join(filename);
            match OpenOptions::new().write(true).create_new(true).open(&path).await {
                Ok(file) => break (path, file),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => {
                    return Err(e).with_context(|| format!("Failed to create {}", path.display()))
                }
            }
        };

        file.write_all(&body)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        file.flush()
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;

        Ok(path)
    }

    pub async fn run(mut self, interval: Duration, shutdown: CancellationToken) -> Result<()> {
        let mut ticker = time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            subdomain = %self.client.subdomain(),
            "Session poller started (interval: {:?})",
            interval
        );

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }
            tracing::debug!(since = ?self.since, "Running session poll cycle");

            match self.poll_once(&shutdown).await {
                Ok(outcome) => match outcome.snapshot {
                    Some(path) => tracing::info!(
                        "Fetched {} changed sessions, wrote {}",
                        outcome.fetched,
                        path.display()
                    ),
                    None => tracing::debug!("No changed sessions"),
                },
                Err(e) if is_cancelled(&e) => break,
                Err(e) => {
                    tracing::error!("Session polling error: {:?}", e);
                    // Continue polling even on error
                }
            }
        }

        tracing::info!("Session poller stopped");
        Ok(())
    }
}

pub fn is_cancelled(err: &anyhow::Error) -> bool {
    err.downcast_ref::<ClientError>()
        .is_some_and(ClientError::is_cancelled)
}
