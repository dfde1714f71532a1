use chrono::{DateTime, Utc};
use reqwest::{Client, Url};
use sched_types::{SessionListQuery, SessionRecord};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::pending::PendingSessionList;

/// Client for a tenant's schedule API.
///
/// Holds the tenant credentials and a pooled HTTP client. Cloning is cheap
/// and clones share the connection pool, so one client can serve any number
/// of concurrent calls.
#[derive(Clone)]
pub struct ApiClient {
    http_client: Client,
    sessions_url: Url,
    subdomain: String,
    api_key: String,
}

impl ApiClient {
    /// Create a client for `https://{subdomain}.sched.com`.
    ///
    /// No request is made until a listing method is called.
    pub fn new(subdomain: impl Into<String>, api_key: impl Into<String>) -> ClientResult<Self> {
        Self::from_config(&ClientConfig::new(subdomain, api_key))
    }

    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs.max(1)))
            .build()
            .map_err(ClientError::transport)?;

        Self::with_client(http_client, config)
    }

    /// Create a client around an existing `reqwest::Client`.
    pub fn with_client(http_client: Client, config: &ClientConfig) -> ClientResult<Self> {
        let subdomain = config.subdomain.trim();
        if subdomain.is_empty() {
            return Err(ClientError::invalid_credentials("subdomain must not be empty"));
        }
        if !is_dns_label(subdomain) {
            return Err(ClientError::invalid_credentials(format!(
                "subdomain '{}' must be a single DNS label (letters, digits, '-')",
                subdomain
            )));
        }
        let api_key = config.api_key.trim();
        if api_key.is_empty() {
            return Err(ClientError::invalid_credentials("API key must not be empty"));
        }

        let endpoint = format!("{}/sessions", config.endpoint());
        let sessions_url = Url::parse(&endpoint).map_err(|e| ClientError::InvalidEndpoint {
            endpoint: endpoint.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            http_client,
            sessions_url,
            subdomain: subdomain.to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub fn subdomain(&self) -> &str {
        &self.subdomain
    }

    /// Session listing URL, without credentials or query parameters
    pub fn sessions_url(&self) -> &Url {
        &self.sessions_url
    }

    /// List the tenant's sessions.
    ///
    /// `since` limits the result to sessions changed after that instant;
    /// `include_deleted` adds soft-deleted sessions. Exactly one outbound
    /// request is made per call.
    pub async fn list_sessions(
        &self,
        since: Option<DateTime<Utc>>,
        include_deleted: bool,
    ) -> ClientResult<Vec<SessionRecord>> {
        self.fetch(&SessionListQuery::new(since, include_deleted)).await
    }

    /// Same as [`list_sessions`](Self::list_sessions), resolving with
    /// `Cancelled` as soon as `cancel` fires.
    ///
    /// A token that is already cancelled short-circuits before any I/O.
    pub async fn list_sessions_until_cancelled(
        &self,
        query: &SessionListQuery,
        cancel: &CancellationToken,
    ) -> ClientResult<Vec<SessionRecord>> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ClientError::Cancelled),
            result = self.fetch(query) => result,
        }
    }

    /// Run the listing on a background task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn_list_sessions(&self, query: SessionListQuery) -> PendingSessionList {
        let cancel = CancellationToken::new();
        let (tx, rx) = oneshot::channel();

        let client = self.clone();
        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            let result = client
                .list_sessions_until_cancelled(&query, &task_cancel)
                .await;
            // Receiver gone means nobody is waiting for the result.
            let _ = tx.send(result);
        });

        PendingSessionList::new(rx, cancel)
    }

    async fn fetch(&self, query: &SessionListQuery) -> ClientResult<Vec<SessionRecord>> {
        tracing::debug!(
            subdomain = %self.subdomain,
            since = ?query.since,
            include_deleted = query.include_deleted,
            "Requesting session list"
        );

        let response = self
            .http_client
            .get(self.sessions_url.clone())
            .query(&[("api_key", self.api_key.as_str())])
            .query(&query.query_pairs())
            .send()
            .await
            .map_err(ClientError::transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes().await.map_err(ClientError::transport)?;
        let sessions: Vec<SessionRecord> = serde_json::from_slice(&body)?;

        tracing::debug!(
            subdomain = %self.subdomain,
            count = sessions.len(),
            "Received session list"
        );
        Ok(sessions)
    }
}

/// 1-63 ASCII letters, digits or hyphens, not starting or ending with '-'.
fn is_dns_label(value: &str) -> bool {
    (1..=63).contains(&value.len())
        && value.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
        && !value.starts_with('-')
        && !value.ends_with('-')
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("subdomain", &self.subdomain)
            .field("sessions_url", &self.sessions_url.as_str())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_builds_tenant_url() {
        let client = ApiClient::new("ssetest2015", "test-key").expect("should build client");
        assert_eq!(
            client.sessions_url().as_str(),
            "https://ssetest2015.sched.com/sessions"
        );
        assert_eq!(client.subdomain(), "ssetest2015");
    }

    #[test]
    fn test_empty_subdomain_rejected() {
        let result = ApiClient::new("  ", "test-key");
        assert!(matches!(result, Err(ClientError::InvalidCredentials(_))));
    }

    #[test]
    fn test_empty_api_key_rejected() {
        let result = ApiClient::new("ssetest2015", "");
        assert!(matches!(result, Err(ClientError::InvalidCredentials(_))));
    }

    #[test]
    fn test_subdomain_must_be_dns_label() {
        for subdomain in ["a/b", "a#", "a.b", "../x", "attacker.example/x#", "-a", "a b"] {
            let result = ApiClient::new(subdomain, "test-key");
            assert!(
                matches!(result, Err(ClientError::InvalidCredentials(_))),
                "{:?} should be rejected",
                subdomain
            );
        }

        let too_long = "a".repeat(64);
        assert!(ApiClient::new(too_long, "test-key").is_err());
        assert!(ApiClient::new("sse-test-2015", "test-key").is_ok());
    }

    #[test]
    fn test_bad_subdomain_rejected_with_base_url() {
        let mut config = ClientConfig::new("../x", "test-key");
        config.base_url = Some("http://127.0.0.1:8080".to_string());

        let result = ApiClient::from_config(&config);
        assert!(matches!(result, Err(ClientError::InvalidCredentials(_))));
    }

    #[test]
    fn test_zero_timeout_is_clamped() {
        let mut config = ClientConfig::new("ssetest2015", "test-key");
        config.request_timeout_secs = 0;
        assert!(ApiClient::from_config(&config).is_ok());
    }

    #[test]
    fn test_bad_base_url_rejected() {
        let mut config = ClientConfig::new("ssetest2015", "test-key");
        config.base_url = Some("not a url".to_string());

        let result = ApiClient::from_config(&config);
        assert!(matches!(result, Err(ClientError::InvalidEndpoint { .. })));
    }

    #[test]
    fn test_debug_hides_api_key() {
        let client = ApiClient::new("ssetest2015", "super-secret").unwrap();
        let debug = format!("{:?}", client);
        assert!(!debug.contains("super-secret"));
    }
}
