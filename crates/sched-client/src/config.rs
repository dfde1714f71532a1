use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Tenant identifier, the `{subdomain}` in `https://{subdomain}.sched.com`
    pub subdomain: String,

    /// API key issued to the tenant
    pub api_key: String,

    /// Host the tenant subdomain lives under
    #[serde(default = "default_service_host")]
    pub service_host: String,

    /// Full endpoint override (staging, local mocks). Replaces the
    /// subdomain/host pair when set.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Per-request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_service_host() -> String {
    "sched.com".to_string()
}

fn default_request_timeout() -> u64 {
    60
}

impl ClientConfig {
    pub fn new(subdomain: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            subdomain: subdomain.into(),
            api_key: api_key.into(),
            service_host: default_service_host(),
            base_url: None,
            request_timeout_secs: default_request_timeout(),
        }
    }

    pub fn from_env() -> Result<Self> {
        Ok(Self {
            subdomain: env::var("SCHED_SUBDOMAIN").context("SCHED_SUBDOMAIN must be set")?,
            api_key: env::var("SCHED_API_KEY").context("SCHED_API_KEY must be set")?,
            service_host: env::var("SCHED_SERVICE_HOST").unwrap_or_else(|_| default_service_host()),
            base_url: env::var("SCHED_BASE_URL").ok().filter(|url| !url.is_empty()),
            request_timeout_secs: match env::var("SCHED_TIMEOUT_SECS") {
                Ok(value) => parse_timeout(&value)?,
                Err(_) => default_request_timeout(),
            },
        })
    }

    /// Endpoint root that `/sessions` is appended to.
    pub fn endpoint(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}.{}", self.subdomain.trim(), self.service_host),
        }
    }
}

fn parse_timeout(value: &str) -> Result<u64> {
    let secs: u64 = value
        .trim()
        .parse()
        .context("SCHED_TIMEOUT_SECS must be a valid number")?;
    if secs == 0 {
        anyhow::bail!("SCHED_TIMEOUT_SECS must be at least 1");
    }
    Ok(secs)
}

// Keeps the API key out of logs.
impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("subdomain", &self.subdomain)
            .field("api_key", &"<redacted>")
            .field("service_host", &self.service_host)
            .field("base_url", &self.base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_from_subdomain() {
        let config = ClientConfig::new("ssetest2015", "key");
        assert_eq!(config.endpoint(), "https://ssetest2015.sched.com");
    }

    #[test]
    fn test_endpoint_override() {
        let mut config = ClientConfig::new("ssetest2015", "key");
        config.base_url = Some("http://127.0.0.1:8080/api/".to_string());
        assert_eq!(config.endpoint(), "http://127.0.0.1:8080/api");
    }

    #[test]
    fn test_defaults_when_omitted() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"subdomain":"ssetest2015","api_key":"abc123"}"#).unwrap();
        assert_eq!(config.service_host, "sched.com");
        assert_eq!(config.request_timeout_secs, 60);
        assert!(config.base_url.is_none());
    }

    #[test]
    fn test_parse_timeout() {
        assert_eq!(parse_timeout("30").unwrap(), 30);
        assert_eq!(parse_timeout(" 5 ").unwrap(), 5);
        assert!(parse_timeout("0").is_err());
        assert!(parse_timeout("soon").is_err());
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = ClientConfig::new("ssetest2015", "super-secret");
        let debug = format!("{:?}", config);
        assert!(debug.contains("ssetest2015"));
        assert!(!debug.contains("super-secret"));
    }
}
