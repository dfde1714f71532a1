//! Asynchronous client for the conference schedule session listing API.
//!
//! ```ignore
//! use sched_client::ApiClient;
//!
//! let client = ApiClient::new("ssetest2015", api_key)?;
//! let sessions = client.list_sessions(None, false).await?;
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod pending;

pub use client::ApiClient;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use pending::PendingSessionList;
pub use sched_types::{SessionListQuery, SessionRecord};
pub use tokio_util::sync::CancellationToken;
