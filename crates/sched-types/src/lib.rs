//! Types shared between the schedule API client and the session poller.

pub mod query;
pub mod session;

pub use query::SessionListQuery;
pub use session::SessionRecord;
