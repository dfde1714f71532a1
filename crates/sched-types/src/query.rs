use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Parameters of a session listing request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionListQuery {
    /// Only sessions changed after this instant. `None` lists everything.
    pub since: Option<DateTime<Utc>>,
    /// Include soft-deleted sessions.
    #[serde(default)]
    pub include_deleted: bool,
}

impl SessionListQuery {
    pub fn new(since: Option<DateTime<Utc>>, include_deleted: bool) -> Self {
        Self {
            since,
            include_deleted,
        }
    }

    pub fn all() -> Self {
        Self::default()
    }

    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn with_deleted(mut self) -> Self {
        self.include_deleted = true;
        self
    }

    /// Optional query parameters, in wire form.
    ///
    /// `since` goes out as unix seconds; `deleted` is only sent when set.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(since) = self.since {
            params.push(("since", since.timestamp().to_string()));
        }
        if self.include_deleted {
            params.push(("deleted", "true".to_string()));
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_default_query_has_no_params() {
        assert!(SessionListQuery::all().query_pairs().is_empty());
        assert!(SessionListQuery::new(None, false).query_pairs().is_empty());
    }

    #[test]
    fn test_since_and_deleted_params() {
        let since = Utc.with_ymd_and_hms(2015, 6, 1, 12, 0, 0).unwrap();
        let query = SessionListQuery::all().since(since).with_deleted();

        assert_eq!(
            query.query_pairs(),
            vec![
                ("since", "1433160000".to_string()),
                ("deleted", "true".to_string()),
            ]
        );
    }

    #[test]
    fn test_deleted_only() {
        let query = SessionListQuery::new(None, true);
        assert_eq!(query.query_pairs(), vec![("deleted", "true".to_string())]);
    }
}
