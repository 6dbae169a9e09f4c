//! Click record: one successful redirect.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// An append-only record of a redirect with visitor metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Click {
    pub id: i64,
    pub link_id: i64,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    pub clicked_at: DateTime<Utc>,
}

/// Input for recording a click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClick {
    pub link_id: i64,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    pub clicked_at: DateTime<Utc>,
}
