use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Abuse report filed by one chat partner against the other
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Report {
    pub id: i64,
    /// Internal id of the reported user
    pub user_id: i64,
    pub reporter_id: i64,
    pub report: String,
    pub created_at: DateTime<Utc>,
}
