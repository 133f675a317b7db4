//! Storage traits the workers are written against.
//!
//! Implementations must be thread-safe (`Send + Sync`): the dispatch pool,
//! the matchmaker, the rescanner and the teardown worker all hold the same
//! store and call it concurrently.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::RepositoryError;
use crate::models::{Report, User};

/// Result of trying to pair two searching users
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchCommit {
    /// Both rows now reference each other
    Committed,
    /// The requester stopped searching (or vanished) before the commit
    RequesterUnavailable,
    /// The candidate stopped searching (or vanished) before the commit
    PartnerUnavailable,
}

/// Result of ending a user's conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Teardown {
    /// The user was matched; both sides are idle again
    Ended { partner_chat_id: i64 },
    /// The user had no partner and is now idle
    Cancelled,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_chat_id(&self, chat_id: i64) -> Result<Option<User>, RepositoryError>;

    /// Returns the user and whether this call created it.
    async fn find_or_create(&self, chat_id: i64) -> Result<(User, bool), RepositoryError>;

    /// Searching users other than `chat_id`.
    async fn find_searching_except(&self, chat_id: i64) -> Result<Vec<User>, RepositoryError>;

    async fn find_all_searching(&self) -> Result<Vec<User>, RepositoryError>;

    /// Idle -> Searching. Returns false if the user was not idle.
    async fn begin_search(&self, chat_id: i64) -> Result<bool, RepositoryError>;

    /// Pair two searching users in a single atomic step.
    async fn commit_match(
        &self,
        requester_chat_id: i64,
        partner_chat_id: i64,
    ) -> Result<MatchCommit, RepositoryError>;

    /// Clear the user's conversation, and the partner's side of it, atomically.
    async fn end_conversation(&self, chat_id: i64) -> Result<Teardown, RepositoryError>;

    /// Flip the picture preference, returning the new value.
    async fn toggle_allow_pictures(&self, user_id: i64) -> Result<bool, RepositoryError>;

    async fn touch_last_activity(&self, user_id: i64) -> Result<(), RepositoryError>;

    /// Set or lift (`None`) a ban. Returns false for an unknown chat.
    async fn ban_until(
        &self,
        chat_id: i64,
        until: Option<DateTime<Utc>>,
    ) -> Result<bool, RepositoryError>;
}

#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn create_report(
        &self,
        subject_id: i64,
        reporter_id: i64,
        reason: &str,
    ) -> Result<Report, RepositoryError>;
}

/// Persistence for the getUpdates offset
#[async_trait]
pub trait CursorStore: Send + Sync {
    async fn load_offset(&self) -> Result<i64, RepositoryError>;

    async fn save_offset(&self, offset: i64) -> Result<(), RepositoryError>;
}
