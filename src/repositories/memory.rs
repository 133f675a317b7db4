//! In-memory store implementing every storage trait.
//!
//! All rows sit behind one mutex, so two-row updates (match commit and
//! teardown) are atomic just like their transactional PostgreSQL versions.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::error::RepositoryError;
use crate::models::{Report, User};
use crate::repositories::traits::{CursorStore, MatchCommit, ReportStore, Teardown, UserStore};

#[derive(Debug, Default)]
struct MemoryState {
    /// Keyed by chat id
    users: HashMap<i64, User>,
    reports: Vec<Report>,
    next_user_id: i64,
    next_offset: i64,
}

impl MemoryState {
    fn user_by_id_mut(&mut self, user_id: i64) -> Option<&mut User> {
        self.users.values_mut().find(|u| u.id == user_id)
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a user row as-is.
    pub async fn insert_user(&self, user: User) {
        let mut state = self.state.lock().await;
        state.next_user_id = state.next_user_id.max(user.id);
        state.users.insert(user.chat_id, user);
    }

    pub async fn user(&self, chat_id: i64) -> Option<User> {
        self.state.lock().await.users.get(&chat_id).cloned()
    }

    pub async fn user_count(&self) -> usize {
        self.state.lock().await.users.len()
    }

    pub async fn reports(&self) -> Vec<Report> {
        self.state.lock().await.reports.clone()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_chat_id(&self, chat_id: i64) -> Result<Option<User>, RepositoryError> {
        Ok(self.user(chat_id).await)
    }

    async fn find_or_create(&self, chat_id: i64) -> Result<(User, bool), RepositoryError> {
        let mut state = self.state.lock().await;

        if let Some(user) = state.users.get(&chat_id) {
            return Ok((user.clone(), false));
        }

        state.next_user_id += 1;
        let user = User::new(state.next_user_id, chat_id);
        state.users.insert(chat_id, user.clone());

        Ok((user, true))
    }

    async fn find_searching_except(&self, chat_id: i64) -> Result<Vec<User>, RepositoryError> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .values()
            .filter(|u| u.chat_id != chat_id && u.is_searching())
            .cloned()
            .collect())
    }

    async fn find_all_searching(&self) -> Result<Vec<User>, RepositoryError> {
        let state = self.state.lock().await;
        let mut users: Vec<User> = state
            .users
            .values()
            .filter(|u| u.is_searching())
            .cloned()
            .collect();
        users.sort_by_key(|u| u.last_activity);
        Ok(users)
    }

    async fn begin_search(&self, chat_id: i64) -> Result<bool, RepositoryError> {
        let mut state = self.state.lock().await;
        match state.users.get_mut(&chat_id) {
            Some(user) if !user.available && user.match_chat_id.is_none() => {
                user.available = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn commit_match(
        &self,
        requester_chat_id: i64,
        partner_chat_id: i64,
    ) -> Result<MatchCommit, RepositoryError> {
        if requester_chat_id == partner_chat_id {
            return Ok(MatchCommit::PartnerUnavailable);
        }

        let mut state = self.state.lock().await;

        let searching = |chat_id: i64| {
            state
                .users
                .get(&chat_id)
                .map(User::is_searching)
                .unwrap_or(false)
        };

        if !searching(requester_chat_id) {
            return Ok(MatchCommit::RequesterUnavailable);
        }
        if !searching(partner_chat_id) {
            return Ok(MatchCommit::PartnerUnavailable);
        }

        if let Some(requester) = state.users.get_mut(&requester_chat_id) {
            requester.match_chat_id = Some(partner_chat_id);
        }
        if let Some(partner) = state.users.get_mut(&partner_chat_id) {
            partner.match_chat_id = Some(requester_chat_id);
        }

        Ok(MatchCommit::Committed)
    }

    async fn end_conversation(&self, chat_id: i64) -> Result<Teardown, RepositoryError> {
        let mut state = self.state.lock().await;

        let user = state
            .users
            .get_mut(&chat_id)
            .ok_or_else(|| RepositoryError::NotFound(format!("user with chat {}", chat_id)))?;

        let Some(partner_chat_id) = user.match_chat_id else {
            user.available = false;
            return Ok(Teardown::Cancelled);
        };

        user.match_chat_id = None;
        user.available = false;
        user.previous_match = Some(partner_chat_id);

        if let Some(partner) = state.users.get_mut(&partner_chat_id) {
            if partner.match_chat_id == Some(chat_id) {
                partner.match_chat_id = None;
                partner.available = false;
                partner.previous_match = Some(chat_id);
            }
        }

        Ok(Teardown::Ended { partner_chat_id })
    }

    async fn toggle_allow_pictures(&self, user_id: i64) -> Result<bool, RepositoryError> {
        let mut state = self.state.lock().await;
        let user = state
            .user_by_id_mut(user_id)
            .ok_or_else(|| RepositoryError::NotFound(format!("user {}", user_id)))?;
        user.allow_pictures = !user.allow_pictures;
        Ok(user.allow_pictures)
    }

    async fn touch_last_activity(&self, user_id: i64) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().await;
        if let Some(user) = state.user_by_id_mut(user_id) {
            user.last_activity = Utc::now();
        }
        Ok(())
    }

    async fn ban_until(
        &self,
        chat_id: i64,
        until: Option<DateTime<Utc>>,
    ) -> Result<bool, RepositoryError> {
        let mut state = self.state.lock().await;
        match state.users.get_mut(&chat_id) {
            Some(user) => {
                user.banned_until = until;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl ReportStore for MemoryStore {
    async fn create_report(
        &self,
        subject_id: i64,
        reporter_id: i64,
        reason: &str,
    ) -> Result<Report, RepositoryError> {
        let mut state = self.state.lock().await;
        let report = Report {
            id: state.reports.len() as i64 + 1,
            user_id: subject_id,
            reporter_id,
            report: reason.to_string(),
            created_at: Utc::now(),
        };
        state.reports.push(report.clone());
        Ok(report)
    }
}

#[async_trait]
impl CursorStore for MemoryStore {
    async fn load_offset(&self) -> Result<i64, RepositoryError> {
        Ok(self.state.lock().await.next_offset)
    }

    async fn save_offset(&self, offset: i64) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().await;
        state.next_offset = state.next_offset.max(offset);
        Ok(())
    }
}
