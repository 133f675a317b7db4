use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::conversation::ConversationState;

/// A Telegram chat known to the bot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    /// Telegram chat id, the address every notice is sent to
    pub chat_id: i64,
    /// Set by /start; stays true while matched, cleared by teardown
    pub available: bool,
    pub match_chat_id: Option<i64>,
    pub previous_match: Option<i64>,
    pub allow_pictures: bool,
    pub last_activity: DateTime<Utc>,
    pub register_date: DateTime<Utc>,
    pub banned_until: Option<DateTime<Utc>>,
}

impl User {
    /// A freshly registered, idle user
    pub fn new(id: i64, chat_id: i64) -> Self {
        let now = Utc::now();
        Self {
            id,
            chat_id,
            available: false,
            match_chat_id: None,
            previous_match: None,
            allow_pictures: true,
            last_activity: now,
            register_date: now,
            banned_until: None,
        }
    }

    pub fn state(&self) -> ConversationState {
        ConversationState::of(self)
    }

    /// Available and waiting for a partner
    pub fn is_searching(&self) -> bool {
        self.available && self.match_chat_id.is_none()
    }

    pub fn is_matched(&self) -> bool {
        self.available && self.match_chat_id.is_some()
    }

    pub fn is_banned_at(&self, now: DateTime<Utc>) -> bool {
        self.banned_until.map(|until| now < until).unwrap_or(false)
    }
}
