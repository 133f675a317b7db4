//! Conversation lifecycle of a single user.
//!
//! The state is never stored directly; it is derived from the `available`
//! and `match_chat_id` columns of a [`User`]:
//!
//! | state       | available | match_chat_id |
//! |-------------|-----------|---------------|
//! | `Idle`      | false     | NULL          |
//! | `Searching` | true      | NULL          |
//! | `Matched`   | true      | partner       |
//!
//! Bans are checked by the dispatcher before any transition is attempted.

use serde::{Deserialize, Serialize};

use crate::models::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConversationState {
    Idle,
    Searching,
    Matched { partner: i64 },
}

/// Something that asks a user's conversation to move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationEvent {
    /// `/start`
    StartRequested,
    /// The matchmaker paired the user with `partner`
    MatchCommitted { partner: i64 },
    /// `/bye` or `/end`, carried out by the teardown worker
    EndRequested,
}

impl ConversationState {
    pub fn of(user: &User) -> Self {
        match (user.available, user.match_chat_id) {
            (true, Some(partner)) => ConversationState::Matched { partner },
            (true, None) => ConversationState::Searching,
            // A partner reference without `available` only exists half-torn-down;
            // it gets treated as idle so /start can recover the user.
            (false, _) => ConversationState::Idle,
        }
    }

    /// Successor state for a legal transition, `None` when the event does not apply.
    pub fn apply(self, event: ConversationEvent) -> Option<ConversationState> {
        use ConversationEvent::*;
        use ConversationState::*;

        match (self, event) {
            (Idle, StartRequested) => Some(Searching),
            (Searching, MatchCommitted { partner }) => Some(Matched { partner }),
            (Searching, EndRequested) | (Matched { .. }, EndRequested) => Some(Idle),
            _ => None,
        }
    }

    pub fn partner(&self) -> Option<i64> {
        match self {
            ConversationState::Matched { partner } => Some(*partner),
            _ => None,
        }
    }
}
