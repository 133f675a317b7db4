use async_trait::async_trait;
use tracing::{debug, error, warn};

use crate::commands::{has_command, CommandContext, CommandHandler};
use crate::conversation::ConversationEvent;
use crate::models::User;
use crate::notices;
use crate::services::jobs::{EndConversationJob, MatchJob};
use crate::transport::Message;

/// `/start`: Idle -> Searching, then hand the user to the matchmaker
pub struct Start;

#[async_trait]
impl CommandHandler for Start {
    fn name(&self) -> &'static str {
        "start"
    }

    async fn try_handle(&self, ctx: &CommandContext, user: &User, message: &Message) -> bool {
        if !has_command(message.text(), "/start") {
            return false;
        }

        if user.state().apply(ConversationEvent::StartRequested).is_none() {
            return false;
        }

        match ctx.users.begin_search(user.chat_id).await {
            Ok(true) => {}
            Ok(false) => {
                debug!("Chat {} left idle before /start was applied", user.chat_id);
                return false;
            }
            Err(e) => {
                error!("Failed to start search for chat {}: {}", user.chat_id, e);
                return true;
            }
        }

        ctx.messenger.notify(user.chat_id, notices::SEARCHING).await;

        // The rescanner picks the user up if this signal is lost
        if ctx
            .match_jobs
            .send(MatchJob { chat_id: user.chat_id })
            .await
            .is_err()
        {
            warn!("Match queue closed, chat {} waits for the next rescan", user.chat_id);
        }

        true
    }
}

/// `/bye` or `/end`: queue a teardown of the current conversation or search
pub struct Stop;

#[async_trait]
impl CommandHandler for Stop {
    fn name(&self) -> &'static str {
        "stop"
    }

    async fn try_handle(&self, ctx: &CommandContext, user: &User, message: &Message) -> bool {
        let text = message.text();
        if !has_command(text, "/bye") && !has_command(text, "/end") {
            return false;
        }

        if user.state().apply(ConversationEvent::EndRequested).is_none() {
            return false;
        }

        ctx.messenger.notify(user.chat_id, notices::ENDING).await;

        if ctx
            .end_jobs
            .send(EndConversationJob { chat_id: user.chat_id })
            .await
            .is_err()
        {
            error!("Teardown queue closed, dropping /end from chat {}", user.chat_id);
        }

        true
    }
}
