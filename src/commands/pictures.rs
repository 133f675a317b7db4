use async_trait::async_trait;
use tracing::error;

use crate::commands::{has_command, CommandContext, CommandHandler};
use crate::models::User;
use crate::notices;
use crate::transport::Message;

/// `/nopics` flips whether photos from partners are forwarded
pub struct PicturePreference;

#[async_trait]
impl CommandHandler for PicturePreference {
    fn name(&self) -> &'static str {
        "nopics"
    }

    async fn try_handle(&self, ctx: &CommandContext, user: &User, message: &Message) -> bool {
        if !has_command(message.text(), "/nopics") {
            return false;
        }

        match ctx.users.toggle_allow_pictures(user.id).await {
            Ok(true) => ctx.messenger.notify(user.chat_id, notices::PICTURES_ENABLED).await,
            Ok(false) => ctx.messenger.notify(user.chat_id, notices::PICTURES_DISABLED).await,
            Err(e) => error!("Failed to toggle pictures for user {}: {}", user.id, e),
        }

        true
    }
}

pub struct Help;

#[async_trait]
impl CommandHandler for Help {
    fn name(&self) -> &'static str {
        "help"
    }

    async fn try_handle(&self, ctx: &CommandContext, user: &User, message: &Message) -> bool {
        if !has_command(message.text(), "/help") {
            return false;
        }

        ctx.messenger.notify(user.chat_id, notices::HELP).await;
        true
    }
}
