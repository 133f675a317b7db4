use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::commands::{has_command, CommandContext, CommandHandler};
use crate::models::User;
use crate::notices;
use crate::transport::Message;

const COMMAND: &str = "/report";

/// `/report <reason>` files a report against the current partner.
/// The conversation keeps going.
pub struct ReportPartner;

#[async_trait]
impl CommandHandler for ReportPartner {
    fn name(&self) -> &'static str {
        "report"
    }

    async fn try_handle(&self, ctx: &CommandContext, user: &User, message: &Message) -> bool {
        let text = message.text();
        if !has_command(text, COMMAND) {
            return false;
        }

        let Some(partner_chat_id) = user.state().partner() else {
            return false;
        };

        let reason = text[COMMAND.len()..].trim();
        if reason.is_empty() {
            ctx.messenger.notify(user.chat_id, notices::REPORT_USAGE).await;
            return true;
        }

        let partner = match ctx.users.find_by_chat_id(partner_chat_id).await {
            Ok(Some(partner)) => partner,
            Ok(None) => {
                warn!("Reported partner chat {} does not exist", partner_chat_id);
                return true;
            }
            Err(e) => {
                error!("Error retrieving partner {}: {}", partner_chat_id, e);
                return true;
            }
        };

        match ctx.reports.create_report(partner.id, user.id, reason).await {
            Ok(report) => {
                info!("User {} reported user {} (report {})", user.id, partner.id, report.id);
                ctx.messenger.notify(user.chat_id, notices::REPORTED).await;
            }
            Err(e) => error!("Failed to store report from user {}: {}", user.id, e),
        }

        true
    }
}
