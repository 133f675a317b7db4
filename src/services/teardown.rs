use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::notices;
use crate::repositories::{Teardown, UserStore};
use crate::services::jobs::EndConversationJob;
use crate::transport::Messenger;

/// Ends conversations queued by `/bye` and `/end`.
///
/// A failed job is logged and dropped; the worker keeps consuming.
pub struct TeardownWorker {
    users: Arc<dyn UserStore>,
    messenger: Arc<dyn Messenger>,
}

impl TeardownWorker {
    pub fn new(users: Arc<dyn UserStore>, messenger: Arc<dyn Messenger>) -> Self {
        Self { users, messenger }
    }

    /// Consume teardown jobs until every sender is gone
    pub async fn run(self, mut jobs: mpsc::Receiver<EndConversationJob>) {
        info!("Teardown worker started");

        while let Some(job) = jobs.recv().await {
            self.handle(job.chat_id).await;
        }

        info!("Teardown worker stopped");
    }

    pub async fn handle(&self, chat_id: i64) -> Option<Teardown> {
        let outcome = match self.users.end_conversation(chat_id).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Could not end conversation for chat {}: {}", chat_id, e);
                return None;
            }
        };

        if let Teardown::Ended { partner_chat_id } = outcome {
            info!("Ended conversation {} <-> {}", chat_id, partner_chat_id);
            self.messenger.notify(partner_chat_id, notices::PARTNER_LEFT).await;
            self.messenger.notify(partner_chat_id, notices::START_AGAIN).await;
        }

        self.messenger.notify(chat_id, notices::CONVERSATION_OVER).await;
        self.messenger.notify(chat_id, notices::START_AGAIN).await;

        Some(outcome)
    }
}
