//! Handlers an inbound message is offered to, in order.
//!
//! The first handler that claims a message ends routing. New commands are
//! added by putting another handler into [`default_handlers`].

mod pictures;
mod relay;
mod report;
mod session;

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::models::User;
use crate::repositories::{ReportStore, UserStore};
use crate::services::jobs::{EndConversationJob, MatchJob};
use crate::transport::{Message, Messenger};

pub use pictures::{Help, PicturePreference};
pub use relay::Relay;
pub use report::ReportPartner;
pub use session::{Start, Stop};

/// Everything a handler may touch
#[derive(Clone)]
pub struct CommandContext {
    pub users: Arc<dyn UserStore>,
    pub reports: Arc<dyn ReportStore>,
    pub messenger: Arc<dyn Messenger>,
    pub match_jobs: mpsc::Sender<MatchJob>,
    pub end_jobs: mpsc::Sender<EndConversationJob>,
}

#[async_trait]
pub trait CommandHandler: Send + Sync {
    fn name(&self) -> &'static str;

    /// Returns true if the message was claimed, which stops routing.
    async fn try_handle(&self, ctx: &CommandContext, user: &User, message: &Message) -> bool;
}

/// `/nopics`, `/help`, `/start`, `/bye`|`/end`, `/report`, then the relay fallback.
pub fn default_handlers() -> Vec<Box<dyn CommandHandler>> {
    vec![
        Box::new(PicturePreference),
        Box::new(Help),
        Box::new(Start),
        Box::new(Stop),
        Box::new(ReportPartner),
        Box::new(Relay),
    ]
}

/// Case-insensitive prefix match on the command word
pub(crate) fn has_command(text: &str, command: &str) -> bool {
    text.get(..command.len())
        .map(|prefix| prefix.eq_ignore_ascii_case(command))
        .unwrap_or(false)
}
