use chrono::Utc;
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::commands::{CommandContext, CommandHandler};
use crate::notices;
use crate::transport::Message;

/// How a message left the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Claimed by the named handler
    Handled(&'static str),
    /// No handler claimed it
    Dropped,
    /// Sender is banned; only the ban notice went out
    Banned,
    /// The sender could not be resolved
    Failed,
}

/// Resolves the sender of a message and routes it through the handler chain
pub struct Dispatcher {
    ctx: CommandContext,
    handlers: Vec<Box<dyn CommandHandler>>,
}

impl Dispatcher {
    pub fn new(ctx: CommandContext, handlers: Vec<Box<dyn CommandHandler>>) -> Self {
        Self { ctx, handlers }
    }

    pub async fn handle_message(&self, message: &Message) -> Dispatch {
        let chat_id = message.chat_id();

        let user = match self.ctx.users.find_or_create(chat_id).await {
            Ok((user, created)) => {
                if created {
                    info!("Registered chat {}", chat_id);
                    self.ctx.messenger.notify(chat_id, notices::WELCOME).await;
                }
                user
            }
            Err(e) => {
                error!("Could not resolve chat {}: {}", chat_id, e);
                return Dispatch::Failed;
            }
        };

        if let Some(until) = user.banned_until.filter(|_| user.is_banned_at(Utc::now())) {
            self.ctx
                .messenger
                .notify(chat_id, &notices::banned_until(until))
                .await;
            return Dispatch::Banned;
        }

        let mut outcome = Dispatch::Dropped;
        for handler in &self.handlers {
            if handler.try_handle(&self.ctx, &user, message).await {
                outcome = Dispatch::Handled(handler.name());
                break;
            }
        }

        if outcome == Dispatch::Dropped {
            debug!("No handler claimed message {} from chat {}", message.message_id, chat_id);
        }

        if let Err(e) = self.ctx.users.touch_last_activity(user.id).await {
            error!("Failed to update last activity for user {}: {}", user.id, e);
        }

        outcome
    }
}

/// Fixed set of dispatch workers sharing one queue
pub struct DispatchPool {
    handles: Vec<JoinHandle<()>>,
}

impl DispatchPool {
    /// Spawn `workers` tasks draining `queue` until it is closed and empty
    pub fn spawn(
        workers: usize,
        dispatcher: Arc<Dispatcher>,
        queue: mpsc::Receiver<Message>,
    ) -> Self {
        let queue = Arc::new(Mutex::new(queue));

        let handles = (0..workers.max(1))
            .map(|worker| {
                let dispatcher = dispatcher.clone();
                let queue = queue.clone();
                tokio::spawn(async move {
                    info!("Started message worker {}", worker);
                    loop {
                        // Lock only for the receive so other workers can take the next message
                        let next = queue.lock().await.recv().await;
                        match next {
                            Some(message) => {
                                dispatcher.handle_message(&message).await;
                            }
                            None => break,
                        }
                    }
                    info!("Message worker {} drained", worker);
                })
            })
            .collect();

        Self { handles }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Wait for every worker to drain the closed queue
    pub async fn join(self) {
        for result in join_all(self.handles).await {
            if let Err(e) = result {
                error!("Message worker panicked: {}", e);
            }
        }
    }
}
