use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};

use crate::repositories::CursorStore;
use crate::transport::{Message, UpdateSource};

/// Pulls updates from the Bot API and feeds their messages to the dispatch queue.
///
/// The offset is persisted after every batch that moved it, so a restart
/// resumes where the previous process stopped instead of replaying the
/// transport's retention window.
pub struct UpdatePoller {
    source: Arc<dyn UpdateSource>,
    cursor: Arc<dyn CursorStore>,
    dispatch: mpsc::Sender<Message>,
    batch_limit: u32,
    poll_interval: Duration,
}

impl UpdatePoller {
    pub fn new(
        source: Arc<dyn UpdateSource>,
        cursor: Arc<dyn CursorStore>,
        dispatch: mpsc::Sender<Message>,
    ) -> Self {
        Self {
            source,
            cursor,
            dispatch,
            batch_limit: 20,
            poll_interval: Duration::from_millis(500),
        }
    }

    /// Set the pause between two fetches
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the maximum number of updates per fetch
    pub fn with_batch_limit(mut self, limit: u32) -> Self {
        self.batch_limit = limit;
        self
    }

    /// Poll until `shutdown` flips to true. The cycle in progress is completed first.
    pub async fn start(self, mut shutdown: watch::Receiver<bool>) {
        let mut offset = match self.cursor.load_offset().await {
            Ok(offset) => offset,
            Err(e) => {
                warn!("Could not load update offset, starting from 0: {}", e);
                0
            }
        };
        info!("Update poller started at offset {}", offset);

        loop {
            if *shutdown.borrow() {
                break;
            }

            offset = self.process_updates(offset).await;

            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                _ = shutdown.changed() => break,
            }
        }

        info!("Update poller stopped at offset {}", offset);
    }

    /// Fetch one batch starting at `offset`, queue its messages and return the next offset
    pub async fn process_updates(&self, offset: i64) -> i64 {
        let updates = match self.source.fetch(offset, self.batch_limit).await {
            Ok(updates) => updates,
            Err(e) => {
                error!("Failed to fetch updates at offset {}: {}", offset, e);
                return offset;
            }
        };

        let mut next = offset;

        for update in updates {
            // Already consumed in an earlier batch
            if update.update_id < next {
                continue;
            }

            if update.update_id % 1000 == 0 {
                info!("Update ID: {}", update.update_id);
            }

            // Blocks while the dispatch queue is full
            if let Some(message) = update.message {
                if self.dispatch.send(message).await.is_err() {
                    warn!("Dispatch queue closed, stopping at update {}", update.update_id);
                    break;
                }
            }

            next = update.update_id + 1;
        }

        if next != offset {
            if let Err(e) = self.cursor.save_offset(next).await {
                error!("Failed to persist update offset {}: {}", next, e);
            }
        }

        next
    }
}
