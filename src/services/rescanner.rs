use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time;
use tracing::{debug, error, info};

use crate::error::RepositoryError;
use crate::repositories::UserStore;
use crate::services::jobs::MatchJob;

/// Periodically re-queues every searching user for the matchmaker.
///
/// Match jobs are sent once by `/start`; anything lost to a restart or a
/// closed queue is picked up again on the next sweep.
pub struct AvailabilityRescanner {
    users: Arc<dyn UserStore>,
    jobs: mpsc::Sender<MatchJob>,
    interval: Duration,
}

impl AvailabilityRescanner {
    pub fn new(users: Arc<dyn UserStore>, jobs: mpsc::Sender<MatchJob>) -> Self {
        Self {
            users,
            jobs,
            interval: Duration::from_secs(10),
        }
    }

    /// Set rescan interval
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Sweep until `shutdown` flips to true
    pub async fn start(self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = time::interval(self.interval);
        interval.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
        info!("Rescanner started, sweeping every {:?}", self.interval);

        loop {
            tokio::select! {
                _ = interval.tick() => {}
                _ = shutdown.changed() => break,
            }

            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                result = self.rescan_once() => {
                    if let Err(e) = result {
                        error!("Error retrieving everyone available: {}", e);
                    }
                }
                _ = shutdown.changed() => break,
            }
        }

        info!("Rescanner stopped");
    }

    /// Queue one match job per searching user, returning how many were queued
    pub async fn rescan_once(&self) -> Result<usize, RepositoryError> {
        let searching = self.users.find_all_searching().await?;
        let mut queued = 0;

        for user in searching {
            if self.jobs.send(MatchJob { chat_id: user.chat_id }).await.is_err() {
                debug!("Match queue closed during rescan");
                break;
            }
            queued += 1;
        }

        if queued > 0 {
            debug!("Rescan queued {} searching users", queued);
        }

        Ok(queued)
    }
}
