//! Spawns the workers and shuts them down in dependency order.
//!
//! ```text
//! UpdatePoller -> [dispatch queue] -> DispatchPool -> [match queue] -> Matchmaker
//!                                          |      AvailabilityRescanner --^
//!                                          +----> [end queue]   -> TeardownWorker
//! ```

use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::commands::{default_handlers, CommandContext};
use crate::config::WorkerConfig;
use crate::repositories::{CursorStore, ReportStore, UserStore};
use crate::services::{
    AvailabilityRescanner, DispatchPool, Dispatcher, Matchmaker, TeardownWorker, UpdatePoller,
};
use crate::transport::{Messenger, UpdateSource};

/// External collaborators the workers run against
#[derive(Clone)]
pub struct Services {
    pub users: Arc<dyn UserStore>,
    pub reports: Arc<dyn ReportStore>,
    pub cursor: Arc<dyn CursorStore>,
    pub source: Arc<dyn UpdateSource>,
    pub messenger: Arc<dyn Messenger>,
}

pub struct BotRuntime {
    stop_polling: watch::Sender<bool>,
    stop_rescanning: watch::Sender<bool>,
    poller: JoinHandle<()>,
    pool: DispatchPool,
    rescanner: JoinHandle<()>,
    matchmaker: JoinHandle<()>,
    teardown: JoinHandle<()>,
}

impl BotRuntime {
    /// Create the queues and spawn every worker
    pub fn start(services: Services, config: &WorkerConfig) -> Self {
        let (dispatch_tx, dispatch_rx) = mpsc::channel(config.queue_capacity);
        let (match_tx, match_rx) = mpsc::channel(config.queue_capacity);
        let (end_tx, end_rx) = mpsc::channel(config.queue_capacity);
        let (stop_polling, polling_rx) = watch::channel(false);
        let (stop_rescanning, rescanning_rx) = watch::channel(false);

        let matchmaker = Matchmaker::new(services.users.clone(), services.messenger.clone());
        let matchmaker = tokio::spawn(matchmaker.run(match_rx));

        let teardown = TeardownWorker::new(services.users.clone(), services.messenger.clone());
        let teardown = tokio::spawn(teardown.run(end_rx));

        let rescanner = AvailabilityRescanner::new(services.users.clone(), match_tx.clone())
            .with_interval(config.rescan_interval());
        let rescanner = tokio::spawn(rescanner.start(rescanning_rx));

        // The dispatcher owns the remaining match/end senders; those queues
        // close once the pool and the rescanner have exited.
        let ctx = CommandContext {
            users: services.users.clone(),
            reports: services.reports.clone(),
            messenger: services.messenger.clone(),
            match_jobs: match_tx,
            end_jobs: end_tx,
        };
        let dispatcher = Arc::new(Dispatcher::new(ctx, default_handlers()));
        let pool = DispatchPool::spawn(config.dispatch_workers, dispatcher, dispatch_rx);

        let poller = UpdatePoller::new(services.source, services.cursor, dispatch_tx)
            .with_poll_interval(config.poll_interval())
            .with_batch_limit(config.update_batch_limit);
        let poller = tokio::spawn(poller.start(polling_rx));

        info!(
            "Bot runtime started: {} message workers, queue capacity {}",
            pool.len(),
            config.queue_capacity
        );

        Self {
            stop_polling,
            stop_rescanning,
            poller,
            pool,
            rescanner,
            matchmaker,
            teardown,
        }
    }

    /// Stop ingestion, drain dispatch, then drain matchmaking and teardown
    pub async fn shutdown(self) {
        info!("Stopping update poller...");
        let _ = self.stop_polling.send(true);
        log_join("Update poller", self.poller).await;

        // The poller held the only dispatch sender, so the queue is closed now
        info!("Draining message workers...");
        self.pool.join().await;

        info!("Stopping rescanner...");
        let _ = self.stop_rescanning.send(true);
        log_join("Rescanner", self.rescanner).await;

        info!("Draining matchmaker and teardown queues...");
        log_join("Matchmaker", self.matchmaker).await;
        log_join("Teardown worker", self.teardown).await;

        info!("Bot runtime stopped");
    }
}

async fn log_join(name: &str, handle: JoinHandle<()>) {
    if let Err(e) = handle.await {
        error!("{} task failed: {}", name, e);
    }
}
