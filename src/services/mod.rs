//! Long-running workers connected by bounded queues.

pub mod dispatcher;
pub mod jobs;
pub mod matchmaker;
pub mod poller;
pub mod rescanner;
pub mod teardown;

pub use dispatcher::{Dispatch, DispatchPool, Dispatcher};
pub use jobs::{EndConversationJob, MatchJob};
pub use matchmaker::{MatchOutcome, Matchmaker};
pub use poller::UpdatePoller;
pub use rescanner::AvailabilityRescanner;
pub use teardown::TeardownWorker;
