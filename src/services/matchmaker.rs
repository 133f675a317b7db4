use rand::seq::SliceRandom;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::models::User;
use crate::notices;
use crate::repositories::{MatchCommit, UserStore};
use crate::services::jobs::MatchJob;
use crate::transport::Messenger;

/// What happened to a single match job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    Matched { partner_chat_id: i64 },
    /// Already matched or idle by the time the job ran
    NotSearching,
    /// Nobody else is searching; the rescanner will retry later
    NoCandidates,
    /// A store read failed and the job was dropped
    Failed,
}

/// Pairs searching users. Runs as a single consumer of the match queue.
pub struct Matchmaker {
    users: Arc<dyn UserStore>,
    messenger: Arc<dyn Messenger>,
}

impl Matchmaker {
    pub fn new(users: Arc<dyn UserStore>, messenger: Arc<dyn Messenger>) -> Self {
        Self { users, messenger }
    }

    /// Consume match jobs until every sender is gone
    pub async fn run(self, mut jobs: mpsc::Receiver<MatchJob>) {
        info!("Matchmaker started");

        while let Some(job) = jobs.recv().await {
            self.handle(job.chat_id).await;
        }

        info!("Matchmaker stopped");
    }

    pub async fn handle(&self, chat_id: i64) -> MatchOutcome {
        let user = match self.users.find_by_chat_id(chat_id).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                warn!("Match job for unknown chat {}", chat_id);
                return MatchOutcome::Failed;
            }
            Err(e) => {
                error!("Error in matcher: {}", e);
                return MatchOutcome::Failed;
            }
        };

        if !user.is_searching() {
            debug!("Chat {} already assigned", chat_id);
            return MatchOutcome::NotSearching;
        }

        let mut candidates = match self.users.find_searching_except(chat_id).await {
            Ok(candidates) => candidates,
            Err(e) => {
                error!("Error retrieving available users: {}", e);
                return MatchOutcome::Failed;
            }
        };

        // Uniform choice: shuffle, then take the first candidate still searching at commit time
        candidates.retain(|c| c.chat_id != chat_id);
        {
            let mut rng = rand::rng();
            candidates.shuffle(&mut rng);
        }

        for candidate in &candidates {
            match self.users.commit_match(chat_id, candidate.chat_id).await {
                Ok(MatchCommit::Committed) => {
                    self.announce(&user, candidate).await;
                    return MatchOutcome::Matched {
                        partner_chat_id: candidate.chat_id,
                    };
                }
                Ok(MatchCommit::PartnerUnavailable) => {
                    debug!("Candidate {} was taken, trying the next one", candidate.chat_id);
                }
                Ok(MatchCommit::RequesterUnavailable) => {
                    debug!("Chat {} stopped searching before the commit", chat_id);
                    return MatchOutcome::NotSearching;
                }
                Err(e) => {
                    error!("Failed to commit match {} <-> {}: {}", chat_id, candidate.chat_id, e);
                    return MatchOutcome::Failed;
                }
            }
        }

        MatchOutcome::NoCandidates
    }

    async fn announce(&self, user: &User, partner: &User) {
        info!("Matched chat {} with chat {}", user.chat_id, partner.chat_id);
        self.messenger.notify(partner.chat_id, notices::MATCHED).await;
        self.messenger.notify(user.chat_id, notices::MATCHED).await;
    }
}
