#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use stranger_bot::commands::{default_handlers, CommandContext};
use stranger_bot::error::TransportError;
use stranger_bot::models::User;
use stranger_bot::repositories::{MemoryStore, UserStore};
use stranger_bot::services::{
    Dispatch, Dispatcher, EndConversationJob, MatchJob, Matchmaker, TeardownWorker,
};
use stranger_bot::transport::types::{FileRef, PhotoSize};
use stranger_bot::transport::{Message, Messenger, Outgoing, Update, UpdateSource};
use tokio::sync::mpsc;

/// Messenger that records everything it is asked to deliver
#[derive(Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<(i64, Outgoing)>>,
    unreachable: Mutex<HashSet<i64>>,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every delivery to `chat_id` fail
    pub fn block(&self, chat_id: i64) {
        self.unreachable.lock().unwrap().insert(chat_id);
    }

    pub fn sent_to(&self, chat_id: i64) -> Vec<Outgoing> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(chat, _)| *chat == chat_id)
            .map(|(_, content)| content.clone())
            .collect()
    }

    pub fn texts_to(&self, chat_id: i64) -> Vec<String> {
        self.sent_to(chat_id)
            .into_iter()
            .filter_map(|content| match content {
                Outgoing::Text(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn received(&self, chat_id: i64, text: &str) -> bool {
        self.texts_to(chat_id).iter().any(|t| t == text)
    }

    pub fn total(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send(&self, chat_id: i64, content: &Outgoing) -> Result<(), TransportError> {
        if self.unreachable.lock().unwrap().contains(&chat_id) {
            return Err(TransportError::Api {
                code: 403,
                description: "Forbidden: bot was blocked by the user".to_string(),
            });
        }
        self.sent.lock().unwrap().push((chat_id, content.clone()));
        Ok(())
    }
}

/// Update source that behaves like getUpdates over a fixed retention window
#[derive(Default)]
pub struct ScriptedSource {
    updates: Mutex<Vec<Update>>,
    fail_next: Mutex<bool>,
    offsets: Mutex<Vec<i64>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, update: Update) {
        self.updates.lock().unwrap().push(update);
    }

    pub fn push_text(&self, update_id: i64, chat_id: i64, text: &str) {
        self.push(text_update(update_id, chat_id, text));
    }

    pub fn fail_next_fetch(&self) {
        *self.fail_next.lock().unwrap() = true;
    }

    /// Offsets passed to every fetch so far
    pub fn requested_offsets(&self) -> Vec<i64> {
        self.offsets.lock().unwrap().clone()
    }
}

#[async_trait]
impl UpdateSource for ScriptedSource {
    async fn fetch(&self, offset: i64, limit: u32) -> Result<Vec<Update>, TransportError> {
        self.offsets.lock().unwrap().push(offset);

        let mut fail = self.fail_next.lock().unwrap();
        if *fail {
            *fail = false;
            return Err(TransportError::Api {
                code: 502,
                description: "Bad Gateway".to_string(),
            });
        }

        Ok(self
            .updates
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.update_id >= offset)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

pub fn text_update(update_id: i64, chat_id: i64, text: &str) -> Update {
    Update {
        update_id,
        message: Some(Message::text_from(chat_id, text)),
    }
}

pub fn photo_message(chat_id: i64) -> Message {
    let mut message = Message::text_from(chat_id, "");
    message.text = None;
    message.photo = vec![
        PhotoSize {
            file_id: "photo-small".to_string(),
            width: 90,
            height: 90,
            file_size: Some(1_500),
        },
        PhotoSize {
            file_id: "photo-large".to_string(),
            width: 1280,
            height: 1280,
            file_size: Some(120_000),
        },
        PhotoSize {
            file_id: "photo-medium".to_string(),
            width: 320,
            height: 320,
            file_size: Some(18_000),
        },
    ];
    message
}

pub fn sticker_message(chat_id: i64) -> Message {
    let mut message = Message::text_from(chat_id, "");
    message.text = None;
    message.sticker = Some(FileRef {
        file_id: "sticker-1".to_string(),
    });
    message
}

/// Dispatcher, matchmaker and teardown worker over one in-memory store,
/// with the job queues exposed so tests decide when workers run.
pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub messenger: Arc<RecordingMessenger>,
    pub dispatcher: Dispatcher,
    pub matchmaker: Matchmaker,
    pub teardown: TeardownWorker,
    pub match_rx: mpsc::Receiver<MatchJob>,
    pub end_rx: mpsc::Receiver<EndConversationJob>,
}

impl Harness {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let messenger = Arc::new(RecordingMessenger::new());
        let (match_tx, match_rx) = mpsc::channel(100);
        let (end_tx, end_rx) = mpsc::channel(100);

        let ctx = CommandContext {
            users: store.clone(),
            reports: store.clone(),
            messenger: messenger.clone(),
            match_jobs: match_tx,
            end_jobs: end_tx,
        };

        Self {
            dispatcher: Dispatcher::new(ctx, default_handlers()),
            matchmaker: Matchmaker::new(store.clone(), messenger.clone()),
            teardown: TeardownWorker::new(store.clone(), messenger.clone()),
            store,
            messenger,
            match_rx,
            end_rx,
        }
    }

    pub async fn send_text(&self, chat_id: i64, text: &str) -> Dispatch {
        self.dispatcher
            .handle_message(&Message::text_from(chat_id, text))
            .await
    }

    pub async fn send(&self, message: Message) -> Dispatch {
        self.dispatcher.handle_message(&message).await
    }

    /// Run every queued match and teardown job
    pub async fn run_jobs(&mut self) {
        loop {
            let mut progressed = false;
            while let Ok(job) = self.match_rx.try_recv() {
                self.matchmaker.handle(job.chat_id).await;
                progressed = true;
            }
            while let Ok(job) = self.end_rx.try_recv() {
                self.teardown.handle(job.chat_id).await;
                progressed = true;
            }
            if !progressed {
                break;
            }
        }
    }

    /// Two users paired through /start and the matchmaker
    pub async fn matched_pair(&mut self, a: i64, b: i64) {
        self.send_text(a, "/start").await;
        self.send_text(b, "/start").await;
        self.run_jobs().await;

        let user_a = self.user(a).await;
        assert_eq!(user_a.match_chat_id, Some(b), "pair {} <-> {} did not match", a, b);
        self.messenger.clear();
    }

    pub async fn user(&self, chat_id: i64) -> User {
        self.store
            .find_by_chat_id(chat_id)
            .await
            .expect("store read failed")
            .expect("user should exist")
    }
}

/// Poll `check` until it returns true or the deadline passes
pub async fn eventually<F, Fut>(timeout: Duration, mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if check().await {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Assert the symmetry invariant over a set of chats
pub async fn assert_symmetric(store: &MemoryStore, chats: &[i64]) {
    for &chat in chats {
        let user = store.user(chat).await.expect("user should exist");
        if let Some(partner) = user.match_chat_id {
            assert_ne!(partner, chat, "chat {} matched with itself", chat);
            let other = store.user(partner).await.expect("partner should exist");
            assert_eq!(
                other.match_chat_id,
                Some(chat),
                "chat {} points at {} but not the other way round",
                chat,
                partner
            );
        }
    }
}
