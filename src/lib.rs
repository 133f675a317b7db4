//! StrangerBot library
//!
//! Pairs anonymous Telegram users into one-to-one conversations and relays
//! messages between them. The binary wires these components to PostgreSQL
//! and the Bot API; tests run them against in-memory collaborators.

pub mod commands;
pub mod config;
pub mod conversation;
pub mod database;
pub mod error;
pub mod models;
pub mod notices;
pub mod repositories;
pub mod runtime;
pub mod services;
pub mod transport;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use runtime::{BotRuntime, Services};
