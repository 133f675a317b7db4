//! Domain models for the bot.
//!
//! Both models map one-to-one onto their PostgreSQL tables.

pub mod report;
pub mod user;

// Re-export all models for convenient access
pub use report::Report;
pub use user::User;
