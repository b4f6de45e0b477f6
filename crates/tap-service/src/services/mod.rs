//! Service layer.
//!
//! Business logic that sits between handlers and repositories, plus the
//! Telegram Bot API client.

pub mod creation_date;
pub mod ranking;
pub mod telegram_client;

pub use telegram_client::{ChatMembershipChecker, TelegramClient};
