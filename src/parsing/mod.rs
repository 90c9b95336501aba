//! Parsing helpers for on-disk Telegram data.
//!
//! Used by the snapshot collaborator to turn Telegram Desktop export records
//! into [`Message`](crate::message::Message) values.

pub mod telegram;

pub use telegram::{TelegramRawMessage, extract_telegram_text, parse_telegram_message};
