//! Telegram bot delivery.

pub mod errors;
pub mod format;
pub mod sink;

pub use errors::TelegramError;
pub use sink::{TelegramConfig, TelegramSink};
