//! Concrete sources and sinks for the pool monitor.

pub mod fanout;
pub mod log_sink;
pub mod static_source;
pub mod stonfi;
pub mod telegram;

pub use fanout::FanoutSink;
pub use log_sink::LogSink;
pub use static_source::StaticSource;
pub use stonfi::{StonfiClient, StonfiError, StonfiPoolSource};
pub use telegram::{TelegramConfig, TelegramError, TelegramSink};
