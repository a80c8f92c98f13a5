pub mod client;
pub mod errors;
pub mod source;
pub mod types;

pub use client::StonfiClient;
pub use errors::StonfiError;
pub use source::StonfiPoolSource;
pub use types::*;
