use monitor::DeliveryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TelegramError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("telegram rejected message ({status}): {description}")]
    Api { status: u16, description: String },

    #[error("telegram not configured: {0}")]
    NotConfigured(&'static str),
}

impl From<TelegramError> for DeliveryError {
    fn from(err: TelegramError) -> Self {
        DeliveryError::Failed(err.to_string())
    }
}
