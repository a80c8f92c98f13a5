use monitor::SourceError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StonfiError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("ston.fi response missing `{0}`")]
    MissingField(&'static str),

    #[error("invalid `{field}` in ston.fi response: {value}")]
    InvalidField { field: &'static str, value: String },
}

impl StonfiError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, StonfiError::Http(e) if e.is_timeout())
    }
}

impl From<StonfiError> for SourceError {
    fn from(err: StonfiError) -> Self {
        SourceError::Unavailable(err.to_string())
    }
}
