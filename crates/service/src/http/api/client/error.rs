use url::Url;

use crate::http::api::error::ErrorKind;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
    #[error("relay URL cannot be used as a base: {0}")]
    InvalidBase(Url),
    #[error("relay error ({kind}): {message}")]
    Relay { kind: ErrorKind, message: String },
    #[error("relay returned an invalid payload: {0}")]
    InvalidPayload(String),
}

impl ApiError {
    /// The relay's classification of the failure, if the relay answered at all
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            ApiError::Relay { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}
