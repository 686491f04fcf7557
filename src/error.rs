use thiserror::Error;

pub use anyhow::Context;

pub type Result<T> = std::result::Result<T, AppError>;

/// Failure kinds surfaced by the quote service client and the submit guard.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("quote service unreachable: {0}")]
    Transport(String),
    #[error("quote service error: {0}")]
    Service(String),
    #[error("symbol `{0}` is not known to the quote service")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
}

impl FetchError {
    pub fn transport<T: Into<String>>(msg: T) -> Self {
        FetchError::Transport(msg.into())
    }

    pub fn service<T: Into<String>>(msg: T) -> Self {
        FetchError::Service(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        FetchError::Validation(msg.into())
    }

    /// Map a reqwest failure onto the transport/service split.
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Transport(format!("request timed out: {err}"))
        } else if err.is_connect() || err.is_request() || err.is_builder() {
            FetchError::Transport(err.to_string())
        } else if let Some(status) = err.status() {
            FetchError::Service(format!("unexpected status {status}"))
        } else {
            FetchError::Service(err.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    pub fn message<T: Into<String>>(msg: T) -> Self {
        AppError::Message(msg.into())
    }
}
