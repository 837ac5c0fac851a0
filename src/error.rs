//! Error types for an ingestion session.
//!
//! Only fatal conditions live here. A line that fails to parse is not an
//! error: the aggregator drops it and moves on.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Reading the body failed part way through.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The request could not be sent or the body could not be obtained.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("Request failed with status {0}")]
    Status(u16),

    /// The worker thread could not be reached or died mid-session.
    #[error("Worker error: {0}")]
    Isolation(String),

    /// A session on the worker failed; carries the worker's own message.
    #[error("{0}")]
    Remote(String),

    /// A session is already running for this indicator.
    #[error("Processing is already in progress")]
    Busy,

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => Error::Status(status.as_u16()),
            None => Error::Transport(err.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
