//! Error types for jobqueue.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The lifecycle token was cancelled or the dispatcher has exited.
    #[error("queue stopped")]
    QueueStopped,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
