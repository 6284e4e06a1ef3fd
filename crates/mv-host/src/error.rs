//! Host-delegation error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("host peer disconnected")]
    Disconnected,

    #[error("frame encoding error: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("unreadable frame: {0}")]
    Unreadable(String),
}

pub type HostResult<T> = Result<T, HostError>;
