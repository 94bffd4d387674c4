//! Venue error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VenueError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Response decode error: {0}")]
    Decode(String),

    #[error("Indexer still behind sequence {target} after {attempts} attempts")]
    StaleIndex { target: u64, attempts: u32 },
}

pub type VenueResult<T> = Result<T, VenueError>;
