//! Long-poll errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LongPollError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("decode error: {0}")]
    Decode(String),
}

pub type LongPollResult<T> = Result<T, LongPollError>;
