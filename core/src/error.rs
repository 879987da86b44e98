//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Genesis timestamp {genesis} is in the future (now {now})")]
    GenesisInFuture { genesis: i64, now: i64 },

    #[error("Epoch length must be positive, got {0}")]
    InvalidEpochLength(i64),
}

pub type Result<T> = std::result::Result<T, CoreError>;
