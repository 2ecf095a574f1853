//! Cache error types.
//!
//! None of these ever reach a client: the accessor falls through to the
//! database and the trigger logs and keeps sweeping.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache store unavailable during `{op}`: {message}")]
    Unavailable { op: &'static str, message: String },

    #[error("cache payload (de)serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalidation left {failed} of {total} keys behind")]
    InvalidationPartialFailure { failed: usize, total: usize },
}

impl CacheError {
    pub fn unavailable(op: &'static str, message: impl Into<String>) -> Self {
        Self::Unavailable {
            op,
            message: message.into(),
        }
    }
}
