// src/error.rs

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Failures that abort a run before or during processing.
///
/// Per-frame localization misses are NOT errors — they are empty results.
/// Only sequence-level invariant violations and bad configuration abort,
/// because every downstream stage assumes validated, time-ordered input.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl AnalysisError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}
