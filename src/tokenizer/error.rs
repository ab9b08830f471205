//! Tokenizer error types.

use thiserror::Error;

/// Tokenizer errors
#[derive(Debug, Error)]
pub enum TokenizerError {
    #[error("vocabulary not trained")]
    NotTrained,

    #[error("sentinel token {0:?} is missing from the vocabulary")]
    MissingSentinel(String),

    #[error("invalid token id: {0}")]
    InvalidTokenId(u32),

    #[error("pad_batch called with an empty batch")]
    EmptyBatch,

    #[error("decoded bytes are not valid UTF-8: {0}")]
    InvalidUtf8(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type for tokenizer operations
pub type Result<T> = std::result::Result<T, TokenizerError>;
