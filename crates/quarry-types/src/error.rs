use thiserror::Error;

/// Errors produced by identifier parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid digest length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}
