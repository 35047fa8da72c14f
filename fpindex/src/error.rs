use thiserror::Error;

/// Errors returned by index operations.
#[derive(Debug, Error)]
pub enum FpIndexError {
    #[error("hash count mismatch: expected {expected}, got {got}")]
    HashLengthMismatch { expected: usize, got: usize },
}
