use std::io;
use thiserror::Error;

/// Failure kinds of the header chain core. The verification variants are
/// recoverable by the caller via retry/backoff; `StoreIo` is fatal for the
/// operation that hit it.
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("malformed header bytes")]
    MalformedHeader,
    #[error("prev hash mismatch")]
    LinkageMismatch,
    #[error("bits mismatch")]
    DifficultyMismatch,
    #[error("insufficient proof of work")]
    InsufficientWork,
    #[error("retarget policy not implemented")]
    UnimplementedPolicy,
    #[error("header store i/o failed: {0}")]
    StoreIo(#[from] io::Error),
    #[error("headers bootstrap failed: {0}")]
    BootstrapFailed(String),
}
