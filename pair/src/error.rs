//! Infrastructure errors of the service
//!
//! Contract failures are `Revert`s and travel inside receipts; the errors
//! here concern the executor, its storage and the configuration.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("codec error: {0}")]
    Codec(#[from] bincode::Error),
    #[error("journal index {got} does not follow {expected}")]
    OutOfOrder { expected: u64, got: u64 },
    #[error("executor is not running")]
    ExecutorStopped,
    #[error("unexpected executor reply: {0}")]
    UnexpectedReply(String),
    #[error("invalid config: {0}")]
    Config(String),
    #[error("http error: {0}")]
    Http(#[from] hyper::Error),
}
