//! Storage errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid storage key {0:?}")]
    InvalidKey(String),

    #[error("storage I/O error")]
    Io(#[from] std::io::Error),

    #[error("storage lock poisoned")]
    Poisoned,
}
