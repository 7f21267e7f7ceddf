//! Session errors.

use thiserror::Error;

use crate::{services::ServiceError, storage::StoreError};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("failed to persist session: {0}")]
    Store(#[from] StoreError),

    #[error("failed to encode user profile: {0}")]
    Encode(#[from] serde_json::Error),

    /// The auth service accepted the credentials but sent no token.
    #[error("auth service did not issue a token")]
    MissingToken,

    /// The auth service sent a profile without an id to file carts under.
    #[error("auth service did not identify the user")]
    MissingUserId,

    #[error("session lock poisoned")]
    Poisoned,
}
