//! Cart manager errors.

use solecart::{cart::CartError, checkout::OrderError};
use thiserror::Error;

use crate::services::ServiceError;

/// Shown when the service gave no reason for a failed checkout.
pub const CHECKOUT_FAILED: &str = "Failed to process order. Please try again.";

/// Errors from local cart operations.
#[derive(Debug, Error, PartialEq)]
pub enum CartManagerError {
    /// The cart has not been restored from storage yet.
    #[error("cart is not ready")]
    NotReady,

    #[error(transparent)]
    Cart(#[from] CartError),
}

/// Errors from [`checkout`](crate::carts::CartStateManager::checkout).
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("you must be logged in to checkout")]
    AuthenticationRequired,

    #[error("cart is not ready")]
    NotReady,

    /// The order could not be built from the cart.
    #[error(transparent)]
    Validation(#[from] OrderError),

    #[error("checkout failed: {0}")]
    RemoteUnavailable(ServiceError),

    #[error("checkout failed: {0}")]
    MalformedResponse(ServiceError),
}

impl From<ServiceError> for CheckoutError {
    fn from(error: ServiceError) -> Self {
        match error {
            ServiceError::MalformedResponse { .. } => CheckoutError::MalformedResponse(error),
            ServiceError::Http(_) | ServiceError::Status { .. } => {
                CheckoutError::RemoteUnavailable(error)
            }
        }
    }
}

impl CheckoutError {
    /// Message suitable for showing to the shopper.
    pub fn user_message(&self) -> String {
        match self {
            CheckoutError::RemoteUnavailable(error) | CheckoutError::MalformedResponse(error) => {
                error.user_message().unwrap_or(CHECKOUT_FAILED).to_string()
            }
            CheckoutError::AuthenticationRequired
            | CheckoutError::NotReady
            | CheckoutError::Validation(_) => self.to_string(),
        }
    }
}

/// Errors from pushing the local cart to the cart service.
#[derive(Debug, Error)]
pub enum CartSyncError {
    #[error("you must be logged in to sync your cart")]
    AuthenticationRequired,

    #[error("cart is not ready")]
    NotReady,

    #[error(transparent)]
    Remote(#[from] ServiceError),
}
