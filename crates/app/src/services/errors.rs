//! Remote service errors.

use thiserror::Error;

/// Errors that can occur when calling one of the storefront services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// An HTTP transport error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-2xx status.
    #[error("{service} returned {status}: {}", .message.as_deref().unwrap_or("no details"))]
    Status {
        service: &'static str,
        status: u16,
        message: Option<String>,
    },

    /// The service answered, but not with the data that was asked for.
    #[error("malformed response from {service}: {reason}")]
    MalformedResponse {
        service: &'static str,
        reason: String,
    },
}

impl ServiceError {
    pub(crate) fn malformed(service: &'static str, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            service,
            reason: reason.into(),
        }
    }

    /// The message a person should see for this error, if the service sent one.
    pub fn user_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } => message.as_deref(),
            Self::Http(_) | Self::MalformedResponse { .. } => None,
        }
    }
}
