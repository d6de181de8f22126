//! Webhook error types.
//!
//! Stripe retries any non-2xx delivery, so the status code chosen here
//! decides whether a failure is terminal (4xx) or retried (5xx).

use axum::http::StatusCode;
use thiserror::Error;

use crate::domain::foundation::DomainError;

/// Errors that occur while receiving and applying a Stripe webhook.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("Missing Stripe-Signature header")]
    MissingSignature,

    #[error("Invalid signature")]
    InvalidSignature,

    /// Older than the replay window (5 minutes).
    #[error("Timestamp out of range")]
    TimestampOutOfRange,

    /// Further in the future than the clock skew tolerance.
    #[error("Invalid timestamp")]
    InvalidTimestamp,

    /// Header or payload could not be parsed.
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// A repository call failed while applying the event.
    #[error("Database error: {0}")]
    Database(String),

    /// A Stripe API call made while applying the event failed.
    #[error("Payment provider error: {0}")]
    Provider(String),

    #[error("Webhook misconfigured: {0}")]
    Configuration(String),
}

impl WebhookError {
    /// Returns true if Stripe should redeliver the event.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            WebhookError::Database(_) | WebhookError::Provider(_) | WebhookError::Configuration(_)
        )
    }

    /// Maps the error to the response status sent back to Stripe.
    ///
    /// Verification and parse failures are terminal (400); failures while
    /// applying a verified event are 500 so Stripe retries.
    pub fn status_code(&self) -> StatusCode {
        if self.is_retryable() {
            StatusCode::INTERNAL_SERVER_ERROR
        } else {
            StatusCode::BAD_REQUEST
        }
    }
}

impl From<DomainError> for WebhookError {
    fn from(err: DomainError) -> Self {
        WebhookError::Database(err.to_string())
    }
}
