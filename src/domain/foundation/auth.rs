//! Authentication types for the domain layer.
//!
//! An `AuthenticatedUser` is what remains of a verified identity token once
//! the adapter behind the `SessionValidator` port has checked it. Nothing in
//! here knows about Firebase or JWTs.

use super::UserId;
use thiserror::Error;

/// Caller identity extracted from a validated identity token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// Identity-provider user id; artisans are looked up by this value.
    pub id: UserId,

    pub email: Option<String>,

    pub email_verified: bool,
}

impl AuthenticatedUser {
    pub fn new(id: UserId, email: Option<String>, email_verified: bool) -> Self {
        Self {
            id,
            email,
            email_verified,
        }
    }
}

/// Authentication errors that can occur during token validation.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// The token is missing, malformed, or has an invalid signature.
    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    /// Signing keys could not be fetched or the provider is misconfigured.
    #[error("Auth service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AuthError {
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable(message.into())
    }

    /// Returns true if this is a transient error that may succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, AuthError::ServiceUnavailable(_))
    }
}
