//! Identity-token validation port.
//!
//! HTTP middleware hands the raw Bearer token to this port and gets back the
//! caller's identity. Implementations must check signature, issuer, audience
//! and expiry before returning a user.

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser};

#[async_trait]
pub trait SessionValidator: Send + Sync {
    /// Validates a token (without the `Bearer ` prefix).
    ///
    /// # Returns
    ///
    /// * `Err(AuthError::InvalidToken)` - malformed token or bad signature
    /// * `Err(AuthError::TokenExpired)` - valid signature, expired
    /// * `Err(AuthError::ServiceUnavailable)` - signing keys unreachable
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError>;
}
