//! Foundation module - Shared domain primitives.
//!
//! Identifiers, timestamps, money and the error vocabulary used by the
//! artisan, billing and marketplace modules.

mod auth;
mod errors;
mod ids;
mod money;
mod timestamp;

pub use auth::{AuthError, AuthenticatedUser};
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{ArtisanId, LeadId, SubscriptionId, UserId};
pub use money::Money;
pub use timestamp::Timestamp;
