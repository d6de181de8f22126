//! Errors surfaced by the self-service billing endpoints.
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | ArtisanNotFoundForUser | 404 |
//! | NoActiveSubscription | 400 |
//! | AlreadyCanceled | 400 |
//! | PaymentProvider | 500 |
//! | Infrastructure | 500 |

use crate::domain::foundation::{DomainError, ErrorCode, UserId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillingError {
    /// The caller owns no artisan record.
    ArtisanNotFoundForUser(UserId),

    /// No Stripe subscription is linked to the artisan.
    NoActiveSubscription,

    AlreadyCanceled,

    /// Stripe rejected or failed the API call.
    PaymentProvider(String),

    Infrastructure(String),
}

impl BillingError {
    pub fn artisan_not_found(user_id: UserId) -> Self {
        BillingError::ArtisanNotFoundForUser(user_id)
    }

    pub fn payment_provider(message: impl Into<String>) -> Self {
        BillingError::PaymentProvider(message.into())
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        BillingError::Infrastructure(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            BillingError::ArtisanNotFoundForUser(_) => ErrorCode::ArtisanNotFound,
            BillingError::NoActiveSubscription => ErrorCode::NoActiveSubscription,
            BillingError::AlreadyCanceled => ErrorCode::AlreadyCanceled,
            BillingError::PaymentProvider(_) => ErrorCode::PaymentProviderError,
            BillingError::Infrastructure(_) => ErrorCode::InternalError,
        }
    }

    /// User-facing message returned in the JSON error body.
    pub fn message(&self) -> String {
        match self {
            BillingError::ArtisanNotFoundForUser(_) => "Artisan not found".to_string(),
            BillingError::NoActiveSubscription => "No active subscription found".to_string(),
            BillingError::AlreadyCanceled => "Subscription is already canceled".to_string(),
            BillingError::PaymentProvider(msg) => format!("Billing provider error: {}", msg),
            BillingError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }
}

impl std::fmt::Display for BillingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for BillingError {}

impl From<DomainError> for BillingError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::NoActiveSubscription => BillingError::NoActiveSubscription,
            ErrorCode::AlreadyCanceled => BillingError::AlreadyCanceled,
            ErrorCode::PaymentProviderError => BillingError::PaymentProvider(err.message),
            _ => BillingError::Infrastructure(err.to_string()),
        }
    }
}

impl From<BillingError> for DomainError {
    fn from(err: BillingError) -> Self {
        DomainError::new(err.code(), err.message())
    }
}
