//! Payment provider port.
//!
//! The subscription sync only needs two calls from Stripe: reading a
//! subscription (to refresh the period end after a payment) and scheduling a
//! cancellation at period end.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::artisan::SubscriptionStatus;
use crate::domain::foundation::{DomainError, ErrorCode, Money, SubscriptionId, Timestamp};

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Fetches a subscription. `Ok(None)` when the provider does not know it.
    async fn get_subscription(
        &self,
        subscription_id: &SubscriptionId,
    ) -> Result<Option<ProviderSubscription>, PaymentError>;

    /// Schedules the subscription to end when the paid period ends.
    ///
    /// Access continues until then; Stripe sends
    /// `customer.subscription.deleted` at that point.
    async fn cancel_at_period_end(
        &self,
        subscription_id: &SubscriptionId,
    ) -> Result<ProviderSubscription, PaymentError>;
}

/// Subscription as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSubscription {
    pub id: SubscriptionId,
    pub customer_id: Option<String>,
    pub status: SubscriptionStatus,
    pub unit_amount: Money,
    pub current_period_end: Option<Timestamp>,
    pub cancel_at_period_end: bool,
}

/// Errors from payment provider operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentError {
    pub code: PaymentErrorCode,

    pub message: String,

    /// Provider's own error code (`resource_missing`, ...), when given.
    pub provider_code: Option<String>,
}

impl PaymentError {
    pub fn new(code: PaymentErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider_code: None,
        }
    }

    pub fn with_provider_code(mut self, code: impl Into<String>) -> Self {
        self.provider_code = Some(code.into());
        self
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::NetworkError, message)
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::AuthenticationError, message)
    }

    pub fn not_found(resource: &str) -> Self {
        Self::new(PaymentErrorCode::NotFound, format!("{} not found", resource))
    }

    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}

impl std::fmt::Display for PaymentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for PaymentError {}

impl From<PaymentError> for DomainError {
    fn from(err: PaymentError) -> Self {
        DomainError::new(ErrorCode::PaymentProviderError, err.message)
            .with_detail("payment_error_code", err.code.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentErrorCode {
    NetworkError,
    AuthenticationError,
    InvalidRequest,
    NotFound,
    RateLimited,
    ProviderError,
}

impl PaymentErrorCode {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PaymentErrorCode::NetworkError
                | PaymentErrorCode::RateLimited
                | PaymentErrorCode::ProviderError
        )
    }
}

impl std::fmt::Display for PaymentErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PaymentErrorCode::NetworkError => "network_error",
            PaymentErrorCode::AuthenticationError => "authentication_error",
            PaymentErrorCode::InvalidRequest => "invalid_request",
            PaymentErrorCode::NotFound => "not_found",
            PaymentErrorCode::RateLimited => "rate_limited",
            PaymentErrorCode::ProviderError => "provider_error",
        };
        write!(f, "{}", s)
    }
}
