//! Stripe payment provider adapter.
//!
//! Implements the `PaymentProvider` port against the Stripe REST API. Only
//! subscriptions are touched: reading one, and scheduling its cancellation at
//! period end.
//!
//! # Configuration
//!
//! ```ignore
//! let config = StripeConfig::new(api_key);
//! let adapter = StripePaymentAdapter::new(config)?;
//! ```

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::domain::artisan::SubscriptionStatus;
use crate::domain::billing::StripeSubscription;
use crate::domain::foundation::{SubscriptionId, ValidationError};
use crate::ports::{PaymentError, PaymentErrorCode, PaymentProvider, ProviderSubscription};

const DEFAULT_API_BASE_URL: &str = "https://api.stripe.com";

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Stripe secret API key (sk_live_... or sk_test_...).
    api_key: SecretString,

    /// Base URL for Stripe API (default: https://api.stripe.com).
    api_base_url: String,

    request_timeout: Duration,
}

impl StripeConfig {
    pub fn new(api_key: SecretString) -> Self {
        Self {
            api_key,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(10),
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Stripe's error envelope: `{"error": {"type": ..., "code": ..., "message": ...}}`.
#[derive(Debug, Deserialize)]
struct StripeErrorEnvelope {
    error: StripeApiError,
}

#[derive(Debug, Deserialize)]
struct StripeApiError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Stripe payment provider adapter.
pub struct StripePaymentAdapter {
    config: StripeConfig,
    http_client: reqwest::Client,
}

impl StripePaymentAdapter {
    pub fn new(config: StripeConfig) -> Result<Self, PaymentError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| PaymentError::new(PaymentErrorCode::ProviderError, e.to_string()))?;
        Ok(Self {
            config,
            http_client,
        })
    }

    fn subscription_url(&self, subscription_id: &SubscriptionId) -> String {
        format!(
            "{}/v1/subscriptions/{}",
            self.config.api_base_url,
            subscription_id.as_str()
        )
    }

    async fn read_subscription(
        response: reqwest::Response,
    ) -> Result<ProviderSubscription, PaymentError> {
        let stripe_sub: StripeSubscription = response.json().await.map_err(|e| {
            PaymentError::new(
                PaymentErrorCode::ProviderError,
                format!("Failed to parse Stripe response: {}", e),
            )
        })?;
        to_provider_subscription(stripe_sub)
    }

    async fn read_error(response: reqwest::Response) -> PaymentError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let error = error_from_response(status, &body);
        tracing::error!(
            status = status.as_u16(),
            code = %error.code,
            provider_code = ?error.provider_code,
            "Stripe API call failed"
        );
        error
    }
}

#[async_trait]
impl PaymentProvider for StripePaymentAdapter {
    async fn get_subscription(
        &self,
        subscription_id: &SubscriptionId,
    ) -> Result<Option<ProviderSubscription>, PaymentError> {
        let response = self
            .http_client
            .get(self.subscription_url(subscription_id))
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .send()
            .await
            .map_err(|e| PaymentError::network(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            return Err(Self::read_error(response).await);
        }

        Self::read_subscription(response).await.map(Some)
    }

    async fn cancel_at_period_end(
        &self,
        subscription_id: &SubscriptionId,
    ) -> Result<ProviderSubscription, PaymentError> {
        let response = self
            .http_client
            .post(self.subscription_url(subscription_id))
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .form(&[("cancel_at_period_end", "true")])
            .send()
            .await
            .map_err(|e| PaymentError::network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::read_error(response).await);
        }

        Self::read_subscription(response).await
    }
}

fn to_provider_subscription(sub: StripeSubscription) -> Result<ProviderSubscription, PaymentError> {
    let invalid = |e: ValidationError| {
        PaymentError::new(
            PaymentErrorCode::ProviderError,
            format!("Unexpected Stripe subscription: {}", e),
        )
    };

    let status: SubscriptionStatus = sub.status.parse().map_err(invalid)?;
    let unit_amount = sub.unit_amount();
    let current_period_end = sub.period_end();

    Ok(ProviderSubscription {
        id: SubscriptionId::new(sub.id).map_err(invalid)?,
        customer_id: sub.customer,
        status,
        unit_amount,
        current_period_end,
        cancel_at_period_end: sub.cancel_at_period_end,
    })
}

fn error_from_response(status: reqwest::StatusCode, body: &str) -> PaymentError {
    let parsed = serde_json::from_str::<StripeErrorEnvelope>(body).ok();
    let message = parsed
        .as_ref()
        .and_then(|e| e.error.message.clone())
        .unwrap_or_else(|| format!("Stripe API error ({})", status));

    let code = match status.as_u16() {
        401 | 403 => PaymentErrorCode::AuthenticationError,
        404 => PaymentErrorCode::NotFound,
        429 => PaymentErrorCode::RateLimited,
        400..=499 => PaymentErrorCode::InvalidRequest,
        _ => PaymentErrorCode::ProviderError,
    };

    let error = PaymentError::new(code, message);
    match parsed.and_then(|e| e.error.code) {
        Some(provider_code) => error.with_provider_code(provider_code),
        None => error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{Money, Timestamp};
    use serde_json::json;

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn config_new_sets_defaults() {
        let config = StripeConfig::new(SecretString::new("sk_test".to_string()));
        assert_eq!(config.api_base_url, "https://api.stripe.com");
    }

    #[test]
    fn config_with_base_url_trims_trailing_slash() {
        let config = StripeConfig::new(SecretString::new("sk_test".to_string()))
            .with_base_url("http://localhost:12111/");
        assert_eq!(config.api_base_url, "http://localhost:12111");
    }

    #[test]
    fn subscription_url_includes_id() {
        let adapter =
            StripePaymentAdapter::new(StripeConfig::new(SecretString::new("sk_test".to_string())))
                .unwrap();
        let url = adapter.subscription_url(&SubscriptionId::new("sub_123").unwrap());
        assert_eq!(url, "https://api.stripe.com/v1/subscriptions/sub_123");
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Response Mapping Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn maps_subscription_response() {
        let sub: StripeSubscription = serde_json::from_value(json!({
            "id": "sub_123",
            "customer": "cus_9",
            "status": "active",
            "cancel_at_period_end": true,
            "items": { "data": [ {
                "price": { "id": "price_1", "unit_amount": 19900 },
                "current_period_end": 1800000000
            } ] }
        }))
        .unwrap();

        let mapped = to_provider_subscription(sub).unwrap();

        assert_eq!(mapped.id.as_str(), "sub_123");
        assert_eq!(mapped.status, SubscriptionStatus::Active);
        assert_eq!(mapped.unit_amount, Money::from_cents(19_900));
        assert_eq!(mapped.current_period_end, Timestamp::from_unix_secs(1_800_000_000));
        assert!(mapped.cancel_at_period_end);
    }

    #[test]
    fn unknown_status_is_provider_error() {
        let sub: StripeSubscription = serde_json::from_value(json!({
            "id": "sub_123",
            "status": "mystery"
        }))
        .unwrap();

        let err = to_provider_subscription(sub).unwrap_err();
        assert_eq!(err.code, PaymentErrorCode::ProviderError);
    }

    #[test]
    fn error_body_code_and_message_are_kept() {
        let body = r#"{"error":{"type":"invalid_request_error","code":"resource_missing","message":"No such subscription: 'sub_x'"}}"#;

        let err = error_from_response(reqwest::StatusCode::BAD_REQUEST, body);

        assert_eq!(err.code, PaymentErrorCode::InvalidRequest);
        assert_eq!(err.provider_code.as_deref(), Some("resource_missing"));
        assert_eq!(err.message, "No such subscription: 'sub_x'");
    }

    #[test]
    fn status_codes_map_to_error_codes() {
        assert_eq!(
            error_from_response(reqwest::StatusCode::UNAUTHORIZED, "").code,
            PaymentErrorCode::AuthenticationError
        );
        assert_eq!(
            error_from_response(reqwest::StatusCode::TOO_MANY_REQUESTS, "").code,
            PaymentErrorCode::RateLimited
        );
        assert!(error_from_response(reqwest::StatusCode::BAD_GATEWAY, "not json").is_retryable());
    }
}
