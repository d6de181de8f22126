//! Payment configuration (Stripe)

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Stripe secret key (`sk_live_...` or `sk_test_...`).
    pub stripe_api_key: SecretString,

    /// Webhook endpoint signing secret (`whsec_...`).
    pub stripe_webhook_secret: SecretString,

    /// Overrides `https://api.stripe.com` (stripe-mock, tests).
    pub stripe_api_base_url: Option<String>,

    #[serde(default = "default_stripe_timeout")]
    pub stripe_timeout_secs: u64,
}

impl PaymentConfig {
    pub fn is_test_mode(&self) -> bool {
        self.stripe_api_key.expose_secret().starts_with("sk_test_")
    }

    pub fn is_live_mode(&self) -> bool {
        self.stripe_api_key.expose_secret().starts_with("sk_live_")
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let api_key = self.stripe_api_key.expose_secret();
        let webhook_secret = self.stripe_webhook_secret.expose_secret();

        if api_key.is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__STRIPE_API_KEY"));
        }
        if webhook_secret.is_empty() {
            return Err(ValidationError::MissingRequired(
                "PAYMENT__STRIPE_WEBHOOK_SECRET",
            ));
        }
        if !api_key.starts_with("sk_") && !api_key.starts_with("rk_") {
            return Err(ValidationError::InvalidStripeKey);
        }
        if !webhook_secret.starts_with("whsec_") {
            return Err(ValidationError::InvalidStripeWebhookSecret);
        }
        if self.stripe_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }

        Ok(())
    }
}

fn default_stripe_timeout() -> u64 {
    10
}
