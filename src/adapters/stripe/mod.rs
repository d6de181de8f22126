//! Stripe payment provider adapters.
//!
//! `StripePaymentAdapter` talks to the Stripe REST API with the secret key
//! held in a `secrecy::SecretString`. `MockPaymentProvider` stands in for it
//! in tests. Webhook verification lives in the billing domain.

mod mock_payment_provider;
mod stripe_adapter;

pub use mock_payment_provider::{MethodCall, MockPaymentProvider};
pub use stripe_adapter::{StripeConfig, StripePaymentAdapter};
