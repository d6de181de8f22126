//! Billing handlers.
//!
//! ## Commands
//! - Applying Stripe webhook events to artisan records
//! - Self-service cancellation at period end
//!
//! ## Queries
//! - Current subscription summary

mod cancel_subscription;
mod dual_write;
mod get_subscription;
mod handle_billing_webhook;

pub use cancel_subscription::{
    CancelSubscriptionCommand, CancelSubscriptionHandler, CancelSubscriptionResult,
};
pub use dual_write::SubscriptionStatePersister;
pub use get_subscription::{GetSubscriptionHandler, GetSubscriptionQuery, GetSubscriptionResult};
pub use handle_billing_webhook::{
    HandleBillingWebhookCommand, HandleBillingWebhookHandler, HandleBillingWebhookResult,
};
