//! Billing domain module.
//!
//! Stripe subscription synchronization: webhook verification, event parsing,
//! the pure state reducer and the mirrored subscription record.

mod errors;
pub mod reducer;
mod stripe_event;
mod subscription_record;
mod webhook_errors;
mod webhook_verifier;

pub use errors::BillingError;
pub use reducer::SubscriptionSnapshot;
pub use stripe_event::{
    StripeEvent, StripeEventData, StripeEventType, StripeInvoice, StripeList, StripePrice,
    StripeSubscription, StripeSubscriptionItem,
};
#[cfg(test)]
pub use stripe_event::StripeEventBuilder;
pub use subscription_record::SubscriptionRecord;
pub use webhook_errors::WebhookError;
pub use webhook_verifier::{sign_payload, SignatureHeader, StripeWebhookVerifier};
