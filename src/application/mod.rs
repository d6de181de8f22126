//! Application layer - Commands, Queries, and Handlers.
//!
//! Handlers orchestrate domain logic over ports. Each one is constructed once
//! at startup with its collaborators and shared behind an `Arc`.

pub mod handlers;

pub use handlers::{
    // Billing
    CancelSubscriptionCommand, CancelSubscriptionHandler, CancelSubscriptionResult,
    GetSubscriptionHandler, GetSubscriptionQuery, GetSubscriptionResult,
    HandleBillingWebhookCommand, HandleBillingWebhookHandler, HandleBillingWebhookResult,
    SubscriptionStatePersister,
    // Marketplace
    ListLeadsHandler, ListLeadsQuery, ListLeadsResult, PurchaseLeadCommand, PurchaseLeadHandler,
    PurchaseLeadResult,
};
