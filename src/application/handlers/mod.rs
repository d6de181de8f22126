//! Application handlers.

pub mod billing;
pub mod marketplace;

pub use billing::{
    CancelSubscriptionCommand, CancelSubscriptionHandler, CancelSubscriptionResult,
    GetSubscriptionHandler, GetSubscriptionQuery, GetSubscriptionResult,
    HandleBillingWebhookCommand, HandleBillingWebhookHandler, HandleBillingWebhookResult,
    SubscriptionStatePersister,
};
pub use marketplace::{
    ListLeadsHandler, ListLeadsQuery, ListLeadsResult, PurchaseLeadCommand, PurchaseLeadHandler,
    PurchaseLeadResult,
};
