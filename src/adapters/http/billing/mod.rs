//! HTTP adapter for billing: the Stripe webhook and artisan subscription
//! endpoints.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::BillingAppState;
pub use routes::billing_router;
