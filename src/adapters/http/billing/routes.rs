//! Axum router configuration for billing endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    cancel_subscription, get_subscription, handle_stripe_webhook, BillingAppState,
};

/// Artisan self-service routes (require authentication).
///
/// - `GET /artisans/me/subscription` - Current plan and subscription
/// - `POST /artisans/me/subscription/cancel` - Cancel at period end
pub fn artisan_billing_routes() -> Router<BillingAppState> {
    Router::new()
        .route("/artisans/me/subscription", get(get_subscription))
        .route("/artisans/me/subscription/cancel", post(cancel_subscription))
}

/// Stripe webhook routes.
///
/// No user authentication: requests are verified by signature.
///
/// - `POST /webhooks/stripe`
pub fn webhook_routes() -> Router<BillingAppState> {
    Router::new().route("/webhooks/stripe", post(handle_stripe_webhook))
}

/// All billing routes, meant to be nested under `/api`.
pub fn billing_router() -> Router<BillingAppState> {
    Router::new()
        .merge(artisan_billing_routes())
        .merge(webhook_routes())
}
