//! HTTP handlers for billing endpoints.
//!
//! These handlers connect Axum routes to the billing command/query handlers.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Json, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::adapters::http::middleware::RequireAuth;
use crate::application::handlers::billing::{
    CancelSubscriptionCommand, CancelSubscriptionHandler, GetSubscriptionHandler,
    GetSubscriptionQuery, HandleBillingWebhookCommand, HandleBillingWebhookHandler,
    HandleBillingWebhookResult,
};
use crate::domain::billing::BillingError;

use super::dto::{CancelSubscriptionResponse, ErrorResponse, SubscriptionResponse};

const STRIPE_SIGNATURE_HEADER: &str = "Stripe-Signature";

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Billing handlers, built once at startup.
#[derive(Clone)]
pub struct BillingAppState {
    pub webhook_handler: Arc<HandleBillingWebhookHandler>,
    pub cancel_handler: Arc<CancelSubscriptionHandler>,
    pub subscription_handler: Arc<GetSubscriptionHandler>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Webhook
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/webhooks/stripe - Apply a Stripe event to the artisan record
///
/// The body is taken as raw bytes: the signature covers the exact payload.
/// Responds `200 OK` on success and for orphaned or ignored events; errors
/// come back as plain text with 400 (terminal) or 500 (Stripe retries).
pub async fn handle_stripe_webhook(
    State(state): State<BillingAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = headers
        .get(STRIPE_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let cmd = HandleBillingWebhookCommand {
        payload: body.to_vec(),
        signature,
    };

    match state.webhook_handler.handle(cmd).await {
        Ok(result) => {
            if let HandleBillingWebhookResult::Orphaned { subscription_id } = &result {
                tracing::info!(%subscription_id, "Acknowledged orphaned webhook");
            }
            (StatusCode::OK, "OK").into_response()
        }
        Err(e) => {
            if e.is_retryable() {
                tracing::error!(error = %e, "Webhook processing failed");
            } else {
                tracing::warn!(error = %e, "Webhook rejected");
            }
            (e.status_code(), e.to_string()).into_response()
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Artisan Endpoints
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/artisans/me/subscription - Current plan and subscription summary
pub async fn get_subscription(
    State(state): State<BillingAppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, BillingApiError> {
    let query = GetSubscriptionQuery { user_id: user.id };

    let result = state.subscription_handler.handle(query).await?;

    Ok(Json(SubscriptionResponse::from(result)))
}

/// POST /api/artisans/me/subscription/cancel - Cancel at period end
pub async fn cancel_subscription(
    State(state): State<BillingAppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, BillingApiError> {
    let cmd = CancelSubscriptionCommand { user_id: user.id };

    let result = state.cancel_handler.handle(cmd).await?;

    Ok(Json(CancelSubscriptionResponse::from(result)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts billing errors to HTTP responses.
#[derive(Debug)]
pub struct BillingApiError(BillingError);

impl From<BillingError> for BillingApiError {
    fn from(err: BillingError) -> Self {
        Self(err)
    }
}

impl IntoResponse for BillingApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            BillingError::ArtisanNotFoundForUser(_) => StatusCode::NOT_FOUND,
            BillingError::NoActiveSubscription | BillingError::AlreadyCanceled => {
                StatusCode::BAD_REQUEST
            }
            BillingError::PaymentProvider(msg) | BillingError::Infrastructure(msg) => {
                tracing::error!(error = %msg, "Billing request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = ErrorResponse::new(self.0.code().to_string(), self.0.message());
        (status, Json(body)).into_response()
    }
}
