//! Top-level API router.
//!
//! ```text
//! GET  /health
//! POST /api/webhooks/stripe
//! GET  /api/artisans/me/subscription
//! POST /api/artisans/me/subscription/cancel
//! GET  /api/marketplace/leads
//! POST /api/marketplace/leads/:id/purchase
//! ```
//!
//! Cross-cutting layers (tracing, CORS, timeout) are added by the binary so
//! tests can drive the bare router.

use axum::{middleware, routing::get, Json, Router};
use serde::Serialize;

use super::billing::{billing_router, BillingAppState};
use super::marketplace::{marketplace_router, MarketplaceAppState};
use super::middleware::{auth_middleware, AuthState};

/// Everything the HTTP layer needs, wired once at startup.
#[derive(Clone)]
pub struct ApiState {
    pub billing: BillingAppState,
    pub marketplace: MarketplaceAppState,
    pub session_validator: AuthState,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// GET /health - Liveness probe
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn build_router(state: ApiState) -> Router {
    let api = Router::new()
        .merge(billing_router().with_state(state.billing))
        .merge(marketplace_router().with_state(state.marketplace))
        .layer(middleware::from_fn_with_state(
            state.session_validator,
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
}
