//! Axum router configuration for marketplace endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{list_leads, purchase_lead, MarketplaceAppState};

/// Marketplace routes, meant to be nested under `/api`.
///
/// - `GET /marketplace/leads` - Open leads (`?strategy=scan|indexed&limit=N`)
/// - `POST /marketplace/leads/:id/purchase` - Buy a lead (requires authentication)
pub fn marketplace_router() -> Router<MarketplaceAppState> {
    Router::new()
        .route("/marketplace/leads", get(list_leads))
        .route("/marketplace/leads/:id/purchase", post(purchase_lead))
}
