//! HTTP handlers for marketplace endpoints.

use std::sync::Arc;

use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::adapters::http::billing::dto::ErrorResponse;
use crate::adapters::http::middleware::RequireAuth;
use crate::application::handlers::marketplace::{
    ListLeadsHandler, PurchaseLeadCommand, PurchaseLeadHandler,
};
use crate::domain::foundation::LeadId;
use crate::domain::marketplace::MarketplaceError;

use super::dto::{LeadListResponse, ListLeadsParams, PurchaseResponse};

#[derive(Clone)]
pub struct MarketplaceAppState {
    pub list_handler: Arc<ListLeadsHandler>,
    pub purchase_handler: Arc<PurchaseLeadHandler>,
}

/// GET /api/marketplace/leads - Leads open for purchase, newest first
pub async fn list_leads(
    State(state): State<MarketplaceAppState>,
    Query(params): Query<ListLeadsParams>,
) -> Result<impl IntoResponse, MarketplaceApiError> {
    let leads = state.list_handler.handle(params.into()).await?;
    Ok(Json(LeadListResponse::from(leads)))
}

/// POST /api/marketplace/leads/:id/purchase - Buy one slot of a lead
pub async fn purchase_lead(
    State(state): State<MarketplaceAppState>,
    RequireAuth(user): RequireAuth,
    Path(lead_id): Path<LeadId>,
) -> Result<impl IntoResponse, MarketplaceApiError> {
    let cmd = PurchaseLeadCommand {
        user_id: user.id,
        lead_id,
    };

    let result = state.purchase_handler.handle(cmd).await?;

    Ok(Json(PurchaseResponse::from(result)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
pub struct MarketplaceApiError(MarketplaceError);

impl From<MarketplaceError> for MarketplaceApiError {
    fn from(err: MarketplaceError) -> Self {
        Self(err)
    }
}

impl IntoResponse for MarketplaceApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            MarketplaceError::LeadNotFound(_) | MarketplaceError::ArtisanNotFoundForUser(_) => {
                StatusCode::NOT_FOUND
            }
            MarketplaceError::Rejected(_) => StatusCode::CONFLICT,
            MarketplaceError::Infrastructure(msg) => {
                tracing::error!(error = %msg, "Marketplace request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = ErrorResponse::new(self.0.code().to_string(), self.0.message());
        (status, Json(body)).into_response()
    }
}
