//! HTTP DTOs for marketplace endpoints.

use serde::{Deserialize, Serialize};

use crate::application::handlers::marketplace::{ListLeadsQuery, PurchaseLeadResult};
use crate::domain::foundation::{ArtisanId, LeadId, Timestamp};
use crate::domain::marketplace::{Lead, LeadStatus};
use crate::ports::ListingStrategy;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Query string of `GET /api/marketplace/leads`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListLeadsParams {
    /// `scan` or `indexed`; the configured default otherwise.
    pub strategy: Option<ListingStrategy>,
    pub limit: Option<usize>,
}

impl From<ListLeadsParams> for ListLeadsQuery {
    fn from(params: ListLeadsParams) -> Self {
        Self {
            strategy: params.strategy,
            limit: params.limit,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadResponse {
    pub id: LeadId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// Euros.
    pub price: f64,
    pub remaining_sales: i32,
    pub max_sales: i32,
    pub status: LeadStatus,
    pub created_at: Timestamp,
}

impl From<Lead> for LeadResponse {
    fn from(lead: Lead) -> Self {
        Self {
            remaining_sales: lead.remaining_sales(),
            id: lead.id,
            title: lead.title,
            city: lead.city,
            price: lead.price.as_major(),
            max_sales: lead.max_sales,
            status: lead.status,
            created_at: lead.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LeadListResponse {
    pub leads: Vec<LeadResponse>,
    pub count: usize,
}

impl From<Vec<Lead>> for LeadListResponse {
    fn from(leads: Vec<Lead>) -> Self {
        let leads: Vec<LeadResponse> = leads.into_iter().map(LeadResponse::from).collect();
        Self {
            count: leads.len(),
            leads,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseResponse {
    pub success: bool,
    pub lead_id: LeadId,
    pub artisan_id: ArtisanId,
    /// Euros paid.
    pub price: f64,
    pub purchased_at: Timestamp,
    pub remaining_sales: i32,
    pub lead_status: LeadStatus,
}

impl From<PurchaseLeadResult> for PurchaseResponse {
    fn from(result: PurchaseLeadResult) -> Self {
        Self {
            success: true,
            lead_id: result.purchase.lead_id,
            artisan_id: result.purchase.artisan_id,
            price: result.purchase.price.as_major(),
            purchased_at: result.purchase.purchased_at,
            remaining_sales: result.lead.remaining_sales(),
            lead_status: result.lead.status,
        }
    }
}
