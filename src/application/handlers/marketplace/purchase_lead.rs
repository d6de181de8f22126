//! PurchaseLeadHandler - buys one slot of a marketplace lead.

use std::sync::Arc;

use crate::domain::foundation::{ErrorCode, LeadId, UserId};
use crate::domain::marketplace::{Lead, LeadPurchase, MarketplaceError};
use crate::ports::{ArtisanRepository, LeadRepository};

#[derive(Debug, Clone)]
pub struct PurchaseLeadCommand {
    pub user_id: UserId,
    pub lead_id: LeadId,
}

#[derive(Debug, Clone)]
pub struct PurchaseLeadResult {
    pub lead: Lead,
    pub purchase: LeadPurchase,
}

/// Handler for lead purchases.
///
/// The guard and the counter increment run inside the repository's
/// `purchase`, which is atomic per lead. This handler only resolves the
/// buyer and translates errors.
pub struct PurchaseLeadHandler {
    artisans: Arc<dyn ArtisanRepository>,
    leads: Arc<dyn LeadRepository>,
}

impl PurchaseLeadHandler {
    pub fn new(artisans: Arc<dyn ArtisanRepository>, leads: Arc<dyn LeadRepository>) -> Self {
        Self { artisans, leads }
    }

    pub async fn handle(
        &self,
        cmd: PurchaseLeadCommand,
    ) -> Result<PurchaseLeadResult, MarketplaceError> {
        let artisan = self
            .artisans
            .find_by_owner(&cmd.user_id)
            .await?
            .ok_or_else(|| MarketplaceError::ArtisanNotFoundForUser(cmd.user_id.clone()))?;

        let (lead, purchase) = self
            .leads
            .purchase(&cmd.lead_id, &artisan.id)
            .await
            .map_err(|e| match e.code {
                ErrorCode::LeadNotFound => MarketplaceError::LeadNotFound(cmd.lead_id),
                _ => MarketplaceError::from(e),
            })
            .map_err(|e| {
                if let MarketplaceError::Rejected(reason) = &e {
                    tracing::info!(
                        lead_id = %cmd.lead_id,
                        artisan_id = %artisan.id,
                        reason = %reason,
                        "Lead purchase rejected"
                    );
                }
                e
            })?;

        tracing::info!(
            lead_id = %lead.id,
            artisan_id = %artisan.id,
            sales = lead.marketplace_sales,
            max_sales = lead.max_sales,
            status = lead.status.as_str(),
            "Lead purchased"
        );

        Ok(PurchaseLeadResult { lead, purchase })
    }
}
