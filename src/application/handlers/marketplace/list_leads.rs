//! ListLeadsHandler - leads currently open for purchase.

use std::sync::Arc;

use crate::domain::marketplace::{Lead, MarketplaceError};
use crate::ports::{LeadRepository, ListingStrategy};

/// Hard cap on page size regardless of what the caller asks for.
pub const MAX_LISTING_LIMIT: usize = 100;

#[derive(Debug, Clone, Default)]
pub struct ListLeadsQuery {
    /// Overrides the configured strategy.
    pub strategy: Option<ListingStrategy>,
    pub limit: Option<usize>,
}

pub type ListLeadsResult = Vec<Lead>;

pub struct ListLeadsHandler {
    leads: Arc<dyn LeadRepository>,
    default_strategy: ListingStrategy,
    default_limit: usize,
}

impl ListLeadsHandler {
    pub fn new(
        leads: Arc<dyn LeadRepository>,
        default_strategy: ListingStrategy,
        default_limit: usize,
    ) -> Self {
        Self {
            leads,
            default_strategy,
            default_limit: default_limit.clamp(1, MAX_LISTING_LIMIT),
        }
    }

    pub async fn handle(&self, query: ListLeadsQuery) -> Result<ListLeadsResult, MarketplaceError> {
        let strategy = query.strategy.unwrap_or(self.default_strategy);
        let limit = query
            .limit
            .unwrap_or(self.default_limit)
            .clamp(1, MAX_LISTING_LIMIT);

        let leads = self.leads.list_available(strategy, limit).await?;

        tracing::debug!(?strategy, limit, count = leads.len(), "Listed marketplace leads");

        Ok(leads)
    }
}
