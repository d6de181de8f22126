//! Marketplace lead repository port.

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::foundation::{ArtisanId, DomainError, LeadId};
use crate::domain::marketplace::{Lead, LeadPurchase};

/// How the marketplace listing is queried.
///
/// Both strategies return the same leads, newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingStrategy {
    /// Orders by `created_at` only and filters publication and status in
    /// application code. Needs no compound index; cost grows with the whole
    /// lead table, not with the number of listed leads.
    Scan,

    /// Pushes every predicate into the query. Needs the
    /// `(is_published, status, created_at)` index; cost grows with the
    /// number of listed leads.
    Indexed,
}

impl Default for ListingStrategy {
    fn default() -> Self {
        ListingStrategy::Scan
    }
}

#[async_trait]
pub trait LeadRepository: Send + Sync {
    async fn save(&self, lead: &Lead) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &LeadId) -> Result<Option<Lead>, DomainError>;

    /// Sells one slot of a lead to an artisan.
    ///
    /// The purchasable check, the counter increment, the status flip and the
    /// purchase record happen in one transaction: concurrent buyers of the
    /// last slot see exactly one success.
    ///
    /// # Errors
    ///
    /// - `LeadNotFound` if the lead does not exist
    /// - `LeadSoldOut`, `LeadNotActive`, `LeadNotPublished`, `AlreadyPurchased`
    ///   when the guard refuses the sale
    /// - `DatabaseError` on persistence failure
    async fn purchase(
        &self,
        lead_id: &LeadId,
        artisan_id: &ArtisanId,
    ) -> Result<(Lead, LeadPurchase), DomainError>;

    /// Listed leads (published, active, capacity left), newest first.
    async fn list_available(
        &self,
        strategy: ListingStrategy,
        limit: usize,
    ) -> Result<Vec<Lead>, DomainError>;

    async fn purchases_by_artisan(
        &self,
        artisan_id: &ArtisanId,
    ) -> Result<Vec<LeadPurchase>, DomainError>;
}
