//! Artisan repository port.
//!
//! The artisan record is the authoritative copy of billing state, so writes
//! through this port must either succeed or return an error the caller can
//! propagate. Webhook handlers rely on that to turn a failed write into a 500
//! and a Stripe redelivery.

use async_trait::async_trait;

use crate::domain::artisan::Artisan;
use crate::domain::foundation::{ArtisanId, DomainError, SubscriptionId, UserId};

#[async_trait]
pub trait ArtisanRepository: Send + Sync {
    /// Inserts a newly onboarded artisan.
    async fn save(&self, artisan: &Artisan) -> Result<(), DomainError>;

    /// Persists an updated artisan.
    ///
    /// `artisan.version` must be the version that was read; the stored
    /// version becomes `artisan.version + 1`.
    ///
    /// # Errors
    ///
    /// - `ArtisanNotFound` if the record does not exist
    /// - `ConcurrencyConflict` if another writer updated it first
    /// - `DatabaseError` on persistence failure
    async fn update(&self, artisan: &Artisan) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &ArtisanId) -> Result<Option<Artisan>, DomainError>;

    /// Looks up the artisan owned by an identity-provider user.
    async fn find_by_owner(&self, owner_id: &UserId) -> Result<Option<Artisan>, DomainError>;

    /// Looks up the artisan a Stripe subscription belongs to.
    async fn find_by_subscription_id(
        &self,
        subscription_id: &SubscriptionId,
    ) -> Result<Option<Artisan>, DomainError>;
}
