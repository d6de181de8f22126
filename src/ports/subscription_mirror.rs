//! Mirrored subscription record port.
//!
//! Callers treat every error from this port as non-fatal: see
//! `SubscriptionStatePersister`.

use async_trait::async_trait;

use crate::domain::artisan::SubscriptionPatch;
use crate::domain::billing::SubscriptionRecord;
use crate::domain::foundation::{DomainError, SubscriptionId};

#[async_trait]
pub trait SubscriptionMirrorRepository: Send + Sync {
    /// Inserts or replaces a record, keyed by subscription id.
    async fn upsert(&self, record: &SubscriptionRecord) -> Result<(), DomainError>;

    /// Applies a patch to an existing record.
    ///
    /// Returns `Ok(false)` when no record exists for the subscription.
    async fn apply(
        &self,
        subscription_id: &SubscriptionId,
        patch: &SubscriptionPatch,
    ) -> Result<bool, DomainError>;

    async fn find(
        &self,
        subscription_id: &SubscriptionId,
    ) -> Result<Option<SubscriptionRecord>, DomainError>;
}
