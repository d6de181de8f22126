//! Two-phase persistence of subscription state.
//!
//! Phase one writes the authoritative artisan record and propagates any
//! failure, which turns into a 500 for Stripe and a redelivery. Phase two
//! copies the subscription half of the patch onto the mirrored record inside
//! its own error boundary: a missing or failing mirror is logged and never
//! reaches the caller.

use std::sync::Arc;

use crate::domain::artisan::{Artisan, ArtisanPatch};
use crate::domain::foundation::{DomainError, Timestamp};
use crate::ports::{ArtisanRepository, SubscriptionMirrorRepository};

pub struct SubscriptionStatePersister {
    artisans: Arc<dyn ArtisanRepository>,
    mirror: Arc<dyn SubscriptionMirrorRepository>,
}

impl SubscriptionStatePersister {
    pub fn new(
        artisans: Arc<dyn ArtisanRepository>,
        mirror: Arc<dyn SubscriptionMirrorRepository>,
    ) -> Self {
        Self { artisans, mirror }
    }

    /// Applies `patch` to `artisan` and writes both records.
    ///
    /// Returns the artisan as stored, with its version bumped. A patch that
    /// leaves the billing state as it is writes nothing, so a redelivered
    /// event does not bump `version` or `updated_at`.
    ///
    /// # Errors
    ///
    /// Only errors from the artisan write are returned.
    pub async fn persist(
        &self,
        artisan: Artisan,
        patch: &ArtisanPatch,
        now: Timestamp,
    ) -> Result<Artisan, DomainError> {
        let mut updated = artisan.clone();
        updated.apply_patch(patch, now);

        if updated.subscription == artisan.subscription && updated.premium == artisan.premium {
            tracing::debug!(artisan_id = %artisan.id, "Billing state unchanged, skipping write");
            return Ok(artisan);
        }

        self.artisans.update(&updated).await?;
        updated.version += 1;

        self.mirror_best_effort(&updated, patch).await;

        Ok(updated)
    }

    async fn mirror_best_effort(&self, artisan: &Artisan, patch: &ArtisanPatch) {
        let Some(subscription_id) = artisan.subscription.stripe_subscription_id.as_ref() else {
            return;
        };
        if patch.subscription.is_empty() {
            return;
        }

        match self.mirror.apply(subscription_id, &patch.subscription).await {
            Ok(true) => {
                tracing::debug!(
                    artisan_id = %artisan.id,
                    subscription_id = %subscription_id,
                    "Mirrored subscription record updated"
                );
            }
            Ok(false) => {
                tracing::warn!(
                    artisan_id = %artisan.id,
                    subscription_id = %subscription_id,
                    "No mirrored subscription record to update"
                );
            }
            Err(e) => {
                tracing::error!(
                    artisan_id = %artisan.id,
                    subscription_id = %subscription_id,
                    error = %e,
                    "Failed to update mirrored subscription record"
                );
            }
        }
    }
}
