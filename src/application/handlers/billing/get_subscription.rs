//! GetSubscriptionHandler - billing summary for the signed-in artisan.

use std::sync::Arc;

use crate::domain::artisan::{PremiumFeatures, SubscriptionState};
use crate::domain::billing::BillingError;
use crate::domain::foundation::{ArtisanId, UserId};
use crate::ports::ArtisanRepository;

#[derive(Debug, Clone)]
pub struct GetSubscriptionQuery {
    pub user_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetSubscriptionResult {
    pub artisan_id: ArtisanId,
    pub subscription: SubscriptionState,
    pub premium: PremiumFeatures,
}

pub struct GetSubscriptionHandler {
    artisans: Arc<dyn ArtisanRepository>,
}

impl GetSubscriptionHandler {
    pub fn new(artisans: Arc<dyn ArtisanRepository>) -> Self {
        Self { artisans }
    }

    pub async fn handle(
        &self,
        query: GetSubscriptionQuery,
    ) -> Result<GetSubscriptionResult, BillingError> {
        let artisan = self
            .artisans
            .find_by_owner(&query.user_id)
            .await?
            .ok_or_else(|| BillingError::artisan_not_found(query.user_id))?;

        Ok(GetSubscriptionResult {
            artisan_id: artisan.id,
            subscription: artisan.subscription,
            premium: artisan.premium,
        })
    }
}
