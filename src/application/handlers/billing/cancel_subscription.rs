//! CancelSubscriptionHandler - self-service cancellation at period end.

use std::sync::Arc;

use crate::domain::artisan::Artisan;
use crate::domain::billing::{reducer, BillingError};
use crate::domain::foundation::{Timestamp, UserId};
use crate::ports::{ArtisanRepository, PaymentProvider};

use super::SubscriptionStatePersister;

#[derive(Debug, Clone)]
pub struct CancelSubscriptionCommand {
    pub user_id: UserId,
}

#[derive(Debug, Clone)]
pub struct CancelSubscriptionResult {
    /// The artisan as stored after cancellation.
    pub artisan: Artisan,
    /// When access ends, as reported by Stripe.
    pub effective_at: Option<Timestamp>,
}

/// Handler for cancelling an artisan's subscription.
///
/// Stripe is told to cancel at period end, so premium features stay on until
/// the `customer.subscription.deleted` webhook arrives.
pub struct CancelSubscriptionHandler {
    artisans: Arc<dyn ArtisanRepository>,
    payment_provider: Arc<dyn PaymentProvider>,
    persister: Arc<SubscriptionStatePersister>,
}

impl CancelSubscriptionHandler {
    pub fn new(
        artisans: Arc<dyn ArtisanRepository>,
        payment_provider: Arc<dyn PaymentProvider>,
        persister: Arc<SubscriptionStatePersister>,
    ) -> Self {
        Self {
            artisans,
            payment_provider,
            persister,
        }
    }

    pub async fn handle(
        &self,
        cmd: CancelSubscriptionCommand,
    ) -> Result<CancelSubscriptionResult, BillingError> {
        // 1. Find the caller's artisan record
        let artisan = self
            .artisans
            .find_by_owner(&cmd.user_id)
            .await?
            .ok_or_else(|| BillingError::artisan_not_found(cmd.user_id.clone()))?;

        // 2. Check there is something to cancel
        let subscription_id = artisan.cancelable_subscription()?.clone();

        // 3. Ask Stripe to cancel at period end
        let provider_subscription = self
            .payment_provider
            .cancel_at_period_end(&subscription_id)
            .await
            .map_err(|e| {
                tracing::error!(
                    artisan_id = %artisan.id,
                    subscription_id = %subscription_id,
                    error = %e,
                    "Stripe cancellation failed"
                );
                BillingError::payment_provider(e.message)
            })?;

        let effective_at = provider_subscription.current_period_end;

        // 4. Persist artisan and mirror
        let patch = reducer::self_cancellation(&artisan, effective_at);
        let artisan = self
            .persister
            .persist(artisan, &patch, Timestamp::now())
            .await?;

        tracing::info!(
            artisan_id = %artisan.id,
            subscription_id = %subscription_id,
            effective_at = ?effective_at.map(|t| t.to_rfc3339()),
            "Subscription canceled at period end"
        );

        Ok(CancelSubscriptionResult {
            artisan,
            effective_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryArtisanRepository, InMemorySubscriptionMirror};
    use crate::adapters::stripe::MockPaymentProvider;
    use crate::domain::artisan::SubscriptionStatus;
    use crate::domain::foundation::{ArtisanId, Money, SubscriptionId};
    use crate::ports::{PaymentError, ProviderSubscription};

    struct Fixture {
        handler: CancelSubscriptionHandler,
        artisans: Arc<InMemoryArtisanRepository>,
        provider: MockPaymentProvider,
    }

    fn fixture(artisans: Vec<Artisan>) -> Fixture {
        let artisans = Arc::new(InMemoryArtisanRepository::with_artisans(artisans));
        let provider = MockPaymentProvider::new();
        let persister = Arc::new(SubscriptionStatePersister::new(
            artisans.clone(),
            Arc::new(InMemorySubscriptionMirror::new()),
        ));
        Fixture {
            handler: CancelSubscriptionHandler::new(
                artisans.clone(),
                Arc::new(provider.clone()),
                persister,
            ),
            artisans,
            provider,
        }
    }

    fn premium_artisan(owner: &str) -> Artisan {
        let mut a = Artisan::new(ArtisanId::new(), UserId::new(owner).unwrap(), "Maçonnerie Roux");
        a.link_subscription("cus_1", SubscriptionId::new("sub_1").unwrap());
        a.subscription.status = Some(SubscriptionStatus::Active);
        a.premium.is_premium = true;
        a
    }

    fn provider_subscription() -> ProviderSubscription {
        ProviderSubscription {
            id: SubscriptionId::new("sub_1").unwrap(),
            customer_id: Some("cus_1".to_string()),
            status: SubscriptionStatus::Active,
            unit_amount: Money::from_cents(12_900),
            current_period_end: Timestamp::from_unix_secs(1_800_000_000),
            cancel_at_period_end: false,
        }
    }

    fn cmd(owner: &str) -> CancelSubscriptionCommand {
        CancelSubscriptionCommand {
            user_id: UserId::new(owner).unwrap(),
        }
    }

    #[tokio::test]
    async fn cancels_at_period_end_and_schedules_premium_end() {
        let a = premium_artisan("owner-1");
        let f = fixture(vec![a.clone()]);
        f.provider.add_subscription(provider_subscription());

        let result = f.handler.handle(cmd("owner-1")).await.unwrap();

        let period_end = Timestamp::from_unix_secs(1_800_000_000);
        assert_eq!(result.effective_at, period_end);
        let stored = f.artisans.get(&a.id).unwrap();
        assert_eq!(stored.subscription.status, Some(SubscriptionStatus::Canceled));
        assert!(stored.subscription.cancel_at_period_end);
        assert!(stored.premium.is_premium);
        assert_eq!(stored.premium.premium_end_date, period_end);
        assert_eq!(f.provider.call_count("cancel_at_period_end"), 1);
    }

    #[tokio::test]
    async fn unknown_owner_is_not_found() {
        let f = fixture(vec![]);

        let err = f.handler.handle(cmd("nobody")).await.unwrap_err();

        assert!(matches!(err, BillingError::ArtisanNotFoundForUser(_)));
    }

    #[tokio::test]
    async fn artisan_without_subscription_is_rejected() {
        let a = Artisan::new(ArtisanId::new(), UserId::new("owner-1").unwrap(), "Peinture Blanc");
        let f = fixture(vec![a]);

        let err = f.handler.handle(cmd("owner-1")).await.unwrap_err();

        assert_eq!(err, BillingError::NoActiveSubscription);
        assert_eq!(f.provider.call_count("cancel_at_period_end"), 0);
    }

    #[tokio::test]
    async fn already_canceled_is_rejected() {
        let mut a = premium_artisan("owner-1");
        a.subscription.status = Some(SubscriptionStatus::Canceled);
        let f = fixture(vec![a]);

        let err = f.handler.handle(cmd("owner-1")).await.unwrap_err();

        assert_eq!(err, BillingError::AlreadyCanceled);
    }

    #[tokio::test]
    async fn provider_failure_leaves_record_untouched() {
        let a = premium_artisan("owner-1");
        let f = fixture(vec![a.clone()]);
        f.provider
            .set_method_error("cancel_at_period_end", PaymentError::network("timeout"));

        let err = f.handler.handle(cmd("owner-1")).await.unwrap_err();

        assert!(matches!(err, BillingError::PaymentProvider(_)));
        assert_eq!(f.artisans.write_count(), 0);
        assert_eq!(
            f.artisans.get(&a.id).unwrap().subscription.status,
            Some(SubscriptionStatus::Active)
        );
    }

    #[tokio::test]
    async fn basic_artisan_gets_no_premium_end_date() {
        let mut a = premium_artisan("owner-1");
        a.premium.is_premium = false;
        let f = fixture(vec![a.clone()]);
        f.provider.add_subscription(provider_subscription());

        f.handler.handle(cmd("owner-1")).await.unwrap();

        assert!(f.artisans.get(&a.id).unwrap().premium.premium_end_date.is_none());
    }
}
