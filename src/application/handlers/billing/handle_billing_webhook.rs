//! HandleBillingWebhookHandler - applies verified Stripe events to artisans.

use std::sync::Arc;

use crate::domain::artisan::Artisan;
use crate::domain::billing::{
    reducer, StripeEvent, StripeEventType, StripeInvoice, StripeSubscription,
    StripeWebhookVerifier, WebhookError,
};
use crate::domain::foundation::{ArtisanId, SubscriptionId, Timestamp};
use crate::ports::{ArtisanRepository, PaymentProvider};

use super::SubscriptionStatePersister;

/// Command carrying one raw webhook delivery.
#[derive(Debug, Clone)]
pub struct HandleBillingWebhookCommand {
    /// Raw request body. Must not be re-serialized before verification.
    pub payload: Vec<u8>,
    /// `Stripe-Signature` header, if the request had one.
    pub signature: Option<String>,
}

/// What the handler did with the event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleBillingWebhookResult {
    SubscriptionUpdated { artisan_id: ArtisanId },
    SubscriptionDeleted { artisan_id: ArtisanId },
    PaymentSucceeded { artisan_id: ArtisanId },
    PaymentFailed { artisan_id: ArtisanId },
    /// No artisan is linked to the subscription. Nothing was written.
    Orphaned { subscription_id: SubscriptionId },
    /// Event kind or object the sync does not act on.
    Ignored,
}

pub struct HandleBillingWebhookHandler {
    verifier: Arc<StripeWebhookVerifier>,
    artisans: Arc<dyn ArtisanRepository>,
    payment_provider: Arc<dyn PaymentProvider>,
    persister: Arc<SubscriptionStatePersister>,
}

impl HandleBillingWebhookHandler {
    pub fn new(
        verifier: Arc<StripeWebhookVerifier>,
        artisans: Arc<dyn ArtisanRepository>,
        payment_provider: Arc<dyn PaymentProvider>,
        persister: Arc<SubscriptionStatePersister>,
    ) -> Self {
        Self {
            verifier,
            artisans,
            payment_provider,
            persister,
        }
    }

    pub async fn handle(
        &self,
        cmd: HandleBillingWebhookCommand,
    ) -> Result<HandleBillingWebhookResult, WebhookError> {
        let signature = cmd.signature.ok_or(WebhookError::MissingSignature)?;
        let event = self.verifier.verify_and_parse(&cmd.payload, &signature)?;

        tracing::info!(
            event_id = %event.id,
            event_type = %event.event_type,
            livemode = event.livemode,
            "Stripe webhook received"
        );

        match event.parsed_type() {
            StripeEventType::CustomerSubscriptionUpdated => {
                self.handle_subscription_updated(&event).await
            }
            StripeEventType::CustomerSubscriptionDeleted => {
                self.handle_subscription_deleted(&event).await
            }
            StripeEventType::InvoicePaymentSucceeded => {
                self.handle_payment_succeeded(&event).await
            }
            StripeEventType::InvoicePaymentFailed => self.handle_payment_failed(&event).await,
            StripeEventType::Unknown => {
                tracing::info!(
                    event_id = %event.id,
                    event_type = %event.event_type,
                    "Ignoring unhandled Stripe event type"
                );
                Ok(HandleBillingWebhookResult::Ignored)
            }
        }
    }

    async fn handle_subscription_updated(
        &self,
        event: &StripeEvent,
    ) -> Result<HandleBillingWebhookResult, WebhookError> {
        let subscription: StripeSubscription = event.deserialize_object()?;
        let snapshot = subscription.to_snapshot()?;

        let Some(artisan) = self.find_artisan(event, &snapshot.id).await? else {
            return Ok(HandleBillingWebhookResult::Orphaned {
                subscription_id: snapshot.id,
            });
        };

        let at = event.created_at();
        let patch = reducer::subscription_updated(&artisan, &snapshot, at);
        let artisan = self.persister.persist(artisan, &patch, Timestamp::now()).await?;

        tracing::info!(
            artisan_id = %artisan.id,
            subscription_id = %snapshot.id,
            status = snapshot.status.as_str(),
            plan = %artisan.subscription.current_plan,
            is_premium = artisan.premium.is_premium,
            "Subscription updated"
        );

        Ok(HandleBillingWebhookResult::SubscriptionUpdated {
            artisan_id: artisan.id,
        })
    }

    async fn handle_subscription_deleted(
        &self,
        event: &StripeEvent,
    ) -> Result<HandleBillingWebhookResult, WebhookError> {
        let subscription: StripeSubscription = event.deserialize_object()?;
        let subscription_id = SubscriptionId::new(subscription.id)
            .map_err(|_| WebhookError::MissingField("subscription.id"))?;

        let Some(artisan) = self.find_artisan(event, &subscription_id).await? else {
            return Ok(HandleBillingWebhookResult::Orphaned { subscription_id });
        };

        let patch = reducer::subscription_deleted(event.created_at());
        let artisan = self.persister.persist(artisan, &patch, Timestamp::now()).await?;

        tracing::info!(
            artisan_id = %artisan.id,
            subscription_id = %subscription_id,
            "Subscription deleted, premium revoked"
        );

        Ok(HandleBillingWebhookResult::SubscriptionDeleted {
            artisan_id: artisan.id,
        })
    }

    async fn handle_payment_succeeded(
        &self,
        event: &StripeEvent,
    ) -> Result<HandleBillingWebhookResult, WebhookError> {
        let invoice: StripeInvoice = event.deserialize_object()?;
        let Some(subscription_id) = invoice.subscription_id() else {
            tracing::info!(invoice_id = %invoice.id, "Invoice has no subscription, ignoring");
            return Ok(HandleBillingWebhookResult::Ignored);
        };

        let Some(artisan) = self.find_artisan(event, &subscription_id).await? else {
            return Ok(HandleBillingWebhookResult::Orphaned { subscription_id });
        };

        let period_end = self
            .payment_provider
            .get_subscription(&subscription_id)
            .await
            .map_err(|e| WebhookError::Provider(e.to_string()))?
            .and_then(|s| s.current_period_end);

        let patch = reducer::payment_succeeded(period_end);
        let artisan = self.persister.persist(artisan, &patch, Timestamp::now()).await?;

        tracing::info!(
            artisan_id = %artisan.id,
            subscription_id = %subscription_id,
            invoice_id = %invoice.id,
            "Invoice paid"
        );

        Ok(HandleBillingWebhookResult::PaymentSucceeded {
            artisan_id: artisan.id,
        })
    }

    async fn handle_payment_failed(
        &self,
        event: &StripeEvent,
    ) -> Result<HandleBillingWebhookResult, WebhookError> {
        let invoice: StripeInvoice = event.deserialize_object()?;
        let Some(subscription_id) = invoice.subscription_id() else {
            tracing::info!(invoice_id = %invoice.id, "Invoice has no subscription, ignoring");
            return Ok(HandleBillingWebhookResult::Ignored);
        };

        let Some(artisan) = self.find_artisan(event, &subscription_id).await? else {
            return Ok(HandleBillingWebhookResult::Orphaned { subscription_id });
        };

        let patch = reducer::payment_failed();
        let artisan = self.persister.persist(artisan, &patch, Timestamp::now()).await?;

        tracing::warn!(
            artisan_id = %artisan.id,
            subscription_id = %subscription_id,
            invoice_id = %invoice.id,
            "Invoice payment failed, premium suspended"
        );

        Ok(HandleBillingWebhookResult::PaymentFailed {
            artisan_id: artisan.id,
        })
    }

    /// Looks up the artisan owning `subscription_id`; logs orphans.
    async fn find_artisan(
        &self,
        event: &StripeEvent,
        subscription_id: &SubscriptionId,
    ) -> Result<Option<Artisan>, WebhookError> {
        let artisan = self
            .artisans
            .find_by_subscription_id(subscription_id)
            .await?;

        if artisan.is_none() {
            tracing::warn!(
                event_id = %event.id,
                event_type = %event.event_type,
                subscription_id = %subscription_id,
                "No artisan linked to subscription, dropping event"
            );
        }

        Ok(artisan)
    }
}
