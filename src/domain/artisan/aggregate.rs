//! Artisan aggregate entity.
//!
//! The artisan record is the authoritative copy of an artisan's billing state.
//! It is created at onboarding, mutated by billing webhooks and the
//! self-service endpoints, and never hard-deleted: a canceled subscription is
//! just a status.
//!
//! # Invariants
//!
//! - `subscription.current_plan` is derived from `subscription.monthly_price`
//! - `premium.is_premium` implies a paid plan
//! - `version` increases by one on every persisted update

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    ArtisanId, DomainError, ErrorCode, Money, SubscriptionId, Timestamp, UserId,
};

use super::patch::{merge, merge_opt};
use super::{ArtisanPatch, PlanTier, SubscriptionStatus};

/// How premium is billed. Only monthly billing is sold today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PremiumType {
    Monthly,
}

impl PremiumType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PremiumType::Monthly => "monthly",
        }
    }
}

/// Billing state mirrored from Stripe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SubscriptionState {
    pub stripe_subscription_id: Option<SubscriptionId>,

    /// `None` until the artisan has subscribed once.
    pub status: Option<SubscriptionStatus>,

    pub current_plan: PlanTier,

    pub monthly_price: Money,

    pub current_period_end: Option<Timestamp>,

    pub cancel_at_period_end: bool,
}

/// Premium profile features unlocked by a paid plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PremiumFeatures {
    pub is_premium: bool,
    pub premium_type: Option<PremiumType>,
    /// First activation only; later upgrades keep the original date.
    pub premium_start_date: Option<Timestamp>,
    pub premium_end_date: Option<Timestamp>,
    /// Ordered; the first photo is the profile hero banner.
    pub banner_photos: Vec<String>,
    pub show_top_artisan_badge: bool,
}

/// Artisan aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artisan {
    pub id: ArtisanId,

    /// Identity-provider uid of the account owner.
    pub owner_id: UserId,

    pub company_name: String,

    pub stripe_customer_id: Option<String>,

    pub subscription: SubscriptionState,

    pub premium: PremiumFeatures,

    pub version: i64,

    pub created_at: Timestamp,

    pub updated_at: Timestamp,
}

impl Artisan {
    /// Creates a freshly onboarded artisan on the basic plan.
    pub fn new(id: ArtisanId, owner_id: UserId, company_name: impl Into<String>) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            owner_id,
            company_name: company_name.into(),
            stripe_customer_id: None,
            subscription: SubscriptionState::default(),
            premium: PremiumFeatures::default(),
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    /// Links the artisan to a Stripe customer and subscription after checkout.
    pub fn link_subscription(
        &mut self,
        customer_id: impl Into<String>,
        subscription_id: SubscriptionId,
    ) {
        self.stripe_customer_id = Some(customer_id.into());
        self.subscription.stripe_subscription_id = Some(subscription_id);
    }

    /// Merges a patch into the record, section by section.
    pub fn apply_patch(&mut self, patch: &ArtisanPatch, now: Timestamp) {
        let sub = &patch.subscription;
        merge_opt(&mut self.subscription.status, &sub.status);
        merge(&mut self.subscription.current_plan, &sub.current_plan);
        merge(&mut self.subscription.monthly_price, &sub.monthly_price);
        merge_opt(&mut self.subscription.current_period_end, &sub.current_period_end);
        merge(
            &mut self.subscription.cancel_at_period_end,
            &sub.cancel_at_period_end,
        );

        let premium = &patch.premium;
        merge(&mut self.premium.is_premium, &premium.is_premium);
        merge_opt(&mut self.premium.premium_type, &premium.premium_type);
        merge_opt(&mut self.premium.premium_start_date, &premium.premium_start_date);
        merge(&mut self.premium.premium_end_date, &premium.premium_end_date);

        self.updated_at = now;
    }

    /// Returns the subscription id if the artisan may cancel it.
    ///
    /// # Errors
    ///
    /// - `NoActiveSubscription` when no Stripe subscription is linked
    /// - `AlreadyCanceled` when the subscription is already canceled
    pub fn cancelable_subscription(&self) -> Result<&SubscriptionId, DomainError> {
        let id = self.subscription.stripe_subscription_id.as_ref().ok_or_else(|| {
            DomainError::new(
                ErrorCode::NoActiveSubscription,
                "No active subscription to cancel",
            )
        })?;

        if self
            .subscription
            .status
            .map(|s| s.is_canceled())
            .unwrap_or(false)
        {
            return Err(DomainError::new(
                ErrorCode::AlreadyCanceled,
                "Subscription is already canceled",
            ));
        }

        Ok(id)
    }
}
